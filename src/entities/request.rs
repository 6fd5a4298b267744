//! `Request` (spec §3).

use std::collections::BTreeSet;

use crate::geo::GeoId;
use crate::ids::{MembershipId, RequestId, VehicleId};
use crate::time::SimTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub origin: GeoId,
    pub destination: GeoId,
    pub departure_time: SimTime,
    pub cancel_time: SimTime,
    pub passengers: u32,
    pub value: f64,
    pub dispatched_vehicle: Option<VehicleId>,
    pub dispatched_vehicle_time: Option<SimTime>,
    pub membership: BTreeSet<MembershipId>,
}

impl Request {
    pub fn new(
        id: RequestId,
        origin: GeoId,
        destination: GeoId,
        departure_time: SimTime,
        cancel_time: SimTime,
        passengers: u32,
        value: f64,
    ) -> Self {
        Self {
            id,
            origin,
            destination,
            departure_time,
            cancel_time,
            passengers,
            value,
            dispatched_vehicle: None,
            dispatched_vehicle_time: None,
            membership: BTreeSet::new(),
        }
    }

    pub fn with_membership(mut self, membership: BTreeSet<MembershipId>) -> Self {
        self.membership = membership;
        self
    }

    /// Marks this request as dispatched to `vehicle_id` at `sim_time` (spec
    /// §4.3 `DispatchTrip::enter`: "updates the request to know that this
    /// vehicle is on its way").
    pub fn assign_dispatched_vehicle(mut self, vehicle_id: VehicleId, sim_time: SimTime) -> Self {
        self.dispatched_vehicle = Some(vehicle_id);
        self.dispatched_vehicle_time = Some(sim_time);
        self
    }

    pub fn clear_dispatched_vehicle(mut self) -> Self {
        self.dispatched_vehicle = None;
        self.dispatched_vehicle_time = None;
        self
    }

    pub fn is_dispatched(&self) -> bool {
        self.dispatched_vehicle.is_some()
    }

    /// Whether `sim_time` has passed this request's departure without it
    /// yet being admitted (spec §2 step 1: "ingest requests whose
    /// `departure_time ≤ sim_time`").
    pub fn should_be_admitted(&self, sim_time: SimTime) -> bool {
        self.departure_time <= sim_time
    }

    /// Whether `sim_time` has passed this request's self-cancel deadline
    /// (spec §2 step 1).
    pub fn should_be_cancelled(&self, sim_time: SimTime) -> bool {
        self.cancel_time <= sim_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h3o::{LatLng, Resolution};

    fn geoid(lat: f64, lon: f64) -> GeoId {
        GeoId(LatLng::new(lat, lon).unwrap().to_cell(Resolution::Nine))
    }

    fn request() -> Request {
        Request::new(
            RequestId::new("r1"),
            geoid(37.0, -122.0),
            geoid(37.1, -122.1),
            SimTime(100),
            SimTime(700),
            1,
            10.0,
        )
    }

    #[test]
    fn assign_then_clear_round_trips() {
        let r = request().assign_dispatched_vehicle(VehicleId::new("v1"), SimTime(150));
        assert!(r.is_dispatched());
        let r = r.clear_dispatched_vehicle();
        assert!(!r.is_dispatched());
    }

    #[test]
    fn admission_and_cancellation_are_time_gated() {
        let r = request();
        assert!(!r.should_be_admitted(SimTime(50)));
        assert!(r.should_be_admitted(SimTime(100)));
        assert!(!r.should_be_cancelled(SimTime(699)));
        assert!(r.should_be_cancelled(SimTime(700)));
    }
}
