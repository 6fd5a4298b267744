//! `SimulationState`: the immutable container of spec §3/§4.2.
//!
//! Grounded on `original_source/hive/state/simulation_state/simulation_state.py`
//! (the `NamedTuple` of four entity maps, four deterministic id tuples, and
//! eight location/search maps, plus its `get_*`/`*_at_*` query helpers) and
//! re-expressed as a plain Rust struct following the teacher's "resource
//! bag" shape (`ecs.rs`'s `World` resources). Persistent/structural-sharing
//! maps don't appear anywhere in the retrieval pack, so per spec §9 this
//! takes the documented fallback: plain `HashMap`s, cloned whole by every op
//! (`ops` module) rather than updated in place.

pub mod ops;

use std::collections::HashMap;
use std::sync::Arc;

use h3o::Resolution;

use crate::entities::{Base, Request, Station, Vehicle};
use crate::geo::GeoIndex;
use crate::ids::{BaseId, RequestId, StationId, VehicleId};
use crate::routing::RoadNetwork;
use crate::time::SimTime;

/// The full simulation snapshot at one tick (spec §4.2). Cloning is cheap
/// for the `Arc<dyn RoadNetwork>` and scalar fields; the entity maps and
/// indices are the expensive part, cloned whole on every mutating op.
#[derive(Clone)]
pub struct SimulationState {
    pub road_network: Arc<dyn RoadNetwork>,
    pub sim_time: SimTime,
    pub sim_timestep_duration_seconds: u64,
    pub sim_h3_location_resolution: Resolution,
    pub sim_h3_search_resolution: Resolution,

    pub(crate) vehicles: HashMap<VehicleId, Vehicle>,
    pub(crate) requests: HashMap<RequestId, Request>,
    pub(crate) stations: HashMap<StationId, Station>,
    pub(crate) bases: HashMap<BaseId, Base>,

    /// Requests loaded but not yet admitted (spec §2 step 1: "ingest
    /// requests whose `departure_time ≤ sim_time`"). Not indexed or
    /// iterated deterministically since it never participates in dispatch;
    /// `step::admit_and_cancel_requests` is the only reader.
    pub(crate) pending_requests: Vec<Request>,

    /// Insertion-order ids, filtered (never reordered) on removal — spec
    /// §9 supplement "deterministic iteration order".
    pub(crate) vehicle_iterator: Vec<VehicleId>,
    pub(crate) request_iterator: Vec<RequestId>,
    pub(crate) station_iterator: Vec<StationId>,
    pub(crate) base_iterator: Vec<BaseId>,

    pub(crate) vehicle_index: GeoIndex<VehicleId>,
    pub(crate) request_index: GeoIndex<RequestId>,
    pub(crate) station_index: GeoIndex<StationId>,
    pub(crate) base_index: GeoIndex<BaseId>,
}

impl SimulationState {
    pub fn new(
        road_network: Arc<dyn RoadNetwork>,
        sim_timestep_duration_seconds: u64,
        sim_h3_location_resolution: Resolution,
        sim_h3_search_resolution: Resolution,
    ) -> Self {
        Self {
            road_network,
            sim_time: SimTime::ZERO,
            sim_timestep_duration_seconds,
            sim_h3_location_resolution,
            sim_h3_search_resolution,
            vehicles: HashMap::new(),
            requests: HashMap::new(),
            stations: HashMap::new(),
            bases: HashMap::new(),
            pending_requests: Vec::new(),
            vehicle_iterator: Vec::new(),
            request_iterator: Vec::new(),
            station_iterator: Vec::new(),
            base_iterator: Vec::new(),
            vehicle_index: GeoIndex::new(sim_h3_location_resolution, sim_h3_search_resolution),
            request_index: GeoIndex::new(sim_h3_location_resolution, sim_h3_search_resolution),
            station_index: GeoIndex::new(sim_h3_location_resolution, sim_h3_search_resolution),
            base_index: GeoIndex::new(sim_h3_location_resolution, sim_h3_search_resolution),
        }
    }

    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn request(&self, id: &RequestId) -> Option<&Request> {
        self.requests.get(id)
    }

    pub fn station(&self, id: &StationId) -> Option<&Station> {
        self.stations.get(id)
    }

    pub fn base(&self, id: &BaseId) -> Option<&Base> {
        self.bases.get(id)
    }

    /// Requests loaded but not yet admitted (spec §2 step 1).
    pub fn pending_requests(&self) -> &[Request] {
        &self.pending_requests
    }

    pub fn vehicle_index(&self) -> &GeoIndex<VehicleId> {
        &self.vehicle_index
    }

    pub fn request_index(&self) -> &GeoIndex<RequestId> {
        &self.request_index
    }

    pub fn station_index(&self) -> &GeoIndex<StationId> {
        &self.station_index
    }

    pub fn base_index(&self) -> &GeoIndex<BaseId> {
        &self.base_index
    }

    /// Generic filtered/sorted/membership-scoped query, shared by
    /// `get_vehicles`/`get_requests`/`get_stations`/`get_bases` (spec §4.2).
    fn collect<'a, Id, Entity: 'a, K: Ord>(
        ids: &'a [Id],
        map: &'a HashMap<Id, Entity>,
        membership: Option<&crate::ids::MembershipId>,
        membership_of: impl Fn(&Entity) -> &std::collections::BTreeSet<crate::ids::MembershipId>,
        filter: Option<&dyn Fn(&Entity) -> bool>,
        sort_key: Option<&dyn Fn(&Entity) -> K>,
        sort_reversed: bool,
    ) -> Vec<&'a Entity>
    where
        Id: std::hash::Hash + Eq,
    {
        let mut out: Vec<&Entity> = ids
            .iter()
            .filter_map(|id| map.get(id))
            .filter(|e| membership.map_or(true, |m| membership_of(e).contains(m)))
            .filter(|e| filter.map_or(true, |f| f(e)))
            .collect();
        if let Some(key) = sort_key {
            out.sort_by(|a, b| key(a).cmp(&key(b)));
            if sort_reversed {
                out.reverse();
            }
        }
        out
    }

    pub fn get_vehicles(
        &self,
        membership: Option<&crate::ids::MembershipId>,
        filter: Option<&dyn Fn(&Vehicle) -> bool>,
    ) -> Vec<&Vehicle> {
        Self::collect::<_, _, ()>(
            &self.vehicle_iterator,
            &self.vehicles,
            membership,
            |v| &v.membership,
            filter,
            None,
            false,
        )
    }

    pub fn get_requests(
        &self,
        membership: Option<&crate::ids::MembershipId>,
        filter: Option<&dyn Fn(&Request) -> bool>,
        sort_by_value_desc: bool,
    ) -> Vec<&Request> {
        let key: Option<&dyn Fn(&Request) -> OrderedF64> =
            if sort_by_value_desc { Some(&|r: &Request| OrderedF64(r.value)) } else { None };
        Self::collect(
            &self.request_iterator,
            &self.requests,
            membership,
            |r| &r.membership,
            filter,
            key,
            sort_by_value_desc,
        )
    }

    pub fn get_stations(
        &self,
        membership: Option<&crate::ids::MembershipId>,
        filter: Option<&dyn Fn(&Station) -> bool>,
    ) -> Vec<&Station> {
        Self::collect::<_, _, ()>(
            &self.station_iterator,
            &self.stations,
            membership,
            |s| &s.membership,
            filter,
            None,
            false,
        )
    }

    pub fn get_bases(
        &self,
        membership: Option<&crate::ids::MembershipId>,
        filter: Option<&dyn Fn(&Base) -> bool>,
    ) -> Vec<&Base> {
        Self::collect::<_, _, ()>(
            &self.base_iterator,
            &self.bases,
            membership,
            |b| &b.membership,
            filter,
            None,
            false,
        )
    }

    /// Whether `vehicle_id` and `request_id` currently occupy the same
    /// location cell (spec §4.3 `DispatchTrip` co-location check).
    pub fn vehicle_at_request(&self, vehicle_id: &VehicleId, request_id: &RequestId) -> bool {
        match (self.vehicle(vehicle_id), self.request(request_id)) {
            (Some(v), Some(r)) => v.geoid == r.origin,
            _ => false,
        }
    }

    pub fn vehicle_at_station(&self, vehicle_id: &VehicleId, station_id: &StationId) -> bool {
        match (self.vehicle(vehicle_id), self.station(station_id)) {
            (Some(v), Some(s)) => v.geoid == s.geoid,
            _ => false,
        }
    }

    pub fn vehicle_at_base(&self, vehicle_id: &VehicleId, base_id: &BaseId) -> bool {
        match (self.vehicle(vehicle_id), self.base(base_id)) {
            (Some(v), Some(b)) => v.geoid == b.geoid,
            _ => false,
        }
    }

    /// `sim_time += timestep_duration_seconds` (spec §2 step 5).
    pub fn advance_time(&self) -> SimulationState {
        let mut next = self.clone();
        next.sim_time = self.sim_time.advance(self.sim_timestep_duration_seconds);
        next
    }
}

/// Total ordering wrapper for sorting `Request`s by `value` (an `f64`),
/// matching the teacher's occasional need to sort floats without pulling in
/// a dedicated ordered-float dependency.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedF64(f64);

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HaversineRoadNetwork;

    pub(crate) fn empty_sim() -> SimulationState {
        SimulationState::new(Arc::new(HaversineRoadNetwork::default()), 60, Resolution::Nine, Resolution::Six)
    }

    #[test]
    fn advance_time_is_additive_and_non_mutating() {
        let sim = empty_sim();
        let next = sim.advance_time();
        assert_eq!(sim.sim_time, SimTime::ZERO);
        assert_eq!(next.sim_time, SimTime(60));
    }
}
