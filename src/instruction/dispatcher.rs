//! `Dispatcher` (spec §4.5): greedy/assignment matching of idle vehicles to
//! unassigned requests, scoped by fleet membership.
//!
//! Grounded on `original_source/hive/dispatcher/instruction_generator/dispatcher.py`:
//! same `_is_valid_for_dispatch` filter (state membership + range threshold
//! + a stricter threshold for vehicles currently at a base), same per-
//! membership assignment pass, same default `h3_distance_cost`.
//! Generalized with one addition: vehicles and requests that belong to no
//! fleet at all (`membership` empty, the common case in a fleet-less
//! scenario) are matched in an extra unscoped pass, since the original's
//! membership-intersection loop has no term for the empty-membership case.

use std::collections::BTreeSet;

use crate::assignment::{find_assignment, h3_distance_cost};
use crate::config::Environment;
use crate::entities::{Request, Vehicle};
use crate::ids::{MembershipId, RequestId, VehicleId};
use crate::state::SimulationState;
use crate::vehicle_state::VehicleStateKind;

use super::Instruction;

#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher;

impl Dispatcher {
    /// Runs one pass of dispatch over every fleet membership shared by
    /// vehicles and requests, plus one unscoped pass, returning the next
    /// (identical, since this generator carries no state) `Dispatcher` and
    /// the instructions it emitted.
    pub fn generate_instructions(&self, sim: &SimulationState, env: &Environment) -> (Self, Vec<Instruction>) {
        let mut used_vehicles: BTreeSet<VehicleId> = BTreeSet::new();
        let mut used_requests: BTreeSet<RequestId> = BTreeSet::new();
        let mut instructions = Vec::new();

        let scopes: Vec<Option<MembershipId>> = shared_memberships(sim).into_iter().map(Some).chain(std::iter::once(None)).collect();

        for scope in scopes {
            let pairs = self.solve_for_scope(sim, env, scope.as_ref(), &used_vehicles, &used_requests);
            for pair in pairs {
                used_vehicles.insert(pair.vehicle_id.clone());
                used_requests.insert(pair.request_id.clone());
                instructions.push(Instruction::DispatchTrip { vehicle_id: pair.vehicle_id, request_id: pair.request_id });
            }
        }

        (*self, instructions)
    }

    fn solve_for_scope(
        &self,
        sim: &SimulationState,
        env: &Environment,
        scope: Option<&MembershipId>,
        used_vehicles: &BTreeSet<VehicleId>,
        used_requests: &BTreeSet<RequestId>,
    ) -> Vec<crate::assignment::AssignmentPair> {
        let vehicle_filter = |v: &Vehicle| !used_vehicles.contains(&v.id) && is_valid_for_dispatch(env, v);
        let request_filter = |r: &Request| !used_requests.contains(&r.id) && !r.is_dispatched();

        let vehicles = sim.get_vehicles(scope, Some(&vehicle_filter));
        let requests = sim.get_requests(scope, Some(&request_filter), true);
        if vehicles.is_empty() || requests.is_empty() {
            return Vec::new();
        }
        find_assignment(&vehicles, &requests, h3_distance_cost)
    }
}

/// Whether `vehicle` may be dispatched this tick (spec §4.5 bullet 1):
/// state must be one of the configured valid-dispatch states, range
/// remaining must clear the matching threshold, and a vehicle currently at
/// a base — parked (`ReserveBase`) or charging there (`ChargingBase`) —
/// needs extra range before it's worth pulling off base.
fn is_valid_for_dispatch(env: &Environment, vehicle: &Vehicle) -> bool {
    let cfg = &env.config.dispatcher;
    if !cfg.valid_dispatch_states.contains(&vehicle.state_kind()) {
        return false;
    }
    let range_remaining_km = range_remaining_km(vehicle, env);
    let at_base = matches!(vehicle.state_kind(), VehicleStateKind::ReserveBase | VehicleStateKind::ChargingBase);
    if at_base && range_remaining_km < cfg.base_charging_range_km_threshold {
        return false;
    }
    range_remaining_km > cfg.matching_range_km_threshold
}

/// Range remaining, in kilometers, given the flat consumption rate that
/// stands in for the original's per-mechatronics-model energy curve (spec
/// §1 non-goal; see `HiveConfig::default_energy_consumption_kwh_per_km`).
pub(crate) fn range_remaining_km(vehicle: &Vehicle, env: &Environment) -> f64 {
    let rate = env.config.default_energy_consumption_kwh_per_km;
    if rate <= 0.0 {
        f64::INFINITY
    } else {
        vehicle.energy_source.energy_kwh() / rate
    }
}

/// Fleet memberships held by at least one vehicle and at least one request
/// (spec §4.5: "for each membership with both vehicles and requests").
fn shared_memberships(sim: &SimulationState) -> BTreeSet<MembershipId> {
    let vehicle_memberships: BTreeSet<&MembershipId> = sim.vehicles.values().flat_map(|v| v.membership.iter()).collect();
    let request_memberships: BTreeSet<&MembershipId> = sim.requests.values().flat_map(|r| r.membership.iter()).collect();
    vehicle_memberships.intersection(&request_memberships).map(|m| (*m).clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HiveConfig;
    use crate::entities::{EnergySource, EnergyType};
    use crate::ids::MechatronicsId;
    use crate::routing::HaversineRoadNetwork;
    use crate::state::ops;
    use crate::time::SimTime;
    use crate::vehicle_state::VehicleState;
    use h3o::{LatLng, Resolution};
    use std::sync::Arc;

    fn geoid(lat: f64, lon: f64) -> crate::geo::GeoId {
        crate::geo::GeoId(LatLng::new(lat, lon).unwrap().to_cell(Resolution::Nine))
    }

    fn vehicle(id: &str, lat: f64, lon: f64) -> Vehicle {
        Vehicle::new(
            VehicleId::new(id),
            geoid(lat, lon),
            MechatronicsId::new("m1"),
            EnergySource::new(EnergyType::Battery, 50.0, 45.0, 20.0),
        )
    }

    #[test]
    fn nearer_idle_vehicle_is_dispatched_to_a_fleet_less_request() {
        let sim = SimulationState::new(Arc::new(HaversineRoadNetwork::default()), 60, Resolution::Nine, Resolution::Six);
        let sim = ops::add_vehicle(&sim, vehicle("v_a", 37.7749, -122.4194)).unwrap();
        let sim = ops::add_vehicle(&sim, vehicle("v_b", 38.9, -121.0)).unwrap();
        let request = Request::new(
            RequestId::new("r1"),
            geoid(37.7750, -122.4195),
            geoid(37.8, -122.4),
            SimTime::ZERO,
            SimTime(600),
            1,
            10.0,
        );
        let sim = ops::add_request(&sim, request).unwrap();

        let env = Environment::new(HiveConfig::default().with_dispatcher(
            crate::config::DispatcherConfig::default().with_valid_dispatch_states([VehicleStateKind::Idle]),
        ));
        let (_next, instructions) = Dispatcher.generate_instructions(&sim, &env);
        assert_eq!(
            instructions,
            vec![Instruction::DispatchTrip { vehicle_id: VehicleId::new("v_a"), request_id: RequestId::new("r1") }]
        );
    }

    #[test]
    fn low_range_vehicles_are_excluded_from_dispatch() {
        let sim = SimulationState::new(Arc::new(HaversineRoadNetwork::default()), 60, Resolution::Nine, Resolution::Six);
        let depleted =
            Vehicle::new(VehicleId::new("v1"), geoid(37.0, -122.0), MechatronicsId::new("m1"), EnergySource::new(EnergyType::Battery, 1.0, 1.0, 1.0).with_soc(0.0));
        let sim = ops::add_vehicle(&sim, depleted).unwrap();
        let request = Request::new(RequestId::new("r1"), geoid(37.0, -122.0), geoid(37.1, -122.1), SimTime::ZERO, SimTime(600), 1, 10.0);
        let sim = ops::add_request(&sim, request).unwrap();

        let env = Environment::new(HiveConfig::default());
        let (_next, instructions) = Dispatcher.generate_instructions(&sim, &env);
        assert!(instructions.is_empty());
    }

    #[test]
    fn a_reserve_base_vehicle_below_the_base_leave_threshold_is_not_dispatched() {
        let sim = SimulationState::new(Arc::new(HaversineRoadNetwork::default()), 60, Resolution::Nine, Resolution::Six);
        // 50 kWh remaining at the default 0.2 kWh/km rate is 250 km of range:
        // enough to clear `matching_range_km_threshold` (50 km) but not the
        // stricter `base_charging_range_km_threshold` raised to 1000 km below.
        let parked = Vehicle::new(
            VehicleId::new("v1"),
            geoid(37.0, -122.0),
            MechatronicsId::new("m1"),
            EnergySource::new(EnergyType::Battery, 100.0, 45.0, 20.0).with_soc(0.5),
        )
        .with_vehicle_state(VehicleState::ReserveBase { vehicle_id: VehicleId::new("v1"), base_id: crate::ids::BaseId::new("b1") });
        let sim = ops::add_vehicle(&sim, parked).unwrap();
        let request = Request::new(RequestId::new("r1"), geoid(37.0, -122.0), geoid(37.1, -122.1), SimTime::ZERO, SimTime(600), 1, 10.0);
        let sim = ops::add_request(&sim, request).unwrap();

        let dispatcher_cfg = crate::config::DispatcherConfig {
            base_charging_range_km_threshold: 1_000.0,
            ..crate::config::DispatcherConfig::default().with_valid_dispatch_states([VehicleStateKind::ReserveBase])
        };
        let env = Environment::new(HiveConfig::default().with_dispatcher(dispatcher_cfg));
        let (_next, instructions) = Dispatcher.generate_instructions(&sim, &env);
        assert!(instructions.is_empty());
    }
}
