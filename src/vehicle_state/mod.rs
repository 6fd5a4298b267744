//! The per-vehicle state machine (spec §4.3): nine variants, each a tagged
//! sum-type case per spec §9's design note, sharing `enter`/`update`/`exit`
//! through a single dispatcher rather than a trait-object vtable.
//!
//! Grounded on `original_source/hive/state/vehicle_state/dispatch_trip.py`
//! (the `enter`/`update`/`exit`/`_perform_update`/`_has_reached_terminal_state_condition`/
//! `_enter_default_terminal_state` shape, and the "request missing ⇒ silent
//! abort, not an error" convention) and the teacher's `DriverState`-style
//! enum + `set_driver_state_*` command pattern in `ecs.rs`/`systems/driver_decision.rs`,
//! generalized from an ECS component + commands into a plain enum matched
//! by a dispatcher.

mod charging_base;
mod charging_station;
mod dispatch_base;
mod dispatch_station;
mod dispatch_trip;
mod idle;
mod out_of_service;
mod repositioning;
mod reserve_base;
mod servicing_trip;

use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::ids::{BaseId, ChargerId, RequestId, StationId, VehicleId};
use crate::routing::PropertyLink;
use crate::state::{ops, SimulationState};

/// The three-way outcome spec §4.3 assigns to `enter`/`exit`/`update`:
/// `Ok(Some(sim))` is a successful transition, `Ok(None)` is a sanctioned
/// silent abort (spec §7), `Err(_)` is a hard failure.
pub type TransitionResult = Result<Option<SimulationState>, SimulationStateError>;

#[derive(Debug, Clone, PartialEq)]
pub enum VehicleState {
    Idle { vehicle_id: VehicleId, idle_duration_s: u64 },
    Repositioning { vehicle_id: VehicleId, route: Vec<PropertyLink> },
    DispatchTrip { vehicle_id: VehicleId, request_id: RequestId, route: Vec<PropertyLink> },
    ServicingTrip { vehicle_id: VehicleId, request_id: RequestId, route: Vec<PropertyLink>, passengers: u32 },
    DispatchStation { vehicle_id: VehicleId, station_id: StationId, charger_id: ChargerId, route: Vec<PropertyLink> },
    ChargingStation { vehicle_id: VehicleId, station_id: StationId, charger_id: ChargerId },
    DispatchBase { vehicle_id: VehicleId, base_id: BaseId, route: Vec<PropertyLink> },
    ReserveBase { vehicle_id: VehicleId, base_id: BaseId },
    ChargingBase { vehicle_id: VehicleId, base_id: BaseId, station_id: StationId, charger_id: ChargerId },
    OutOfService { vehicle_id: VehicleId },
}

/// Data-free tag for `VehicleState`, used for config comparisons (spec §9
/// Open Question (ii): compared as an explicit enum, never a lowercased
/// class-name string).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VehicleStateKind {
    Idle,
    Repositioning,
    DispatchTrip,
    ServicingTrip,
    DispatchStation,
    ChargingStation,
    DispatchBase,
    ReserveBase,
    ChargingBase,
    OutOfService,
}

impl VehicleState {
    pub fn idle(vehicle_id: VehicleId) -> Self {
        VehicleState::Idle { vehicle_id, idle_duration_s: 0 }
    }

    pub fn vehicle_id(&self) -> &VehicleId {
        match self {
            VehicleState::Idle { vehicle_id, .. }
            | VehicleState::Repositioning { vehicle_id, .. }
            | VehicleState::DispatchTrip { vehicle_id, .. }
            | VehicleState::ServicingTrip { vehicle_id, .. }
            | VehicleState::DispatchStation { vehicle_id, .. }
            | VehicleState::ChargingStation { vehicle_id, .. }
            | VehicleState::DispatchBase { vehicle_id, .. }
            | VehicleState::ReserveBase { vehicle_id, .. }
            | VehicleState::ChargingBase { vehicle_id, .. }
            | VehicleState::OutOfService { vehicle_id } => vehicle_id,
        }
    }

    pub fn kind(&self) -> VehicleStateKind {
        match self {
            VehicleState::Idle { .. } => VehicleStateKind::Idle,
            VehicleState::Repositioning { .. } => VehicleStateKind::Repositioning,
            VehicleState::DispatchTrip { .. } => VehicleStateKind::DispatchTrip,
            VehicleState::ServicingTrip { .. } => VehicleStateKind::ServicingTrip,
            VehicleState::DispatchStation { .. } => VehicleStateKind::DispatchStation,
            VehicleState::ChargingStation { .. } => VehicleStateKind::ChargingStation,
            VehicleState::DispatchBase { .. } => VehicleStateKind::DispatchBase,
            VehicleState::ReserveBase { .. } => VehicleStateKind::ReserveBase,
            VehicleState::ChargingBase { .. } => VehicleStateKind::ChargingBase,
            VehicleState::OutOfService { .. } => VehicleStateKind::OutOfService,
        }
    }

    /// Validates preconditions and reserves resources (spec §4.3 `enter`).
    pub fn enter(&self, sim: &SimulationState, env: &Environment) -> TransitionResult {
        match self {
            VehicleState::Idle { vehicle_id, .. } => idle::enter(sim, vehicle_id),
            VehicleState::Repositioning { vehicle_id, route } => repositioning::enter(sim, vehicle_id, route),
            VehicleState::DispatchTrip { vehicle_id, request_id, route } => {
                dispatch_trip::enter(sim, vehicle_id, request_id, route)
            }
            VehicleState::ServicingTrip { vehicle_id, request_id, route, passengers } => {
                servicing_trip::enter(sim, vehicle_id, request_id, route, *passengers)
            }
            VehicleState::DispatchStation { vehicle_id, station_id, charger_id, route } => {
                dispatch_station::enter(sim, vehicle_id, station_id, charger_id, route)
            }
            VehicleState::ChargingStation { vehicle_id, station_id, charger_id } => {
                charging_station::enter(sim, vehicle_id, station_id, charger_id)
            }
            VehicleState::DispatchBase { vehicle_id, base_id, route } => dispatch_base::enter(sim, vehicle_id, base_id, route),
            VehicleState::ReserveBase { vehicle_id, base_id } => reserve_base::enter(sim, vehicle_id, base_id),
            VehicleState::ChargingBase { vehicle_id, base_id, station_id, charger_id } => {
                charging_base::enter(sim, vehicle_id, base_id, station_id, charger_id)
            }
            VehicleState::OutOfService { vehicle_id } => out_of_service::enter(sim, vehicle_id),
        }
    }

    /// Releases resources held by this state (spec §4.3 `exit`).
    pub fn exit(&self, sim: &SimulationState, _env: &Environment) -> TransitionResult {
        match self {
            VehicleState::ChargingStation { station_id, charger_id, .. } => charging_station::exit(sim, station_id, charger_id),
            VehicleState::ChargingBase { base_id, station_id, charger_id, .. } => {
                charging_base::exit(sim, base_id, station_id, charger_id)
            }
            VehicleState::ReserveBase { base_id, .. } => reserve_base::exit(sim, base_id),
            VehicleState::DispatchTrip { .. }
            | VehicleState::ServicingTrip { .. }
            | VehicleState::Idle { .. }
            | VehicleState::Repositioning { .. }
            | VehicleState::DispatchStation { .. }
            | VehicleState::DispatchBase { .. }
            | VehicleState::OutOfService { .. } => Ok(Some(sim.clone())),
        }
    }

    /// Runs one tick (spec §4.3 `update`): terminal-condition check first,
    /// else the variant-specific `_perform_update`.
    pub fn update(&self, sim: &SimulationState, env: &Environment) -> TransitionResult {
        if self.has_reached_terminal_state_condition(sim, env) {
            let after_exit = match self.exit(sim, env)? {
                Some(s) => s,
                None => return Ok(None),
            };
            match self.enter_default_terminal_state(&after_exit, env)? {
                Some((next_sim, next_state)) => apply_new_vehicle_state(&next_sim, next_state),
                None => Ok(Some(after_exit)),
            }
        } else {
            self.perform_update(sim, env)
        }
    }

    fn perform_update(&self, sim: &SimulationState, env: &Environment) -> TransitionResult {
        match self {
            VehicleState::Idle { vehicle_id, idle_duration_s } => idle::perform_update(sim, env, vehicle_id, *idle_duration_s),
            VehicleState::Repositioning { vehicle_id, route } => repositioning::perform_update(sim, env, vehicle_id, route),
            VehicleState::DispatchTrip { vehicle_id, request_id, route } => {
                dispatch_trip::perform_update(sim, env, vehicle_id, request_id, route)
            }
            VehicleState::ServicingTrip { vehicle_id, request_id, route, passengers } => {
                servicing_trip::perform_update(sim, env, vehicle_id, request_id, route, *passengers)
            }
            VehicleState::DispatchStation { vehicle_id, station_id, charger_id, route } => {
                dispatch_station::perform_update(sim, env, vehicle_id, station_id, charger_id, route)
            }
            VehicleState::ChargingStation { vehicle_id, station_id, charger_id } => {
                charging_station::perform_update(sim, env, vehicle_id, station_id, charger_id)
            }
            VehicleState::DispatchBase { vehicle_id, base_id, route } => {
                dispatch_base::perform_update(sim, env, vehicle_id, base_id, route)
            }
            VehicleState::ReserveBase { vehicle_id, .. } => reserve_base::perform_update(sim, vehicle_id),
            VehicleState::ChargingBase { vehicle_id, base_id, station_id, charger_id } => {
                charging_base::perform_update(sim, env, vehicle_id, base_id, station_id, charger_id)
            }
            VehicleState::OutOfService { vehicle_id } => out_of_service::perform_update(sim, vehicle_id),
        }
    }

    fn has_reached_terminal_state_condition(&self, sim: &SimulationState, env: &Environment) -> bool {
        match self {
            VehicleState::Idle { vehicle_id, .. } => idle::has_reached_terminal(sim, env, vehicle_id),
            VehicleState::Repositioning { route, .. } => route.is_empty(),
            VehicleState::DispatchTrip { route, .. } => route.is_empty(),
            VehicleState::ServicingTrip { route, .. } => route.is_empty(),
            VehicleState::DispatchStation { route, .. } => route.is_empty(),
            VehicleState::ChargingStation { vehicle_id, .. } => charging_station::has_reached_terminal(sim, vehicle_id),
            VehicleState::DispatchBase { route, .. } => route.is_empty(),
            VehicleState::ReserveBase { .. } => false,
            VehicleState::ChargingBase { vehicle_id, .. } => charging_base::has_reached_terminal(sim, vehicle_id),
            VehicleState::OutOfService { .. } => false,
        }
    }

    /// Spec §4.3's "default next" column: what the state becomes once
    /// terminal, absent any instruction overriding it this tick.
    fn enter_default_terminal_state(
        &self,
        sim: &SimulationState,
        env: &Environment,
    ) -> Result<Option<(SimulationState, VehicleState)>, SimulationStateError> {
        match self {
            VehicleState::Idle { vehicle_id, .. } => enter_next(sim, env, VehicleState::OutOfService { vehicle_id: vehicle_id.clone() }),
            VehicleState::Repositioning { vehicle_id, .. } => enter_next(sim, env, VehicleState::idle(vehicle_id.clone())),
            VehicleState::DispatchTrip { vehicle_id, request_id, .. } => {
                dispatch_trip::enter_default_terminal_state(sim, env, vehicle_id, request_id)
            }
            VehicleState::ServicingTrip { vehicle_id, request_id, .. } => {
                servicing_trip::enter_default_terminal_state(sim, env, vehicle_id, request_id)
            }
            VehicleState::DispatchStation { vehicle_id, station_id, charger_id, .. } => {
                dispatch_station::enter_default_terminal_state(sim, env, vehicle_id, station_id, charger_id)
            }
            VehicleState::ChargingStation { vehicle_id, .. } => enter_next(sim, env, VehicleState::idle(vehicle_id.clone())),
            VehicleState::DispatchBase { vehicle_id, base_id, .. } => {
                dispatch_base::enter_default_terminal_state(sim, env, vehicle_id, base_id)
            }
            VehicleState::ReserveBase { .. } => Ok(None),
            VehicleState::ChargingBase { vehicle_id, base_id, .. } => {
                enter_next(sim, env, VehicleState::ReserveBase { vehicle_id: vehicle_id.clone(), base_id: base_id.clone() })
            }
            VehicleState::OutOfService { .. } => Ok(None),
        }
    }
}

/// Runs `next_state.enter`, pairing it with the sim it produced (spec §4.3:
/// "chaining its enter"). A silent abort from `enter` collapses to `None`.
fn enter_next(
    sim: &SimulationState,
    env: &Environment,
    next_state: VehicleState,
) -> Result<Option<(SimulationState, VehicleState)>, SimulationStateError> {
    match next_state.enter(sim, env)? {
        Some(entered_sim) => Ok(Some((entered_sim, next_state))),
        None => Ok(None),
    }
}

/// Atomically replaces a vehicle's `vehicle_state` (spec §4.5: "run `exit`
/// on the current state, run `enter` on the next state, atomically replace
/// the state on success").
pub(crate) fn apply_new_vehicle_state(sim: &SimulationState, next_state: VehicleState) -> TransitionResult {
    let vehicle = sim
        .vehicle(next_state.vehicle_id())
        .ok_or_else(|| SimulationStateError::VehicleNotFound(next_state.vehicle_id().clone()))?
        .clone();
    let updated = vehicle.with_vehicle_state(next_state);
    Ok(Some(ops::modify_vehicle(sim, updated)?))
}

/// Shared movement primitive for every route-carrying state (spec §4.3:
/// "Movement states share a `_perform_update` that delegates to
/// RouteTraversal, updates the vehicle's position, debits energy ..., and
/// replaces the state's `route` with the remaining route").
///
/// A `RouteError` is demoted to "no movement this tick" (spec §7) rather
/// than propagated: the sim is returned unchanged and `route` is handed
/// back untouched so the caller's state keeps its original route.
pub(crate) struct MoveOutcome {
    pub sim: SimulationState,
    pub remaining_route: Vec<PropertyLink>,
}

pub(crate) fn move_along_route(
    sim: &SimulationState,
    env: &Environment,
    vehicle_id: &VehicleId,
    route: &[PropertyLink],
) -> Result<MoveOutcome, SimulationStateError> {
    let budget_s = env.config.timestep_duration_seconds as f64;
    let traversal = match crate::routing::traverse(route, sim.road_network.as_ref(), budget_s) {
        Ok(Some(t)) => t,
        Ok(None) => return Ok(MoveOutcome { sim: sim.clone(), remaining_route: route.to_vec() }),
        Err(e) => {
            crate::error::log_tick_error(sim.sim_time, &e);
            return Ok(MoveOutcome { sim: sim.clone(), remaining_route: route.to_vec() });
        }
    };

    let vehicle = sim.vehicle(vehicle_id).ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle_id.clone()))?.clone();
    let new_geoid = traversal.experienced_route.last().map(|l| l.to).unwrap_or(vehicle.geoid);
    let consumed_kwh = traversal.traversal_distance_km * env.config.default_energy_consumption_kwh_per_km;
    let updated = vehicle
        .clone()
        .with_geoid(new_geoid)
        .with_energy_source(vehicle.energy_source.discharge_kwh(consumed_kwh));
    let next_sim = ops::modify_vehicle(sim, updated)?;
    Ok(MoveOutcome { sim: next_sim, remaining_route: traversal.remaining_route })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HiveConfig;
    use crate::entities::{EnergySource, EnergyType, Vehicle};
    use crate::ids::MechatronicsId;
    use crate::routing::HaversineRoadNetwork;
    use h3o::{LatLng, Resolution};
    use std::sync::Arc;

    fn geoid(lat: f64, lon: f64) -> crate::geo::GeoId {
        crate::geo::GeoId(LatLng::new(lat, lon).unwrap().to_cell(Resolution::Nine))
    }

    fn sim_with_idle_vehicle() -> SimulationState {
        let sim = SimulationState::new(Arc::new(HaversineRoadNetwork::default()), 60, Resolution::Nine, Resolution::Six);
        let vehicle = Vehicle::new(
            VehicleId::new("v1"),
            geoid(37.0, -122.0),
            MechatronicsId::new("m1"),
            EnergySource::new(EnergyType::Battery, 50.0, 45.0, 20.0),
        );
        ops::add_vehicle(&sim, vehicle).unwrap()
    }

    #[test]
    fn idle_stepping_accumulates_duration_only_when_stepped() {
        let sim = sim_with_idle_vehicle();
        let env = Environment::new(HiveConfig::default().with_timestep_duration_seconds(60));
        let mut v2_sim = sim.clone();
        for _ in 0..10 {
            let state = v2_sim.vehicle(&VehicleId::new("v1")).unwrap().vehicle_state.clone();
            v2_sim = state.update(&v2_sim, &env).unwrap().unwrap();
        }
        let v2 = v2_sim.vehicle(&VehicleId::new("v1")).unwrap();
        match &v2.vehicle_state {
            VehicleState::Idle { idle_duration_s, .. } => assert_eq!(*idle_duration_s, 600),
            other => panic!("expected Idle, got {other:?}"),
        }
    }

    #[test]
    fn kind_matches_variant() {
        let state = VehicleState::idle(VehicleId::new("v1"));
        assert_eq!(state.kind(), VehicleStateKind::Idle);
    }
}
