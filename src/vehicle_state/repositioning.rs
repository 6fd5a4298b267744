//! `Repositioning` (spec §4.3 table): a movement state with no cargo.
//! Terminal when its route is empty; defaults back to `Idle`.

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::ids::VehicleId;
use crate::routing::PropertyLink;
use crate::state::{ops, SimulationState};

use super::{move_along_route, TransitionResult, VehicleState};

pub(super) fn enter(sim: &SimulationState, vehicle_id: &VehicleId, _route: &[PropertyLink]) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    Ok(Some(sim.clone()))
}

pub(super) fn perform_update(sim: &SimulationState, env: &Environment, vehicle_id: &VehicleId, route: &[PropertyLink]) -> TransitionResult {
    let outcome = move_along_route(sim, env, vehicle_id, route)?;
    let vehicle = outcome
        .sim
        .vehicle(vehicle_id)
        .ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle_id.clone()))?
        .clone();
    let next_state = VehicleState::Repositioning { vehicle_id: vehicle_id.clone(), route: outcome.remaining_route };
    let updated = vehicle.with_vehicle_state(next_state);
    Ok(Some(ops::modify_vehicle(&outcome.sim, updated)?))
}
