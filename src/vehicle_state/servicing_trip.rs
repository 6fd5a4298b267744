//! `ServicingTrip` (spec §4.3 table): carrying passengers to `request`'s
//! destination. Terminal when the route empties, at which point the trip is
//! complete: the request is removed from the sim (fare collected) and the
//! vehicle defaults to `Idle`.

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::ids::{RequestId, VehicleId};
use crate::routing::PropertyLink;
use crate::state::{ops, SimulationState};

use super::{move_along_route, TransitionResult, VehicleState};

pub(super) fn enter(sim: &SimulationState, vehicle_id: &VehicleId, _request_id: &RequestId, _route: &[PropertyLink], _passengers: u32) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    Ok(Some(sim.clone()))
}

pub(super) fn perform_update(
    sim: &SimulationState,
    env: &Environment,
    vehicle_id: &VehicleId,
    request_id: &RequestId,
    route: &[PropertyLink],
    passengers: u32,
) -> TransitionResult {
    let outcome = move_along_route(sim, env, vehicle_id, route)?;
    let vehicle = outcome
        .sim
        .vehicle(vehicle_id)
        .ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle_id.clone()))?
        .clone();
    let next_state = VehicleState::ServicingTrip {
        vehicle_id: vehicle_id.clone(),
        request_id: request_id.clone(),
        route: outcome.remaining_route,
        passengers,
    };
    let updated = vehicle.with_vehicle_state(next_state);
    Ok(Some(ops::modify_vehicle(&outcome.sim, updated)?))
}

pub(super) fn enter_default_terminal_state(
    sim: &SimulationState,
    env: &Environment,
    vehicle_id: &VehicleId,
    request_id: &RequestId,
) -> Result<Option<(SimulationState, VehicleState)>, SimulationStateError> {
    let sim_after_fare = match sim.request(request_id) {
        Some(_) => ops::remove_request(sim, request_id)?,
        None => sim.clone(),
    };
    let next_state = VehicleState::idle(vehicle_id.clone());
    match next_state.enter(&sim_after_fare, env)? {
        Some(entered_sim) => Ok(Some((entered_sim, next_state))),
        None => Ok(None),
    }
}
