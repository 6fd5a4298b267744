//! `DispatchTrip` (spec §4.3 table / `original_source`'s `dispatch_trip.py`):
//! en-route to pick up a request. `enter` marks the request dispatched;
//! a request that vanished before pickup (cancelled, or already claimed) is
//! a silent abort, not an error, matching the Python source exactly.

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::ids::{RequestId, VehicleId};
use crate::routing::PropertyLink;
use crate::state::{ops, SimulationState};

use super::{move_along_route, TransitionResult, VehicleState};

pub(super) fn enter(sim: &SimulationState, vehicle_id: &VehicleId, request_id: &RequestId, _route: &[PropertyLink]) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    let request = match sim.request(request_id) {
        Some(r) => r.clone(),
        None => return Ok(None),
    };
    let updated_request = request.assign_dispatched_vehicle(vehicle_id.clone(), sim.sim_time);
    Ok(Some(ops::modify_request(sim, updated_request)?))
}

pub(super) fn perform_update(
    sim: &SimulationState,
    env: &Environment,
    vehicle_id: &VehicleId,
    request_id: &RequestId,
    route: &[PropertyLink],
) -> TransitionResult {
    let outcome = move_along_route(sim, env, vehicle_id, route)?;
    let vehicle = outcome
        .sim
        .vehicle(vehicle_id)
        .ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle_id.clone()))?
        .clone();
    let next_state =
        VehicleState::DispatchTrip { vehicle_id: vehicle_id.clone(), request_id: request_id.clone(), route: outcome.remaining_route };
    let updated = vehicle.with_vehicle_state(next_state);
    Ok(Some(ops::modify_vehicle(&outcome.sim, updated)?))
}

pub(super) fn enter_default_terminal_state(
    sim: &SimulationState,
    env: &Environment,
    vehicle_id: &VehicleId,
    request_id: &RequestId,
) -> Result<Option<(SimulationState, VehicleState)>, SimulationStateError> {
    let request = sim.request(request_id).cloned();
    let co_located = sim.vehicle_at_request(vehicle_id, request_id);

    let next_state = match (&request, co_located) {
        (Some(request), true) => VehicleState::ServicingTrip {
            vehicle_id: vehicle_id.clone(),
            request_id: request_id.clone(),
            route: sim.road_network.route(request.origin, request.destination).unwrap_or_default(),
            passengers: request.passengers,
        },
        _ => VehicleState::idle(vehicle_id.clone()),
    };

    match next_state.enter(sim, env)? {
        Some(entered_sim) => Ok(Some((entered_sim, next_state))),
        None => Ok(None),
    }
}
