//! `DispatchStation` (spec §4.3 table): en-route to a charger. Terminal
//! when the route empties; defaults to `ChargingStation` if the charger
//! stall is still obtainable, else falls back to `Idle`.

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::ids::{ChargerId, StationId, VehicleId};
use crate::routing::PropertyLink;
use crate::state::{ops, SimulationState};

use super::{move_along_route, TransitionResult, VehicleState};

pub(super) fn enter(
    sim: &SimulationState,
    vehicle_id: &VehicleId,
    _station_id: &StationId,
    _charger_id: &ChargerId,
    _route: &[PropertyLink],
) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    Ok(Some(sim.clone()))
}

pub(super) fn perform_update(
    sim: &SimulationState,
    env: &Environment,
    vehicle_id: &VehicleId,
    station_id: &StationId,
    charger_id: &ChargerId,
    route: &[PropertyLink],
) -> TransitionResult {
    let outcome = move_along_route(sim, env, vehicle_id, route)?;
    let vehicle = outcome
        .sim
        .vehicle(vehicle_id)
        .ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle_id.clone()))?
        .clone();
    let next_state = VehicleState::DispatchStation {
        vehicle_id: vehicle_id.clone(),
        station_id: station_id.clone(),
        charger_id: charger_id.clone(),
        route: outcome.remaining_route,
    };
    let updated = vehicle.with_vehicle_state(next_state);
    Ok(Some(ops::modify_vehicle(&outcome.sim, updated)?))
}

pub(super) fn enter_default_terminal_state(
    sim: &SimulationState,
    env: &Environment,
    vehicle_id: &VehicleId,
    station_id: &StationId,
    charger_id: &ChargerId,
) -> Result<Option<(SimulationState, VehicleState)>, SimulationStateError> {
    let charging = VehicleState::ChargingStation {
        vehicle_id: vehicle_id.clone(),
        station_id: station_id.clone(),
        charger_id: charger_id.clone(),
    };
    match charging.enter(sim, env)? {
        Some(entered_sim) => Ok(Some((entered_sim, charging))),
        None => {
            let idle = VehicleState::idle(vehicle_id.clone());
            match idle.enter(sim, env)? {
                Some(entered_sim) => Ok(Some((entered_sim, idle))),
                None => Ok(None),
            }
        }
    }
}
