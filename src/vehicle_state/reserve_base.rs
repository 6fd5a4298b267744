//! `ReserveBase` (spec §4.3 table): parked at a base, holding one of its
//! stalls. No terminal condition of its own — it changes only via an
//! external instruction (e.g. `BaseManagement` routing it to a charger, or
//! `Dispatcher` sending it back out).

use crate::error::SimulationStateError;
use crate::ids::{BaseId, VehicleId};
use crate::state::{ops, SimulationState};

use super::TransitionResult;

pub(super) fn enter(sim: &SimulationState, vehicle_id: &VehicleId, base_id: &BaseId) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    match ops::checkout_base_stall(sim, base_id)? {
        Some(next) => Ok(Some(next)),
        None => Ok(None),
    }
}

pub(super) fn exit(sim: &SimulationState, base_id: &BaseId) -> TransitionResult {
    Ok(Some(ops::return_base_stall(sim, base_id)?))
}

pub(super) fn perform_update(sim: &SimulationState, vehicle_id: &VehicleId) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    Ok(Some(sim.clone()))
}
