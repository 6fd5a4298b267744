//! `OutOfService` (spec §4.3 table): stranded or operator-withdrawn.
//! Recovery is only via an operator policy issuing an instruction out of
//! this state — there is no automatic terminal condition or default next.

use crate::error::SimulationStateError;
use crate::ids::VehicleId;
use crate::state::SimulationState;

use super::TransitionResult;

pub(super) fn enter(sim: &SimulationState, vehicle_id: &VehicleId) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    Ok(Some(sim.clone()))
}

pub(super) fn perform_update(sim: &SimulationState, vehicle_id: &VehicleId) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    Ok(Some(sim.clone()))
}
