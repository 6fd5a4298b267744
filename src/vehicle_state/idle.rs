//! `Idle` (spec §4.3 table): accumulates idle duration and draws the flat
//! idle energy rate each tick; terminal once SOC drops below the critical
//! floor, defaulting to `OutOfService`.

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::ids::VehicleId;
use crate::state::{ops, SimulationState};

use super::{TransitionResult, VehicleState};

pub(super) fn enter(sim: &SimulationState, vehicle_id: &VehicleId) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    Ok(Some(sim.clone()))
}

pub(super) fn has_reached_terminal(sim: &SimulationState, env: &Environment, vehicle_id: &VehicleId) -> bool {
    sim.vehicle(vehicle_id).is_some_and(|v| v.energy_source.low_soc(env.config.critical_low_soc_threshold))
}

pub(super) fn perform_update(sim: &SimulationState, env: &Environment, vehicle_id: &VehicleId, idle_duration_s: u64) -> TransitionResult {
    let vehicle = sim.vehicle(vehicle_id).ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle_id.clone()))?.clone();

    let timestep = env.config.timestep_duration_seconds;
    let idle_kwh = env.config.idle_energy_rate_kwh_per_hour * (timestep as f64 / 3600.0);
    let energy_source = vehicle.energy_source.discharge_kwh(idle_kwh);

    let next_state = VehicleState::Idle { vehicle_id: vehicle_id.clone(), idle_duration_s: idle_duration_s + timestep };
    let updated = vehicle.with_energy_source(energy_source).with_vehicle_state(next_state);
    Ok(Some(ops::modify_vehicle(sim, updated)?))
}
