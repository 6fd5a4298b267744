//! `ChargingBase` (spec §4.3 table): charging at the base's own station.
//! `enter`/`exit` check out and return the station's charger stall exactly
//! like `ChargingStation`; the base stall itself is handled by `ReserveBase`
//! on either side of this state. Terminal once SOC reaches the ideal
//! limit; defaults back into `ReserveBase`.

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::ids::{BaseId, ChargerId, StationId, VehicleId};
use crate::state::{ops, SimulationState};

use super::TransitionResult;

const UNLIMITED_SUPPLY_KW: f64 = 1.0e6;

pub(super) fn enter(
    sim: &SimulationState,
    vehicle_id: &VehicleId,
    _base_id: &BaseId,
    station_id: &StationId,
    charger_id: &ChargerId,
) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    match ops::checkout_station_stall(sim, station_id, charger_id)? {
        Some(next) => Ok(Some(next)),
        None => Ok(None),
    }
}

pub(super) fn exit(sim: &SimulationState, _base_id: &BaseId, station_id: &StationId, charger_id: &ChargerId) -> TransitionResult {
    Ok(Some(ops::return_station_stall(sim, station_id, charger_id)?))
}

pub(super) fn has_reached_terminal(sim: &SimulationState, vehicle_id: &VehicleId) -> bool {
    sim.vehicle(vehicle_id).is_some_and(|v| v.energy_source.ideal_limit_reached())
}

pub(super) fn perform_update(
    sim: &SimulationState,
    env: &Environment,
    vehicle_id: &VehicleId,
    _base_id: &BaseId,
    _station_id: &StationId,
    _charger_id: &ChargerId,
) -> TransitionResult {
    let vehicle = sim.vehicle(vehicle_id).ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle_id.clone()))?.clone();
    let energy_source = vehicle.energy_source.charge_for(UNLIMITED_SUPPLY_KW, env.config.timestep_duration_seconds);
    let updated = vehicle.with_energy_source(energy_source);
    Ok(Some(ops::modify_vehicle(sim, updated)?))
}
