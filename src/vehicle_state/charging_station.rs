//! `ChargingStation` (spec §4.3 table): occupying a charger stall at a
//! station. `enter` checks out the stall (silent abort if none free,
//! spec §5); `exit` returns it. Terminal once SOC reaches the energy
//! source's ideal limit; defaults back to `Idle`.

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::ids::{ChargerId, StationId, VehicleId};
use crate::state::{ops, SimulationState};

use super::TransitionResult;

/// Chargers aren't individually rate-limited in spec §3's data model; the
/// station is assumed able to supply whatever the vehicle can accept, so
/// `EnergySource::max_charge_acceptance_kw` is the real limiting factor
/// (spec §4.3: "advance the energy source via the charger's power curve").
const UNLIMITED_SUPPLY_KW: f64 = 1.0e6;

pub(super) fn enter(sim: &SimulationState, vehicle_id: &VehicleId, station_id: &StationId, charger_id: &ChargerId) -> TransitionResult {
    if sim.vehicle(vehicle_id).is_none() {
        return Err(SimulationStateError::VehicleNotFound(vehicle_id.clone()));
    }
    match ops::checkout_station_stall(sim, station_id, charger_id)? {
        Some(next) => Ok(Some(next)),
        None => Ok(None),
    }
}

pub(super) fn exit(sim: &SimulationState, station_id: &StationId, charger_id: &ChargerId) -> TransitionResult {
    Ok(Some(ops::return_station_stall(sim, station_id, charger_id)?))
}

pub(super) fn has_reached_terminal(sim: &SimulationState, vehicle_id: &VehicleId) -> bool {
    sim.vehicle(vehicle_id).is_some_and(|v| v.energy_source.ideal_limit_reached())
}

pub(super) fn perform_update(
    sim: &SimulationState,
    env: &Environment,
    vehicle_id: &VehicleId,
    _station_id: &StationId,
    _charger_id: &ChargerId,
) -> TransitionResult {
    let vehicle = sim.vehicle(vehicle_id).ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle_id.clone()))?.clone();
    let energy_source = vehicle.energy_source.charge_for(UNLIMITED_SUPPLY_KW, env.config.timestep_duration_seconds);
    let updated = vehicle.with_energy_source(energy_source);
    Ok(Some(ops::modify_vehicle(sim, updated)?))
}
