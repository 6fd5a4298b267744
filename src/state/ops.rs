//! Transactional ops on [`SimulationState`] (spec §4.2).
//!
//! Grounded on `original_source/hive/state/simulation_state/simulation_state.py`
//! and the `simulation_state_ops` module it delegates to from
//! `dispatch_trip.py` (`modify_request`, `modify_vehicle`): every op takes
//! `&SimulationState` and returns `Result<SimulationState, SimulationStateError>`
//! — on `Err`, the caller still holds the pre-op state, since nothing here
//! mutates in place. Composite ops (`link_home_base`, the charger/stall
//! checkout helpers) short-circuit on the first failing sub-op with `?`,
//! which is exactly spec §4.2's "the state returned is the one before the
//! composite op" — `?` never returns a partially-applied clone because no
//! clone is reassigned into the caller until every sub-op has succeeded.

use crate::entities::{Base, Request, Station, Vehicle};
use crate::error::SimulationStateError;
use crate::ids::{synthesize_private_membership, BaseId, ChargerId, RequestId, StationId, VehicleId};

use super::SimulationState;

pub fn add_vehicle(sim: &SimulationState, vehicle: Vehicle) -> Result<SimulationState, SimulationStateError> {
    if sim.vehicles.contains_key(&vehicle.id) {
        return Err(SimulationStateError::DuplicateVehicle(vehicle.id));
    }
    let mut next = sim.clone();
    next.vehicle_index.insert(vehicle.geoid, vehicle.id.clone());
    next.vehicle_iterator.push(vehicle.id.clone());
    next.vehicles.insert(vehicle.id.clone(), vehicle);
    Ok(next)
}

/// Queues `request` for later admission once `request.departure_time`
/// arrives (spec §2 step 1), rather than adding it to the active map
/// directly. `step::admit_and_cancel_requests` drains this queue each tick.
pub fn queue_request(sim: &SimulationState, request: Request) -> Result<SimulationState, SimulationStateError> {
    if sim.requests.contains_key(&request.id) || sim.pending_requests.iter().any(|r| r.id == request.id) {
        return Err(SimulationStateError::DuplicateRequest(request.id));
    }
    let mut next = sim.clone();
    next.pending_requests.push(request);
    Ok(next)
}

pub fn add_request(sim: &SimulationState, request: Request) -> Result<SimulationState, SimulationStateError> {
    if sim.requests.contains_key(&request.id) {
        return Err(SimulationStateError::DuplicateRequest(request.id));
    }
    let mut next = sim.clone();
    next.request_index.insert(request.origin, request.id.clone());
    next.request_iterator.push(request.id.clone());
    next.requests.insert(request.id.clone(), request);
    Ok(next)
}

pub fn add_station(sim: &SimulationState, station: Station) -> Result<SimulationState, SimulationStateError> {
    if sim.stations.contains_key(&station.id) {
        return Err(SimulationStateError::DuplicateStation(station.id));
    }
    let mut next = sim.clone();
    next.station_index.insert(station.geoid, station.id.clone());
    next.station_iterator.push(station.id.clone());
    next.stations.insert(station.id.clone(), station);
    Ok(next)
}

pub fn add_base(sim: &SimulationState, base: Base) -> Result<SimulationState, SimulationStateError> {
    if sim.bases.contains_key(&base.id) {
        return Err(SimulationStateError::DuplicateBase(base.id));
    }
    let mut next = sim.clone();
    next.base_index.insert(base.geoid, base.id.clone());
    next.base_iterator.push(base.id.clone());
    next.bases.insert(base.id.clone(), base);
    Ok(next)
}

/// Replaces the vehicle, relocating the spatial index in one step if
/// `geoid` changed (spec §4.2 `modify_*`).
pub fn modify_vehicle(sim: &SimulationState, vehicle: Vehicle) -> Result<SimulationState, SimulationStateError> {
    let prior = sim.vehicles.get(&vehicle.id).ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle.id.clone()))?;
    let mut next = sim.clone();
    if prior.geoid != vehicle.geoid {
        next.vehicle_index.relocate(prior.geoid, vehicle.geoid, &vehicle.id);
    }
    next.vehicles.insert(vehicle.id.clone(), vehicle);
    Ok(next)
}

pub fn modify_request(sim: &SimulationState, request: Request) -> Result<SimulationState, SimulationStateError> {
    let prior = sim.requests.get(&request.id).ok_or_else(|| SimulationStateError::RequestNotFound(request.id.clone()))?;
    let mut next = sim.clone();
    if prior.origin != request.origin {
        next.request_index.relocate(prior.origin, request.origin, &request.id);
    }
    next.requests.insert(request.id.clone(), request);
    Ok(next)
}

pub fn modify_station(sim: &SimulationState, station: Station) -> Result<SimulationState, SimulationStateError> {
    if !sim.stations.contains_key(&station.id) {
        return Err(SimulationStateError::StationNotFound(station.id));
    }
    let mut next = sim.clone();
    next.stations.insert(station.id.clone(), station);
    Ok(next)
}

pub fn modify_base(sim: &SimulationState, base: Base) -> Result<SimulationState, SimulationStateError> {
    if !sim.bases.contains_key(&base.id) {
        return Err(SimulationStateError::BaseNotFound(base.id));
    }
    let mut next = sim.clone();
    next.bases.insert(base.id.clone(), base);
    Ok(next)
}

pub fn remove_vehicle(sim: &SimulationState, id: &VehicleId) -> Result<SimulationState, SimulationStateError> {
    let vehicle = sim.vehicles.get(id).ok_or_else(|| SimulationStateError::VehicleNotFound(id.clone()))?;
    let mut next = sim.clone();
    next.vehicle_index.remove(vehicle.geoid, id);
    next.vehicle_iterator.retain(|v| v != id);
    next.vehicles.remove(id);
    Ok(next)
}

pub fn remove_request(sim: &SimulationState, id: &RequestId) -> Result<SimulationState, SimulationStateError> {
    let request = sim.requests.get(id).ok_or_else(|| SimulationStateError::RequestNotFound(id.clone()))?;
    let mut next = sim.clone();
    next.request_index.remove(request.origin, id);
    next.request_iterator.retain(|r| r != id);
    next.requests.remove(id);
    Ok(next)
}

pub fn remove_station(sim: &SimulationState, id: &StationId) -> Result<SimulationState, SimulationStateError> {
    let station = sim.stations.get(id).ok_or_else(|| SimulationStateError::StationNotFound(id.clone()))?;
    let mut next = sim.clone();
    next.station_index.remove(station.geoid, id);
    next.station_iterator.retain(|s| s != id);
    next.stations.remove(id);
    Ok(next)
}

pub fn remove_base(sim: &SimulationState, id: &BaseId) -> Result<SimulationState, SimulationStateError> {
    let base = sim.bases.get(id).ok_or_else(|| SimulationStateError::BaseNotFound(id.clone()))?;
    let mut next = sim.clone();
    next.base_index.remove(base.geoid, id);
    next.base_iterator.retain(|b| b != id);
    next.bases.remove(id);
    Ok(next)
}

/// Checks a charger stall out at `station_id` and returns the updated sim,
/// or `Ok(None)` if no stall is free — the "silent abort" spec §5/§7 calls
/// for rather than an error (enter then falls through to Idle).
pub fn checkout_station_stall(
    sim: &SimulationState,
    station_id: &StationId,
    charger_id: &ChargerId,
) -> Result<Option<SimulationState>, SimulationStateError> {
    let station = sim.stations.get(station_id).ok_or_else(|| SimulationStateError::StationNotFound(station_id.clone()))?;
    match station.clone().checkout_stall(charger_id) {
        Some(updated) => Ok(Some(modify_station(sim, updated)?)),
        None => Ok(None),
    }
}

pub fn return_station_stall(
    sim: &SimulationState,
    station_id: &StationId,
    charger_id: &ChargerId,
) -> Result<SimulationState, SimulationStateError> {
    let station = sim.stations.get(station_id).ok_or_else(|| SimulationStateError::StationNotFound(station_id.clone()))?;
    let updated = station.clone().return_stall(charger_id);
    modify_station(sim, updated)
}

pub fn checkout_base_stall(sim: &SimulationState, base_id: &BaseId) -> Result<Option<SimulationState>, SimulationStateError> {
    let base = sim.bases.get(base_id).ok_or_else(|| SimulationStateError::BaseNotFound(base_id.clone()))?;
    match base.clone().checkout_stall() {
        Some(updated) => Ok(Some(modify_base(sim, updated)?)),
        None => Ok(None),
    }
}

pub fn return_base_stall(sim: &SimulationState, base_id: &BaseId) -> Result<SimulationState, SimulationStateError> {
    let base = sim.bases.get(base_id).ok_or_else(|| SimulationStateError::BaseNotFound(base_id.clone()))?;
    let updated = base.clone().return_stall();
    modify_base(sim, updated)
}

/// Synthesizes and applies the private home-base membership token (spec §3,
/// SPEC_FULL §B) to a vehicle, its home base, and (if present) the base's
/// station, so dispatch can be scoped to that one vehicle/base pair.
pub fn link_home_base(sim: &SimulationState, vehicle_id: &VehicleId, base_id: &BaseId) -> Result<SimulationState, SimulationStateError> {
    let token = synthesize_private_membership(vehicle_id, base_id);

    let vehicle = sim.vehicles.get(vehicle_id).ok_or_else(|| SimulationStateError::VehicleNotFound(vehicle_id.clone()))?.clone();
    let base = sim.bases.get(base_id).ok_or_else(|| SimulationStateError::BaseNotFound(base_id.clone()))?.clone();

    let mut vehicle = vehicle;
    vehicle.membership.insert(token.clone());
    let mut next = modify_vehicle(sim, vehicle)?;

    let mut base = base;
    base.membership.insert(token.clone());
    let station_id = base.station_id.clone();
    next = modify_base(&next, base)?;

    if let Some(station_id) = station_id {
        if let Some(station) = next.station(&station_id).cloned() {
            let mut station = station;
            station.membership.insert(token);
            next = modify_station(&next, station)?;
        }
    }

    Ok(next)
}
