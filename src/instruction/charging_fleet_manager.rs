//! `ChargingFleetManager` (spec §4.5): sends low-SOC vehicles to the
//! nearest station with a free compatible charger.
//!
//! No `original_source` file survived for this generator (only `dispatcher.py`
//! did); grounded instead directly on spec §4.5's description and on
//! `Dispatcher`'s membership-free, pure-function shape.

use crate::config::Environment;
use crate::entities::{Station, Vehicle};
use crate::geo;
use crate::ids::{ChargerId, StationId};
use crate::state::SimulationState;
use crate::vehicle_state::VehicleStateKind;

use super::Instruction;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChargingFleetManager;

impl ChargingFleetManager {
    pub fn generate_instructions(&self, sim: &SimulationState, env: &Environment) -> (Self, Vec<Instruction>) {
        let cfg = &env.config.dispatcher;
        let needs_charge = |v: &Vehicle| {
            v.energy_source.low_soc(cfg.charging_low_soc_threshold)
                && matches!(v.state_kind(), VehicleStateKind::Idle | VehicleStateKind::Repositioning)
        };

        let mut instructions = Vec::new();
        for vehicle in sim.get_vehicles(None, Some(&needs_charge)) {
            if let Some((station_id, charger_id)) = nearest_chargeable_station(sim, vehicle, cfg.charging_max_search_radius_km) {
                instructions.push(Instruction::DispatchStation { vehicle_id: vehicle.id.clone(), station_id, charger_id });
            }
        }
        (*self, instructions)
    }
}

/// Nearest station within `max_radius_km` holding a charger with a free
/// stall (spec §4.5: "nearest station ... within charging_max_search_radius_km
/// that has a compatible available charger"). Ties break on `ChargerId`
/// order since `Station::chargers` is a `BTreeMap`.
fn nearest_chargeable_station(sim: &SimulationState, vehicle: &Vehicle, max_radius_km: f64) -> Option<(StationId, ChargerId)> {
    let has_available_charger = |s: &Station| s.chargers.values().any(|stalls| stalls.available > 0);
    let mut best: Option<(StationId, ChargerId, f64)> = None;
    for station in sim.get_stations(None, Some(&has_available_charger)) {
        let distance_km = geo::distance_km(vehicle.geoid, station.geoid);
        if distance_km > max_radius_km {
            continue;
        }
        let Some((charger_id, _)) = station.chargers.iter().find(|(_, stalls)| stalls.available > 0) else {
            continue;
        };
        let better = best.as_ref().map_or(true, |(_, _, best_distance)| distance_km < *best_distance);
        if better {
            best = Some((station.id.clone(), charger_id.clone(), distance_km));
        }
    }
    best.map(|(station_id, charger_id, _)| (station_id, charger_id))
}
