//! `BaseManagement` (spec §4.5): routes long-idle, base-affiliated vehicles
//! home, then moves parked (`ReserveBase`) vehicles onto their base's own
//! charger once low on SOC — the spec §4.3 `ReserveBase → ChargingBase`
//! transition — both capped by how many may charge at once at any one base.
//!
//! No surviving `original_source` file for this generator; grounded on
//! spec §4.5's description and `Dispatcher`'s pure-function shape. The
//! "end-of-shift schedule" half of the spec bullet has no counterpart in
//! this data model (no scheduling entity is in scope, spec §1) and is not
//! implemented; idle-duration routing is.

use std::collections::HashMap;

use crate::config::Environment;
use crate::entities::Vehicle;
use crate::ids::{BaseId, ChargerId, StationId};
use crate::state::SimulationState;
use crate::vehicle_state::{VehicleState, VehicleStateKind};

use super::Instruction;

#[derive(Debug, Clone, Copy, Default)]
pub struct BaseManagement;

impl BaseManagement {
    pub fn generate_instructions(&self, sim: &SimulationState, env: &Environment) -> (Self, Vec<Instruction>) {
        let cfg = &env.config.dispatcher;
        let mut charging_base_counts = count_charging_by_base(sim);

        let is_overdue = |v: &Vehicle| {
            v.driver_state.is_some()
                && matches!(&v.vehicle_state, VehicleState::Idle { idle_duration_s, .. } if *idle_duration_s >= cfg.base_idle_duration_threshold_s)
        };

        let mut instructions = Vec::new();
        for vehicle in sim.get_vehicles(None, Some(&is_overdue)) {
            let Some(base_id) = &vehicle.driver_state else { continue };
            if at_or_over_limit(cfg.base_vehicles_charging_limit, &charging_base_counts, base_id) {
                continue;
            }
            instructions.push(Instruction::DispatchBase { vehicle_id: vehicle.id.clone(), base_id: base_id.clone() });
        }

        let needs_base_charge = |v: &Vehicle| {
            v.state_kind() == VehicleStateKind::ReserveBase && v.energy_source.low_soc(cfg.charging_low_soc_threshold)
        };
        for vehicle in sim.get_vehicles(None, Some(&needs_base_charge)) {
            let VehicleState::ReserveBase { base_id, .. } = &vehicle.vehicle_state else { continue };
            if at_or_over_limit(cfg.base_vehicles_charging_limit, &charging_base_counts, base_id) {
                continue;
            }
            let Some((station_id, charger_id)) = base_station_with_charger(sim, base_id) else { continue };
            *charging_base_counts.entry(base_id.clone()).or_insert(0) += 1;
            instructions.push(Instruction::ChargeBase {
                vehicle_id: vehicle.id.clone(),
                base_id: base_id.clone(),
                station_id,
                charger_id,
            });
        }
        (*self, instructions)
    }
}

fn at_or_over_limit(limit: Option<usize>, charging_base_counts: &HashMap<BaseId, usize>, base_id: &BaseId) -> bool {
    match limit {
        Some(limit) => charging_base_counts.get(base_id).copied().unwrap_or(0) >= limit,
        None => false,
    }
}

/// Vehicles currently in `ChargingBase`, grouped by base (spec §4.5:
/// "a cap bounds simultaneous base-charging").
fn count_charging_by_base(sim: &SimulationState) -> HashMap<BaseId, usize> {
    let mut counts = HashMap::new();
    for vehicle in sim.get_vehicles(None, None) {
        if let VehicleState::ChargingBase { base_id, .. } = &vehicle.vehicle_state {
            *counts.entry(base_id.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// The base's own station and a charger with a free stall, if it has one
/// (spec §4.3 `ChargingBase`: "charging at the base's own station").
fn base_station_with_charger(sim: &SimulationState, base_id: &BaseId) -> Option<(StationId, ChargerId)> {
    let base = sim.base(base_id)?;
    let station_id = base.station_id.clone()?;
    let station = sim.station(&station_id)?;
    let (charger_id, _) = station.chargers.iter().find(|(_, stalls)| stalls.available > 0)?;
    Some((station_id, charger_id.clone()))
}
