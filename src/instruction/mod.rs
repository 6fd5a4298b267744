//! Instructions and the generators that emit them (spec §4.5).
//!
//! Grounded on `original_source/hive/dispatcher/instruction_generator/dispatcher.py`
//! (the `(sim, env) → (updated_generator, instructions)` generator
//! signature, membership-scoped assignment) and
//! `original_source/hive/dispatcher/instruction/instruction_result.py`
//! (`InstructionResult{prev_state, next_state}`). An `Instruction` here
//! carries only bound ids; the route a movement state needs is computed
//! once, at apply time, against the current road network (spec §4.5:
//! "route precomputed against the current road network").

pub mod base_management;
pub mod charging_fleet_manager;
pub mod dispatcher;
pub mod repositioning;

pub use base_management::BaseManagement;
pub use charging_fleet_manager::ChargingFleetManager;
pub use dispatcher::Dispatcher;
pub use repositioning::Repositioning;

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::geo::GeoId;
use crate::ids::{BaseId, ChargerId, RequestId, StationId, VehicleId};
use crate::state::SimulationState;
use crate::vehicle_state::{apply_new_vehicle_state, VehicleState};

/// A declarative request to transition one vehicle into a specific next
/// state (spec §4.5).
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    DispatchTrip { vehicle_id: VehicleId, request_id: RequestId },
    DispatchStation { vehicle_id: VehicleId, station_id: StationId, charger_id: ChargerId },
    DispatchBase { vehicle_id: VehicleId, base_id: BaseId },
    /// Moves a `ReserveBase` vehicle straight into `ChargingBase` at its own
    /// base's station (spec §4.3 table: `ChargingBase` terminates back into
    /// `ReserveBase`). No movement is involved — the vehicle already holds
    /// the base stall — so unlike `DispatchBase` this carries no route.
    ChargeBase { vehicle_id: VehicleId, base_id: BaseId, station_id: StationId, charger_id: ChargerId },
    Repositioning { vehicle_id: VehicleId, destination: GeoId },
}

impl Instruction {
    pub fn vehicle_id(&self) -> &VehicleId {
        match self {
            Instruction::DispatchTrip { vehicle_id, .. }
            | Instruction::DispatchStation { vehicle_id, .. }
            | Instruction::DispatchBase { vehicle_id, .. }
            | Instruction::ChargeBase { vehicle_id, .. }
            | Instruction::Repositioning { vehicle_id, .. } => vehicle_id,
        }
    }
}

/// The before/after of one applied instruction (spec §4.5), useful to the
/// reporting layer for vehicle-state-transition events (spec §6).
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionResult {
    pub prev_state: VehicleState,
    pub next_state: VehicleState,
}

/// Target cell the instruction's movement state should route towards.
/// `None` means the target vanished since the instruction was generated
/// (e.g. the request was cancelled this tick) — the instruction is then
/// silently dropped rather than applied against stale data.
fn target_geoid(sim: &SimulationState, instruction: &Instruction) -> Option<GeoId> {
    match instruction {
        Instruction::DispatchTrip { request_id, .. } => sim.request(request_id).map(|r| r.origin),
        Instruction::DispatchStation { station_id, .. } => sim.station(station_id).map(|s| s.geoid),
        Instruction::DispatchBase { base_id, .. } => sim.base(base_id).map(|b| b.geoid),
        Instruction::ChargeBase { base_id, .. } => sim.base(base_id).map(|b| b.geoid),
        Instruction::Repositioning { destination, .. } => Some(*destination),
    }
}

fn to_next_state(sim: &SimulationState, instruction: &Instruction) -> Option<VehicleState> {
    let vehicle = sim.vehicle(instruction.vehicle_id())?;
    let target = target_geoid(sim, instruction)?;
    let route = sim.road_network.route(vehicle.geoid, target).unwrap_or_default();
    Some(match instruction {
        Instruction::DispatchTrip { vehicle_id, request_id } => {
            VehicleState::DispatchTrip { vehicle_id: vehicle_id.clone(), request_id: request_id.clone(), route }
        }
        Instruction::DispatchStation { vehicle_id, station_id, charger_id } => VehicleState::DispatchStation {
            vehicle_id: vehicle_id.clone(),
            station_id: station_id.clone(),
            charger_id: charger_id.clone(),
            route,
        },
        Instruction::DispatchBase { vehicle_id, base_id } => {
            VehicleState::DispatchBase { vehicle_id: vehicle_id.clone(), base_id: base_id.clone(), route }
        }
        Instruction::ChargeBase { vehicle_id, base_id, station_id, charger_id } => VehicleState::ChargingBase {
            vehicle_id: vehicle_id.clone(),
            base_id: base_id.clone(),
            station_id: station_id.clone(),
            charger_id: charger_id.clone(),
        },
        Instruction::Repositioning { vehicle_id, .. } => VehicleState::Repositioning { vehicle_id: vehicle_id.clone(), route },
    })
}

/// Applies `instructions` in order (spec §4.5: "later instructions for the
/// same vehicle override earlier ones in the current tick" — each
/// application runs `exit` on whatever state the vehicle currently holds,
/// so a later instruction simply layers its own exit/enter on top of an
/// earlier one's result).
///
/// Any instruction whose vehicle, target, or resource has become invalid
/// since generation is dropped silently rather than surfaced as an error
/// (spec §7's "silent abort" contract extends to stale instructions).
pub fn apply_instructions(
    sim: &SimulationState,
    env: &Environment,
    instructions: &[Instruction],
) -> Result<(SimulationState, Vec<InstructionResult>), SimulationStateError> {
    let mut current = sim.clone();
    let mut results = Vec::new();
    for instruction in instructions {
        if let Some((next_sim, result)) = apply_one(&current, env, instruction)? {
            current = next_sim;
            results.push(result);
        }
    }
    Ok((current, results))
}

fn apply_one(
    sim: &SimulationState,
    env: &Environment,
    instruction: &Instruction,
) -> Result<Option<(SimulationState, InstructionResult)>, SimulationStateError> {
    let Some(vehicle) = sim.vehicle(instruction.vehicle_id()) else {
        return Ok(None);
    };
    let prev_state = vehicle.vehicle_state.clone();
    let Some(next_state) = to_next_state(sim, instruction) else {
        return Ok(None);
    };

    let after_exit = match prev_state.exit(sim, env)? {
        Some(s) => s,
        None => return Ok(None),
    };
    let entered = match next_state.enter(&after_exit, env)? {
        Some(s) => s,
        None => return Ok(None),
    };
    match apply_new_vehicle_state(&entered, next_state.clone())? {
        Some(applied) => Ok(Some((applied, InstructionResult { prev_state, next_state }))),
        None => Ok(None),
    }
}
