//! The tick loop (spec §2, §4.7): update → instruction → apply → vehicle
//! step → time step, run once per [`step`] call.
//!
//! Grounded on the teacher's `runner.rs` (`run_next_event`/`run_until_empty`,
//! a driver loop living outside the systems it calls, plus a `*_with_hook`
//! variant for post-step observation) generalized from "pop one event off a
//! clock heap and run the matching systems" to "run all five fixed phases,
//! in order, every tick" — spec §4.7's REDESIGN FLAG replaces the original's
//! variable-interval event queue with this fixed five-phase loop.

use crate::config::Environment;
use crate::error::SimulationStateError;
use crate::ids::VehicleId;
use crate::instruction::{apply_instructions, BaseManagement, ChargingFleetManager, Dispatcher, Instruction, Repositioning};
use crate::reporting::{self, ReportHandler};
use crate::state::{ops, SimulationState};

/// The four `InstructionGenerator`s bundled together (spec §4.5), run in a
/// fixed priority order each instruction step: `Dispatcher` (trip
/// assignment) first, then `ChargingFleetManager` (low-SOC safety), then
/// `BaseManagement` (end-of-idle return), then `Repositioning` last so it
/// never overrides an instruction a higher-priority generator already gave
/// the same vehicle (spec §2 step 2: "the later overrides the earlier for
/// the same vehicle").
#[derive(Debug, Clone, Default)]
pub struct Generators {
    pub dispatcher: Dispatcher,
    pub charging_fleet_manager: ChargingFleetManager,
    pub base_management: BaseManagement,
    pub repositioning: Repositioning,
}

impl Generators {
    fn generate_instructions(&self, sim: &SimulationState, env: &Environment) -> (Self, Vec<Instruction>) {
        let (dispatcher, mut instructions) = self.dispatcher.generate_instructions(sim, env);
        let (charging_fleet_manager, mut more) = self.charging_fleet_manager.generate_instructions(sim, env);
        instructions.append(&mut more);
        let (base_management, mut more) = self.base_management.generate_instructions(sim, env);
        instructions.append(&mut more);
        let (repositioning, mut more) = self.repositioning.generate_instructions(sim, env);
        instructions.append(&mut more);
        (Self { dispatcher, charging_fleet_manager, base_management, repositioning }, instructions)
    }
}

/// Runs one tick's five phases (spec §2) and returns the advanced state
/// plus the generators' next (possibly updated) selves.
pub fn step(
    sim: &SimulationState,
    env: &Environment,
    generators: Generators,
    mut report_handler: Option<&mut dyn ReportHandler>,
) -> Result<(SimulationState, Generators), SimulationStateError> {
    let mut current = admit_and_cancel_requests(sim, report_handler.as_deref_mut())?;

    let (next_generators, instructions) = generators.generate_instructions(&current, env);

    let (after_apply, results) = apply_instructions(&current, env, &instructions)?;
    current = after_apply;
    if let Some(handler) = report_handler.as_deref_mut() {
        reporting::report_instruction_results(handler, current.sim_time, &results);
    }

    current = step_all_vehicles(&current, env, report_handler.as_deref_mut())?;

    current = current.advance_time();
    if let Some(handler) = report_handler.as_deref_mut() {
        reporting::report_tick_stats(handler, &current);
        reporting::report_station_load(handler, &current);
    }

    Ok((current, next_generators))
}

/// Runs `step` until `sim.sim_time >= env.config.end_time_seconds` (spec
/// §5 "the simulation terminates when `sim_time ≥ end_time_seconds`"),
/// generalizing the teacher's `run_until_empty`'s "drive to exhaustion"
/// shape from an event queue to a fixed time bound.
pub fn run_until_end(
    sim: &SimulationState,
    env: &Environment,
    mut generators: Generators,
    mut report_handler: Option<&mut dyn ReportHandler>,
) -> Result<SimulationState, SimulationStateError> {
    let mut current = sim.clone();
    while current.sim_time.seconds() < env.config.end_time_seconds {
        let (next_sim, next_generators) = step(&current, env, generators, report_handler.as_deref_mut())?;
        current = next_sim;
        generators = next_generators;
    }
    Ok(current)
}

/// Advances exactly one vehicle, leaving every other vehicle untouched
/// (spec §4.7 supplement, SPEC_FULL §B). Mirrors the original's
/// `step_vehicle(sim, env, vehicle_id)` test helper: useful for isolating
/// one vehicle's state-machine behavior without running a full tick.
pub fn step_vehicle(sim: &SimulationState, env: &Environment, vehicle_id: &VehicleId) -> Result<SimulationState, SimulationStateError> {
    let Some(vehicle) = sim.vehicle(vehicle_id) else {
        return Ok(sim.clone());
    };
    let prev_state = vehicle.vehicle_state.clone();
    match prev_state.update(sim, env)? {
        Some(next_sim) => Ok(next_sim),
        None => Ok(sim.clone()),
    }
}

/// Phase 1 (spec §2 step 1): admits every pending request whose
/// `departure_time ≤ sim_time` into the active map, then cancels every
/// active or still-pending request whose `cancel_time ≤ sim_time`. A
/// request that matures past its own cancel time before ever being
/// admitted is dropped without ever entering the active map.
fn admit_and_cancel_requests(
    sim: &SimulationState,
    mut report_handler: Option<&mut dyn ReportHandler>,
) -> Result<SimulationState, SimulationStateError> {
    let sim_time = sim.sim_time;
    let mut current = sim.clone();

    let (mature, still_pending): (Vec<_>, Vec<_>) =
        current.pending_requests().iter().cloned().partition(|r| r.should_be_admitted(sim_time));
    current.pending_requests = still_pending;

    for request in mature {
        if request.should_be_cancelled(sim_time) {
            continue;
        }
        let request_id = request.id.clone();
        current = ops::add_request(&current, request)?;
        if let Some(handler) = report_handler.as_deref_mut() {
            reporting::report_request_created(handler, sim_time, request_id);
        }
    }

    let is_expired = |r: &crate::entities::Request| r.should_be_cancelled(sim_time);
    let expired: Vec<crate::ids::RequestId> =
        current.get_requests(None, Some(&is_expired), false).into_iter().map(|r| r.id.clone()).collect();
    for request_id in expired {
        current = ops::remove_request(&current, &request_id)?;
        if let Some(handler) = report_handler.as_deref_mut() {
            reporting::report_request_cancelled(handler, sim_time, request_id);
        }
    }

    Ok(current)
}

/// Phase 4 (spec §2 step 4): runs every vehicle's per-tick `update` in
/// deterministic iteration order. A vehicle transitioning out of
/// `ServicingTrip` whose request has vanished (the fare was just collected
/// in `enter_default_terminal_state`) emits a `RequestServiced` report; any
/// other state-kind change emits a `VehicleStateTransition` report.
fn step_all_vehicles(
    sim: &SimulationState,
    env: &Environment,
    mut report_handler: Option<&mut dyn ReportHandler>,
) -> Result<SimulationState, SimulationStateError> {
    let mut current = sim.clone();
    let vehicle_ids: Vec<VehicleId> = current.get_vehicles(None, None).into_iter().map(|v| v.id.clone()).collect();

    for vehicle_id in vehicle_ids {
        let Some(vehicle) = current.vehicle(&vehicle_id) else { continue };
        let prev_state = vehicle.vehicle_state.clone();
        let serviced_request = match &prev_state {
            crate::vehicle_state::VehicleState::ServicingTrip { request_id, .. } if current.request(request_id).is_some() => {
                Some(request_id.clone())
            }
            _ => None,
        };

        match prev_state.update(&current, env) {
            Ok(Some(next_sim)) => {
                current = next_sim;
                if let Some(next_state) = current.vehicle(&vehicle_id).map(|v| v.vehicle_state.clone()) {
                    if next_state.kind() != prev_state.kind() {
                        if let Some(handler) = report_handler.as_deref_mut() {
                            reporting::report_instruction_results(
                                handler,
                                current.sim_time,
                                &[crate::instruction::InstructionResult { prev_state: prev_state.clone(), next_state }],
                            );
                        }
                    }
                }
                if let Some(request_id) = serviced_request {
                    if current.request(&request_id).is_none() {
                        if let Some(handler) = report_handler.as_deref_mut() {
                            reporting::report_request_serviced(handler, current.sim_time, request_id, vehicle_id.clone());
                        }
                    }
                }
            }
            Ok(None) => {}
            Err(err) => crate::error::log_tick_error(current.sim_time, &err),
        }
    }

    Ok(current)
}
