//! Report emission (spec §6): an append-only newline-delimited JSON event
//! log, each record tagged with `report_type` and `sim_time`.
//!
//! Grounded on `original_source/hive/reporting/reporter.py` (an abstract
//! `Reporter.report(sim_state, instructions, reports)`) and
//! `detailed_reporter.py`'s `DetailedReporter` (per-entity JSON-per-line
//! records via `json.dumps(entity._asdict(), default=str)`, written through
//! Python `logging` file handlers). Re-expressed as a `ReportHandler` trait
//! plus one `serde_json`-backed implementation rather than multiple named
//! loggers: `NdjsonReportHandler` writes every report through a single
//! `io::Write` sink instead of `DetailedReporter`'s separate run/vehicle/
//! request log files, since nothing downstream of this crate demultiplexes
//! by file.

use std::io::{self, Write};

use serde::Serialize;

use crate::ids::{ChargerId, RequestId, StationId, VehicleId};
use crate::instruction::InstructionResult;
use crate::state::SimulationState;
use crate::time::SimTime;
use crate::vehicle_state::VehicleStateKind;

/// One event-log record (spec §6 "Recognized report types"). `#[serde(tag =
/// "report_type")]` gives every serialized record a `report_type` discriminant
/// alongside its `sim_time` and payload fields, matching the spec's record
/// shape without a separate wrapper struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "report_type", rename_all = "snake_case")]
pub enum Report {
    VehicleStateTransition {
        sim_time: SimTime,
        vehicle_id: VehicleId,
        prev_state: VehicleStateKind,
        next_state: VehicleStateKind,
    },
    RequestCreated {
        sim_time: SimTime,
        request_id: RequestId,
    },
    RequestCancelled {
        sim_time: SimTime,
        request_id: RequestId,
    },
    RequestServiced {
        sim_time: SimTime,
        request_id: RequestId,
        vehicle_id: VehicleId,
    },
    StationLoad {
        sim_time: SimTime,
        station_id: StationId,
        charger_id: ChargerId,
        stalls_available: u32,
        stalls_total: u32,
    },
    TickStats {
        sim_time: SimTime,
        vehicle_count: usize,
        active_request_count: usize,
        idle_vehicle_count: usize,
    },
}

/// A sink for `Report` records (spec §6 output contract). Generalizes the
/// original's abstract `Reporter.report` into one record at a time, so a
/// caller can interleave records from several sources (vehicle transitions,
/// request lifecycle, per-tick aggregates) without batching them first.
pub trait ReportHandler {
    fn handle(&mut self, report: &Report);
}

/// Writes one JSON object per line to an arbitrary `io::Write` sink (spec
/// §6: "an append-only newline-delimited JSON event log"). Serialization
/// errors are logged and dropped rather than propagated: a malformed report
/// must never abort the tick loop that produced it (spec §7's propagation
/// policy, extended here to the reporting boundary).
pub struct NdjsonReportHandler<W: Write> {
    sink: W,
}

impl<W: Write> NdjsonReportHandler<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_line(&mut self, report: &Report) -> io::Result<()> {
        let line = serde_json::to_string(report)?;
        self.sink.write_all(line.as_bytes())?;
        self.sink.write_all(b"\n")
    }
}

impl<W: Write> ReportHandler for NdjsonReportHandler<W> {
    fn handle(&mut self, report: &Report) {
        if let Err(err) = self.write_line(report) {
            eprintln!("WARNING: failed to write report: {err}");
        }
    }
}

/// Emits one `VehicleStateTransition` record per instruction applied this
/// tick (spec §4.5/§4.7: the vehicle-state changes `apply_instructions`
/// already computed, not recomputed here).
pub fn report_instruction_results(handler: &mut dyn ReportHandler, sim_time: SimTime, results: &[InstructionResult]) {
    for result in results {
        handler.handle(&Report::VehicleStateTransition {
            sim_time,
            vehicle_id: vehicle_id_of(&result.prev_state),
            prev_state: result.prev_state.kind(),
            next_state: result.next_state.kind(),
        });
    }
}

fn vehicle_id_of(state: &crate::vehicle_state::VehicleState) -> VehicleId {
    state.vehicle_id().clone()
}

/// Emits one `StationLoad` record per charger at every station currently in
/// `sim` (spec §6 "station-load aggregates").
pub fn report_station_load(handler: &mut dyn ReportHandler, sim: &SimulationState) {
    for station in sim.get_stations(None, None) {
        for (charger_id, stalls) in &station.chargers {
            handler.handle(&Report::StationLoad {
                sim_time: sim.sim_time,
                station_id: station.id.clone(),
                charger_id: charger_id.clone(),
                stalls_available: stalls.available,
                stalls_total: stalls.total,
            });
        }
    }
}

/// Emits one `TickStats` record summarizing `sim` at its current `sim_time`
/// (spec §6 "per-tick stats").
pub fn report_tick_stats(handler: &mut dyn ReportHandler, sim: &SimulationState) {
    let vehicles = sim.get_vehicles(None, None);
    let idle_vehicle_count = vehicles
        .iter()
        .filter(|v| v.state_kind() == VehicleStateKind::Idle)
        .count();
    let active_request_count = sim.get_requests(None, Some(&|r: &crate::entities::Request| !r.is_dispatched()), false).len();
    handler.handle(&Report::TickStats {
        sim_time: sim.sim_time,
        vehicle_count: vehicles.len(),
        active_request_count,
        idle_vehicle_count,
    });
}

pub fn report_request_created(handler: &mut dyn ReportHandler, sim_time: SimTime, request_id: RequestId) {
    handler.handle(&Report::RequestCreated { sim_time, request_id });
}

pub fn report_request_cancelled(handler: &mut dyn ReportHandler, sim_time: SimTime, request_id: RequestId) {
    handler.handle(&Report::RequestCancelled { sim_time, request_id });
}

pub fn report_request_serviced(handler: &mut dyn ReportHandler, sim_time: SimTime, request_id: RequestId, vehicle_id: VehicleId) {
    handler.handle(&Report::RequestServiced { sim_time, request_id, vehicle_id });
}
