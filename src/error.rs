//! Error taxonomy (spec §7).
//!
//! Plain `impl std::error::Error` types, following the teacher's house style
//! (`routing/osrm_spawn/error.rs`, `telemetry_export`'s `Box<dyn Error>`
//! returns) rather than a derive-macro error crate.

use std::fmt;

use crate::ids::{BaseId, RequestId, StationId, VehicleId};

/// A violated simulation-state invariant (spec §7). Fatal to the op that
/// raised it: the composite op that wraps the failing sub-op returns the
/// state from *before* the op, never a partially-mutated one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationStateError {
    DuplicateVehicle(VehicleId),
    DuplicateRequest(RequestId),
    DuplicateStation(StationId),
    DuplicateBase(BaseId),
    VehicleNotFound(VehicleId),
    RequestNotFound(RequestId),
    StationNotFound(StationId),
    BaseNotFound(BaseId),
    GeoidMismatch { entity: String, expected: String, found: String },
    NegativeStallCount { owner: String },
    StallOverAvailable { owner: String, available: u32, total: u32 },
    InvalidTransition { vehicle: VehicleId, reason: String },
}

impl fmt::Display for SimulationStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateVehicle(id) => write!(f, "vehicle {id} already exists"),
            Self::DuplicateRequest(id) => write!(f, "request {id} already exists"),
            Self::DuplicateStation(id) => write!(f, "station {id} already exists"),
            Self::DuplicateBase(id) => write!(f, "base {id} already exists"),
            Self::VehicleNotFound(id) => write!(f, "vehicle {id} does not exist"),
            Self::RequestNotFound(id) => write!(f, "request {id} does not exist"),
            Self::StationNotFound(id) => write!(f, "station {id} does not exist"),
            Self::BaseNotFound(id) => write!(f, "base {id} does not exist"),
            Self::GeoidMismatch { entity, expected, found } => write!(
                f,
                "{entity}: geoid mismatch, expected {expected} but index holds {found}"
            ),
            Self::NegativeStallCount { owner } => write!(f, "{owner}: stall count went negative"),
            Self::StallOverAvailable { owner, available, total } => write!(
                f,
                "{owner}: available stalls {available} exceed total {total}"
            ),
            Self::InvalidTransition { vehicle, reason } => {
                write!(f, "vehicle {vehicle}: invalid transition ({reason})")
            }
        }
    }
}

impl std::error::Error for SimulationStateError {}

/// A link is missing from the road network, or a route is malformed
/// (spec §4.4, §7). Demoted at the tick level to "no movement this tick".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    LinkNotFound { from: String, to: String },
    MalformedRoute(String),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkNotFound { from, to } => write!(f, "no link from {from} to {to}"),
            Self::MalformedRoute(reason) => write!(f, "malformed route: {reason}"),
        }
    }
}

impl std::error::Error for RouteError {}

/// Write a tick-level error to stderr, `sim_time`-prefixed (spec §7: these
/// are isolated to the failing vehicle and never propagate further).
pub fn log_tick_error(sim_time: crate::time::SimTime, err: &dyn std::error::Error) {
    eprintln!("WARNING: sim_time={}: {err}", sim_time.seconds());
}
