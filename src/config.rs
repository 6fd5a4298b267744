//! Scenario configuration (spec §6 "Configuration recognized by the core").
//!
//! Grounded on the teacher's `scenario/params.rs`: a flat `Default`-backed
//! struct plus `with_*` consuming builders for programmatic construction,
//! nested `*Config` sub-structs for a cohesive policy area (there,
//! `DriverDecisionConfig`/`RiderQuoteConfig`; here, `DispatcherConfig`), and
//! `serde::Deserialize` for file-driven construction (the loader that reads
//! the root YAML is out of scope per spec §1, but the struct it populates
//! lives here).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::vehicle_state::VehicleStateKind;

/// Dispatcher policy knobs (spec §6). `charging_low_soc_threshold` lives
/// only here — resolving spec §9 Open Question (iii), which flagged the
/// same knob appearing in two places in the original source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub matching_low_soc_threshold: f64,
    pub base_charging_range_km_threshold: f64,
    pub matching_range_km_threshold: f64,
    pub valid_dispatch_states: BTreeSet<VehicleStateKind>,
    pub charging_low_soc_threshold: f64,
    pub charging_max_search_radius_km: f64,
    pub base_vehicles_charging_limit: Option<usize>,
    /// Seconds an `Idle` vehicle with a home base must accumulate before
    /// `BaseManagement` routes it home (spec §4.5: "vehicles idle beyond a
    /// threshold ... are routed to their home base").
    pub base_idle_duration_threshold_s: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            matching_low_soc_threshold: 0.2,
            base_charging_range_km_threshold: 5.0,
            matching_range_km_threshold: 50.0,
            valid_dispatch_states: BTreeSet::from([VehicleStateKind::Idle]),
            charging_low_soc_threshold: 0.2,
            charging_max_search_radius_km: 100.0,
            base_vehicles_charging_limit: None,
            base_idle_duration_threshold_s: 600,
        }
    }
}

impl DispatcherConfig {
    pub fn with_valid_dispatch_states(mut self, states: impl IntoIterator<Item = VehicleStateKind>) -> Self {
        self.valid_dispatch_states = states.into_iter().collect();
        self
    }

    pub fn with_charging_low_soc_threshold(mut self, threshold: f64) -> Self {
        self.charging_low_soc_threshold = threshold;
        self
    }
}

/// Flat, deserializable configuration record (spec §6). Resolves spec §9
/// Open Question (i): the `sim_name`/string-parseable `start_time` shape is
/// the only one implemented — there is no legacy second config shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveConfig {
    pub sim_name: String,
    pub timestep_duration_seconds: u64,
    pub start_time_seconds: u64,
    pub end_time_seconds: u64,
    pub sim_h3_resolution: u8,
    pub sim_h3_search_resolution: u8,
    pub request_cancel_time_seconds: u64,
    pub idle_energy_rate_kwh_per_hour: f64,
    /// Simplification of the original's per-mechatronics-model energy curve
    /// (out of scope per spec §1): a flat consumption rate used by every
    /// vehicle's movement debit (spec §4.3 "debits energy via the vehicle's
    /// mechatronics model").
    pub default_energy_consumption_kwh_per_km: f64,
    /// SOC below which an `Idle` vehicle has reached its terminal condition
    /// and defaults into `OutOfService` (spec §4.3's state table) rather
    /// than continuing to idle. Distinct from `dispatcher.matching_low_soc_threshold`
    /// (dispatch eligibility) and `dispatcher.charging_low_soc_threshold`
    /// (when to send a vehicle to charge) — this is the last-resort floor
    /// below those two.
    pub critical_low_soc_threshold: f64,
    pub dispatcher: DispatcherConfig,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            sim_name: "hive".to_string(),
            timestep_duration_seconds: 60,
            start_time_seconds: 0,
            end_time_seconds: 24 * 60 * 60,
            sim_h3_resolution: 15,
            sim_h3_search_resolution: 7,
            request_cancel_time_seconds: 600,
            idle_energy_rate_kwh_per_hour: 0.8,
            default_energy_consumption_kwh_per_km: 0.2,
            critical_low_soc_threshold: 0.05,
            dispatcher: DispatcherConfig::default(),
        }
    }
}

impl HiveConfig {
    pub fn with_timestep_duration_seconds(mut self, seconds: u64) -> Self {
        self.timestep_duration_seconds = seconds;
        self
    }

    pub fn with_time_bounds(mut self, start_time_seconds: u64, end_time_seconds: u64) -> Self {
        self.start_time_seconds = start_time_seconds;
        self.end_time_seconds = end_time_seconds;
        self
    }

    pub fn with_h3_resolutions(mut self, location: u8, search: u8) -> Self {
        self.sim_h3_resolution = location;
        self.sim_h3_search_resolution = search;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: DispatcherConfig) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Parses `start_time`/`end_time` given either as plain seconds or as a
    /// `"HH:MM:SS"` clock string (spec §6: "seconds or a parseable time
    /// string"). Returns `None` for anything else.
    pub fn parse_time_field(value: &str) -> Option<u64> {
        if let Ok(seconds) = value.parse::<u64>() {
            return Some(seconds);
        }
        let parts: Vec<&str> = value.split(':').collect();
        if parts.len() != 3 {
            return None;
        }
        let h: u64 = parts[0].parse().ok()?;
        let m: u64 = parts[1].parse().ok()?;
        let s: u64 = parts[2].parse().ok()?;
        Some(h * 3600 + m * 60 + s)
    }
}

/// Per-tick context threaded alongside `SimulationState`: configuration plus
/// anything a generator or state transition needs but that isn't part of
/// the persisted sim state itself (spec §9 "Generators as pure functions
/// over sim+env").
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub config: HiveConfig,
}

impl Environment {
    pub fn new(config: HiveConfig) -> Self {
        Self { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_time_field_accepts_plain_seconds() {
        assert_eq!(HiveConfig::parse_time_field("3600"), Some(3600));
    }

    #[test]
    fn parse_time_field_accepts_clock_string() {
        assert_eq!(HiveConfig::parse_time_field("01:00:00"), Some(3600));
    }

    #[test]
    fn parse_time_field_rejects_garbage() {
        assert_eq!(HiveConfig::parse_time_field("not-a-time"), None);
    }

    #[test]
    fn charging_low_soc_threshold_has_a_single_source_of_truth() {
        let dispatcher = DispatcherConfig::default().with_charging_low_soc_threshold(0.15);
        let config = HiveConfig::default().with_dispatcher(dispatcher);
        assert_eq!(config.dispatcher.charging_low_soc_threshold, 0.15);
    }
}
