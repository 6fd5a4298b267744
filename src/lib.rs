//! # HIVE simulation kernel
//!
//! A discrete-tick simulation kernel for electrified ride-hail fleets.
//!
//! ## Overview
//!
//! This crate provides the simulation core described in the project
//! specification: an immutable simulation state, a nine-variant per-vehicle
//! state machine, a hierarchical hex-grid spatial index, a pluggable
//! vehicle/request assignment algorithm, and the fixed five-phase tick loop
//! that drives them all. Scenario loading (YAML/CSV), file-based reporters,
//! and concrete external road-network backends are out of scope for this
//! crate; see [`routing::RoadNetwork`] and [`reporting::ReportHandler`] for
//! the seams a surrounding application plugs into.
//!
//! ## Key concepts
//!
//! - **Immutable state**: every mutation returns a new [`state::SimulationState`];
//!   nothing is edited in place.
//! - **Deterministic**: iteration order is insertion order, ties break on id,
//!   and any randomness a generator needs is seeded from [`config::HiveConfig`].
//! - **Tick-driven**: [`step::step`] runs one tick's five phases in order;
//!   [`step::run_until_end`] drives a scenario to its configured end time.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hive_sim::config::{Environment, HiveConfig};
//! use hive_sim::routing::HaversineRoadNetwork;
//! use hive_sim::state::SimulationState;
//! use hive_sim::step::{run_until_end, Generators};
//! use h3o::Resolution;
//!
//! let sim = SimulationState::new(
//!     Arc::new(HaversineRoadNetwork::default()),
//!     60,
//!     Resolution::Nine,
//!     Resolution::Six,
//! );
//! let env = Environment::new(HiveConfig::default());
//! let final_sim = run_until_end(&sim, &env, Generators::default(), None).unwrap();
//! println!("simulation ended at {:?}", final_sim.sim_time);
//! ```

pub mod assignment;
pub mod config;
pub mod entities;
pub mod error;
pub mod geo;
pub mod ids;
pub mod instruction;
pub mod reporting;
pub mod routing;
pub mod state;
pub mod step;
pub mod time;
pub mod vehicle_state;
