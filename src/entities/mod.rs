//! Immutable domain records with pure builders (spec §3, §4.3).
//!
//! Grounded on the teacher's `ecs.rs` component set (`Rider`/`Driver`/`Trip`
//! + `Position(CellIndex)`), generalized from mutable ECS components
//! attached to an `Entity` into plain value types. The `record._replace(field=x)`
//! builder pattern is lifted directly from `original_source`'s NamedTuple
//! usage (see e.g. `PropertyLink.update_speed`) and re-expressed as
//! consuming `with_*` methods, matching the teacher's own `with_*` style in
//! `scenario/params.rs`.

mod base;
mod energy;
mod request;
mod station;
mod vehicle;

pub use base::Base;
pub use energy::{EnergySource, EnergyType};
pub use request::Request;
pub use station::{ChargerStalls, Station};
pub use vehicle::Vehicle;
