//! Shared fixtures for the end-to-end scenario tests (spec §8), mirroring
//! the teacher's `tests/support/{entities,schedule,world}.rs` split: plain
//! builder functions over the public crate API rather than a test-only
//! feature-gated constructor surface.
#![allow(dead_code)]

use std::sync::Arc;

use h3o::{LatLng, Resolution};

use hive_sim::config::{Environment, HiveConfig};
use hive_sim::entities::{Base, EnergySource, EnergyType, Request, Station, Vehicle};
use hive_sim::geo::GeoId;
use hive_sim::ids::{BaseId, ChargerId, MechatronicsId, RequestId, StationId, VehicleId};
use hive_sim::routing::HaversineRoadNetwork;
use hive_sim::state::{ops, SimulationState};
use hive_sim::time::SimTime;

pub const LOCATION_RESOLUTION: Resolution = Resolution::Nine;
pub const SEARCH_RESOLUTION: Resolution = Resolution::Six;

/// A cell at the given lat/lon, at the fixed resolution every fixture uses.
pub fn cell(lat: f64, lon: f64) -> GeoId {
    GeoId(LatLng::new(lat, lon).unwrap().to_cell(LOCATION_RESOLUTION))
}

/// An empty simulation over a Haversine road network, 60-second ticks.
pub fn empty_sim() -> SimulationState {
    empty_sim_with_timestep(60)
}

pub fn empty_sim_with_timestep(timestep_duration_seconds: u64) -> SimulationState {
    SimulationState::new(
        Arc::new(HaversineRoadNetwork::default()),
        timestep_duration_seconds,
        LOCATION_RESOLUTION,
        SEARCH_RESOLUTION,
    )
}

/// A fully-charged vehicle, idle, at `geoid`.
pub fn idle_vehicle(id: &str, geoid: GeoId) -> Vehicle {
    Vehicle::new(
        VehicleId::new(id),
        geoid,
        MechatronicsId::new("m1"),
        EnergySource::new(EnergyType::Battery, 50.0, 45.0, 20.0),
    )
}

pub fn request(id: &str, origin: GeoId, destination: GeoId, value: f64) -> Request {
    Request::new(RequestId::new(id), origin, destination, SimTime::ZERO, SimTime(3600), 1, value)
}

pub fn station_with_one_charger(id: &str, geoid: GeoId, stall_count: u32) -> Station {
    Station::new(StationId::new(id), geoid).with_charger(ChargerId::new("c1"), stall_count)
}

pub fn base(id: &str, geoid: GeoId, total_stalls: u32, station_id: Option<&str>) -> Base {
    Base::new(BaseId::new(id), geoid, total_stalls, station_id.map(StationId::new))
}

pub fn env_with_timestep(timestep_duration_seconds: u64) -> Environment {
    Environment::new(HiveConfig::default().with_timestep_duration_seconds(timestep_duration_seconds))
}

pub fn add_vehicle(sim: &SimulationState, vehicle: Vehicle) -> SimulationState {
    ops::add_vehicle(sim, vehicle).expect("add_vehicle")
}

pub fn add_request(sim: &SimulationState, request: Request) -> SimulationState {
    ops::add_request(sim, request).expect("add_request")
}

pub fn add_station(sim: &SimulationState, station: Station) -> SimulationState {
    ops::add_station(sim, station).expect("add_station")
}
