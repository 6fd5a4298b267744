//! Scenario 4 (spec §8): two vehicles in `ChargingStation` at the same
//! station; stepping only one for ten ticks must leave the other in
//! `ChargingStation`, and may transition the stepped one to `Idle` once its
//! SOC reaches the energy source's ideal limit.

mod support;

use hive_sim::entities::{EnergySource, EnergyType, Vehicle};
use hive_sim::ids::{ChargerId, MechatronicsId, StationId, VehicleId};
use hive_sim::state::ops;
use hive_sim::step::step_vehicle;
use hive_sim::vehicle_state::{VehicleState, VehicleStateKind};

fn charging_vehicle(id: &str, geoid: hive_sim::geo::GeoId) -> Vehicle {
    let energy_source = EnergySource::new(EnergyType::Battery, 1.0, 0.5, 10.0).with_soc(0.0);
    Vehicle::new(VehicleId::new(id), geoid, MechatronicsId::new("m1"), energy_source).with_vehicle_state(VehicleState::ChargingStation {
        vehicle_id: VehicleId::new(id),
        station_id: StationId::new("s1"),
        charger_id: ChargerId::new("c1"),
    })
}

#[test]
fn stepping_one_charging_vehicle_leaves_its_neighbor_charging() {
    let sim = support::empty_sim();
    let station = support::station_with_one_charger("s1", support::cell(37.0, -122.0), 2);
    let sim = support::add_station(&sim, station);
    let sim = support::add_vehicle(&sim, charging_vehicle("v1", support::cell(37.0, -122.0)));
    let sim = support::add_vehicle(&sim, charging_vehicle("v2", support::cell(37.0, -122.0)));
    let env = support::env_with_timestep(60);

    let mut current = sim;
    for _ in 0..10 {
        current = step_vehicle(&current, &env, &VehicleId::new("v2")).unwrap();
    }

    assert_eq!(current.vehicle(&VehicleId::new("v1")).unwrap().state_kind(), VehicleStateKind::ChargingStation);
    let v2 = current.vehicle(&VehicleId::new("v2")).unwrap();
    assert!(v2.energy_source.ideal_limit_reached());
    assert_eq!(v2.state_kind(), VehicleStateKind::Idle);
}

#[test]
fn charger_stall_is_released_once_the_vehicle_transitions_out() {
    let sim = support::empty_sim();
    let station = support::station_with_one_charger("s1", support::cell(37.0, -122.0), 1);
    let sim = support::add_station(&sim, station);
    let sim = support::add_vehicle(&sim, charging_vehicle("v1", support::cell(37.0, -122.0)));
    let env = support::env_with_timestep(60);

    let mut current = sim;
    for _ in 0..10 {
        current = step_vehicle(&current, &env, &VehicleId::new("v1")).unwrap();
    }

    assert_eq!(current.vehicle(&VehicleId::new("v1")).unwrap().state_kind(), VehicleStateKind::Idle);
    let stalls = &current.station(&StationId::new("s1")).unwrap().chargers[&ChargerId::new("c1")];
    assert_eq!(stalls.available, stalls.total);
}
