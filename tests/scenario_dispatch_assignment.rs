//! Scenario 5 (spec §8): one request with `value = 10` at cell A, two idle
//! vehicles at A and B with A closer; after one generator pass, the
//! A-vehicle is in `DispatchTrip{request_id}` and the request points back
//! to it.

mod support;

use hive_sim::config::{DispatcherConfig, Environment, HiveConfig};
use hive_sim::ids::{RequestId, VehicleId};
use hive_sim::instruction::{apply_instructions, Dispatcher};
use hive_sim::vehicle_state::{VehicleState, VehicleStateKind};

#[test]
fn the_closer_vehicle_is_dispatched_to_the_request() {
    let sim = support::empty_sim();
    let a = support::cell(37.7749, -122.4194);
    let b = support::cell(38.9, -121.0);
    let sim = support::add_vehicle(&sim, support::idle_vehicle("v_a", a));
    let sim = support::add_vehicle(&sim, support::idle_vehicle("v_b", b));
    let sim = support::add_request(&sim, support::request("r1", a, support::cell(37.8, -122.3), 10.0));

    let env = Environment::new(
        HiveConfig::default().with_dispatcher(DispatcherConfig::default().with_valid_dispatch_states([VehicleStateKind::Idle])),
    );
    let (_dispatcher, instructions) = Dispatcher.generate_instructions(&sim, &env);
    let (sim, _results) = apply_instructions(&sim, &env, &instructions).unwrap();

    match &sim.vehicle(&VehicleId::new("v_a")).unwrap().vehicle_state {
        VehicleState::DispatchTrip { request_id, .. } => assert_eq!(*request_id, RequestId::new("r1")),
        other => panic!("expected v_a in DispatchTrip, got {other:?}"),
    }
    assert_eq!(sim.vehicle(&VehicleId::new("v_b")).unwrap().state_kind(), VehicleStateKind::Idle);
    assert_eq!(sim.request(&RequestId::new("r1")).unwrap().dispatched_vehicle, Some(VehicleId::new("v_a")));
}
