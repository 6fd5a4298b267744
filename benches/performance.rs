//! Performance benchmarks for hive_sim using Criterion.rs.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use h3o::{CellIndex, Resolution};

use hive_sim::assignment::{find_assignment, h3_distance_cost};
use hive_sim::config::{DispatcherConfig, Environment, HiveConfig};
use hive_sim::entities::{EnergySource, EnergyType, Request, Vehicle};
use hive_sim::ids::{MechatronicsId, RequestId, VehicleId};
use hive_sim::routing::HaversineRoadNetwork;
use hive_sim::state::ops;
use hive_sim::state::SimulationState;
use hive_sim::step::{run_until_end, Generators};
use hive_sim::time::SimTime;
use hive_sim::vehicle_state::VehicleStateKind;

const TEST_CELL: u64 = 0x8a1fb46622dffff;

fn test_cell() -> CellIndex {
    CellIndex::try_from(TEST_CELL).expect("TEST_CELL should be a valid H3 cell")
}

/// Builds `num_vehicles` idle vehicles and `num_requests` pending requests
/// scattered over the disk around the standard test cell, mirroring the
/// teacher's `ScenarioParams { num_drivers, num_riders, .. }` shape.
fn build_fleet(num_vehicles: usize, num_requests: usize) -> SimulationState {
    let origin = test_cell();
    let disk: Vec<CellIndex> = origin.grid_disk::<Vec<_>>(20);

    let mut sim = SimulationState::new(Arc::new(HaversineRoadNetwork::default()), 60, Resolution::Nine, Resolution::Six);

    for i in 0..num_vehicles {
        let geoid = hive_sim::geo::GeoId(disk[i % disk.len()]);
        let vehicle = Vehicle::new(
            VehicleId::new(format!("v{i}")),
            geoid,
            MechatronicsId::new("m1"),
            EnergySource::new(EnergyType::Battery, 50.0, 45.0, 20.0),
        );
        sim = ops::add_vehicle(&sim, vehicle).expect("add_vehicle");
    }

    for i in 0..num_requests {
        let origin_cell = hive_sim::geo::GeoId(disk[i % disk.len()]);
        let destination_cell = hive_sim::geo::GeoId(disk[(i + disk.len() / 2) % disk.len()]);
        let request = Request::new(
            RequestId::new(format!("r{i}")),
            origin_cell,
            destination_cell,
            SimTime::ZERO,
            SimTime(3600),
            1,
            10.0,
        );
        sim = ops::queue_request(&sim, request).expect("queue_request");
    }

    sim
}

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![("small", 10, 20), ("medium", 50, 100), ("large", 150, 300)];

    let mut group = c.benchmark_group("simulation_run");
    for (name, vehicles, requests) in scenarios {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(vehicles, requests), |b, &(vehicles, requests)| {
            b.iter(|| {
                let sim = build_fleet(vehicles, requests);
                let env = Environment::new(
                    HiveConfig::default()
                        .with_timestep_duration_seconds(60)
                        .with_time_bounds(0, 3600)
                        .with_dispatcher(DispatcherConfig::default().with_valid_dispatch_states([VehicleStateKind::Idle])),
                );
                black_box(run_until_end(&sim, &env, Generators::default(), None).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_assignment_algorithms(c: &mut Criterion) {
    let origin = test_cell();
    let disk: Vec<CellIndex> = origin.grid_disk::<Vec<_>>(20);

    let make_vehicles = |n: usize| -> Vec<Vehicle> {
        (0..n)
            .map(|i| {
                Vehicle::new(
                    VehicleId::new(format!("v{i}")),
                    hive_sim::geo::GeoId(disk[i % disk.len()]),
                    MechatronicsId::new("m1"),
                    EnergySource::new(EnergyType::Battery, 50.0, 45.0, 20.0),
                )
            })
            .collect()
    };
    let make_requests = |n: usize| -> Vec<Request> {
        (0..n)
            .map(|i| {
                Request::new(
                    RequestId::new(format!("r{i}")),
                    hive_sim::geo::GeoId(disk[i % disk.len()]),
                    hive_sim::geo::GeoId(disk[(i + disk.len() / 2) % disk.len()]),
                    SimTime::ZERO,
                    SimTime(3600),
                    1,
                    10.0,
                )
            })
            .collect()
    };

    let mut group = c.benchmark_group("assignment_algorithms");

    // Small batch stays under the greedy/Hungarian threshold.
    let vehicles = make_vehicles(10);
    let requests = make_requests(5);
    group.bench_function("greedy_10x5", |b| {
        let vehicle_refs: Vec<&Vehicle> = vehicles.iter().collect();
        let request_refs: Vec<&Request> = requests.iter().collect();
        b.iter(|| black_box(find_assignment(&vehicle_refs, &request_refs, h3_distance_cost)));
    });

    // Large batch crosses the threshold into the Hungarian solver.
    let vehicles = make_vehicles(100);
    let requests = make_requests(200);
    group.bench_function("hungarian_100x200", |b| {
        let vehicle_refs: Vec<&Vehicle> = vehicles.iter().collect();
        let request_refs: Vec<&Request> = requests.iter().collect();
        b.iter(|| black_box(find_assignment(&vehicle_refs, &request_refs, h3_distance_cost)));
    });

    group.finish();
}

criterion_group!(benches, bench_simulation_run, bench_assignment_algorithms);
criterion_main!(benches);
