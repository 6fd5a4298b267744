//! Scenario 6 (spec §8): a route of three 1.0 km links at 1 km/h consumed
//! under a one-hour budget yields exactly the first link experienced, the
//! remaining two untouched, 1.0 km traversed, and no time left over.

mod support;

use hive_sim::routing::{traverse, PropertyLink};

#[test]
fn one_hour_budget_consumes_exactly_the_first_of_three_one_hour_links() {
    let a = support::cell(0.0, 0.0);
    let b = support::cell(0.0, 0.01);
    let c = support::cell(0.0, 0.02);
    let d = support::cell(0.0, 0.03);
    let links = vec![
        PropertyLink::new(a, b, 1.0, 1.0),
        PropertyLink::new(b, c, 1.0, 1.0),
        PropertyLink::new(c, d, 1.0, 1.0),
    ];

    let net = hive_sim::routing::HaversineRoadNetwork::default();
    let result = traverse(&links, &net, 3600.0).unwrap().expect("budget covers at least the first link");

    assert_eq!(result.experienced_route, vec![links[0]]);
    assert_eq!(result.remaining_route, vec![links[1], links[2]]);
    assert!((result.traversal_distance_km - 1.0).abs() < 1e-9);
    assert_eq!(result.remaining_time_s, 0.0);
}
