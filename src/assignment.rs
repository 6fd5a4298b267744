//! Vehicle-to-request assignment (spec §4.6).
//!
//! Grounded on the teacher's `matching/hungarian.rs`: the same `I64Weights`
//! wrapper around `pathfinding::kuhn_munkres`, the same float-score-to-i64
//! scaling, the same greedy fallback for small batches. Generalized from a
//! rider/driver `Entity` pairing into a vehicle/request id pairing, and
//! from "maximize score" to "minimize cost" (negate once at the matrix
//! boundary rather than restate every cost function in score terms).

use std::collections::HashSet;

use pathfinding::kuhn_munkres::{kuhn_munkres, Weights};

use crate::entities::{Request, Vehicle};
use crate::ids::{RequestId, VehicleId};

/// Scale factor converting an `f64` cost into the `i64` weight
/// `kuhn_munkres` requires.
const SCALE: f64 = 1_000_000.0;

/// Below this many vehicle/request candidates, the greedy pass is cheaper
/// and its result is already optimal in practice for the sizes the
/// dispatcher sees per tick; above it, the batch is routed through the
/// Hungarian solver (spec §4.6: "a minimum-cost bipartite assignment is
/// preferred when |V|·|R| is moderate").
const GREEDY_THRESHOLD: usize = 200;

/// One `(vehicle, request)` pair in a solved assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPair {
    pub vehicle_id: VehicleId,
    pub request_id: RequestId,
}

/// Default cost function (spec §4.5 Dispatcher: "h3 hex-distance between
/// vehicle position and request origin"). Falls back to `i32::MAX` if the
/// two cells aren't grid-distance-comparable (different base cells).
pub fn h3_distance_cost(vehicle: &Vehicle, request: &Request) -> f64 {
    vehicle.geoid.0.grid_distance(request.origin.0).unwrap_or(i32::MAX) as f64
}

/// Finds a minimum-cost pairing of `vehicles` to `requests` under
/// `cost_fn`, with no vehicle or request used twice (spec §4.6).
///
/// `requests` is expected already sorted by priority (spec §4.5): ties in
/// cost are broken in favor of earlier requests and, for a fixed request,
/// the lexicographically smallest vehicle id — achieved by sorting both
/// inputs into the matrix by id before solving, so the deterministic
/// solver's output is reproducible independent of map/iterator ordering
/// upstream.
pub fn find_assignment(
    vehicles: &[&Vehicle],
    requests: &[&Request],
    cost_fn: impl Fn(&Vehicle, &Request) -> f64,
) -> Vec<AssignmentPair> {
    if vehicles.is_empty() || requests.is_empty() {
        return Vec::new();
    }

    let mut vehicles: Vec<&Vehicle> = vehicles.to_vec();
    vehicles.sort_by(|a, b| a.id.cmp(&b.id));

    if vehicles.len() * requests.len() <= GREEDY_THRESHOLD {
        greedy_assignment(&vehicles, requests, cost_fn)
    } else {
        hungarian_assignment(&vehicles, requests, cost_fn)
    }
}

/// For each request in priority order, pick the lowest-cost still-free
/// vehicle (lexicographically smallest id breaks ties, since `vehicles` is
/// pre-sorted by id).
fn greedy_assignment(
    vehicles: &[&Vehicle],
    requests: &[&Request],
    cost_fn: impl Fn(&Vehicle, &Request) -> f64,
) -> Vec<AssignmentPair> {
    let mut taken: HashSet<&VehicleId> = HashSet::new();
    let mut pairs = Vec::new();

    for request in requests {
        let mut best: Option<(&Vehicle, f64)> = None;
        for vehicle in vehicles {
            if taken.contains(&vehicle.id) {
                continue;
            }
            let cost = cost_fn(vehicle, request);
            let better = match best {
                Some((_, best_cost)) => cost < best_cost,
                None => true,
            };
            if better {
                best = Some((vehicle, cost));
            }
        }
        if let Some((vehicle, _)) = best {
            taken.insert(&vehicle.id);
            pairs.push(AssignmentPair { vehicle_id: vehicle.id.clone(), request_id: request.id.clone() });
        }
    }
    pairs
}

/// Matrix wrapper implementing `pathfinding`'s `Weights` trait for `i64`.
struct I64Weights(Vec<Vec<i64>>);

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, |r| r.len())
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        I64Weights(self.0.iter().map(|r| r.iter().map(|&x| x.saturating_neg()).collect()).collect())
    }
}

fn cost_to_weight(cost: f64) -> i64 {
    // kuhn_munkres maximizes; negate so minimum cost becomes maximum weight.
    let w = -cost * SCALE;
    if w >= i64::MAX as f64 {
        i64::MAX
    } else if w <= i64::MIN as f64 {
        i64::MIN
    } else {
        w as i64
    }
}

fn hungarian_assignment(
    vehicles: &[&Vehicle],
    requests: &[&Request],
    cost_fn: impl Fn(&Vehicle, &Request) -> f64,
) -> Vec<AssignmentPair> {
    // kuhn_munkres requires rows <= columns; put the smaller side in rows.
    let (rows_are_vehicles, rows, cols) = if vehicles.len() <= requests.len() {
        (true, vehicles.len(), requests.len())
    } else {
        (false, requests.len(), vehicles.len())
    };

    let mut matrix = vec![vec![0_i64; cols]; rows];
    for r in 0..rows {
        for c in 0..cols {
            let (vehicle, request) = if rows_are_vehicles { (vehicles[r], requests[c]) } else { (vehicles[c], requests[r]) };
            matrix[r][c] = cost_to_weight(cost_fn(vehicle, request));
        }
    }

    let weights = I64Weights(matrix);
    let (_total, assignment) = kuhn_munkres(&weights);

    let mut pairs: Vec<AssignmentPair> = assignment
        .iter()
        .enumerate()
        .map(|(row, &col)| {
            let (vehicle, request) = if rows_are_vehicles { (vehicles[row], requests[col]) } else { (vehicles[col], requests[row]) };
            AssignmentPair { vehicle_id: vehicle.id.clone(), request_id: request.id.clone() }
        })
        .collect();
    pairs.sort_by(|a, b| (&a.vehicle_id, &a.request_id).cmp(&(&b.vehicle_id, &b.request_id)));
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EnergySource, EnergyType};
    use crate::ids::MechatronicsId;
    use crate::time::SimTime;
    use h3o::{LatLng, Resolution};

    fn geoid(lat: f64, lon: f64) -> crate::geo::GeoId {
        crate::geo::GeoId(LatLng::new(lat, lon).unwrap().to_cell(Resolution::Nine))
    }

    fn vehicle(id: &str, lat: f64, lon: f64) -> Vehicle {
        Vehicle::new(
            VehicleId::new(id),
            geoid(lat, lon),
            MechatronicsId::new("m1"),
            EnergySource::new(EnergyType::Battery, 50.0, 45.0, 20.0),
        )
    }

    fn request(id: &str, lat: f64, lon: f64, value: f64) -> Request {
        Request::new(RequestId::new(id), geoid(lat, lon), geoid(lat, lon), SimTime::ZERO, SimTime(600), 1, value)
    }

    #[test]
    fn nearest_vehicle_is_chosen_over_farther_one() {
        let v_near = vehicle("v_near", 37.7749, -122.4194);
        let v_far = vehicle("v_far", 38.9, -121.0);
        let r = request("r1", 37.7750, -122.4195, 10.0);

        let pairs = find_assignment(&[&v_near, &v_far], &[&r], h3_distance_cost);
        assert_eq!(pairs, vec![AssignmentPair { vehicle_id: VehicleId::new("v_near"), request_id: RequestId::new("r1") }]);
    }

    #[test]
    fn no_vehicle_or_request_is_used_twice() {
        let v1 = vehicle("v1", 37.0, -122.0);
        let v2 = vehicle("v2", 37.01, -122.01);
        let r1 = request("r1", 37.0, -122.0, 10.0);
        let r2 = request("r2", 37.01, -122.01, 5.0);

        let pairs = find_assignment(&[&v1, &v2], &[&r1, &r2], h3_distance_cost);
        let vehicles_used: HashSet<_> = pairs.iter().map(|p| &p.vehicle_id).collect();
        let requests_used: HashSet<_> = pairs.iter().map(|p| &p.request_id).collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(vehicles_used.len(), 2);
        assert_eq!(requests_used.len(), 2);
    }

    #[test]
    fn empty_inputs_yield_no_pairs() {
        assert_eq!(find_assignment(&[], &[], h3_distance_cost), Vec::new());
    }
}
