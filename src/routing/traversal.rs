//! Route traversal under a time budget (spec §4.4).
//!
//! Grounded on `original_source/hive/model/roadnetwork/routetraversal.py`:
//! same early-outs (empty route, degenerate head==tail), same left-to-right
//! fold over links accumulating `(remaining_time, traversal_distance,
//! experienced, remaining)`, same "first bad link aborts the whole fold"
//! error behavior — re-expressed as a single loop instead of a `reduce`.

use super::PropertyLink;
use crate::error::RouteError;
use crate::geo::GeoId;

/// Result of consuming a route under a time budget (spec §4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTraversal {
    pub remaining_time_s: f64,
    pub traversal_distance_km: f64,
    pub experienced_route: Vec<PropertyLink>,
    pub remaining_route: Vec<PropertyLink>,
}

/// Consumes `route` against `network` for up to `budget_s` seconds.
///
/// Returns `Ok(None)` for the two "nothing to do" edge cases (empty route;
/// degenerate route whose head start equals its tail end). Returns
/// `Err(RouteError::LinkNotFound)` the moment a link in the route is no
/// longer resolvable against `network` — the spec requires propagating this
/// instead of returning a partial traversal.
pub fn traverse(
    route: &[PropertyLink],
    network: &dyn super::RoadNetwork,
    budget_s: f64,
) -> Result<Option<RouteTraversal>, RouteError> {
    let (head, tail) = match (route.first(), route.last()) {
        (Some(h), Some(t)) => (h, t),
        _ => return Ok(None),
    };
    if head.from == tail.to {
        return Ok(None);
    }

    let mut remaining_budget = budget_s;
    let mut traversal_distance_km = 0.0;
    let mut experienced = Vec::with_capacity(route.len());

    for (i, link) in route.iter().enumerate() {
        if network.link(link.from, link.to).is_none() {
            return Err(link_not_found(link));
        }

        if remaining_budget <= 0.0 {
            return Ok(Some(RouteTraversal {
                remaining_time_s: 0.0,
                traversal_distance_km,
                experienced_route: experienced,
                remaining_route: route[i..].to_vec(),
            }));
        }

        if remaining_budget >= link.travel_time_s {
            traversal_distance_km += link.distance_km;
            remaining_budget -= link.travel_time_s;
            experienced.push(*link);
        } else {
            let (experienced_part, remaining_part) = link.split_at(remaining_budget);
            traversal_distance_km += experienced_part.distance_km;
            experienced.push(experienced_part);

            let mut remaining_route = Vec::with_capacity(route.len() - i);
            remaining_route.push(remaining_part);
            remaining_route.extend_from_slice(&route[i + 1..]);

            return Ok(Some(RouteTraversal {
                remaining_time_s: 0.0,
                traversal_distance_km,
                experienced_route: experienced,
                remaining_route,
            }));
        }
    }

    Ok(Some(RouteTraversal {
        remaining_time_s: remaining_budget,
        traversal_distance_km,
        experienced_route: experienced,
        remaining_route: Vec::new(),
    }))
}

fn link_not_found(link: &PropertyLink) -> RouteError {
    RouteError::LinkNotFound { from: link.from.to_string(), to: link.to.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HaversineRoadNetwork;
    use h3o::{LatLng, Resolution};

    fn cell(lat: f64, lon: f64) -> GeoId {
        GeoId(LatLng::new(lat, lon).unwrap().to_cell(Resolution::Nine))
    }

    fn three_km_links_at_1kph() -> Vec<PropertyLink> {
        let a = cell(0.0, 0.0);
        let b = cell(0.0, 0.01);
        let c = cell(0.0, 0.02);
        let d = cell(0.0, 0.03);
        vec![
            PropertyLink::new(a, b, 1.0, 1.0),
            PropertyLink::new(b, c, 1.0, 1.0),
            PropertyLink::new(c, d, 1.0, 1.0),
        ]
    }

    #[test]
    fn empty_route_yields_none() {
        let net = HaversineRoadNetwork::default();
        assert_eq!(traverse(&[], &net, 3600.0), Ok(None));
    }

    #[test]
    fn degenerate_route_yields_none() {
        let net = HaversineRoadNetwork::default();
        let a = cell(0.0, 0.0);
        let link = PropertyLink::new(a, a, 0.0, 10.0);
        assert_eq!(traverse(&[link], &net, 3600.0), Ok(None));
    }

    #[test]
    fn one_hour_budget_consumes_exactly_one_of_three_one_hour_links() {
        let net = HaversineRoadNetwork::default();
        let links = three_km_links_at_1kph();
        let result = traverse(&links, &net, 3600.0).unwrap().unwrap();

        assert_eq!(result.experienced_route, vec![links[0]]);
        assert_eq!(result.remaining_route, vec![links[1], links[2]]);
        assert!((result.traversal_distance_km - 1.0).abs() < 1e-9);
        assert_eq!(result.remaining_time_s, 0.0);
    }

    #[test]
    fn partial_budget_splits_the_current_link() {
        let net = HaversineRoadNetwork::default();
        let links = three_km_links_at_1kph();
        let result = traverse(&links, &net, 1800.0).unwrap().unwrap();

        assert_eq!(result.experienced_route.len(), 1);
        assert!((result.experienced_route[0].distance_km - 0.5).abs() < 1e-9);
        assert_eq!(result.remaining_route.len(), 3);
        assert!((result.remaining_route[0].distance_km - 0.5).abs() < 1e-9);
    }
}
