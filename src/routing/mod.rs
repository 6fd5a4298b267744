//! `RoadNetwork` interface and route traversal (spec §4.4, §1 "Out of scope").
//!
//! Grounded on the teacher's `routing.rs` `RouteProvider` trait / pluggable
//! backend split (`H3GridRouteProvider` vs. the feature-gated `osrm`/
//! `precomputed` providers). Only the always-available Haversine backend is
//! implemented here; `RoadNetwork` is the seam where an external-graph
//! implementation (OSRM, a precomputed table, …) would plug in — those
//! concrete backends are out of scope per spec §1.

mod traversal;

pub use traversal::{traverse, RouteTraversal};

use crate::error::RouteError;
use crate::geo::{self, GeoId};

/// One edge of a route: an ordered pair of cells with distance, speed and
/// travel time (spec §4.4's "property-links").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyLink {
    pub from: GeoId,
    pub to: GeoId,
    pub distance_km: f64,
    pub speed_kph: f64,
    pub travel_time_s: f64,
}

impl PropertyLink {
    pub fn new(from: GeoId, to: GeoId, distance_km: f64, speed_kph: f64) -> Self {
        let travel_time_s = if speed_kph > 0.0 { distance_km / speed_kph * 3600.0 } else { 0.0 };
        Self { from, to, distance_km, speed_kph, travel_time_s }
    }

    /// Splits this link at `elapsed_s` seconds into (experienced, remaining)
    /// fragments whose distance and travel time add back up to the whole
    /// (spec §4.4: "the traversed portion joins the experienced route, the
    /// untouched tail ... form the remaining route").
    fn split_at(&self, elapsed_s: f64) -> (PropertyLink, PropertyLink) {
        let elapsed_s = elapsed_s.clamp(0.0, self.travel_time_s);
        let fraction = if self.travel_time_s > 0.0 { elapsed_s / self.travel_time_s } else { 0.0 };
        let experienced = PropertyLink {
            from: self.from,
            to: self.to,
            distance_km: self.distance_km * fraction,
            speed_kph: self.speed_kph,
            travel_time_s: elapsed_s,
        };
        let remaining = PropertyLink {
            from: self.from,
            to: self.to,
            distance_km: self.distance_km * (1.0 - fraction),
            speed_kph: self.speed_kph,
            travel_time_s: self.travel_time_s - elapsed_s,
        };
        (experienced, remaining)
    }
}

/// A road network snapshot: generates routes, reports distance, and
/// resolves individual links (spec §1 in-scope interface).
pub trait RoadNetwork: Send + Sync {
    /// Computes a route between two cells. `None` if no route exists.
    fn route(&self, from: GeoId, to: GeoId) -> Option<Vec<PropertyLink>>;

    /// Road-network distance between two cells, in kilometers.
    fn distance_km(&self, from: GeoId, to: GeoId) -> f64;

    /// Looks up the link between two adjacent route waypoints, if the
    /// current network state still has one (spec §4.4's "link not found").
    fn link(&self, from: GeoId, to: GeoId) -> Option<PropertyLink>;
}

/// Straight-line routing over the hex grid: the route from `from` to `to`
/// is the H3 grid path between the two cells, each step a link at a fixed
/// `default_speed_kph`. Zero external dependencies, mirroring the teacher's
/// always-available `H3GridRouteProvider`.
#[derive(Debug, Clone, Copy)]
pub struct HaversineRoadNetwork {
    pub default_speed_kph: f64,
}

impl HaversineRoadNetwork {
    pub fn new(default_speed_kph: f64) -> Self {
        Self { default_speed_kph }
    }
}

impl Default for HaversineRoadNetwork {
    fn default() -> Self {
        Self { default_speed_kph: 40.0 }
    }
}

impl RoadNetwork for HaversineRoadNetwork {
    fn route(&self, from: GeoId, to: GeoId) -> Option<Vec<PropertyLink>> {
        if from == to {
            return Some(Vec::new());
        }
        let path = from.0.grid_path_cells(to.0).ok()?;
        let cells: Vec<GeoId> = path.collect::<Result<Vec<_>, _>>().ok()?.into_iter().map(GeoId).collect();
        if cells.len() < 2 {
            return None;
        }
        Some(
            cells
                .windows(2)
                .map(|pair| self.link(pair[0], pair[1]).expect("adjacent cells always link"))
                .collect(),
        )
    }

    fn distance_km(&self, from: GeoId, to: GeoId) -> f64 {
        geo::distance_km(from, to)
    }

    fn link(&self, from: GeoId, to: GeoId) -> Option<PropertyLink> {
        let distance_km = geo::distance_km(from, to);
        Some(PropertyLink::new(from, to, distance_km, self.default_speed_kph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h3o::{LatLng, Resolution};

    fn cell(lat: f64, lon: f64) -> GeoId {
        GeoId(LatLng::new(lat, lon).unwrap().to_cell(Resolution::Nine))
    }

    #[test]
    fn route_between_same_cell_is_empty() {
        let net = HaversineRoadNetwork::default();
        let a = cell(37.77, -122.42);
        assert_eq!(net.route(a, a), Some(Vec::new()));
    }

    #[test]
    fn link_always_resolves_for_haversine_network() {
        let net = HaversineRoadNetwork::default();
        let a = cell(37.77, -122.42);
        let b = cell(37.78, -122.41);
        assert!(net.link(a, b).is_some());
    }

    #[test]
    fn split_link_conserves_distance_and_time() {
        let link = PropertyLink::new(cell(0.0, 0.0), cell(0.0, 1.0), 10.0, 10.0);
        let (experienced, remaining) = link.split_at(link.travel_time_s / 2.0);
        assert!((experienced.distance_km + remaining.distance_km - link.distance_km).abs() < 1e-9);
        assert!((experienced.travel_time_s + remaining.travel_time_s - link.travel_time_s).abs() < 1e-9);
    }
}
