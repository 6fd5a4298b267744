//! Hierarchical hex-grid spatial index (spec §4.1).
//!
//! Grounded on the teacher's `spatial.rs`: same H3-backed `GeoId`, the same
//! global LRU-cached Haversine distance (`distance_km_between_cells`), the
//! same symmetric cache key trick. Generalized from a single flat index into
//! `GeoIndex<Id>`, one instance per entity kind, each carrying the two maps
//! (fine-grained `locations`, coarse-grained `search`) spec §4.1 calls for.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

use h3o::{CellIndex, LatLng, Resolution};
use lru::LruCache;

/// A cell in the hierarchical hex grid at a fixed resolution (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeoId(pub CellIndex);

impl GeoId {
    pub fn from_lat_lon(lat: f64, lon: f64, resolution: Resolution) -> Result<Self, h3o::error::InvalidLatLng> {
        let ll = LatLng::new(lat, lon)?;
        Ok(GeoId(ll.to_cell(resolution)))
    }

    pub fn resolution(self) -> Resolution {
        self.0.resolution()
    }

    /// Ancestor cell at a coarser resolution, used to derive a `search` key
    /// from a `locations` key (spec §4.1's fine/coarse split).
    pub fn parent(self, resolution: Resolution) -> Option<GeoId> {
        self.0.parent(resolution).map(GeoId)
    }

    pub fn grid_disk(self, k: u32) -> Vec<GeoId> {
        self.0.grid_disk::<Vec<_>>(k).into_iter().map(GeoId).collect()
    }
}

impl std::fmt::Display for GeoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn distance_km_uncached(a: CellIndex, b: CellIndex) -> f64 {
    let a: LatLng = a.into();
    let b: LatLng = b.into();
    let (lat1, lon1) = (a.lat().to_radians(), a.lng().to_radians());
    let (lat2, lon2) = (b.lat().to_radians(), b.lng().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    6371.0 * c
}

fn distance_cache() -> &'static Mutex<LruCache<(CellIndex, CellIndex), f64>> {
    static CACHE: OnceLock<Mutex<LruCache<(CellIndex, CellIndex), f64>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(10_000).expect("cache size must be non-zero"),
        ))
    })
}

/// Great-circle distance between two cells, in kilometers, LRU-cached
/// (spec §4.1 "minimizing great-circle distance from origin").
pub fn distance_km(a: GeoId, b: GeoId) -> f64 {
    let key = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
    let mut cache = distance_cache().lock().unwrap();
    *cache.get_or_insert(key, || distance_km_uncached(key.0, key.1))
}

/// Per-entity-kind spatial index: a fine `locations` map and a coarse
/// `search` map, both keyed by `GeoId`, holding the entity's own id type
/// (spec §4.1).
#[derive(Debug, Clone)]
pub struct GeoIndex<Id: Clone + Eq + Hash> {
    location_resolution: Resolution,
    search_resolution: Resolution,
    locations: HashMap<GeoId, Vec<Id>>,
    search: HashMap<GeoId, Vec<Id>>,
}

impl<Id: Clone + Eq + Hash> GeoIndex<Id> {
    pub fn new(location_resolution: Resolution, search_resolution: Resolution) -> Self {
        Self {
            location_resolution,
            search_resolution,
            locations: HashMap::new(),
            search: HashMap::new(),
        }
    }

    pub fn location_resolution(&self) -> Resolution {
        self.location_resolution
    }

    pub fn search_resolution(&self) -> Resolution {
        self.search_resolution
    }

    fn search_key(&self, fine: GeoId) -> GeoId {
        fine.parent(self.search_resolution).unwrap_or(fine)
    }

    /// Adds `id` at `fine`, updating both maps (spec §4.2 `add_*`).
    pub fn insert(&mut self, fine: GeoId, id: Id) {
        self.locations.entry(fine).or_default().push(id.clone());
        let coarse = self.search_key(fine);
        self.search.entry(coarse).or_default().push(id);
    }

    /// Removes `id` at `fine` from both maps (spec §4.2 `remove_*`).
    pub fn remove(&mut self, fine: GeoId, id: &Id) {
        if let Some(ids) = self.locations.get_mut(&fine) {
            ids.retain(|x| x != id);
            if ids.is_empty() {
                self.locations.remove(&fine);
            }
        }
        let coarse = self.search_key(fine);
        if let Some(ids) = self.search.get_mut(&coarse) {
            ids.retain(|x| x != id);
            if ids.is_empty() {
                self.search.remove(&coarse);
            }
        }
    }

    /// Moves `id` from `old` to `new` in one step (spec §4.2 `modify_*`:
    /// "if geoid changed, the indices are updated in one step").
    pub fn relocate(&mut self, old: GeoId, new: GeoId, id: &Id) {
        self.remove(old, id);
        self.insert(new, id.clone());
    }

    pub fn ids_at(&self, fine: GeoId) -> &[Id] {
        self.locations.get(&fine).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ring-expansion nearest-entity search (spec §4.1): starting at ring 0
    /// around `origin`'s coarse cell, gather candidates from the `search`
    /// map, resolve each to its fine position, filter by `is_valid`, and
    /// return the one minimizing great-circle distance. Expands ring by
    /// ring up to `max_ring`; returns `None` once exhausted.
    pub fn nearest_entity<F>(&self, origin: GeoId, max_ring: u32, fine_of: F, is_valid: impl Fn(&Id) -> bool) -> Option<Id>
    where
        F: Fn(&Id) -> GeoId,
    {
        let coarse_origin = self.search_key(origin);
        let mut seen: std::collections::HashSet<GeoId> = std::collections::HashSet::new();

        for ring in 0..=max_ring {
            let ring_cells: Vec<GeoId> = coarse_origin
                .grid_disk(ring)
                .into_iter()
                .filter(|c| seen.insert(*c))
                .collect();

            let mut best: Option<(Id, f64)> = None;
            for cell in ring_cells {
                for id in self.search.get(&cell).into_iter().flatten() {
                    if !is_valid(id) {
                        continue;
                    }
                    let d = distance_km(origin, fine_of(id));
                    let better = match &best {
                        Some((_, bd)) => d < *bd,
                        None => true,
                    };
                    if better {
                        best = Some((id.clone(), d));
                    }
                }
            }
            if let Some((id, _)) = best {
                return Some(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(lat: f64, lon: f64, res: Resolution) -> GeoId {
        GeoId::from_lat_lon(lat, lon, res).expect("valid lat/lon")
    }

    #[test]
    fn insert_then_remove_leaves_index_empty() {
        let mut idx: GeoIndex<String> = GeoIndex::new(Resolution::Nine, Resolution::Six);
        let g = cell(37.77, -122.42, Resolution::Nine);
        idx.insert(g, "v1".to_string());
        assert_eq!(idx.ids_at(g), &["v1".to_string()]);
        idx.remove(g, &"v1".to_string());
        assert!(idx.ids_at(g).is_empty());
    }

    #[test]
    fn nearest_entity_prefers_closer_candidate() {
        let mut idx: GeoIndex<String> = GeoIndex::new(Resolution::Nine, Resolution::Six);
        let origin = cell(37.7749, -122.4194, Resolution::Nine);
        let near = cell(37.7750, -122.4195, Resolution::Nine);
        let far = cell(38.9, -121.0, Resolution::Nine);
        idx.insert(near, "near".to_string());
        idx.insert(far, "far".to_string());

        let positions: HashMap<String, GeoId> =
            [("near".to_string(), near), ("far".to_string(), far)].into_iter().collect();

        let found = idx.nearest_entity(origin, 6, |id| positions[id], |_| true);
        assert_eq!(found, Some("near".to_string()));
    }

    #[test]
    fn nearest_entity_returns_none_when_exhausted() {
        let idx: GeoIndex<String> = GeoIndex::new(Resolution::Nine, Resolution::Six);
        let origin = cell(0.0, 0.0, Resolution::Nine);
        let found = idx.nearest_entity(origin, 2, |_| origin, |_| true);
        assert_eq!(found, None);
    }
}
