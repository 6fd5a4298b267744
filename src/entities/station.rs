//! `Station` (spec §3): stall counters per charger.

use std::collections::{BTreeMap, BTreeSet};

use crate::ids::{ChargerId, MembershipId, StationId};
use crate::geo::GeoId;

/// Total/available stall counts for one charger at a station. Invariant
/// (spec §3): `0 ≤ available ≤ total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargerStalls {
    pub total: u32,
    pub available: u32,
}

impl ChargerStalls {
    pub fn new(total: u32) -> Self {
        Self { total, available: total }
    }

    /// Reserves a stall, returning `None` if none are free (spec §5:
    /// "attempting to acquire an unavailable stall must cause `enter` to
    /// return `(None, None)`" — the caller, not this method, turns that
    /// into a silent abort).
    pub fn checkout(self) -> Option<Self> {
        if self.available == 0 {
            None
        } else {
            Some(Self { available: self.available - 1, ..self })
        }
    }

    pub fn return_stall(self) -> Self {
        Self { available: (self.available + 1).min(self.total), ..self }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub geoid: GeoId,
    pub chargers: BTreeMap<ChargerId, ChargerStalls>,
    pub membership: BTreeSet<MembershipId>,
}

impl Station {
    pub fn new(id: StationId, geoid: GeoId) -> Self {
        Self { id, geoid, chargers: BTreeMap::new(), membership: BTreeSet::new() }
    }

    pub fn with_charger(mut self, charger_id: ChargerId, stall_count: u32) -> Self {
        self.chargers.insert(charger_id, ChargerStalls::new(stall_count));
        self
    }

    pub fn with_membership(mut self, membership: BTreeSet<MembershipId>) -> Self {
        self.membership = membership;
        self
    }

    pub fn has_available(&self, charger_id: &ChargerId) -> bool {
        self.chargers.get(charger_id).is_some_and(|s| s.available > 0)
    }

    pub fn checkout_stall(mut self, charger_id: &ChargerId) -> Option<Self> {
        let stalls = self.chargers.get(charger_id)?.checkout()?;
        self.chargers.insert(charger_id.clone(), stalls);
        Some(self)
    }

    pub fn return_stall(mut self, charger_id: &ChargerId) -> Self {
        if let Some(stalls) = self.chargers.get(charger_id) {
            let stalls = stalls.return_stall();
            self.chargers.insert(charger_id.clone(), stalls);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h3o::{LatLng, Resolution};

    fn geoid() -> GeoId {
        GeoId(LatLng::new(37.0, -122.0).unwrap().to_cell(Resolution::Nine))
    }

    #[test]
    fn checkout_then_return_restores_stall_counts() {
        let station = Station::new(StationId::new("s1"), geoid()).with_charger(ChargerId::new("c1"), 2);
        let station = station.checkout_stall(&ChargerId::new("c1")).unwrap();
        assert_eq!(station.chargers[&ChargerId::new("c1")].available, 1);
        let station = station.return_stall(&ChargerId::new("c1"));
        assert_eq!(station.chargers[&ChargerId::new("c1")].available, 2);
    }

    #[test]
    fn checkout_on_exhausted_charger_returns_none() {
        let station = Station::new(StationId::new("s1"), geoid()).with_charger(ChargerId::new("c1"), 1);
        let station = station.checkout_stall(&ChargerId::new("c1")).unwrap();
        assert!(station.checkout_stall(&ChargerId::new("c1")).is_none());
    }
}
