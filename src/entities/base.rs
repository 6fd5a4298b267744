//! `Base` (spec §3): a depot with a pool of plain (non-charging) stalls,
//! optionally co-located with a [`crate::entities::Station`].

use std::collections::BTreeSet;

use crate::geo::GeoId;
use crate::ids::{BaseId, MembershipId, StationId};

#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    pub id: BaseId,
    pub geoid: GeoId,
    pub total_stalls: u32,
    pub available_stalls: u32,
    pub station_id: Option<StationId>,
    pub membership: BTreeSet<MembershipId>,
}

impl Base {
    pub fn new(id: BaseId, geoid: GeoId, total_stalls: u32, station_id: Option<StationId>) -> Self {
        Self {
            id,
            geoid,
            total_stalls,
            available_stalls: total_stalls,
            station_id,
            membership: BTreeSet::new(),
        }
    }

    pub fn with_membership(mut self, membership: BTreeSet<MembershipId>) -> Self {
        self.membership = membership;
        self
    }

    pub fn has_available_stall(&self) -> bool {
        self.available_stalls > 0
    }

    /// Reserves a stall, returning `None` if none are free (spec §8 scenario
    /// 2: a second checkout on a zero-stall base returns `None`).
    pub fn checkout_stall(self) -> Option<Self> {
        if self.available_stalls == 0 {
            None
        } else {
            Some(Self { available_stalls: self.available_stalls - 1, ..self })
        }
    }

    pub fn return_stall(self) -> Self {
        Self { available_stalls: (self.available_stalls + 1).min(self.total_stalls), ..self }
    }
}
