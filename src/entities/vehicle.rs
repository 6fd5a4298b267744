//! `Vehicle` (spec §3).

use std::collections::BTreeSet;

use crate::entities::EnergySource;
use crate::geo::GeoId;
use crate::ids::{BaseId, MechatronicsId, MembershipId, VehicleId};
use crate::vehicle_state::{VehicleState, VehicleStateKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub energy_source: EnergySource,
    pub vehicle_state: VehicleState,
    pub membership: BTreeSet<MembershipId>,
    /// Home-base id for human-driven vehicles (spec §3); `None` for
    /// autonomous/fleet vehicles with no base affinity.
    pub driver_state: Option<BaseId>,
    pub mechatronics_id: MechatronicsId,
    /// Current position, derived from `vehicle_state` and kept consistent
    /// with it by every op that moves the vehicle (spec §3: "current geoid
    /// (derived from state's position)").
    pub geoid: GeoId,
}

impl Vehicle {
    pub fn new(id: VehicleId, geoid: GeoId, mechatronics_id: MechatronicsId, energy_source: EnergySource) -> Self {
        Self {
            vehicle_state: VehicleState::idle(id.clone()),
            id,
            energy_source,
            membership: BTreeSet::new(),
            driver_state: None,
            mechatronics_id,
            geoid,
        }
    }

    pub fn with_vehicle_state(mut self, state: VehicleState) -> Self {
        self.vehicle_state = state;
        self
    }

    pub fn with_geoid(mut self, geoid: GeoId) -> Self {
        self.geoid = geoid;
        self
    }

    pub fn with_energy_source(mut self, energy_source: EnergySource) -> Self {
        self.energy_source = energy_source;
        self
    }

    pub fn with_membership(mut self, membership: BTreeSet<MembershipId>) -> Self {
        self.membership = membership;
        self
    }

    pub fn with_driver_state(mut self, base_id: Option<BaseId>) -> Self {
        self.driver_state = base_id;
        self
    }

    pub fn state_kind(&self) -> VehicleStateKind {
        self.vehicle_state.kind()
    }
}
