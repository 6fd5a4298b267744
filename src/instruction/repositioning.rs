//! `Repositioning` (spec §4.5): sends idle, fleet-less vehicles toward
//! predicted-demand cells.
//!
//! No demand-forecast model is in scope (spec §1: the forecast file is a
//! loader concern, not the core's); "predicted demand" is approximated here
//! by the nearest currently-unassigned request, found via the same
//! ring-expansion `GeoIndex::nearest_entity` the spatial index already
//! provides (spec §4.1) — reusing live demand as the forecast rather than
//! inventing a standalone prediction model.

use crate::config::Environment;
use crate::entities::Vehicle;
use crate::ids::RequestId;
use crate::state::SimulationState;
use crate::vehicle_state::VehicleState;

use super::Instruction;

#[derive(Debug, Clone, Copy)]
pub struct Repositioning {
    pub max_search_ring: u32,
}

impl Repositioning {
    pub fn new(max_search_ring: u32) -> Self {
        Self { max_search_ring }
    }

    pub fn generate_instructions(&self, sim: &SimulationState, _env: &Environment) -> (Self, Vec<Instruction>) {
        // Base-affiliated vehicles are BaseManagement's concern once idle long
        // enough; this generator only nudges vehicles with no home base.
        let eligible =
            |v: &Vehicle| v.driver_state.is_none() && matches!(&v.vehicle_state, VehicleState::Idle { idle_duration_s, .. } if *idle_duration_s > 0);

        let mut instructions = Vec::new();
        for vehicle in sim.get_vehicles(None, Some(&eligible)) {
            if let Some(destination) = self.nearest_demand_cell(sim, vehicle) {
                if destination != vehicle.geoid {
                    instructions.push(Instruction::Repositioning { vehicle_id: vehicle.id.clone(), destination });
                }
            }
        }
        (*self, instructions)
    }

    fn nearest_demand_cell(&self, sim: &SimulationState, vehicle: &Vehicle) -> Option<crate::geo::GeoId> {
        let is_unassigned = |id: &RequestId| sim.request(id).is_some_and(|r| !r.is_dispatched());
        let fine_of = |id: &RequestId| sim.request(id).map(|r| r.origin).unwrap_or(vehicle.geoid);
        let request_id = sim.request_index().nearest_entity(vehicle.geoid, self.max_search_ring, fine_of, is_unassigned)?;
        sim.request(&request_id).map(|r| r.origin)
    }
}

impl Default for Repositioning {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HiveConfig;
    use crate::entities::{EnergySource, EnergyType, Request};
    use crate::ids::{MechatronicsId, VehicleId};
    use crate::routing::HaversineRoadNetwork;
    use crate::state::ops;
    use crate::time::SimTime;
    use h3o::{LatLng, Resolution};
    use std::sync::Arc;

    fn geoid(lat: f64, lon: f64) -> crate::geo::GeoId {
        crate::geo::GeoId(LatLng::new(lat, lon).unwrap().to_cell(Resolution::Nine))
    }

    #[test]
    fn idle_fleet_less_vehicle_heads_toward_nearest_unassigned_request() {
        let sim = SimulationState::new(Arc::new(HaversineRoadNetwork::default()), 60, Resolution::Nine, Resolution::Six);
        let vehicle = Vehicle::new(
            VehicleId::new("v1"),
            geoid(37.0, -122.0),
            MechatronicsId::new("m1"),
            EnergySource::new(EnergyType::Battery, 50.0, 45.0, 20.0),
        )
        .with_vehicle_state(VehicleState::Idle { vehicle_id: VehicleId::new("v1"), idle_duration_s: 120 });
        let sim = ops::add_vehicle(&sim, vehicle).unwrap();

        let demand_cell = geoid(37.5, -122.4);
        let request = Request::new(RequestId::new("r1"), demand_cell, geoid(37.6, -122.5), SimTime::ZERO, SimTime(600), 1, 10.0);
        let sim = ops::add_request(&sim, request).unwrap();

        let env = Environment::new(HiveConfig::default());
        let (_next, instructions) = Repositioning::new(20).generate_instructions(&sim, &env);
        assert_eq!(instructions, vec![Instruction::Repositioning { vehicle_id: VehicleId::new("v1"), destination: demand_cell }]);
    }

    #[test]
    fn freshly_idle_vehicle_is_not_repositioned() {
        let sim = SimulationState::new(Arc::new(HaversineRoadNetwork::default()), 60, Resolution::Nine, Resolution::Six);
        let vehicle = Vehicle::new(
            VehicleId::new("v1"),
            geoid(37.0, -122.0),
            MechatronicsId::new("m1"),
            EnergySource::new(EnergyType::Battery, 50.0, 45.0, 20.0),
        );
        let sim = ops::add_vehicle(&sim, vehicle).unwrap();
        let env = Environment::new(HiveConfig::default());
        let (_next, instructions) = Repositioning::default().generate_instructions(&sim, &env);
        assert!(instructions.is_empty());
    }
}
