//! `EnergySource` (spec §3): the battery/fuel state carried by a vehicle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyType {
    Battery,
    Gas,
}

/// A vehicle's power source. `soc` (state of charge) is always kept in
/// `[0, 1]` (spec §3 invariant, enforced at every builder).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySource {
    pub energy_type: EnergyType,
    pub capacity_kwh: f64,
    pub soc: f64,
    pub ideal_energy_limit_kwh: f64,
    pub max_charge_acceptance_kw: f64,
}

impl EnergySource {
    pub fn new(energy_type: EnergyType, capacity_kwh: f64, ideal_energy_limit_kwh: f64, max_charge_acceptance_kw: f64) -> Self {
        Self {
            energy_type,
            capacity_kwh,
            soc: 1.0,
            ideal_energy_limit_kwh,
            max_charge_acceptance_kw,
        }
    }

    pub fn with_soc(mut self, soc: f64) -> Self {
        self.soc = soc.clamp(0.0, 1.0);
        self
    }

    pub fn energy_kwh(&self) -> f64 {
        self.capacity_kwh * self.soc
    }

    /// Discharges `kwh`, clamping at empty (spec doesn't define over-discharge
    /// behavior; clamping rather than going negative keeps `soc` a valid ratio).
    pub fn discharge_kwh(self, kwh: f64) -> Self {
        let remaining = (self.energy_kwh() - kwh).max(0.0);
        self.with_soc(if self.capacity_kwh > 0.0 { remaining / self.capacity_kwh } else { 0.0 })
    }

    /// Charges at `kw` for `duration_seconds`, clamping at full capacity
    /// (spec §4.3 "advance the energy source via the charger's power curve
    /// for timestep_duration_seconds").
    pub fn charge_for(self, kw: f64, duration_seconds: u64) -> Self {
        let applied_kw = kw.min(self.max_charge_acceptance_kw);
        let added_kwh = applied_kw * (duration_seconds as f64 / 3600.0);
        let new_kwh = (self.energy_kwh() + added_kwh).min(self.capacity_kwh);
        self.with_soc(if self.capacity_kwh > 0.0 { new_kwh / self.capacity_kwh } else { 0.0 })
    }

    /// Whether the ideal charge limit has been reached (spec §4.3's
    /// `ChargingStation`/`ChargingBase` terminal condition "SOC ≥
    /// ideal_limit").
    pub fn ideal_limit_reached(&self) -> bool {
        self.energy_kwh() >= self.ideal_energy_limit_kwh
    }

    pub fn low_soc(&self, threshold: f64) -> bool {
        self.soc < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery() -> EnergySource {
        EnergySource::new(EnergyType::Battery, 100.0, 90.0, 50.0).with_soc(1.0)
    }

    #[test]
    fn discharge_clamps_at_zero() {
        let e = battery().with_soc(0.01).discharge_kwh(50.0);
        assert_eq!(e.soc, 0.0);
    }

    #[test]
    fn charge_for_respects_acceptance_limit_and_capacity() {
        let e = battery().with_soc(0.0).charge_for(1000.0, 3600);
        // max_charge_acceptance_kw caps the applied power at 50kW for 1 hour = 50kWh.
        assert!((e.energy_kwh() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn ideal_limit_reached_compares_energy_not_soc() {
        let e = battery().with_soc(0.95);
        assert!(e.ideal_limit_reached());
        let e = battery().with_soc(0.5);
        assert!(!e.ideal_limit_reached());
    }
}
