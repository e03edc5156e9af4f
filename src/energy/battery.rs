//! Battery energy accounting.
//!
//! Discharge integrates a power draw linearly. Charging advances along two
//! reference time/energy curves (winter and summer) and blends the results
//! by calendar month.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::error::BatteryError;

/// Samples per generated reference curve.
const CURVE_SAMPLES: usize = 64;

/// Blended energies this close to capacity count as full.
const FULL_EPSILON_WH: f64 = 1e-9;

/// Shape factor of the generated curves; higher tapers more towards full.
const CURVE_TAPER: f64 = 3.0;

/// Monotonic time (s) to energy (Wh) lookup table.
#[derive(Clone, Debug, PartialEq)]
pub struct ChargeCurve {
    samples: Vec<(f64, f64)>,
}

impl ChargeCurve {
    /// Curve from `(seconds, watt_hours)` samples, strictly increasing in both.
    pub fn new(samples: Vec<(f64, f64)>) -> Result<Self, BatteryError> {
        if samples.len() < 2 {
            return Err(BatteryError::InvalidCurve(format!(
                "{} samples, at least 2 required",
                samples.len()
            )));
        }
        for pair in samples.windows(2) {
            let ((t0, e0), (t1, e1)) = (pair[0], pair[1]);
            if !(t1 > t0 && e1 > e0) {
                return Err(BatteryError::InvalidCurve(format!(
                    "samples ({}, {}) -> ({}, {}) are not strictly increasing",
                    t0, e0, t1, e1
                )));
            }
        }
        Ok(Self { samples })
    }

    /// Tapered curve reaching `capacity_wh` after `full_charge_s` seconds.
    pub fn tapered(capacity_wh: f64, full_charge_s: f64) -> Result<Self, BatteryError> {
        let norm = 1.0 - (-CURVE_TAPER).exp();
        let samples = (0..CURVE_SAMPLES)
            .map(|i| {
                let x = i as f64 / (CURVE_SAMPLES - 1) as f64;
                let energy = if i + 1 == CURVE_SAMPLES {
                    capacity_wh
                } else {
                    capacity_wh * (1.0 - (-CURVE_TAPER * x).exp()) / norm
                };
                (x * full_charge_s, energy)
            })
            .collect();
        Self::new(samples)
    }

    /// Energy range covered by the curve.
    pub fn energy_range(&self) -> (f64, f64) {
        (self.samples[0].1, self.samples[self.samples.len() - 1].1)
    }

    /// Charging time at which the curve holds `energy_wh`.
    pub fn time_at(&self, energy_wh: f64) -> Result<f64, BatteryError> {
        let (min_wh, max_wh) = self.energy_range();
        if !(energy_wh >= min_wh && energy_wh <= max_wh) {
            return Err(BatteryError::EnergyOutOfRange {
                energy_wh,
                min_wh,
                max_wh,
            });
        }
        let idx = self.samples.partition_point(|&(_, e)| e < energy_wh);
        if idx == 0 {
            return Ok(self.samples[0].0);
        }
        let (t0, e0) = self.samples[idx - 1];
        let (t1, e1) = self.samples[idx];
        Ok(t0 + (energy_wh - e0) / (e1 - e0) * (t1 - t0))
    }

    /// Energy after `time_s` seconds of charging, saturating at both ends.
    pub fn energy_at(&self, time_s: f64) -> f64 {
        let first = self.samples[0];
        let last = self.samples[self.samples.len() - 1];
        if time_s <= first.0 {
            return first.1;
        }
        if time_s >= last.0 {
            return last.1;
        }
        let idx = self.samples.partition_point(|&(t, _)| t < time_s);
        let (t0, e0) = self.samples[idx - 1];
        let (t1, e1) = self.samples[idx];
        e0 + (time_s - t0) / (t1 - t0) * (e1 - e0)
    }
}

/// Winter and summer reference curves.
#[derive(Clone, Debug, PartialEq)]
pub struct ChargeProfile {
    pub winter: ChargeCurve,
    pub summer: ChargeCurve,
}

impl ChargeProfile {
    /// Generated profile for a battery of `capacity_wh`.
    pub fn generated(capacity_wh: f64, winter_full_s: f64, summer_full_s: f64) -> Result<Self, BatteryError> {
        Ok(Self {
            winter: ChargeCurve::tapered(capacity_wh, winter_full_s)?,
            summer: ChargeCurve::tapered(capacity_wh, summer_full_s)?,
        })
    }
}

/// Weight of the winter curve for a calendar month (1 = January).
///
/// 1.0 in January, 0.0 in July.
pub fn seasonal_weight(month: u32) -> f64 {
    let m = month.clamp(1, 12) as f64;
    (1.0 + (2.0 * PI * (m - 1.0) / 12.0).cos()) / 2.0
}

/// Battery with present energy and a shared charge profile.
#[derive(Clone, Debug)]
pub struct Battery {
    capacity_wh: f64,
    energy_wh: f64,
    profile: Arc<ChargeProfile>,
}

impl Battery {
    /// Battery at `soc_percent` (clamped to 0..=100).
    pub fn new(capacity_wh: f64, soc_percent: f64, profile: Arc<ChargeProfile>) -> Self {
        Self {
            capacity_wh,
            energy_wh: capacity_wh * soc_percent.clamp(0.0, 100.0) / 100.0,
            profile,
        }
    }

    #[inline]
    pub fn capacity_wh(&self) -> f64 {
        self.capacity_wh
    }

    #[inline]
    pub fn energy_wh(&self) -> f64 {
        self.energy_wh
    }

    /// State of charge in percent.
    #[inline]
    pub fn soc(&self) -> f64 {
        100.0 * self.energy_wh / self.capacity_wh
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.energy_wh >= self.capacity_wh
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.energy_wh <= 0.0
    }

    /// Overwrite the charge level.
    pub fn set_soc(&mut self, soc_percent: f64) {
        self.energy_wh = self.capacity_wh * soc_percent.clamp(0.0, 100.0) / 100.0;
    }

    /// Draw `power_w` for `dt` seconds. Energy never drops below zero.
    pub fn discharge(&mut self, power_w: f64, dt: f64) {
        self.energy_wh = (self.energy_wh - power_w * dt / 3600.0).max(0.0);
    }

    /// Charge for `dt` seconds in the given calendar month.
    ///
    /// Fails if the present energy lies outside a reference curve.
    pub fn charge(&mut self, dt: f64, month: u32) -> Result<(), BatteryError> {
        if self.is_full() {
            return Ok(());
        }

        let advance = |curve: &ChargeCurve| -> Result<f64, BatteryError> {
            let t = curve.time_at(self.energy_wh)?;
            Ok(curve.energy_at(t + dt))
        };
        let winter = advance(&self.profile.winter)?;
        let summer = advance(&self.profile.summer)?;

        let w = seasonal_weight(month);
        let blended = w * winter + (1.0 - w) * summer;
        self.energy_wh = if blended >= self.capacity_wh - FULL_EPSILON_WH {
            self.capacity_wh
        } else {
            blended
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Arc<ChargeProfile> {
        Arc::new(ChargeProfile::generated(423.0, 10800.0, 7200.0).unwrap())
    }

    #[test]
    fn test_curve_rejects_non_monotonic() {
        assert!(ChargeCurve::new(vec![(0.0, 0.0)]).is_err());
        assert!(ChargeCurve::new(vec![(0.0, 0.0), (1.0, 0.0)]).is_err());
        assert!(ChargeCurve::new(vec![(0.0, 0.0), (1.0, 1.0), (1.0, 2.0)]).is_err());
    }

    #[test]
    fn test_curve_lookup_both_directions() {
        let curve = ChargeCurve::new(vec![(0.0, 0.0), (10.0, 50.0), (20.0, 60.0)]).unwrap();
        assert!((curve.energy_at(5.0) - 25.0).abs() < 1e-12);
        assert!((curve.energy_at(15.0) - 55.0).abs() < 1e-12);
        assert_eq!(curve.energy_at(100.0), 60.0);
        assert!((curve.time_at(55.0).unwrap() - 15.0).abs() < 1e-12);
        assert!(matches!(
            curve.time_at(61.0),
            Err(BatteryError::EnergyOutOfRange { .. })
        ));
    }

    #[test]
    fn test_tapered_curve_spans_capacity() {
        let curve = ChargeCurve::tapered(423.0, 7200.0).unwrap();
        let (lo, hi) = curve.energy_range();
        assert_eq!(lo, 0.0);
        assert!((hi - 423.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_weight() {
        assert!((seasonal_weight(1) - 1.0).abs() < 1e-12);
        assert!(seasonal_weight(7).abs() < 1e-12);
        assert!((seasonal_weight(4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_discharge_clamps_at_zero() {
        let mut battery = Battery::new(423.0, 1.0, profile());
        battery.discharge(700.0, 3600.0);
        assert_eq!(battery.energy_wh(), 0.0);
        assert!(battery.is_empty());
    }

    #[test]
    fn test_discharge_linear() {
        let mut battery = Battery::new(100.0, 50.0, profile());
        battery.discharge(360.0, 100.0);
        assert!((battery.energy_wh() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_summer_charges_faster() {
        let mut winter = Battery::new(423.0, 20.0, profile());
        let mut summer = winter.clone();
        winter.charge(60.0, 1).unwrap();
        summer.charge(60.0, 7).unwrap();
        assert!(summer.energy_wh() > winter.energy_wh());
        assert!(winter.soc() > 20.0);
    }

    #[test]
    fn test_charge_never_exceeds_capacity() {
        let mut battery = Battery::new(423.0, 99.0, profile());
        for _ in 0..1000 {
            battery.charge(60.0, 3).unwrap();
        }
        assert!(battery.is_full());
        assert!(battery.energy_wh() <= battery.capacity_wh());
    }

    #[test]
    fn test_charge_out_of_curve_range_is_fatal() {
        // Curves only cover half the capacity
        let curve = ChargeCurve::new(vec![(0.0, 0.0), (100.0, 50.0)]).unwrap();
        let profile = Arc::new(ChargeProfile {
            winter: curve.clone(),
            summer: curve,
        });
        let mut battery = Battery::new(100.0, 80.0, profile);
        assert!(battery.charge(1.0, 1).is_err());
    }
}
