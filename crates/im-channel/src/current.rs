// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Channel Current and Conductance
//!
//! ```text
//! ik = gkbar · m · (v - ek)
//!
//! linearization (fixed step δ = 0.001 mV):
//!     g_raw     = i(v + δ)
//!     rhs       = i(v)                 (also the reported ik)
//!     dik/dv   += (i(v + δ) - i(v)) / δ
//!     g         = (g_raw - rhs) / δ
//! ```
//!
//! The per-node ion accumulator is owned by the host, which zeroes it before
//! each current pass. Mechanisms only add to it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Voltage perturbation for the numerical conductance (mV)
pub const VOLTAGE_PERTURBATION_MV: f64 = 0.001;

/// Ohmic potassium current density
#[inline]
pub fn ion_current(gkbar: f64, m: f64, v: f64, ek: f64) -> f64 {
    gkbar * m * (v - ek)
}

/// Potassium totals for one node, summed over every contributing mechanism
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IonAccumulator {
    /// Total potassium current
    pub ik: f64,

    /// Total d(ik)/dv
    pub dikdv: f64,
}

impl IonAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero both totals. Host-side; mechanisms never call this.
    pub fn reset(&mut self) {
        self.ik = 0.0;
        self.dikdv = 0.0;
    }
}

/// One mechanism's contribution to the node equations
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurrentContribution {
    /// Conductance for the matrix diagonal
    pub g: f64,

    /// Current at the unperturbed voltage, subtracted from the node RHS
    pub rhs: f64,
}

/// Linearize `current` around `v` and fold the ionic part into `ion`.
pub fn linearize_current<F>(v: f64, mut current: F, ion: &mut IonAccumulator) -> CurrentContribution
where
    F: FnMut(f64) -> f64,
{
    let g_raw = current(v + VOLTAGE_PERTURBATION_MV);
    let dik = g_raw;
    let rhs = current(v);
    let ik = rhs;
    ion.dikdv += (dik - ik) / VOLTAGE_PERTURBATION_MV;
    ion.ik += ik;
    CurrentContribution {
        g: (g_raw - rhs) / VOLTAGE_PERTURBATION_MV,
        rhs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ion_current() {
        assert!((ion_current(1e-6, 0.5, -70.0, -90.0) - 1e-5).abs() < 1e-18);
        assert_eq!(ion_current(1e-6, 0.5, -90.0, -90.0), 0.0);
        assert_eq!(ion_current(1e-6, 0.0, -30.0, -90.0), 0.0);
    }

    #[test]
    fn test_linearization_recovers_slope() {
        let mut ion = IonAccumulator::new();
        let c = linearize_current(-70.0, |v| ion_current(1e-6, 0.5, v, -90.0), &mut ion);

        assert!((c.rhs - 1e-5).abs() < 1e-18);
        assert!((c.g - 5e-7).abs() < 1e-12);
        assert!((ion.ik - 1e-5).abs() < 1e-18);
        assert!((ion.dikdv - 5e-7).abs() < 1e-12);
    }

    #[test]
    fn test_accumulator_only_adds() {
        let mut ion = IonAccumulator { ik: 2.0, dikdv: 3.0 };
        let c = linearize_current(-70.0, |v| ion_current(1e-6, 0.5, v, -90.0), &mut ion);
        assert!((ion.ik - (2.0 + c.rhs)).abs() < 1e-15);
        assert!((ion.dikdv - (3.0 + c.g)).abs() < 1e-12);

        ion.reset();
        assert_eq!(ion, IonAccumulator::default());
    }

    #[test]
    fn test_perturbation_order() {
        // The last evaluation is at the unperturbed voltage
        let mut seen = Vec::new();
        let mut ion = IonAccumulator::new();
        linearize_current(
            -50.0,
            |v| {
                seen.push(v);
                v
            },
            &mut ion,
        );
        assert_eq!(seen.len(), 2);
        assert!((seen[0] - (-50.0 + VOLTAGE_PERTURBATION_MV)).abs() < 1e-12);
        assert_eq!(seen[1], -50.0);
    }
}
