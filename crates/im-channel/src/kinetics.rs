// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gating Kinetics
//!
//! Steady-state activation and relaxation time of the M-current gate.
//!
//! ```text
//! m_inf(v) = 1 / (1 + exp(-(v + 35) / 10))
//! tau_m(v) = tau_peak / (3.3·exp((v + 35) / 20) + exp(-(v + 35) / 20))
//!
//! tadj     = 2.3 ^ ((celsius - 36) / 10)
//! tau_peak = taumax / tadj
//! ```
//!
//! The exponential is injected so the same formulas run on the table or on
//! the exact clamped function. When both `tau_m` exponentials saturate to 0
//! the time constant is `+inf`, which still satisfies `tau_m > 0`.

/// Half-activation voltage (mV)
pub const HALF_ACTIVATION_MV: f64 = -35.0;

/// Slope of the activation sigmoid (mV)
pub const ACTIVATION_SLOPE_MV: f64 = 10.0;

/// Slope of the time-constant bell curve (mV)
pub const TAU_SLOPE_MV: f64 = 20.0;

/// Weight of the depolarizing branch of the time-constant curve
pub const TAU_ASYMMETRY: f64 = 3.3;

/// Temperature coefficient per 10 °C
pub const Q10: f64 = 2.3;

/// Temperature the kinetics were measured at (°C)
pub const REFERENCE_CELSIUS: f64 = 36.0;

/// Kinetic parameters at one voltage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatingKinetics {
    /// Steady-state open fraction
    pub m_inf: f64,

    /// Relaxation time constant (ms)
    pub tau_m: f64,
}

/// Evaluate `m_inf` and `tau_m` at voltage `v`.
///
/// `tau_peak` must be positive; it is not checked here.
#[inline]
pub fn evaluate_gating<E>(v: f64, tau_peak: f64, exp: E) -> GatingKinetics
where
    E: Fn(f64) -> f64,
{
    let shifted = v - HALF_ACTIVATION_MV;
    let m_inf = 1.0 / (1.0 + exp(-shifted / ACTIVATION_SLOPE_MV));
    let tau_m = tau_peak
        / (TAU_ASYMMETRY * exp(shifted / TAU_SLOPE_MV) + exp(-shifted / TAU_SLOPE_MV));
    GatingKinetics { m_inf, tau_m }
}

/// Temperature adjustment factor relative to 36 °C
#[inline]
pub fn temperature_adjustment(celsius: f64) -> f64 {
    Q10.powf((celsius - REFERENCE_CELSIUS) / 10.0)
}

/// Peak time constant at `celsius` for a model whose maximum is `taumax`
#[inline]
pub fn peak_time_constant(taumax: f64, celsius: f64) -> f64 {
    taumax / temperature_adjustment(celsius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exptable::{exp_clamped, ExpTable};

    #[test]
    fn test_half_activation_point() {
        let k = evaluate_gating(-35.0, 1000.0, exp_clamped);
        assert_eq!(k.m_inf, 0.5);
        assert!((k.tau_m - 1000.0 / 4.3).abs() < 1e-9);
        assert!((k.tau_m - 232.558).abs() < 1e-3);
    }

    #[test]
    fn test_half_activation_point_through_table() {
        let table = ExpTable::new();
        let k = evaluate_gating(-35.0, 1000.0, |x| table.lookup(x, true));
        assert!((k.m_inf - 0.5).abs() < 1e-9);
        assert!((k.tau_m - 1000.0 / 4.3).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_over_unsaturated_range() {
        let table = ExpTable::new();
        let mut v = -280.0;
        while v <= 210.0 {
            for k in [
                evaluate_gating(v, 1000.0, exp_clamped),
                evaluate_gating(v, 1000.0, |x| table.lookup(x, true)),
            ] {
                assert!(k.m_inf > 0.0 && k.m_inf < 1.0, "m_inf({v}) = {}", k.m_inf);
                assert!(k.tau_m > 0.0, "tau_m({v}) = {}", k.tau_m);
            }
            v += 0.5;
        }
    }

    #[test]
    fn test_activation_is_monotonic() {
        let mut last = 0.0;
        for step in 0..200 {
            let v = -120.0 + step as f64;
            let k = evaluate_gating(v, 1000.0, exp_clamped);
            assert!(k.m_inf > last);
            last = k.m_inf;
        }
    }

    #[test]
    fn test_saturated_tau_is_infinite_not_negative() {
        let k = evaluate_gating(600.0, 1000.0, exp_clamped);
        assert!(k.tau_m.is_infinite() && k.tau_m > 0.0);
    }

    #[test]
    fn test_temperature_scaling() {
        assert_eq!(temperature_adjustment(36.0), 1.0);
        assert!((temperature_adjustment(46.0) - 2.3).abs() < 1e-12);
        assert_eq!(peak_time_constant(1000.0, 36.0), 1000.0);
        assert!((peak_time_constant(1000.0, 26.0) - 2300.0).abs() < 1e-9);
    }
}
