// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gate State Integration
//!
//! One linear relaxation process:
//!
//! ```text
//! dm/dt = (m_inf - m) / tau_m          ∂(dm/dt)/∂m = -1/tau_m
//!
//! backward Euler:  m' = m + dt · Dm / (1 + dt/tau_m)
//! forward Euler:   m' = m + dt · Dm
//! ```
//!
//! Because the equation is linear in `m`, dividing the derivative by
//! `1 - dt·(-1/tau_m)` gives the exact backward-Euler solution; the same
//! rescaling is what a variable-step solver asks for in its linear solve.

use crate::kinetics::GatingKinetics;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed-step update rule for the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StateMethod {
    /// Implicit (backward) Euler with the analytic Jacobian
    #[default]
    BackwardEuler,
    /// Explicit (forward) Euler
    ForwardEuler,
}

impl StateMethod {
    /// Parse a configuration name (`backward_euler` or `forward_euler`, any case)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "backward_euler" => Some(Self::BackwardEuler),
            "forward_euler" => Some(Self::ForwardEuler),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BackwardEuler => "backward_euler",
            Self::ForwardEuler => "forward_euler",
        }
    }
}

/// Raw state derivative `(m_inf - m) / tau_m`
#[inline]
pub fn derivative(m: f64, kinetics: GatingKinetics) -> f64 {
    (kinetics.m_inf - m) / kinetics.tau_m
}

/// Rescale a derivative for the backward-Euler linear solve
#[inline]
pub fn implicit_rescale(dm: f64, tau_m: f64, dt: f64) -> f64 {
    dm / (1.0 - dt * (-1.0 / tau_m))
}

/// One substep of size `dt` from state `m`
#[inline]
pub fn substep(m: f64, kinetics: GatingKinetics, dt: f64, method: StateMethod) -> f64 {
    let dm = derivative(m, kinetics);
    match method {
        StateMethod::BackwardEuler => m + dt * implicit_rescale(dm, kinetics.tau_m, dt),
        StateMethod::ForwardEuler => m + dt * dm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const K: GatingKinetics = GatingKinetics {
        m_inf: 0.5,
        tau_m: 1000.0 / 4.3,
    };

    #[test]
    fn test_derivative_sign() {
        assert!(derivative(0.0, K) > 0.0);
        assert!(derivative(1.0, K) < 0.0);
        assert_eq!(derivative(0.5, K), 0.0);
    }

    #[test]
    fn test_backward_euler_matches_closed_form() {
        let dt = 0.025;
        let m = 0.1;
        let expected = (m + dt * K.m_inf / K.tau_m) / (1.0 + dt / K.tau_m);
        let got = substep(m, K, dt, StateMethod::BackwardEuler);
        assert!((got - expected).abs() < 1e-15);
    }

    #[test]
    fn test_backward_euler_never_overshoots() {
        // dt far beyond tau: implicit step lands between m and m_inf
        let fast = GatingKinetics { m_inf: 0.8, tau_m: 0.01 };
        let next = substep(0.0, fast, 10.0, StateMethod::BackwardEuler);
        assert!(next > 0.0 && next < 0.8);

        let explicit = substep(0.0, fast, 10.0, StateMethod::ForwardEuler);
        assert!(explicit > 1.0);
    }

    #[test]
    fn test_forward_euler_step() {
        let dt = 0.1;
        let got = substep(0.2, K, dt, StateMethod::ForwardEuler);
        assert!((got - (0.2 + dt * (0.5 - 0.2) / K.tau_m)).abs() < 1e-15);
    }

    #[test]
    fn test_implicit_rescale() {
        let dm = derivative(0.0, K);
        let dt = 0.5;
        let scaled = implicit_rescale(dm, K.tau_m, dt);
        assert!((scaled - dm / (1.0 + dt / K.tau_m)).abs() < 1e-15);
        assert!(scaled < dm);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(StateMethod::from_name("backward_euler"), Some(StateMethod::BackwardEuler));
        assert_eq!(StateMethod::from_name(" Forward_Euler "), Some(StateMethod::ForwardEuler));
        assert_eq!(StateMethod::from_name("implicit"), None);
        assert_eq!(StateMethod::from_name("rk4"), None);
        assert_eq!(StateMethod::default().name(), "backward_euler");
    }
}
