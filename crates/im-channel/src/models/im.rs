// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Cortical M Current
//!
//! Slow, non-inactivating potassium current with one activation gate.
//!
//! ## Model Dynamics
//!
//! ```text
//! Initialization (per reset):
//!     tadj     = 2.3 ^ ((celsius - 36) / 10)
//!     tau_peak = taumax / tadj
//!     (m_inf, tau_m) = kinetics(v)
//!     m        = 0                       (always closed at reset)
//!
//! State:
//!     dm/dt = (m_inf - m) / tau_m        (backward Euler by default)
//!
//! Current:
//!     ik = gkbar · m · (v - ek)
//! ```
//!
//! `tau_peak` is only refreshed by `init`, so a temperature change takes
//! effect at the next reset.

use std::sync::Arc;

use tracing::trace;

use super::traits::ChannelMechanism;
use crate::current::{ion_current, linearize_current, CurrentContribution, IonAccumulator};
use crate::exptable::ExpTable;
use crate::integrator::{self, StateMethod};
use crate::kinetics::{self, GatingKinetics};
use crate::types::{ChannelError, HostEnvironment, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Diagnostic name of the model
pub const MODEL_NAME: &str = "Cortical M current";

/// Mechanism suffix
pub const SUFFIX: &str = "im";

/// Default maximal conductance (S/cm²)
pub const DEFAULT_GKBAR: f64 = 1e-6;

/// Default maximal time constant at 36 °C (ms)
pub const DEFAULT_TAUMAX: f64 = 1000.0;

/// Model-wide configuration shared by every instance
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KineticsParams {
    /// Maximal time constant at 36 °C (ms)
    pub taumax: f64,

    /// Route exponentials through the lookup table
    pub use_table: bool,

    /// Fixed-step update rule
    pub method: StateMethod,
}

impl KineticsParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values that would break `tau_m > 0`
    pub fn validate(&self) -> Result<()> {
        if !(self.taumax.is_finite() && self.taumax > 0.0) {
            return Err(ChannelError::InvalidParameter {
                name: "taumax",
                reason: format!("must be finite and positive, got {}", self.taumax),
            });
        }
        Ok(())
    }
}

impl Default for KineticsParams {
    fn default() -> Self {
        Self {
            taumax: DEFAULT_TAUMAX,
            use_table: true,
            method: StateMethod::BackwardEuler,
        }
    }
}

/// Per-compartment state of one M-current instance
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImChannel {
    /// Maximal conductance (S/cm²), fixed after setup
    pub gkbar: f64,

    /// Activation gate
    pub m: f64,

    /// Steady-state activation at the last evaluated voltage
    pub m_inf: f64,

    /// Time constant at the last evaluated voltage (ms)
    pub tau_m: f64,

    /// Temperature-scaled maximal time constant (ms)
    pub tau_peak: f64,

    /// Temperature adjustment factor
    pub tadj: f64,

    /// Last computed potassium current (mA/cm²)
    pub ik: f64,

    /// Last computed state derivative
    pub dm: f64,

    /// Conductance from the last current pass (S/cm²)
    pub g: f64,
}

impl ImChannel {
    /// Fresh instance; call `ImModel::init` before stepping
    pub fn new(gkbar: f64) -> Self {
        Self {
            gkbar,
            m: 0.0,
            m_inf: 0.0,
            tau_m: 0.0,
            tau_peak: 0.0,
            tadj: 1.0,
            ik: 0.0,
            dm: 0.0,
            g: 0.0,
        }
    }

    #[inline]
    fn kinetics(&self) -> GatingKinetics {
        GatingKinetics {
            m_inf: self.m_inf,
            tau_m: self.tau_m,
        }
    }
}

impl Default for ImChannel {
    fn default() -> Self {
        Self::new(DEFAULT_GKBAR)
    }
}

/// M-current mechanism: parameters plus the shared exponential table
#[derive(Debug, Clone, Default)]
pub struct ImModel {
    params: KineticsParams,
    table: Arc<ExpTable>,
}

impl ImModel {
    /// Model with its own (lazily built) table
    pub fn new(params: KineticsParams) -> Self {
        Self::with_table(params, Arc::new(ExpTable::new()))
    }

    /// Model sharing an existing table with other models
    pub fn with_table(params: KineticsParams, table: Arc<ExpTable>) -> Self {
        Self { params, table }
    }

    pub fn params(&self) -> &KineticsParams {
        &self.params
    }

    /// Shared exponential table
    pub fn table(&self) -> &Arc<ExpTable> {
        &self.table
    }

    /// Switch between table interpolation and the exact exponential.
    ///
    /// Samples do not depend on this flag, so an already built table is kept.
    pub fn set_use_table(&mut self, use_table: bool) {
        self.params.use_table = use_table;
    }

    /// Change `taumax`; instances pick it up at their next `init`
    pub fn set_taumax(&mut self, taumax: f64) {
        self.params.taumax = taumax;
    }

    pub fn set_method(&mut self, method: StateMethod) {
        self.params.method = method;
    }

    /// Clamped exponential as configured (table or exact)
    #[inline]
    pub fn exptable(&self, x: f64) -> f64 {
        self.table.lookup(x, self.params.use_table)
    }

    /// Evaluate `m_inf` and `tau_m` at `v` into `channel`
    #[inline]
    pub fn evaluate_fct(&self, channel: &mut ImChannel, v: f64) {
        let k = kinetics::evaluate_gating(v, channel.tau_peak, |x| self.exptable(x));
        channel.m_inf = k.m_inf;
        channel.tau_m = k.tau_m;
    }

    /// Potassium current at `v` with the instance's present gate
    #[inline]
    pub fn current_at(&self, channel: &mut ImChannel, v: f64, ek: f64) -> f64 {
        channel.ik = ion_current(channel.gkbar, channel.m, v, ek);
        channel.ik
    }

    fn step_failure(reason: String, location: &'static str) -> ChannelError {
        ChannelError::StepFailed {
            model: MODEL_NAME,
            location,
            reason,
        }
    }
}

impl ChannelMechanism for ImModel {
    type Instance = ImChannel;

    fn model_name(&self) -> &'static str {
        MODEL_NAME
    }

    fn suffix(&self) -> &'static str {
        SUFFIX
    }

    fn state_count(&self) -> usize {
        1
    }

    fn init(&self, channel: &mut ImChannel, v: f64, env: &HostEnvironment) {
        // tau_peak first so the kinetics below already see a positive peak
        channel.tadj = kinetics::temperature_adjustment(env.celsius);
        channel.tau_peak = self.params.taumax / channel.tadj;
        self.evaluate_fct(channel, v);
        channel.m = 0.0;
        channel.dm = 0.0;
    }

    fn current(
        &self,
        channel: &mut ImChannel,
        v: f64,
        ek: f64,
        ion: &mut IonAccumulator,
    ) -> CurrentContribution {
        let (gkbar, m) = (channel.gkbar, channel.m);
        let contribution = linearize_current(v, |v| ion_current(gkbar, m, v, ek), ion);
        channel.ik = contribution.rhs;
        channel.g = contribution.g;
        contribution
    }

    fn jacobian(&self, channel: &ImChannel) -> f64 {
        channel.g
    }

    fn advance(&self, channel: &mut ImChannel, v: f64, dt: f64) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ChannelError::InvalidTimestep(dt));
        }

        let stop = 0.5 * dt;
        let mut t = 0.0;
        while t < stop {
            self.evaluate_fct(channel, v);
            if !(channel.tau_m > 0.0) {
                return Err(Self::step_failure(
                    format!("time constant {} at v = {} mV", channel.tau_m, v),
                    concat!(file!(), ":", line!()),
                ));
            }
            let next = integrator::substep(channel.m, channel.kinetics(), dt, self.params.method);
            if !next.is_finite() {
                return Err(Self::step_failure(
                    format!("non-finite gate {} from m = {} at v = {} mV", next, channel.m, v),
                    concat!(file!(), ":", line!()),
                ));
            }
            channel.m = next;
            t += dt;
        }

        // Leave the derivative consistent with the updated gate
        self.ode_spec(channel, v);
        trace!(target: "im_channel", v, m = channel.m, dm = channel.dm, "advanced gate");
        Ok(())
    }

    fn ode_spec(&self, channel: &mut ImChannel, v: f64) -> f64 {
        self.evaluate_fct(channel, v);
        channel.dm = integrator::derivative(channel.m, channel.kinetics());
        channel.dm
    }

    fn ode_matsol(&self, channel: &mut ImChannel, v: f64, dt: f64) -> f64 {
        let dm = self.ode_spec(channel, v);
        channel.dm = integrator::implicit_rescale(dm, channel.tau_m, dt);
        channel.dm
    }

    fn state(&self, channel: &ImChannel) -> f64 {
        channel.m
    }

    fn set_state(&self, channel: &mut ImChannel, value: f64) {
        channel.m = value;
    }
}
