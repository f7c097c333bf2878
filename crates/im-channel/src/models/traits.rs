// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trait implemented by every channel mechanism the runtime can host

use crate::current::{CurrentContribution, IonAccumulator};
use crate::types::{HostEnvironment, Result};

/// Per-timestep passes a compartmental host runs over a mechanism.
///
/// Within one step the host calls `current` (and then `jacobian`) before
/// `advance`; every pass re-evaluates the kinetics it depends on.
pub trait ChannelMechanism: Send + Sync {
    /// Per-compartment state record
    type Instance: Send + Sync;

    /// Human-readable model name used in diagnostics
    fn model_name(&self) -> &'static str;

    /// Short mechanism suffix
    fn suffix(&self) -> &'static str;

    /// Number of ODE states per instance
    fn state_count(&self) -> usize;

    /// Reset an instance at voltage `v`
    fn init(&self, instance: &mut Self::Instance, v: f64, env: &HostEnvironment);

    /// Current pass: returns the node contribution and adds to the ion totals
    fn current(
        &self,
        instance: &mut Self::Instance,
        v: f64,
        ek: f64,
        ion: &mut IonAccumulator,
    ) -> CurrentContribution;

    /// Jacobian pass: conductance computed by the last `current` call
    fn jacobian(&self, instance: &Self::Instance) -> f64;

    /// Fixed-step state update over one timestep `dt`
    fn advance(&self, instance: &mut Self::Instance, v: f64, dt: f64) -> Result<()>;

    /// State derivative for a variable-step integrator
    fn ode_spec(&self, instance: &mut Self::Instance, v: f64) -> f64;

    /// Derivative rescaled for the integrator's implicit linear solve
    fn ode_matsol(&self, instance: &mut Self::Instance, v: f64, dt: f64) -> f64;

    /// Current state value (for the integrator's state vector)
    fn state(&self, instance: &Self::Instance) -> f64;

    /// Overwrite the state value (integrator write-back)
    fn set_state(&self, instance: &mut Self::Instance, value: f64);
}
