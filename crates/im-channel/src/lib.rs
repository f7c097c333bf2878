// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # M-Current Channel Kernel
//!
//! The numerical core of the cortical M current:
//! - **Exponential table**: interpolated, clamped `exp(x)` over `[-25, 25]`
//! - **Kinetics**: steady-state activation and time constant
//! - **Integrator**: backward/forward Euler for the single gate
//! - **Current**: ohmic potassium current and its numerical conductance
//! - **Models**: the `ChannelMechanism` trait and the `ImModel` implementation
//!
//! The crate holds no host state. Voltages, reversal potentials, ion
//! accumulators and the instance records themselves are passed in by the
//! caller (see `im-runtime`).

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod current;
pub mod exptable;
pub mod integrator;
pub mod kinetics;
pub mod models;
pub mod types;

pub use current::{
    ion_current, linearize_current, CurrentContribution, IonAccumulator, VOLTAGE_PERTURBATION_MV,
};
pub use exptable::{exp_clamped, ExpTable, EXP_TABLE_LEN, EXP_TABLE_MAX, EXP_TABLE_MIN};
pub use integrator::StateMethod;
pub use kinetics::{evaluate_gating, temperature_adjustment, GatingKinetics};
pub use models::{
    ChannelMechanism, ImChannel, ImModel, KineticsParams, DEFAULT_GKBAR, DEFAULT_TAUMAX,
    MODEL_NAME, SUFFIX,
};
pub use types::{ChannelError, HostEnvironment, InstanceId, Result};
