// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # M-Current Runtime
//!
//! Host side of the channel mechanism:
//! - **MechanismArray**: instances of one mechanism with parallel passes
//! - **IonStore / NodeMatrix**: per-node reversal potentials, ion totals and
//!   node-equation slots
//! - **ClampDriver**: single-compartment voltage and current clamp
//! - **setup**: driver and protocol from an `ImConfig`

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod clamp;
pub mod error;
pub mod mechanism_array;
pub mod node;
pub mod setup;

pub use clamp::{ClampDriver, ClampMode, ClampProtocol, ClampStep, Compartment, TracePoint};
pub use error::{RuntimeError, RuntimeResult};
pub use mechanism_array::MechanismArray;
pub use node::{IonStore, NodeMatrix};
pub use setup::{from_config, kinetics_from_config};
