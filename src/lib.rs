// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # im-cortex
//!
//! Cortical M current: a slow, non-inactivating potassium conductance with a
//! single activation gate, packaged for compartmental hosts.
//!
//! ## Crates
//! - **`channel`** (`im-channel`): exponential table, gating kinetics, state
//!   integration, current and conductance
//! - **`runtime`** (`im-runtime`): instance arrays, ion and node storage,
//!   single-compartment clamp driver
//! - **`config`** (`im-config`): TOML configuration with environment and CLI
//!   overrides
//! - **`observability`** (`im-observability`): logging setup
//!
//! ## Feature Flags
//! - **`file-logging`**: JSON log files in a timestamped run folder
//!
//! ## Usage
//!
//! ```rust,no_run
//! use im_cortex::prelude::*;
//!
//! let (mut driver, protocol) = im_cortex::runtime::from_config(&ImConfig::default())?;
//! for point in driver.run(&protocol, -70.0)? {
//!     println!("{} {} {}", point.t, point.v, point.m);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use im_channel as channel;
pub use im_config as config;
pub use im_observability as observability;
pub use im_runtime as runtime;

/// Commonly used types
pub mod prelude {
    pub use im_channel::{
        ChannelError, ChannelMechanism, ExpTable, HostEnvironment, ImChannel, ImModel,
        InstanceId, IonAccumulator, KineticsParams, StateMethod,
    };
    pub use im_config::{load_config, validate_config, ImConfig};
    pub use im_runtime::{
        ClampDriver, ClampMode, ClampProtocol, ClampStep, Compartment, IonStore, MechanismArray,
        NodeMatrix, RuntimeError, TracePoint,
    };
}
