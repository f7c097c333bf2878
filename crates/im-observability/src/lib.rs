// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # im-observability
//!
//! Logging setup shared by the M-current crates and tools.
//!
//! Every crate logs through `tracing`; this crate turns per-crate debug flags
//! and the logging configuration into one subscriber.
//!
//! ## Features
//! - `file-logging`: also write JSON logs into a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "im-channel",
    "im-runtime",
    "im-config",
    "im-observability",
    "im-cortex",
];
