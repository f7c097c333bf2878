// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Channel Mechanism Architecture
//!
//! A mechanism is a shared, read-mostly model object (parameters, lookup
//! tables) plus one plain state record per compartment. The runtime owns the
//! records and drives the model through the `ChannelMechanism` passes.
//!
//! ## Adding a New Mechanism
//!
//! 1. Create `src/models/your_mechanism.rs`
//! 2. Implement `ChannelMechanism` trait
//! 3. Add tests
//! 4. Export in `mod.rs`

pub mod im;
pub mod traits;

pub use im::{ImChannel, ImModel, KineticsParams, DEFAULT_GKBAR, DEFAULT_TAUMAX, MODEL_NAME, SUFFIX};
pub use traits::ChannelMechanism;
