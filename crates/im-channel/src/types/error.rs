// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for channel kinetics

/// Errors raised by the channel kernel.
///
/// Out-of-range exponential arguments are not errors: they clamp to zero.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChannelError {
    /// The fixed-step state solver produced an unusable result. Fatal for the run.
    #[error("{model}: state update failed at {location}: {reason}")]
    StepFailed {
        model: &'static str,
        location: &'static str,
        reason: String,
    },

    #[error("Invalid timestep: {0} ms (must be finite and positive)")]
    InvalidTimestep(f64),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = core::result::Result<T, ChannelError>;
pub type Error = ChannelError;
