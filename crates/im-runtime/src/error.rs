// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for runtime operations

use im_channel::{ChannelError, InstanceId};
use im_config::ConfigError;

/// Runtime errors
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A per-node slice does not cover every node the instances refer to
    #[error("{what}: expected at least {expected} entries, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Fixed-step state update failed; the pass was abandoned
    #[error("state pass aborted at {instance}: {source}")]
    StepAborted {
        instance: InstanceId,
        #[source]
        source: ChannelError,
    },

    #[error("Unknown instance: {0}")]
    InvalidInstance(InstanceId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
