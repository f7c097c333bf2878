// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Channel Types Module
//!
//! Identity, error and host-environment types shared by the kernel and the runtime.

pub mod environment;
pub mod error;
pub mod ids;

pub use environment::HostEnvironment;
pub use error::{ChannelError, Error, Result};
pub use ids::InstanceId;
