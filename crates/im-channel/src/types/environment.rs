// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host-supplied global state for a simulation tick

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Temperature and timestep the host supplies each tick.
///
/// Voltage and the potassium reversal potential are per node and travel
/// with the individual calls instead.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HostEnvironment {
    /// Temperature in degrees Celsius
    pub celsius: f64,

    /// Integration timestep in ms
    pub dt: f64,
}

impl HostEnvironment {
    pub fn new(celsius: f64, dt: f64) -> Self {
        Self { celsius, dt }
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self {
            celsius: 36.0,
            dt: 0.025,
        }
    }
}
