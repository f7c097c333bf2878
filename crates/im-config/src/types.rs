// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `im_configuration.toml`. Every section
//! and field is optional in the file; missing values take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ImConfig {
    pub system: SystemConfig,
    pub kinetics: KineticsConfig,
    pub environment: EnvironmentConfig,
    pub channel: ChannelConfig,
    pub compartment: CompartmentConfig,
    pub clamp: ClampConfig,
}

/// Process-level settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub debug: bool,
    pub log_level: String,
    /// "text" or "json"
    pub log_format: String,
    /// Base directory for log run folders (with the `file-logging` feature)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            log_dir: None,
        }
    }
}

/// Model-wide kinetics settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KineticsConfig {
    /// Maximal time constant at 36 °C (ms)
    pub taumax: f64,
    /// Interpolate exponentials from the lookup table
    pub use_table: bool,
    /// "backward_euler" or "forward_euler"
    pub method: String,
}

impl Default for KineticsConfig {
    fn default() -> Self {
        Self {
            taumax: 1000.0,
            use_table: true,
            method: "backward_euler".to_string(),
        }
    }
}

/// Host environment for the clamp driver
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Temperature (°C)
    pub celsius: f64,
    /// Timestep (ms)
    pub dt: f64,
    /// Initial membrane voltage (mV)
    pub v_init: f64,
    /// Potassium reversal potential (mV)
    pub ek: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            celsius: 36.0,
            dt: 0.025,
            v_init: -70.0,
            ek: -77.0,
        }
    }
}

/// Per-instance channel parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Maximal conductance (S/cm²)
    pub gkbar: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { gkbar: 1e-6 }
    }
}

/// Passive membrane of the driven compartment
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompartmentConfig {
    /// Specific capacitance (µF/cm²)
    pub cm: f64,
    /// Leak conductance (S/cm²)
    pub g_pas: f64,
    /// Leak reversal potential (mV)
    pub e_pas: f64,
}

impl Default for CompartmentConfig {
    fn default() -> Self {
        Self {
            cm: 1.0,
            g_pas: 0.00015,
            e_pas: -70.0,
        }
    }
}

/// Clamp protocol
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClampConfig {
    /// "voltage" (levels in mV) or "current" (levels in mA/cm²)
    pub mode: String,
    pub steps: Vec<ClampStepConfig>,
}

impl Default for ClampConfig {
    fn default() -> Self {
        Self {
            mode: "voltage".to_string(),
            steps: vec![
                ClampStepConfig {
                    duration_ms: 100.0,
                    level: -70.0,
                },
                ClampStepConfig {
                    duration_ms: 1000.0,
                    level: -20.0,
                },
                ClampStepConfig {
                    duration_ms: 500.0,
                    level: -70.0,
                },
            ],
        }
    }
}

/// One piecewise-constant segment of a clamp protocol
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ClampStepConfig {
    pub duration_ms: f64,
    pub level: f64,
}
