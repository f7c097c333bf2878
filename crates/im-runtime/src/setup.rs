// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Build a clamp run from an `ImConfig`

use im_channel::{HostEnvironment, ImChannel, ImModel, KineticsParams, StateMethod};
use im_config::{validate_config, ImConfig};
use tracing::debug;

use crate::clamp::{ClampDriver, ClampMode, ClampProtocol, ClampStep, Compartment};
use crate::error::{RuntimeError, RuntimeResult};

/// Kinetics parameters from the `[kinetics]` section
pub fn kinetics_from_config(config: &ImConfig) -> RuntimeResult<KineticsParams> {
    let method = StateMethod::from_name(&config.kinetics.method).ok_or_else(|| {
        RuntimeError::InvalidConfig(format!(
            "unknown integration method '{}'",
            config.kinetics.method
        ))
    })?;
    let params = KineticsParams {
        taumax: config.kinetics.taumax,
        use_table: config.kinetics.use_table,
        method,
    };
    params
        .validate()
        .map_err(|e| RuntimeError::InvalidConfig(e.to_string()))?;
    Ok(params)
}

/// Validated driver and protocol for the configured clamp run
pub fn from_config(config: &ImConfig) -> RuntimeResult<(ClampDriver<ImModel>, ClampProtocol)> {
    validate_config(config)?;

    let params = kinetics_from_config(config)?;
    let env = HostEnvironment::new(config.environment.celsius, config.environment.dt);
    let compartment = Compartment {
        cm: config.compartment.cm,
        g_pas: config.compartment.g_pas,
        e_pas: config.compartment.e_pas,
    };

    let mode: ClampMode = config.clamp.mode.parse()?;
    let steps = config
        .clamp
        .steps
        .iter()
        .map(|s| ClampStep {
            duration_ms: s.duration_ms,
            level: s.level,
        })
        .collect();
    let protocol = ClampProtocol::new(mode, steps)?;

    debug!(
        target: "im_runtime",
        taumax = params.taumax,
        use_table = params.use_table,
        method = params.method.name(),
        gkbar = config.channel.gkbar,
        "built clamp driver from configuration"
    );

    let driver = ClampDriver::new(
        ImModel::new(params),
        ImChannel::new(config.channel.gkbar),
        compartment,
        env,
        config.environment.ek,
    );
    Ok((driver, protocol))
}
