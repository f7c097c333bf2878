// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Single-Compartment Clamp Driver
//!
//! One compartment with a passive leak and one mechanism instance, stepped
//! with a fixed timestep.
//!
//! ```text
//! voltage clamp, per tick:
//!     v = level(t)
//!     advance states at v
//!
//! current clamp, per tick:
//!     (1e-3·cm/dt + g_pas + g) · dv = i_inj - g_pas·(v - e_pas) - i_chan
//!     v += dv
//!     advance states at v
//!
//! both modes finish the tick with a current pass at (v, m) and record
//! (t, v, m, ik)
//! ```

use std::str::FromStr;

use im_channel::{ChannelMechanism, HostEnvironment, InstanceId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RuntimeError, RuntimeResult};
use crate::mechanism_array::MechanismArray;
use crate::node::{IonStore, NodeMatrix};

/// The only node of the compartment
const SOMA: usize = 0;

/// Converts `cm/dt` (µF/cm² per ms) into S/cm²
const CAPACITANCE_SCALE: f64 = 1e-3;

/// Passive membrane of the compartment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    /// Specific capacitance (µF/cm²)
    pub cm: f64,

    /// Leak conductance (S/cm²)
    pub g_pas: f64,

    /// Leak reversal potential (mV)
    pub e_pas: f64,
}

impl Compartment {
    /// Leak current density at `v` (mA/cm²)
    #[inline]
    pub fn leak_current(&self, v: f64) -> f64 {
        self.g_pas * (v - self.e_pas)
    }
}

impl Default for Compartment {
    fn default() -> Self {
        Self {
            cm: 1.0,
            g_pas: 0.00015,
            e_pas: -70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampMode {
    /// Step levels are membrane voltages (mV)
    Voltage,
    /// Step levels are injected current densities (mA/cm²)
    Current,
}

impl FromStr for ClampMode {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "voltage" => Ok(ClampMode::Voltage),
            "current" => Ok(ClampMode::Current),
            other => Err(RuntimeError::InvalidConfig(format!(
                "unknown clamp mode '{}'",
                other
            ))),
        }
    }
}

/// One piecewise-constant segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampStep {
    pub duration_ms: f64,
    pub level: f64,
}

/// Sequence of clamp steps starting at t = 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClampProtocol {
    pub mode: ClampMode,
    steps: Vec<ClampStep>,
}

impl ClampProtocol {
    /// Protocol from at least one step with a positive, finite duration
    pub fn new(mode: ClampMode, steps: Vec<ClampStep>) -> RuntimeResult<Self> {
        if steps.is_empty() {
            return Err(RuntimeError::InvalidConfig(
                "clamp protocol needs at least one step".to_string(),
            ));
        }
        if let Some((index, step)) = steps
            .iter()
            .enumerate()
            .find(|(_, s)| !(s.duration_ms.is_finite() && s.duration_ms > 0.0))
        {
            return Err(RuntimeError::InvalidConfig(format!(
                "clamp step {} has duration {} ms",
                index, step.duration_ms
            )));
        }
        Ok(Self { mode, steps })
    }

    pub fn steps(&self) -> &[ClampStep] {
        &self.steps
    }

    pub fn total_duration(&self) -> f64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }

    /// Level of the step containing `t`; the last step holds past the end
    pub fn level_at(&self, t: f64) -> f64 {
        let mut end = 0.0;
        for step in &self.steps {
            end += step.duration_ms;
            if t < end {
                return step.level;
            }
        }
        // Non-empty by construction
        self.steps.last().map_or(0.0, |s| s.level)
    }
}

/// One recorded sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TracePoint {
    /// Time (ms)
    pub t: f64,
    /// Membrane voltage (mV)
    pub v: f64,
    /// Gate state
    pub m: f64,
    /// Potassium current density (mA/cm²)
    pub ik: f64,
}

/// Fixed-step driver for one compartment carrying one mechanism instance
pub struct ClampDriver<M: ChannelMechanism> {
    mechanisms: MechanismArray<M>,
    instance: InstanceId,
    compartment: Compartment,
    env: HostEnvironment,
    ions: IonStore,
    matrix: NodeMatrix,
    v: f64,
    t: f64,
}

impl<M: ChannelMechanism> ClampDriver<M> {
    pub fn new(
        model: M,
        instance: M::Instance,
        compartment: Compartment,
        env: HostEnvironment,
        ek: f64,
    ) -> Self {
        let mut mechanisms = MechanismArray::new(model);
        let instance = mechanisms.insert(SOMA, instance);
        Self {
            mechanisms,
            instance,
            compartment,
            env,
            ions: IonStore::new(1, ek),
            matrix: NodeMatrix::new(1),
            v: 0.0,
            t: 0.0,
        }
    }

    pub fn mechanisms(&self) -> &MechanismArray<M> {
        &self.mechanisms
    }

    pub fn mechanisms_mut(&mut self) -> &mut MechanismArray<M> {
        &mut self.mechanisms
    }

    pub fn compartment(&self) -> &Compartment {
        &self.compartment
    }

    pub fn environment(&self) -> &HostEnvironment {
        &self.env
    }

    pub fn voltage(&self) -> f64 {
        self.v
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    /// Reset time, voltage and the mechanism, then evaluate the current
    pub fn finitialize(&mut self, v_init: f64) -> RuntimeResult<TracePoint> {
        self.t = 0.0;
        self.v = v_init;
        self.mechanisms.init_all(&[self.v], &self.env)?;
        self.refresh_current()?;
        self.sample()
    }

    /// Advance one timestep with the clamp at `level`
    pub fn step(&mut self, mode: ClampMode, level: f64) -> RuntimeResult<TracePoint> {
        let dt = self.env.dt;
        match mode {
            ClampMode::Voltage => self.v = level,
            ClampMode::Current => {
                // rhs and d hold the channel terms from the last current pass
                let c = &self.compartment;
                let diag = CAPACITANCE_SCALE * c.cm / dt + c.g_pas + self.matrix.d[SOMA];
                let rhs = level - c.leak_current(self.v) + self.matrix.rhs[SOMA];
                self.v += rhs / diag;
            }
        }

        self.mechanisms.state_all(&[self.v], dt)?;
        self.t += dt;
        self.refresh_current()?;
        self.sample()
    }

    /// Run `protocol` from `v_init`, handing every sample to `sink`
    pub fn run_with<F>(&mut self, protocol: &ClampProtocol, v_init: f64, mut sink: F) -> RuntimeResult<()>
    where
        F: FnMut(&TracePoint),
    {
        let dt = self.env.dt;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(RuntimeError::InvalidConfig(format!("timestep {} ms", dt)));
        }

        let ticks = (protocol.total_duration() / dt).round() as usize;
        info!(
            target: "im_runtime",
            mode = ?protocol.mode,
            ticks,
            dt,
            celsius = self.env.celsius,
            "starting clamp run"
        );

        sink(&self.finitialize(v_init)?);
        for _ in 0..ticks {
            // Mid-tick time keeps step boundaries away from rounding
            let level = protocol.level_at(self.t + 0.5 * dt);
            sink(&self.step(protocol.mode, level)?);
        }

        debug!(target: "im_runtime", t = self.t, v = self.v, "clamp run finished");
        Ok(())
    }

    /// Run `protocol` from `v_init` and collect the trace
    pub fn run(&mut self, protocol: &ClampProtocol, v_init: f64) -> RuntimeResult<Vec<TracePoint>> {
        let mut trace = Vec::new();
        self.run_with(protocol, v_init, |point| trace.push(*point))?;
        Ok(trace)
    }

    fn refresh_current(&mut self) -> RuntimeResult<()> {
        self.ions.reset_accumulators();
        self.matrix.reset();
        self.mechanisms
            .current_all(&[self.v], &mut self.ions, &mut self.matrix)?;
        self.mechanisms.jacobian_all(&mut self.matrix)
    }

    fn sample(&self) -> RuntimeResult<TracePoint> {
        Ok(TracePoint {
            t: self.t,
            v: self.v,
            m: self.mechanisms.state_of(self.instance)?,
            ik: self.ions.accumulators[SOMA].ik,
        })
    }
}
