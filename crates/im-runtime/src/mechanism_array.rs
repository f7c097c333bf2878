// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Instance array for one channel mechanism
//!
//! Every instance sits on one node and shares the array's model. Passes run
//! in parallel with Rayon; each instance is touched by exactly one worker.
//! Results that land on shared nodes are gathered first and then added in
//! instance order.

use im_channel::{ChannelMechanism, CurrentContribution, HostEnvironment, InstanceId, IonAccumulator};
use rayon::prelude::*;
use tracing::{debug, error};

use crate::error::{RuntimeError, RuntimeResult};
use crate::node::{IonStore, NodeMatrix};

/// All instances of mechanism `M`
pub struct MechanismArray<M: ChannelMechanism> {
    model: M,

    /// Instance records, indexed by `InstanceId`
    instances: Vec<M::Instance>,

    /// Node index of each instance
    nodes: Vec<usize>,

    /// Smallest node count that covers every instance
    node_span: usize,
}

impl<M: ChannelMechanism> MechanismArray<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            instances: Vec::new(),
            nodes: Vec::new(),
            node_span: 0,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Model changes (e.g. toggling the table) apply to every instance
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Add an instance on `node`
    pub fn insert(&mut self, node: usize, instance: M::Instance) -> InstanceId {
        let id = InstanceId(self.instances.len() as u32);
        self.instances.push(instance);
        self.nodes.push(node);
        self.node_span = self.node_span.max(node + 1);
        id
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, id: InstanceId) -> Option<&M::Instance> {
        self.instances.get(id.index())
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut M::Instance> {
        self.instances.get_mut(id.index())
    }

    pub fn node_of(&self, id: InstanceId) -> Option<usize> {
        self.nodes.get(id.index()).copied()
    }

    /// State value of one instance
    pub fn state_of(&self, id: InstanceId) -> RuntimeResult<f64> {
        self.get(id)
            .map(|instance| self.model.state(instance))
            .ok_or(RuntimeError::InvalidInstance(id))
    }

    /// Total number of ODE states (instances × states per instance)
    pub fn ode_count(&self) -> usize {
        self.instances.len() * self.model.state_count()
    }

    fn check_nodes(&self, what: &'static str, actual: usize) -> RuntimeResult<()> {
        if actual < self.node_span {
            return Err(RuntimeError::SizeMismatch {
                what,
                expected: self.node_span,
                actual,
            });
        }
        Ok(())
    }

    /// Reset every instance at its node voltage
    pub fn init_all(&mut self, voltages: &[f64], env: &HostEnvironment) -> RuntimeResult<()> {
        self.check_nodes("voltages", voltages.len())?;
        let model = &self.model;
        self.instances
            .par_iter_mut()
            .zip(self.nodes.par_iter())
            .for_each(|(instance, &node)| model.init(instance, voltages[node], env));
        debug!(target: "im_runtime", model = model.model_name(), count = self.instances.len(), "initialized instances");
        Ok(())
    }

    /// Current pass.
    ///
    /// Adds each instance's `ik` and `dik/dv` into the node accumulators and
    /// subtracts its current from the node RHS. The caller zeroes both
    /// beforehand.
    pub fn current_all(
        &mut self,
        voltages: &[f64],
        ions: &mut IonStore,
        matrix: &mut NodeMatrix,
    ) -> RuntimeResult<()> {
        self.check_nodes("voltages", voltages.len())?;
        self.check_nodes("ion store", ions.len())?;
        self.check_nodes("node matrix", matrix.len())?;

        let model = &self.model;
        let ek = &ions.ek;
        let contributions: Vec<(CurrentContribution, IonAccumulator)> = self
            .instances
            .par_iter_mut()
            .zip(self.nodes.par_iter())
            .map(|(instance, &node)| {
                let mut local = IonAccumulator::new();
                let contribution = model.current(instance, voltages[node], ek[node], &mut local);
                (contribution, local)
            })
            .collect();

        for ((contribution, local), &node) in contributions.iter().zip(&self.nodes) {
            let acc = &mut ions.accumulators[node];
            acc.ik += local.ik;
            acc.dikdv += local.dikdv;
            matrix.rhs[node] -= contribution.rhs;
        }
        Ok(())
    }

    /// Jacobian pass: adds each instance's conductance to the node diagonal
    pub fn jacobian_all(&self, matrix: &mut NodeMatrix) -> RuntimeResult<()> {
        self.check_nodes("node matrix", matrix.len())?;
        for (instance, &node) in self.instances.iter().zip(&self.nodes) {
            matrix.d[node] += self.model.jacobian(instance);
        }
        Ok(())
    }

    /// Fixed-step state pass.
    ///
    /// A failing instance aborts the pass. When several fail, the one with
    /// the lowest `InstanceId` is logged and returned.
    pub fn state_all(&mut self, voltages: &[f64], dt: f64) -> RuntimeResult<()> {
        self.check_nodes("voltages", voltages.len())?;
        let model = &self.model;
        let failure = self
            .instances
            .par_iter_mut()
            .zip(self.nodes.par_iter())
            .enumerate()
            .find_map_first(|(index, (instance, &node))| {
                model
                    .advance(instance, voltages[node], dt)
                    .err()
                    .map(|source| RuntimeError::StepAborted {
                        instance: InstanceId(index as u32),
                        source,
                    })
            });

        match failure {
            Some(e) => {
                error!(target: "im_runtime", model = model.model_name(), error = %e, "fixed-step state pass failed");
                Err(e)
            }
            None => Ok(()),
        }
    }

    /// Derivatives for a variable-step integrator, in instance order
    pub fn ode_spec_all(&mut self, voltages: &[f64]) -> RuntimeResult<Vec<f64>> {
        self.check_nodes("voltages", voltages.len())?;
        let model = &self.model;
        Ok(self
            .instances
            .par_iter_mut()
            .zip(self.nodes.par_iter())
            .map(|(instance, &node)| model.ode_spec(instance, voltages[node]))
            .collect())
    }

    /// Derivatives rescaled for the implicit solve, in instance order
    pub fn ode_matsol_all(&mut self, voltages: &[f64], dt: f64) -> RuntimeResult<Vec<f64>> {
        self.check_nodes("voltages", voltages.len())?;
        let model = &self.model;
        Ok(self
            .instances
            .par_iter_mut()
            .zip(self.nodes.par_iter())
            .map(|(instance, &node)| model.ode_matsol(instance, voltages[node], dt))
            .collect())
    }

    /// State vector in instance order
    pub fn states(&self) -> Vec<f64> {
        self.instances
            .iter()
            .map(|instance| self.model.state(instance))
            .collect()
    }

    /// Write back a state vector produced by an integrator
    pub fn set_states(&mut self, values: &[f64]) -> RuntimeResult<()> {
        if values.len() != self.instances.len() {
            return Err(RuntimeError::SizeMismatch {
                what: "state vector",
                expected: self.instances.len(),
                actual: values.len(),
            });
        }
        let model = &self.model;
        for (instance, &value) in self.instances.iter_mut().zip(values) {
            model.set_state(instance, value);
        }
        Ok(())
    }
}
