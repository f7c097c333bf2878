// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-node storage owned by the host
//!
//! Mechanisms only add into these slots. Zeroing happens once per step,
//! before the current pass.

use im_channel::IonAccumulator;

/// Potassium reversal potentials and per-node totals
#[derive(Debug, Clone, PartialEq)]
pub struct IonStore {
    /// Reversal potential per node (mV)
    pub ek: Vec<f64>,

    /// Summed `ik` and `dik/dv` per node
    pub accumulators: Vec<IonAccumulator>,
}

impl IonStore {
    /// Store for `node_count` nodes sharing one reversal potential
    pub fn new(node_count: usize, ek: f64) -> Self {
        Self {
            ek: vec![ek; node_count],
            accumulators: vec![IonAccumulator::default(); node_count],
        }
    }

    /// Nodes covered by both `ek` and `accumulators`
    pub fn len(&self) -> usize {
        self.ek.len().min(self.accumulators.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset_accumulators(&mut self) {
        self.accumulators.iter_mut().for_each(IonAccumulator::reset);
    }
}

/// Right-hand side and diagonal of the node equations
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMatrix {
    pub rhs: Vec<f64>,
    pub d: Vec<f64>,
}

impl NodeMatrix {
    pub fn new(node_count: usize) -> Self {
        Self {
            rhs: vec![0.0; node_count],
            d: vec![0.0; node_count],
        }
    }

    /// Nodes covered by both `rhs` and `d`
    pub fn len(&self) -> usize {
        self.rhs.len().min(self.d.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&mut self) {
        self.rhs.fill(0.0);
        self.d.fill(0.0);
    }
}
