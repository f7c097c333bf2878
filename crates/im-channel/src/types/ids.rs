// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identity types for mechanism instances

use core::fmt;

/// Index of a channel instance inside a mechanism array.
///
/// Instances are bound one-to-one to compartment nodes, so the same index
/// addresses the node's voltage, ion slot and matrix entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u32);

impl InstanceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.0)
    }
}
