// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Fast Exponential Table
//!
//! Interpolated approximation of `exp(x)` over `[-25, 25]`.
//!
//! ```text
//! samples:  10001, x_i = -25 + 50·i/10000   (step 0.005)
//! sample:   exp(x_i) if -25 < x_i < 25, else 0
//!
//! lookup(x):
//!     xi = (x + 25) · 200
//!     xi <= 0        → sample[0]           (no blend)
//!     ⌊xi⌋ >= 10000  → sample[10000]
//!     otherwise      → linear blend of sample[⌊xi⌋] and sample[⌊xi⌋+1]
//! ```
//!
//! Both end samples sit on the open-interval boundary and are therefore 0.
//! The lower bound is tested on the fractional index and the upper bound on
//! the truncated index, so the last cell `[24.995, 25)` blends toward 0.
//! Existing models are tuned against that curve; keep it.

use std::sync::OnceLock;
use tracing::debug;

/// Lower edge of the tabulated domain
pub const EXP_TABLE_MIN: f64 = -25.0;

/// Upper edge of the tabulated domain
pub const EXP_TABLE_MAX: f64 = 25.0;

/// Number of cells between samples
pub const EXP_TABLE_INTERVALS: usize = 10_000;

/// Number of stored samples
pub const EXP_TABLE_LEN: usize = EXP_TABLE_INTERVALS + 1;

/// Exact exponential with the table's clamping rule: 0 outside `(-25, 25)`.
#[inline]
pub fn exp_clamped(x: f64) -> f64 {
    if x > EXP_TABLE_MIN && x < EXP_TABLE_MAX {
        x.exp()
    } else {
        0.0
    }
}

/// Lazily built, read-only sample table.
///
/// Construction happens at most once behind a `OnceLock`, so a table wrapped
/// in an `Arc` can be shared by every instance of a model across threads.
#[derive(Debug, Default)]
pub struct ExpTable {
    samples: OnceLock<Box<[f64]>>,
}

impl ExpTable {
    /// Create an empty table; samples are computed on first use
    pub const fn new() -> Self {
        Self {
            samples: OnceLock::new(),
        }
    }

    /// Build the samples if needed and return them. Later calls are no-ops.
    pub fn build(&self) -> &[f64] {
        self.samples.get_or_init(|| {
            let span = EXP_TABLE_MAX - EXP_TABLE_MIN;
            let samples: Box<[f64]> = (0..EXP_TABLE_LEN)
                .map(|i| {
                    let x = EXP_TABLE_MIN + span * i as f64 / EXP_TABLE_INTERVALS as f64;
                    exp_clamped(x)
                })
                .collect();
            debug!(
                target: "im_channel",
                "Built exponential table: {} samples over [{}, {}]",
                samples.len(),
                EXP_TABLE_MIN,
                EXP_TABLE_MAX
            );
            samples
        })
    }

    /// Whether the samples have been computed
    pub fn is_built(&self) -> bool {
        self.samples.get().is_some()
    }

    /// Samples, if already built
    pub fn samples(&self) -> Option<&[f64]> {
        self.samples.get().map(|s| &s[..])
    }

    /// Table interpolation (builds the table on first call)
    pub fn interpolate(&self, x: f64) -> f64 {
        let table = self.build();
        let xi = (x - EXP_TABLE_MIN) * (EXP_TABLE_INTERVALS as f64 / (EXP_TABLE_MAX - EXP_TABLE_MIN));
        if xi <= 0.0 {
            return table[0];
        }
        // Truncation toward zero; NaN maps to 0 and propagates through the blend.
        let i = xi as usize;
        if i >= EXP_TABLE_INTERVALS {
            return table[EXP_TABLE_INTERVALS];
        }
        table[i] + (xi - i as f64) * (table[i + 1] - table[i])
    }

    /// Evaluate `exp(x)` through the table, or exactly when `use_table` is off.
    #[inline]
    pub fn lookup(&self, x: f64, use_table: bool) -> f64 {
        if use_table {
            self.interpolate(x)
        } else {
            exp_clamped(x)
        }
    }
}
