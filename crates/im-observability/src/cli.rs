// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-im-channel`, `--debug-im-runtime`, etc.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Environment variable listing crates to debug
pub const DEBUG_ENV: &str = "IM_DEBUG";

/// Crates with debug logging switched on
///
/// # Example
/// ```rust
/// use im_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-im-channel".to_string()]);
/// assert!(flags.is_enabled("im-channel"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse `--debug-{crate-name}` and `--debug-all` from arguments.
    ///
    /// Other arguments are ignored.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }
            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                if !crate_name.is_empty() {
                    flags.enabled_crates.insert(crate_name.to_string());
                }
            }
        }

        flags
    }

    /// Merge a comma-separated crate list (the `IM_DEBUG` format).
    ///
    /// `all` enables every known crate.
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',') {
            let crate_name = crate_name.trim();
            if !crate_name.is_empty() {
                self.enabled_crates.insert(crate_name.to_string());
            }
        }
    }

    fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` for enabled crates, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build an `EnvFilter` directive string.
    ///
    /// Crate names are turned into tracing targets (`im-channel` -> `im_channel`),
    /// followed by `default_level` for everything else.
    /// Format: `"im_channel=debug,im_runtime=debug,info"`.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_name.replace('-', "_")))
            .collect();
        filters.push(default_level.to_string());
        filters.join(",")
    }
}

/// Debug flags from the process arguments and `IM_DEBUG`
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var(DEBUG_ENV) {
        flags.merge_env_value(&value);
    }
    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {}=all                            Enable debug for all crates

Examples:
  --debug-im-channel
  --debug-im-channel --debug-im-runtime
  {}=im-channel,im-runtime
"#,
        KNOWN_CRATES.join(", "),
        DEBUG_ENV,
        DEBUG_ENV,
        DEBUG_ENV
    )
}
