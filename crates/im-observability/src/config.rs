// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Log format name that is not `text` or `json`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format '{0}' (expected 'text' or 'json')")]
pub struct UnknownLogFormat(pub String);

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level for targets without a debug flag (trace, debug, info, warn, error)
    pub level: String,

    /// Console format
    pub format: LogFormat,

    /// Base directory for run folders (used with the `file-logging` feature)
    pub file_path: Option<PathBuf>,
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}

impl LoggingConfig {
    /// Build from the `level`/`format` strings of a configuration file
    pub fn from_names(level: &str, format: &str) -> Result<Self, UnknownLogFormat> {
        Ok(LoggingConfig {
            level: level.to_string(),
            format: format.parse()?,
            file_path: None,
        })
    }

    /// Set the base directory for log run folders
    pub fn with_file_path(mut self, file_path: Option<PathBuf>) -> Self {
        self.file_path = file_path;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Text,
            file_path: None,
        }
    }
}
