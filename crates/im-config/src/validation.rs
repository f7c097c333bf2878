// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every violation before failing, so one run reports all of them.

use crate::{ConfigError, ConfigResult, ImConfig};

/// Method names accepted in `kinetics.method`.
///
/// Names here and in `KNOWN_CLAMP_MODES` match case-insensitively after
/// trimming.
pub const KNOWN_METHODS: &[&str] = &["backward_euler", "forward_euler"];

/// Clamp modes accepted in `clamp.mode`
pub const KNOWN_CLAMP_MODES: &[&str] = &["voltage", "current"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NotPositive { field: String, value: f64 },
    Negative { field: String, value: f64 },
    NotFinite { field: String },
    UnknownName { field: String, value: String, allowed: &'static [&'static str] },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "{} = {} must be positive", field, value)
            }
            Self::Negative { field, value } => {
                write!(f, "{} = {} must not be negative", field, value)
            }
            Self::NotFinite { field } => write!(f, "{} must be a finite number", field),
            Self::UnknownName {
                field,
                value,
                allowed,
            } => write!(
                f,
                "{} = '{}' is not one of: {}",
                field,
                value,
                allowed.join(", ")
            ),
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &ImConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_kinetics(config, &mut errors);
    validate_environment(config, &mut errors);
    validate_membrane(config, &mut errors);
    validate_clamp(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn require_positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
    } else if value <= 0.0 {
        errors.push(ConfigValidationError::NotPositive {
            field: field.to_string(),
            value,
        });
    }
}

fn require_non_negative(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
    } else if value < 0.0 {
        errors.push(ConfigValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
}

fn require_finite(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
    }
}

fn require_known(
    field: &str,
    value: &str,
    allowed: &'static [&'static str],
    errors: &mut Vec<ConfigValidationError>,
) {
    let normalized = value.trim().to_ascii_lowercase();
    if !allowed.contains(&normalized.as_str()) {
        errors.push(ConfigValidationError::UnknownName {
            field: field.to_string(),
            value: value.to_string(),
            allowed,
        });
    }
}

/// tau_peak = taumax / tadj must stay positive
fn validate_kinetics(config: &ImConfig, errors: &mut Vec<ConfigValidationError>) {
    require_positive("kinetics.taumax", config.kinetics.taumax, errors);
    require_known("kinetics.method", &config.kinetics.method, KNOWN_METHODS, errors);
}

fn validate_environment(config: &ImConfig, errors: &mut Vec<ConfigValidationError>) {
    require_finite("environment.celsius", config.environment.celsius, errors);
    require_positive("environment.dt", config.environment.dt, errors);
    require_finite("environment.v_init", config.environment.v_init, errors);
    require_finite("environment.ek", config.environment.ek, errors);
}

fn validate_membrane(config: &ImConfig, errors: &mut Vec<ConfigValidationError>) {
    require_non_negative("channel.gkbar", config.channel.gkbar, errors);
    require_positive("compartment.cm", config.compartment.cm, errors);
    require_non_negative("compartment.g_pas", config.compartment.g_pas, errors);
    require_finite("compartment.e_pas", config.compartment.e_pas, errors);
}

fn validate_clamp(config: &ImConfig, errors: &mut Vec<ConfigValidationError>) {
    require_known("clamp.mode", &config.clamp.mode, KNOWN_CLAMP_MODES, errors);
    for (index, step) in config.clamp.steps.iter().enumerate() {
        require_positive(
            &format!("clamp.steps[{}].duration_ms", index),
            step.duration_ms,
            errors,
        );
        require_finite(&format!("clamp.steps[{}].level", index), step.level, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ImConfig::default();
        let result = validate_config(&config);
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_non_positive_taumax() {
        let mut config = ImConfig::default();
        config.kinetics.taumax = 0.0;

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("kinetics.taumax"));
                assert!(msg.contains("must be positive"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_method() {
        let mut config = ImConfig::default();
        config.kinetics.method = "rk4".to_string();

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("kinetics.method"));
                assert!(msg.contains("backward_euler"));
                assert!(msg.contains("forward_euler"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_names_match_ignoring_case() {
        let mut config = ImConfig::default();
        config.kinetics.method = " Forward_Euler ".to_string();
        config.clamp.mode = "Voltage".to_string();
        assert!(validate_config(&config).is_ok());

        config.kinetics.method = "implicit".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_all_violations_reported() {
        let mut config = ImConfig::default();
        config.environment.dt = -1.0;
        config.channel.gkbar = -1e-6;
        config.environment.celsius = f64::NAN;
        config.clamp.mode = "dynamic".to_string();
        config.clamp.steps[1].duration_ms = 0.0;

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("environment.dt"));
                assert!(msg.contains("channel.gkbar"));
                assert!(msg.contains("environment.celsius must be a finite number"));
                assert!(msg.contains("clamp.mode"));
                assert!(msg.contains("clamp.steps[1].duration_ms"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_gkbar_is_allowed() {
        let mut config = ImConfig::default();
        config.channel.gkbar = 0.0;
        assert!(validate_config(&config).is_ok());
    }
}
