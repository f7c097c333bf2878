// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, ImConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "im_configuration.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "IM_CONFIG_PATH";

/// Find the configuration file
///
/// Search order:
/// 1. `IM_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found or contains invalid TOML.
/// Value validation is separate (`validate_config`).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<ImConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: ImConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

fn set_f64(target: &mut f64, value: &str) {
    if let Ok(parsed) = value.trim().parse::<f64>() {
        *target = parsed;
    }
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `IM_TAUMAX` -> `kinetics.taumax`
/// - `IM_USETABLE` -> `kinetics.use_table`
/// - `IM_METHOD` -> `kinetics.method`
/// - `IM_CELSIUS` -> `environment.celsius`
/// - `IM_DT` -> `environment.dt`
/// - `IM_GKBAR` -> `channel.gkbar`
/// - `IM_LOG_LEVEL` -> `system.log_level`
/// - `IM_LOG_DIR` -> `system.log_dir`
pub fn apply_environment_overrides(config: &mut ImConfig) {
    if let Ok(value) = env::var("IM_TAUMAX") {
        set_f64(&mut config.kinetics.taumax, &value);
    }
    if let Ok(value) = env::var("IM_USETABLE") {
        config.kinetics.use_table = parse_flag(&value);
    }
    if let Ok(value) = env::var("IM_METHOD") {
        config.kinetics.method = value;
    }
    if let Ok(value) = env::var("IM_CELSIUS") {
        set_f64(&mut config.environment.celsius, &value);
    }
    if let Ok(value) = env::var("IM_DT") {
        set_f64(&mut config.environment.dt, &value);
    }
    if let Ok(value) = env::var("IM_GKBAR") {
        set_f64(&mut config.channel.gkbar, &value);
    }
    if let Ok(value) = env::var("IM_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("IM_LOG_DIR") {
        config.system.log_dir = Some(PathBuf::from(value));
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys: `taumax`, `usetable`, `method`, `celsius`, `dt`, `v_init`, `ek`,
/// `gkbar`, `mode`, `debug`, `log_level`, `log_dir`.
pub fn apply_cli_overrides(config: &mut ImConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("taumax") {
        set_f64(&mut config.kinetics.taumax, value);
    }
    if let Some(value) = cli_args.get("usetable") {
        config.kinetics.use_table = parse_flag(value);
    }
    if let Some(value) = cli_args.get("method") {
        config.kinetics.method = value.clone();
    }
    if let Some(value) = cli_args.get("celsius") {
        set_f64(&mut config.environment.celsius, value);
    }
    if let Some(value) = cli_args.get("dt") {
        set_f64(&mut config.environment.dt, value);
    }
    if let Some(value) = cli_args.get("v_init") {
        set_f64(&mut config.environment.v_init, value);
    }
    if let Some(value) = cli_args.get("ek") {
        set_f64(&mut config.environment.ek, value);
    }
    if let Some(value) = cli_args.get("gkbar") {
        set_f64(&mut config.channel.gkbar, value);
    }
    if let Some(value) = cli_args.get("mode") {
        config.clamp.mode = value.clone();
    }
    if let Some(value) = cli_args.get("debug") {
        config.system.debug = parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.system.log_dir = Some(PathBuf::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: &[&str] = &[
        "IM_TAUMAX",
        "IM_USETABLE",
        "IM_METHOD",
        "IM_CELSIUS",
        "IM_DT",
        "IM_GKBAR",
        "IM_LOG_LEVEL",
        "IM_LOG_DIR",
    ];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        env::set_var(CONFIG_PATH_ENV, missing.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_partial_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[kinetics]").unwrap();
        writeln!(file, "taumax = 500.0").unwrap();
        writeln!(file, "use_table = false").unwrap();
        writeln!(file, "[clamp]").unwrap();
        writeln!(file, "mode = \"current\"").unwrap();
        writeln!(file, "[[clamp.steps]]").unwrap();
        writeln!(file, "duration_ms = 50.0").unwrap();
        writeln!(file, "level = 0.01").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.kinetics.taumax, 500.0);
        assert!(!config.kinetics.use_table);
        assert_eq!(config.kinetics.method, "backward_euler");
        assert_eq!(config.environment.celsius, 36.0);
        assert_eq!(config.clamp.mode, "current");
        assert_eq!(config.clamp.steps.len(), 1);
        assert_eq!(config.clamp.steps[0].level, 0.01);
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = ImConfig::default();

        env::set_var("IM_TAUMAX", "250");
        env::set_var("IM_USETABLE", "no");
        env::set_var("IM_CELSIUS", "not-a-number");
        env::set_var("IM_GKBAR", "2e-4");

        apply_environment_overrides(&mut config);
        clear_override_vars();

        assert_eq!(config.kinetics.taumax, 250.0);
        assert!(!config.kinetics.use_table);
        assert_eq!(config.environment.celsius, 36.0);
        assert_eq!(config.channel.gkbar, 2e-4);
    }

    #[test]
    fn test_log_dir_from_file_and_env() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[system]").unwrap();
        writeln!(file, "log_dir = \"run-logs\"").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();
        assert_eq!(config.system.log_dir, Some(PathBuf::from("run-logs")));
        assert!(ImConfig::default().system.log_dir.is_none());

        env::set_var("IM_LOG_DIR", "/var/log/im");
        let config = load_config(Some(&config_path), None).unwrap();
        clear_override_vars();
        assert_eq!(config.system.log_dir, Some(PathBuf::from("/var/log/im")));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = ImConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("celsius".to_string(), "22".to_string());
        cli_args.insert("method".to_string(), "forward_euler".to_string());
        cli_args.insert("mode".to_string(), "current".to_string());
        cli_args.insert("log_dir".to_string(), "logs/clamp".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.environment.celsius, 22.0);
        assert_eq!(config.kinetics.method, "forward_euler");
        assert_eq!(config.clamp.mode, "current");
        assert_eq!(config.system.log_dir, Some(PathBuf::from("logs/clamp")));
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[environment]").unwrap();
        writeln!(file, "celsius = 30.0").unwrap();
        writeln!(file, "dt = 0.05").unwrap();

        env::set_var("IM_CELSIUS", "33");
        env::set_var("IM_DT", "0.01");

        let mut cli_args = HashMap::new();
        cli_args.insert("celsius".to_string(), "37".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();
        clear_override_vars();

        // CLI wins for celsius, env wins for dt (no CLI override)
        assert_eq!(config.environment.celsius, 37.0);
        assert_eq!(config.environment.dt, 0.01);
    }
}
