// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Single-compartment clamp run for the M current.
//!
//! Loads `im_configuration.toml` (or built-in defaults when none is found),
//! runs the configured clamp protocol and prints one JSON object per sample
//! (`{"t":..,"v":..,"m":..,"ik":..}`) on stdout. Logs go to stderr.

use std::collections::HashMap;
use std::env;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use im_config::{
    apply_cli_overrides, apply_environment_overrides, load_config, ConfigError, ImConfig,
};
use im_observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingConfig};
use im_runtime::{from_config, TracePoint};
use tracing::{info, warn};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: im_clamp [--config <path>] [--mode voltage|current] [--set <key>=<value>]... [--debug-<crate>]...\n\n\
         Override keys for --set:\n\
         taumax, usetable, method, celsius, dt, v_init, ek, gkbar, mode, debug, log_level, log_dir\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

struct Args {
    config_path: Option<PathBuf>,
    overrides: HashMap<String, String>,
}

fn parse_args() -> Args {
    let mut config_path = None;
    let mut overrides = HashMap::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config_path = Some(PathBuf::from(v));
            }
            "--mode" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                overrides.insert("mode".to_string(), v);
            }
            "--set" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                match v.split_once('=') {
                    Some((key, value)) => {
                        overrides.insert(key.trim().to_string(), value.trim().to_string());
                    }
                    None => {
                        eprintln!("Expected <key>=<value> after --set, got: {v}");
                        usage_and_exit();
                    }
                }
            }
            "-h" | "--help" => usage_and_exit(),
            // Debug flags are read separately
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    Args {
        config_path,
        overrides,
    }
}

/// Configuration file with overrides; defaults when no file is found and none was named
fn resolve_config(args: &Args) -> Result<(ImConfig, bool)> {
    match load_config(args.config_path.as_deref(), Some(&args.overrides)) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound(_)) if args.config_path.is_none() => {
            let mut config = ImConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &args.overrides);
            Ok((config, false))
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn write_point<W: Write>(out: &mut W, point: &TracePoint) -> Result<()> {
    serde_json::to_writer(&mut *out, point)?;
    out.write_all(b"\n")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = parse_args();
    let (config, from_file) = resolve_config(&args)?;

    let mut debug_flags = parse_debug_flags();
    if config.system.debug {
        debug_flags.merge_env_value("all");
    }
    let logging = LoggingConfig::from_names(&config.system.log_level, &config.system.log_format)
        .context("Invalid [system] logging settings")?
        .with_file_path(config.system.log_dir.clone());
    let _guard = init_logging(&debug_flags, &logging)?;

    if !from_file {
        warn!("no configuration file found; using built-in defaults");
    }

    let (mut driver, protocol) = from_config(&config).context("Invalid configuration")?;
    info!(
        mode = ?protocol.mode,
        duration_ms = protocol.total_duration(),
        celsius = config.environment.celsius,
        gkbar = config.channel.gkbar,
        "running clamp protocol"
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut write_error = None;
    driver
        .run_with(&protocol, config.environment.v_init, |point| {
            if write_error.is_none() {
                write_error = write_point(&mut out, point).err();
            }
        })
        .context("Clamp run aborted")?;

    if let Some(e) = write_error {
        return Err(e.context("Failed to write trace"));
    }
    out.flush().context("Failed to flush trace output")?;
    Ok(())
}
