// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Touch-switch Bridge

Connects a serial touch panel on a host UART (USB adapter) and logs every
lighting change it would cause. Useful for bench testing a panel without
the lighting controller.

Usage:
  cargo run --bin touchswitch-bridge -- --port /dev/ttyUSB0
  cargo run --bin touchswitch-bridge -- --config touchswitch.toml --debug-touchswitch-protocol
  cargo run --bin touchswitch-bridge -- --list-ports
*/

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::{info, warn};

use touchswitch::config::load_config_or_default;
use touchswitch::hal::{SerialPortDevice, StdClock};
use touchswitch::logging::logging_config;
use touchswitch::observability::{debug_flags_help, CrateDebugFlags, DEBUG_ENV};
use touchswitch::protocol::{classic_effect_name, HostModule, LightHost, SerialTouchSwitch};
use touchswitch::runner::run;

/// Serial touch-switch bridge - drive a touch panel from a host UART
#[derive(Parser, Debug)]
#[command(name = "touchswitch-bridge", version, long_about = None)]
struct Args {
    /// Configuration file (default: search for touchswitch.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port, overrides [uart] port
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, overrides [uart] baud_rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// JSON document with a "switchEffects" array to import at startup
    #[arg(long)]
    effects: Option<PathBuf>,

    /// List available serial ports and exit
    #[arg(long, default_value_t = false)]
    list_ports: bool,
}

/// Lighting host that only logs
#[derive(Debug, Default)]
struct ConsoleHost {
    effect: u8,
    power_level: u8,
}

impl LightHost for ConsoleHost {
    fn set_active_effect(&mut self, effect_id: u8) {
        self.effect = effect_id;
    }

    fn set_power_level(&mut self, level: u8) {
        self.power_level = level;
    }

    fn notify_direct_change(&mut self) {
        let name = self
            .effect_name(self.effect)
            .unwrap_or_else(|| format!("Effect {}", self.effect));
        info!(
            "[BRIDGE] Light: effect={} ({}) power={}",
            self.effect, name, self.power_level
        );
    }

    fn effect_name(&self, effect_id: u8) -> Option<String> {
        classic_effect_name(effect_id).map(str::to_string)
    }
}

fn main() -> Result<()> {
    // --debug-<crate> flags are handled by the observability crate, not clap
    let (debug_args, args): (Vec<String>, Vec<String>) =
        env::args().partition(|arg| arg.starts_with("--debug-"));
    let matches = Args::command()
        .after_help(debug_flags_help())
        .get_matches_from(args);
    let args = Args::from_arg_matches(&matches)?;

    if args.list_ports {
        let ports = SerialPortDevice::list_ports();
        if ports.is_empty() {
            println!("No serial ports found");
        }
        for port in ports {
            println!("{}", port);
        }
        return Ok(());
    }

    let mut cli_overrides = HashMap::new();
    if let Some(port) = &args.port {
        cli_overrides.insert("uart_port".to_string(), port.clone());
    }
    if let Some(baud) = args.baud {
        cli_overrides.insert("baud_rate".to_string(), baud.to_string());
    }
    let config = load_config_or_default(args.config.as_deref(), Some(&cli_overrides))
        .context("Failed to load configuration")?;

    let mut debug_flags = CrateDebugFlags::from_args(debug_args);
    if let Ok(value) = env::var(DEBUG_ENV) {
        debug_flags.merge_env_value(&value);
    }
    let logging = logging_config(&config);

    #[cfg(feature = "file-logging")]
    let _log_guard = {
        let guard = touchswitch::observability::init_logging(&debug_flags, &logging)?;
        println!("Logging to {}", guard.log_dir().display());
        guard
    };
    #[cfg(not(feature = "file-logging"))]
    touchswitch::observability::init_console_logging(&debug_flags, &logging)?;

    info!(
        "[BRIDGE] touchswitch {} - opening {} at {} baud",
        touchswitch::VERSION,
        config.uart.port,
        config.uart.baud_rate
    );
    let serial = SerialPortDevice::open(&config.uart.port, config.uart.baud_rate)
        .with_context(|| format!("Failed to open serial port {}", config.uart.port))?;

    let mut module = SerialTouchSwitch::from_config(serial, ConsoleHost::default(), &config);

    if let Some(path) = &args.effects {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let document: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        if let Err(e) = module.read_from_config(&document) {
            warn!("[BRIDGE] {}; all switches reset to effect 0", e);
        }
    }

    for (switch, name) in module.status() {
        info!("[BRIDGE] {} -> {}", switch, name);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    info!("[BRIDGE] Polling (Press Ctrl+C to stop)...");
    let idle_ms = u32::try_from(config.protocol.idle_poll_interval_ms).unwrap_or(u32::MAX);
    let stats = run(&mut module, &StdClock::new(), idle_ms, |_| {
        running.load(Ordering::Relaxed)
    });

    info!(
        "[BRIDGE] Shutdown: {} toggles, {} ignored, {} dropped, {} transport errors",
        stats.toggles, stats.ignored, stats.dropped, stats.transport_errors
    );
    println!("{}", serde_json::to_string_pretty(&module.status_json())?);
    Ok(())
}
