//! Logger setup.
//!
//! Everything in the crate logs through the [`log`] facade. Applications that
//! don't bring their own logger can call [`init_logging`] once at startup to
//! install `env_logger`. `RUST_LOG` always overrides the configured default.

use std::sync::Once;

use serde::{Deserialize, Serialize};

static INIT: Once = Once::new();

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"monorail=debug,wgpu=warn"`.
    pub default_filter: String,
    /// Colorize output (`"auto"`, `"always"` or `"never"`).
    pub write_style: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info,wgpu_core=warn,wgpu_hal=warn".into(),
            write_style: "auto".into(),
        }
    }
}

/// Install `env_logger` as the global logger. Later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&config.default_filter)
            .parse_write_style(&config.write_style)
            .parse_default_env();

        if builder.try_init().is_err() {
            eprintln!("[monorail] Warning: a logger is already set.");
            return;
        }
        log::debug!("logging initialized (default filter: {})", config.default_filter);
    });
}
