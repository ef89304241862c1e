//! Configuration management.
//!
//! Configuration is loaded from (in order of precedence):
//! 1. Command-line arguments
//! 2. Environment variables (SOLOSERVE_*)
//! 3. Config file (~/.config/soloserve/config.toml)
//! 4. Default values

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Persistent settings backing the command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model to load when -m/--model is not given.
    #[serde(default)]
    pub default_model: Option<String>,

    /// Default log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default context window size in tokens.
    #[serde(default = "default_ctx_size")]
    pub ctx_size: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ctx_size() -> u32 {
    4096
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: None,
            log_level: default_log_level(),
            ctx_size: default_ctx_size(),
        }
    }
}

impl Config {
    /// Loads configuration from all sources.
    ///
    /// Reports warnings for configuration errors but falls back to defaults.
    pub fn load() -> Self {
        let config_path = Self::config_path();

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("SOLOSERVE_"));

        match figment.extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: configuration error, using defaults");
                eprintln!("  Config file: {}", config_path.display());
                eprintln!("  Error: {e}");
                Config::default()
            }
        }
    }

    /// Returns the path to the config file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("soloserve")
            .join("config.toml")
    }
}
