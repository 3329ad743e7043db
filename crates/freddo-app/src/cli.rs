//! CLI argument definitions for the Freddo backend.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Freddo - a recipe and grocery-delivery chat assistant backend.
#[derive(Parser, Debug, Default)]
#[command(name = "freddo", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > FREDDO_CONFIG env var > ./freddo.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(std::env::var("FREDDO_CONFIG").ok())
    }

    /// Resolve the HTTP server port.
    ///
    /// Priority: --port flag > PORT env var > config file value > 8080.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.resolve_port_with(std::env::var("PORT").ok(), config_port)
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    fn resolve_config_path_with(&self, env: Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        match env {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => PathBuf::from("freddo.toml"),
        }
    }

    fn resolve_port_with(&self, env: Option<String>, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Some(p) = env.and_then(|v| v.parse::<u16>().ok()) {
            return p;
        }
        if config_port != 0 {
            return config_port;
        }
        8080
    }
}
