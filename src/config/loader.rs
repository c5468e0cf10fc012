//! Configuration loading from disk.
//!
//! Loading is a fixed pipeline: build the defaulted root, overlay the user
//! values from TOML, fill the backend nameserver fallback, then run the
//! semantic checks. A config that comes out of here is fully populated and
//! consistent; startup must abort on any error returned.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, FALLBACK_NAMESERVERS};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading. All variants are fatal to startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = load_from_str(&content)?;

    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Parse and validate configuration from TOML text.
///
/// Fields absent from the text keep their default values; an empty string
/// yields the pure-defaults root (plus the nameserver fallback).
pub fn load_from_str(content: &str) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = toml::from_str(content)?;

    // One-time, order-sensitive fill: configs with no backend resolvers
    // get the fixed fallback pair before validation runs.
    if config.dns.nameserver.is_empty() {
        config
            .dns
            .nameserver
            .extend(FALLBACK_NAMESERVERS.iter().map(|ns| ns.to_string()));
        tracing::debug!(nameservers = ?config.dns.nameserver, "no backend nameservers configured, using fallback");
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
