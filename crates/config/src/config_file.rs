//! TOML configuration file loading with environment variable overrides.
//!
//! Deserializes a [`ConfigFile`] from a TOML file using [Figment], merging
//! `REPLICATION_CONFIG_*` environment variables over the file values.
//!
//! ## Environment variables
//!
//! All env vars are prefixed with `REPLICATION_CONFIG_` and use double underscores to
//! separate nested keys. For example, `REPLICATION_CONFIG_DESTINATION_TIMEOUT__TIMEOUT_SECS`
//! maps to `destination_timeout.timeout_secs` in the config file.
//!
//! A missing config file is not an error: every section has defaults.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format as _, Toml},
};
use monitoring::config::OpenTelemetryConfig;

use crate::{DestinationTimeoutConfig, FeatureFlagsConfig};

/// Prefix of the environment variables overriding config file values
pub const ENV_PREFIX: &str = "REPLICATION_CONFIG_";

/// Load a [`ConfigFile`] from a TOML file with env-var overrides.
pub fn load(config_path: &Path) -> Result<ConfigFile, LoadConfigFileError> {
    Figment::new()
        .merge(Toml::file(config_path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|err| LoadConfigFileError(Box::new(err)))
}

/// Raw configuration as deserialized from the TOML config file.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ConfigFile {
    /// Destination call supervision of the worker
    #[serde(default)]
    pub destination_timeout: DestinationTimeoutConfig,

    /// Static feature flag values
    #[serde(default)]
    pub feature_flags: FeatureFlagsConfig,

    // Observability
    pub opentelemetry: Option<OpenTelemetryConfig>,
}

/// Error when loading configuration from a TOML file.
#[derive(Debug, thiserror::Error)]
#[error("Failed to load configuration file")]
pub struct LoadConfigFileError(#[source] pub Box<figment::Error>);
