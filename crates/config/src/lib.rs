//! Configuration of the replication services.
//!
//! The raw [`ConfigFile`] is loaded with [`config_file::load`] and resolved into the typed
//! [`Config`] consumed by the services.

use std::path::Path;

use feature_flags::ConfigFlagClient;
pub use monitoring::config::OpenTelemetryConfig;

pub use self::{
    config_file::{ConfigFile, LoadConfigFileError},
    duration::ConfigDuration,
    feature_flags_config::FeatureFlagsConfig,
    worker_config::DestinationTimeoutConfig,
};

pub mod config_file;
mod duration;
mod feature_flags_config;
mod worker_config;

/// Resolved configuration of the replication services
#[derive(Debug, Clone)]
pub struct Config {
    pub worker: worker::Config,
    pub feature_flags: ConfigFlagClient,
    pub opentelemetry: Option<OpenTelemetryConfig>,
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        Self {
            worker: worker::Config {
                destination_timeout: (&file.destination_timeout).into(),
            },
            feature_flags: file.feature_flags.into(),
            opentelemetry: file.opentelemetry,
        }
    }
}

/// Loads the configuration file at `config_path` and resolves it.
///
/// See [`config_file`] for the environment variable overrides.
pub fn load_config(config_path: impl AsRef<Path>) -> Result<Config, LoadConfigFileError> {
    config_file::load(config_path.as_ref()).map(Config::from)
}
