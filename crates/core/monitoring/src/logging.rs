//! Logging configuration using `tracing_subscriber`.

use std::{io::IsTerminal, sync::Once};

use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Environment variable holding the log level applied to all workspace crates.
static REPLICATION_LOG_ENV_VAR: &str = "REPLICATION_LOG";

/// Crates in the workspace, as they appear in log targets.
const WORKSPACE_CRATES: &[&str] = &[
    "controller",
    "feature_flags",
    "jobs",
    "monitoring",
    "protocol",
    "replication_config",
    "stream_status",
    "sync_stats",
    "worker",
];

/// Initializes a tracing subscriber for logging.
///
/// Safe to call more than once; only the first call installs the subscriber. Tests rely on this
/// to enable logging without coordinating with each other.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let (env_filter, log_level) = env_filter_and_log_level();

        let installed = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init();
        if let Err(err) = installed {
            // another subscriber owns the global default
            tracing::debug!(error = %err, "tracing subscriber already installed");
            return;
        }

        tracing::info!("log level: {}", log_level);
    });
}

/// Formats the chain of sources of `err`, outermost first, for use as a structured log field.
///
/// The error itself is expected to be logged separately (`error = %err`), so it is not part of
/// the chain.
pub fn error_source(
    err: &(dyn std::error::Error + 'static),
) -> tracing::field::DebugValue<Vec<String>> {
    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(err) = source {
        chain.push(err.to_string());
        source = err.source();
    }
    tracing::field::debug(chain)
}

fn env_filter_and_log_level() -> (EnvFilter, String) {
    let directive_string = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::ERROR.into())
        .parse_lossy(&directive_string);

    let log_level = std::env::var(REPLICATION_LOG_ENV_VAR).unwrap_or_else(|_| "info".to_string());

    for crate_name in WORKSPACE_CRATES {
        // RUST_LOG wins for crates it mentions explicitly
        if directive_string.contains(&format!("{crate_name}=")) {
            continue;
        }
        match format!("{crate_name}={log_level}").parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(err) => {
                eprintln!("ignoring invalid {REPLICATION_LOG_ENV_VAR} value '{log_level}': {err}");
                break;
            }
        }
    }

    (env_filter, log_level)
}

/// If this fails, update `WORKSPACE_CRATES` to match the workspace members.
#[test]
fn assert_workspace_crates() {
    use cargo_metadata::MetadataCommand;

    let cmd = MetadataCommand::new().exec().unwrap();
    let mut names: Vec<String> = cmd
        .workspace_packages()
        .into_iter()
        .map(|pkg| pkg.name.replace('-', "_"))
        .collect();
    names.sort();
    assert_eq!(names, WORKSPACE_CRATES);
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::{error_source, init};

    #[derive(Debug)]
    struct Wrapper(std::io::Error);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("outer failure")
        }
    }

    impl std::error::Error for Wrapper {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_source_lists_the_chain_without_the_outer_error() {
        //* Given
        let err = Wrapper(std::io::Error::other("connection reset"));

        //* When
        let chain = format!("{:?}", error_source(&err));

        //* Then
        assert_eq!(chain, r#"["connection reset"]"#);
    }

    #[test]
    fn init_twice_is_a_no_op() {
        //* Given
        init();

        //* When
        init();

        //* Then
        tracing::info!("logging still works after a repeated init");
    }
}
