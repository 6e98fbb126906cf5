use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

/// Overrides the configured level, e.g. `APPSNAP_LOG=appsnap=debug`.
pub const LOG_ENV: &str = "APPSNAP_LOG";

pub fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| eyre!("invalid log level `{level}`: {e}"))
}

/// Warn-level stderr subscriber for the window before the configured one is
/// installed, so config loading problems are not lost.
pub fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .with_target(false)
        .finish()
}

/// Install a global subscriber writing to stderr; stdout carries snapshots only.
pub fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().with_ansi(false).try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}
