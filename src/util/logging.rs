// McWatch - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace), taken verbatim
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// The chosen level applies to McWatch's own targets only. Everything else
// (dependency crates) stays at DEPENDENCY_LOG_LEVEL unless RUST_LOG says
// otherwise.
//
// Output: stderr only. Stdout is reserved for event output so it can be
// piped into other tools.

use super::constants::{
    APP_NAME, APP_VERSION, DEFAULT_LOG_LEVEL, DEPENDENCY_LOG_LEVEL, LOG_TARGET,
};
use tracing_subscriber::EnvFilter;

/// Filter directive used when RUST_LOG is not set.
///
/// Priority: CLI --debug flag > config level > default "info".
pub fn default_directive(debug_flag: bool, config_level: Option<&str>) -> String {
    let level = if debug_flag {
        "debug"
    } else {
        config_level.unwrap_or(DEFAULT_LOG_LEVEL)
    };
    format!("{DEPENDENCY_LOG_LEVEL},{LOG_TARGET}={level}")
}

/// Initialise the logging subsystem.
///
/// RUST_LOG, when set, replaces the default directive entirely.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let directive = default_directive(debug_flag, config_level);
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(&directive),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .compact()
        .init();

    tracing::debug!(
        app = APP_NAME,
        version = APP_VERSION,
        directive = %directive,
        "Logging initialised"
    );
}
