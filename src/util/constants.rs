// McWatch - util/constants.rs
//
// Single source of truth for all named constants, markers, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "McWatch";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "McWatch";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Line shape
// =============================================================================

/// Separator between the metadata segment and the message segment.
/// Only the first occurrence splits the line.
pub const METADATA_SEPARATOR: &str = ": ";

// =============================================================================
// Classification markers
//
// Substrings searched for in a record's message. The order in which they are
// consulted lives in core::classifier and must not change.
// =============================================================================

/// Marks the one-shot startup completion line.
pub const READY_MARKER: &str = "Done";

/// Marks a player join line, e.g. `Alice[/127.0.0.1:50212] logged in ...`.
pub const JOIN_MARKER: &str = "logged in";

/// Marks a player leave line, e.g. `Alice left the game`.
pub const LEAVE_MARKER: &str = "left the game";

/// Connection-loss noise. Never classified as leave or died.
pub const LOST_CONNECTION_MARKER: &str = "lost connection:";

/// Terminates the user identifier in a join line.
pub const JOIN_NAME_TERMINATOR: char = '[';

// =============================================================================
// Server supervision
// =============================================================================

/// Command used to launch the server when neither CLI nor config names one.
pub const DEFAULT_SERVER_COMMAND: &str = "java -jar server.jar nogui";

/// Console command written to the server's stdin on Ctrl-C.
pub const DEFAULT_STOP_COMMAND: &str = "stop";

/// Bound on the number of raw lines queued between the reader thread and
/// the engine. The reader blocks when the engine falls this far behind.
pub const LINE_QUEUE_CAPACITY: usize = 1_024;

/// How long the watch loop waits for a line before re-checking whether the
/// engine has been shut down.
pub const FEED_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Target prefix of every McWatch log event (the crate name).
pub const LOG_TARGET: &str = "mcwatch";

/// Level for all other targets when RUST_LOG is not set.
pub const DEPENDENCY_LOG_LEVEL: &str = "warn";

/// Accepted values for `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Name of the optional configuration file in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
