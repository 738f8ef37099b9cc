// McWatch - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation. All errors preserve the causal
// chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error raised by an event handler. The engine has no policy for handler
/// failures; it hands them back to whoever submitted the line.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all McWatch operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum McWatchError {
    /// A console line could not be parsed.
    Parse(ParseError),

    /// The stream engine rejected a call or a handler failed.
    Engine(EngineError),

    /// Spawning or talking to the server process failed.
    Server(ServerError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for McWatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Engine(e) => write!(f, "Engine error: {e}"),
            Self::Server(e) => write!(f, "Server error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for McWatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Engine(e) => Some(e),
            Self::Server(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Errors related to console line parsing.
///
/// The engine recovers from these locally by dropping the line; they are
/// only surfaced by the parser itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not have the `[H:M:S] [LEVEL]: message` shape.
    Unparsable { reason: &'static str },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparsable { reason } => write!(f, "Unparsable line: {reason}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for McWatchError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

/// Conditions surfaced to the caller of `StreamEngine::submit_line`.
#[derive(Debug)]
pub enum EngineError {
    /// A line was submitted before the engine was started.
    NotStarted,

    /// A line was submitted after shutdown.
    Closed,

    /// A registered handler failed while an event was dispatched.
    Handler {
        event: &'static str,
        source: HandlerError,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "Engine has not been started"),
            Self::Closed => write!(f, "Engine is closed; no further lines are accepted"),
            Self::Handler { event, source } => {
                write!(f, "Handler for '{event}' event failed: {source}")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Handler { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<EngineError> for McWatchError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

// ---------------------------------------------------------------------------
// Server errors
// ---------------------------------------------------------------------------

/// Errors related to the supervised server process.
#[derive(Debug)]
pub enum ServerError {
    /// The server command could not be launched.
    Spawn { command: String, source: io::Error },

    /// A pipe to the server was not available after spawning.
    MissingPipe { pipe: &'static str },

    /// Writing to the server's stdin failed.
    Write { text: String, source: io::Error },

    /// Waiting for the server to exit failed.
    Wait { source: io::Error },

    /// The background reader for the server's output could not be started.
    FeedThread { source: io::Error },

    /// The stdin lock was poisoned by a panicking writer.
    StdinPoisoned,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { command, source } => {
                write!(f, "Failed to launch server command '{command}': {source}")
            }
            Self::MissingPipe { pipe } => {
                write!(f, "Server process has no {pipe} pipe")
            }
            Self::Write { text, source } => {
                write!(f, "Failed to send '{text}' to the server: {source}")
            }
            Self::Wait { source } => write!(f, "Failed to wait for server exit: {source}"),
            Self::FeedThread { source } => {
                write!(f, "Failed to start the output reader thread: {source}")
            }
            Self::StdinPoisoned => write!(f, "Server stdin lock poisoned"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
            Self::Wait { source } => Some(source),
            Self::FeedThread { source } => Some(source),
            _ => None,
        }
    }
}

impl From<ServerError> for McWatchError {
    fn from(e: ServerError) -> Self {
        Self::Server(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for McWatchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for McWatch results.
pub type Result<T> = std::result::Result<T, McWatchError>;
