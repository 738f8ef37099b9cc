// McWatch - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for McWatch configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Full path of the default config.toml, inside the platform config
    /// directory (e.g. ~/.config/mcwatch/ or %APPDATA%\McWatch\config\).
    pub config_file: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        let config_dir = if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            proj_dirs.config_dir().to_path_buf()
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            PathBuf::from(".")
        };
        let config_file = config_dir.join(constants::CONFIG_FILE_NAME);

        tracing::debug!(
            config = %config_dir.display(),
            file = %config_file.display(),
            "Platform paths resolved"
        );

        Self { config_file }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[server]` section.
    pub server: ServerSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[server]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Shell command that launches the server.
    pub command: Option<String>,
    /// Console command sent on Ctrl-C.
    pub stop_command: Option<String>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "text" or "json".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    // -- Server --
    pub server_command: String,
    pub stop_command: String,

    // -- Output --
    /// JSON lines (true) or human-readable text (false).
    pub json_output: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_command: constants::DEFAULT_SERVER_COMMAND.to_string(),
            stop_command: constants::DEFAULT_STOP_COMMAND.to_string(),
            json_output: false,
            log_level: None,
        }
    }
}

/// Values given on the command line. `None` or empty means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// Server command words; joined with spaces when present.
    pub command: Vec<String>,
    pub stop_command: Option<String>,
    pub json_output: Option<bool>,
}

impl AppConfig {
    /// Apply command-line values on top of this config.
    ///
    /// Precedence is CLI, then config.toml, then built-in defaults. Config
    /// and defaults are already merged in `self`.
    pub fn with_overrides(mut self, cli: CliOverrides) -> Self {
        if !cli.command.is_empty() {
            self.server_command = cli.command.join(" ");
        }
        if let Some(stop) = cli.stop_command {
            self.stop_command = stop;
        }
        if let Some(json) = cli.json_output {
            self.json_output = json;
        }
        self
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file cannot be read or parsed, returns defaults with a warning so
/// the watcher still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match try_load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Strict variant of [`load_config`] for a path the user named explicitly:
/// a missing, unreadable, or malformed file is an error.
pub fn try_load_config(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Validate each field, accumulating all problems as warnings.
fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    let mut reject = |field: &str, value: &str, expected: &str| {
        warnings.push(
            ConfigError::ValueOutOfRange {
                field: field.to_string(),
                value: value.to_string(),
                expected: expected.to_string(),
            }
            .to_string(),
        );
    };

    // -- Server: command --
    if let Some(command) = raw.server.command {
        if command.trim().is_empty() {
            reject("[server] command", &command, "a non-empty shell command");
        } else {
            config.server_command = command;
        }
    }

    // -- Server: stop_command --
    if let Some(stop) = raw.server.stop_command {
        if stop.trim().is_empty() {
            reject("[server] stop_command", &stop, "a non-empty console command");
        } else {
            config.stop_command = stop;
        }
    }

    // -- Output: format --
    if let Some(format) = raw.output.format {
        match format.to_lowercase().as_str() {
            "text" => config.json_output = false,
            "json" => config.json_output = true,
            _ => reject("[output] format", &format, "\"text\" or \"json\""),
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            reject(
                "[logging] level",
                &level,
                "one of error, warn, info, debug, trace",
            );
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}
