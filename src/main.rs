// McWatch - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading and logging initialisation
// 3. Launching the server (or reading stdin) and wiring its output into
//    the stream engine
// 4. Ctrl-C: send the stop command, stop the engine, wait for the server

use clap::Parser;
use mcwatch::app::engine::StreamEngine;
use mcwatch::app::feed::LineFeed;
use mcwatch::app::server::{ServerInput, ServerProcess};
use mcwatch::app::watch;
use mcwatch::platform::config::{self, AppConfig, CliOverrides, PlatformPaths};
use mcwatch::ui::console::{ConsoleReporter, OutputFormat};
use mcwatch::util::{self, error::McWatchError, error::ServerError};
use std::path::PathBuf;
use std::process::ExitCode;

/// McWatch - watch a game server's console and report player lifecycle events.
///
/// Launches the server command, tails its output, and prints server-ready,
/// join, leave, and other player activity events as they happen.
#[derive(Parser, Debug)]
#[command(name = "McWatch", version, about)]
struct Cli {
    /// Server command line (overrides [server] command in config).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,

    /// Read console lines from stdin instead of launching a server.
    #[arg(long)]
    stdin: bool,

    /// Config file to load instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Event output format: text or json.
    #[arg(short = 'f', long = "format")]
    format: Option<OutputFormat>,

    /// Console command sent to the server on Ctrl-C.
    #[arg(long = "stop-command")]
    stop_command: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (app_config, config_warnings) = match &cli.config {
        Some(path) => match config::try_load_config(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => config::load_config(&PlatformPaths::resolve().config_file),
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "McWatch starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let settings = app_config.with_overrides(CliOverrides {
        command: cli.command.clone(),
        stop_command: cli.stop_command.clone(),
        json_output: cli.format.map(|f| f == OutputFormat::Json),
    });

    match run(&cli, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "McWatch failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `settings` already carries CLI values merged over config.toml.
fn run(cli: &Cli, settings: AppConfig) -> Result<(), McWatchError> {
    let format = if settings.json_output {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let mut engine = StreamEngine::new();
    ConsoleReporter::new(format, std::io::stdout()).attach(&mut engine);
    let handle = engine.handle();

    if cli.stdin {
        let feed = LineFeed::spawn(std::io::stdin(), "stdin").map_err(spawn_error)?;
        install_ctrlc(move || handle.shutdown());
        watch::run(&mut engine, &feed)?;
        engine.shutdown();
        return Ok(());
    }

    let AppConfig {
        server_command: command,
        stop_command,
        ..
    } = settings;

    let (mut server, stdout) = ServerProcess::spawn(&command)?;
    let feed = LineFeed::spawn(stdout, "server").map_err(spawn_error)?;

    let input: ServerInput = server.input();
    install_ctrlc(move || {
        tracing::info!(command = %stop_command, "Interrupted; stopping server");
        if let Err(e) = input.send(&stop_command) {
            tracing::warn!(error = %e, "Could not send stop command");
        }
        handle.shutdown();
    });

    watch::run(&mut engine, &feed)?;
    engine.shutdown();

    let discarded = feed.drain();
    if discarded > 0 {
        tracing::debug!(lines = discarded, "Discarded output after shutdown");
    }
    let status = server.wait()?;
    if !status.success() {
        tracing::warn!(status = %status, "Server exited unsuccessfully");
    }
    Ok(())
}

fn install_ctrlc<F>(handler: F)
where
    F: FnMut() + Send + 'static,
{
    if let Err(e) = ctrlc::set_handler(handler) {
        tracing::warn!(error = %e, "Could not install Ctrl-C handler");
    }
}

fn spawn_error(source: std::io::Error) -> McWatchError {
    ServerError::FeedThread { source }.into()
}
