//! minimal-mcp: serves registered resources and tools over stdio.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use minimal_mcp::config;
use minimal_mcp::presets::{self, Preset};

/// Minimal MCP server speaking newline-delimited JSON-RPC over stdio.
#[derive(Parser, Debug)]
#[command(name = "minimal-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Which ready-made server to run
    #[arg(long, value_enum, default_value_t = PresetArg::Filesystem)]
    preset: PresetArg,

    /// Directory exposed by the filesystem preset (overrides the config file)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PresetArg {
    Filesystem,
    Example,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Filesystem => Self::Filesystem,
            PresetArg::Example => Self::Example,
        }
    }
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. Logs go to stderr; stdout is protocol.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// GPL notice printed to stderr at startup (GPLv3 section 5d).
fn license_notice() -> String {
    format!(
        "minimal-mcp {}  Copyright (C) 2026  The Minimal MCP Authors\n\
         This program comes with ABSOLUTELY NO WARRANTY.\n\
         This is free software, licensed under GPL-3.0-or-later.\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Entry point for the minimal-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let mut cfg = match config::load_or_default(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if let Some(default_path) = config::default_config_path() {
                eprintln!("\nDefault config location: {}", default_path.display());
                eprintln!("Create one based on config/example-config.json");
            }
            return ExitCode::FAILURE;
        }
    };

    if let Some(root) = args.root {
        cfg.filesystem.root = root;
    }

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    eprintln!("{}", license_notice());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        preset = ?args.preset,
        "Starting minimal-mcp server"
    );

    let server = match presets::build(args.preset.into(), &cfg) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to build server");
            return ExitCode::FAILURE;
        }
    };

    info!(
        resources = server.registry().resource_count(),
        tools = server.registry().tool_count(),
        "MCP server ready, waiting for client connection..."
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn log_level_precedence() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(2, false, "warn"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "Info"), Level::INFO);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
    }

    #[test]
    fn license_notice_names_version_and_license() {
        let notice = license_notice();
        assert!(notice.starts_with(&format!("minimal-mcp {}", env!("CARGO_PKG_VERSION"))));
        assert!(notice.contains("ABSOLUTELY NO WARRANTY"));
        assert!(notice.contains("GPL-3.0-or-later"));
        assert_eq!(notice.lines().count(), 3);
    }

    #[test]
    fn preset_flag_parses() {
        let args = Args::parse_from(["minimal-mcp", "--preset", "example", "--root", "/tmp"]);
        assert_eq!(Preset::from(args.preset), Preset::Example);
        assert_eq!(args.root, Some(PathBuf::from("/tmp")));
    }
}
