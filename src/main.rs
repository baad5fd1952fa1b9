//! robotr - Command-line tool for Robot Framework result history

use anyhow::Context;
use clap::{Parser, Subcommand};
use robotrepo::commands::*;
use robotrepo::config::RobotrConfig;
use robotrepo::ui::CliUI;
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "robotr")]
#[command(about = "Robot Framework result history", long_about = None)]
struct Cli {
    /// Job directory holding .robotr and .robotr.conf (defaults to current directory)
    #[arg(short = 'C', long, global = true, env = "ROBOTR_DIR")]
    directory: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new result repository
    Init,

    /// Show help information for commands
    Help {
        /// Command to show help for
        command: Option<String>,
    },

    /// Parse output files and store them as a new build
    Load {
        /// Create repository if it doesn't exist
        #[arg(long)]
        force_init: bool,

        /// Store a build without results when no output file matches
        #[arg(long)]
        allow_missing: bool,
    },

    /// Show the results of a build
    Last {
        /// Build number (defaults to the latest with results)
        #[arg(long)]
        build: Option<u32>,

        /// Omit failure messages and traces
        #[arg(long)]
        no_output: bool,
    },

    /// Show failing tests from the most recent build
    Failing {
        /// List test ids only, one per line (for scripting)
        #[arg(long)]
        list: bool,
    },

    /// Show repository statistics
    Stats,

    /// Show a suite or test by path
    Show {
        /// '/'-separated suite and test names
        path: String,

        /// Build number (defaults to the latest with results)
        #[arg(long)]
        build: Option<u32>,
    },

    /// Show pass/fail counts over recent builds
    Trend {
        /// Suite or test path (defaults to the whole run)
        path: Option<String>,

        /// Only count failures
        #[arg(long)]
        failures_only: bool,

        /// Only count critical tests
        #[arg(long)]
        critical_only: bool,

        /// Number of builds to show, 0 for all
        #[arg(long)]
        max_builds: Option<usize>,
    },

    /// Show durations over recent builds
    Duration {
        /// Suite or test path (defaults to the whole run)
        path: Option<String>,

        /// Number of builds to show, 0 for all
        #[arg(long)]
        max_builds: Option<usize>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(directory: Option<&str>) -> anyhow::Result<RobotrConfig> {
    let base = Path::new(directory.unwrap_or("."));
    RobotrConfig::load(base)
        .with_context(|| format!("Failed to load configuration from {}", base.display()))
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut ui = CliUI::new();
    let directory = cli.directory;

    let code = match cli.command {
        Commands::Init => InitCommand::new(directory).execute(&mut ui)?,
        Commands::Help { command } => HelpCommand::new(command).execute(&mut ui)?,
        Commands::Load {
            force_init,
            allow_missing,
        } => {
            let config = load_config(directory.as_deref())?;
            LoadCommand::new(directory, config)
                .with_force_init(force_init)
                .with_allow_missing(allow_missing)
                .execute(&mut ui)?
        }
        Commands::Last { build, no_output } => {
            let config = load_config(directory.as_deref())?;
            LastCommand::new(directory, config)
                .with_build(build)
                .with_output_control(!no_output)
                .execute(&mut ui)?
        }
        Commands::Failing { list } => {
            let cmd = if list {
                FailingCommand::with_list_only(directory)
            } else {
                FailingCommand::new(directory)
            };
            cmd.execute(&mut ui)?
        }
        Commands::Stats => {
            let config = load_config(directory.as_deref())?;
            StatsCommand::new(directory, config).execute(&mut ui)?
        }
        Commands::Show { path, build } => ShowCommand::new(directory, path)
            .with_build(build)
            .execute(&mut ui)?,
        Commands::Trend {
            path,
            failures_only,
            critical_only,
            max_builds,
        } => {
            let config = load_config(directory.as_deref())?;
            TrendCommand::new(directory, config)
                .with_path(path)
                .with_failures_only(failures_only)
                .with_critical_only(critical_only)
                .with_max_builds(max_builds)
                .execute(&mut ui)?
        }
        Commands::Duration { path, max_builds } => {
            let config = load_config(directory.as_deref())?;
            DurationCommand::new(directory, config)
                .with_path(path)
                .with_max_builds(max_builds)
                .execute(&mut ui)?
        }
    };
    Ok(code)
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
