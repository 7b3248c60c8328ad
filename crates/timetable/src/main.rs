//! Timetable extractor CLI
//!
//! Turns CSV exports of the university timetable sheet into class records.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use timetable_logging::{init_logging, init_stderr_logging, LogConfig};

mod cli;

#[derive(Parser, Debug)]
#[command(name = "timetable", version, about = "Extract class schedules from timetable CSV exports")]
struct Cli {
    /// Mirror debug logging to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse one exported tab into class entries
    Parse {
        /// CSV export of one sheet tab
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include rejected sub-departments
        #[arg(long)]
        validation: bool,

        /// Parser configuration file (TOML)
        #[arg(long, env = "TIMETABLE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show departments and attested sub-departments of a tab
    Index {
        /// CSV export of one sheet tab
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse several tabs into one JSON bundle
    Bundle {
        /// Tab to include, as DAY=FILE (repeatable)
        #[arg(long = "tab", value_name = "DAY=FILE", required = true)]
        tabs: Vec<String>,

        /// Write the bundle to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Parser configuration file (TOML)
        #[arg(long, env = "TIMETABLE_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Parse {
            file,
            json,
            output,
            validation,
            config,
        } => cli::parse::run(cli::parse::ParseArgs {
            file,
            json,
            output,
            validation,
            config,
        }),
        Commands::Index { file, json } => cli::index::run(cli::index::IndexArgs { file, json }),
        Commands::Bundle {
            tabs,
            output,
            config,
        } => cli::bundle::run(cli::bundle::BundleArgs {
            tabs,
            output,
            config,
        }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig {
        app_name: "timetable",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: file logging disabled: {err:#}");
        if let Err(err) = init_stderr_logging(cli.verbose) {
            eprintln!("Warning: logging disabled: {err:#}");
        }
    }

    match run_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}
