//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod docs;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::build::BuildMode;

/// Exit codes used by every command
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Distshape - orchestrate library and bundle emissions for TypeScript packages
#[derive(Parser)]
#[command(name = "dsh")]
#[command(about = "Distshape - build TypeScript packages into library and bundle emissions")]
#[command(version)]
pub struct Cli {
    /// Path to a distshape.toml config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root directory (defaults to the config file's directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a development build (readable output, inline source maps)
    Dev {
        /// Show the build plan without running it
        #[arg(long)]
        dry_run: bool,

        /// Override the bundle entry file
        #[arg(long, value_name = "FILE")]
        entry: Option<PathBuf>,

        /// Override the distributable output directory
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Run a production build (minified output)
    Prod {
        /// Show the build plan without running it
        #[arg(long)]
        dry_run: bool,

        /// Override the bundle entry file
        #[arg(long, value_name = "FILE")]
        entry: Option<PathBuf>,

        /// Override the distributable output directory
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Assemble documentation (readme, API docs, static assets)
    Docs,
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap renders help and version through the same error path
            let code = if e.use_stderr() { EXIT_INVALID_ARGS } else { EXIT_SUCCESS };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let config = cli.config.as_deref();
    let project = cli.project.as_deref();

    match cli.command {
        Commands::Dev { dry_run, entry, out } => build::run_build(
            BuildMode::Development,
            config,
            project,
            cli.verbose,
            dry_run,
            entry.as_deref(),
            out.as_deref(),
        ),
        Commands::Prod { dry_run, entry, out } => build::run_build(
            BuildMode::Production,
            config,
            project,
            cli.verbose,
            dry_run,
            entry.as_deref(),
            out.as_deref(),
        ),
        Commands::Docs => docs::run_docs(config, project, cli.verbose),
    }
}
