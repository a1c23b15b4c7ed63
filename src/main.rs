//! Distshape - Command-line build orchestrator for TypeScript packages

use std::process::ExitCode;

use distshape::cli;

fn main() -> ExitCode {
    cli::run()
}
