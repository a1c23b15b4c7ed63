//! Docs command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::loader::CliOverrides;

/// Run the docs command
pub fn run_docs(
    config_path: Option<&Path>,
    project_dir: Option<&Path>,
    verbose: bool,
) -> ExitCode {
    use crate::docs::build_docs;

    let context =
        match super::build::load_project(config_path, project_dir, &CliOverrides::default(), verbose)
        {
            Ok(context) => context,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

    println!("Building docs ...");
    match build_docs(&context) {
        Ok(summary) => {
            println!(
                "Docs built: {} commands run, {} files copied",
                summary.commands_run, summary.files_copied
            );
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Docs build failed: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
