//! Documentation assembly
//!
//! Runs the configured readme and API-docs commands, then copies static
//! assets into the docs tree. Commands run from the project root; an
//! empty command vector skips that step. A missing asset source is
//! skipped, everything else is fatal.

use crate::build::BuildContext;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Errors from documentation assembly
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocsError {
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} command exited with status {status}")]
    Failed {
        step: String,
        status: std::process::ExitStatus,
    },

    #[error("failed to copy '{}' to '{}': {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counts of work done by a docs run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocsSummary {
    /// Commands actually executed (skipped steps not counted)
    pub commands_run: usize,
    /// Files copied from asset directories and asset file pairs
    pub files_copied: usize,
}

/// Assemble the documentation tree for a project.
///
/// Runs the readme command, then the API-docs command, then copies the
/// configured asset directories and files into place.
pub fn build_docs(context: &BuildContext) -> Result<DocsSummary, DocsError> {
    let docs = &context.config().docs;
    let mut summary = DocsSummary::default();

    if run_step(context, "readme", &docs.readme_command)? {
        summary.commands_run += 1;
    }
    if run_step(context, "docs", &docs.docs_command)? {
        summary.commands_run += 1;
    }

    for [from, to] in &docs.asset_dirs {
        let from_dir = context.resolve_path(Path::new(from));
        let to_dir = context.resolve_path(Path::new(to));
        if !from_dir.is_dir() {
            if context.is_verbose() {
                println!("  skipping missing asset directory {}", from);
            }
            continue;
        }
        summary.files_copied += copy_dir(&from_dir, &to_dir)?;
    }

    for [from, to] in &docs.asset_files {
        let from_file = context.resolve_path(Path::new(from));
        let to_file = context.resolve_path(Path::new(to));
        if !from_file.is_file() {
            if context.is_verbose() {
                println!("  skipping missing asset file {}", from);
            }
            continue;
        }
        copy_file(&from_file, &to_file)?;
        summary.files_copied += 1;
    }

    Ok(summary)
}

/// Run one docs command. Returns false when the step is not configured.
fn run_step(context: &BuildContext, step: &str, argv: &[String]) -> Result<bool, DocsError> {
    let Some((program, args)) = argv.split_first() else {
        if context.is_verbose() {
            println!("  skipping {}: no command configured", step);
        }
        return Ok(false);
    };

    if context.is_verbose() {
        println!("  {}: {}", step, argv.join(" "));
    }

    let status = Command::new(program)
        .args(args)
        .current_dir(context.project_root())
        .status()
        .map_err(|source| DocsError::Spawn { program: program.clone(), source })?;

    if !status.success() {
        return Err(DocsError::Failed { step: step.to_string(), status });
    }

    Ok(true)
}

/// Copy a directory tree, returning the number of files copied.
fn copy_dir(from: &Path, to: &Path) -> Result<usize, DocsError> {
    let copy_err = |source: std::io::Error| DocsError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    fs::create_dir_all(to).map_err(copy_err)?;

    let mut copied = 0;
    for entry in fs::read_dir(from).map_err(copy_err)? {
        let entry = entry.map_err(copy_err)?;
        let source_path = entry.path();
        let dest_path = to.join(entry.file_name());
        if source_path.is_dir() {
            copied += copy_dir(&source_path, &dest_path)?;
        } else {
            fs::copy(&source_path, &dest_path).map_err(|source| DocsError::Copy {
                from: source_path.clone(),
                to: dest_path.clone(),
                source,
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), DocsError> {
    let copy_err = |source: std::io::Error| DocsError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }
    fs::copy(from, to).map_err(copy_err)?;

    Ok(())
}
