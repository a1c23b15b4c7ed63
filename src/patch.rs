//! Placeholder patching over emitted output trees.
//!
//! Compiled output may carry a marker token inside string literals where
//! a runtime-visible version identifier belongs. After all emission
//! stages finish, this pass scans the output trees and replaces every
//! occurrence of the token with the resolved package version.

use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Code file extensions scanned for the placeholder token.
const CODE_EXTENSIONS: &[&str] = &["js", "cjs", "mjs"];

/// Errors that can occur while patching an output tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatchError {
    /// The scan pattern was rejected by the glob engine
    #[error("invalid scan pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// A matched file could not be read
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A patched file could not be written back
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of one patching pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    /// Files scanned for the token
    pub scanned: usize,
    /// Files that contained the token and were rewritten
    pub patched: usize,
}

/// Replace every occurrence of `placeholder` with `version` in code
/// files under `root`.
///
/// Files without an occurrence are left byte-identical, which makes the
/// pass idempotent: a second run finds nothing to rewrite. A missing
/// root is treated as an empty tree rather than an error, so pipelines
/// that emit no bundles can still run the pass unconditionally.
pub fn patch_tree(
    root: &Path,
    placeholder: &str,
    version: &str,
) -> Result<PatchSummary, PatchError> {
    let mut summary = PatchSummary::default();
    if !root.exists() {
        return Ok(summary);
    }

    for path in code_files(root)? {
        summary.scanned += 1;
        let content = fs::read_to_string(&path).map_err(|source| PatchError::Read {
            path: path.clone(),
            source,
        })?;
        if content.contains(placeholder) {
            let patched = content.replace(placeholder, version);
            fs::write(&path, patched).map_err(|source| PatchError::Write {
                path: path.clone(),
                source,
            })?;
            summary.patched += 1;
        }
    }

    Ok(summary)
}

/// Enumerate code files under a root, sorted for stable ordering.
fn code_files(root: &Path) -> Result<Vec<PathBuf>, PatchError> {
    let root_str = root.display().to_string();
    let mut files = Vec::new();

    for ext in CODE_EXTENSIONS {
        let pattern = format!("{}/**/*.{}", root_str, ext);
        let paths = glob(&pattern).map_err(|source| PatchError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => {
                    // Log but continue on glob errors
                    eprintln!("Warning: error reading path: {}", e);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
