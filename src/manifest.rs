//! Package manifest resolution.
//!
//! Reads `package.json` once at pipeline start to resolve the package name,
//! version, and runtime dependency set. Every later stage consumes these
//! through the build context; nothing re-reads the manifest mid-pipeline.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Error resolving the package manifest.
///
/// Any of these is fatal: a build cannot start without a resolvable
/// name and version.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    /// Manifest file does not exist.
    #[error("Package manifest not found: '{path}'")]
    NotFound { path: String },

    /// IO error reading the manifest.
    #[error("Failed to read '{path}': {message}")]
    Io { path: String, message: String },

    /// Manifest is not valid JSON or is missing required fields.
    #[error("Failed to parse '{path}': {message}")]
    Parse { path: String, message: String },

    /// A required field is present but empty.
    #[error("Package manifest '{path}' has an empty '{field}' field")]
    EmptyField { path: String, field: &'static str },
}

/// The package descriptor fields the pipeline consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    /// Declared package name, possibly scoped (`@scope/name`).
    pub name: String,
    /// Declared semantic version.
    pub version: String,
    /// Runtime dependencies; names become bundle externals for library
    /// layout bundles.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Load and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.is_file() {
            return Err(ManifestError::NotFound { path: path.display().to_string() });
        }

        let raw = fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let manifest: PackageManifest =
            serde_json::from_str(&raw).map_err(|e| ManifestError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        if manifest.name.is_empty() {
            return Err(ManifestError::EmptyField {
                path: path.display().to_string(),
                field: "name",
            });
        }
        if manifest.version.is_empty() {
            return Err(ManifestError::EmptyField {
                path: path.display().to_string(),
                field: "version",
            });
        }

        Ok(manifest)
    }

    /// Package name with any scope prefix stripped.
    ///
    /// `@scope/pkg` resolves to `pkg`; unscoped names pass through.
    /// Output naming (UMD global, library bundle filename) always uses
    /// the unscoped form.
    pub fn unscoped_name(&self) -> &str {
        self.name.split('/').nth(1).unwrap_or(&self.name)
    }

    /// Names of all declared runtime dependencies, sorted.
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies.keys().cloned().collect()
    }
}
