//! Configuration loading and discovery for `distshape.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::DistConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during config discovery
pub const CONFIG_FILE_NAME: &str = "distshape.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse distshape.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the bundle entry file
    pub entry: Option<PathBuf>,
    /// Override the distributable output directory
    pub out: Option<PathBuf>,
}

/// Find distshape.toml by walking up from the current working directory.
///
/// # Returns
/// - `Some(path)` if a distshape.toml file is found
/// - `None` if no config file is found
///
/// # Example
/// ```ignore
/// if let Some(config_path) = find_config() {
///     println!("Found config at: {}", config_path.display());
/// }
/// ```
pub fn find_config() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    find_config_from(cwd)
}

/// Find distshape.toml by walking up from a specific directory.
///
/// This is the internal implementation that allows specifying the start directory,
/// useful for testing.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        // Move to parent directory
        if !current.pop() {
            // Reached root, no config found
            return None;
        }
    }
}

/// Load configuration from a distshape.toml file.
///
/// If a path is provided, loads from that file; a missing file is then an
/// error. Otherwise, uses `find_config()` to locate the config file. If no
/// config file is found, returns a default configuration.
///
/// # Arguments
/// - `path` - Optional path to a distshape.toml file
///
/// # Returns
/// - `Ok(DistConfig)` on success
/// - `Err(ConfigError)` if the file cannot be read, parsed, or validated
///
/// # Example
/// ```ignore
/// // Load from discovered config
/// let config = load_config(None)?;
///
/// // Load from specific path
/// let config = load_config(Some(Path::new("my-project/distshape.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<DistConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<DistConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: DistConfig = toml::from_str(&contents)?;

    // Validate the config
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(config)
}

/// Create a default configuration when no distshape.toml is found.
///
/// Every field has a built-in default, so a project with a conventional
/// layout needs no config file at all.
pub fn default_config() -> DistConfig {
    DistConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
///
/// # Arguments
/// - `config` - The configuration to modify
/// - `overrides` - CLI overrides to apply
///
/// # Example
/// ```ignore
/// let mut config = load_config(None)?;
/// let overrides = CliOverrides {
///     out: Some(PathBuf::from("build")),
///     ..Default::default()
/// };
/// merge_cli_overrides(&mut config, &overrides);
/// ```
pub fn merge_cli_overrides(config: &mut DistConfig, overrides: &CliOverrides) {
    // Override bundle entry file
    if let Some(ref entry) = overrides.entry {
        config.project.entry = entry.clone();
    }

    // Override distributable output directory
    if let Some(ref out) = overrides.out {
        config.project.dist_root = out.clone();
    }
}

/// Get the project root directory from a config file path.
///
/// Returns the parent directory of the distshape.toml file. A bare file
/// name has no usable parent, so callers fall back to the working
/// directory.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent().filter(|p| !p.as_os_str().is_empty())
}
