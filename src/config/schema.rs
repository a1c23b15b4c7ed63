//! Configuration schema types for `distshape.toml`
//!
//! Defines the structure and validation rules for project configuration.
//! Every field has a default, so a missing or empty config file yields a
//! fully working configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project layout section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Source directory holding the compiled-language sources
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,
    /// Library emission output root
    #[serde(default = "default_library_root")]
    pub library_root: PathBuf,
    /// Distributable bundle output root
    #[serde(default = "default_dist_root")]
    pub dist_root: PathBuf,
    /// Library-layout bundle output directory
    #[serde(default = "default_bin_root")]
    pub bin_root: PathBuf,
    /// Bundle entry file
    #[serde(default = "default_entry")]
    pub entry: PathBuf,
    /// Package manifest read for name, version and dependencies
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            library_root: default_library_root(),
            dist_root: default_dist_root(),
            bin_root: default_bin_root(),
            entry: default_entry(),
            manifest: default_manifest(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}

fn default_library_root() -> PathBuf {
    PathBuf::from("lib")
}

fn default_dist_root() -> PathBuf {
    PathBuf::from("dist")
}

fn default_bin_root() -> PathBuf {
    PathBuf::from("bin")
}

fn default_entry() -> PathBuf {
    PathBuf::from("src/index.ts")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

/// Library emission section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Token substituted with the resolved version string
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Extension (without dot) for legacy-module code output
    #[serde(default = "default_legacy_extension")]
    pub legacy_extension: String,
    /// Extension (without dot) of source files
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// Sub-path of the library root for linked-module output
    #[serde(default = "default_linked_subdir")]
    pub linked_subdir: String,
    /// Project compiler configuration file
    #[serde(default = "default_tsconfig")]
    pub tsconfig: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            legacy_extension: default_legacy_extension(),
            source_extension: default_source_extension(),
            linked_subdir: default_linked_subdir(),
            tsconfig: default_tsconfig(),
        }
    }
}

fn default_placeholder() -> String {
    "##VERSION##".to_string()
}

fn default_legacy_extension() -> String {
    "cjs".to_string()
}

fn default_source_extension() -> String {
    "ts".to_string()
}

fn default_linked_subdir() -> String {
    "esm".to_string()
}

fn default_tsconfig() -> String {
    "tsconfig.json".to_string()
}

/// Bundle output section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Global execution context object for single-global bundles
    #[serde(default = "default_global_object")]
    pub global_object: String,
    /// Override the unscoped package name used for output naming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            global_object: default_global_object(),
            library_name: None,
        }
    }
}

fn default_global_object() -> String {
    "this".to_string()
}

/// Collaborator subprocess section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Source compiler argv (e.g. `["npx", "tsc"]`)
    #[serde(default = "default_compiler")]
    pub compiler: Vec<String>,
    /// Module bundler argv (e.g. `["npx", "webpack"]`)
    #[serde(default = "default_bundler")]
    pub bundler: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            bundler: default_bundler(),
        }
    }
}

fn default_compiler() -> Vec<String> {
    vec!["npx".to_string(), "tsc".to_string()]
}

fn default_bundler() -> Vec<String> {
    vec!["npx".to_string(), "webpack".to_string()]
}

/// Documentation glue section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Readme-assembly argv; empty vector skips the step
    #[serde(default = "default_readme_command")]
    pub readme_command: Vec<String>,
    /// API-docs argv; empty vector skips the step
    #[serde(default = "default_docs_command")]
    pub docs_command: Vec<String>,
    /// Asset directories copied as `[from, to]` pairs
    #[serde(default = "default_asset_dirs")]
    pub asset_dirs: Vec<[String; 2]>,
    /// Single files copied as `[from, to]` pairs
    #[serde(default = "default_asset_files")]
    pub asset_files: Vec<[String; 2]>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            readme_command: default_readme_command(),
            docs_command: default_docs_command(),
            asset_dirs: default_asset_dirs(),
            asset_files: default_asset_files(),
        }
    }
}

fn default_readme_command() -> Vec<String> {
    vec![
        "npx".to_string(),
        "markdown-include".to_string(),
        "./workdocs/readme-md.json".to_string(),
    ]
}

fn default_docs_command() -> Vec<String> {
    vec![
        "npx".to_string(),
        "jsdoc".to_string(),
        "-c".to_string(),
        "./workdocs/jsdocs.json".to_string(),
        "-t".to_string(),
        "./node_modules/better-docs".to_string(),
    ]
}

fn default_asset_dirs() -> Vec<[String; 2]> {
    vec![
        ["workdocs/assets".to_string(), "docs/workdocs/assets".to_string()],
        [
            "workdocs/reports/coverage".to_string(),
            "docs/workdocs/reports/coverage".to_string(),
        ],
        [
            "workdocs/reports/html".to_string(),
            "docs/workdocs/reports/html".to_string(),
        ],
        [
            "workdocs/resources".to_string(),
            "docs/workdocs/resources".to_string(),
        ],
    ]
}

fn default_asset_files() -> Vec<[String; 2]> {
    vec![["LICENSE.md".to_string(), "docs/LICENSE.md".to_string()]]
}

/// Complete distshape.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DistConfig {
    /// Project layout
    #[serde(default)]
    pub project: ProjectConfig,
    /// Library emission settings
    #[serde(default)]
    pub emit: EmitConfig,
    /// Bundle output settings
    #[serde(default)]
    pub bundle: BundleConfig,
    /// Collaborator subprocess settings
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Documentation glue settings
    #[serde(default)]
    pub docs: DocsConfig,
}

impl DistConfig {
    /// Validate the configuration and return any problems found.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let paths = [
            ("project.source_root", &self.project.source_root),
            ("project.library_root", &self.project.library_root),
            ("project.dist_root", &self.project.dist_root),
            ("project.bin_root", &self.project.bin_root),
            ("project.entry", &self.project.entry),
            ("project.manifest", &self.project.manifest),
        ];
        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                errors.push(format!("'{}' must not be empty", field));
            }
        }

        if self.emit.placeholder.is_empty() {
            errors.push("'emit.placeholder' must not be empty".to_string());
        }
        for (field, ext) in [
            ("emit.legacy_extension", &self.emit.legacy_extension),
            ("emit.source_extension", &self.emit.source_extension),
        ] {
            if ext.is_empty() {
                errors.push(format!("'{}' must not be empty", field));
            } else if ext.starts_with('.') {
                errors.push(format!("'{}' must not start with a dot", field));
            }
        }
        if self.emit.linked_subdir.is_empty() {
            errors.push("'emit.linked_subdir' must not be empty".to_string());
        }

        if self.bundle.global_object.is_empty() {
            errors.push("'bundle.global_object' must not be empty".to_string());
        }
        if let Some(name) = &self.bundle.library_name {
            if name.is_empty() {
                errors.push("'bundle.library_name' must not be empty when set".to_string());
            }
        }

        if self.tools.compiler.is_empty() {
            errors.push("'tools.compiler' must contain a program to run".to_string());
        }
        if self.tools.bundler.is_empty() {
            errors.push("'tools.bundler' must contain a program to run".to_string());
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
