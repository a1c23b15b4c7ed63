//! Module bundler collaborator and its generated configuration.
//!
//! A bundle target maps to one bundler invocation over a single entry
//! file. The configuration surface is rendered into a JavaScript config
//! file (regex literals cannot be expressed in JSON), handed to the
//! configured command, and deleted after the run. The [`Bundler`] trait
//! is the seam tests use to substitute an in-process fake.

use crate::build::context::BuildContext;
use crate::build::target::{BundleFormat, BundleTarget};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Platform modules resolved to "absent" instead of a polyfill.
const FALLBACK_MODULES: &[&str] = &["path", "fs", "stream", "os", "assert", "util"];

/// Errors from the bundler collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BundleError {
    /// The configured command has no program to run
    #[error("bundler command is empty")]
    EmptyCommand,

    /// The generated configuration could not be written
    #[error("failed to write bundler config under '{}': {source}", dir.display())]
    ConfigWrite {
        dir: PathBuf,
        source: std::io::Error,
    },

    /// The bundler process could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The bundler ran and reported failure
    #[error("bundler exited with status {status}")]
    Failed { status: std::process::ExitStatus },
}

/// UMD output settings for single-global bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UmdOutput {
    /// Name the bundle exposes as a UMD library
    pub library_name: String,
    /// Global execution context object expression
    pub global_object: String,
}

/// Resolved configuration for one bundler invocation.
#[derive(Debug, Clone)]
pub struct BundlerConfig {
    /// "development" or "production"
    pub mode: String,
    /// Entry file the dependency graph is resolved from
    pub entry: PathBuf,
    /// Source directory the loader is restricted to
    pub source_dir: PathBuf,
    /// Loader configuration file, as configured (usually relative)
    pub tsconfig: String,
    /// Directory the artifact is written into
    pub output_dir: PathBuf,
    /// Artifact filename
    pub output_filename: String,
    /// Declare the output as a native module graph
    pub output_module: bool,
    /// UMD output settings, for single-global targets
    pub umd: Option<UmdOutput>,
    /// Dependencies kept external instead of inlined
    pub externals: Vec<String>,
    /// Enable the host runtime's externals preset
    pub node_externals_preset: bool,
    /// Source-map mode, set in development only
    pub devtool: Option<String>,
}

impl BundlerConfig {
    /// Resolve the configuration for a bundle target.
    pub fn for_target(context: &BuildContext, target: &BundleTarget) -> Self {
        let umd = match target.format {
            BundleFormat::SingleGlobal => Some(UmdOutput {
                library_name: context.library_name().to_string(),
                global_object: context.config().bundle.global_object.clone(),
            }),
            BundleFormat::ModuleGraph => None,
        };
        let externals = if target.is_library() {
            context.dependency_names().to_vec()
        } else {
            Vec::new()
        };
        Self {
            mode: target.mode.bundler_mode().to_string(),
            entry: context.entry_file(),
            source_dir: context.src_dir(),
            tsconfig: context.config().emit.tsconfig.clone(),
            output_dir: context.bundle_dest(target),
            output_filename: target.filename(),
            output_module: target.format.is_module_graph(),
            umd,
            externals,
            node_externals_preset: target.is_library(),
            devtool: if target.mode.is_dev() {
                Some("eval-source-map".to_string())
            } else {
                None
            },
        }
    }

    /// Render the configuration as a JavaScript module.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("module.exports = {\n");
        out.push_str(&format!("  mode: {},\n", js_string(&self.mode)));
        out.push_str("  target: \"node\",\n");
        out.push_str(&format!(
            "  entry: {},\n",
            js_string(&self.entry.display().to_string())
        ));
        out.push_str("  module: {\n");
        out.push_str("    rules: [\n");
        out.push_str("      {\n");
        out.push_str("        test: /\\.ts$/,\n");
        out.push_str("        use: [\n");
        out.push_str("          {\n");
        out.push_str("            loader: \"ts-loader\",\n");
        out.push_str(&format!(
            "            options: {{ configFile: {} }},\n",
            js_string(&self.tsconfig)
        ));
        out.push_str("          },\n");
        out.push_str("        ],\n");
        out.push_str(&format!(
            "        include: [{}],\n",
            js_string(&self.source_dir.display().to_string())
        ));
        out.push_str("        exclude: /node_modules/,\n");
        out.push_str("      },\n");
        out.push_str("    ],\n");
        out.push_str("  },\n");
        out.push_str("  resolve: {\n");
        out.push_str("    extensions: [\".ts\", \".js\"],\n");
        out.push_str("    fallback: {\n");
        for module in FALLBACK_MODULES {
            out.push_str(&format!("      {}: false,\n", module));
        }
        out.push_str("    },\n");
        out.push_str("  },\n");
        if !self.externals.is_empty() {
            let list = self
                .externals
                .iter()
                .map(|name| js_string(name))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("  externals: [{}],\n", list));
        }
        if self.node_externals_preset {
            out.push_str("  externalsPresets: { node: true },\n");
        }
        if self.output_module {
            out.push_str("  experiments: { outputModule: true },\n");
        }
        out.push_str("  output: {\n");
        out.push_str(&format!(
            "    filename: {},\n",
            js_string(&self.output_filename)
        ));
        out.push_str(&format!(
            "    path: {},\n",
            js_string(&self.output_dir.display().to_string())
        ));
        if let Some(umd) = &self.umd {
            out.push_str(&format!(
                "    globalObject: {},\n",
                js_string(&umd.global_object)
            ));
            out.push_str(&format!("    library: {},\n", js_string(&umd.library_name)));
            out.push_str("    libraryTarget: \"umd\",\n");
            out.push_str("    umdNamedDefine: true,\n");
        }
        out.push_str("  },\n");
        if let Some(devtool) = &self.devtool {
            out.push_str(&format!("  devtool: {},\n", js_string(devtool)));
        }
        out.push_str("};\n");
        out
    }
}

/// Quote a string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Produces one artifact from an entry file.
pub trait Bundler: Send + Sync {
    /// Run the bundler with the given configuration.
    fn bundle(&self, config: &BundlerConfig) -> Result<(), BundleError>;

    /// Human-readable invocation description for plan output.
    fn describe(&self) -> String;
}

/// `webpack` driven through a generated configuration file.
///
/// The config file is created next to the project root so the bundler
/// resolves loaders from the project's own dependencies, and uses the
/// `.cjs` extension so a `type: "module"` host package still reads it
/// as CommonJS. It is removed once the invocation finishes.
pub struct WebpackBundler {
    command: Vec<String>,
    project_root: PathBuf,
}

impl WebpackBundler {
    /// Create a bundler from a command vector (e.g. `["npx", "webpack"]`).
    pub fn new(command: Vec<String>, project_root: PathBuf) -> Self {
        Self {
            command,
            project_root,
        }
    }
}

impl Bundler for WebpackBundler {
    fn bundle(&self, config: &BundlerConfig) -> Result<(), BundleError> {
        let (program, args) = match self.command.split_first() {
            Some(split) => split,
            None => return Err(BundleError::EmptyCommand),
        };

        let mut config_file = tempfile::Builder::new()
            .prefix(".distshape-webpack-")
            .suffix(".config.cjs")
            .tempfile_in(&self.project_root)
            .map_err(|source| BundleError::ConfigWrite {
                dir: self.project_root.clone(),
                source,
            })?;
        config_file
            .write_all(config.render().as_bytes())
            .map_err(|source| BundleError::ConfigWrite {
                dir: self.project_root.clone(),
                source,
            })?;

        let status = Command::new(program)
            .args(args)
            .arg("--config")
            .arg(config_file.path())
            .current_dir(&self.project_root)
            .status()
            .map_err(|source| BundleError::Spawn {
                program: program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(BundleError::Failed { status })
        }
    }

    fn describe(&self) -> String {
        format!("{} --config <generated config>", self.command.join(" "))
    }
}
