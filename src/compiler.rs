//! Source compiler collaborator.
//!
//! The pipeline drives the TypeScript compiler as an opaque subprocess:
//! for each emission target it renders a configuration file next to the
//! staged sources, invokes the configured command, and leaves it to the
//! emitter to collect whatever landed in the output directory. The
//! [`SourceCompiler`] trait is the seam tests use to substitute an
//! in-process fake for the real `tsc` invocation.

use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// One compiler invocation over a staged source tree.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Directory holding the staged (placeholder-substituted) sources
    pub source_dir: PathBuf,
    /// Directory the compiler writes declarations and code into
    pub out_dir: PathBuf,
    /// Compiler module setting, e.g. "commonjs" or "es2022"
    pub module: String,
    /// Embed inline source maps (development mode)
    pub inline_source_maps: bool,
}

/// Errors from the compiler collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompilerError {
    /// The configured command has no program to run
    #[error("compiler command is empty")]
    EmptyCommand,

    /// The generated configuration could not be serialized
    #[error("failed to render compiler config: {0}")]
    Render(#[from] serde_json::Error),

    /// The generated configuration could not be written
    #[error("failed to write compiler config '{}': {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The compiler process could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The compiler ran and reported failure
    #[error("compiler exited with status {status}")]
    Failed { status: std::process::ExitStatus },
}

/// Compiles a staged source tree for one emission target.
pub trait SourceCompiler: Send + Sync {
    /// Compile the staged sources described by the request.
    fn compile(&self, request: &CompileRequest) -> Result<(), CompilerError>;

    /// Human-readable invocation description for plan output.
    fn describe(&self) -> String;
}

/// `tsc` driven through a generated configuration file.
///
/// The generated configuration extends the project's own `tsconfig.json`
/// when one exists, then pins the settings an emission target depends
/// on: module format, declaration emission with maps, code emission kept
/// on, and the source-map mode for the active build mode.
pub struct TscCompiler {
    command: Vec<String>,
    project_root: PathBuf,
    project_tsconfig: PathBuf,
}

impl TscCompiler {
    /// Create a compiler from a command vector (e.g. `["npx", "tsc"]`).
    ///
    /// `project_tsconfig` is the absolute path of the project's compiler
    /// configuration; it is extended rather than required, so a project
    /// without one still compiles with the pinned settings alone.
    pub fn new(command: Vec<String>, project_root: PathBuf, project_tsconfig: PathBuf) -> Self {
        Self {
            command,
            project_root,
            project_tsconfig,
        }
    }

    /// Render the generated configuration for a request.
    fn render_config(&self, request: &CompileRequest) -> serde_json::Value {
        let mut config = json!({
            "compilerOptions": {
                "module": request.module,
                "declaration": true,
                "declarationMap": true,
                "emitDeclarationOnly": false,
                "isolatedModules": false,
                "rootDir": request.source_dir.display().to_string(),
                "outDir": request.out_dir.display().to_string(),
                "sourceMap": false,
                "inlineSourceMap": request.inline_source_maps,
            },
            "include": [format!("{}/**/*.ts", request.source_dir.display())],
        });
        if self.project_tsconfig.is_file() {
            config["extends"] = json!(self.project_tsconfig.display().to_string());
        }
        config
    }
}

impl SourceCompiler for TscCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<(), CompilerError> {
        let (program, args) = match self.command.split_first() {
            Some(split) => split,
            None => return Err(CompilerError::EmptyCommand),
        };

        let config_path = request.source_dir.join("tsconfig.generated.json");
        let rendered = serde_json::to_string_pretty(&self.render_config(request))?;
        fs::write(&config_path, rendered).map_err(|source| CompilerError::ConfigWrite {
            path: config_path.clone(),
            source,
        })?;

        let status = Command::new(program)
            .args(args)
            .arg("-p")
            .arg(&config_path)
            .current_dir(&self.project_root)
            .status()
            .map_err(|source| CompilerError::Spawn {
                program: program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CompilerError::Failed { status })
        }
    }

    fn describe(&self) -> String {
        format!("{} -p <generated tsconfig>", self.command.join(" "))
    }
}
