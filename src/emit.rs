//! Library emission stage.
//!
//! One run compiles the whole source tree for a single [`EmitTarget`].
//! Sources are mirrored into a staging directory with the version
//! placeholder already substituted, handed to the compiler collaborator,
//! and the outputs are then collected into the target's destination:
//! declaration files unchanged, code files through minification
//! (production) and, for the legacy target, extension renaming plus
//! require-path rewriting.
//!
//! The staging directory lives inside the project root, not the system
//! temp dir, so a compiler that resolves dependencies by walking parent
//! directories still finds the project's own dependency tree.

use crate::build::context::BuildContext;
use crate::build::target::EmitTarget;
use crate::compiler::{CompileRequest, CompilerError, SourceCompiler};
use crate::minify::minify_js;
use crate::rewrite::{FsProbe, RequireRewriter, RewriteError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the library emission stage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmitError {
    /// The staging directory could not be created
    #[error("failed to create staging directory under '{}': {source}", dir.display())]
    Staging {
        dir: PathBuf,
        source: std::io::Error,
    },

    /// No sources matched the include pattern
    #[error("no source files found under '{}'", dir.display())]
    NoSources { dir: PathBuf },

    /// A scan pattern failed to compile
    #[error("invalid scan pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// A file could not be read
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file could not be written
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The compiler collaborator failed
    #[error(transparent)]
    Compile(#[from] CompilerError),

    /// A require path could not be rewritten
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Counts of files written by one emission run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    /// Code files written to the destination
    pub scripts: usize,
    /// Declaration files (and declaration maps) written
    pub declarations: usize,
}

/// Compiles the source tree for one emission target.
pub struct LibraryEmitter<'a> {
    context: &'a BuildContext,
    compiler: &'a dyn SourceCompiler,
}

impl<'a> LibraryEmitter<'a> {
    pub fn new(context: &'a BuildContext, compiler: &'a dyn SourceCompiler) -> Self {
        Self { context, compiler }
    }

    /// Run the emission stage for the given target.
    pub fn run(&self, target: &EmitTarget) -> Result<EmitSummary, EmitError> {
        let staging = tempfile::Builder::new()
            .prefix(".distshape-emit-")
            .tempdir_in(self.context.project_root())
            .map_err(|source| EmitError::Staging {
                dir: self.context.project_root().to_path_buf(),
                source,
            })?;
        let staged_src = staging.path().join("src");
        let staged_out = staging.path().join("out");

        let staged = self.stage_sources(&staged_src)?;
        if self.context.is_verbose() {
            println!("  {}: staged {} source files", target.id(), staged);
        }

        let request = CompileRequest {
            source_dir: staged_src,
            out_dir: staged_out.clone(),
            module: target.format.compiler_module().to_string(),
            inline_source_maps: target.mode.is_dev(),
        };
        self.compiler.compile(&request)?;

        let summary = self.collect_outputs(&staged_out, target)?;
        if self.context.is_verbose() {
            println!(
                "  {}: wrote {} code files, {} declaration files",
                target.id(),
                summary.scripts,
                summary.declarations
            );
        }
        Ok(summary)
    }

    /// Mirror the source tree into the staging directory, substituting
    /// the version placeholder so the compiler never sees the token.
    fn stage_sources(&self, staged_src: &Path) -> Result<usize, EmitError> {
        let src_dir = self.context.src_dir();
        let suffix = format!("*.{}", self.context.config().emit.source_extension);
        let sources = files_under(&src_dir, &suffix)?;
        if sources.is_empty() {
            return Err(EmitError::NoSources { dir: src_dir });
        }

        let placeholder = self.context.placeholder();
        let version = self.context.version();
        let mut staged = 0;
        for path in sources {
            let rel = match path.strip_prefix(&src_dir) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };
            let mut content = fs::read_to_string(&path).map_err(|source| EmitError::Read {
                path: path.clone(),
                source,
            })?;
            if content.contains(placeholder) {
                content = content.replace(placeholder, version);
            }
            write_file(&staged_src.join(rel), content.as_bytes())?;
            staged += 1;
        }
        Ok(staged)
    }

    /// Route compiler outputs from the staging directory into the
    /// target's destination.
    fn collect_outputs(&self, staged_out: &Path, target: &EmitTarget) -> Result<EmitSummary, EmitError> {
        let dest = self.context.emit_dest(target);
        let rewriter = if target.format.is_legacy() {
            Some(RequireRewriter::new(
                self.context.src_dir(),
                dest.clone(),
                self.context.config().emit.source_extension.clone(),
                self.context.config().emit.legacy_extension.clone(),
                FsProbe,
            ))
        } else {
            None
        };

        let mut summary = EmitSummary::default();
        for path in files_under(staged_out, "*")? {
            let rel = match path.strip_prefix(staged_out) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.ends_with(".d.ts") || name.ends_with(".d.ts.map") {
                let out_path = dest.join(&rel);
                copy_file(&path, &out_path)?;
                summary.declarations += 1;
            } else if name.ends_with(".js") {
                let mut content = fs::read_to_string(&path).map_err(|source| EmitError::Read {
                    path: path.clone(),
                    source,
                })?;
                if !target.mode.is_dev() {
                    content = minify_js(&content);
                }
                let out_path = match &rewriter {
                    Some(rewriter) => {
                        let renamed =
                            rel.with_extension(&self.context.config().emit.legacy_extension);
                        let out_path = dest.join(renamed);
                        content = rewriter.rewrite_source(&out_path, &content)?;
                        out_path
                    }
                    None => dest.join(&rel),
                };
                write_file(&out_path, content.as_bytes())?;
                summary.scripts += 1;
            }
        }
        Ok(summary)
    }
}

/// All files under `root` matching `**/<suffix>`, sorted.
fn files_under(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, EmitError> {
    let pattern = format!("{}/**/{}", root.display(), suffix);
    let entries = glob::glob(&pattern).map_err(|source| EmitError::InvalidPattern {
        pattern: pattern.clone(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => eprintln!("Warning: error reading path: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), EmitError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| EmitError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| EmitError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), EmitError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|source| EmitError::Write {
            path: to.to_path_buf(),
            source,
        })?;
    }
    fs::copy(from, to).map_err(|source| EmitError::Write {
        path: to.to_path_buf(),
        source,
    })?;
    Ok(())
}
