//! Require-path rewriting for legacy-module output.
//!
//! The legacy emission renames every compiled file to the `.cjs`
//! extension, which breaks the extensionless relative targets the
//! compiler leaves inside `require()` calls. This pass rewrites each
//! relative target to an explicit reference: `./c` becomes `./c.cjs`
//! when the matching source file exists, or `./c/index.cjs` when the
//! target is a directory.
//!
//! Whether a target names a file or a directory is decided against the
//! original source tree, not the destination tree, because the pass runs
//! while the destination is still being populated. The file-existence
//! check is injected as a [`SourceProbe`] so tests can substitute a
//! predicate for the real file system.

use regex::Regex;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Capture pattern for require-style calls with a relative target:
/// the opening token, the path, and the closing punctuation.
const REQUIRE_PATTERN: &str = r#"(require\(["'])(\..*?)(["']\)[;,])"#;

/// Errors that can occur while rewriting require paths.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RewriteError {
    /// The compiled file does not live under the destination root, so no
    /// corresponding source location can be reconstructed.
    #[error(
        "compiled file '{}' is outside the destination root '{}'",
        path.display(),
        dest_root.display()
    )]
    OutsideDestRoot {
        /// Path of the compiled file
        path: PathBuf,
        /// Destination root the rewriter was built with
        dest_root: PathBuf,
    },
}

/// File-existence probe consulted for each rewritten target.
pub trait SourceProbe {
    /// Whether a source file exists at the given path.
    fn is_file(&self, path: &Path) -> bool;
}

/// Probe backed by the real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl SourceProbe for FsProbe {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl<F> SourceProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn is_file(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Rewrites relative require targets in compiled legacy-module files.
pub struct RequireRewriter<P> {
    src_root: PathBuf,
    dest_root: PathBuf,
    source_extension: String,
    legacy_extension: String,
    probe: P,
    pattern: Regex,
}

impl<P: SourceProbe> RequireRewriter<P> {
    /// Create a rewriter mapping files under `dest_root` back to sources
    /// under `src_root`.
    pub fn new(
        src_root: PathBuf,
        dest_root: PathBuf,
        source_extension: impl Into<String>,
        legacy_extension: impl Into<String>,
        probe: P,
    ) -> Self {
        Self {
            src_root,
            dest_root,
            source_extension: source_extension.into(),
            legacy_extension: legacy_extension.into(),
            probe,
            pattern: Regex::new(REQUIRE_PATTERN).expect("require call pattern compiles"),
        }
    }

    /// Rewrite every relative require target in a compiled file's text.
    ///
    /// `compiled_path` is the file's location under the destination root;
    /// the importing source directory is reconstructed by swapping the
    /// destination root for the source root, preserving the sub-path. A
    /// compiled file outside the destination root is an error rather than
    /// a silent mis-resolution.
    pub fn rewrite_source(
        &self,
        compiled_path: &Path,
        source: &str,
    ) -> Result<String, RewriteError> {
        let relative = compiled_path.strip_prefix(&self.dest_root).map_err(|_| {
            RewriteError::OutsideDestRoot {
                path: compiled_path.to_path_buf(),
                dest_root: self.dest_root.clone(),
            }
        })?;
        let source_dir = match relative.parent() {
            Some(parent) => self.src_root.join(parent),
            None => self.src_root.clone(),
        };
        let rewritten = self.pattern.replace_all(source, |caps: &regex::Captures<'_>| {
            format!(
                "{}{}{}",
                &caps[1],
                self.rewrite_target(&source_dir, &caps[2]),
                &caps[3]
            )
        });
        Ok(rewritten.into_owned())
    }

    /// Rewrite a single captured target relative to the importing file's
    /// source directory.
    ///
    /// The target resolves against `source_dir` with `.`/`..` components
    /// normalized, so nested targets are probed at the import's actual
    /// location. A target whose source file exists gets the legacy
    /// extension appended; anything else is treated as a directory import
    /// and pointed at its index file.
    pub fn rewrite_target(&self, source_dir: &Path, target: &str) -> String {
        let resolved = normalize_path(&source_dir.join(target));
        let mut candidate = resolved.into_os_string();
        candidate.push(".");
        candidate.push(&self.source_extension);
        if self.probe.is_file(Path::new(&candidate)) {
            format!("{}.{}", target, self.legacy_extension)
        } else {
            format!("{}/index.{}", target, self.legacy_extension)
        }
    }
}

/// Lexically normalize `.` and `..` components without touching the
/// file system.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
