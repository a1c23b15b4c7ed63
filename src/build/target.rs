//! Build target definitions.
//!
//! A target pairs an output shape (library emission or bundle) with the
//! development/production mode threaded through the pipeline. Targets are
//! constructed fresh per run and carry everything needed to derive
//! destination directories and output filenames.

use std::path::{Path, PathBuf};

/// Development or production mode for a pipeline run.
///
/// Development embeds inline source maps and skips minification;
/// production minifies and emits no source maps. Declaration emission is
/// identical in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Whether this is a development run.
    pub fn is_dev(&self) -> bool {
        matches!(self, BuildMode::Development)
    }

    /// Mode string handed to the bundler collaborator.
    pub fn bundler_mode(&self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildMode::Development => write!(f, "development"),
            BuildMode::Production => write!(f, "production"),
        }
    }
}

/// Module format for library emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleFormat {
    /// Native ES module graph output, emitted into the linked sub-path
    /// of the library root.
    Linked,
    /// CommonJS require-style output, emitted into the library root
    /// with the legacy extension and rewritten require paths.
    Legacy,
}

impl ModuleFormat {
    /// Compiler `module` setting for this format.
    pub fn compiler_module(&self) -> &'static str {
        match self {
            ModuleFormat::Linked => "es2022",
            ModuleFormat::Legacy => "commonjs",
        }
    }

    /// Whether this is the legacy (require-style) format.
    pub fn is_legacy(&self) -> bool {
        matches!(self, ModuleFormat::Legacy)
    }
}

impl std::fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleFormat::Linked => write!(f, "esm"),
            ModuleFormat::Legacy => write!(f, "cjs"),
        }
    }
}

/// One invocation of the library emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitTarget {
    /// Module format to emit
    pub format: ModuleFormat,
    /// Development or production mode
    pub mode: BuildMode,
}

impl EmitTarget {
    /// Linked-module (ESM) emission target.
    pub fn linked(mode: BuildMode) -> Self {
        Self { format: ModuleFormat::Linked, mode }
    }

    /// Legacy-module (CommonJS) emission target.
    pub fn legacy(mode: BuildMode) -> Self {
        Self { format: ModuleFormat::Legacy, mode }
    }

    /// Stage identifier (e.g. "emit:cjs").
    pub fn id(&self) -> String {
        format!("emit:{}", self.format)
    }

    /// Destination directory relative to the project root.
    ///
    /// Legacy output lands in the library root itself; linked output in
    /// its dedicated sub-path so the two emissions never collide.
    pub fn dest_dir(&self, library_root: &Path, linked_subdir: &str) -> PathBuf {
        match self.format {
            ModuleFormat::Linked => library_root.join(linked_subdir),
            ModuleFormat::Legacy => library_root.to_path_buf(),
        }
    }
}

/// Bundle output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleFormat {
    /// Native module-graph (ESM) artifact.
    ModuleGraph,
    /// Single-global UMD artifact.
    SingleGlobal,
}

impl BundleFormat {
    /// Whether the output format is a native module graph.
    pub fn is_module_graph(&self) -> bool {
        matches!(self, BundleFormat::ModuleGraph)
    }
}

impl std::fmt::Display for BundleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleFormat::ModuleGraph => write!(f, "esm"),
            BundleFormat::SingleGlobal => write!(f, "umd"),
        }
    }
}

/// Where a bundle lands and how dependencies are treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleLayout {
    /// Published under the distribution root with the pattern-derived
    /// filename; dependencies are inlined.
    Distributable,
    /// Written to the binary directory under an explicit name;
    /// dependencies stay external and the output targets the host
    /// runtime's module system.
    Library {
        /// Output filename stem (without extension)
        name_override: String,
    },
}

/// One invocation of the bundle emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleTarget {
    /// Output format for the artifact
    pub format: BundleFormat,
    /// Development or production mode
    pub mode: BuildMode,
    /// Distributable or library layout
    pub layout: BundleLayout,
}

impl BundleTarget {
    /// Distributable module-graph (ESM) bundle.
    pub fn module_graph(mode: BuildMode) -> Self {
        Self { format: BundleFormat::ModuleGraph, mode, layout: BundleLayout::Distributable }
    }

    /// Distributable single-global (UMD) bundle.
    pub fn single_global(mode: BuildMode) -> Self {
        Self { format: BundleFormat::SingleGlobal, mode, layout: BundleLayout::Distributable }
    }

    /// Library-layout bundle written to the binary directory.
    pub fn library(format: BundleFormat, mode: BuildMode, name: impl Into<String>) -> Self {
        Self { format, mode, layout: BundleLayout::Library { name_override: name.into() } }
    }

    /// Whether this target uses the library layout.
    pub fn is_library(&self) -> bool {
        matches!(self.layout, BundleLayout::Library { .. })
    }

    /// Stage identifier (e.g. "bundle:umd").
    pub fn id(&self) -> String {
        format!("bundle:{}", self.format)
    }

    /// Output filename for the artifact.
    ///
    /// Library layouts use their name override verbatim; distributable
    /// layouts combine the minified and module-graph flags into a fixed
    /// pattern (`bundle.js`, `bundle.min.js`, `bundle.esm.js`,
    /// `bundle.min.esm.js`).
    pub fn filename(&self) -> String {
        match &self.layout {
            BundleLayout::Library { name_override } => format!("{}.js", name_override),
            BundleLayout::Distributable => {
                let mut name = String::from("bundle");
                if !self.mode.is_dev() {
                    name.push_str(".min");
                }
                if self.format.is_module_graph() {
                    name.push_str(".esm");
                }
                name.push_str(".js");
                name
            }
        }
    }

    /// Destination directory relative to the project root.
    pub fn dest_dir(&self, dist_root: &Path, bin_root: &Path, esm_subdir: &str) -> PathBuf {
        match &self.layout {
            BundleLayout::Library { .. } => bin_root.to_path_buf(),
            BundleLayout::Distributable => {
                if self.format.is_module_graph() {
                    dist_root.join(esm_subdir)
                } else {
                    dist_root.to_path_buf()
                }
            }
        }
    }
}
