//! Build context containing configuration and state for a pipeline run.

use crate::build::target::{BundleTarget, EmitTarget};
use crate::config::DistConfig;
use crate::manifest::PackageManifest;
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a pipeline run.
///
/// The context provides access to all information needed to execute a
/// build: the loaded configuration, project root, resolved package
/// identity, and output directories. Created once per invocation and
/// consumed read-only by every stage.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: DistConfig,
    /// Project root directory (where package.json is located)
    project_root: PathBuf,
    /// Unscoped package name used for output naming
    library_name: String,
    /// Semantic version resolved from the package manifest
    version: String,
    /// Runtime dependency names, for bundle externals
    dependency_names: Vec<String>,
    /// Whether to run in verbose mode
    verbose: bool,
}

impl BuildContext {
    /// Create a new build context.
    ///
    /// # Arguments
    /// - `config` - The loaded configuration
    /// - `project_root` - The project root directory
    /// - `manifest` - The package manifest read from the project root
    pub fn new(config: DistConfig, project_root: PathBuf, manifest: &PackageManifest) -> Self {
        let library_name = config
            .bundle
            .library_name
            .clone()
            .unwrap_or_else(|| manifest.unscoped_name().to_string());
        let version = manifest.version.clone();
        let dependency_names = manifest.dependency_names();
        Self {
            config,
            project_root,
            library_name,
            version,
            dependency_names,
            verbose: false,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &DistConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the source directory (resolved to absolute path).
    pub fn src_dir(&self) -> PathBuf {
        self.resolve_path(Path::new(&self.config.project.source_root))
    }

    /// Get the library output root (resolved to absolute path).
    pub fn library_root(&self) -> PathBuf {
        self.resolve_path(Path::new(&self.config.project.library_root))
    }

    /// Get the distribution output root (resolved to absolute path).
    pub fn dist_root(&self) -> PathBuf {
        self.resolve_path(Path::new(&self.config.project.dist_root))
    }

    /// Get the binary output directory (resolved to absolute path).
    pub fn bin_root(&self) -> PathBuf {
        self.resolve_path(Path::new(&self.config.project.bin_root))
    }

    /// Get the bundle entry file (resolved to absolute path).
    pub fn entry_file(&self) -> PathBuf {
        self.resolve_path(Path::new(&self.config.project.entry))
    }

    /// Destination directory for a library emission target.
    pub fn emit_dest(&self, target: &EmitTarget) -> PathBuf {
        target.dest_dir(&self.library_root(), &self.config.emit.linked_subdir)
    }

    /// Destination directory for a bundle target.
    pub fn bundle_dest(&self, target: &BundleTarget) -> PathBuf {
        target.dest_dir(
            &self.dist_root(),
            &self.bin_root(),
            &self.config.emit.linked_subdir,
        )
    }

    /// Unscoped package name used for output naming.
    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    /// Resolved semantic version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Placeholder token substituted with the version string.
    pub fn placeholder(&self) -> &str {
        &self.config.emit.placeholder
    }

    /// Runtime dependency names declared in the package manifest.
    pub fn dependency_names(&self) -> &[String] {
        &self.dependency_names
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Resolve a path relative to the project root.
    ///
    /// If the path is absolute, returns it unchanged.
    /// If relative, joins it with the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::target::{BuildMode, BundleFormat};
    use crate::config::default_config;
    use std::collections::BTreeMap;

    fn test_manifest() -> PackageManifest {
        let mut dependencies = BTreeMap::new();
        dependencies.insert("reflection".to_string(), "^1.0.0".to_string());
        PackageManifest {
            name: "@scoped/widget".to_string(),
            version: "2.3.1".to_string(),
            dependencies,
        }
    }

    #[test]
    fn test_build_context_new() {
        let config = default_config();
        let root = PathBuf::from("/project");
        let ctx = BuildContext::new(config, root.clone(), &test_manifest());

        assert_eq!(ctx.project_root(), &root);
        assert_eq!(ctx.library_name(), "widget");
        assert_eq!(ctx.version(), "2.3.1");
        assert!(!ctx.is_verbose());
    }

    #[test]
    fn test_build_context_library_name_override() {
        let mut config = default_config();
        config.bundle.library_name = Some("custom".to_string());
        let ctx = BuildContext::new(config, PathBuf::from("/project"), &test_manifest());

        assert_eq!(ctx.library_name(), "custom");
    }

    #[test]
    fn test_build_context_with_verbose() {
        let config = default_config();
        let ctx = BuildContext::new(config, PathBuf::from("/project"), &test_manifest())
            .with_verbose(true);

        assert!(ctx.is_verbose());
    }

    #[test]
    fn test_build_context_resolve_path_absolute() {
        let config = default_config();
        let ctx = BuildContext::new(config, PathBuf::from("/project"), &test_manifest());

        let absolute = Path::new("/other/path");
        assert_eq!(ctx.resolve_path(absolute), PathBuf::from("/other/path"));
    }

    #[test]
    fn test_build_context_resolve_path_relative() {
        let config = default_config();
        let ctx = BuildContext::new(config, PathBuf::from("/project"), &test_manifest());

        let relative = Path::new("src/index.ts");
        assert_eq!(ctx.resolve_path(relative), PathBuf::from("/project/src/index.ts"));
    }

    #[test]
    fn test_build_context_output_roots() {
        let config = default_config();
        let ctx = BuildContext::new(config, PathBuf::from("/project"), &test_manifest());

        assert_eq!(ctx.src_dir(), PathBuf::from("/project/src"));
        assert_eq!(ctx.library_root(), PathBuf::from("/project/lib"));
        assert_eq!(ctx.dist_root(), PathBuf::from("/project/dist"));
        assert_eq!(ctx.bin_root(), PathBuf::from("/project/bin"));
        assert_eq!(ctx.entry_file(), PathBuf::from("/project/src/index.ts"));
    }

    #[test]
    fn test_build_context_emit_dest() {
        let config = default_config();
        let ctx = BuildContext::new(config, PathBuf::from("/project"), &test_manifest());

        let linked = EmitTarget::linked(BuildMode::Development);
        assert_eq!(ctx.emit_dest(&linked), PathBuf::from("/project/lib/esm"));

        let legacy = EmitTarget::legacy(BuildMode::Development);
        assert_eq!(ctx.emit_dest(&legacy), PathBuf::from("/project/lib"));
    }

    #[test]
    fn test_build_context_bundle_dest() {
        let config = default_config();
        let ctx = BuildContext::new(config, PathBuf::from("/project"), &test_manifest());

        let umd = BundleTarget::single_global(BuildMode::Production);
        assert_eq!(ctx.bundle_dest(&umd), PathBuf::from("/project/dist"));

        let esm = BundleTarget::module_graph(BuildMode::Production);
        assert_eq!(ctx.bundle_dest(&esm), PathBuf::from("/project/dist/esm"));

        let lib = BundleTarget::library(BundleFormat::SingleGlobal, BuildMode::Production, "cli");
        assert_eq!(ctx.bundle_dest(&lib), PathBuf::from("/project/bin"));
    }

    #[test]
    fn test_build_context_dependency_names() {
        let config = default_config();
        let ctx = BuildContext::new(config, PathBuf::from("/project"), &test_manifest());

        assert_eq!(ctx.dependency_names(), &["reflection".to_string()]);
    }

    #[test]
    fn test_build_context_placeholder() {
        let config = default_config();
        let ctx = BuildContext::new(config, PathBuf::from("/project"), &test_manifest());

        assert_eq!(ctx.placeholder(), "##VERSION##");
    }
}
