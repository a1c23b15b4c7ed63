//! Build pipeline orchestration.
//!
//! A pipeline run executes three branches concurrently: library emission
//! (linked-module output, then legacy-module output, sequentially), the
//! module-graph bundle, and the single-global bundle. Branches own
//! disjoint destination directories, so they never contend on writes.
//! Once every branch has joined, the placeholder patcher sweeps the
//! library root and then the distribution root; it is skipped when any
//! branch failed. Failures do not cancel running branches; the report
//! lists stage outcomes in branch order so the first failure surfaced is
//! deterministic.

use crate::build::context::BuildContext;
use crate::build::result::{BuildReport, StageReport};
use crate::build::target::{BuildMode, BundleTarget, EmitTarget};
use crate::bundle::{Bundler, BundlerConfig, WebpackBundler};
use crate::compiler::{SourceCompiler, TscCompiler};
use crate::emit::LibraryEmitter;
use crate::patch::patch_tree;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Error preparing a pipeline run.
///
/// Stage failures during a run are carried inside the [`BuildReport`];
/// this error covers the preconditions that abort before any emission.
#[derive(Debug)]
pub enum PipelineError {
    /// Configuration error
    Config(crate::config::ConfigError),
    /// Package manifest error
    Manifest(crate::manifest::ManifestError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Config(e) => write!(f, "Configuration error: {}", e),
            PipelineError::Manifest(e) => write!(f, "Manifest error: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<crate::config::ConfigError> for PipelineError {
    fn from(e: crate::config::ConfigError) -> Self {
        PipelineError::Config(e)
    }
}

impl From<crate::manifest::ManifestError> for PipelineError {
    fn from(e: crate::manifest::ManifestError) -> Self {
        PipelineError::Manifest(e)
    }
}

/// Build pipeline for one development or production run.
pub struct BuildPipeline {
    /// Build context
    context: BuildContext,
    /// Source compiler collaborator
    compiler: Box<dyn SourceCompiler>,
    /// Module bundler collaborator
    bundler: Box<dyn Bundler>,
}

impl BuildPipeline {
    /// Create a new pipeline with the configured collaborators.
    pub fn new(context: BuildContext) -> Self {
        let compiler = TscCompiler::new(
            context.config().tools.compiler.clone(),
            context.project_root().to_path_buf(),
            context.resolve_path(Path::new(&context.config().emit.tsconfig)),
        );
        let bundler = WebpackBundler::new(
            context.config().tools.bundler.clone(),
            context.project_root().to_path_buf(),
        );
        Self {
            context,
            compiler: Box::new(compiler),
            bundler: Box::new(bundler),
        }
    }

    /// Replace the source compiler collaborator.
    pub fn with_compiler(mut self, compiler: Box<dyn SourceCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Replace the module bundler collaborator.
    pub fn with_bundler(mut self, bundler: Box<dyn Bundler>) -> Self {
        self.bundler = bundler;
        self
    }

    /// Get the build context.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Describe the stages a run would execute, without executing them.
    pub fn plan(&self, mode: BuildMode) -> Vec<String> {
        let mut lines = Vec::new();
        for target in [EmitTarget::linked(mode), EmitTarget::legacy(mode)] {
            lines.push(format!(
                "{} -> {} ({})",
                target.id(),
                self.context.emit_dest(&target).display(),
                self.compiler.describe()
            ));
        }
        for target in [
            BundleTarget::module_graph(mode),
            BundleTarget::single_global(mode),
        ] {
            lines.push(format!(
                "{} -> {} ({})",
                target.id(),
                self.context.bundle_dest(&target).join(target.filename()).display(),
                self.bundler.describe()
            ));
        }
        lines.push(format!(
            "patch -> {}, {}",
            self.context.library_root().display(),
            self.context.dist_root().display()
        ));
        lines
    }

    /// Run the pipeline for the given mode.
    pub fn run(&self, mode: BuildMode) -> BuildReport {
        let start = Instant::now();
        let bundle_targets = [
            BundleTarget::module_graph(mode),
            BundleTarget::single_global(mode),
        ];

        if self.context.is_verbose() {
            println!("Pipeline: {} mode, 3 parallel branches", mode);
            for line in self.plan(mode) {
                println!("  - {}", line);
            }
        }

        // Branch 0 is library emission; bundle branches follow in target
        // order. Results are re-sorted by branch index after the join so
        // the report order is deterministic.
        let branches = Arc::new(Mutex::new(Vec::new()));

        std::thread::scope(|s| {
            {
                let branches = Arc::clone(&branches);
                s.spawn(move || {
                    let reports = self.run_library_branch(mode);
                    branches.lock().unwrap().push((0usize, reports));
                });
            }

            for (i, target) in bundle_targets.iter().enumerate() {
                let branches = Arc::clone(&branches);
                s.spawn(move || {
                    let report = self.run_bundle_stage(target);
                    branches.lock().unwrap().push((i + 1, vec![report]));
                });
            }
        });

        let mut branches = Arc::try_unwrap(branches)
            .map(|mutex| mutex.into_inner().unwrap())
            .unwrap_or_else(|arc| arc.lock().unwrap().clone());
        branches.sort_by_key(|(idx, _)| *idx);

        let mut report = BuildReport::new();
        for (_, stage_reports) in branches {
            for stage in stage_reports {
                report.add_stage(stage);
            }
        }

        // The patcher reads what the branches wrote, so it only runs
        // after a clean join.
        if report.is_success() {
            report.add_stage(self.run_patch_stage());
        }

        report.total_duration = start.elapsed();
        report
    }

    /// Run linked-module then legacy-module emission; stop on failure.
    fn run_library_branch(&self, mode: BuildMode) -> Vec<StageReport> {
        let emitter = LibraryEmitter::new(&self.context, self.compiler.as_ref());
        let mut reports = Vec::new();
        for target in [EmitTarget::linked(mode), EmitTarget::legacy(mode)] {
            let report = self.run_emit_stage(&emitter, &target);
            let failed = !report.is_success();
            reports.push(report);
            if failed {
                break;
            }
        }
        reports
    }

    fn run_emit_stage(&self, emitter: &LibraryEmitter<'_>, target: &EmitTarget) -> StageReport {
        let start = Instant::now();

        if self.context.is_verbose() {
            println!("Building: {} ...", target.id());
        }

        match emitter.run(target) {
            Ok(summary) => {
                let duration = start.elapsed();
                if self.context.is_verbose() {
                    println!("  Done in {:?}", duration);
                }
                StageReport::success(
                    target.id(),
                    summary.scripts + summary.declarations,
                    duration,
                )
            }
            Err(e) => {
                let duration = start.elapsed();
                if self.context.is_verbose() {
                    println!("  Failed: {}", e);
                }
                StageReport::failed(target.id(), e.to_string(), duration)
            }
        }
    }

    fn run_bundle_stage(&self, target: &BundleTarget) -> StageReport {
        let start = Instant::now();

        if self.context.is_verbose() {
            println!("Building: {} ...", target.id());
        }

        let config = BundlerConfig::for_target(&self.context, target);
        if let Err(e) = fs::create_dir_all(&config.output_dir) {
            return StageReport::failed(
                target.id(),
                format!("Failed to create output directory: {}", e),
                start.elapsed(),
            );
        }

        match self.bundler.bundle(&config) {
            Ok(()) => {
                let duration = start.elapsed();
                if self.context.is_verbose() {
                    println!("  Done in {:?}", duration);
                }
                StageReport::success(target.id(), 1, duration)
            }
            Err(e) => {
                let duration = start.elapsed();
                if self.context.is_verbose() {
                    println!("  Failed: {}", e);
                }
                StageReport::failed(target.id(), e.to_string(), duration)
            }
        }
    }

    /// Sweep the library root, then the distribution root, substituting
    /// the version placeholder in emitted code.
    fn run_patch_stage(&self) -> StageReport {
        let start = Instant::now();

        if self.context.is_verbose() {
            println!("Building: patch ...");
        }

        let placeholder = self.context.placeholder();
        let version = self.context.version();
        let mut patched = 0;
        for root in [self.context.library_root(), self.context.dist_root()] {
            match patch_tree(&root, placeholder, version) {
                Ok(summary) => patched += summary.patched,
                Err(e) => {
                    let duration = start.elapsed();
                    if self.context.is_verbose() {
                        println!("  Failed: {}", e);
                    }
                    return StageReport::failed("patch".to_string(), e.to_string(), duration);
                }
            }
        }

        let duration = start.elapsed();
        if self.context.is_verbose() {
            println!("  Done in {:?}", duration);
        }
        StageReport::success("patch".to_string(), patched, duration)
    }
}
