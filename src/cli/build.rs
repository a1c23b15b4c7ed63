//! Build command implementations (dev, prod)

use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::build::{BuildContext, BuildMode, BuildPipeline, PipelineError};
use crate::config::loader::CliOverrides;

/// Load config, read the package manifest, and assemble a build context.
///
/// The project root is taken from `--project` when given, else from the
/// directory of the config file in use, else from the current directory.
pub(crate) fn load_project(
    config_path: Option<&Path>,
    project_dir: Option<&Path>,
    overrides: &CliOverrides,
    verbose: bool,
) -> Result<BuildContext, PipelineError> {
    use crate::config::loader::{self, find_config, load_config, merge_cli_overrides};
    use crate::manifest::PackageManifest;

    // An explicit --config path must exist; otherwise walk up from cwd
    let config_file = match config_path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    let (mut config, config_root) = match &config_file {
        Some(path) => {
            if verbose {
                println!("Using config: {}", path.display());
            }
            let cfg = load_config(Some(path))?;
            (cfg, loader::project_root(path).map(|p| p.to_path_buf()))
        }
        None => {
            if verbose {
                println!("No distshape.toml found, using defaults");
            }
            (loader::default_config(), None)
        }
    };

    // Apply CLI overrides to config
    merge_cli_overrides(&mut config, overrides);

    let project_root = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => match config_root {
            Some(root) => root,
            None => std::env::current_dir().unwrap_or_default(),
        },
    };

    // Resolve manifest location before the context exists
    let manifest_path = if config.project.manifest.is_absolute() {
        config.project.manifest.clone()
    } else {
        project_root.join(&config.project.manifest)
    };
    let manifest = PackageManifest::load(&manifest_path)?;

    Ok(BuildContext::new(config, project_root, &manifest).with_verbose(verbose))
}

/// Run a build in the given mode
pub fn run_build(
    mode: BuildMode,
    config_path: Option<&Path>,
    project_dir: Option<&Path>,
    verbose: bool,
    dry_run: bool,
    entry: Option<&Path>,
    out: Option<&Path>,
) -> ExitCode {
    let overrides = CliOverrides {
        entry: entry.map(|p| p.to_path_buf()),
        out: out.map(|p| p.to_path_buf()),
    };

    let context = match load_project(config_path, project_dir, &overrides, verbose) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // Check source directory exists before spawning any tools
    let src_dir = context.src_dir();
    if !src_dir.exists() {
        eprintln!("Error: Source directory not found: {}", src_dir.display());
        eprintln!("Create the directory or point project.source_root at a different path");
        return ExitCode::from(EXIT_ERROR);
    }

    let pipeline = BuildPipeline::new(context);

    // Dry run mode
    if dry_run {
        println!("Dry run - would build:");
        for line in pipeline.plan(mode) {
            println!("  {}", line);
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    let report = pipeline.run(mode);
    if report.is_success() {
        println!("{}", report.summary());
        ExitCode::from(EXIT_SUCCESS)
    } else {
        eprintln!("{}", report.summary());
        ExitCode::from(EXIT_ERROR)
    }
}
