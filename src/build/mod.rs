//! Build pipeline module for distshape
//!
//! Provides the orchestration core that turns a TypeScript package into
//! its published emissions: per-module-kind library trees, bundled
//! distributables, and version-stamped output.
//!
//! # Overview
//!
//! A build runs three branches in parallel:
//! - **Library emission**: compile sources twice, once per module kind
//! - **ESM bundle**: a module-graph bundle of the entry file
//! - **UMD bundle**: a single-global bundle of the entry file
//!
//! After all branches finish, version placeholders are patched across
//! the output trees.
//!
//! # Example
//!
//! ```ignore
//! use distshape::build::{BuildContext, BuildMode, BuildPipeline};
//! use distshape::config::load_config;
//! use distshape::manifest::PackageManifest;
//!
//! let config = load_config(None)?;
//! let manifest = PackageManifest::load(&project_root.join("package.json"))?;
//! let context = BuildContext::new(config, project_root, &manifest);
//! let pipeline = BuildPipeline::new(context);
//!
//! let report = pipeline.run(BuildMode::Production);
//! println!("{}", report.summary());
//! ```

pub mod context;
pub mod pipeline;
pub mod result;
pub mod target;

pub use context::*;
pub use pipeline::*;
pub use result::*;
pub use target::*;
