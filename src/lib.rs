//! Distshape - Build orchestrator for dual-emission TypeScript packages
//!
//! This library provides functionality to:
//! - Compile a source tree once per module kind into library trees
//! - Drive a bundler to produce module-graph and single-global bundles
//! - Rewrite legacy require paths and stamp version placeholders

pub mod build;
pub mod bundle;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod docs;
pub mod emit;
pub mod manifest;
pub mod minify;
pub mod patch;
pub mod rewrite;
