//! Configuration module for the distshape build orchestrator
//!
//! Provides types, parsing, and discovery for `distshape.toml` project
//! configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
