//! Test discovery and run/debug launch synthesis for Vitest.
//!
//! - [`discovery`] finds `describe` / `it` / `test` declarations in a syntax tree
//! - [`pattern`] turns a declaration into a `--testNamePattern` filter
//! - [`root`] locates the enclosing project
//! - [`launch`] assembles the debugger launch configuration
//! - [`actions`] maps declarations to the Run / Debug inline actions

pub mod actions;
pub mod config;
pub mod discovery;
pub mod error;
pub mod launch;
pub mod pattern;
pub mod root;

pub use actions::{annotations, Annotation, TestAction, DEBUG_COMMAND, RUN_COMMAND};
pub use config::{Config, ConfigError, DiscoveryConfig, LaunchConfig, RunnerConfig};
pub use discovery::{
    discover, CancelWhen, CancellationToken, Discovery, NeverCancelled, SourceFile,
    SourceLanguage, Span, TestDeclaration, TestKind, TestWalker,
};
pub use error::{LensError, Result};
pub use launch::{build_launch_spec, LaunchBuilder, LaunchSpec, RunMode};
pub use pattern::{build_name_pattern, pattern_matches, PatternPolicy};
pub use root::{resolve_project_root, resolve_root};
