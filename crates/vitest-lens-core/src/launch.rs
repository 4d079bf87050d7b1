//! Launch configuration for running or debugging one test under the runner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{Config, DEFAULT_DEBUG_TYPE, DEFAULT_SKIP_FILES, SOURCE_MAP_EXCLUDES};
use crate::discovery::TestDeclaration;
use crate::error::Result;
use crate::pattern::build_name_pattern;
use crate::root::resolve_project_root;

/// Whether the runner starts under the debugger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Run,
    Debug,
}

impl RunMode {
    pub fn no_debug(&self) -> bool {
        matches!(self, Self::Run)
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Debug => write!(f, "debug"),
        }
    }
}

/// A `node` launch configuration as the editor's debug subsystem consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSpec {
    #[serde(rename = "type")]
    pub debug_type: String,
    pub request: String,
    pub name: String,
    pub runtime_executable: String,
    pub program: PathBuf,
    pub cwd: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub auto_attach_child_processes: bool,
    pub skip_files: Vec<String>,
    pub resolve_source_map_locations: Vec<String>,
    pub smart_step: bool,
    pub console: String,
    pub stop_on_entry: bool,
    pub no_debug: bool,
    pub just_my_code: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_launch_task: Option<String>,
}

/// Builds launch specs from declarations.
#[derive(Debug, Clone, Default)]
pub struct LaunchBuilder {
    config: Config,
}

impl LaunchBuilder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the launch for `declaration`.
    ///
    /// Fails with `ProjectRootNotFound` when no manifest is found above the
    /// declaration's file; nothing is produced in that case.
    #[tracing::instrument(skip_all, fields(test = %declaration.full_name(), mode = %mode))]
    pub fn build(&self, declaration: &TestDeclaration, mode: RunMode) -> Result<LaunchSpec> {
        let runner = &self.config.runner;
        let launch = &self.config.launch;

        let root = resolve_project_root(&declaration.source_file, runner)?;
        let pattern = build_name_pattern(declaration, launch.pattern_policy);
        let root_str = root.display().to_string();

        let program = root
            .join("node_modules")
            .join(&runner.package)
            .join(&runner.entry);

        let args = vec![
            "run".to_string(),
            "--root".to_string(),
            root_str.clone(),
            "--testNamePattern".to_string(),
            pattern,
            declaration.source_file.display().to_string(),
        ];

        let skip_files = DEFAULT_SKIP_FILES
            .iter()
            .map(|s| s.to_string())
            .chain(launch.extra_skip_files.iter().cloned())
            .collect();

        let resolve_source_map_locations = std::iter::once(format!("{}/**", root_str))
            .chain(SOURCE_MAP_EXCLUDES.iter().map(|s| s.to_string()))
            .collect();

        tracing::debug!(root = %root_str, "built launch spec");

        Ok(LaunchSpec {
            debug_type: DEFAULT_DEBUG_TYPE.to_string(),
            request: "launch".to_string(),
            name: launch.name.clone(),
            runtime_executable: runner.runtime_executable.clone(),
            program,
            cwd: root,
            args,
            env: launch.env.clone(),
            auto_attach_child_processes: launch.auto_attach_child_processes,
            skip_files,
            resolve_source_map_locations,
            smart_step: true,
            console: launch.console.clone(),
            stop_on_entry: false,
            no_debug: mode.no_debug(),
            just_my_code: launch.just_my_code,
            pre_launch_task: launch.pre_launch_task.clone(),
        })
    }
}

/// Build a launch spec with the default configuration.
pub fn build_launch_spec(declaration: &TestDeclaration, mode: RunMode) -> Result<LaunchSpec> {
    LaunchBuilder::default().build(declaration, mode)
}
