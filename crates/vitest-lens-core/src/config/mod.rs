//! Configuration management for vitest-lens.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `vitest-lens.toml` file
//! 3. User config `~/.config/vitest-lens/config.toml`
//! 4. Built-in defaults (lowest priority)
//!
//! The language server can also receive a whole [`Config`] as JSON in its
//! `initializationOptions`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

use crate::pattern::PatternPolicy;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the runner lives and how the project root is found.
    pub runner: RunnerConfig,

    /// Which calls count as suites and tests.
    pub discovery: DiscoveryConfig,

    /// Shape of the generated launch configuration.
    pub launch: LaunchConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./vitest-lens.toml` (project local)
    /// 2. `~/.config/vitest-lens/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Like [`Config::load`], but looks for the project-local file in `dir`.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let project_config = dir.join(PROJECT_CONFIG_FILE);
        if project_config.exists() {
            return Self::from_file(&project_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config file");

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Runner overrides
        if let Some(package) = var("VITEST_LENS_RUNNER_PACKAGE") {
            self.runner.package = package;
        }
        if let Some(entry) = var("VITEST_LENS_RUNNER_ENTRY") {
            self.runner.entry = entry;
        }
        if let Some(node) = var("VITEST_LENS_RUNTIME_EXECUTABLE") {
            self.runner.runtime_executable = node;
        }
        if let Some(hops) = var("VITEST_LENS_MAX_ROOT_HOPS") {
            if let Ok(n) = hops.parse() {
                self.runner.max_root_hops = n;
            }
        }

        // Launch overrides
        if let Some(console) = var("VITEST_LENS_CONSOLE") {
            self.launch.console = console;
        }
        if let Some(policy) = var("VITEST_LENS_PATTERN_POLICY") {
            match policy.as_str() {
                "exact-path" => self.launch.pattern_policy = PatternPolicy::ExactPath,
                "loose" => self.launch.pattern_policy = PatternPolicy::Loose,
                other => tracing::warn!(policy = other, "ignoring unknown pattern policy"),
            }
        }
    }

    /// Reject configurations the core cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runner.max_root_hops == 0 {
            return Err(ConfigError::Invalid(
                "runner.max_root_hops must be at least 1".to_string(),
            ));
        }
        if self.runner.manifest.is_empty() {
            return Err(ConfigError::Invalid(
                "runner.manifest must not be empty".to_string(),
            ));
        }
        if self.discovery.suite_markers.is_empty() && self.discovery.test_markers.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one suite or test marker is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        Config::default().to_toml_string()
    }

    /// Render this configuration as TOML.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Runner location and project root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Package directory under `node_modules`.
    pub package: String,

    /// Entry script inside the package directory.
    pub entry: String,

    /// Executable that runs the entry script.
    pub runtime_executable: String,

    /// File whose presence marks the project root.
    pub manifest: String,

    /// Maximum number of directories checked for the manifest.
    pub max_root_hops: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_RUNNER_PACKAGE.to_string(),
            entry: DEFAULT_RUNNER_ENTRY.to_string(),
            runtime_executable: DEFAULT_RUNTIME_EXECUTABLE.to_string(),
            manifest: DEFAULT_PROJECT_MARKER.to_string(),
            max_root_hops: DEFAULT_MAX_ROOT_HOPS,
        }
    }
}

/// Test discovery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Bare identifiers that open a suite.
    pub suite_markers: Vec<String>,

    /// Bare identifiers that declare a test.
    pub test_markers: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            suite_markers: DEFAULT_SUITE_MARKERS.iter().map(|s| s.to_string()).collect(),
            test_markers: DEFAULT_TEST_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Launch configuration shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Session name shown by the editor.
    pub name: String,

    /// Console the debuggee writes to.
    pub console: String,

    /// How the name pattern is built.
    pub pattern_policy: PatternPolicy,

    /// Restrict stepping to project code.
    pub just_my_code: bool,

    /// Follow processes spawned by the runner.
    pub auto_attach_child_processes: bool,

    /// Task the editor runs before launching.
    pub pre_launch_task: Option<String>,

    /// Extra environment for the runner process.
    pub env: BTreeMap<String, String>,

    /// Extra frames to skip, appended to the built-in list.
    pub extra_skip_files: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_LAUNCH_NAME.to_string(),
            console: DEFAULT_CONSOLE.to_string(),
            pattern_policy: PatternPolicy::default(),
            just_my_code: true,
            auto_attach_child_processes: true,
            pre_launch_task: None,
            env: BTreeMap::new(),
            extra_skip_files: Vec::new(),
        }
    }
}
