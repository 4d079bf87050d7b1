//! Default values for vitest-lens configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Runner Defaults
// ============================================================================

/// Package directory of the runner under `node_modules`.
pub const DEFAULT_RUNNER_PACKAGE: &str = "vitest";

/// Entry script of the runner inside its package directory.
pub const DEFAULT_RUNNER_ENTRY: &str = "vitest.mjs";

/// Executable used to start the runner entry script.
pub const DEFAULT_RUNTIME_EXECUTABLE: &str = "node";

/// Manifest file marking the root of a project.
pub const DEFAULT_PROJECT_MARKER: &str = "package.json";

/// Maximum number of directories checked while looking for the project root.
pub const DEFAULT_MAX_ROOT_HOPS: usize = 20;

// ============================================================================
// Discovery Defaults
// ============================================================================

/// Call names that open a suite.
pub const DEFAULT_SUITE_MARKERS: &[&str] = &["describe"];

/// Call names that declare a single test.
pub const DEFAULT_TEST_MARKERS: &[&str] = &["it", "test"];

// ============================================================================
// Launch Defaults
// ============================================================================

/// Name shown for the debug session.
pub const DEFAULT_LAUNCH_NAME: &str = "Vitest";

/// Debug adapter type.
pub const DEFAULT_DEBUG_TYPE: &str = "node";

/// Where the debuggee's output goes.
pub const DEFAULT_CONSOLE: &str = "integratedTerminal";

/// Frames that are never stepped into.
pub const DEFAULT_SKIP_FILES: &[&str] = &["<node_internals>/**", "**/node_modules/**"];

/// Dependency directories excluded from source map resolution.
pub const SOURCE_MAP_EXCLUDES: &[&str] = &["!**/node_modules/**"];

// ============================================================================
// Config File Locations
// ============================================================================

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "vitest-lens.toml";

/// Directory name under the user's config dir.
pub const USER_CONFIG_DIR: &str = "vitest-lens";

/// Config file name inside the user config directory.
pub const USER_CONFIG_FILE: &str = "config.toml";
