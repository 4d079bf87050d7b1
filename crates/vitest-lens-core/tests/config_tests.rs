use std::fs;

use tempfile::TempDir;
use vitest_lens_core::config::{DEFAULT_CONSOLE, DEFAULT_RUNNER_PACKAGE, PROJECT_CONFIG_FILE};
use vitest_lens_core::{Config, ConfigError, PatternPolicy};

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[runner]
package = "vitest-nightly"
max_root_hops = 8

[discovery]
suite_markers = ["describe", "suite"]

[launch]
pattern_policy = "loose"
pre_launch_task = "npm: build"

[launch.env]
NODE_OPTIONS = "--enable-source-maps"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.runner.package, "vitest-nightly");
    assert_eq!(config.runner.max_root_hops, 8);
    assert_eq!(config.runner.manifest, "package.json");
    assert_eq!(config.discovery.suite_markers, vec!["describe", "suite"]);
    assert_eq!(config.discovery.test_markers, vec!["it", "test"]);
    assert_eq!(config.launch.pattern_policy, PatternPolicy::Loose);
    assert_eq!(config.launch.pre_launch_task.as_deref(), Some("npm: build"));
    assert_eq!(config.launch.env["NODE_OPTIONS"], "--enable-source-maps");
    assert_eq!(config.launch.console, DEFAULT_CONSOLE);
}

#[test]
fn test_default_config_round_trips_through_toml() {
    let toml_str = Config::default_config_string();
    let parsed: Config = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed, Config::default());
}

#[test]
fn test_load_from_project_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(PROJECT_CONFIG_FILE),
        "[launch]\nconsole = \"internalConsole\"\n",
    )
    .unwrap();

    let config = Config::load_from(temp.path()).unwrap();
    assert_eq!(config.launch.console, "internalConsole");
    assert_eq!(config.runner.package, DEFAULT_RUNNER_PACKAGE);
}

#[test]
fn test_invalid_project_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(PROJECT_CONFIG_FILE), "[runner]\nmax_root_hops = 0\n").unwrap();
    assert!(matches!(
        Config::load_from(temp.path()),
        Err(ConfigError::Invalid(_))
    ));

    fs::write(temp.path().join(PROJECT_CONFIG_FILE), "[runner\n").unwrap();
    assert!(matches!(
        Config::load_from(temp.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_config_from_json_options() {
    let value = serde_json::json!({
        "runner": { "package": "vitest-fork" },
        "launch": { "just_my_code": false },
    });
    let config: Config = serde_json::from_value(value).unwrap();
    assert!(!config.launch.just_my_code);
    assert_eq!(config.runner.package, "vitest-fork");
    assert_eq!(config.runner.entry, "vitest.mjs");
}
