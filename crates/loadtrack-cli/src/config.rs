//! Configuration for the Loadtrack CLI.
//!
//! Provides the [`LoadtrackConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `LOADTRACK_CONFIG` environment variable
//! 3. XDG default: `~/.config/loadtrack/config.toml`
//! 4. Built-in defaults

use confyg::{Confygery, env};
use loadtrack_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the Loadtrack CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadtrackConfig {
    /// Project name, shown in run logs.
    pub project_name: String,

    /// The simulated operation wrapped by the tracker.
    pub operation: OperationConfig,

    /// How the operation is triggered.
    pub run: RunConfig,
}

/// Simulated fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationConfig {
    /// Label used in log records.
    pub label: String,

    /// Time before the deferred result settles, in milliseconds.
    pub delay_ms: u64,

    /// Whether the fetch succeeds or fails.
    pub outcome: Outcome,

    /// Success value.
    pub value: String,

    /// Failure value.
    pub error: String,
}

/// Trigger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of triggers to issue.
    pub triggers: u32,

    /// How triggers relate to each other.
    pub mode: RunMode,
}

/// Settlement of the simulated fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Resolve with the configured value.
    #[default]
    Ok,
    /// Fail with the configured error.
    Error,
}

/// How repeated triggers are issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Each trigger waits for the previous one to settle.
    #[default]
    Sequential,
    /// All triggers are issued at once and awaited together.
    Concurrent,
    /// All triggers are issued at once through the exclusive path; only
    /// the first is accepted.
    Exclusive,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for LoadtrackConfig {
    fn default() -> Self {
        Self {
            project_name: "loadtrack".to_string(),
            operation: OperationConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            label: "fetch".to_string(),
            delay_ms: 250,
            outcome: Outcome::Ok,
            value: "ok".to_string(),
            error: "network-down".to_string(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            triggers: 1,
            mode: RunMode::Sequential,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl LoadtrackConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// The result is not validated, so `config init --force` and
    /// `config show` still work against a file holding bad values.
    ///
    /// Loading priority:
    /// 1. Explicit `config_path` (from `--config` flag)
    /// 2. `LOADTRACK_CONFIG` env var
    /// 3. XDG default: `~/.config/loadtrack/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("LOADTRACK");
        env_opts.add_section("operation");
        env_opts.add_section("run");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("LOADTRACK_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("loadtrack").join("config.toml"))
    }

    /// Reject settings the run handler cannot act on.
    pub fn validate(&self) -> Result<()> {
        if self.run.triggers == 0 {
            return Err(Error::config("run.triggers must be at least 1"));
        }
        if self.operation.label.trim().is_empty() {
            return Err(Error::config("operation.label must not be empty"));
        }
        Ok(())
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    // ------------------------------------------------------------------------
    // Default tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_loadtrack_config_default() {
        let config = LoadtrackConfig::default();
        assert_eq!(config.project_name, "loadtrack");
        assert_eq!(config.operation.label, "fetch");
        assert_eq!(config.operation.delay_ms, 250);
        assert_eq!(config.operation.outcome, Outcome::Ok);
        assert_eq!(config.operation.value, "ok");
        assert_eq!(config.operation.error, "network-down");
        assert_eq!(config.run.triggers, 1);
        assert_eq!(config.run.mode, RunMode::Sequential);
        assert!(config.validate().is_ok());
    }

    // ------------------------------------------------------------------------
    // Serialization tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_loadtrack_config_from_toml() {
        let toml_str = r#"
            project_name = "portfolio"

            [operation]
            label = "fetch-projects"
            delay_ms = 40
            outcome = "error"
            error = "timeout"

            [run]
            triggers = 3
            mode = "concurrent"
        "#;

        let config: LoadtrackConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project_name, "portfolio");
        assert_eq!(config.operation.label, "fetch-projects");
        assert_eq!(config.operation.delay_ms, 40);
        assert_eq!(config.operation.outcome, Outcome::Error);
        assert_eq!(config.operation.error, "timeout");
        // Unset keys fall back to defaults.
        assert_eq!(config.operation.value, "ok");
        assert_eq!(config.run.triggers, 3);
        assert_eq!(config.run.mode, RunMode::Concurrent);
    }

    #[test]
    fn test_loadtrack_config_rejects_unknown_mode() {
        let result: std::result::Result<LoadtrackConfig, _> =
            toml::from_str("[run]\nmode = \"parallel\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_loadtrack_config_to_toml() {
        let config = LoadtrackConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("project_name = \"loadtrack\""));
        assert!(toml_str.contains("[operation]"));
        assert!(toml_str.contains("outcome = \"ok\""));
        assert!(toml_str.contains("mode = \"sequential\""));

        let parsed: LoadtrackConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.operation.delay_ms, config.operation.delay_ms);
        assert_eq!(parsed.run.mode, config.run.mode);
    }

    // ------------------------------------------------------------------------
    // Loading tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_loadtrack_config_load_from_file() {
        let (_dir, path) = write_config(
            r#"
                project_name = "loaded-app"
                [operation]
                delay_ms = 10
                [run]
                triggers = 2
            "#,
        );

        let config = LoadtrackConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.project_name, "loaded-app");
        assert_eq!(config.operation.delay_ms, 10);
        assert_eq!(config.run.triggers, 2);
    }

    #[test]
    fn test_loadtrack_config_load_defaults() {
        let config = LoadtrackConfig::load(Some("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.project_name, "loadtrack");
        assert_eq!(config.run.triggers, 1);
    }

    #[test]
    fn test_loadtrack_config_load_keeps_invalid_values() {
        let (_dir, path) = write_config("[run]\ntriggers = 0\n");
        let config = LoadtrackConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.run.triggers, 0);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("run.triggers"));
    }

    #[test]
    fn test_validate_rejects_blank_label() {
        let mut config = LoadtrackConfig::default();
        config.operation.label = "  ".into();
        assert!(config.validate().is_err());
    }

    // ------------------------------------------------------------------------
    // resolve_config_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_loadtrack_config_resolve_config_path_explicit() {
        let path = LoadtrackConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_loadtrack_config_default_config_path() {
        if let Some(path) = LoadtrackConfig::default_config_path() {
            let shown = path.to_string_lossy();
            assert!(shown.contains("loadtrack"));
            assert!(shown.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_loadtrack_config_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LoadtrackConfig>();
    }
}
