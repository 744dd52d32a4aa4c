//! CLI argument parsing and command definitions.
//!
//! Provides the command-line structure for the `loadtrack` binary:
//! configuration, verbosity, and the `run`, `version` and `config` commands.

use clap::{Args, Parser, Subcommand};

use crate::config::{LoadtrackConfig, Outcome, RunMode};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "LOADTRACK_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<BaseCommand>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum BaseCommand {
    /// Trigger the simulated fetch and watch its in-flight flag.
    Run(RunArgs),

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Overrides for `run`; anything left unset comes from the config.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Label used in log records.
    #[arg(short, long)]
    pub label: Option<String>,

    /// Delay before the fetch settles, in milliseconds.
    #[arg(short, long)]
    pub delay_ms: Option<u64>,

    /// Make the fetch fail with this error.
    #[arg(long, value_name = "ERROR")]
    pub fail: Option<String>,

    /// Value the fetch resolves with.
    #[arg(long)]
    pub value: Option<String>,

    /// Number of triggers to issue.
    #[arg(short = 'n', long)]
    pub triggers: Option<u32>,

    /// How repeated triggers are issued.
    #[arg(short, long, value_enum)]
    pub mode: Option<RunMode>,

    /// Print the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Apply these overrides on top of a loaded config.
    pub fn apply(&self, config: &mut LoadtrackConfig) {
        if let Some(label) = &self.label {
            config.operation.label = label.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.operation.delay_ms = delay_ms;
        }
        if let Some(value) = &self.value {
            config.operation.value = value.clone();
            config.operation.outcome = Outcome::Ok;
        }
        // --fail wins over --value.
        if let Some(error) = &self.fail {
            config.operation.error = error.clone();
            config.operation.outcome = Outcome::Error;
        }
        if let Some(triggers) = self.triggers {
            config.run.triggers = triggers;
        }
        if let Some(mode) = self.mode {
            config.run.mode = mode;
        }
    }
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Print the effective config after file and environment layering.
    Show,

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["test", "run"];
        full.extend_from_slice(argv);
        match CliArgs::parse_from(full).command {
            Some(BaseCommand::Run(args)) => args,
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::parse_from(["test"]);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_verbose() {
        let args = CliArgs::parse_from(["test", "--verbose"]);
        assert!(args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_args_config() {
        let args = CliArgs::parse_from(["test", "--config", "/path/to/config.toml"]);
        assert_eq!(args.config, Some("/path/to/config.toml".to_string()));
    }

    #[test]
    fn test_version_command() {
        let args = CliArgs::parse_from(["test", "version"]);
        assert!(matches!(args.command, Some(BaseCommand::Version)));
    }

    // ------------------------------------------------------------------------
    // Run command tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_run_command_defaults() {
        let args = run_args(&[]);
        assert!(args.delay_ms.is_none());
        assert!(args.fail.is_none());
        assert!(args.triggers.is_none());
        assert!(args.mode.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_run_command_flags() {
        let args = run_args(&[
            "--delay-ms",
            "50",
            "--fail",
            "network-down",
            "-n",
            "3",
            "--mode",
            "exclusive",
            "--json",
        ]);
        assert_eq!(args.delay_ms, Some(50));
        assert_eq!(args.fail.as_deref(), Some("network-down"));
        assert_eq!(args.triggers, Some(3));
        assert_eq!(args.mode, Some(RunMode::Exclusive));
        assert!(args.json);
    }

    #[test]
    fn test_run_command_rejects_unknown_mode() {
        let result = CliArgs::try_parse_from(["test", "run", "--mode", "parallel"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_args_apply_overrides() {
        let mut config = LoadtrackConfig::default();
        let args = run_args(&["--label", "fetch-projects", "-d", "5", "--value", "done"]);
        args.apply(&mut config);

        assert_eq!(config.operation.label, "fetch-projects");
        assert_eq!(config.operation.delay_ms, 5);
        assert_eq!(config.operation.value, "done");
        assert_eq!(config.operation.outcome, Outcome::Ok);
        assert_eq!(config.run.triggers, 1);
    }

    #[test]
    fn test_run_args_fail_wins_over_value() {
        let mut config = LoadtrackConfig::default();
        let args = run_args(&["--value", "done", "--fail", "timeout"]);
        args.apply(&mut config);

        assert_eq!(config.operation.outcome, Outcome::Error);
        assert_eq!(config.operation.error, "timeout");
    }

    #[test]
    fn test_run_args_apply_keeps_unset_fields() {
        let mut config = LoadtrackConfig::default();
        config.run.mode = RunMode::Concurrent;
        RunArgs::default().apply(&mut config);
        assert_eq!(config.run.mode, RunMode::Concurrent);
        assert_eq!(config.operation.delay_ms, 250);
    }

    // ------------------------------------------------------------------------
    // Config command tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_path_command() {
        let args = CliArgs::parse_from(["test", "config", "path"]);
        match args.command {
            Some(BaseCommand::Config(ConfigCommand {
                command: ConfigAction::Path,
            })) => {}
            _ => panic!("Expected Config Path command"),
        }
    }

    #[test]
    fn test_config_show_command() {
        let args = CliArgs::parse_from(["test", "config", "show"]);
        assert!(matches!(
            args.command,
            Some(BaseCommand::Config(ConfigCommand {
                command: ConfigAction::Show
            }))
        ));
    }

    #[test]
    fn test_config_set_is_not_a_command() {
        let result = CliArgs::try_parse_from(["test", "config", "set", "run.mode", "concurrent"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_init_force() {
        let args = CliArgs::parse_from(["test", "config", "init", "--force"]);
        match args.command {
            Some(BaseCommand::Config(ConfigCommand {
                command: ConfigAction::Init { file, force },
            })) => {
                assert!(file.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command with force"),
        }
    }
}
