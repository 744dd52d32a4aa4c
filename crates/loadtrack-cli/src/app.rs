//! LoadtrackCli application.
//!
//! Holds the loaded configuration and dispatches parsed commands to their
//! handlers.

use crate::cli::{BaseCommand, CliArgs, RunArgs};
use crate::config::LoadtrackConfig;
use crate::{config_handlers, run};
use loadtrack_core::{Error, Result};
use tracing_subscriber::EnvFilter;

// ============================================================================
// LoadtrackCli
// ============================================================================

/// The `loadtrack` command-line application.
pub struct LoadtrackCli {
    name: String,
    config: LoadtrackConfig,
    version: String,
}

impl LoadtrackCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = LoadtrackConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: LoadtrackConfig) -> Self {
        Self {
            name: name.into(),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &LoadtrackConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    /// `log` records from `loadtrack-core` are forwarded to the same subscriber.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(BaseCommand::Run(run_args)) => self.handle_run(&run_args, args.quiet).await,
            Some(BaseCommand::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(BaseCommand::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {}: use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    /// Apply overrides, run the tracked fetch, and print the report.
    async fn handle_run(&self, run_args: &RunArgs, quiet: bool) -> Result<()> {
        let mut config = self.config.clone();
        run_args.apply(&mut config);
        config.validate()?;

        tracing::info!(
            project = %config.project_name,
            label = %config.operation.label,
            mode = ?config.run.mode,
            triggers = config.run.triggers,
            "starting run"
        );
        let report = run::run_operation(&config).await;

        if run_args.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| Error::invalid_data(format!("report serialization: {e}")))?;
            println!("{json}");
        } else if !quiet {
            println!("{}", run::render_report(&report));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
