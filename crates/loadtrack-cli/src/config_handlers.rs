//! Handlers for `loadtrack config {path,show,init}`.

use std::path::{Path, PathBuf};

use crate::cli::ConfigAction;
use crate::config::LoadtrackConfig;
use loadtrack_core::{Error, Result};

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Takes the raw `--config` path rather than a loaded config: `path` and
/// `init` have to work before any file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = config_file(config_path)?;
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(not created yet; `loadtrack config init` writes the defaults)");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = LoadtrackConfig::load(config_path)?;
            print!("{}", render_effective(&config)?);
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(p) => PathBuf::from(p),
                None => config_file(None)?,
            };
            write_defaults(&path, force)?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
    }
}

fn config_file(explicit: Option<&str>) -> Result<PathBuf> {
    LoadtrackConfig::resolve_config_path(explicit)
        .ok_or_else(|| Error::config("no config directory on this platform"))
}

// ============================================================================
// show
// ============================================================================

/// The config after file and `LOADTRACK_*` layering, as TOML.
///
/// A config that `run` would reject is still rendered, followed by a
/// comment naming the problem.
fn render_effective(config: &LoadtrackConfig) -> Result<String> {
    let mut out = config.to_toml_string()?;
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "effective config is not runnable");
        out.push_str(&format!("\n# not runnable: {e}\n"));
    }
    Ok(out)
}

// ============================================================================
// init
// ============================================================================

/// Write the default config to `path`, creating parent directories.
fn write_defaults(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "{} already exists; pass --force to replace it",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let body = LoadtrackConfig::default().to_toml_string()?;
    std::fs::write(path, body).map_err(|e| Error::io_with_path(e, path))?;
    tracing::debug!(path = %path.display(), "default config written");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
