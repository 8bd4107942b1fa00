//! # doxyrs Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! Loads the doxygen settings: which executables to run, the name of the
//! configuration file doxygen reads, extra arguments and the timeout.
//!
//! ## Architecture
//!
//! Configuration sources, lowest to highest precedence:
//! 1. Default values defined in the code
//! 2. User-specific `<config dir>/doxyrs/config.toml`
//! 3. Project-specific `.doxyrs.toml` in the start directory or an ancestor
//!    (the search stops at a `.git` directory)
//! 4. Command-line flags, applied by `main` through `Overrides`
//!
//! ```toml
//! [doxygen]
//! command = "doxygen"
//! doxyfile = "Doxyfile"
//! wizard_command = "doxywizard"
//! additional_arguments = []
//! timeout_secs = 120
//! ```
//!
//! An empty `command` is accepted; running with it produces
//! the "no executable specified" result instead of a load error.
//!
use crate::common::process::Invocation;
use crate::core::error::{DoxyError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// File name of the per-project configuration.
pub const PROJECT_CONFIG_FILENAME: &str = ".doxyrs.toml";

/// Read access to the settings the commands need.
pub trait SettingsProvider {
    /// The doxygen executable. May be empty when unconfigured.
    fn executable_path(&self) -> &str;
    /// Name of the doxygen configuration file inside the project root.
    fn config_file_name(&self) -> &str;
    /// The doxywizard executable.
    fn wizard_executable_path(&self) -> &str;
    /// Arguments appended to every doxygen invocation.
    fn extra_arguments(&self) -> &[String];
    fn timeout(&self) -> Duration;
}

/// Top-level configuration file structure.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub doxygen: DoxygenSettings,
}

/// The `[doxygen]` section.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DoxygenSettings {
    /// Doxygen executable (can use ~).
    #[serde(default = "default_command")]
    pub command: String,
    /// Configuration file name, relative to the project root.
    #[serde(default = "default_doxyfile")]
    pub doxyfile: String,
    /// Doxywizard executable (can use ~).
    #[serde(default = "default_wizard_command")]
    pub wizard_command: String,
    #[serde(default)]
    pub additional_arguments: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DoxygenSettings {
    fn default() -> Self {
        DoxygenSettings {
            command: default_command(),
            doxyfile: default_doxyfile(),
            wizard_command: default_wizard_command(),
            additional_arguments: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// The invocation every doxygen run starts from: executable, extra
/// arguments, timeout, stdout streamed.
pub fn template_from(settings: &dyn SettingsProvider) -> Invocation {
    let mut invocation = Invocation::new(settings.executable_path())
        .args(settings.extra_arguments().iter().cloned())
        .stream_stdout(true);
    invocation.timeout = settings.timeout();
    invocation
}

impl SettingsProvider for DoxygenSettings {
    fn executable_path(&self) -> &str {
        &self.command
    }

    fn config_file_name(&self) -> &str {
        &self.doxyfile
    }

    fn wizard_executable_path(&self) -> &str {
        &self.wizard_command
    }

    fn extra_arguments(&self) -> &[String] {
        &self.additional_arguments
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_command() -> String {
    "doxygen".to_string()
}
fn default_doxyfile() -> String {
    "Doxyfile".to_string()
}
fn default_wizard_command() -> String {
    "doxywizard".to_string()
}
fn default_timeout_secs() -> u64 {
    Invocation::DEFAULT_TIMEOUT_SECS
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub command: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Loads, merges, expands and validates the configuration for a run started
/// in `start_dir`.
pub fn load_config(start_dir: &Path, overrides: &Overrides) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config(start_dir)?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    apply_overrides(&mut merged_config, overrides);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("org", "doxyrs", "doxyrs") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(start_dir: &Path) -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path(start_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!(
            "No project configuration file ({}) found from {}",
            PROJECT_CONFIG_FILENAME,
            start_dir.display()
        );
        Ok(None)
    }
}

fn find_project_config_path(start_dir: &Path) -> Option<PathBuf> {
    for path in start_dir.ancestors() {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
    }
    None
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win wherever they differ from the defaults.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let Some(project_cfg) = project else {
        return user;
    };
    let defaults = DoxygenSettings::default();
    let (user, project) = (user.doxygen, project_cfg.doxygen);

    Config {
        doxygen: DoxygenSettings {
            command: if project.command != defaults.command {
                project.command
            } else {
                user.command
            },
            doxyfile: if project.doxyfile != defaults.doxyfile {
                project.doxyfile
            } else {
                user.doxyfile
            },
            wizard_command: if project.wizard_command != defaults.wizard_command {
                project.wizard_command
            } else {
                user.wizard_command
            },
            additional_arguments: if !project.additional_arguments.is_empty() {
                project.additional_arguments
            } else {
                user.additional_arguments
            },
            timeout_secs: if project.timeout_secs != defaults.timeout_secs {
                project.timeout_secs
            } else {
                user.timeout_secs
            },
        },
    }
}

fn apply_overrides(config: &mut Config, overrides: &Overrides) {
    if let Some(command) = &overrides.command {
        debug!("Command line overrides doxygen command: '{}'", command);
        config.doxygen.command = command.clone();
    }
    if let Some(secs) = overrides.timeout_secs {
        debug!("Command line overrides timeout: {} s", secs);
        config.doxygen.timeout_secs = secs;
    }
}

fn expand_config_paths(config: &mut Config) {
    let settings = &mut config.doxygen;
    settings.command = shellexpand::tilde(&settings.command).into_owned();
    settings.wizard_command = shellexpand::tilde(&settings.wizard_command).into_owned();
    debug!(
        "Expanded commands: doxygen='{}', doxywizard='{}'",
        settings.command, settings.wizard_command
    );
}

fn validate_config(config: &Config) -> Result<()> {
    let settings = &config.doxygen;
    if settings.timeout_secs == 0 {
        return Err(anyhow!(DoxyError::Config(
            "timeout_secs must be greater than zero.".to_string()
        )));
    }
    if settings.doxyfile.trim().is_empty() {
        return Err(anyhow!(DoxyError::Config(
            "doxyfile cannot be empty.".to_string()
        )));
    }
    if Path::new(&settings.doxyfile).components().count() != 1
        || Path::new(&settings.doxyfile).file_name().is_none()
    {
        return Err(anyhow!(DoxyError::Config(format!(
            "doxyfile must be a plain file name, got '{}'.",
            settings.doxyfile
        ))));
    }
    if settings.command.trim().is_empty() {
        warn!("No doxygen executable configured.");
    }
    Ok(())
}
