//! Configuration module for the artifact stamping watcher.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `SHEETSTAMP_` and use double
//! underscores to separate nested levels:
//! - `SHEETSTAMP_WATCH_ROOT=/repo` sets `watch_root`
//! - `SHEETSTAMP_STAMP__CELL=G5` sets `stamp.cell`
//! - `SHEETSTAMP_REVISION__TIMEOUT_SECS=10` sets `revision.timeout_secs`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory tree watched for artifact changes
    #[serde(default = "default_watch_root")]
    pub watch_root: PathBuf,

    /// Mirror output configuration
    #[serde(default)]
    pub mirror: MirrorConfig,

    /// Artifact naming configuration
    #[serde(default)]
    pub artifact: ArtifactConfig,

    /// Version stamp configuration
    #[serde(default)]
    pub stamp: StampConfig,

    /// Revision lookup configuration
    #[serde(default)]
    pub revision: RevisionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MirrorConfig {
    /// Name of the output subtree directly under the watched root
    #[serde(default = "default_output_subtree")]
    pub output_subtree: String,

    /// Top-level subtree names never watched
    #[serde(default = "default_excluded_subtrees")]
    pub excluded_subtrees: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ArtifactConfig {
    /// Override for the tracked artifact name pattern.
    /// Uses the built-in convention when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracked_pattern: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StampConfig {
    /// Worksheet holding the version cell, matched exactly
    #[serde(default = "default_worksheet")]
    pub worksheet: String,

    /// Cell reference written on every stamp
    #[serde(default = "default_cell")]
    pub cell: String,

    /// Label prefixed to the revision id in the cell
    #[serde(default = "default_label")]
    pub label: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RevisionConfig {
    /// Upper bound for one revision lookup, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_watch_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_output_subtree() -> String {
    "dist".to_string()
}
fn default_excluded_subtrees() -> Vec<String> {
    vec![".git".to_string(), "dist".to_string()]
}
fn default_worksheet() -> String {
    "Version".to_string()
}
fn default_cell() -> String {
    "G3".to_string()
}
fn default_label() -> String {
    // Label spelling matches what downstream tooling greps for.
    "GIT_COMMMIT_ID: ".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            watch_root: default_watch_root(),
            mirror: MirrorConfig::default(),
            artifact: ArtifactConfig::default(),
            stamp: StampConfig::default(),
            revision: RevisionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            output_subtree: default_output_subtree(),
            excluded_subtrees: default_excluded_subtrees(),
        }
    }
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            worksheet: default_worksheet(),
            cell: default_cell(),
            label: default_label(),
        }
    }
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl MirrorConfig {
    /// The output subtree must be a single directory name. The watcher's
    /// exclusion filter matches first path components, so a nested or
    /// non-normal value could never be excluded and the watcher would
    /// react to its own writes.
    pub fn validate_output_subtree(&self) -> Result<(), String> {
        let mut components = Path::new(&self.output_subtree).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(format!(
                "must be a single directory name, got {:?}",
                self.output_subtree
            )),
        }
    }
}

impl RevisionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .sheetstamp directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".sheetstamp/settings.toml"));

        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Layer in environment variables with SHEETSTAMP_ prefix
            // Use double underscore (__) to separate nested levels
            // Single underscore (_) remains as is within field names
            .merge(Env::prefixed("SHEETSTAMP_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the workspace config by looking for a .sheetstamp directory
    /// from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".sheetstamp");
            if config_dir.exists() && config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Check if configuration is properly initialized
    pub fn check_init() -> Result<(), String> {
        let config_path = if let Some(path) = Self::find_workspace_config() {
            path
        } else {
            PathBuf::from(".sheetstamp/settings.toml")
        };

        if !config_path.exists() {
            return Err("No configuration file found".to_string());
        }

        match std::fs::read_to_string(&config_path) {
            Ok(content) => {
                if let Err(e) = toml::from_str::<Settings>(&content) {
                    return Err(format!(
                        "Configuration file is corrupted: {e}\nRun 'sheetstamp init --force' to regenerate."
                    ));
                }
            }
            Err(e) => {
                return Err(format!("Cannot read configuration file: {e}"));
            }
        }

        Ok(())
    }

    /// Subtree names the watcher must skip. Always contains the mirror
    /// output subtree, whatever the configured exclusion list says, so
    /// the watcher can never react to its own writes.
    pub fn effective_exclusions(&self) -> Vec<String> {
        let mut exclusions = self.mirror.excluded_subtrees.clone();
        for required in [self.mirror.output_subtree.as_str(), ".git"] {
            if !exclusions.iter().any(|name| name == required) {
                exclusions.push(required.to_string());
            }
        }
        exclusions
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(".sheetstamp/settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        let settings = Settings::default();
        settings.save(&config_path)?;

        Ok(config_path)
    }
}
