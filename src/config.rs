use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "fse.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings for `fse serve`, read from an optional YAML file and then
/// overridden by whatever was given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Database path or connection URL
    pub database: String,
    pub cors_origin: Option<String>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            cors_origin: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Command line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub database: Option<String>,
    pub cors_origin: Option<String>,
    pub log_level: Option<String>,
}

impl ServerConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty file is a valid config made of defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse server config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Load `path` if given, otherwise start from defaults, then apply overrides.
    pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(base.with_overrides(overrides))
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(database) = overrides.database {
            self.database = database;
        }
        if overrides.cors_origin.is_some() {
            self.cors_origin = overrides.cors_origin;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        self
    }
}
