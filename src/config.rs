use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::collectors::df::TypeFilter;
use crate::collectors::source::{DfCommand, DEFAULT_ARGS, DEFAULT_COMMAND, DEFAULT_TIMEOUT};
use crate::collector::default_scheme;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Metric prefix; unset means "<hostname>.disk"
    pub scheme: Option<String>,
    /// Kill the usage command after this many milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Command producing `df -PT` style output
    pub command: String,
    pub args:    Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Only report these filesystem types (empty = all)
    pub include_types: Vec<String>,
    /// Never report these filesystem types
    pub exclude_types: Vec<String>,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { scheme: None, timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64 }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.into(),
            args:    DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ── Load / Resolve ───────────────────────────────────────────────────

impl Config {
    /// Loads `path` if given, else the per-user config file if it exists,
    /// else defaults. An explicit path that can't be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => read_file(p),
            None => match Self::config_path() {
                Some(p) if p.is_file() => read_file(&p),
                _                      => Ok(Config::default()),
            },
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("disk-space-metrics").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.timeout_ms == 0 { return Err(ConfigError::ZeroTimeout); }
        if self.source.command.trim().is_empty() { return Err(ConfigError::EmptyCommand); }
        Ok(())
    }

    pub fn scheme(&self) -> String {
        self.general.scheme.clone().unwrap_or_else(default_scheme)
    }

    pub fn df_command(&self) -> DfCommand {
        DfCommand {
            command: self.source.command.clone(),
            args:    self.source.args.clone(),
            timeout: Duration::from_millis(self.general.timeout_ms),
        }
    }

    pub fn type_filter(&self) -> TypeFilter {
        TypeFilter {
            include: self.filter.include_types.clone(),
            exclude: self.filter.exclude_types.clone(),
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn read_file(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}
