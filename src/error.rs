use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Fatal errors for a collection pass. No partial output accompanies these.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source:  std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    ExitStatus {
        command: String,
        status:  String,
        stderr:  String,
    },

    #[error("`{command}` did not finish within {timeout:?}")]
    Timeout {
        command: String,
        timeout: Duration,
    },

    #[error("`{command}` produced non-UTF-8 output")]
    InvalidOutput { command: String },

    #[error("failed to read usage input {path}: {source}")]
    Input {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metric scheme must not be empty")]
    EmptyScheme,
}

/// Coarse classification of what went wrong in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CommandFailure,
    ParseFailure,
    Config,
}

impl ErrorKind {
    /// Check-style exit code: 1 usage/config, 2 CRITICAL, 3 UNKNOWN.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config         => 1,
            ErrorKind::CommandFailure => 2,
            ErrorKind::ParseFailure   => 3,
        }
    }
}

impl CollectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CollectError::EmptyScheme => ErrorKind::Config,
            _                         => ErrorKind::CommandFailure,
        }
    }
}

/// One unparseable line. Recorded and reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    /// 1-based line number in the command output, header included.
    pub line:   usize,
    pub raw:    String,
    pub reason: &'static str,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed line {} from df ({}): {}", self.line, self.reason, self.raw)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path:   PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("source command must not be empty")]
    EmptyCommand,
}
