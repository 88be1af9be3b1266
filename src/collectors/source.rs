use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::collectors::subprocess::{run_with_timeout, SubprocessResult};
use crate::error::CollectError;

pub const DEFAULT_COMMAND: &str = "df";
pub const DEFAULT_ARGS: &[&str] = &["-PT"];
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the `df -PT` text comes from.
pub trait UsageSource {
    fn read(&self) -> Result<String, CollectError>;
}

/// Runs the filesystem-usage command.
#[derive(Debug, Clone)]
pub struct DfCommand {
    pub command: String,
    pub args:    Vec<String>,
    pub timeout: Duration,
}

impl Default for DfCommand {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.into(),
            args:    DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DfCommand {
    fn display(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl UsageSource for DfCommand {
    fn read(&self) -> Result<String, CollectError> {
        let command = self.display();
        debug!(%command, timeout = ?self.timeout, "running usage command");

        let captured = match run_with_timeout(&self.command, &self.args, self.timeout) {
            SubprocessResult::Completed(c) => c,
            SubprocessResult::Timeout      => return Err(CollectError::Timeout { command, timeout: self.timeout }),
            SubprocessResult::Io(source)   => return Err(CollectError::Spawn { command, source }),
        };

        if !captured.status.success() {
            return Err(CollectError::ExitStatus {
                command,
                status: captured.status.to_string(),
                stderr: String::from_utf8_lossy(&captured.stderr).trim().to_string(),
            });
        }
        String::from_utf8(captured.stdout).map_err(|_| CollectError::InvalidOutput { command })
    }
}

/// Saved `df -PT` output on disk, or stdin when the path is `-`.
#[derive(Debug, Clone)]
pub struct FileSource(pub PathBuf);

impl UsageSource for FileSource {
    fn read(&self) -> Result<String, CollectError> {
        let map_err = |source| CollectError::Input { path: self.0.clone(), source };
        if self.0.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).map_err(map_err)?;
            Ok(text)
        } else {
            std::fs::read_to_string(&self.0).map_err(map_err)
        }
    }
}

/// Fixed text, for replaying captured output.
#[derive(Debug, Clone)]
pub struct FixedText(pub String);

impl UsageSource for FixedText {
    fn read(&self) -> Result<String, CollectError> {
        Ok(self.0.clone())
    }
}
