//! Bounded execution of external commands.
//!
//! `df` can block indefinitely on a hung network mount, so every invocation
//! goes through [`run_with_timeout`], which kills the child once the deadline
//! passes.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Everything a finished child left behind.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

#[derive(Debug)]
pub enum SubprocessResult {
    /// The child exited, successfully or not.
    Completed(Captured),
    /// The deadline passed; the child was killed and reaped.
    Timeout,
    /// Spawning or waiting on the child failed.
    Io(std::io::Error),
}

#[cfg(test)]
impl SubprocessResult {
    fn is_success(&self) -> bool {
        matches!(self, Self::Completed(c) if c.status.success())
    }

    fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Runs `cmd args…` with stdin closed, capturing stdout and stderr.
///
/// The pipes are drained on helper threads so a chatty child can't block on a
/// full pipe while we poll for its exit.
pub fn run_with_timeout(cmd: &str, args: &[String], timeout: Duration) -> SubprocessResult {
    let mut child = match Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(c)  => c,
        Err(e) => return SubprocessResult::Io(e),
    };

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return SubprocessResult::Completed(Captured {
                    status,
                    stdout: collect(stdout),
                    stderr: collect(stderr),
                });
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                // Reader threads finish on their own once the pipes close.
                return SubprocessResult::Timeout;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return SubprocessResult::Io(e);
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
