//! Disk-space metrics from `df`.
//!
//! Runs `df -PT`, keeps the `/dev/`-backed filesystems and turns each one into
//! three graphite metrics: used bytes, available bytes and capacity percent.
//! Lines that can't be parsed are collected alongside the metrics instead of
//! aborting the pass.
//!
//! ```rust
//! use disk_space_metrics::{DiskUsageCollector, FixedText, PassStatus};
//!
//! let df = "Filesystem Type 1024-blocks Used Available Capacity Mounted on\n\
//!           /dev/sda1 ext4 20000000 8000000 11000000 43% /\n";
//! let collector = DiskUsageCollector::new(Box::new(FixedText(df.into())));
//! let report = collector.collect("host.disk").unwrap();
//!
//! assert_eq!(report.status(), PassStatus::Complete);
//! assert_eq!(report.tuples[0].name, "host.disk.sda1.used.bytes");
//! assert_eq!(report.tuples[0].value, 8_192_000_000);
//! ```

pub mod collector;
pub mod collectors;
pub mod config;
pub mod error;
pub mod models;
pub mod util;

pub use collector::{default_scheme, CollectionReport, DiskUsageCollector, PassStatus};
pub use collectors::df::TypeFilter;
pub use collectors::source::{DfCommand, FileSource, FixedText, UsageSource};
pub use config::Config;
pub use error::{CollectError, ConfigError, ErrorKind, ParseFailure};
pub use models::metric::MetricTuple;
