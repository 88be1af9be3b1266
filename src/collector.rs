//! One collection pass: read `df` output, turn it into metric tuples.

use serde::Serialize;
use tracing::info;

use crate::collectors::df::{parse_output, TypeFilter};
use crate::collectors::source::{DfCommand, UsageSource};
use crate::error::{CollectError, ParseFailure};
use crate::models::metric::MetricTuple;

/// Overall outcome of a pass that produced output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassStatus {
    /// Every line parsed.
    Complete,
    /// Output was produced but one or more lines were unparseable.
    Partial,
}

impl PassStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PassStatus::Complete => "OK",
            PassStatus::Partial  => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    pub tuples:   Vec<MetricTuple>,
    pub failures: Vec<ParseFailure>,
}

impl CollectionReport {
    pub fn status(&self) -> PassStatus {
        if self.failures.is_empty() { PassStatus::Complete } else { PassStatus::Partial }
    }
}

pub struct DiskUsageCollector {
    source: Box<dyn UsageSource>,
    filter: TypeFilter,
}

impl Default for DiskUsageCollector {
    fn default() -> Self {
        Self::new(Box::new(DfCommand::default()))
    }
}

impl DiskUsageCollector {
    pub fn new(source: Box<dyn UsageSource>) -> Self {
        Self { source, filter: TypeFilter::default() }
    }

    pub fn with_filter(mut self, filter: TypeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Runs one pass. A failing source aborts with no output; bad lines do not.
    pub fn collect(&self, scheme: &str) -> Result<CollectionReport, CollectError> {
        if scheme.is_empty() {
            return Err(CollectError::EmptyScheme);
        }

        let text = self.source.read()?;
        let parsed = parse_output(&text, scheme, &self.filter);
        let report = CollectionReport { tuples: parsed.tuples, failures: parsed.failures };

        info!(
            scheme,
            metrics = report.tuples.len(),
            failures = report.failures.len(),
            status = report.status().label(),
            "collection pass finished"
        );
        Ok(report)
    }
}

/// Default scheme: `<hostname>.disk`.
pub fn default_scheme() -> String {
    let host = nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string());
    format!("{}.disk", host)
}
