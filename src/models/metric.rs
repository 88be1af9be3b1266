use serde::Serialize;

use crate::models::filesystem::FilesystemUsageRecord;

/// A single `(name, value)` pair ready for emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricTuple {
    pub name:  String,
    pub value: u64,
}

impl MetricTuple {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self { name: name.into(), value }
    }
}

/// Builds the three tuples for one record, in used → available → capacity order.
/// None if a byte conversion overflows.
pub fn tuples_for(scheme: &str, rec: &FilesystemUsageRecord) -> Option<[MetricTuple; 3]> {
    let prefix = format!("{}.{}", scheme, rec.device);
    Some([
        MetricTuple::new(format!("{}.used.bytes", prefix),       rec.used_bytes()?),
        MetricTuple::new(format!("{}.available.bytes", prefix),  rec.available_bytes()?),
        MetricTuple::new(format!("{}.capacity.percent", prefix), rec.capacity_percent),
    ])
}
