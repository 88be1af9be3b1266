use serde_json::{json, Value};
use std::io::{self, Write};

use crate::collector::CollectionReport;
use crate::models::metric::MetricTuple;

/// Graphite plaintext: `<name> <value> <timestamp>` per tuple.
pub fn write_graphite<W: Write>(out: &mut W, tuples: &[MetricTuple], timestamp: i64) -> io::Result<()> {
    for t in tuples {
        writeln!(out, "{} {} {}", t.name, t.value, timestamp)?;
    }
    out.flush()
}

/// One-shot JSON document for `--json`.
pub fn json_report(scheme: &str, timestamp: i64, report: &CollectionReport) -> Value {
    json!({
        "scheme":    scheme,
        "timestamp": timestamp,
        "status":    report.status(),
        "metrics":   report.tuples,
        "failures":  report.failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseFailure;

    #[test]
    fn graphite_lines() {
        let tuples = vec![
            MetricTuple::new("h.disk.sda1.used.bytes", 8_192_000_000),
            MetricTuple::new("h.disk.sda1.capacity.percent", 43),
        ];
        let mut buf = Vec::new();
        write_graphite(&mut buf, &tuples, 1_700_000_000).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "h.disk.sda1.used.bytes 8192000000 1700000000\nh.disk.sda1.capacity.percent 43 1700000000\n"
        );
    }

    #[test]
    fn json_shape() {
        let report = CollectionReport {
            tuples:   vec![MetricTuple::new("h.disk.sda1.capacity.percent", 43)],
            failures: vec![ParseFailure { line: 2, raw: "/dev/sdb1 malformed".into(), reason: "too few fields" }],
        };
        let v = json_report("h.disk", 42, &report);
        assert_eq!(v["status"], "partial");
        assert_eq!(v["metrics"][0]["name"], "h.disk.sda1.capacity.percent");
        assert_eq!(v["metrics"][0]["value"], 43);
        assert_eq!(v["failures"][0]["line"], 2);
        assert_eq!(v["failures"][0]["raw"], "/dev/sdb1 malformed");
        assert_eq!(v["failures"][0]["reason"], "too few fields");
    }
}
