use tracing::{debug, warn};

use crate::error::ParseFailure;
use crate::models::filesystem::{short_device, FilesystemUsageRecord};
use crate::models::metric::{tuples_for, MetricTuple};

/// Columns in `df -PT` output: filesystem, type, blocks, used, avail, capacity, mount.
const DF_COLUMNS: usize = 7;

/// What a single `df` line turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Parsed(FilesystemUsageRecord),
    /// Not a /dev/ filesystem. The other columns are not inspected.
    Skipped,
    Malformed(&'static str),
}

/// Optional filesystem-type filter. Empty lists accept everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl TypeFilter {
    pub fn allows(&self, fs_type: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|t| t == fs_type) {
            return false;
        }
        !self.exclude.iter().any(|t| t == fs_type)
    }
}

/// Tuples and failures accumulated over one pass of `df` output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    pub tuples:   Vec<MetricTuple>,
    pub failures: Vec<ParseFailure>,
}

pub fn parse_line(line: &str) -> LineOutcome {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let Some(device) = fields.first().and_then(|fs| short_device(fs)) else { return LineOutcome::Skipped };

    if fields.len() < DF_COLUMNS {
        return LineOutcome::Malformed("too few fields");
    }

    let Some(total_kib)        = parse_kib(fields[2]) else { return LineOutcome::Malformed("non-numeric size") };
    let Some(used_kib)         = parse_kib(fields[3]) else { return LineOutcome::Malformed("non-numeric used") };
    let Some(available_kib)    = parse_kib(fields[4]) else { return LineOutcome::Malformed("non-numeric available") };
    let Some(capacity_percent) = parse_capacity(fields[5]) else { return LineOutcome::Malformed("non-numeric capacity") };

    LineOutcome::Parsed(FilesystemUsageRecord {
        device:      device.to_string(),
        fs_type:     fields[1].to_string(),
        total_kib,
        used_kib,
        available_kib,
        capacity_percent,
        // Mount points containing spaces arrive as several tokens.
        mount_point: fields[6..].join(" "),
    })
}

/// Parses full `df -PT` output. The first line is the header and is dropped.
pub fn parse_output(text: &str, scheme: &str, filter: &TypeFilter) -> ParsedOutput {
    let mut out = ParsedOutput::default();

    for (idx, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() { continue; }
        let line_no = idx + 1;

        let rec = match parse_line(line) {
            LineOutcome::Parsed(rec) => rec,
            LineOutcome::Skipped => {
                debug!(line = line_no, "skipping non-device filesystem");
                continue;
            }
            LineOutcome::Malformed(reason) => {
                warn!(line = line_no, reason, raw = line, "malformed df line");
                out.failures.push(ParseFailure { line: line_no, raw: line.to_string(), reason });
                continue;
            }
        };

        if !filter.allows(&rec.fs_type) {
            debug!(device = %rec.device, fs_type = %rec.fs_type, "filtered by type");
            continue;
        }

        match tuples_for(scheme, &rec) {
            Some(tuples) => out.tuples.extend(tuples),
            None => {
                warn!(line = line_no, raw = line, "byte conversion overflowed");
                out.failures.push(ParseFailure {
                    line:   line_no,
                    raw:    line.to_string(),
                    reason: "size out of range",
                });
            }
        }
    }
    out
}

fn parse_kib(s: &str) -> Option<u64> {
    s.parse().ok()
}

/// "43%" → 43, "43.7%" → 43. The percent sign is optional.
fn parse_capacity(s: &str) -> Option<u64> {
    let s = s.strip_suffix('%').unwrap_or(s);
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None         => (s, ""),
    };
    if !frac.chars().all(|c| c.is_ascii_digit()) { return None; }
    whole.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Filesystem     Type  1024-blocks    Used Available Capacity Mounted on";

    #[test]
    fn parses_device_line() {
        match parse_line("/dev/sda1      ext4     20000000 8000000  11000000      43% /") {
            LineOutcome::Parsed(rec) => {
                assert_eq!(rec.device, "sda1");
                assert_eq!(rec.fs_type, "ext4");
                assert_eq!(rec.used_kib, 8_000_000);
                assert_eq!(rec.available_kib, 11_000_000);
                assert_eq!(rec.capacity_percent, 43);
                assert_eq!(rec.mount_point, "/");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn overlay_is_skipped() {
        assert_eq!(parse_line("overlay overlay 1000 500 500 50% /var/lib/docker"), LineOutcome::Skipped);
        assert_eq!(parse_line("tmpfs tmpfs 65536 0 65536 0% /dev/shm"), LineOutcome::Skipped);
    }

    #[test]
    fn non_device_lines_are_skipped_whatever_their_shape() {
        assert_eq!(parse_line("tmpfs"), LineOutcome::Skipped);
        assert_eq!(parse_line("none tmpfs 10 1"), LineOutcome::Skipped);
        assert_eq!(parse_line("systemd-1 autofs - - - - /proc/sys/fs/binfmt_misc"), LineOutcome::Skipped);
        assert_eq!(parse_line("overlay overlay 1000 x 500 50% /var/lib/docker"), LineOutcome::Skipped);
    }

    #[test]
    fn short_lines_are_malformed() {
        assert_eq!(parse_line("/dev/sdb1 malformed"), LineOutcome::Malformed("too few fields"));
        assert_eq!(parse_line("/dev/sdb1 ext4 1 2 3 4%"), LineOutcome::Malformed("too few fields"));
    }

    #[test]
    fn non_numeric_fields_are_malformed() {
        assert_eq!(parse_line("/dev/sdb1 ext4 100 x 50 50% /"), LineOutcome::Malformed("non-numeric used"));
        assert_eq!(parse_line("/dev/sdb1 ext4 100 50 - 50% /"), LineOutcome::Malformed("non-numeric available"));
        assert_eq!(parse_line("/dev/sdb1 ext4 100 50 50 n/a /"), LineOutcome::Malformed("non-numeric capacity"));
        assert_eq!(parse_line("/dev/sdb1 ext4 -5 50 50 50% /"), LineOutcome::Malformed("non-numeric size"));
    }

    #[test]
    fn capacity_forms() {
        assert_eq!(parse_capacity("43%"), Some(43));
        assert_eq!(parse_capacity("43"), Some(43));
        assert_eq!(parse_capacity("43.9%"), Some(43));
        assert_eq!(parse_capacity("100%"), Some(100));
        assert_eq!(parse_capacity("-"), None);
        assert_eq!(parse_capacity("4a%"), None);
        assert_eq!(parse_capacity("43.x%"), None);
    }

    #[test]
    fn mount_point_with_spaces() {
        match parse_line("/dev/sdc1 vfat 1000 10 990 1% /media/USB STICK") {
            LineOutcome::Parsed(rec) => assert_eq!(rec.mount_point, "/media/USB STICK"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn header_is_dropped_and_bad_lines_do_not_abort() {
        let text = format!(
            "{}\n/dev/sdb1 malformed\noverlay overlay 1000 500 500 50% /var/lib/docker\n/dev/sda1 ext4 20000000 8000000 11000000 43% /\n",
            HEADER
        );
        let out = parse_output(&text, "host.disk", &TypeFilter::default());
        assert_eq!(out.tuples.len(), 3);
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].line, 2);
        assert_eq!(out.failures[0].raw, "/dev/sdb1 malformed");
        assert_eq!(out.tuples[0].name, "host.disk.sda1.used.bytes");
    }

    #[test]
    fn header_only_yields_nothing() {
        let out = parse_output(HEADER, "h.disk", &TypeFilter::default());
        assert!(out.tuples.is_empty());
        assert!(out.failures.is_empty());
    }

    #[test]
    fn blank_lines_are_ignored() {
        let text = format!("{}\n\n/dev/sda1 ext4 10 1 9 10% /\n   \n", HEADER);
        let out = parse_output(&text, "h.disk", &TypeFilter::default());
        assert_eq!(out.tuples.len(), 3);
        assert!(out.failures.is_empty());
    }

    #[test]
    fn type_filter() {
        let text = format!(
            "{}\n/dev/sda1 ext4 10 1 9 10% /\n/dev/sdb1 xfs 10 2 8 20% /data\n/dev/sdc1 vfat 10 3 7 30% /boot/efi\n",
            HEADER
        );
        let only_ext4 = TypeFilter { include: vec!["ext4".into()], exclude: vec![] };
        let out = parse_output(&text, "h.disk", &only_ext4);
        assert_eq!(out.tuples.len(), 3);
        assert!(out.tuples.iter().all(|t| t.name.starts_with("h.disk.sda1.")));

        let no_vfat = TypeFilter { include: vec![], exclude: vec!["vfat".into()] };
        let out = parse_output(&text, "h.disk", &no_vfat);
        assert_eq!(out.tuples.len(), 6);
        assert!(!out.tuples.iter().any(|t| t.name.contains(".sdc1.")));
    }

    #[test]
    fn overflowing_sizes_are_reported() {
        let text = format!("{}\n/dev/sda1 ext4 10 18446744073709551615 9 10% /\n", HEADER);
        let out = parse_output(&text, "h.disk", &TypeFilter::default());
        assert!(out.tuples.is_empty());
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].reason, "size out of range");
    }
}
