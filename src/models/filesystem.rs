/// One device-backed line of `df -PT` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemUsageRecord {
    pub device:           String,
    pub fs_type:          String,
    pub total_kib:        u64,
    pub used_kib:         u64,
    pub available_kib:    u64,
    pub capacity_percent: u64,
    pub mount_point:      String,
}

impl FilesystemUsageRecord {
    pub fn used_bytes(&self) -> Option<u64> {
        self.used_kib.checked_mul(1024)
    }

    pub fn available_bytes(&self) -> Option<u64> {
        self.available_kib.checked_mul(1024)
    }
}

/// Returns the short device name: "sda1" from "/dev/sda1", "mapper" from
/// "/dev/mapper/vg-root". None for anything not under /dev/.
pub fn short_device(source: &str) -> Option<&str> {
    let rest = source.strip_prefix("/dev/")?;
    let name = rest.split('/').next().unwrap_or("");
    if name.is_empty() { None } else { Some(name) }
}
