use crate::models::device::DeviceDescriptor;
use once_cell::sync::Lazy;
use regex::Regex;

static DEVICE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\S+) -d (\S+)").expect("valid regex"));

/// Parse `smartctl --scan` output into device descriptors.
///
/// Lines look like `/dev/sda -d scsi # /dev/sda, SCSI device` or, behind a
/// MegaRAID controller, `/dev/bus/4 -d megaraid,14 # ...`. Anything after
/// `#` is ignored and lines without a `-d <type>` pair are skipped.
pub fn parse_scan(out: &str) -> Vec<DeviceDescriptor> {
    out.trim()
        .lines()
        .filter_map(|line| {
            let raw = line.split('#').next().unwrap_or("");
            let caps = DEVICE_RE.captures(raw)?;
            Some(DeviceDescriptor::new(raw, &caps[1], &caps[2]))
        })
        .collect()
}
