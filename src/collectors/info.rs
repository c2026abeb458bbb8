use crate::models::smart::{DeviceInfo, HEALTH_PASSED, SMART_ENABLED, SOLID_STATE};
use once_cell::sync::Lazy;
use regex::Regex;

static USER_CAPACITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([,\d]+) bytes \[.+?\]$").expect("valid regex"));
static SAME_SECTOR_SIZES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+) bytes logical/physical$").expect("valid regex"));
static SEPARATE_SECTOR_SIZES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+) bytes logical, (\d+) bytes physical$").expect("valid regex"));
static RPM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+) rpm$").expect("valid regex"));
static BYTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+) bytes$").expect("valid regex"));

type LabelHandler = fn(&mut DeviceInfo, &str);

/// Recognized `Label: value` lines. Labels match exactly; anything else is ignored.
const LABELS: &[(&str, LabelHandler)] = &[
    ("Device Model",     |i, v| i.device_model = Some(v.to_string())),
    ("Serial Number",    |i, v| i.serial_number = Some(v.to_string())),
    ("LU WWN Device Id", |i, v| i.lu_wwn_device_id = Some(v.to_string())),
    ("Firmware Version", |i, v| i.firmware_version = Some(v.to_string())),
    ("User Capacity",    user_capacity),
    ("Sector Size",      same_sector_sizes),
    ("Sector Sizes",     separate_sector_sizes),
    ("Rotation Rate",    rotation_rate),
    ("ATA Version is",   |i, v| i.ata_version = Some(v.to_string())),
    ("SATA Version is",  |i, v| i.sata_version = Some(v.to_string())),
    ("SMART support is", smart_support),
    ("Vendor",           |i, v| i.vendor = Some(v.to_string())),
    ("Product",          |i, v| i.product = Some(v.to_string())),
    ("Revision",         |i, v| i.revision = Some(v.to_string())),
    ("Logical block size", logical_block_size),
    ("Logical Unit id",  |i, v| i.logical_unit_id = Some(v.to_string())),
    ("Device type",      |i, v| i.device_type = Some(v.to_string())),
    ("SMART overall-health self-assessment test result", health),
];

/// Parse `smartctl -i -H` output.
///
/// Each line is split on its first colon and dispatched on the exact label.
/// A value that doesn't fit its expected shape keeps its text but leaves the
/// derived number or flag at zero.
pub fn parse_info(out: &str) -> DeviceInfo {
    let mut info = DeviceInfo::default();
    for line in out.trim().lines() {
        let Some((label, value)) = line.split_once(':') else { continue };
        if let Some((_, handler)) = LABELS.iter().find(|(l, _)| *l == label) {
            handler(&mut info, value.trim());
        }
    }
    info
}

fn capture<T: std::str::FromStr>(re: &Regex, text: &str, group: usize) -> Option<T> {
    re.captures(text)?.get(group)?.as_str().parse().ok()
}

fn user_capacity(info: &mut DeviceInfo, v: &str) {
    info.user_capacity = Some(v.to_string());
    if let Some(caps) = USER_CAPACITY_RE.captures(v) {
        info.user_capacity_bytes = caps[1].replace(',', "").parse().unwrap_or(0);
    }
}

fn same_sector_sizes(info: &mut DeviceInfo, v: &str) {
    info.sector_sizes = Some(v.to_string());
    if let Some(size) = capture::<u32>(&SAME_SECTOR_SIZES_RE, v, 1) {
        info.logical_sector_size  = size;
        info.physical_sector_size = size;
    }
}

fn separate_sector_sizes(info: &mut DeviceInfo, v: &str) {
    info.sector_sizes = Some(v.to_string());
    if let Some(caps) = SEPARATE_SECTOR_SIZES_RE.captures(v) {
        info.logical_sector_size  = caps[1].parse().unwrap_or(0);
        info.physical_sector_size = caps[2].parse().unwrap_or(0);
    }
}

fn rotation_rate(info: &mut DeviceInfo, v: &str) {
    info.rotation_rate = Some(v.to_string());
    if let Some(rpm) = capture(&RPM_RE, v, 1) {
        info.rotation_rate_rpm = rpm;
    }
    info.is_ssd = v == SOLID_STATE;
}

fn smart_support(info: &mut DeviceInfo, v: &str) {
    // ATA reports print this label twice: "Available - ..." then "Enabled".
    info.smart_support_is = Some(v.to_string());
    info.smart_support    = v == SMART_ENABLED;
}

fn logical_block_size(info: &mut DeviceInfo, v: &str) {
    info.logical_block_size = Some(v.to_string());
    if let Some(bytes) = capture(&BYTES_RE, v, 1) {
        info.logical_block_size_bytes = bytes;
    }
}

fn health(info: &mut DeviceInfo, v: &str) {
    info.health  = v.to_string();
    info.healthy = v == HEALTH_PASSED;
}
