use crate::collectors::smartctl::DEFAULT_SMARTCTL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Attribute IDs reported by default.
///
/// See <https://en.wikipedia.org/wiki/S.M.A.R.T.#Known_ATA_S.M.A.R.T._attributes>.
pub const DEFAULT_ATTR_IDS: &[u32] = &[
    1,   // Raw_Read_Error_Rate
    2,   // Throughput_Performance
    3,   // Spin_Up_Time
    5,   // Reallocated_Sector_Ct
    7,   // Seek_Error_Rate
    8,   // Seek_Time_Performance
    9,   // Power_On_Hours
    10,  // Spin_Retry_Count
    12,  // Power_Cycle_Count
    171, // SSD Program Fail Count
    172, // SSD Erase Fail Count
    173, // SSD Wear Leveling Count
    174, // Unexpected Power Loss Count
    190, // Airflow_Temperature_Cel
    194, // Temperature_Celsius
    197, // Current_Pending_Sector
    198, // Offline_Uncorrectable
    199, // UDMA_CRC_Error_Count
    231, // SSD Life Left
    233, // Media_Wearout_Indicator
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub attributes: AttributesConfig,

    #[serde(default)]
    pub devices: DevicesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Measurement name at the start of every line
    pub name: String,
    /// Path of the smartctl binary
    pub smartctl: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributesConfig {
    /// SMART attribute IDs to report
    pub ids: Vec<u32>,
    /// Include attribute names in field keys
    pub use_names: bool,
    /// Also report flag, type, updated, when_failed and raw value notes
    pub detailed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    /// Device paths to skip; a trailing `*` matches by prefix (e.g. "/dev/bus/*")
    pub exclude: Vec<String>,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name:     check_name(std::env::args_os().next().as_deref()),
            smartctl: DEFAULT_SMARTCTL.into(),
        }
    }
}

/// Base name of the invoked binary, so a renamed or symlinked copy reports under its own name.
fn check_name(argv0: Option<&OsStr>) -> String {
    argv0
        .and_then(|a| Path::new(a).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "smartcheck".to_string())
}

impl Default for AttributesConfig {
    fn default() -> Self {
        Self { ids: DEFAULT_ATTR_IDS.to_vec(), use_names: true, detailed: false }
    }
}

impl AttributesConfig {
    pub fn allowed(&self) -> HashSet<u32> {
        self.ids.iter().copied().collect()
    }
}

impl DevicesConfig {
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|pat| {
            if let Some(p) = pat.strip_suffix('*') { path.starts_with(p) }
            else { pat == path }
        })
    }
}

// ── Load ──────────────────────────────────────────────────────────────

impl Config {
    /// Load from `explicit`, or from the default path if that file exists.
    ///
    /// Returns the config together with the file it came from, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        match Self::config_path() {
            Some(path) if path.exists() => Ok((Self::from_file(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("smartcheck").join("smartcheck.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.general.smartctl, "/usr/sbin/smartctl");
        assert_eq!(cfg.attributes.ids.len(), 20);
        assert!(cfg.attributes.use_names);
        assert!(!cfg.attributes.detailed);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::parse(
            r#"
[general]
name = "disk_health"

[attributes]
ids = [5, 197, 198]
detailed = true

[devices]
exclude = ["/dev/bus/*", "/dev/sdz"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.general.name, "disk_health");
        assert_eq!(cfg.general.smartctl, DEFAULT_SMARTCTL);
        assert_eq!(cfg.attributes.allowed(), HashSet::from([5, 197, 198]));
        assert!(cfg.attributes.use_names);
        assert!(cfg.attributes.detailed);
        assert!(cfg.devices.is_excluded("/dev/bus/4"));
        assert!(cfg.devices.is_excluded("/dev/sdz"));
        assert!(!cfg.devices.is_excluded("/dev/sda"));
    }

    #[test]
    fn check_name_is_binary_base_name() {
        assert_eq!(check_name(Some(OsStr::new("/usr/local/bin/disk_health"))), "disk_health");
        assert_eq!(check_name(Some(OsStr::new("smartcheck"))), "smartcheck");
        assert_eq!(check_name(None), "smartcheck");
        assert_eq!(check_name(Some(OsStr::new(""))), "smartcheck");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Config::parse("[attributes]\nids = \"all\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/smartcheck.toml"))).is_err());
    }
}
