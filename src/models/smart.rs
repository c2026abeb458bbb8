use serde::Serialize;

/// Health text used when the report carries no self-assessment line.
pub const HEALTH_UNSUPPORTED: &str = "UNSUPPORTED";
pub const HEALTH_PASSED:      &str = "PASSED";
pub const SMART_ENABLED:      &str = "Enabled";
pub const SOLID_STATE:        &str = "Solid State Device";

/// Overall self-assessment, derived from [`DeviceInfo::health`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthState {
    Passed,
    /// Any explicit result other than PASSED, kept verbatim.
    Failed(String),
    /// The device reported no self-assessment at all.
    Unsupported,
}

/// Identity, geometry and SMART capability of one device, from `smartctl -i -H`.
///
/// Textual fields are `None` when their label never appeared. Derived
/// numbers stay at 0 and derived flags at `false` when the text is missing
/// or does not match its expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub device_model:            Option<String>,
    pub serial_number:           Option<String>,
    pub lu_wwn_device_id:        Option<String>,
    pub firmware_version:        Option<String>,
    pub user_capacity:           Option<String>,
    pub user_capacity_bytes:     u64,
    pub sector_sizes:            Option<String>,
    pub logical_sector_size:     u32,
    pub physical_sector_size:    u32,
    pub rotation_rate:           Option<String>,
    pub rotation_rate_rpm:       u32,
    pub is_ssd:                  bool,
    pub ata_version:             Option<String>,
    pub sata_version:            Option<String>,
    pub smart_support_is:        Option<String>,
    pub smart_support:           bool,
    // SAS / SCSI dialect
    pub vendor:                  Option<String>,
    pub product:                 Option<String>,
    pub revision:                Option<String>,
    pub logical_block_size:      Option<String>,
    pub logical_block_size_bytes: u32,
    pub logical_unit_id:         Option<String>,
    pub device_type:             Option<String>,
    pub health:                  String,
    pub healthy:                 bool,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            device_model:             None,
            serial_number:            None,
            lu_wwn_device_id:         None,
            firmware_version:         None,
            user_capacity:            None,
            user_capacity_bytes:      0,
            sector_sizes:             None,
            logical_sector_size:      0,
            physical_sector_size:     0,
            rotation_rate:            None,
            rotation_rate_rpm:        0,
            is_ssd:                   false,
            ata_version:              None,
            sata_version:             None,
            smart_support_is:         None,
            smart_support:            false,
            vendor:                   None,
            product:                  None,
            revision:                 None,
            logical_block_size:       None,
            logical_block_size_bytes: 0,
            logical_unit_id:          None,
            device_type:              None,
            health:                   HEALTH_UNSUPPORTED.to_string(),
            healthy:                  false,
        }
    }
}

impl DeviceInfo {
    pub fn health_state(&self) -> HealthState {
        match self.health.as_str() {
            HEALTH_PASSED      => HealthState::Passed,
            HEALTH_UNSUPPORTED => HealthState::Unsupported,
            other              => HealthState::Failed(other.to_string()),
        }
    }
}

/// One row of the `smartctl -A` attribute table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartAttribute {
    pub id:              u32,
    pub name:            String,
    pub flag:            u16,
    pub value:           u32,
    pub worst:           u32,
    pub thresh:          u32,
    pub attr_type:       String,
    pub updated:         String,
    pub when_failed:     String,
    /// Plain integer parse of RAW_VALUE; 0 for vendor encodings like `31467h+00m+35.937s`.
    pub raw_value:       i64,
    /// Trailing free text after RAW_VALUE, e.g. `(Min/Max 24/45)`.
    pub raw_value_notes: Option<String>,
}
