use serde::Serialize;

/// One device line from `smartctl --scan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    /// Left-hand side of the scan line, before any `#` comment.
    #[serde(skip)]
    pub raw:            String,
    /// Device node or bus identifier, e.g. `/dev/sda` or `/dev/bus/4`.
    pub path:           String,
    /// Value passed back to smartctl via `-d`, e.g. `auto` or `megaraid,14`.
    pub interface_type: String,
}

impl DeviceDescriptor {
    /// Build a descriptor, rewriting a bare `scsi` type to `auto`.
    pub fn new(raw: &str, path: &str, interface_type: &str) -> Self {
        let interface_type = if interface_type == "scsi" { "auto" } else { interface_type };
        Self {
            raw:            raw.to_string(),
            path:           path.to_string(),
            interface_type: interface_type.to_string(),
        }
    }

    /// Interface type as it appears in a line-protocol tag (`megaraid,14` → `megaraid_14`).
    pub fn type_tag(&self) -> String {
        self.interface_type.replace(',', "_")
    }
}
