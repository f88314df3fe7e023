/// Serializable records written by `--json`.
///
/// Decoupled from the library-facing `DriverInfo` / `DeviceInfo` so the JSON
/// shape stays stable if the binding changes.
use serde::{Deserialize, Serialize};

use crate::opentmf::{DeviceInfo, DriverInfo};

/// One driver, written as a single JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverOutput {
    pub name: String,
    /// `major.minor[.patch]` followed by the extra label.
    pub version: String,
    pub description: String,
    pub authors: String,
    pub license: String,
    /// Inverse of the library's non-free flag.
    pub free: bool,
    /// Present only when devices were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<DeviceOutput>>,
}

/// A device seen by a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOutput {
    /// Path as listed by the driver (appended to the driver URL to open it).
    pub path: String,
    pub name: String,
    pub serial: String,
}

impl DriverOutput {
    #[must_use]
    pub fn new(info: &DriverInfo) -> Self {
        Self {
            name: info.name.clone(),
            version: format!("{}{}", info.version, info.version.extra),
            description: info.description.clone(),
            authors: info.authors.clone(),
            license: info.license.clone(),
            free: !info.non_free,
            devices: None,
        }
    }
}

impl DeviceOutput {
    #[must_use]
    pub fn new(path: &str, info: &DeviceInfo) -> Self {
        Self {
            path: path.to_owned(),
            name: info.name.clone(),
            serial: info.serial.clone(),
        }
    }
}
