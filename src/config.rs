//! Device descriptors and curve presets for Platinum coolers.
//!
//! Provides the known members of the family, the pump curve presets and
//! loading of a descriptor from JSON for variants not listed here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PlatinumError, Result};
use crate::protocol::{CORSAIR_VID, CurveTable};

// =============================================================================
// Device Descriptors
// =============================================================================

/// Static description of one device model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub name: String,
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,
    pub product_id: u16,
    #[serde(default = "default_write_endpoint")]
    pub write_endpoint: u8,
    #[serde(default = "default_read_endpoint")]
    pub read_endpoint: u8,
    /// HID read timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: i32,
}

fn default_vendor_id() -> u16 {
    CORSAIR_VID
}

fn default_write_endpoint() -> u8 {
    0x01
}

fn default_read_endpoint() -> u8 {
    0x81
}

fn default_timeout_ms() -> i32 {
    2000
}

impl DeviceDescriptor {
    fn known(name: &str, product_id: u16) -> Self {
        Self {
            name: name.to_string(),
            vendor_id: CORSAIR_VID,
            product_id,
            write_endpoint: default_write_endpoint(),
            read_endpoint: default_read_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Descriptors of every model this crate knows about.
    pub fn known_devices() -> Vec<Self> {
        vec![
            Self::known("H115i Platinum", 0x0C17),
            Self::known("H100i Platinum", 0x0C18),
            Self::known("H100i Platinum SE", 0x0C19),
        ]
    }

    /// Look up a known model by product id.
    pub fn by_product_id(product_id: u16) -> Option<Self> {
        Self::known_devices()
            .into_iter()
            .find(|d| d.product_id == product_id)
    }

    /// Load a descriptor from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

const APP_NAME: &str = "platinum-cooler";
const DESCRIPTOR_FILE: &str = "device.json";

/// Default descriptor file location.
/// - Linux: ~/.config/platinum-cooler/device.json
/// - Windows: %APPDATA%\platinum-cooler\device.json
pub fn default_descriptor_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME).join(DESCRIPTOR_FILE))
        .ok_or_else(|| PlatinumError::InvalidInput("Could not find config directory".into()))
}

// =============================================================================
// Pump Curves
// =============================================================================

/// Pump mode, each backed by a curve upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpMode {
    Quiet,
    Balanced,
    Performance,
    /// Same curve as Balanced.
    Default,
    /// Upload the table already held by the control.
    Custom,
}

impl PumpMode {
    /// Preset table, or `None` for Custom.
    pub fn preset(&self) -> Option<CurveTable> {
        match self {
            PumpMode::Quiet => Some(CURVE_QUIET),
            PumpMode::Balanced | PumpMode::Default => Some(CURVE_BALANCED),
            PumpMode::Performance => Some(CURVE_PERFORMANCE),
            PumpMode::Custom => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PumpMode::Quiet => "Quiet",
            PumpMode::Balanced => "Balanced",
            PumpMode::Performance => "Performance",
            PumpMode::Default => "Default",
            PumpMode::Custom => "Custom",
        }
    }
}

impl std::fmt::Display for PumpMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Quiet curve - low speed, ramps late.
pub const CURVE_QUIET: CurveTable =
    CurveTable::from_pairs([(20, 25), (30, 30), (40, 45), (50, 70), (60, 100)]);

/// Balanced curve.
pub const CURVE_BALANCED: CurveTable =
    CurveTable::from_pairs([(20, 40), (30, 50), (40, 65), (50, 85), (60, 100)]);

/// Performance curve - aggressive cooling.
pub const CURVE_PERFORMANCE: CurveTable =
    CurveTable::from_pairs([(20, 60), (30, 70), (40, 85), (50, 100), (60, 100)]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_devices() {
        let dev = DeviceDescriptor::by_product_id(0x0C18).unwrap();
        assert_eq!(dev.name, "H100i Platinum");
        assert_eq!(dev.vendor_id, 0x1B1C);
        assert!(DeviceDescriptor::by_product_id(0x1234).is_none());
    }

    #[test]
    fn test_descriptor_from_json_defaults() {
        let dev =
            DeviceDescriptor::from_json(r#"{ "name": "H150i Platinum", "productId": 3098 }"#)
                .unwrap();
        assert_eq!(dev.product_id, 0x0C1A);
        assert_eq!(dev.vendor_id, CORSAIR_VID);
        assert_eq!(dev.write_endpoint, 0x01);
        assert_eq!(dev.read_endpoint, 0x81);
        assert_eq!(dev.timeout_ms, 2000);
    }

    #[test]
    fn test_descriptor_invalid_json() {
        assert!(matches!(
            DeviceDescriptor::from_json("{ \"name\": 1 }"),
            Err(PlatinumError::Config(_))
        ));
    }

    #[test]
    fn test_pump_presets() {
        assert_eq!(PumpMode::Default.preset(), PumpMode::Balanced.preset());
        assert!(PumpMode::Custom.preset().is_none());
        let quiet = PumpMode::Quiet.preset().unwrap();
        assert!(
            quiet
                .temperatures()
                .windows(2)
                .all(|w| w[0] < w[1])
        );
    }
}
