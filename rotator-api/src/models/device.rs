use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Static description of the simulated rotator driver.
pub struct DeviceMetadata;

impl DeviceMetadata {
    pub const NAME: &'static str = "Sample Rotator";
    pub const VERSION: &'static str = "0.2";
    pub const DESCRIPTION: &'static str = "Sample ASCOM Rotator";
    pub const DEVICE_TYPE: &'static str = "Rotator";
    pub const MANUFACTURER: &'static str = "ASCOM Initiative";
    pub const INTERFACE_VERSION: i32 = 3;
    pub const BASE_UNIQUE_ID: Uuid = Uuid::from_u128(0x1892ED30_92F3_4236_843E_DA8EEEF2D1CC);

    pub fn driver_info() -> String {
        format!("{} by {}", Self::NAME, Self::MANUFACTURER)
    }

    /// Stable id for device `device_number`. Device 0 carries the base id.
    pub fn unique_id(device_number: u32) -> Uuid {
        Uuid::from_u128(Self::BASE_UNIQUE_ID.as_u128().wrapping_add(device_number as u128))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfiguredDevice {
    /// Display name
    pub device_name: String,
    /// Alpaca device type
    pub device_type: String,
    /// Index used in device routes
    pub device_number: u32,
    /// Stable unique identifier
    #[serde(rename = "UniqueID")]
    pub unique_id: String,
}

impl ConfiguredDevice {
    pub fn rotator(device_number: u32) -> Self {
        Self {
            device_name: DeviceMetadata::NAME.to_string(),
            device_type: DeviceMetadata::DEVICE_TYPE.to_string(),
            device_number,
            unique_id: DeviceMetadata::unique_id(device_number)
                .hyphenated()
                .to_string()
                .to_uppercase(),
        }
    }
}
