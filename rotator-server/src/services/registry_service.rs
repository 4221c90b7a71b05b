use std::sync::Arc;

use rotator_api::models::ConfiguredDevice;

use super::RotatorDevice;
use crate::configs::Device;

/// Index of every simulated rotator, built once at startup.
pub struct DeviceRegistry {
    devices: Vec<Arc<RotatorDevice>>,
}

impl DeviceRegistry {
    pub fn new(device: &Device) -> Self {
        let devices = (0..device.count.max(1))
            .map(|device_number| Arc::new(RotatorDevice::new(device_number, device)))
            .collect();

        Self { devices }
    }

    pub fn get(&self, device_number: u32) -> Option<Arc<RotatorDevice>> {
        self.devices.get(device_number as usize).cloned()
    }

    pub fn max_device_number(&self) -> u32 {
        self.devices.len().saturating_sub(1) as u32
    }

    pub fn configured_devices(&self) -> Vec<ConfiguredDevice> {
        self.devices
            .iter()
            .map(|device| ConfiguredDevice::rotator(device.device_number()))
            .collect()
    }

    /// Stops every rotator that is still moving.
    pub fn halt_all(&self) {
        for device in &self.devices {
            if let Err(e) = device.halt() {
                tracing::warn!(device = device.device_number(), "Failed to halt: {}", e);
            }
        }
    }
}
