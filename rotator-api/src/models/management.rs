use serde::{Deserialize, Serialize};

use super::DeviceMetadata;

/// Alpaca API versions served by this driver.
pub const API_VERSIONS: [u32; 1] = [1];

/// UDP port Alpaca clients broadcast discovery probes to.
pub const DISCOVERY_PORT: u16 = 32227;

/// Probe payload marker for discovery protocol version 1.
pub const DISCOVERY_MARKER: &str = "alpacadiscovery1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerDescription {
    pub server_name: String,
    pub manufacturer: String,
    pub manufacturer_version: String,
    pub location: String,
}

impl ServerDescription {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            server_name: DeviceMetadata::DESCRIPTION.to_string(),
            manufacturer: DeviceMetadata::MANUFACTURER.to_string(),
            manufacturer_version: DeviceMetadata::VERSION.to_string(),
            location: location.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReply {
    #[serde(rename = "AlpacaPort")]
    pub alpaca_port: u16,
}

impl DiscoveryReply {
    /// Whether a received datagram is a discovery probe.
    pub fn is_probe(datagram: &[u8]) -> bool {
        String::from_utf8_lossy(datagram).contains(DISCOVERY_MARKER)
    }
}
