//! # Gateway Identity and Configuration
//!
//! The gateway EUI, the server endpoint, and the uplink channel parameters.
//! All of it is immutable once the gateway has started.

use crate::constants::GATEWAY_EUI_LEN;
use crate::error::GatewayError;
use crate::radio::params::{Bandwidth, Datarate, SpreadingFactor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-byte gateway identifier presented to the network server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEui([u8; GATEWAY_EUI_LEN]);

impl GatewayEui {
    /// Derive the EUI from a 6-byte hardware unique id (MAC-style): the
    /// first 3 bytes, `FFFE`, then the last 3 bytes.
    pub fn from_hardware_id(id: &[u8; 6]) -> Self {
        Self([id[0], id[1], id[2], 0xFF, 0xFE, id[3], id[4], id[5]])
    }

    /// Parse an explicit EUI from 16 hexadecimal characters.
    pub fn from_hex(s: &str) -> Result<Self, GatewayError> {
        let bytes = hex::decode(s).map_err(|_| GatewayError::InvalidEui(s.to_string()))?;
        let bytes: [u8; GATEWAY_EUI_LEN] = bytes
            .try_into()
            .map_err(|_| GatewayError::InvalidEui(s.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn bytes(&self) -> [u8; GATEWAY_EUI_LEN] {
        self.0
    }
}

impl fmt::Display for GatewayEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

/// Gateway configuration.
///
/// Construction parameters only; protocol behavior (periods, deadlines,
/// guard times) lives in [`crate::constants`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Explicit gateway EUI; when `None` it is derived from `hardware_id`
    pub eui: Option<GatewayEui>,

    /// 6-byte hardware unique id used to derive the EUI
    pub hardware_id: Option<[u8; 6]>,

    /// Network server hostname
    pub server: String,

    /// Network server UDP port
    pub port: u16,

    /// Uplink center frequency in Hz (e.g. 868_100_000 for EU868.1)
    pub frequency_hz: u32,

    /// Uplink datarate
    pub datarate: Datarate,

    /// NTP server handed to the network/time collaborator at startup
    pub ntp_server: String,

    /// NTP resync period in seconds
    pub ntp_period_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        // The Things Network EU868 defaults
        Self {
            eui: None,
            hardware_id: None,
            server: "router.eu.thethings.network".to_string(),
            port: 1700,
            frequency_hz: 868_100_000,
            datarate: Datarate::new(SpreadingFactor::SF7, Bandwidth::BW125),
            ntp_server: "pool.ntp.org".to_string(),
            ntp_period_secs: 3600,
        }
    }
}

impl GatewayConfig {
    /// The EUI this gateway identifies as: explicit if supplied, otherwise
    /// derived from the hardware id.
    pub fn resolve_eui(&self) -> Result<GatewayEui, GatewayError> {
        if let Some(eui) = self.eui {
            return Ok(eui);
        }
        match &self.hardware_id {
            Some(id) => Ok(GatewayEui::from_hardware_id(id)),
            None => Err(GatewayError::InvalidConfig(
                "neither an explicit EUI nor a hardware id is configured".to_string(),
            )),
        }
    }

    /// Validate the parts serde cannot.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.frequency_hz == 0 {
            return Err(GatewayError::InvalidConfig(
                "uplink frequency must be non-zero".to_string(),
            ));
        }
        if self.server.is_empty() {
            return Err(GatewayError::InvalidConfig(
                "server hostname must not be empty".to_string(),
            ));
        }
        self.resolve_eui().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eui_derivation_inserts_fffe() {
        let eui = GatewayEui::from_hardware_id(&[0x24, 0x0A, 0xC4, 0x01, 0x02, 0x03]);
        assert_eq!(eui.bytes(), [0x24, 0x0A, 0xC4, 0xFF, 0xFE, 0x01, 0x02, 0x03]);
        assert_eq!(eui.to_string(), "240AC4FFFE010203");
    }

    #[test]
    fn test_eui_from_hex() {
        let eui = GatewayEui::from_hex("240ac4fffe010203").unwrap();
        assert_eq!(eui.to_string(), "240AC4FFFE010203");

        assert!(GatewayEui::from_hex("240ac4").is_err());
        assert!(GatewayEui::from_hex("not-hex-not-hex!").is_err());
    }

    #[test]
    fn test_resolve_eui_prefers_explicit() {
        let mut config = GatewayConfig {
            hardware_id: Some([1, 2, 3, 4, 5, 6]),
            ..GatewayConfig::default()
        };
        assert_eq!(
            config.resolve_eui().unwrap().bytes(),
            [1, 2, 3, 0xFF, 0xFE, 4, 5, 6]
        );

        let explicit = GatewayEui::from_hex("AABBCCDDEEFF0011").unwrap();
        config.eui = Some(explicit);
        assert_eq!(config.resolve_eui().unwrap(), explicit);
    }

    #[test]
    fn test_validate_requires_identity() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_err());
    }
}
