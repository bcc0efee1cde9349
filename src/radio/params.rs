//! # LoRa Modulation Parameters
//!
//! This module defines the spreading factor, bandwidth, and coding rate
//! types used to configure the radio and to render the wire-format datarate
//! string (e.g. `SF7BW125`) carried in rxpk/txpk JSON payloads.

use crate::error::GatewayError;
use std::fmt;
use std::str::FromStr;

/// Spreading Factor (SF) for LoRa
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum SpreadingFactor {
    SF7 = 0x07,
    SF8 = 0x08,
    SF9 = 0x09,
    SF10 = 0x0A,
    SF11 = 0x0B,
    SF12 = 0x0C,
}

impl SpreadingFactor {
    /// Numeric spreading factor (7..=12)
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(sf: u8) -> Option<Self> {
        match sf {
            7 => Some(Self::SF7),
            8 => Some(Self::SF8),
            9 => Some(Self::SF9),
            10 => Some(Self::SF10),
            11 => Some(Self::SF11),
            12 => Some(Self::SF12),
            _ => None,
        }
    }
}

/// Bandwidth for LoRa
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Bandwidth {
    BW125,
    BW250,
    BW500,
}

impl Bandwidth {
    /// Bandwidth in kHz
    pub fn khz(self) -> u32 {
        match self {
            Self::BW125 => 125,
            Self::BW250 => 250,
            Self::BW500 => 500,
        }
    }
}

/// Coding Rate (CR) for LoRa
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CodingRate {
    CR4_5,
    CR4_6,
    CR4_7,
    CR4_8,
}

impl CodingRate {
    /// Wire-format representation, e.g. `4/5`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CR4_5 => "4/5",
            Self::CR4_6 => "4/6",
            Self::CR4_7 => "4/7",
            Self::CR4_8 => "4/8",
        }
    }
}

/// Spreading factor + bandwidth pair, the `datr` field of the wire protocol.
///
/// Parses from and formats to the `SFnBWm` form used by the packet forwarder
/// protocol (`SF7BW125`, `SF12BW500`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Datarate {
    pub sf: SpreadingFactor,
    pub bw: Bandwidth,
}

impl Datarate {
    pub fn new(sf: SpreadingFactor, bw: Bandwidth) -> Self {
        Self { sf, bw }
    }
}

impl fmt::Display for Datarate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SF{}BW{}", self.sf.value(), self.bw.khz())
    }
}

impl FromStr for Datarate {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GatewayError::InvalidDatarate(s.to_string());

        let rest = s.strip_prefix("SF").ok_or_else(invalid)?;
        let bw_pos = rest.find("BW").ok_or_else(invalid)?;
        let sf_digits = &rest[..bw_pos];
        let bw_digits = &rest[bw_pos + 2..];

        let sf = sf_digits
            .parse::<u8>()
            .ok()
            .and_then(SpreadingFactor::from_value)
            .ok_or_else(invalid)?;
        let bw = match bw_digits {
            "125" => Bandwidth::BW125,
            "250" => Bandwidth::BW250,
            "500" => Bandwidth::BW500,
            _ => return Err(invalid()),
        };

        Ok(Self { sf, bw })
    }
}
