//! # Wire JSON Payload Schemas
//!
//! Serde bindings for the JSON payloads carried by PUSH_DATA, PULL_RESP,
//! and the txpk_ack response. Every packet is built as a fresh value per
//! call; nothing here holds mutable state between frames, so packet
//! construction can run concurrently across radio events.

use serde::{Deserialize, Serialize};

/// Gateway status payload, the `stat` object of a PUSH_DATA frame.
#[derive(Debug, Clone, Serialize)]
pub struct StatPacket {
    pub stat: StatFields,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatFields {
    /// UTC timestamp formatted `YYYY-MM-DD HH:MM:SS GMT`
    pub time: String,
    /// Latitude placeholder; this gateway carries no GPS
    pub lati: f64,
    /// Longitude placeholder
    pub long: f64,
    /// Altitude placeholder
    pub alti: i32,
    /// Radio frames received
    pub rxnb: u32,
    /// Radio frames received with a valid PHY CRC
    pub rxok: u32,
    /// Radio frames forwarded upstream
    pub rxfw: u32,
    /// Upstream acknowledgment ratio; reported as the static default,
    /// never recomputed from actual ack counts
    pub ackr: f64,
    /// Downlink requests received
    pub dwnb: u32,
    /// Downlink frames transmitted
    pub txnb: u32,
}

/// Received-frame payload, the `rxpk` array of a PUSH_DATA frame.
#[derive(Debug, Clone, Serialize)]
pub struct RxPacket {
    pub rxpk: Vec<RxFields>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RxFields {
    /// ISO-8601 UTC arrival time with fractional seconds
    pub time: String,
    /// Radio-clock timestamp of the reception, microseconds
    pub tmst: u32,
    /// Concentrator channel; a single-channel gateway always reports 0
    pub chan: u8,
    /// RF chain; always 0
    pub rfch: u8,
    /// Center frequency in MHz
    pub freq: f64,
    /// CRC status: 1 = OK
    pub stat: u8,
    pub modu: &'static str,
    /// Datarate string, e.g. `SF7BW125`
    pub datr: String,
    /// Coding rate string, e.g. `4/5`
    pub codr: &'static str,
    /// RSSI in dBm
    pub rssi: i16,
    /// SNR in dB
    pub lsnr: f32,
    /// Payload size in bytes
    pub size: usize,
    /// Payload, standard base64 without trailing newline
    pub data: String,
}

/// Downlink request payload, the `txpk` object of a PULL_RESP frame.
///
/// Only the fields this gateway consumes are bound; `tmst`, `datr`, `freq`
/// and `data` are required and their absence fails the decode.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRespPayload {
    pub txpk: TxFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxFields {
    /// Target radio-clock timestamp, microseconds, wraps at 2^32
    pub tmst: u32,
    /// Datarate string
    pub datr: String,
    /// Center frequency in MHz
    pub freq: f64,
    /// Payload, base64
    pub data: String,
}

/// The `txpk_ack` payload echoed for every PULL_RESP.
#[derive(Debug, Clone, Serialize)]
pub struct TxAckPacket {
    pub txpk_ack: TxAckFields,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxAckFields {
    pub error: &'static str,
}

/// Downlink scheduling outcome reported in a txpk_ack.
///
/// Only `None` and `TooLate` are produced by the scheduler; the remaining
/// values are reserved protocol codes for radio-reported conditions this
/// gateway does not model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAckError {
    None,
    TooLate,
    TooEarly,
    CollisionPacket,
    CollisionBeacon,
    TxFreq,
    TxPower,
    GpsUnlocked,
}

impl TxAckError {
    /// Wire-format error string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::TooLate => "TOO_LATE",
            Self::TooEarly => "TOO_EARLY",
            Self::CollisionPacket => "COLLISION_PACKET",
            Self::CollisionBeacon => "COLLISION_BEACON",
            Self::TxFreq => "TX_FREQ",
            Self::TxPower => "TX_POWER",
            Self::GpsUnlocked => "GPS_UNLOCKED",
        }
    }
}
