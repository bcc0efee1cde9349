//! # Radio Driver Trait and Common Types
//!
//! This module defines the `Radio` trait that provides a common interface
//! for LoRa radio drivers used by the gateway. It abstracts the differences
//! between radio chips while providing a consistent API for the protocol
//! layer: PHY configuration, transmission, reception metadata, and the
//! wrapping microsecond radio clock that downlink scheduling is driven by.

use crate::error::GatewayError;
use crate::radio::params::{CodingRate, Datarate, SpreadingFactor};
use async_trait::async_trait;

/// PHY configuration applied before receiving or transmitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TxParams {
    /// Center frequency in Hz (e.g. 868_100_000)
    pub frequency_hz: u32,
    /// Spreading factor + bandwidth pair
    pub datarate: Datarate,
    /// Coding rate (4/5 for the packet forwarder protocol)
    pub coding_rate: CodingRate,
    /// Preamble length in symbols
    pub preamble_len: u16,
    /// Invert the IQ polarity (downlink transmissions toward nodes)
    pub iq_inverted: bool,
}

impl TxParams {
    /// Standard gateway parameters for the given channel: 8-symbol preamble,
    /// 4/5 coding rate, inverted IQ.
    pub fn for_channel(frequency_hz: u32, datarate: Datarate) -> Self {
        Self {
            frequency_hz,
            datarate,
            coding_rate: CodingRate::CR4_5,
            preamble_len: 8,
            iq_inverted: true,
        }
    }
}

/// Reception metadata sampled by the driver for the most recent frame.
#[derive(Debug, Clone, Copy)]
pub struct RxStats {
    /// Radio-clock timestamp of the reception, microseconds, wraps at 2^32
    pub timestamp: u32,
    pub spreading_factor: SpreadingFactor,
    /// RSSI in dBm
    pub rssi: i16,
    /// SNR in dB
    pub snr: f32,
}

/// The radio's free-running microsecond counter.
///
/// Wraps at 2^32 (roughly every 71.6 minutes); all comparisons against it
/// must use modular arithmetic. Kept separate from [`Radio`] so the downlink
/// deadline wait can be exercised against a clock alone.
pub trait RadioClock: Send + Sync {
    /// Current radio-clock value in microseconds.
    fn now_us(&self) -> u32;
}

/// Common driver trait for LoRa radios usable as a gateway PHY.
///
/// Implementations deliver receive/transmit-complete events over the channel
/// created at construction time (see [`crate::radio::events`]); the trait
/// itself covers the command direction only.
#[async_trait]
pub trait Radio: RadioClock + Send + Sync {
    /// Apply a PHY configuration. Called once at startup for the uplink
    /// channel and again around every downlink transmission.
    async fn configure(&self, params: TxParams) -> Result<(), GatewayError>;

    /// Transmit a raw frame. Returns once the frame has been handed to the
    /// modem; completion is signalled by a `TxDone` event.
    async fn transmit(&self, data: &[u8]) -> Result<(), GatewayError>;

    /// Reception metadata for the most recently received frame.
    fn last_rx_stats(&self) -> RxStats;
}
