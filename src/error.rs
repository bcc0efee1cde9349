//! # Gateway Error Handling
//!
//! This module defines the GatewayError enum, which represents the different
//! error types that can occur in the loragw-rs crate.

use thiserror::Error;

/// Represents the different error types that can occur in the gateway crate.
///
/// The gateway runs report-and-continue: none of these are fatal after
/// startup. Malformed inbound frames are dropped, transport failures abandon
/// the operation in progress, and a missed downlink deadline is surfaced to
/// the server as a TOO_LATE ack rather than an error value.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Indicates an inbound datagram shorter than the protocol header.
    #[error("Malformed frame: shorter than the 4-byte header")]
    MalformedFrame,

    /// Indicates a frame whose JSON payload is absent, malformed, or missing
    /// required fields.
    #[error("Error decoding frame payload: {0}")]
    PayloadDecode(String),

    /// Indicates a UDP send/receive failure other than would-block.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Indicates a radio configure/transmit failure.
    #[error("Radio error: {0}")]
    Radio(String),

    /// Indicates an unusable gateway configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Indicates a datarate string that is not of the SFnBWm form.
    #[error("Invalid datarate: {0}")]
    InvalidDatarate(String),

    /// Indicates a gateway EUI that is not 16 hexadecimal characters.
    #[error("Invalid gateway EUI: {0}")]
    InvalidEui(String),

    /// Indicates a network association or time-sync failure at startup.
    #[error("Network link error: {0}")]
    NetworkLink(String),
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}
