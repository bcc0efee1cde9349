//! # loragw-rs - A Rust Crate for Single-Channel LoRa Gateway Operation
//!
//! The loragw-rs crate bridges a LoRa radio to a LoRaWAN network server
//! over the Semtech Gateway Messaging Protocol (the UDP-based packet
//! forwarder protocol, v2). Received radio frames are forwarded upstream
//! as rxpk packets, queued downlinks are pulled from the server and
//! transmitted at a server-specified, microsecond-precise radio-clock
//! timestamp, and every downlink request is acknowledged.
//!
//! ## Features
//!
//! - Encode and decode packet forwarder frames (PUSH_DATA, PULL_DATA,
//!   PULL_RESP, acks) with their JSON payloads
//! - Forward received frames with reception metadata (RSSI, SNR, datarate)
//! - Schedule downlink transmissions against the wrapping 32-bit radio
//!   clock, with a spin-wait deadline for microsecond accuracy
//! - Periodic status push and keep-alive pull timers
//! - One shared UDP socket, serialized across the receive loop, the
//!   timers, and the radio event path
//! - Radio drivers plug in through the [`radio::Radio`] trait; a mock
//!   radio backs the test suite and hardware-free soak runs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loragw_rs::{Gateway, GatewayConfig, NoopNetwork};
//! use loragw_rs::radio::mock::MockRadio;
//!
//! # async fn run() -> Result<(), loragw_rs::GatewayError> {
//! let config = GatewayConfig {
//!     hardware_id: Some([0x24, 0x0A, 0xC4, 0x01, 0x02, 0x03]),
//!     ..GatewayConfig::default()
//! };
//! let (radio, events) = MockRadio::new();
//! let gateway = Gateway::start(config, radio.clone(), radio, events, &NoopNetwork).await?;
//! // ...
//! gateway.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod protocol;
pub mod radio;

pub use crate::error::GatewayError;
pub use crate::logging::{init_logger, log_info};

// Core gateway types
pub use gateway::{
    Counters, Gateway, GatewayConfig, GatewayEui, NetworkLink, NoopNetwork, Transport,
};

// Protocol layer
pub use protocol::{DownlinkRequest, FrameHeader, PacketKind, TxAckError};

// Radio abstraction
pub use radio::{Bandwidth, CodingRate, Datarate, Radio, RadioClock, RadioEvent, SpreadingFactor};
