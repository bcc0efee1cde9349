//! Semtech Gateway Messaging Protocol Constants
//!
//! This module defines constants used in the gateway messaging protocol
//! implementation, based on the Semtech packet forwarder protocol v2.

/// Protocol version carried in every frame header
pub const PROTOCOL_VERSION: u8 = 2;

// ----------------------------------------------------------------------------
// Packet type codes (upstream and downstream)
// ----------------------------------------------------------------------------

/// Gateway -> server: forwarded radio frame or gateway status
pub const PUSH_DATA: u8 = 0x00;

/// Server -> gateway: acknowledges a PUSH_DATA
pub const PUSH_ACK: u8 = 0x01;

/// Gateway -> server: keep-alive / downlink readiness signal
pub const PULL_DATA: u8 = 0x02;

/// Server -> gateway: downlink transmission request
pub const PULL_RESP: u8 = 0x03;

/// Acknowledge code shared by the server's PULL_DATA ack and the
/// gateway's PULL_RESP ack (txpk_ack payload)
pub const PULL_ACK: u8 = 0x04;

/// Frame header length: version(1) + token(2) + type(1)
pub const HEADER_LEN: usize = 4;

/// Gateway EUI length in bytes
pub const GATEWAY_EUI_LEN: usize = 8;

// ----------------------------------------------------------------------------
// Downlink scheduling
// ----------------------------------------------------------------------------

/// Fixed processing + antenna latency subtracted from the downlink target
/// timestamp when computing the arming delay, in microseconds
pub const TX_LOOKAHEAD_US: u32 = 12_500;

/// Downlink requests whose wrap-corrected delay reaches this horizon are
/// rejected as TOO_LATE, in microseconds
pub const SCHEDULE_HORIZON_US: u32 = 20_000_000;

/// Spin-wait guard before the target radio-clock timestamp, in microseconds
pub const TX_GUARD_US: u32 = 50;

// ----------------------------------------------------------------------------
// Timing
// ----------------------------------------------------------------------------

/// Pause between UDP receive poll cycles, in milliseconds
pub const UDP_POLL_INTERVAL_MS: u64 = 10;

/// Period of the gateway status (stat) push, in seconds
pub const STAT_PERIOD_SECS: u64 = 60;

/// Period of the keep-alive PULL_DATA; must stay below the server/NAT idle
/// timeout, in seconds
pub const PULL_PERIOD_SECS: u64 = 25;

/// Largest datagram the receive loop accepts from the server
pub const UDP_RECV_BUF_LEN: usize = 1024;
