//! # Radio Event Queue Types
//!
//! Radio drivers deliver receive/transmit-complete events over a bounded
//! `tokio::sync::mpsc` channel. The driver side (interrupt-like context)
//! only copies event data and enqueues; the gateway consumes events on its
//! own schedule.

use crate::radio::params::SpreadingFactor;
use tokio::sync::mpsc;

/// Default depth of the radio event channel
pub const EVENT_QUEUE_DEPTH: usize = 32;

/// Events emitted by a radio driver
#[derive(Debug, Clone)]
pub enum RadioEvent {
    /// A radio frame was received. Carries the payload and the reception
    /// metadata sampled at interrupt time.
    RxDone {
        payload: Vec<u8>,
        /// Radio-clock timestamp of the reception, microseconds, wraps at 2^32
        timestamp: u32,
        spreading_factor: SpreadingFactor,
        rssi: i16,
        snr: f32,
    },

    /// A transmission completed.
    TxDone,
}

/// Create the radio event channel shared between a driver and the gateway.
pub fn event_channel() -> (mpsc::Sender<RadioEvent>, mpsc::Receiver<RadioEvent>) {
    mpsc::channel(EVENT_QUEUE_DEPTH)
}
