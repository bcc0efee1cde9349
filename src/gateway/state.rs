//! # Gateway Session Counters
//!
//! Lifetime counters reported in the periodic stat packet. Mutated from the
//! radio event path and the downlink path, read from the periodic stats
//! path, so each counter is an atomic. Counters only ever increase; there
//! is no reset during a session.

use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Default)]
pub struct Counters {
    received: AtomicU32,
    received_ok: AtomicU32,
    forwarded: AtomicU32,
    downlinks_received: AtomicU32,
    transmitted: AtomicU32,
}

/// A point-in-time copy of the counters, used to build one stat packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub received: u32,
    pub received_ok: u32,
    pub forwarded: u32,
    pub downlinks_received: u32,
    pub transmitted: u32,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// A radio frame arrived.
    pub fn incr_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// A radio frame arrived with a valid PHY CRC.
    pub fn incr_received_ok(&self) {
        self.received_ok.fetch_add(1, Ordering::Relaxed);
    }

    /// An uplink packet was pushed to the server.
    pub fn incr_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// A downlink request was decoded.
    pub fn incr_downlinks_received(&self) {
        self.downlinks_received.fetch_add(1, Ordering::Relaxed);
    }

    /// A downlink frame left the radio.
    pub fn incr_transmitted(&self) {
        self.transmitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            received: self.received.load(Ordering::Relaxed),
            received_ok: self.received_ok.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            downlinks_received: self.downlinks_received.load(Ordering::Relaxed),
            transmitted: self.transmitted.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment_independently() {
        let counters = Counters::new();
        counters.incr_received();
        counters.incr_received();
        counters.incr_received_ok();
        counters.incr_transmitted();

        let snap = counters.snapshot();
        assert_eq!(snap.received, 2);
        assert_eq!(snap.received_ok, 1);
        assert_eq!(snap.forwarded, 0);
        assert_eq!(snap.downlinks_received, 0);
        assert_eq!(snap.transmitted, 1);
    }
}
