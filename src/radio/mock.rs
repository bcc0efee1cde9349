//! Mock radio implementation for testing
//!
//! This module provides a mock radio that can be used to test the gateway
//! protocol engine without requiring actual hardware. The radio clock is
//! advanced manually, received frames are injected through the event
//! channel, and every configure/transmit call is recorded for inspection.

use crate::error::GatewayError;
use crate::radio::driver::{Radio, RadioClock, RxStats, TxParams};
use crate::radio::events::{event_channel, RadioEvent};
use crate::radio::params::SpreadingFactor;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Mock radio driver with a manually driven clock.
pub struct MockRadio {
    /// Radio-clock value returned by `now_us`
    clock_us: AtomicU32,
    /// Every configuration applied, in order
    pub configured: Mutex<Vec<TxParams>>,
    /// Every frame transmitted, in order
    pub transmitted: Mutex<Vec<Vec<u8>>>,
    /// Reception metadata returned by `last_rx_stats`
    pub rx_stats: Mutex<RxStats>,
    /// When set, configure/transmit fail with a radio error
    pub fail_radio: AtomicBool,
    events: mpsc::Sender<RadioEvent>,
}

impl MockRadio {
    /// Create a mock radio and the event receiver the gateway consumes.
    pub fn new() -> (Arc<Self>, mpsc::Receiver<RadioEvent>) {
        let (tx, rx) = event_channel();
        let radio = Arc::new(Self {
            clock_us: AtomicU32::new(0),
            configured: Mutex::new(Vec::new()),
            transmitted: Mutex::new(Vec::new()),
            rx_stats: Mutex::new(RxStats {
                timestamp: 0,
                spreading_factor: SpreadingFactor::SF7,
                rssi: -100,
                snr: 0.0,
            }),
            fail_radio: AtomicBool::new(false),
            events: tx,
        });
        (radio, rx)
    }

    /// Set the radio clock to an absolute value.
    pub fn set_clock_us(&self, value: u32) {
        self.clock_us.store(value, Ordering::SeqCst);
    }

    /// Advance the radio clock, wrapping at 2^32.
    pub fn advance_clock_us(&self, delta: u32) {
        self.clock_us.fetch_add(delta, Ordering::SeqCst);
    }

    /// Inject a received frame: records the stats and emits an `RxDone`
    /// event as a driver interrupt would.
    pub fn inject_rx(&self, payload: &[u8], stats: RxStats) {
        *self.rx_stats.lock().unwrap() = stats;
        let event = RadioEvent::RxDone {
            payload: payload.to_vec(),
            timestamp: stats.timestamp,
            spreading_factor: stats.spreading_factor,
            rssi: stats.rssi,
            snr: stats.snr,
        };
        // A full queue drops the event, as a real interrupt handler would.
        let _ = self.events.try_send(event);
    }

    /// Frames transmitted so far.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.transmitted.lock().unwrap().clone()
    }

    /// Configurations applied so far.
    pub fn applied_configs(&self) -> Vec<TxParams> {
        self.configured.lock().unwrap().clone()
    }
}

impl RadioClock for MockRadio {
    fn now_us(&self) -> u32 {
        self.clock_us.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Radio for MockRadio {
    async fn configure(&self, params: TxParams) -> Result<(), GatewayError> {
        if self.fail_radio.load(Ordering::SeqCst) {
            return Err(GatewayError::Radio("mock configure failure".into()));
        }
        self.configured.lock().unwrap().push(params);
        Ok(())
    }

    async fn transmit(&self, data: &[u8]) -> Result<(), GatewayError> {
        if self.fail_radio.load(Ordering::SeqCst) {
            return Err(GatewayError::Radio("mock transmit failure".into()));
        }
        self.transmitted.lock().unwrap().push(data.to_vec());
        let _ = self.events.try_send(RadioEvent::TxDone);
        Ok(())
    }

    fn last_rx_stats(&self) -> RxStats {
        *self.rx_stats.lock().unwrap()
    }
}
