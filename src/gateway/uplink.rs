//! # Uplink Forwarder
//!
//! Builds the stat and rxpk JSON payloads and pushes them to the server as
//! PUSH_DATA frames. Packet builders are pure functions over fresh values;
//! they can run concurrently across radio events without shared state.

use crate::gateway::state::{Counters, CounterSnapshot};
use crate::gateway::transport::Transport;
use crate::protocol::codec;
use crate::protocol::packets::{RxFields, RxPacket, StatFields, StatPacket};
use crate::radio::params::{Bandwidth, Datarate, SpreadingFactor};
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use std::sync::Arc;

/// One received radio frame plus its reception metadata. Built per radio
/// event and consumed immediately; not retained.
#[derive(Debug, Clone)]
pub struct UplinkFrame {
    pub payload: Vec<u8>,
    /// Radio-clock timestamp of the reception, microseconds
    pub timestamp: u32,
    /// Wall-clock arrival time
    pub received_at: DateTime<Utc>,
    pub datarate: Datarate,
    pub rssi: i16,
    pub snr: f32,
}

/// Render an integer Hz value in MHz without floating-point precision loss.
///
/// Large Hz values (nine digits) lose precision when divided directly in
/// floating point. Integer-divide by ten while the value stays evenly
/// divisible, and only convert the remainder with a float division at the
/// final step.
pub fn freq_to_mhz(hz: u32) -> f64 {
    let mut value = hz;
    let mut divider = 6u32;
    while divider > 0 && value % 10 == 0 {
        value /= 10;
        divider -= 1;
    }
    if divider > 0 {
        f64::from(value) / f64::from(10u32.pow(divider))
    } else {
        f64::from(value)
    }
}

/// Build the `stat` JSON payload from a counter snapshot.
///
/// The position fields are static placeholders (no GPS on this gateway)
/// and `ackr` stays at the protocol default of 100.0 regardless of the
/// actual acknowledgment history.
pub fn build_stat_packet(counters: &CounterSnapshot, at: DateTime<Utc>) -> Vec<u8> {
    let packet = StatPacket {
        stat: StatFields {
            time: at.format("%Y-%m-%d %H:%M:%S GMT").to_string(),
            lati: 0.0,
            long: 0.0,
            alti: 0,
            rxnb: counters.received,
            rxok: counters.received_ok,
            rxfw: counters.forwarded,
            ackr: 100.0,
            dwnb: counters.downlinks_received,
            txnb: counters.transmitted,
        },
    };
    serde_json::to_vec(&packet).unwrap_or_default()
}

/// Build the single-entry `rxpk` JSON payload for a received frame.
pub fn build_rx_packet(frame: &UplinkFrame, frequency_hz: u32) -> Vec<u8> {
    let packet = RxPacket {
        rxpk: vec![RxFields {
            time: frame
                .received_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            tmst: frame.timestamp,
            chan: 0,
            rfch: 0,
            freq: freq_to_mhz(frequency_hz),
            stat: 1,
            modu: "LORA",
            datr: frame.datarate.to_string(),
            codr: "4/5",
            rssi: frame.rssi,
            lsnr: frame.snr,
            size: frame.payload.len(),
            data: base64::engine::general_purpose::STANDARD.encode(&frame.payload),
        }],
    };
    serde_json::to_vec(&packet).unwrap_or_default()
}

/// Forwards received frames and periodic status upstream.
pub struct UplinkForwarder {
    transport: Arc<Transport>,
    counters: Arc<Counters>,
    eui: [u8; 8],
    /// Uplink channel frequency reported in rxpk packets
    frequency_hz: u32,
    /// Uplink channel bandwidth; combined with the per-frame spreading
    /// factor to form the reported datarate
    bandwidth: Bandwidth,
}

impl UplinkForwarder {
    pub fn new(
        transport: Arc<Transport>,
        counters: Arc<Counters>,
        eui: [u8; 8],
        frequency_hz: u32,
        bandwidth: Bandwidth,
    ) -> Self {
        Self {
            transport,
            counters,
            eui,
            frequency_hz,
            bandwidth,
        }
    }

    /// Wrap a JSON payload in a PUSH_DATA frame and send it. Failures are
    /// logged and swallowed; uplink pushes are never retried.
    pub async fn push(&self, json: &[u8]) {
        let (frame, _token) = codec::encode_push_data(self.eui, json);
        if let Err(e) = self.transport.send(&frame).await {
            warn!("Failed to push uplink packet to server: {e}");
        }
    }

    /// Push a stat packet reflecting the counters as of now.
    pub async fn push_stats(&self) {
        let json = build_stat_packet(&self.counters.snapshot(), Utc::now());
        self.push(&json).await;
    }

    /// Forward one received radio frame upstream.
    pub async fn handle_rx(
        &self,
        payload: Vec<u8>,
        timestamp: u32,
        spreading_factor: SpreadingFactor,
        rssi: i16,
        snr: f32,
    ) {
        self.counters.incr_received();
        self.counters.incr_received_ok();

        let frame = UplinkFrame {
            payload,
            timestamp,
            received_at: Utc::now(),
            datarate: Datarate::new(spreading_factor, self.bandwidth),
            rssi,
            snr,
        };
        debug!(
            "Received packet: {} bytes, tmst {}, {} dBm",
            frame.payload.len(),
            frame.timestamp,
            frame.rssi
        );

        let json = build_rx_packet(&frame, self.frequency_hz);
        self.push(&json).await;
        self.counters.incr_forwarded();
    }
}
