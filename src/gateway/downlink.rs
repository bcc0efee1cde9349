//! # Downlink Scheduler
//!
//! Validates PULL_RESP requests against the wrapping 32-bit radio clock,
//! arms the transmission, and answers every request with a txpk_ack.
//!
//! A request moves Received -> {Scheduled | Rejected} -> Acked. The arming
//! delay is `tmst - now - TX_LOOKAHEAD_US` in modulo-2^32 arithmetic; a
//! delay at or beyond `SCHEDULE_HORIZON_US` is rejected as TOO_LATE. An
//! armed transmission sleeps most of the delay, reconfigures the radio for
//! the requested channel, then busy-waits the final stretch to hit the
//! target timestamp with microsecond precision (the radio clock has no
//! hardware transmit-at-time register).
//!
//! The ack for a request is sent once the schedule/reject decision is
//! final; it is not ordered against the physical transmission, and a radio
//! failure after the ack is logged only. Escalation (e.g. a radio restart)
//! is left to the embedder.

use crate::constants::{SCHEDULE_HORIZON_US, TX_GUARD_US, TX_LOOKAHEAD_US};
use crate::gateway::state::Counters;
use crate::gateway::transport::Transport;
use crate::gateway::uplink::freq_to_mhz;
use crate::protocol::codec::{self, DownlinkRequest};
use crate::protocol::packets::TxAckError;
use crate::radio::driver::{Radio, RadioClock, TxParams};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Microseconds until `tmst` on the wrapping radio clock, less the fixed
/// lookahead. Wrapping arithmetic keeps the result in `[0, 2^32)`.
pub fn schedule_delta(tmst: u32, now_us: u32) -> u32 {
    tmst.wrapping_sub(now_us).wrapping_sub(TX_LOOKAHEAD_US)
}

/// The scheduling decision is a pure function of the corrected delta.
pub fn classify_delta(delta: u32) -> TxAckError {
    if delta < SCHEDULE_HORIZON_US {
        TxAckError::None
    } else {
        TxAckError::TooLate
    }
}

/// Blocks the calling thread until the radio clock reaches a target.
///
/// Isolated behind a trait so a platform with a hardware transmit-at-time
/// register can substitute a non-spinning implementation without touching
/// the protocol logic.
pub trait DeadlineWait: Send + Sync {
    fn wait_until(&self, clock: &dyn RadioClock, target_us: u32);
}

/// Tight spin on the radio clock. Trades CPU for the microsecond accuracy
/// coarse timer APIs cannot give; always run on a dedicated blocking
/// thread.
pub struct SpinWait;

impl DeadlineWait for SpinWait {
    fn wait_until(&self, clock: &dyn RadioClock, target_us: u32) {
        // Signed modular compare: exits as soon as the clock passes the
        // target, including across a wrap.
        while (target_us.wrapping_sub(clock.now_us()) as i32) > 0 {
            std::hint::spin_loop();
        }
    }
}

pub struct DownlinkScheduler {
    radio: Arc<dyn Radio>,
    clock: Arc<dyn RadioClock>,
    transport: Arc<Transport>,
    counters: Arc<Counters>,
    eui: [u8; 8],
    deadline: Arc<dyn DeadlineWait>,
    /// The single pending transmission slot; arming replaces (and aborts)
    /// whatever occupied it
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DownlinkScheduler {
    pub fn new(
        radio: Arc<dyn Radio>,
        clock: Arc<dyn RadioClock>,
        transport: Arc<Transport>,
        counters: Arc<Counters>,
        eui: [u8; 8],
        deadline: Arc<dyn DeadlineWait>,
    ) -> Self {
        Self {
            radio,
            clock,
            transport,
            counters,
            eui,
            deadline,
            pending: Mutex::new(None),
        }
    }

    /// Handle one PULL_RESP datagram end to end: decode, decide, arm, ack.
    pub async fn handle_pull_resp(&self, datagram: &[u8]) {
        let request = match codec::decode_pull_resp(datagram) {
            Ok(request) => request,
            Err(e) => {
                warn!("Dropping pull response: {e}");
                return;
            }
        };
        self.counters.incr_downlinks_received();

        let delta = schedule_delta(request.tmst, self.clock.now_us());
        let outcome = classify_delta(delta);
        let token = request.token;

        match outcome {
            TxAckError::None => self.arm(request, delta).await,
            _ => warn!(
                "Downlink timestamp outside schedule horizon, delta_us: {delta}"
            ),
        }

        // Always acked, scheduled or not; the ack may precede the actual
        // radio send.
        let ack = codec::encode_tx_ack(self.eui, token, outcome);
        if let Err(e) = self.transport.send(&ack).await {
            warn!("Failed to ack pull response: {e}");
        }
    }

    /// Arm the one-shot transmission task, replacing a pending one.
    async fn arm(&self, request: DownlinkRequest, delta: u32) {
        let radio = Arc::clone(&self.radio);
        let clock = Arc::clone(&self.clock);
        let deadline = Arc::clone(&self.deadline);
        let counters = Arc::clone(&self.counters);

        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_micros(u64::from(delta))).await;
            fire(radio, clock, deadline, counters, request).await;
        });

        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.replace(task) {
            if !previous.is_finished() {
                debug!("Replacing a pending downlink transmission");
                previous.abort();
            }
        }
    }
}

/// Reconfigure, wait out the guard window, transmit.
///
/// Failures are report-only; the ack went out when the schedule decision
/// was made and is never retracted.
async fn fire(
    radio: Arc<dyn Radio>,
    clock: Arc<dyn RadioClock>,
    deadline: Arc<dyn DeadlineWait>,
    counters: Arc<Counters>,
    request: DownlinkRequest,
) {
    let params = TxParams::for_channel(request.frequency_hz, request.datarate);
    if let Err(e) = radio.configure(params).await {
        error!("Radio reconfiguration for downlink failed: {e}");
        return;
    }

    let target = request.tmst.wrapping_sub(TX_GUARD_US);
    let wait_result = tokio::task::spawn_blocking(move || {
        deadline.wait_until(clock.as_ref(), target);
    })
    .await;
    if wait_result.is_err() {
        error!("Downlink deadline wait was interrupted");
        return;
    }

    match radio.transmit(&request.payload).await {
        Ok(()) => {
            counters.incr_transmitted();
            info!(
                "Sent downlink packet scheduled for {:.3}s at {} MHz using {}",
                f64::from(request.tmst) / 1_000_000.0,
                freq_to_mhz(request.frequency_hz),
                request.datarate
            );
        }
        Err(e) => error!("Downlink radio send failed: {e}"),
    }
}
