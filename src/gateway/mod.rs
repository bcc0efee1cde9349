//! # Gateway Orchestrator
//!
//! Wires the transport, the uplink forwarder, the downlink scheduler, and
//! the periodic timers together, and consumes the radio event channel.
//!
//! Three contexts of execution share the outbound socket: the receive
//! loop, the periodic timers, and the radio event consumer. All of them
//! send through [`Transport::send`], whose mutex is the only
//! synchronization the socket needs.

pub mod config;
pub mod downlink;
pub mod net;
pub mod state;
pub mod transport;
pub mod uplink;

pub use config::{GatewayConfig, GatewayEui};
pub use downlink::{DeadlineWait, DownlinkScheduler, SpinWait};
pub use net::{NetworkLink, NoopNetwork};
pub use state::{CounterSnapshot, Counters};
pub use transport::Transport;
pub use uplink::UplinkForwarder;

use crate::constants::{PULL_PERIOD_SECS, STAT_PERIOD_SECS};
use crate::error::GatewayError;
use crate::protocol::codec;
use crate::radio::driver::{Radio, RadioClock, TxParams};
use crate::radio::events::RadioEvent;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// A running gateway session.
///
/// Created by [`Gateway::start`]; [`Gateway::stop`] cancels the periodic
/// timers and joins the receive loop. An already-armed downlink
/// deadline-wait is deliberately not cancelled on stop.
pub struct Gateway {
    counters: Arc<Counters>,
    stop_tx: watch::Sender<bool>,
    recv_task: JoinHandle<()>,
    stat_task: JoinHandle<()>,
    pull_task: JoinHandle<()>,
    event_task: JoinHandle<()>,
}

impl Gateway {
    /// Bring the gateway online: associate the network, sync the wall
    /// clock, open the server socket, push the first stat packet, start
    /// the timers and the receive loop, and configure the radio for the
    /// uplink channel.
    pub async fn start(
        config: GatewayConfig,
        radio: Arc<dyn Radio>,
        clock: Arc<dyn RadioClock>,
        events: mpsc::Receiver<RadioEvent>,
        network: &dyn NetworkLink,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let eui = config.resolve_eui()?;
        info!("Starting gateway with id {eui}");

        network.associate().await?;
        network.sync_clock(&config.ntp_server, config.ntp_period_secs).await?;

        let transport = Arc::new(Transport::connect(&config.server, config.port).await?);
        let counters = Arc::new(Counters::new());

        let uplink = Arc::new(UplinkForwarder::new(
            Arc::clone(&transport),
            Arc::clone(&counters),
            eui.bytes(),
            config.frequency_hz,
            config.datarate.bw,
        ));
        let downlink = Arc::new(DownlinkScheduler::new(
            Arc::clone(&radio),
            clock,
            Arc::clone(&transport),
            Arc::clone(&counters),
            eui.bytes(),
            Arc::new(SpinWait),
        ));

        // Push the first stat immediately so the server registers the
        // gateway without waiting out a timer period.
        uplink.push_stats().await;

        let stat_task = spawn_stat_timer(Arc::clone(&uplink));
        let pull_task = spawn_pull_timer(Arc::clone(&transport), eui);

        let (stop_tx, stop_rx) = watch::channel(false);
        let recv_task = transport::spawn_recv_loop(Arc::clone(&transport), downlink, stop_rx);

        let uplink_params = TxParams::for_channel(config.frequency_hz, config.datarate);
        radio.configure(uplink_params).await?;
        info!(
            "Listening on {} MHz using {}",
            uplink::freq_to_mhz(config.frequency_hz),
            config.datarate
        );

        let event_task = spawn_event_consumer(events, uplink, radio, uplink_params);
        info!("Gateway online");

        Ok(Self {
            counters,
            stop_tx,
            recv_task,
            stat_task,
            pull_task,
            event_task,
        })
    }

    /// Session counters, for status inspection.
    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    /// Stop the periodic timers and the receive loop. The receive loop is
    /// joined, so the socket is quiescent when this returns.
    pub async fn stop(self) {
        info!("Stopping gateway");
        self.stat_task.abort();
        self.pull_task.abort();
        self.event_task.abort();

        let _ = self.stop_tx.send(true);
        if self.recv_task.await.is_err() {
            warn!("Receive loop ended abnormally");
        }
        info!("Gateway stopped");
    }
}

fn spawn_stat_timer(uplink: Arc<UplinkForwarder>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(STAT_PERIOD_SECS);
        let mut ticks = interval_at(Instant::now() + period, period);
        loop {
            ticks.tick().await;
            uplink.push_stats().await;
        }
    })
}

fn spawn_pull_timer(transport: Arc<Transport>, eui: GatewayEui) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(PULL_PERIOD_SECS);
        let mut ticks = interval_at(Instant::now() + period, period);
        loop {
            ticks.tick().await;
            let (frame, _token) = codec::encode_pull_data(eui.bytes());
            if let Err(e) = transport.send(&frame).await {
                warn!("Failed to pull downlink packets from server: {e}");
            }
        }
    })
}

/// Consume radio events on the gateway's schedule. The driver side only
/// copies event data into the channel; everything heavier happens here.
fn spawn_event_consumer(
    mut events: mpsc::Receiver<RadioEvent>,
    uplink: Arc<UplinkForwarder>,
    radio: Arc<dyn Radio>,
    uplink_params: TxParams,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                RadioEvent::RxDone {
                    payload,
                    timestamp,
                    spreading_factor,
                    rssi,
                    snr,
                } => {
                    uplink
                        .handle_rx(payload, timestamp, spreading_factor, rssi, snr)
                        .await;
                }
                RadioEvent::TxDone => {
                    // Restore the uplink channel after a downlink went out.
                    debug!("Re-initing radio after transmission");
                    if let Err(e) = radio.configure(uplink_params).await {
                        warn!("Radio re-init after transmission failed: {e}");
                    }
                }
            }
        }
        debug!("Radio event channel closed");
    })
}
