//! # UDP Transport
//!
//! Owns the one socket shared with the network server. Sends from the
//! receive loop, the periodic timers, and the radio event path are
//! serialized under a single mutex so the socket never sees interleaved
//! writes. The receive loop polls non-blocking, one datagram per cycle,
//! and dispatches decoded frames.

use crate::constants::{UDP_POLL_INTERVAL_MS, UDP_RECV_BUF_LEN};
use crate::error::GatewayError;
use crate::gateway::downlink::DownlinkScheduler;
use crate::protocol::codec::{self, PacketKind};
use log::{debug, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

pub struct Transport {
    socket: UdpSocket,
    send_lock: Mutex<()>,
}

impl Transport {
    /// Resolve the server and open a connected, non-blocking UDP socket.
    pub async fn connect(server: &str, port: u16) -> Result<Self, GatewayError> {
        let addr: SocketAddr = lookup_host((server, port))
            .await?
            .next()
            .ok_or_else(|| GatewayError::Transport(format!("cannot resolve {server}:{port}")))?;

        info!("Opening UDP socket to {server} ({addr})");
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(addr).await?;

        Ok(Self {
            socket,
            send_lock: Mutex::new(()),
        })
    }

    /// Send one frame under the shared socket mutex.
    ///
    /// Every sender in the system goes through here; holding the permit for
    /// the duration of the write is the only synchronization the socket
    /// needs.
    pub async fn send(&self, frame: &[u8]) -> Result<(), GatewayError> {
        let _permit = self.send_lock.lock().await;
        self.socket.send(frame).await?;
        Ok(())
    }
}

/// Spawn the background receive loop.
///
/// One `try_recv` per cycle; would-block is a no-op, any other socket error
/// is logged and the loop continues. The loop observes `stop` within one
/// poll interval, so awaiting the returned handle after signalling is a
/// deterministic join.
pub fn spawn_recv_loop(
    transport: Arc<Transport>,
    downlink: Arc<DownlinkScheduler>,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = [0u8; UDP_RECV_BUF_LEN];
        loop {
            if *stop.borrow_and_update() {
                break;
            }

            match transport.socket.try_recv(&mut buf) {
                Ok(len) => handle_datagram(&buf[..len], &downlink).await,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => warn!("UDP receive error: {e}"),
            }

            tokio::time::sleep(Duration::from_millis(UDP_POLL_INTERVAL_MS)).await;
        }
        debug!("UDP receive loop stopped");
    })
}

async fn handle_datagram(datagram: &[u8], downlink: &DownlinkScheduler) {
    let header = match codec::decode_header(datagram) {
        Ok(header) => header,
        Err(e) => {
            warn!("Dropping inbound frame: {e}");
            return;
        }
    };

    match header.kind() {
        Some(PacketKind::PushAck) => debug!("Push ack, token 0x{:04x}", header.token),
        Some(PacketKind::PullAck) => debug!("Pull ack, token 0x{:04x}", header.token),
        Some(PacketKind::PullResp) => downlink.handle_pull_resp(datagram).await,
        Some(kind) => warn!("Unexpected {kind:?} frame from server"),
        None => warn!("Unknown message type from server: {}", header.kind_code),
    }
}
