//! # Network/Time Collaborator Boundary
//!
//! Association with the network and wall-clock synchronization happen once
//! at startup and are not part of the protocol core. The trait keeps the
//! gateway portable across hosts that manage connectivity themselves and
//! embedded targets that must bring a link up first.

use crate::error::GatewayError;
use async_trait::async_trait;
use log::debug;

#[async_trait]
pub trait NetworkLink: Send + Sync {
    /// Block until the host is associated with a network.
    async fn associate(&self) -> Result<(), GatewayError>;

    /// Block until the wall clock is synchronized against `server`,
    /// resyncing every `period_secs` thereafter.
    async fn sync_clock(&self, server: &str, period_secs: u64) -> Result<(), GatewayError>;
}

/// For hosts whose operating system already manages connectivity and NTP.
pub struct NoopNetwork;

#[async_trait]
impl NetworkLink for NoopNetwork {
    async fn associate(&self) -> Result<(), GatewayError> {
        debug!("Network association delegated to the host");
        Ok(())
    }

    async fn sync_clock(&self, server: &str, period_secs: u64) -> Result<(), GatewayError> {
        debug!("Clock sync delegated to the host (would use {server} every {period_secs}s)");
        Ok(())
    }
}
