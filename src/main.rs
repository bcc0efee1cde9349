use anyhow::Context;
use clap::Parser;
use loragw_rs::radio::mock::MockRadio;
use loragw_rs::{init_logger, Datarate, Gateway, GatewayConfig, GatewayEui, NoopNetwork};
use log::warn;

#[derive(Parser)]
#[command(name = "loragw-cli")]
#[command(about = "Single-channel LoRa gateway for the Semtech UDP packet forwarder protocol")]
struct Cli {
    /// Explicit gateway EUI, 16 hex characters
    #[arg(long)]
    eui: Option<String>,

    /// 6-byte hardware unique id (12 hex characters) the EUI is derived from
    #[arg(long)]
    hardware_id: Option<String>,

    /// Network server hostname
    #[arg(long, default_value = "router.eu.thethings.network")]
    server: String,

    /// Network server UDP port
    #[arg(long, default_value_t = 1700)]
    port: u16,

    /// Uplink frequency in Hz
    #[arg(long, default_value_t = 868_100_000)]
    frequency: u32,

    /// Uplink datarate, e.g. SF7BW125
    #[arg(long, default_value = "SF7BW125")]
    datarate: String,

    /// NTP server for the startup time sync
    #[arg(long, default_value = "pool.ntp.org")]
    ntp_server: String,

    /// NTP resync period in seconds
    #[arg(long, default_value_t = 3600)]
    ntp_period: u64,
}

fn parse_hardware_id(s: &str) -> anyhow::Result<[u8; 6]> {
    let bytes = hex::decode(s).context("hardware id is not valid hex")?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("hardware id must be exactly 6 bytes"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();
    let config = GatewayConfig {
        eui: cli.eui.as_deref().map(GatewayEui::from_hex).transpose()?,
        hardware_id: cli.hardware_id.as_deref().map(parse_hardware_id).transpose()?,
        server: cli.server,
        port: cli.port,
        frequency_hz: cli.frequency,
        datarate: cli.datarate.parse::<Datarate>()?,
        ntp_server: cli.ntp_server,
        ntp_period_secs: cli.ntp_period,
    };

    // No hardware driver is wired in yet; the mock radio lets the protocol
    // path soak against a real server.
    warn!("Running with the mock radio; no frames will leave the antenna");
    let (radio, events) = MockRadio::new();

    let gateway = Gateway::start(config, radio.clone(), radio, events, &NoopNetwork)
        .await
        .context("gateway startup failed")?;

    tokio::signal::ctrl_c().await.context("signal handling failed")?;
    gateway.stop().await;
    Ok(())
}
