//! Tests for the downlink scheduler: wraparound arithmetic, the
//! accept/reject policy, and the arm/fire/ack path against a mock radio
//! and a loopback UDP server.

use loragw_rs::constants::{PROTOCOL_VERSION, PULL_ACK, PULL_RESP, SCHEDULE_HORIZON_US};
use loragw_rs::gateway::downlink::{classify_delta, schedule_delta, DownlinkScheduler, SpinWait};
use loragw_rs::gateway::state::Counters;
use loragw_rs::gateway::Transport;
use loragw_rs::radio::mock::MockRadio;
use loragw_rs::TxAckError;
use proptest::prelude::*;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

const EUI: [u8; 8] = [0x24, 0x0A, 0xC4, 0xFF, 0xFE, 0x01, 0x02, 0x03];

/// The delay is computed ahead of the lookahead compensation.
#[test]
fn test_delta_ahead_of_clock() {
    assert_eq!(schedule_delta(5_000_000, 1_000_000), 3_987_500);
    assert_eq!(classify_delta(3_987_500), TxAckError::None);
}

/// A target behind the clock wraps into the 32-bit domain and lands
/// beyond the horizon.
#[test]
fn test_delta_wraps_behind_clock() {
    let delta = schedule_delta(2_000, 4_000_000_000);
    assert_eq!(delta, 294_956_796);
    assert_eq!(classify_delta(delta), TxAckError::TooLate);
}

/// The decision flips exactly at the horizon.
#[test]
fn test_decision_is_pure_in_delta() {
    assert_eq!(classify_delta(0), TxAckError::None);
    assert_eq!(classify_delta(SCHEDULE_HORIZON_US - 1), TxAckError::None);
    assert_eq!(classify_delta(SCHEDULE_HORIZON_US), TxAckError::TooLate);
    assert_eq!(classify_delta(u32::MAX), TxAckError::TooLate);
}

proptest! {
    /// For any tmst/clock pair the corrected delta equals the modulo-2^32
    /// reference computed in wide arithmetic; it is a u32 by construction,
    /// never negative.
    #[test]
    fn prop_delta_matches_modular_reference(tmst in any::<u32>(), now in any::<u32>()) {
        let delta = schedule_delta(tmst, now);
        let reference = (i64::from(tmst) - i64::from(now) - 12_500).rem_euclid(1i64 << 32);
        prop_assert_eq!(i64::from(delta), reference);
    }

    /// The schedule decision depends on nothing but the delta.
    #[test]
    fn prop_decision_from_delta_alone(delta in any::<u32>()) {
        let expected = if delta < SCHEDULE_HORIZON_US {
            TxAckError::None
        } else {
            TxAckError::TooLate
        };
        prop_assert_eq!(classify_delta(delta), expected);
    }
}

// ---------------------------------------------------------------------------
// Arm/fire/ack path
// ---------------------------------------------------------------------------

async fn bind_server() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

async fn recv_frame(server: &UdpSocket) -> Vec<u8> {
    let mut buf = [0u8; 1024];
    let (len, _) = timeout(Duration::from_secs(2), server.recv_from(&mut buf))
        .await
        .expect("no frame within 2s")
        .unwrap();
    buf[..len].to_vec()
}

fn pull_resp(token: u16, tmst: u32, data_b64: &str) -> Vec<u8> {
    let json = format!(
        r#"{{"txpk":{{"tmst":{tmst},"freq":869.525,"modu":"LORA","datr":"SF9BW125","codr":"4/5","ipol":true,"data":"{data_b64}"}}}}"#
    );
    let mut frame = vec![PROTOCOL_VERSION, (token >> 8) as u8, token as u8, PULL_RESP];
    frame.extend_from_slice(json.as_bytes());
    frame
}

struct Fixture {
    radio: Arc<MockRadio>,
    scheduler: DownlinkScheduler,
    counters: Arc<Counters>,
    server: UdpSocket,
}

async fn fixture() -> Fixture {
    let (server, addr) = bind_server().await;
    let transport = Arc::new(Transport::connect("127.0.0.1", addr.port()).await.unwrap());
    let counters = Arc::new(Counters::new());
    let (radio, _events) = MockRadio::new();
    let scheduler = DownlinkScheduler::new(
        radio.clone(),
        radio.clone(),
        transport,
        Arc::clone(&counters),
        EUI,
        Arc::new(SpinWait),
    );
    Fixture {
        radio,
        scheduler,
        counters,
        server,
    }
}

async fn wait_for_tx(radio: &MockRadio) -> Vec<Vec<u8>> {
    timeout(Duration::from_secs(2), async {
        loop {
            let sent = radio.sent_frames();
            if !sent.is_empty() {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("no transmission within 2s")
}

/// A request inside the horizon is acked NONE, the radio is reconfigured
/// for the requested channel, and the payload leaves once the clock
/// reaches the target.
#[tokio::test]
async fn test_scheduled_request_fires_and_acks_none() {
    let f = fixture().await;
    f.radio.set_clock_us(1_000_000);

    // 30 ms ahead: 17.5 ms of timer sleep, the rest spin-waited
    f.scheduler
        .handle_pull_resp(&pull_resp(0x0101, 1_030_000, "AQID"))
        .await;

    let ack = recv_frame(&f.server).await;
    assert_eq!(ack[3], PULL_ACK);
    assert_eq!(u16::from_be_bytes([ack[1], ack[2]]), 0x0101);
    let ack_json: serde_json::Value = serde_json::from_slice(&ack[12..]).unwrap();
    assert_eq!(ack_json["txpk_ack"]["error"], "NONE");

    // Let the armed task reach the spin, then move the clock past the target.
    tokio::time::sleep(Duration::from_millis(50)).await;
    f.radio.set_clock_us(1_031_000);

    let sent = wait_for_tx(&f.radio).await;
    assert_eq!(sent, vec![vec![1, 2, 3]]);
    let configs = f.radio.applied_configs();
    assert_eq!(configs.last().unwrap().frequency_hz, 869_525_000);
    assert!(configs.last().unwrap().iq_inverted);

    let snap = f.counters.snapshot();
    assert_eq!(snap.downlinks_received, 1);
    assert_eq!(snap.transmitted, 1);
}

/// A request beyond the horizon is acked TOO_LATE and nothing is armed,
/// but it still counts as a received downlink.
#[tokio::test]
async fn test_rejected_request_acks_too_late() {
    let f = fixture().await;
    f.radio.set_clock_us(4_000_000_000);

    f.scheduler
        .handle_pull_resp(&pull_resp(0x0202, 2_000, "AQID"))
        .await;

    let ack = recv_frame(&f.server).await;
    assert_eq!(ack[3], PULL_ACK);
    assert_eq!(u16::from_be_bytes([ack[1], ack[2]]), 0x0202);
    let ack_json: serde_json::Value = serde_json::from_slice(&ack[12..]).unwrap();
    assert_eq!(ack_json["txpk_ack"]["error"], "TOO_LATE");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(f.radio.sent_frames().is_empty());
    let snap = f.counters.snapshot();
    assert_eq!(snap.downlinks_received, 1);
    assert_eq!(snap.transmitted, 0);
}

/// A malformed PULL_RESP is dropped: no ack, no counter movement.
#[tokio::test]
async fn test_malformed_pull_resp_is_dropped() {
    let f = fixture().await;
    f.radio.set_clock_us(1_000_000);

    let mut frame = vec![PROTOCOL_VERSION, 0x03, 0x03, PULL_RESP];
    frame.extend_from_slice(br#"{"txpk":{"freq":869.525}}"#);
    f.scheduler.handle_pull_resp(&frame).await;

    let mut buf = [0u8; 64];
    let got_ack = timeout(Duration::from_millis(100), f.server.recv_from(&mut buf)).await;
    assert!(got_ack.is_err(), "malformed frame must not be acked");
    assert_eq!(f.counters.snapshot().downlinks_received, 0);
}

/// Arming a second request replaces the first: the first never fires.
#[tokio::test]
async fn test_replacing_a_pending_transmission() {
    let f = fixture().await;
    f.radio.set_clock_us(1_000_000);

    // Far-off request sits in its timer sleep (~5 s)
    f.scheduler
        .handle_pull_resp(&pull_resp(0x0A0A, 6_000_000, "b2xk"))
        .await;
    let _first_ack = recv_frame(&f.server).await;

    // Near request replaces it
    f.scheduler
        .handle_pull_resp(&pull_resp(0x0B0B, 1_030_000, "bmV3"))
        .await;
    let _second_ack = recv_frame(&f.server).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    f.radio.set_clock_us(7_000_000);

    let sent = wait_for_tx(&f.radio).await;
    assert_eq!(sent, vec![b"new".to_vec()]);
    assert_eq!(f.counters.snapshot().transmitted, 1);
}

/// A radio failure after the ack is swallowed; the ack already said NONE.
#[tokio::test]
async fn test_radio_failure_after_ack_is_report_only() {
    let f = fixture().await;
    f.radio.set_clock_us(1_000_000);
    f.radio
        .fail_radio
        .store(true, std::sync::atomic::Ordering::SeqCst);

    f.scheduler
        .handle_pull_resp(&pull_resp(0x0C0C, 1_030_000, "AQID"))
        .await;

    let ack = recv_frame(&f.server).await;
    let ack_json: serde_json::Value = serde_json::from_slice(&ack[12..]).unwrap();
    assert_eq!(ack_json["txpk_ack"]["error"], "NONE");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(f.radio.sent_frames().is_empty());
    assert_eq!(f.counters.snapshot().transmitted, 0);
}
