//! Unit tests for the protocol codec: header round-trips, ack payloads,
//! and PULL_RESP decoding through the public API.

use loragw_rs::constants::{GATEWAY_EUI_LEN, HEADER_LEN, PROTOCOL_VERSION, PULL_RESP};
use loragw_rs::protocol::codec::{
    decode_header, decode_pull_resp, encode_pull_data, encode_push_data, encode_tx_ack, PacketKind,
};
use loragw_rs::{GatewayError, TxAckError};
use proptest::prelude::*;

const EUI: [u8; 8] = [0x24, 0x0A, 0xC4, 0xFF, 0xFE, 0x01, 0x02, 0x03];

/// Tests that an encoded PUSH_DATA frame decodes back to its own header.
#[test]
fn test_push_data_decodes_to_own_header() {
    let json = br#"{"rxpk":[]}"#;
    let (frame, token) = encode_push_data(EUI, json);

    let header = decode_header(&frame).unwrap();
    assert_eq!(header.version, PROTOCOL_VERSION);
    assert_eq!(header.token, token);
    assert_eq!(header.kind(), Some(PacketKind::PushData));
}

/// Tests that a PULL_DATA frame is exactly header + EUI.
#[test]
fn test_pull_data_layout() {
    let (frame, token) = encode_pull_data(EUI);
    assert_eq!(frame.len(), HEADER_LEN + GATEWAY_EUI_LEN);
    assert_eq!(frame[0], PROTOCOL_VERSION);
    assert_eq!(u16::from_be_bytes([frame[1], frame[2]]), token);
    assert_eq!(&frame[HEADER_LEN..], &EUI);
}

/// Tests that the txpk_ack carries each ack error's wire string.
#[test]
fn test_tx_ack_wire_strings() {
    let cases = [
        (TxAckError::None, "NONE"),
        (TxAckError::TooLate, "TOO_LATE"),
        (TxAckError::TooEarly, "TOO_EARLY"),
        (TxAckError::CollisionPacket, "COLLISION_PACKET"),
        (TxAckError::CollisionBeacon, "COLLISION_BEACON"),
        (TxAckError::TxFreq, "TX_FREQ"),
        (TxAckError::TxPower, "TX_POWER"),
        (TxAckError::GpsUnlocked, "GPS_UNLOCKED"),
    ];
    for (error, expected) in cases {
        let frame = encode_tx_ack(EUI, 7, error);
        let json: serde_json::Value =
            serde_json::from_slice(&frame[HEADER_LEN + GATEWAY_EUI_LEN..]).unwrap();
        assert_eq!(json["txpk_ack"]["error"], expected);
    }
}

/// Tests that a realistic network-server PULL_RESP decodes fully.
#[test]
fn test_decode_pull_resp_realistic() {
    let json = r#"{"txpk":{"imme":false,"tmst":3926784356,"freq":869.525,"rfch":0,"powe":14,"modu":"LORA","datr":"SF12BW125","codr":"4/5","ipol":true,"size":16,"data":"YHcQASaqAQADBwLqNA0K1w=="}}"#;
    let mut frame = vec![PROTOCOL_VERSION, 0xAB, 0xCD, PULL_RESP];
    frame.extend_from_slice(json.as_bytes());

    let request = decode_pull_resp(&frame).unwrap();
    assert_eq!(request.token, 0xABCD);
    assert_eq!(request.tmst, 3_926_784_356);
    assert_eq!(request.frequency_hz, 869_525_000);
    assert_eq!(request.datarate.to_string(), "SF12BW125");
    assert_eq!(request.payload.len(), 16);
}

/// Tests that truncated input surfaces as a malformed frame, not a panic.
#[test]
fn test_short_input_is_malformed() {
    assert!(matches!(
        decode_header(&[PROTOCOL_VERSION, 0x00]),
        Err(GatewayError::MalformedFrame)
    ));
    assert!(matches!(
        decode_pull_resp(&[PROTOCOL_VERSION]),
        Err(GatewayError::MalformedFrame)
    ));
}

proptest! {
    /// Any 4-byte-or-longer input decodes to the header its first four
    /// bytes spell, whatever the remainder contains.
    #[test]
    fn prop_header_decode_matches_layout(
        version in any::<u8>(),
        token in any::<u16>(),
        kind_code in any::<u8>(),
        tail in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut frame = vec![version, (token >> 8) as u8, token as u8, kind_code];
        frame.extend_from_slice(&tail);

        let header = decode_header(&frame).unwrap();
        prop_assert_eq!(header.version, version);
        prop_assert_eq!(header.token, token);
        prop_assert_eq!(header.kind_code, kind_code);
    }
}
