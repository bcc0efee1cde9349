//! # Gateway Messaging Protocol Codec
//!
//! Encodes and decodes the binary frames exchanged with the network server:
//! a 4-byte header (version, random token, packet type), optionally followed
//! by the 8-byte gateway EUI and a JSON payload.
//!
//! ```text
//! ┌─────────┐ ┌───────────┐ ┌──────┐ ┌─────────────┐ ┌──────────────┐
//! │ Version │ │   Token   │ │ Type │ │ Gateway EUI │ │ JSON payload │
//! │ (1 B)   │ │ (2 B, BE) │ │ (1 B)│ │ (8 B, opt.) │ │ (optional)   │
//! └─────────┘ └───────────┘ └──────┘ └─────────────┘ └──────────────┘
//! ```

use crate::constants::{
    GATEWAY_EUI_LEN, HEADER_LEN, PROTOCOL_VERSION, PULL_ACK, PULL_DATA, PULL_RESP, PUSH_ACK,
    PUSH_DATA,
};
use crate::error::GatewayError;
use crate::protocol::packets::{PullRespPayload, TxAckError, TxAckFields, TxAckPacket};
use crate::radio::params::Datarate;
use base64::Engine;
use bytes::{BufMut, BytesMut};
use nom::number::complete::{be_u16, be_u8};
use nom::IResult;
use rand::Rng;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    pub token: u16,
    /// Raw packet type code; see [`FrameHeader::kind`]
    pub kind_code: u8,
}

/// Known packet types of the messaging protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    PushData,
    PushAck,
    PullData,
    PullResp,
    PullAck,
}

impl PacketKind {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            PUSH_DATA => Some(Self::PushData),
            PUSH_ACK => Some(Self::PushAck),
            PULL_DATA => Some(Self::PullData),
            PULL_RESP => Some(Self::PullResp),
            PULL_ACK => Some(Self::PullAck),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::PushData => PUSH_DATA,
            Self::PushAck => PUSH_ACK,
            Self::PullData => PULL_DATA,
            Self::PullResp => PULL_RESP,
            Self::PullAck => PULL_ACK,
        }
    }
}

impl FrameHeader {
    /// Packet type, if the code is a known one.
    pub fn kind(&self) -> Option<PacketKind> {
        PacketKind::from_code(self.kind_code)
    }
}

/// A downlink transmission request parsed from a PULL_RESP frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DownlinkRequest {
    /// Token echoed in the txpk_ack
    pub token: u16,
    /// Target radio-clock timestamp, microseconds, wraps at 2^32
    pub tmst: u32,
    pub datarate: Datarate,
    pub frequency_hz: u32,
    pub payload: Vec<u8>,
}

fn parse_header(input: &[u8]) -> IResult<&[u8], FrameHeader> {
    let (input, version) = be_u8(input)?;
    let (input, token) = be_u16(input)?;
    let (input, kind_code) = be_u8(input)?;
    Ok((
        input,
        FrameHeader {
            version,
            token,
            kind_code,
        },
    ))
}

/// Uses the `nom` crate to parse a frame header from a byte slice.
///
/// The version byte is carried through undisputed; dispatching on unknown
/// type codes is the receive loop's concern.
pub fn decode_header(input: &[u8]) -> Result<FrameHeader, GatewayError> {
    let (_, header) = parse_header(input).map_err(|_| GatewayError::MalformedFrame)?;
    Ok(header)
}

fn fresh_token() -> u16 {
    rand::thread_rng().gen()
}

fn frame_with_eui(token: u16, kind: PacketKind, eui: [u8; GATEWAY_EUI_LEN]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + GATEWAY_EUI_LEN);
    buf.put_u8(PROTOCOL_VERSION);
    buf.put_u16(token);
    buf.put_u8(kind.code());
    buf.put_slice(&eui);
    buf
}

/// Encode a PUSH_DATA frame carrying a JSON payload (stat or rxpk).
///
/// Returns the frame and the fresh random token it carries. Tokens are not
/// tracked against later acknowledgments.
pub fn encode_push_data(eui: [u8; GATEWAY_EUI_LEN], json: &[u8]) -> (Vec<u8>, u16) {
    let token = fresh_token();
    let mut buf = frame_with_eui(token, PacketKind::PushData, eui);
    buf.put_slice(json);
    (buf.to_vec(), token)
}

/// Encode a keep-alive PULL_DATA frame (no payload).
pub fn encode_pull_data(eui: [u8; GATEWAY_EUI_LEN]) -> (Vec<u8>, u16) {
    let token = fresh_token();
    let buf = frame_with_eui(token, PacketKind::PullData, eui);
    (buf.to_vec(), token)
}

/// Encode the txpk_ack answering a PULL_RESP, echoing its token.
pub fn encode_tx_ack(eui: [u8; GATEWAY_EUI_LEN], token: u16, error: TxAckError) -> Vec<u8> {
    let ack = TxAckPacket {
        txpk_ack: TxAckFields {
            error: error.as_str(),
        },
    };
    // Serializing a struct of plain fields cannot fail.
    let json = serde_json::to_vec(&ack).unwrap_or_default();
    let mut buf = frame_with_eui(token, PacketKind::PullAck, eui);
    buf.put_slice(&json);
    buf.to_vec()
}

/// Decode a PULL_RESP datagram into a [`DownlinkRequest`].
///
/// The header token is captured for the later ack; the JSON payload must
/// carry `tmst`, `datr`, `freq` and `data`.
pub fn decode_pull_resp(datagram: &[u8]) -> Result<DownlinkRequest, GatewayError> {
    let header = decode_header(datagram)?;
    let body = &datagram[HEADER_LEN..];

    let payload: PullRespPayload = serde_json::from_slice(body)
        .map_err(|e| GatewayError::PayloadDecode(e.to_string()))?;
    let txpk = payload.txpk;

    let datarate: Datarate = txpk
        .datr
        .parse()
        .map_err(|_| GatewayError::PayloadDecode(format!("bad datr field: {}", txpk.datr)))?;
    let data = base64::engine::general_purpose::STANDARD
        .decode(txpk.data.as_bytes())
        .map_err(|e| GatewayError::PayloadDecode(format!("bad data field: {e}")))?;

    Ok(DownlinkRequest {
        token: header.token,
        tmst: txpk.tmst,
        datarate,
        frequency_hz: (txpk.freq * 1_000_000.0).round() as u32,
        payload: data,
    })
}
