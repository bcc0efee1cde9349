//! Binary frame codec and JSON payload schemas for the Semtech gateway
//! messaging protocol (UDP packet forwarder, v2).

pub mod codec;
pub mod packets;

pub use codec::{
    decode_header, decode_pull_resp, encode_pull_data, encode_push_data, encode_tx_ack,
    DownlinkRequest, FrameHeader, PacketKind,
};
pub use packets::TxAckError;
