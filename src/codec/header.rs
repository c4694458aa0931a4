// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Frame header: 24-byte big-endian header plus payload, Fletcher-16 checksummed

use super::fletcher16;
use crate::addr::Address;
use crate::error::{Error, Result};

/// Maximum total frame size
pub const FRAME_MAX_LEN: usize = 255;
/// Fixed header size
pub const HEADER_LEN: usize = 24;
/// Maximum payload size (`FRAME_MAX_LEN - HEADER_LEN`)
pub const PAYLOAD_MAX_LEN: usize = FRAME_MAX_LEN - HEADER_LEN;
/// Byte offset of the checksum field within the frame
const CHECKSUM_OFFSET: usize = 20;
/// `DATA` payload's own 20-byte sub-header (dest_addr, orig_addr, orig_seq)
pub const DATA_HEADER_LEN: usize = 20;
/// Largest DATA fragment payload, once the datagram sub-header is subtracted
pub const DATA_PAYLOAD_MAX_LEN: usize = PAYLOAD_MAX_LEN - DATA_HEADER_LEN;

/// Control packet type tag (offset 16)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// Unrecognized type tag
    Unknown = 0,
    /// Route request
    Rreq = 1,
    /// Route reply
    Rrep = 2,
    /// Route error
    Rerr = 3,
    /// Neighbor presence announcement
    Hello = 4,
    /// Application datagram
    Data = 5,
    /// Explicit acknowledgment
    Ack = 6,
}

impl PacketType {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => PacketType::Rreq,
            2 => PacketType::Rrep,
            3 => PacketType::Rerr,
            4 => PacketType::Hello,
            5 => PacketType::Data,
            6 => PacketType::Ack,
            _ => PacketType::Unknown,
        }
    }
}

/// Fixed-capacity payload buffer backing a parsed or to-be-sent frame
pub type PayloadBuf = heapless::Vec<u8, PAYLOAD_MAX_LEN>;

/// A parsed frame: header fields plus owned payload bytes
#[derive(Debug, Clone)]
pub struct Packet {
    /// Sender of this hop
    pub send_addr: Address,
    /// Recipient of this hop (may be broadcast)
    pub recv_addr: Address,
    /// Control type
    pub ptype: PacketType,
    /// Hops traversed so far
    pub hops: u8,
    /// Remaining time-to-live
    pub ttl: u8,
    /// Link quality of the hop that delivered this frame (host-supplied)
    pub rssi: i16,
    /// Link quality of the hop that delivered this frame (host-supplied)
    pub snr: i16,
    /// Raw payload bytes
    pub payload: PayloadBuf,
}

/// Pack a frame into `buf`, writing header then payload and filling in the
/// Fletcher-16 checksum. Returns the total frame length.
pub fn pack_frame(
    ptype: PacketType,
    send_addr: Address,
    recv_addr: Address,
    payload: &[u8],
    ttl: u8,
    hops: u8,
    buf: &mut [u8],
) -> Result<usize> {
    let total = HEADER_LEN + payload.len();
    if payload.len() > PAYLOAD_MAX_LEN || total > FRAME_MAX_LEN || buf.len() < total {
        return Err(Error::BufferTooSmall);
    }

    buf[0..8].copy_from_slice(send_addr.as_bytes());
    buf[8..16].copy_from_slice(recv_addr.as_bytes());
    buf[16] = ptype as u8;
    buf[17] = hops;
    buf[18] = ttl;
    buf[19] = payload.len() as u8;
    buf[20] = 0;
    buf[21] = 0;
    buf[22] = 0;
    buf[23] = 0;
    buf[HEADER_LEN..total].copy_from_slice(payload);

    let checksum = fletcher16::compute(&buf[..total]);
    buf[CHECKSUM_OFFSET] = (checksum >> 8) as u8;
    buf[CHECKSUM_OFFSET + 1] = (checksum & 0xFF) as u8;

    Ok(total)
}

/// Parse a received frame, validating length and checksum
pub fn parse_frame(raw: &[u8], rssi: i16, snr: i16) -> Result<Packet> {
    if raw.len() < HEADER_LEN || raw.len() > FRAME_MAX_LEN {
        return Err(Error::BadLen);
    }

    let payload_len = raw[19] as usize;
    if raw.len() != HEADER_LEN + payload_len {
        return Err(Error::BadLen);
    }

    let mut unchecksummed = [0u8; FRAME_MAX_LEN];
    unchecksummed[..raw.len()].copy_from_slice(raw);
    unchecksummed[CHECKSUM_OFFSET] = 0;
    unchecksummed[CHECKSUM_OFFSET + 1] = 0;

    let checksum = ((raw[CHECKSUM_OFFSET] as u16) << 8) | (raw[CHECKSUM_OFFSET + 1] as u16);
    if checksum != fletcher16::compute(&unchecksummed[..raw.len()]) {
        return Err(Error::BadCrc);
    }

    let mut send = [0u8; 8];
    send.copy_from_slice(&raw[0..8]);
    let mut recv = [0u8; 8];
    recv.copy_from_slice(&raw[8..16]);

    let mut payload = PayloadBuf::new();
    payload
        .extend_from_slice(&raw[HEADER_LEN..])
        .map_err(|_| Error::BadLen)?;

    Ok(Packet {
        send_addr: Address(send),
        recv_addr: Address(recv),
        ptype: PacketType::from_u8(raw[16]),
        hops: raw[17],
        ttl: raw[18],
        rssi,
        snr,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address([b; 8])
    }

    #[test]
    fn pack_then_parse_round_trips() {
        let mut buf = [0u8; FRAME_MAX_LEN];
        let payload = [1, 2, 3, 4, 5];
        let len = pack_frame(PacketType::Rreq, addr(1), addr(2), &payload, 5, 1, &mut buf).unwrap();

        let p = parse_frame(&buf[..len], -70, 10).unwrap();
        assert_eq!(p.send_addr, addr(1));
        assert_eq!(p.recv_addr, addr(2));
        assert!(matches!(p.ptype, PacketType::Rreq));
        assert_eq!(p.hops, 1);
        assert_eq!(p.ttl, 5);
        assert_eq!(&p.payload[..], &payload);
    }

    #[test]
    fn single_byte_mutation_outside_checksum_breaks_crc() {
        let mut buf = [0u8; FRAME_MAX_LEN];
        let len = pack_frame(PacketType::Data, addr(1), addr(2), &[9, 9, 9], 2, 0, &mut buf).unwrap();
        buf[0] ^= 0xFF; // mutate send_addr, well outside the checksum bytes
        assert!(matches!(parse_frame(&buf[..len], 0, 0), Err(Error::BadCrc)));
    }

    #[test]
    fn short_header_is_bad_len() {
        let buf = [0u8; 10];
        assert!(matches!(parse_frame(&buf, 0, 0), Err(Error::BadLen)));
    }

    #[test]
    fn mismatched_payload_len_is_bad_len() {
        let mut buf = [0u8; FRAME_MAX_LEN];
        let len = pack_frame(PacketType::Data, addr(1), addr(2), &[1, 2, 3], 2, 0, &mut buf).unwrap();
        // truncate by one byte: payload_len field still claims 3 bytes
        assert!(matches!(parse_frame(&buf[..len - 1], 0, 0), Err(Error::BadLen)));
    }

    #[test]
    fn oversized_payload_is_rejected_on_pack() {
        let mut buf = [0u8; FRAME_MAX_LEN];
        let big = [0u8; PAYLOAD_MAX_LEN + 1];
        assert_eq!(
            pack_frame(PacketType::Data, addr(1), addr(2), &big, 1, 0, &mut buf),
            Err(Error::BufferTooSmall)
        );
    }
}
