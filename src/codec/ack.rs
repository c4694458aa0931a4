// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ACK payload: `orig_seq[4] · data_seq[4]`

use crate::error::{Error, Result};

/// Wire length of an encoded ACK payload
pub const ACK_LEN: usize = 8;

/// Explicit acknowledgment payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Sequence of the acking node at the time it sent the ACK
    pub orig_seq: u32,
    /// Sequence of the DATA being acknowledged
    pub data_seq: u32,
}

impl Ack {
    /// Encode to a fixed `ACK_LEN`-byte array
    pub fn pack(&self) -> [u8; ACK_LEN] {
        let mut buf = [0u8; ACK_LEN];
        buf[0..4].copy_from_slice(&self.orig_seq.to_be_bytes());
        buf[4..8].copy_from_slice(&self.data_seq.to_be_bytes());
        buf
    }

    /// Decode from a byte slice of at least `ACK_LEN` bytes
    pub fn unpack(raw: &[u8]) -> Result<Self> {
        if raw.len() < ACK_LEN {
            return Err(Error::BadLen);
        }
        Ok(Self {
            orig_seq: u32::from_be_bytes(raw[0..4].try_into().unwrap()),
            data_seq: u32::from_be_bytes(raw[4..8].try_into().unwrap()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trip() {
        let a = Ack { orig_seq: 7, data_seq: 42 };
        let raw = a.pack();
        assert_eq!(Ack::unpack(&raw).unwrap(), a);
    }

    #[test]
    fn short_buffer_is_bad_len() {
        assert_eq!(Ack::unpack(&[0u8; 3]), Err(Error::BadLen));
    }
}
