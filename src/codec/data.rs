// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DATA payload: `dest_addr[8] · orig_addr[8] · orig_seq[4] · data[variable]`

use super::header::{DATA_HEADER_LEN, DATA_PAYLOAD_MAX_LEN};
use crate::addr::Address;
use crate::error::{Error, Result};

/// Application datagram, ASCII payload bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    /// Final destination
    pub dest_addr: Address,
    /// Original source
    pub orig_addr: Address,
    /// Originator's sequence number for this fragment
    pub orig_seq: u32,
    /// Payload bytes
    pub data: heapless::Vec<u8, DATA_PAYLOAD_MAX_LEN>,
}

impl Data {
    /// Encoded length in bytes
    pub fn encoded_len(&self) -> usize {
        DATA_HEADER_LEN + self.data.len()
    }

    /// Encode into `buf`, returning the number of bytes written
    pub fn pack(&self, buf: &mut [u8]) -> Result<usize> {
        let len = self.encoded_len();
        if buf.len() < len {
            return Err(Error::BufferTooSmall);
        }
        buf[0..8].copy_from_slice(self.dest_addr.as_bytes());
        buf[8..16].copy_from_slice(self.orig_addr.as_bytes());
        buf[16..20].copy_from_slice(&self.orig_seq.to_be_bytes());
        buf[20..len].copy_from_slice(&self.data);
        Ok(len)
    }

    /// Decode from a byte slice
    pub fn unpack(raw: &[u8]) -> Result<Self> {
        if raw.len() < DATA_HEADER_LEN {
            return Err(Error::BadLen);
        }
        let body = &raw[DATA_HEADER_LEN..];
        let mut data = heapless::Vec::new();
        data.extend_from_slice(body).map_err(|_| Error::BadLen)?;

        Ok(Self {
            dest_addr: Address::conform(&raw[0..8]),
            orig_addr: Address::conform(&raw[8..16]),
            orig_seq: u32::from_be_bytes(raw[16..20].try_into().unwrap()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trip() {
        let mut data = heapless::Vec::new();
        data.extend_from_slice(b"hi").unwrap();
        let d = Data {
            dest_addr: Address([2; 8]),
            orig_addr: Address([1; 8]),
            orig_seq: 1,
            data,
        };
        let mut buf = [0u8; 64];
        let len = d.pack(&mut buf).unwrap();
        assert_eq!(len, DATA_HEADER_LEN + 2);
        assert_eq!(Data::unpack(&buf[..len]).unwrap(), d);
    }

    #[test]
    fn short_buffer_is_bad_len() {
        assert_eq!(Data::unpack(&[0u8; 5]), Err(Error::BadLen));
    }
}
