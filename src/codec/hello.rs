// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HELLO: the same wire shape as RREP, with `dest_addr` set to the
//! sender's own address, `dest_seq` the sender's sequence, and `lifetime`
//! the configured HELLO lifetime. Never forwarded, never acked.

use super::rrep::{Rrep, RrepFlags};
use crate::addr::Address;
use crate::error::Result;

/// A HELLO is a [`Rrep`] announcing the sender's own presence
pub type Hello = Rrep;

/// Build a HELLO payload
pub fn build(sender: Address, sender_seq: u32, lifetime: u32) -> Hello {
    Rrep {
        dest_addr: sender,
        orig_addr: sender,
        dest_seq: sender_seq,
        flags: RrepFlags::default(),
        hop_count: 0,
        lifetime,
    }
}

/// Decode a HELLO (identical wire shape to RREP)
pub fn parse(raw: &[u8]) -> Result<Hello> {
    Rrep::unpack(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_round_trips_as_rrep() {
        let h = build(Address([1; 8]), 5, 9000);
        let raw = h.pack();
        let decoded = parse(&raw).unwrap();
        assert_eq!(decoded, h);
        assert_eq!(decoded.dest_addr, decoded.orig_addr);
    }
}
