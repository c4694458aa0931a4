// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bit-exact wire codec: frame header, Fletcher-16 checksum, and the five
//! payload kinds (RREQ, RREP, RERR, ACK, DATA). HELLO reuses the RREP wire
//! shape verbatim (see [`hello`]).

pub mod ack;
pub mod data;
pub mod fletcher16;
pub mod header;
pub mod hello;
pub mod rerr;
pub mod rreq;
pub mod rrep;

pub use ack::{Ack, ACK_LEN};
pub use data::Data;
pub use header::{pack_frame, parse_frame, Packet, PacketType, DATA_PAYLOAD_MAX_LEN, FRAME_MAX_LEN, PAYLOAD_MAX_LEN};
pub use hello::Hello;
pub use rerr::{Rerr, RerrDest, RERR_MAX_DESTS};
pub use rreq::{Rreq, RreqFlags, RREQ_LEN};
pub use rrep::{Rrep, RrepFlags, RREP_LEN};
