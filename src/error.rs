// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the mesh routing engine

use core::fmt;

/// Result type for engine operations
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for the mesh routing engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Frame shorter than the header, payload length mismatch, or frame exceeds 255 bytes
    BadLen,

    /// Fletcher-16 checksum did not match
    BadCrc,

    /// Buffer too small for operation
    BufferTooSmall,

    /// A bounded table or mailbox is full
    QueueFull,

    /// No valid route and destination is not an active neighbor
    UnroutableData,

    /// Neighbor repair attempts exhausted
    NeighborLost,

    /// Invalid or out-of-range parameter
    InvalidParameter,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadLen => write!(f, "frame length invalid"),
            Error::BadCrc => write!(f, "frame checksum mismatch"),
            Error::BufferTooSmall => write!(f, "buffer too small"),
            Error::QueueFull => write!(f, "queue full"),
            Error::UnroutableData => write!(f, "no route to destination"),
            Error::NeighborLost => write!(f, "neighbor repair exhausted"),
            Error::InvalidParameter => write!(f, "invalid parameter"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
