// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outbound data queued while a route is being discovered (`DATA_QUEUE_TIMEOUT`)

use crate::addr::Address;
use crate::codec::DATA_PAYLOAD_MAX_LEN;
use crate::time::{Expirable, Expiry, Tick};

/// One queued outbound payload awaiting a route
pub struct QueuedData {
    /// Final destination
    pub dest_addr: Address,
    /// Payload bytes, already fragment-sized
    pub payload: heapless::Vec<u8, DATA_PAYLOAD_MAX_LEN>,
    expirable: Expirable<()>,
}

/// Bounded FIFO of data queued behind in-flight route discovery
pub struct DataQueue<const N: usize> {
    entries: heapless::Deque<QueuedData, N>,
    lifetime: Tick,
}

impl<const N: usize> DataQueue<N> {
    /// Create an empty queue with the given timeout
    pub fn new(lifetime: Tick) -> Self {
        Self {
            entries: heapless::Deque::new(),
            lifetime,
        }
    }

    /// Queue `payload` for `dest_addr`. Returns `Err(payload)` back if the
    /// queue is full.
    #[allow(clippy::result_large_err)]
    pub fn push(
        &mut self,
        dest_addr: Address,
        payload: heapless::Vec<u8, DATA_PAYLOAD_MAX_LEN>,
        now: Tick,
    ) -> Result<(), heapless::Vec<u8, DATA_PAYLOAD_MAX_LEN>> {
        let item = QueuedData {
            dest_addr,
            payload,
            expirable: Expirable::new(now, self.lifetime, 0, None),
        };
        self.entries.push_back(item).map_err(|item| item.payload)
    }

    /// Pop and return every queued item whose destination satisfies `is_ready`
    /// (typically "has a valid route or active neighbor now"), preserving the
    /// relative FIFO order of both the taken and the left-behind items.
    pub fn take_ready<F: FnMut(Address) -> bool>(&mut self, mut is_ready: F) -> heapless::Vec<QueuedData, N> {
        let mut taken = heapless::Vec::new();
        let mut remaining: heapless::Deque<QueuedData, N> = heapless::Deque::new();
        while let Some(item) = self.entries.pop_front() {
            if is_ready(item.dest_addr) {
                let _ = taken.push(item);
            } else {
                let _ = remaining.push_back(item);
            }
        }
        self.entries = remaining;
        taken
    }

    /// Drop every entry whose timer expired
    pub fn tick(&mut self, now: Tick) {
        let mut remaining: heapless::Deque<QueuedData, N> = heapless::Deque::new();
        while let Some(mut item) = self.entries.pop_front() {
            if matches!(item.expirable.update(now), Expiry::Alive) {
                let _ = remaining.push_back(item);
            }
        }
        self.entries = remaining;
    }

    /// `true` if there is nothing queued
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address([b; 8])
    }

    fn payload(bytes: &[u8]) -> heapless::Vec<u8, DATA_PAYLOAD_MAX_LEN> {
        heapless::Vec::from_slice(bytes).unwrap()
    }

    #[test]
    fn take_ready_returns_only_matching_destination_in_order() {
        let mut q: DataQueue<8> = DataQueue::new(100);
        q.push(addr(1), payload(b"a"), 0).unwrap();
        q.push(addr(2), payload(b"b"), 0).unwrap();
        q.push(addr(1), payload(b"c"), 0).unwrap();

        let out = q.take_ready(|dest| dest == addr(1));

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].payload.as_slice(), b"a");
        assert_eq!(out[1].payload.as_slice(), b"c");
        assert!(!q.is_empty()); // addr(2)'s entry remains
    }

    #[test]
    fn expired_entries_are_dropped_on_tick() {
        let mut q: DataQueue<8> = DataQueue::new(50);
        q.push(addr(1), payload(b"a"), 0).unwrap();
        q.tick(50);
        assert!(q.is_empty());
    }

    #[test]
    fn push_fails_when_full() {
        let mut q: DataQueue<1> = DataQueue::new(100);
        q.push(addr(1), payload(b"a"), 0).unwrap();
        assert!(q.push(addr(2), payload(b"b"), 0).is_err());
    }
}
