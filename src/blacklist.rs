// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Temporary blacklist of peers flooding excessive RREQs (`BLACKLIST_TIMEOUT`)

use crate::addr::Address;
use crate::time::{Expirable, Expiry, Tick};

struct BadNode {
    addr: Address,
    expirable: Expirable<()>,
}

/// Bounded set of temporarily-ignored peer addresses
pub struct Blacklist<const N: usize> {
    entries: heapless::Vec<BadNode, N>,
    lifetime: Tick,
}

impl<const N: usize> Blacklist<N> {
    /// Create an empty blacklist with the given timeout
    pub fn new(lifetime: Tick) -> Self {
        Self {
            entries: heapless::Vec::new(),
            lifetime,
        }
    }

    /// Blacklist `addr` starting now. Re-blacklisting resets the timer.
    pub fn add(&mut self, addr: Address, now: Tick) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.addr == addr) {
            entry.expirable.reset(now, Some(self.lifetime));
            return;
        }

        let entry = BadNode {
            addr,
            expirable: Expirable::new(now, self.lifetime, 0, None),
        };
        if self.entries.push(entry).is_err() {
            if let Some((idx, _)) = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.expirable.remaining(now))
            {
                self.entries[idx] = BadNode {
                    addr,
                    expirable: Expirable::new(now, self.lifetime, 0, None),
                };
            }
        }
    }

    /// `true` if `addr` is currently blacklisted
    pub fn contains(&self, addr: Address) -> bool {
        self.entries.iter().any(|e| e.addr == addr)
    }

    /// Drop every entry whose timer expired
    pub fn tick(&mut self, now: Tick) {
        let mut i = 0;
        while i < self.entries.len() {
            match self.entries[i].expirable.update(now) {
                Expiry::Alive => i += 1,
                Expiry::Died | Expiry::Fire(()) => {
                    self.entries.swap_remove(i);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address([b; 8])
    }

    #[test]
    fn added_node_is_blacklisted() {
        let mut b: Blacklist<4> = Blacklist::new(100);
        b.add(addr(1), 0);
        assert!(b.contains(addr(1)));
        assert!(!b.contains(addr(2)));
    }

    #[test]
    fn blacklist_expires() {
        let mut b: Blacklist<4> = Blacklist::new(50);
        b.add(addr(1), 0);
        b.tick(50);
        assert!(!b.contains(addr(1)));
    }

    #[test]
    fn re_adding_resets_timer() {
        let mut b: Blacklist<4> = Blacklist::new(50);
        b.add(addr(1), 0);
        b.add(addr(1), 40);
        b.tick(50); // only 10 ticks since reset, should still be alive
        assert!(b.contains(addr(1)));
    }
}
