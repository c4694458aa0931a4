// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Protocol timing and sizing configuration, RFC 3561 defaults

use crate::time::Tick;

/// All tunable protocol parameters. `Copy` so it can be embedded in [`crate::node::Node`]
/// without lifetime ceremony.
#[derive(Debug, Clone, Copy)]
pub struct NodeConfig {
    /// How long a route stays valid after last use
    pub active_route_timeout: Tick,
    /// How long a route *we originated* stays valid after last use
    pub my_route_timeout: Tick,
    /// Grace period before a fully-expired route is evicted rather than kept as a placeholder
    pub inactive_route_timeout: Tick,
    /// Upper bound on network diameter, in hops
    pub net_diameter: u8,
    /// Upper bound on one-way packet traversal time across the whole network
    pub net_traversal_time: Tick,
    /// Approximate time to traverse one hop, including MAC/queueing delay
    pub node_traversal_time: Tick,
    /// How long an RREQ stays in the duplicate-suppression cache
    pub path_discovery_time: Tick,
    /// How long DATA queued behind an in-flight route discovery is kept
    pub data_queue_timeout: Tick,
    /// How long a forwarded DATA waits for a passive ack before its next hop is suspected broken
    pub passive_ack_timeout: Tick,
    /// How long a flooding peer is ignored after exceeding `max_recent_rreqs`
    pub blacklist_timeout: Tick,
    /// Period between unsolicited HELLO broadcasts
    pub hello_interval: Tick,
    /// Lifetime advertised inside a HELLO
    pub hello_lifetime: Tick,
    /// RREQ retransmission attempts before giving up on a destination
    pub rreq_retries: u8,
    /// HELLO-loss retries before a neighbor is declared gone
    pub neighbor_max_repairs: u8,
    /// Inbound frame mailbox depth
    pub packet_inbox_sz: usize,
    /// Outbound frame mailbox depth
    pub packet_outbox_sz: usize,
    /// Outstanding concurrent RREQs tolerated from a single originator before blacklisting
    pub max_recent_rreqs: usize,
}

impl NodeConfig {
    /// RFC 3561 §10 standard defaults, scaled to milliseconds.
    ///
    /// `node_config.py` (the original's tuning file) is absent from this
    /// pack, so these are the protocol's own published defaults rather than
    /// a port of project-local values.
    pub const fn rfc3561_defaults() -> Self {
        const NODE_TRAVERSAL_TIME: Tick = 40;
        const NET_DIAMETER: u8 = 35;
        // NET_TRAVERSAL_TIME = 2 * NODE_TRAVERSAL_TIME * NET_DIAMETER
        const NET_TRAVERSAL_TIME: Tick = 2 * NODE_TRAVERSAL_TIME as Tick * NET_DIAMETER as Tick;
        // PATH_DISCOVERY_TIME = 2 * NET_TRAVERSAL_TIME
        const PATH_DISCOVERY_TIME: Tick = 2 * NET_TRAVERSAL_TIME;

        Self {
            active_route_timeout: 3_000,
            my_route_timeout: 2 * 3_000,
            inactive_route_timeout: 3_000,
            net_diameter: NET_DIAMETER,
            net_traversal_time: NET_TRAVERSAL_TIME,
            node_traversal_time: NODE_TRAVERSAL_TIME,
            path_discovery_time: PATH_DISCOVERY_TIME,
            data_queue_timeout: PATH_DISCOVERY_TIME,
            passive_ack_timeout: NET_TRAVERSAL_TIME,
            blacklist_timeout: PATH_DISCOVERY_TIME,
            hello_interval: 1_000,
            hello_lifetime: 1_000 * 3,
            rreq_retries: 2,
            neighbor_max_repairs: 2,
            packet_inbox_sz: 16,
            packet_outbox_sz: 16,
            max_recent_rreqs: 4,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::rfc3561_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let c = NodeConfig::default();
        assert_eq!(c.my_route_timeout, 2 * c.active_route_timeout);
        assert_eq!(c.path_discovery_time, 2 * c.net_traversal_time);
        assert_eq!(c.data_queue_timeout, c.path_discovery_time);
    }
}
