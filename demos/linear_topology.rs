// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Three-node linear topology: A -- B -- C, A and C out of radio range of
//! each other. Drives the protocol engine directly (no real radio) to show
//! a direct-neighbor send and a two-hop route discovery.
//!
//! ```sh
//! cargo run --example linear_topology --features std
//! ```

use aodv_mesh::{Address, Node, NodeConfig};

type DemoNode = Node<8, 8, 8, 8>;

fn addr(b: u8) -> Address {
    Address([b; 8])
}

/// Tighter timings than the RFC 3561 defaults so the demo's handful of
/// ticks are enough to exchange HELLOs and complete route discovery.
fn demo_config() -> NodeConfig {
    NodeConfig {
        hello_interval: 1,
        net_traversal_time: 20,
        path_discovery_time: 40,
        data_queue_timeout: 40,
        passive_ack_timeout: 20,
        ..NodeConfig::default()
    }
}

/// A and C cannot hear each other directly; B bridges them.
fn in_range(from: Address, to: Address) -> bool {
    !((from == addr(1) && to == addr(3)) || (from == addr(3) && to == addr(1)))
}

/// Drain every node's outbound frame queue and deliver each frame to every
/// in-range peer, repeating until the whole mesh goes quiet for this tick.
fn pump(nodes: &mut [(Address, DemoNode)], now: u32) {
    loop {
        let mut outgoing: Vec<(Address, aodv_mesh::Frame)> = Vec::new();
        for (from, node) in nodes.iter_mut() {
            while let Some(frame) = node.update(now) {
                outgoing.push((*from, frame));
            }
        }
        if outgoing.is_empty() {
            break;
        }
        for (from, frame) in outgoing {
            for (to, node) in nodes.iter_mut() {
                if *to != from && in_range(from, *to) {
                    node.on_recv(&frame, -60, 8);
                }
            }
        }
    }
}

fn main() {
    env_logger::init();

    println!("[*] Linear topology demo: A -- B -- C\n");

    let mut nodes: Vec<(Address, DemoNode)> = vec![
        (addr(1), Node::new(addr(1), Some("A"), demo_config())),
        (addr(2), Node::new(addr(2), Some("B"), demo_config())),
        (addr(3), Node::new(addr(3), Some("C"), demo_config())),
    ];

    // A one-hop ping is the cheapest way for A and B to learn about each
    // other: the RREQ and its RREP both refresh the neighbor table of
    // every node that relays or answers them.
    println!("[*] A pings B to establish a direct neighbor relationship...");
    nodes[0].1.ping(addr(2), 0);
    for tick in 0..5u32 {
        pump(&mut nodes, tick);
    }

    // Scenario 1: direct neighbor send, A -> B.
    nodes[0].1.send(addr(2), b"hello B", 5);
    pump(&mut nodes, 5);
    match nodes[1].1.pop_rx() {
        Some(datagram) => println!(
            "[OK] B received {:?} from {}",
            core::str::from_utf8(&datagram.data).unwrap_or("<binary>"),
            datagram.orig_addr
        ),
        None => println!("[X] B received nothing"),
    }

    // Scenario 2: two-hop discovery, A -> C via B. A has no direct route to
    // C; it must flood an RREQ, let B relay it, and wait for C's RREP.
    println!("\n[*] Sending A -> C with no existing route...");
    nodes[0].1.send(addr(3), b"hello C", 6);
    for tick in 6..30u32 {
        pump(&mut nodes, tick);
    }

    match nodes[2].1.pop_rx() {
        Some(datagram) => println!(
            "[OK] C received {:?} from {} after route discovery",
            core::str::from_utf8(&datagram.data).unwrap_or("<binary>"),
            datagram.orig_addr
        ),
        None => println!("[X] C never received the two-hop datagram"),
    }

    println!("\nA's routing table has {} entries", nodes[0].1.routes().iter().count());
    println!("C's routing table has {} entries", nodes[2].1.routes().iter().count());
}
