//! Synthetic arterial corridor.
//!
//! `junctions` junctions on an east-west line, 200 units apart.  Every
//! segment carries four lanes:
//!
//! | Lane | Direction | Lane number | Notes                      |
//! |------|-----------|-------------|----------------------------|
//! | 0    | east      | 0           | general traffic, 50        |
//! | 1    | east      | 1           | bus lane, 70               |
//! | 2    | west      | 0           | general traffic, 50        |
//! | 3    | west      | 1           | general traffic, 70        |
//!
//! Endpoint ids encode their position: `100 × segment + 10 × lane`, plus 1
//! for the incoming end.

use lp_core::{EndpointId, LaneId, NodeId, SegmentId, Vec2, VehicleCategory};
use lp_network::{InMemoryNetwork, InMemoryNetworkBuilder, NetworkResult};

pub const SPACING: f32 = 200.0;

const LANES: [(u32, bool, i32, f32); 4] = [
    (0, true,  0, 50.0),
    (1, true,  1, 70.0),
    (2, false, 0, 50.0),
    (3, false, 1, 70.0),
];

/// Outgoing endpoint of `lane` on segment `segment`.
pub fn outgoing(segment: u32, lane: u32) -> EndpointId {
    EndpointId(100 * segment + 10 * lane)
}

/// Incoming endpoint of `lane` on segment `segment`.
pub fn incoming(segment: u32, lane: u32) -> EndpointId {
    EndpointId(100 * segment + 10 * lane + 1)
}

pub fn build_corridor(junctions: u32) -> NetworkResult<InMemoryNetwork> {
    let mut b = InMemoryNetworkBuilder::new();

    for j in 0..junctions {
        b.add_node(NodeId(j), Vec2::new(j as f32 * SPACING, 0.0));
    }

    // Segment s joins junction s-1 (west) and s (east).
    for s in 1..junctions {
        let seg = SegmentId(s);
        let (west, east) = (NodeId(s - 1), NodeId(s));
        b.add_segment(seg, west, east);
        for (lane, eastbound, number, speed) in LANES {
            let from = if eastbound { west } else { east };
            b.add_lane(seg, LaneId(lane), number, speed)
                .add_lane_link(seg, LaneId(lane), from, outgoing(s, lane), incoming(s, lane));
        }
    }

    // Through movements at interior junctions; any lane may feed any lane
    // in the same direction, but only buses may enter the bus lane.
    for j in 1..junctions.saturating_sub(1) {
        let (before, after) = (j, j + 1);
        for from_lane in [0, 1] {
            b.allow_turn(incoming(before, from_lane), outgoing(after, 0))
                .allow_turn_for(incoming(before, from_lane), outgoing(after, 1), &[VehicleCategory::Bus]);
        }
        for from_lane in [2, 3] {
            for to_lane in [2, 3] {
                b.allow_turn(incoming(after, from_lane), outgoing(before, to_lane));
            }
        }
    }

    b.build()
}
