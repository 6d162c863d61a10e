//! In-memory network provider and its builder.
//!
//! `InMemoryNetwork` stands in for the simulation host in tests, demos, and
//! headless tools.  It is assembled with [`InMemoryNetworkBuilder`], which
//! accepts junctions, segments, lanes, lane links, and turns in any order and
//! validates the whole topology in [`build`](InMemoryNetworkBuilder::build).
//!
//! # Lane links
//!
//! A *lane link* is one lane of a segment driven in one direction: it creates
//! an outgoing endpoint at the departure junction, an incoming endpoint at the
//! arrival junction, and pairs the two on the segment.  Turns then connect an
//! incoming endpoint to an outgoing endpoint inside a junction.
//!
//! ```
//! use lp_core::{EndpointId, LaneId, NodeId, SegmentId, Vec2};
//! use lp_network::{InMemoryNetworkBuilder, NetworkProvider};
//!
//! let mut b = InMemoryNetworkBuilder::new();
//! b.add_node(NodeId(0), Vec2::new(0.0, 0.0));
//! b.add_node(NodeId(1), Vec2::new(10.0, 0.0));
//! b.add_segment(SegmentId(5), NodeId(0), NodeId(1));
//! b.add_lane(SegmentId(5), LaneId(0), 0, 50.0);
//! b.add_lane_link(SegmentId(5), LaneId(0), NodeId(0), EndpointId(10), EndpointId(11));
//! let net = b.build().unwrap();
//! assert_eq!(net.lane_endpoint(EndpointId(11)).unwrap().node, NodeId(1));
//! ```

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use lp_core::{EndpointId, LaneId, NodeId, SegmentId, Vec2, VehicleCategory};

use crate::model::{EndpointConnection, EndpointKind, Lane, LaneEndpoint, NodeSnapshot, Segment};
use crate::{NetworkError, NetworkProvider, NetworkResult};

// ── InMemoryNetwork ───────────────────────────────────────────────────────────

struct NodeRecord {
    position: Vec2,
    /// Connected segments in insertion order.
    segments: Vec<SegmentId>,
}

/// A fully materialized network implementing [`NetworkProvider`].
///
/// Topology is immutable after `build()`; lane usage can be updated at any
/// time through [`set_lane_usage`](Self::set_lane_usage), which makes it a
/// convenient stand-in for live traffic statistics.
pub struct InMemoryNetwork {
    nodes:     FxHashMap<NodeId, NodeRecord>,
    segments:  FxHashMap<SegmentId, Segment>,
    endpoints: FxHashMap<EndpointId, LaneEndpoint>,
    usage:     RwLock<FxHashMap<(SegmentId, LaneId), f32>>,
}

impl InMemoryNetwork {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// All junction ids in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Update the live usage fraction of a lane.
    pub fn set_lane_usage(&self, segment: SegmentId, lane: LaneId, usage: f32) -> NetworkResult<()> {
        let mut map = self.usage.write();
        match map.get_mut(&(segment, lane)) {
            Some(slot) => {
                *slot = usage;
                Ok(())
            }
            None => Err(NetworkError::UnknownLane { segment, lane }),
        }
    }

    /// Copy out everything routing needs about `node`.
    pub fn snapshot(&self, node: NodeId) -> Option<NodeSnapshot> {
        let record = self.nodes.get(&node)?;
        let endpoints = self.node_lane_endpoints(node);

        let incoming_endpoints = endpoints
            .iter()
            .filter(|e| e.kind == EndpointKind::Incoming)
            .map(|e| e.id)
            .collect();
        let outgoing_endpoints = endpoints
            .iter()
            .filter(|e| e.kind == EndpointKind::Outgoing)
            .map(|e| e.id)
            .collect();
        let connected_segments = record
            .segments
            .iter()
            .filter_map(|&s| self.segment(s))
            .collect();

        Some(NodeSnapshot {
            id: node,
            position: record.position,
            incoming_endpoints,
            outgoing_endpoints,
            connected_segments,
            endpoints,
        })
    }

    /// Snapshots of every junction, in ascending id order.
    pub fn snapshots(&self) -> Vec<NodeSnapshot> {
        self.node_ids()
            .into_iter()
            .filter_map(|id| self.snapshot(id))
            .collect()
    }
}

impl NetworkProvider for InMemoryNetwork {
    fn segment(&self, id: SegmentId) -> Option<Segment> {
        let mut segment = self.segments.get(&id)?.clone();
        let usage = self.usage.read();
        for lane in &mut segment.lanes {
            if let Some(&u) = usage.get(&(id, lane.id)) {
                lane.live_usage = u;
            }
        }
        Some(segment)
    }

    fn lane_endpoint(&self, id: EndpointId) -> Option<LaneEndpoint> {
        self.endpoints.get(&id).cloned()
    }

    fn node_lane_endpoints(&self, node: NodeId) -> Vec<LaneEndpoint> {
        let mut found: Vec<LaneEndpoint> = self
            .endpoints
            .values()
            .filter(|e| e.node == node)
            .cloned()
            .collect();
        found.sort_unstable_by_key(|e| e.id);
        found
    }

    fn lane_usage(&self, segment: SegmentId, lane: LaneId) -> Option<f32> {
        self.usage.read().get(&(segment, lane)).copied()
    }
}

// ── InMemoryNetworkBuilder ────────────────────────────────────────────────────

/// Construct an [`InMemoryNetwork`] incrementally, then call
/// [`build`](Self::build).
///
/// Inputs are recorded verbatim; all cross-references are checked in
/// `build()` so inputs may arrive in any order.
#[derive(Default)]
pub struct InMemoryNetworkBuilder {
    nodes:     Vec<(NodeId, Vec2)>,
    segments:  Vec<RawSegment>,
    lanes:     Vec<RawLane>,
    links:     Vec<RawLink>,
    usage:     Vec<(SegmentId, LaneId, f32)>,
    positions: Vec<(EndpointId, Vec2)>,
    turns:     Vec<RawTurn>,
}

struct RawSegment {
    id: SegmentId,
    a:  NodeId,
    b:  NodeId,
}

struct RawLane {
    segment:     SegmentId,
    lane:        LaneId,
    lane_number: i32,
    max_speed:   f32,
}

struct RawLink {
    segment:  SegmentId,
    lane:     LaneId,
    from:     NodeId,
    outgoing: EndpointId,
    incoming: EndpointId,
}

struct RawTurn {
    from:    EndpointId,
    to:      EndpointId,
    allowed: Vec<VehicleCategory>,
}

impl InMemoryNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a junction.  Re-adding an id replaces its position.
    pub fn add_node(&mut self, id: NodeId, position: Vec2) -> &mut Self {
        self.nodes.push((id, position));
        self
    }

    /// Add a segment between junctions `a` and `b`.
    pub fn add_segment(&mut self, id: SegmentId, a: NodeId, b: NodeId) -> &mut Self {
        self.segments.push(RawSegment { id, a, b });
        self
    }

    /// Add a lane to `segment` with zero initial usage.
    pub fn add_lane(&mut self, segment: SegmentId, lane: LaneId, lane_number: i32, max_speed: f32) -> &mut Self {
        self.lanes.push(RawLane { segment, lane, lane_number, max_speed });
        self
    }

    /// Set the initial usage fraction of a lane added with [`add_lane`](Self::add_lane).
    /// The last call for a lane wins.
    pub fn lane_usage(&mut self, segment: SegmentId, lane: LaneId, usage: f32) -> &mut Self {
        self.usage.push((segment, lane, usage));
        self
    }

    /// Drive `lane` of `segment` away from junction `from`: `outgoing` is
    /// created at `from`, `incoming` at the opposite junction, and the two are
    /// paired.  Endpoints are placed at their junction's position unless
    /// moved with [`endpoint_position`](Self::endpoint_position).
    pub fn add_lane_link(
        &mut self,
        segment:  SegmentId,
        lane:     LaneId,
        from:     NodeId,
        outgoing: EndpointId,
        incoming: EndpointId,
    ) -> &mut Self {
        self.links.push(RawLink { segment, lane, from, outgoing, incoming });
        self
    }

    /// Override the world position of an endpoint.
    pub fn endpoint_position(&mut self, endpoint: EndpointId, position: Vec2) -> &mut Self {
        self.positions.push((endpoint, position));
        self
    }

    /// Permit the turn `from` (incoming) → `to` (outgoing) for every vehicle.
    pub fn allow_turn(&mut self, from: EndpointId, to: EndpointId) -> &mut Self {
        self.turns.push(RawTurn { from, to, allowed: Vec::new() });
        self
    }

    /// Permit the turn `from` → `to` only for the listed categories.
    pub fn allow_turn_for(&mut self, from: EndpointId, to: EndpointId, vehicles: &[VehicleCategory]) -> &mut Self {
        self.turns.push(RawTurn { from, to, allowed: vehicles.to_vec() });
        self
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn segment_count(&self) -> usize { self.segments.len() }

    /// Validate all cross-references and produce the network.
    pub fn build(self) -> NetworkResult<InMemoryNetwork> {
        // ── Junctions ─────────────────────────────────────────────────────
        let mut nodes: FxHashMap<NodeId, NodeRecord> = FxHashMap::default();
        for (id, position) in self.nodes {
            nodes
                .entry(id)
                .and_modify(|r| r.position = position)
                .or_insert(NodeRecord { position, segments: Vec::new() });
        }

        // ── Segments ──────────────────────────────────────────────────────
        let mut segments: FxHashMap<SegmentId, Segment> = FxHashMap::default();
        for raw in self.segments {
            for n in [raw.a, raw.b] {
                if !nodes.contains_key(&n) {
                    return Err(NetworkError::UnknownNode(n));
                }
            }
            let seg_nodes = if raw.a == raw.b { vec![raw.a] } else { vec![raw.a, raw.b] };
            for n in &seg_nodes {
                if let Some(record) = nodes.get_mut(n) {
                    if !record.segments.contains(&raw.id) {
                        record.segments.push(raw.id);
                    }
                }
            }
            segments.insert(raw.id, Segment { id: raw.id, nodes: seg_nodes, ..Segment::default() });
        }

        // ── Lanes ─────────────────────────────────────────────────────────
        let mut usage: FxHashMap<(SegmentId, LaneId), f32> = FxHashMap::default();
        for raw in self.lanes {
            let segment = segments
                .get_mut(&raw.segment)
                .ok_or(NetworkError::UnknownSegment(raw.segment))?;
            segment.lanes.retain(|l| l.id != raw.lane);
            segment.lanes.push(Lane {
                id:          raw.lane,
                lane_number: raw.lane_number,
                max_speed:   raw.max_speed,
                live_usage:  0.0,
            });
            usage.insert((raw.segment, raw.lane), 0.0);
        }
        for (segment_id, lane_id, value) in self.usage {
            let lane = segments
                .get_mut(&segment_id)
                .and_then(|s| s.lanes.iter_mut().find(|l| l.id == lane_id))
                .ok_or(NetworkError::UnknownLane { segment: segment_id, lane: lane_id })?;
            lane.live_usage = value;
            usage.insert((segment_id, lane_id), value);
        }

        // ── Lane links → endpoint pairs ───────────────────────────────────
        let mut endpoints: FxHashMap<EndpointId, LaneEndpoint> = FxHashMap::default();
        for raw in self.links {
            let segment = segments
                .get_mut(&raw.segment)
                .ok_or(NetworkError::UnknownSegment(raw.segment))?;
            let lane_number = segment
                .lane(raw.lane)
                .map(|l| l.lane_number)
                .ok_or(NetworkError::UnknownLane { segment: raw.segment, lane: raw.lane })?;
            if !segment.nodes.contains(&raw.from) {
                return Err(NetworkError::SegmentNodeMismatch { segment: raw.segment, node: raw.from });
            }
            let to = segment
                .other_node(raw.from)
                .ok_or(NetworkError::SegmentNodeMismatch { segment: raw.segment, node: raw.from })?;

            for (id, node, kind) in [
                (raw.outgoing, raw.from, EndpointKind::Outgoing),
                (raw.incoming, to,       EndpointKind::Incoming),
            ] {
                if endpoints.contains_key(&id) {
                    return Err(NetworkError::DuplicateEndpoint(id));
                }
                let position = nodes.get(&node).map(|r| r.position).unwrap_or_default();
                endpoints.insert(id, LaneEndpoint {
                    id,
                    position,
                    segment: raw.segment,
                    node,
                    kind,
                    lane: raw.lane,
                    lane_number,
                    connections: Vec::new(),
                });
                segment.endpoints.push(id);
            }
            segment.endpoint_pairs.insert(raw.outgoing, raw.incoming);
        }

        for (id, position) in self.positions {
            endpoints
                .get_mut(&id)
                .ok_or(NetworkError::UnknownEndpoint(id))?
                .position = position;
        }

        // ── Turns ─────────────────────────────────────────────────────────
        for raw in self.turns {
            let to = endpoints.get(&raw.to).ok_or(NetworkError::UnknownEndpoint(raw.to))?;
            let (to_node, to_outgoing) = (to.node, to.is_outgoing());
            let from = endpoints
                .get_mut(&raw.from)
                .ok_or(NetworkError::UnknownEndpoint(raw.from))?;
            if from.is_outgoing() || !to_outgoing || from.node != to_node {
                return Err(NetworkError::InvalidTurn { from: raw.from, to: raw.to });
            }
            from.connections.retain(|c| c.target != raw.to);
            from.connections.push(EndpointConnection { target: raw.to, allowed_vehicles: raw.allowed });
        }

        Ok(InMemoryNetwork {
            nodes,
            segments,
            endpoints,
            usage: RwLock::new(usage),
        })
    }
}
