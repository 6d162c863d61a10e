//! Plain-data network model exchanged between the network host and routing.
//!
//! Everything here is an owned snapshot: the host copies what it knows at
//! call time and routing never holds references back into the host.  Live
//! values (lane usage) are re-queried through
//! [`NetworkProvider::lane_usage`](crate::NetworkProvider::lane_usage).

use rustc_hash::FxHashMap;

use lp_core::{EndpointId, LaneId, NodeId, SegmentId, Vec2, VehicleCategory};

// ── Lane endpoints ────────────────────────────────────────────────────────────

/// Whether a lane endpoint enters or leaves its junction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndpointKind {
    /// Traffic arrives at the junction through this endpoint.
    Incoming,
    /// Traffic leaves the junction through this endpoint.
    Outgoing,
}

/// A permitted turn from an incoming endpoint to an outgoing endpoint of the
/// same junction, optionally restricted to some vehicle categories.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndpointConnection {
    /// The outgoing endpoint this turn leads to.
    pub target: EndpointId,
    /// Categories allowed to take this turn.  Empty = unrestricted.
    pub allowed_vehicles: Vec<VehicleCategory>,
}

impl EndpointConnection {
    /// Unrestricted turn to `target`.
    pub fn open(target: EndpointId) -> Self {
        Self { target, allowed_vehicles: Vec::new() }
    }

    /// `true` if `vehicle` may take this turn.
    #[inline]
    pub fn allows(&self, vehicle: VehicleCategory) -> bool {
        self.allowed_vehicles.is_empty() || self.allowed_vehicles.contains(&vehicle)
    }
}

/// The point where a specific lane of a specific segment meets a junction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneEndpoint {
    pub id: EndpointId,
    /// World position of the lane end; used by the search heuristic.
    pub position: Vec2,
    /// Segment the lane belongs to.
    pub segment: SegmentId,
    /// Junction the endpoint sits at.
    pub node: NodeId,
    pub kind: EndpointKind,
    /// Lane within `segment`.
    pub lane: LaneId,
    /// Lateral lane index, used to price lane switching.
    pub lane_number: i32,
    /// Turns available from this endpoint.  Only populated for incoming
    /// endpoints; outgoing endpoints have no intra-junction successors.
    pub connections: Vec<EndpointConnection>,
}

impl LaneEndpoint {
    #[inline]
    pub fn is_outgoing(&self) -> bool {
        self.kind == EndpointKind::Outgoing
    }

    /// The turn from this endpoint to `target`, if one is permitted.
    pub fn connection_to(&self, target: EndpointId) -> Option<&EndpointConnection> {
        self.connections.iter().find(|c| c.target == target)
    }
}

// ── Segments and lanes ────────────────────────────────────────────────────────

/// One lane of a segment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lane {
    pub id: LaneId,
    pub lane_number: i32,
    /// Speed limit in world speed units; may be `f32::INFINITY` when the
    /// host has no limit for the lane.
    pub max_speed: f32,
    /// Usage fraction at snapshot time, nominally in `[0, 1]`.
    pub live_usage: f32,
}

/// A road link between two junctions.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub id: SegmentId,
    /// The junctions this segment connects (normally two).
    pub nodes: Vec<NodeId>,
    /// Every lane endpoint on this segment, at both ends.
    pub endpoints: Vec<EndpointId>,
    pub lanes: Vec<Lane>,
    /// Outgoing endpoint at one end → incoming endpoint of the same lane at
    /// the other end.
    pub endpoint_pairs: FxHashMap<EndpointId, EndpointId>,
}

impl Segment {
    /// The junction at the far end from `node`, or `None` for a self-loop or
    /// a segment that does not reference any other node.
    pub fn other_node(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.iter().copied().find(|&n| n != node)
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == id)
    }

    #[inline]
    pub fn contains_endpoint(&self, endpoint: EndpointId) -> bool {
        self.endpoints.contains(&endpoint)
    }

    /// The endpoint paired with `endpoint` at the other end of the lane.
    #[inline]
    pub fn paired_endpoint(&self, endpoint: EndpointId) -> Option<EndpointId> {
        self.endpoint_pairs.get(&endpoint).copied()
    }
}

// ── Node snapshots ────────────────────────────────────────────────────────────

/// Everything routing needs to know about one junction, copied out of the
/// network host.  Fed to the graph builder in bulk.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub position: Vec2,
    pub incoming_endpoints: Vec<EndpointId>,
    pub outgoing_endpoints: Vec<EndpointId>,
    pub connected_segments: Vec<Segment>,
    /// Full records of this junction's lane endpoints (positions, lanes, and
    /// turn permissions).
    pub endpoints: Vec<LaneEndpoint>,
}

impl NodeSnapshot {
    /// An isolated junction with no lanes.
    pub fn bare(id: NodeId, position: Vec2) -> Self {
        Self {
            id,
            position,
            incoming_endpoints: Vec::new(),
            outgoing_endpoints: Vec::new(),
            connected_segments: Vec::new(),
            endpoints:          Vec::new(),
        }
    }
}
