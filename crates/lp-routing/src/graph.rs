//! Routing graph built from node snapshots.
//!
//! # Layout
//!
//! Each [`GraphNode`] keeps its adjacency as a list of [`GraphRoute`]s (one
//! per neighbouring junction, holding the outgoing endpoints that lead
//! there) plus two lookup tables:
//!
//! - `endpoint_connections`: incoming endpoint → outgoing endpoints reachable
//!   by a permitted turn;
//! - `outgoing_to_incoming`: outgoing endpoint → the incoming endpoint it
//!   arrives on at the neighbour.
//!
//! Routes keep the order in which segments appear in the snapshot, which
//! keeps searches deterministic.
//!
//! # Sharing
//!
//! `NetGraph` is plain data.  The service keeps it behind an `Arc` so that
//! running searches hold a consistent snapshot while a rebuild or clear
//! produces a new one.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use lp_core::{EndpointId, NodeId, SegmentId, Vec2};
use lp_network::{LaneEndpoint, NodeSnapshot};

// ── GraphRoute ────────────────────────────────────────────────────────────────

/// Outgoing endpoints of a junction that lead to one neighbouring junction.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphRoute {
    pub neighbor: NodeId,
    /// Segment the route runs along (the last one seen if several segments
    /// join the same pair of junctions).
    pub segment:  SegmentId,
    pub via:      Vec<EndpointId>,
}

// ── GraphNode ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id:       NodeId,
    pub position: Vec2,
    pub incoming: FxHashSet<EndpointId>,
    pub outgoing: FxHashSet<EndpointId>,
    pub segments: Vec<SegmentId>,
    routes:               Vec<GraphRoute>,
    endpoints:            FxHashMap<EndpointId, LaneEndpoint>,
    endpoint_connections: FxHashMap<EndpointId, Vec<EndpointId>>,
    outgoing_to_incoming: FxHashMap<EndpointId, EndpointId>,
}

impl GraphNode {
    pub fn from_snapshot(snapshot: NodeSnapshot) -> Self {
        let NodeSnapshot {
            id,
            position,
            incoming_endpoints,
            outgoing_endpoints,
            connected_segments,
            endpoints,
        } = snapshot;

        let mut routes: Vec<GraphRoute> = Vec::new();
        let mut outgoing_to_incoming = FxHashMap::default();
        let mut segments = Vec::with_capacity(connected_segments.len());

        for segment in &connected_segments {
            segments.push(segment.id);

            let via: Vec<EndpointId> = outgoing_endpoints
                .iter()
                .copied()
                .filter(|&e| segment.contains_endpoint(e))
                .collect();
            for &out in &via {
                if let Some(inc) = segment.paired_endpoint(out) {
                    outgoing_to_incoming.insert(out, inc);
                }
            }

            let Some(neighbor) = segment.other_node(id) else {
                trace!(node = %id, segment = %segment.id, "skipping self-loop segment");
                continue;
            };
            let route = GraphRoute { neighbor, segment: segment.id, via };
            match routes.iter_mut().find(|r| r.neighbor == neighbor) {
                Some(existing) => *existing = route,
                None => routes.push(route),
            }
        }

        let mut endpoint_connections = FxHashMap::default();
        for ep in endpoints.iter().filter(|e| !e.is_outgoing()) {
            endpoint_connections.insert(ep.id, ep.connections.iter().map(|c| c.target).collect());
        }

        Self {
            id,
            position,
            incoming: incoming_endpoints.into_iter().collect(),
            outgoing: outgoing_endpoints.into_iter().collect(),
            segments,
            routes,
            endpoints: endpoints.into_iter().map(|e| (e.id, e)).collect(),
            endpoint_connections,
            outgoing_to_incoming,
        }
    }

    pub fn routes(&self) -> &[GraphRoute] {
        &self.routes
    }

    pub fn route_to(&self, neighbor: NodeId) -> Option<&GraphRoute> {
        self.routes.iter().find(|r| r.neighbor == neighbor)
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&LaneEndpoint> {
        self.endpoints.get(&id)
    }

    /// Outgoing endpoints reachable from incoming endpoint `incoming`.
    /// `None` if the endpoint has no turn table at this junction.
    pub fn connections_from(&self, incoming: EndpointId) -> Option<&[EndpointId]> {
        self.endpoint_connections.get(&incoming).map(Vec::as_slice)
    }

    /// The incoming endpoint at the neighbour reached through `outgoing`.
    pub fn incoming_for(&self, outgoing: EndpointId) -> Option<EndpointId> {
        self.outgoing_to_incoming.get(&outgoing).copied()
    }

    /// Position of the entry endpoint, falling back to the junction.
    pub fn entry_position(&self, entry: Option<EndpointId>) -> Vec2 {
        entry
            .and_then(|e| self.endpoints.get(&e))
            .map_or(self.position, |e| e.position)
    }
}

// ── NetGraph ──────────────────────────────────────────────────────────────────

/// Junction id → [`GraphNode`].
#[derive(Clone, Debug, Default)]
pub struct NetGraph {
    nodes: FxHashMap<NodeId, GraphNode>,
}

impl NetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and insert a node, replacing any node with the same id.
    pub fn add_node(&mut self, snapshot: NodeSnapshot) {
        self.insert_node(GraphNode::from_snapshot(snapshot));
    }

    pub fn insert_node(&mut self, node: GraphNode) {
        self.nodes.insert(node.id, node);
    }

    /// Build and insert many nodes.
    pub fn add_nodes(&mut self, snapshots: Vec<NodeSnapshot>) {
        self.extend(build_nodes(snapshots));
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl Extend<GraphNode> for NetGraph {
    fn extend<I: IntoIterator<Item = GraphNode>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.nodes.reserve(iter.size_hint().0);
        for node in iter {
            self.insert_node(node);
        }
    }
}

/// Build graph nodes from snapshots without touching any graph.  With the
/// `parallel` feature the work runs on Rayon's pool.
pub fn build_nodes(snapshots: Vec<NodeSnapshot>) -> Vec<GraphNode> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        snapshots.into_par_iter().map(GraphNode::from_snapshot).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        snapshots.into_iter().map(GraphNode::from_snapshot).collect()
    }
}
