//! Search trait and the query/result types it exchanges.
//!
//! # Pluggability
//!
//! The path finder service calls routing through the [`PathSearch`] trait,
//! so hosts can swap in a custom search (bidirectional, contraction
//! hierarchies, a scripted stub in tests) without touching the worker pool.
//! The default is [`AStarPathing`](crate::AStarPathing).

use lp_core::{EndpointId, NodeId, VehicleCategory};

use crate::cancel::CancellationToken;
use crate::error::RoutingResult;
use crate::graph::NetGraph;

// ── SearchQuery ───────────────────────────────────────────────────────────────

/// Inputs of a single search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub start:        NodeId,
    pub end:          NodeId,
    pub vehicle:      VehicleCategory,
    /// Outgoing endpoint of `start` that the first transition must use.
    pub forced_start: Option<EndpointId>,
    /// Incoming endpoint of `end` that the path must arrive on.
    pub forced_end:   Option<EndpointId>,
}

impl SearchQuery {
    pub fn new(start: NodeId, end: NodeId) -> Self {
        Self {
            start,
            end,
            vehicle:      VehicleCategory::default(),
            forced_start: None,
            forced_end:   None,
        }
    }

    pub fn with_vehicle(mut self, vehicle: VehicleCategory) -> Self {
        self.vehicle = vehicle;
        self
    }

    pub fn with_forced_start(mut self, endpoint: EndpointId) -> Self {
        self.forced_start = Some(endpoint);
        self
    }

    pub fn with_forced_end(mut self, endpoint: EndpointId) -> Self {
        self.forced_end = Some(endpoint);
        self
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// One transition of a path: leave `from_node` through `via_endpoint` and
/// arrive at `to_node`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathStep {
    pub from_node:    NodeId,
    pub to_node:      NodeId,
    /// Outgoing lane endpoint of `from_node`.
    pub via_endpoint: EndpointId,
}

/// A successful search: ordered steps and their summed cost.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoundPath {
    pub steps:      Vec<PathStep>,
    pub total_cost: f32,
}

impl FoundPath {
    /// The empty path returned when start and end coincide.
    pub fn trivial() -> Self {
        Self::default()
    }

    pub fn is_trivial(&self) -> bool {
        self.steps.is_empty()
    }

    /// Junctions visited in order, including start and end.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.steps.len() + 1);
        if let Some(first) = self.steps.first() {
            nodes.push(first.from_node);
        }
        nodes.extend(self.steps.iter().map(|s| s.to_node));
        nodes
    }
}

// ── PathSearch trait ──────────────────────────────────────────────────────────

/// Pluggable search strategy.
///
/// # Thread safety
///
/// One instance is shared by every worker thread of a path finder, so
/// implementations must be `Send + Sync` and keep per-search state on the
/// stack.
pub trait PathSearch: Send + Sync {
    /// Find the cheapest path for `query` in `graph`.
    ///
    /// Must poll `token` often enough that a cleared graph stops the search
    /// promptly, returning [`RoutingError::Cancelled`](crate::RoutingError::Cancelled).
    fn find_path(
        &self,
        graph: &NetGraph,
        query: &SearchQuery,
        token: &CancellationToken,
    ) -> RoutingResult<FoundPath>;

    /// Drop any memoized network data.  Called when the graph is cleared and
    /// when the host reports that costs changed.
    fn invalidate(&self) {}
}
