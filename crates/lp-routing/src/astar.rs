//! Lane-aware A*.
//!
//! # States
//!
//! A search state is a junction together with the incoming endpoint it was
//! reached on (`None` for the start).  The best known cost is tracked per
//! state, so reaching a junction on two different lanes keeps both
//! alternatives alive.
//!
//! # Pruning
//!
//! Once a goal state has been found the search keeps running to improve it,
//! but a popped state is discarded when
//!
//! - its junction was already expanded and is not on the current best path, or
//! - its `f = g + h` is no better than the best goal cost.
//!
//! Junctions on the best path are exempt from both rules so that the best
//! path can still be improved through them.
//!
//! # Heuristic
//!
//! `h` is the straight-line distance from the entry endpoint (or the junction
//! when the endpoint is unknown) to the goal junction.  It is not scaled to
//! the cost units, so the search is best-first rather than provably optimal
//! on networks whose coordinates are large compared to edge costs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use lp_core::{CostWeights, EndpointId, NodeId};
use lp_network::NetworkProvider;

use crate::cancel::CancellationToken;
use crate::cost::CostModel;
use crate::error::{RoutingError, RoutingResult};
use crate::graph::{GraphNode, NetGraph};
use crate::search::{FoundPath, PathSearch, PathStep, SearchQuery};

// ── AStarPathing ──────────────────────────────────────────────────────────────

/// The default [`PathSearch`]: A* priced by a [`CostModel`].
#[derive(Clone, Debug)]
pub struct AStarPathing {
    cost: CostModel,
}

impl AStarPathing {
    pub fn new(provider: Arc<dyn NetworkProvider>, weights: CostWeights) -> Self {
        Self { cost: CostModel::new(provider, weights) }
    }

    pub fn with_cost_model(cost: CostModel) -> Self {
        Self { cost }
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost
    }
}

impl PathSearch for AStarPathing {
    fn find_path(
        &self,
        graph: &NetGraph,
        query: &SearchQuery,
        token: &CancellationToken,
    ) -> RoutingResult<FoundPath> {
        find_path_astar(graph, query, &self.cost, token)
    }

    fn invalidate(&self) {
        self.cost.cache().clear();
    }
}

// ── Search internals ──────────────────────────────────────────────────────────

/// Arena record of one pushed state.  Parents are arena indices.
#[derive(Copy, Clone, Debug)]
struct SearchNode {
    node:   NodeId,
    g:      f32,
    h:      f32,
    parent: Option<usize>,
    /// Incoming endpoint this junction was reached on.
    entry:  Option<EndpointId>,
    /// Outgoing endpoint of the parent used to get here.
    via:    Option<EndpointId>,
    depth:  u32,
}

impl SearchNode {
    #[inline]
    fn f(&self) -> f32 {
        self.g + self.h
    }
}

/// Open-set entry.  Ordered so that `BinaryHeap` (a max-heap) pops the
/// lowest `f` first; equal `f` pops in insertion order.
struct OpenEntry {
    f:     f32,
    seq:   u64,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.total_cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

#[inline]
fn heuristic(node: &GraphNode, entry: Option<EndpointId>, goal: &GraphNode) -> f32 {
    node.entry_position(entry).distance_to(goal.position)
}

/// Run a lane-aware A* search over `graph`.
///
/// # Errors
///
/// - [`RoutingError::Cancelled`] if `token` is cancelled before or during
///   the search.
/// - [`RoutingError::NodeNotFound`] if either endpoint junction is missing.
/// - [`RoutingError::InvalidForcedEndpoint`] if `forced_start` has no
///   neighbour mapping at the start junction.
/// - [`RoutingError::NoPath`] if the open set empties without a goal.
pub fn find_path_astar(
    graph: &NetGraph,
    query: &SearchQuery,
    cost: &CostModel,
    token: &CancellationToken,
) -> RoutingResult<FoundPath> {
    token.check()?;

    let start = graph.node(query.start).ok_or(RoutingError::NodeNotFound(query.start))?;
    let goal = graph.node(query.end).ok_or(RoutingError::NodeNotFound(query.end))?;

    if query.start == query.end {
        return Ok(FoundPath::trivial());
    }

    if let Some(forced) = query.forced_start {
        if start.incoming_for(forced).is_none() {
            return Err(RoutingError::InvalidForcedEndpoint { node: query.start, endpoint: forced });
        }
    }

    let mut arena: Vec<SearchNode> = Vec::new();
    let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
    let mut seq: u64 = 0;
    let mut best_cost: FxHashMap<(NodeId, Option<EndpointId>), f32> = FxHashMap::default();
    let mut expanded_nodes: FxHashSet<NodeId> = FxHashSet::default();
    let mut best_path_nodes: FxHashSet<NodeId> = FxHashSet::default();
    let mut best: Option<usize> = None;
    let mut forced_start = query.forced_start;
    let mut expansions: usize = 0;

    arena.push(SearchNode {
        node:   query.start,
        g:      0.0,
        h:      heuristic(start, None, goal),
        parent: None,
        entry:  None,
        via:    None,
        depth:  0,
    });
    open.push(OpenEntry { f: arena[0].f(), seq, index: 0 });
    seq += 1;

    loop {
        token.check()?;
        let Some(OpenEntry { index, .. }) = open.pop() else { break };
        let current = arena[index];

        // Stale entry: the state was already reached more cheaply.
        let key = (current.node, current.entry);
        if best_cost.get(&key).is_some_and(|&known| current.g > known) {
            continue;
        }
        best_cost.insert(key, current.g);

        let at_goal = current.node == query.end
            && query.forced_end.is_none_or(|forced| current.entry == Some(forced));
        if at_goal {
            if best.is_none_or(|b| current.g < arena[b].g) {
                best = Some(index);
                best_path_nodes = path_nodes(&arena, index);
            } else {
                continue;
            }
        }

        if let Some(b) = best {
            let off_best_path = !best_path_nodes.contains(&current.node);
            if off_best_path && expanded_nodes.contains(&current.node) {
                continue;
            }
            expanded_nodes.insert(current.node);
            if off_best_path && current.f() >= arena[b].g {
                continue;
            }
        } else {
            expanded_nodes.insert(current.node);
        }

        let Some(node) = graph.node(current.node) else { continue };
        expansions += 1;
        expand(graph, node, goal, index, &current, query, forced_start, cost, &mut arena, &mut open, &mut seq);
        forced_start = None;
    }

    match best {
        Some(b) => {
            let path = FoundPath { steps: reconstruct(&arena, b), total_cost: arena[b].g };
            debug!(
                start = %query.start,
                end = %query.end,
                steps = path.steps.len(),
                cost = path.total_cost,
                expansions,
                "path found"
            );
            Ok(path)
        }
        None => {
            debug!(start = %query.start, end = %query.end, expansions, "no path");
            Err(RoutingError::NoPath { from: query.start, to: query.end })
        }
    }
}

/// Push every admissible successor of `current`.
#[allow(clippy::too_many_arguments)]
fn expand(
    graph: &NetGraph,
    node: &GraphNode,
    goal: &GraphNode,
    index: usize,
    current: &SearchNode,
    query: &SearchQuery,
    forced_start: Option<EndpointId>,
    cost: &CostModel,
    arena: &mut Vec<SearchNode>,
    open: &mut BinaryHeap<OpenEntry>,
    seq: &mut u64,
) {
    // Turns available from the lane we arrived on.  No turn table means the
    // lane is a dead end here.
    let allowed: Option<&[EndpointId]> = current
        .entry
        .map(|entry| node.connections_from(entry).unwrap_or(&[]));

    for route in node.routes() {
        let Some(neighbor) = graph.node(route.neighbor) else {
            trace!(node = %node.id, neighbor = %route.neighbor, "neighbour not in graph");
            continue;
        };

        for &via in &route.via {
            if allowed.is_some_and(|turns| !turns.contains(&via)) {
                continue;
            }
            if forced_start.is_some_and(|forced| via != forced) {
                continue;
            }
            if let Some(entry) = current.entry {
                let permitted = node.endpoint(entry).is_some_and(|src| {
                    src.connection_to(via).is_none_or(|turn| turn.allows(query.vehicle))
                });
                if !permitted {
                    trace!(node = %node.id, %entry, %via, vehicle = %query.vehicle, "turn not permitted");
                    continue;
                }
            }
            let Some(next_entry) = node.incoming_for(via) else {
                trace!(node = %node.id, %via, "outgoing endpoint has no pair");
                continue;
            };

            let g = current.g + cost.transition_cost(current.entry, via, current.depth);
            let h = heuristic(neighbor, Some(next_entry), goal);
            let next = arena.len();
            arena.push(SearchNode {
                node:   route.neighbor,
                g,
                h,
                parent: Some(index),
                entry:  Some(next_entry),
                via:    Some(via),
                depth:  current.depth + 1,
            });
            open.push(OpenEntry { f: g + h, seq: *seq, index: next });
            *seq += 1;
        }
    }
}

fn path_nodes(arena: &[SearchNode], mut index: usize) -> FxHashSet<NodeId> {
    let mut nodes = FxHashSet::default();
    loop {
        let n = &arena[index];
        nodes.insert(n.node);
        match n.parent {
            Some(p) => index = p,
            None => return nodes,
        }
    }
}

fn reconstruct(arena: &[SearchNode], mut index: usize) -> Vec<PathStep> {
    let mut steps = Vec::new();
    while let Some(parent) = arena[index].parent {
        let n = &arena[index];
        if let Some(via) = n.via {
            steps.push(PathStep { from_node: arena[parent].node, to_node: n.node, via_endpoint: via });
        }
        index = parent;
    }
    steps.reverse();
    steps
}
