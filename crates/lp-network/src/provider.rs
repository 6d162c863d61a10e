//! The `NetworkProvider` capability.
//!
//! # Contract
//!
//! A provider is a synchronous, read-only accessor into the authoritative
//! network.  Routing calls it from worker threads while searches run, so
//! implementations must be `Send + Sync` and should answer quickly; anything
//! engine-specific (marshalling onto a host thread, object lookups) is the
//! provider's business.
//!
//! Unknown ids are answered with `None` / an empty list, never a panic.  The
//! routing cost model treats missing data as "no penalty information" and
//! prices the transition at the base cost only.

use std::sync::Arc;

use lp_core::{EndpointId, LaneId, NodeId, SegmentId};

use crate::model::{LaneEndpoint, Segment};

/// Read-only access to segments, lanes, and lane endpoints.
pub trait NetworkProvider: Send + Sync {
    /// Structure of a segment: nodes, endpoints, lanes, endpoint pairing.
    fn segment(&self, id: SegmentId) -> Option<Segment>;

    /// A single lane endpoint.
    fn lane_endpoint(&self, id: EndpointId) -> Option<LaneEndpoint>;

    /// Every lane endpoint located at `node`.
    fn node_lane_endpoints(&self, node: NodeId) -> Vec<LaneEndpoint>;

    /// Current usage fraction of a lane.
    ///
    /// Segment structure is cached by routing; usage is not, so hosts with
    /// live traffic statistics should override this.  The default returns
    /// `None`, meaning "use the value in the segment snapshot".
    fn lane_usage(&self, _segment: SegmentId, _lane: LaneId) -> Option<f32> {
        None
    }
}

impl<P: NetworkProvider + ?Sized> NetworkProvider for Arc<P> {
    fn segment(&self, id: SegmentId) -> Option<Segment> {
        (**self).segment(id)
    }

    fn lane_endpoint(&self, id: EndpointId) -> Option<LaneEndpoint> {
        (**self).lane_endpoint(id)
    }

    fn node_lane_endpoints(&self, node: NodeId) -> Vec<LaneEndpoint> {
        (**self).node_lane_endpoints(node)
    }

    fn lane_usage(&self, segment: SegmentId, lane: LaneId) -> Option<f32> {
        (**self).lane_usage(segment, lane)
    }
}

// ── EmptyNetwork ──────────────────────────────────────────────────────────────

/// A provider that knows nothing.
///
/// Useful when the graph is built from snapshots alone and every transition
/// should cost the flat base cost (e.g. topology-only tests).
#[derive(Copy, Clone, Debug, Default)]
pub struct EmptyNetwork;

impl NetworkProvider for EmptyNetwork {
    fn segment(&self, _id: SegmentId) -> Option<Segment> {
        None
    }

    fn lane_endpoint(&self, _id: EndpointId) -> Option<LaneEndpoint> {
        None
    }

    fn node_lane_endpoints(&self, _node: NodeId) -> Vec<LaneEndpoint> {
        Vec::new()
    }
}
