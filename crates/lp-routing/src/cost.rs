//! Edge cost model.
//!
//! Every transition out of a junction costs `base_cost`.  When the search
//! knows the lane it arrived on, the provider is asked about both endpoints
//! and the following terms are added:
//!
//! | Term         | Formula                                                        |
//! |--------------|----------------------------------------------------------------|
//! | lane switch  | `|Δlane_number| × lane_switch_penalty`                          |
//! | speed        | `(1 − speed / reference_speed) × speed_penalty`                |
//! | usage        | `usage × usage_penalty × (1 − min(depth × decay, max_decay))`  |
//! | depth        | `depth × depth_penalty`                                        |
//!
//! Speed and usage are read from the lane the search is about to drive (the
//! lane of the outgoing endpoint).  A speed that is non-finite or above
//! `reference_speed` counts as `default_speed`; a usage outside `[0, 1]`
//! counts as zero.  The last three terms need lane data: if the provider
//! does not know the segment or lane, only base and lane switch apply.
//!
//! Every term is non-negative, so each transition costs at least
//! `base_cost`.

use std::sync::Arc;

use lp_core::{CostWeights, EndpointId};
use lp_network::NetworkProvider;

use crate::cache::SegmentCache;

/// Prices transitions using provider data and a shared [`SegmentCache`].
#[derive(Clone)]
pub struct CostModel {
    provider: Arc<dyn NetworkProvider>,
    cache:    Arc<SegmentCache>,
    weights:  CostWeights,
}

impl CostModel {
    /// Cost model with its own private segment cache.
    pub fn new(provider: Arc<dyn NetworkProvider>, weights: CostWeights) -> Self {
        Self::with_cache(provider, Arc::new(SegmentCache::new()), weights)
    }

    pub fn with_cache(provider: Arc<dyn NetworkProvider>, cache: Arc<SegmentCache>, weights: CostWeights) -> Self {
        Self { provider, cache, weights }
    }

    pub fn weights(&self) -> &CostWeights {
        &self.weights
    }

    pub fn cache(&self) -> &Arc<SegmentCache> {
        &self.cache
    }

    pub fn provider(&self) -> &Arc<dyn NetworkProvider> {
        &self.provider
    }

    /// Cost of leaving a junction through `via`, having arrived on `entry`
    /// (`None` at the start of a search), `depth` transitions into the path.
    pub fn transition_cost(&self, entry: Option<EndpointId>, via: EndpointId, depth: u32) -> f32 {
        let w = &self.weights;
        let mut cost = w.base_cost;

        let Some(entry) = entry else { return cost };
        let (Some(from), Some(to)) = (self.provider.lane_endpoint(entry), self.provider.lane_endpoint(via))
        else {
            return cost;
        };
        cost += self.lane_switch_cost(from.lane_number, to.lane_number);

        let Some(segment) = self.cache.get_or_fetch(to.segment, self.provider.as_ref()) else {
            return cost;
        };
        let Some(lane) = segment.lane(to.lane) else { return cost };
        let usage = self.provider.lane_usage(to.segment, to.lane).unwrap_or(lane.live_usage);

        cost + self.speed_cost(lane.max_speed) + self.usage_cost(usage, depth) + self.depth_cost(depth)
    }

    pub fn lane_switch_cost(&self, from_lane: i32, to_lane: i32) -> f32 {
        (from_lane - to_lane).unsigned_abs() as f32 * self.weights.lane_switch_penalty
    }

    pub fn speed_cost(&self, max_speed: f32) -> f32 {
        let w = &self.weights;
        let speed = if !max_speed.is_finite() || max_speed > w.reference_speed {
            w.default_speed
        } else {
            max_speed
        };
        (1.0 - speed / w.reference_speed) * w.speed_penalty
    }

    pub fn usage_cost(&self, usage: f32, depth: u32) -> f32 {
        let w = &self.weights;
        let usage = if (0.0..=1.0).contains(&usage) { usage } else { 0.0 };
        let decay = (depth as f32 * w.usage_depth_decay).min(w.max_usage_decay);
        usage * w.usage_penalty * (1.0 - decay)
    }

    #[inline]
    pub fn depth_cost(&self, depth: u32) -> f32 {
        depth as f32 * self.weights.depth_penalty
    }
}

impl std::fmt::Debug for CostModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostModel")
            .field("weights", &self.weights)
            .field("cached_segments", &self.cache.len())
            .finish_non_exhaustive()
    }
}
