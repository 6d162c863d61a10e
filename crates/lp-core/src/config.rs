//! Routing configuration.
//!
//! # Design
//!
//! Configuration is plain data: every knob is a public field with a
//! documented default, and the application decides where the values come
//! from (a JSON/TOML file via the `serde` feature, CLI flags, hard-coded
//! constants).  Nothing in this module reads files or environment variables.
//!
//! The edge cost model of the routing crate reads every constant from
//! [`CostWeights`].  Defaults are the tuned production values:
//!
//! ```text
//! cost = base
//!      + |from_lane - to_lane| * lane_switch_penalty
//!      + (1 - speed / reference_speed) * speed_penalty
//!      + usage * usage_penalty * (1 - min(depth * usage_depth_decay, max_usage_decay))
//!      + depth * depth_penalty
//! ```

use crate::{CoreError, CoreResult};

// ── CostWeights ───────────────────────────────────────────────────────────────

/// Constants of the per-transition edge cost model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostWeights {
    /// Flat cost of every lane-endpoint transition.  Default: 1.0.
    pub base_cost: f32,

    /// Cost per lane of lateral offset between entry and exit lane.
    /// Default: 0.5.
    pub lane_switch_penalty: f32,

    /// Speed at which the slow-lane penalty reaches zero.  Default: 150.
    pub reference_speed: f32,

    /// Substituted for infinite or above-reference speed limits.  Default: 120.
    pub default_speed: f32,

    /// Penalty multiplier for slow lanes.  Default: 2.0.
    pub speed_penalty: f32,

    /// Penalty multiplier for the live usage fraction.  Default: 4.0.
    pub usage_penalty: f32,

    /// Fraction of the usage penalty dropped per hop of search depth.
    /// Default: 0.1.
    pub usage_depth_decay: f32,

    /// Upper bound on the depth decay of the usage penalty.  Default: 0.8.
    pub max_usage_decay: f32,

    /// Cost per hop of search depth.  Default: 0.1.
    pub depth_penalty: f32,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            base_cost:           1.0,
            lane_switch_penalty: 0.5,
            reference_speed:     150.0,
            default_speed:       120.0,
            speed_penalty:       2.0,
            usage_penalty:       4.0,
            usage_depth_decay:   0.1,
            max_usage_decay:     0.8,
            depth_penalty:       0.1,
        }
    }
}

impl CostWeights {
    /// Check that every weight is finite and non-negative and the speeds are
    /// positive.
    pub fn validate(&self) -> CoreResult<()> {
        let weights = [
            ("base_cost",           self.base_cost),
            ("lane_switch_penalty", self.lane_switch_penalty),
            ("speed_penalty",       self.speed_penalty),
            ("usage_penalty",       self.usage_penalty),
            ("usage_depth_decay",   self.usage_depth_decay),
            ("max_usage_decay",     self.max_usage_decay),
            ("depth_penalty",       self.depth_penalty),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::Config(format!(
                    "cost weight `{name}` must be finite and >= 0, got {value}"
                )));
            }
        }
        if !(self.reference_speed.is_finite() && self.reference_speed > 0.0) {
            return Err(CoreError::Config(format!(
                "reference_speed must be finite and > 0, got {}",
                self.reference_speed
            )));
        }
        if !(self.default_speed.is_finite() && self.default_speed > 0.0) {
            return Err(CoreError::Config(format!(
                "default_speed must be finite and > 0, got {}",
                self.default_speed
            )));
        }
        if self.max_usage_decay > 1.0 {
            return Err(CoreError::Config(format!(
                "max_usage_decay must be <= 1, got {}",
                self.max_usage_decay
            )));
        }
        Ok(())
    }
}

// ── RoutingConfig ─────────────────────────────────────────────────────────────

/// Top-level routing service configuration.
///
/// Typically loaded from a TOML/JSON file by the application crate and passed
/// to the path finder builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutingConfig {
    /// Number of OS worker threads serving pathing requests.  Fixed for the
    /// lifetime of the service.  Default: 2.
    pub worker_count: usize,

    /// Edge cost model constants.
    pub cost: CostWeights,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            worker_count: 2,
            cost:         CostWeights::default(),
        }
    }
}

impl RoutingConfig {
    /// Default configuration with `worker_count` workers.
    pub fn with_workers(worker_count: usize) -> Self {
        Self { worker_count, ..Self::default() }
    }

    /// Validate the configuration before any thread is spawned.
    pub fn validate(&self) -> CoreResult<()> {
        if self.worker_count == 0 {
            return Err(CoreError::Config(
                "worker_count must be at least 1".to_string(),
            ));
        }
        self.cost.validate()
    }
}
