//! `lp-core` — foundational types for the `lanepath` lane-level routing engine.
//!
//! This crate is a dependency of every other `lp-*` crate.  It intentionally
//! has no `lp-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `SegmentId`, `LaneId`, `EndpointId`, `RequestId` |
//! | [`geo`]         | `Vec2` planar position, Euclidean distance                |
//! | [`vehicle`]     | `VehicleCategory` enum                                    |
//! | [`config`]      | `RoutingConfig`, `CostWeights`                            |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Lets applications load `RoutingConfig` from JSON/TOML.     |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod vehicle;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CostWeights, RoutingConfig};
pub use error::{CoreError, CoreResult};
pub use geo::Vec2;
pub use ids::{EndpointId, LaneId, NodeId, RequestId, SegmentId};
pub use vehicle::VehicleCategory;
