//! `lp-routing` — lane-level routing graph and search.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                         |
//! |------------|------------------------------------------------------------------|
//! | [`graph`]  | `NetGraph`, `GraphNode`, `GraphRoute`                            |
//! | [`search`] | `PathSearch` trait, `SearchQuery`, `FoundPath`, `PathStep`       |
//! | [`astar`]  | `AStarPathing`, `find_path_astar`                                |
//! | [`cost`]   | `CostModel`, per-transition edge cost                            |
//! | [`cache`]  | `SegmentCache`, memoized provider segment lookups                |
//! | [`cancel`] | `CancellationSource`, `CancellationToken`                        |
//! | [`error`]  | `RoutingError`, `RoutingResult<T>`                               |
//!
//! # Routing granularity
//!
//! Search states are `(junction, entry lane endpoint)` pairs rather than bare
//! junctions: arriving at the same junction on a different lane changes which
//! turns are available and what they cost.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | `NetGraph::add_nodes` builds nodes on Rayon's thread pool. |
//! | `serde`    | Derives `Serialize`/`Deserialize` on result types.         |

pub mod astar;
pub mod cache;
pub mod cancel;
pub mod cost;
pub mod error;
pub mod graph;
pub mod search;


pub use astar::{AStarPathing, find_path_astar};
pub use cache::{CacheStats, SegmentCache};
pub use cancel::{CancellationSource, CancellationToken};
pub use cost::CostModel;
pub use error::{RoutingError, RoutingResult};
pub use graph::{GraphNode, GraphRoute, NetGraph, build_nodes};
pub use search::{FoundPath, PathSearch, PathStep, SearchQuery};
