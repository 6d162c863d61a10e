//! `lp-service` — the asynchronous path finder.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                         |
//! |-------------|------------------------------------------------------------------|
//! | [`finder`]  | `PathFinder`: shared graph, worker pool, graph build/clear       |
//! | [`builder`] | `PathFinderBuilder`: validates config and spawns workers         |
//! | [`request`] | `PathingRequest`, `PathingResponse`, `PathingState`, `Completion`|
//! | [`error`]   | `ServiceError`, `ServiceResult<T>`                               |
//!
//! # Usage
//!
//! ```rust,ignore
//! let net = Arc::new(builder.build()?);
//! let finder = PathFinderBuilder::new(RoutingConfig::default(), net.clone()).build()?;
//! finder.build_graph(net.snapshots());
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! finder.find_path(PathingRequest::new(NodeId(0), NodeId(2)), 1, tx);
//! let (correlation, response) = rx.recv()?;
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | `build_graph` builds nodes on Rayon's thread pool.      |

pub mod builder;
pub mod error;
pub mod finder;
pub mod request;

#[cfg(test)]
mod tests;

pub use builder::PathFinderBuilder;
pub use error::{ServiceError, ServiceResult};
pub use finder::PathFinder;
pub use request::{Completion, CorrelationId, PathingRequest, PathingResponse, PathingState};

pub use lp_routing::PathStep;
