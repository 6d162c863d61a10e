//! `lp-network` — the read-only view of the road network consumed by routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`model`]    | `Segment`, `Lane`, `LaneEndpoint`, `EndpointConnection`, `NodeSnapshot` |
//! | [`provider`] | `NetworkProvider` trait, `EmptyNetwork`                        |
//! | [`memory`]   | `InMemoryNetwork`, `InMemoryNetworkBuilder`                    |
//! | [`error`]    | `NetworkError`, `NetworkResult<T>`                             |
//!
//! The authoritative network lives outside this workspace (the simulation
//! host).  Routing only ever talks to it through [`NetworkProvider`], and
//! receives junction topology as [`NodeSnapshot`]s.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public model types.     |

pub mod error;
pub mod memory;
pub mod model;
pub mod provider;


pub use error::{NetworkError, NetworkResult};
pub use memory::{InMemoryNetwork, InMemoryNetworkBuilder};
pub use model::{EndpointConnection, EndpointKind, Lane, LaneEndpoint, NodeSnapshot, Segment};
pub use provider::{EmptyNetwork, NetworkProvider};
