//! Routing error type.

use thiserror::Error;

use lp_core::{EndpointId, NodeId};

/// Errors produced by a path search.
///
/// `NodeNotFound` and `InvalidForcedEndpoint` are caller mistakes and are
/// raised before any search work; `NoPath` is a legitimate negative answer;
/// `Cancelled` means the search observed its cancellation token.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoutingError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("forced start endpoint {endpoint} is not an outgoing endpoint of start node {node}")]
    InvalidForcedEndpoint { node: NodeId, endpoint: EndpointId },

    #[error("no path found from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("search cancelled")]
    Cancelled,
}

impl RoutingError {
    /// `true` for errors caused by an invalid request rather than by the
    /// network or by cancellation.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            RoutingError::NodeNotFound(_) | RoutingError::InvalidForcedEndpoint { .. }
        )
    }
}

pub type RoutingResult<T> = Result<T, RoutingError>;
