//! Network-model error type.

use thiserror::Error;

use lp_core::{EndpointId, LaneId, NodeId, SegmentId};

/// Errors produced while assembling a network in `lp-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    UnknownNode(NodeId),

    #[error("segment {0} not found in network")]
    UnknownSegment(SegmentId),

    #[error("lane {lane} not found on segment {segment}")]
    UnknownLane { segment: SegmentId, lane: LaneId },

    #[error("endpoint {0} not found in network")]
    UnknownEndpoint(EndpointId),

    #[error("duplicate endpoint {0}")]
    DuplicateEndpoint(EndpointId),

    #[error("segment {segment} does not touch node {node}")]
    SegmentNodeMismatch { segment: SegmentId, node: NodeId },

    #[error("turn {from} -> {to} must go from an incoming to an outgoing endpoint of the same node")]
    InvalidTurn { from: EndpointId, to: EndpointId },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
