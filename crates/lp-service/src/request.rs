//! Request/response model.
//!
//! A [`PathingRequest`] is created by the caller and consumed by a worker.
//! The worker turns it into exactly one [`PathingResponse`] through
//! [`PathingRequest::complete_request`], the only way to build a response.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Sender;
use tracing::debug;

use lp_core::{EndpointId, NodeId, RequestId, VehicleCategory};
use lp_routing::{PathStep, SearchQuery};

/// Caller-chosen tag returned alongside the response.
pub type CorrelationId = u64;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

// ── PathingState ──────────────────────────────────────────────────────────────

/// Outcome of a request.
///
/// `Pending` is the state of a request still in the queue; every response
/// carries one of the three terminal states.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PathingState {
    Pending,
    /// A path was found.
    Completed,
    /// The search failed: unknown node, invalid forced endpoint, no path, or
    /// a panic inside the search.
    Failed,
    /// Cancellation was observed before or during the search.
    Cancelled,
}

impl PathingState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, PathingState::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PathingState::Pending   => "pending",
            PathingState::Completed => "completed",
            PathingState::Failed    => "failed",
            PathingState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PathingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PathingRequest ────────────────────────────────────────────────────────────

/// A routing job, immutable once built.  Node ids are not checked here; unknown nodes surface as a
/// `Failed` response.
#[derive(Clone, Debug, PartialEq)]
pub struct PathingRequest {
    id:             RequestId,
    start:          NodeId,
    end:            NodeId,
    vehicle:        VehicleCategory,
    forced_start:   Option<EndpointId>,
    forced_end:     Option<EndpointId>,
    /// Opaque caller tag copied to the response.
    combination_id: Option<u64>,
}

impl PathingRequest {
    /// A request for the default vehicle with no lane constraints.  Assigns a
    /// process-unique [`RequestId`].
    pub fn new(start: NodeId, end: NodeId) -> Self {
        Self {
            id: RequestId(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)),
            start,
            end,
            vehicle: VehicleCategory::default(),
            forced_start: None,
            forced_end: None,
            combination_id: None,
        }
    }

    pub fn with_vehicle(mut self, vehicle: VehicleCategory) -> Self {
        self.vehicle = vehicle;
        self
    }

    pub fn with_forced_start(mut self, endpoint: EndpointId) -> Self {
        self.forced_start = Some(endpoint);
        self
    }

    pub fn with_forced_end(mut self, endpoint: EndpointId) -> Self {
        self.forced_end = Some(endpoint);
        self
    }

    pub fn with_combination_id(mut self, combination_id: u64) -> Self {
        self.combination_id = Some(combination_id);
        self
    }

    #[inline]
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn start(&self) -> NodeId { self.start }
    pub fn end(&self) -> NodeId { self.end }
    pub fn vehicle(&self) -> VehicleCategory { self.vehicle }
    pub fn forced_start(&self) -> Option<EndpointId> { self.forced_start }
    pub fn forced_end(&self) -> Option<EndpointId> { self.forced_end }
    pub fn combination_id(&self) -> Option<u64> { self.combination_id }

    /// The search inputs of this request.
    pub fn query(&self) -> SearchQuery {
        SearchQuery {
            start:        self.start,
            end:          self.end,
            vehicle:      self.vehicle,
            forced_start: self.forced_start,
            forced_end:   self.forced_end,
        }
    }

    /// Build the response for this request.  Identifying fields are copied
    /// from the request.
    pub fn complete_request(&self, state: PathingState, steps: Vec<PathStep>, total_cost: f32) -> PathingResponse {
        debug_assert!(state.is_terminal(), "responses carry a terminal state");
        PathingResponse {
            request_id:     self.id,
            start:          self.start,
            end:            self.end,
            forced_start:   self.forced_start,
            forced_end:     self.forced_end,
            combination_id: self.combination_id,
            state,
            steps,
            total_cost,
        }
    }
}

// ── PathingResponse ───────────────────────────────────────────────────────────

/// Immutable result of one request.
#[derive(Clone, Debug, PartialEq)]
pub struct PathingResponse {
    request_id:     RequestId,
    start:          NodeId,
    end:            NodeId,
    forced_start:   Option<EndpointId>,
    forced_end:     Option<EndpointId>,
    combination_id: Option<u64>,
    state:          PathingState,
    steps:          Vec<PathStep>,
    total_cost:     f32,
}

impl PathingResponse {
    pub fn request_id(&self) -> RequestId { self.request_id }
    pub fn start(&self) -> NodeId { self.start }
    pub fn end(&self) -> NodeId { self.end }
    pub fn forced_start(&self) -> Option<EndpointId> { self.forced_start }
    pub fn forced_end(&self) -> Option<EndpointId> { self.forced_end }
    pub fn combination_id(&self) -> Option<u64> { self.combination_id }
    pub fn state(&self) -> PathingState { self.state }
    pub fn total_cost(&self) -> f32 { self.total_cost }

    /// Ordered transitions; empty unless `Completed` with `start != end`.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<PathStep> {
        self.steps
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.state == PathingState::Completed
    }
}

// ── Completion ────────────────────────────────────────────────────────────────

type Callback = Box<dyn FnOnce(CorrelationId, PathingResponse) + Send + 'static>;

/// Where a worker delivers a response.  Delivery happens on the worker
/// thread; callers that need the result elsewhere should use a channel.
pub enum Completion {
    Callback(Callback),
    Channel(Sender<(CorrelationId, PathingResponse)>),
}

impl Completion {
    pub fn callback<F>(f: F) -> Self
    where
        F: FnOnce(CorrelationId, PathingResponse) + Send + 'static,
    {
        Completion::Callback(Box::new(f))
    }

    pub(crate) fn deliver(self, correlation: CorrelationId, response: PathingResponse) {
        match self {
            Completion::Callback(f) => f(correlation, response),
            Completion::Channel(tx) => {
                if tx.send((correlation, response)).is_err() {
                    debug!(correlation, "response receiver dropped");
                }
            }
        }
    }
}

impl From<Sender<(CorrelationId, PathingResponse)>> for Completion {
    fn from(tx: Sender<(CorrelationId, PathingResponse)>) -> Self {
        Completion::Channel(tx)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Callback(_) => f.write_str("Completion::Callback"),
            Completion::Channel(_) => f.write_str("Completion::Channel"),
        }
    }
}
