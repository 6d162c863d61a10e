//! The path finder service.
//!
//! # Threading model
//!
//! A fixed pool of named OS threads drains one unbounded FIFO queue
//! (`crossbeam_channel`).  Submission never blocks; workers block only while
//! the queue is empty.
//!
//! # Graph sharing
//!
//! The graph lives in `RwLock<Arc<NetGraph>>`.  A worker takes the read lock
//! just long enough to clone the `Arc` and searches that snapshot lock-free.
//! `build_graph` and `clear_graph` take the write lock; a build mutates the
//! graph in place through `Arc::make_mut`, which copies it first if a search
//! still holds the previous snapshot.
//!
//! # Cancellation
//!
//! Each job captures a [`CancellationToken`] when it is enqueued.
//! `clear_graph`, `cancel_all`, and shutdown bump the shared epoch, so every
//! job queued or running at that moment resolves to `Cancelled`, while jobs
//! submitted afterwards run normally.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use lp_core::{RequestId, RoutingConfig};
use lp_network::{NetworkProvider, NodeSnapshot};
use lp_routing::{
    AStarPathing, CancellationSource, CancellationToken, NetGraph, PathSearch, RoutingError, build_nodes,
};

use crate::builder::PathFinderBuilder;
use crate::error::{ServiceError, ServiceResult};
use crate::request::{Completion, CorrelationId, PathingRequest, PathingResponse, PathingState};

struct Job {
    request:     PathingRequest,
    correlation: CorrelationId,
    completion:  Completion,
    token:       CancellationToken,
}

/// State shared between the handle and every worker.
struct Shared<S> {
    graph:   RwLock<Arc<NetGraph>>,
    search:  S,
    cancel:  CancellationSource,
    pending: AtomicUsize,
}

// ── PathFinder ────────────────────────────────────────────────────────────────

/// Owns the routing graph and the worker pool.
///
/// Dropping the finder shuts it down: queued requests are delivered as
/// `Cancelled` and every worker is joined.
pub struct PathFinder<S: PathSearch + 'static = AStarPathing> {
    shared:  Arc<Shared<S>>,
    jobs:    Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl PathFinder<AStarPathing> {
    /// A finder running [`AStarPathing`] against `provider`.
    pub fn new(config: RoutingConfig, provider: Arc<dyn NetworkProvider>) -> ServiceResult<Self> {
        PathFinderBuilder::new(config, provider).build()
    }
}

impl<S: PathSearch + 'static> PathFinder<S> {
    /// Spawn `worker_count` workers.  The count is assumed validated.
    pub(crate) fn spawn(worker_count: usize, search: S) -> ServiceResult<Self> {
        let (tx, rx) = unbounded::<Job>();
        let mut finder = Self {
            shared: Arc::new(Shared {
                graph:   RwLock::new(Arc::new(NetGraph::new())),
                search,
                cancel:  CancellationSource::new(),
                pending: AtomicUsize::new(0),
            }),
            jobs:    Some(tx),
            workers: Vec::with_capacity(worker_count),
        };

        for index in 0..worker_count {
            let shared = Arc::clone(&finder.shared);
            let rx: Receiver<Job> = rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("pathfinder-worker-{index}"))
                .spawn(move || worker_loop(index, &shared, &rx))
                // `finder` is dropped on error, which joins the workers
                // spawned so far.
                .map_err(ServiceError::Spawn)?;
            finder.workers.push(handle);
        }

        info!(workers = worker_count, "path finder started");
        Ok(finder)
    }

    // ── Graph lifecycle ───────────────────────────────────────────────────

    /// Merge `snapshots` into the graph.  Nodes are built before the write
    /// lock is taken; a node id already present is replaced.
    pub fn build_graph(&self, snapshots: Vec<NodeSnapshot>) {
        let submitted = snapshots.len();
        let nodes = build_nodes(snapshots);

        let mut guard = self.shared.graph.write();
        Arc::make_mut(&mut guard).extend(nodes);
        info!(submitted, total = guard.len(), "graph built");
    }

    /// Replace the graph with an empty one.  In the same critical section
    /// every queued and running search is cancelled and memoized segment
    /// data is dropped.
    pub fn clear_graph(&self) {
        let mut guard = self.shared.graph.write();
        let epoch = self.shared.cancel.cancel();
        *guard = Arc::new(NetGraph::new());
        self.shared.search.invalidate();
        drop(guard);
        info!(epoch, "graph cleared");
    }

    /// Cancel every queued and running request without touching the graph.
    /// Returns the new epoch.
    pub fn cancel_all(&self) -> u64 {
        let epoch = self.shared.cancel.cancel();
        info!(epoch, "all pending requests cancelled");
        epoch
    }

    /// Drop memoized segment data, e.g. after lane speed limits changed.
    pub fn invalidate_costs(&self) {
        self.shared.search.invalidate();
        debug!("segment cache invalidated");
    }

    // ── Requests ──────────────────────────────────────────────────────────

    /// Enqueue `request`.  The response is delivered to `completion` on a
    /// worker thread, tagged with `correlation`.
    pub fn find_path(
        &self,
        request: PathingRequest,
        correlation: CorrelationId,
        completion: impl Into<Completion>,
    ) -> RequestId {
        let id = request.id();
        let job = Job {
            request,
            correlation,
            completion: completion.into(),
            token: self.shared.cancel.token(),
        };
        debug!(request = %id, correlation, "request queued");

        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        let sent = match &self.jobs {
            Some(tx) => tx.send(job).map_err(|e| e.into_inner()),
            None => Err(job),
        };
        if let Err(job) = sent {
            // Only reachable once every worker has exited.
            self.shared.pending.fetch_sub(1, Ordering::AcqRel);
            let response = job.request.complete_request(PathingState::Cancelled, Vec::new(), 0.0);
            job.completion.deliver(job.correlation, response);
        }
        id
    }

    // ── Introspection ─────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.shared.graph.read().len()
    }

    /// Snapshot of the current graph.
    pub fn graph(&self) -> Arc<NetGraph> {
        Arc::clone(&self.shared.graph.read())
    }

    /// Number of cancellations performed so far.
    pub fn epoch(&self) -> u64 {
        self.shared.cancel.epoch()
    }

    /// Requests submitted but not yet answered.
    pub fn pending_requests(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn search(&self) -> &S {
        &self.shared.search
    }

    /// Cancel outstanding work, deliver `Cancelled` for every queued request,
    /// and join the workers.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(tx) = self.jobs.take() else { return };
        self.shared.cancel.cancel();
        drop(tx);
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("path finder worker panicked");
            }
        }
        info!("path finder stopped");
    }
}

impl<S: PathSearch + 'static> Drop for PathFinder<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Workers ───────────────────────────────────────────────────────────────────

fn worker_loop<S: PathSearch>(index: usize, shared: &Shared<S>, jobs: &Receiver<Job>) {
    debug!(worker = index, "worker started");
    // Ends once the sender is dropped and the queue is drained.
    for job in jobs.iter() {
        shared.process(job);
    }
    debug!(worker = index, "worker exiting");
}

impl<S: PathSearch> Shared<S> {
    fn process(&self, job: Job) {
        let Job { request, correlation, completion, token } = job;
        let response = self.run(&request, &token);
        self.pending.fetch_sub(1, Ordering::AcqRel);

        debug!(
            request = %request.id(),
            correlation,
            state = %response.state(),
            steps = response.steps().len(),
            cost = response.total_cost(),
            "request finished"
        );

        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| completion.deliver(correlation, response))) {
            error!(
                request = %request.id(),
                correlation,
                panic = panic_message(payload.as_ref()),
                "completion panicked"
            );
        }
    }

    fn run(&self, request: &PathingRequest, token: &CancellationToken) -> PathingResponse {
        if token.is_cancelled() {
            return request.complete_request(PathingState::Cancelled, Vec::new(), 0.0);
        }

        let graph = Arc::clone(&self.graph.read());
        let query = request.query();
        let outcome = catch_unwind(AssertUnwindSafe(|| self.search.find_path(&graph, &query, token)));

        match outcome {
            // A result computed against a cleared graph is never reported.
            Ok(_) if token.is_cancelled() => request.complete_request(PathingState::Cancelled, Vec::new(), 0.0),
            Ok(Err(RoutingError::Cancelled)) => request.complete_request(PathingState::Cancelled, Vec::new(), 0.0),
            Ok(Ok(path)) => request.complete_request(PathingState::Completed, path.steps, path.total_cost),
            Ok(Err(err)) => {
                warn!(request = %request.id(), start = %request.start(), end = %request.end(), %err, "path search failed");
                request.complete_request(PathingState::Failed, Vec::new(), 0.0)
            }
            Err(payload) => {
                error!(
                    request = %request.id(),
                    start = %request.start(),
                    end = %request.end(),
                    panic = panic_message(payload.as_ref()),
                    "path search panicked"
                );
                request.complete_request(PathingState::Failed, Vec::new(), 0.0)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
