//! Unit tests for lp-service.
//!
//! Responses are collected through crossbeam channels.  Tests that need a
//! request to be "in flight" use searches or providers that park until the
//! test releases them, so no test depends on timing.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use crossbeam_channel::{Receiver, Sender, unbounded};

    use lp_core::{EndpointId, LaneId, NodeId, RoutingConfig, SegmentId, Vec2};
    use lp_network::{InMemoryNetwork, InMemoryNetworkBuilder};
    use lp_routing::{
        CancellationToken, FoundPath, NetGraph, PathSearch, RoutingError, RoutingResult, SearchQuery,
    };

    use crate::{CorrelationId, PathFinder, PathFinderBuilder, PathingResponse};

    pub const TIMEOUT: Duration = Duration::from_secs(10);

    pub type Responses = (Sender<(CorrelationId, PathingResponse)>, Receiver<(CorrelationId, PathingResponse)>);

    pub fn responses() -> Responses {
        unbounded()
    }

    /// `n` junctions on a line, one eastbound lane, every through-turn
    /// allowed unless `with_turns` is false.
    pub fn line_network(n: u32, with_turns: bool) -> InMemoryNetwork {
        let mut b = InMemoryNetworkBuilder::new();
        for i in 0..n {
            b.add_node(NodeId(i), Vec2::new(i as f32, 0.0));
        }
        for i in 0..n.saturating_sub(1) {
            let seg = SegmentId(i + 1);
            let out = EndpointId(10 * (i + 1));
            b.add_segment(seg, NodeId(i), NodeId(i + 1))
                .add_lane(seg, LaneId(0), 0, 150.0)
                .add_lane_link(seg, LaneId(0), NodeId(i), out, EndpointId(out.0 + 1));
            if with_turns && i > 0 {
                b.allow_turn(EndpointId(10 * i + 1), out);
            }
        }
        b.build().unwrap()
    }

    /// A running finder over `line_network(n, true)` with the graph built.
    pub fn line_finder(n: u32, workers: usize) -> (PathFinder, Arc<InMemoryNetwork>) {
        let net = Arc::new(line_network(n, true));
        let finder = PathFinderBuilder::new(RoutingConfig::with_workers(workers), net.clone())
            .build()
            .unwrap();
        finder.build_graph(net.snapshots());
        (finder, net)
    }

    /// Announces each call on `entered`, then parks until its token is
    /// cancelled.
    pub struct ParkUntilCancelled {
        pub entered: Sender<()>,
        pub calls:   AtomicUsize,
    }

    impl PathSearch for ParkUntilCancelled {
        fn find_path(&self, _graph: &NetGraph, _query: &SearchQuery, token: &CancellationToken) -> RoutingResult<FoundPath> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.entered.send(());
            while !token.is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
            Err(RoutingError::Cancelled)
        }
    }

    /// Panics on the first call, answers with a trivial path afterwards.
    pub struct PanicsOnce {
        pub calls: AtomicUsize,
    }

    impl PathSearch for PanicsOnce {
        fn find_path(&self, _graph: &NetGraph, _query: &SearchQuery, _token: &CancellationToken) -> RoutingResult<FoundPath> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("search blew up");
            }
            Ok(FoundPath::trivial())
        }
    }
}

// ── Request / response model ──────────────────────────────────────────────────

#[cfg(test)]
mod model {
    use lp_core::{EndpointId, NodeId, VehicleCategory};
    use lp_routing::PathStep;

    use crate::{PathingRequest, PathingState};

    #[test]
    fn request_ids_are_unique() {
        let a = PathingRequest::new(NodeId(0), NodeId(1));
        let b = PathingRequest::new(NodeId(0), NodeId(1));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn response_copies_request_fields() {
        let req = PathingRequest::new(NodeId(3), NodeId(9))
            .with_vehicle(VehicleCategory::Bus)
            .with_forced_start(EndpointId(30))
            .with_forced_end(EndpointId(91))
            .with_combination_id(77);
        let step = PathStep { from_node: NodeId(3), to_node: NodeId(9), via_endpoint: EndpointId(30) };
        let resp = req.complete_request(PathingState::Completed, vec![step], 1.0);

        assert_eq!(resp.request_id(), req.id());
        assert_eq!(resp.start(), NodeId(3));
        assert_eq!(resp.end(), NodeId(9));
        assert_eq!(resp.forced_start(), Some(EndpointId(30)));
        assert_eq!(resp.forced_end(), Some(EndpointId(91)));
        assert_eq!(resp.combination_id(), Some(77));
        assert_eq!(resp.steps(), &[step]);
        assert!(resp.is_completed());
    }

    #[test]
    fn request_accessors_reflect_builder() {
        let req = PathingRequest::new(NodeId(4), NodeId(8))
            .with_vehicle(VehicleCategory::Bus)
            .with_forced_end(EndpointId(12))
            .with_combination_id(3);
        assert_eq!((req.start(), req.end()), (NodeId(4), NodeId(8)));
        assert_eq!(req.vehicle(), VehicleCategory::Bus);
        assert_eq!(req.forced_start(), None);
        assert_eq!(req.forced_end(), Some(EndpointId(12)));
        assert_eq!(req.combination_id(), Some(3));
    }

    #[test]
    fn query_mirrors_request() {
        let req = PathingRequest::new(NodeId(1), NodeId(2)).with_vehicle(VehicleCategory::Tram);
        let q = req.query();
        assert_eq!((q.start, q.end, q.vehicle), (NodeId(1), NodeId(2), VehicleCategory::Tram));
        assert_eq!(q.forced_start, None);
    }

    #[test]
    fn terminal_states() {
        assert!(!PathingState::Pending.is_terminal());
        for s in [PathingState::Completed, PathingState::Failed, PathingState::Cancelled] {
            assert!(s.is_terminal());
        }
        assert_eq!(PathingState::Cancelled.to_string(), "cancelled");
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use std::sync::Arc;

    use lp_core::RoutingConfig;
    use lp_network::EmptyNetwork;

    use crate::{PathFinderBuilder, ServiceError};

    #[test]
    fn zero_workers_rejected() {
        let result = PathFinderBuilder::new(RoutingConfig::with_workers(0), Arc::new(EmptyNetwork)).build();
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }

    #[test]
    fn worker_count_override() {
        let finder = PathFinderBuilder::new(RoutingConfig::default(), Arc::new(EmptyNetwork))
            .worker_count(3)
            .build()
            .unwrap();
        assert_eq!(finder.worker_count(), 3);
        assert_eq!(finder.node_count(), 0);
        finder.shutdown();
    }

    #[test]
    fn default_config_spawns_two_workers() {
        let finder = PathFinderBuilder::new(RoutingConfig::default(), Arc::new(EmptyNetwork)).build().unwrap();
        assert_eq!(finder.worker_count(), 2);
    }
}

// ── Request processing ────────────────────────────────────────────────────────

#[cfg(test)]
mod processing {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lp_core::{EndpointId, NodeId, RoutingConfig};
    use lp_network::EmptyNetwork;
    use lp_routing::PathStep;

    use super::helpers::{PanicsOnce, TIMEOUT, line_finder, line_network, responses};
    use crate::{Completion, PathFinderBuilder, PathingRequest, PathingState};

    #[test]
    fn completes_two_hop_request() {
        let (finder, _net) = line_finder(3, 2);
        let (tx, rx) = responses();
        let req = PathingRequest::new(NodeId(0), NodeId(2)).with_combination_id(5);
        let id = finder.find_path(req, 42, tx);

        let (correlation, resp) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(correlation, 42);
        assert_eq!(resp.request_id(), id);
        assert_eq!(resp.state(), PathingState::Completed);
        assert_eq!(resp.combination_id(), Some(5));
        assert_eq!(resp.steps(), &[
            PathStep { from_node: NodeId(0), to_node: NodeId(1), via_endpoint: EndpointId(10) },
            PathStep { from_node: NodeId(1), to_node: NodeId(2), via_endpoint: EndpointId(20) },
        ]);
        assert!((resp.total_cost() - 2.1).abs() < 1e-4);
        assert_eq!(finder.pending_requests(), 0);
    }

    #[test]
    fn uniform_costs_without_lane_data() {
        let net = line_network(3, true);
        let finder = PathFinderBuilder::new(RoutingConfig::with_workers(1), Arc::new(EmptyNetwork))
            .build()
            .unwrap();
        finder.build_graph(net.snapshots());

        let (tx, rx) = responses();
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(2)), 0, tx);
        let (_, resp) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(resp.state(), PathingState::Completed);
        assert_eq!(resp.total_cost(), 2.0);
    }

    #[test]
    fn callback_completion() {
        let (finder, _net) = line_finder(3, 1);
        let (tx, rx) = responses();
        finder.find_path(
            PathingRequest::new(NodeId(0), NodeId(1)),
            9,
            Completion::callback(move |correlation, resp| {
                tx.send((correlation, resp)).unwrap();
            }),
        );
        let (correlation, resp) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(correlation, 9);
        assert_eq!(resp.steps().len(), 1);
    }

    #[test]
    fn start_equals_end_completes_empty() {
        let (finder, _net) = line_finder(3, 1);
        let (tx, rx) = responses();
        finder.find_path(PathingRequest::new(NodeId(1), NodeId(1)), 0, tx);
        let (_, resp) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(resp.state(), PathingState::Completed);
        assert!(resp.steps().is_empty());
        assert_eq!(resp.total_cost(), 0.0);
    }

    #[test]
    fn failures_become_failed_responses() {
        let (finder, _net) = line_finder(3, 2);
        let (tx, rx) = responses();
        // Unknown node, invalid forced endpoint, and a one-way street.
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(99)), 1, tx.clone());
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(2)).with_forced_start(EndpointId(20)), 2, tx.clone());
        finder.find_path(PathingRequest::new(NodeId(2), NodeId(0)), 3, tx);

        let mut seen = HashSet::new();
        for _ in 0..3 {
            let (correlation, resp) = rx.recv_timeout(TIMEOUT).unwrap();
            assert_eq!(resp.state(), PathingState::Failed);
            assert!(resp.steps().is_empty());
            seen.insert(correlation);
        }
        assert_eq!(seen, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn missing_turn_fails() {
        let net = Arc::new(line_network(3, false));
        let finder = PathFinderBuilder::new(RoutingConfig::with_workers(1), net.clone()).build().unwrap();
        finder.build_graph(net.snapshots());
        let (tx, rx) = responses();
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(2)), 0, tx);
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().1.state(), PathingState::Failed);
    }

    #[test]
    fn panicking_search_fails_and_worker_survives() {
        let finder = PathFinderBuilder::new(RoutingConfig::with_workers(1), Arc::new(EmptyNetwork))
            .search(PanicsOnce { calls: AtomicUsize::new(0) })
            .build()
            .unwrap();
        let (tx, rx) = responses();
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 1, tx.clone());
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 2, tx);

        let (c1, r1) = rx.recv_timeout(TIMEOUT).unwrap();
        let (c2, r2) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!((c1, r1.state()), (1, PathingState::Failed));
        assert_eq!((c2, r2.state()), (2, PathingState::Completed));
        assert_eq!(finder.search().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_callback_does_not_kill_worker() {
        let (finder, _net) = line_finder(3, 1);
        finder.find_path(
            PathingRequest::new(NodeId(0), NodeId(1)),
            0,
            Completion::callback(|_, _| panic!("callback blew up")),
        );
        let (tx, rx) = responses();
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(2)), 1, tx);
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().1.state(), PathingState::Completed);
    }

    #[test]
    fn concurrent_requests_are_independent() {
        let (finder, _net) = line_finder(8, 4);
        let finder = Arc::new(finder);
        let (tx, rx) = responses();

        std::thread::scope(|s| {
            for t in 0..4u64 {
                let finder = Arc::clone(&finder);
                let tx = tx.clone();
                s.spawn(move || {
                    for i in 0..25u64 {
                        let end = NodeId(1 + ((t + i) % 7) as u32);
                        finder.find_path(PathingRequest::new(NodeId(0), end), t * 100 + i, tx.clone());
                    }
                });
            }
        });
        drop(tx);

        let mut seen = HashSet::new();
        for _ in 0..100 {
            let (correlation, resp) = rx.recv_timeout(TIMEOUT).unwrap();
            assert_eq!(resp.state(), PathingState::Completed);
            assert_eq!(resp.steps().len(), resp.end().raw() as usize);
            assert_eq!(resp.steps().last().unwrap().to_node, resp.end());
            assert!(seen.insert(correlation));
        }
        assert_eq!(finder.pending_requests(), 0);
    }
}

// ── Graph lifecycle & cancellation ────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crossbeam_channel::{Receiver, Sender, bounded};

    use lp_core::{EndpointId, LaneId, NodeId, RoutingConfig, SegmentId};
    use lp_network::{EmptyNetwork, InMemoryNetwork, LaneEndpoint, NetworkProvider, Segment};
    use lp_routing::{CancellationToken, FoundPath, NetGraph, PathSearch, RoutingError, RoutingResult, SearchQuery};

    use super::helpers::{ParkUntilCancelled, TIMEOUT, line_finder, line_network, responses};
    use crate::{PathFinderBuilder, PathingRequest, PathingState};

    #[test]
    fn build_graph_merges_and_replaces() {
        let net = line_network(4, true);
        let finder = PathFinderBuilder::new(RoutingConfig::with_workers(1), Arc::new(EmptyNetwork)).build().unwrap();
        let mut snaps = net.snapshots();
        let tail = snaps.split_off(2);

        finder.build_graph(snaps);
        assert_eq!(finder.node_count(), 2);
        finder.build_graph(tail);
        assert_eq!(finder.node_count(), 4);
        // Rebuilding the same ids does not grow the graph.
        finder.build_graph(net.snapshots());
        assert_eq!(finder.node_count(), 4);
    }

    #[test]
    fn held_snapshot_survives_rebuild() {
        let (finder, net) = line_finder(3, 1);
        let before = finder.graph();
        finder.clear_graph();
        assert_eq!(before.len(), 3);
        assert_eq!(finder.node_count(), 0);
        finder.build_graph(net.snapshots());
        assert_eq!(finder.node_count(), 3);
    }

    #[test]
    fn clear_graph_empties_and_invalidates() {
        let (finder, _net) = line_finder(3, 1);
        let (tx, rx) = responses();
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(2)), 0, tx.clone());
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().1.state(), PathingState::Completed);
        assert!(!finder.search().cost_model().cache().is_empty());

        finder.clear_graph();
        assert_eq!(finder.node_count(), 0);
        assert_eq!(finder.epoch(), 1);
        assert!(finder.search().cost_model().cache().is_empty());

        // Requests after a clear run against the empty graph.
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(2)), 1, tx);
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().1.state(), PathingState::Failed);
    }

    #[test]
    fn invalidate_costs_keeps_graph() {
        let (finder, _net) = line_finder(3, 1);
        let (tx, rx) = responses();
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(2)), 0, tx);
        rx.recv_timeout(TIMEOUT).unwrap();

        finder.invalidate_costs();
        assert!(finder.search().cost_model().cache().is_empty());
        assert_eq!(finder.node_count(), 3);
        assert_eq!(finder.epoch(), 0);
    }

    #[test]
    fn cancel_before_pickup() {
        let (entered_tx, entered_rx) = bounded(4);
        let finder = PathFinderBuilder::new(RoutingConfig::with_workers(1), Arc::new(EmptyNetwork))
            .search(ParkUntilCancelled { entered: entered_tx, calls: AtomicUsize::new(0) })
            .build()
            .unwrap();
        let (tx, rx) = responses();

        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 1, tx.clone());
        entered_rx.recv_timeout(TIMEOUT).unwrap();
        // The only worker is parked; this one waits in the queue.
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 2, tx.clone());
        assert_eq!(finder.pending_requests(), 2);

        assert_eq!(finder.cancel_all(), 1);
        for _ in 0..2 {
            let (_, resp) = rx.recv_timeout(TIMEOUT).unwrap();
            assert_eq!(resp.state(), PathingState::Cancelled);
            assert!(resp.steps().is_empty());
        }
        // The queued request never reached the search.
        assert_eq!(finder.search().calls.load(Ordering::SeqCst), 1);

        // Later submissions are not affected by the earlier cancel.
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 3, tx);
        entered_rx.recv_timeout(TIMEOUT).unwrap();
        finder.cancel_all();
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().0, 3);
    }

    #[test]
    fn shutdown_cancels_queued_requests() {
        let (entered_tx, entered_rx) = bounded(4);
        let finder = PathFinderBuilder::new(RoutingConfig::with_workers(1), Arc::new(EmptyNetwork))
            .search(ParkUntilCancelled { entered: entered_tx, calls: AtomicUsize::new(0) })
            .build()
            .unwrap();
        let (tx, rx) = responses();

        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 1, tx.clone());
        entered_rx.recv_timeout(TIMEOUT).unwrap();
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 2, tx.clone());
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 3, tx);

        finder.shutdown();
        let mut states: Vec<_> = rx.try_iter().map(|(c, r)| (c, r.state())).collect();
        states.sort_by_key(|(c, _)| *c);
        assert_eq!(states, vec![
            (1, PathingState::Cancelled),
            (2, PathingState::Cancelled),
            (3, PathingState::Cancelled),
        ]);
    }

    /// Parks the first `lane_endpoint` call until released, i.e. in the
    /// middle of the first search that prices a lane transition.
    struct GatedProvider {
        inner:   InMemoryNetwork,
        parked:  AtomicBool,
        entered: Sender<()>,
        release: Receiver<()>,
    }

    impl NetworkProvider for GatedProvider {
        fn segment(&self, id: SegmentId) -> Option<Segment> {
            self.inner.segment(id)
        }

        fn lane_endpoint(&self, id: EndpointId) -> Option<LaneEndpoint> {
            if !self.parked.swap(true, Ordering::SeqCst) {
                let _ = self.entered.send(());
                let _ = self.release.recv_timeout(TIMEOUT);
            }
            self.inner.lane_endpoint(id)
        }

        fn node_lane_endpoints(&self, node: NodeId) -> Vec<LaneEndpoint> {
            self.inner.node_lane_endpoints(node)
        }

        fn lane_usage(&self, segment: SegmentId, lane: LaneId) -> Option<f32> {
            self.inner.lane_usage(segment, lane)
        }
    }

    #[test]
    fn clear_graph_mid_search_cancels() {
        let net = line_network(4, true);
        let snapshots = net.snapshots();
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        let provider = Arc::new(GatedProvider {
            inner:   net,
            parked:  AtomicBool::new(false),
            entered: entered_tx,
            release: release_rx,
        });

        let finder = PathFinderBuilder::new(RoutingConfig::with_workers(1), provider).build().unwrap();
        finder.build_graph(snapshots);
        let (tx, rx) = responses();
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(3)), 7, tx);

        entered_rx.recv_timeout(TIMEOUT).unwrap();
        finder.clear_graph();
        release_tx.send(()).unwrap();

        let (correlation, resp) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(correlation, 7);
        assert_eq!(resp.state(), PathingState::Cancelled);
        assert!(resp.steps().is_empty());
        assert_eq!(finder.node_count(), 0);
    }

    /// Announces the call, waits for release, then reports `NoPath`
    /// regardless of the token.
    struct GatedNoPath {
        entered: Sender<()>,
        release: Receiver<()>,
    }

    impl PathSearch for GatedNoPath {
        fn find_path(&self, _graph: &NetGraph, query: &SearchQuery, _token: &CancellationToken) -> RoutingResult<FoundPath> {
            let _ = self.entered.send(());
            let _ = self.release.recv_timeout(TIMEOUT);
            Err(RoutingError::NoPath { from: query.start, to: query.end })
        }
    }

    #[test]
    fn failure_after_clear_is_cancelled() {
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        let finder = PathFinderBuilder::new(RoutingConfig::with_workers(1), Arc::new(EmptyNetwork))
            .search(GatedNoPath { entered: entered_tx, release: release_rx })
            .build()
            .unwrap();
        let (tx, rx) = responses();
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 4, tx.clone());

        entered_rx.recv_timeout(TIMEOUT).unwrap();
        finder.clear_graph();
        release_tx.send(()).unwrap();

        let (correlation, resp) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(correlation, 4);
        assert_eq!(resp.state(), PathingState::Cancelled);
        assert!(resp.steps().is_empty());

        // Without an intervening clear the same outcome is a failure.
        finder.find_path(PathingRequest::new(NodeId(0), NodeId(1)), 5, tx);
        entered_rx.recv_timeout(TIMEOUT).unwrap();
        release_tx.send(()).unwrap();
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().1.state(), PathingState::Failed);
    }
}
