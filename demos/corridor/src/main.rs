//! corridor — lane-level routing on a synthetic arterial.
//!
//! Builds a five-junction, four-lane corridor, submits a batch of requests
//! from several threads, then repeats the batch after congestion appears on
//! one lane and once more after the graph has been cleared.
//!
//! Logging follows `RUST_LOG` (default `info`); `RUST_LOG=lp_routing=debug`
//! shows each search.

mod network;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossbeam_channel::unbounded;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lp_core::{LaneId, NodeId, RoutingConfig, SegmentId, VehicleCategory};
use lp_service::{PathFinder, PathFinderBuilder, PathingRequest, PathingResponse};

use network::{build_corridor, incoming, outgoing};

// ── Constants ─────────────────────────────────────────────────────────────────

const JUNCTIONS: u32   = 5;
const WORKERS:   usize = 4;

// ── Requests ──────────────────────────────────────────────────────────────────

fn batch() -> Vec<(&'static str, PathingRequest)> {
    let last = NodeId(JUNCTIONS - 1);
    vec![
        ("car east", PathingRequest::new(NodeId(0), last)),
        ("bus east", PathingRequest::new(NodeId(0), last).with_vehicle(VehicleCategory::Bus)),
        ("car west", PathingRequest::new(last, NodeId(0))),
        (
            "car east, starts in bus lane",
            PathingRequest::new(NodeId(0), last).with_forced_start(outgoing(1, 1)),
        ),
        (
            "car west, arrives in lane 3",
            PathingRequest::new(last, NodeId(1)).with_forced_end(incoming(2, 3)),
        ),
        ("car east, unknown end", PathingRequest::new(NodeId(0), NodeId(99))),
    ]
}

/// Submit every request of `batch()` and wait for all responses.
fn run_batch(finder: &PathFinder, title: &str) -> Result<()> {
    let requests = batch();
    let labels: Vec<&str> = requests.iter().map(|(label, _)| *label).collect();
    let (tx, rx) = unbounded();

    let t0 = Instant::now();
    std::thread::scope(|s| {
        for (i, (_, req)) in requests.into_iter().enumerate() {
            let tx = tx.clone();
            s.spawn(move || finder.find_path(req.with_combination_id(i as u64), i as u64, tx));
        }
    });
    drop(tx);

    let mut responses: Vec<(u64, PathingResponse)> = rx.iter().collect();
    responses.sort_by_key(|(correlation, _)| *correlation);
    let elapsed = t0.elapsed();

    println!();
    println!("── {title} ({} requests in {:.2} ms)", responses.len(), elapsed.as_secs_f64() * 1e3);
    println!("{:<30} {:<10} {:>7}  {}", "Request", "State", "Cost", "Lanes");
    println!("{}", "-".repeat(78));
    for (correlation, resp) in &responses {
        let lanes: Vec<String> = resp.steps().iter().map(|s| s.via_endpoint.raw().to_string()).collect();
        println!(
            "{:<30} {:<10} {:>7.2}  {}",
            labels[*correlation as usize],
            resp.state(),
            resp.total_cost(),
            lanes.join(" → "),
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== corridor — lane-level routing ===");
    println!("Junctions: {JUNCTIONS}  |  Workers: {WORKERS}");

    let net = Arc::new(build_corridor(JUNCTIONS)?);
    let finder = PathFinderBuilder::new(RoutingConfig::with_workers(WORKERS), net.clone()).build()?;

    let t0 = Instant::now();
    finder.build_graph(net.snapshots());
    info!(nodes = finder.node_count(), elapsed_us = t0.elapsed().as_micros() as u64, "corridor loaded");

    run_batch(&finder, "free flow")?;

    // Jam the general eastbound lane on the middle segments.
    for s in 2..JUNCTIONS - 1 {
        net.set_lane_usage(SegmentId(s), LaneId(0), 0.95)?;
    }
    run_batch(&finder, "eastbound lane 0 congested")?;

    finder.clear_graph();
    run_batch(&finder, "after clear_graph")?;

    println!();
    println!("epoch: {}  |  pending: {}", finder.epoch(), finder.pending_requests());
    finder.shutdown();
    Ok(())
}
