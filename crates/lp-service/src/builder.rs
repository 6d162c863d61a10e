//! Fluent builder for constructing a [`PathFinder`].

use std::sync::Arc;

use lp_core::RoutingConfig;
use lp_network::NetworkProvider;
use lp_routing::{AStarPathing, PathSearch};

use crate::ServiceResult;
use crate::finder::PathFinder;

/// Fluent builder for [`PathFinder<S>`].
///
/// # Inputs
///
/// | Method               | Default                                      |
/// |----------------------|----------------------------------------------|
/// | `new(config, p)`     | `AStarPathing` over provider `p`             |
/// | `.search(s)`         | replaces the search strategy                 |
/// | `.worker_count(n)`   | `config.worker_count`                        |
///
/// The configuration is validated in [`build`](Self::build) before any
/// thread is spawned.
///
/// # Example
///
/// ```rust,ignore
/// let finder = PathFinderBuilder::new(RoutingConfig::with_workers(4), net.clone())
///     .build()?;
/// finder.build_graph(net.snapshots());
/// ```
pub struct PathFinderBuilder<S: PathSearch + 'static = AStarPathing> {
    config: RoutingConfig,
    search: S,
}

impl PathFinderBuilder<AStarPathing> {
    pub fn new(config: RoutingConfig, provider: Arc<dyn NetworkProvider>) -> Self {
        let search = AStarPathing::new(provider, config.cost.clone());
        Self { config, search }
    }
}

impl<S: PathSearch + 'static> PathFinderBuilder<S> {
    /// Builder around an already constructed search.
    pub fn with_search(config: RoutingConfig, search: S) -> Self {
        Self { config, search }
    }

    /// Swap the search strategy.
    pub fn search<T: PathSearch + 'static>(self, search: T) -> PathFinderBuilder<T> {
        PathFinderBuilder { config: self.config, search }
    }

    pub fn worker_count(mut self, worker_count: usize) -> Self {
        self.config.worker_count = worker_count;
        self
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Validate the configuration and start the worker pool.
    pub fn build(self) -> ServiceResult<PathFinder<S>> {
        self.config.validate()?;
        PathFinder::spawn(self.config.worker_count, self.search)
    }
}
