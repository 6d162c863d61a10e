//! Epoch-based cooperative cancellation.
//!
//! A [`CancellationSource`] owns a monotonically increasing epoch.  Each
//! [`CancellationToken`] remembers the epoch at which it was issued and is
//! cancelled once the source has moved past it.  Cancelling is a single
//! atomic increment, so every token issued before the call observes it and
//! tokens issued afterwards start out live.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{RoutingError, RoutingResult};

/// Issues tokens and cancels all outstanding ones at once.
#[derive(Debug, Default)]
pub struct CancellationSource {
    epoch: Arc<AtomicU64>,
}

impl CancellationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token bound to the current epoch.
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            epoch:  Some(Arc::clone(&self.epoch)),
            issued: self.epoch.load(Ordering::Acquire),
        }
    }

    /// Cancel every token issued so far.  Returns the new epoch.
    pub fn cancel(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of cancellations performed.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

/// Cheap, cloneable handle polled by a running search.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    epoch:  Option<Arc<AtomicU64>>,
    issued: u64,
}

impl CancellationToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.epoch
            .as_ref()
            .is_some_and(|e| e.load(Ordering::Acquire) != self.issued)
    }

    /// `Err(RoutingError::Cancelled)` once cancelled.
    #[inline]
    pub fn check(&self) -> RoutingResult<()> {
        if self.is_cancelled() { Err(RoutingError::Cancelled) } else { Ok(()) }
    }

    /// Epoch the token was issued at.
    pub fn issued_epoch(&self) -> u64 {
        self.issued
    }
}
