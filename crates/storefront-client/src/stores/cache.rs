//! Cache freshness and in-flight guards shared by the stores.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Freshness
// =============================================================================

/// Tracks when a cached value was last fetched.
#[derive(Debug, Clone)]
pub struct Freshness {
    ttl: Duration,
    fetched_at: Option<Instant>,
}

impl Freshness {
    pub fn new(ttl: Duration) -> Self {
        Freshness {
            ttl,
            fetched_at: None,
        }
    }

    /// True if a fetch happened within the TTL.
    pub fn is_fresh(&self) -> bool {
        self.fetched_at
            .map(|at| at.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    pub fn mark(&mut self) {
        self.fetched_at = Some(Instant::now());
    }

    pub fn invalidate(&mut self) {
        self.fetched_at = None;
    }
}

/// A value with its freshness.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: T,
    freshness: Freshness,
}

impl<T: Default> Cached<T> {
    pub fn new(ttl: Duration) -> Self {
        Cached {
            value: T::default(),
            freshness: Freshness::new(ttl),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutable access that keeps the fetch timestamp.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn is_fresh(&self) -> bool {
        self.freshness.is_fresh()
    }

    /// Replaces the value with a freshly fetched one.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.freshness.mark();
    }

    /// Forgets the value, e.g. on logout.
    pub fn reset(&mut self) {
        self.value = T::default();
        self.freshness.invalidate();
    }
}

// =============================================================================
// Busy Flag
// =============================================================================

/// Rejects a second submission while one is in flight.
///
/// Acquire returns a guard; the flag clears when the guard drops, including
/// on early return through `?`.
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: AtomicBool,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the operation in flight, or fails with `ClientError::Busy`.
    pub fn try_acquire(&self, operation: &'static str) -> ClientResult<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::Busy(operation));
        }
        Ok(BusyGuard { flag: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Clears its `BusyFlag` on drop.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
