//! # Delivery Estimates
//!
//! PIN code → delivery estimate lookups. Typing a new PIN code supersedes
//! the previous lookup: the in-flight task is aborted and its result, should
//! it still arrive, is discarded.
//!
//! ## Lookup Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lookup("560001") ──► gen 1 ──► spawn ─┐                                │
//! │  lookup("560002") ──► gen 2 ──► abort gen 1, spawn ─┐                   │
//! │                                         │           │                   │
//! │                       gen 1 result ─────┘ (dropped) │                   │
//! │                       gen 2 result ─────────────────┴──► watch channel  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use storefront_core::validation::validate_pincode;
use storefront_core::DeliveryEstimate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::StorefrontApi;
use crate::error::{ClientError, ClientResult};

/// Latest state of the estimate widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EstimateState {
    #[default]
    Idle,
    Loading { pincode: String },
    Ready(DeliveryEstimate),
    Failed { pincode: String, failure: EstimateFailure },
}

/// Why a lookup failed. Converts back into the `ClientError` it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimateFailure {
    Network(String),
    Timeout,
    Rejected { status: u16, message: String },
    Decode(String),
}

impl From<ClientError> for EstimateFailure {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(message) => EstimateFailure::Network(message),
            ClientError::Timeout => EstimateFailure::Timeout,
            ClientError::Api { status, message } => EstimateFailure::Rejected { status, message },
            ClientError::Decode(message) => EstimateFailure::Decode(message),
            other => EstimateFailure::Network(other.to_string()),
        }
    }
}

impl From<EstimateFailure> for ClientError {
    fn from(failure: EstimateFailure) -> Self {
        match failure {
            EstimateFailure::Network(message) => ClientError::Http(message),
            EstimateFailure::Timeout => ClientError::Timeout,
            EstimateFailure::Rejected { status, message } => ClientError::Api { status, message },
            EstimateFailure::Decode(message) => ClientError::Decode(message),
        }
    }
}

/// Cancellable delivery estimate lookups.
///
/// The generation counter only changes while the watch channel's write
/// lock is held, so a reader holding a borrow sees a state and generation
/// that belong together.
pub struct DeliveryEstimator {
    api: Arc<dyn StorefrontApi>,
    state: Arc<watch::Sender<EstimateState>>,
    generation: Arc<AtomicU64>,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl DeliveryEstimator {
    pub fn new(api: Arc<dyn StorefrontApi>) -> Self {
        let (tx, _rx) = watch::channel(EstimateState::Idle);
        DeliveryEstimator {
            api,
            state: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            current: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<EstimateState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> EstimateState {
        self.state.borrow().clone()
    }

    /// Starts a lookup, cancelling any lookup still in flight.
    ///
    /// Invalid PIN codes are rejected without a request.
    pub fn lookup(&self, pincode: &str) -> ClientResult<()> {
        self.start(pincode).map(|_| ())
    }

    /// Starts a lookup and returns its generation.
    fn start(&self, pincode: &str) -> ClientResult<u64> {
        let pincode = validate_pincode(pincode)?;
        let mut current = self.lock_current();
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = EstimateState::Loading {
                pincode: pincode.clone(),
            };
        });

        let api = self.api.clone();
        let state = self.state.clone();
        let latest = self.generation.clone();
        let handle = tokio::spawn(async move {
            let next = match api.delivery_estimate(&pincode).await {
                Ok(estimate) => EstimateState::Ready(estimate),
                Err(e) => {
                    warn!(%pincode, error = %e, "Delivery estimate failed");
                    EstimateState::Failed {
                        pincode: pincode.clone(),
                        failure: e.into(),
                    }
                }
            };
            let published = state.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *current = next;
                true
            });
            if !published {
                debug!(%pincode, "Discarding superseded delivery estimate");
            }
        });

        if let Some(previous) = current.replace(handle) {
            previous.abort();
        }
        Ok(generation)
    }

    /// Looks up `pincode` and waits for its result.
    ///
    /// Fails with `ClientError::Cancelled` if another lookup supersedes it.
    pub async fn estimate(&self, pincode: &str) -> ClientResult<DeliveryEstimate> {
        let mut rx = self.subscribe();
        let generation = self.start(pincode)?;

        loop {
            {
                let state = rx.borrow_and_update();
                if self.generation.load(Ordering::SeqCst) != generation {
                    return Err(ClientError::Cancelled);
                }
                match &*state {
                    EstimateState::Ready(estimate) => return Ok(estimate.clone()),
                    EstimateState::Failed { failure, .. } => return Err(failure.clone().into()),
                    EstimateState::Idle => return Err(ClientError::Cancelled),
                    EstimateState::Loading { .. } => {}
                }
            }
            if rx.changed().await.is_err() {
                return Err(ClientError::Cancelled);
            }
        }
    }

    /// Cancels any lookup in flight and resets to idle.
    pub fn cancel(&self) {
        let mut current = self.lock_current();
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = EstimateState::Idle;
        });
        if let Some(handle) = current.take() {
            handle.abort();
        }
    }

    /// Held while a lookup is started or cancelled, before the watch lock.
    fn lock_current(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for DeliveryEstimator {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_current().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use std::time::Duration;

    #[tokio::test]
    async fn test_estimate_resolves() {
        let api = Arc::new(FakeApi::new());
        api.set_delivery("560001", true, Some(3), Duration::ZERO);
        let estimator = DeliveryEstimator::new(api);

        let estimate = estimator.estimate("560001").await.unwrap();
        assert!(estimate.deliverable);
        assert_eq!(estimate.estimated_days, Some(3));
        assert_eq!(estimator.current(), EstimateState::Ready(estimate));
    }

    #[tokio::test]
    async fn test_invalid_pincode_never_requested() {
        let api = Arc::new(FakeApi::new());
        let estimator = DeliveryEstimator::new(api.clone());

        assert!(estimator.lookup("12345").unwrap_err().is_validation());
        assert!(estimator.lookup("012345").is_err());
        assert_eq!(api.calls("delivery_estimate"), 0);
        assert_eq!(estimator.current(), EstimateState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_lookup_wins_over_slow_older_one() {
        let api = Arc::new(FakeApi::new());
        api.set_delivery("560001", false, None, Duration::from_secs(5));
        api.set_delivery("110001", true, Some(2), Duration::from_millis(100));
        let estimator = Arc::new(DeliveryEstimator::new(api));

        let slow = {
            let estimator = estimator.clone();
            tokio::spawn(async move { estimator.estimate("560001").await })
        };
        tokio::task::yield_now().await;

        let fast = estimator.estimate("110001").await.unwrap();
        assert_eq!(fast.pincode, "110001");
        assert!(matches!(slow.await.unwrap(), Err(ClientError::Cancelled)));

        tokio::time::sleep(Duration::from_secs(10)).await;
        match estimator.current() {
            EstimateState::Ready(estimate) => assert_eq!(estimate.pincode, "110001"),
            other => panic!("stale state {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_estimates_never_return_another_pincode() {
        let api = Arc::new(FakeApi::new());
        let estimator = Arc::new(DeliveryEstimator::new(api));

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let estimator = estimator.clone();
                let pincode = format!("{}", 110001 + i);
                tokio::spawn(async move { (pincode.clone(), estimator.estimate(&pincode).await) })
            })
            .collect();

        for task in tasks {
            let (pincode, result) = task.await.unwrap();
            match result {
                Ok(estimate) => assert_eq!(estimate.pincode, pincode),
                Err(e) => assert!(matches!(e, ClientError::Cancelled), "{:?}", e),
            }
        }
    }

    #[tokio::test]
    async fn test_failure_keeps_error_kind() {
        let api = Arc::new(FakeApi::new());
        let estimator = DeliveryEstimator::new(api.clone());

        api.fail_once("delivery_estimate", 503, "Courier service unavailable");
        match estimator.estimate("560001").await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "Courier service unavailable");
            }
            other => panic!("expected api error, got {:?}", other),
        }
        assert_eq!(
            estimator.current(),
            EstimateState::Failed {
                pincode: "560001".into(),
                failure: EstimateFailure::Rejected {
                    status: 503,
                    message: "Courier service unavailable".into(),
                },
            }
        );

        api.fail_transport_once("delivery_estimate");
        let err = estimator.estimate("560001").await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_cancel_resets_to_idle() {
        let api = Arc::new(FakeApi::new());
        api.set_delivery("560001", true, Some(1), Duration::from_secs(60));
        let estimator = DeliveryEstimator::new(api);

        estimator.lookup("560001").unwrap();
        assert!(matches!(estimator.current(), EstimateState::Loading { .. }));
        estimator.cancel();
        assert_eq!(estimator.current(), EstimateState::Idle);
    }
}
