//! # Checkout Store
//!
//! The checkout session: the line items about to be ordered. The server's
//! checkout row is the single source of truth; this store never edits its
//! copy locally.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌───────┐  add   ┌───────────┐  payment confirmed  ┌──────────────┐   │
//! │   │ Empty │ ─────► │ Populated │ ──────────────────► │ OrderPlaced  │   │
//! │   └───────┘        └───────────┘                     └──────────────┘   │
//! │       ▲   remove last │     │ clear                                     │
//! │       └───────────────┘     ▼                                           │
//! │                        ┌─────────┐                                      │
//! │                        │ Cleared │                                      │
//! │                        └─────────┘                                      │
//! │                                                                         │
//! │  An empty fetch hands the caller a redirect home after a short delay.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use storefront_core::validation::{validate_quantity, validate_user_id};
use storefront_core::LineItem;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::cache::{BusyFlag, Cached};
use super::surface;
use crate::api::StorefrontApi;
use crate::error::{ClientError, ClientResult};
use crate::notify::{Notifier, Toast};

// =============================================================================
// Navigation Signals
// =============================================================================

/// Where the shell should navigate after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Redirect {
    Home,
    OrderHistory,
}

/// A redirect the caller should follow after `after` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRedirect {
    pub to: Redirect,
    pub after: Duration,
}

impl PendingRedirect {
    /// Sleeps out the delay and returns the target.
    pub async fn wait(self) -> Redirect {
        tokio::time::sleep(self.after).await;
        self.to
    }
}

/// Result of fetching the checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutFetch {
    pub items: Vec<LineItem>,
    /// Set when the session is empty.
    pub redirect: Option<PendingRedirect>,
}

/// Where the checkout session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    #[default]
    Empty,
    Populated,
    OrderPlaced,
    Cleared,
}

// =============================================================================
// Checkout Store
// =============================================================================

#[derive(Debug, Default)]
struct CheckoutState {
    items: Vec<LineItem>,
    phase: CheckoutPhase,
}

pub struct CheckoutStore {
    api: Arc<dyn StorefrontApi>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<Cached<CheckoutState>>,
    submitting: BusyFlag,
    redirect_delay: Duration,
}

impl CheckoutStore {
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        notifier: Arc<dyn Notifier>,
        ttl: Duration,
        redirect_delay: Duration,
    ) -> Self {
        CheckoutStore {
            api,
            notifier,
            state: RwLock::new(Cached::new(ttl)),
            submitting: BusyFlag::new(),
            redirect_delay,
        }
    }

    pub async fn items(&self) -> Vec<LineItem> {
        self.state.read().await.get().items.clone()
    }

    pub async fn phase(&self) -> CheckoutPhase {
        self.state.read().await.get().phase
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    /// Initial fetch when the checkout page opens.
    pub async fn fetch_checkout_items(&self, user_id: &str) -> ClientResult<CheckoutFetch> {
        self.load(user_id).await
    }

    /// Fetches the checkout session from the server, bypassing the cache.
    pub async fn load(&self, user_id: &str) -> ClientResult<CheckoutFetch> {
        let result = self.refetch(user_id).await;
        let items = surface(&*self.notifier, "load checkout", result)?;

        let redirect = if items.is_empty() {
            info!(user_id, "Checkout is empty, redirecting home");
            self.notifier.notify(Toast::info("Your checkout is empty"));
            Some(PendingRedirect {
                to: Redirect::Home,
                after: self.redirect_delay,
            })
        } else {
            None
        };

        Ok(CheckoutFetch { items, redirect })
    }

    /// Returns cached items while fresh, otherwise fetches.
    pub async fn items_or_load(&self, user_id: &str) -> ClientResult<Vec<LineItem>> {
        {
            let cached = self.state.read().await;
            if cached.is_fresh() {
                return Ok(cached.get().items.clone());
            }
        }
        Ok(self.load(user_id).await?.items)
    }

    async fn refetch(&self, user_id: &str) -> ClientResult<Vec<LineItem>> {
        validate_user_id(user_id)?;
        let items = self.api.checkout_items(user_id).await?;
        debug!(user_id, lines = items.len(), "Checkout fetched");

        let mut state = self.state.write().await;
        let phase = match (items.is_empty(), state.get().phase) {
            (false, _) => CheckoutPhase::Populated,
            // Terminal phases survive the confirming re-fetch
            (true, CheckoutPhase::OrderPlaced) => CheckoutPhase::OrderPlaced,
            (true, CheckoutPhase::Cleared) => CheckoutPhase::Cleared,
            (true, _) => CheckoutPhase::Empty,
        };
        state.set(CheckoutState {
            items: items.clone(),
            phase,
        });
        Ok(items)
    }

    pub async fn add_to_checkout(&self, user_id: &str, item: &LineItem) -> ClientResult<Vec<LineItem>> {
        let result = async {
            let _guard = self.submitting.try_acquire("Checkout update")?;
            validate_user_id(user_id)?;
            validate_quantity(item.quantity)?;
            self.api.add_checkout_item(user_id, item).await?;
            self.refetch(user_id).await
        }
        .await;

        let items = surface(&*self.notifier, "add to checkout", result)?;
        info!(variant_id = %item.variant_id, "Added to checkout");
        Ok(items)
    }

    /// Removes a line by variant id, then confirms against the server.
    pub async fn remove_from_checkout(
        &self,
        variant_id: &str,
        user_id: &str,
    ) -> ClientResult<Vec<LineItem>> {
        let result = async {
            let _guard = self.submitting.try_acquire("Checkout update")?;
            validate_user_id(user_id)?;
            self.api.remove_checkout_item(user_id, variant_id).await?;
            self.refetch(user_id).await
        }
        .await;

        let items = surface(&*self.notifier, "remove from checkout", result)?;
        self.notifier.notify(Toast::info("Item removed"));
        Ok(items)
    }

    /// Empties the session and tells the caller to leave the page.
    pub async fn clear_checkout(&self, user_id: &str) -> ClientResult<Redirect> {
        self.clear_into(user_id, CheckoutPhase::Cleared).await?;
        Ok(Redirect::Home)
    }

    /// Empties the session after a successful order.
    pub async fn complete_order(&self, user_id: &str) -> ClientResult<Redirect> {
        self.clear_into(user_id, CheckoutPhase::OrderPlaced).await?;
        Ok(Redirect::OrderHistory)
    }

    /// Once the server has cleared the row, the local copy is emptied in the
    /// same write. The confirming re-fetch is best effort.
    async fn clear_into(&self, user_id: &str, phase: CheckoutPhase) -> ClientResult<()> {
        let result = async {
            validate_user_id(user_id)?;
            self.api.clear_checkout(user_id).await?;
            Ok::<_, ClientError>(())
        }
        .await;
        surface(&*self.notifier, "clear checkout", result)?;

        self.state.write().await.set(CheckoutState {
            items: Vec::new(),
            phase,
        });
        info!(user_id, ?phase, "Checkout cleared");

        if let Err(e) = self.refetch(user_id).await {
            warn!(user_id, error = %e, "Could not confirm cleared checkout");
        }
        Ok(())
    }

    /// Drops the cached session (logout).
    pub async fn reset(&self) {
        self.state.write().await.reset();
    }
}
