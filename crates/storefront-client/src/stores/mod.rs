//! # Stores
//!
//! Client-side state for one shopping session. Each store owns a narrow
//! mutation API over the backend and a cached copy of what the server last
//! reported.
//!
//! ## Mutation Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mutate ──► backend ──► ok? ──► re-fetch list ──► replace cached copy   │
//! │                          │                                              │
//! │                          └─ err ──► toast + log, cached copy untouched  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No optimistic merges: the server row is the only truth.

pub mod auth;
pub mod cache;
pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod wishlist;

pub use auth::AuthStore;
pub use cache::{BusyFlag, BusyGuard, Cached, Freshness};
pub use cart::CartStore;
pub use checkout::{CheckoutFetch, CheckoutPhase, CheckoutStore, PendingRedirect, Redirect};
pub use coupon::CouponStore;
pub use wishlist::WishlistStore;

use tracing::warn;

use crate::error::ClientResult;
use crate::notify::{Notifier, Toast};

/// Logs and toasts a failed operation, passing the result through.
pub(crate) fn surface<T>(
    notifier: &dyn Notifier,
    operation: &str,
    result: ClientResult<T>,
) -> ClientResult<T> {
    if let Err(ref e) = result {
        warn!(operation, error = %e, "Store operation failed");
        notifier.notify(Toast::from(e));
    }
    result
}
