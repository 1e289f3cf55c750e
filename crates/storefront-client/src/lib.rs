//! # storefront-client: Checkout Client for the Storefront
//!
//! Everything in the storefront checkout that talks to the backend: the
//! session stores, coupon resolution, order placement through the payment
//! gateway, and delivery estimates.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   caller (web shell / CLI)                                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   StorefrontSession ──► stores ──┐                                      │
//! │        │                         ├──► dyn StorefrontApi ──► HttpApi     │
//! │        └──► PaymentOrchestrator ─┘           (reqwest, cookies)         │
//! │                    │                                                    │
//! │                    └──► dyn PaymentWidget (hosted checkout)             │
//! │                                                                         │
//! │   Every outcome the shopper should see goes out through dyn Notifier.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - Backend contract (`StorefrontApi`) and request types
//! - [`http`] - reqwest implementation of the contract
//! - [`config`] - Layered TOML/env configuration
//! - [`error`] - Client error taxonomy
//! - [`notify`] - Toasts and notifiers
//! - [`retry`] - Exponential backoff for idempotent reads
//! - [`stores`] - Auth, cart, wishlist, checkout and coupon stores
//! - [`payment`] - Order placement and the payment widget
//! - [`delivery`] - Cancellable PIN code delivery estimates
//! - [`session`] - `StorefrontSession` composing all of the above
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_client::{StorefrontConfig, StorefrontSession};
//!
//! let config = StorefrontConfig::load_or_default(None);
//! let session = StorefrontSession::from_config(&config, widget)?;
//!
//! session.auth().refresh().await?;
//! let quote = session.quote("user_123").await?;
//! println!("Pay {}", quote.grand_total);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod delivery;
pub mod error;
pub mod http;
pub mod notify;
pub mod payment;
pub mod retry;
pub mod session;
pub mod stores;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{AuthStatus, GatewayOrder, NewOrder, PaymentReceipt, StorefrontApi};
pub use config::StorefrontConfig;
pub use delivery::{DeliveryEstimator, EstimateFailure, EstimateState};
pub use error::{ClientError, ClientResult};
pub use http::HttpApi;
pub use notify::{ChannelNotifier, NoOpNotifier, Notifier, Toast, ToastLevel, TracingNotifier};
pub use payment::{
    PaymentOptions, PaymentOrchestrator, PaymentOutcome, PaymentPhase, PaymentWidget,
    PlaceOrder, WidgetOutcome,
};
pub use session::StorefrontSession;
pub use stores::{AuthStore, CartStore, CheckoutStore, CouponStore, Redirect, WishlistStore};
