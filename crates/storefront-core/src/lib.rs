//! # storefront-core: Pure Business Logic for the Storefront Checkout
//!
//! This crate holds the checkout pricing and coupon rules as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Product ──► Cart ──► Checkout ──► Payment Widget ──► Orders  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              storefront-client (stores, REST, payment)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │ LineItem  │  │   Money   │  │ subtotal  │  │  coupon   │  │   │
//! │  │   │  Coupon   │  │ Percent   │  │ shipping  │  │  pincode  │  │   │
//! │  │   │  Order    │  │           │  │ discount  │  │  quantity │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, Coupon, Order, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - The checkout pricing calculator
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//! use storefront_core::pricing::{calculate, ShippingPolicy};
//! use storefront_core::types::{DeliveryMode, LineItem};
//!
//! let items = vec![LineItem::new("p1", "v1", 2, Money::from_major(300), Money::from_major(350))];
//! let result = calculate(&items, DeliveryMode::Standard, None, &ShippingPolicy::default());
//!
//! // Subtotal ₹600 is above the free-shipping threshold
//! assert_eq!(result.shipping_amount, Money::zero());
//! assert_eq!(result.grand_total, Money::from_major(600));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::{Money, Percentage};
pub use pricing::{calculate, PricingResult, ShippingPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Subtotal (major units) a standard-delivery order must exceed to ship free.
pub const FREE_SHIPPING_THRESHOLD: i64 = 500;

/// Standard delivery charge per unit of quantity (major units).
pub const STANDARD_RATE_PER_ITEM: i64 = 50;

/// Express delivery charge per unit of quantity (major units).
pub const EXPRESS_RATE_PER_ITEM: i64 = 79;

/// Maximum quantity of a single variant in cart or checkout.
pub const MAX_ITEM_QUANTITY: i64 = 99;
