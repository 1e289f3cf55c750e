//! # Pricing Calculator
//!
//! Derives the checkout totals from line items, delivery mode and coupon.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Pricing                                  │
//! │                                                                         │
//! │  1. subtotal = Σ (unit_price × quantity)                                │
//! │  2. savings  = Σ (max(0, mrp − unit_price) × quantity)                  │
//! │  3. discount = coupon applied ? amount | subtotal × pct : 0             │
//! │  4. shipping = subtotal > threshold && standard                         │
//! │                  ? 0                                                    │
//! │                  : Σ (rate(mode) × quantity)                            │
//! │  5. grand_total = max(0, subtotal − discount) + shipping                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is stored. Totals are recomputed whenever items, mode or
//! coupon change; the only persisted figure is the amount sent when the
//! order is created.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CouponState, DeliveryMode, LineItem};
use crate::{EXPRESS_RATE_PER_ITEM, FREE_SHIPPING_THRESHOLD, STANDARD_RATE_PER_ITEM};

// =============================================================================
// Shipping Policy
// =============================================================================

/// Free-shipping threshold and per-item delivery rates.
///
/// Defaults to ₹500 / ₹50 / ₹79. The client config can override these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// Standard delivery is free when the subtotal is strictly above this.
    pub free_threshold: Money,
    pub standard_rate: Money,
    pub express_rate: Money,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        ShippingPolicy {
            free_threshold: Money::from_major(FREE_SHIPPING_THRESHOLD),
            standard_rate: Money::from_major(STANDARD_RATE_PER_ITEM),
            express_rate: Money::from_major(EXPRESS_RATE_PER_ITEM),
        }
    }
}

impl ShippingPolicy {
    /// Per-item rate for a delivery mode.
    pub fn rate(&self, mode: DeliveryMode) -> Money {
        match mode {
            DeliveryMode::Standard => self.standard_rate,
            DeliveryMode::Express => self.express_rate,
        }
    }

    /// Shipping charge for `items` at `subtotal`.
    pub fn charge(&self, items: &[LineItem], subtotal: Money, mode: DeliveryMode) -> Money {
        if mode == DeliveryMode::Standard && subtotal > self.free_threshold {
            return Money::zero();
        }

        let rate = self.rate(mode);
        items
            .iter()
            .map(|item| rate.multiply_quantity(item.quantity))
            .sum()
    }
}

// =============================================================================
// Pricing Result
// =============================================================================

/// Derived checkout totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub subtotal: Money,
    /// MRP savings, display only.
    pub savings: Money,
    pub discount_amount: Money,
    pub shipping_amount: Money,
    pub grand_total: Money,
}

impl PricingResult {
    /// Whether the order qualified for free shipping.
    pub fn ships_free(&self) -> bool {
        self.shipping_amount.is_zero()
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes checkout totals.
///
/// Pure and infallible. An empty item list yields all zeros.
///
/// ## Example
/// ```rust
/// use storefront_core::money::Money;
/// use storefront_core::pricing::{calculate, ShippingPolicy};
/// use storefront_core::types::{DeliveryMode, LineItem};
///
/// let items = vec![LineItem::new("p1", "v1", 2, Money::from_major(300), Money::from_major(300))];
/// let result = calculate(&items, DeliveryMode::Express, None, &ShippingPolicy::default());
///
/// assert_eq!(result.shipping_amount, Money::from_major(158));
/// assert_eq!(result.grand_total, Money::from_major(758));
/// ```
pub fn calculate(
    items: &[LineItem],
    mode: DeliveryMode,
    coupon: Option<&CouponState>,
    policy: &ShippingPolicy,
) -> PricingResult {
    let subtotal: Money = items.iter().map(LineItem::line_total).sum();
    let savings: Money = items.iter().map(LineItem::savings).sum();

    let discount_amount = coupon
        .map(|state| state.discount_on(subtotal))
        .unwrap_or_default();

    let shipping_amount = policy.charge(items, subtotal, mode);

    // Discount may exceed the subtotal; the payable amount never goes negative
    let grand_total = (subtotal - discount_amount).floor_zero() + shipping_amount;

    PricingResult {
        subtotal,
        savings,
        discount_amount,
        shipping_amount,
        grand_total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
