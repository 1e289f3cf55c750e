//! # Domain Types
//!
//! Core domain types used throughout the storefront checkout.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │     Coupon      │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  code           │   │  id (server)    │       │
//! │  │  variant_id     │   │  discount       │   │  status         │       │
//! │  │  quantity       │   │  coupon_id      │   │  payment_status │       │
//! │  │  unit_price     │   │  source         │   │  total          │       │
//! │  │  mrp            │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DeliveryMode   │   │  CouponStatus   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Standard       │   │  None / Applied │   │  Online         │       │
//! │  │  Express        │   │  Invalid / Used │   │  CashOnDelivery │       │
//! │  └─────────────────┘   │  Expired        │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Line items, orders and coupons are owned by the server. The client holds
//! copies; `CouponStatus` is the only state that exists purely client-side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Percentage};

// =============================================================================
// Line Item
// =============================================================================

/// A purchasable variant and quantity in the cart or checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,

    /// Variant identity. Cart and checkout rows are unique by variant.
    pub variant_id: String,

    pub quantity: i64,

    /// Selling price ("our price") per unit.
    pub unit_price: Money,

    /// Maximum retail price per unit; only used for the savings figure.
    pub mrp: Money,

    /// Display name, never used in pricing.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub image_url: Option<String>,
}

impl LineItem {
    /// Creates a line item without display fields.
    pub fn new(
        product_id: impl Into<String>,
        variant_id: impl Into<String>,
        quantity: i64,
        unit_price: Money,
        mrp: Money,
    ) -> Self {
        LineItem {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            quantity,
            unit_price,
            mrp,
            name: String::new(),
            image_url: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// `unit_price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// `(mrp − unit_price) × quantity`, never negative.
    #[inline]
    pub fn savings(&self) -> Money {
        (self.mrp - self.unit_price)
            .floor_zero()
            .multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Delivery Mode
// =============================================================================

/// How the order ships. Drives the per-item shipping rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    #[default]
    Standard,
    Express,
}

impl std::fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryMode::Standard => write!(f, "standard"),
            DeliveryMode::Express => write!(f, "express"),
        }
    }
}

impl std::str::FromStr for DeliveryMode {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(DeliveryMode::Standard),
            "express" => Ok(DeliveryMode::Express),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "delivery mode".to_string(),
                allowed: vec!["standard".to_string(), "express".to_string()],
            }),
        }
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// What a coupon takes off the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CouponDiscount {
    /// A fixed amount off.
    Amount(Money),
    /// A percentage of the subtotal.
    Percentage(Percentage),
}

impl CouponDiscount {
    /// Discount this coupon yields on `subtotal`.
    pub fn amount_off(&self, subtotal: Money) -> Money {
        match self {
            CouponDiscount::Amount(value) => *value,
            CouponDiscount::Percentage(pct) => subtotal.percent(*pct),
        }
    }
}

/// Which coupon pool a code was issued from.
///
/// Individual coupons are bound to one user; special coupons come from a
/// shared pool with a usage limit. They are consumed through different
/// endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponSource {
    #[default]
    Individual,
    Special,
}

/// A coupon as resolved by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub coupon_id: String,
    pub discount: CouponDiscount,
    #[serde(default)]
    pub source: CouponSource,
}

/// Client-side classification of the last coupon attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    #[default]
    None,
    Applied,
    Invalid,
    Used,
    Expired,
}

impl CouponStatus {
    /// Classifies a backend rejection message.
    ///
    /// ```rust
    /// use storefront_core::CouponStatus;
    ///
    /// assert_eq!(CouponStatus::from_rejection("Coupon has expired"), CouponStatus::Expired);
    /// assert_eq!(CouponStatus::from_rejection("Coupon already USED"), CouponStatus::Used);
    /// assert_eq!(CouponStatus::from_rejection("Not found"), CouponStatus::Invalid);
    /// ```
    pub fn from_rejection(message: &str) -> Self {
        let message = message.to_lowercase();
        if message.contains("expired") {
            CouponStatus::Expired
        } else if message.contains("used") {
            CouponStatus::Used
        } else {
            CouponStatus::Invalid
        }
    }
}

/// The coupon slot of a checkout session.
///
/// ## Invariant
/// `coupon` is `Some` whenever `status` is `Applied` or `Used`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponState {
    pub coupon: Option<Coupon>,
    pub status: CouponStatus,
}

impl CouponState {
    /// An applied coupon.
    pub fn applied(coupon: Coupon) -> Self {
        CouponState {
            coupon: Some(coupon),
            status: CouponStatus::Applied,
        }
    }

    /// A rejected attempt; no coupon is held.
    pub fn rejected(status: CouponStatus) -> Self {
        CouponState {
            coupon: None,
            status,
        }
    }

    /// True only when a coupon is applied and will discount the order.
    pub fn is_applied(&self) -> bool {
        self.status == CouponStatus::Applied && self.coupon.is_some()
    }

    /// Discount against `subtotal`; zero unless applied.
    pub fn discount_on(&self, subtotal: Money) -> Money {
        match (&self.coupon, self.status) {
            (Some(coupon), CouponStatus::Applied) => coupon.discount.amount_off(subtotal),
            _ => Money::zero(),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Hosted gateway widget (cards, UPI, net banking).
    #[default]
    Online,
    /// Cash on delivery. Confirmed at creation, no gateway involved.
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Status a freshly created order starts in.
    pub fn initial_order_status(&self) -> OrderStatus {
        match self {
            PaymentMethod::Online => OrderStatus::Pending,
            PaymentMethod::CashOnDelivery => OrderStatus::Confirmed,
        }
    }
}

/// An order as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub total: Money,
    pub gateway_order_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Users & Wishlist
// =============================================================================

/// The logged-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A saved-for-later variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: String,
    pub variant_id: String,
    #[serde(default)]
    pub name: String,
    pub price: Money,
    pub mrp: Money,
}

impl WishlistItem {
    /// Converts to a line item of the given quantity (move-to-cart).
    pub fn to_line_item(&self, quantity: i64) -> LineItem {
        LineItem::new(
            self.product_id.clone(),
            self.variant_id.clone(),
            quantity,
            self.price,
            self.mrp,
        )
        .with_name(self.name.clone())
    }
}

/// Delivery serviceability for a PIN code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEstimate {
    pub pincode: String,
    pub deliverable: bool,
    pub estimated_days: Option<u32>,
}

// =============================================================================
// Unit Tests
// =============================================================================
