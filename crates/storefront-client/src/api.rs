//! # Backend API
//!
//! The `StorefrontApi` trait is the seam between the stores and the REST
//! backend. `HttpApi` (http.rs) implements it over reqwest; tests use an
//! in-memory fake.
//!
//! ## Endpoint Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Area       │ Endpoints                                                │
//! │─────────────┼──────────────────────────────────────────────────────────│
//! │  auth       │ GET    /api/auth/status                                  │
//! │  cart       │ GET/POST/PUT/DELETE /api/cart                            │
//! │  wishlist   │ GET/POST/DELETE /api/wishlist                            │
//! │  checkout   │ GET/POST/DELETE /api/checkout, DELETE /api/checkout/clear│
//! │  coupons    │ GET    /api/discount/coupons?code&userId                 │
//! │             │ POST   /api/discount/coupons/use                         │
//! │             │ POST   /api/discount/special-coupons/use                 │
//! │  orders     │ POST   /api/orders                                       │
//! │             │ POST   /api/orders/update-status                         │
//! │             │ POST   /api/orders/update-payment-status                 │
//! │             │ POST   /api/orders/update-razorpay-order-id              │
//! │  gateway    │ POST   /api/razorpay/create-order                        │
//! │             │ POST   /api/razorpay/verify-payment                      │
//! │  delivery   │ GET    /api/delivery/estimate?pincode                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All amounts crossing this trait are `Money`. Conversion to and from the
//! backend's rupee floats happens inside the HTTP implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_core::{
    Coupon, CouponSource, DeliveryEstimate, DeliveryMode, LineItem, Money, Order, OrderStatus,
    PaymentMethod, PaymentStatus, PricingResult, User, WishlistItem,
};

use crate::error::ClientResult;

/// Endpoint paths, relative to the configured base URL.
pub mod paths {
    pub const AUTH_STATUS: &str = "/api/auth/status";
    pub const CART: &str = "/api/cart";
    pub const WISHLIST: &str = "/api/wishlist";
    pub const CHECKOUT: &str = "/api/checkout";
    pub const CHECKOUT_CLEAR: &str = "/api/checkout/clear";
    pub const COUPONS: &str = "/api/discount/coupons";
    pub const COUPON_USE: &str = "/api/discount/coupons/use";
    pub const SPECIAL_COUPON_USE: &str = "/api/discount/special-coupons/use";
    pub const ORDERS: &str = "/api/orders";
    pub const ORDER_STATUS: &str = "/api/orders/update-status";
    pub const ORDER_PAYMENT_STATUS: &str = "/api/orders/update-payment-status";
    pub const ORDER_GATEWAY_ID: &str = "/api/orders/update-razorpay-order-id";
    pub const GATEWAY_CREATE_ORDER: &str = "/api/razorpay/create-order";
    pub const GATEWAY_VERIFY: &str = "/api/razorpay/verify-payment";
    pub const DELIVERY_ESTIMATE: &str = "/api/delivery/estimate";
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Result of `GET /api/auth/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub user: Option<User>,
}

/// Order creation payload, built from the checkout items and pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub pricing: PricingResult,
    pub delivery_mode: DeliveryMode,
    pub payment_method: PaymentMethod,
    pub address_id: Option<String>,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// An order registered with the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in paise.
    pub amount: Money,
    pub currency: String,
}

/// What the widget hands back on success; verified server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

// =============================================================================
// API Trait
// =============================================================================

/// The storefront backend.
///
/// Every method is a single request; callers decide about re-fetching.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    // --- auth ---------------------------------------------------------------
    async fn auth_status(&self) -> ClientResult<AuthStatus>;

    // --- cart ---------------------------------------------------------------
    async fn cart_items(&self, user_id: &str) -> ClientResult<Vec<LineItem>>;
    async fn add_cart_item(&self, user_id: &str, item: &LineItem) -> ClientResult<()>;
    async fn update_cart_quantity(
        &self,
        user_id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> ClientResult<()>;
    async fn remove_cart_item(&self, user_id: &str, variant_id: &str) -> ClientResult<()>;

    // --- wishlist -----------------------------------------------------------
    async fn wishlist_items(&self, user_id: &str) -> ClientResult<Vec<WishlistItem>>;
    async fn add_wishlist_item(&self, user_id: &str, item: &WishlistItem) -> ClientResult<()>;
    async fn remove_wishlist_item(&self, user_id: &str, variant_id: &str) -> ClientResult<()>;

    // --- checkout -----------------------------------------------------------
    async fn checkout_items(&self, user_id: &str) -> ClientResult<Vec<LineItem>>;
    async fn add_checkout_item(&self, user_id: &str, item: &LineItem) -> ClientResult<()>;
    async fn remove_checkout_item(&self, user_id: &str, variant_id: &str) -> ClientResult<()>;
    async fn clear_checkout(&self, user_id: &str) -> ClientResult<()>;

    // --- coupons ------------------------------------------------------------
    /// Resolves a code for a user. Rejections come back as `ClientError::Api`
    /// carrying the backend's message.
    async fn lookup_coupon(&self, code: &str, user_id: &str) -> ClientResult<Coupon>;
    async fn mark_coupon_used(
        &self,
        source: CouponSource,
        coupon_id: &str,
        user_id: &str,
    ) -> ClientResult<()>;

    // --- orders -------------------------------------------------------------
    async fn create_order(&self, order: &NewOrder) -> ClientResult<Order>;
    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<()>;
    async fn update_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
    ) -> ClientResult<()>;
    async fn update_gateway_order_id(
        &self,
        order_id: &str,
        gateway_order_id: &str,
    ) -> ClientResult<()>;

    // --- gateway ------------------------------------------------------------
    async fn create_gateway_order(
        &self,
        amount: Money,
        currency: &str,
        receipt: &str,
    ) -> ClientResult<GatewayOrder>;
    /// Returns whether the signature checked out.
    async fn verify_payment(&self, receipt: &PaymentReceipt) -> ClientResult<bool>;

    // --- delivery -----------------------------------------------------------
    async fn delivery_estimate(&self, pincode: &str) -> ClientResult<DeliveryEstimate>;
}
