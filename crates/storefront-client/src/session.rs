//! # Storefront Session
//!
//! One shopper's view of the storefront: the stores, the selected delivery
//! mode, payment and delivery estimates, wired to a single backend and
//! notifier.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         StorefrontSession                               │
//! │                                                                         │
//! │   AuthStore ──► user id ──┬──► CartStore ──► move_to_checkout ──┐       │
//! │                           ├──► WishlistStore ──► move_to_cart   │       │
//! │                           └──► CheckoutStore ◄──────────────────┘       │
//! │                                     │                                   │
//! │   CouponStore ──────────────────────┼──► pricing::calculate ──► quote   │
//! │   DeliveryMode ─────────────────────┘              │                    │
//! │                                                    ▼                    │
//! │                                        PaymentOrchestrator              │
//! │   DeliveryEstimator (independent)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use storefront_core::{
    calculate, CouponStatus, DeliveryMode, PaymentMethod, PricingResult, ShippingPolicy,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::api::StorefrontApi;
use crate::config::StorefrontConfig;
use crate::delivery::DeliveryEstimator;
use crate::error::{ClientError, ClientResult};
use crate::http::HttpApi;
use crate::notify::{Notifier, TracingNotifier};
use crate::payment::{PaymentOrchestrator, PaymentOutcome, PaymentWidget, PlaceOrder};
use crate::stores::{AuthStore, CartStore, CheckoutStore, CouponStore, WishlistStore};

pub struct StorefrontSession {
    policy: ShippingPolicy,
    delivery_mode: RwLock<DeliveryMode>,
    auth: AuthStore,
    cart: CartStore,
    wishlist: WishlistStore,
    checkout: CheckoutStore,
    coupons: CouponStore,
    payment: PaymentOrchestrator,
    delivery: DeliveryEstimator,
}

impl StorefrontSession {
    pub fn new(
        config: &StorefrontConfig,
        api: Arc<dyn StorefrontApi>,
        notifier: Arc<dyn Notifier>,
        widget: Arc<dyn PaymentWidget>,
    ) -> Self {
        let ttl = config.cache_ttl();
        StorefrontSession {
            policy: config.shipping_policy(),
            delivery_mode: RwLock::new(DeliveryMode::default()),
            auth: AuthStore::new(api.clone(), config.retry.clone()),
            cart: CartStore::new(api.clone(), notifier.clone(), ttl),
            wishlist: WishlistStore::new(api.clone(), notifier.clone(), ttl),
            checkout: CheckoutStore::new(
                api.clone(),
                notifier.clone(),
                ttl,
                config.empty_redirect_delay(),
            ),
            coupons: CouponStore::new(api.clone(), notifier.clone()),
            payment: PaymentOrchestrator::new(
                api.clone(),
                notifier,
                widget,
                config.payment.clone(),
            ),
            delivery: DeliveryEstimator::new(api),
        }
    }

    /// Session against the HTTP backend, logging toasts.
    pub fn from_config(
        config: &StorefrontConfig,
        widget: Arc<dyn PaymentWidget>,
    ) -> ClientResult<Self> {
        config.validate()?;
        let api = Arc::new(HttpApi::new(config)?);
        Ok(Self::new(config, api, Arc::new(TracingNotifier), widget))
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    pub fn checkout(&self) -> &CheckoutStore {
        &self.checkout
    }

    pub fn coupons(&self) -> &CouponStore {
        &self.coupons
    }

    pub fn payment(&self) -> &PaymentOrchestrator {
        &self.payment
    }

    pub fn delivery(&self) -> &DeliveryEstimator {
        &self.delivery
    }

    pub fn shipping_policy(&self) -> &ShippingPolicy {
        &self.policy
    }

    pub async fn delivery_mode(&self) -> DeliveryMode {
        *self.delivery_mode.read().await
    }

    pub async fn set_delivery_mode(&self, mode: DeliveryMode) {
        debug!(%mode, "Delivery mode selected");
        *self.delivery_mode.write().await = mode;
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Prices whatever the checkout store currently holds. No I/O.
    pub async fn pricing(&self) -> PricingResult {
        let items = self.checkout.items().await;
        let coupon = self.coupons.state().await;
        calculate(&items, self.delivery_mode().await, Some(&coupon), &self.policy)
    }

    /// Loads the checkout if stale, then prices it.
    pub async fn quote(&self, user_id: &str) -> ClientResult<PricingResult> {
        self.checkout.items_or_load(user_id).await?;
        Ok(self.pricing().await)
    }

    /// Applies a coupon for the logged-in shopper, if any.
    pub async fn apply_coupon(&self, code: &str) -> ClientResult<CouponStatus> {
        let user = self.auth.user().await;
        self.coupons
            .apply_coupon(code, user.as_ref().map(|u| u.id.as_str()))
            .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Prices the checkout and hands it to the payment orchestrator.
    pub async fn place_order(
        &self,
        payment_method: PaymentMethod,
        address_id: Option<String>,
    ) -> ClientResult<PaymentOutcome> {
        let user = self.auth.user().await.ok_or(ClientError::NotLoggedIn)?;
        let items = self.checkout.items_or_load(&user.id).await?;
        let delivery_mode = self.delivery_mode().await;
        let coupon = self.coupons.state().await;
        let pricing = calculate(&items, delivery_mode, Some(&coupon), &self.policy);

        let request = PlaceOrder {
            user,
            items,
            pricing,
            delivery_mode,
            payment_method,
            address_id,
        };
        self.payment
            .place_order(&request, &self.coupons, &self.checkout)
            .await
    }

    /// Forgets the shopper: auth, coupon, cached lists and any lookup.
    pub async fn logout(&self) {
        self.auth.clear().await;
        self.coupons.remove_coupon().await;
        self.cart.reset().await;
        self.wishlist.reset().await;
        self.checkout.reset().await;
        self.delivery.cancel();
        *self.delivery_mode.write().await = DeliveryMode::default();
        info!("Session cleared");
    }
}
