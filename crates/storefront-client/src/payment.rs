//! # Payment Orchestrator
//!
//! Drives one order from creation through the hosted payment widget to a
//! confirmed (or failed) payment.
//!
//! ## Online Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. POST /api/orders                 order: pending / pending           │
//! │  2. POST /api/razorpay/create-order  amount = grand_total in paise      │
//! │  3. POST /api/orders/update-razorpay-order-id                           │
//! │  4. widget.open(options)                                                │
//! │        │                                                                │
//! │        ├── Success(receipt)                                             │
//! │        │     5. POST /api/razorpay/verify-payment                       │
//! │        │          ├── ok ──► status confirmed, payment paid             │
//! │        │          │          mark coupon used, clear checkout           │
//! │        │          │          redirect to order history                  │
//! │        │          └── bad ─► error, order stays pending                 │
//! │        │                                                                │
//! │        ├── Failed(payment.failed) ──► payment status failed             │
//! │        │                              no coupon consumed, no retry      │
//! │        │                                                                │
//! │        └── Dismissed ──► order stays pending                            │
//! │                                                                         │
//! │  Any failure in 1-3 aborts before the widget opens; the order (if      │
//! │  created) stays pending for a manual retry.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cash on delivery skips 2-5: the order is created confirmed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::validation::{validate_payment_amount, validate_user_id};
use storefront_core::{
    CoreError, DeliveryMode, LineItem, Order, OrderStatus, PaymentMethod, PaymentStatus,
    PricingResult, User,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::api::{NewOrder, PaymentReceipt, StorefrontApi};
use crate::config::PaymentSettings;
use crate::error::{ClientError, ClientResult};
use crate::notify::{Notifier, Toast};
use crate::stores::{BusyFlag, CheckoutStore, CouponStore, Redirect};

// =============================================================================
// Widget Contract
// =============================================================================

/// Customer details pre-filled in the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Free-form notes attached to the gateway payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotes {
    pub order_id: String,
    pub address_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub color: String,
}

/// The options object handed to the hosted widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOptions {
    /// Public key id.
    pub key: String,
    /// Paise.
    pub amount: i64,
    pub currency: String,
    pub name: String,
    pub description: String,
    /// Gateway order id.
    pub order_id: String,
    pub prefill: Prefill,
    pub notes: PaymentNotes,
    pub theme: Theme,
}

/// Details of a `payment.failed` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFailure {
    pub code: String,
    pub description: String,
    pub reason: Option<String>,
    pub payment_id: Option<String>,
}

/// How the widget session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOutcome {
    Success(PaymentReceipt),
    Failed(PaymentFailure),
    Dismissed,
}

/// The hosted payment widget.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    /// Opens the widget and resolves when the customer finishes with it.
    async fn open(&self, options: PaymentOptions) -> WidgetOutcome;
}

// =============================================================================
// Orchestrator Types
// =============================================================================

/// Where the current payment attempt is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPhase {
    #[default]
    Idle,
    OrderCreated,
    GatewayOrderCreated,
    WidgetOpen,
    Verifying,
    Confirmed,
    PaymentFailed,
    VerificationFailed,
    Dismissed,
    Aborted,
}

/// What the customer is ordering and how.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user: User,
    pub items: Vec<LineItem>,
    pub pricing: PricingResult,
    pub delivery_mode: DeliveryMode,
    pub payment_method: PaymentMethod,
    pub address_id: Option<String>,
}

/// Terminal result of `place_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Order confirmed (online payment verified, or COD). The order carries
    /// only the statuses the server accepted.
    Confirmed { order: Order, redirect: Redirect },
    /// The gateway reported `payment.failed`.
    Failed { order_id: String, failure: PaymentFailure },
    /// Widget closed without paying. Order stays pending.
    Dismissed { order_id: String },
}

// =============================================================================
// Payment Orchestrator
// =============================================================================

pub struct PaymentOrchestrator {
    api: Arc<dyn StorefrontApi>,
    notifier: Arc<dyn Notifier>,
    widget: Arc<dyn PaymentWidget>,
    settings: PaymentSettings,
    processing: BusyFlag,
    phase: RwLock<PaymentPhase>,
}

impl PaymentOrchestrator {
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        notifier: Arc<dyn Notifier>,
        widget: Arc<dyn PaymentWidget>,
        settings: PaymentSettings,
    ) -> Self {
        PaymentOrchestrator {
            api,
            notifier,
            widget,
            settings,
            processing: BusyFlag::new(),
            phase: RwLock::new(PaymentPhase::Idle),
        }
    }

    pub async fn phase(&self) -> PaymentPhase {
        *self.phase.read().await
    }

    pub fn is_processing_payment(&self) -> bool {
        self.processing.is_busy()
    }

    async fn enter(&self, phase: PaymentPhase) {
        debug!(?phase, "Payment phase");
        *self.phase.write().await = phase;
    }

    /// Places an order and, for online payment, runs it through the widget.
    ///
    /// A second call while one is in flight fails with `ClientError::Busy`.
    pub async fn place_order(
        &self,
        request: &PlaceOrder,
        coupons: &CouponStore,
        checkout: &CheckoutStore,
    ) -> ClientResult<PaymentOutcome> {
        let _guard = self.processing.try_acquire("Payment")?;

        let result = self.run(request, coupons, checkout).await;
        if let Err(ref e) = result {
            error!(error = %e, "Order placement failed");
            self.notifier.notify(Toast::from(e));
            let mut phase = self.phase.write().await;
            if !matches!(*phase, PaymentPhase::VerificationFailed) {
                *phase = PaymentPhase::Aborted;
            }
        }
        result
    }

    async fn run(
        &self,
        request: &PlaceOrder,
        coupons: &CouponStore,
        checkout: &CheckoutStore,
    ) -> ClientResult<PaymentOutcome> {
        validate_user_id(&request.user.id)?;
        if request.items.is_empty() {
            return Err(CoreError::EmptyCheckout.into());
        }
        if request.address_id.is_none() {
            return Err(CoreError::NoAddressSelected.into());
        }
        if request.payment_method == PaymentMethod::Online {
            validate_payment_amount(request.pricing.grand_total.minor()).map_err(|e| {
                CoreError::InvalidPaymentAmount {
                    reason: e.to_string(),
                }
            })?;
        }

        self.enter(PaymentPhase::Idle).await;
        let order = self.create_order(request, coupons).await?;
        self.enter(PaymentPhase::OrderCreated).await;

        match request.payment_method {
            PaymentMethod::CashOnDelivery => self.finish_cod(request, order, coupons, checkout).await,
            PaymentMethod::Online => self.pay_online(request, order, coupons, checkout).await,
        }
    }

    async fn create_order(&self, request: &PlaceOrder, coupons: &CouponStore) -> ClientResult<Order> {
        let coupon = coupons.state().await;
        let coupon_code = if coupon.is_applied() {
            coupon.coupon.map(|c| c.code)
        } else {
            None
        };
        let new_order = NewOrder {
            user_id: request.user.id.clone(),
            items: request.items.clone(),
            pricing: request.pricing,
            delivery_mode: request.delivery_mode,
            payment_method: request.payment_method,
            address_id: request.address_id.clone(),
            coupon_code,
            status: request.payment_method.initial_order_status(),
            payment_status: PaymentStatus::Pending,
        };

        let order = self.api.create_order(&new_order).await?;
        info!(
            order_id = %order.id,
            total = %request.pricing.grand_total,
            method = ?request.payment_method,
            "Order created"
        );
        Ok(order)
    }

    async fn finish_cod(
        &self,
        request: &PlaceOrder,
        order: Order,
        coupons: &CouponStore,
        checkout: &CheckoutStore,
    ) -> ClientResult<PaymentOutcome> {
        let redirect = self.settle(&request.user.id, coupons, checkout).await;
        self.enter(PaymentPhase::Confirmed).await;
        self.notifier.notify(Toast::success("Order placed successfully"));
        Ok(PaymentOutcome::Confirmed { order, redirect })
    }

    async fn pay_online(
        &self,
        request: &PlaceOrder,
        mut order: Order,
        coupons: &CouponStore,
        checkout: &CheckoutStore,
    ) -> ClientResult<PaymentOutcome> {
        let amount = request.pricing.grand_total;
        let receipt = format!("rcpt_{}", Uuid::new_v4().simple());

        let gateway = self
            .api
            .create_gateway_order(amount, &self.settings.currency, &receipt)
            .await
            .map_err(|e| ClientError::GatewayOrderFailed(e.to_string()))?;
        self.api
            .update_gateway_order_id(&order.id, &gateway.id)
            .await
            .map_err(|e| ClientError::GatewayOrderFailed(e.to_string()))?;
        order.gateway_order_id = Some(gateway.id.clone());
        self.enter(PaymentPhase::GatewayOrderCreated).await;
        info!(order_id = %order.id, gateway_order_id = %gateway.id, amount = amount.minor(), "Gateway order created");

        let options = self.widget_options(request, &order, &gateway.id, amount.minor());
        self.enter(PaymentPhase::WidgetOpen).await;

        match self.widget.open(options).await {
            WidgetOutcome::Success(receipt) => {
                self.enter(PaymentPhase::Verifying).await;
                self.confirm(request, order, &receipt, coupons, checkout).await
            }
            WidgetOutcome::Failed(failure) => {
                warn!(order_id = %order.id, code = %failure.code, description = %failure.description, "Payment failed");
                if let Err(e) = self
                    .api
                    .update_payment_status(&order.id, PaymentStatus::Failed)
                    .await
                {
                    error!(order_id = %order.id, error = %e, "Could not record failed payment");
                }
                self.enter(PaymentPhase::PaymentFailed).await;
                self.notifier
                    .notify(Toast::error(format!("Payment failed: {}", failure.description)));
                Ok(PaymentOutcome::Failed {
                    order_id: order.id,
                    failure,
                })
            }
            WidgetOutcome::Dismissed => {
                info!(order_id = %order.id, "Payment widget dismissed");
                self.enter(PaymentPhase::Dismissed).await;
                self.notifier.notify(Toast::info("Payment cancelled"));
                Ok(PaymentOutcome::Dismissed { order_id: order.id })
            }
        }
    }

    async fn confirm(
        &self,
        request: &PlaceOrder,
        mut order: Order,
        receipt: &PaymentReceipt,
        coupons: &CouponStore,
        checkout: &CheckoutStore,
    ) -> ClientResult<PaymentOutcome> {
        let verified = match self.api.verify_payment(receipt).await {
            Ok(verified) => verified,
            Err(e) => {
                self.enter(PaymentPhase::VerificationFailed).await;
                return Err(ClientError::VerificationFailed(e.to_string()));
            }
        };
        if !verified {
            self.enter(PaymentPhase::VerificationFailed).await;
            return Err(ClientError::VerificationFailed(
                "signature mismatch".to_string(),
            ));
        }

        // The money is captured from here on; bookkeeping failures must not
        // undo the confirmation.
        info!(order_id = %order.id, payment_id = %receipt.payment_id, "Payment verified");
        let mut recorded = true;
        match self
            .api
            .update_order_status(&order.id, OrderStatus::Confirmed)
            .await
        {
            Ok(()) => order.status = OrderStatus::Confirmed,
            Err(e) => {
                error!(order_id = %order.id, error = %e, "Could not record order confirmation");
                recorded = false;
            }
        }
        match self
            .api
            .update_payment_status(&order.id, PaymentStatus::Paid)
            .await
        {
            Ok(()) => order.payment_status = PaymentStatus::Paid,
            Err(e) => {
                error!(order_id = %order.id, error = %e, "Could not record payment");
                recorded = false;
            }
        }
        if !recorded {
            self.notifier.notify(Toast::error(format!(
                "Payment received, but order {} could not be updated. Please contact support.",
                order.id
            )));
        }

        let redirect = self.settle(&request.user.id, coupons, checkout).await;
        self.enter(PaymentPhase::Confirmed).await;
        self.notifier.notify(Toast::success("Payment successful"));
        Ok(PaymentOutcome::Confirmed { order, redirect })
    }

    /// Post-confirmation bookkeeping. The order already stands, so failures
    /// here are toasted by the stores and do not fail the payment.
    async fn settle(&self, user_id: &str, coupons: &CouponStore, checkout: &CheckoutStore) -> Redirect {
        let _ = coupons.mark_coupon_used(user_id).await;
        if let Err(e) = checkout.complete_order(user_id).await {
            warn!(user_id, error = %e, "Checkout not cleared after order");
        }
        Redirect::OrderHistory
    }

    fn widget_options(
        &self,
        request: &PlaceOrder,
        order: &Order,
        gateway_order_id: &str,
        amount_minor: i64,
    ) -> PaymentOptions {
        PaymentOptions {
            key: self.settings.key_id.clone(),
            amount: amount_minor,
            currency: self.settings.currency.clone(),
            name: self.settings.merchant_name.clone(),
            description: format!("Order {}", order.id),
            order_id: gateway_order_id.to_string(),
            prefill: Prefill {
                name: request.user.name.clone(),
                email: request.user.email.clone(),
                contact: request.user.phone.clone().unwrap_or_default(),
            },
            notes: PaymentNotes {
                order_id: order.id.clone(),
                address_id: request.address_id.clone(),
            },
            theme: Theme {
                color: self.settings.theme_color.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoOpNotifier;
    use crate::testing::{coupon, item, FakeApi, ScriptedWidget};
    use std::time::Duration;
    use storefront_core::{calculate, CouponDiscount, CouponStatus, Money, ShippingPolicy};

    struct Harness {
        api: Arc<FakeApi>,
        widget: Arc<ScriptedWidget>,
        coupons: CouponStore,
        checkout: CheckoutStore,
        payments: PaymentOrchestrator,
    }

    fn harness(outcome: WidgetOutcome) -> Harness {
        let api = Arc::new(FakeApi::new());
        let widget = Arc::new(ScriptedWidget::new(outcome));
        let notifier: Arc<dyn Notifier> = Arc::new(NoOpNotifier);
        let settings = PaymentSettings {
            key_id: "rzp_test_key".into(),
            ..PaymentSettings::default()
        };
        Harness {
            coupons: CouponStore::new(api.clone(), notifier.clone()),
            checkout: CheckoutStore::new(api.clone(), notifier.clone(), Duration::from_secs(300), Duration::ZERO),
            payments: PaymentOrchestrator::new(api.clone(), notifier, widget.clone(), settings),
            api,
            widget,
        }
    }

    fn request(items: Vec<LineItem>, coupon: Option<&storefront_core::CouponState>, method: PaymentMethod) -> PlaceOrder {
        let pricing = calculate(&items, DeliveryMode::Standard, coupon, &ShippingPolicy::default());
        PlaceOrder {
            user: FakeApi::user("u1"),
            items,
            pricing,
            delivery_mode: DeliveryMode::Standard,
            payment_method: method,
            address_id: Some("addr_1".into()),
        }
    }

    fn receipt() -> WidgetOutcome {
        WidgetOutcome::Success(PaymentReceipt {
            gateway_order_id: "gw_1".into(),
            payment_id: "pay_1".into(),
            signature: "sig".into(),
        })
    }

    #[tokio::test]
    async fn test_successful_online_payment() {
        let h = harness(receipt());
        h.api.seed_checkout(vec![item("v1", 1, 1000)]);
        h.api.add_coupon(coupon("FLAT150", CouponDiscount::Amount(Money::from_major(150))));
        h.checkout.load("u1").await.unwrap();
        h.coupons.apply_coupon("FLAT150", Some("u1")).await.unwrap();
        let state = h.coupons.state().await;

        let req = request(h.checkout.items().await, Some(&state), PaymentMethod::Online);
        let outcome = h.payments.place_order(&req, &h.coupons, &h.checkout).await.unwrap();

        match outcome {
            PaymentOutcome::Confirmed { order, redirect } => {
                assert_eq!(redirect, Redirect::OrderHistory);
                assert_eq!(order.status, OrderStatus::Confirmed);
                assert_eq!(order.payment_status, PaymentStatus::Paid);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        // ₹850 → 85,000 paise
        let opened = h.widget.opened().unwrap();
        assert_eq!(opened.amount, 85_000);
        assert_eq!(opened.key, "rzp_test_key");
        assert_eq!(opened.currency, "INR");
        assert_eq!(h.api.gateway_amounts(), vec![Money::from_major(850)]);

        let order_id = h.api.last_order_id().unwrap();
        assert_eq!(h.api.gateway_id_for(&order_id), Some(opened.order_id.clone()));
        assert_eq!(h.api.order_statuses(&order_id), vec![OrderStatus::Confirmed]);
        assert_eq!(h.api.payment_statuses(&order_id), vec![PaymentStatus::Paid]);
        assert_eq!(h.coupons.status().await, CouponStatus::Used);
        assert_eq!(h.api.used_coupons().len(), 1);
        assert!(h.checkout.items().await.is_empty());
        assert_eq!(h.payments.phase().await, PaymentPhase::Confirmed);
        assert!(!h.payments.is_processing_payment());
    }

    #[tokio::test]
    async fn test_payment_failed_marks_failed_without_coupon() {
        let h = harness(WidgetOutcome::Failed(PaymentFailure {
            code: "BAD_REQUEST_ERROR".into(),
            description: "Card declined".into(),
            ..PaymentFailure::default()
        }));
        h.api.seed_checkout(vec![item("v1", 1, 1000)]);
        h.api.add_coupon(coupon("FLAT150", CouponDiscount::Amount(Money::from_major(150))));
        h.checkout.load("u1").await.unwrap();
        h.coupons.apply_coupon("FLAT150", Some("u1")).await.unwrap();
        let state = h.coupons.state().await;

        let req = request(h.checkout.items().await, Some(&state), PaymentMethod::Online);
        let outcome = h.payments.place_order(&req, &h.coupons, &h.checkout).await.unwrap();

        let order_id = match outcome {
            PaymentOutcome::Failed { order_id, failure } => {
                assert_eq!(failure.description, "Card declined");
                order_id
            }
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(h.api.payment_statuses(&order_id), vec![PaymentStatus::Failed]);
        assert!(h.api.used_coupons().is_empty());
        assert_eq!(h.coupons.status().await, CouponStatus::Applied);
        assert_eq!(h.checkout.items().await.len(), 1);
        assert_eq!(h.payments.phase().await, PaymentPhase::PaymentFailed);
    }

    #[tokio::test]
    async fn test_verification_failure_leaves_order_pending() {
        let h = harness(receipt());
        h.api.seed_checkout(vec![item("v1", 1, 1000)]);
        h.api.set_verify_result(false);
        h.checkout.load("u1").await.unwrap();

        let req = request(h.checkout.items().await, None, PaymentMethod::Online);
        let err = h.payments.place_order(&req, &h.coupons, &h.checkout).await.unwrap_err();

        assert!(matches!(err, ClientError::VerificationFailed(_)));
        let order_id = h.api.last_order_id().unwrap();
        assert!(h.api.order_statuses(&order_id).is_empty());
        assert!(h.api.payment_statuses(&order_id).is_empty());
        assert_eq!(h.checkout.items().await.len(), 1);
        assert_eq!(h.payments.phase().await, PaymentPhase::VerificationFailed);
    }

    #[tokio::test]
    async fn test_verified_payment_settles_despite_status_update_failure() {
        let h = harness(receipt());
        h.api.seed_checkout(vec![item("v1", 1, 1000)]);
        h.api.add_coupon(coupon("FLAT150", CouponDiscount::Amount(Money::from_major(150))));
        h.checkout.load("u1").await.unwrap();
        h.coupons.apply_coupon("FLAT150", Some("u1")).await.unwrap();
        let state = h.coupons.state().await;
        h.api.fail_once("update_payment_status", 500, "db down");

        let req = request(h.checkout.items().await, Some(&state), PaymentMethod::Online);
        let outcome = h.payments.place_order(&req, &h.coupons, &h.checkout).await.unwrap();

        match outcome {
            PaymentOutcome::Confirmed { order, redirect } => {
                assert_eq!(redirect, Redirect::OrderHistory);
                assert_eq!(order.status, OrderStatus::Confirmed);
                assert_eq!(order.payment_status, PaymentStatus::Pending);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let order_id = h.api.last_order_id().unwrap();
        assert_eq!(h.api.order_statuses(&order_id), vec![OrderStatus::Confirmed]);
        assert!(h.api.payment_statuses(&order_id).is_empty());
        assert_eq!(h.api.used_coupons().len(), 1);
        assert!(h.checkout.items().await.is_empty());
        assert_eq!(h.payments.phase().await, PaymentPhase::Confirmed);
    }

    #[tokio::test]
    async fn test_gateway_failure_aborts_before_widget() {
        let h = harness(receipt());
        h.api.seed_checkout(vec![item("v1", 1, 1000)]);
        h.api.fail_once("create_gateway_order", 502, "Gateway down");
        h.checkout.load("u1").await.unwrap();

        let req = request(h.checkout.items().await, None, PaymentMethod::Online);
        let err = h.payments.place_order(&req, &h.coupons, &h.checkout).await.unwrap_err();

        assert!(matches!(err, ClientError::GatewayOrderFailed(_)));
        assert!(err.is_payment());
        assert!(h.widget.opened().is_none());
        assert_eq!(h.api.orders_created(), 1);
        assert_eq!(h.payments.phase().await, PaymentPhase::Aborted);
    }

    #[tokio::test]
    async fn test_dismissed_keeps_order_pending() {
        let h = harness(WidgetOutcome::Dismissed);
        h.api.seed_checkout(vec![item("v1", 1, 1000)]);
        h.checkout.load("u1").await.unwrap();

        let req = request(h.checkout.items().await, None, PaymentMethod::Online);
        let outcome = h.payments.place_order(&req, &h.coupons, &h.checkout).await.unwrap();

        assert!(matches!(outcome, PaymentOutcome::Dismissed { .. }));
        let order_id = h.api.last_order_id().unwrap();
        assert!(h.api.payment_statuses(&order_id).is_empty());
    }

    #[tokio::test]
    async fn test_cash_on_delivery_confirms_without_gateway() {
        let h = harness(receipt());
        h.api.seed_checkout(vec![item("v1", 2, 300)]);
        h.checkout.load("u1").await.unwrap();

        let req = request(h.checkout.items().await, None, PaymentMethod::CashOnDelivery);
        let outcome = h.payments.place_order(&req, &h.coupons, &h.checkout).await.unwrap();

        match outcome {
            PaymentOutcome::Confirmed { order, redirect } => {
                assert_eq!(order.status, OrderStatus::Confirmed);
                assert_eq!(redirect, Redirect::OrderHistory);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(h.widget.opened().is_none());
        assert!(h.api.gateway_amounts().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_empty_checkout_and_missing_address() {
        let h = harness(receipt());

        let req = request(Vec::new(), None, PaymentMethod::Online);
        let err = h.payments.place_order(&req, &h.coupons, &h.checkout).await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::EmptyCheckout)));

        let mut req = request(vec![item("v1", 1, 100)], None, PaymentMethod::Online);
        req.address_id = None;
        let err = h.payments.place_order(&req, &h.coupons, &h.checkout).await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::NoAddressSelected)));
        assert_eq!(h.api.orders_created(), 0);
    }
}
