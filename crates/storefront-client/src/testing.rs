//! In-memory backend and widget for unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use storefront_core::{
    Coupon, CouponDiscount, CouponSource, DeliveryEstimate, LineItem, Money, Order, OrderStatus,
    PaymentStatus, User, WishlistItem,
};

use crate::api::{AuthStatus, GatewayOrder, NewOrder, PaymentReceipt, StorefrontApi};
use crate::error::{ClientError, ClientResult};
use crate::payment::{PaymentOptions, PaymentWidget, WidgetOutcome};

// =============================================================================
// Fixtures
// =============================================================================

/// A line item whose MRP equals its price.
pub fn item(variant_id: &str, quantity: i64, price_major: i64) -> LineItem {
    let price = Money::from_major(price_major);
    LineItem::new(format!("prod_{}", variant_id), variant_id, quantity, price, price)
}

pub fn saved(variant_id: &str, price_major: i64) -> WishlistItem {
    let price = Money::from_major(price_major);
    WishlistItem {
        product_id: format!("prod_{}", variant_id),
        variant_id: variant_id.to_string(),
        name: format!("Product {}", variant_id),
        price,
        mrp: price,
    }
}

/// An individual coupon with id `cpn_<code>`.
pub fn coupon(code: &str, discount: CouponDiscount) -> Coupon {
    Coupon {
        code: code.to_string(),
        coupon_id: format!("cpn_{}", code),
        discount,
        source: CouponSource::Individual,
    }
}

// =============================================================================
// Fake API
// =============================================================================

#[derive(Default)]
struct FakeState {
    user: Option<User>,
    auth_failures: u32,
    cart: Vec<LineItem>,
    wishlist: Vec<WishlistItem>,
    checkout: Vec<LineItem>,
    coupons: HashMap<String, Result<Coupon, String>>,
    used_coupons: Vec<(CouponSource, String)>,
    orders: Vec<Order>,
    order_statuses: Vec<(String, OrderStatus)>,
    payment_statuses: Vec<(String, PaymentStatus)>,
    gateway_ids: HashMap<String, String>,
    gateway_amounts: Vec<Money>,
    verify_result: bool,
    delivery: HashMap<String, (bool, Option<u32>, Duration)>,
    failures: HashMap<&'static str, ClientError>,
    calls: HashMap<&'static str, usize>,
}

/// Backend double. Single shopper; user ids are only checked for presence.
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        FakeApi {
            state: Mutex::new(FakeState {
                verify_result: true,
                ..FakeState::default()
            }),
        }
    }

    pub fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.in".to_string(),
            phone: Some("9000000000".to_string()),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    /// Counts the call and returns any scripted failure for it.
    fn enter(&self, op: &'static str) -> ClientResult<()> {
        self.with(|s| {
            *s.calls.entry(op).or_default() += 1;
            match s.failures.remove(op) {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    // --- scripting ----------------------------------------------------------

    pub fn set_user(&self, user: Option<User>) {
        self.with(|s| s.user = user);
    }

    pub fn fail_auth_status_times(&self, times: u32) {
        self.with(|s| s.auth_failures = times);
    }

    /// Next call to `op` answers with an HTTP error.
    pub fn fail_once(&self, op: &'static str, status: u16, message: &str) {
        let err = ClientError::Api {
            status,
            message: message.to_string(),
        };
        self.with(|s| s.failures.insert(op, err));
    }

    /// Next call to `op` fails before reaching the server.
    pub fn fail_transport_once(&self, op: &'static str) {
        self.with(|s| s.failures.insert(op, ClientError::Http("connection refused".into())));
    }

    pub fn seed_cart(&self, items: Vec<LineItem>) {
        self.with(|s| s.cart = items);
    }

    pub fn seed_wishlist(&self, items: Vec<WishlistItem>) {
        self.with(|s| s.wishlist = items);
    }

    pub fn seed_checkout(&self, items: Vec<LineItem>) {
        self.with(|s| s.checkout = items);
    }

    pub fn add_coupon(&self, coupon: Coupon) {
        self.with(|s| s.coupons.insert(coupon.code.clone(), Ok(coupon)));
    }

    pub fn reject_coupon(&self, code: &str, message: &str) {
        self.with(|s| s.coupons.insert(code.to_string(), Err(message.to_string())));
    }

    pub fn set_verify_result(&self, verified: bool) {
        self.with(|s| s.verify_result = verified);
    }

    pub fn set_delivery(&self, pincode: &str, deliverable: bool, days: Option<u32>, delay: Duration) {
        self.with(|s| s.delivery.insert(pincode.to_string(), (deliverable, days, delay)));
    }

    // --- inspection ---------------------------------------------------------

    pub fn calls(&self, op: &str) -> usize {
        self.with(|s| s.calls.get(op).copied().unwrap_or(0))
    }

    pub fn cart_snapshot(&self) -> Vec<LineItem> {
        self.with(|s| s.cart.clone())
    }

    pub fn checkout_snapshot(&self) -> Vec<LineItem> {
        self.with(|s| s.checkout.clone())
    }

    pub fn used_coupons(&self) -> Vec<(CouponSource, String)> {
        self.with(|s| s.used_coupons.clone())
    }

    pub fn orders_created(&self) -> usize {
        self.with(|s| s.orders.len())
    }

    pub fn last_order_id(&self) -> Option<String> {
        self.with(|s| s.orders.last().map(|o| o.id.clone()))
    }

    pub fn order_statuses(&self, order_id: &str) -> Vec<OrderStatus> {
        self.with(|s| {
            s.order_statuses
                .iter()
                .filter(|(id, _)| id == order_id)
                .map(|(_, st)| *st)
                .collect()
        })
    }

    pub fn payment_statuses(&self, order_id: &str) -> Vec<PaymentStatus> {
        self.with(|s| {
            s.payment_statuses
                .iter()
                .filter(|(id, _)| id == order_id)
                .map(|(_, st)| *st)
                .collect()
        })
    }

    pub fn gateway_id_for(&self, order_id: &str) -> Option<String> {
        self.with(|s| s.gateway_ids.get(order_id).cloned())
    }

    pub fn gateway_amounts(&self) -> Vec<Money> {
        self.with(|s| s.gateway_amounts.clone())
    }
}

fn upsert(items: &mut Vec<LineItem>, item: &LineItem) {
    match items.iter_mut().find(|i| i.variant_id == item.variant_id) {
        Some(existing) => existing.quantity += item.quantity,
        None => items.push(item.clone()),
    }
}

#[async_trait]
impl StorefrontApi for FakeApi {
    async fn auth_status(&self) -> ClientResult<AuthStatus> {
        self.enter("auth_status")?;
        self.with(|s| {
            if s.auth_failures > 0 {
                s.auth_failures -= 1;
                return Err(ClientError::Timeout);
            }
            Ok(AuthStatus {
                authenticated: s.user.is_some(),
                user: s.user.clone(),
            })
        })
    }

    async fn cart_items(&self, _user_id: &str) -> ClientResult<Vec<LineItem>> {
        self.enter("cart_items")?;
        Ok(self.cart_snapshot())
    }

    async fn add_cart_item(&self, _user_id: &str, item: &LineItem) -> ClientResult<()> {
        self.enter("add_cart_item")?;
        self.with(|s| upsert(&mut s.cart, item));
        Ok(())
    }

    async fn update_cart_quantity(
        &self,
        _user_id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> ClientResult<()> {
        self.enter("update_cart_quantity")?;
        self.with(|s| {
            let line = s
                .cart
                .iter_mut()
                .find(|i| i.variant_id == variant_id)
                .ok_or_else(|| ClientError::Api {
                    status: 404,
                    message: "Item not in cart".into(),
                })?;
            line.quantity = quantity;
            Ok(())
        })
    }

    async fn remove_cart_item(&self, _user_id: &str, variant_id: &str) -> ClientResult<()> {
        self.enter("remove_cart_item")?;
        self.with(|s| s.cart.retain(|i| i.variant_id != variant_id));
        Ok(())
    }

    async fn wishlist_items(&self, _user_id: &str) -> ClientResult<Vec<WishlistItem>> {
        self.enter("wishlist_items")?;
        Ok(self.with(|s| s.wishlist.clone()))
    }

    async fn add_wishlist_item(&self, _user_id: &str, item: &WishlistItem) -> ClientResult<()> {
        self.enter("add_wishlist_item")?;
        self.with(|s| {
            if !s.wishlist.iter().any(|i| i.variant_id == item.variant_id) {
                s.wishlist.push(item.clone());
            }
        });
        Ok(())
    }

    async fn remove_wishlist_item(&self, _user_id: &str, variant_id: &str) -> ClientResult<()> {
        self.enter("remove_wishlist_item")?;
        self.with(|s| s.wishlist.retain(|i| i.variant_id != variant_id));
        Ok(())
    }

    async fn checkout_items(&self, _user_id: &str) -> ClientResult<Vec<LineItem>> {
        self.enter("checkout_items")?;
        Ok(self.checkout_snapshot())
    }

    async fn add_checkout_item(&self, _user_id: &str, item: &LineItem) -> ClientResult<()> {
        self.enter("add_checkout_item")?;
        self.with(|s| upsert(&mut s.checkout, item));
        Ok(())
    }

    async fn remove_checkout_item(&self, _user_id: &str, variant_id: &str) -> ClientResult<()> {
        self.enter("remove_checkout_item")?;
        self.with(|s| s.checkout.retain(|i| i.variant_id != variant_id));
        Ok(())
    }

    async fn clear_checkout(&self, _user_id: &str) -> ClientResult<()> {
        self.enter("clear_checkout")?;
        self.with(|s| s.checkout.clear());
        Ok(())
    }

    async fn lookup_coupon(&self, code: &str, _user_id: &str) -> ClientResult<Coupon> {
        self.enter("lookup_coupon")?;
        self.with(|s| match s.coupons.get(code) {
            Some(Ok(coupon)) => Ok(coupon.clone()),
            Some(Err(message)) => Err(ClientError::Api {
                status: 400,
                message: message.clone(),
            }),
            None => Err(ClientError::Api {
                status: 404,
                message: "Coupon not found".into(),
            }),
        })
    }

    async fn mark_coupon_used(
        &self,
        source: CouponSource,
        coupon_id: &str,
        _user_id: &str,
    ) -> ClientResult<()> {
        self.enter("mark_coupon_used")?;
        self.with(|s| s.used_coupons.push((source, coupon_id.to_string())));
        Ok(())
    }

    async fn create_order(&self, order: &NewOrder) -> ClientResult<Order> {
        self.enter("create_order")?;
        self.with(|s| {
            let created = Order {
                id: format!("order_{}", s.orders.len() + 1),
                user_id: order.user_id.clone(),
                status: order.status,
                payment_status: order.payment_status,
                payment_method: order.payment_method,
                total: order.pricing.grand_total,
                gateway_order_id: None,
                created_at: Utc::now(),
            };
            s.orders.push(created.clone());
            Ok(created)
        })
    }

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<()> {
        self.enter("update_order_status")?;
        self.with(|s| s.order_statuses.push((order_id.to_string(), status)));
        Ok(())
    }

    async fn update_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
    ) -> ClientResult<()> {
        self.enter("update_payment_status")?;
        self.with(|s| s.payment_statuses.push((order_id.to_string(), status)));
        Ok(())
    }

    async fn update_gateway_order_id(
        &self,
        order_id: &str,
        gateway_order_id: &str,
    ) -> ClientResult<()> {
        self.enter("update_gateway_order_id")?;
        self.with(|s| {
            s.gateway_ids
                .insert(order_id.to_string(), gateway_order_id.to_string())
        });
        Ok(())
    }

    async fn create_gateway_order(
        &self,
        amount: Money,
        currency: &str,
        _receipt: &str,
    ) -> ClientResult<GatewayOrder> {
        self.enter("create_gateway_order")?;
        self.with(|s| {
            s.gateway_amounts.push(amount);
            Ok(GatewayOrder {
                id: format!("gw_{}", s.gateway_amounts.len()),
                amount,
                currency: currency.to_string(),
            })
        })
    }

    async fn verify_payment(&self, _receipt: &PaymentReceipt) -> ClientResult<bool> {
        self.enter("verify_payment")?;
        Ok(self.with(|s| s.verify_result))
    }

    async fn delivery_estimate(&self, pincode: &str) -> ClientResult<DeliveryEstimate> {
        self.enter("delivery_estimate")?;
        let (deliverable, days, delay) = self
            .with(|s| s.delivery.get(pincode).copied())
            .unwrap_or((false, None, Duration::ZERO));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(DeliveryEstimate {
            pincode: pincode.to_string(),
            deliverable,
            estimated_days: days,
        })
    }
}

// =============================================================================
// Scripted Widget
// =============================================================================

/// Payment widget that always ends the same way and records its options.
pub struct ScriptedWidget {
    outcome: WidgetOutcome,
    opened: Mutex<Option<PaymentOptions>>,
}

impl ScriptedWidget {
    pub fn new(outcome: WidgetOutcome) -> Self {
        ScriptedWidget {
            outcome,
            opened: Mutex::new(None),
        }
    }

    /// Options from the last `open`, if the widget was opened.
    pub fn opened(&self) -> Option<PaymentOptions> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentWidget for ScriptedWidget {
    async fn open(&self, options: PaymentOptions) -> WidgetOutcome {
        *self.opened.lock().unwrap() = Some(options);
        self.outcome.clone()
    }
}
