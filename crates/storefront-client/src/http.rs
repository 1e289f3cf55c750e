//! # HTTP Backend
//!
//! `StorefrontApi` over reqwest.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  store op ──► HttpApi::execute ──► reqwest (cookie store, timeout)      │
//! │                    │                                                    │
//! │                    ├── 2xx ──► body decoded into wire type ──► domain   │
//! │                    │                                                    │
//! │                    └── 4xx/5xx ──► ClientError::Api { status, message } │
//! │                                     message = body.message              │
//! │                                            | body.error                 │
//! │                                            | status reason              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The backend speaks rupees as JSON floats; everything is converted to
//! `Money` here and nowhere else.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use storefront_core::{
    Coupon, CouponDiscount, CouponSource, DeliveryEstimate, DeliveryMode, LineItem, Money, Order,
    OrderStatus, PaymentMethod, PaymentStatus, Percentage, User, WishlistItem,
};
use tracing::{debug, warn};
use url::Url;

use crate::api::{paths, AuthStatus, GatewayOrder, NewOrder, PaymentReceipt, StorefrontApi};
use crate::config::StorefrontConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// HTTP Client
// =============================================================================

/// REST client for the storefront backend.
///
/// Session credentials travel as cookies, so one `HttpApi` per logged-in
/// browser-equivalent session.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    /// Builds a client from configuration.
    pub fn new(config: &StorefrontConfig) -> ClientResult<Self> {
        let base = config.api_origin()?;
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()?;

        Ok(HttpApi { client, base })
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        Ok(self.client.request(method, self.url(path)?))
    }

    /// Sends a request and maps non-2xx responses to `ClientError::Api`.
    async fn execute(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Backend response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(status = status.as_u16(), %message, "Backend rejected request");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        let request = self.request(Method::GET, path)?.query(query);
        Ok(self.execute(request).await?.json::<T>().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.request(method, path)?.json(body);
        Ok(self.execute(request).await?.json::<T>().await?)
    }

    /// Sends a JSON body and ignores the response body.
    async fn send_unit<B>(&self, method: Method, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let request = self.request(method, path)?.json(body);
        self.execute(request).await?;
        Ok(())
    }

    async fn delete(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<()> {
        let request = self.request(Method::DELETE, path)?.query(query);
        self.execute(request).await?;
        Ok(())
    }
}

/// Extracts the user-facing message from an error body.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLineItem {
    product_id: String,
    variant_id: String,
    quantity: i64,
    #[serde(alias = "price")]
    our_price: f64,
    #[serde(default)]
    mrp: Option<f64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "image")]
    image_url: Option<String>,
}

impl From<WireLineItem> for LineItem {
    fn from(w: WireLineItem) -> Self {
        let unit_price = Money::from_major_f64(w.our_price);
        // Missing MRP means no markdown
        let mrp = w.mrp.map(Money::from_major_f64).unwrap_or(unit_price);
        LineItem {
            product_id: w.product_id,
            variant_id: w.variant_id,
            quantity: w.quantity,
            unit_price,
            mrp,
            name: w.name.unwrap_or_default(),
            image_url: w.image_url,
        }
    }
}

impl From<&LineItem> for WireLineItem {
    fn from(item: &LineItem) -> Self {
        WireLineItem {
            product_id: item.product_id.clone(),
            variant_id: item.variant_id.clone(),
            quantity: item.quantity,
            our_price: item.unit_price.to_major_f64(),
            mrp: Some(item.mrp.to_major_f64()),
            name: Some(item.name.clone()),
            image_url: item.image_url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWishlistItem {
    product_id: String,
    variant_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(alias = "ourPrice")]
    price: f64,
    #[serde(default)]
    mrp: Option<f64>,
}

impl From<WireWishlistItem> for WishlistItem {
    fn from(w: WireWishlistItem) -> Self {
        let price = Money::from_major_f64(w.price);
        WishlistItem {
            product_id: w.product_id,
            variant_id: w.variant_id,
            name: w.name.unwrap_or_default(),
            price,
            mrp: w.mrp.map(Money::from_major_f64).unwrap_or(price),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CouponEnvelope {
    coupon: WireCoupon,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCoupon {
    #[serde(alias = "_id")]
    id: String,
    code: String,
    discount_type: String,
    discount_value: f64,
    #[serde(default, alias = "type")]
    source: CouponSource,
}

impl From<WireCoupon> for Coupon {
    fn from(w: WireCoupon) -> Self {
        let discount = if w.discount_type.eq_ignore_ascii_case("percentage") {
            CouponDiscount::Percentage(Percentage::from_percent_f64(w.discount_value))
        } else {
            CouponDiscount::Amount(Money::from_major_f64(w.discount_value))
        };
        Coupon {
            code: w.code,
            coupon_id: w.id,
            discount,
            source: w.source,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: WireOrder,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOrder {
    #[serde(alias = "_id")]
    id: String,
    user_id: String,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_method: PaymentMethod,
    total_amount: f64,
    #[serde(default)]
    razorpay_order_id: Option<String>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl From<WireOrder> for Order {
    fn from(w: WireOrder) -> Self {
        Order {
            id: w.id,
            user_id: w.user_id,
            status: w.status,
            payment_status: w.payment_status,
            payment_method: w.payment_method,
            total: Money::from_major_f64(w.total_amount),
            gateway_order_id: w.razorpay_order_id,
            created_at: w.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireNewOrder<'a> {
    user_id: &'a str,
    items: Vec<WireLineItem>,
    subtotal: f64,
    discount_amount: f64,
    shipping_amount: f64,
    total_amount: f64,
    delivery_mode: DeliveryMode,
    payment_method: PaymentMethod,
    address_id: Option<&'a str>,
    coupon_code: Option<&'a str>,
    status: OrderStatus,
    payment_status: PaymentStatus,
}

impl<'a> From<&'a NewOrder> for WireNewOrder<'a> {
    fn from(order: &'a NewOrder) -> Self {
        WireNewOrder {
            user_id: &order.user_id,
            items: order.items.iter().map(WireLineItem::from).collect(),
            subtotal: order.pricing.subtotal.to_major_f64(),
            discount_amount: order.pricing.discount_amount.to_major_f64(),
            shipping_amount: order.pricing.shipping_amount.to_major_f64(),
            total_amount: order.pricing.grand_total.to_major_f64(),
            delivery_mode: order.delivery_mode,
            payment_method: order.payment_method,
            address_id: order.address_id.as_deref(),
            coupon_code: order.coupon_code.as_deref(),
            status: order.status,
            payment_status: order.payment_status,
        }
    }
}

/// Gateway amounts are already integer paise on the wire.
#[derive(Debug, Serialize)]
struct WireGatewayOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireGatewayOrder {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Serialize)]
struct WireVerifyRequest<'a> {
    razorpay_order_id: &'a str,
    razorpay_payment_id: &'a str,
    razorpay_signature: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireVerifyResponse {
    #[serde(alias = "verified")]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct WireAuthStatus {
    #[serde(alias = "isAuthenticated")]
    authenticated: bool,
    #[serde(default)]
    user: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: Option<String>,
}

impl From<WireUser> for User {
    fn from(w: WireUser) -> Self {
        User {
            id: w.id,
            name: w.name,
            email: w.email,
            phone: w.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDeliveryEstimate {
    pincode: String,
    deliverable: bool,
    #[serde(default)]
    estimated_days: Option<u32>,
}

// =============================================================================
// StorefrontApi Implementation
// =============================================================================

#[async_trait]
impl StorefrontApi for HttpApi {
    async fn auth_status(&self) -> ClientResult<AuthStatus> {
        let wire: WireAuthStatus = self.get_json(paths::AUTH_STATUS, &[]).await?;
        Ok(AuthStatus {
            authenticated: wire.authenticated,
            user: wire.user.map(User::from),
        })
    }

    async fn cart_items(&self, user_id: &str) -> ClientResult<Vec<LineItem>> {
        let wire: ItemsEnvelope<WireLineItem> =
            self.get_json(paths::CART, &[("userId", user_id)]).await?;
        Ok(wire.items.into_iter().map(LineItem::from).collect())
    }

    async fn add_cart_item(&self, user_id: &str, item: &LineItem) -> ClientResult<()> {
        let body = serde_json::json!({ "userId": user_id, "item": WireLineItem::from(item) });
        self.send_unit(Method::POST, paths::CART, &body).await
    }

    async fn update_cart_quantity(
        &self,
        user_id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> ClientResult<()> {
        let body = serde_json::json!({
            "userId": user_id,
            "variantId": variant_id,
            "quantity": quantity,
        });
        self.send_unit(Method::PUT, paths::CART, &body).await
    }

    async fn remove_cart_item(&self, user_id: &str, variant_id: &str) -> ClientResult<()> {
        self.delete(paths::CART, &[("userId", user_id), ("variantId", variant_id)])
            .await
    }

    async fn wishlist_items(&self, user_id: &str) -> ClientResult<Vec<WishlistItem>> {
        let wire: ItemsEnvelope<WireWishlistItem> =
            self.get_json(paths::WISHLIST, &[("userId", user_id)]).await?;
        Ok(wire.items.into_iter().map(WishlistItem::from).collect())
    }

    async fn add_wishlist_item(&self, user_id: &str, item: &WishlistItem) -> ClientResult<()> {
        let body = serde_json::json!({
            "userId": user_id,
            "productId": item.product_id,
            "variantId": item.variant_id,
        });
        self.send_unit(Method::POST, paths::WISHLIST, &body).await
    }

    async fn remove_wishlist_item(&self, user_id: &str, variant_id: &str) -> ClientResult<()> {
        self.delete(
            paths::WISHLIST,
            &[("userId", user_id), ("variantId", variant_id)],
        )
        .await
    }

    async fn checkout_items(&self, user_id: &str) -> ClientResult<Vec<LineItem>> {
        let wire: ItemsEnvelope<WireLineItem> =
            self.get_json(paths::CHECKOUT, &[("userId", user_id)]).await?;
        Ok(wire.items.into_iter().map(LineItem::from).collect())
    }

    async fn add_checkout_item(&self, user_id: &str, item: &LineItem) -> ClientResult<()> {
        let body = serde_json::json!({ "userId": user_id, "item": WireLineItem::from(item) });
        self.send_unit(Method::POST, paths::CHECKOUT, &body).await
    }

    async fn remove_checkout_item(&self, user_id: &str, variant_id: &str) -> ClientResult<()> {
        self.delete(
            paths::CHECKOUT,
            &[("userId", user_id), ("variantId", variant_id)],
        )
        .await
    }

    async fn clear_checkout(&self, user_id: &str) -> ClientResult<()> {
        self.delete(paths::CHECKOUT_CLEAR, &[("userId", user_id)]).await
    }

    async fn lookup_coupon(&self, code: &str, user_id: &str) -> ClientResult<Coupon> {
        let wire: CouponEnvelope = self
            .get_json(paths::COUPONS, &[("code", code), ("userId", user_id)])
            .await?;
        Ok(wire.coupon.into())
    }

    async fn mark_coupon_used(
        &self,
        source: CouponSource,
        coupon_id: &str,
        user_id: &str,
    ) -> ClientResult<()> {
        let path = match source {
            CouponSource::Individual => paths::COUPON_USE,
            CouponSource::Special => paths::SPECIAL_COUPON_USE,
        };
        let body = serde_json::json!({ "couponId": coupon_id, "userId": user_id });
        self.send_unit(Method::POST, path, &body).await
    }

    async fn create_order(&self, order: &NewOrder) -> ClientResult<Order> {
        let wire: OrderEnvelope = self
            .send_json(Method::POST, paths::ORDERS, &WireNewOrder::from(order))
            .await?;
        Ok(wire.order.into())
    }

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<()> {
        let body = serde_json::json!({ "orderId": order_id, "status": status });
        self.send_unit(Method::POST, paths::ORDER_STATUS, &body).await
    }

    async fn update_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
    ) -> ClientResult<()> {
        let body = serde_json::json!({ "orderId": order_id, "paymentStatus": status });
        self.send_unit(Method::POST, paths::ORDER_PAYMENT_STATUS, &body)
            .await
    }

    async fn update_gateway_order_id(
        &self,
        order_id: &str,
        gateway_order_id: &str,
    ) -> ClientResult<()> {
        let body = serde_json::json!({
            "orderId": order_id,
            "razorpayOrderId": gateway_order_id,
        });
        self.send_unit(Method::POST, paths::ORDER_GATEWAY_ID, &body).await
    }

    async fn create_gateway_order(
        &self,
        amount: Money,
        currency: &str,
        receipt: &str,
    ) -> ClientResult<GatewayOrder> {
        let request = WireGatewayOrderRequest {
            amount: amount.minor(),
            currency,
            receipt,
        };
        let wire: WireGatewayOrder = self
            .send_json(Method::POST, paths::GATEWAY_CREATE_ORDER, &request)
            .await?;
        Ok(GatewayOrder {
            id: wire.id,
            amount: Money::from_minor(wire.amount),
            currency: wire.currency,
        })
    }

    async fn verify_payment(&self, receipt: &PaymentReceipt) -> ClientResult<bool> {
        let request = WireVerifyRequest {
            razorpay_order_id: &receipt.gateway_order_id,
            razorpay_payment_id: &receipt.payment_id,
            razorpay_signature: &receipt.signature,
        };
        let wire: WireVerifyResponse = self
            .send_json(Method::POST, paths::GATEWAY_VERIFY, &request)
            .await?;
        Ok(wire.success)
    }

    async fn delivery_estimate(&self, pincode: &str) -> ClientResult<DeliveryEstimate> {
        let wire: WireDeliveryEstimate = self
            .get_json(paths::DELIVERY_ESTIMATE, &[("pincode", pincode)])
            .await?;
        Ok(DeliveryEstimate {
            pincode: wire.pincode,
            deliverable: wire.deliverable,
            estimated_days: wire.estimated_days,
        })
    }
}
