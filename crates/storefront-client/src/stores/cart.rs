//! # Cart Store
//!
//! The customer's cart, mirrored from `/api/cart`.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load(user, force) ──► GET  (skipped while fresh unless forced)         │
//! │  add(user, item)   ──► POST ──► GET                                     │
//! │  update_quantity   ──► PUT  ──► GET                                     │
//! │  remove            ──► DELETE ──► GET                                   │
//! │  move_to_checkout  ──► checkout POST ──► cart DELETE ──► GET both       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;
use storefront_core::validation::{validate_quantity, validate_user_id};
use storefront_core::{CoreError, LineItem};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::cache::{BusyFlag, Cached};
use super::checkout::CheckoutStore;
use super::surface;
use crate::api::StorefrontApi;
use crate::error::{ClientError, ClientResult};
use crate::notify::{Notifier, Toast};

pub struct CartStore {
    api: Arc<dyn StorefrontApi>,
    notifier: Arc<dyn Notifier>,
    items: RwLock<Cached<Vec<LineItem>>>,
    adding: BusyFlag,
}

impl CartStore {
    pub fn new(api: Arc<dyn StorefrontApi>, notifier: Arc<dyn Notifier>, ttl: Duration) -> Self {
        CartStore {
            api,
            notifier,
            items: RwLock::new(Cached::new(ttl)),
            adding: BusyFlag::new(),
        }
    }

    /// Cached items as last reported by the server.
    pub async fn items(&self) -> Vec<LineItem> {
        self.items.read().await.get().clone()
    }

    /// Total quantity across lines, for the header badge.
    pub async fn count(&self) -> i64 {
        self.items.read().await.get().iter().map(|i| i.quantity).sum()
    }

    pub fn is_adding_to_cart(&self) -> bool {
        self.adding.is_busy()
    }

    /// Fetches the cart unless the cached copy is still fresh.
    pub async fn load(&self, user_id: &str, force: bool) -> ClientResult<Vec<LineItem>> {
        if !force {
            let cached = self.items.read().await;
            if cached.is_fresh() {
                return Ok(cached.get().clone());
            }
        }
        surface(&*self.notifier, "load cart", self.refetch(user_id).await)
    }

    async fn refetch(&self, user_id: &str) -> ClientResult<Vec<LineItem>> {
        validate_user_id(user_id)?;
        let items = self.api.cart_items(user_id).await?;
        debug!(user_id, lines = items.len(), "Cart fetched");
        self.items.write().await.set(items.clone());
        Ok(items)
    }

    pub async fn add(&self, user_id: &str, item: &LineItem) -> ClientResult<Vec<LineItem>> {
        let result = async {
            let _guard = self.adding.try_acquire("Add to cart")?;
            validate_user_id(user_id)?;
            validate_quantity(item.quantity)?;
            self.api.add_cart_item(user_id, item).await?;
            self.refetch(user_id).await
        }
        .await;

        let items = surface(&*self.notifier, "add to cart", result)?;
        info!(variant_id = %item.variant_id, "Added to cart");
        self.notifier.notify(Toast::success("Added to cart"));
        Ok(items)
    }

    pub async fn update_quantity(
        &self,
        user_id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> ClientResult<Vec<LineItem>> {
        let result = async {
            validate_user_id(user_id)?;
            validate_quantity(quantity)?;
            self.api
                .update_cart_quantity(user_id, variant_id, quantity)
                .await?;
            self.refetch(user_id).await
        }
        .await;

        surface(&*self.notifier, "update cart quantity", result)
    }

    pub async fn remove(&self, user_id: &str, variant_id: &str) -> ClientResult<Vec<LineItem>> {
        let result = async {
            validate_user_id(user_id)?;
            self.api.remove_cart_item(user_id, variant_id).await?;
            self.refetch(user_id).await
        }
        .await;

        let items = surface(&*self.notifier, "remove from cart", result)?;
        self.notifier.notify(Toast::info("Removed from cart"));
        Ok(items)
    }

    /// Moves one cart line into the checkout session.
    ///
    /// The checkout row is written before the cart row is deleted, so a
    /// failure in between leaves the item in both rather than in neither.
    pub async fn move_to_checkout(
        &self,
        user_id: &str,
        variant_id: &str,
        checkout: &CheckoutStore,
    ) -> ClientResult<()> {
        let result = async {
            validate_user_id(user_id)?;
            let item = self
                .items
                .read()
                .await
                .get()
                .iter()
                .find(|i| i.variant_id == variant_id)
                .cloned()
                .ok_or_else(|| CoreError::ItemNotFound(variant_id.to_string()))?;

            self.api.add_checkout_item(user_id, &item).await?;
            self.api.remove_cart_item(user_id, variant_id).await?;
            self.refetch(user_id).await?;
            Ok::<_, ClientError>(())
        }
        .await;

        surface(&*self.notifier, "move to checkout", result)?;
        checkout.load(user_id).await?;
        Ok(())
    }

    /// Drops the cached cart (logout).
    pub async fn reset(&self) {
        self.items.write().await.reset();
    }
}
