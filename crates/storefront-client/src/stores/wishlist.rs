//! # Wishlist Store
//!
//! Saved-for-later variants, mirrored from `/api/wishlist`.

use std::sync::Arc;
use std::time::Duration;
use storefront_core::validation::{validate_quantity, validate_user_id};
use storefront_core::{CoreError, WishlistItem};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::cache::Cached;
use super::cart::CartStore;
use super::surface;
use crate::api::StorefrontApi;
use crate::error::{ClientError, ClientResult};
use crate::notify::{Notifier, Toast};

pub struct WishlistStore {
    api: Arc<dyn StorefrontApi>,
    notifier: Arc<dyn Notifier>,
    items: RwLock<Cached<Vec<WishlistItem>>>,
}

impl WishlistStore {
    pub fn new(api: Arc<dyn StorefrontApi>, notifier: Arc<dyn Notifier>, ttl: Duration) -> Self {
        WishlistStore {
            api,
            notifier,
            items: RwLock::new(Cached::new(ttl)),
        }
    }

    pub async fn items(&self) -> Vec<WishlistItem> {
        self.items.read().await.get().clone()
    }

    /// Whether a variant is saved (drives the heart icon).
    pub async fn contains(&self, variant_id: &str) -> bool {
        self.items
            .read()
            .await
            .get()
            .iter()
            .any(|i| i.variant_id == variant_id)
    }

    pub async fn load(&self, user_id: &str, force: bool) -> ClientResult<Vec<WishlistItem>> {
        if !force {
            let cached = self.items.read().await;
            if cached.is_fresh() {
                return Ok(cached.get().clone());
            }
        }
        surface(&*self.notifier, "load wishlist", self.refetch(user_id).await)
    }

    async fn refetch(&self, user_id: &str) -> ClientResult<Vec<WishlistItem>> {
        validate_user_id(user_id)?;
        let items = self.api.wishlist_items(user_id).await?;
        debug!(user_id, count = items.len(), "Wishlist fetched");
        self.items.write().await.set(items.clone());
        Ok(items)
    }

    pub async fn add(&self, user_id: &str, item: &WishlistItem) -> ClientResult<Vec<WishlistItem>> {
        let result = async {
            validate_user_id(user_id)?;
            self.api.add_wishlist_item(user_id, item).await?;
            self.refetch(user_id).await
        }
        .await;

        let items = surface(&*self.notifier, "add to wishlist", result)?;
        self.notifier.notify(Toast::success("Added to wishlist"));
        Ok(items)
    }

    pub async fn remove(&self, user_id: &str, variant_id: &str) -> ClientResult<Vec<WishlistItem>> {
        let result = async {
            validate_user_id(user_id)?;
            self.api.remove_wishlist_item(user_id, variant_id).await?;
            self.refetch(user_id).await
        }
        .await;

        let items = surface(&*self.notifier, "remove from wishlist", result)?;
        self.notifier.notify(Toast::info("Removed from wishlist"));
        Ok(items)
    }

    /// Moves a saved variant into the cart with the given quantity.
    pub async fn move_to_cart(
        &self,
        user_id: &str,
        variant_id: &str,
        quantity: i64,
        cart: &CartStore,
    ) -> ClientResult<()> {
        let result = async {
            validate_user_id(user_id)?;
            validate_quantity(quantity)?;
            let saved = self
                .items
                .read()
                .await
                .get()
                .iter()
                .find(|i| i.variant_id == variant_id)
                .cloned()
                .ok_or_else(|| CoreError::ItemNotFound(variant_id.to_string()))?;

            self.api
                .add_cart_item(user_id, &saved.to_line_item(quantity))
                .await?;
            self.api.remove_wishlist_item(user_id, variant_id).await?;
            self.refetch(user_id).await?;
            Ok::<_, ClientError>(())
        }
        .await;

        surface(&*self.notifier, "move to cart", result)?;
        info!(variant_id, quantity, "Moved from wishlist to cart");
        cart.load(user_id, true).await?;
        self.notifier.notify(Toast::success("Moved to cart"));
        Ok(())
    }

    /// Drops the cached wishlist (logout).
    pub async fn reset(&self) {
        self.items.write().await.reset();
    }
}
