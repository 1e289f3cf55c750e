//! # Auth Store
//!
//! Who is logged in. The backend session cookie is the credential; this
//! store only mirrors `GET /api/auth/status`.

use std::sync::Arc;
use storefront_core::User;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::api::StorefrontApi;
use crate::config::RetrySettings;
use crate::error::{ClientError, ClientResult};
use crate::retry::with_backoff;

pub struct AuthStore {
    api: Arc<dyn StorefrontApi>,
    retry: RetrySettings,
    user: RwLock<Option<User>>,
}

impl AuthStore {
    pub fn new(api: Arc<dyn StorefrontApi>, retry: RetrySettings) -> Self {
        AuthStore {
            api,
            retry,
            user: RwLock::new(None),
        }
    }

    /// Polls the auth status, retrying transient failures with backoff.
    ///
    /// The only retried call in the client.
    pub async fn refresh(&self) -> ClientResult<Option<User>> {
        let status = with_backoff(&self.retry, "auth status", || self.api.auth_status()).await?;

        let user = if status.authenticated { status.user } else { None };
        debug!(logged_in = user.is_some(), "Auth status refreshed");

        *self.user.write().await = user.clone();
        Ok(user)
    }

    pub async fn user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    /// Id of the logged-in user, or `NotLoggedIn`.
    pub async fn user_id(&self) -> ClientResult<String> {
        self.user
            .read()
            .await
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or(ClientError::NotLoggedIn)
    }

    pub async fn is_logged_in(&self) -> bool {
        self.user.read().await.is_some()
    }

    /// Forgets the user locally.
    pub async fn clear(&self) {
        if self.user.write().await.take().is_some() {
            info!("User logged out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    #[tokio::test(start_paused = true)]
    async fn test_refresh_retries_transient_failures() {
        let api = Arc::new(FakeApi::new());
        api.set_user(Some(FakeApi::user("u1")));
        api.fail_auth_status_times(2);

        let store = AuthStore::new(api.clone(), RetrySettings::default());
        let user = store.refresh().await.unwrap();

        assert_eq!(user.map(|u| u.id), Some("u1".to_string()));
        assert_eq!(api.calls("auth_status"), 3);
        assert_eq!(store.user_id().await.unwrap(), "u1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_gives_up_after_three_attempts() {
        let api = Arc::new(FakeApi::new());
        api.fail_auth_status_times(5);

        let store = AuthStore::new(api.clone(), RetrySettings::default());
        assert!(store.refresh().await.is_err());
        assert_eq!(api.calls("auth_status"), 3);
        assert!(matches!(store.user_id().await, Err(ClientError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_clear_logs_out() {
        let api = Arc::new(FakeApi::new());
        api.set_user(Some(FakeApi::user("u1")));
        let store = AuthStore::new(api, RetrySettings::default());
        store.refresh().await.unwrap();
        assert!(store.is_logged_in().await);

        store.clear().await;
        assert!(!store.is_logged_in().await);
    }
}
