//! # Coupon Store
//!
//! Resolves coupon codes against the backend and tracks the result.
//!
//! ## Status Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  apply(code) ──► lookup ok ───────────────────────────► Applied         │
//! │              └─► rejected: "...expired..." ───────────► Expired         │
//! │              └─► rejected: "...used..."    ───────────► Used            │
//! │              └─► rejected: anything else   ───────────► Invalid         │
//! │                                                                         │
//! │  Applied ──► mark_used (after payment) ──► Used                         │
//! │  any     ──► remove / logout           ──► None                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `Applied` discounts the order. The status lives in client memory
//! only.

use std::sync::Arc;
use storefront_core::validation::{validate_coupon_code, validate_user_id};
use storefront_core::{CouponState, CouponStatus};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::StorefrontApi;
use crate::error::{ClientError, ClientResult};
use crate::notify::{Notifier, Toast};

pub struct CouponStore {
    api: Arc<dyn StorefrontApi>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<CouponState>,
}

impl CouponStore {
    pub fn new(api: Arc<dyn StorefrontApi>, notifier: Arc<dyn Notifier>) -> Self {
        CouponStore {
            api,
            notifier,
            state: RwLock::new(CouponState::default()),
        }
    }

    pub async fn state(&self) -> CouponState {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> CouponStatus {
        self.state.read().await.status
    }

    /// Looks up `code` for the logged-in user and records the outcome.
    ///
    /// Returns the resulting status. Backend rejections are outcomes, not
    /// errors; `Err` means the code was never checked (bad input, no user,
    /// network failure) and the previous state is kept.
    pub async fn apply_coupon(&self, code: &str, user_id: Option<&str>) -> ClientResult<CouponStatus> {
        let code = match self.validate(code, user_id) {
            Ok(code) => code,
            Err(e) => {
                self.notifier.notify(Toast::from(&e));
                return Err(e);
            }
        };
        let user_id = user_id.unwrap_or_default();
        debug!(%code, user_id, "Applying coupon");

        match self.api.lookup_coupon(&code, user_id).await {
            Ok(coupon) => {
                info!(%code, coupon_id = %coupon.coupon_id, "Coupon applied");
                *self.state.write().await = CouponState::applied(coupon);
                self.notifier.notify(Toast::success("Coupon applied successfully"));
                Ok(CouponStatus::Applied)
            }
            Err(ClientError::Api { message, .. }) => {
                let status = CouponStatus::from_rejection(&message);
                info!(%code, ?status, %message, "Coupon rejected");
                *self.state.write().await = CouponState::rejected(status);
                self.notifier.notify(Toast::error(rejection_message(status)));
                Ok(status)
            }
            Err(e) => {
                warn!(%code, error = %e, "Coupon lookup failed");
                self.notifier.notify(Toast::from(&e));
                Err(e)
            }
        }
    }

    fn validate(&self, code: &str, user_id: Option<&str>) -> ClientResult<String> {
        let code = validate_coupon_code(code)?;
        validate_user_id(user_id.unwrap_or_default())?;
        Ok(code)
    }

    /// Drops the coupon. Local only; calling it twice is harmless.
    pub async fn remove_coupon(&self) {
        let mut state = self.state.write().await;
        if state.coupon.is_some() {
            debug!("Coupon removed");
        }
        *state = CouponState::default();
    }

    /// Consumes the applied coupon after a successful order.
    ///
    /// Returns `Ok(false)` when no coupon is applied. A failure toasts and
    /// leaves the state as it was; it is not retried.
    pub async fn mark_coupon_used(&self, user_id: &str) -> ClientResult<bool> {
        let coupon = {
            let state = self.state.read().await;
            match (&state.coupon, state.status) {
                (Some(coupon), CouponStatus::Applied) => coupon.clone(),
                _ => return Ok(false),
            }
        };

        let result = self
            .api
            .mark_coupon_used(coupon.source, &coupon.coupon_id, user_id)
            .await;

        match result {
            Ok(()) => {
                info!(code = %coupon.code, source = ?coupon.source, "Coupon marked used");
                self.state.write().await.status = CouponStatus::Used;
                Ok(true)
            }
            Err(e) => {
                warn!(code = %coupon.code, error = %e, "Failed to mark coupon used");
                self.notifier
                    .notify(Toast::error(format!("Could not update coupon: {}", e)));
                Err(e)
            }
        }
    }
}

fn rejection_message(status: CouponStatus) -> &'static str {
    match status {
        CouponStatus::Expired => "This coupon has expired",
        CouponStatus::Used => "This coupon has already been used",
        _ => "Invalid coupon code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{ChannelNotifier, ToastLevel};
    use crate::testing::{coupon, FakeApi};
    use storefront_core::{CouponDiscount, CouponSource, Money};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn store(api: &Arc<FakeApi>) -> (CouponStore, UnboundedReceiver<Toast>) {
        let (notifier, rx) = ChannelNotifier::new();
        (CouponStore::new(api.clone(), Arc::new(notifier)), rx)
    }

    #[tokio::test]
    async fn test_apply_valid_coupon() {
        let api = Arc::new(FakeApi::new());
        api.add_coupon(coupon("FLAT150", CouponDiscount::Amount(Money::from_major(150))));
        let (coupons, mut toasts) = store(&api);

        let status = coupons.apply_coupon("  FLAT150 ", Some("u1")).await.unwrap();

        assert_eq!(status, CouponStatus::Applied);
        let state = coupons.state().await;
        assert!(state.is_applied());
        assert_eq!(state.discount_on(Money::from_major(1000)), Money::from_major(150));
        assert_eq!(toasts.try_recv().unwrap().level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn test_rejections_are_classified() {
        let api = Arc::new(FakeApi::new());
        api.reject_coupon("OLD", "Coupon has Expired");
        api.reject_coupon("ONCE", "Coupon already used by this user");
        api.reject_coupon("NOPE", "Coupon not found");
        let (coupons, mut toasts) = store(&api);

        assert_eq!(coupons.apply_coupon("OLD", Some("u1")).await.unwrap(), CouponStatus::Expired);
        assert_eq!(coupons.apply_coupon("ONCE", Some("u1")).await.unwrap(), CouponStatus::Used);
        assert_eq!(coupons.apply_coupon("NOPE", Some("u1")).await.unwrap(), CouponStatus::Invalid);

        let state = coupons.state().await;
        assert!(state.coupon.is_none());
        assert_eq!(state.discount_on(Money::from_major(1000)), Money::zero());

        assert_eq!(toasts.try_recv().unwrap(), Toast::error("This coupon has expired"));
        assert_eq!(toasts.try_recv().unwrap(), Toast::error("This coupon has already been used"));
        assert_eq!(toasts.try_recv().unwrap(), Toast::error("Invalid coupon code"));
    }

    #[tokio::test]
    async fn test_validation_skips_backend() {
        let api = Arc::new(FakeApi::new());
        let (coupons, mut toasts) = store(&api);

        assert!(coupons.apply_coupon("   ", Some("u1")).await.unwrap_err().is_validation());
        assert!(coupons.apply_coupon("SAVE", None).await.unwrap_err().is_validation());
        assert!(coupons.apply_coupon("SAVE", Some("")).await.unwrap_err().is_validation());

        assert_eq!(api.calls("lookup_coupon"), 0);
        assert_eq!(coupons.status().await, CouponStatus::None);
        assert!(toasts.try_recv().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_unusual_codes_reach_backend() {
        let api = Arc::new(FakeApi::new());
        api.add_coupon(coupon("DIWALI 25%", CouponDiscount::Amount(Money::from_major(25))));
        let (coupons, _toasts) = store(&api);

        let long = "X".repeat(40);
        assert_eq!(coupons.apply_coupon(&long, Some("u1")).await.unwrap(), CouponStatus::Invalid);
        assert_eq!(
            coupons.apply_coupon(" DIWALI 25% ", Some("u1")).await.unwrap(),
            CouponStatus::Applied
        );
        assert_eq!(api.calls("lookup_coupon"), 2);
    }

    #[tokio::test]
    async fn test_network_failure_keeps_previous_state() {
        let api = Arc::new(FakeApi::new());
        api.add_coupon(coupon("FLAT150", CouponDiscount::Amount(Money::from_major(150))));
        let (coupons, _toasts) = store(&api);
        coupons.apply_coupon("FLAT150", Some("u1")).await.unwrap();

        api.fail_transport_once("lookup_coupon");
        assert!(coupons.apply_coupon("OTHER", Some("u1")).await.is_err());
        assert_eq!(coupons.status().await, CouponStatus::Applied);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let api = Arc::new(FakeApi::new());
        api.add_coupon(coupon("FLAT150", CouponDiscount::Amount(Money::from_major(150))));
        let (coupons, _toasts) = store(&api);
        coupons.apply_coupon("FLAT150", Some("u1")).await.unwrap();

        coupons.remove_coupon().await;
        let once = coupons.state().await;
        coupons.remove_coupon().await;
        let twice = coupons.state().await;

        assert_eq!(once, twice);
        assert_eq!(twice.status, CouponStatus::None);
        assert_eq!(twice.discount_on(Money::from_major(1000)), Money::zero());
    }

    #[tokio::test]
    async fn test_mark_used_routes_by_source() {
        let api = Arc::new(FakeApi::new());
        let mut special = coupon("FEST", CouponDiscount::Amount(Money::from_major(50)));
        special.source = CouponSource::Special;
        api.add_coupon(special);
        let (coupons, _toasts) = store(&api);

        assert!(!coupons.mark_coupon_used("u1").await.unwrap());

        coupons.apply_coupon("FEST", Some("u1")).await.unwrap();
        assert!(coupons.mark_coupon_used("u1").await.unwrap());
        assert_eq!(coupons.status().await, CouponStatus::Used);
        assert_eq!(api.used_coupons(), vec![(CouponSource::Special, "cpn_FEST".to_string())]);
    }

    #[tokio::test]
    async fn test_mark_used_failure_leaves_state() {
        let api = Arc::new(FakeApi::new());
        api.add_coupon(coupon("FLAT150", CouponDiscount::Amount(Money::from_major(150))));
        let (coupons, mut toasts) = store(&api);
        coupons.apply_coupon("FLAT150", Some("u1")).await.unwrap();
        let _ = toasts.try_recv();

        api.fail_once("mark_coupon_used", 500, "boom");
        assert!(coupons.mark_coupon_used("u1").await.is_err());
        assert_eq!(coupons.status().await, CouponStatus::Applied);
        assert!(toasts.try_recv().unwrap().is_error());
        assert_eq!(api.calls("mark_coupon_used"), 1);
    }
}
