//! # Client Configuration
//!
//! Configuration for the storefront client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_API_URL=https://shop.example.in                         │
//! │     STOREFRONT_PAYMENT_KEY_ID=rzp_live_xxx                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.storefront/...        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost backend, ₹500 free-shipping threshold, 5 min cache       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [api]
//! base_url = "https://shop.example.in"
//! timeout_secs = 15
//!
//! [retry]
//! max_attempts = 3
//! initial_backoff_ms = 500
//!
//! [cache]
//! ttl_secs = 300
//!
//! [checkout]
//! empty_redirect_delay_ms = 3000
//!
//! [shipping]
//! free_threshold = 500
//! standard_rate = 50
//! express_rate = 79
//!
//! [payment]
//! key_id = "rzp_test_xxx"
//! currency = "INR"
//! merchant_name = "Storefront"
//! theme_color = "#3399cc"
//! ```

use backoff::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use storefront_core::{Money, ShippingPolicy};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Origin of the storefront backend, without a path. Endpoint paths
    /// are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Retry Settings
// =============================================================================

/// Backoff for auth-status polling. Mutations never retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff duration (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff duration (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    4000
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl RetrySettings {
    /// Creates the exponential backoff configuration.
    ///
    /// The attempt count is enforced by the caller; the backoff itself never
    /// gives up on elapsed time.
    pub fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.initial_backoff_ms),
            max_interval: Duration::from_millis(self.max_backoff_ms),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// Cache / Checkout Settings
// =============================================================================

/// Store cache freshness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// How long fetched cart/wishlist/checkout data stays fresh (seconds).
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    300
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            ttl_secs: default_cache_ttl(),
        }
    }
}

/// Checkout page behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Delay before an empty checkout redirects home (milliseconds).
    #[serde(default = "default_redirect_delay")]
    pub empty_redirect_delay_ms: u64,
}

fn default_redirect_delay() -> u64 {
    3000
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            empty_redirect_delay_ms: default_redirect_delay(),
        }
    }
}

// =============================================================================
// Shipping Settings
// =============================================================================

/// Shipping policy in whole rupees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingSettings {
    #[serde(default = "default_free_threshold")]
    pub free_threshold: i64,

    #[serde(default = "default_standard_rate")]
    pub standard_rate: i64,

    #[serde(default = "default_express_rate")]
    pub express_rate: i64,
}

fn default_free_threshold() -> i64 {
    storefront_core::FREE_SHIPPING_THRESHOLD
}

fn default_standard_rate() -> i64 {
    storefront_core::STANDARD_RATE_PER_ITEM
}

fn default_express_rate() -> i64 {
    storefront_core::EXPRESS_RATE_PER_ITEM
}

impl Default for ShippingSettings {
    fn default() -> Self {
        ShippingSettings {
            free_threshold: default_free_threshold(),
            standard_rate: default_standard_rate(),
            express_rate: default_express_rate(),
        }
    }
}

// =============================================================================
// Payment Settings
// =============================================================================

/// Hosted payment widget settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettings {
    /// Public gateway key id handed to the widget. Never the secret.
    #[serde(default)]
    pub key_id: String,

    /// ISO 4217 currency code.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Merchant name shown in the widget header.
    #[serde(default = "default_merchant_name")]
    pub merchant_name: String,

    #[serde(default = "default_theme_color")]
    pub theme_color: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_merchant_name() -> String {
    "Storefront".to_string()
}

fn default_theme_color() -> String {
    "#3399cc".to_string()
}

impl Default for PaymentSettings {
    fn default() -> Self {
        PaymentSettings {
            key_id: String::new(),
            currency: default_currency(),
            merchant_name: default_merchant_name(),
            theme_color: default_theme_color(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub shipping: ShippingSettings,

    #[serde(default)]
    pub payment: PaymentSettings,
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Parses `api.base_url` as an http(s) origin.
    ///
    /// Endpoint paths are absolute, so a path or query on the base URL
    /// would be silently dropped when joined; both are rejected.
    pub fn api_origin(&self) -> ClientResult<url::Url> {
        let url = url::Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must be an origin without a path, got: {}",
                self.api.base_url
            )));
        }

        Ok(url)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        self.api_origin()?;

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ClientError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }

        let shipping = &self.shipping;
        if shipping.free_threshold < 0 || shipping.standard_rate < 0 || shipping.express_rate < 0 {
            return Err(ClientError::InvalidConfig(
                "shipping amounts must not be negative".into(),
            ));
        }

        let currency = &self.payment.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ClientError::InvalidConfig(format!(
                "currency must be a 3-letter ISO code, got: {}",
                currency
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("STOREFRONT_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(timeout) = std::env::var("STOREFRONT_API_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse::<u64>() {
                self.api.timeout_secs = t;
            }
        }

        if let Ok(ttl) = std::env::var("STOREFRONT_CACHE_TTL_SECS") {
            match ttl.parse::<u64>() {
                Ok(t) => self.cache.ttl_secs = t,
                Err(_) => warn!(value = %ttl, "Ignoring non-numeric STOREFRONT_CACHE_TTL_SECS"),
            }
        }

        if let Ok(key) = std::env::var("STOREFRONT_PAYMENT_KEY_ID") {
            debug!("Overriding payment key id from environment");
            self.payment.key_id = key;
        }

        if let Ok(currency) = std::env::var("STOREFRONT_CURRENCY") {
            self.payment.currency = currency.to_uppercase();
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Shipping policy in money terms.
    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy {
            free_threshold: Money::from_major(self.shipping.free_threshold),
            standard_rate: Money::from_major(self.shipping.standard_rate),
            express_rate: Money::from_major(self.shipping.express_rate),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn empty_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.checkout.empty_redirect_delay_ms)
    }
}
