//! # Client Error Types
//!
//! Error types for backend and payment operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Network      │  │   Validation    │  │       Payment           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Http           │  │  Validation     │  │  GatewayOrderFailed     │ │
//! │  │  Timeout        │  │  Core           │  │  VerificationFailed     │ │
//! │  │  Api            │  │                 │  │                         │ │
//! │  │  Decode         │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │ Session State   │  │ Configuration   │                              │
//! │  │                 │  │                 │                              │
//! │  │  NotLoggedIn    │  │  InvalidConfig  │                              │
//! │  │  Busy           │  │  InvalidUrl     │                              │
//! │  │  Cancelled      │  │  ConfigLoad/Save│                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every store operation catches its error at the boundary, logs it and
//! turns it into a toast. Nothing here panics.

use storefront_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering every failure a storefront operation can hit.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Network Errors
    // =========================================================================
    /// Transport-level failure (DNS, connect, TLS, reset).
    #[error("Network error: {0}")]
    Http(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Backend answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// Input rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Checkout rule violation.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Payment Errors
    // =========================================================================
    /// Gateway order could not be created; the order stays pending.
    #[error("Could not start payment: {0}")]
    GatewayOrderFailed(String),

    /// Server-side signature verification rejected the payment.
    #[error("Payment verification failed: {0}")]
    VerificationFailed(String),

    // =========================================================================
    // Session-State Errors
    // =========================================================================
    /// Operation requires a logged-in user.
    #[error("Please log in to continue")]
    NotLoggedIn,

    /// The same operation is already in flight.
    #[error("{0} already in progress")]
    Busy(&'static str),

    /// A newer request superseded this one.
    #[error("Request cancelled")]
    Cancelled,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid base URL or endpoint.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if the operation can be retried.
    ///
    /// Only auth-status polling acts on this; mutations are never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(_) | ClientError::Timeout => true,
            ClientError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if the input was rejected locally.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_) | ClientError::Core(_))
    }

    /// Returns true for payment-flow failures.
    pub fn is_payment(&self) -> bool {
        matches!(
            self,
            ClientError::GatewayOrderFailed(_)
                | ClientError::VerificationFailed(_)
        )
    }

    /// Returns true when the session state forbids the operation.
    pub fn is_session(&self) -> bool {
        match self {
            ClientError::NotLoggedIn | ClientError::Busy(_) | ClientError::Cancelled => true,
            ClientError::Api { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// HTTP status for `Api` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
