//! # Validation Module
//!
//! Input validation for storefront operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web frontend                                                  │
//! │  └── Form checks, immediate feedback                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: storefront-client stores                                      │
//! │  └── THIS MODULE: reject before any request is sent                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend API                                                   │
//! │  └── Coupon validity, stock, ownership                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A validation failure never reaches the network.

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a coupon code and returns it trimmed.
///
/// Only emptiness is checked here. Case, length and character set are
/// the backend's call; an unknown code comes back as `Invalid`.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code("  SAVE10 ").unwrap(), "SAVE10");
/// assert!(validate_coupon_code("   ").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }

    Ok(code.to_string())
}

/// Validates that a user id is present. Used to detect "not logged in".
pub fn validate_user_id(user_id: &str) -> ValidationResult<()> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "user id".to_string(),
        });
    }

    Ok(())
}

/// Validates an Indian PIN code and returns it trimmed.
///
/// ## Rules
/// - Exactly 6 ASCII digits
/// - First digit is 1-9
///
/// ```rust
/// use storefront_core::validation::validate_pincode;
///
/// assert!(validate_pincode("560001").is_ok());
/// assert!(validate_pincode("060001").is_err());
/// assert!(validate_pincode("5600").is_err());
/// ```
pub fn validate_pincode(pincode: &str) -> ValidationResult<String> {
    let pincode = pincode.trim();

    if pincode.is_empty() {
        return Err(ValidationError::Required {
            field: "pincode".to_string(),
        });
    }

    let valid = pincode.len() == 6
        && pincode.bytes().all(|b| b.is_ascii_digit())
        && !pincode.starts_with('0');

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "pincode".to_string(),
            reason: "must be 6 digits and not start with 0".to_string(),
        });
    }

    Ok(pincode.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (99)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a payable amount in paise.
pub fn validate_payment_amount(minor: i64) -> ValidationResult<()> {
    if minor <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
