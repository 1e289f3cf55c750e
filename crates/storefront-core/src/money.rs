//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, and
//! `Percentage` for coupon discounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The backend sends prices as JSON numbers in rupees:                    │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer paise                                            │
//! │    Rupee amounts are converted to paise once, at the API boundary.      │
//! │    Every sum, discount and shipping charge is integer math.             │
//! │    The gateway order amount IS the paise value (major × 100).           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_minor(59_950); // ₹599.50
//! let doubled = price * 2;               // ₹1,199.00
//! let total = price + Money::from_major(50);
//! assert_eq!(total.minor(), 64_950);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Variant.our_price ──► LineItem.unit_price ──► line subtotal            │
/// │                                                                         │
/// │  subtotal - coupon discount + shipping ──► grand_total                  │
/// │                                                                         │
/// │  grand_total.minor() ──► gateway order amount                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(500).minor(), 50_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Converts a rupee amount received as a JSON number into paise.
    ///
    /// This is the ONLY place a float enters the money path. The value is
    /// rounded to the nearest paisa.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(599.5).minor(), 59_950);
    /// assert_eq!(Money::from_major_f64(0.1 + 0.2).minor(), 30);
    /// ```
    pub fn from_major_f64(major: f64) -> Self {
        Money((major * 100.0).round() as i64)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the value in rupees as a float, for JSON payloads only.
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(-250).floor_zero(), Money::zero());
    /// assert_eq!(Money::from_minor(250).floor_zero().minor(), 250);
    /// ```
    #[inline]
    pub const fn floor_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `self × pct`, rounded half-up to the nearest paisa.
    ///
    /// ## Implementation
    /// Integer math on basis points: `(amount * bps + 5000) / 10000`
    ///
    /// ```rust
    /// use storefront_core::money::{Money, Percentage};
    ///
    /// let subtotal = Money::from_major(1000);
    /// let discount = subtotal.percent(Percentage::from_percent(10));
    /// assert_eq!(discount, Money::from_major(100));
    /// ```
    pub fn percent(&self, pct: Percentage) -> Money {
        // i128 keeps large carts from overflowing
        let part = (self.0 as i128 * pct.bps() as i128 + 5000) / 10000;
        Money::from_minor(part as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. The frontend formats for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            self.major_part().abs(),
            self.minor_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Percentage
// =============================================================================

/// A percentage held in basis points (1 bps = 0.01%).
///
/// Coupons may carry fractional percentages (e.g. 12.5%), so whole percent
/// is not precise enough; basis points keep the math integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from whole percent.
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        Percentage(pct * 100)
    }

    /// Creates a percentage from a JSON number such as `12.5`.
    ///
    /// Negative inputs clamp to zero.
    pub fn from_percent_f64(pct: f64) -> Self {
        Percentage((pct.max(0.0) * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn as_percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_and_minor() {
        let money = Money::from_minor(59_999);
        assert_eq!(money.major_part(), 599);
        assert_eq!(money.minor_part(), 99);
        assert_eq!(Money::from_major(600).minor(), 60_000);
    }

    #[test]
    fn test_from_major_f64_rounds_to_paise() {
        assert_eq!(Money::from_major_f64(19.99).minor(), 1999);
        assert_eq!(Money::from_major_f64(49.5).minor(), 4950);
        assert_eq!(Money::from_major_f64(0.07).minor(), 7);
        assert_eq!(Money::from_major_f64(0.0), Money::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(59_950).to_string(), "₹599.50");
        assert_eq!(Money::from_minor(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_major(10);
        let b = Money::from_major(5);
        assert_eq!(a + b, Money::from_major(15));
        assert_eq!(a - b, Money::from_major(5));
        assert_eq!(a * 3, Money::from_major(30));

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_major(20));
    }

    #[test]
    fn test_percent_rounding() {
        // ₹999.99 × 12.5% = ₹124.99875 → ₹125.00
        let amount = Money::from_minor(99_999);
        let pct = Percentage::from_percent_f64(12.5);
        assert_eq!(pct.bps(), 1250);
        assert_eq!(amount.percent(pct).minor(), 12_500);
    }

    #[test]
    fn test_negative_percentage_clamps() {
        assert_eq!(Percentage::from_percent_f64(-5.0).bps(), 0);
    }

    #[test]
    fn test_floor_zero() {
        assert!(Money::from_minor(-1).floor_zero().is_zero());
        assert!(Money::from_minor(1).floor_zero().is_positive());
    }
}
