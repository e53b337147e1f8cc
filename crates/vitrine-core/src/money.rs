//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A cart priced in floats:                                               │
//! │    3 × 0.1 = 0.30000000000000004  ❌                                    │
//! │                                                                         │
//! │  A 10% coupon on 199.99 in floats:                                     │
//! │    19.999000000000002 → displayed "20.00", subtracted 19.999...        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    19999 cents × 1000 bps → (19999000 + 5000) / 10000 = 2000 cents     │
//! │    Exactly one rounding step, always to the cent.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vitrine_core::money::Money;
//! use vitrine_core::types::Percentage;
//!
//! let price = Money::from_cents(19_999);
//! let off = price.percentage_of(Percentage::from_bps(1000)); // 10%
//! assert_eq!(off.cents(), 2000);
//!
//! let parsed: Money = "49.90".parse().unwrap();
//! assert_eq!(parsed.cents(), 4990);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Percentage;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos / cents).
///
/// ## Where Money Flows
/// ```text
/// Product.price_cents ──► CartItem.unit_price ──► line total
///                                                     │
///                                   Σ ────────────────┘
///                                   │
///                                   ▼
///                         CartTotals.subtotal ──► discount ──► total
/// ```
///
/// Signed on purpose: a subtraction that goes below zero stays observable
/// instead of wrapping, and callers clamp explicitly where the domain says so.
/// Arithmetic saturates at the bounds of `i64` rather than overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole currency units (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// The cents part, always 0-99.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies a unit price by a line quantity, saturating at the
    /// bounds of `i64`.
    ///
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// let unit = Money::from_cents(8990);
    /// assert_eq!(unit.multiply_quantity(3).cents(), 26_970);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `rate` of this amount, rounded half-up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The `+5000` is the
    /// half-cent that makes the division round instead of truncate.
    /// `i128` keeps large subtotals from overflowing the intermediate product.
    ///
    /// ```rust
    /// use vitrine_core::money::Money;
    /// use vitrine_core::types::Percentage;
    ///
    /// let subtotal = Money::from_cents(20_000); // 200.00
    /// let ten_percent = Percentage::from_whole(10);
    /// assert_eq!(subtotal.percentage_of(ten_percent).cents(), 2_000);
    /// ```
    pub fn percentage_of(&self, rate: Percentage) -> Money {
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Subtracts `other`, flooring the result at zero.
    ///
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(1500);
    /// let discount = Money::from_cents(5000);
    /// assert_eq!(subtotal.saturating_sub_floor(discount), Money::zero());
    /// ```
    #[inline]
    pub fn saturating_sub_floor(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering ("49.90", "-5.50").
///
/// Currency symbols are a presentation concern; see the storefront config's
/// `format_currency`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Parses a decimal amount with at most two fractional digits.
///
/// Accepts `"49"`, `"49.9"`, `"49.90"` and a comma as decimal separator
/// (`"49,90"`), which is how prices are typed in the back office.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let normalized = digits.replace(',', ".");
        let mut parts = normalized.splitn(2, '.');
        let whole = parts.next().unwrap_or_default();
        let frac = parts.next().unwrap_or_default();

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a decimal number such as 49.90"));
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two decimal places are allowed"));
        }

        let major: i64 = whole
            .parse()
            .map_err(|_| invalid("amount is too large"))?;
        let minor: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid("bad cents"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
