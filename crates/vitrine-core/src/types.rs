//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   StockEntry    │   │      Size       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  product_id     │──►│  id             │       │
//! │  │  slug           │   │  size_id        │   │  name (P,M,G)   │       │
//! │  │  price_cents    │   │  quantity       │   │  sort_order     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Coupon       │   │   CartLine      │   │    Account      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code (UPPER)   │   │  account_id     │   │  email          │       │
//! │  │  kind, value    │   │  product+size   │   │  role           │       │
//! │  │  expires_on     │   │  quantity       │   │  active         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Entities carry a UUID `id` for relations plus a business key where one
//! exists (`slug`, coupon `code`, account `email`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Percentage
// =============================================================================

/// A percentage held in basis points (1 bps = 0.01%).
///
/// `1000` is 10%, `1250` is 12.5%. Keeping percentages integral means a
/// percentage coupon never introduces floating point into the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// 100%.
    pub const FULL: Percentage = Percentage(10_000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// From a whole number of percent (`10` → 10%).
    #[inline]
    pub const fn from_whole(pct: u32) -> Self {
        Percentage(pct * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

/// Renders without trailing zeros: `10%`, `12.5%`, `7.25%`.
impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{}%", whole),
            f10 if f10 % 10 == 0 => write!(f, "{}.{}%", whole, f10 / 10),
            _ => write!(f, "{}.{:02}%", whole, frac),
        }
    }
}

/// Parses `"10"`, `"12.5"` or `"7,25"` (an optional trailing `%` is allowed).
impl FromStr for Percentage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_end_matches('%');
        // Two decimal places of percent are exactly basis points, so the
        // money parser does the digit work.
        let as_hundredths: Money = s.parse().map_err(|_| ValidationError::InvalidFormat {
            field: "percentage".to_string(),
            reason: "expected a number such as 10 or 12.5".to_string(),
        })?;

        u32::try_from(as_hundredths.cents())
            .map(Percentage)
            .map_err(|_| ValidationError::OutOfRange {
                field: "percentage".to_string(),
                min: 0,
                max: 100,
            })
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// What an account is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A shopper.
    #[default]
    Customer,
    /// Back-office user: catalog, stock and coupon administration.
    Admin,
}

/// A registered account (password hash deliberately absent).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Unique, stored lower-case.
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    /// Inactive accounts cannot log in and their tokens are refused.
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// First name for greetings ("Hello, Ana!").
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Catalog section a product is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Unisex,
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "unisex" => Ok(Gender::Unisex),
            _ => Err(ValidationError::InvalidFormat {
                field: "gender".to_string(),
                reason: "must be one of male, female, unisex".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub active: bool,
}

/// A garment size. `sort_order` drives the picker order (P, M, G, GG).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Size {
    pub id: String,
    pub name: String,
    pub sort_order: i64,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub category_id: Option<String>,

    /// Display name.
    pub name: String,

    /// URL key derived from the name.
    pub slug: String,

    pub description: Option<String>,

    /// Price in cents.
    pub price_cents: i64,

    pub gender: Option<Gender>,

    /// Shown in the "featured" strip.
    pub featured: bool,

    pub trending: bool,

    pub is_new: bool,

    /// CDN URL of the main image.
    pub image_url: Option<String>,

    /// Inactive products are hidden from the storefront.
    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Back-office input for creating or updating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub category_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub gender: Option<Gender>,
    pub featured: bool,
    pub trending: bool,
    pub is_new: bool,
    pub image_url: Option<String>,
}

/// Storefront listing filters. Every field is optional and they combine
/// with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductFilter {
    pub category_id: Option<String>,
    pub gender: Option<Gender>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub featured: bool,
    pub trending: bool,
    pub is_new: bool,
}

// =============================================================================
// Stock
// =============================================================================

/// Units on hand for one product in one size.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockEntry {
    pub id: String,
    pub product_id: String,
    pub size_id: String,
    pub size_name: String,
    pub quantity: i64,
}

impl StockEntry {
    #[inline]
    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }
}

/// A button in the size picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SizeOption {
    pub size_id: String,
    pub size_name: String,
    /// `false` renders the button disabled.
    pub available: bool,
}

/// Builds the size picker for a product from its stock rows.
///
/// Sizes with zero stock stay visible but disabled. This is a display
/// heuristic only: nothing is reserved, so the stock can be gone by the
/// time the line reaches checkout.
pub fn size_options(stock: &[StockEntry]) -> Vec<SizeOption> {
    stock
        .iter()
        .map(|entry| SizeOption {
            size_id: entry.size_id.clone(),
            size_name: entry.size_name.clone(),
            available: entry.is_available(),
        })
        .collect()
}

// =============================================================================
// Coupons
// =============================================================================

/// How a coupon's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// `value` is a percentage in basis points.
    Percentage,
    /// `value` is an amount in cents.
    Fixed,
}

impl FromStr for CouponKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percentage" | "percent" | "%" => Ok(CouponKind::Percentage),
            "fixed" => Ok(CouponKind::Fixed),
            _ => Err(ValidationError::InvalidFormat {
                field: "kind".to_string(),
                reason: "must be percentage or fixed".to_string(),
            }),
        }
    }
}

impl CouponKind {
    /// Parses a human-entered coupon value into the stored integer:
    /// basis points for percentages, cents for fixed amounts.
    pub fn parse_value(&self, raw: &str) -> Result<i64, ValidationError> {
        match self {
            CouponKind::Percentage => raw.parse::<Percentage>().map(|p| i64::from(p.bps())),
            CouponKind::Fixed => raw.parse::<Money>().map(|m| m.cents()),
        }
    }
}

/// A discount code as stored by the back office.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    pub id: String,

    /// Unique, stored upper-case.
    pub code: String,

    pub kind: CouponKind,

    /// Basis points when `kind` is percentage, cents when fixed.
    pub value: i64,

    /// Subtotal (in cents) the cart must reach. Zero means no minimum.
    pub minimum_spend_cents: i64,

    /// Last calendar day the code is accepted.
    #[ts(as = "String")]
    pub expires_on: NaiveDate,

    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    #[inline]
    pub fn minimum_spend(&self) -> Money {
        Money::from_cents(self.minimum_spend_cents)
    }

    /// Whether the code is accepted on `today` (active, expiry inclusive).
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        self.active && self.expires_on >= today
    }
}

/// Back-office input for creating or editing a coupon.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponDraft {
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    pub minimum_spend_cents: i64,
    #[ts(as = "String")]
    pub expires_on: NaiveDate,
    pub active: bool,
}

// =============================================================================
// Server-side Cart Lines
// =============================================================================

/// A cart line persisted for an authenticated account, joined with the
/// product and size it points at.
///
/// Unique per `(account_id, product_id, size_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub account_id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub size_id: String,
    pub size_name: String,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(size: &str, quantity: i64) -> StockEntry {
        StockEntry {
            id: format!("st-{}", size),
            product_id: "p-1".to_string(),
            size_id: format!("s-{}", size),
            size_name: size.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::from_whole(10).to_string(), "10%");
        assert_eq!(Percentage::from_bps(1250).to_string(), "12.5%");
        assert_eq!(Percentage::from_bps(725).to_string(), "7.25%");
    }

    #[test]
    fn test_percentage_parse() {
        assert_eq!("10".parse::<Percentage>().unwrap().bps(), 1000);
        assert_eq!("12.5".parse::<Percentage>().unwrap().bps(), 1250);
        assert_eq!("7,25%".parse::<Percentage>().unwrap().bps(), 725);
        assert!("ten".parse::<Percentage>().is_err());
        assert!("-5".parse::<Percentage>().is_err());
    }

    #[test]
    fn test_coupon_kind_parse_value() {
        assert_eq!(CouponKind::Percentage.parse_value("15").unwrap(), 1500);
        assert_eq!(CouponKind::Fixed.parse_value("20.00").unwrap(), 2000);
        assert!(CouponKind::Fixed.parse_value("abc").is_err());
    }

    #[test]
    fn test_size_options_disable_empty_sizes() {
        let options = size_options(&[stock("P", 3), stock("M", 0), stock("G", 1)]);
        let available: Vec<bool> = options.iter().map(|o| o.available).collect();
        assert_eq!(available, vec![true, false, true]);
        assert_eq!(options[1].size_name, "M");
    }

    #[test]
    fn test_coupon_validity_is_inclusive_of_expiry_day() {
        let coupon = Coupon {
            id: "c-1".to_string(),
            code: "WELCOME10".to_string(),
            kind: CouponKind::Percentage,
            value: 1000,
            minimum_spend_cents: 0,
            expires_on: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            active: true,
            created_at: Utc::now(),
        };
        assert!(coupon.is_valid_on(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
        assert!(!coupon.is_valid_on(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));

        let inactive = Coupon {
            active: false,
            ..coupon
        };
        assert!(!inactive.is_valid_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn test_account_first_name() {
        let account = Account {
            id: "a-1".to_string(),
            name: "Ana Clara Souza".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            role: Role::Customer,
            active: true,
            created_at: Utc::now(),
        };
        assert_eq!(account.first_name(), "Ana");
        assert!(!account.is_admin());
    }
}
