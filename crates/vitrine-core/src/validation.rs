//! # Validation Module
//!
//! Input validation for the storefront and the back office.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Session command (storefront)                                  │
//! │  └── Parses shopper input into typed values                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Business rules (quantities, prices, emails, coupon drafts)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL, UNIQUE, CHECK and foreign key constraints               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vitrine_core::validation::{slugify, validate_quantity};
//!
//! validate_quantity(5).unwrap();
//! assert_eq!(slugify("Camisa de Linho Ávila"), "camisa-de-linho-avila");
//! ```

use crate::error::ValidationError;
use crate::types::{CouponDraft, CouponKind, ProductDraft};
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn non_blank(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(required(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity being added to the cart.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
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

/// Validates a stock level. Zero is allowed (sold out).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a price in cents: 0 to MAX_PRICE_CENTS.
///
/// ```rust
/// use vitrine_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(4990).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Minimal structural email check: one `@`, non-empty local part, a dot in
/// the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(required("email"));
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(required("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_name(name: &str) -> ValidationResult<()> {
    non_blank("name", name, 120)
}

// =============================================================================
// Back-office Validators
// =============================================================================

/// Validates a coupon before it is stored.
///
/// ## Rules
/// - Code: 1-40 chars of letters, digits, `-` or `_`
/// - Percentage value: 1 to 10000 bps (0.01% to 100%)
/// - Fixed value: positive
/// - Minimum spend: not negative
pub fn validate_coupon_draft(draft: &CouponDraft) -> ValidationResult<()> {
    non_blank("code", &draft.code, 40)?;
    if !draft
        .code
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    match draft.kind {
        CouponKind::Percentage => {
            if !(1..=10_000).contains(&draft.value) {
                return Err(ValidationError::OutOfRange {
                    field: "value".to_string(),
                    min: 1,
                    max: 10_000,
                });
            }
        }
        CouponKind::Fixed => {
            if draft.value <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "value".to_string(),
                });
            }
        }
    }

    if draft.minimum_spend_cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "minimum".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    non_blank("name", &draft.name, 200)?;
    validate_price_cents(draft.price_cents)?;
    if let Some(desc) = &draft.description {
        if desc.chars().count() > 4000 {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: 4000,
            });
        }
    }
    Ok(())
}

/// Validates a category or size label.
pub fn validate_label(field: &str, value: &str) -> ValidationResult<()> {
    non_blank(field, value, 60)
}

/// Trims a search query, capping its length.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Slugs & Identifiers
// =============================================================================

/// Folds common Latin accented letters to ASCII.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// URL slug for a product or category name.
///
/// Lower-cases, folds accents, and collapses every run of other characters
/// into a single `-`, with none at either end.
///
/// ```rust
/// use vitrine_core::validation::slugify;
///
/// assert_eq!(slugify("  Tênis Runner  (Edição 2) "), "tenis-runner-edicao-2");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft(kind: CouponKind, value: i64) -> CouponDraft {
        CouponDraft {
            code: "PROMO10".to_string(),
            kind,
            value,
            minimum_spend_cents: 0,
            expires_on: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            active: true,
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ana.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@example").is_err());
        assert!(validate_email("ana@@example.com").is_err());
        assert!(validate_email("a na@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("123456").is_ok());
        assert!(matches!(
            validate_password("12345"),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_coupon_draft() {
        assert!(validate_coupon_draft(&draft(CouponKind::Percentage, 1000)).is_ok());
        assert!(validate_coupon_draft(&draft(CouponKind::Percentage, 10_001)).is_err());
        assert!(validate_coupon_draft(&draft(CouponKind::Percentage, 0)).is_err());
        assert!(validate_coupon_draft(&draft(CouponKind::Fixed, 5000)).is_ok());
        assert!(validate_coupon_draft(&draft(CouponKind::Fixed, 0)).is_err());

        let mut bad_code = draft(CouponKind::Fixed, 100);
        bad_code.code = "HAS SPACE".to_string();
        assert!(validate_coupon_draft(&bad_code).is_err());

        let mut negative_min = draft(CouponKind::Fixed, 100);
        negative_min.minimum_spend_cents = -1;
        assert!(validate_coupon_draft(&negative_min).is_err());
    }

    #[test]
    fn test_validate_product_draft() {
        let mut product = ProductDraft {
            name: "Linen Shirt".to_string(),
            price_cents: 12_990,
            ..ProductDraft::default()
        };
        assert!(validate_product_draft(&product).is_ok());

        product.price_cents = -1;
        assert!(validate_product_draft(&product).is_err());

        product.price_cents = MAX_PRICE_CENTS;
        assert!(validate_product_draft(&product).is_ok());
        product.price_cents = MAX_PRICE_CENTS + 1;
        assert!(validate_product_draft(&product).is_err());

        // 92233720368547758.07 parses as Money but is no price
        product.price_cents = i64::MAX;
        assert!(matches!(
            validate_product_draft(&product),
            Err(ValidationError::OutOfRange { max: MAX_PRICE_CENTS, .. })
        ));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Camiseta Básica"), "camiseta-basica");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("Calça & Saia"), "calca-saia");
        assert_eq!(slugify("ÁGUA"), "agua");
    }

}
