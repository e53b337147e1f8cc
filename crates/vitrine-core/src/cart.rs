//! # Cart Store
//!
//! Holds the lines of one shopping session and its applied-coupon slot.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Shopper Action          Operation                 State Change         │
//! │  ──────────────          ─────────                 ────────────         │
//! │                                                                         │
//! │  Pick size + "Add" ────► add_item() ─────────────► line += qty / push   │
//! │                                                                         │
//! │  Click − / + ──────────► update_quantity(Δ) ─────► qty += Δ (≤0 → rm)   │
//! │                                                                         │
//! │  Click 🗑 ──────────────► remove_item() ──────────► line removed         │
//! │                                                    (empty → coupon off) │
//! │                                                                         │
//! │  "Apply coupon" ───────► apply_coupon() ─────────► slot replaced        │
//! │                                                                         │
//! │  View cart ────────────► snapshot() / totals() ──► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Machine (cart + coupon)
//! ```text
//!              add_item                 apply_coupon (ok)
//!   ┌───────┐ ─────────► ┌────────────┐ ────────────────► ┌──────────────┐
//!   │ Empty │            │ NonEmpty   │                   │ NonEmpty     │
//!   │       │ ◄───────── │ NoCoupon   │ ◄──────────────── │ WithCoupon   │◄┐
//!   └───────┘ last line  └────────────┘   remove_coupon   └──────────────┘ │
//!       ▲     removed                                        │    │        │
//!       └────────────────────────────────────────────────────┘    └────────┘
//!                      last line removed (coupon cleared)      re-apply
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::coupon::AppliedCoupon;
use crate::error::{CoreError, CoreResult, CouponError};
use crate::money::Money;
use crate::pricing::{compute_totals, CartTotals};
use crate::types::CartLine;
use crate::validation::{validate_price_cents, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// One line of the cart.
///
/// Product name, size name and unit price are frozen copies taken when the
/// line was created, so the cart renders consistently even if the catalog
/// changes underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    /// Line identifier: a UUID for guest carts, the server row id for
    /// account carts.
    pub line_id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub size_id: String,
    pub size_name: String,
    /// Always ≥ 1 while the line is in a cart.
    pub quantity: i64,
}

impl CartItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Whether this line is the `(product, size)` pair.
    #[inline]
    pub fn matches(&self, product_id: &str, size_id: &str) -> bool {
        self.product_id == product_id && self.size_id == size_id
    }
}

impl From<CartLine> for CartItem {
    fn from(line: CartLine) -> Self {
        CartItem {
            line_id: line.id,
            product_id: line.product_id,
            product_name: line.product_name,
            unit_price_cents: line.unit_price_cents,
            size_id: line.size_id,
            size_name: line.size_name,
            quantity: line.quantity,
        }
    }
}

/// What the shopper picked: a product in a size, and how many.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub size_id: String,
    pub size_name: String,
    pub quantity: i64,
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of [`Cart::update_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now holds this item.
    Updated(CartItem),
    /// Quantity reached zero or below; the line is gone.
    Removed(CartItem),
    /// No line with that id. Nothing changed.
    NotInCart,
}

/// Composite state of the cart and its coupon slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    Empty,
    NonEmptyNoCoupon,
    NonEmptyWithCoupon,
}

// =============================================================================
// Cart
// =============================================================================

/// The cart store.
///
/// ## Invariants
/// - At most one line per `(product_id, size_id)`
/// - Every line has `quantity >= 1`
/// - At most one applied coupon, and none while the cart is empty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
    applied_coupon: Option<AppliedCoupon>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Creates a cart from previously persisted lines (no coupon).
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Cart {
            items,
            applied_coupon: None,
        }
    }

    /// Adds a product+size to the cart.
    ///
    /// ## Behavior
    /// - `(product_id, size_id)` already present: quantity increases
    /// - Otherwise: a new line with a fresh UUID line id is appended
    ///
    /// No stock check happens here.
    ///
    /// ## Returns
    /// The line as it now stands.
    pub fn add_item(&mut self, new: NewCartItem) -> CoreResult<CartItem> {
        validate_quantity(new.quantity)?;
        validate_price_cents(new.unit_price_cents)?;

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.matches(&new.product_id, &new.size_id))
        {
            let new_qty = item.quantity + new.quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(item.clone());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        let item = CartItem {
            line_id: Uuid::new_v4().to_string(),
            product_id: new.product_id,
            product_name: new.product_name,
            unit_price_cents: new.unit_price_cents,
            size_id: new.size_id,
            size_name: new.size_name,
            quantity: new.quantity,
        };
        self.items.push(item.clone());
        Ok(item)
    }

    /// Adds `delta` to a line's quantity.
    ///
    /// A result of zero or less removes the line, exactly as
    /// [`Cart::remove_item`] would (coupon cleared if the cart empties).
    /// A result above MAX_ITEM_QUANTITY, overflow included, is refused and
    /// the line keeps its quantity. An unknown `line_id` is a no-op.
    pub fn update_quantity(&mut self, line_id: &str, delta: i64) -> CoreResult<QuantityChange> {
        let Some(index) = self.items.iter().position(|i| i.line_id == line_id) else {
            return Ok(QuantityChange::NotInCart);
        };

        let current = self.items[index].quantity;
        let Some(new_qty) = current.checked_add(delta) else {
            return Err(CoreError::QuantityTooLarge {
                requested: current.saturating_add(delta),
                max: MAX_ITEM_QUANTITY,
            });
        };
        if new_qty <= 0 {
            return Ok(match self.remove_item(line_id) {
                Some(removed) => QuantityChange::Removed(removed),
                None => QuantityChange::NotInCart,
            });
        }
        if new_qty > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: new_qty,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let item = &mut self.items[index];
        item.quantity = new_qty;
        Ok(QuantityChange::Updated(item.clone()))
    }

    /// Removes a line. Emptying the cart clears the applied coupon.
    ///
    /// ## Returns
    /// The removed line, or `None` when no line had that id.
    pub fn remove_item(&mut self, line_id: &str) -> Option<CartItem> {
        let index = self.items.iter().position(|i| i.line_id == line_id)?;
        let removed = self.items.remove(index);

        if self.items.is_empty() {
            self.applied_coupon = None;
        }

        Some(removed)
    }

    /// Read-only view of the lines, in insertion order.
    pub fn snapshot(&self) -> &[CartItem] {
        &self.items
    }

    /// Finds the line for a product+size pair.
    pub fn find_line(&self, product_id: &str, size_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.matches(product_id, size_id))
    }

    /// Swaps a line's id, keeping everything else.
    ///
    /// Used once the server has assigned its own id to a freshly added line.
    pub fn relabel_line(&mut self, old_id: &str, new_id: &str) {
        if let Some(item) = self.items.iter_mut().find(|i| i.line_id == old_id) {
            item.line_id = new_id.to_string();
        }
    }

    /// Replaces every line (e.g. after reloading from a backend).
    ///
    /// An empty replacement clears the coupon like any other path to empty.
    pub fn replace_items(&mut self, items: Vec<CartItem>) {
        self.items = items;
        if self.items.is_empty() {
            self.applied_coupon = None;
        }
    }

    /// Empties the cart and its coupon slot (after an order is placed).
    pub fn clear(&mut self) {
        self.items.clear();
        self.applied_coupon = None;
    }

    /// The coupon currently discounting this cart.
    pub fn applied_coupon(&self) -> Option<&AppliedCoupon> {
        self.applied_coupon.as_ref()
    }

    /// Puts `coupon` in the slot, unconditionally replacing the previous one.
    ///
    /// ## Returns
    /// The coupon that was replaced, if any.
    pub fn apply_coupon(
        &mut self,
        coupon: AppliedCoupon,
    ) -> Result<Option<AppliedCoupon>, CouponError> {
        if self.items.is_empty() {
            return Err(CouponError::EmptyCart);
        }
        Ok(self.applied_coupon.replace(coupon))
    }

    /// Empties the coupon slot.
    pub fn remove_coupon(&mut self) -> Option<AppliedCoupon> {
        self.applied_coupon.take()
    }

    pub fn state(&self) -> CartState {
        match (self.items.is_empty(), self.applied_coupon.is_some()) {
            (true, _) => CartState::Empty,
            (false, false) => CartState::NonEmptyNoCoupon,
            (false, true) => CartState::NonEmptyWithCoupon,
        }
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ unit price × quantity.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Subtotal, discount and total for the current state.
    pub fn totals(&self) -> CartTotals {
        compute_totals(&self.items, self.applied_coupon.as_ref())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
