//! # Cart
//!
//! The ordered line-item list behind the storefront cart, plus the totals
//! rule. Pure data: persistence and change notification live in
//! `keyshop-client::cart_store`.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI action              Cart method            Line-item change         │
//! │  ─────────              ───────────            ────────────────         │
//! │  "Add to cart" ───────► add_item() ──────────► push, or quantity += 1   │
//! │  Quantity input ──────► set_quantity(n) ─────► quantity = n             │
//! │                         set_quantity(≤0) ────► remove                   │
//! │  Remove button ───────► remove_item() ───────► remove (absent: no-op)   │
//! │  Badge ───────────────► badge_count() ───────► Σ quantity               │
//! │  Cart page ───────────► totals() ────────────► subtotal/shipping/total  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line item per id
//! - Every line item has quantity ≥ 1

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{CartLineItem, ProductId};
use crate::validation::{validate_price, validate_product_id};
use crate::{FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD};

// =============================================================================
// Totals
// =============================================================================

/// Computed cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

/// Shipping for a given subtotal: free strictly above 100.00, flat fee
/// otherwise.
///
/// ```rust
/// use keyshop_core::cart::shipping_for;
/// use keyshop_core::Money;
///
/// assert_eq!(shipping_for(Money::from_cents(120_00)), Money::zero());
/// assert_eq!(shipping_for(Money::from_cents(100_00)).cents(), 999);
/// ```
pub fn shipping_for(subtotal: Money) -> Money {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Money::zero()
    } else {
        FLAT_SHIPPING_FEE
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered list of cart line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from a persisted list, repairing it so the invariants
    /// hold: zero-quantity rows and empty ids are dropped, and duplicate ids
    /// are merged into the first occurrence.
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let mut cart = Cart::new();
        for item in items {
            if item.quantity == 0 || item.id.is_empty() {
                continue;
            }
            match cart.items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Adds one unit of a product.
    ///
    /// A repeat add bumps the quantity and keeps the name and price captured
    /// by the first add.
    ///
    /// ## Errors
    /// `ValidationError::Required` for an empty id, `ValidationError::Negative`
    /// for a price below zero. The cart is untouched on error.
    pub fn add_item(
        &mut self,
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
    ) -> CoreResult<&CartLineItem> {
        let id = id.into();
        validate_product_id(&id)?;
        validate_price(price)?;

        let index = match self.items.iter().position(|i| i.id == id) {
            Some(index) => {
                let item = &mut self.items[index];
                item.quantity = item.quantity.saturating_add(1);
                index
            }
            None => {
                self.items.push(CartLineItem {
                    id,
                    name: name.into(),
                    price,
                    quantity: 1,
                });
                self.items.len() - 1
            }
        };
        Ok(&self.items[index])
    }

    /// Removes a line item. Returns `false` if the id was not in the cart.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id.as_str() != id);
        self.items.len() != before
    }

    /// Sets a line item's quantity; `quantity <= 0` removes it.
    ///
    /// There is no upper bound on quantity, but a line item stores it as
    /// `u32`, so anything above `u32::MAX` is clamped to `u32::MAX`.
    ///
    /// Returns `false` when nothing changed (absent id, or same quantity).
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        match self.items.iter_mut().find(|i| i.id.as_str() == id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.id.as_str() == id)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Σ quantity, for the header badge.
    pub fn badge_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    pub fn totals(&self) -> CartTotals {
        let subtotal = self.subtotal();
        let shipping = shipping_for(subtotal);
        CartTotals {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        Cart::from_items(items)
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
