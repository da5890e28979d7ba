//! # Cart Snapshot
//!
//! Server-authoritative cart state and its wire normalization.
//!
//! ## Snapshot Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Snapshot Flow                                     │
//! │                                                                         │
//! │  GET cart.js ───► WireCart (serde) ───► CartSnapshot (normalized)      │
//! │                                              │                          │
//! │  POST cart/change.js ────────────────────────┤ replaced WHOLESALE       │
//! │                                              ▼                          │
//! │                                        CartRenderer                     │
//! │                                                                         │
//! │  There is NO incremental patching. Every successful round-trip          │
//! │  replaces the previous snapshot entirely; line positions are only       │
//! │  meaningful until that replacement happens.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Quirks
//! The storefront payload spells the same fact two ways depending on
//! context: `product_title` vs `title`, and `final_line_price` vs
//! `line_price`. Normalization resolves both fallback chains here so the
//! rest of the system never sees them.

use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Normalized Model
// =============================================================================

/// One line of the cart.
///
/// `position` is the 1-indexed slot used as the mutation key. It is an
/// **ephemeral** identifier: valid only until the next snapshot replaces the
/// whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// 1-indexed slot in the server's line order.
    pub position: u32,

    /// Product title (merchant-supplied, must be escaped before markup).
    pub title: String,

    /// Variant label, if the product has options.
    pub variant_label: Option<String>,

    /// Quantity currently in the cart.
    pub quantity: u32,

    /// Total price of this line in minor currency units.
    pub line_price: Money,

    /// Product image URL, if any.
    pub image_url: Option<String>,
}

/// A server-authoritative snapshot of the cart at one point in time.
///
/// ## Invariants
/// - Immutable once constructed; the controller replaces it wholesale
/// - `lines[i].position == i + 1`
/// - All totals come from the server; nothing here is recomputed locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Total quantity across all lines (the badge number).
    pub item_count: u32,

    /// ISO-4217 currency code for every price in this snapshot.
    pub currency: String,

    /// Subtotal of all lines in minor currency units.
    pub items_subtotal: Money,

    /// Lines in server order.
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Looks up a line by its 1-indexed position.
    pub fn line(&self, position: u32) -> Option<&CartLine> {
        if position == 0 {
            return None;
        }
        self.lines.get(position as usize - 1)
    }
}

// =============================================================================
// Wire Shape
// =============================================================================

/// The raw cart payload as the storefront sends it.
///
/// Unknown fields are ignored; the ones below are the contract. Parsed with
/// serde and immediately normalized into [`CartSnapshot`].
#[derive(Debug, Clone, Deserialize)]
pub struct WireCart {
    #[serde(default)]
    pub item_count: u32,

    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub items_subtotal_price: i64,

    #[serde(default)]
    pub items: Vec<WireItem>,
}

/// One raw line item. Field pairs are alternatives the server may use.
#[derive(Debug, Clone, Deserialize)]
pub struct WireItem {
    pub product_title: Option<String>,
    pub title: Option<String>,
    pub variant_title: Option<String>,

    #[serde(default)]
    pub quantity: u32,

    pub final_line_price: Option<i64>,
    pub line_price: Option<i64>,

    pub image: Option<String>,
}

impl From<WireCart> for CartSnapshot {
    fn from(wire: WireCart) -> Self {
        let lines = wire
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| CartLine {
                // Positions are assigned from server order, 1-indexed.
                position: i as u32 + 1,
                title: item.product_title.or(item.title).unwrap_or_default(),
                variant_label: item.variant_title.filter(|v| !v.is_empty()),
                quantity: item.quantity,
                line_price: Money::from_minor(
                    item.final_line_price.or(item.line_price).unwrap_or(0),
                ),
                image_url: item.image,
            })
            .collect();

        CartSnapshot {
            item_count: wire.item_count,
            currency: wire.currency,
            items_subtotal: Money::from_minor(wire.items_subtotal_price),
            lines,
        }
    }
}
