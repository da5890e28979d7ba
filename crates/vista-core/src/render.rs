//! # Cart Renderer
//!
//! Pure mapping from a [`CartSnapshot`] to the drawer body markup.
//!
//! ## Render States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Renderer Outputs                                  │
//! │                                                                         │
//! │  Loading ──► "Loading…" placeholder (while a refresh is in flight)     │
//! │  Empty   ──► empty-state view + continue-shopping affordance           │
//! │  Lines   ──► one row per line, snapshot order, keyed by position       │
//! │  Failed  ──► terminal "couldn't load" placeholder                      │
//! │                                                                         │
//! │  Every row exposes: quantity-decrement, manual quantity input,          │
//! │  quantity-increment, and remove - all keyed by data-line position.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The renderer is side-effect free: same snapshot in, same markup out.
//! Writing the markup into a container is the surface's job, not ours.

use crate::escape::escape_html;
use crate::snapshot::CartSnapshot;

// =============================================================================
// Rendered Body
// =============================================================================

/// What kind of body was produced, for callers that branch on it without
/// re-parsing markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedKind {
    /// Refresh in flight.
    Loading,
    /// Cart has no lines.
    Empty,
    /// Cart rendered with this many line rows.
    Lines(usize),
    /// Terminal load failure.
    LoadFailed,
}

/// A rendered drawer body: the markup plus what it represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub kind: RenderedKind,
    pub html: String,
}

// =============================================================================
// Cart Renderer
// =============================================================================

/// Pure snapshot-to-markup renderer.
pub struct CartRenderer;

impl CartRenderer {
    /// Renders a snapshot into the drawer body.
    pub fn render(snapshot: &CartSnapshot) -> RenderedBody {
        if snapshot.is_empty() {
            return RenderedBody {
                kind: RenderedKind::Empty,
                html: concat!(
                    r#"<div class="cart-drawer__empty">Your cart is empty.</div>"#,
                    r#"<div class="cart-actions">"#,
                    r#"<a class="button button--secondary w-full" href="/collections/all">Continue shopping</a>"#,
                    r#"</div>"#,
                )
                .to_string(),
            };
        }

        let mut rows = String::new();
        for line in &snapshot.lines {
            rows.push_str(&Self::render_row(line, &snapshot.currency));
        }

        let subtotal = snapshot.items_subtotal.format(&snapshot.currency);
        let html = format!(
            concat!(
                r#"<div class="cart-list">{rows}</div>"#,
                r#"<div class="cart-summary"><span>Subtotal</span><strong>{subtotal}</strong></div>"#,
                r#"<div class="cart-actions">"#,
                r#"<a class="button button--primary w-full" data-anim="fade-up" data-anim-once="true" href="/cart">View cart</a>"#,
                r#"<a class="button button--secondary w-full" data-anim="fade-up" data-anim-once="true" href="/checkout">Checkout</a>"#,
                r#"</div>"#,
            ),
            rows = rows,
            subtotal = subtotal,
        );

        RenderedBody {
            kind: RenderedKind::Lines(snapshot.lines.len()),
            html,
        }
    }

    /// The placeholder shown while a refresh is in flight.
    pub fn render_loading() -> RenderedBody {
        RenderedBody {
            kind: RenderedKind::Loading,
            html: r#"<div class="cart-drawer__loading">Loading…</div>"#.to_string(),
        }
    }

    /// The terminal placeholder shown when the cart could not be loaded and
    /// there is no previous snapshot to fall back to.
    pub fn render_load_failed() -> RenderedBody {
        RenderedBody {
            kind: RenderedKind::LoadFailed,
            html: r#"<div class="cart-drawer__loading">Couldn't load cart</div>"#.to_string(),
        }
    }

    fn render_row(line: &crate::snapshot::CartLine, currency: &str) -> String {
        let media = match &line.image_url {
            Some(src) => {
                // CDN image URLs carry a query string; request a drawer-sized rendition.
                let sep = if src.contains('?') { '&' } else { '?' };
                format!(
                    r#"<img src="{}{}width=160" alt="">"#,
                    escape_html(src),
                    sep
                )
            }
            None => String::new(),
        };

        let variant = match &line.variant_label {
            Some(label) => format!(
                r#"<p class="cart-item__meta">{}</p>"#,
                escape_html(label)
            ),
            None => String::new(),
        };

        format!(
            concat!(
                r#"<div class="cart-item" data-line="{line}">"#,
                r#"<div class="cart-item__media">{media}</div>"#,
                r#"<div class="cart-item__main">"#,
                r#"<p class="cart-item__title">{title}</p>"#,
                "{variant}",
                r#"<div class="cart-item__controls">"#,
                r#"<div class="cart-item__qty" aria-label="Quantity">"#,
                r#"<button type="button" class="qty-btn" data-qty-dec data-line="{line}" aria-label="Decrease quantity">−</button>"#,
                r#"<input type="number" min="0" value="{qty}" inputmode="numeric" class="qty-input" data-qty-input data-line="{line}">"#,
                r#"<button type="button" class="qty-btn" data-qty-inc data-line="{line}" aria-label="Increase quantity">+</button>"#,
                r#"</div>"#,
                r#"<button type="button" class="cart-item__remove" data-remove data-line="{line}" aria-label="Remove item">Remove</button>"#,
                r#"</div>"#,
                r#"</div>"#,
                r#"<div class="cart-item__price">{price}</div>"#,
                r#"</div>"#,
            ),
            line = line.position,
            media = media,
            title = escape_html(&line.title),
            variant = variant,
            qty = line.quantity,
            price = line.line_price.format(currency),
        )
    }
}
