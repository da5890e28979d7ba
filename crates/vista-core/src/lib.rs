//! # vista-core: Pure Cart Logic for the Vista Drawer
//!
//! This crate is the **heart** of the cart drawer. It contains everything
//! that can be computed without touching the network, the DOM, or a clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vista Drawer Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host Page (DrawerSurface impl)                  │   │
//! │  │    triggers ──► drawer panel ──► body container ──► badges      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 vista-drawer (controller crate)                 │   │
//! │  │    DrawerController, PanelMotion, CartTransport, TriggerBinder  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vista-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ snapshot  │  │   money   │  │  render   │  │ validation│  │   │
//! │  │   │ CartLine  │  │   Money   │  │ row/empty │  │ clamp_qty │  │   │
//! │  │   │ WireCart  │  │ templates │  │ subtotal  │  │ positions │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DOM • NO CLOCK • PURE FUNCTIONS                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`snapshot`] - Server-authoritative cart snapshot and wire normalization
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`render`] - Pure snapshot-to-markup renderer
//! - [`validation`] - Quantity clamping and position checks
//! - [`escape`] - HTML escaping for merchant/user text
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every render is deterministic - same snapshot = same markup
//! 2. **No I/O**: Network, DOM and timer access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are minor units (i64), never floats
//! 4. **Server Authority**: No local cart math - a snapshot is replaced wholesale

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod escape;
pub mod money;
pub mod render;
pub mod snapshot;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vista_core::CartSnapshot` instead of
// `use vista_core::snapshot::CartSnapshot`

pub use error::CoreError;
pub use escape::escape_html;
pub use money::{Money, MoneyFormat};
pub use render::{CartRenderer, RenderedBody, RenderedKind};
pub use snapshot::{CartLine, CartSnapshot, WireCart};
pub use validation::{clamp_quantity, clamp_raw_quantity};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted for a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// The server clamps again; this is the client-side ceiling.
pub const MAX_LINE_QUANTITY: u32 = 999;
