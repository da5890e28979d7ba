//! # Host Surface Seams
//!
//! The two contracts the host page implements: [`DrawerSurface`] (every DOM
//! write the drawer ever makes) and [`ViewportAnimator`] (the entrance-effect
//! capability).
//!
//! ## Ownership Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Writes What                                      │
//! │                                                                         │
//! │  CartRenderer (via write_body) ──► body container content               │
//! │  PanelMotion (via offsets)     ──► panel transform, overlay opacity     │
//! │  finalize_closed               ──► hidden flag, open/busy markers       │
//! │                                                                         │
//! │  Nothing else writes into the drawer subtree. The surface trait is the │
//! │  complete inventory of side effects, which is what makes the state     │
//! │  machine testable with a recording fake.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use vista_core::render::RenderedBody;

use crate::error::DrawerResult;

// =============================================================================
// Node Handles
// =============================================================================

/// Opaque handle to a host DOM node, used for trigger binding. The host
/// assigns these; the drawer only compares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

// =============================================================================
// Drawer Surface
// =============================================================================

/// Everything the drawer does to the page, as one trait.
///
/// The host implementation is a thin adapter over real DOM nodes; tests use
/// a recording fake. Methods are synchronous: DOM writes run to completion
/// on the UI thread, suspension points live in the controller.
pub trait DrawerSurface: Send + Sync {
    /// Reveals the container and applies the open markers (un-hide, open
    /// classes, overlay accepts pointer events). Called at the start of an
    /// open transition, before any tweening.
    fn reveal(&self);

    /// The finalize step of a close: drop pointer events on the overlay,
    /// clear open markers, hide the container. PanelMotion guarantees this
    /// is reached exactly once per logical close.
    fn finalize_closed(&self);

    /// Toggles the busy marker used to disable repeated submissions.
    fn set_busy(&self, busy: bool);

    /// Whether the body content container exists under the mounted root.
    /// Checked once at mount so a broken layout is reported up front.
    fn has_body_container(&self) -> bool;

    /// Writes a rendered body into the content container.
    ///
    /// Fails with [`crate::error::DrawerError::MissingContainer`] when the
    /// container is absent from the mounted root.
    fn write_body(&self, body: &RenderedBody) -> DrawerResult<()>;

    /// Updates every visible item-count badge.
    fn update_badges(&self, count: u32);

    /// Moves keyboard focus onto the panel.
    fn focus_panel(&self);

    /// Measures the rendered panel width.
    ///
    /// The host must measure even while the container is hidden, by forcing
    /// a measurable but invisible state and restoring it, without a visible
    /// flash. Returns the configured fallback width when unmeasurable.
    fn measure_panel_width(&self) -> f64;

    /// Sets the panel's horizontal offset in pixels (0 = fully open).
    fn set_panel_offset(&self, x: f64);

    /// Sets the overlay opacity (0 = transparent, 1 = dimmed).
    fn set_overlay_opacity(&self, alpha: f64);

    /// Attaches the open handler to a trigger node. The binder guarantees
    /// each node is passed here at most once.
    fn bind_open_trigger(&self, node: NodeId);
}

// =============================================================================
// Viewport Animator
// =============================================================================

/// Where an animator refresh should re-scan for not-yet-animated elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimScope {
    /// The whole drawer subtree.
    Drawer,
    /// Only the body container (after a re-render).
    Body,
}

/// The entrance-effect capability, e.g. a viewport-observing animation
/// engine. Calling [`refresh`](ViewportAnimator::refresh) repeatedly over
/// already-processed elements must be a no-op (idempotent per element).
pub trait ViewportAnimator: Send + Sync {
    fn refresh(&self, scope: AnimScope);
}

/// No-op animator for hosts without an animation engine, and for tests.
pub struct NoOpAnimator;

impl ViewportAnimator for NoOpAnimator {
    fn refresh(&self, _scope: AnimScope) {}
}

// =============================================================================
// Recording Fake (test builds only)
// =============================================================================
