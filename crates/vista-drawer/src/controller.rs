//! # Drawer Controller
//!
//! The orchestrating state machine: owns open/close intent, drives
//! [`PanelMotion`], keeps rendered content synchronized with the remote
//! cart, and binds late-appearing triggers.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Drawer Phase Cycle                                 │
//! │                                                                         │
//! │        open()                 motion done                               │
//! │  Closed ──────► Opening ─────────────────► Open                         │
//! │    ▲               │                         │                          │
//! │    │               │ close()        close()  │                          │
//! │    │               ▼                         ▼                          │
//! │    └─────────── Closing ◄────────────────────┘                          │
//! │       finalize                                                          │
//! │                                                                         │
//! │  • open() is a no-op while Opening/Open (re-entrancy, P2)              │
//! │  • close() always executes, preempting an in-flight open               │
//! │  • busy is orthogonal: set while any mutation is in flight, never      │
//! │    blocks the open/close path                                          │
//! │                                                                         │
//! │  OPEN RUNS TWO HALVES CONCURRENTLY                                     │
//! │  ────────────────────────────────                                      │
//! │  visual slide (PanelMotion)  ║  refresh (fetch → render → badges)      │
//! │  Their completions are unordered; open() settles when both have.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mutation Ordering
//! Concurrent `change_line` calls for different lines are independent.
//! Calls for the *same* line carry a per-line monotonic stamp; a response
//! whose stamp is no longer current is discarded, so the last request
//! *issued* wins the render regardless of network reordering.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use vista_core::render::{CartRenderer, RenderedBody};
use vista_core::snapshot::CartSnapshot;
use vista_core::validation::{clamp_quantity, clamp_raw_quantity};

use crate::bus::{UiBus, UiEvent};
use crate::config::{CartMode, DrawerConfig};
use crate::error::{DrawerError, DrawerResult};
use crate::motion::{MotionMode, MotionOutcome, PanelMotion};
use crate::surface::{AnimScope, DrawerSurface, NodeId, ViewportAnimator};
use crate::transport::CartTransport;
use crate::triggers::TriggerBinder;

// =============================================================================
// Drawer State
// =============================================================================

/// Where the drawer is in its open/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

/// The controller-owned state. Mutated only by the operations below;
/// PanelMotion and the surface never touch it.
#[derive(Debug, Clone, Default)]
pub struct DrawerState {
    pub phase: Phase,
    pub busy: bool,
    pub last_snapshot: Option<CartSnapshot>,
}

// =============================================================================
// Drawer Controller
// =============================================================================

/// The drawer's orchestrating state machine.
///
/// Constructed via [`DrawerController::mount`]; collaborators are injected
/// so hosts and tests choose their own surface, transport and animator.
pub struct DrawerController {
    config: DrawerConfig,
    surface: Arc<dyn DrawerSurface>,
    transport: Arc<dyn CartTransport>,
    animator: Arc<dyn ViewportAnimator>,
    motion: PanelMotion,
    bus: UiBus,

    /// Shared so a close finalize can flip the phase after `close()` has
    /// returned.
    state: Arc<Mutex<DrawerState>>,

    /// In-flight mutation count backing the busy flag.
    inflight: AtomicUsize,

    /// Per-line monotonic stamps for discarding stale mutation responses.
    line_stamps: Mutex<HashMap<u32, u64>>,

    binder: Mutex<TriggerBinder>,

    destroyed: AtomicBool,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
}

impl DrawerController {
    /// Mounts the controller: wires the event intake task and reports a
    /// missing body container once, as a diagnostic rather than a failure.
    pub fn mount(
        config: DrawerConfig,
        surface: Arc<dyn DrawerSurface>,
        transport: Arc<dyn CartTransport>,
        animator: Arc<dyn ViewportAnimator>,
        bus: UiBus,
        motion_mode: MotionMode,
    ) -> Arc<Self> {
        if !surface.has_body_container() {
            // Fatal to rendering only: open/close still function.
            error!("drawer body container not found; cart content will not display");
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let motion = PanelMotion::new(&config, motion_mode);

        let controller = Arc::new(DrawerController {
            config,
            surface,
            transport,
            animator,
            motion,
            bus: bus.clone(),
            state: Arc::new(Mutex::new(DrawerState::default())),
            inflight: AtomicUsize::new(0),
            line_stamps: Mutex::new(HashMap::new()),
            binder: Mutex::new(TriggerBinder::new()),
            destroyed: AtomicBool::new(false),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
        });

        tokio::spawn(Self::event_intake(
            Arc::downgrade(&controller),
            bus,
            shutdown_rx,
        ));

        info!(mode = ?controller.config.cart_mode, "drawer controller mounted");
        controller
    }

    /// Listens on the UI bus: an open request (broadcast event or bound
    /// trigger) opens the drawer; an add-to-cart opens it, or refreshes it
    /// if it is already showing.
    async fn event_intake(
        controller: Weak<DrawerController>,
        bus: UiBus,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut events = bus.subscribe();
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(controller) = controller.upgrade() else { break };
                    match event {
                        Ok(UiEvent::CartOpenRequested) => controller.open().await,
                        Ok(UiEvent::CartAdded { .. }) => {
                            let phase = controller.phase();
                            if matches!(phase, Phase::Open | Phase::Opening) {
                                controller.refresh().await;
                            } else {
                                controller.open().await;
                            }
                        }
                        Ok(UiEvent::CartUpdated { .. }) => {}
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "drawer event intake lagged");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }
        debug!("drawer event intake stopped");
    }

    // =========================================================================
    // Open / Close
    // =========================================================================

    /// Opens the drawer: visual slide and cart refresh run concurrently,
    /// and this settles only when both have. Re-entrant calls while the
    /// drawer is opening or open are no-ops.
    pub async fn open(&self) {
        if self.destroyed.load(Ordering::SeqCst) {
            return;
        }
        if self.config.cart_mode == CartMode::Page {
            // Page mode lets the trigger navigate instead.
            debug!("open ignored in page cart mode");
            return;
        }

        let proceed = self.with_state(|state| {
            !matches!(state.phase, Phase::Opening | Phase::Open)
        });
        if !proceed {
            debug!("open ignored, already opening or open");
            return;
        }

        // Settle any in-flight close before entering Opening: its finalize
        // flips the phase to Closed and hides the container, so it must run
        // before we set our phase and reveal. No suspension point between
        // the check above and the phase write below.
        self.motion.interrupt();
        self.with_state_mut(|state| state.phase = Phase::Opening);

        let distance = self.measured_width();
        self.surface.reveal();
        self.surface.focus_panel();

        let (outcome, ()) = tokio::join!(
            self.motion.run_open(self.surface.as_ref(), distance),
            self.refresh(),
        );

        if outcome == MotionOutcome::Completed {
            self.with_state_mut(|state| {
                if state.phase == Phase::Opening {
                    state.phase = Phase::Open;
                }
            });
        }

        // Entrance effects for anything injected while the drawer opened;
        // deferred one task so synchronous writes are attached first.
        tokio::task::yield_now().await;
        self.animator.refresh(AnimScope::Drawer);
    }

    /// Closes the drawer. Always executable - interrupting an in-progress
    /// open is the normal way a fast user dismisses the drawer. The
    /// finalize step runs exactly once per call, interrupted or not.
    pub async fn close(&self) {
        if self.destroyed.load(Ordering::SeqCst) {
            return;
        }

        // Fire a superseded close's finalize before entering Closing, so
        // the phase we set below is not clobbered by an older finalize.
        self.motion.interrupt();
        self.with_state_mut(|state| state.phase = Phase::Closing);

        let distance = self.measured_width();
        let surface = self.surface.clone();
        let state = self.state.clone();
        self.motion
            .run_close(self.surface.as_ref(), distance, move || {
                surface.finalize_closed();
                state.lock().expect("drawer state mutex poisoned").phase = Phase::Closed;
                debug!("drawer close finalized");
            })
            .await;
    }

    // =========================================================================
    // Refresh / Render
    // =========================================================================

    /// Fetches the cart and repaints the body. On failure the previous
    /// good snapshot is kept: its content is restored if one exists,
    /// otherwise the terminal placeholder shows. Badges only move on
    /// success.
    pub async fn refresh(&self) {
        if self.destroyed.load(Ordering::SeqCst) {
            return;
        }

        self.write_body(&CartRenderer::render_loading());

        match self.transport.fetch_cart().await {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                tokio::task::yield_now().await;
                self.animator.refresh(AnimScope::Body);
            }
            Err(err) => {
                warn!(%err, retryable = err.is_retryable(), "cart refresh failed");
                let previous = self.with_state(|state| state.last_snapshot.clone());
                match previous {
                    // Do not clear a previously good cart on transient failure.
                    Some(snapshot) => self.write_body(&CartRenderer::render(&snapshot)),
                    None => self.write_body(&CartRenderer::render_load_failed()),
                }
            }
        }
    }

    /// Replaces the snapshot wholesale and projects it everywhere it shows:
    /// body content, badges, bus listeners.
    fn apply_snapshot(&self, snapshot: CartSnapshot) {
        let body = CartRenderer::render(&snapshot);
        self.surface.update_badges(snapshot.item_count);
        self.bus.emit(UiEvent::CartUpdated {
            item_count: snapshot.item_count,
        });
        self.write_body(&body);
        self.with_state_mut(|state| state.last_snapshot = Some(snapshot));
    }

    fn write_body(&self, body: &RenderedBody) {
        if let Err(err) = self.surface.write_body(body) {
            warn!(%err, "skipping body render");
        }
    }

    // =========================================================================
    // Quantity Mutations
    // =========================================================================

    /// Sets a line's quantity from raw text input (clamped to an integer
    /// ≥ 0; garbage becomes 0).
    pub async fn change_line_raw(&self, position: u32, raw_quantity: &str) {
        self.change_line(position, i64::from(clamp_raw_quantity(raw_quantity)))
            .await;
    }

    /// Sets the quantity of the line at `position`. Quantity 0 removes the
    /// line. Busy is held for the duration and released on every path.
    pub async fn change_line(&self, position: u32, quantity: i64) {
        if self.destroyed.load(Ordering::SeqCst) {
            return;
        }
        let quantity = clamp_quantity(quantity);

        // Stamp this request; only the most recently issued request per
        // line may apply its response.
        let stamp = {
            let mut stamps = self.line_stamps.lock().expect("line stamp mutex poisoned");
            let entry = stamps.entry(position).or_insert(0);
            *entry += 1;
            *entry
        };

        let _busy = BusyGuard::engage(self);

        match self.transport.change_line(position, quantity).await {
            Ok(snapshot) => {
                let current = self
                    .line_stamps
                    .lock()
                    .expect("line stamp mutex poisoned")
                    .get(&position)
                    .copied()
                    .unwrap_or(0);
                if stamp != current {
                    debug!(position, stamp, current, "stale change-line response discarded");
                    return;
                }
                self.apply_snapshot(snapshot);
                tokio::task::yield_now().await;
                self.animator.refresh(AnimScope::Body);
            }
            Err(err) => {
                // Previously rendered cart stays in place.
                warn!(%err, position, quantity, "change-line failed");
            }
        }
    }

    /// Increments a line's quantity from the last snapshot.
    pub async fn increment_line(&self, position: u32) {
        let next = self.line_quantity(position).saturating_add(1);
        self.change_line(position, i64::from(next)).await;
    }

    /// Decrements a line's quantity from the last snapshot, stopping at 0
    /// (which removes the line).
    pub async fn decrement_line(&self, position: u32) {
        let next = self.line_quantity(position).saturating_sub(1);
        self.change_line(position, i64::from(next)).await;
    }

    /// Removes the line at `position`.
    pub async fn remove_line(&self, position: u32) {
        self.change_line(position, 0).await;
    }

    fn line_quantity(&self, position: u32) -> u32 {
        self.with_state(|state| {
            state
                .last_snapshot
                .as_ref()
                .and_then(|snapshot| snapshot.line(position))
                .map(|line| line.quantity)
                .unwrap_or(0)
        })
    }

    /// Adds a variant to the cart and announces it; the intake task opens
    /// (or refreshes) the drawer in response.
    pub async fn add_to_cart(&self, variant_id: u64, quantity: u32) -> DrawerResult<()> {
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(DrawerError::Destroyed);
        }
        self.transport.add_item(variant_id, quantity).await?;
        self.bus.emit(UiEvent::CartAdded { quantity });
        Ok(())
    }

    // =========================================================================
    // Trigger Binding
    // =========================================================================

    /// Records open-trigger nodes the host observed appearing in the
    /// document. Detection only; binding happens on the next frame drain.
    pub fn notice_triggers<I>(&self, nodes: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.binder
            .lock()
            .expect("trigger binder mutex poisoned")
            .notice(nodes);
    }

    /// Drains the trigger worklist on a frame boundary, binding each newly
    /// seen node exactly once.
    pub fn drain_trigger_frame(&self) {
        let newly = self
            .binder
            .lock()
            .expect("trigger binder mutex poisoned")
            .drain();
        for node in newly {
            self.surface.bind_open_trigger(node);
        }
    }

    // =========================================================================
    // Lifecycle & Accessors
    // =========================================================================

    /// Tears the controller down: stops the intake task and forgets
    /// bindings. Idempotent; DOM state is left as-is.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(tx) = self
            .shutdown_tx
            .lock()
            .expect("shutdown mutex poisoned")
            .take()
        {
            let _ = tx.try_send(());
        }
        self.binder
            .lock()
            .expect("trigger binder mutex poisoned")
            .clear();
        info!("drawer controller destroyed");
    }

    /// A copy of the current drawer state.
    pub fn state(&self) -> DrawerState {
        self.with_state(Clone::clone)
    }

    pub fn phase(&self) -> Phase {
        self.with_state(|state| state.phase)
    }

    pub fn is_busy(&self) -> bool {
        self.inflight.load(Ordering::SeqCst) > 0
    }

    fn measured_width(&self) -> f64 {
        let width = self.surface.measure_panel_width();
        if width > 0.0 {
            width
        } else {
            self.config.fallback_width
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&DrawerState) -> R) -> R {
        let state = self.state.lock().expect("drawer state mutex poisoned");
        f(&state)
    }

    fn with_state_mut<R>(&self, f: impl FnOnce(&mut DrawerState) -> R) -> R {
        let mut state = self.state.lock().expect("drawer state mutex poisoned");
        f(&mut state)
    }
}

// =============================================================================
// Busy Guard
// =============================================================================

/// Holds the busy flag for one in-flight mutation; releasing is tied to
/// Drop so every exit path - success, failure, stale discard - clears it.
struct BusyGuard<'a> {
    controller: &'a DrawerController,
}

impl<'a> BusyGuard<'a> {
    fn engage(controller: &'a DrawerController) -> Self {
        if controller.inflight.fetch_add(1, Ordering::SeqCst) == 0 {
            controller.with_state_mut(|state| state.busy = true);
            controller.surface.set_busy(true);
        }
        BusyGuard { controller }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.controller.inflight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.controller.with_state_mut(|state| state.busy = false);
            self.controller.surface.set_busy(false);
        }
    }
}
