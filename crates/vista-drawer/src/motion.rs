//! # Panel Motion
//!
//! Runs the open/close transitions of the sliding panel and its overlay.
//!
//! ## Transition Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PanelMotion Guarantees                              │
//! │                                                                         │
//! │  1. LAST CALL WINS on the visual layer: starting a transition cancels  │
//! │     any transition still running on the same panel/overlay.            │
//! │                                                                         │
//! │  2. EXACTLY-ONCE FINALIZE: the finalize supplied to a close runs once  │
//! │     per logical close - on natural completion, or immediately when a   │
//! │     later open/close supersedes it. Never skipped, never doubled.      │
//! │                                                                         │
//! │  3. Reduced motion collapses durations but keeps the same callback     │
//! │     ordering.                                                          │
//! │                                                                         │
//! │  4. Without an animation capability the transition degrades to a snap  │
//! │     plus a timer matching the nominal duration - finalize still fires  │
//! │     exactly once.                                                      │
//! │                                                                         │
//! │  Tween clock: fixed-step sleeps on the tokio timer. Each step checks   │
//! │  the generation counter; a superseded tween stops writing and returns  │
//! │  Interrupted without touching the finalize (its superseder already     │
//! │  fired it).                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::config::DrawerConfig;
use crate::surface::DrawerSurface;

// =============================================================================
// Outcomes & Modes
// =============================================================================

/// How a transition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    /// Ran to its terminal transform.
    Completed,
    /// Superseded by a later transition before finishing.
    Interrupted,
}

/// Whether an animation capability is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionMode {
    /// Tween the transform in steps.
    #[default]
    Animated,
    /// Snap to the terminal transform and finalize from a timer.
    Fallback,
}

// =============================================================================
// Timings
// =============================================================================

/// Derived transition durations.
///
/// Open uses the base speed directly; close is slower with a floor so a fast
/// base still reads as a deliberate exit; overlays run a shorter fraction.
/// Reduced motion collapses everything to a negligible value, floors
/// included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTimings {
    pub open: Duration,
    pub close: Duration,
    pub overlay_open: Duration,
    pub overlay_close: Duration,
}

impl MotionTimings {
    pub fn from_config(config: &DrawerConfig) -> Self {
        if config.reduced_motion {
            let negligible = Duration::from_millis(10);
            return MotionTimings {
                open: negligible,
                close: negligible,
                overlay_open: negligible,
                overlay_close: negligible,
            };
        }

        let speed = config.speed;
        MotionTimings {
            open: Duration::from_secs_f64(speed),
            close: Duration::from_secs_f64((0.85 * speed).max(0.32)),
            overlay_open: Duration::from_secs_f64(0.6 * speed),
            overlay_close: Duration::from_secs_f64((0.6 * speed).max(0.18)),
        }
    }
}

// =============================================================================
// Panel Motion
// =============================================================================

type CloseFinalize = Box<dyn FnOnce() + Send>;

/// Transition engine for one panel/overlay pair.
///
/// Holds no DOM references itself; every write goes through the
/// [`DrawerSurface`] passed to each run. Lifecycle decisions stay with the
/// controller - this type only executes transitions and reports how they
/// ended.
pub struct PanelMotion {
    timings: MotionTimings,
    mode: MotionMode,

    /// Bumped by every new transition; a tween step that observes a newer
    /// generation stops immediately.
    generation: AtomicU64,

    /// Finalize of the close currently in flight, tagged with its
    /// generation. Taken exactly once: by natural completion or by the
    /// superseding transition.
    pending_close: Mutex<Option<(u64, CloseFinalize)>>,
}

/// Tween resolution. Enough steps to read as smooth, few enough that a
/// cancelled transition stops within a frame or two.
const TWEEN_STEPS: u32 = 12;

impl PanelMotion {
    pub fn new(config: &DrawerConfig, mode: MotionMode) -> Self {
        PanelMotion {
            timings: MotionTimings::from_config(config),
            mode,
            generation: AtomicU64::new(0),
            pending_close: Mutex::new(None),
        }
    }

    /// Cancels any in-flight transition and fires a superseded close's
    /// finalize. Safe to call with nothing in flight.
    pub fn interrupt(&self) {
        self.begin();
    }

    /// Starts a new generation: supersedes running tweens and settles any
    /// pending close finalize (the interruption path of the exactly-once
    /// contract).
    fn begin(&self) -> u64 {
        let gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let pending = self.pending_close.lock().expect("pending close mutex poisoned").take();
        if let Some((closed_gen, finalize)) = pending {
            debug!(superseded = closed_gen, by = gen, "close interrupted, finalizing");
            finalize();
        }
        gen
    }

    fn superseded(&self, gen: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != gen
    }

    /// Runs the open transition: panel slides in from `distance`, overlay
    /// fades in over its shorter duration.
    pub async fn run_open(&self, surface: &dyn DrawerSurface, distance: f64) -> MotionOutcome {
        let gen = self.begin();

        // Starting transform: panel off-canvas, overlay transparent.
        surface.set_panel_offset(distance);
        surface.set_overlay_opacity(0.0);

        if self.mode == MotionMode::Fallback {
            surface.set_panel_offset(0.0);
            surface.set_overlay_opacity(1.0);
            tokio::time::sleep(self.timings.open).await;
            return self.outcome(gen);
        }

        let step = self.timings.open / TWEEN_STEPS;
        for i in 1..=TWEEN_STEPS {
            tokio::time::sleep(step).await;
            if self.superseded(gen) {
                return MotionOutcome::Interrupted;
            }
            let t = f64::from(i) / f64::from(TWEEN_STEPS);
            surface.set_panel_offset(distance * (1.0 - ease_out_cubic(t)));
            surface.set_overlay_opacity(overlay_progress(
                self.timings.open.mul_f64(t),
                self.timings.overlay_open,
            ));
        }

        surface.set_panel_offset(0.0);
        surface.set_overlay_opacity(1.0);
        MotionOutcome::Completed
    }

    /// Runs the close transition: panel slides out to `distance`, overlay
    /// fades. `finalize` runs exactly once per call - here on completion,
    /// or from the superseding transition's [`begin`](Self::begin).
    pub async fn run_close(
        &self,
        surface: &dyn DrawerSurface,
        distance: f64,
        finalize: impl FnOnce() + Send + 'static,
    ) -> MotionOutcome {
        let gen = self.begin();
        *self.pending_close.lock().expect("pending close mutex poisoned") = Some((gen, Box::new(finalize)));

        if self.mode == MotionMode::Fallback {
            surface.set_panel_offset(distance);
            surface.set_overlay_opacity(0.0);
            // Timer matches the nominal transition duration.
            tokio::time::sleep(self.timings.close).await;
            return self.settle_close(gen);
        }

        let step = self.timings.close / TWEEN_STEPS;
        for i in 1..=TWEEN_STEPS {
            tokio::time::sleep(step).await;
            if self.superseded(gen) {
                return MotionOutcome::Interrupted;
            }
            let t = f64::from(i) / f64::from(TWEEN_STEPS);
            surface.set_panel_offset(distance * ease_in_cubic(t));
            surface.set_overlay_opacity(
                1.0 - overlay_progress(self.timings.close.mul_f64(t), self.timings.overlay_close),
            );
        }

        surface.set_panel_offset(distance);
        surface.set_overlay_opacity(0.0);
        self.settle_close(gen)
    }

    /// Completion path of a close: fire the finalize if it is still ours.
    fn settle_close(&self, gen: u64) -> MotionOutcome {
        if self.superseded(gen) {
            return MotionOutcome::Interrupted;
        }
        let pending = self.pending_close.lock().expect("pending close mutex poisoned").take();
        match pending {
            Some((owner, finalize)) if owner == gen => {
                finalize();
                MotionOutcome::Completed
            }
            other => {
                // A newer close replaced the registration between our last
                // step and here; put it back untouched.
                *self.pending_close.lock().expect("pending close mutex poisoned") = other;
                MotionOutcome::Interrupted
            }
        }
    }

    fn outcome(&self, gen: u64) -> MotionOutcome {
        if self.superseded(gen) {
            MotionOutcome::Interrupted
        } else {
            MotionOutcome::Completed
        }
    }
}

// =============================================================================
// Easing
// =============================================================================

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn ease_in_cubic(t: f64) -> f64 {
    t.powi(3)
}

/// Overlay alpha at `elapsed` of a fade lasting `duration`, clamped to 1.
fn overlay_progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use super::*;
    use crate::surface::fakes::FakeSurface;

    fn motion(mode: MotionMode) -> PanelMotion {
        PanelMotion::new(&DrawerConfig::default(), mode)
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = {
            let count = count.clone();
            move || {
                count.fetch_add(1, Ordering::SeqCst);
            }
        };
        (count, hook)
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_completes() {
        let motion = motion(MotionMode::Animated);
        let surface = FakeSurface::new();

        let outcome = motion.run_open(&surface, 420.0).await;

        assert_eq!(outcome, MotionOutcome::Completed);
        let offsets = surface.offsets.lock().unwrap().clone();
        assert_eq!(*offsets.first().unwrap(), 420.0);
        assert_eq!(*offsets.last().unwrap(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_finalizes_once_on_completion() {
        let motion = motion(MotionMode::Animated);
        let surface = FakeSurface::new();
        let (count, finalize) = counter();

        let outcome = motion.run_close(&surface, 420.0, finalize).await;

        assert_eq!(outcome, MotionOutcome::Completed);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_interrupted_by_close_finalizes_each_exactly_once() {
        // P1: two rapid closes = two logical closes = two finalizes, the
        // first fired at interruption, the second on completion.
        let motion = Arc::new(motion(MotionMode::Animated));
        let surface = Arc::new(FakeSurface::new());
        let (first_count, first) = counter();
        let (second_count, second) = counter();

        let first_run = {
            let motion = motion.clone();
            let surface = surface.clone();
            tokio::spawn(async move { motion.run_close(surface.as_ref(), 420.0, first).await })
        };
        // Let the first close start tweening before superseding it.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second_outcome = motion.run_close(surface.as_ref(), 420.0, second).await;
        let first_outcome = first_run.await.unwrap();

        assert_eq!(first_outcome, MotionOutcome::Interrupted);
        assert_eq!(second_outcome, MotionOutcome::Completed);
        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_interrupting_close_fires_its_finalize() {
        let motion = Arc::new(motion(MotionMode::Animated));
        let surface = Arc::new(FakeSurface::new());
        let (count, finalize) = counter();

        let close_run = {
            let motion = motion.clone();
            let surface = surface.clone();
            tokio::spawn(async move { motion.run_close(surface.as_ref(), 420.0, finalize).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let open_outcome = motion.run_open(surface.as_ref(), 420.0).await;

        assert_eq!(close_run.await.unwrap(), MotionOutcome::Interrupted);
        assert_eq!(open_outcome, MotionOutcome::Completed);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_with_nothing_pending_is_safe() {
        let motion = motion(MotionMode::Animated);
        motion.interrupt();
        motion.interrupt();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reduced_motion_keeps_finalize_ordering() {
        let config = DrawerConfig {
            reduced_motion: true,
            ..DrawerConfig::default()
        };
        let motion = PanelMotion::new(&config, MotionMode::Animated);
        let surface = FakeSurface::new();
        let (count, finalize) = counter();

        motion.run_open(&surface, 420.0).await;
        let outcome = motion.run_close(&surface, 420.0, finalize).await;

        assert_eq!(outcome, MotionOutcome::Completed);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_mode_finalizes_once_from_timer() {
        let motion = motion(MotionMode::Fallback);
        let surface = FakeSurface::new();
        let (count, finalize) = counter();

        let before = tokio::time::Instant::now();
        let outcome = motion.run_close(&surface, 420.0, finalize).await;

        assert_eq!(outcome, MotionOutcome::Completed);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        // Timer matches the nominal close duration.
        assert!(before.elapsed() >= MotionTimings::from_config(&DrawerConfig::default()).close);
        // Snap: the terminal transform is written once, no tween steps.
        assert_eq!(surface.offsets.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arbitrary_interleaving_never_doubles_finalize() {
        let motion = Arc::new(motion(MotionMode::Animated));
        let surface = Arc::new(FakeSurface::new());
        let total = Arc::new(AtomicUsize::new(0));

        let mut closes = 0usize;
        for i in 0..6 {
            if i % 2 == 0 {
                let motion = motion.clone();
                let surface = surface.clone();
                tokio::spawn(async move {
                    motion.run_open(surface.as_ref(), 420.0).await;
                });
            } else {
                closes += 1;
                let motion = motion.clone();
                let surface = surface.clone();
                let total = total.clone();
                tokio::spawn(async move {
                    motion
                        .run_close(surface.as_ref(), 420.0, move || {
                            total.fetch_add(1, Ordering::SeqCst);
                        })
                        .await;
                });
            }
            tokio::time::sleep(Duration::from_millis(17)).await;
        }
        // Let the last transition run out.
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(total.load(Ordering::SeqCst), closes);
    }

    #[test]
    fn test_timings_reduced_motion_collapses_floors() {
        let config = DrawerConfig {
            reduced_motion: true,
            ..DrawerConfig::default()
        };
        let timings = MotionTimings::from_config(&config);
        assert!(timings.close < Duration::from_millis(50));
    }

    #[test]
    fn test_timings_close_has_a_floor() {
        let config = DrawerConfig {
            speed: 0.1,
            ..DrawerConfig::default()
        };
        let timings = MotionTimings::from_config(&config);
        assert_eq!(timings.close, Duration::from_secs_f64(0.32));
        assert_eq!(timings.overlay_close, Duration::from_secs_f64(0.18));
    }
}
