//! # Vista Drawer
//!
//! The in-page cart drawer: panel lifecycle, remote cart synchronization,
//! and the host seams that keep both testable.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        vista-drawer                                     │
//! │                                                                         │
//! │   UiBus ──events──► DrawerController ◄──options── DrawerConfig          │
//! │                        │       │                                        │
//! │            PanelMotion │       │ CartTransport (HTTP or fake)           │
//! │                        ▼       ▼                                        │
//! │                   DrawerSurface ◄── CartRenderer output (vista-core)    │
//! │                                                                         │
//! │   DrawerSurface and ViewportAnimator are the only paths to the host     │
//! │   page; everything above them runs on plain tokio and is exercised      │
//! │   with recording fakes.                                                 │
//! │                                                                         │
//! │   vista-core stays free of I/O; this crate owns every await point.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod bus;
pub mod config;
pub mod controller;
pub mod error;
pub mod motion;
pub mod surface;
pub mod transport;
pub mod triggers;

pub use bus::{UiBus, UiEvent};
pub use config::{CartMode, DrawerConfig};
pub use controller::{DrawerController, DrawerState, Phase};
pub use error::{DrawerError, DrawerResult, TransportError};
pub use motion::{MotionMode, MotionOutcome, MotionTimings, PanelMotion};
pub use surface::{AnimScope, DrawerSurface, NodeId, NoOpAnimator, ViewportAnimator};
pub use transport::{CartTransport, HttpCartTransport, TransportConfig};
pub use triggers::TriggerBinder;

#[cfg(test)]
pub(crate) mod test_support {
    use tracing_subscriber::EnvFilter;

    /// Installs a per-test tracing subscriber honoring `RUST_LOG`; later
    /// calls are no-ops so every test can call this unconditionally.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
