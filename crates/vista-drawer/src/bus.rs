//! # UI Event Bus
//!
//! Typed, injected replacement for the page-global event target.
//!
//! ## Why Not a Singleton?
//! The original storefront shared one process-wide `EventTarget` keyed by
//! string names. Here the bus is an explicit value constructed at mount and
//! handed to each component, with a closed set of typed events: no name
//! collisions, no stringly-typed payloads, and tests can create an isolated
//! bus per case.
//!
//! Built on `tokio::sync::broadcast` so any number of components can listen;
//! emitting never blocks and never fails (a bus with no listeners simply
//! drops the event, same as dispatching to an empty target).

use tokio::sync::broadcast;

/// Events carried on the UI bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Something requested the drawer open (trigger click, broadcast event).
    CartOpenRequested,

    /// The add-to-cart flow put items in the cart; the drawer should open
    /// and show fresh state.
    CartAdded { quantity: u32 },

    /// A refresh or mutation produced a new snapshot; badges elsewhere on
    /// the page may want the new count.
    CartUpdated { item_count: u32 },
}

/// Handle to the UI event bus. Cheap to clone; all clones share the channel.
#[derive(Debug, Clone)]
pub struct UiBus {
    tx: broadcast::Sender<UiEvent>,
}

impl UiBus {
    /// Creates a new bus. Capacity bounds how far a slow listener may lag
    /// before it starts missing events.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(32);
        UiBus { tx }
    }

    /// Emits an event to all current listeners.
    pub fn emit(&self, event: UiEvent) {
        // A send error only means nobody is listening right now.
        let _ = self.tx.send(event);
    }

    /// Subscribes to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }
}

impl Default for UiBus {
    fn default() -> Self {
        UiBus::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_reaches_all_subscribers() {
        let bus = UiBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(UiEvent::CartAdded { quantity: 2 });

        assert_eq!(a.recv().await.unwrap(), UiEvent::CartAdded { quantity: 2 });
        assert_eq!(b.recv().await.unwrap(), UiEvent::CartAdded { quantity: 2 });
    }

    #[tokio::test]
    async fn test_emit_without_listeners_is_a_no_op() {
        let bus = UiBus::new();
        bus.emit(UiEvent::CartOpenRequested);
        // Subscribers only see events emitted after subscription.
        let mut rx = bus.subscribe();
        bus.emit(UiEvent::CartUpdated { item_count: 4 });
        assert_eq!(
            rx.recv().await.unwrap(),
            UiEvent::CartUpdated { item_count: 4 }
        );
    }
}
