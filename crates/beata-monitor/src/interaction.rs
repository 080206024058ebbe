//! User-interaction events and the hub that fans them out.
//!
//! The browser client attached seven window listeners for activity
//! tracking and detached them again on stop. Here the UI layer owns an
//! [`InteractionHub`], forwards input into it, and anything interested
//! (the session monitor) registers and unregisters listeners on it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

/// Input that counts as the user being present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    PointerMove,
    PointerDown,
    Click,
    KeyDown,
    TouchStart,
    TouchMove,
    Scroll,
}

impl InteractionKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::PointerMove,
        Self::PointerDown,
        Self::Click,
        Self::KeyDown,
        Self::TouchStart,
        Self::TouchMove,
        Self::Scroll,
    ];
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PointerMove => "mousemove",
            Self::PointerDown => "mousedown",
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::Scroll => "scroll",
        };
        f.write_str(name)
    }
}

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

struct Listener {
    kinds: Vec<InteractionKind>,
    tx: mpsc::UnboundedSender<InteractionKind>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: HashMap<ListenerId, Listener>,
}

/// Fan-out point for interaction events. Clones share listeners.
#[derive(Clone, Default)]
pub struct InteractionHub {
    inner: Arc<Mutex<HubInner>>,
}

impl InteractionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kinds`. Matching events are delivered on
    /// the returned receiver until [`unregister`](Self::unregister) is
    /// called or the receiver is dropped.
    pub fn register(
        &self,
        kinds: &[InteractionKind],
    ) -> (ListenerId, mpsc::UnboundedReceiver<InteractionKind>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.insert(
            id,
            Listener {
                kinds: kinds.to_vec(),
                tx,
            },
        );
        tracing::trace!(%id, kinds = kinds.len(), "interaction listener registered");
        (id, rx)
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unregister(&self, id: ListenerId) {
        if self.lock().listeners.remove(&id).is_some() {
            tracing::trace!(%id, "interaction listener removed");
        }
    }

    /// Deliver `kind` to every listener registered for it.
    ///
    /// Returns how many listeners received it. Listeners whose receiver
    /// is gone are dropped along the way.
    pub fn dispatch(&self, kind: InteractionKind) -> usize {
        let mut inner = self.lock();
        let mut delivered = 0;
        inner.listeners.retain(|_, listener| {
            if !listener.kinds.contains(&kind) {
                return true;
            }
            match listener.tx.send(kind) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        delivered
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        // The map stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for InteractionHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
