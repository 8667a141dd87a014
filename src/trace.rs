//! Per-instance trace callback storage shared by holders and factories.

use std::fmt;
use std::sync::{Arc, Mutex};

/// A user-supplied tracing callback receiving events of type `E`.
///
/// It must be thread-safe because holders and factories are typically statics.
pub type TraceCallback<E> = dyn Fn(&E) + Send + Sync + 'static;

/// An event a [`TraceSlot`] can emit.
pub(crate) trait TraceEvent: fmt::Display {
    /// Lookups are logged at trace level, everything else at debug level.
    fn is_lookup(&self) -> bool {
        false
    }
}

/// Optional callback slot.
///
/// Every emitted event is also logged through `tracing`, so the callback is
/// only needed by code that wants to react to events itself.
pub(crate) struct TraceSlot<E> {
    callback: Mutex<Option<Arc<TraceCallback<E>>>>,
}

impl<E: TraceEvent> TraceSlot<E> {
    pub(crate) const fn new() -> Self {
        Self {
            callback: Mutex::new(None),
        }
    }

    /// Lock poisoning is recovered; the slot only ever holds an `Option<Arc<_>>`.
    pub(crate) fn set(&self, callback: impl Fn(&E) + Send + Sync + 'static) {
        let mut guard = self.callback.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    pub(crate) fn clear(&self) {
        let mut guard = self.callback.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    pub(crate) fn is_set(&self) -> bool {
        self.callback
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    /// Logs the event and hands it to the callback, if any.
    ///
    /// The slot lock is released before the callback runs, so the callback may
    /// call back into the holder or factory that emitted the event.
    pub(crate) fn emit(&self, event: &E) {
        if event.is_lookup() {
            tracing::trace!(target: "singleton_factory", "{event}");
        } else {
            tracing::debug!(target: "singleton_factory", "{event}");
        }

        let callback = self
            .callback
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();

        if let Some(callback) = callback {
            callback(event);
        }
    }
}

impl<E: TraceEvent> fmt::Debug for TraceSlot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceSlot")
            .field("callback_set", &self.is_set())
            .finish()
    }
}
