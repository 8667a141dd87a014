//! Singleton holder that survives teardown.
//!
//! A [`RecoverableSingleton`] moves through an explicit state machine:
//!
//! ```text
//! Uninitialized --instance()--> Live --destroy()--> Destroyed --instance()--> Live --> ...
//! ```
//!
//! `Uninitialized` is left exactly once. Accessing a `Destroyed` holder builds a
//! fresh instance instead of handing out a dead reference.
//!
//! Access uses double-checked locking: a lock-free load of the current instance,
//! and only when that finds nothing, the [`SpinLock`] plus a second check before
//! building. Instances are handed out as `Arc<T>`, so a handle obtained before a
//! teardown keeps its own instance alive; it is simply no longer the one the
//! holder serves.

use std::any;
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::trace::TraceSlot;
use crate::{HolderEvent, SpinLock};

/// Lifecycle state of a [`RecoverableSingleton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HolderState {
    /// No instance has ever been built.
    Uninitialized = 0,
    /// An instance is being served.
    Live = 1,
    /// The last instance was torn down; the next access rebuilds it.
    Destroyed = 2,
}

impl HolderState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => HolderState::Live,
            2 => HolderState::Destroyed,
            _ => HolderState::Uninitialized,
        }
    }
}

impl fmt::Display for HolderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HolderState::Uninitialized => "uninitialized",
            HolderState::Live => "live",
            HolderState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Lazily-initialized single instance of `T` that can be torn down and rebuilt.
///
/// At most one instance is reachable through [`instance`](Self::instance) at any
/// time, and under contention exactly one thread runs the initializer.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::{HolderState, RecoverableSingleton};
/// use std::sync::Arc;
///
/// struct Logger {
///     prefix: &'static str,
/// }
///
/// static LOGGER: RecoverableSingleton<Logger> = RecoverableSingleton::new();
///
/// let first = LOGGER.instance(|| Logger { prefix: "app" });
/// assert_eq!(LOGGER.state(), HolderState::Live);
///
/// assert!(LOGGER.destroy());
/// assert_eq!(LOGGER.state(), HolderState::Destroyed);
///
/// let second = LOGGER.instance(|| Logger { prefix: "app" });
/// assert!(!Arc::ptr_eq(&first, &second));
/// assert_eq!(LOGGER.generation(), 2);
/// ```
pub struct RecoverableSingleton<T> {
    slot: ArcSwapOption<T>,
    state: AtomicU8,
    generation: AtomicU64,
    lock: SpinLock,
    trace: TraceSlot<HolderEvent>,
}

impl<T> RecoverableSingleton<T> {
    /// Creates an `Uninitialized` holder. Usable in `static` items.
    pub const fn new() -> Self {
        Self {
            slot: ArcSwapOption::const_empty(),
            state: AtomicU8::new(HolderState::Uninitialized as u8),
            generation: AtomicU64::new(0),
            lock: SpinLock::new(),
            trace: TraceSlot::new(),
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> HolderState {
        HolderState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns whether an instance is currently being served.
    pub fn is_live(&self) -> bool {
        self.state() == HolderState::Live
    }

    /// Number of instances built so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns the live instance without building one.
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.load_full()
    }

    /// Returns the live instance, building it with `init` if there is none.
    ///
    /// `init` runs when the holder is `Uninitialized` or `Destroyed`; otherwise it
    /// is dropped unused.
    ///
    /// # Panics
    ///
    /// A panic in `init` propagates to the caller. The lock is released and the
    /// state is left unchanged.
    ///
    /// # Deadlocks
    ///
    /// `init` must not call `instance` on the same holder: the spin lock is not
    /// reentrant.
    pub fn instance(&self, init: impl FnOnce() -> T) -> Arc<T> {
        match self.try_instance(|| Ok::<_, Infallible>(init())) {
            Ok(instance) => instance,
            Err(never) => match never {},
        }
    }

    /// Returns the live instance, building it with the fallible `init` if there is none.
    ///
    /// # Errors
    ///
    /// The error returned by `init`, unchanged. Nothing is retried; the state is
    /// left as it was.
    pub fn try_instance<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        if let Some(live) = self.slot.load_full() {
            return Ok(live);
        }

        let guard = self.lock.lock();

        if let Some(live) = self.slot.load_full() {
            return Ok(live);
        }

        let previous = self.state();
        let instance = Arc::new(init()?);

        self.slot.store(Some(instance.clone()));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.store(HolderState::Live as u8, Ordering::Release);

        drop(guard);

        let type_name = any::type_name::<T>();
        self.trace.emit(&match previous {
            HolderState::Destroyed => HolderEvent::Reconstruct {
                type_name,
                generation,
            },
            _ => HolderEvent::Construct { type_name },
        });

        Ok(instance)
    }

    /// Tears down the live instance (`Live -> Destroyed`).
    ///
    /// Returns `false` if there was no live instance. The instance itself is
    /// dropped once the last outstanding handle to it is gone.
    pub fn destroy(&self) -> bool {
        let guard = self.lock.lock();
        let taken = self.slot.swap(None);
        if taken.is_some() {
            self.state
                .store(HolderState::Destroyed as u8, Ordering::Release);
        }
        drop(guard);

        match taken {
            Some(instance) => {
                self.trace.emit(&HolderEvent::Destroy {
                    type_name: any::type_name::<T>(),
                });
                // Dropped outside the lock: T's destructor may touch this holder.
                drop(instance);
                true
            }
            None => false,
        }
    }

    /// Returns a guard that tears the instance down when dropped.
    ///
    /// Intended to be held by `main` (or a test) so that teardown happens at a
    /// well-defined point instead of at process exit.
    pub fn teardown_guard(&self) -> TeardownGuard<'_, T> {
        TeardownGuard { holder: self }
    }

    /// Set a tracing callback for lifecycle transitions of this holder.
    ///
    /// The callback runs after the holder's lock is released. Every transition
    /// is delivered exactly once, but events from concurrent `instance` and
    /// `destroy` calls may arrive out of order: a `Destroy` can reach the
    /// callback before the `Construct` or `Reconstruct` it follows.
    pub fn set_trace_callback(&self, callback: impl Fn(&HolderEvent) + Send + Sync + 'static) {
        self.trace.set(callback);
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        self.trace.clear();
    }
}

impl<T: Default> RecoverableSingleton<T> {
    /// Returns the live instance, building it with `T::default()` if there is none.
    pub fn instance_default(&self) -> Arc<T> {
        self.instance(T::default)
    }
}

impl<T> Default for RecoverableSingleton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for RecoverableSingleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoverableSingleton")
            .field("state", &self.state())
            .field("generation", &self.generation())
            .field("instance", &self.slot.load_full())
            .finish()
    }
}

/// Tears down a [`RecoverableSingleton`] when dropped.
///
/// Returned by [`RecoverableSingleton::teardown_guard`].
#[must_use = "the instance is torn down as soon as the guard is dropped"]
pub struct TeardownGuard<'a, T> {
    holder: &'a RecoverableSingleton<T>,
}

impl<T> TeardownGuard<'_, T> {
    /// Tears down now instead of at drop.
    pub fn teardown(self) -> bool {
        let holder = self.holder;
        std::mem::forget(self);
        holder.destroy()
    }
}

impl<T> Drop for TeardownGuard<'_, T> {
    fn drop(&mut self) {
        self.holder.destroy();
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
