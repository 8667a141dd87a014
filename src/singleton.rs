//! Non-recoverable singleton holder.
//!
//! The instance is built on first access and lives as long as the holder. There is
//! no destroy operation and no attempt to rebuild anything; when the holder is a
//! `static`, the instance lives until the process exits.

use std::fmt;

use once_cell::sync::OnceCell;

/// Lazily-initialized single instance of `T`.
///
/// The first successful initializer wins. Initializers passed to later calls are
/// never run, so "constructor arguments" are whatever the first closure captured.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::Singleton;
///
/// struct Config {
///     name: String,
/// }
///
/// static CONFIG: Singleton<Config> = Singleton::new();
///
/// let first = CONFIG.instance(|| Config { name: "primary".into() });
/// let second = CONFIG.instance(|| Config { name: "ignored".into() });
///
/// assert_eq!(first.name, "primary");
/// assert!(std::ptr::eq(first, second));
/// ```
pub struct Singleton<T> {
    cell: OnceCell<T>,
}

impl<T> Singleton<T> {
    /// Creates an empty holder. Usable in `static` items.
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Returns the instance, building it with `init` on the first call.
    ///
    /// Concurrent first callers block until one of them has finished `init`.
    ///
    /// # Panics
    ///
    /// A panic in `init` propagates to the caller and leaves the holder empty.
    /// `init` must not access the same holder.
    pub fn instance(&self, init: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(init)
    }

    /// Returns the instance, building it with the fallible `init` on the first call.
    ///
    /// # Errors
    ///
    /// The error returned by `init`, unchanged. The holder stays empty and a later
    /// call may try again with another initializer.
    pub fn try_instance<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        self.cell.get_or_try_init(init)
    }

    /// Returns the instance if it has been built.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Returns whether the instance has been built.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: Default> Singleton<T> {
    /// Returns the instance, building it with `T::default()` on the first call.
    pub fn instance_default(&self) -> &T {
        self.instance(T::default)
    }
}

impl<T> Default for Singleton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Singleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton")
            .field("instance", &self.cell.get())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
