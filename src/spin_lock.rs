//! Minimal busy-waiting mutual exclusion.
//!
//! [`SpinLock`] guards the slow path of [`RecoverableSingleton`](crate::RecoverableSingleton).
//! It is a bare test-and-set flag: no fairness among waiters, no backoff, no timeout.

use std::hint;
use std::sync::atomic::{AtomicBool, Ordering};

/// A test-and-set spin lock.
///
/// The lock protects no data of its own; it orders the writes made between
/// [`acquire`](SpinLock::acquire) and [`release`](SpinLock::release) before the
/// next successful acquire.
///
/// # Reentrancy
///
/// The lock is NOT reentrant. Acquiring it twice on the same thread spins forever.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::SpinLock;
///
/// static LOCK: SpinLock = SpinLock::new();
///
/// LOCK.acquire();
/// assert!(LOCK.is_locked());
/// LOCK.release();
///
/// {
///     let _guard = LOCK.lock();
///     assert!(!LOCK.try_acquire());
/// }
/// assert!(!LOCK.is_locked());
/// ```
#[derive(Debug, Default)]
pub struct SpinLock {
    locked: AtomicBool,
}

impl SpinLock {
    /// Creates an unlocked lock.
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Spins until the calling thread owns the lock.
    pub fn acquire(&self) {
        while self.locked.swap(true, Ordering::Acquire) {
            hint::spin_loop();
        }
    }

    /// Makes a single attempt to take the lock.
    ///
    /// Returns `true` if the calling thread now owns the lock.
    pub fn try_acquire(&self) -> bool {
        !self.locked.swap(true, Ordering::Acquire)
    }

    /// Releases the lock.
    ///
    /// Must only be called by the thread that acquired it.
    pub fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    /// Returns whether some thread currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Acquires the lock and returns a guard releasing it on drop.
    ///
    /// Prefer this over the raw pair: the lock is released even if the
    /// critical section panics.
    pub fn lock(&self) -> SpinGuard<'_> {
        self.acquire();
        SpinGuard { lock: self }
    }
}

/// RAII guard returned by [`SpinLock::lock`].
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::SpinLock;

    use std::cell::UnsafeCell;
    use std::sync::Arc;
    use std::thread;

    struct Counter {
        lock: SpinLock,
        value: UnsafeCell<u64>,
    }

    // SAFETY: `value` is only touched while `lock` is held.
    unsafe impl Sync for Counter {}

    #[test]
    fn test_acquire_release() {
        let lock = SpinLock::new();
        assert!(!lock.is_locked());

        lock.acquire();
        assert!(lock.is_locked());

        lock.release();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_try_acquire_fails_while_held() {
        let lock = SpinLock::new();
        assert!(lock.try_acquire());
        assert!(!lock.try_acquire());
        lock.release();
        assert!(lock.try_acquire());
        lock.release();
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = SpinLock::default();
        {
            let _guard = lock.lock();
            assert!(lock.is_locked());
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let lock = Arc::new(SpinLock::new());
        let lock_clone = lock.clone();

        let result = thread::spawn(move || {
            let _guard = lock_clone.lock();
            panic!("critical section failed");
        })
        .join();

        assert!(result.is_err());
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_mutual_exclusion() {
        const THREADS: usize = 8;
        const ROUNDS: u64 = 1_000;

        let counter = Arc::new(Counter {
            lock: SpinLock::new(),
            value: UnsafeCell::new(0),
        });

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        counter.lock.acquire();
                        // SAFETY: lock held.
                        unsafe { *counter.value.get() += 1 };
                        counter.lock.release();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let _guard = counter.lock.lock();
        // SAFETY: lock held.
        assert_eq!(unsafe { *counter.value.get() }, THREADS as u64 * ROUNDS);
    }
}
