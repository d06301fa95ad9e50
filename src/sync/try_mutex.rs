//! # Non-blocking exclusive lock bound to a cancellation token.
//!
//! [`TryMutex`] serializes critical sections **without ever queuing**: an acquire
//! either succeeds immediately or reports that someone else holds the lock.
//! A slow holder therefore makes later callers skip their turn instead of piling up.
//!
//! ## Rules
//! - `try_lock()` never waits; it polls the lock state exactly once.
//! - Once the bound token is cancelled, every acquire returns [`LockError::Canceled`].
//! - Release is the guard's `Drop`: it runs exactly once per successful acquire,
//!   on every exit path (return, `?`, cancellation, panic).
//! - A holder that panics poisons the lock; later acquires return [`LockError::Poisoned`]
//!   until [`TryMutex::clear_poison`] is called.
//!
//! ## Example
//! ```rust
//! use florister::TryMutex;
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let mtx = TryMutex::new(0u32, token.clone());
//!
//! let mut guard = mtx.try_lock().unwrap().expect("free");
//! *guard += 1;
//! assert!(mtx.try_lock().unwrap().is_none()); // busy, not an error
//! drop(guard);
//!
//! token.cancel();
//! assert!(mtx.try_lock().is_err());
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

use crate::error::LockError;

#[derive(Debug, Default)]
struct Flags {
    held: AtomicBool,
    poisoned: AtomicBool,
}

/// Non-blocking mutex guarding a value of type `T`.
///
/// Cheap to clone: clones share the same lock and the same token.
#[derive(Debug)]
pub struct TryMutex<T> {
    value: Arc<Mutex<T>>,
    flags: Arc<Flags>,
    token: CancellationToken,
}

impl<T> Clone for TryMutex<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            flags: Arc::clone(&self.flags),
            token: self.token.clone(),
        }
    }
}

impl<T> TryMutex<T> {
    /// Creates a lock around `value`, bound to `token`.
    pub fn new(value: T, token: CancellationToken) -> Self {
        Self {
            value: Arc::new(Mutex::new(value)),
            flags: Arc::new(Flags::default()),
            token,
        }
    }

    /// Attempts to acquire the lock once.
    ///
    /// ### Returns
    /// - `Ok(Some(guard))` → acquired; release by dropping the guard
    /// - `Ok(None)` → currently held by someone else
    /// - `Err(LockError::Canceled)` → bound token already cancelled
    /// - `Err(LockError::Poisoned)` → a previous holder panicked
    pub fn try_lock(&self) -> Result<Option<TryMutexGuard<T>>, LockError> {
        if self.token.is_cancelled() {
            return Err(LockError::Canceled);
        }
        if self.flags.poisoned.load(Ordering::Acquire) {
            return Err(LockError::Poisoned);
        }
        match Arc::clone(&self.value).try_lock_owned() {
            Ok(guard) => {
                self.flags.held.store(true, Ordering::Release);
                Ok(Some(TryMutexGuard {
                    guard,
                    flags: Arc::clone(&self.flags),
                }))
            }
            Err(_busy) => Ok(None),
        }
    }

    /// Returns `true` while a guard is alive.
    pub fn is_locked(&self) -> bool {
        self.flags.held.load(Ordering::Acquire)
    }

    /// Returns `true` if a holder panicked while holding the lock.
    pub fn is_poisoned(&self) -> bool {
        self.flags.poisoned.load(Ordering::Acquire)
    }

    /// Clears the poisoned flag, making the lock acquirable again.
    pub fn clear_poison(&self) {
        self.flags.poisoned.store(false, Ordering::Release);
    }
}

/// Proof of exclusive access; dropping it releases the lock.
#[derive(Debug)]
pub struct TryMutexGuard<T> {
    guard: OwnedMutexGuard<T>,
    flags: Arc<Flags>,
}

impl<T> Deref for TryMutexGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for TryMutexGuard<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for TryMutexGuard<T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.flags.poisoned.store(true, Ordering::Release);
        }
        self.flags.held.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_is_not_an_error() {
        let mtx = TryMutex::new((), CancellationToken::new());
        let guard = mtx.try_lock().unwrap();
        assert!(guard.is_some());
        assert!(mtx.is_locked());

        let second = mtx.try_lock();
        assert!(matches!(second, Ok(None)));
    }

    #[test]
    fn test_release_on_drop() {
        let mtx = TryMutex::new(1u8, CancellationToken::new());
        {
            let mut guard = mtx.try_lock().unwrap().unwrap();
            *guard = 2;
        }
        assert!(!mtx.is_locked());

        let guard = mtx.try_lock().unwrap().unwrap();
        assert_eq!(*guard, 2);
    }

    #[test]
    fn test_clones_share_the_lock() {
        let a = TryMutex::new((), CancellationToken::new());
        let b = a.clone();
        let _held = a.try_lock().unwrap().unwrap();
        assert!(b.try_lock().unwrap().is_none());
    }

    #[test]
    fn test_cancelled_token_wins_even_when_free() {
        let token = CancellationToken::new();
        let mtx = TryMutex::new((), token.clone());
        token.cancel();
        assert_eq!(mtx.try_lock().err(), Some(LockError::Canceled));
    }

    #[test]
    fn test_cancel_does_not_revoke_held_guard() {
        let token = CancellationToken::new();
        let mtx = TryMutex::new(5u8, token.clone());
        let guard = mtx.try_lock().unwrap().unwrap();
        token.cancel();
        assert_eq!(*guard, 5);
        drop(guard);
        assert!(!mtx.is_locked());
    }

    #[tokio::test]
    async fn test_panicking_holder_poisons() {
        let mtx = TryMutex::new((), CancellationToken::new());
        let held = mtx.clone();
        let res = tokio::spawn(async move {
            let _guard = held.try_lock().unwrap().unwrap();
            let failing = true;
            if failing {
                panic!("holder failed");
            }
        })
        .await;
        assert!(res.is_err());

        assert!(mtx.is_poisoned());
        assert!(!mtx.is_locked());
        assert_eq!(mtx.try_lock().err(), Some(LockError::Poisoned));

        mtx.clear_poison();
        assert!(mtx.try_lock().unwrap().is_some());
    }
}
