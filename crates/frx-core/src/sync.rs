#![forbid(unsafe_code)]

//! Lock helpers shared by the subscription machinery.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

/// Lock `mutex`, recovering the guard if a user callback panicked while
/// holding it. Every critical section in this crate only swaps an `Option`
/// or pushes/pops a `Vec`, so the data behind a poisoned lock is still valid.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Like [`lock`], but returns `None` instead of blocking when the mutex is
/// held, including by the calling thread.
pub(crate) fn try_lock<T: ?Sized>(mutex: &Mutex<T>) -> Option<MutexGuard<'_, T>> {
    match mutex.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}
