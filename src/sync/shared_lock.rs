//! Reader-preferring read/write lock built on a mutex and a condition variable.
//!
//! New readers are admitted whenever no writer holds the lock, even while a
//! writer is waiting, so a steady stream of readers can starve writers. This
//! suits rarely written, frequently read tables such as route maps.

use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct State {
    readers: usize,
    writer: bool,
}

/// A reader-preferring read/write lock protecting a `T`.
///
/// Acquisition returns a guard; the lock is released when the guard drops,
/// on every exit path of the holder's scope.
///
/// # Examples
///
/// ```
/// use rttp_wire::sync::SharedLock;
///
/// let routes = SharedLock::new(vec!["/"]);
/// {
///     let a = routes.shared_lock();
///     let b = routes.shared_lock();
///     assert_eq!(a.len() + b.len(), 2);
/// }
/// routes.unique_lock().push("/health");
/// assert_eq!(routes.shared_lock().len(), 2);
/// ```
pub struct SharedLock<T: ?Sized = ()> {
    state: Mutex<State>,
    changed: Condvar,
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` is serialized by `state`: any number of `&T`
// while `readers > 0`, or a single `&mut T` while `writer` is set.
unsafe impl<T: ?Sized + Send> Send for SharedLock<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for SharedLock<T> {}

impl<T> SharedLock<T> {
    /// Creates an unlocked lock around `data`.
    pub fn new(data: T) -> Self {
        Self {
            state: Mutex::new(State::default()),
            changed: Condvar::new(),
            data: UnsafeCell::new(data),
        }
    }

    /// Consumes the lock and returns the protected value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: Default> Default for SharedLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> SharedLock<T> {
    // The counters are always left consistent, so a poisoned mutex is still usable.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks while a writer holds the lock, then registers a reader.
    ///
    /// Waiting writers are not considered. Acquiring again on the same thread
    /// while holding a [`UniqueGuard`] deadlocks.
    pub fn shared_lock(&self) -> SharedGuard<'_, T> {
        let mut state = self.state();
        while state.writer {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.readers += 1;
        SharedGuard { lock: self }
    }

    /// Blocks while a writer holds the lock or any reader is registered,
    /// then takes exclusive ownership.
    pub fn unique_lock(&self) -> UniqueGuard<'_, T> {
        let mut state = self.state();
        while state.writer || state.readers > 0 {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.writer = true;
        UniqueGuard { lock: self }
    }

    /// Returns a mutable reference without locking; `&mut self` proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    fn release_shared(&self) {
        let mut state = self.state();
        state.readers -= 1;
        if state.readers == 0 {
            self.changed.notify_all();
        }
    }

    fn release_unique(&self) {
        let mut state = self.state();
        state.writer = false;
        self.changed.notify_all();
    }
}

impl<T: ?Sized> fmt::Debug for SharedLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("SharedLock")
            .field("readers", &state.readers)
            .field("writer", &state.writer)
            .finish_non_exhaustive()
    }
}

/// Shared access to the data of a [`SharedLock`]. Released on drop.
#[must_use = "the shared lock is released as soon as the guard is dropped"]
pub struct SharedGuard<'a, T: ?Sized> {
    lock: &'a SharedLock<T>,
}

impl<T: ?Sized> Deref for SharedGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this guard is a registered reader, so no writer exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for SharedGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_shared();
    }
}

/// Exclusive access to the data of a [`SharedLock`]. Released on drop.
#[must_use = "the unique lock is released as soon as the guard is dropped"]
pub struct UniqueGuard<'a, T: ?Sized> {
    lock: &'a SharedLock<T>,
}

impl<T: ?Sized> Deref for UniqueGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this guard holds the writer flag, so no other access exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for UniqueGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as above; `&mut self` prevents aliasing through this guard.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for UniqueGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_unique();
    }
}
