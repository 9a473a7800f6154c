//! Shutdown barrier for in-flight asynchronous completions.
//!
//! Completion handlers call [`ScopeGuardBarrier::try_enter`] before touching
//! shared resources and abandon their work when it returns `None`. The
//! shutdown path calls [`ScopeGuardBarrier::close`], which waits until every
//! granted guard is released and then refuses all later entries.
//!
//! Entry and exit are a single compare-and-swap or `fetch_sub` on the fast
//! path. `close` spins; it returns only once callers drop their guards.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::thread;

use tracing::debug;

/// Counter value of a closed barrier.
const CLOSED: isize = -1;

/// Spins this many times before yielding the thread while waiting.
const SPIN_LIMIT: usize = 10;

/// Refcounted gate that can be closed once all holders have left.
///
/// The counter is the number of live guards while open, and `-1` once
/// closed. A closed barrier never reopens.
///
/// # Examples
///
/// ```
/// use rttp_wire::sync::ScopeGuardBarrier;
///
/// let barrier = ScopeGuardBarrier::new();
/// {
///     let guard = barrier.try_enter();
///     assert!(guard.is_some());
///     assert_eq!(barrier.active(), 1);
/// }
/// barrier.close();
/// assert!(barrier.try_enter().is_none());
/// ```
pub struct ScopeGuardBarrier {
    count: AtomicIsize,
}

impl Default for ScopeGuardBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeGuardBarrier {
    /// Creates an open barrier with no holders.
    pub const fn new() -> Self {
        Self {
            count: AtomicIsize::new(0),
        }
    }

    /// Registers a holder, or returns `None` if the barrier is closed.
    ///
    /// Never blocks. The registration lasts until the guard drops.
    pub fn try_enter(&self) -> Option<ScopeGuard<'_>> {
        self.enter().then(|| ScopeGuard { barrier: self })
    }

    /// Like [`try_enter`](Self::try_enter), but the guard owns a handle to
    /// the barrier and can be moved into `'static` tasks.
    pub fn try_enter_owned(self: &Arc<Self>) -> Option<OwnedScopeGuard> {
        self.enter().then(|| OwnedScopeGuard {
            barrier: Arc::clone(self),
        })
    }

    /// Waits until no guards are held, then closes the barrier for good.
    ///
    /// Returns immediately if already closed. A guard that is never dropped
    /// makes this spin forever.
    pub fn close(&self) {
        let mut failures = 0;
        loop {
            match self
                .count
                .compare_exchange_weak(0, CLOSED, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    debug!("scope barrier closed");
                    return;
                }
                Err(current) if current < 0 => return,
                Err(_) => spin_wait(&mut failures),
            }
        }
    }

    /// Returns `true` once [`close`](Self::close) has completed.
    pub fn is_closed(&self) -> bool {
        self.count.load(Ordering::Acquire) < 0
    }

    /// Number of guards currently held; `0` when closed.
    pub fn active(&self) -> usize {
        self.count.load(Ordering::Acquire).max(0) as usize
    }

    fn enter(&self) -> bool {
        let mut current = self.count.load(Ordering::Acquire);
        while current >= 0 {
            match self.count.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => {
                    current = actual;
                    std::hint::spin_loop();
                }
            }
        }
        false
    }

    fn leave(&self) {
        self.count.fetch_sub(1, Ordering::Release);
    }
}

impl fmt::Debug for ScopeGuardBarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuardBarrier")
            .field("count", &self.count.load(Ordering::Relaxed))
            .finish()
    }
}

fn spin_wait(failures: &mut usize) {
    *failures = failures.saturating_add(1);
    if *failures <= SPIN_LIMIT {
        std::hint::spin_loop();
    } else {
        thread::yield_now();
    }
}

/// Registration in a [`ScopeGuardBarrier`], released on drop.
#[must_use = "the registration ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    barrier: &'a ScopeGuardBarrier,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.barrier.leave();
    }
}

/// Registration in an `Arc`-shared [`ScopeGuardBarrier`], released on drop.
#[must_use = "the registration ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct OwnedScopeGuard {
    barrier: Arc<ScopeGuardBarrier>,
}

impl Drop for OwnedScopeGuard {
    fn drop(&mut self) {
        self.barrier.leave();
    }
}
