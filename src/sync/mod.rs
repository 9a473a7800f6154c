//! Synchronization primitives shared by the server layers.
//!
//! - [`SharedLock`]: reader-preferring read/write lock for shared tables.
//! - [`ScopeGuardBarrier`]: gate that lets shutdown wait for in-flight
//!   completion handlers and then turns new ones away.

pub mod barrier;
pub mod shared_lock;

pub use barrier::{OwnedScopeGuard, ScopeGuard, ScopeGuardBarrier};
pub use shared_lock::{SharedGuard, SharedLock, UniqueGuard};
