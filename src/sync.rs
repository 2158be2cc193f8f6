//! Poison-recovering lock helpers shared by the cache store and the
//! performance ledger.
//!
//! A panic while a guard is held poisons the lock; the guarded state here is
//! either rebuildable (cache entries) or advisory (metric samples), so we
//! recover the inner value and warn instead of propagating the poison.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    component: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn_poisoned(component, op, "rwlock.read");
            poisoned.into_inner()
        }
    }
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    component: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn_poisoned(component, op, "rwlock.write");
            poisoned.into_inner()
        }
    }
}

pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    component: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn_poisoned(component, op, "mutex.lock");
            poisoned.into_inner()
        }
    }
}

fn warn_poisoned(component: &'static str, op: &'static str, lock_kind: &'static str) {
    warn!(
        target: "corriere::sync",
        component,
        op,
        lock_kind,
        "recovered from poisoned lock, guarded state may be stale"
    );
}
