// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! The autoload record: a promise that `name` will become bound once
//! `target` is loaded (spec.md §3, §4.5).

use parking_lot::{Condvar, Mutex};
use rt_core::{FeatureName, ThreadTokenRef};
use std::thread::ThreadId;

struct RecordInner<V> {
    loaded: bool,
    value: Option<V>,
    locker: Option<(ThreadId, ThreadTokenRef)>,
}

/// One autoload binding. `module` and `import_from` are opaque module
/// handles supplied by the embedding [`rt_core::Evaluator`]; this crate
/// never inspects them, only threads them through.
pub struct AutoloadRecord<M, V> {
    pub name: String,
    pub module: M,
    pub target: FeatureName,
    pub import_from: Option<M>,
    inner: Mutex<RecordInner<V>>,
    condition: Condvar,
}

impl<M, V: Clone> AutoloadRecord<M, V> {
    pub fn new(name: impl Into<String>, module: M, target: FeatureName, import_from: Option<M>) -> Self {
        Self {
            name: name.into(),
            module,
            target,
            import_from,
            inner: Mutex::new(RecordInner { loaded: false, value: None, locker: None }),
            condition: Condvar::new(),
        }
    }

    /// Fast path: a value already resolved, read without the record mutex
    /// doing anything but a snapshot copy.
    pub(crate) fn loaded_value(&self) -> Option<V> {
        let guard = self.inner.lock();
        guard.loaded.then(|| guard.value.clone()).flatten()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.lock().loaded
    }

    /// True if this record's locker is either unset or the calling thread
    /// — the condition under which the benign-recursion short-circuit
    /// applies (spec.md §4.5).
    pub(crate) fn locker_is_benign(&self, self_id: ThreadId) -> bool {
        match &self.inner.lock().locker {
            None => true,
            Some((id, _)) => *id == self_id,
        }
    }

    /// Claim the record for `self_id`/`token`, waiting out any other live
    /// locker. Returns `Ok(None)` once claimed, `Ok(Some(value))` if the
    /// record became loaded while waiting, or `Err(())` if the caller is
    /// already its own locker (pathological self-recursion the benign
    /// short-circuit should normally have caught).
    pub(crate) fn claim(
        &self,
        self_id: ThreadId,
        token_ref: ThreadTokenRef,
    ) -> Result<Option<V>, ()> {
        let mut guard = self.inner.lock();
        loop {
            if guard.loaded {
                return Ok(guard.value.clone());
            }
            match &guard.locker {
                None => {
                    guard.locker = Some((self_id, token_ref));
                    return Ok(None);
                }
                Some((id, _)) if *id == self_id => return Err(()),
                Some((_, loader)) if !loader.is_alive() => {
                    guard.locker = Some((self_id, token_ref));
                    return Ok(None);
                }
                _ => self.condition.wait(&mut guard),
            }
        }
    }

    pub(crate) fn publish(&self, value: V) {
        let mut guard = self.inner.lock();
        guard.loaded = true;
        guard.value = Some(value);
        guard.locker = None;
        self.condition.notify_all();
    }

    pub(crate) fn release_locker(&self) {
        let mut guard = self.inner.lock();
        guard.locker = None;
        self.condition.notify_all();
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
