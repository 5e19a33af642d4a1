// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! The Feature Registry: `require`/`provide`/`provided?` over a shared set
//! of claimed-and-completed "features" (spec.md §4.3).

use parking_lot::{Condvar, Mutex};
use rt_core::{FeatureName, LoadError};
use std::collections::{HashMap, HashSet};
use std::thread::ThreadId;

/// Outcome of a [`FeatureRegistry::require`] call that didn't error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequireOutcome {
    /// Already in `provided`; the loader closure was never called.
    Already,
    /// This call claimed the feature, ran the loader, and it succeeded.
    JustLoaded,
}

#[derive(Default)]
struct Inner {
    provided: HashSet<FeatureName>,
    /// feature -> the thread currently loading it.
    providing: HashMap<FeatureName, ThreadId>,
    /// thread -> the single feature it is blocked waiting on.
    waiting: HashMap<ThreadId, FeatureName>,
}

/// Tracks which features have been `provide`d, which are mid-load, and who
/// is waiting on whom — enough to detect a `require` cycle without ever
/// deadlocking on it (spec.md §4.3).
#[derive(Default)]
pub struct FeatureRegistry {
    inner: Mutex<Inner>,
    condition: Condvar,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the built-in "already provided" set at subsystem
    /// initialization time (spec.md §6, "Built-in provided seed set").
    pub fn seed(&self, features: impl IntoIterator<Item = FeatureName>) {
        let mut inner = self.inner.lock();
        inner.provided.extend(features);
    }

    /// `require(feature, loader)`: claim `feature` under the registry
    /// mutex (spec.md §4.3's loop), then — outside the lock — run `loader`
    /// (which performs the actual `load(feature + ".scm", ...)`). The
    /// claim is always released and the condition always broadcast,
    /// whether `loader` succeeds or fails.
    pub fn require(
        &self,
        feature: &FeatureName,
        loader: impl FnOnce() -> Result<(), LoadError>,
    ) -> Result<RequireOutcome, LoadError> {
        let self_id = std::thread::current().id();
        let mut guard = self.inner.lock();

        loop {
            if guard.provided.contains(feature.as_str()) {
                return Ok(RequireOutcome::Already);
            }

            match guard.providing.get(feature.as_str()).copied() {
                None => {
                    guard.providing.insert(feature.clone(), self_id);
                    break;
                }
                Some(owner) if owner == self_id => {
                    return Err(LoadError::RequireCycle { feature: feature.to_string() });
                }
                Some(owner) => {
                    if cycles_back_to(&guard, owner, self_id) {
                        return Err(LoadError::RequireCycle { feature: feature.to_string() });
                    }
                    guard.waiting.insert(self_id, feature.clone());
                    self.condition.wait(&mut guard);
                    guard.waiting.remove(&self_id);
                }
            }
        }

        drop(guard);

        // `loader` runs arbitrary embedder/evaluator code with no core lock
        // held (spec.md §5). If it panics instead of returning `Err`, this
        // guard's `Drop` still releases the claim and wakes any thread
        // parked in `self.condition.wait` above — spec.md §7's "feature...
        // claims are always retracted on failure" applies to unwinding too.
        let _claim = ClaimGuard { registry: self, feature: feature.clone() };
        let result = loader();

        result.map(|_| RequireOutcome::JustLoaded)
    }

    /// `provide(feature)`: idempotent. Appends `feature` to `provided` and
    /// clears any in-progress claim for it.
    pub fn provide(&self, feature: &FeatureName) {
        let mut guard = self.inner.lock();
        guard.provided.insert(feature.clone());
        guard.providing.remove(feature.as_str());
        self.condition.notify_all();
    }

    /// `provided?(feature)`.
    pub fn provided(&self, feature: &FeatureName) -> bool {
        self.inner.lock().provided.contains(feature.as_str())
    }

    /// Is `feature` currently mid-load by some thread? Used by the
    /// Autoload Resolver's benign-recursion short-circuit (spec.md §4.5).
    pub fn is_providing(&self, feature: &FeatureName) -> bool {
        self.inner.lock().providing.contains_key(feature.as_str())
    }
}

/// Releases a `require` claim and wakes waiters on drop, whether that drop
/// happens via normal return, an `Err` bubbling through `?`, or a panic
/// unwinding through `loader()` — the same scope-guard discipline as
/// `rt_session::LoadSession`'s `Drop` impl, applied here to the registry's
/// claim instead of a stream lock.
struct ClaimGuard<'a> {
    registry: &'a FeatureRegistry,
    feature: FeatureName,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        let mut guard = self.registry.inner.lock();
        guard.providing.remove(self.feature.as_str());
        self.registry.condition.notify_all();
    }
}

/// Walk the wait-for chain starting at `owner`: does it lead back to
/// `target`? Each thread waits on at most one feature, so the relation is a
/// partial function and this walk visits each `providing` entry at most
/// once (spec.md §4.3).
fn cycles_back_to(inner: &Inner, owner: ThreadId, target: ThreadId) -> bool {
    let mut p = owner;
    loop {
        let Some(g) = inner.waiting.get(&p) else {
            return false;
        };
        let Some(&q) = inner.providing.get(g.as_str()) else {
            return false;
        };
        if q == target {
            return true;
        }
        p = q;
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
