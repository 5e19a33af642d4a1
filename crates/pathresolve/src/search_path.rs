// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! Load-path list: an ordered sequence of directories, shared across
//! threads and mutated only through `prepend`/`append`.

use parking_lot::Mutex;
use std::sync::Arc;

/// A shared, mutable directory search path.
///
/// Readers never see a live reference to the list: [`SearchPath::snapshot`]
/// copies it under the path mutex, so an in-progress [`crate::find_file`]
/// call is never perturbed by concurrent mutation (spec.md §3, "Load-path
/// snapshot").
#[derive(Clone, Default)]
pub struct SearchPath {
    dirs: Arc<Mutex<Vec<String>>>,
}

impl SearchPath {
    pub fn new(dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { dirs: Arc::new(Mutex::new(dirs.into_iter().map(Into::into).collect())) }
    }

    /// Copy the current list. Safe to iterate without holding the path
    /// mutex.
    pub fn snapshot(&self) -> Vec<String> {
        self.dirs.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.lock().is_empty()
    }

    pub fn prepend(&self, dir: impl Into<String>) {
        self.dirs.lock().insert(0, dir.into());
    }

    pub fn append(&self, dir: impl Into<String>) {
        self.dirs.lock().push(dir.into());
    }

    /// `add-load-path(dir, after?)`.
    pub fn add(&self, dir: impl Into<String>, after: bool) {
        if after {
            self.append(dir);
        } else {
            self.prepend(dir);
        }
    }

    /// Overwrite the list wholesale, used by `find_file` to leave the
    /// "find next" tail in place after a hit, or to empty it on a miss.
    pub fn replace(&self, dirs: Vec<String>) {
        *self.dirs.lock() = dirs;
    }
}

#[cfg(test)]
#[path = "search_path_tests.rs"]
mod tests;
