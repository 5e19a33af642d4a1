// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! Thread-liveness token used for loader takeover (spec.md §4.4 "DSO
//! takeover", §4.5 "prior loader died").
//!
//! There is no portable way to ask "is OS thread T still alive" from safe
//! Rust without joining it, and joining isn't available to a registry that
//! doesn't own the thread. The idiomatic substitute: each thread that
//! begins driving a record's state machine holds a fresh [`ThreadToken`]
//! for the duration of that drive (as a local, so it drops on return *or*
//! on unwind). The record stores only the corresponding [`ThreadTokenRef`]
//! (a `Weak`); "the loader died" is exactly `strong_count() == 0`.

use std::sync::{Arc, Weak};

/// Held by the thread currently driving a state machine.
#[derive(Clone, Default)]
pub struct ThreadToken(Arc<()>);

impl ThreadToken {
    pub fn new() -> Self {
        Self(Arc::new(()))
    }

    /// The weak handle a record stores as its "loader" field.
    pub fn downgrade(&self) -> ThreadTokenRef {
        ThreadTokenRef(Arc::downgrade(&self.0))
    }
}

/// Stored by a record to identify (without owning) its current loader.
#[derive(Clone)]
pub struct ThreadTokenRef(Weak<()>);

impl ThreadTokenRef {
    /// True while the thread that produced this reference is still driving
    /// its load (has not returned or unwound past the owning `ThreadToken`).
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// True if this reference was downgraded from `token`.
    pub fn is(&self, token: &ThreadToken) -> bool {
        self.0.ptr_eq(&Arc::downgrade(&token.0))
    }
}

#[cfg(test)]
#[path = "thread_token_tests.rs"]
mod tests;
