// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! The Load Session: the scoped context around reading and evaluating one
//! stream (spec.md §4.2).

use crate::thread_state::{self, LoadState};
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use rt_core::{Evaluator, ReadExpr};
use std::sync::Arc;

/// Scoped load session. Locks `stream` for its entire lifetime and
/// installs a new thread-local [`LoadState`] on construction; both are
/// undone by `Drop`, which runs on every exit path — normal return, an
/// error propagated with `?`, or unwinding — so there is exactly one
/// restore no matter how the session ends (spec.md §4.2 step 4, and the
/// "scoped cleanup" discipline of spec.md §9).
pub struct LoadSession<R> {
    // Declared first so it unlocks *after* `Drop::drop` restores the
    // thread-local state below, matching the "restore, then close/unlock"
    // order spec.md §4.2 describes (field destructors run in declaration
    // order after the explicit `Drop` body).
    guard: ArcMutexGuard<RawMutex, R>,
    saved: LoadState,
}

impl<R: ReadExpr> LoadSession<R> {
    /// Open a session over `stream`, tagged with `port_desc` for logging,
    /// carrying `remaining_paths` (the unconsumed tail of whatever search
    /// located this stream) into the new thread-local frame.
    pub fn open(stream: &Arc<Mutex<R>>, port_desc: impl Into<String>, remaining_paths: Vec<String>) -> Self {
        let guard = stream.lock_arc();
        let port_desc = port_desc.into();
        let saved = thread_state::current();

        if tracing::enabled!(tracing::Level::DEBUG) {
            let indent = " ".repeat(saved.history.len());
            tracing::debug!(";;{}Loading {}...", indent, port_desc);
        }

        let mut history = saved.history.clone();
        history.push((saved.current_port.clone().unwrap_or_else(|| "<unknown>".into()), 0));

        thread_state::install(LoadState {
            current_port: Some(port_desc),
            history,
            remaining_paths,
            situation: saved.situation,
        });

        Self { guard, saved }
    }

    /// Drive the evaluator to end-of-stream, evaluating each expression
    /// read in `module` in turn. Returns the value of the last expression,
    /// or `None` if the stream was empty.
    pub fn run<E: Evaluator>(
        &mut self,
        evaluator: &E,
        module: &E::Module,
        case_fold: bool,
    ) -> Result<Option<E::Value>, E::Error> {
        let mut last = None;
        while let Some(value) = evaluator.read_and_eval(&mut *self.guard, module, case_fold)? {
            last = Some(value);
        }
        Ok(last)
    }
}

impl<R> Drop for LoadSession<R> {
    fn drop(&mut self) {
        thread_state::install(self.saved.clone());
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
