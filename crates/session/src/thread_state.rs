// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! Per-thread "current load" state (spec.md §3, "Load session").

use std::cell::RefCell;

/// Opaque evaluation-situation marker.
///
/// This subsystem never inspects its value, only saves and restores it
/// around a session — assigning it meaning belongs to the evaluator (an
/// external collaborator), e.g. distinguishing "loading at top level" from
/// "expanding a macro at load time".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalSituation(pub u32);

/// Snapshot of everything a [`crate::LoadSession`] saves on entry and
/// restores on exit.
#[derive(Debug, Clone, Default)]
pub struct LoadState {
    /// Description of the stream currently being loaded (its path, or a
    /// placeholder for an anonymous port), used only for verbose logging.
    pub current_port: Option<String>,
    /// `(outer-port-description, line-number-at-entry)` frames, one per
    /// currently-open session, prepended on entry and popped on exit. Its
    /// length drives verbose-mode indentation; it carries no other
    /// meaning.
    pub history: Vec<(String, u32)>,
    /// Tail of the search path left over from the resolution that found
    /// the current file, so a nested `require` continues from there.
    pub remaining_paths: Vec<String>,
    pub situation: EvalSituation,
}

thread_local! {
    static LOAD_STATE: RefCell<LoadState> = RefCell::new(LoadState::default());
}

/// Read the current thread's load state.
pub fn current() -> LoadState {
    LOAD_STATE.with(|s| s.borrow().clone())
}

/// Depth of the history chain on the current thread (verbose-mode
/// indentation).
pub fn history_depth() -> usize {
    LOAD_STATE.with(|s| s.borrow().history.len())
}

/// Search-path tail left over from the resolution that found the file
/// currently loading on this thread, if any.
pub fn remaining_paths() -> Vec<String> {
    LOAD_STATE.with(|s| s.borrow().remaining_paths.clone())
}

/// Replace the current thread's load state wholesale, returning the
/// previous value so the caller can restore it later.
pub fn install(new_state: LoadState) -> LoadState {
    LOAD_STATE.with(|s| std::mem::replace(&mut s.borrow_mut(), new_state))
}
