// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! The Dynamic Object Registry: `dynamic-load`'s intern-by-path state
//! machine (spec.md §4.4).

use crate::dlshim::DlShim;
use crate::initname::derive_init_name;
use parking_lot::{Condvar, Mutex};
use rt_core::{LoadError, ThreadToken, ThreadTokenRef};
use rt_pathresolve::{find_file, SearchPath, SuffixList};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsoState {
    None,
    Loaded,
    Initialized,
}

struct RecordInner<H> {
    state: DsoState,
    handle: Option<Arc<H>>,
    resolved_symbol: Option<String>,
    loader: Option<ThreadTokenRef>,
}

/// One interned shared object, identified by its canonical path. Never
/// removed from the registry once created, and its handle is never closed
/// once it reaches [`DsoState::Loaded`] — matching spec.md §4.4's "the
/// record is never removed" invariant.
pub struct DsoRecord<H> {
    path: PathBuf,
    init_name: String,
    inner: Mutex<RecordInner<H>>,
    condition: Condvar,
}

impl<H> DsoRecord<H> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> DsoState {
        self.inner.lock().state
    }
}

/// Interns [`DsoRecord`]s by canonical path and drives each one's
/// NONE → LOADED → INITIALIZED state machine exactly once, even when
/// multiple threads race to `dynamic-load` the same file.
pub struct DsoRegistry<S: DlShim> {
    shim: S,
    records: Mutex<HashMap<PathBuf, Arc<DsoRecord<S::Handle>>>>,
}

impl<S: DlShim> DsoRegistry<S> {
    pub fn new(shim: S) -> Self {
        Self { shim, records: Mutex::new(HashMap::new()) }
    }

    /// `dyn-load(filename, explicit-init-name-or-none)`.
    pub fn dynamic_load(
        &self,
        filename: &str,
        dynload_paths: &SearchPath,
        suffixes: &SuffixList,
        explicit_init_name: Option<&str>,
    ) -> Result<(), LoadError> {
        let resolved = find_file(filename, dynload_paths, suffixes, false)?
            .ok_or_else(|| LoadError::FileNotFound { filename: filename.to_string(), searched: dynload_paths.snapshot() })?;
        let canonical = std::fs::canonicalize(&resolved)
            .map_err(|source| LoadError::FileOpenFailed { path: resolved.display().to_string(), source })?;
        let init_name = derive_init_name(filename, explicit_init_name);

        let token = ThreadToken::new();
        let (record, freshly_installed) = self.intern(canonical.clone(), init_name, &token);

        if !freshly_installed {
            let mut guard = record.inner.lock();
            loop {
                if guard.state == DsoState::Initialized {
                    return Ok(());
                }
                match &guard.loader {
                    None => {
                        guard.loader = Some(token.downgrade());
                        break;
                    }
                    Some(loader) if !loader.is_alive() => {
                        guard.loader = Some(token.downgrade());
                        break;
                    }
                    Some(_) => record.condition.wait(&mut guard),
                }
            }
        }

        self.drive(&record)
    }

    fn intern(&self, canonical: PathBuf, init_name: String, token: &ThreadToken) -> (Arc<DsoRecord<S::Handle>>, bool) {
        let mut records = self.records.lock();
        if let Some(existing) = records.get(&canonical) {
            return (existing.clone(), false);
        }
        let record = Arc::new(DsoRecord {
            path: canonical.clone(),
            init_name,
            inner: Mutex::new(RecordInner {
                state: DsoState::None,
                handle: None,
                resolved_symbol: None,
                loader: Some(token.downgrade()),
            }),
            condition: Condvar::new(),
        });
        records.insert(canonical, record.clone());
        (record, true)
    }

    fn drive(&self, record: &Arc<DsoRecord<S::Handle>>) -> Result<(), LoadError> {
        // `drive_inner` runs the shim's `open`/`call` with no record lock
        // held, and `call` may run an initializer that re-enters this
        // subsystem (spec.md §4.4). If either panics instead of returning
        // `Err`, `_loader` still clears `loader` and wakes any thread
        // parked in the wait loop above — a loader that dies mid-drive must
        // not leave a waiter stuck forever (spec.md §7, §9 "loader death").
        let _loader = LoaderGuard { record };
        self.drive_inner(record)
    }

    fn drive_inner(&self, record: &Arc<DsoRecord<S::Handle>>) -> Result<(), LoadError> {
        if record.state() == DsoState::None {
            let handle = self.shim.open(&record.path)?;
            let bare = record.init_name.trim_start_matches('_');
            let resolved_symbol = if self.shim.has_symbol(&handle, bare) {
                bare.to_string()
            } else if self.shim.has_symbol(&handle, &record.init_name) {
                record.init_name.clone()
            } else {
                self.shim.close(handle);
                return Err(LoadError::InitSymbolMissing {
                    symbol: record.init_name.clone(),
                    path: record.path.display().to_string(),
                });
            };

            let mut guard = record.inner.lock();
            guard.handle = Some(Arc::new(handle));
            guard.resolved_symbol = Some(resolved_symbol);
            guard.state = DsoState::Loaded;
            drop(guard);
        }

        let pending_init = {
            let guard = record.inner.lock();
            match (guard.state, &guard.handle, &guard.resolved_symbol) {
                (DsoState::Loaded, Some(handle), Some(symbol)) => Some((handle.clone(), symbol.clone())),
                _ => None,
            }
        };

        if let Some((handle, symbol)) = pending_init {
            // Outside the record mutex: the initializer may itself call
            // back into this subsystem (spec.md §4.4, "reentrant loads").
            self.shim.call(&handle, &symbol)?;

            let mut guard = record.inner.lock();
            guard.state = DsoState::Initialized;
        }

        Ok(())
    }
}

/// Clears a record's `loader` and wakes waiters on drop — on normal return,
/// on an `Err` bubbling through `?`, or on a panic unwinding through
/// `drive_inner`. Mirrors `rt_registry::ClaimGuard`'s discipline, applied
/// here to a DSO record's loader slot instead of a feature claim.
struct LoaderGuard<'a, H> {
    record: &'a Arc<DsoRecord<H>>,
}

impl<H> Drop for LoaderGuard<'_, H> {
    fn drop(&mut self) {
        let mut guard = self.record.inner.lock();
        guard.loader = None;
        self.record.condition.notify_all();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
