// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! The dynamic-linker shim seam: `dlopen`/`dlsym`/`dlclose` behind a trait,
//! grounded on `examples/other_examples/klebz-dynamic_reload`'s
//! `libloading::Library` usage (spec.md §4.4).

use rt_core::LoadError;
use std::path::{Path, PathBuf};

/// Abstraction over the native dynamic linker. Exists so the state machine
/// in [`crate::registry::DsoRegistry`] can be exercised with an in-memory
/// fake instead of real `.so`/`.dylib`/`.dll` files.
pub trait DlShim: Send + Sync {
    type Handle: Send + Sync;

    fn open(&self, path: &Path) -> Result<Self::Handle, LoadError>;
    fn has_symbol(&self, handle: &Self::Handle, name: &str) -> bool;
    fn call(&self, handle: &Self::Handle, name: &str) -> Result<(), LoadError>;
    fn close(&self, handle: Self::Handle);
}

/// A loaded shared object plus the path it was opened from, kept around so
/// error messages can cite it after the fact (`libloading::Library` itself
/// carries no path).
pub struct LoadedLibrary {
    lib: libloading::Library,
    path: PathBuf,
}

/// The real shim, backing [`crate::registry::DsoRegistry`] outside tests.
/// This is the only unsafe code in the workspace: `dlopen`/`dlsym` are
/// inherently unsafe FFI, unavoidable for a crate whose whole purpose is
/// loading native code.
#[derive(Default)]
pub struct LibloadingShim;

impl DlShim for LibloadingShim {
    type Handle = LoadedLibrary;

    fn open(&self, path: &Path) -> Result<Self::Handle, LoadError> {
        let lib = unsafe { libloading::Library::new(path) }.map_err(|e| LoadError::DynamicLinkFailed {
            path: path.display().to_string(),
            message: Some(e.to_string()),
        })?;
        Ok(LoadedLibrary { lib, path: path.to_path_buf() })
    }

    fn has_symbol(&self, handle: &Self::Handle, name: &str) -> bool {
        unsafe { handle.lib.get::<unsafe extern "C" fn()>(name.as_bytes()) }.is_ok()
    }

    fn call(&self, handle: &Self::Handle, name: &str) -> Result<(), LoadError> {
        let func = unsafe { handle.lib.get::<unsafe extern "C" fn()>(name.as_bytes()) }.map_err(|_| {
            LoadError::InitSymbolMissing { symbol: name.to_string(), path: handle.path.display().to_string() }
        })?;
        unsafe { func() };
        Ok(())
    }

    fn close(&self, handle: Self::Handle) {
        drop(handle.lib);
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! An in-memory [`DlShim`] for tests, analogous to
    //! `rt_core::collaborators::fake`: no real `dlopen`, just enough
    //! scripted behavior to exercise the state machine.

    use super::DlShim;
    use parking_lot::Mutex;
    use rt_core::LoadError;
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// What a fake "library" exposes: a set of callable symbol names, each
    /// either succeeding or failing when invoked.
    #[derive(Default, Clone)]
    pub struct FakeLibrary {
        pub symbols: HashMap<String, Result<(), String>>,
    }

    #[derive(Default)]
    pub struct FakeDlShim {
        libraries: Mutex<HashMap<PathBuf, FakeLibrary>>,
        open_calls: Mutex<Vec<PathBuf>>,
        call_log: Mutex<Vec<String>>,
        panic_next_open: Mutex<HashSet<PathBuf>>,
        panic_barrier: Mutex<Option<Arc<std::sync::Barrier>>>,
    }

    impl FakeDlShim {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn install(&self, path: impl Into<PathBuf>, library: FakeLibrary) {
            self.libraries.lock().insert(path.into(), library);
        }

        pub fn open_count(&self, path: impl AsRef<Path>) -> usize {
            self.open_calls.lock().iter().filter(|p| p.as_path() == path.as_ref()).count()
        }

        pub fn call_log(&self) -> Vec<String> {
            self.call_log.lock().clone()
        }

        /// The next `open()` of `path` panics instead of returning,
        /// simulating a loader thread that dies mid-drive (spec.md §4.4
        /// "prior loader died").
        pub fn panic_next_open(&self, path: impl Into<PathBuf>) {
            self.panic_next_open.lock().insert(path.into());
        }

        /// Like [`Self::panic_next_open`], but `open()` rendezvouses on
        /// `barrier` right before panicking — lets a test hold the panic
        /// back until a second thread has had time to park in `drive`'s
        /// wait loop first.
        pub fn panic_next_open_after(&self, path: impl Into<PathBuf>, barrier: Arc<std::sync::Barrier>) {
            self.panic_next_open.lock().insert(path.into());
            *self.panic_barrier.lock() = Some(barrier);
        }
    }

    impl DlShim for FakeDlShim {
        type Handle = Arc<FakeLibrary>;

        #[allow(clippy::panic)]
        fn open(&self, path: &Path) -> Result<Self::Handle, LoadError> {
            self.open_calls.lock().push(path.to_path_buf());
            if self.panic_next_open.lock().remove(path) {
                if let Some(barrier) = self.panic_barrier.lock().take() {
                    barrier.wait();
                }
                // Simulates a loader thread dying mid-drive (spec.md §4.4
                // "prior loader died"): deliberate, test-only.
                panic!("simulated loader death mid-open");
            }
            let library = self.libraries.lock().get(path).cloned().ok_or_else(|| LoadError::DynamicLinkFailed {
                path: path.display().to_string(),
                message: Some("no such fake library installed".to_string()),
            })?;
            Ok(Arc::new(library))
        }

        fn has_symbol(&self, handle: &Self::Handle, name: &str) -> bool {
            handle.symbols.contains_key(name)
        }

        fn call(&self, handle: &Self::Handle, name: &str) -> Result<(), LoadError> {
            self.call_log.lock().push(name.to_string());
            match handle.symbols.get(name) {
                Some(Ok(())) => Ok(()),
                Some(Err(message)) => {
                    Err(LoadError::DynamicLinkFailed { path: name.to_string(), message: Some(message.clone()) })
                }
                None => Err(LoadError::InitSymbolMissing { symbol: name.to_string(), path: "<fake>".to_string() }),
            }
        }

        fn close(&self, _handle: Self::Handle) {}
    }
}
