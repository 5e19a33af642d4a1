// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! rt-dynload: the Dynamic Object Registry and the dynamic-linker shim
//! (spec.md §4.4).
//!
//! `dlopen`/`dlsym` are unsafe FFI; this is the only crate in the
//! workspace that needs them, confined to [`dlshim::LibloadingShim`].
#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod dlshim;
mod initname;
mod registry;

pub use dlshim::{DlShim, LibloadingShim, LoadedLibrary};
pub use initname::derive_init_name;
pub use registry::{DsoRecord, DsoRegistry, DsoState};

#[cfg(any(test, feature = "test-support"))]
pub use dlshim::fake;
