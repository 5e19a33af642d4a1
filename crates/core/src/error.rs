// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! Error taxonomy for the loading subsystem.
//!
//! One enum, `LoadError`, aggregates every error kind the subsystem can
//! surface, each variant carrying whatever context (path, feature,
//! platform message) its callers need to report it usefully.

use std::fmt;
use thiserror::Error;

/// Errors surfaced by the loading subsystem.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Type mismatch or otherwise malformed input from the caller.
    #[error("bad argument: {0}")]
    BadArgument(String),

    /// The path resolver exhausted the search path without a hit.
    #[error("cannot find file \"{filename}\" in {searched:?}")]
    FileNotFound {
        filename: String,
        searched: Vec<String>,
    },

    /// The resolved file could not be opened.
    #[error("cannot open file \"{path}\": {source}")]
    FileOpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file being loaded raised an error while evaluating.
    #[error("error in loaded file: {source}")]
    LoadAbort {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The dynamic linker shim failed to open the shared object.
    #[error("dynamic link failed for \"{path}\"{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    DynamicLinkFailed {
        path: String,
        message: Option<String>,
    },

    /// Neither `_<name>` nor `<name>` resolved in the opened shared object.
    #[error("no initializer symbol \"{symbol}\" in \"{path}\"")]
    InitSymbolMissing { symbol: String, path: String },

    /// The wait-for graph closed a cycle back to the requesting thread.
    #[error("require cycle detected for feature \"{feature}\"")]
    RequireCycle { feature: String },

    /// An autoloaded file completed without defining the promised symbol.
    #[error("autoload of \"{symbol}\" did not define it (file \"{file}\")")]
    AutoloadUndefined { symbol: String, file: String },

    /// An autoload resolution was driven recursively by its own locker.
    #[error("circular autoload of \"{symbol}\"")]
    AutoloadCircular { symbol: String },
}

/// Either a propagated error or a packet describing one, selected by
/// [`crate::LoadFlags::propagate_error`].
#[derive(Debug)]
pub enum LoadOutcome<T> {
    /// `propagate_error = true`: the caller gets the value directly, errors
    /// bubble as `Err`.
    Value(T),
    /// `propagate_error = false`: the caller gets a packet distinguishing
    /// "not found" from "failed", never an `Err`.
    Packet(LoadResult<T>),
}

/// Packet form of a load outcome: `loaded=false, error=None` means "not
/// found", `loaded=false, error=Some` means "failed", `loaded=true` means
/// success.
#[derive(Debug)]
pub struct LoadResult<T> {
    pub loaded: bool,
    pub value: Option<T>,
    pub error: Option<LoadError>,
}

impl<T> LoadResult<T> {
    pub fn success(value: T) -> Self {
        Self { loaded: true, value: Some(value), error: None }
    }

    pub fn not_found() -> Self {
        Self { loaded: false, value: None, error: None }
    }

    pub fn failed(error: LoadError) -> Self {
        Self { loaded: false, value: None, error: Some(error) }
    }

    /// Pack a `propagate`-style result into `packet` form, for callers that
    /// want the `loaded`/`error` shape uniformly regardless of how deep in
    /// the call stack the error actually originated.
    pub fn from_result(result: Result<T, LoadError>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(error) => Self::failed(error),
        }
    }
}

impl fmt::Display for LoadResult<()> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.loaded, &self.error) {
            (true, _) => write!(f, "loaded"),
            (false, Some(e)) => write!(f, "failed: {e}"),
            (false, None) => write!(f, "not found"),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
