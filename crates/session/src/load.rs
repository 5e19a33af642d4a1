// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! `load`: resolve a filename through the Path Resolver, open it through the
//! coding-aware decoder, and run a [`LoadSession`] over it (spec.md §4.2).

use crate::coding::CodingAwareReader;
use crate::session::LoadSession;
use parking_lot::Mutex;
use rt_core::{Evaluator, LoadError, LoadFlags, LoadOutcome, LoadResult};
use rt_pathresolve::{find_file, SearchPath, SuffixList};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

/// `load(filename, paths, suffixes, flags, evaluator, module)`.
///
/// Resolves `filename` against `paths`/`suffixes` (spec.md §4.1), then opens
/// and evaluates it in a scoped [`LoadSession`]. On a quiet miss (`flags`
/// says not to error on a missing file) returns the "not found" shape of
/// [`LoadOutcome`] without opening a session at all.
///
/// `flags.propagate_error` selects the dual surface mode of spec.md §7:
/// `true` rethrows any failure directly (`Err`); `false` packs it into a
/// [`LoadResult`] so the caller can distinguish "not found" from "failed"
/// without an exception. Either way, the file handle lives only in this
/// function's local `Arc<Mutex<_>>`: once the session ends and that `Arc`
/// drops here, there are no other owners, so the underlying `File` closes
/// immediately via its own `Drop` — on the success path and on every error
/// path alike, since `?`/early-return unwinds through the same local
/// variable's scope.
pub fn load<E: Evaluator>(
    filename: &str,
    paths: &SearchPath,
    suffixes: &SuffixList,
    flags: &LoadFlags,
    evaluator: &E,
    module: &E::Module,
) -> Result<LoadOutcome<Option<E::Value>>, LoadError> {
    let resolved = match find_file(filename, paths, suffixes, flags.quiet_if_missing) {
        Ok(resolved) => resolved,
        Err(err) => return pack(flags, Err(err)),
    };
    let Some(path) = resolved else {
        return Ok(if flags.propagate_error {
            LoadOutcome::Value(None)
        } else {
            LoadOutcome::Packet(LoadResult::not_found())
        });
    };

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(source) => {
            return pack(flags, Err(LoadError::FileOpenFailed { path: path.display().to_string(), source }))
        }
    };
    let buffered = BufReader::new(file);
    let decoded = if flags.ignore_coding {
        CodingAwareDispatch::Raw(buffered)
    } else {
        match CodingAwareReader::detect(buffered) {
            Ok(reader) => CodingAwareDispatch::Decoded(reader),
            Err(source) => {
                return pack(flags, Err(LoadError::FileOpenFailed { path: path.display().to_string(), source }))
            }
        }
    };

    let remaining = paths.snapshot();
    let stream = Arc::new(Mutex::new(BufReader::new(decoded)));
    let mut session = LoadSession::open(&stream, path.display().to_string(), remaining);

    let result = session.run(evaluator, module, false).map_err(|err| LoadError::LoadAbort { source: Box::new(err) });
    pack(flags, result)
}

/// Pack a raw result per `flags.propagate_error` (spec.md §7): `true`
/// rethrows `result` directly; `false` wraps it into a [`LoadResult`]
/// packet so the caller always gets `Ok`, with `loaded`/`error` carrying
/// what actually happened instead of the error being discarded.
fn pack<T>(flags: &LoadFlags, result: Result<T, LoadError>) -> Result<LoadOutcome<T>, LoadError> {
    if flags.propagate_error {
        return result.map(LoadOutcome::Value);
    }
    match result {
        // A missing file is "not found" (0, loaded=false, error=None) in
        // packet mode regardless of `quiet_if_missing` — that flag only
        // decides whether a *propagating* caller sees an exception for it.
        Err(LoadError::FileNotFound { .. }) => Ok(LoadOutcome::Packet(LoadResult::not_found())),
        other => Ok(LoadOutcome::Packet(LoadResult::from_result(other))),
    }
}

/// Dispatches between the raw buffered file and the coding-decoded wrapper
/// without boxing: `load`'s two read paths (`ignore-coding` on or off) share
/// one concrete type so [`LoadSession`] doesn't need to be generic over it.
enum CodingAwareDispatch<R> {
    Raw(R),
    Decoded(CodingAwareReader<R>),
}

impl<R: std::io::BufRead> std::io::Read for CodingAwareDispatch<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            CodingAwareDispatch::Raw(r) => r.read(buf),
            CodingAwareDispatch::Decoded(r) => r.read(buf),
        }
    }
}

#[cfg(test)]
#[path = "load_tests.rs"]
mod tests;
