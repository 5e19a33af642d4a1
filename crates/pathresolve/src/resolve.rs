// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! `find-file`: the Path Resolver's one operation (spec.md §4.1).

use crate::search_path::SearchPath;
use crate::suffix::SuffixList;
use rt_core::LoadError;
use std::path::{Path, PathBuf};

/// How a filename was classified before any search-path lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    /// Begins with `~`: expand a POSIX-style user prefix, skip the path.
    Home,
    /// Begins with `/`, `./`, `../`, or (on Windows) a drive letter: use
    /// verbatim, skip the path.
    Verbatim,
    /// Search each directory in the load path in turn.
    Relative,
}

fn classify(filename: &str) -> Classification {
    if filename.starts_with('~') {
        return Classification::Home;
    }
    if filename.starts_with('/') || filename.starts_with("./") || filename.starts_with("../") {
        return Classification::Verbatim;
    }
    if is_drive_letter_prefixed(filename) {
        return Classification::Verbatim;
    }
    Classification::Relative
}

#[cfg(windows)]
fn is_drive_letter_prefixed(filename: &str) -> bool {
    let bytes = filename.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(not(windows))]
fn is_drive_letter_prefixed(_filename: &str) -> bool {
    false
}

/// Expand a leading `~` the way a POSIX shell would for the current user.
///
/// `~other-user/...` is not resolved to that user's home directory: doing
/// so portably needs a passwd-database lookup (`libc::getpwnam`), which
/// this crate doesn't pull in for one rarely-used corner of one fallback
/// path. It is treated the same as `~/...`, relative to the caller's own
/// `HOME`. This is a documented limitation, not a silent one.
fn expand_home(filename: &str) -> PathBuf {
    let rest = filename[1..].trim_start_matches('/');
    let home = std::env::var("HOME").unwrap_or_default();
    PathBuf::from(home).join(rest)
}

fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// `try-suffixes(base)`: `base` itself if it exists, else `base + suffix`
/// for the first matching suffix, else `None`.
fn try_suffixes(base: &Path, suffixes: &SuffixList) -> Option<PathBuf> {
    if is_regular_file(base) {
        return Some(base.to_path_buf());
    }
    let base_str = base.to_string_lossy();
    for suffix in suffixes.iter() {
        let candidate = PathBuf::from(format!("{base_str}{suffix}"));
        if is_regular_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// `find-file(filename, paths-in-out, suffixes, quiet-if-missing)`.
///
/// On a search-path hit, `paths` is overwritten with the tail of the path
/// after the matching directory (enabling "find next"); on a total miss,
/// `paths` becomes empty. Filenames classified as home-relative or
/// verbatim bypass the search path's iteration entirely, but still empty
/// `paths` out unconditionally, hit or miss — the bypass never leaves a
/// stale list behind for a subsequent "find next".
pub fn find_file(
    filename: &str,
    paths: &SearchPath,
    suffixes: &SuffixList,
    quiet_if_missing: bool,
) -> Result<Option<PathBuf>, LoadError> {
    if filename.is_empty() {
        return Err(LoadError::BadArgument("find-file: empty filename".into()));
    }

    match classify(filename) {
        Classification::Home => {
            let found = try_suffixes(&expand_home(filename), suffixes);
            paths.replace(Vec::new());
            Ok(found)
        }
        Classification::Verbatim => {
            let found = try_suffixes(Path::new(filename), suffixes);
            paths.replace(Vec::new());
            Ok(found)
        }
        Classification::Relative => search_path(filename, paths, suffixes, quiet_if_missing),
    }
}

fn search_path(
    filename: &str,
    paths: &SearchPath,
    suffixes: &SuffixList,
    quiet_if_missing: bool,
) -> Result<Option<PathBuf>, LoadError> {
    let snapshot = paths.snapshot();
    for (i, dir) in snapshot.iter().enumerate() {
        let base = Path::new(dir).join(filename);
        if let Some(found) = try_suffixes(&base, suffixes) {
            paths.replace(snapshot[i + 1..].to_vec());
            return Ok(Some(found));
        }
    }
    paths.replace(Vec::new());

    if quiet_if_missing {
        Ok(None)
    } else {
        Err(LoadError::FileNotFound { filename: filename.to_string(), searched: snapshot })
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
