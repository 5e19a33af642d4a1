// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! Centralized environment variable access for the runtime crate: one free
//! function per setting rather than a config struct populated all at once.
//!
//! `SCHEME_LOAD_PATH`/`SCHEME_DYNLOAD_PATH` seed the load-path and
//! dynload-path lists at startup, split on `:` (POSIX) or `;` (Windows),
//! and are ignored outright when the process is set-uid/set-gid.

/// Is the process running set-uid or set-gid? When true, the load-path and
/// dynload-path environment variables are ignored (spec.md §6): a setuid
/// binary must not let an attacker redirect its native-code loading via
/// the environment.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn is_sugid() -> bool {
    // SAFETY: getuid/geteuid/getgid/getegid take no arguments and cannot
    // fail; they're plain syscall wrappers.
    unsafe { libc::getuid() != libc::geteuid() || libc::getgid() != libc::getegid() }
}

#[cfg(not(unix))]
pub fn is_sugid() -> bool {
    false
}

fn path_separator() -> char {
    if cfg!(windows) {
        ';'
    } else {
        ':'
    }
}

fn split_env_path(name: &str) -> Vec<String> {
    if is_sugid() {
        tracing::debug!(variable = name, "set-uid/set-gid process: ignoring load-path environment variable");
        return Vec::new();
    }
    std::env::var(name)
        .ok()
        .map(|value| value.split(path_separator()).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

/// `SCHEME_LOAD_PATH`, split on the platform path separator, empty when
/// unset or when the process is set-uid/set-gid.
pub fn load_path_from_env() -> Vec<String> {
    split_env_path("SCHEME_LOAD_PATH")
}

/// `SCHEME_DYNLOAD_PATH`, same rules as [`load_path_from_env`].
pub fn dynload_path_from_env() -> Vec<String> {
    split_env_path("SCHEME_DYNLOAD_PATH")
}

/// Host architecture tag used by the `add-load-path` arch-subdirectory
/// probe (spec.md §6 "Path-adding policy").
pub fn host_arch() -> &'static str {
    std::env::consts::ARCH
}
