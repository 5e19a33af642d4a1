// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! Initializer symbol name derivation (spec.md §4.4 step 2): the exported
//! C-ABI entry point a dynamically loaded object must expose, derived from
//! the requested filename's basename.

/// Derive the `_`-prefixed initializer symbol name for `requested_filename`
/// (the name the caller passed to `dynamic-load`, *not* the resolved
/// canonical path — a symlinked wrapper must still resolve to the target's
/// own initializer name), or `_<explicit>` if the caller supplied one.
pub fn derive_init_name(requested_filename: &str, explicit: Option<&str>) -> String {
    if let Some(name) = explicit {
        return format!("_{name}");
    }

    let head = requested_filename.rsplit(['/', '\\']).next().unwrap_or(requested_filename);
    let stem = head.split('.').next().unwrap_or(head);

    let mut name = String::from("_Scm_Init_");
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else {
            name.push('_');
        }
    }
    name
}
