// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! Flags accepted by the loading subsystem's native entry points.

/// Flags shared by `load`, `require`, and `dynamic-load`.
///
/// Built with chainable setters (`LoadFlags::default().quiet_if_missing(true)`)
/// following this workspace's setter convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadFlags {
    /// Don't raise `FileNotFound`; return `None`/`false` instead.
    pub quiet_if_missing: bool,
    /// Skip the coding-aware stream decorator.
    pub ignore_coding: bool,
    /// Rethrow errors from evaluated code rather than packing them into a
    /// `LoadResult`.
    pub propagate_error: bool,
}

impl LoadFlags {
    crate::setters! {
        set {
            quiet_if_missing: bool,
            ignore_coding: bool,
            propagate_error: bool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_false() {
        let f = LoadFlags::default();
        assert!(!f.quiet_if_missing);
        assert!(!f.ignore_coding);
        assert!(!f.propagate_error);
    }

    #[test]
    fn setters_chain() {
        let f = LoadFlags::default().quiet_if_missing(true).propagate_error(true);
        assert!(f.quiet_if_missing);
        assert!(!f.ignore_coding);
        assert!(f.propagate_error);
    }
}
