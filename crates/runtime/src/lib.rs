// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! rt-runtime: composes the Path Resolver, Load Session, Feature Registry,
//! Dynamic Object Registry, and Autoload Resolver into the public
//! operation table a host embeds (spec.md §6).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
mod subsystem;

pub use subsystem::{Init, LoadSubsystem};
pub use rt_registry::RequireOutcome;
