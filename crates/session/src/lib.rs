// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! rt-session: the Load Session and the `load` operation that combines it
//! with the Path Resolver (spec.md §4.2).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod coding;
mod load;
mod session;
pub mod thread_state;

pub use coding::{Coding, CodingAwareReader};
pub use load::load;
pub use session::LoadSession;
pub use thread_state::EvalSituation;
