// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test groups and their specification stores.
//!
//! A caller implements [`TestGroup`] (or uses [`Group::from_fn`]), registering hooks and tests in
//! [`TestGroup::specify`]. The engine wraps each group in a [`Group`], which builds the
//! [`SpecStore`] lazily and exactly once.

mod extension;
mod group;
pub mod parameterized;
mod store;

pub use extension::*;
pub use group::*;
pub use store::*;
