// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::spec::Hooks;

/// Adds hooks to a group without touching its `specify` body.
///
/// Extensions run after the group's own `specify`, in the order they were attached with
/// [`Group::with_extension`](crate::spec::Group::with_extension). They receive the store's mutable
/// hook lists and may insert entries at the front or the back of any of them, for example to set
/// up injected dependencies before the group's own before-all hooks run.
///
/// Closures taking `&mut Hooks` implement this trait.
pub trait GroupExtension: Send + Sync {
    /// Adds hooks to `hooks`.
    fn extend(&self, hooks: &mut Hooks);
}

impl<F> GroupExtension for F
where
    F: Fn(&mut Hooks) + Send + Sync,
{
    fn extend(&self, hooks: &mut Hooks) {
        self(hooks)
    }
}
