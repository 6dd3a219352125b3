// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expansion of parameterized tests.

use crate::spec::{IntoOutcome, SpecEntry};
use std::sync::Arc;

/// Expands one parameterized declaration into one [`SpecEntry`] per parameter.
///
/// The description of each entry is `template` immediately followed by `label(param)`. Every entry
/// shares the same body function, called with its own parameter.
///
/// ```
/// use specrun_runner::spec::parameterized::expand;
///
/// let specs = expand("squares ", [1, 2, 3], |n| n.to_string(), |n| assert!(n * n >= *n));
/// let descriptions: Vec<_> = specs.iter().map(|s| s.description()).collect();
/// assert_eq!(descriptions, ["squares 1", "squares 2", "squares 3"]);
/// ```
pub fn expand<P, I, L, F, R>(template: &str, params: I, label: L, f: F) -> Vec<SpecEntry>
where
    I: IntoIterator<Item = P>,
    P: Send + Sync + 'static,
    L: Fn(&P) -> String,
    F: Fn(&P) -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    let f = Arc::new(f);
    params
        .into_iter()
        .map(|param| {
            let description = format!("{template}{}", label(&param));
            let f = f.clone();
            SpecEntry::new(description, move || f(&param))
        })
        .collect()
}
