// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while building filters.

use thiserror::Error;

/// An error that occurred while compiling a description pattern into a filter.
#[derive(Clone, Debug, Error)]
#[error("invalid description pattern `{pattern}`")]
#[non_exhaustive]
pub struct FilterParseError {
    /// The pattern that failed to compile.
    pub pattern: String,

    /// The underlying regex error.
    #[source]
    pub err: regex::Error,
}

impl FilterParseError {
    pub(crate) fn new(pattern: impl Into<String>, err: regex::Error) -> Self {
        Self {
            pattern: pattern.into(),
            err,
        }
    }
}
