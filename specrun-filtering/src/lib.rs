// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Filter expressions for specrun.
//!
//! A [`Filter`] is a pure predicate over a test group or over an individual test spec. Filters
//! compose with [`Filter::all_of`], [`Filter::any_of`] and [`Filter::not`], and can match
//! descriptions against a regular expression with [`Filter::by_description`].

pub mod errors;
mod expression;

pub use expression::*;
