// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listeners that render events to an output sink as they arrive.
//!
//! Lines have the form `[%7s] description`: the status label right-aligned in seven columns. Each
//! group ends with a summary line such as `Tests run: 2, Succeeded: 1, Failures: 0, Errors: 1`.
//! Error details for failed results are written to a separate error sink.

mod concurrent;
mod console;
mod helpers;

pub use concurrent::*;
pub use console::*;
