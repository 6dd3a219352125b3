// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listeners that accumulate results for later aggregation.
//!
//! [`SequentialRecorder`] is for the sequential engine. [`ConcurrentRecorder`] keeps per-thread
//! bookkeeping so that groups running on different workers never see each other's state.
//! [`RunTimingRecorder`] measures the run as a whole.

mod concurrent;
mod sequential;
mod timing;

pub use concurrent::*;
pub use sequential::*;
pub use timing::*;

use crate::events::{Listener, TestResult};
use indexmap::IndexMap;
use std::time::Duration;

/// A listener that accumulates results keyed by group description.
pub trait Recorder: Listener {
    /// Returns false once any non-success result has been recorded.
    fn is_success(&self) -> bool;

    /// Returns a snapshot of everything recorded so far.
    fn recorded(&self) -> RecordedResults;
}

/// A snapshot of a recorder's state.
///
/// Groups sharing a description share an entry.
#[derive(Clone, Debug, Default)]
pub struct RecordedResults {
    groups: IndexMap<String, Vec<TestResult>>,
    success: bool,
    total_time: Option<Duration>,
}

impl RecordedResults {
    pub(crate) fn new(
        groups: IndexMap<String, Vec<TestResult>>,
        success: bool,
        total_time: Option<Duration>,
    ) -> Self {
        Self {
            groups,
            success,
            total_time,
        }
    }

    /// Returns the results for each group description, in the order groups were first seen.
    pub fn groups(&self) -> &IndexMap<String, Vec<TestResult>> {
        &self.groups
    }

    /// Returns the results for one group description.
    pub fn results_for(&self, description: &str) -> Option<&[TestResult]> {
        self.groups.get(description).map(Vec::as_slice)
    }

    /// Returns true if every recorded result was a success.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the accumulated test time, if time tracking was enabled.
    pub fn total_time(&self) -> Option<Duration> {
        self.total_time
    }
}
