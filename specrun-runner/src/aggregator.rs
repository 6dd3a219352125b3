// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarizing recorded results into run statistics.

use crate::{
    events::{ResultStatus, TestResult},
    recorder::{RecordedResults, Recorder},
};
use std::{fmt, time::Duration};

/// Counts of results by status, plus the accumulated test time if it was tracked.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunStatistics {
    /// The number of successful results.
    pub succeeded: usize,

    /// The number of assertion-style failures.
    pub failed: usize,

    /// The number of other raised errors.
    pub errors: usize,

    /// Total time spent in tests, if tracked.
    pub total_time: Option<Duration>,
}

impl RunStatistics {
    /// The total number of results.
    pub fn run(&self) -> usize {
        self.succeeded + self.failed + self.errors
    }

    /// Returns true if there were no failures and no errors.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// Counts one result.
    pub fn record(&mut self, result: &TestResult) {
        match result.status() {
            ResultStatus::Success => self.succeeded += 1,
            ResultStatus::Failed => self.failed += 1,
            ResultStatus::Error => self.errors += 1,
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tests run: {}, Succeeded: {}, Failures: {}, Errors: {}",
            self.run(),
            self.succeeded,
            self.failed,
            self.errors
        )?;
        if let Some(time) = self.total_time
            && !time.is_zero()
        {
            write!(f, " - Time elapsed: {:.6} s", time.as_secs_f64())?;
        }
        Ok(())
    }
}

/// A one-shot summarizer over a recorder's accumulated results.
#[derive(Clone, Debug)]
pub struct ResultAggregator {
    stats: RunStatistics,
}

impl ResultAggregator {
    /// Tallies every result across all groups.
    pub fn new(recorded: &RecordedResults) -> Self {
        let mut stats = RunStatistics {
            total_time: recorded.total_time(),
            ..RunStatistics::default()
        };
        for result in recorded.groups().values().flatten() {
            stats.record(result);
        }
        Self { stats }
    }

    /// Tallies a recorder's current state.
    pub fn from_recorder(recorder: &(impl Recorder + ?Sized)) -> Self {
        Self::new(&recorder.recorded())
    }

    /// Returns the statistics.
    pub fn statistics(&self) -> RunStatistics {
        self.stats
    }

    /// Returns the one-line summary.
    pub fn summary(&self) -> String {
        self.stats.to_string()
    }
}
