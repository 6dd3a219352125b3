// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    events::{LifecycleStatus, Listener, RunnableKind, TestResult},
    recorder::{RecordedResults, Recorder},
    stopwatch::{StopwatchStart, stopwatch},
};
use indexmap::IndexMap;
use std::{cell::RefCell, time::Duration};
use tracing::warn;

/// A recorder for the sequential engine.
///
/// Remembers the current group between its start and end events. Not thread-safe: use
/// [`ConcurrentRecorder`](super::ConcurrentRecorder) with the parallel engine.
#[derive(Debug)]
pub struct SequentialRecorder {
    track_time: bool,
    state: RefCell<SequentialState>,
}

#[derive(Debug)]
struct SequentialState {
    groups: IndexMap<String, Vec<TestResult>>,
    current: Option<usize>,
    timer: Option<StopwatchStart>,
    total_time: Duration,
    success: bool,
}

impl SequentialRecorder {
    /// Creates a recorder that does not track time.
    pub fn new() -> Self {
        Self {
            track_time: false,
            state: RefCell::new(SequentialState {
                groups: IndexMap::new(),
                current: None,
                timer: None,
                total_time: Duration::ZERO,
                success: true,
            }),
        }
    }

    /// Sets whether time spent in tests is accumulated.
    pub fn track_time(mut self, track_time: bool) -> Self {
        self.track_time = track_time;
        self
    }
}

impl Default for SequentialRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for SequentialRecorder {
    fn on_group_lifecycle(&self, description: &str, status: LifecycleStatus) {
        let mut state = self.state.borrow_mut();
        match status {
            LifecycleStatus::Start => {
                let index = match state.groups.get_index_of(description) {
                    Some(index) => index,
                    None => state.groups.insert_full(description.to_owned(), Vec::new()).0,
                };
                state.current = Some(index);
            }
            LifecycleStatus::End => state.current = None,
            LifecycleStatus::Begin | LifecycleStatus::Finish => {}
        }
    }

    fn on_runnable_lifecycle(
        &self,
        _description: &str,
        kind: RunnableKind,
        status: LifecycleStatus,
    ) {
        if !self.track_time || !kind.is_test() {
            return;
        }
        let mut state = self.state.borrow_mut();
        match status {
            LifecycleStatus::Start => state.timer = Some(stopwatch()),
            LifecycleStatus::End => {
                if let Some(timer) = state.timer.take() {
                    state.total_time += timer.elapsed();
                }
            }
            LifecycleStatus::Begin | LifecycleStatus::Finish => {}
        }
    }

    fn on_result(&self, result: &TestResult) {
        let mut state = self.state.borrow_mut();
        if !result.is_success() {
            state.success = false;
        }
        let current = state.current;
        match current {
            Some(index) => {
                if let Some((_, results)) = state.groups.get_index_mut(index) {
                    results.push(result.clone());
                }
            }
            None => warn!(
                result = result.description(),
                "result received outside of a group, not recorded"
            ),
        }
    }
}

impl Recorder for SequentialRecorder {
    fn is_success(&self) -> bool {
        self.state.borrow().success
    }

    fn recorded(&self) -> RecordedResults {
        let state = self.state.borrow();
        RecordedResults::new(
            state.groups.clone(),
            state.success,
            self.track_time.then_some(state.total_time),
        )
    }
}
