// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    events::{LifecycleStatus, Listener, RunnableKind, TestResult},
    helpers::lock,
    stopwatch::{StopwatchStart, stopwatch},
};
use chrono::{DateTime, Local};
use std::{sync::Mutex, time::Duration};
use tracing::warn;

/// Measures the run as a whole from the engine's run lifecycle events.
///
/// Dispatch time runs from `START` to `END`, while all groups execute. Wall time runs from `BEGIN`
/// to `FINISH`, which also covers filtering and writing the summary.
#[derive(Debug, Default)]
pub struct RunTimingRecorder {
    state: Mutex<TimingState>,
}

#[derive(Debug, Default)]
struct TimingState {
    run: Option<StopwatchStart>,
    dispatch: Option<StopwatchStart>,
    dispatch_time: Option<Duration>,
    wall_time: Option<Duration>,
    finished_at: Option<DateTime<Local>>,
}

impl RunTimingRecorder {
    /// Creates a new timing recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the wall-clock time at which the run began.
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        lock(self.state.lock()).run.as_ref().map(|run| run.start_time())
    }

    /// Returns the wall-clock time at which the run finished.
    pub fn finished_at(&self) -> Option<DateTime<Local>> {
        lock(self.state.lock()).finished_at
    }

    /// Returns the time spent executing groups.
    pub fn dispatch_time(&self) -> Option<Duration> {
        lock(self.state.lock()).dispatch_time
    }

    /// Returns the time from the run being requested to its summary being written.
    pub fn wall_time(&self) -> Option<Duration> {
        lock(self.state.lock()).wall_time
    }
}

impl Listener for RunTimingRecorder {
    fn on_group_lifecycle(&self, _description: &str, _status: LifecycleStatus) {}

    fn on_runnable_lifecycle(
        &self,
        _description: &str,
        _kind: RunnableKind,
        _status: LifecycleStatus,
    ) {
    }

    fn on_result(&self, _result: &TestResult) {}

    fn on_run_lifecycle(&self, status: LifecycleStatus) {
        let mut state = lock(self.state.lock());
        match status {
            LifecycleStatus::Begin => {
                *state = TimingState {
                    run: Some(stopwatch()),
                    ..TimingState::default()
                };
            }
            LifecycleStatus::Start => state.dispatch = Some(stopwatch()),
            LifecycleStatus::End => match state.dispatch.take() {
                Some(dispatch) => state.dispatch_time = Some(dispatch.elapsed()),
                None => warn!("run END received without START"),
            },
            LifecycleStatus::Finish => match state.run.as_ref().map(StopwatchStart::snapshot) {
                Some(snapshot) => {
                    state.wall_time = Some(snapshot.duration);
                    state.finished_at = Some(snapshot.end_time());
                }
                None => warn!("run FINISH received without BEGIN"),
            },
        }
    }
}
