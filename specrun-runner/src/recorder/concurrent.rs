// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    events::{LifecycleStatus, Listener, RunnableKind, TestResult},
    helpers::lock,
    recorder::{RecordedResults, Recorder},
    stopwatch::{StopwatchStart, stopwatch},
};
use indexmap::IndexMap;
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::{self, ThreadId},
    time::Duration,
};
use tracing::warn;

/// A thread-safe recorder for the parallel engine.
///
/// The current group and the running test timer are tracked per calling thread, so groups
/// executing concurrently on different workers never touch each other's bookkeeping. The success
/// flag and the accumulated time are atomics.
///
/// Locks are always taken in the order `contexts`, then `groups`.
#[derive(Debug)]
pub struct ConcurrentRecorder {
    track_time: bool,
    groups: Mutex<IndexMap<String, Vec<TestResult>>>,
    contexts: Mutex<HashMap<ThreadId, ThreadContext>>,
    success: AtomicBool,
    total_nanos: AtomicU64,
}

#[derive(Debug)]
struct ThreadContext {
    group: usize,
    timer: Option<StopwatchStart>,
}

impl ConcurrentRecorder {
    /// Creates a recorder that does not track time.
    pub fn new() -> Self {
        Self {
            track_time: false,
            groups: Mutex::new(IndexMap::new()),
            contexts: Mutex::new(HashMap::new()),
            success: AtomicBool::new(true),
            total_nanos: AtomicU64::new(0),
        }
    }

    /// Sets whether time spent in tests is accumulated.
    pub fn track_time(mut self, track_time: bool) -> Self {
        self.track_time = track_time;
        self
    }

    fn start_group(&self, description: &str) {
        let mut contexts = lock(self.contexts.lock());
        let group = {
            let mut groups = lock(self.groups.lock());
            match groups.get_index_of(description) {
                Some(index) => index,
                None => groups.insert_full(description.to_owned(), Vec::new()).0,
            }
        };
        contexts.insert(thread::current().id(), ThreadContext { group, timer: None });
    }

    fn end_group(&self) {
        lock(self.contexts.lock()).remove(&thread::current().id());
    }
}

impl Default for ConcurrentRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for ConcurrentRecorder {
    fn on_group_lifecycle(&self, description: &str, status: LifecycleStatus) {
        match status {
            LifecycleStatus::Start => self.start_group(description),
            LifecycleStatus::End => self.end_group(),
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
        let mut contexts = lock(self.contexts.lock());
        let Some(context) = contexts.get_mut(&thread::current().id()) else {
            return;
        };
        match status {
            LifecycleStatus::Start => context.timer = Some(stopwatch()),
            LifecycleStatus::End => {
                if let Some(timer) = context.timer.take() {
                    let nanos = u64::try_from(timer.elapsed().as_nanos()).unwrap_or(u64::MAX);
                    self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
                }
            }
            LifecycleStatus::Begin | LifecycleStatus::Finish => {}
        }
    }

    fn on_result(&self, result: &TestResult) {
        if !result.is_success() {
            self.success.store(false, Ordering::SeqCst);
        }

        let contexts = lock(self.contexts.lock());
        match contexts.get(&thread::current().id()) {
            Some(context) => {
                let mut groups = lock(self.groups.lock());
                if let Some((_, results)) = groups.get_index_mut(context.group) {
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

impl Recorder for ConcurrentRecorder {
    fn is_success(&self) -> bool {
        self.success.load(Ordering::SeqCst)
    }

    fn recorded(&self) -> RecordedResults {
        let groups = lock(self.groups.lock()).clone();
        let total_time = self
            .track_time
            .then(|| Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed)));
        RecordedResults::new(groups, self.is_success(), total_time)
    }
}
