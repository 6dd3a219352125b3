// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::mode::{Parallel, RunMode, Sequential};
use crate::{
    aggregator::{ResultAggregator, RunStatistics},
    config::{EngineConfig, TestThreads},
    errors::{EngineError, ExecuteError, FilterParseError},
    events::{LifecycleStatus, Listener},
    recorder::ConcurrentRecorder,
    spec::{Group, SpecEntry},
};
use specrun_filtering::Filter;
use std::{
    fmt,
    io::{self, Write},
    mem,
    rc::Rc,
    sync::Arc,
};
use tracing::{debug, error};

/// Executes test groups and reports their results to listeners.
///
/// Built fluently:
///
/// ```
/// use specrun_runner::{runner::TestEngine, spec::Group};
///
/// let mut engine = TestEngine::parallel()
///     .add(Group::from_fn("FirstTestClass", |spec| {
///         spec.test("test 1", || ()).test("important test", || ());
///     }))
///     .add(Group::from_fn("SecondTestClass", |spec| {
///         spec.test("test 3", || ()).test("important test 2", || ());
///     }))
///     .filter_by_group_description("First.*")
///     .unwrap()
///     .filter_by_spec_description(".*important.*")
///     .unwrap()
///     .summary_writer(std::io::sink());
///
/// let stats = engine.run().unwrap();
/// assert_eq!(stats.run(), 1);
/// ```
pub struct TestEngine<M: RunMode = Sequential> {
    mode: M,
    groups: Vec<Group>,
    listeners: Vec<M::Handle>,
    class_filter: Filter<Group>,
    spec_filter: Filter<SpecEntry>,
    record_time: bool,
    summary_out: Box<dyn Write>,
}

impl TestEngine<Sequential> {
    /// Creates an engine that runs groups one at a time on the calling thread.
    pub fn sequential() -> Self {
        Self::with_mode(Sequential)
    }

    /// Registers a listener. Listeners are notified in registration order.
    pub fn listener(mut self, listener: Rc<dyn Listener>) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl TestEngine<Parallel> {
    /// Creates an engine that runs groups on one worker per logical CPU.
    pub fn parallel() -> Self {
        Self::with_mode(Parallel::default())
    }

    /// Creates an engine that runs groups on the given number of workers.
    pub fn parallel_with_threads(test_threads: TestThreads) -> Self {
        Self::with_mode(Parallel::new(test_threads))
    }

    /// Registers a thread-safe listener. Listeners are notified in registration order.
    pub fn listener(mut self, listener: Arc<dyn Listener + Send + Sync>) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl<M: RunMode> TestEngine<M> {
    fn with_mode(mode: M) -> Self {
        Self {
            mode,
            groups: Vec::new(),
            listeners: Vec::new(),
            class_filter: Filter::All,
            spec_filter: Filter::All,
            record_time: false,
            summary_out: Box::new(io::stdout()),
        }
    }

    /// Adds a group. Groups are dispatched in the order they were added.
    pub fn add(mut self, group: impl Into<Group>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Narrows the set of groups that run. Repeated calls combine filters with AND.
    pub fn class_filter(mut self, filter: Filter<Group>) -> Self {
        self.class_filter = mem::take(&mut self.class_filter).and(filter);
        self
    }

    /// Narrows the set of specs that run within each group. Repeated calls combine filters with
    /// AND.
    pub fn specification_filter(mut self, filter: Filter<SpecEntry>) -> Self {
        self.spec_filter = mem::take(&mut self.spec_filter).and(filter);
        self
    }

    /// Runs only groups whose full description matches `pattern`.
    pub fn filter_by_group_description(self, pattern: &str) -> Result<Self, FilterParseError> {
        Ok(self.class_filter(Filter::by_description(pattern)?))
    }

    /// Runs only specs whose full description matches `pattern`.
    pub fn filter_by_spec_description(self, pattern: &str) -> Result<Self, FilterParseError> {
        Ok(self.specification_filter(Filter::by_description(pattern)?))
    }

    /// Sets whether the run summary includes time spent in tests.
    pub fn record_time(mut self, record_time: bool) -> Self {
        self.record_time = record_time;
        self
    }

    /// Sets where the aggregate summary line is written. Defaults to standard output.
    pub fn summary_writer(mut self, writer: impl Write + 'static) -> Self {
        self.summary_out = Box::new(writer);
        self
    }

    /// Applies `config` to this engine.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.record_time = config.record_time;
        self.mode.configure(config);
        self
    }

    /// Runs every group accepted by the class filter and writes the aggregate summary.
    ///
    /// Failing tests do not make this return an error: they are reported through listeners and
    /// counted in the returned statistics. An error means the engine itself could not run.
    pub fn run(&mut self) -> Result<RunStatistics, EngineError> {
        self.run_lifecycle(LifecycleStatus::Begin);

        let recorder = ConcurrentRecorder::new().track_time(self.record_time);
        let groups: Vec<&Group> = if self.class_filter.is_trivial() {
            self.groups.iter().collect()
        } else {
            self.groups
                .iter()
                .filter(|group| {
                    let include = self.class_filter.include(group);
                    if !include {
                        debug!(group = group.description(), "group skipped by class filter");
                    }
                    include
                })
                .collect()
        };

        self.run_lifecycle(LifecycleStatus::Start);
        self.mode
            .dispatch(&groups, &self.listeners, &recorder, &self.spec_filter)?;
        self.run_lifecycle(LifecycleStatus::End);

        let stats = ResultAggregator::from_recorder(&recorder).statistics();
        writeln!(self.summary_out, "{stats}")
            .and_then(|()| self.summary_out.flush())
            .map_err(EngineError::WriteSummary)?;
        self.run_lifecycle(LifecycleStatus::Finish);

        Ok(stats)
    }

    /// Runs the engine, returning an error if any result was not a success.
    pub fn execute(&mut self) -> Result<RunStatistics, ExecuteError> {
        let stats = self.run()?;
        if stats.is_success() {
            Ok(stats)
        } else {
            Err(ExecuteError::RunFailed { stats })
        }
    }

    /// Runs the engine, returning true if every result was a success.
    ///
    /// Engine failures are logged and count as an unsuccessful run.
    pub fn execute_without_throwing(&mut self) -> bool {
        match self.run() {
            Ok(stats) => stats.is_success(),
            Err(err) => {
                error!("test engine failed: {err}");
                false
            }
        }
    }

    fn run_lifecycle(&self, status: LifecycleStatus) {
        for listener in &self.listeners {
            M::as_listener(listener).on_run_lifecycle(status);
        }
    }
}

impl Default for TestEngine<Sequential> {
    fn default() -> Self {
        Self::sequential()
    }
}

impl<M: RunMode + fmt::Debug> fmt::Debug for TestEngine<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestEngine")
            .field("mode", &self.mode)
            .field("groups", &self.groups)
            .field("listeners", &self.listeners.len())
            .field("class_filter", &self.class_filter)
            .field("spec_filter", &self.spec_filter)
            .field("record_time", &self.record_time)
            .finish_non_exhaustive()
    }
}
