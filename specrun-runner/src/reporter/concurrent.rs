// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::helpers::ReportState;
use crate::{
    config::ReporterConfig,
    events::{LifecycleStatus, Listener, RunnableKind, TestResult},
    helpers::lock,
};
use std::{
    collections::HashMap,
    io::{self, Stderr, Stdout, Write},
    sync::Mutex,
    thread::{self, ThreadId},
};
use tracing::warn;

/// A console reporter for the parallel engine.
///
/// Each thread's group output is buffered from the group's `START` to its `END`, then copied to
/// the shared sinks in one piece, so lines from concurrently running groups never interleave.
pub struct ConcurrentConsoleReporter<W = Stdout, E = Stderr> {
    config: ReporterConfig,
    threads: Mutex<HashMap<ThreadId, ThreadReport>>,
    sink: Mutex<Sink<W, E>>,
}

struct ThreadReport {
    state: ReportState,
    out: Vec<u8>,
    err: Vec<u8>,
}

struct Sink<W, E> {
    out: W,
    err: E,
}

impl ConcurrentConsoleReporter {
    /// Creates a reporter writing to standard output and standard error.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> ConcurrentConsoleReporter<W, E> {
    /// Creates a reporter writing group output to `out` and error details to `err`.
    pub fn new(out: W, err: E) -> Self {
        Self {
            config: ReporterConfig::default(),
            threads: Mutex::new(HashMap::new()),
            sink: Mutex::new(Sink { out, err }),
        }
    }

    /// Sets whether only lifecycle and summary lines are printed.
    pub fn summary_only(mut self, summary_only: bool) -> Self {
        self.config.summary_only = summary_only;
        self
    }

    /// Sets whether group summaries include elapsed time.
    pub fn report_time(mut self, report_time: bool) -> Self {
        self.config.report_time = report_time;
        self
    }

    /// Sets whether status labels are colored.
    pub fn colorize(mut self, colorize: bool) -> Self {
        self.config.colorize = colorize;
        self
    }

    /// Applies every option from `config`.
    pub fn with_config(mut self, config: &ReporterConfig) -> Self {
        self.config = *config;
        self
    }

    /// Consumes the reporter, returning its sinks.
    pub fn into_inner(self) -> (W, E) {
        let sink = self
            .sink
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (sink.out, sink.err)
    }

    fn start_group(&self, description: &str) -> io::Result<()> {
        let mut report = ThreadReport {
            state: ReportState::new(self.config),
            out: Vec::new(),
            err: Vec::new(),
        };
        report.state.group_started(description, &mut report.out)?;
        let previous = lock(self.threads.lock()).insert(thread::current().id(), report);
        if previous.is_some() {
            warn!(
                group = description,
                "group started before the previous one on this thread ended"
            );
        }
        Ok(())
    }

    fn result(&self, result: &TestResult) -> io::Result<()> {
        let mut threads = lock(self.threads.lock());
        match threads.get_mut(&thread::current().id()) {
            Some(report) => report.state.result(result, &mut report.out, &mut report.err),
            None => {
                warn!(
                    result = result.description(),
                    "result received outside of a group, not reported"
                );
                Ok(())
            }
        }
    }

    fn end_group(&self) -> io::Result<()> {
        let Some(mut report) = lock(self.threads.lock()).remove(&thread::current().id()) else {
            return Ok(());
        };
        report.state.group_ended(&mut report.out)?;

        let mut sink = lock(self.sink.lock());
        sink.out.write_all(&report.out)?;
        sink.out.flush()?;
        sink.err.write_all(&report.err)?;
        sink.err.flush()
    }
}

impl<W: Write, E: Write> Listener for ConcurrentConsoleReporter<W, E> {
    fn on_group_lifecycle(&self, description: &str, status: LifecycleStatus) {
        let res = match status {
            LifecycleStatus::Start => self.start_group(description),
            LifecycleStatus::End => self.end_group(),
            LifecycleStatus::Begin | LifecycleStatus::Finish => Ok(()),
        };
        if let Err(err) = res {
            warn!("failed to write report output: {err}");
        }
    }

    fn on_runnable_lifecycle(
        &self,
        _description: &str,
        kind: RunnableKind,
        status: LifecycleStatus,
    ) {
        if let Some(report) = lock(self.threads.lock()).get_mut(&thread::current().id()) {
            report.state.runnable(kind, status);
        }
    }

    fn on_result(&self, result: &TestResult) {
        if let Err(err) = self.result(result) {
            warn!("failed to write report output: {err}");
        }
    }
}
