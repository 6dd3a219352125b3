// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::helpers::ReportState;
use crate::{
    config::ReporterConfig,
    events::{LifecycleStatus, Listener, RunnableKind, TestResult},
};
use std::{
    cell::RefCell,
    io::{self, Stderr, Stdout, Write},
};
use tracing::warn;

/// A console reporter for the sequential engine.
///
/// Prints a `START` line when a group starts, one line per result, and a summary line when the
/// group ends. Error details go to the error sink.
///
/// ```
/// use specrun_runner::{reporter::ConsoleReporter, runner::TestEngine, spec::Group};
/// use std::rc::Rc;
///
/// let reporter = Rc::new(ConsoleReporter::new(Vec::<u8>::new(), Vec::<u8>::new()));
/// let stats = TestEngine::sequential()
///     .add(Group::from_fn("greeting", |spec| {
///         spec.test("says hello", || assert_eq!("hello".len(), 5));
///     }))
///     .listener(reporter.clone())
///     .summary_writer(std::io::sink())
///     .run()
///     .unwrap();
/// assert!(stats.is_success());
///
/// let reporter = Rc::try_unwrap(reporter).ok().unwrap();
/// let (out, _) = reporter.into_inner();
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "[  START] greeting\n\
///      [SUCCESS] says hello\n\
///      Tests run: 1, Succeeded: 1, Failures: 0, Errors: 0\n",
/// );
/// ```
pub struct ConsoleReporter<W = Stdout, E = Stderr> {
    inner: RefCell<ConsoleInner<W, E>>,
}

struct ConsoleInner<W, E> {
    state: ReportState,
    out: W,
    err: E,
}

impl ConsoleReporter {
    /// Creates a reporter writing to standard output and standard error.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> ConsoleReporter<W, E> {
    /// Creates a reporter writing lines to `out` and error details to `err`.
    pub fn new(out: W, err: E) -> Self {
        Self {
            inner: RefCell::new(ConsoleInner {
                state: ReportState::new(ReporterConfig::default()),
                out,
                err,
            }),
        }
    }

    /// Sets whether only lifecycle and summary lines are printed.
    pub fn summary_only(self, summary_only: bool) -> Self {
        self.update_config(|config| config.summary_only = summary_only)
    }

    /// Sets whether group summaries include elapsed time.
    pub fn report_time(self, report_time: bool) -> Self {
        self.update_config(|config| config.report_time = report_time)
    }

    /// Sets whether status labels are colored.
    pub fn colorize(self, colorize: bool) -> Self {
        self.update_config(|config| config.colorize = colorize)
    }

    /// Applies every option from `config`.
    pub fn with_config(self, config: &ReporterConfig) -> Self {
        let config = *config;
        self.update_config(|current| *current = config)
    }

    /// Consumes the reporter, returning its sinks.
    pub fn into_inner(self) -> (W, E) {
        let inner = self.inner.into_inner();
        (inner.out, inner.err)
    }

    fn update_config(self, f: impl FnOnce(&mut ReporterConfig)) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            let mut config = inner.state.config();
            f(&mut config);
            inner.state.set_config(config);
        }
        self
    }

    fn report(&self, f: impl FnOnce(&mut ConsoleInner<W, E>) -> io::Result<()>) {
        let mut inner = self.inner.borrow_mut();
        if let Err(err) = f(&mut inner) {
            warn!("failed to write report output: {err}");
        }
    }
}

impl<W: Write, E: Write> Listener for ConsoleReporter<W, E> {
    fn on_group_lifecycle(&self, description: &str, status: LifecycleStatus) {
        match status {
            LifecycleStatus::Start => self.report(|inner| {
                inner.state.group_started(description, &mut inner.out)?;
                inner.out.flush()
            }),
            LifecycleStatus::End => self.report(|inner| {
                inner.state.group_ended(&mut inner.out)?;
                inner.out.flush()?;
                inner.err.flush()
            }),
            LifecycleStatus::Begin | LifecycleStatus::Finish => {}
        }
    }

    fn on_runnable_lifecycle(
        &self,
        _description: &str,
        kind: RunnableKind,
        status: LifecycleStatus,
    ) {
        self.inner.borrow_mut().state.runnable(kind, status);
    }

    fn on_result(&self, result: &TestResult) {
        self.report(|inner| inner.state.result(result, &mut inner.out, &mut inner.err));
    }
}
