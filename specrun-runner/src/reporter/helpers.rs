// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    aggregator::RunStatistics,
    config::ReporterConfig,
    events::{LifecycleStatus, ResultStatus, RunnableKind, TestResult},
    stopwatch::{StopwatchStart, stopwatch},
};
use owo_colors::{OwoColorize, Style};
use std::{
    io::{self, Write},
    time::Duration,
};

#[derive(Clone, Debug, Default)]
pub(super) struct Styles {
    pub(super) is_colorized: bool,
    pub(super) lifecycle: Style,
    pub(super) pass: Style,
    pub(super) fail: Style,
    pub(super) error: Style,
    pub(super) count: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.is_colorized = true;
        self.lifecycle = Style::new().blue().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.error = Style::new().magenta().bold();
        self.count = Style::new().bold();
    }

    fn for_result(&self, status: ResultStatus) -> Style {
        match status {
            ResultStatus::Success => self.pass,
            ResultStatus::Failed => self.fail,
            ResultStatus::Error => self.error,
        }
    }
}

/// Per-group reporting state shared by the sequential and concurrent reporters.
#[derive(Clone, Debug, Default)]
pub(super) struct ReportState {
    config: ReporterConfig,
    styles: Styles,
    stats: RunStatistics,
    timer: Option<StopwatchStart>,
    test_time: Duration,
}

impl ReportState {
    pub(super) fn new(config: ReporterConfig) -> Self {
        let mut state = Self::default();
        state.set_config(config);
        state
    }

    pub(super) fn config(&self) -> ReporterConfig {
        self.config
    }

    pub(super) fn set_config(&mut self, config: ReporterConfig) {
        self.config = config;
        self.styles = Styles::default();
        if config.colorize {
            self.styles.colorize();
        }
    }

    pub(super) fn group_started(
        &mut self,
        description: &str,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        self.stats = RunStatistics::default();
        self.timer = None;
        self.test_time = Duration::ZERO;
        write_status_line(out, "START", self.styles.lifecycle, description)
    }

    /// Times test bodies only: hooks and listener work are not part of the reported time.
    pub(super) fn runnable(&mut self, kind: RunnableKind, status: LifecycleStatus) {
        if !self.config.report_time || !kind.is_test() {
            return;
        }
        match status {
            LifecycleStatus::Start => self.timer = Some(stopwatch()),
            LifecycleStatus::End => {
                if let Some(timer) = self.timer.take() {
                    self.test_time += timer.elapsed();
                }
            }
            LifecycleStatus::Begin | LifecycleStatus::Finish => {}
        }
    }

    pub(super) fn result(
        &mut self,
        result: &TestResult,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> io::Result<()> {
        self.stats.record(result);
        let status = result.status();
        if !self.config.summary_only {
            let style = self.styles.for_result(status);
            write_status_line(out, status.label(), style, result.description())?;
        }
        if let Some(error) = result.error() {
            writeln!(err, "{}: {}", result.description(), error.display_chain())?;
        }
        Ok(())
    }

    pub(super) fn group_ended(&mut self, out: &mut dyn Write) -> io::Result<()> {
        self.timer = None;
        self.stats.total_time = self.config.report_time.then_some(self.test_time);
        let summary = self.stats.to_string();
        writeln!(out, "{}", summary.style(self.styles.count))
    }
}

fn write_status_line(
    out: &mut dyn Write,
    label: &str,
    style: Style,
    description: &str,
) -> io::Result<()> {
    writeln!(out, "[{:>7}] {description}", label.style(style))
}
