// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events emitted while a run executes, and the [`Listener`] trait that receives them.
//!
//! Within one group, events arrive in execution order on the thread running that group. Across
//! groups executed in parallel, no ordering is guaranteed.

use crate::errors::TestError;
use std::fmt;

/// The phase of a group, a runnable or a whole run.
///
/// Groups and runnables only use [`Start`](Self::Start) and [`End`](Self::End). The run as a whole
/// additionally uses [`Begin`](Self::Begin) and [`Finish`](Self::Finish).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LifecycleStatus {
    /// The run was requested, before filters are applied.
    Begin,

    /// Execution started.
    Start,

    /// Execution ended.
    End,

    /// The run summary was written.
    Finish,
}

impl LifecycleStatus {
    /// Returns the upper-case label used in console output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Begin => "BEGIN",
            Self::Start => "START",
            Self::End => "END",
            Self::Finish => "FINISH",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The kind of a runnable: a test, or one of the four hooks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RunnableKind {
    /// A test spec.
    Test,

    /// A before-all hook.
    BeforeAll,

    /// A before-each hook.
    BeforeEach,

    /// An after-each hook.
    AfterEach,

    /// An after-all hook.
    AfterAll,
}

impl RunnableKind {
    /// Returns true for tests.
    pub fn is_test(self) -> bool {
        matches!(self, Self::Test)
    }
}

impl fmt::Display for RunnableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Test => "TEST",
            Self::BeforeAll => "BEFORE_ALL",
            Self::BeforeEach => "BEFORE_EACH",
            Self::AfterEach => "AFTER_EACH",
            Self::AfterAll => "AFTER_ALL",
        };
        f.write_str(s)
    }
}

/// The outcome of a test or a failed hook.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ResultStatus {
    /// Completed without raising.
    Success,

    /// Raised an assertion-style failure.
    Failed,

    /// Raised any other error.
    Error,
}

impl ResultStatus {
    /// Returns the upper-case label used in console output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A result reported to listeners.
///
/// The status is derived from the error, so a successful result never carries one.
#[derive(Clone, Debug)]
pub struct TestResult {
    description: String,
    error: Option<TestError>,
}

impl TestResult {
    /// Creates a new result. `None` means success.
    pub fn new(description: impl Into<String>, error: Option<TestError>) -> Self {
        Self {
            description: description.into(),
            error,
        }
    }

    /// Creates a successful result.
    pub fn success(description: impl Into<String>) -> Self {
        Self::new(description, None)
    }

    /// Returns the description of the test or hook this result is for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status of this result.
    pub fn status(&self) -> ResultStatus {
        match &self.error {
            None => ResultStatus::Success,
            Some(TestError::Assertion { .. }) => ResultStatus::Failed,
            Some(TestError::Raised(_)) => ResultStatus::Error,
        }
    }

    /// Returns the error raised, if any.
    pub fn error(&self) -> Option<&TestError> {
        self.error.as_ref()
    }

    /// Returns true if the status is [`ResultStatus::Success`].
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// An observer of run events.
///
/// Listeners are invoked synchronously on the thread executing the group, so they should not
/// block. In parallel runs they are shared across worker threads, which the engine enforces by
/// requiring `Send + Sync` listeners there.
pub trait Listener {
    /// Called when a group starts or ends.
    fn on_group_lifecycle(&self, description: &str, status: LifecycleStatus);

    /// Called when a test or hook starts or ends.
    fn on_runnable_lifecycle(&self, description: &str, kind: RunnableKind, status: LifecycleStatus);

    /// Called for every test result, and for every hook that raised.
    fn on_result(&self, result: &TestResult);

    /// Called at the four phases of the whole run. Does nothing by default.
    fn on_run_lifecycle(&self, status: LifecycleStatus) {
        let _ = status;
    }
}
