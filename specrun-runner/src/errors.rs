// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by specrun.

use crate::aggregator::RunStatistics;
use camino::Utf8PathBuf;
use std::{error, fmt, sync::Arc};
use thiserror::Error;

pub use specrun_filtering::errors::FilterParseError;

/// A boxed error returned by a test or hook body.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// The error raised by a test or hook body, as seen by listeners.
#[derive(Clone, Debug, Error)]
pub enum TestError {
    /// An assertion-style failure: the body panicked, or returned an [`AssertionFailure`].
    #[error("{message}")]
    Assertion {
        /// The failure message.
        message: String,
    },

    /// Any other error returned by the body.
    #[error(transparent)]
    Raised(Arc<dyn error::Error + Send + Sync + 'static>),
}

impl TestError {
    /// Creates an assertion-style failure with the given message.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// Converts an error returned by a body.
    ///
    /// An [`AssertionFailure`] becomes [`TestError::Assertion`]; everything else is kept as a
    /// raised error.
    pub fn from_returned(error: BoxError) -> Self {
        match error.downcast::<AssertionFailure>() {
            Ok(failure) => Self::Assertion {
                message: failure.message,
            },
            Err(error) => Self::Raised(Arc::from(error)),
        }
    }

    /// Returns true if this is an assertion-style failure.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion { .. })
    }

    /// Returns a displayer for this error and its chain of causes.
    pub fn display_chain(&self) -> DisplayErrorChain<'_> {
        DisplayErrorChain { error: self }
    }
}

/// Displays an error followed by its `caused by:` chain, one cause per line.
#[derive(Clone, Copy, Debug)]
pub struct DisplayErrorChain<'a> {
    error: &'a TestError,
}

impl fmt::Display for DisplayErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error {
            TestError::Assertion { message } => write!(f, "assertion failed: {message}"),
            TestError::Raised(error) => {
                write!(f, "error: {error}")?;
                let mut source = error.source();
                while let Some(cause) = source {
                    write!(f, "\n  caused by: {cause}")?;
                    source = cause.source();
                }
                Ok(())
            }
        }
    }
}

/// An assertion-style failure that a body can return instead of panicking.
///
/// ```
/// use specrun_runner::errors::{AssertionFailure, BoxError};
///
/// fn check(value: u32) -> Result<(), BoxError> {
///     if value != 42 {
///         return Err(AssertionFailure::new(format!("expected 42, got {value}")).into());
///     }
///     Ok(())
/// }
/// # assert!(check(1).is_err());
/// ```
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct AssertionFailure {
    message: String,
}

impl AssertionFailure {
    /// Creates a new failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An infrastructure error that prevented the engine from running groups or writing its summary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The worker pool for parallel execution could not be created.
    #[error("failed to build worker pool")]
    ThreadPoolBuild(#[source] rayon::ThreadPoolBuildError),

    /// The aggregate summary could not be written.
    #[error("failed to write run summary")]
    WriteSummary(#[source] std::io::Error),
}

/// An error returned by [`TestEngine::execute`](crate::runner::TestEngine::execute).
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// At least one recorded result was not a success.
    #[error("test run failed: {stats}")]
    RunFailed {
        /// Statistics for the run.
        stats: RunStatistics,
    },

    /// The engine itself failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// An error that occurred while reading specrun configuration.
#[derive(Debug, Error)]
pub enum ConfigReadError {
    /// The built-in defaults or a configuration file could not be parsed.
    #[error("failed to read specrun config{}", display_file(.config_file.as_ref()))]
    Parse {
        /// The file being read, if any.
        config_file: Option<Utf8PathBuf>,

        /// The underlying error.
        #[source]
        err: config::ConfigError,
    },
}

impl ConfigReadError {
    pub(crate) fn parse(config_file: Option<&camino::Utf8Path>, err: config::ConfigError) -> Self {
        Self::Parse {
            config_file: config_file.map(|file| file.to_owned()),
            err,
        }
    }
}

fn display_file(file: Option<&Utf8PathBuf>) -> String {
    match file {
        Some(file) => format!(" at `{file}`"),
        None => String::new(),
    }
}

/// Error returned while parsing a [`TestThreads`](crate::config::TestThreads) value.
#[derive(Clone, Debug, Error)]
#[error("unrecognized value for test-threads: {input}")]
pub struct TestThreadsParseError {
    input: String,
}

impl TestThreadsParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}
