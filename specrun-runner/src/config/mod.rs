// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine and reporter configuration.
//!
//! Configuration is layered: the embedded defaults, then an optional TOML file, then `SPECRUN_*`
//! environment variables.

mod test_threads;

pub use test_threads::*;

use crate::errors::ConfigReadError;
use camino::Utf8Path;
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::Deserialize;

/// Environment variables that override config keys.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SPECRUN_TEST_THREADS", "test-threads"),
    ("SPECRUN_RECORD_TIME", "record-time"),
    ("SPECRUN_REPORTER_SUMMARY_ONLY", "reporter.summary-only"),
    ("SPECRUN_REPORTER_REPORT_TIME", "reporter.report-time"),
    ("SPECRUN_REPORTER_COLORIZE", "reporter.colorize"),
];

/// Configuration for a [`TestEngine`](crate::runner::TestEngine).
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    /// The number of threads the parallel engine runs groups on.
    pub test_threads: TestThreads,

    /// Whether the engine's own recorder tracks time spent in tests.
    pub record_time: bool,

    /// Options for console reporters.
    #[serde(default)]
    pub reporter: ReporterConfig,
}

impl EngineConfig {
    /// The default configuration, embedded at build time.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../../default-config.toml");

    /// Reads configuration from the defaults, an optional file, and the process environment.
    pub fn from_sources(config_file: Option<&Utf8Path>) -> Result<Self, ConfigReadError> {
        Self::from_sources_with_env(config_file, |var| std::env::var(var).ok())
    }

    /// Reads configuration from the defaults, an optional file, and environment variables looked
    /// up through `env`.
    pub fn from_sources_with_env(
        config_file: Option<&Utf8Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigReadError> {
        let mut builder = Self::make_default_config();
        if let Some(file) = config_file {
            builder = builder.add_source(File::new(file.as_str(), FileFormat::Toml));
        }
        for (var, key) in ENV_OVERRIDES {
            builder = builder
                .set_override_option(*key, env(var))
                .map_err(|err| ConfigReadError::parse(config_file, err))?;
        }

        Self::build(builder, config_file)
    }

    /// Reads configuration from the defaults overlaid with a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigReadError> {
        let builder = Self::make_default_config().add_source(File::from_str(toml, FileFormat::Toml));
        Self::build(builder, None)
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build(
        builder: ConfigBuilder<DefaultState>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigReadError> {
        builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|err| ConfigReadError::parse(config_file, err))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            test_threads: TestThreads::NumCpus,
            record_time: false,
            reporter: ReporterConfig::default(),
        }
    }
}

/// Options for [`ConsoleReporter`](crate::reporter::ConsoleReporter) and
/// [`ConcurrentConsoleReporter`](crate::reporter::ConcurrentConsoleReporter).
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReporterConfig {
    /// Print only lifecycle and summary lines.
    pub summary_only: bool,

    /// Append elapsed time to each group summary.
    pub report_time: bool,

    /// Color status labels.
    pub colorize: bool,
}
