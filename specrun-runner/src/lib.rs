// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for specrun, a programmatic test-execution framework.
//!
//! Callers describe test groups declaratively (hooks plus tests, see [`spec`]), and a
//! [`TestEngine`](runner::TestEngine) executes them sequentially or in parallel. Results and
//! lifecycle events stream to [`Listener`](events::Listener)s such as the
//! [recorders](recorder) and [console reporters](reporter), and an
//! [aggregator](aggregator::ResultAggregator) summarizes the run.

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod events;
mod helpers;
pub mod recorder;
pub mod reporter;
pub mod runner;
pub mod spec;
mod stopwatch;
