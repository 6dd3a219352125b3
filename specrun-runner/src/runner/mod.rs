// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test engine: sequential and parallel execution of groups.
//!
//! Both modes run the same per-group algorithm. Sequential mode runs groups one at a time on the
//! calling thread. Parallel mode fans groups out over a worker pool, each group running start to
//! finish on a single worker.

mod executor;
mod imp;
mod mode;

pub use imp::*;
pub use mode::*;
