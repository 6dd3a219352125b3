// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::executor::GroupExecutor;
use crate::{
    config::{EngineConfig, TestThreads},
    errors::EngineError,
    events::Listener,
    recorder::ConcurrentRecorder,
    spec::{Group, SpecEntry},
};
use rayon::ThreadPoolBuilder;
use specrun_filtering::Filter;
use std::{
    iter,
    rc::Rc,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tracing::{debug, trace};

mod private {
    pub trait Sealed {}
}

/// How a [`TestEngine`](super::TestEngine) dispatches groups.
///
/// This trait is sealed: the two modes are [`Sequential`] and [`Parallel`].
pub trait RunMode: private::Sealed {
    /// How listeners are held. Parallel mode requires thread-safe listeners.
    type Handle;

    /// Borrows a listener handle as a listener.
    fn as_listener(handle: &Self::Handle) -> &dyn Listener;

    /// Applies the mode-specific parts of `config`.
    fn configure(&mut self, config: &EngineConfig);

    /// Runs every group, notifying `listeners` and then `recorder` of each event.
    fn dispatch(
        &self,
        groups: &[&Group],
        listeners: &[Self::Handle],
        recorder: &ConcurrentRecorder,
        spec_filter: &Filter<SpecEntry>,
    ) -> Result<(), EngineError>;
}

/// Runs groups one at a time on the calling thread, in registration order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl private::Sealed for Sequential {}

impl RunMode for Sequential {
    type Handle = Rc<dyn Listener>;

    fn as_listener(handle: &Self::Handle) -> &dyn Listener {
        &**handle
    }

    fn configure(&mut self, _config: &EngineConfig) {}

    fn dispatch(
        &self,
        groups: &[&Group],
        listeners: &[Self::Handle],
        recorder: &ConcurrentRecorder,
        spec_filter: &Filter<SpecEntry>,
    ) -> Result<(), EngineError> {
        let listeners: Vec<&dyn Listener> = listeners
            .iter()
            .map(Self::as_listener)
            .chain(iter::once(recorder as &dyn Listener))
            .collect();
        let executor = GroupExecutor::new(&listeners, spec_filter);
        for group in groups {
            executor.execute(group);
        }
        Ok(())
    }
}

/// Runs groups on a worker pool. Each group runs start to finish on one worker; groups may
/// finish in any order.
///
/// A worker claims the next unstarted group only once its current group has ended. Test bodies
/// may use rayon themselves: a worker waiting on such work can only pick up pieces of other
/// bodies, never another group, so group events on one thread never nest.
#[derive(Clone, Copy, Debug, Default)]
pub struct Parallel {
    test_threads: TestThreads,
}

impl Parallel {
    /// Creates a parallel mode running on `test_threads` workers.
    pub fn new(test_threads: TestThreads) -> Self {
        Self { test_threads }
    }

    /// Returns the configured number of workers.
    pub fn test_threads(&self) -> TestThreads {
        self.test_threads
    }
}

impl private::Sealed for Parallel {}

impl RunMode for Parallel {
    type Handle = Arc<dyn Listener + Send + Sync>;

    fn as_listener(handle: &Self::Handle) -> &dyn Listener {
        &**handle
    }

    fn configure(&mut self, config: &EngineConfig) {
        self.test_threads = config.test_threads;
    }

    fn dispatch(
        &self,
        groups: &[&Group],
        listeners: &[Self::Handle],
        recorder: &ConcurrentRecorder,
        spec_filter: &Filter<SpecEntry>,
    ) -> Result<(), EngineError> {
        let threads = self.test_threads.compute();
        debug!(threads, groups = groups.len(), "dispatching groups to worker pool");
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("specrun-group-{idx}"))
            .build()
            .map_err(EngineError::ThreadPoolBuild)?;

        // One job per worker. Groups are claimed from `next`, never queued as stealable jobs.
        let next = AtomicUsize::new(0);
        pool.broadcast(|ctx| {
            let listeners: Vec<&dyn Listener> = listeners
                .iter()
                .map(Self::as_listener)
                .chain(iter::once(recorder as &dyn Listener))
                .collect();
            let executor = GroupExecutor::new(&listeners, spec_filter);
            while let Some(group) = groups.get(next.fetch_add(1, Ordering::Relaxed)) {
                trace!(
                    worker = ctx.index(),
                    group = group.description(),
                    "worker claimed group"
                );
                executor.execute(group);
            }
        });
        Ok(())
    }
}
