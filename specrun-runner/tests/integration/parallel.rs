// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::{Result, ensure};
use pretty_assertions::assert_eq;
use rayon::prelude::*;
use specrun_runner::{
    config::TestThreads,
    events::{LifecycleStatus, Listener, RunnableKind, TestResult},
    recorder::{ConcurrentRecorder, Recorder, SequentialRecorder},
    reporter::ConcurrentConsoleReporter,
    runner::TestEngine,
    spec::Group,
};
use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
    sync::{Arc, Mutex},
    thread::{self, ThreadId},
};

const GROUPS: usize = 12;

#[test]
fn test_parallel_matches_sequential() -> Result<()> {
    test_init();

    let sequential = Rc::new(SequentialRecorder::new());
    let mut engine = TestEngine::sequential()
        .listener(sequential.clone())
        .summary_writer(std::io::sink());
    for index in 0..GROUPS {
        engine = engine.add(mixed_group(index));
    }
    let sequential_stats = engine.run()?;

    let parallel = Arc::new(ConcurrentRecorder::new());
    let mut engine = TestEngine::parallel_with_threads(TestThreads::Count(4))
        .listener(parallel.clone())
        .summary_writer(std::io::sink());
    for index in 0..GROUPS {
        engine = engine.add(mixed_group(index));
    }
    let parallel_stats = engine.run()?;

    assert_eq!(sequential_stats, parallel_stats);
    assert_eq!(outcomes(&sequential.recorded()), outcomes(&parallel.recorded()));
    ensure!(!parallel.is_success(), "mixed groups contain failures");
    Ok(())
}

#[test]
fn test_parallel_runs_groups_on_workers() -> Result<()> {
    test_init();

    let threads = Arc::new(Mutex::new(HashSet::new()));
    let mut engine = TestEngine::parallel_with_threads(TestThreads::Count(2))
        .summary_writer(std::io::sink());
    for index in 0..4 {
        let threads = threads.clone();
        engine = engine.add(Group::from_fn(format!("group {index}"), move |spec| {
            let threads = threads.clone();
            spec.test("records thread", move || {
                let name = thread::current().name().map(str::to_owned);
                threads.lock().unwrap().insert(name);
            });
        }));
    }
    engine.execute()?;

    let threads = threads.lock().unwrap();
    ensure!(
        threads
            .iter()
            .all(|name| name.as_deref().is_some_and(|name| name.starts_with("specrun-group-"))),
        "groups run on the worker pool: {threads:?}"
    );
    Ok(())
}

#[test]
fn test_concurrent_reporter_keeps_groups_together() -> Result<()> {
    test_init();

    let out = SharedBuffer::default();
    let reporter = Arc::new(ConcurrentConsoleReporter::new(out.clone(), std::io::sink()));
    let mut engine = TestEngine::parallel()
        .listener(reporter)
        .summary_writer(std::io::sink());
    for index in 0..GROUPS {
        engine = engine.add(mixed_group(index));
    }
    engine.run()?;

    let contents = out.contents();
    let lines: Vec<_> = contents.lines().collect();
    // START, five parameterized tests, "raises", summary.
    assert_eq!(lines.len(), GROUPS * 8);
    let mut seen = HashSet::new();
    for block in lines.chunks(8) {
        let group = block[0]
            .strip_prefix("[  START] ")
            .expect("each block starts with a group");
        ensure!(seen.insert(group.to_owned()), "{group} reported once");
        ensure!(
            block[7].starts_with("Tests run: 6,"),
            "block for {group} ends with its summary: {block:?}"
        );
    }
    Ok(())
}

/// Tracks how many groups are open on each thread at once.
#[derive(Default)]
struct GroupNesting {
    open: Mutex<HashMap<ThreadId, usize>>,
    max_depth: Mutex<usize>,
}

impl Listener for GroupNesting {
    fn on_group_lifecycle(&self, _description: &str, status: LifecycleStatus) {
        let mut open = self.open.lock().unwrap();
        let depth = open.entry(thread::current().id()).or_default();
        match status {
            LifecycleStatus::Start => {
                *depth += 1;
                let mut max_depth = self.max_depth.lock().unwrap();
                *max_depth = (*max_depth).max(*depth);
            }
            LifecycleStatus::End => *depth -= 1,
            LifecycleStatus::Begin | LifecycleStatus::Finish => {}
        }
    }

    fn on_runnable_lifecycle(&self, _: &str, _: RunnableKind, _: LifecycleStatus) {}

    fn on_result(&self, _: &TestResult) {}
}

fn rayon_group(index: usize) -> Group {
    Group::from_fn(format!("rayon group {index}"), |spec| {
        spec.test("uses the pool", || {
            let (left, right) = rayon::join(
                || (0..4096_u64).into_par_iter().sum::<u64>(),
                || (0..4096_u64).into_par_iter().map(|n| n % 7).sum::<u64>(),
            );
            assert!(left > right);
        })
        .test("no-op", || ());
    })
}

#[test]
fn test_bodies_using_rayon_keep_groups_apart() -> Result<()> {
    test_init();

    const RAYON_GROUPS: usize = 200;
    let nesting = Arc::new(GroupNesting::default());
    let recorder = Arc::new(ConcurrentRecorder::new());
    let out = SharedBuffer::default();
    let mut engine = TestEngine::parallel_with_threads(TestThreads::Count(8))
        .listener(nesting.clone())
        .listener(recorder.clone())
        .listener(Arc::new(ConcurrentConsoleReporter::new(
            out.clone(),
            std::io::sink(),
        )))
        .summary_writer(std::io::sink());
    for index in 0..RAYON_GROUPS {
        engine = engine.add(rayon_group(index));
    }
    let stats = engine.execute()?;

    assert_eq!(*nesting.max_depth.lock().unwrap(), 1);
    assert_eq!(stats.run(), RAYON_GROUPS * 2);
    let recorded = recorder.recorded();
    let recorded_count: usize = recorded.groups().values().map(Vec::len).sum();
    assert_eq!(recorded_count, RAYON_GROUPS * 2);

    let contents = out.contents();
    ensure!(
        contents.matches("Tests run: 2, Succeeded: 2, Failures: 0, Errors: 0").count()
            == RAYON_GROUPS,
        "every group reports its own summary"
    );
    Ok(())
}
