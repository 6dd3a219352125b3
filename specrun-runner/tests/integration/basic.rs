// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::{Result, ensure};
use pretty_assertions::assert_eq;
use specrun_runner::{
    errors::{BoxError, ExecuteError},
    events::ResultStatus,
    recorder::{Recorder, RunTimingRecorder, SequentialRecorder},
    reporter::ConsoleReporter,
    runner::TestEngine,
    spec::{Group, HookEntry, HookKind, Hooks},
};
use std::{
    rc::Rc,
    sync::{Arc, Mutex},
};

#[test]
fn test_class_with_success_output() -> Result<()> {
    test_init();

    let reporter = Rc::new(ConsoleReporter::new(
        SharedBuffer::default(),
        SharedBuffer::default(),
    ));
    let summary = SharedBuffer::default();
    let succeeded = TestEngine::sequential()
        .add(TestClassWithSuccess)
        .listener(reporter.clone())
        .summary_writer(summary.clone())
        .execute_without_throwing();
    ensure!(!succeeded, "an ERROR result fails the run");

    let reporter = Rc::into_inner(reporter).expect("engine dropped its handle");
    let (out, err) = reporter.into_inner();
    assert_eq!(
        out.contents(),
        "[  START] a test class with success\n\
         [SUCCESS] success test\n\
         [  ERROR] error test\n\
         Tests run: 2, Succeeded: 1, Failures: 0, Errors: 1\n"
    );
    assert_eq!(err.contents(), "error test: error: something unexpected\n");
    assert_eq!(
        summary.contents(),
        "Tests run: 2, Succeeded: 1, Failures: 0, Errors: 1\n"
    );

    Ok(())
}

#[test]
fn test_execute_signals_run_failure() -> Result<()> {
    test_init();

    let mut engine = TestEngine::sequential()
        .add(TestClassWithSuccess)
        .summary_writer(std::io::sink());
    match engine.execute() {
        Err(ExecuteError::RunFailed { stats }) => {
            assert_eq!(stats.succeeded, 1);
            assert_eq!(stats.errors, 1);
        }
        other => panic!("expected run failure, found {other:?}"),
    }

    let mut engine = TestEngine::sequential()
        .add(first_test_class())
        .summary_writer(std::io::sink());
    let stats = engine.execute()?;
    assert_eq!(stats.run(), 2);
    ensure!(engine.execute_without_throwing(), "second run also succeeds");

    Ok(())
}

#[test]
fn test_hook_and_test_order() -> Result<()> {
    test_init();

    let log = Arc::new(Mutex::new(Vec::new()));
    let group = {
        let log = log.clone();
        Group::from_fn("ordered", move |spec| {
            let record = |entry: &'static str| {
                let log = log.clone();
                move || log.lock().unwrap().push(entry)
            };
            spec.before_all(record("before all 1"))
                .before_all(record("before all 2"))
                .before_each(record("before each"))
                .after_each(record("after each"))
                .after_all(record("after all"))
                .test("first", record("first"))
                .test("second", record("second"));
        })
    };

    TestEngine::sequential()
        .add(group)
        .summary_writer(std::io::sink())
        .execute()?;

    assert_eq!(
        *log.lock().unwrap(),
        [
            "before all 1",
            "before all 2",
            "before each",
            "first",
            "after each",
            "before each",
            "second",
            "after each",
            "after all",
        ]
    );
    Ok(())
}

#[test]
fn test_failing_hooks_are_attributed_to_the_hook() -> Result<()> {
    test_init();

    let recorder = Rc::new(SequentialRecorder::new());
    let group = Group::from_fn("hooks fail", |spec| {
        spec.before_all_described("open database", || -> Result<(), BoxError> {
            Err("database unavailable".into())
        })
        .after_each(|| assert_eq!(2 + 2, 5, "cleanup check"))
        .test("runs anyway", || ());
    });
    let stats = TestEngine::sequential()
        .add(group)
        .listener(recorder.clone())
        .summary_writer(std::io::sink())
        .run()?;

    let recorded = recorder.recorded();
    let results: Vec<_> = recorded
        .results_for("hooks fail")
        .expect("group recorded")
        .iter()
        .map(|result| (result.description(), result.status()))
        .collect();
    assert_eq!(
        results,
        [
            ("open database", ResultStatus::Error),
            ("runs anyway", ResultStatus::Success),
            ("after each", ResultStatus::Failed),
        ]
    );
    assert_eq!(stats.run(), 3);
    ensure!(!recorder.is_success(), "hook failures fail the run");
    Ok(())
}

#[test]
fn test_extension_injects_hooks() -> Result<()> {
    test_init();

    let log = Arc::new(Mutex::new(Vec::new()));
    let own_log = log.clone();
    let injected_log = log.clone();
    let group = Group::from_fn("extended", move |spec| {
        let before = own_log.clone();
        let test = own_log.clone();
        spec.before_all(move || before.lock().unwrap().push("own before all"))
            .test("t", move || test.lock().unwrap().push("test"));
    })
    .with_extension(move |hooks: &mut Hooks| {
        let setup = injected_log.clone();
        let teardown = injected_log.clone();
        hooks.prepend(
            HookKind::BeforeAll,
            HookEntry::new("inject mocks", move || setup.lock().unwrap().push("inject")),
        );
        hooks.append(
            HookKind::AfterAll,
            HookEntry::new("verify mocks", move || {
                teardown.lock().unwrap().push("verify")
            }),
        );
    });

    TestEngine::sequential()
        .add(group)
        .summary_writer(std::io::sink())
        .execute()?;

    assert_eq!(
        *log.lock().unwrap(),
        ["inject", "own before all", "test", "verify"]
    );
    Ok(())
}

#[test]
fn test_run_timing() -> Result<()> {
    test_init();

    let timing = Rc::new(RunTimingRecorder::new());
    TestEngine::sequential()
        .add(Group::from_fn("sleepy", |spec| {
            spec.test("sleeps", || std::thread::sleep(std::time::Duration::from_millis(20)));
        }))
        .listener(timing.clone())
        .summary_writer(std::io::sink())
        .execute()?;

    let dispatch = timing.dispatch_time().expect("dispatch time recorded");
    let wall = timing.wall_time().expect("wall time recorded");
    ensure!(
        dispatch >= std::time::Duration::from_millis(20),
        "dispatch time {dispatch:?} covers the test"
    );
    ensure!(wall >= dispatch, "wall time {wall:?} covers dispatch {dispatch:?}");
    ensure!(
        timing.finished_at() >= timing.started_at(),
        "run finishes after it starts"
    );
    Ok(())
}
