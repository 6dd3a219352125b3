// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::{Result, ensure, eyre};
use indoc::indoc;
use pretty_assertions::assert_eq;
use specrun_runner::{
    aggregator::ResultAggregator,
    config::{EngineConfig, TestThreads},
    recorder::SequentialRecorder,
    reporter::ConsoleReporter,
    runner::TestEngine,
    spec::Group,
};
use std::{rc::Rc, time::Duration};

fn sleepy_group() -> Group {
    Group::from_fn("sleepy", |spec| {
        spec.test("sleeps", || std::thread::sleep(Duration::from_millis(25)));
    })
}

fn elapsed_seconds(line: &str) -> Result<f64> {
    let (_, rest) = line
        .split_once("Time elapsed: ")
        .ok_or_else(|| eyre!("no elapsed time in {line:?}"))?;
    let seconds = rest
        .strip_suffix(" s")
        .ok_or_else(|| eyre!("no unit in {line:?}"))?;
    Ok(seconds.parse()?)
}

#[test]
fn test_time_elapsed_is_positive() -> Result<()> {
    test_init();

    let summary = SharedBuffer::default();
    let recorder = Rc::new(SequentialRecorder::new().track_time(true));
    TestEngine::sequential()
        .add(sleepy_group())
        .listener(recorder.clone())
        .record_time(true)
        .summary_writer(summary.clone())
        .execute()?;

    let line = summary.contents();
    let line = line.trim_end();
    ensure!(
        line.starts_with("Tests run: 1, Succeeded: 1, Failures: 0, Errors: 0 - Time elapsed: "),
        "unexpected summary {line:?}"
    );
    ensure!(elapsed_seconds(line)? >= 0.025, "elapsed time covers the sleep: {line}");

    let aggregated = ResultAggregator::from_recorder(&*recorder).summary();
    ensure!(elapsed_seconds(&aggregated)? > 0.0, "recorder time: {aggregated}");
    Ok(())
}

#[test]
fn test_reporter_time_per_group() -> Result<()> {
    test_init();

    let reporter = Rc::new(
        ConsoleReporter::new(SharedBuffer::default(), std::io::sink()).report_time(true),
    );
    TestEngine::sequential()
        .add(sleepy_group())
        .listener(reporter.clone())
        .summary_writer(std::io::sink())
        .execute()?;

    let (out, _) = Rc::into_inner(reporter)
        .expect("engine dropped its handle")
        .into_inner();
    let contents = out.contents();
    let summary = contents.lines().last().expect("summary line");
    ensure!(elapsed_seconds(summary)? > 0.0, "group time: {summary}");
    Ok(())
}

#[test]
fn test_reporter_time_excludes_hooks() -> Result<()> {
    test_init();

    let reporter = Rc::new(
        ConsoleReporter::new(SharedBuffer::default(), std::io::sink()).report_time(true),
    );
    TestEngine::sequential()
        .add(Group::from_fn("slow setup", |spec| {
            spec.before_all(|| std::thread::sleep(Duration::from_millis(100)))
                .test("no-op", || ());
        }))
        .listener(reporter.clone())
        .summary_writer(std::io::sink())
        .execute()?;

    let (out, _) = Rc::into_inner(reporter)
        .expect("engine dropped its handle")
        .into_inner();
    let contents = out.contents();
    let summary = contents.lines().last().expect("summary line");
    ensure!(
        summary.starts_with("Tests run: 1, Succeeded: 1, Failures: 0, Errors: 0"),
        "unexpected summary {summary:?}"
    );
    // A no-op body can finish within the clock's resolution, which prints no time at all.
    if summary.contains("Time elapsed: ") {
        ensure!(elapsed_seconds(summary)? < 0.1, "hook time was counted: {summary}");
    }
    Ok(())
}

#[test]
fn test_config_drives_engine_and_reporter() -> Result<()> {
    test_init();

    let config = EngineConfig::from_toml_str(indoc! {r#"
        test-threads = 2
        record-time = false

        [reporter]
        summary-only = true
    "#})?;
    assert_eq!(config.test_threads, TestThreads::Count(2));

    let reporter = Rc::new(
        ConsoleReporter::new(SharedBuffer::default(), SharedBuffer::default())
            .with_config(&config.reporter),
    );
    let summary = SharedBuffer::default();
    TestEngine::sequential()
        .with_config(&config)
        .add(TestClassWithSuccess)
        .listener(reporter.clone())
        .summary_writer(summary.clone())
        .execute_without_throwing();

    let (out, err) = Rc::into_inner(reporter)
        .expect("engine dropped its handle")
        .into_inner();
    assert_eq!(
        out.contents(),
        "[  START] a test class with success\n\
         Tests run: 2, Succeeded: 1, Failures: 0, Errors: 1\n"
    );
    assert_eq!(err.contents(), "error test: error: something unexpected\n");
    assert_eq!(
        summary.contents(),
        "Tests run: 2, Succeeded: 1, Failures: 0, Errors: 1\n"
    );
    Ok(())
}
