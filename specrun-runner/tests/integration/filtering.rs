// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::Result;
use pretty_assertions::assert_eq;
use specrun_filtering::Filter;
use specrun_runner::{
    events::ResultStatus,
    recorder::{Recorder, SequentialRecorder},
    runner::TestEngine,
    spec::{Group, SpecEntry},
};
use std::rc::Rc;
use test_case::test_case;

fn run_filtered(
    configure: impl FnOnce(TestEngine) -> TestEngine,
) -> Result<Vec<(String, Vec<(String, ResultStatus)>)>> {
    let recorder = Rc::new(SequentialRecorder::new());
    let mut engine = configure(
        TestEngine::sequential()
            .add(first_test_class())
            .add(second_test_class())
            .listener(recorder.clone())
            .summary_writer(std::io::sink()),
    );
    engine.execute()?;
    Ok(outcomes(&recorder.recorded()))
}

fn only(group: &str, tests: &[&str]) -> (String, Vec<(String, ResultStatus)>) {
    let results = tests
        .iter()
        .map(|test| (test.to_string(), ResultStatus::Success))
        .collect();
    (group.to_owned(), results)
}

#[test]
fn test_group_and_spec_description_filters() -> Result<()> {
    test_init();

    let recorded = run_filtered(|engine| {
        engine
            .filter_by_group_description("First.*")
            .expect("valid pattern")
            .filter_by_spec_description(".*important.*")
            .expect("valid pattern")
    })?;
    assert_eq!(recorded, [only("FirstTestClass", &["important test"])]);
    Ok(())
}

#[test]
fn test_spec_filter_applies_to_every_group() -> Result<()> {
    test_init();

    let recorded = run_filtered(|engine| {
        engine
            .filter_by_spec_description(".*important.*")
            .expect("valid pattern")
    })?;
    assert_eq!(
        recorded,
        [
            only("FirstTestClass", &["important test"]),
            only("SecondTestClass", &["important test 2"]),
        ]
    );
    Ok(())
}

#[test_case(
    Filter::description_contains("Test"),
    Filter::not(Filter::description_equals("SecondTestClass"))

    ; "contains and not"
)]
#[test_case(
    Filter::by_description(".*Class").unwrap(),
    Filter::predicate(|group: &Group| group.description().starts_with("First"))

    ; "regex and predicate"
)]
fn test_class_filter_twice_is_all_of(first: Filter<Group>, second: Filter<Group>) {
    test_init();

    let (first_2, second_2) = (first.clone(), second.clone());
    let chained = run_filtered(|engine| engine.class_filter(first).class_filter(second)).unwrap();
    let combined =
        run_filtered(|engine| engine.class_filter(Filter::all_of([first_2, second_2]))).unwrap();

    assert_eq!(chained, combined);
    assert_eq!(
        chained,
        [only("FirstTestClass", &["test 1", "important test"])]
    );
}

#[test]
fn test_vacuous_filters_run_everything() -> Result<()> {
    test_init();

    let everything = run_filtered(|engine| engine)?;
    let any_of = run_filtered(|engine| {
        engine
            .class_filter(Filter::any_of([]))
            .specification_filter(Filter::<SpecEntry>::any_of([]))
    })?;
    let all_of = run_filtered(|engine| {
        engine
            .class_filter(Filter::all_of([]))
            .specification_filter(Filter::<SpecEntry>::all_of([]))
    })?;

    assert_eq!(everything.len(), 2);
    assert_eq!(any_of, everything);
    assert_eq!(all_of, everything);
    Ok(())
}

#[test]
fn test_invalid_pattern_is_reported() {
    test_init();

    let err = TestEngine::sequential()
        .filter_by_group_description("First(")
        .expect_err("unbalanced parenthesis");
    assert_eq!(err.pattern, "First(");
}
