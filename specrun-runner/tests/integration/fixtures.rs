// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use specrun_runner::{
    errors::BoxError,
    events::ResultStatus,
    recorder::RecordedResults,
    spec::{Group, Specification, TestGroup},
};
use std::{
    io::{self, Write},
    sync::{Arc, Mutex, Once},
};

pub(crate) fn test_init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        color_eyre::install().expect("color-eyre installed once");
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// An in-memory sink that can be handed to the engine and read back afterwards.
#[derive(Clone, Debug, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) struct TestClassWithSuccess;

impl TestGroup for TestClassWithSuccess {
    fn description(&self) -> &str {
        "a test class with success"
    }

    fn specify(&self, spec: &mut Specification<'_>) {
        spec.before_all(|| ())
            .after_all(|| ())
            .test("success test", || ())
            .test("error test", || -> Result<(), BoxError> {
                Err("something unexpected".into())
            });
    }
}

pub(crate) fn first_test_class() -> Group {
    Group::from_fn("FirstTestClass", |spec| {
        spec.test("test 1", || ()).test("important test", || ());
    })
}

pub(crate) fn second_test_class() -> Group {
    Group::from_fn("SecondTestClass", |spec| {
        spec.test("test 3", || ()).test("important test 2", || ());
    })
}

/// A group with a mix of outcomes and hooks.
pub(crate) fn mixed_group(index: usize) -> Group {
    Group::from_fn(format!("mixed group {index}"), move |spec| {
        spec.before_each(|| ())
            .after_all(|| ())
            .parameterized("value ", 0..5_usize, move |value| {
                assert!((value + index) % 4 != 3, "value {value} rejected");
            })
            .test("raises", move || -> Result<(), BoxError> {
                if index % 2 == 0 {
                    Err(format!("group {index} raises").into())
                } else {
                    Ok(())
                }
            });
    })
}

/// Recorded results reduced to comparable values.
pub(crate) fn outcomes(recorded: &RecordedResults) -> Vec<(String, Vec<(String, ResultStatus)>)> {
    let mut groups: Vec<_> = recorded
        .groups()
        .iter()
        .map(|(group, results)| {
            let results = results
                .iter()
                .map(|result| (result.description().to_owned(), result.status()))
                .collect();
            (group.clone(), results)
        })
        .collect();
    groups.sort_by(|(a, _), (b, _)| a.cmp(b));
    groups
}
