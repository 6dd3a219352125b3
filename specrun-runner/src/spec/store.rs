// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{BoxError, TestError},
    events::RunnableKind,
    helpers::panic_message,
    spec::parameterized,
};
use debug_ignore::DebugIgnore;
use specrun_filtering::Described;
use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

/// The return value of a test or hook body.
///
/// Bodies either return `()`, in which case only a panic counts as a failure, or a `Result` whose
/// error is reported.
pub trait IntoOutcome {
    /// Converts the value into the body's outcome.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// A zero-argument, possibly-failing body shared by hooks and test specs.
#[derive(Clone)]
pub struct Body {
    f: Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync>,
}

impl Body {
    /// Wraps a closure into a body.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        Self {
            f: Arc::new(move || f().into_outcome()),
        }
    }

    /// Runs the body, converting panics and returned errors into a [`TestError`].
    ///
    /// Every panic is an assertion-style failure, whatever raised it: `assert!` and friends, an
    /// explicit `panic!`, `Option::unwrap` on `None` or an out-of-bounds index all look the same
    /// once unwound, since `assert!` with a custom message leaves no trace of its origin in the
    /// payload. To report an ERROR, return an error instead of panicking.
    ///
    /// A returned error is an assertion-style failure if it is an
    /// [`AssertionFailure`](crate::errors::AssertionFailure), and a raised error otherwise.
    pub fn invoke(&self) -> Result<(), TestError> {
        match catch_unwind(AssertUnwindSafe(|| (self.f)())) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(TestError::from_returned(error)),
            Err(payload) => Err(TestError::assertion(panic_message(&*payload))),
        }
    }
}

/// The four kinds of hooks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HookKind {
    /// Runs once before any test in the group.
    BeforeAll,

    /// Runs before every test in the group.
    BeforeEach,

    /// Runs after every test in the group.
    AfterEach,

    /// Runs once after every test in the group.
    AfterAll,
}

impl HookKind {
    /// All hook kinds, in execution order.
    pub const ALL: [HookKind; 4] = [
        HookKind::BeforeAll,
        HookKind::BeforeEach,
        HookKind::AfterEach,
        HookKind::AfterAll,
    ];

    /// The description given to hooks registered without one.
    pub fn default_description(self) -> &'static str {
        match self {
            HookKind::BeforeAll => "before all",
            HookKind::BeforeEach => "before each",
            HookKind::AfterEach => "after each",
            HookKind::AfterAll => "after all",
        }
    }

    /// The runnable kind reported in lifecycle events for this hook.
    pub fn runnable_kind(self) -> RunnableKind {
        match self {
            HookKind::BeforeAll => RunnableKind::BeforeAll,
            HookKind::BeforeEach => RunnableKind::BeforeEach,
            HookKind::AfterEach => RunnableKind::AfterEach,
            HookKind::AfterAll => RunnableKind::AfterAll,
        }
    }
}

/// A registered before/after hook.
#[derive(Clone, Debug)]
pub struct HookEntry {
    description: String,
    body: DebugIgnore<Body>,
}

impl HookEntry {
    /// Creates a new hook entry.
    pub fn new<F, R>(description: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        Self {
            description: description.into(),
            body: DebugIgnore(Body::new(f)),
        }
    }

    /// Returns the description of this hook.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the body of this hook.
    pub fn body(&self) -> &Body {
        &self.body
    }
}

/// A registered test: a description and a body.
#[derive(Clone, Debug)]
pub struct SpecEntry {
    description: String,
    body: DebugIgnore<Body>,
}

impl SpecEntry {
    /// Creates a new test spec entry.
    pub fn new<F, R>(description: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        Self {
            description: description.into(),
            body: DebugIgnore(Body::new(f)),
        }
    }

    /// Returns the description of this test.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the body of this test.
    pub fn body(&self) -> &Body {
        &self.body
    }
}

impl Described for SpecEntry {
    fn description(&self) -> &str {
        &self.description
    }
}

/// The four ordered hook lists of a group.
#[derive(Clone, Debug, Default)]
pub struct Hooks {
    before_all: Vec<HookEntry>,
    before_each: Vec<HookEntry>,
    after_each: Vec<HookEntry>,
    after_all: Vec<HookEntry>,
}

impl Hooks {
    /// Returns the hooks of the given kind, in execution order.
    pub fn get(&self, kind: HookKind) -> &[HookEntry] {
        match kind {
            HookKind::BeforeAll => &self.before_all,
            HookKind::BeforeEach => &self.before_each,
            HookKind::AfterEach => &self.after_each,
            HookKind::AfterAll => &self.after_all,
        }
    }

    /// Returns the mutable list of hooks of the given kind.
    pub fn get_mut(&mut self, kind: HookKind) -> &mut Vec<HookEntry> {
        match kind {
            HookKind::BeforeAll => &mut self.before_all,
            HookKind::BeforeEach => &mut self.before_each,
            HookKind::AfterEach => &mut self.after_each,
            HookKind::AfterAll => &mut self.after_all,
        }
    }

    /// Adds a hook that runs after every existing hook of the same kind.
    pub fn append(&mut self, kind: HookKind, entry: HookEntry) {
        self.get_mut(kind).push(entry);
    }

    /// Adds a hook that runs before every existing hook of the same kind.
    pub fn prepend(&mut self, kind: HookKind, entry: HookEntry) {
        self.get_mut(kind).insert(0, entry);
    }

    /// Returns the total number of hooks across all kinds.
    pub fn len(&self) -> usize {
        HookKind::ALL.iter().map(|&kind| self.get(kind).len()).sum()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The hooks and tests registered by a group.
///
/// Built once per group by [`Group::store`](crate::spec::Group::store), then read-only.
#[derive(Clone, Debug, Default)]
pub struct SpecStore {
    pub(super) hooks: Hooks,
    specs: Vec<SpecEntry>,
}

impl SpecStore {
    /// Returns the hooks of this group.
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Returns the tests of this group, in registration order.
    pub fn specs(&self) -> &[SpecEntry] {
        &self.specs
    }
}

/// The registrar handed to [`TestGroup::specify`](crate::spec::TestGroup::specify).
///
/// Registration is only possible while a group is being specified: outside of `specify` there is
/// no way to obtain a `Specification`.
pub struct Specification<'a> {
    store: &'a mut SpecStore,
}

impl<'a> Specification<'a> {
    pub(super) fn new(store: &'a mut SpecStore) -> Self {
        Self { store }
    }

    /// Registers a test.
    pub fn test<F, R>(&mut self, description: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.store.specs.push(SpecEntry::new(description, f));
        self
    }

    /// Registers one test per parameter. Each description is `template` followed by the
    /// parameter's `Display` form.
    pub fn parameterized<P, I, F, R>(&mut self, template: &str, params: I, f: F) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: fmt::Display + Send + Sync + 'static,
        F: Fn(&P) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.parameterized_with_labels(template, params, |param| param.to_string(), f)
    }

    /// Registers one test per parameter. Each description is `template` followed by the label
    /// computed for the parameter.
    pub fn parameterized_with_labels<P, I, L, F, R>(
        &mut self,
        template: &str,
        params: I,
        label: L,
        f: F,
    ) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Send + Sync + 'static,
        L: Fn(&P) -> String,
        F: Fn(&P) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.store
            .specs
            .extend(parameterized::expand(template, params, label, f));
        self
    }

    /// Registers a hook that runs once before any test.
    pub fn before_all<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.hook(HookKind::BeforeAll, HookKind::BeforeAll.default_description(), f)
    }

    /// Registers a described hook that runs once before any test.
    pub fn before_all_described<F, R>(&mut self, description: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.hook(HookKind::BeforeAll, description, f)
    }

    /// Registers a hook that runs before every test.
    pub fn before_each<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.hook(HookKind::BeforeEach, HookKind::BeforeEach.default_description(), f)
    }

    /// Registers a described hook that runs before every test.
    pub fn before_each_described<F, R>(
        &mut self,
        description: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.hook(HookKind::BeforeEach, description, f)
    }

    /// Registers a hook that runs after every test.
    pub fn after_each<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.hook(HookKind::AfterEach, HookKind::AfterEach.default_description(), f)
    }

    /// Registers a described hook that runs after every test.
    pub fn after_each_described<F, R>(&mut self, description: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.hook(HookKind::AfterEach, description, f)
    }

    /// Registers a hook that runs once after every test.
    pub fn after_all<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.hook(HookKind::AfterAll, HookKind::AfterAll.default_description(), f)
    }

    /// Registers a described hook that runs once after every test.
    pub fn after_all_described<F, R>(&mut self, description: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.hook(HookKind::AfterAll, description, f)
    }

    fn hook<F, R>(&mut self, kind: HookKind, description: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.store.hooks.append(kind, HookEntry::new(description, f));
        self
    }
}
