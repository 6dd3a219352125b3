// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::TestError,
    helpers::panic_message,
    spec::{GroupExtension, SpecStore, Specification},
};
use specrun_filtering::Described;
use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::OnceLock,
};
use tracing::debug;

/// A named collection of hooks and tests.
///
/// ```
/// use specrun_runner::spec::{Specification, TestGroup};
///
/// struct Arithmetic;
///
/// impl TestGroup for Arithmetic {
///     fn description(&self) -> &str {
///         "arithmetic"
///     }
///
///     fn specify(&self, spec: &mut Specification<'_>) {
///         spec.test("addition", || assert_eq!(1 + 1, 2))
///             .test("subtraction", || assert_eq!(3 - 1, 2));
///     }
/// }
/// ```
pub trait TestGroup: Send + Sync {
    /// The description of this group. Not required to be unique.
    fn description(&self) -> &str;

    /// Registers this group's hooks and tests.
    ///
    /// Called at most once per [`Group`].
    fn specify(&self, spec: &mut Specification<'_>);
}

struct FnGroup<F> {
    description: String,
    f: F,
}

impl<F> TestGroup for FnGroup<F>
where
    F: Fn(&mut Specification<'_>) + Send + Sync,
{
    fn description(&self) -> &str {
        &self.description
    }

    fn specify(&self, spec: &mut Specification<'_>) {
        (self.f)(spec)
    }
}

/// A test group as held by the engine: the caller's [`TestGroup`], its extensions and its lazily
/// built [`SpecStore`].
pub struct Group {
    inner: Box<dyn TestGroup>,
    extensions: Vec<Box<dyn GroupExtension>>,
    store: OnceLock<Result<SpecStore, TestError>>,
}

impl Group {
    /// Wraps a test group.
    pub fn new(group: impl TestGroup + 'static) -> Self {
        Self {
            inner: Box::new(group),
            extensions: Vec::new(),
            store: OnceLock::new(),
        }
    }

    /// Creates a group from a description and a `specify` closure.
    pub fn from_fn<F>(description: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Specification<'_>) + Send + Sync + 'static,
    {
        Self::new(FnGroup {
            description: description.into(),
            f,
        })
    }

    /// Attaches an extension that adds hooks to this group.
    ///
    /// If the store has already been built, the extension is applied to it immediately.
    pub fn with_extension(mut self, extension: impl GroupExtension + 'static) -> Self {
        if let Some(Ok(store)) = self.store.get_mut() {
            extension.extend(&mut store.hooks);
        }
        self.extensions.push(Box::new(extension));
        self
    }

    /// Returns the description of this group.
    pub fn description(&self) -> &str {
        self.inner.description()
    }

    /// Returns the store, building it on first access.
    ///
    /// `specify` runs exactly once, even if it panics: later calls return the same store, or the
    /// same error.
    pub fn store(&self) -> Result<&SpecStore, TestError> {
        self.store
            .get_or_init(|| self.build_store())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns true if the store has been built.
    pub fn is_specified(&self) -> bool {
        self.store.get().is_some()
    }

    fn build_store(&self) -> Result<SpecStore, TestError> {
        let mut store = SpecStore::default();
        catch_unwind(AssertUnwindSafe(|| {
            self.inner.specify(&mut Specification::new(&mut store))
        }))
        .map_err(|payload| TestError::assertion(panic_message(&*payload)))?;

        for extension in &self.extensions {
            extension.extend(&mut store.hooks);
        }
        debug!(
            group = self.description(),
            specs = store.specs().len(),
            hooks = store.hooks().len(),
            "built specification store"
        );
        Ok(store)
    }
}

impl<T: TestGroup + 'static> From<T> for Group {
    fn from(group: T) -> Self {
        Self::new(group)
    }
}

impl Described for Group {
    fn description(&self) -> &str {
        self.inner.description()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("description", &self.description())
            .field("extensions", &self.extensions.len())
            .field("store", &self.store.get())
            .finish()
    }
}
