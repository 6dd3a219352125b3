// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::TestError,
    events::{LifecycleStatus, Listener, RunnableKind, TestResult},
    spec::{Body, Group, HookKind, SpecEntry, SpecStore},
};
use specrun_filtering::Filter;
use tracing::{debug, trace};

/// Runs a single group on the current thread, broadcasting events to every listener in order.
pub(super) struct GroupExecutor<'a> {
    listeners: &'a [&'a dyn Listener],
    spec_filter: &'a Filter<SpecEntry>,
    filters_specs: bool,
}

impl<'a> GroupExecutor<'a> {
    pub(super) fn new(
        listeners: &'a [&'a dyn Listener],
        spec_filter: &'a Filter<SpecEntry>,
    ) -> Self {
        Self {
            listeners,
            spec_filter,
            filters_specs: !spec_filter.is_trivial(),
        }
    }

    /// Executes every hook and every spec accepted by the filter, in registration order.
    ///
    /// Failures never escape: every error raised by a body becomes a result.
    pub(super) fn execute(&self, group: &Group) {
        let description = group.description();
        self.group_lifecycle(description, LifecycleStatus::Start);

        match group.store() {
            Ok(store) => self.execute_store(store),
            Err(error) => {
                debug!(group = description, "specify raised, no tests run");
                self.result(&TestResult::new(description, Some(error)));
            }
        }

        self.group_lifecycle(description, LifecycleStatus::End);
    }

    fn execute_store(&self, store: &SpecStore) {
        self.run_hooks(store, HookKind::BeforeAll);

        for spec in store.specs() {
            if self.filters_specs && !self.spec_filter.include(spec) {
                debug!(spec = spec.description(), "spec skipped by specification filter");
                continue;
            }

            self.run_hooks(store, HookKind::BeforeEach);
            trace!(spec = spec.description(), "running test");
            let outcome = self.run_body(spec.description(), RunnableKind::Test, spec.body());
            self.result(&TestResult::new(spec.description(), outcome.err()));
            self.runnable_lifecycle(spec.description(), RunnableKind::Test, LifecycleStatus::End);
            self.run_hooks(store, HookKind::AfterEach);
        }

        self.run_hooks(store, HookKind::AfterAll);
    }

    // Hooks only produce a result when they raise.
    fn run_hooks(&self, store: &SpecStore, kind: HookKind) {
        let runnable = kind.runnable_kind();
        for hook in store.hooks().get(kind) {
            if let Err(error) = self.run_body(hook.description(), runnable, hook.body()) {
                self.result(&TestResult::new(hook.description(), Some(error)));
            }
            self.runnable_lifecycle(hook.description(), runnable, LifecycleStatus::End);
        }
    }

    // Emits START and invokes the body. The caller reports the outcome before emitting END.
    fn run_body(
        &self,
        description: &str,
        kind: RunnableKind,
        body: &Body,
    ) -> Result<(), TestError> {
        self.runnable_lifecycle(description, kind, LifecycleStatus::Start);
        body.invoke()
    }

    fn group_lifecycle(&self, description: &str, status: LifecycleStatus) {
        for listener in self.listeners {
            listener.on_group_lifecycle(description, status);
        }
    }

    fn runnable_lifecycle(&self, description: &str, kind: RunnableKind, status: LifecycleStatus) {
        for listener in self.listeners {
            listener.on_runnable_lifecycle(description, kind, status);
        }
    }

    fn result(&self, result: &TestResult) {
        for listener in self.listeners {
            listener.on_result(result);
        }
    }
}
