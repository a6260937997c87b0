// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end synchronizer tests.
//!
//! `TestHarness` starts a session gate over a [`MockAuthProvider`], waits for
//! it to resolve, and builds a [`ChecklistSynchronizer`] over a [`MockStore`].

use std::sync::Arc;

use checkpad_core::{AuthProvider, DataStore};
use checkpad_sync::{ChecklistSynchronizer, SessionGate, SyncOptions};

use crate::mock_auth::MockAuthProvider;
use crate::mock_store::MockStore;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    user_id: Option<String>,
    options: SyncOptions,
    store: Option<Arc<MockStore>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            user_id: Some("user-1".to_string()),
            options: SyncOptions::default(),
            store: None,
        }
    }

    /// Start signed in as `user_id` (the default is `user-1`).
    pub fn signed_in_as(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Start with nobody signed in.
    pub fn signed_out(mut self) -> Self {
        self.user_id = None;
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a pre-seeded store.
    pub fn with_store(mut self, store: Arc<MockStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Starts the gate and waits until it has resolved.
    pub async fn build(self) -> TestHarness {
        let auth = Arc::new(match &self.user_id {
            Some(user_id) => MockAuthProvider::signed_in(user_id),
            None => MockAuthProvider::new(),
        });
        let store = self.store.unwrap_or_default();

        let gate = SessionGate::start(auth.clone() as Arc<dyn AuthProvider>);
        let mut view = gate.view();
        view.wait_resolved().await;

        let sync = ChecklistSynchronizer::new(
            store.clone() as Arc<dyn DataStore>,
            auth.clone() as Arc<dyn AuthProvider>,
            gate.view(),
            self.options,
        );

        TestHarness {
            auth,
            store,
            gate,
            sync,
        }
    }
}

/// A gate and synchronizer running against in-memory mocks.
pub struct TestHarness {
    pub auth: Arc<MockAuthProvider>,
    pub store: Arc<MockStore>,
    pub gate: SessionGate,
    pub sync: ChecklistSynchronizer,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness signed in as `user-1` with default options.
    pub async fn signed_in() -> Self {
        Self::builder().build().await
    }
}
