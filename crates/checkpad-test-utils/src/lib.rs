// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Checkpad integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without a backend.
//!
//! # Components
//!
//! - [`MockAuthProvider`] - In-memory auth provider with event injection
//! - [`MockStore`] - In-memory data store with failure injection and held selects
//! - [`TestHarness`] - Gate and synchronizer wired to both mocks

pub mod harness;
pub mod mock_auth;
pub mod mock_store;

pub use harness::TestHarness;
pub use mock_auth::{MockAuthProvider, session_for};
pub use mock_store::{MockStore, StoreCall, StoreHold, StoreOp};
