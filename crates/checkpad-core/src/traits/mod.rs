// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators.
//!
//! Both adapters extend the [`Adapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod auth;
pub mod store;

pub use adapter::Adapter;
pub use auth::{AuthProvider, SessionSubscription};
pub use store::DataStore;
