// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side synchronization core for Checkpad.
//!
//! - [`SessionGate`] follows the auth provider and publishes who is signed in.
//! - [`ChecklistSynchronizer`] mirrors the user's checklists, writing through
//!   to the store and reloading after every change.
//! - [`AuthForm`] holds the sign-in form's local state.

pub mod auth_form;
pub mod gate;
pub mod mirror;
pub mod synchronizer;

pub use auth_form::{AuthForm, AuthFormView, AuthMode, CONFIRMATION_NOTICE, FormOutcome};
pub use gate::{GateState, Route, SessionGate, SessionView};
pub use mirror::{DashboardView, Drafts, EmptyState};
pub use synchronizer::{ChecklistSynchronizer, Guard, Outcome, SyncOptions};
