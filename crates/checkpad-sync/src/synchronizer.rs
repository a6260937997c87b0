// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checklist synchronizer: every mutation is written to the store and then
//! followed by a full reload of the user's checklists.
//!
//! The mirror is never edited optimistically. Reloads are numbered when
//! they are dispatched and the mirror only takes a result newer than the
//! last one it applied, so overlapping reloads settle on the latest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use checkpad_config::model::SyncConfig;
use checkpad_core::rows::decode_checklists;
use checkpad_core::types::{Direction, NestedSelect};
use checkpad_core::{
    AuthProvider, Checklist, ChecklistId, CheckpadError, DataStore, Entity, Row, SelectQuery,
    Task, UserId,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::gate::SessionView;
use crate::mirror::{Applied, DashboardView, Mirror};

/// Why a request was rejected before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    EmptyTitle,
    NoUser,
    NoSelection,
}

/// Result of a synchronizer operation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The request went through and the reload that followed was applied.
    Applied,
    /// The request went through but a newer reload overtook this one.
    Superseded,
    /// Nothing was sent.
    Ignored(Guard),
    /// The store reported a failure; the message is in the error slot.
    Failed(String),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied | Outcome::Superseded)
    }
}

/// Behaviour switches for the synchronizer.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Empty the error slot after a mutation and its reload both succeed.
    pub clear_stale_errors: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            clear_stale_errors: true,
        }
    }
}

impl SyncOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            clear_stale_errors: config.clear_stale_errors,
        }
    }
}

/// Owns the local mirror of the signed-in user's checklists.
pub struct ChecklistSynchronizer {
    store: Arc<dyn DataStore>,
    auth: Arc<dyn AuthProvider>,
    session: SessionView,
    options: SyncOptions,
    mirror: Mutex<Mirror>,
    dispatched: AtomicU64,
}

impl ChecklistSynchronizer {
    pub fn new(
        store: Arc<dyn DataStore>,
        auth: Arc<dyn AuthProvider>,
        session: SessionView,
        options: SyncOptions,
    ) -> Self {
        Self {
            store,
            auth,
            session,
            options,
            mirror: Mutex::new(Mirror::default()),
            dispatched: AtomicU64::new(0),
        }
    }

    fn mirror(&self) -> MutexGuard<'_, Mirror> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.mirror.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn user_id(&self) -> Option<UserId> {
        self.session.user_id()
    }

    /// Copy of the current dashboard state.
    pub fn snapshot(&self) -> DashboardView {
        self.mirror().view()
    }

    /// Fetches every checklist of the signed-in user and replaces the mirror.
    pub async fn load_all(&self) -> Outcome {
        let Some(user_id) = self.user_id() else {
            return Outcome::Ignored(Guard::NoUser);
        };
        self.reload(&user_id, false).await
    }

    /// Whether `user_id` is still the signed-in user.
    fn owns_mirror(&self, user_id: &UserId) -> bool {
        self.user_id().as_ref() == Some(user_id)
    }

    async fn reload(&self, user_id: &UserId, after_mutation: bool) -> Outcome {
        if !self.owns_mirror(user_id) {
            debug!(user_id = %user_id, "user changed; skipping reload");
            return Outcome::Superseded;
        }
        let seq = self.dispatched.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, user_id = %user_id, "reloading checklists");

        let result = self
            .fetch(user_id)
            .await
            .map_err(|e| e.user_message());
        let failure = result.as_ref().err().cloned();

        let clear_error = after_mutation && self.options.clear_stale_errors;
        let applied = {
            let mut mirror = self.mirror();
            if self.owns_mirror(user_id) {
                mirror.apply_fetch(seq, result, clear_error)
            } else {
                debug!(seq, user_id = %user_id, "user changed; discarding fetch");
                Applied::Stale
            }
        };

        match (applied, failure) {
            (Applied::Stale, _) => Outcome::Superseded,
            (Applied::Yes, None) => Outcome::Applied,
            (Applied::Yes, Some(message)) => {
                warn!(seq, error = %message, "checklist reload failed");
                Outcome::Failed(message)
            }
        }
    }

    async fn fetch(&self, user_id: &UserId) -> Result<Vec<Checklist>, CheckpadError> {
        let query = SelectQuery::new(Entity::Checklists)
            .eq("user_id", user_id.0.as_str())
            .order_by("created_at", Direction::Descending)
            .with_nested(
                NestedSelect::new(Entity::Tasks).order_by("created_at", Direction::Ascending),
            );
        let rows = self.store.select(&query).await?;
        decode_checklists(&rows)
    }

    /// Records a failed write in the error slot, unless the user who made
    /// it is no longer signed in.
    fn fail(&self, user_id: &UserId, action: &str, error: CheckpadError) -> Outcome {
        let message = error.user_message();
        warn!(action, error = %error, "store write failed");
        let mut mirror = self.mirror();
        if self.owns_mirror(user_id) {
            mirror.set_error(message.clone());
        }
        Outcome::Failed(message)
    }

    /// Selects a checklist from the mirror. Ids not in the mirror are ignored.
    pub fn select(&self, id: ChecklistId) -> bool {
        let found = self.mirror().select(id);
        if !found {
            debug!(checklist_id = id.0, "ignoring selection of unknown checklist");
        }
        found
    }

    pub fn select_none(&self) {
        self.mirror().select_none();
    }

    /// Empties the error slot.
    pub fn dismiss_error(&self) {
        self.mirror().clear_error();
    }

    pub fn set_checklist_draft(&self, text: impl Into<String>) {
        self.mirror().drafts_mut().checklist_title = text.into();
    }

    pub fn set_task_draft(&self, text: impl Into<String>) {
        self.mirror().drafts_mut().task_title = text.into();
    }

    /// Creates a checklist from the checklist draft.
    pub async fn submit_checklist_draft(&self) -> Outcome {
        let title = self.mirror().drafts_mut().checklist_title.clone();
        self.create_checklist(&title).await
    }

    /// Adds a task from the task draft to the selected checklist.
    pub async fn submit_task_draft(&self) -> Outcome {
        let title = self.mirror().drafts_mut().task_title.clone();
        self.add_task(&title).await
    }

    /// Creates a checklist owned by the signed-in user, then reloads.
    ///
    /// The checklist draft is cleared once the insert succeeds.
    pub async fn create_checklist(&self, title: &str) -> Outcome {
        let title = title.trim();
        if title.is_empty() {
            return Outcome::Ignored(Guard::EmptyTitle);
        }
        let Some(user_id) = self.user_id() else {
            return Outcome::Ignored(Guard::NoUser);
        };

        let mut fields = Row::new();
        fields.insert("title".into(), Value::from(title));
        fields.insert("user_id".into(), Value::from(user_id.0.as_str()));

        if let Err(e) = self.store.insert(Entity::Checklists, fields).await {
            return self.fail(&user_id, "create checklist", e);
        }
        info!(user_id = %user_id, title, "checklist created");
        self.mirror().drafts_mut().checklist_title.clear();

        self.reload(&user_id, true).await
    }

    /// Adds a task to the selected checklist, then reloads.
    ///
    /// The task draft is cleared once the insert succeeds.
    pub async fn add_task(&self, title: &str) -> Outcome {
        let title = title.trim();
        if title.is_empty() {
            return Outcome::Ignored(Guard::EmptyTitle);
        }
        let Some(checklist_id) = self.mirror().selected_id() else {
            return Outcome::Ignored(Guard::NoSelection);
        };
        let Some(user_id) = self.user_id() else {
            return Outcome::Ignored(Guard::NoUser);
        };

        let mut fields = Row::new();
        fields.insert("title".into(), Value::from(title));
        fields.insert(
            Entity::Checklists.foreign_key().into(),
            Value::from(checklist_id.0),
        );
        fields.insert("user_id".into(), Value::from(user_id.0.as_str()));

        if let Err(e) = self.store.insert(Entity::Tasks, fields).await {
            return self.fail(&user_id, "add task", e);
        }
        info!(checklist_id = checklist_id.0, title, "task added");
        self.mirror().drafts_mut().task_title.clear();

        self.reload(&user_id, true).await
    }

    /// Flips the completion flag of `task` as it was last seen, then reloads.
    ///
    /// The update only applies if the stored flag still matches `task`. If
    /// someone changed it in the meantime a conflict is reported and the
    /// mirror is reloaded to show the current value.
    pub async fn toggle_task(&self, task: &Task) -> Outcome {
        let Some(user_id) = self.user_id() else {
            return Outcome::Ignored(Guard::NoUser);
        };

        let mut changes = Row::new();
        changes.insert("is_complete".into(), Value::from(!task.is_complete));
        let mut expect = Row::new();
        expect.insert("is_complete".into(), Value::from(task.is_complete));

        match self
            .store
            .update(Entity::Tasks, task.id.0, changes, expect)
            .await
        {
            Ok(Some(_)) => {
                info!(task_id = task.id.0, is_complete = !task.is_complete, "task toggled");
                self.reload(&user_id, true).await
            }
            Ok(None) => {
                let conflict = CheckpadError::Conflict {
                    entity: Entity::Tasks,
                    id: task.id.0,
                };
                let outcome = self.fail(&user_id, "toggle task", conflict);
                // Still show the authoritative value; keep the conflict visible.
                let _ = self.reload(&user_id, false).await;
                outcome
            }
            Err(e) => self.fail(&user_id, "toggle task", e),
        }
    }

    /// Signs out through the auth provider. The mirror is left as it is.
    pub async fn sign_out(&self) -> Outcome {
        match self.auth.sign_out().await {
            Ok(()) => {
                info!("signed out");
                Outcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "sign out failed");
                Outcome::Failed(e.user_message())
            }
        }
    }

    /// Forgets everything mirrored. Used when a different user signs in.
    pub fn reset(&self) {
        // Reloads already in flight belong to the previous user.
        let floor = self.dispatched.load(Ordering::SeqCst);
        *self.mirror() = Mirror::starting_after(floor);
    }
}
