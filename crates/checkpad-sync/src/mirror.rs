// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local mirror of the signed-in user's checklists.
//!
//! The mirror holds the last applied fetch, the current selection, the
//! error slot and the form drafts. It never talks to the store itself; the
//! synchronizer feeds it fetch results tagged with their dispatch sequence.

use checkpad_core::{Checklist, ChecklistId, Progress};
use tracing::debug;

/// What the detail pane should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The user owns no checklists.
    CreateFirstList,
    /// Checklists exist but none is selected.
    SelectList,
    /// A checklist is selected; show its tasks.
    Detail,
}

impl EmptyState {
    /// Placeholder text for the empty states, `None` for [`EmptyState::Detail`].
    pub fn message(&self) -> Option<&'static str> {
        match self {
            EmptyState::CreateFirstList => Some("Create your first list to get started."),
            EmptyState::SelectList => Some("Select a list to see its tasks, or create a new one."),
            EmptyState::Detail => None,
        }
    }
}

/// Text typed into the two creation forms but not yet submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drafts {
    pub checklist_title: String,
    pub task_title: String,
}

/// Point-in-time copy of everything the dashboard renders.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Newest first.
    pub checklists: Vec<Checklist>,
    pub selected: Option<Checklist>,
    pub error: Option<String>,
    pub drafts: Drafts,
    /// True until the first fetch has finished, successfully or not.
    pub loading: bool,
    pub empty_state: EmptyState,
}

impl DashboardView {
    /// Progress of the selected checklist, if any.
    pub fn selected_progress(&self) -> Option<Progress> {
        self.selected.as_ref().map(Progress::of)
    }
}

/// Whether a fetch result was taken or dropped as out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    Yes,
    Stale,
}

#[derive(Debug)]
pub(crate) struct Mirror {
    checklists: Vec<Checklist>,
    selected: Option<ChecklistId>,
    error: Option<String>,
    drafts: Drafts,
    loading: bool,
    /// Highest fetch sequence applied so far. Sequences start at 1.
    applied_seq: u64,
}

impl Default for Mirror {
    fn default() -> Self {
        Self {
            checklists: Vec::new(),
            selected: None,
            error: None,
            drafts: Drafts::default(),
            loading: true,
            applied_seq: 0,
        }
    }
}

impl Mirror {
    /// An empty mirror that ignores fetches numbered `seq` or lower.
    pub(crate) fn starting_after(seq: u64) -> Self {
        Self {
            applied_seq: seq,
            ..Self::default()
        }
    }

    /// Applies the result of fetch number `seq`.
    ///
    /// Results older than one already applied are dropped, failures
    /// included. A success replaces the whole collection and re-resolves the
    /// selection; a failure only writes the error slot. `clear_error` empties
    /// the slot on success.
    pub(crate) fn apply_fetch(
        &mut self,
        seq: u64,
        result: Result<Vec<Checklist>, String>,
        clear_error: bool,
    ) -> Applied {
        if seq <= self.applied_seq {
            debug!(seq, applied = self.applied_seq, "discarding stale fetch");
            return Applied::Stale;
        }
        self.applied_seq = seq;
        self.loading = false;

        match result {
            Ok(checklists) => {
                self.checklists = checklists;
                self.rebind_selection();
                if clear_error {
                    self.error = None;
                }
            }
            Err(message) => self.error = Some(message),
        }
        Applied::Yes
    }

    /// Drops the selection if the selected id vanished from the collection.
    /// Rebinding is implicit: the selection is stored by id and always read
    /// back from the current collection.
    fn rebind_selection(&mut self) {
        if let Some(id) = self.selected
            && !self.checklists.iter().any(|c| c.id == id)
        {
            debug!(checklist_id = id.0, "selected checklist no longer present");
            self.selected = None;
        }
    }

    /// Selects `id` if it is in the collection. Returns whether it was.
    pub(crate) fn select(&mut self, id: ChecklistId) -> bool {
        if self.checklists.iter().any(|c| c.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub(crate) fn select_none(&mut self) {
        self.selected = None;
    }

    pub(crate) fn selected_id(&self) -> Option<ChecklistId> {
        self.selected
    }

    pub(crate) fn selected(&self) -> Option<&Checklist> {
        let id = self.selected?;
        self.checklists.iter().find(|c| c.id == id)
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn drafts_mut(&mut self) -> &mut Drafts {
        &mut self.drafts
    }

    pub(crate) fn empty_state(&self) -> EmptyState {
        if self.checklists.is_empty() {
            EmptyState::CreateFirstList
        } else if self.selected().is_none() {
            EmptyState::SelectList
        } else {
            EmptyState::Detail
        }
    }

    pub(crate) fn view(&self) -> DashboardView {
        DashboardView {
            checklists: self.checklists.clone(),
            selected: self.selected().cloned(),
            error: self.error.clone(),
            drafts: self.drafts.clone(),
            loading: self.loading,
            empty_state: self.empty_state(),
        }
    }
}
