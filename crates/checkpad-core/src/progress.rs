// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion percentage derived from a checklist's tasks.
//!
//! Values are recomputed from the current tasks on every render and never
//! stored.

use crate::types::{Checklist, Task};

/// Percentage of `tasks` that are complete, in `[0, 100]`. Zero tasks is 0%.
pub fn completion_percentage(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let done = tasks.iter().filter(|t| t.is_complete).count();
    100.0 * done as f64 / tasks.len() as f64
}

/// Completion percentage of a checklist.
pub fn checklist_percentage(checklist: &Checklist) -> f64 {
    completion_percentage(&checklist.tasks)
}

/// Clamps any input into the displayable `[0, 100]` range. NaN displays as 0.
pub fn clamp_percentage(percentage: f64) -> f64 {
    if percentage.is_nan() {
        return 0.0;
    }
    percentage.clamp(0.0, 100.0)
}

/// Colour band of a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTier {
    /// Below half done.
    Started,
    /// At least half done.
    Halfway,
    /// Everything done.
    Complete,
}

impl ProgressTier {
    /// Tier for a (possibly out-of-range) percentage.
    pub fn for_percentage(percentage: f64) -> Self {
        let p = clamp_percentage(percentage);
        if p >= 100.0 {
            ProgressTier::Complete
        } else if p >= 50.0 {
            ProgressTier::Halfway
        } else {
            ProgressTier::Started
        }
    }
}

/// A progress value ready for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Clamped percentage.
    pub percentage: f64,
    pub tier: ProgressTier,
}

impl Progress {
    pub fn from_percentage(percentage: f64) -> Self {
        Self {
            percentage: clamp_percentage(percentage),
            tier: ProgressTier::for_percentage(percentage),
        }
    }

    pub fn of(checklist: &Checklist) -> Self {
        Self::from_percentage(checklist_percentage(checklist))
    }

    /// Number of filled cells in a bar `width` cells wide.
    pub fn filled_cells(&self, width: usize) -> usize {
        ((self.percentage / 100.0) * width as f64).round() as usize
    }
}
