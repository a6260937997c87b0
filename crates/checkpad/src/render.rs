// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of the dashboard.
//!
//! Everything here returns strings so it can be tested without a terminal.
//! Colour is opt-in per call; `--plain` and non-TTY output pass `false`.

use std::fmt::Write;

use checkpad_core::{Checklist, Progress, ProgressTier};
use checkpad_sync::{AuthFormView, DashboardView};
use colored::{ColoredString, Colorize};

/// Width of a progress bar in cells.
pub const BAR_WIDTH: usize = 20;

fn paint(text: &str, color: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// `[#######-------------]  35%`, coloured by tier.
pub fn progress_bar(progress: Progress, width: usize, color: bool) -> String {
    let filled = progress.filled_cells(width).min(width);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(width - filled));
    let bar = paint(&bar, color, |s| match progress.tier {
        ProgressTier::Started => s.blue(),
        ProgressTier::Halfway => s.magenta(),
        ProgressTier::Complete => s.green(),
    });
    format!("[{bar}] {:>3.0}%", progress.percentage)
}

fn list_line(index: usize, checklist: &Checklist, selected: bool, color: bool) -> String {
    let marker = if selected { ">" } else { " " };
    let title = if selected {
        paint(&checklist.title, color, |s| s.bold().cyan())
    } else {
        checklist.title.clone()
    };
    format!(
        "{marker} {:>2}. {title}  {}  ({}/{})",
        index + 1,
        progress_bar(Progress::of(checklist), BAR_WIDTH, color),
        checklist.completed_count(),
        checklist.tasks.len(),
    )
}

/// Renders the whole dashboard: error slot, lists, then the detail pane.
pub fn render_dashboard(view: &DashboardView, color: bool) -> String {
    let mut out = String::new();

    if view.loading {
        out.push_str("Loading...\n");
        return out;
    }

    if let Some(error) = &view.error {
        let _ = writeln!(out, "{}", paint(&format!("error: {error}"), color, |s| s.red()));
    }

    let _ = writeln!(out, "{}", paint("My Lists", color, |s| s.bold()));
    let selected_id = view.selected.as_ref().map(|c| c.id);
    for (i, checklist) in view.checklists.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}",
            list_line(i, checklist, Some(checklist.id) == selected_id, color)
        );
    }
    out.push('\n');

    match (&view.selected, view.empty_state.message()) {
        (Some(checklist), _) => {
            let _ = writeln!(out, "{}", paint(&checklist.title, color, |s| s.bold()));
            if checklist.tasks.is_empty() {
                let _ = writeln!(out, "  {}", paint("No tasks yet.", color, |s| s.dimmed()));
            }
            for (i, task) in checklist.tasks.iter().enumerate() {
                let line = if task.is_complete {
                    paint(&task.title, color, |s| s.dimmed().strikethrough())
                } else {
                    task.title.clone()
                };
                let check = if task.is_complete { "[x]" } else { "[ ]" };
                let _ = writeln!(out, "  {:>2}. {check} {line}", i + 1);
            }
        }
        (None, Some(message)) => {
            let _ = writeln!(out, "{}", paint(message, color, |s| s.dimmed()));
        }
        (None, None) => {}
    }
    out
}

/// Renders the auth form's error or notice, if any.
pub fn render_auth_messages(view: &AuthFormView, color: bool) -> String {
    let mut out = String::new();
    if let Some(error) = &view.error {
        let _ = writeln!(out, "{}", paint(&format!("error: {error}"), color, |s| s.red()));
    }
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{}", paint(notice, color, |s| s.green()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use checkpad_core::{ChecklistId, Task, TaskId, UserId};
    use checkpad_sync::{Drafts, EmptyState};

    fn checklist(id: i64, title: &str, done: &[bool]) -> Checklist {
        Checklist {
            id: ChecklistId(id),
            user_id: UserId("u".into()),
            title: title.into(),
            created_at: Utc::now(),
            tasks: done
                .iter()
                .enumerate()
                .map(|(i, &is_complete)| Task {
                    id: TaskId(i as i64 + 100),
                    checklist_id: ChecklistId(id),
                    title: format!("task {}", i + 1),
                    is_complete,
                    created_at: Utc::now(),
                })
                .collect(),
        }
    }

    fn view(checklists: Vec<Checklist>, selected: Option<usize>) -> DashboardView {
        let selected = selected.map(|i| checklists[i].clone());
        let empty_state = match (&selected, checklists.is_empty()) {
            (_, true) => EmptyState::CreateFirstList,
            (None, false) => EmptyState::SelectList,
            (Some(_), false) => EmptyState::Detail,
        };
        DashboardView {
            checklists,
            selected,
            error: None,
            drafts: Drafts::default(),
            loading: false,
            empty_state,
        }
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(
            progress_bar(Progress::from_percentage(50.0), 10, false),
            "[#####-----]  50%"
        );
        assert_eq!(
            progress_bar(Progress::from_percentage(0.0), 4, false),
            "[----]   0%"
        );
        assert_eq!(
            progress_bar(Progress::from_percentage(250.0), 4, false),
            "[####] 100%"
        );
    }

    #[test]
    fn empty_dashboard_prompts_for_first_list() {
        let out = render_dashboard(&view(vec![], None), false);
        assert!(out.contains("My Lists"));
        assert!(out.contains("Create your first list to get started."));
    }

    #[test]
    fn unselected_dashboard_prompts_for_selection() {
        let out = render_dashboard(&view(vec![checklist(1, "Launch Plan", &[])], None), false);
        assert!(out.contains(" 1. Launch Plan"));
        assert!(out.contains("Select a list to see its tasks, or create a new one."));
    }

    #[test]
    fn selected_list_shows_tasks_and_marker() {
        let lists = vec![
            checklist(2, "Newer", &[]),
            checklist(1, "Launch Plan", &[true, false]),
        ];
        let out = render_dashboard(&view(lists, Some(1)), false);
        assert!(out.contains(">  2. Launch Plan"));
        assert!(out.contains("(1/2)"));
        assert!(out.contains("   1. [x] task 1"));
        assert!(out.contains("   2. [ ] task 2"));
        assert!(!out.contains("Select a list"));
    }

    #[test]
    fn error_slot_is_rendered_first() {
        let mut v = view(vec![], None);
        v.error = Some("network error".into());
        let out = render_dashboard(&v, false);
        assert!(out.starts_with("error: network error"));
    }

    #[test]
    fn loading_hides_everything_else() {
        let mut v = view(vec![checklist(1, "x", &[])], None);
        v.loading = true;
        assert_eq!(render_dashboard(&v, false), "Loading...\n");
    }

    #[test]
    fn auth_messages() {
        let v = AuthFormView {
            notice: Some("Check your email for the confirmation link!".into()),
            ..AuthFormView::default()
        };
        assert_eq!(
            render_auth_messages(&v, false),
            "Check your email for the confirmation link!\n"
        );
    }
}
