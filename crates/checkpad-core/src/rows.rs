// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of raw store rows into typed checklists and tasks.
//!
//! Every required field is checked here. A row that fails validation is
//! rejected with [`CheckpadError::MalformedRow`] instead of being passed on.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::CheckpadError;
use crate::types::{Checklist, ChecklistId, Entity, Row, Task, TaskId, UserId};

struct Fields<'a> {
    entity: Entity,
    row: &'a Row,
}

impl<'a> Fields<'a> {
    fn malformed(&self, reason: String) -> CheckpadError {
        CheckpadError::MalformedRow {
            entity: self.entity,
            reason,
        }
    }

    fn get(&self, key: &str) -> Result<&'a Value, CheckpadError> {
        match self.row.get(key) {
            Some(Value::Null) | None => Err(self.malformed(format!("missing field `{key}`"))),
            Some(v) => Ok(v),
        }
    }

    fn i64(&self, key: &str) -> Result<i64, CheckpadError> {
        self.get(key)?
            .as_i64()
            .ok_or_else(|| self.malformed(format!("field `{key}` is not an integer")))
    }

    fn bool(&self, key: &str) -> Result<bool, CheckpadError> {
        self.get(key)?
            .as_bool()
            .ok_or_else(|| self.malformed(format!("field `{key}` is not a boolean")))
    }

    fn str(&self, key: &str) -> Result<&'a str, CheckpadError> {
        self.get(key)?
            .as_str()
            .ok_or_else(|| self.malformed(format!("field `{key}` is not a string")))
    }

    fn title(&self) -> Result<String, CheckpadError> {
        let title = self.str("title")?;
        if title.trim().is_empty() {
            return Err(self.malformed("field `title` is empty".to_string()));
        }
        Ok(title.to_string())
    }

    fn timestamp(&self, key: &str) -> Result<DateTime<Utc>, CheckpadError> {
        let raw = self.str(key)?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| self.malformed(format!("field `{key}` is not a timestamp: {e}")))
    }
}

impl TryFrom<&Row> for Task {
    type Error = CheckpadError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let f = Fields {
            entity: Entity::Tasks,
            row,
        };
        Ok(Task {
            id: TaskId(f.i64("id")?),
            checklist_id: ChecklistId(f.i64("checklist_id")?),
            title: f.title()?,
            is_complete: f.bool("is_complete")?,
            created_at: f.timestamp("created_at")?,
        })
    }
}

impl TryFrom<&Row> for Checklist {
    type Error = CheckpadError;

    /// Decodes a checklist row. Embedded `tasks` are optional (inserts do not
    /// return them) but must be well-formed and belong to this checklist when
    /// present.
    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let f = Fields {
            entity: Entity::Checklists,
            row,
        };
        let id = ChecklistId(f.i64("id")?);

        let tasks = match row.get("tasks") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let obj = item.as_object().ok_or_else(|| CheckpadError::MalformedRow {
                        entity: Entity::Tasks,
                        reason: "embedded task is not an object".to_string(),
                    })?;
                    let task = Task::try_from(obj)?;
                    if task.checklist_id != id {
                        return Err(CheckpadError::MalformedRow {
                            entity: Entity::Tasks,
                            reason: format!(
                                "task {} belongs to checklist {}, embedded under {}",
                                task.id.0, task.checklist_id.0, id.0
                            ),
                        });
                    }
                    Ok(task)
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(f.malformed("field `tasks` is not an array".to_string())),
        };

        Ok(Checklist {
            id,
            user_id: UserId(f.str("user_id")?.to_string()),
            title: f.title()?,
            created_at: f.timestamp("created_at")?,
            tasks,
        })
    }
}

/// Decodes a full select result into checklists, preserving order.
pub fn decode_checklists(rows: &[Row]) -> Result<Vec<Checklist>, CheckpadError> {
    rows.iter().map(Checklist::try_from).collect()
}
