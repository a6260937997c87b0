// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory data store for deterministic testing.
//!
//! `MockStore` keeps one table per [`Entity`], assigns ids and creation
//! timestamps on insert, honours filters, ordering and one level of nested
//! select, and records every call. Tests can queue failures and hold a
//! select or an insert open to control the order in which calls finish.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde_json::Value;
use tokio::sync::oneshot;

use checkpad_core::types::{Direction, Order};
use checkpad_core::{
    Adapter, AdapterType, CheckpadError, DataStore, Entity, HealthStatus, Row, SelectQuery,
};

/// Store operation kinds, for the call log and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Select,
    Insert,
    Update,
}

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub entity: Entity,
}

/// Keeps a held store call waiting until released.
///
/// A held select reads its rows when it is called, then waits; data changed
/// in the meantime is not reflected in its response. A held insert waits
/// before anything else, so a queued failure is reported after release.
pub struct StoreHold {
    entered: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl StoreHold {
    /// Waits until the held call has reached the store.
    pub async fn entered(&mut self) {
        let _ = (&mut self.entered).await;
    }

    /// Lets the held call finish.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

struct PendingHold {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

impl PendingHold {
    async fn wait(self) {
        let _ = self.entered.send(());
        let _ = self.release.await;
    }
}

struct Tables {
    rows: HashMap<Entity, Vec<Row>>,
    next_id: i64,
    clock: DateTime<Utc>,
    failures: VecDeque<(StoreOp, String)>,
    holds: VecDeque<(StoreOp, PendingHold)>,
    calls: Vec<StoreCall>,
}

impl Tables {
    /// Each insert gets a later timestamp than the one before.
    fn tick(&mut self) -> String {
        self.clock += Duration::seconds(1);
        self.clock.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn take_failure(&mut self, op: StoreOp) -> Option<String> {
        let index = self.failures.iter().position(|(o, _)| *o == op)?;
        self.failures.remove(index).map(|(_, message)| message)
    }

    fn take_hold(&mut self, op: StoreOp) -> Option<PendingHold> {
        let index = self.holds.iter().position(|(o, _)| *o == op)?;
        self.holds.remove(index).map(|(_, hold)| hold)
    }

    fn table(&self, entity: Entity) -> &[Row] {
        self.rows.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// In-memory [`DataStore`].
pub struct MockStore {
    tables: Mutex<Tables>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                rows: HashMap::new(),
                next_id: 1,
                clock: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap_or_default(),
                failures: VecDeque::new(),
                holds: VecDeque::new(),
                calls: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// The next `op` call fails with a store error carrying `message`.
    pub fn fail_next(&self, op: StoreOp, message: &str) {
        self.lock().failures.push_back((op, message.to_string()));
    }

    /// Holds the next select open until the returned handle is released.
    pub fn hold_next_select(&self) -> StoreHold {
        self.hold_next(StoreOp::Select)
    }

    /// Holds the next insert open until the returned handle is released.
    pub fn hold_next_insert(&self) -> StoreHold {
        self.hold_next(StoreOp::Insert)
    }

    fn hold_next(&self, op: StoreOp) -> StoreHold {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.lock().holds.push_back((
            op,
            PendingHold {
                entered: entered_tx,
                release: release_rx,
            },
        ));
        StoreHold {
            entered: entered_rx,
            release: release_tx,
        }
    }

    /// Inserts a checklist directly, bypassing the call log. Returns its id.
    pub fn seed_checklist(&self, user_id: &str, title: &str) -> i64 {
        let mut row = Row::new();
        row.insert("user_id".into(), Value::from(user_id));
        row.insert("title".into(), Value::from(title));
        self.put(Entity::Checklists, row)
    }

    /// Inserts a task directly, bypassing the call log. Returns its id.
    pub fn seed_task(&self, checklist_id: i64, title: &str, is_complete: bool) -> i64 {
        let mut row = Row::new();
        row.insert("checklist_id".into(), Value::from(checklist_id));
        row.insert("title".into(), Value::from(title));
        row.insert("is_complete".into(), Value::from(is_complete));
        self.put(Entity::Tasks, row)
    }

    /// Overwrites a column of a stored row, as another client would.
    pub fn set_field(&self, entity: Entity, id: i64, column: &str, value: Value) {
        let mut tables = self.lock();
        if let Some(row) = tables
            .rows
            .get_mut(&entity)
            .and_then(|rows| rows.iter_mut().find(|r| r.get("id") == Some(&Value::from(id))))
        {
            row.insert(column.to_string(), value);
        }
    }

    /// Copies of all stored rows of `entity`, in insertion order.
    pub fn rows(&self, entity: Entity) -> Vec<Row> {
        self.lock().table(entity).to_vec()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: StoreOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op == op).count()
    }

    fn put(&self, entity: Entity, mut row: Row) -> i64 {
        let mut tables = self.lock();
        let id = tables.next_id;
        tables.next_id += 1;
        let created_at = tables.tick();
        row.insert("id".into(), Value::from(id));
        row.entry("created_at").or_insert(Value::from(created_at));
        if entity == Entity::Tasks {
            row.entry("is_complete").or_insert(Value::Bool(false));
        }
        tables.rows.entry(entity).or_default().push(row);
        id
    }

    fn record(&self, op: StoreOp, entity: Entity) -> Result<(), CheckpadError> {
        let mut tables = self.lock();
        tables.calls.push(StoreCall { op, entity });
        match tables.take_failure(op) {
            Some(message) => Err(CheckpadError::store(message)),
            None => Ok(()),
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn sort_rows(rows: &mut [Row], order: &[Order]) {
    rows.sort_by(|a, b| {
        order
            .iter()
            .map(|o| {
                let ord = compare_values(a.get(&o.column), b.get(&o.column));
                match o.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn run_select(tables: &Tables, query: &SelectQuery) -> Vec<Row> {
    let mut rows: Vec<Row> = tables
        .table(query.entity)
        .iter()
        .filter(|row| {
            query
                .filters
                .iter()
                .all(|f| row.get(&f.column) == Some(&f.value))
        })
        .cloned()
        .collect();
    sort_rows(&mut rows, &query.order);

    if let Some(nested) = &query.nested {
        let foreign_key = query.entity.foreign_key();
        for row in &mut rows {
            let parent_id = row.get("id").cloned();
            let mut children: Vec<Row> = tables
                .table(nested.entity)
                .iter()
                .filter(|child| child.get(foreign_key) == parent_id.as_ref())
                .cloned()
                .collect();
            sort_rows(&mut children, &nested.order);
            row.insert(
                nested.entity.to_string(),
                Value::Array(children.into_iter().map(Value::Object).collect()),
            );
        }
    }
    rows
}

#[async_trait]
impl Adapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, CheckpadError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CheckpadError> {
        Ok(())
    }
}

#[async_trait]
impl DataStore for MockStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, CheckpadError> {
        self.record(StoreOp::Select, query.entity)?;
        let (rows, hold) = {
            let mut tables = self.lock();
            (run_select(&tables, query), tables.take_hold(StoreOp::Select))
        };
        if let Some(hold) = hold {
            hold.wait().await;
        }
        Ok(rows)
    }

    async fn insert(&self, entity: Entity, fields: Row) -> Result<Row, CheckpadError> {
        let hold = self.lock().take_hold(StoreOp::Insert);
        if let Some(hold) = hold {
            hold.wait().await;
        }
        self.record(StoreOp::Insert, entity)?;
        let id = self.put(entity, fields);
        self.lock()
            .table(entity)
            .iter()
            .find(|r| r.get("id") == Some(&Value::from(id)))
            .cloned()
            .ok_or_else(|| CheckpadError::store("inserted row vanished"))
    }

    async fn update(
        &self,
        entity: Entity,
        id: i64,
        changes: Row,
        expect: Row,
    ) -> Result<Option<Row>, CheckpadError> {
        self.record(StoreOp::Update, entity)?;
        let mut tables = self.lock();
        let Some(row) = tables.rows.get_mut(&entity).and_then(|rows| {
            rows.iter_mut().find(|r| {
                r.get("id") == Some(&Value::from(id))
                    && expect.iter().all(|(k, v)| r.get(k) == Some(v))
            })
        }) else {
            return Ok(None);
        };
        for (column, value) in changes {
            row.insert(column, value);
        }
        Ok(Some(row.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkpad_core::types::NestedSelect;

    #[tokio::test]
    async fn nested_select_filters_and_orders() {
        let store = MockStore::new();
        let first = store.seed_checklist("u1", "First");
        let second = store.seed_checklist("u1", "Second");
        store.seed_checklist("u2", "Other user");
        store.seed_task(first, "a", false);
        store.seed_task(first, "b", true);

        let query = SelectQuery::new(Entity::Checklists)
            .eq("user_id", "u1")
            .order_by("created_at", Direction::Descending)
            .with_nested(
                NestedSelect::new(Entity::Tasks).order_by("created_at", Direction::Ascending),
            );
        let rows = store.select(&query).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], second);
        assert_eq!(rows[1]["tasks"][0]["title"], "a");
        assert_eq!(rows[1]["tasks"][1]["title"], "b");
        assert_eq!(rows[0]["tasks"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn guarded_update_requires_match() {
        let store = MockStore::new();
        let list = store.seed_checklist("u1", "L");
        let task = store.seed_task(list, "t", false);

        let mut changes = Row::new();
        changes.insert("is_complete".into(), Value::Bool(true));
        let mut stale = Row::new();
        stale.insert("is_complete".into(), Value::Bool(true));
        assert!(
            store
                .update(Entity::Tasks, task, changes.clone(), stale)
                .await
                .unwrap()
                .is_none()
        );

        let mut current = Row::new();
        current.insert("is_complete".into(), Value::Bool(false));
        let row = store
            .update(Entity::Tasks, task, changes, current)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row["is_complete"], true);
    }

    #[tokio::test]
    async fn held_insert_writes_after_release() {
        let store = MockStore::new();
        let mut hold = store.hold_next_insert();
        let mut fields = Row::new();
        fields.insert("title".into(), Value::from("Late"));

        let insert = store.insert(Entity::Checklists, fields);
        let check = async {
            hold.entered().await;
            let before = store.rows(Entity::Checklists).len();
            hold.release();
            before
        };
        let (inserted, before) = tokio::join!(insert, check);

        assert_eq!(before, 0);
        assert_eq!(inserted.unwrap()["title"], "Late");
        assert_eq!(store.rows(Entity::Checklists).len(), 1);
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let store = MockStore::new();
        store.fail_next(StoreOp::Select, "network error");
        let query = SelectQuery::new(Entity::Checklists);

        let err = store.select(&query).await.unwrap_err();
        assert_eq!(err.user_message(), "network error");
        assert!(store.select(&query).await.is_ok());
        assert_eq!(store.call_count(StoreOp::Select), 2);
    }
}
