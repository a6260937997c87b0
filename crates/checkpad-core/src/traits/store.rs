// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data store trait for the remote relational backend.

use async_trait::async_trait;

use crate::error::CheckpadError;
use crate::traits::adapter::Adapter;
use crate::types::{Entity, Row, SelectQuery};

/// Adapter for the remote relational data store.
///
/// The store is a request/response service: no transactions, no caching.
/// Every call may fail and nothing is retried at this layer.
#[async_trait]
pub trait DataStore: Adapter {
    /// Reads rows matching `query`, in the requested order.
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, CheckpadError>;

    /// Inserts one row and returns it with server-assigned fields filled in.
    async fn insert(&self, entity: Entity, fields: Row) -> Result<Row, CheckpadError>;

    /// Updates the row with `id`, but only if its current values match
    /// `expect` (an empty `expect` matches unconditionally).
    ///
    /// Returns `Ok(None)` when no row matched.
    async fn update(
        &self,
        entity: Entity,
        id: i64,
        changes: Row,
        expect: Row,
    ) -> Result<Option<Row>, CheckpadError>;
}
