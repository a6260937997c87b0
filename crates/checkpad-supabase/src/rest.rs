// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data store backed by the PostgREST `/rest/v1` API.

use async_trait::async_trait;
use checkpad_core::types::{Direction, Order};
use checkpad_core::{
    Adapter, AdapterType, CheckpadError, DataStore, Entity, HealthStatus, Row, SelectQuery,
};
use reqwest::{RequestBuilder, Response, Url};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

use crate::auth::SessionSlot;
use crate::client::{SupabaseClient, error_description};

const RETURN_REPRESENTATION: &str = "return=representation";

/// PostgREST-backed [`DataStore`].
///
/// Requests carry the signed-in user's access token so row-level security
/// applies; when nobody is signed in the anon key is used instead.
pub struct PostgrestStore {
    client: SupabaseClient,
    session: SessionSlot,
}

impl PostgrestStore {
    pub fn new(client: SupabaseClient, session: SessionSlot) -> Self {
        Self { client, session }
    }

    fn table_url(&self, entity: Entity) -> Url {
        self.client.endpoint(&format!("/rest/v1/{entity}"))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.load_full() {
            Some(session) => request.bearer_auth(session.access_token.expose_secret()),
            None => request.bearer_auth(self.client.anon_key()),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<Row>, CheckpadError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| CheckpadError::Store {
                message: format!("network error: {e}"),
                source: Some(Box::new(e)),
            })?;
        read_rows(response).await
    }
}

async fn read_rows(response: Response) -> Result<Vec<Row>, CheckpadError> {
    let status = response.status();
    debug!(status = %status, url = %response.url(), "store response received");
    if !status.is_success() {
        return Err(CheckpadError::store(error_description(response).await));
    }

    let body: Value = response.json().await.map_err(|e| CheckpadError::Store {
        message: format!("failed to parse store response: {e}"),
        source: Some(Box::new(e)),
    })?;

    match body {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(CheckpadError::store(format!(
                    "expected an object row, got {other}"
                ))),
            })
            .collect(),
        Value::Object(row) => Ok(vec![row]),
        other => Err(CheckpadError::store(format!(
            "expected an array of rows, got {other}"
        ))),
    }
}

/// Renders a filter value the way PostgREST expects it after `eq.`.
fn filter_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn order_clause(order: &[Order]) -> String {
    order
        .iter()
        .map(|o| {
            let dir = match o.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            format!("{}.{dir}", o.column)
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Appends the PostgREST query parameters for `query` to `url`.
fn apply_select(url: &mut Url, query: &SelectQuery) {
    let mut pairs = url.query_pairs_mut();
    let select = match &query.nested {
        Some(nested) => format!("*,{}(*)", nested.entity),
        None => "*".to_string(),
    };
    pairs.append_pair("select", &select);
    for filter in &query.filters {
        pairs.append_pair(&filter.column, &format!("eq.{}", filter_literal(&filter.value)));
    }
    if !query.order.is_empty() {
        pairs.append_pair("order", &order_clause(&query.order));
    }
    if let Some(nested) = &query.nested
        && !nested.order.is_empty()
    {
        pairs.append_pair(
            &format!("{}.order", nested.entity),
            &order_clause(&nested.order),
        );
    }
}

#[async_trait]
impl Adapter for PostgrestStore {
    fn name(&self) -> &str {
        "postgrest"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, CheckpadError> {
        let request = self.client.http().get(self.client.endpoint("/rest/v1/"));
        let response = match self.authorized(request).send().await {
            Ok(response) => response,
            Err(e) => return Ok(HealthStatus::Unhealthy(format!("network error: {e}"))),
        };
        if response.status().is_success() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(error_description(response).await))
        }
    }

    async fn shutdown(&self) -> Result<(), CheckpadError> {
        Ok(())
    }
}

#[async_trait]
impl DataStore for PostgrestStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, CheckpadError> {
        let mut url = self.table_url(query.entity);
        apply_select(&mut url, query);
        debug!(entity = %query.entity, url = %url, "select");
        self.send(self.client.http().get(url)).await
    }

    async fn insert(&self, entity: Entity, fields: Row) -> Result<Row, CheckpadError> {
        debug!(entity = %entity, "insert");
        let request = self
            .client
            .http()
            .post(self.table_url(entity))
            .header("prefer", RETURN_REPRESENTATION)
            .json(&fields);
        self.send(request).await?.into_iter().next().ok_or_else(|| {
            CheckpadError::store(format!("insert into {entity} returned no row"))
        })
    }

    async fn update(
        &self,
        entity: Entity,
        id: i64,
        changes: Row,
        expect: Row,
    ) -> Result<Option<Row>, CheckpadError> {
        let mut url = self.table_url(entity);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("id", &format!("eq.{id}"));
            for (column, value) in &expect {
                pairs.append_pair(column, &format!("eq.{}", filter_literal(value)));
            }
        }
        debug!(entity = %entity, id, guarded = !expect.is_empty(), "update");

        let request = self
            .client
            .http()
            .patch(url)
            .header("prefer", RETURN_REPRESENTATION)
            .json(&changes);
        Ok(self.send(request).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use arc_swap::ArcSwapOption;
    use checkpad_core::types::NestedSelect;
    use checkpad_core::{Session, User, UserId};
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer, session: Option<Session>) -> PostgrestStore {
        let client = SupabaseClient::new(&server.uri(), "anon-key", Duration::from_secs(5)).unwrap();
        let slot = Arc::new(ArcSwapOption::from(session.map(Arc::new)));
        PostgrestStore::new(client, slot)
    }

    fn signed_in() -> Session {
        Session {
            user: User {
                id: UserId("user-1".into()),
                email: None,
            },
            access_token: SecretString::from("user-token"),
            refresh_token: None,
            expires_at: None,
        }
    }

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn select_url_carries_filters_and_nested_order() {
        let mut url = Url::parse("https://x.test/rest/v1/checklists").unwrap();
        let query = SelectQuery::new(Entity::Checklists)
            .eq("user_id", "user-1")
            .order_by("created_at", Direction::Descending)
            .with_nested(
                NestedSelect::new(Entity::Tasks).order_by("created_at", Direction::Ascending),
            );
        apply_select(&mut url, &query);

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("select".into(), "*,tasks(*)".into()),
                ("user_id".into(), "eq.user-1".into()),
                ("order".into(), "created_at.desc".into()),
                ("tasks.order".into(), "created_at.asc".into()),
            ]
        );
    }

    #[test]
    fn filter_literals_are_unquoted() {
        assert_eq!(filter_literal(&json!("abc")), "abc");
        assert_eq!(filter_literal(&json!(false)), "false");
        assert_eq!(filter_literal(&json!(42)), "42");
        assert_eq!(filter_literal(&Value::Null), "null");
    }

    #[tokio::test]
    async fn select_uses_session_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/checklists"))
            .and(query_param("select", "*,tasks(*)"))
            .and(query_param("user_id", "eq.user-1"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("tasks.order", "created_at.asc"))
            .and(header("authorization", "Bearer user-token"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "user_id": "user-1", "title": "Launch Plan",
                 "created_at": "2026-05-01T00:00:00Z", "tasks": []}
            ])))
            .mount(&server)
            .await;

        let store = store(&server, Some(signed_in()));
        let query = SelectQuery::new(Entity::Checklists)
            .eq("user_id", "user-1")
            .order_by("created_at", Direction::Descending)
            .with_nested(
                NestedSelect::new(Entity::Tasks).order_by("created_at", Direction::Ascending),
            );
        let rows = store.select(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Launch Plan");
    }

    #[tokio::test]
    async fn signed_out_requests_use_anon_key_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let store = store(&server, None);
        let rows = store.select(&SelectQuery::new(Entity::Tasks)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn insert_returns_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/tasks"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({"title": "Write spec", "checklist_id": 7})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                {"id": 3, "checklist_id": 7, "title": "Write spec", "is_complete": false,
                 "created_at": "2026-05-01T00:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let store = store(&server, Some(signed_in()));
        let inserted = store
            .insert(
                Entity::Tasks,
                row(json!({"title": "Write spec", "checklist_id": 7})),
            )
            .await
            .unwrap();
        assert_eq!(inserted["id"], 3);
    }

    #[tokio::test]
    async fn guarded_update_reports_mismatch_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("id", "eq.3"))
            .and(query_param("is_complete", "eq.false"))
            .and(body_json(json!({"is_complete": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = store(&server, Some(signed_in()));
        let updated = store
            .update(
                Entity::Tasks,
                3,
                row(json!({"is_complete": true})),
                row(json!({"is_complete": false})),
            )
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn error_body_message_becomes_store_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/checklists"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "new row violates row-level security policy for table \"checklists\""
            })))
            .mount(&server)
            .await;

        let store = store(&server, None);
        let err = store
            .insert(Entity::Checklists, row(json!({"title": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckpadError::Store { .. }));
        assert!(err.user_message().contains("row-level security"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = SupabaseClient::direct(&uri, "anon-key", Duration::from_secs(2)).unwrap();
        let store = PostgrestStore::new(client, Arc::new(ArcSwapOption::empty()));
        let err = store
            .select(&SelectQuery::new(Entity::Checklists))
            .await
            .unwrap_err();
        assert!(err.user_message().starts_with("network error"), "got: {err}");
    }
}
