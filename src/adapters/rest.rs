use crate::domain::model::Row;
use crate::domain::ports::{ConfigProvider, RowStore};
use crate::domain::query::{Filter, Query};
use crate::utils::error::{LedgerError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Postgres error code for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Row store backed by a PostgREST endpoint, e.g. `https://<project>.supabase.co/rest/v1`.
#[derive(Debug, Clone)]
pub struct RestRowStore {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RestRowStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()?;

        let store = Self::with_client(client, config.store_endpoint());
        Ok(match config.api_key() {
            Some(key) => store.with_api_key(key),
            None => store,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.endpoint, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn error_from(table: &str, response: Response) -> LedgerError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let api_error: ApiError = serde_json::from_str(&body).unwrap_or_default();

        let message = match (api_error.message, api_error.details) {
            (Some(message), Some(details)) => format!("{} ({})", message, details),
            (Some(message), None) => message,
            (None, _) if !body.trim().is_empty() => body,
            (None, _) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };

        if status == StatusCode::CONFLICT || api_error.code.as_deref() == Some(UNIQUE_VIOLATION) {
            return LedgerError::ConflictError {
                table: table.to_string(),
                message,
            };
        }

        LedgerError::StoreError {
            table: table.to_string(),
            status: status.as_u16(),
            code: api_error.code,
            message,
        }
    }
}

/// Render a query in PostgREST's URL syntax.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if !query.columns.is_empty() {
        params.push(("select".to_string(), query.columns.join(",")));
    }

    for filter in &query.filters {
        let condition = match filter {
            Filter::Eq(_, Value::Null) => "is.null".to_string(),
            Filter::Eq(_, value) => format!("eq.{}", render_value(value)),
            Filter::In(_, values) => format!(
                "in.({})",
                values.iter().map(render_list_item).collect::<Vec<_>>().join(",")
            ),
        };
        params.push((filter.column().to_string(), condition));
    }

    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_list_item(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => other.to_string(),
    }
}

#[async_trait]
impl RowStore for RestRowStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        let params = query_params(query);
        tracing::debug!("GET {} {:?}", self.table_url(table), params);

        let response = self
            .authorize(self.client.get(self.table_url(table)))
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(table, response).await);
        }

        Ok(response.json::<Vec<Row>>().await?)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        tracing::debug!("POST {} ({} rows)", self.table_url(table), rows.len());

        let response = self
            .authorize(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(table, response).await);
        }

        Ok(response.json::<Vec<Row>>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::FarmScope;

    #[test]
    fn test_query_params_use_postgrest_syntax() {
        let query = FarmScope::new("farm-a").restrict(
            Query::new()
                .columns(["id", "breed"])
                .any_of("id", [33i64, 34])
                .order_by("date_added", false)
                .limit(5),
        );

        assert_eq!(
            query_params(&query),
            vec![
                ("select".to_string(), "id,breed".to_string()),
                ("id".to_string(), "in.(33,34)".to_string()),
                ("farm_id".to_string(), "eq.farm-a".to_string()),
                ("order".to_string(), "date_added.desc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_list_items_are_quoted() {
        let query = Query::new().any_of("breed", ["Rhode Island, Red", "Leghorn"]);
        assert_eq!(
            query_params(&query),
            vec![("breed".to_string(), "in.(\"Rhode Island, Red\",\"Leghorn\")".to_string())]
        );
    }

    #[test]
    fn test_null_filter() {
        let query = Query::new().eq("date_removed", Value::Null);
        assert_eq!(
            query_params(&query),
            vec![("date_removed".to_string(), "is.null".to_string())]
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let store = RestRowStore::new("http://localhost:3000/rest/v1/");
        assert_eq!(
            store.table_url("chicken_weights"),
            "http://localhost:3000/rest/v1/chicken_weights"
        );
    }
}
