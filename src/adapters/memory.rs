use crate::domain::model::Row;
use crate::domain::ports::RowStore;
use crate::domain::query::{Filter, Query};
use crate::utils::error::{LedgerError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Row>,
    unique_keys: Vec<Vec<String>>,
    selects: usize,
}

impl Table {
    fn next_id(&self) -> i64 {
        self.rows
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1
    }

    fn violated_key(&self, staged: &[Row], row: &Row) -> Option<String> {
        self.unique_keys.iter().find_map(|columns| {
            let key = unique_key(row, columns)?;
            let taken = self
                .rows
                .iter()
                .chain(staged.iter())
                .any(|other| unique_key(other, columns).as_ref() == Some(&key));
            taken.then(|| columns.join(", "))
        })
    }
}

/// Row store kept in process memory. Clones share the same tables.
///
/// Inserts honour the unique constraints registered with
/// [`InMemoryRowStore::add_unique_constraint`] and are all-or-nothing, like a
/// single statement against the hosted database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRowStore {
    tables: Arc<Mutex<HashMap<String, Table>>>,
}

impl InMemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rows without checking constraints. Non-object values are ignored.
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().await;
        let entry = tables.entry(table.to_string()).or_default();
        entry.rows.extend(rows.into_iter().filter_map(|value| match value {
            Value::Object(row) => Some(row),
            _ => None,
        }));
    }

    pub async fn add_unique_constraint(&self, table: &str, columns: &[&str]) {
        let mut tables = self.tables.lock().await;
        tables
            .entry(table.to_string())
            .or_default()
            .unique_keys
            .push(columns.iter().map(|c| c.to_string()).collect());
    }

    pub async fn rows(&self, table: &str) -> Vec<Row> {
        let tables = self.tables.lock().await;
        tables.get(table).map(|t| t.rows.clone()).unwrap_or_default()
    }

    /// Number of selects served for `table`.
    pub async fn select_count(&self, table: &str) -> usize {
        let tables = self.tables.lock().await;
        tables.get(table).map(|t| t.selects).unwrap_or(0)
    }
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        let mut tables = self.tables.lock().await;
        let entry = tables.entry(table.to_string()).or_default();
        entry.selects += 1;

        let mut rows: Vec<Row> = entry
            .rows
            .iter()
            .filter(|row| query.filters.iter().all(|filter| matches_filter(row, filter)))
            .cloned()
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        if !query.columns.is_empty() {
            for row in &mut rows {
                row.retain(|column, _| query.columns.iter().any(|c| c == column));
            }
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        let mut tables = self.tables.lock().await;
        let entry = tables.entry(table.to_string()).or_default();

        let mut staged: Vec<Row> = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(columns) = entry.violated_key(&staged, &row) {
                return Err(LedgerError::ConflictError {
                    table: table.to_string(),
                    message: format!("duplicate key value violates unique constraint ({})", columns),
                });
            }
            staged.push(row);
        }

        let mut next_id = entry.next_id();
        for row in &mut staged {
            if !row.contains_key("id") {
                row.insert("id".to_string(), Value::from(next_id));
                next_id += 1;
            }
        }

        entry.rows.extend(staged.iter().cloned());
        Ok(staged)
    }
}

fn unique_key(row: &Row, columns: &[String]) -> Option<Vec<Value>> {
    // NULLs never collide, as in SQL
    columns
        .iter()
        .map(|column| row.get(column).filter(|v| !v.is_null()).cloned())
        .collect()
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn matches_filter(row: &Row, filter: &Filter) -> bool {
    let Some(value) = row.get(filter.column()) else {
        return false;
    };
    match filter {
        Filter::Eq(_, expected) => values_equal(value, expected),
        Filter::In(_, candidates) => candidates.iter().any(|c| values_equal(value, c)),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
