use crate::domain::model::Row;
use crate::domain::query::Query;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// File access for upload sources and generated files.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Generic table access offered by the hosted backend.
///
/// `insert` is atomic: either every row is stored and returned, or none is.
/// Implementations report uniqueness violations as
/// [`LedgerError::ConflictError`](crate::utils::error::LedgerError::ConflictError).
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>>;
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>>;
}

#[async_trait]
impl<T: RowStore + ?Sized> RowStore for std::sync::Arc<T> {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        (**self).select(table, query).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        (**self).insert(table, rows).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub chickens: String,
    pub weights: String,
    pub standards: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            chickens: "chicken_inventory".to_string(),
            weights: "chicken_weights".to_string(),
            standards: "weight_standards".to_string(),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn store_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn farm_id(&self) -> &str;
    fn tables(&self) -> &TableNames;
    fn lookup_batch_size(&self) -> usize;
    fn request_timeout_secs(&self) -> u64;
}
