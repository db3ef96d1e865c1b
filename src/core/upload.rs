use crate::core::parser::parse_csv;
use crate::core::validator::{validate_fields, validate_row, RowError, RowIssue, ValidatedRow};
use crate::domain::model::{
    from_row, to_row, CandidateRow, ChickenWeightRecord, NewWeightRecord, Row, UploadResult,
};
use crate::domain::ports::{ConfigProvider, RowStore, TableNames};
use crate::domain::query::{FarmScope, Query};
use crate::utils::error::{LedgerError, Result};
use std::collections::HashSet;

pub const TEMPLATE_FILE_NAME: &str = "weight_upload_template.csv";
pub const TEMPLATE_CSV: &str = "chicken_id,date_recorded,weight_kg\n33,2025-08-03,2.5\n34,2025-08-03,2.8";

/// Reported once when the store rejects the batch for duplicate chicken/date pairs.
pub const CONFLICT_MESSAGE: &str =
    "Some weight records already exist for the specified chicken and date combinations";

pub const DEFAULT_LOOKUP_BATCH_SIZE: usize = 100;

/// Imports weight records for one farm.
///
/// An upload walks the file once: rows are validated, the referenced chickens
/// are looked up in batches, and whatever survives goes to the store as a
/// single insert. A duplicate chicken/date pair anywhere in that insert
/// rejects the whole batch.
pub struct BulkUploader<S: RowStore> {
    store: S,
    tables: TableNames,
    lookup_batch_size: usize,
}

impl<S: RowStore> BulkUploader<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            tables: TableNames::default(),
            lookup_batch_size: DEFAULT_LOOKUP_BATCH_SIZE,
        }
    }

    pub fn from_config<C: ConfigProvider>(store: S, config: &C) -> Self {
        Self::new(store)
            .with_tables(config.tables().clone())
            .with_lookup_batch_size(config.lookup_batch_size())
    }

    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_lookup_batch_size(mut self, lookup_batch_size: usize) -> Self {
        self.lookup_batch_size = lookup_batch_size.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn upload(&self, scope: &FarmScope, csv_text: &str) -> Result<UploadResult> {
        let candidates = match read_candidates(csv_text) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Upload rejected for farm {}: {}", scope.farm_id(), e);
                return Ok(UploadResult::rejected(e.to_string()));
            }
        };
        let total_rows = candidates.len();
        tracing::info!("Parsed {} data rows for farm {}", total_rows, scope.farm_id());

        let mut row_errors = Vec::new();
        let mut validated = Vec::with_capacity(total_rows);
        for candidate in &candidates {
            match validate_row(candidate) {
                Ok(row) => validated.push(row),
                Err(e) => {
                    tracing::debug!("{}", e);
                    row_errors.push(e);
                }
            }
        }

        let mut seen = HashSet::new();
        let ids: Vec<i64> = validated
            .iter()
            .map(|row| row.record.chicken_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let known = self.existing_chickens(scope, &ids).await?;

        let (accepted, missing): (Vec<ValidatedRow>, Vec<ValidatedRow>) = validated
            .into_iter()
            .partition(|row| known.contains(&row.record.chicken_id));
        row_errors.extend(missing.into_iter().map(|row| RowError {
            line_number: row.line_number,
            issue: RowIssue::ChickenNotFound(row.chicken_id_raw),
        }));

        row_errors.sort_by_key(|e| e.line_number);
        let mut errors: Vec<String> = row_errors.iter().map(ToString::to_string).collect();

        let mut success_count = 0;
        if accepted.is_empty() {
            tracing::warn!("No rows left to insert after validation");
        } else {
            let rows = accepted
                .iter()
                .map(|row| self.weight_row(scope, &row.record))
                .collect::<Result<Vec<_>>>()?;

            match self.store.insert(&self.tables.weights, rows).await {
                Ok(inserted) => success_count = inserted.len(),
                Err(e) if e.is_conflict() => {
                    tracing::warn!("Batch of {} rows rejected: {}", accepted.len(), e);
                    errors.push(CONFLICT_MESSAGE.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Upload finished: {} inserted, {} errors, {} rows",
            success_count,
            errors.len(),
            total_rows
        );

        Ok(UploadResult {
            success_count,
            errors,
            total_rows,
        })
    }

    /// Insert a single weight given as raw field values.
    pub async fn record_weight(
        &self,
        scope: &FarmScope,
        chicken_id: &str,
        date_recorded: &str,
        weight_kg: &str,
    ) -> Result<ChickenWeightRecord> {
        let record = validate_fields(chicken_id, date_recorded, weight_kg).map_err(|issue| {
            LedgerError::ValidationError {
                message: issue.to_string(),
            }
        })?;

        let known = self.existing_chickens(scope, &[record.chicken_id]).await?;
        if !known.contains(&record.chicken_id) {
            return Err(LedgerError::ChickenNotFound {
                chicken_id: record.chicken_id,
            });
        }

        let row = self.weight_row(scope, &record)?;
        let inserted = self.store.insert(&self.tables.weights, vec![row]).await?;
        tracing::info!(
            "Recorded {} kg for chicken {} on {}",
            record.weight_kg,
            record.chicken_id,
            record.date_recorded
        );

        match inserted.into_iter().next() {
            Some(row) => from_row(row),
            None => Ok(ChickenWeightRecord {
                id: None,
                chicken_id: record.chicken_id,
                date_recorded: record.date_recorded,
                weight_kg: record.weight_kg,
            }),
        }
    }

    /// Ids among `ids` that name a chicken of this farm.
    async fn existing_chickens(&self, scope: &FarmScope, ids: &[i64]) -> Result<HashSet<i64>> {
        let mut known = HashSet::with_capacity(ids.len());

        for chunk in ids.chunks(self.lookup_batch_size) {
            let query = scope.restrict(Query::new().columns(["id"]).any_of("id", chunk.iter().copied()));
            let rows = self.store.select(&self.tables.chickens, &query).await?;
            tracing::debug!("Chicken lookup: {} of {} ids found", rows.len(), chunk.len());

            known.extend(
                rows.iter()
                    .filter_map(|row| row.get("id").and_then(serde_json::Value::as_i64)),
            );
        }

        Ok(known)
    }

    fn weight_row(&self, scope: &FarmScope, record: &NewWeightRecord) -> Result<Row> {
        let mut row = to_row(record)?;
        scope.stamp(&mut row);
        Ok(row)
    }
}

fn read_candidates(csv_text: &str) -> Result<Vec<CandidateRow>> {
    parse_csv(csv_text)?.collect()
}
