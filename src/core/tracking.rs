use crate::core::classifier::WeightStandards;
use crate::domain::model::{from_row, Chicken, ChickenWeightRecord, Classification, WeightStandard};
use crate::domain::ports::{ConfigProvider, RowStore, TableNames};
use crate::domain::query::{FarmScope, Query};
use crate::utils::error::{LedgerError, Result};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightEntry {
    pub record: ChickenWeightRecord,
    pub age_in_days: Option<i64>,
    pub classification: Classification,
}

/// Weight records of one chicken, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightHistory {
    pub chicken: Chicken,
    pub current_age_in_days: Option<i64>,
    pub entries: Vec<WeightEntry>,
}

pub struct WeightTracker<S: RowStore> {
    store: S,
    tables: TableNames,
}

impl<S: RowStore> WeightTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            tables: TableNames::default(),
        }
    }

    pub fn from_config<C: ConfigProvider>(store: S, config: &C) -> Self {
        Self::new(store).with_tables(config.tables().clone())
    }

    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }

    /// Weight standards are shared by all farms and are not scoped.
    pub async fn load_standards(&self) -> Result<WeightStandards> {
        let query = Query::new().order_by("age_in_days", true);
        let rows = self.store.select(&self.tables.standards, &query).await?;

        let mut standards = Vec::with_capacity(rows.len());
        for row in rows {
            match from_row::<WeightStandard>(row) {
                Ok(standard) if standard.is_valid() => standards.push(standard),
                Ok(standard) => tracing::warn!("Skipping out-of-range weight standard {:?}", standard),
                Err(e) => tracing::warn!("Skipping unreadable weight standard: {}", e),
            }
        }

        tracing::debug!("Loaded {} weight standards", standards.len());
        Ok(WeightStandards::new(standards))
    }

    pub async fn chicken(&self, scope: &FarmScope, chicken_id: i64) -> Result<Chicken> {
        let query = scope.restrict(Query::new().eq("id", chicken_id).limit(1));
        let row = self
            .store
            .select(&self.tables.chickens, &query)
            .await?
            .into_iter()
            .next()
            .ok_or(LedgerError::ChickenNotFound { chicken_id })?;

        from_row(row)
    }

    pub async fn weights(&self, scope: &FarmScope, chicken_id: i64) -> Result<Vec<ChickenWeightRecord>> {
        let query = scope.restrict(
            Query::new()
                .eq("chicken_id", chicken_id)
                .order_by("date_recorded", false),
        );

        self.store
            .select(&self.tables.weights, &query)
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Every weight of the chicken with its age at recording and status.
    pub async fn history(
        &self,
        scope: &FarmScope,
        chicken_id: i64,
        today: NaiveDate,
    ) -> Result<WeightHistory> {
        let chicken = self.chicken(scope, chicken_id).await?;
        let records = self.weights(scope, chicken_id).await?;
        let standards = self.load_standards().await?;

        if chicken.added_on().is_none() {
            tracing::warn!("Chicken {} has no usable date_added; statuses are unknown", chicken_id);
        }

        let entries = records
            .into_iter()
            .map(|record| {
                let age_in_days = chicken.age_in_days_on(record.date_recorded);
                let classification = match age_in_days {
                    Some(age) => standards.classify(record.weight_kg, age),
                    None => Classification::unknown(),
                };
                WeightEntry {
                    record,
                    age_in_days,
                    classification,
                }
            })
            .collect();

        Ok(WeightHistory {
            current_age_in_days: chicken.age_in_days_on(today),
            chicken,
            entries,
        })
    }
}
