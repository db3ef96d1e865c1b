use crate::domain::model::Row;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) | Filter::In(column, _) => column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Store-agnostic description of a select: projection, filters, ordering
/// and an optional row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.into(), value.into()));
        self
    }

    pub fn any_of<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filters.push(Filter::In(
            column.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The farm an operation runs on behalf of. Every read or write of
/// farm-owned rows goes through [`FarmScope::restrict`] or
/// [`FarmScope::stamp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmScope {
    farm_id: String,
}

impl FarmScope {
    pub const COLUMN: &'static str = "farm_id";

    pub fn new(farm_id: impl Into<String>) -> Self {
        Self {
            farm_id: farm_id.into(),
        }
    }

    pub fn farm_id(&self) -> &str {
        &self.farm_id
    }

    pub fn restrict(&self, query: Query) -> Query {
        query.eq(Self::COLUMN, self.farm_id.clone())
    }

    pub fn stamp(&self, row: &mut Row) {
        row.insert(Self::COLUMN.to_string(), Value::String(self.farm_id.clone()));
    }
}
