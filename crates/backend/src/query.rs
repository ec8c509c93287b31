//! Read queries against backend views.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use parallax_core::{BranchId, ClientId, CompanyId, InviteId, ProfessionalId, RecordId, UserId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
        }
    }
}

/// Right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl FilterValue {
    /// Wire form used in query strings.
    pub fn render(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Null => "null".to_string(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value as f64)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Text(value.format("%Y-%m-%d").to_string())
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue::Text(value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

macro_rules! impl_id_filter_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(value: $t) -> Self {
                    FilterValue::Text(value.to_string())
                }
            }
        )*
    };
}

impl_id_filter_value!(CompanyId, BranchId, ClientId, ProfessionalId, RecordId, InviteId, UserId);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Filter {
    fn render(&self) -> String {
        match (&self.op, &self.value) {
            (FilterOp::Eq, FilterValue::Null) => "is.null".to_string(),
            (op, v) => format!("{}.{}", op.as_str(), v.render()),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// A read against one named view.
///
/// Built fluently; every tenant-scoped read adds an `eq("company_id", …)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewQuery {
    pub view: String,
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl ViewQuery {
    pub fn new(view: &str) -> Self {
        Self {
            view: view.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Restrict the projected columns (default: all).
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn filter(mut self, column: &str, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gt(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(column, FilterOp::Gt, value)
    }

    pub fn gte(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn lt(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(column, FilterOp::Lt, value)
    }

    pub fn lte(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The equality filter on `column`, if any.
    pub fn eq_value(&self, column: &str) -> Option<&FilterValue> {
        self.filters
            .iter()
            .find(|f| f.column == column && f.op == FilterOp::Eq)
            .map(|f| &f.value)
    }

    /// Query-string pairs in the backend's REST dialect.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);

        let select = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        };
        pairs.push(("select".to_string(), select));

        for f in &self.filters {
            pairs.push((f.column.clone(), f.render()));
        }

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| match o.direction {
                    Direction::Ascending => format!("{}.asc", o.column),
                    Direction::Descending => format!("{}.desc", o.column),
                })
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }
}
