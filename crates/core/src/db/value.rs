//! Column values and list filters passed between models and the store.

use chrono::NaiveDate;

use super::schema::{ColumnKind, Table};
use crate::error::{DirectoryError, Result};

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value can be stored in a column of `kind`. NULL fits anywhere.
    pub fn fits(&self, kind: ColumnKind) -> bool {
        matches!(
            (self, kind),
            (Value::Null, _)
                | (Value::Text(_), ColumnKind::Text)
                | (Value::Integer(_), ColumnKind::Integer)
                | (Value::Real(_), ColumnKind::Real)
                | (Value::Integer(_), ColumnKind::Real)
                | (Value::Bool(_), ColumnKind::Boolean)
                | (Value::Date(_), ColumnKind::Date)
        )
    }

    /// Parse a raw string (e.g. a query parameter) as a value of `kind`.
    pub fn parse(kind: ColumnKind, raw: &str) -> Result<Self> {
        let invalid = || DirectoryError::InvalidQuery(format!("cannot parse {raw:?} as {kind:?}"));
        match kind {
            ColumnKind::Text => Ok(Value::Text(raw.to_string())),
            ColumnKind::Integer => raw.parse().map(Value::Integer).map_err(|_| invalid()),
            ColumnKind::Real => raw.parse().map(Value::Real).map_err(|_| invalid()),
            ColumnKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "0" | "no" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            ColumnKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| invalid()),
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Conjunction of equality predicates used by `list`.
///
/// Column names are checked against the table definition by the store, never
/// interpolated unchecked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition. A `Value::Null` matches NULL columns.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Build a filter from string pairs, typing each value by its column.
    ///
    /// Keys match column names case-insensitively, so `npi` selects `NPI`, and
    /// also accept the record field name where it differs from the column.
    pub fn from_params<I>(table: &Table, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut filter = Self::new();
        for (column, raw) in params {
            let (name, kind) = if column.eq_ignore_ascii_case(table.id_column) {
                (table.id_column, ColumnKind::Integer)
            } else {
                table
                    .columns
                    .iter()
                    .find(|c| c.matches_key(&column))
                    .map(|c| (c.name, c.kind))
                    .ok_or_else(|| unknown_column(table, &column))?
            };
            filter
                .conditions
                .push((name.to_string(), Value::parse(kind, &raw)?));
        }
        Ok(filter)
    }
}

pub(crate) fn unknown_column(table: &Table, column: &str) -> DirectoryError {
    DirectoryError::InvalidQuery(format!("{} has no column {column:?}", table.name))
}
