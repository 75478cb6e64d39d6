//! Traits shared by every directory entity.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::sqlite::SqliteRow;

use crate::db::schema::Table;
use crate::db::value::Value;
use crate::error::Result;

/// A stored row of a directory table.
pub trait Record:
    for<'r> sqlx::FromRow<'r, SqliteRow> + Serialize + Send + Sync + Unpin + 'static
{
    const TABLE: &'static Table;

    fn id(&self) -> i64;
}

/// Input for creating a row; yields the column values to insert.
pub trait NewRecord: Send + Sync + 'static {
    type Record: Record;

    fn values(&self) -> Result<Vec<(&'static str, Value)>>;
}

/// A partial update; yields only the columns the patch touches.
pub trait RecordPatch: Send + Sync + 'static {
    type Record: Record;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>>;
}

/// Accumulates `(column, value)` pairs for inserts and patches.
#[derive(Debug, Default)]
pub(crate) struct Columns(Vec<(&'static str, Value)>);

impl Columns {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Always include the column.
    pub(crate) fn put(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.0.push((column, value.into()));
        self
    }

    /// Include the column only when the patch field is present.
    pub(crate) fn set<V>(mut self, column: &'static str, field: &Option<V>) -> Self
    where
        V: Clone + Into<Value>,
    {
        if let Some(v) = field {
            self.0.push((column, v.clone().into()));
        }
        self
    }

    pub(crate) fn into_vec(self) -> Vec<(&'static str, Value)> {
        self.0
    }
}

/// Deserialize a nullable patch field so that an absent key stays `None`
/// while an explicit `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub(crate) fn default_true() -> bool {
    true
}
