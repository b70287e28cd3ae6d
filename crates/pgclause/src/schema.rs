//! Schema descriptors.
//!
//! A table's column set comes from an explicit descriptor instead of runtime
//! introspection: either a [`TableModel`] (usually via `#[derive(TableModel)]`)
//! or a hand-written / JSON [`Schema`].

use crate::dialect::Dialect;
use crate::error::{SchemaError, SchemaResult};
use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One model field: its Rust name, kind, and column name per schema tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub field: &'static str,
    pub kind: ValueKind,
    pub tags: &'static [(&'static str, &'static str)],
}

impl FieldDef {
    pub const fn new(
        field: &'static str,
        kind: ValueKind,
        tags: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { field, kind, tags }
    }

    /// Column name under `tag`, if the field declares a non-empty one.
    pub fn column_for(&self, tag: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, column)| *column)
            .filter(|column| !column.is_empty())
    }
}

/// A data model with a static field descriptor.
///
/// # Example
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use pgclause::{TableModel, ValueKind};
///
/// #[derive(TableModel)]
/// struct Example {
///     #[column(psql = "cool")]
///     name: String,
///     #[column(psql = "created_time")]
///     created: DateTime<Utc>,
/// }
///
/// assert_eq!(Example::FIELDS[0].column_for("psql"), Some("cool"));
/// assert_eq!(Example::FIELDS[1].kind, ValueKind::Timestamp);
/// ```
pub trait TableModel {
    const FIELDS: &'static [FieldDef];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ValueKind,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Validated, ordered list of columns.
///
/// # Example
///
/// ```rust
/// use pgclause::{Schema, ValueKind};
///
/// let schema = Schema::builder()
///     .column("cool", ValueKind::Text)
///     .column("number_of_star", ValueKind::Int64)
///     .build()?;
///
/// let parsed = Schema::from_json(
///     r#"{"columns": [
///         {"name": "cool", "kind": "text"},
///         {"name": "number_of_star", "kind": "int64"}
///     ]}"#,
/// )?;
/// assert_eq!(schema, parsed);
///
/// let err = Schema::builder()
///     .column("cool", ValueKind::Text)
///     .column("cool", ValueKind::Int32)
///     .build()
///     .unwrap_err();
/// assert_eq!(err.to_string(), "column 'cool' is declared more than once");
/// # Ok::<(), pgclause::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

#[derive(Deserialize)]
struct RawSchema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Validate a list of columns: non-empty, named, no duplicates.
    pub fn new(columns: impl IntoIterator<Item = ColumnDef>) -> SchemaResult<Self> {
        let columns: Vec<ColumnDef> = columns.into_iter().collect();
        if columns.is_empty() {
            return Err(SchemaError::EmptyModel("schema has no columns".to_string()));
        }

        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.name.is_empty() {
                return Err(SchemaError::InvalidSchema(
                    "column names must not be empty".to_string(),
                ));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(Self { columns })
    }

    /// Derive the columns of `M` under the dialect's schema tag.
    ///
    /// Every field must carry the tag; untagged fields are rejected rather
    /// than mapped to an empty column name.
    pub fn from_model<M: TableModel>(dialect: &dyn Dialect) -> SchemaResult<Self> {
        let model = std::any::type_name::<M>();
        if M::FIELDS.is_empty() {
            return Err(SchemaError::EmptyModel(model.to_string()));
        }

        let tag = dialect.schema_tag();
        let columns = M::FIELDS
            .iter()
            .map(|field| {
                field
                    .column_for(tag)
                    .map(|name| ColumnDef::new(name, field.kind))
                    .ok_or_else(|| SchemaError::MissingTag {
                        field: format!("{model}::{}", field.field),
                        tag: tag.to_string(),
                    })
            })
            .collect::<SchemaResult<Vec<_>>>()?;

        Self::new(columns)
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Parse a descriptor of the form `{"columns": [{"name": .., "kind": ..}]}`.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let raw: RawSchema =
            serde_json::from_str(json).map_err(|e| SchemaError::InvalidSchema(e.to_string()))?;
        Self::new(raw.columns)
    }

    pub fn to_json(&self) -> SchemaResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SchemaError::InvalidSchema(e.to_string()))
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builder for hand-written schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnDef>,
}

impl SchemaBuilder {
    pub fn column(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.columns.push(ColumnDef::new(name, kind));
        self
    }

    pub fn build(self) -> SchemaResult<Schema> {
        Schema::new(self.columns)
    }
}
