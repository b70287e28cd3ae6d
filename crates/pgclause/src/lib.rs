//! # pgclause
//!
//! Composable SQL clauses and a schema-bound SELECT builder with typed row
//! receivers.
//!
//! ## Features
//!
//! - **Clause trees**: filters, AND / OR groups, ORDER BY lists and LIMIT render
//!   to SQL text with deduplicated positional parameters
//! - **Dialects**: `$n` placeholders for PostgreSQL, `?n` for SQLite
//! - **Schema-bound tables**: every column name, receiver and filter value is
//!   checked against the table's column kinds before any SQL is built
//! - **Nullable adapters**: `NullString`, `NullInt64`, ... scan SQL NULL into a
//!   plain target plus a validity flag
//! - **Accumulators**: turn each scanned row into a caller-defined result
//! - **Driver boundary**: run built queries on any [`Driver`], or on a
//!   tokio-postgres client / transaction via [`Query::fetch`]
//!
//! ## Example
//!
//! ```ignore
//! use pgclause::{NullInt64, ResultAccumulator, Slot, SortDirection, Table, TableModel};
//!
//! #[derive(TableModel)]
//! struct Example {
//!     #[column(psql = "cool")]
//!     name: String,
//!     #[column(psql = "number_of_star")]
//!     stars: Option<i64>,
//! }
//!
//! let name = Slot::new(String::new());
//! let stars = NullInt64::new(Slot::new(0));
//! let acc = ResultAccumulator::new(
//!     [("cool", name.clone().into()), ("number_of_star", stars.clone().into())],
//!     move || (name.get(), stars.is_valid().then(|| stars.target().get())),
//! );
//!
//! let mut table = Table::postgres::<Example>("exampleTable")?;
//! table
//!     .load_receivers_from_accumulator(&acc)?
//!     .column_compare("number_of_star", ">", 3i64)?
//!     .add_order_by_clause("cool", SortDirection::Ascending)?
//!     .limit(25, 0);
//!
//! let mut query = table.build(acc)?;
//! // SELECT cool, number_of_star FROM exampleTable
//! //   WHERE number_of_star > $1 ORDER BY cool ASC LIMIT 25
//! query.fetch(&client).await?;
//! let rows = query.into_accumulator().into_results();
//! ```

pub mod accumulator;
pub mod clause;
pub mod column;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod nullable;
pub mod param;
pub mod pg;
pub mod query;
pub mod receiver;
pub mod schema;
pub mod table;
pub mod trace;
pub mod value;

pub use accumulator::{Accumulator, ResultAccumulator};
pub use clause::{
    Clause, Combinator, CompoundClause, FilterClause, LimitClause, OrderByClause, SortDirection,
};
pub use column::Column;
pub use dialect::{Dialect, Postgres, Sqlite};
pub use driver::{Driver, MemoryDriver, MemoryRow, MemoryRows, Release, RowCursor};
pub use error::{BoxError, QueryError, QueryResult, ScanError, SchemaError, SchemaResult};
pub use nullable::{
    NullBool, NullFloat64, NullInt32, NullInt64, NullString, NullTime, NullUuid, Nullable,
};
pub use param::ParamList;
pub use pg::{GenericClient, PgRows};
pub use query::Query;
pub use receiver::{Destination, Receiver, Slot};
pub use schema::{ColumnDef, FieldDef, Schema, SchemaBuilder, TableModel};
pub use table::Table;
pub use trace::TraceConfig;
pub use value::{HasKind, Value, ValueKind};

#[cfg(feature = "derive")]
pub use pgclause_derive::TableModel;
