//! Schema-bound query builder for one relation.

use crate::accumulator::Accumulator;
use crate::clause::{Clause, CompoundClause, FilterClause, LimitClause, OrderByClause, SortDirection};
use crate::column::Column;
use crate::dialect::{Dialect, Postgres};
use crate::error::{SchemaError, SchemaResult};
use crate::param::ParamList;
use crate::query::Query;
use crate::receiver::{Destination, Receiver};
use crate::schema::{Schema, TableModel};
use crate::trace::TraceConfig;
use crate::value::{Value, ValueKind};
use std::collections::BTreeMap;

/// A table: its name, fixed column set, and the filter / order / limit state
/// used by the next [`build`](Table::build).
///
/// Tables are long-lived: mutate the filters, rebuild, repeat. Every build
/// produces an independent [`Query`].
///
/// # Example
///
/// ```rust
/// use pgclause::{Postgres, ResultAccumulator, Slot, Table, TableModel, Value};
///
/// #[derive(TableModel)]
/// struct Example {
///     #[column(psql = "cool")]
///     name: String,
///     #[column(psql = "number_of_star")]
///     stars: i64,
/// }
///
/// let name = Slot::new(String::new());
/// let mut table = Table::for_model::<Example>("exampleTable", Postgres)?;
/// table
///     .set_column_receiver("cool", &name)?
///     .column_equals("cool", "Dovahkiin")?
///     .limit(25, 0);
///
/// let acc = ResultAccumulator::new([("cool", &name)], {
///     let name = name.clone();
///     move || name.get()
/// });
/// let query = table.build(acc)?;
/// assert_eq!(query.sql(), "SELECT cool FROM exampleTable WHERE cool = $1 LIMIT 25");
/// assert_eq!(query.params(), &[Value::from("Dovahkiin")]);
/// # Ok::<(), pgclause::SchemaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Table<D = Postgres> {
    name: String,
    dialect: D,
    /// Ordered by column name, which fixes SELECT and scan order.
    columns: BTreeMap<String, Column>,
    filter: CompoundClause,
    order_by: CompoundClause,
    limit: Option<LimitClause>,
    trace: TraceConfig,
}

impl<D: Dialect> Table<D> {
    /// Create a table from a validated schema.
    pub fn new(name: impl Into<String>, dialect: D, schema: &Schema) -> Self {
        let columns = schema
            .columns()
            .iter()
            .map(|c| (c.name.clone(), Column::new(c.kind)))
            .collect();

        Self {
            name: name.into(),
            dialect,
            columns,
            filter: CompoundClause::and(),
            order_by: CompoundClause::list(),
            limit: None,
            trace: TraceConfig::default(),
        }
    }

    /// Create a table whose columns come from `M` under the dialect's schema tag.
    pub fn for_model<M: TableModel>(name: impl Into<String>, dialect: D) -> SchemaResult<Self> {
        let schema = Schema::from_model::<M>(&dialect)?;
        Ok(Self::new(name, dialect, &schema))
    }

    pub fn with_trace_config(mut self, trace: TraceConfig) -> Self {
        self.trace = trace;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Column names in lexicographic order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column_kinds(&self) -> impl Iterator<Item = (&str, ValueKind)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c.kind()))
    }

    fn unknown_column(&self, column: &str) -> SchemaError {
        SchemaError::unknown_column(&self.name, column, self.columns.keys().cloned())
    }

    fn checked_column(&self, column: &str) -> SchemaResult<&Column> {
        self.columns
            .get(column)
            .ok_or_else(|| self.unknown_column(column))
    }

    /// Validate one binding and return the receiver to store.
    fn check_destination(&self, column: &str, destination: Destination) -> SchemaResult<Receiver> {
        let receiver = match destination {
            Destination::Receiver(r) => r,
            Destination::Value(_) => return Err(SchemaError::NotWritable(column.to_string())),
        };

        let expected = self.checked_column(column)?.kind();
        if receiver.kind() != expected {
            return Err(SchemaError::kind_mismatch(column, expected, receiver.describe()));
        }

        Ok(receiver)
    }

    // ==================== Receivers ====================

    /// Bind the receiver a column scans into, replacing any previous one.
    ///
    /// Fails if `destination` is a plain value, the column does not exist, or
    /// the receiver kind is neither the column kind nor its nullable adapter.
    pub fn set_column_receiver(
        &mut self,
        column: &str,
        destination: impl Into<Destination>,
    ) -> SchemaResult<&mut Self> {
        let receiver = self.check_destination(column, destination.into())?;
        if let Some(c) = self.columns.get_mut(column) {
            c.set_receiver(receiver);
        }
        Ok(self)
    }

    /// Bind every receiver an accumulator exposes.
    ///
    /// All entries are validated before any is bound; every violation is
    /// reported in a single [`SchemaError::Multiple`].
    pub fn load_receivers_from_accumulator<A: Accumulator + ?Sized>(
        &mut self,
        accumulator: &A,
    ) -> SchemaResult<&mut Self> {
        let mut bound = Vec::new();
        let mut violations = Vec::new();

        for (column, destination) in accumulator.column_receivers() {
            match self.check_destination(&column, destination) {
                Ok(receiver) => bound.push((column, receiver)),
                Err(e) => violations.push((column, e)),
            }
        }

        if !violations.is_empty() {
            violations.sort_by(|a, b| a.0.cmp(&b.0));
            return Err(SchemaError::Multiple(violations));
        }

        for (column, receiver) in bound {
            if let Some(c) = self.columns.get_mut(&column) {
                c.set_receiver(receiver);
            }
        }
        Ok(self)
    }

    /// Unbind every receiver.
    pub fn clear_receivers(&mut self) -> &mut Self {
        self.columns.values_mut().for_each(Column::clear_receiver);
        self
    }

    // ==================== Assertions ====================

    /// Check that a filter on `column` may bind `value`.
    ///
    /// Accepts values of the column kind and typed NULLs of that kind
    /// (scalar kinds only).
    pub fn assert_filter_clause_valid(&self, column: &str, value: &Value) -> SchemaResult<()> {
        let expected = self.checked_column(column)?.kind();
        let fits = match value {
            Value::Null(kind) => *kind == expected && kind.nullable_counterpart().is_some(),
            other => other.kind() == expected,
        };

        if fits {
            Ok(())
        } else {
            Err(SchemaError::kind_mismatch(column, expected, value.describe()))
        }
    }

    pub fn assert_column_exists(&self, column: &str) -> SchemaResult<()> {
        self.checked_column(column).map(|_| ())
    }

    // ==================== Filters ====================

    /// Add `column = value`.
    pub fn column_equals(&mut self, column: &str, value: impl Into<Value>) -> SchemaResult<&mut Self> {
        self.column_compare(column, "=", value)
    }

    /// Add `column <operator> value`, e.g. `column_compare("cool", ">", 42)`.
    pub fn column_compare(
        &mut self,
        column: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> SchemaResult<&mut Self> {
        let value = value.into();
        self.assert_filter_clause_valid(column, &value)?;
        self.filter
            .push(FilterClause::primitive(column, operator, "", value));
        Ok(self)
    }

    /// Add `column IS NULL`.
    pub fn column_null(&mut self, column: &str) -> SchemaResult<&mut Self> {
        self.assert_column_exists(column)?;
        self.filter.push(FilterClause::null_check(column, false));
        Ok(self)
    }

    /// Add `column IS NOT NULL`.
    pub fn column_not_null(&mut self, column: &str) -> SchemaResult<&mut Self> {
        self.assert_column_exists(column)?;
        self.filter.push(FilterClause::null_check(column, true));
        Ok(self)
    }

    /// Add a custom clause to the filter tree.
    ///
    /// The clause is not validated; use [`assert_filter_clause_valid`](Self::assert_filter_clause_valid)
    /// and [`assert_column_exists`](Self::assert_column_exists) before building it.
    pub fn add_filter_clause(&mut self, clause: impl Into<Clause>) -> &mut Self {
        self.filter.push(clause);
        self
    }

    /// Render only the filter tree, without the `WHERE` keyword.
    pub fn build_filter(&self, params: &mut ParamList<'_>) -> String {
        self.filter.render(params)
    }

    pub fn clear_filters(&mut self) -> &mut Self {
        self.filter.clear();
        self
    }

    // ==================== Ordering / limit ====================

    pub fn add_order_by_clause(
        &mut self,
        column: &str,
        direction: SortDirection,
    ) -> SchemaResult<&mut Self> {
        self.assert_column_exists(column)?;
        self.order_by.push(OrderByClause::new(column, direction));
        Ok(self)
    }

    pub fn clear_order_by(&mut self) -> &mut Self {
        self.order_by.clear();
        self
    }

    /// Set the limit clause, replacing any earlier one.
    pub fn limit(&mut self, row_count: u64, offset: u64) -> &mut Self {
        self.limit = Some(LimitClause::new(row_count, offset));
        self
    }

    pub fn clear_limit(&mut self) -> &mut Self {
        self.limit = None;
        self
    }

    // ==================== Build ====================

    /// Assemble the SELECT statement for the bound receivers.
    ///
    /// Columns are selected in lexicographic order and `scan_targets` follow
    /// the same order. Fails if no receiver is bound.
    pub fn build<A: Accumulator>(&self, accumulator: A) -> SchemaResult<Query<A>> {
        let selected: Vec<(String, Receiver)> = self
            .columns
            .iter()
            .filter_map(|(name, c)| c.receiver().map(|r| (name.clone(), r.clone())))
            .collect();

        if selected.is_empty() {
            return Err(SchemaError::NoReceivers(self.name.clone()));
        }

        let mut params = ParamList::new(&self.dialect);
        let select_list = selected
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!("SELECT {select_list} FROM {}", self.name);

        let filter = self.filter.render(&mut params);
        if !filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filter);
        }

        let order_by = self.order_by.render(&mut params);
        if !order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_by);
        }

        if let Some(limit) = &self.limit {
            sql.push(' ');
            sql.push_str(&limit.render());
        }

        let params = params.into_values();
        self.trace.emit_built(&self.name, &sql, &params);

        Ok(Query::new(sql, params, selected, accumulator, self.trace.clone()))
    }
}

impl Table<Postgres> {
    /// Shorthand for a PostgreSQL table over `M`.
    pub fn postgres<M: TableModel>(name: impl Into<String>) -> SchemaResult<Self> {
        Self::for_model::<M>(name, Postgres)
    }
}
