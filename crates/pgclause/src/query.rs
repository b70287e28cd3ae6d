//! Built queries and their execution.

use crate::accumulator::Accumulator;
use crate::driver::{Driver, RowCursor};
use crate::error::{QueryError, QueryResult};
use crate::receiver::Receiver;
use crate::trace::{TARGET, TraceConfig};
use crate::value::Value;

/// Snapshot produced by one [`Table::build`](crate::Table::build).
///
/// SQL text, parameters and scan targets never change after build; only the
/// accumulator is mutated, by [`Query::run`].
#[derive(Debug)]
pub struct Query<A> {
    sql: String,
    params: Vec<Value>,
    columns: Vec<String>,
    scan_targets: Vec<Receiver>,
    accumulator: A,
    trace: TraceConfig,
}

impl<A> Query<A> {
    pub(crate) fn new(
        sql: String,
        params: Vec<Value>,
        selected: Vec<(String, Receiver)>,
        accumulator: A,
        trace: TraceConfig,
    ) -> Self {
        let (columns, scan_targets) = selected.into_iter().unzip();
        Self {
            sql,
            params,
            columns,
            scan_targets,
            accumulator,
            trace,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Selected column names, in SELECT order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Receivers in SELECT order; a positional scan lands each value in the
    /// column it was selected from.
    pub fn scan_targets(&self) -> &[Receiver] {
        &self.scan_targets
    }

    pub fn accumulator(&self) -> &A {
        &self.accumulator
    }

    pub fn accumulator_mut(&mut self) -> &mut A {
        &mut self.accumulator
    }

    pub fn into_accumulator(self) -> A {
        self.accumulator
    }
}

impl<A: Accumulator> Query<A> {
    /// Execute against `driver` and accumulate one result per row.
    ///
    /// Returns the number of rows accumulated. On a scan failure the rows
    /// accumulated before it stay in the accumulator. The driver's release
    /// callback runs on every exit path.
    pub fn run<D: Driver>(&mut self, driver: &D, ctx: &D::Context) -> QueryResult<usize> {
        let (cursor, _release) = driver
            .run_query(ctx, &self.sql, &self.params)
            .map_err(|e| {
                tracing::warn!(target: TARGET, error = %e, sql = %self.trace.truncate_sql(&self.sql), "failed to run query");
                QueryError::execute(e)
            })?;

        self.scan_rows(cursor)
    }

    /// Drain `cursor` into the scan targets.
    pub(crate) fn scan_rows(&mut self, mut cursor: impl RowCursor) -> QueryResult<usize> {
        let mut rows = 0;
        while cursor.advance() {
            if let Err(e) = cursor.scan_into(&self.scan_targets) {
                tracing::warn!(target: TARGET, row = rows, error = %e, "failed to scan row");
                return Err(QueryError::scan(rows, e));
            }
            self.accumulator.accumulate();
            rows += 1;
        }

        self.trace.emit_finished(&self.sql, rows);
        Ok(rows)
    }

    /// Results accumulated so far.
    pub fn results(&self) -> &[A::Output] {
        self.accumulator.results()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::ResultAccumulator;
    use crate::driver::{MemoryDriver, MemoryRows, Release};
    use crate::error::BoxError;
    use crate::receiver::Slot;
    use std::cell::Cell;
    use std::rc::Rc;

    fn name_query() -> (Slot<String>, Query<ResultAccumulator<String, impl FnMut() -> String>>) {
        let name = Slot::new(String::new());
        let acc = ResultAccumulator::new([("cool", &name)], {
            let name = name.clone();
            move || name.get()
        });
        let query = Query::new(
            "SELECT cool FROM t".to_string(),
            Vec::new(),
            vec![("cool".to_string(), Receiver::from(name.clone()))],
            acc,
            TraceConfig::default(),
        );
        (name, query)
    }

    #[test]
    fn run_accumulates_in_cursor_order() {
        let (_, mut query) = name_query();
        let driver = MemoryDriver::new([
            vec![Some(Value::from("first"))],
            vec![Some(Value::from("second"))],
        ]);

        assert_eq!(query.run(&driver, &()).unwrap(), 2);
        assert_eq!(query.results(), &["first".to_string(), "second".to_string()]);
        assert_eq!(driver.released(), 1);
        assert_eq!(driver.executed()[0].0, "SELECT cool FROM t");
    }

    #[test]
    fn scan_failure_keeps_earlier_rows_and_releases() {
        let (_, mut query) = name_query();
        let driver = MemoryDriver::new([
            vec![Some(Value::from("first"))],
            vec![None],
            vec![Some(Value::from("never"))],
        ]);

        let err = query.run(&driver, &()).unwrap_err();
        assert!(matches!(err, QueryError::Scan { row: 1, .. }));
        assert!(err.to_string().starts_with("failed to scan row 1"));
        assert_eq!(query.results(), &["first".to_string()]);
        assert_eq!(driver.released(), 1);
    }

    #[test]
    fn execute_failure_is_wrapped() {
        let (_, mut query) = name_query();
        let driver = MemoryDriver::failing("relation \"t\" does not exist");

        let err = query.run(&driver, &()).unwrap_err();
        assert!(err.is_execute());
        assert_eq!(
            err.to_string(),
            "failed to run query: relation \"t\" does not exist"
        );
        assert!(query.results().is_empty());
        assert_eq!(driver.released(), 0);
    }

    struct DeadlineDriver {
        seen: Rc<Cell<u64>>,
    }

    struct Deadline(u64);

    impl Driver for DeadlineDriver {
        type Context = Deadline;
        type Cursor = MemoryRows;

        fn run_query(
            &self,
            ctx: &Deadline,
            _sql: &str,
            _params: &[Value],
        ) -> Result<(MemoryRows, Release), BoxError> {
            self.seen.set(ctx.0);
            Ok((MemoryRows::default(), Release::noop()))
        }
    }

    #[test]
    fn context_is_passed_through() {
        let (_, mut query) = name_query();
        let driver = DeadlineDriver {
            seen: Rc::new(Cell::new(0)),
        };

        assert_eq!(query.run(&driver, &Deadline(30)).unwrap(), 0);
        assert_eq!(driver.seen.get(), 30);
    }
}
