//! tokio-postgres execution for built queries.

use crate::accumulator::Accumulator;
use crate::driver::RowCursor;
use crate::error::{BoxError, QueryError, QueryResult, ScanError};
use crate::query::Query;
use crate::receiver::Receiver;
use crate::trace::TARGET;
use crate::value::{Value, ValueKind};
use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSqlOwned, ToSql};
use uuid::Uuid;

/// A trait that unifies database clients and transactions.
///
/// Lets [`Query::fetch`] run on either a direct connection or inside a
/// transaction.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = QueryResult<Vec<Row>>> + Send;
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(QueryError::execute)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(QueryError::execute)
    }
}

/// Cursor over rows fetched by tokio-postgres.
///
/// Columns are decoded by position, using the kind of the receiver at the
/// same position.
#[derive(Debug)]
pub struct PgRows {
    rows: std::vec::IntoIter<Row>,
    current: Option<Row>,
}

impl PgRows {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
            current: None,
        }
    }
}

fn decode<T>(row: &Row, idx: usize) -> Result<Option<Value>, BoxError>
where
    T: FromSqlOwned + Into<Value>,
{
    Ok(row.try_get::<_, Option<T>>(idx)?.map(Into::into))
}

fn decode_column(row: &Row, idx: usize, kind: ValueKind) -> Result<Option<Value>, BoxError> {
    match kind {
        ValueKind::Bool => decode::<bool>(row, idx),
        ValueKind::Int32 => decode::<i32>(row, idx),
        ValueKind::Int64 => decode::<i64>(row, idx),
        ValueKind::Float64 => decode::<f64>(row, idx),
        ValueKind::Text => decode::<String>(row, idx),
        ValueKind::Timestamp => decode::<DateTime<Utc>>(row, idx),
        ValueKind::Uuid => decode::<Uuid>(row, idx),
        ValueKind::TextArray => decode::<Vec<String>>(row, idx),
        ValueKind::Int64Array => decode::<Vec<i64>>(row, idx),
    }
}

impl RowCursor for PgRows {
    fn advance(&mut self) -> bool {
        self.current = self.rows.next();
        self.current.is_some()
    }

    fn scan_into(&mut self, targets: &[Receiver]) -> Result<(), BoxError> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| ScanError::Decode("no current row".to_string()))?;

        if row.len() != targets.len() {
            return Err(ScanError::ColumnCount {
                expected: targets.len(),
                got: row.len(),
            }
            .into());
        }

        for (idx, target) in targets.iter().enumerate() {
            let value = decode_column(row, idx, target.kind())?;
            target.scan(value)?;
        }
        Ok(())
    }
}

impl<A: Accumulator> Query<A> {
    /// Execute on a tokio-postgres client or transaction and accumulate one
    /// result per row.
    ///
    /// Same contract as [`Query::run`]: returns the number of rows
    /// accumulated, and rows accumulated before a scan failure are kept.
    pub async fn fetch(&mut self, client: &impl GenericClient) -> QueryResult<usize> {
        let params: Vec<&(dyn ToSql + Sync)> = self
            .params()
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect();

        let rows = client.query(self.sql(), &params).await.inspect_err(|e| {
            tracing::warn!(target: TARGET, error = %e, "failed to run query");
        })?;

        self.scan_rows(PgRows::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::ResultAccumulator;
    use crate::receiver::Slot;
    use crate::trace::TraceConfig;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubClient {
        failure: Option<String>,
        seen: Mutex<Vec<(String, usize)>>,
    }

    impl GenericClient for StubClient {
        async fn query(
            &self,
            sql: &str,
            params: &[&(dyn ToSql + Sync)],
        ) -> QueryResult<Vec<Row>> {
            self.seen
                .lock()
                .unwrap()
                .push((sql.to_string(), params.len()));
            match &self.failure {
                Some(message) => Err(QueryError::execute(message.clone())),
                None => Ok(Vec::new()),
            }
        }
    }

    fn stars_query() -> Query<ResultAccumulator<i64, impl FnMut() -> i64>> {
        let stars = Slot::new(0i64);
        let acc = ResultAccumulator::new([("number_of_star", &stars)], {
            let stars = stars.clone();
            move || stars.get()
        });
        Query::new(
            "SELECT number_of_star FROM exampleTable WHERE number_of_star > $1".to_string(),
            vec![Value::Int64(3)],
            vec![("number_of_star".to_string(), Receiver::from(stars))],
            acc,
            TraceConfig::default(),
        )
    }

    #[tokio::test]
    async fn fetch_passes_sql_and_params() {
        let client = StubClient::default();
        let mut query = stars_query();

        assert_eq!(query.fetch(&client).await.unwrap(), 0);
        assert!(query.results().is_empty());
        assert_eq!(
            client.seen.lock().unwrap().as_slice(),
            &[(
                "SELECT number_of_star FROM exampleTable WHERE number_of_star > $1".to_string(),
                1
            )]
        );
    }

    #[tokio::test]
    async fn fetch_wraps_client_failures() {
        let client = StubClient {
            failure: Some("connection closed".to_string()),
            ..StubClient::default()
        };
        let mut query = stars_query();

        let err = query.fetch(&client).await.unwrap_err();
        assert!(err.is_execute());
        assert_eq!(err.to_string(), "failed to run query: connection closed");
    }

    #[test]
    fn empty_cursor_has_no_rows() {
        let mut rows = PgRows::new(Vec::new());
        assert!(!rows.advance());
        let err = rows.scan_into(&[]).unwrap_err();
        assert_eq!(err.to_string(), "decode error: no current row");
    }
}
