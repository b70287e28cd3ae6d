//! Row-cursor driver boundary.
//!
//! A [`Driver`] executes statement text with positional parameters and
//! hands back a [`RowCursor`] plus a [`Release`] callback. The core never
//! looks inside the driver's execution context; it only passes it through.

use crate::error::{BoxError, ScanError};
use crate::receiver::Receiver;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Iterates result rows and scans them into receivers positionally.
pub trait RowCursor {
    /// Move to the next row. Returns `false` once rows are exhausted.
    fn advance(&mut self) -> bool;

    /// Write the current row into `targets`, one column per receiver.
    fn scan_into(&mut self, targets: &[Receiver]) -> Result<(), BoxError>;
}

/// Executes statements.
pub trait Driver {
    /// Caller-supplied execution context (deadlines, cancellation, ...).
    type Context: ?Sized;
    type Cursor: RowCursor;

    fn run_query(
        &self,
        ctx: &Self::Context,
        sql: &str,
        params: &[Value],
    ) -> Result<(Self::Cursor, Release), BoxError>;
}

/// Scoped release of a cursor's resources.
///
/// The callback runs exactly once, when the `Release` is dropped or
/// [`release`](Release::release)d, whichever comes first.
pub struct Release(Option<Box<dyn FnOnce()>>);

impl Release {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Release(Some(Box::new(f)))
    }

    /// A release with nothing to do.
    pub fn noop() -> Self {
        Release(None)
    }

    pub fn release(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl Drop for Release {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Release")
            .field(&if self.0.is_some() { "pending" } else { "done" })
            .finish()
    }
}

/// One in-memory row: `None` is SQL NULL.
pub type MemoryRow = Vec<Option<Value>>;

/// Cursor over rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRows {
    rows: VecDeque<MemoryRow>,
    current: Option<MemoryRow>,
}

impl MemoryRows {
    pub fn new(rows: impl IntoIterator<Item = MemoryRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
            current: None,
        }
    }
}

impl RowCursor for MemoryRows {
    fn advance(&mut self) -> bool {
        self.current = self.rows.pop_front();
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

        for (target, value) in targets.iter().zip(row) {
            target.scan(value.clone())?;
        }
        Ok(())
    }
}

/// A driver that serves fixed rows and records what it executed.
///
/// Useful as a stub in tests and examples.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    rows: Vec<MemoryRow>,
    failure: Option<String>,
    executed: RefCell<Vec<(String, Vec<Value>)>>,
    released: Arc<AtomicUsize>,
}

impl MemoryDriver {
    pub fn new(rows: impl IntoIterator<Item = MemoryRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A driver whose every execution fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Statements executed so far, with their parameters.
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.executed.borrow().clone()
    }

    /// How many cursors have been released.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl Driver for MemoryDriver {
    type Context = ();
    type Cursor = MemoryRows;

    fn run_query(
        &self,
        _ctx: &(),
        sql: &str,
        params: &[Value],
    ) -> Result<(MemoryRows, Release), BoxError> {
        self.executed
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));

        if let Some(message) = &self.failure {
            return Err(message.clone().into());
        }

        let released = Arc::clone(&self.released);
        Ok((
            MemoryRows::new(self.rows.clone()),
            Release::new(move || {
                released.fetch_add(1, Ordering::SeqCst);
            }),
        ))
    }
}
