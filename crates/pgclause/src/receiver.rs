//! Writable destinations for scanned row data.

use crate::error::ScanError;
use crate::nullable::{
    NullBool, NullFloat64, NullInt32, NullInt64, NullString, NullTime, NullUuid, Nullable,
};
use crate::value::{Value, ValueKind};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// A shared, writable cell.
///
/// Clones point to the same storage: keep one clone in the result-building
/// code and hand another to the table as a receiver.
pub struct Slot<T>(Arc<Mutex<T>>);

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Slot(Arc::new(Mutex::new(value)))
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, value: T) {
        *self.lock() = value;
    }

    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.lock(), value)
    }

    /// Run `f` against the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    /// Whether both slots share storage.
    pub fn ptr_eq(&self, other: &Slot<T>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast()
    }
}

impl<T: Clone> Slot<T> {
    pub fn get(&self) -> T {
        self.lock().clone()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Slot<T> {
    fn default() -> Self {
        Slot::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&*self.lock()).finish()
    }
}

/// A bound scan target: one writable variant per kind, plus one nullable
/// adapter per scalar kind.
#[derive(Debug, Clone)]
pub enum Receiver {
    Bool(Slot<bool>),
    Int32(Slot<i32>),
    Int64(Slot<i64>),
    Float64(Slot<f64>),
    Text(Slot<String>),
    Timestamp(Slot<DateTime<Utc>>),
    Uuid(Slot<Uuid>),
    TextArray(Slot<Vec<String>>),
    Int64Array(Slot<Vec<i64>>),
    NullBool(NullBool),
    NullInt32(NullInt32),
    NullInt64(NullInt64),
    NullFloat64(NullFloat64),
    NullString(NullString),
    NullTime(NullTime),
    NullUuid(NullUuid),
}

impl Receiver {
    /// The kind of value this receiver accepts.
    pub fn kind(&self) -> ValueKind {
        match self {
            Receiver::Bool(_) | Receiver::NullBool(_) => ValueKind::Bool,
            Receiver::Int32(_) | Receiver::NullInt32(_) => ValueKind::Int32,
            Receiver::Int64(_) | Receiver::NullInt64(_) => ValueKind::Int64,
            Receiver::Float64(_) | Receiver::NullFloat64(_) => ValueKind::Float64,
            Receiver::Text(_) | Receiver::NullString(_) => ValueKind::Text,
            Receiver::Timestamp(_) | Receiver::NullTime(_) => ValueKind::Timestamp,
            Receiver::Uuid(_) | Receiver::NullUuid(_) => ValueKind::Uuid,
            Receiver::TextArray(_) => ValueKind::TextArray,
            Receiver::Int64Array(_) => ValueKind::Int64Array,
        }
    }

    /// Whether this receiver is a nullable adapter.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            Receiver::NullBool(_)
                | Receiver::NullInt32(_)
                | Receiver::NullInt64(_)
                | Receiver::NullFloat64(_)
                | Receiver::NullString(_)
                | Receiver::NullTime(_)
                | Receiver::NullUuid(_)
        )
    }

    pub(crate) fn describe(&self) -> String {
        if self.is_nullable() {
            self.kind()
                .nullable_counterpart()
                .unwrap_or_default()
                .to_string()
        } else {
            self.kind().to_string()
        }
    }

    /// Write one column value. `None` and `Value::Null` are SQL NULL.
    pub fn scan(&self, value: Option<Value>) -> Result<(), ScanError> {
        let value = value.filter(|v| !v.is_null());

        match (self, value) {
            (Receiver::NullBool(n), None) => n.scan(None),
            (Receiver::NullInt32(n), None) => n.scan(None),
            (Receiver::NullInt64(n), None) => n.scan(None),
            (Receiver::NullFloat64(n), None) => n.scan(None),
            (Receiver::NullString(n), None) => n.scan(None),
            (Receiver::NullTime(n), None) => n.scan(None),
            (Receiver::NullUuid(n), None) => n.scan(None),
            (r, None) => return Err(ScanError::UnexpectedNull(r.kind())),

            (Receiver::Bool(s), Some(Value::Bool(v))) => s.set(v),
            (Receiver::Int32(s), Some(Value::Int32(v))) => s.set(v),
            (Receiver::Int64(s), Some(Value::Int64(v))) => s.set(v),
            (Receiver::Float64(s), Some(Value::Float64(v))) => s.set(v),
            (Receiver::Text(s), Some(Value::Text(v))) => s.set(v),
            (Receiver::Timestamp(s), Some(Value::Timestamp(v))) => s.set(v),
            (Receiver::Uuid(s), Some(Value::Uuid(v))) => s.set(v),
            (Receiver::TextArray(s), Some(Value::TextArray(v))) => s.set(v),
            (Receiver::Int64Array(s), Some(Value::Int64Array(v))) => s.set(v),

            (Receiver::NullBool(n), Some(Value::Bool(v))) => n.scan(Some(v)),
            (Receiver::NullInt32(n), Some(Value::Int32(v))) => n.scan(Some(v)),
            (Receiver::NullInt64(n), Some(Value::Int64(v))) => n.scan(Some(v)),
            (Receiver::NullFloat64(n), Some(Value::Float64(v))) => n.scan(Some(v)),
            (Receiver::NullString(n), Some(Value::Text(v))) => n.scan(Some(v)),
            (Receiver::NullTime(n), Some(Value::Timestamp(v))) => n.scan(Some(v)),
            (Receiver::NullUuid(n), Some(Value::Uuid(v))) => n.scan(Some(v)),

            (r, Some(v)) => {
                return Err(ScanError::KindMismatch {
                    expected: r.kind(),
                    found: v.kind(),
                });
            }
        }

        Ok(())
    }

    /// Whether this receiver writes into `slot`.
    ///
    /// Nullable adapters compare their caller-facing target.
    pub fn is_bound_to<T>(&self, slot: &Slot<T>) -> bool {
        self.target_addr() == slot.addr()
    }

    fn target_addr(&self) -> *const () {
        match self {
            Receiver::Bool(s) => s.addr(),
            Receiver::Int32(s) => s.addr(),
            Receiver::Int64(s) => s.addr(),
            Receiver::Float64(s) => s.addr(),
            Receiver::Text(s) => s.addr(),
            Receiver::Timestamp(s) => s.addr(),
            Receiver::Uuid(s) => s.addr(),
            Receiver::TextArray(s) => s.addr(),
            Receiver::Int64Array(s) => s.addr(),
            Receiver::NullBool(n) => n.target().addr(),
            Receiver::NullInt32(n) => n.target().addr(),
            Receiver::NullInt64(n) => n.target().addr(),
            Receiver::NullFloat64(n) => n.target().addr(),
            Receiver::NullString(n) => n.target().addr(),
            Receiver::NullTime(n) => n.target().addr(),
            Receiver::NullUuid(n) => n.target().addr(),
        }
    }
}

macro_rules! impl_receiver_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Receiver {
                fn from(v: $ty) -> Self {
                    Receiver::$variant(v)
                }
            }
        )*
    };
}

impl_receiver_from! {
    Slot<bool> => Bool,
    Slot<i32> => Int32,
    Slot<i64> => Int64,
    Slot<f64> => Float64,
    Slot<String> => Text,
    Slot<DateTime<Utc>> => Timestamp,
    Slot<Uuid> => Uuid,
    Slot<Vec<String>> => TextArray,
    Slot<Vec<i64>> => Int64Array,
    NullBool => NullBool,
    NullInt32 => NullInt32,
    NullInt64 => NullInt64,
    NullFloat64 => NullFloat64,
    NullString => NullString,
    NullTime => NullTime,
    NullUuid => NullUuid,
}

/// What a caller hands to the binding API.
///
/// Only receivers are writable; a plain value is accepted by the type system
/// so that it can be reported as a binding error alongside the others.
#[derive(Debug, Clone)]
pub enum Destination {
    Receiver(Receiver),
    Value(Value),
}

impl From<Receiver> for Destination {
    fn from(r: Receiver) -> Self {
        Destination::Receiver(r)
    }
}

impl From<Value> for Destination {
    fn from(v: Value) -> Self {
        Destination::Value(v)
    }
}

impl<T> From<Slot<T>> for Destination
where
    Receiver: From<Slot<T>>,
{
    fn from(slot: Slot<T>) -> Self {
        Destination::Receiver(slot.into())
    }
}

impl<T> From<&Slot<T>> for Destination
where
    Receiver: From<Slot<T>>,
{
    fn from(slot: &Slot<T>) -> Self {
        Destination::Receiver(slot.clone().into())
    }
}

impl<T> From<Nullable<T>> for Destination
where
    Receiver: From<Nullable<T>>,
{
    fn from(adapter: Nullable<T>) -> Self {
        Destination::Receiver(adapter.into())
    }
}
