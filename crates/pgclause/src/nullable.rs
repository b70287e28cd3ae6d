//! Nullable adapters.
//!
//! An adapter lets a plain, non-nullable host field receive a nullable column.
//! It keeps the database-native nullable state (`Option<T>`) next to the
//! caller's [`Slot`]; scanning NULL writes `T::default()` into the slot and
//! clears the validity flag.

use crate::receiver::Slot;
use crate::value::{HasKind, Value};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Bridge between a nullable column and a plain `Slot<T>`.
///
/// Clones share state, so the adapter held by an accumulator and the one
/// bound to a table observe the same scans.
#[derive(Debug)]
pub struct Nullable<T> {
    target: Slot<T>,
    native: Slot<Option<T>>,
}

impl<T> Clone for Nullable<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            native: self.native.clone(),
        }
    }
}

impl<T: Clone + Default> Nullable<T> {
    /// Wrap a caller slot. The adapter starts out invalid.
    pub fn new(target: Slot<T>) -> Self {
        Self {
            target,
            native: Slot::new(None),
        }
    }

    /// Store a scanned value; NULL resolves to `T::default()` in the target.
    pub fn scan(&self, value: Option<T>) {
        self.target.set(value.clone().unwrap_or_default());
        self.native.set(value);
    }

    /// Whether the last scanned value was non-NULL.
    pub fn is_valid(&self) -> bool {
        self.native.with(Option::is_some)
    }

    /// The caller's slot.
    pub fn target(&self) -> &Slot<T> {
        &self.target
    }
}

impl<T: HasKind + Clone + Default> Nullable<T> {
    /// Marshal the native state for parameter binding.
    pub fn value(&self) -> Value {
        self.native.get().into()
    }
}

impl<T: HasKind + Clone + Default> From<Nullable<T>> for Value {
    fn from(adapter: Nullable<T>) -> Self {
        adapter.value()
    }
}

pub type NullBool = Nullable<bool>;
pub type NullInt32 = Nullable<i32>;
pub type NullInt64 = Nullable<i64>;
pub type NullFloat64 = Nullable<f64>;
pub type NullString = Nullable<String>;
pub type NullTime = Nullable<DateTime<Utc>>;
pub type NullUuid = Nullable<Uuid>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn scan_copies_value_and_validity() {
        let stars = Slot::new(0i64);
        let adapter = NullInt64::new(stars.clone());
        assert!(!adapter.is_valid());

        adapter.scan(Some(64));
        assert!(adapter.is_valid());
        assert_eq!(stars.get(), 64);
        assert_eq!(adapter.value(), Value::Int64(64));
    }

    #[test]
    fn scan_null_writes_zero_value() {
        let name = Slot::new("stale".to_string());
        let adapter = NullString::new(name.clone());

        adapter.scan(None);
        assert!(!adapter.is_valid());
        assert_eq!(name.get(), "");
        assert_eq!(adapter.value(), Value::Null(ValueKind::Text));
    }

    #[test]
    fn clones_share_state() {
        let radius = Slot::new(0.0f64);
        let a = NullFloat64::new(radius.clone());
        let b = a.clone();

        a.scan(Some(64.64));
        assert!(b.is_valid());
        assert_eq!(b.target().get(), 64.64);
    }

    #[test]
    fn adapters_bind_as_parameters() {
        let stars = NullInt64::new(Slot::new(0));
        assert_eq!(Value::from(stars.clone()), Value::Null(ValueKind::Int64));

        stars.scan(Some(7));
        assert_eq!(Value::from(stars), Value::Int64(7));
    }
}
