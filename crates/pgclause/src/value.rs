//! Closed set of scalar kinds and bound values.
//!
//! Every column carries a [`ValueKind`]; every bound parameter is a [`Value`].
//! Type checking between the two is a pattern match, not a runtime type
//! comparison.

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type};
use uuid::Uuid;

/// The scalar kind a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Int32,
    Int64,
    Float64,
    Text,
    Timestamp,
    Uuid,
    TextArray,
    Int64Array,
}

impl ValueKind {
    /// All supported kinds.
    pub const ALL: [ValueKind; 9] = [
        ValueKind::Bool,
        ValueKind::Int32,
        ValueKind::Int64,
        ValueKind::Float64,
        ValueKind::Text,
        ValueKind::Timestamp,
        ValueKind::Uuid,
        ValueKind::TextArray,
        ValueKind::Int64Array,
    ];

    /// Whether values of this kind are sequences.
    pub fn is_array(self) -> bool {
        matches!(self, ValueKind::TextArray | ValueKind::Int64Array)
    }

    /// Name of the nullable adapter that may receive this kind, if any.
    ///
    /// Only scalar kinds have a nullable counterpart.
    pub fn nullable_counterpart(self) -> Option<&'static str> {
        match self {
            ValueKind::Bool => Some("NullBool"),
            ValueKind::Int32 => Some("NullInt32"),
            ValueKind::Int64 => Some("NullInt64"),
            ValueKind::Float64 => Some("NullFloat64"),
            ValueKind::Text => Some("NullString"),
            ValueKind::Timestamp => Some("NullTime"),
            ValueKind::Uuid => Some("NullUuid"),
            ValueKind::TextArray | ValueKind::Int64Array => None,
        }
    }

    /// PostgreSQL type name.
    pub fn pg_type(self) -> &'static str {
        match self {
            ValueKind::Bool => "boolean",
            ValueKind::Int32 => "integer",
            ValueKind::Int64 => "bigint",
            ValueKind::Float64 => "double precision",
            ValueKind::Text => "text",
            ValueKind::Timestamp => "timestamptz",
            ValueKind::Uuid => "uuid",
            ValueKind::TextArray => "text[]",
            ValueKind::Int64Array => "bigint[]",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pg_type())
    }
}

/// A bound parameter value.
///
/// `Null` is a typed NULL: the nullable counterpart of its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    TextArray(Vec<String>),
    Int64Array(Vec<i64>),
    Null(ValueKind),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Float64(_) => ValueKind::Float64,
            Value::Text(_) => ValueKind::Text,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::TextArray(_) => ValueKind::TextArray,
            Value::Int64Array(_) => ValueKind::Int64Array,
            Value::Null(kind) => *kind,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Human readable description used in mismatch errors.
    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Null(kind) => match kind.nullable_counterpart() {
                Some(name) => name.to_string(),
                None => format!("NULL {kind}"),
            },
            other => other.kind().to_string(),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int32(v) => v.to_sql(ty, out),
            Value::Int64(v) => v.to_sql(ty, out),
            Value::Float64(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::TextArray(v) => v.to_sql(ty, out),
            Value::Int64Array(v) => v.to_sql(ty, out),
            Value::Null(_) => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    // Type checking is delegated to the wrapped value so that a mismatched
    // parameter is reported by tokio-postgres instead of being sent as bytes.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int32(v) => v.to_sql_checked(ty, out),
            Value::Int64(v) => v.to_sql_checked(ty, out),
            Value::Float64(v) => v.to_sql_checked(ty, out),
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::TextArray(v) => v.to_sql_checked(ty, out),
            Value::Int64Array(v) => v.to_sql_checked(ty, out),
            Value::Null(_) => Ok(IsNull::Yes),
        }
    }
}

/// Host types that map onto a [`ValueKind`].
///
/// Used by `#[derive(TableModel)]` to compute each field's column kind.
pub trait HasKind: Into<Value> {
    const KIND: ValueKind;
}

macro_rules! impl_value_kind {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl HasKind for $ty {
                const KIND: ValueKind = ValueKind::$variant;
            }
        )*
    };
}

impl_value_kind! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    f64 => Float64,
    String => Text,
    DateTime<Utc> => Timestamp,
    Uuid => Uuid,
    Vec<String> => TextArray,
    Vec<i64> => Int64Array,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: HasKind> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null(T::KIND),
        }
    }
}

impl<T: HasKind> HasKind for Option<T> {
    const KIND: ValueKind = T::KIND;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_carry_their_kind() {
        assert_eq!(Value::from(42i32).kind(), ValueKind::Int32);
        assert_eq!(Value::from("bleh"), Value::Text("bleh".to_string()));
        assert_eq!(Value::from(None::<i64>), Value::Null(ValueKind::Int64));
        assert_eq!(Value::from(Some(1.5f64)), Value::Float64(1.5));
        assert!(Value::from(None::<String>).is_null());
        assert_eq!(<Option<Uuid> as HasKind>::KIND, ValueKind::Uuid);
    }

    #[test]
    fn nullable_counterparts_exist_for_scalars_only() {
        for kind in ValueKind::ALL {
            assert_eq!(kind.nullable_counterpart().is_none(), kind.is_array());
        }
        assert_eq!(Value::Null(ValueKind::Int32).describe(), "NullInt32");
        assert_eq!(Value::Null(ValueKind::TextArray).describe(), "NULL text[]");
        assert_eq!(Value::Text(String::new()).describe(), "text");
    }

    #[test]
    fn null_marshals_as_sql_null() {
        let mut buf = BytesMut::new();
        let res = Value::Null(ValueKind::Text).to_sql_checked(&Type::TEXT, &mut buf);
        assert!(matches!(res, Ok(IsNull::Yes)));
        assert!(buf.is_empty());
    }

    #[test]
    fn marshal_checks_the_wrapped_type() {
        let mut buf = BytesMut::new();
        assert!(Value::Int64(7).to_sql_checked(&Type::INT8, &mut buf).is_ok());
        assert_eq!(buf.len(), 8);

        let mut buf = BytesMut::new();
        assert!(Value::Int64(7).to_sql_checked(&Type::TEXT, &mut buf).is_err());
    }

    #[test]
    fn kinds_serialize_snake_case() {
        let json = serde_json::to_string(&ValueKind::TextArray).unwrap();
        assert_eq!(json, "\"text_array\"");
    }
}
