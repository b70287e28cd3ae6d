//! Ordered, deduplicated parameter storage.

use crate::dialect::Dialect;
use crate::value::Value;

/// Values bound by one build pass, in first-use order.
///
/// Interning an equal value twice returns the same placeholder. Lookup is a
/// linear scan: parameter counts per query are small, and `f64` values have
/// no `Hash`/`Eq`, so equality is the only contract.
pub struct ParamList<'d> {
    params: Vec<Value>,
    dialect: &'d dyn Dialect,
}

impl<'d> ParamList<'d> {
    /// Create a new empty parameter list for a dialect.
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            params: Vec::new(),
            dialect,
        }
    }

    /// Record a value and return its placeholder.
    pub fn intern(&mut self, value: &Value) -> String {
        if let Some(pos) = self.params.iter().position(|p| p == value) {
            return self.dialect.format_placeholder(pos + 1);
        }

        self.params.push(value.clone());
        self.dialect.format_placeholder(self.params.len())
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.params
    }

    pub fn into_values(self) -> Vec<Value> {
        self.params
    }
}

impl std::fmt::Debug for ParamList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamList")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
