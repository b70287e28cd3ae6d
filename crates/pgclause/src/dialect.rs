//! Database-family rendering rules.

/// Placeholder syntax and schema tag for one database family.
///
/// Placeholders must be positional (numbered): a deduplicated parameter is
/// referenced by the same placeholder from several clauses.
pub trait Dialect {
    /// Tag name used to look up a field's column name in a model descriptor.
    fn schema_tag(&self) -> &str;

    /// Render the placeholder for a 1-based parameter index.
    fn format_placeholder(&self, index: usize) -> String;
}

impl<D: Dialect + ?Sized> Dialect for &D {
    fn schema_tag(&self) -> &str {
        (**self).schema_tag()
    }

    fn format_placeholder(&self, index: usize) -> String {
        (**self).format_placeholder(index)
    }
}

/// PostgreSQL: `$1`, `$2`, ...
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Postgres;

impl Dialect for Postgres {
    fn schema_tag(&self) -> &str {
        "psql"
    }

    fn format_placeholder(&self, index: usize) -> String {
        format!("${index}")
    }
}

/// SQLite numbered parameters: `?1`, `?2`, ...
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn schema_tag(&self) -> &str {
        "sqlite"
    }

    fn format_placeholder(&self, index: usize) -> String {
        format!("?{index}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders() {
        assert_eq!(Postgres.format_placeholder(3), "$3");
        assert_eq!(Sqlite.format_placeholder(3), "?3");
        assert_eq!(Postgres.schema_tag(), "psql");
        assert_eq!((&Sqlite).schema_tag(), "sqlite");
    }
}
