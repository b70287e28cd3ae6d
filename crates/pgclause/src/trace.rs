//! `tracing` output for built and executed queries.

use crate::value::Value;
use tracing::Level;

/// Tracing target for every event emitted by this crate.
pub const TARGET: &str = "pgclause.sql";

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!(target: TARGET, $($field)*),
            Level::WARN => tracing::warn!(target: TARGET, $($field)*),
            Level::INFO => tracing::info!(target: TARGET, $($field)*),
            Level::DEBUG => tracing::debug!(target: TARGET, $($field)*),
            Level::TRACE => tracing::trace!(target: TARGET, $($field)*),
        }
    };
}

/// Controls how built SQL is logged.
///
/// Attach to a table with [`Table::with_trace_config`](crate::Table::with_trace_config);
/// each built query carries a copy.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Tracing event level for build/run events.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Include bound parameter values in events.
    pub log_params: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            log_params: false,
        }
    }
}

impl TraceConfig {
    /// Create a new config with defaults (DEBUG, 200 bytes, no parameters).
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Log parameter values. Off by default: values may be sensitive.
    pub fn log_params(mut self, enabled: bool) -> Self {
        self.log_params = enabled;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    pub(crate) fn emit_built(&self, table: &str, sql: &str, params: &[Value]) {
        let sql = self.truncate_sql(sql);
        let param_count = params.len();
        if self.log_params {
            emit_at_level!(self.level, table, param_count, params = ?params, sql = %sql, "built query");
        } else {
            emit_at_level!(self.level, table, param_count, sql = %sql, "built query");
        }
    }

    pub(crate) fn emit_finished(&self, sql: &str, rows: usize) {
        let sql = self.truncate_sql(sql);
        emit_at_level!(self.level, rows, sql = %sql, "query finished");
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let config = TraceConfig::new().max_sql_length(5);
        assert_eq!(config.truncate_sql("SELECT 1"), "SELEC...");
        assert_eq!(config.truncate_sql("SEL"), "SEL");
        assert_eq!(truncate_sql_bytes("ab\u{e9}cd", 3), "ab");
        assert_eq!(TraceConfig::new().no_truncate().truncate_sql("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn defaults() {
        let config = TraceConfig::default();
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.max_sql_length, Some(200));
        assert!(!config.log_params);
        assert!(TraceConfig::new().log_params(true).level(Level::INFO).log_params);
    }
}
