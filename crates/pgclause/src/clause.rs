//! Clauses: renderable SQL fragment nodes.
//!
//! A clause renders itself against a [`ParamList`], which hands out
//! placeholders for bound values. Most callers go through [`Table`](crate::Table);
//! build clauses directly only when a predicate does not fit the table's
//! builders, and add them with [`Table::add_filter_clause`](crate::Table::add_filter_clause).

use crate::param::ParamList;
use crate::value::Value;

/// Placeholder slot in a filter template.
pub const PARAM_SLOT: &str = "?";

/// A renderable SQL fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Filter(FilterClause),
    Compound(CompoundClause),
    OrderBy(OrderByClause),
    Limit(LimitClause),
}

impl Clause {
    /// Render this clause, interning any bound values into `params`.
    pub fn render(&self, params: &mut ParamList<'_>) -> String {
        match self {
            Clause::Filter(f) => f.render(params),
            Clause::Compound(c) => c.render(params),
            Clause::OrderBy(o) => o.render(),
            Clause::Limit(l) => l.render(),
        }
    }
}

impl From<FilterClause> for Clause {
    fn from(c: FilterClause) -> Self {
        Clause::Filter(c)
    }
}

impl From<CompoundClause> for Clause {
    fn from(c: CompoundClause) -> Self {
        Clause::Compound(c)
    }
}

impl From<OrderByClause> for Clause {
    fn from(c: OrderByClause) -> Self {
        Clause::OrderBy(c)
    }
}

impl From<LimitClause> for Clause {
    fn from(c: LimitClause) -> Self {
        Clause::Limit(c)
    }
}

/// A predicate with at most one bound value.
///
/// The template holds exactly one `?` slot when a value is bound, and none
/// otherwise. This is not checked at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    template: String,
    value: Option<Value>,
}

impl FilterClause {
    /// Create a filter from a raw template and optional bound value.
    pub fn new(template: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            template: template.into(),
            value,
        }
    }

    /// `column operator param_template`, joined by single spaces.
    ///
    /// An empty `param_template` means the bare slot (`?`). Use a custom
    /// template to wrap the parameter, e.g. `"UCASE(?)"`.
    pub fn primitive(
        column: &str,
        operator: &str,
        param_template: &str,
        value: impl Into<Value>,
    ) -> Self {
        let param_template = if param_template.is_empty() {
            PARAM_SLOT
        } else {
            param_template
        };

        Self {
            template: [column, operator, param_template].join(" "),
            value: Some(value.into()),
        }
    }

    /// `column IS NULL` or `column IS NOT NULL`.
    pub fn null_check(column: &str, negated: bool) -> Self {
        let check = if negated { "IS NOT NULL" } else { "IS NULL" };
        Self {
            template: format!("{column} {check}"),
            value: None,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn render(&self, params: &mut ParamList<'_>) -> String {
        match &self.value {
            None => self.template.clone(),
            Some(value) => self
                .template
                .replacen(PARAM_SLOT, &params.intern(value), 1),
        }
    }
}

/// How a [`CompoundClause`] joins its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
    /// Comma separated list (ORDER BY items). The only combinator that is
    /// never parenthesized, even with several children.
    List,
}

impl Combinator {
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
            Combinator::List => ",",
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Combinator::And => " AND ",
            Combinator::Or => " OR ",
            Combinator::List => ", ",
        }
    }
}

/// An ordered group of clauses joined by one combinator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundClause {
    combinator: Combinator,
    children: Vec<Clause>,
}

impl CompoundClause {
    pub fn new(combinator: Combinator) -> Self {
        Self {
            combinator,
            children: Vec::new(),
        }
    }

    pub fn and() -> Self {
        Self::new(Combinator::And)
    }

    pub fn or() -> Self {
        Self::new(Combinator::Or)
    }

    pub fn list() -> Self {
        Self::new(Combinator::List)
    }

    /// Add a single clause, returning `self` for chaining.
    pub fn add_clause(mut self, clause: impl Into<Clause>) -> Self {
        self.push(clause);
        self
    }

    pub fn push(&mut self, clause: impl Into<Clause>) {
        self.children.push(clause.into());
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn num_clauses(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Render all children and join them.
    ///
    /// - no rendered children: `""` (callers omit WHERE / ORDER BY)
    /// - one: the child as is
    /// - several: joined and parenthesized (`List` is never parenthesized)
    pub fn render(&self, params: &mut ParamList<'_>) -> String {
        let parts: Vec<String> = self
            .children
            .iter()
            .map(|c| c.render(params))
            .filter(|s| !s.is_empty())
            .collect();

        let joined = parts.join(self.combinator.separator());
        if parts.len() > 1 && self.combinator != Combinator::List {
            format!("({joined})")
        } else {
            joined
        }
    }
}

/// Sort direction for [`OrderByClause`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// No direction keyword; the database default applies.
    Unset,
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Unset => "",
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByClause {
    column: String,
    direction: SortDirection,
}

impl OrderByClause {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn render(&self) -> String {
        if self.column.is_empty() {
            return String::new();
        }

        match self.direction {
            SortDirection::Unset => self.column.clone(),
            dir => format!("{} {}", self.column, dir.keyword()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitClause {
    row_count: u64,
    offset: u64,
}

impl LimitClause {
    pub fn new(row_count: u64, offset: u64) -> Self {
        Self { row_count, offset }
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn render(&self) -> String {
        if self.offset > 0 {
            format!("LIMIT {} OFFSET {}", self.row_count, self.offset)
        } else {
            format!("LIMIT {}", self.row_count)
        }
    }
}
