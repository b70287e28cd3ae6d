//! Derive macros for pgclause
//!
//! Provides `#[derive(TableModel)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod table_model;

/// Derive `TableModel` for a struct.
///
/// # Example
///
/// ```ignore
/// use pgclause::TableModel;
///
/// #[derive(TableModel)]
/// struct Example {
///     #[column(psql = "cool", sqlite = "cool")]
///     name: String,
///     #[column(psql = "number_of_star")]
///     stars: Option<i64>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[column(<tag> = "name", ...)]` - Column name per schema tag. A field
///   without a tag for the table's dialect is rejected when the table is built.
///
/// Field types must implement `pgclause::HasKind`.
#[proc_macro_derive(TableModel, attributes(column))]
pub fn derive_table_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    table_model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
