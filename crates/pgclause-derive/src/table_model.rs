//! TableModel derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "TableModel can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "TableModel can only be derived for structs",
            ));
        }
    };

    let field_defs = fields
        .iter()
        .map(|field| {
            let ident = field
                .ident
                .as_ref()
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
            let field_name = ident.to_string();
            let ty = &field.ty;
            let tags = column_tags(field)?.into_iter().map(|(tag, column)| {
                quote! { (#tag, #column) }
            });

            Ok(quote! {
                ::pgclause::FieldDef::new(
                    #field_name,
                    <#ty as ::pgclause::HasKind>::KIND,
                    &[#(#tags),*],
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics ::pgclause::TableModel for #name #ty_generics #where_clause {
            const FIELDS: &'static [::pgclause::FieldDef] = &[#(#field_defs),*];
        }
    })
}

/// Collect `tag = "column"` pairs from every `#[column(...)]` attribute.
fn column_tags(field: &syn::Field) -> Result<Vec<(String, String)>> {
    let mut tags: Vec<(String, String)> = Vec::new();

    for attr in &field.attrs {
        if !attr.path().is_ident("column") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let tag = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .ok_or_else(|| meta.error("expected a schema tag such as `psql`"))?;
            let column: LitStr = meta.value()?.parse()?;

            if tags.iter().any(|(t, _)| *t == tag) {
                return Err(meta.error(format!("duplicate `{tag}` tag")));
            }
            tags.push((tag, column.value()));
            Ok(())
        })?;
    }

    Ok(tags)
}
