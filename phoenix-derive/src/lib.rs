//! # Phoenix Derive Macros
//!
//! Procedural macros for the `phoenix` crate.
//!
//! ## Macros
//!
//! ### `Entity`
//!
//! Derives `phoenix::metadata::Entity`, declaring where a stored type lives.
//!
//! - **Supported for**: structs and enums
//! - **Type attribute**: `#[entity(profile = "...", collection = "...", bucket = "...", base = "Type")]`,
//!   each key at most once
//!
//! Every generic type parameter becomes a type argument of the resolved
//! lineage and must itself implement `Entity`.
//!
//! ```rust,ignore
//! use phoenix_derive::Entity;
//!
//! #[derive(Entity)]
//! #[entity(profile = "main")]
//! pub struct MainStore;
//!
//! #[derive(Entity)]
//! #[entity(collection = "customers", base = "MainStore")]
//! pub struct Customer {
//!     pub name: String,
//! }
//! ```
//!
//! ### `Comparable`
//!
//! Derives `phoenix::comparer::Inspect` (and `Comparable` for structs) so a
//! type can be diffed by `phoenix::comparer::compare`.
//!
//! - **Supported for**: structs with named fields, unit structs, unit-only enums
//! - **Field attribute**: `#[compare(ignore)]` excludes a field from diffs,
//!   `#[compare(rename = "...")]` changes its name in property paths
//!
//! ```rust,ignore
//! use phoenix_derive::Comparable;
//!
//! #[derive(Comparable)]
//! pub struct Customer {
//!     pub name: String,
//!     #[compare(ignore)]
//!     pub last_seen: chrono::DateTime<chrono::Utc>,
//! }
//! ```

extern crate proc_macro;
mod comparable;
mod entity;

use crate::comparable::{generate_comparable_for_enum, generate_comparable_for_struct};
use crate::entity::generate_entity;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives the `Entity` trait from `#[entity(...)]` markers.
///
/// # Errors
///
/// Returns a compile error if a marker key is repeated, a key is unknown,
/// `base` is not a type, or the type is a union.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    if let Data::Union(_) = ast.data {
        let error = syn::Error::new_spanned(
            &ast,
            "Cannot derive Entity for unions. Use a struct or an enum.",
        );
        return error.to_compile_error().into();
    }

    match generate_entity(&ast) {
        Ok(token_stream) => token_stream,
        Err(e) => e.to_compile_error().into(),
    }
}

/// Derives `Inspect` and `Comparable` for structural comparison.
///
/// # Errors
///
/// Returns a compile error for tuple structs, enums with data-carrying
/// variants, unions, and unknown `#[compare(...)]` keys.
#[proc_macro_derive(Comparable, attributes(compare))]
pub fn derive_comparable(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_comparable_for_struct(&ast, data),
        Data::Enum(ref data) => generate_comparable_for_enum(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast,
            "Cannot derive Comparable for unions.",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => {
            let error = syn::Error::new(
                e.span(),
                format!("Failed to derive Comparable for '{}': {}", ast.ident, e),
            );
            error.to_compile_error().into()
        }
    }
}
