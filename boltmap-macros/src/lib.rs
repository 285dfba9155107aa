
//! Procedural macros for boltmap.
//!
//! This crate is not meant to be used directly; use the [`boltmap`] facade
//! crate which re-exports all macros.

extern crate proc_macro;

use proc_macro::TokenStream;

mod mappable;

/// Derive [`Mappable`](boltmap_core::traits::Mappable) and
/// [`FromValue`](boltmap_core::traits::FromValue) for a struct.
///
/// By default the struct literal becomes the type's single (designated)
/// constructor and every field is a constructor parameter read from the
/// record path equal to the field name, ignoring case. With
/// `#[boltmap(default)]` the object is built with `Default::default()` and
/// every field becomes a settable property instead.
///
/// The generated `FromValue` impl maps entities and nested maps through the
/// registry, so derived types can be nested and collected into `Vec`s.
///
/// # Attributes
///
/// **Struct-level:**
/// - `#[boltmap(default)]`: property mode (requires `Default`).
/// - `#[boltmap(name = "...")]`: type name used in diagnostics. Defaults to the struct name.
///
/// **Field-level:**
/// - `#[boltmap(source = "...")]`: read from this path instead, e.g. `"person.name"`.
/// - `#[boltmap(optional)]`: absent path leaves the default. Implied for `Option<T>`.
/// - `#[boltmap(default = <literal>)]`: value used when the path is absent.
/// - `#[boltmap(ignore)]`: never mapped; the field gets `Default::default()`.
/// - `#[boltmap(node_labels)]`: capture the labels of the node at the path.
/// - `#[boltmap(relationship_type)]`: capture the type of the relationship at the path.
///   For either aspect, a value of another kind leaves the field at
///   `Default::default()`, so the field type must implement `Default`.
/// - `#[boltmap(converter = "path::to::fn")]`: convert with
///   `fn(&Value) -> Result<FieldType, E>` instead of `FromValue`.
/// - `#[boltmap(flatten)]`: map the same record into the field's type.
///   Constructor mode only.
///
/// # Example
///
/// ```rust,ignore
/// use boltmap::prelude::*;
///
/// #[derive(Debug, Mappable)]
/// struct Movie {
///     title: String,
///     released: Option<i64>,
///     #[boltmap(source = "m", node_labels)]
///     labels: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Mappable, attributes(boltmap))]
pub fn mappable(input: TokenStream) -> TokenStream {
    mappable::expand(input)
}
