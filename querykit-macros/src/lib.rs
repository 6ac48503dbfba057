use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod parsed;

use parsed::ParsedModel;

/// Derive the field registry, field references and selective decoder for a model.
///
/// Every field of type `FieldState<T>` is registered under its own name or the
/// key given with `#[query(key = "...")]`. Fields marked `#[query(skip)]` are
/// left out of the registry and take `Default::default()` when decoding.
///
/// # Example
///
/// ```text
/// #[derive(Queryable)]
/// #[query(endpoint = "games")]
/// struct Game {
///     #[query(required)]
///     id: FieldState<i64>,
///     name: FieldState<String>,
///     #[query(key = "first_release_date")]
///     released: FieldState<DateTime<Utc>>,
///     #[query(skip)]
///     local_rank: u32,
/// }
///
/// // Generated:
/// // - GameFields { id, name, released, local_rank }: one Field<Game> each
/// // - impl Queryable for Game (descriptor, fields, decode)
/// // - a ModelRegistration submitted to the inventory
/// ```
#[proc_macro_derive(Queryable, attributes(query))]
pub fn derive_queryable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedModel::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
