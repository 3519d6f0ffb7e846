mod expand;
mod schema;

use proc_macro2::TokenStream;

/// Expands one `#[persisted]` struct into its store-backed rendition:
/// backing fields, typed accessors, key registry, reload dispatch, and
/// external-change handling.
pub fn generate(args: TokenStream, input: TokenStream) -> syn::Result<TokenStream> {
    if !args.is_empty() {
        return Err(syn::Error::new_spanned(args, "#[persisted] takes no arguments"));
    }

    let item = match syn::parse2::<syn::Item>(input)? {
        syn::Item::Struct(item) => item,
        item => {
            return Err(syn::Error::new_spanned(
                item,
                "#[persisted] can only be applied to struct declarations",
            ))
        }
    };

    let model = schema::Model::from_ast(&item)?;

    Ok(expand::model(&model))
}
