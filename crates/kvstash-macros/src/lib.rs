extern crate proc_macro;

use proc_macro::TokenStream;

/// Rewrites an annotated struct into a storage-backed, observable
/// settings bundle.
#[proc_macro_attribute]
pub fn persisted(args: TokenStream, input: TokenStream) -> TokenStream {
    match kvstash_codegen::generate(args.into(), input.into()) {
        Ok(output) => output.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
