mod accessors;
mod bundle;

use crate::schema::Model;

use proc_macro2::TokenStream;
use quote::quote;

struct Expand<'a> {
    /// The struct being expanded
    model: &'a Model,

    /// Path prefix for kvstash runtime types
    kvstash: TokenStream,
}

pub(super) fn model(model: &Model) -> TokenStream {
    let expand = Expand {
        model,
        kvstash: quote!(kvstash),
    };

    let struct_decl = expand.expand_struct();
    let key_enum = expand.expand_key_enum();
    let bundle = expand.expand_bundle_impl();
    let observable = expand.expand_observable_impl();

    // The key registry and impls live behind `const _` so the registry
    // enum never leaks into the caller's namespace.
    quote! {
        #struct_decl

        const _: () = {
            #key_enum
            #bundle
            #observable
        };
    }
}

impl Expand<'_> {
    /// The rewritten struct: private backing fields for persisted members,
    /// ignored members as written, plus the storage and observation
    /// plumbing.
    fn expand_struct(&self) -> TokenStream {
        let kvstash = &self.kvstash;
        let attrs = &self.model.attrs;
        let vis = &self.model.vis;
        let ident = &self.model.ident;

        let backing_fields = self
            .model
            .fields
            .iter()
            .map(|field| self.expand_backing_field(field));

        let ignored_fields = self.model.ignored.iter().map(|field| {
            let attrs = &field.attrs;
            let vis = &field.vis;
            let ident = &field.ident;
            let ty = &field.ty;

            quote! {
                #(#attrs)*
                #vis #ident: #ty,
            }
        });

        quote! {
            #(#attrs)*
            #vis struct #ident {
                #(#backing_fields)*
                #(#ignored_fields)*
                storage: ::std::sync::Arc<dyn #kvstash::Store>,
                registrar: #kvstash::ObservationRegistrar,
                _subscription: ::std::sync::Mutex<::std::option::Option<#kvstash::Subscription>>,
            }
        }
    }

    fn expand_observable_impl(&self) -> TokenStream {
        let kvstash = &self.kvstash;
        let ident = &self.model.ident;

        quote! {
            impl #kvstash::Observable for #ident {
                fn registrar(&self) -> &#kvstash::ObservationRegistrar {
                    &self.registrar
                }
            }
        }
    }
}
