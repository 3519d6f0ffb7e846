use super::Expand;
use crate::schema::{Field, TypeKind};

use proc_macro2::TokenStream;
use quote::quote;

impl Expand<'_> {
    /// The key registry: one string-valued case per persisted field, in
    /// declaration order, with full enumeration and reverse lookup.
    pub(super) fn expand_key_enum(&self) -> TokenStream {
        let key_enum = &self.model.key_enum_ident;
        let variants: Vec<_> = self.model.fields.iter().map(|f| &f.variant_ident).collect();
        let keys: Vec<_> = self.model.fields.iter().map(|f| f.key.as_str()).collect();
        let count = variants.len();

        quote! {
            #[derive(Clone, Copy, PartialEq, Eq, Debug)]
            enum #key_enum {
                #(#variants,)*
            }

            impl #key_enum {
                const ALL: [#key_enum; #count] = [#(#key_enum::#variants,)*];

                fn raw_value(self) -> &'static str {
                    match self {
                        #(#key_enum::#variants => #keys,)*
                    }
                }

                fn from_raw(raw: &str) -> ::std::option::Option<#key_enum> {
                    match raw {
                        #(#keys => ::std::option::Option::Some(#key_enum::#variants),)*
                        _ => ::std::option::Option::None,
                    }
                }
            }
        }
    }

    pub(super) fn expand_bundle_impl(&self) -> TokenStream {
        let kvstash = &self.kvstash;
        let vis = &self.model.vis;
        let ident = &self.model.ident;
        let key_enum = &self.model.key_enum_ident;

        let accessors = self
            .model
            .fields
            .iter()
            .map(|field| self.expand_accessors(field));
        let init_fields = self.expand_init_fields();
        let reload_arms = self
            .model
            .fields
            .iter()
            .map(|field| self.expand_reload_arm(field));

        quote! {
            impl #ident {
                #(#accessors)*

                /// Process-wide shared instance, backed by the default store.
                #vis fn shared() -> &'static ::std::sync::Arc<#ident> {
                    static SHARED: ::std::sync::OnceLock<::std::sync::Arc<#ident>> =
                        ::std::sync::OnceLock::new();
                    SHARED.get_or_init(|| #ident::with_store(#kvstash::default_store()))
                }

                /// Builds an instance against `storage`: every key reloads in
                /// registry order, then the instance subscribes to the store's
                /// external-change channel.
                #vis fn with_store(
                    storage: ::std::sync::Arc<dyn #kvstash::Store>,
                ) -> ::std::sync::Arc<#ident> {
                    let instance = ::std::sync::Arc::new(#ident {
                        #init_fields
                        storage,
                        registrar: #kvstash::ObservationRegistrar::new(),
                        _subscription: ::std::sync::Mutex::new(::std::option::Option::None),
                    });

                    for key in #key_enum::ALL {
                        instance.reload(key);
                    }

                    let weak = ::std::sync::Arc::downgrade(&instance);
                    let subscription =
                        instance.storage.subscribe(::std::boxed::Box::new(move |changed_keys| {
                            if let ::std::option::Option::Some(instance) = weak.upgrade() {
                                instance.did_change_externally(changed_keys);
                            }
                        }));
                    *instance._subscription.lock().unwrap() =
                        ::std::option::Option::Some(subscription);

                    instance
                }

                fn access(&self, key: #key_enum) {
                    self.registrar.access(key.raw_value());
                }

                fn with_mutation<R>(
                    &self,
                    key: #key_enum,
                    mutation: impl ::std::ops::FnOnce() -> R,
                ) -> R {
                    self.registrar.with_mutation(key.raw_value(), mutation)
                }

                fn reload(&self, key: #key_enum) {
                    match key {
                        #(#reload_arms)*
                    }
                }

                fn did_change_externally(&self, changed_keys: &[::std::string::String]) {
                    for raw_key in changed_keys {
                        if let ::std::option::Option::Some(key) = #key_enum::from_raw(raw_key) {
                            self.reload(key);
                        }
                    }
                }
            }
        }
    }

    fn expand_init_fields(&self) -> TokenStream {
        let persisted = self.model.fields.iter().map(|field| {
            let ident = &field.ident;
            let default = field.storage_default(&self.kvstash);
            quote!(#ident: ::std::sync::Mutex::new(#default),)
        });

        let ignored = self.model.ignored.iter().map(|field| {
            let ident = &field.ident;
            match &field.default_expr {
                Some(expr) => quote!(#ident: #expr,),
                None => quote!(#ident: ::std::default::Default::default(),),
            }
        });

        quote! {
            #(#persisted)*
            #(#ignored)*
        }
    }

    fn expand_reload_arm(&self, field: &Field) -> TokenStream {
        let kvstash = &self.kvstash;
        let key_enum = &self.model.key_enum_ident;
        let ident = &field.ident;
        let variant = &field.variant_ident;
        let key = &field.key;
        let default = field.storage_default(kvstash);

        let read = self.expand_store_read(field);
        let read = if field.is_optional {
            quote!(#read.map(::std::option::Option::Some))
        } else {
            read
        };

        let body = if field.optional_without_nil_default {
            // Three states: explicit nil (sentinel), stored value, absent.
            quote! {
                if self.storage.string(#key).as_deref()
                    == ::std::option::Option::Some(#kvstash::NIL_SENTINEL)
                {
                    *self.#ident.lock().unwrap() = ::std::option::Option::None;
                } else {
                    *self.#ident.lock().unwrap() = #read.unwrap_or_else(|| #default);
                }
            }
        } else {
            quote! {
                *self.#ident.lock().unwrap() = #read.unwrap_or_else(|| #default);
            }
        };

        quote! {
            #key_enum::#variant => self.with_mutation(#key_enum::#variant, || {
                #body
            }),
        }
    }

    fn expand_store_read(&self, field: &Field) -> TokenStream {
        let kvstash = &self.kvstash;
        let key = &field.key;

        match field.type_kind {
            TypeKind::Text => quote!(self.storage.string(#key)),
            TypeKind::Binary => quote!(self.storage.bytes(#key)),
            TypeKind::Integer => {
                quote!(self.storage.numeric(#key).map(#kvstash::Numeric::as_int))
            }
            TypeKind::FloatingPoint => {
                quote!(self.storage.numeric(#key).map(#kvstash::Numeric::as_float))
            }
            TypeKind::Boolean => {
                quote!(self.storage.numeric(#key).map(#kvstash::Numeric::as_bool))
            }
        }
    }
}
