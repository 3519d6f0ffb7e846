use super::Expand;
use crate::schema::{Field, TypeKind};

use proc_macro2::TokenStream;
use quote::quote;

impl Expand<'_> {
    /// Backing-field declaration for one persisted field: private, typed as
    /// the effective storage type.
    pub(super) fn expand_backing_field(&self, field: &Field) -> TokenStream {
        let ident = &field.ident;
        let storage_ty = field.storage_ty();

        quote! {
            #ident: ::std::sync::Mutex<#storage_ty>,
        }
    }

    /// Get and set accessors for one persisted field.
    pub(super) fn expand_accessors(&self, field: &Field) -> TokenStream {
        let getter = self.expand_getter(field);
        let setter = self.expand_setter(field);

        quote! {
            #getter
            #setter
        }
    }

    fn expand_getter(&self, field: &Field) -> TokenStream {
        let kvstash = &self.kvstash;
        let vis = &field.vis;
        let key_enum = &self.model.key_enum_ident;
        let ident = &field.ident;
        let variant = &field.variant_ident;
        let ty = &field.ty;

        let backing = if field.type_kind.is_copy() {
            quote!(*self.#ident.lock().unwrap())
        } else {
            quote!(self.#ident.lock().unwrap().clone())
        };

        let value = match &field.mapping {
            Some(mapping) => {
                let enum_ty = &mapping.enum_ty;
                if field.is_optional {
                    // Nil backing and failed reverse lookups both read as None.
                    quote!((#backing).and_then(<#enum_ty as #kvstash::RawRepr>::from_raw))
                } else {
                    let fallback = &field.default_expr;
                    quote! {
                        <#enum_ty as #kvstash::RawRepr>::from_raw(#backing)
                            .unwrap_or_else(|| #fallback)
                    }
                }
            }
            None => backing,
        };

        quote! {
            #vis fn #ident(&self) -> #ty {
                self.access(#key_enum::#variant);
                #value
            }
        }
    }

    fn expand_setter(&self, field: &Field) -> TokenStream {
        let kvstash = &self.kvstash;
        let vis = &field.vis;
        let key_enum = &self.model.key_enum_ident;
        let ident = &field.ident;
        let set_ident = &field.set_ident;
        let variant = &field.variant_ident;
        let ty = &field.ty;
        let key = &field.key;

        let project = match &field.mapping {
            Some(_) if field.is_optional => {
                quote!(let raw = value.map(|value| #kvstash::RawRepr::to_raw(&value));)
            }
            Some(_) => quote!(let raw = #kvstash::RawRepr::to_raw(&value);),
            None => quote!(let raw = value;),
        };

        let assign = if field.type_kind.is_copy() {
            quote!(*self.#ident.lock().unwrap() = raw;)
        } else {
            quote!(*self.#ident.lock().unwrap() = raw.clone();)
        };

        let persist = if field.is_optional {
            let write_some = self.expand_store_write(field, quote!(raw));
            let write_none = if field.optional_without_nil_default {
                // The store cannot represent "explicitly nil" for a field
                // that reloads to a non-nil default; the sentinel stands in.
                quote! {
                    self.storage.write(
                        #key,
                        #kvstash::Value::Text(#kvstash::NIL_SENTINEL.to_string()),
                    )
                }
            } else {
                quote!(self.storage.remove(#key))
            };

            quote! {
                match raw {
                    ::std::option::Option::Some(raw) => #write_some,
                    ::std::option::Option::None => #write_none,
                }
            }
        } else {
            let write = self.expand_store_write(field, quote!(raw));
            quote!(#write;)
        };

        quote! {
            #vis fn #set_ident(&self, value: #ty) {
                self.with_mutation(#key_enum::#variant, || {
                    #project
                    #assign
                    #persist
                });
            }
        }
    }

    pub(super) fn expand_store_write(&self, field: &Field, value: TokenStream) -> TokenStream {
        let kvstash = &self.kvstash;
        let key = &field.key;

        match field.type_kind {
            TypeKind::Text => {
                quote!(self.storage.write(#key, #kvstash::Value::Text(#value)))
            }
            TypeKind::Binary => {
                quote!(self.storage.write(#key, #kvstash::Value::Bytes(#value)))
            }
            TypeKind::Integer => {
                quote!(self.storage.write(#key, #kvstash::Value::Numeric(#kvstash::Numeric::Int(#value))))
            }
            TypeKind::FloatingPoint => {
                quote!(self.storage.write(#key, #kvstash::Value::Numeric(#kvstash::Numeric::Float(#value))))
            }
            TypeKind::Boolean => {
                quote!(self.storage.write(#key, #kvstash::Value::Numeric(#kvstash::Numeric::Bool(#value))))
            }
        }
    }
}
