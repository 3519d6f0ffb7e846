use super::{ErrorSet, Mapping, TrackedArgs, TypeKind};

use heck::ToUpperCamelCase;
use proc_macro2::TokenStream;
use quote::quote;

/// Metadata for one persisted field, sufficient to generate its accessors
/// and its slice of the type-level bundle.
#[derive(Debug)]
pub(crate) struct Field {
    /// Field identifier; its textual form doubles as the storage key
    pub(crate) ident: syn::Ident,

    /// Storage key
    pub(crate) key: String,

    /// Field visibility; generated accessors inherit it
    pub(crate) vis: syn::Visibility,

    /// Key-registry variant identifier
    pub(crate) variant_ident: syn::Ident,

    /// Identifier for the generated setter
    pub(crate) set_ident: syn::Ident,

    /// The written field type, including any `Option` wrapping
    pub(crate) ty: syn::Type,

    /// Whether the written type is `Option`-wrapped
    pub(crate) is_optional: bool,

    /// Primitive kind the storage layer reads and writes for this field
    pub(crate) type_kind: TypeKind,

    /// Present when the declared type is an enum persisted by raw value
    pub(crate) mapping: Option<Mapping>,

    /// The `#[default(...)]` expression, carried as opaque source
    pub(crate) default_expr: syn::Expr,

    /// Optional fields with a non-`None` default need the three-state
    /// reload through the nil sentinel
    pub(crate) optional_without_nil_default: bool,
}

/// Persistence markers on one field, decoded before extraction proceeds.
#[derive(Debug)]
pub(crate) enum FieldAnnotation {
    Plain,
    Ignored,
    Tracked(Option<syn::Type>),
}

impl FieldAnnotation {
    pub(crate) fn from_ast(field: &syn::Field) -> syn::Result<Self> {
        let mut errs = ErrorSet::new();
        let mut ignored = false;
        let mut tracked: Option<Option<syn::Type>> = None;

        for attr in &field.attrs {
            if attr.path().is_ident("ignored") {
                if ignored {
                    errs.push(syn::Error::new_spanned(attr, "duplicate #[ignored] attribute"));
                } else {
                    ignored = true;
                }
            } else if attr.path().is_ident("tracked") {
                if tracked.is_some() {
                    errs.push(syn::Error::new_spanned(attr, "duplicate #[tracked] attribute"));
                } else {
                    match TrackedArgs::from_ast(attr) {
                        Ok(args) => tracked = Some(args.raw_ty),
                        Err(err) => errs.push(err),
                    }
                }
            }
        }

        if ignored && tracked.is_some() {
            errs.push(syn::Error::new_spanned(
                field,
                "#[ignored] and #[tracked] cannot be combined on the same field",
            ));
        }

        if let Some(err) = errs.collect() {
            return Err(err);
        }

        Ok(if ignored {
            FieldAnnotation::Ignored
        } else if let Some(raw_ty) = tracked {
            FieldAnnotation::Tracked(raw_ty)
        } else {
            FieldAnnotation::Plain
        })
    }
}

impl Field {
    /// Extracts metadata from one field declaration. Returns `None` when
    /// the field opts out of persistence.
    pub(super) fn from_ast(field: &syn::Field) -> syn::Result<Option<Self>> {
        let annotation = FieldAnnotation::from_ast(field)?;

        if matches!(annotation, FieldAnnotation::Ignored) {
            return Ok(None);
        }

        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "persisted fields must be named"));
        };

        let default_expr = default_expr(field)?.ok_or_else(|| {
            syn::Error::new_spanned(field, "persisted fields must have a #[default(...)] initial value")
        })?;

        let (is_optional, base_ty) = match option_inner(&field.ty) {
            Some(inner) => (true, inner.clone()),
            None => (false, field.ty.clone()),
        };

        // For mapped fields the storage type is the mapping's raw type, not
        // the written type.
        let (mapping, storage_ty) = match &annotation {
            FieldAnnotation::Tracked(Some(raw_ty)) => (
                Some(Mapping {
                    enum_ty: base_ty.clone(),
                    raw_ty: raw_ty.clone(),
                }),
                raw_ty.clone(),
            ),
            _ => (None, base_ty),
        };

        let Some(type_kind) = TypeKind::resolve(&storage_ty) else {
            return Err(syn::Error::new_spanned(
                &field.ty,
                format!(
                    "persisted field `{ident}` must be {supported}, or an `Option` of these; \
                     mark it #[ignored] to leave it unpersisted, or add \
                     #[tracked(enum_with_raw_value = ...)] if it is an enum stored by raw value",
                    supported = TypeKind::SUPPORTED,
                ),
            ));
        };

        let nil_default = is_nil(&default_expr);

        Ok(Some(Self {
            key: ident.to_string(),
            vis: field.vis.clone(),
            variant_ident: variant_ident(ident),
            set_ident: syn::Ident::new(&format!("set_{ident}"), ident.span()),
            ident: ident.clone(),
            ty: field.ty.clone(),
            is_optional,
            type_kind,
            mapping,
            default_expr,
            optional_without_nil_default: is_optional && !nil_default,
        }))
    }

    /// The expression backing storage is initialized from: the written
    /// default, projected through the raw-value conversion for mapped
    /// non-`None` defaults. The written default stays available for
    /// enum-level fallbacks in the accessors.
    pub(crate) fn storage_default(&self, kvstash: &TokenStream) -> TokenStream {
        let expr = &self.default_expr;

        if self.mapping.is_none() || is_nil(expr) {
            return quote!(#expr);
        }

        if self.is_optional {
            quote!((#expr).map(|value| #kvstash::RawRepr::to_raw(&value)))
        } else {
            quote!(#kvstash::RawRepr::to_raw(&(#expr)))
        }
    }

    /// Backing-field type: the raw type for mapped fields, re-wrapped in
    /// `Option` when the written type was optional.
    pub(crate) fn storage_ty(&self) -> TokenStream {
        match &self.mapping {
            Some(mapping) => {
                let raw_ty = &mapping.raw_ty;
                if self.is_optional {
                    quote!(::std::option::Option<#raw_ty>)
                } else {
                    quote!(#raw_ty)
                }
            }
            None => {
                let ty = &self.ty;
                quote!(#ty)
            }
        }
    }
}

pub(super) fn default_expr(field: &syn::Field) -> syn::Result<Option<syn::Expr>> {
    let mut found: Option<syn::Expr> = None;
    let mut errs = ErrorSet::new();

    for attr in &field.attrs {
        if attr.path().is_ident("default") {
            if found.is_some() {
                errs.push(syn::Error::new_spanned(attr, "duplicate #[default] attribute"));
            } else {
                match attr.parse_args() {
                    Ok(expr) => found = Some(expr),
                    Err(err) => errs.push(err),
                }
            }
        }
    }

    if let Some(err) = errs.collect() {
        return Err(err);
    }

    Ok(found)
}

fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(path) = ty else { return None };
    if path.qself.is_some() {
        return None;
    }

    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }

    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn is_nil(expr: &syn::Expr) -> bool {
    matches!(expr, syn::Expr::Path(path) if path.path.is_ident("None"))
}

fn variant_ident(ident: &syn::Ident) -> syn::Ident {
    syn::Ident::new(&ident.to_string().to_upper_camel_case(), ident.span())
}
