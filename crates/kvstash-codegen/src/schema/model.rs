use super::{ErrorSet, Field};

/// One `#[persisted]` struct: its eligible fields in declaration order,
/// plus the fields that opted out.
#[derive(Debug)]
pub(crate) struct Model {
    /// Type identifier
    pub(crate) ident: syn::Ident,

    /// Type visibility; the generated constructors inherit it
    pub(crate) vis: syn::Visibility,

    /// Non-marker attributes on the struct, re-emitted as written
    pub(crate) attrs: Vec<syn::Attribute>,

    /// Eligible fields, in declaration order (the key-registry order)
    pub(crate) fields: Vec<Field>,

    /// Fields excluded from persistence
    pub(crate) ignored: Vec<IgnoredField>,

    /// Identifier of the generated key-registry enum
    pub(crate) key_enum_ident: syn::Ident,
}

/// A field excluded from persistence, re-emitted as written.
#[derive(Debug)]
pub(crate) struct IgnoredField {
    pub(crate) ident: syn::Ident,
    pub(crate) vis: syn::Visibility,
    pub(crate) attrs: Vec<syn::Attribute>,
    pub(crate) ty: syn::Type,

    /// Optional `#[default(...)]`; absent falls back to `Default::default()`
    pub(crate) default_expr: Option<syn::Expr>,
}

impl Model {
    pub(crate) fn from_ast(ast: &syn::ItemStruct) -> syn::Result<Self> {
        let syn::Fields::Named(node) = &ast.fields else {
            return Err(syn::Error::new_spanned(&ast.fields, "persisted fields must be named"));
        };

        // Generics are not supported: the bundle pins one concrete type to
        // one key registry and one shared instance.
        if !ast.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &ast.generics,
                "persisted struct generics are not supported",
            ));
        }

        let mut fields = vec![];
        let mut ignored = vec![];
        let mut errs = ErrorSet::new();

        for field in node.named.iter() {
            match Field::from_ast(field) {
                Ok(Some(field)) => fields.push(field),
                Ok(None) => match IgnoredField::from_ast(field) {
                    Ok(field) => ignored.push(field),
                    Err(err) => errs.push(err),
                },
                Err(err) => errs.push(err),
            }
        }

        if let Some(err) = errs.collect() {
            return Err(err);
        }

        Ok(Self {
            ident: ast.ident.clone(),
            vis: ast.vis.clone(),
            attrs: ast.attrs.clone(),
            key_enum_ident: syn::Ident::new(&format!("{}Key", ast.ident), ast.ident.span()),
            fields,
            ignored,
        })
    }
}

impl IgnoredField {
    fn from_ast(field: &syn::Field) -> syn::Result<Self> {
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "persisted fields must be named"));
        };

        let default_expr = super::field::default_expr(field)?;

        Ok(Self {
            ident: ident.clone(),
            vis: field.vis.clone(),
            attrs: strip_marker_attrs(&field.attrs),
            ty: field.ty.clone(),
            default_expr,
        })
    }
}

fn strip_marker_attrs(attrs: &[syn::Attribute]) -> Vec<syn::Attribute> {
    attrs
        .iter()
        .filter(|attr| {
            !attr.path().is_ident("default")
                && !attr.path().is_ident("tracked")
                && !attr.path().is_ident("ignored")
        })
        .cloned()
        .collect()
}
