use quote::quote;

/// The closed set of primitive kinds the storage layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeKind {
    Text,
    Binary,
    Integer,
    FloatingPoint,
    Boolean,
}

impl TypeKind {
    /// Human-readable list of supported storage types, for diagnostics.
    pub(crate) const SUPPORTED: &'static str = "`String`, `i64`, `f64`, `bool`, or `Vec<u8>`";

    /// Resolves a written type against the closed set. Purely a function of
    /// the type's textual form.
    pub(crate) fn resolve(ty: &syn::Type) -> Option<TypeKind> {
        let name = quote!(#ty).to_string().replace(' ', "");
        match name.as_str() {
            "String" => Some(TypeKind::Text),
            "Vec<u8>" => Some(TypeKind::Binary),
            "i64" => Some(TypeKind::Integer),
            "f64" => Some(TypeKind::FloatingPoint),
            "bool" => Some(TypeKind::Boolean),
            _ => None,
        }
    }

    /// True for kinds whose backing values are `Copy`; text and binary
    /// backings are cloned instead.
    pub(crate) fn is_copy(self) -> bool {
        matches!(
            self,
            TypeKind::Integer | TypeKind::FloatingPoint | TypeKind::Boolean
        )
    }
}
