mod kw {
    syn::custom_keyword!(enum_with_raw_value);
}

/// Custom mapping for a field whose declared type is an enumeration stored
/// by raw value: `#[tracked(enum_with_raw_value = i64)]`. The field's
/// written type supplies the enum; the argument supplies the primitive
/// actually persisted.
#[derive(Debug)]
pub(crate) struct Mapping {
    /// The declared enum type (the written field type, optional-unwrapped)
    pub(crate) enum_ty: syn::Type,

    /// The primitive type actually persisted
    pub(crate) raw_ty: syn::Type,
}

/// Argument list of the `#[tracked]` marker.
#[derive(Debug)]
pub(crate) struct TrackedArgs {
    pub(crate) raw_ty: Option<syn::Type>,
}

impl TrackedArgs {
    pub(crate) fn from_ast(attr: &syn::Attribute) -> syn::Result<Self> {
        // Bare `#[tracked]` carries no argument list to parse.
        if matches!(attr.meta, syn::Meta::Path(_)) {
            return Ok(Self { raw_ty: None });
        }
        attr.parse_args()
    }
}

impl syn::parse::Parse for TrackedArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(Self { raw_ty: None });
        }

        let lookahead = input.lookahead1();
        if !lookahead.peek(kw::enum_with_raw_value) {
            return Err(lookahead.error());
        }

        let _kw: kw::enum_with_raw_value = input.parse()?;
        let _eq: syn::Token![=] = input.parse()?;
        let raw_ty: syn::Type = input.parse()?;

        Ok(Self {
            raw_ty: Some(raw_ty),
        })
    }
}
