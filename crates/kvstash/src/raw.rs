/// Conversion between a custom enumeration and the primitive value actually
/// persisted for it.
///
/// Fields marked `#[tracked(enum_with_raw_value = ...)]` project through
/// this pair: `to_raw` when writing, `from_raw` when reading back.
/// `from_raw` returns `None` for raw values with no corresponding case
/// (corrupted or foreign data); generated accessors then fall back to the
/// field's declared default.
pub trait RawRepr: Sized {
    type Raw;

    fn to_raw(&self) -> Self::Raw;

    fn from_raw(raw: Self::Raw) -> Option<Self>;
}
