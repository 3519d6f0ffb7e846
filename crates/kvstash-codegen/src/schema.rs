mod error;
pub(crate) use error::ErrorSet;

mod field;
pub(crate) use field::{Field, FieldAnnotation};

mod mapping;
pub(crate) use mapping::{Mapping, TrackedArgs};

mod model;
pub(crate) use model::{IgnoredField, Model};

mod ty;
pub(crate) use ty::TypeKind;
