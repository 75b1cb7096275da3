use crate::bound::{BoundValue, tag};
use bson::Bson;

///
/// Canonical Bound Rank
///
/// Stable rank used for cross-variant ordering of partition bounds.
///
#[must_use]
pub(crate) const fn canonical_rank(value: &BoundValue) -> u8 {
    // Tags are 1-based; rank is 0-based.
    tag::canonical_tag(value).to_u8() - 1
}

///
/// Element Rank
///
/// Cross-kind rank for arbitrary elements nested inside embedded document
/// bounds. Covers every BSON kind, including the ones that cannot be a
/// top-level bound. Gaps leave room for kinds that share a class.
///
#[must_use]
pub(crate) const fn element_rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Undefined => 1,
        Bson::Null => 5,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 10,
        Bson::String(_) | Bson::Symbol(_) => 15,
        Bson::Document(_) => 20,
        Bson::Array(_) => 25,
        Bson::Binary(_) => 30,
        Bson::ObjectId(_) => 35,
        Bson::Boolean(_) => 40,
        Bson::DateTime(_) => 45,
        Bson::Timestamp(_) => 47,
        Bson::RegularExpression(_) => 50,
        Bson::DbPointer(_) => 55,
        Bson::JavaScriptCode(_) => 60,
        Bson::JavaScriptCodeWithScope(_) => 65,
        Bson::MaxKey => 127,
    }
}
