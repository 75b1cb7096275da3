use crate::bound::BoundValue;

///
/// BoundTag
///
/// Stable bound-variant tag. Declaration order is the canonical cross-kind
/// order of ordering-key values in the source database.
///
/// IMPORTANT:
/// Tag values feed the comparator that builds and validates partition
/// ranges; reordering them changes which documents a partition covers.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BoundTag {
    MinKey = 1,
    Null = 2,
    Number = 3,
    Text = 4,
    Document = 5,
    Binary = 6,
    ObjectId = 7,
    Bool = 8,
    DateTime = 9,
    Timestamp = 10,
    MaxKey = 11,
}

impl BoundTag {
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable human-readable kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MinKey => "MinKey",
            Self::Null => "Null",
            Self::Number => "Number",
            Self::Text => "Text",
            Self::Document => "Document",
            Self::Binary => "Binary",
            Self::ObjectId => "ObjectId",
            Self::Bool => "Bool",
            Self::DateTime => "DateTime",
            Self::Timestamp => "Timestamp",
            Self::MaxKey => "MaxKey",
        }
    }
}

#[must_use]
pub(super) const fn canonical_tag(value: &BoundValue) -> BoundTag {
    match value {
        BoundValue::MinKey => BoundTag::MinKey,
        BoundValue::Null => BoundTag::Null,
        BoundValue::Number(_) => BoundTag::Number,
        BoundValue::Text(_) => BoundTag::Text,
        BoundValue::Document(_) => BoundTag::Document,
        BoundValue::Binary { .. } => BoundTag::Binary,
        BoundValue::ObjectId(_) => BoundTag::ObjectId,
        BoundValue::Bool(_) => BoundTag::Bool,
        BoundValue::DateTime(_) => BoundTag::DateTime,
        BoundValue::Timestamp { .. } => BoundTag::Timestamp,
        BoundValue::MaxKey => BoundTag::MaxKey,
    }
}
