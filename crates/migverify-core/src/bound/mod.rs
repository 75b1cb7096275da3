mod compare;
mod exact;
mod format;
mod rank;
mod tag;
mod wire;


use crate::error::BoundValueError;
use bson::{Bson, Document, oid::ObjectId};
use std::cmp::Ordering;

// re-exports
pub use compare::canonical_cmp;
pub use format::{MAX_KEY_TOKEN, MIN_KEY_TOKEN, NO_BOUND_TOKEN, format_bound, format_optional_bound};
pub use tag::BoundTag;

///
/// Number
///
/// Numeric ordering-key value. Widths compare numerically against each other,
/// decimal128 included.
///

#[derive(Clone, Copy, Debug)]
pub enum Number {
    Int32(i32),
    Int64(i64),
    Double(f64),
    /// IEEE 754-2008 decimal128 in BSON (little-endian) byte order.
    Decimal128([u8; 16]),
}

impl Number {
    /// Integer value when the number is stored as an integer.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn integral(self) -> Option<i64> {
        match self {
            Self::Int32(v) => Some(v as i64),
            Self::Int64(v) => Some(v),
            Self::Double(_) | Self::Decimal128(_) => None,
        }
    }

    pub(crate) fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int32(v) => Some(Self::Int32(*v)),
            Bson::Int64(v) => Some(Self::Int64(*v)),
            Bson::Double(v) => Some(Self::Double(*v)),
            Bson::Decimal128(v) => Some(Self::Decimal128(v.bytes())),
            _ => None,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        compare::cmp_numbers(*self, *other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        compare::cmp_numbers(*self, *other)
    }
}

///
/// EncodedDocument
///
/// Embedded-document bound held as its encoded BSON bytes.
///
/// The bytes are opaque to query construction: they are only ever embedded
/// as a literal and compared structurally, never read back as operators.
/// Construction guarantees the bytes decode.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncodedDocument(Vec<u8>);

impl EncodedDocument {
    /// Encode a document into a bound payload.
    pub fn from_document(document: &Document) -> Result<Self, BoundValueError> {
        let bytes =
            bson::to_vec(document).map_err(|source| BoundValueError::EncodeDocument { source })?;

        Ok(Self(bytes))
    }

    /// Adopt already-encoded bytes after checking they decode.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, BoundValueError> {
        Document::from_reader(bytes.as_slice())
            .map_err(|source| BoundValueError::MalformedDocument { source })?;

        Ok(Self(bytes))
    }

    pub fn decode(&self) -> Result<Document, bson::de::Error> {
        Document::from_reader(self.0.as_slice())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

///
/// BoundValue
///
/// Ordering-key value usable as a partition bound.
///
/// MinKey  → absolute minimum; no lower limit.
/// MaxKey  → absolute maximum; no upper limit.
///
/// Equality and ordering are the canonical cross-kind order (see
/// `canonical_cmp`), so `Int32(5) == Double(5.0)`.
///

#[derive(Clone, Debug)]
pub enum BoundValue {
    MinKey,
    Null,
    Number(Number),
    Text(String),
    Document(EncodedDocument),
    Binary { subtype: u8, bytes: Vec<u8> },
    ObjectId([u8; 12]),
    Bool(bool),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Timestamp { time: u32, increment: u32 },
    MaxKey,
}

impl BoundValue {
    ///
    /// CONSTRUCTION
    ///

    /// Build a document bound from a `bson::Document`.
    pub fn document(document: &Document) -> Result<Self, BoundValueError> {
        Ok(Self::Document(EncodedDocument::from_document(document)?))
    }

    #[must_use]
    pub fn binary(subtype: u8, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Binary {
            subtype,
            bytes: bytes.into(),
        }
    }

    ///
    /// TYPES
    ///

    /// Returns true for the MinKey/MaxKey sentinels.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::MinKey | Self::MaxKey)
    }

    #[must_use]
    pub const fn tag(&self) -> BoundTag {
        tag::canonical_tag(self)
    }

    /// Stable canonical rank used by all cross-variant ordering surfaces.
    #[must_use]
    pub const fn canonical_rank(&self) -> u8 {
        rank::canonical_rank(self)
    }

    /// Convert into the BSON value embedded in commands and persisted documents.
    #[must_use]
    pub fn to_bson(&self) -> Bson {
        Bson::from(self.clone())
    }
}

impl PartialEq for BoundValue {
    fn eq(&self, other: &Self) -> bool {
        canonical_cmp(self, other) == Ordering::Equal
    }
}

impl Eq for BoundValue {}

impl PartialOrd for BoundValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoundValue {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(self, other)
    }
}

impl From<Number> for BoundValue {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for BoundValue {
    fn from(value: i32) -> Self {
        Self::Number(Number::Int32(value))
    }
}

impl From<i64> for BoundValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::Int64(value))
    }
}

impl From<f64> for BoundValue {
    fn from(value: f64) -> Self {
        Self::Number(Number::Double(value))
    }
}

impl From<bson::Decimal128> for BoundValue {
    fn from(value: bson::Decimal128) -> Self {
        Self::Number(Number::Decimal128(value.bytes()))
    }
}

impl From<&str> for BoundValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for BoundValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for BoundValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<ObjectId> for BoundValue {
    fn from(value: ObjectId) -> Self {
        Self::ObjectId(value.bytes())
    }
}

impl From<bson::DateTime> for BoundValue {
    fn from(value: bson::DateTime) -> Self {
        Self::DateTime(value.timestamp_millis())
    }
}

impl From<bson::Timestamp> for BoundValue {
    fn from(value: bson::Timestamp) -> Self {
        Self::Timestamp {
            time: value.time,
            increment: value.increment,
        }
    }
}

impl From<bson::Binary> for BoundValue {
    fn from(value: bson::Binary) -> Self {
        Self::Binary {
            subtype: u8::from(value.subtype),
            bytes: value.bytes,
        }
    }
}
