use bson::spec::ElementType;
use std::fmt;
use thiserror::Error as ThisError;

///
/// ErrorClass
/// Error taxonomy shared by every failure this crate reports.
/// Callers use it to decide between skipping, retrying, or aborting.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Corruption,
    Unsupported,
    InvariantViolation,
}

impl ErrorClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Corruption => "corruption",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// BoundValueError
///
/// Failures converting a BSON value into an ordering-key bound.
///

#[derive(Debug, ThisError)]
pub enum BoundValueError {
    /// The BSON kind can never be an ordering key.
    #[error("unsupported ordering key kind: {kind:?}")]
    UnsupportedKind { kind: ElementType },

    /// An embedded document bound could not be encoded (for example, a key with a NUL byte).
    #[error("embedded document bound could not be encoded: {source}")]
    EncodeDocument { source: bson::ser::Error },

    /// Encoded bytes handed in as a document bound do not decode.
    #[error("embedded document bound is malformed: {source}")]
    MalformedDocument { source: bson::de::Error },
}

impl BoundValueError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedKind { .. } => ErrorClass::Unsupported,
            Self::EncodeDocument { .. } => ErrorClass::InvariantViolation,
            Self::MalformedDocument { .. } => ErrorClass::Corruption,
        }
    }
}

///
/// ResumeBoundError
///
/// Failures extracting a resume bound from the last document a cursor returned.
///

#[derive(Debug, ThisError)]
pub enum ResumeBoundError {
    /// Raw bytes are not a well-formed document, or its ordering key is malformed.
    #[error("error decoding raw document: {source}")]
    Decode { source: bson::raw::Error },

    /// Document decoded but carries no ordering-key element.
    #[error("could not find an '{field}' element in the raw document")]
    MissingOrderingKey { field: &'static str },

    /// Ordering-key element is of a kind that cannot bound a partition.
    #[error("ordering key in raw document cannot be used as a bound: {source}")]
    UnsupportedOrderingKey {
        #[from]
        source: BoundValueError,
    },
}

impl ResumeBoundError {
    pub(crate) const fn decode(source: bson::raw::Error) -> Self {
        Self::Decode { source }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Decode { .. } => ErrorClass::Corruption,
            Self::MissingOrderingKey { .. } => ErrorClass::InvariantViolation,
            Self::UnsupportedOrderingKey { source } => source.class(),
        }
    }
}

///
/// PartitionError
///
/// Structural invariant violations on a partition descriptor.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PartitionError {
    #[error("partition has no lower bound")]
    MissingLowerBound,

    #[error("partition lower bound {lower} ({lower_kind}) orders after upper bound {upper} ({upper_kind})")]
    InvertedBounds {
        lower: String,
        lower_kind: &'static str,
        upper: String,
        upper_kind: &'static str,
    },

    #[error("capped partition must span {{\"$minKey\":1}} to {{\"$maxKey\":1}}, found {lower} to {upper}")]
    CappedBoundsNotSentinel { lower: String, upper: String },
}

impl PartitionError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::InvariantViolation
    }
}
