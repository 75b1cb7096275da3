use crate::{
    bound::{BoundValue, EncodedDocument, Number},
    error::BoundValueError,
};
use bson::{Binary, Bson, Document, oid::ObjectId, spec::BinarySubtype};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

impl From<BoundValue> for Bson {
    fn from(value: BoundValue) -> Self {
        match value {
            BoundValue::MinKey => Self::MinKey,
            BoundValue::Null => Self::Null,
            BoundValue::Number(Number::Int32(v)) => Self::Int32(v),
            BoundValue::Number(Number::Int64(v)) => Self::Int64(v),
            BoundValue::Number(Number::Double(v)) => Self::Double(v),
            BoundValue::Number(Number::Decimal128(v)) => {
                Self::Decimal128(bson::Decimal128::from_bytes(v))
            }
            BoundValue::Text(v) => Self::String(v),
            // bytes were validated when the bound was built
            BoundValue::Document(v) => Self::Document(v.decode().unwrap_or_default()),
            BoundValue::Binary { subtype, bytes } => Self::Binary(Binary {
                subtype: BinarySubtype::from(subtype),
                bytes,
            }),
            BoundValue::ObjectId(v) => Self::ObjectId(ObjectId::from_bytes(v)),
            BoundValue::Bool(v) => Self::Boolean(v),
            BoundValue::DateTime(v) => Self::DateTime(bson::DateTime::from_millis(v)),
            BoundValue::Timestamp { time, increment } => {
                Self::Timestamp(bson::Timestamp { time, increment })
            }
            BoundValue::MaxKey => Self::MaxKey,
        }
    }
}

impl TryFrom<Bson> for BoundValue {
    type Error = BoundValueError;

    fn try_from(value: Bson) -> Result<Self, Self::Error> {
        match value {
            Bson::MinKey => Ok(Self::MinKey),
            Bson::Null => Ok(Self::Null),
            Bson::Int32(v) => Ok(Self::from(v)),
            Bson::Int64(v) => Ok(Self::from(v)),
            Bson::Double(v) => Ok(Self::from(v)),
            Bson::Decimal128(v) => Ok(Self::from(v)),
            Bson::String(v) => Ok(Self::Text(v)),
            Bson::Document(v) => Self::try_from(v),
            Bson::Binary(v) => Ok(Self::from(v)),
            Bson::ObjectId(v) => Ok(Self::from(v)),
            Bson::Boolean(v) => Ok(Self::Bool(v)),
            Bson::DateTime(v) => Ok(Self::from(v)),
            Bson::Timestamp(v) => Ok(Self::from(v)),
            Bson::MaxKey => Ok(Self::MaxKey),
            other => Err(BoundValueError::UnsupportedKind {
                kind: other.element_type(),
            }),
        }
    }
}

impl TryFrom<Document> for BoundValue {
    type Error = BoundValueError;

    fn try_from(value: Document) -> Result<Self, Self::Error> {
        Ok(Self::Document(EncodedDocument::from_document(&value)?))
    }
}

// Bounds persist as native BSON values so stored partitions stay readable by
// other tooling that inspects the metadata collection.
impl Serialize for BoundValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_bson().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BoundValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Bson::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}
