//! Partition descriptors: one bounded, resumable `_id` range of a source
//! collection, and the read command that streams it.
//!
//! A partition is a plain value. Checkpointing progress produces a new
//! partition (see `with_lower_bound`); nothing here mutates shared state.

mod command;
mod filter;
mod resume;

#[cfg(test)]
mod tests;

use crate::{
    bound::{BoundValue, canonical_cmp, format_bound, format_optional_bound},
    error::PartitionError,
};
use bson::Uuid;
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};
use std::{cmp::Ordering, fmt};

// re-exports
pub use command::{FindCommand, FindOptions, READ_CONCERN_MAJORITY, ReadConcern, ReadShape};
pub use filter::RangeFilter;

///
/// Namespace
///
/// Database and collection name of the namespace being copied.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[display("{db}.{coll}")]
pub struct Namespace {
    pub db: String,
    pub coll: String,
}

impl Namespace {
    pub fn new(db: impl Into<String>, coll: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            coll: coll.into(),
        }
    }
}

///
/// PartitionKey
///
/// Identity of a persisted partition document (its `_id`).
///
/// `lower` is absent only while a planner is still assembling the
/// partition; a stored `null` bound is a real `Null` value, not absence.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PartitionKey {
    #[serde(rename = "srcUUID")]
    pub source_uuid: Uuid,

    #[serde(rename = "id")]
    pub run_id: String,

    #[serde(
        rename = "lowerBound",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present_bound"
    )]
    pub lower: Option<BoundValue>,
}

impl PartitionKey {
    pub fn new(source_uuid: Uuid, run_id: impl Into<String>, lower: Option<BoundValue>) -> Self {
        Self {
            source_uuid,
            run_id: run_id.into(),
            lower,
        }
    }
}

// A present field always carries a bound, including an explicit BSON null.
fn deserialize_present_bound<'de, D>(deserializer: D) -> Result<Option<BoundValue>, D::Error>
where
    D: Deserializer<'de>,
{
    BoundValue::deserialize(deserializer).map(Some)
}

///
/// Partition
///
/// A range of documents in a namespace, bounded by the `_id` field on both
/// ends (inclusive).
///
/// Capped partitions span MinKey..MaxKey and are read in natural order; their
/// bounds are never used for filtering.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Partition {
    #[serde(rename = "_id")]
    pub key: PartitionKey,

    pub namespace: Namespace,

    #[serde(rename = "upperBound")]
    pub upper: BoundValue,

    #[serde(rename = "isCapped")]
    pub is_capped: bool,
}

impl Partition {
    /// Build a partition over `lower..=upper` of an ordinary collection.
    pub fn new(
        namespace: Namespace,
        source_uuid: Uuid,
        run_id: impl Into<String>,
        lower: BoundValue,
        upper: BoundValue,
    ) -> Self {
        Self {
            key: PartitionKey::new(source_uuid, run_id, Some(lower)),
            namespace,
            upper,
            is_capped: false,
        }
    }

    /// Build the single partition covering a capped collection.
    pub fn capped(namespace: Namespace, source_uuid: Uuid, run_id: impl Into<String>) -> Self {
        Self {
            key: PartitionKey::new(source_uuid, run_id, Some(BoundValue::MinKey)),
            namespace,
            upper: BoundValue::MaxKey,
            is_capped: true,
        }
    }

    #[must_use]
    pub const fn lower(&self) -> Option<&BoundValue> {
        self.key.lower.as_ref()
    }

    #[must_use]
    pub const fn upper(&self) -> &BoundValue {
        &self.upper
    }

    /// Copy of this partition resuming from `lower`.
    ///
    /// Only the lower component of the key changes, which changes the
    /// persisted `_id`: stores must replace the old document rather than
    /// update it in place.
    #[must_use]
    pub fn with_lower_bound(&self, lower: BoundValue) -> Self {
        let mut next = self.clone();
        next.key.lower = Some(lower);
        next
    }

    /// Check the structural invariants a planner is expected to uphold.
    pub fn validate(&self) -> Result<(), PartitionError> {
        let lower = self.lower().ok_or(PartitionError::MissingLowerBound)?;

        if self.is_capped {
            if !matches!(lower, BoundValue::MinKey) || !matches!(self.upper, BoundValue::MaxKey) {
                return Err(PartitionError::CappedBoundsNotSentinel {
                    lower: format_bound(lower),
                    upper: format_bound(&self.upper),
                });
            }

            return Ok(());
        }

        if canonical_cmp(lower, &self.upper) == Ordering::Greater {
            return Err(PartitionError::InvertedBounds {
                lower: format_bound(lower),
                lower_kind: lower.tag().label(),
                upper: format_bound(&self.upper),
                upper_kind: self.upper.tag().label(),
            });
        }

        Ok(())
    }

    /// String rendering of the lower bound.
    #[must_use]
    pub fn lower_bound_string(&self) -> String {
        format_optional_bound(self.lower())
    }

    /// String rendering of the upper bound.
    #[must_use]
    pub fn upper_bound_string(&self) -> String {
        format_bound(&self.upper)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{db: {}, coll: {}, collUUID: {}, runID: {}, lower: {}, upper: {}}}",
            self.namespace.db,
            self.namespace.coll,
            self.key.source_uuid,
            self.key.run_id,
            self.lower_bound_string(),
            self.upper_bound_string(),
        )
    }
}
