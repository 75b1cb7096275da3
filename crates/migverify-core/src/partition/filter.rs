use crate::{
    ORDERING_KEY,
    bound::{BoundValue, canonical_cmp},
    partition::Partition,
};
use bson::{Document, doc};
use std::cmp::Ordering;

///
/// RangeFilter
///
/// Inclusive `_id` range of a partition: `lower <= _id <= upper`.
///
/// Rendered as two `$expr` comparisons rather than `$gte`/`$lte` query
/// operators: aggregation comparisons order values across kinds, while query
/// operators only match values of the bound's own kind (type bracketing).
/// Each bound is wrapped in `$literal` so a document-shaped `_id` with
/// operator-like keys is never evaluated as an expression.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeFilter {
    lower: BoundValue,
    upper: BoundValue,
}

impl RangeFilter {
    #[must_use]
    pub const fn new(lower: BoundValue, upper: BoundValue) -> Self {
        Self { lower, upper }
    }

    /// Filter for a partition. An unassigned lower bound admits everything up
    /// to the upper bound.
    #[must_use]
    pub fn for_partition(partition: &Partition) -> Self {
        Self::new(
            partition.lower().cloned().unwrap_or(BoundValue::MinKey),
            partition.upper().clone(),
        )
    }

    #[must_use]
    pub const fn lower(&self) -> &BoundValue {
        &self.lower
    }

    #[must_use]
    pub const fn upper(&self) -> &BoundValue {
        &self.upper
    }

    /// In-process evaluation of the rendered filter against one `_id` value.
    #[must_use]
    pub fn matches(&self, id: &BoundValue) -> bool {
        canonical_cmp(id, &self.lower) != Ordering::Less
            && canonical_cmp(id, &self.upper) != Ordering::Greater
    }

    /// Render the filter document sent to the server.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let field = format!("${ORDERING_KEY}");
        let lower = self.lower.to_bson();
        let upper = self.upper.to_bson();

        doc! {
            "$and": [
                { "$expr": { "$gte": [ field.clone(), { "$literal": lower } ] } },
                { "$expr": { "$lte": [ field, { "$literal": upper } ] } }
            ]
        }
    }
}

impl From<&RangeFilter> for Document {
    fn from(filter: &RangeFilter) -> Self {
        filter.to_document()
    }
}

impl Partition {
    /// Range filter covering this partition.
    #[must_use]
    pub fn filter(&self) -> RangeFilter {
        RangeFilter::for_partition(self)
    }
}
