use crate::{ORDERING_KEY, bound::BoundValue, error::ResumeBoundError, partition::Partition};
use bson::{Bson, RawDocument};
use tracing::debug;

impl Partition {
    /// Lower bound to persist after a cursor over this partition returned
    /// `current` as its most recent document.
    ///
    /// Returns `None` when there is no progress to record: capped partitions
    /// resume by natural-order position (tracked by the streaming layer), and
    /// an empty `current` means nothing has been read yet.
    ///
    /// The returned value is the last-seen `_id` itself. Ranges are inclusive,
    /// so a read rebuilt from it returns that document again; consumers must
    /// tolerate reprocessing exactly one document per resume.
    pub fn lower_bound_from_current(
        &self,
        current: &[u8],
    ) -> Result<Option<BoundValue>, ResumeBoundError> {
        if self.is_capped || current.is_empty() {
            return Ok(None);
        }

        // Only the ordering key is decoded; the rest of the payload is opaque.
        let document = RawDocument::from_bytes(current).map_err(ResumeBoundError::decode)?;
        let id = document
            .get(ORDERING_KEY)
            .map_err(ResumeBoundError::decode)?
            .ok_or(ResumeBoundError::MissingOrderingKey {
                field: ORDERING_KEY,
            })?;
        let id = Bson::try_from(id).map_err(ResumeBoundError::decode)?;
        let bound = BoundValue::try_from(id)?;

        debug!(partition = %self, resume_from = %bound, "extracted partition resume bound");

        Ok(Some(bound))
    }

    /// Checkpointed copy of this partition after reading `current`, or `None`
    /// when there is nothing to record.
    pub fn checkpoint(&self, current: &[u8]) -> Result<Option<Self>, ResumeBoundError> {
        Ok(self
            .lower_bound_from_current(current)?
            .map(|lower| self.with_lower_bound(lower)))
    }
}
