use crate::{
    NATURAL_ORDER_KEY, ORDERING_KEY,
    partition::{Partition, RangeFilter},
};
use bson::{Document, Timestamp, Uuid, doc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Read concern level used for every partition read.
pub const READ_CONCERN_MAJORITY: &str = "majority";

///
/// FindOptions
///
/// Caller-supplied knobs for partition reads. `batch_size` exists for
/// deterministic pagination in tests and diagnostics; production reads
/// leave it unset and take the executor's default.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindOptions {
    pub batch_size: Option<u32>,
}

impl FindOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self { batch_size: None }
    }

    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

///
/// ReadConcern
///
/// Majority read concern pinned after a cluster time. Reads see every write
/// committed before the point the change stream starts from, so copied
/// documents and applied change events neither overlap nor leave a gap.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadConcern {
    pub after_cluster_time: Timestamp,
}

impl ReadConcern {
    #[must_use]
    pub const fn majority_after(after_cluster_time: Timestamp) -> Self {
        Self { after_cluster_time }
    }

    #[must_use]
    pub fn to_document(&self) -> Document {
        doc! {
            "level": READ_CONCERN_MAJORITY,
            "afterClusterTime": self.after_cluster_time,
        }
    }
}

///
/// ReadShape
///
/// How a partition read walks the collection.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadShape {
    /// Capped collections: natural (insertion) order, no filter, no hint.
    Natural,

    /// Ordinary collections: `_id` range filter walked through the `_id` index.
    Ranged(RangeFilter),
}

///
/// FindCommand
///
/// The `find` command streaming exactly one partition.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FindCommand {
    pub collection: String,

    /// Pins the read to the collection planned against; a collection dropped
    /// and recreated under the same name fails the command instead.
    pub collection_uuid: Uuid,

    pub read_concern: ReadConcern,

    /// Partition cursors may idle between batches while workers are busy.
    pub no_cursor_timeout: bool,

    pub batch_size: Option<u32>,
    pub shape: ReadShape,
}

impl FindCommand {
    /// Build the read command for `partition`.
    ///
    /// Capped partitions ignore their bounds and read in natural order. All
    /// other partitions read their inclusive `_id` range through the `_id`
    /// index.
    #[must_use]
    pub fn for_partition(
        partition: &Partition,
        after_cluster_time: Timestamp,
        options: FindOptions,
    ) -> Self {
        let shape = if partition.is_capped {
            ReadShape::Natural
        } else {
            ReadShape::Ranged(partition.filter())
        };

        debug!(
            %partition,
            natural_order = partition.is_capped,
            batch_size = ?options.batch_size,
            "built partition find command"
        );

        Self {
            collection: partition.namespace.coll.clone(),
            collection_uuid: partition.key.source_uuid,
            read_concern: ReadConcern::majority_after(after_cluster_time),
            no_cursor_timeout: true,
            batch_size: options.batch_size,
            shape,
        }
    }

    #[must_use]
    pub const fn is_natural_order(&self) -> bool {
        matches!(self.shape, ReadShape::Natural)
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&RangeFilter> {
        match &self.shape {
            ReadShape::Natural => None,
            ReadShape::Ranged(filter) => Some(filter),
        }
    }

    /// Render the command document.
    ///
    /// Field order: `find`, `collectionUUID`, `readConcern`, `noCursorTimeout`,
    /// optional `batchSize`, then `sort` (natural) or `filter` + `hint` (ranged).
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut command = doc! {
            "find": self.collection.as_str(),
            "collectionUUID": self.collection_uuid,
            "readConcern": self.read_concern.to_document(),
            "noCursorTimeout": self.no_cursor_timeout,
        };

        if let Some(batch_size) = self.batch_size {
            command.insert("batchSize", i64::from(batch_size));
        }

        match &self.shape {
            ReadShape::Natural => {
                command.insert("sort", ascending(NATURAL_ORDER_KEY));
            }
            ReadShape::Ranged(filter) => {
                command.insert("filter", filter.to_document());
                command.insert("hint", ascending(ORDERING_KEY));
            }
        }

        command
    }
}

// Single-key ascending spec, used for both sort and hint documents.
fn ascending(key: &str) -> Document {
    let mut spec = Document::new();
    spec.insert(key, 1);
    spec
}

impl From<FindCommand> for Document {
    fn from(command: FindCommand) -> Self {
        command.to_document()
    }
}

impl Partition {
    /// Read command for this partition; see `FindCommand::for_partition`.
    #[must_use]
    pub fn find_command(&self, after_cluster_time: Timestamp, options: FindOptions) -> FindCommand {
        FindCommand::for_partition(self, after_cluster_time, options)
    }
}
