//! Core partition model for migverify: ordering-key bounds, partition
//! descriptors, and the read commands that stream one partition's range.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod bound;
pub mod error;
pub mod partition;

///
/// CONSTANTS
///

/// Field used to split collections into partitions and to order streamed reads.
pub const ORDERING_KEY: &str = "_id";

/// Sort key selecting physical insertion order.
pub const NATURAL_ORDER_KEY: &str = "$natural";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// Errors and wire helpers are reached through their modules.
///

pub mod prelude {
    pub use crate::{
        bound::{BoundValue, Number},
        partition::{FindCommand, FindOptions, Namespace, Partition, PartitionKey, RangeFilter},
    };
}
