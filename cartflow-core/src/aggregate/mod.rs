//! Grouping/reduction engine shared by the pipeline stages.
//!
//! [`aggregate`] partitions a record batch by a tuple of named fields,
//! reduces a metric field per group, and ranks the result:
//!
//! - without `rank_within`: one global descending sort, optionally truncated
//!   to the top N groups;
//! - with `rank_within`: groups are further partitioned by one of the
//!   group-by fields and the top N are kept per partition.
//!
//! Ordering is fully deterministic: equal metric values keep the order in
//! which their group key was first encountered in the input, and partitions
//! are emitted in first-encounter order of the partition value.

use ahash::AHashMap;

use crate::types::{Tabular, Value};

mod engine;
mod spec;

pub use engine::*;
pub use spec::*;

#[cfg(test)]
#[path = "tests/aggregate_tests.rs"]
mod tests;
