//! Byte-addressed object store seam.
//!
//! Stages never talk to a concrete storage service; they go through
//! [`ObjectStore`], which models the minimal contract the pipeline needs:
//! whole-object `get`/`put` plus `list` for the local arrival watcher.
//! [`InMemoryStore`] backs tests and examples; [`FsStore`] maps buckets to
//! directories for local runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

mod fs;
mod memory;

pub use fs::*;
pub use memory::*;

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;

// ── Addressing ────────────────────────────────────────────────────────────────

/// Location of a single object: a bucket plus a key within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// The final path segment of the key (the object's file name).
    pub fn name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// A bucket plus key prefix identifying an area objects arrive in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub bucket: String,
    /// Key prefix without a trailing slash; empty means the whole bucket.
    pub prefix: String,
}

impl StoreLocation {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            bucket: bucket.into(),
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    /// The object ref for `name` within this location.
    pub fn resolve(&self, name: &str) -> ObjectRef {
        let key = if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        };
        ObjectRef::new(self.bucket.clone(), key)
    }

    /// Whether `object` lives under this location.
    pub fn contains(&self, object: &ObjectRef) -> bool {
        object.bucket == self.bucket
            && (self.prefix.is_empty()
                || object.key.starts_with(&format!("{}/", self.prefix)))
    }
}

impl std::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.bucket)
        } else {
            write!(f, "{}/{}", self.bucket, self.prefix)
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure talking to the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object {0} not found")]
    NotFound(ObjectRef),
    #[error("failed to read {location}")]
    Read {
        location: ObjectRef,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {location}")]
    Write {
        location: ObjectRef,
        #[source]
        source: io::Error,
    },
    #[error("failed to list {0}")]
    List(StoreLocation, #[source] io::Error),
    #[error("failed to prepare store directory {path}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store lock poisoned")]
    Poisoned,
}

// ── ObjectStore ───────────────────────────────────────────────────────────────

/// Whole-object storage interface consumed by the pipeline stages.
///
/// Implementations must be safe to share across stage invocations running
/// on different threads; each call is independent and atomic at the
/// whole-object level.
pub trait ObjectStore: Send + Sync {
    /// Fetch the object's bytes. [`StoreError::NotFound`] when absent.
    fn get(&self, location: &ObjectRef) -> Result<Vec<u8>, StoreError>;

    /// Write the object's bytes, replacing any previous version.
    fn put(&self, location: &ObjectRef, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// All objects under the location, in ascending key order.
    fn list(&self, location: &StoreLocation) -> Result<Vec<ObjectRef>, StoreError>;
}
