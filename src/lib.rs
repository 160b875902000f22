//! # bidstore
//!
//! An in-memory keyed record store with two interchangeable backends:
//!
//! - [`OrderedTreeStore`]: an unbalanced binary search tree. Enumerates in key
//!   order and supports pre-, in- and post-order traversal.
//! - [`ChainedHashStore`]: a fixed-size hash table with separate chaining.
//!   Buckets are picked from the numeric prefix of the key.
//!
//! Both implement [`RecordStore`], so callers can load, query and enumerate
//! records without knowing which backend they hold. [`SharedStore`] wraps
//! either one behind a single lock for use from several threads.
//!
//! ## Example
//!
//! ```rust
//! use bidstore::{ChainedHashStore, OrderedTreeStore, Record, RecordStore};
//!
//! let mut stores: Vec<Box<dyn RecordStore>> = vec![
//!     Box::new(OrderedTreeStore::new()),
//!     Box::new(ChainedHashStore::new()),
//! ];
//!
//! for store in &mut stores {
//!     store.insert(Record::new("98024", "Ice Cream Box", "General Fund", 12.5));
//!     assert_eq!(store.search("98024").map(|r| r.title.as_str()), Some("Ice Cream Box"));
//!     assert!(store.remove("98024"));
//!     assert!(store.is_empty());
//! }
//! ```

#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod loader;
pub mod logger;
pub mod record;
pub mod shared;
pub mod tree;
pub mod util;

pub use config::{Backend, StoreConfig};
pub use error::{LoadError, StoreError};
pub use hash::{BucketStats, ChainedHashStore, DEFAULT_TABLE_SIZE};
pub use loader::{CsvLayout, LoadSummary};
pub use record::Record;
pub use shared::SharedStore;
pub use tree::{OrderedTreeStore, TraversalOrder};

/// Operations every backend offers.
///
/// A missing key is never an error: `search` returns `None` and `remove`
/// returns `false`.
pub trait RecordStore {
    /// Store a copy of `record`.
    fn insert(&mut self, record: Record);

    fn search(&self, key: &str) -> Option<&Record>;

    /// Remove the record keyed `key`. Returns whether anything was removed.
    fn remove(&mut self, key: &str) -> bool;

    /// Call `visitor` once per record, in the backend's enumeration order.
    fn for_each(&self, visitor: &mut dyn FnMut(&Record));

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free every record. The store stays usable.
    fn clear(&mut self);

    /// Human readable name of the backend.
    fn backend_name(&self) -> &'static str;

    /// Records in enumeration order.
    fn records(&self) -> Vec<Record> {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(&mut |record: &Record| out.push(record.clone()));
        out
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn insert(&mut self, record: Record) {
        (**self).insert(record)
    }

    fn search(&self, key: &str) -> Option<&Record> {
        (**self).search(key)
    }

    fn remove(&mut self, key: &str) -> bool {
        (**self).remove(key)
    }

    fn for_each(&self, visitor: &mut dyn FnMut(&Record)) {
        (**self).for_each(visitor)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

#[cfg(test)]
mod proptests;
