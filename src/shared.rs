//! Thread-safe wrapper around a single store.
//!
//! The tree and chain links are spliced in place, so a reader walking them
//! while a writer relinks would see a broken structure. [`SharedStore`] puts
//! the whole store behind one lock: mutations hold the write guard for the
//! full operation, reads hold the read guard.

use log::trace;
use parking_lot::RwLock;

use crate::{Record, RecordStore};

/// A record store that can be shared between threads.
pub struct SharedStore<S> {
    inner: RwLock<S>,
}

impl<S: RecordStore> SharedStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: RwLock::new(store),
        }
    }

    pub fn insert(&self, record: Record) {
        self.inner.write().insert(record);
    }

    /// Returns a copy of the record, since no reference can outlive the lock.
    pub fn search(&self, key: &str) -> Option<Record> {
        self.inner.read().search(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().search(key).is_some()
    }

    pub fn remove(&self, key: &str) -> bool {
        self.inner.write().remove(key)
    }

    /// Visit every record under a single read guard.
    pub fn for_each(&self, mut visitor: impl FnMut(&Record)) {
        self.inner.read().for_each(&mut visitor);
    }

    /// Copy of every record, in enumeration order.
    pub fn snapshot(&self) -> Vec<Record> {
        self.inner.read().records()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        trace!("clearing shared {}", inner.backend_name());
        inner.clear();
    }

    /// Run `f` with exclusive access, for compound operations that must not
    /// interleave with other callers.
    pub fn with_exclusive<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        let mut guard = self.inner.write();
        f(&mut *guard)
    }

    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}

impl<S: RecordStore + Default> Default for SharedStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
