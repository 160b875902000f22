//! Fixed-size chained hash table backend.
//!
//! The bucket index comes from the numeric prefix of the key:
//! `numeric_key(key) mod table_size`. Every bucket is the owning head of a
//! singly linked chain; an empty bucket is simply `None`. New entries go to
//! the tail of their chain, so a bucket enumerates in arrival order.

use std::fmt;

use log::{debug, trace};

use crate::error::StoreError;
use crate::{Record, RecordStore};

/// Table size used by [`ChainedHashStore::new`].
pub const DEFAULT_TABLE_SIZE: u32 = 179;

/// Numeric key assumed for keys without a leading run of digits. All such
/// keys share a bucket.
pub const FALLBACK_NUMERIC_KEY: i64 = 0;

/// Parse the leading base-10 integer of `key`.
///
/// Leading ASCII whitespace (space, tab, newline, vertical tab, form feed,
/// carriage return) and one optional sign are accepted, then the longest run
/// of ASCII digits. Other whitespace, such as a no-break space, ends the parse. Trailing characters are ignored. Keys with no digits
/// yield [`FALLBACK_NUMERIC_KEY`]; values out of `i64` range saturate.
pub fn numeric_key(key: &str) -> i64 {
    let s = key.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut any_digit = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        any_digit = true;
        let d = i64::from(b - b'0');
        value = match value
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(d) } else { v.checked_add(d) })
        {
            Some(v) => v,
            None if negative => return i64::MIN,
            None => return i64::MAX,
        };
    }

    if any_digit {
        value
    } else {
        FALLBACK_NUMERIC_KEY
    }
}

/// Bucket for `key` in a table of `table_size` buckets.
///
/// The numeric key is narrowed to 32 bits and reinterpreted as unsigned
/// before the modulo, so negative keys wrap rather than index negatively.
pub fn bucket_index(key: &str, table_size: u32) -> u32 {
    debug_assert!(table_size > 0);
    (numeric_key(key) as i32 as u32) % table_size
}

type Link = Option<Box<ChainEntry>>;

struct ChainEntry {
    record: Record,
    /// Bucket this entry hashed to.
    bucket: u32,
    next: Link,
}

/// Occupancy figures for a [`ChainedHashStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketStats {
    pub table_size: u32,
    /// Buckets holding at least one entry.
    pub occupied: usize,
    /// Entries in the fullest bucket.
    pub longest_chain: usize,
    pub records: usize,
}

/// A record store backed by a fixed number of chained buckets.
pub struct ChainedHashStore {
    buckets: Vec<Link>,
    table_size: u32,
    count: usize,
}

impl ChainedHashStore {
    /// Create a table with [`DEFAULT_TABLE_SIZE`] buckets.
    pub fn new() -> Self {
        Self::allocate(DEFAULT_TABLE_SIZE)
    }

    /// Create a table with `table_size` buckets. The size is fixed for the
    /// lifetime of the store.
    pub fn with_table_size(table_size: u32) -> Result<Self, StoreError> {
        if table_size == 0 {
            return Err(StoreError::InvalidTableSize(table_size));
        }
        Ok(Self::allocate(table_size))
    }

    fn allocate(table_size: u32) -> Self {
        let mut buckets = Vec::with_capacity(table_size as usize);
        buckets.resize_with(table_size as usize, || None);
        Self {
            buckets,
            table_size,
            count: 0,
        }
    }

    pub fn table_size(&self) -> u32 {
        self.table_size
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append `record` to the tail of its bucket's chain.
    pub fn insert(&mut self, record: Record) {
        let bucket = bucket_index(&record.key, self.table_size);
        trace!("hash insert key={} bucket={bucket}", record.key);

        let mut slot = &mut self.buckets[bucket as usize];
        while let Some(entry) = slot {
            slot = &mut entry.next;
        }
        *slot = Some(Box::new(ChainEntry {
            record,
            bucket,
            next: None,
        }));
        self.count += 1;
    }

    /// First record in the key's bucket whose key matches exactly.
    pub fn search(&self, key: &str) -> Option<&Record> {
        let bucket = bucket_index(key, self.table_size);
        let mut current = self.buckets[bucket as usize].as_deref();
        while let Some(entry) = current {
            if entry.record.key == key {
                return Some(&entry.record);
            }
            current = entry.next.as_deref();
        }
        None
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.search(key).is_some()
    }

    /// Unlink the first entry keyed `key` from its chain.
    ///
    /// Removing a bucket's head promotes the next entry to head, or empties
    /// the bucket when there is none; removing further down splices the
    /// predecessor onto the successor. Returns `false` when the key is absent.
    pub fn remove(&mut self, key: &str) -> bool {
        let bucket = bucket_index(key, self.table_size);

        let mut slot = &mut self.buckets[bucket as usize];
        while slot.as_ref().is_some_and(|entry| entry.record.key != key) {
            if let Some(entry) = slot {
                slot = &mut entry.next;
            }
        }

        let Some(mut entry) = slot.take() else {
            trace!("hash remove key={key} bucket={bucket}: not found");
            return false;
        };
        debug_assert_eq!(entry.bucket, bucket, "entry reachable from the wrong bucket");
        *slot = entry.next.take();
        self.count -= 1;
        trace!("hash remove key={key} bucket={bucket}: removed");
        true
    }

    /// Iterate over `(bucket, record)` pairs: buckets ascending, each chain in
    /// arrival order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: self.buckets.iter(),
            current: None,
        }
    }

    /// Records held by one bucket, head first.
    pub fn bucket(&self, index: u32) -> Vec<&Record> {
        let mut out = Vec::new();
        let mut current = self
            .buckets
            .get(index as usize)
            .and_then(|head| head.as_deref());
        while let Some(entry) = current {
            out.push(&entry.record);
            current = entry.next.as_deref();
        }
        out
    }

    pub fn stats(&self) -> BucketStats {
        let mut stats = BucketStats {
            table_size: self.table_size,
            records: self.count,
            ..BucketStats::default()
        };
        for head in &self.buckets {
            let mut len = 0;
            let mut current = head.as_deref();
            while let Some(entry) = current {
                len += 1;
                current = entry.next.as_deref();
            }
            if len > 0 {
                stats.occupied += 1;
            }
            stats.longest_chain = stats.longest_chain.max(len);
        }
        debug!("hash bucket stats: {stats:?}");
        stats
    }

    /// Free every chain entry. The bucket array itself is kept, reset to
    /// empty, so the store can be reused.
    pub fn clear(&mut self) {
        let freed = free_chains(&mut self.buckets);
        debug_assert_eq!(freed, self.count, "freed entry count must match len");
        debug!("hash teardown freed {freed} entries across {} buckets", self.table_size);
        self.count = 0;
    }
}

/// Unlink chains one entry at a time so long chains never drop recursively.
fn free_chains(buckets: &mut [Link]) -> usize {
    let mut freed = 0;
    for head in buckets.iter_mut() {
        let mut current = head.take();
        while let Some(mut entry) = current {
            current = entry.next.take();
            freed += 1;
        }
    }
    freed
}

#[cfg(test)]
impl ChainedHashStore {
    /// Panics unless every entry sits in the bucket its key hashes to and
    /// `len` is accurate.
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.buckets.len(), self.table_size as usize);
        let mut entries = 0;
        for (index, head) in self.buckets.iter().enumerate() {
            let mut current = head.as_deref();
            while let Some(entry) = current {
                entries += 1;
                assert_eq!(entry.bucket as usize, index, "entry stored under the wrong bucket");
                assert_eq!(entry.bucket, bucket_index(&entry.record.key, self.table_size));
                current = entry.next.as_deref();
            }
        }
        assert_eq!(entries, self.count, "reachable entry count must match len");
    }
}

impl Default for ChainedHashStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ChainedHashStore {
    fn drop(&mut self) {
        free_chains(&mut self.buckets);
    }
}

impl fmt::Debug for ChainedHashStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Extend<Record> for ChainedHashStore {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl RecordStore for ChainedHashStore {
    fn insert(&mut self, record: Record) {
        ChainedHashStore::insert(self, record)
    }

    fn search(&self, key: &str) -> Option<&Record> {
        ChainedHashStore::search(self, key)
    }

    fn remove(&mut self, key: &str) -> bool {
        ChainedHashStore::remove(self, key)
    }

    fn for_each(&self, visitor: &mut dyn FnMut(&Record)) {
        for (_, record) in self.iter() {
            visitor(record);
        }
    }

    fn len(&self) -> usize {
        self.count
    }

    fn clear(&mut self) {
        ChainedHashStore::clear(self)
    }

    fn backend_name(&self) -> &'static str {
        "chained hash table"
    }
}

/// Iterator returned by [`ChainedHashStore::iter`].
pub struct Iter<'a> {
    buckets: std::slice::Iter<'a, Link>,
    current: Option<&'a ChainEntry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (u32, &'a Record);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current {
                self.current = entry.next.as_deref();
                return Some((entry.bucket, &entry.record));
            }
            self.current = self.buckets.next()?.as_deref();
        }
    }
}
