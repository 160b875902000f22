//! Unbalanced binary search tree backend.
//!
//! Keys are compared lexicographically. A key strictly less than a node's key
//! goes left; anything else (including an equal key) goes right. No rotations
//! are performed, so sorted input degenerates into a list-shaped tree. Every
//! walk over the tree uses a cursor or an explicit stack rather than recursion,
//! which keeps such trees from exhausting the call stack.

use std::cmp::Ordering;
use std::fmt;

use log::{debug, trace};

use crate::{Record, RecordStore};

type Link = Option<Box<Node>>;

struct Node {
    record: Record,
    left: Link,
    right: Link,
}

impl Node {
    fn new(record: Record) -> Box<Self> {
        Box::new(Self {
            record,
            left: None,
            right: None,
        })
    }
}

/// Visiting order for [`OrderedTreeStore::traverse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Node, then left subtree, then right subtree.
    PreOrder,
    /// Left subtree, node, right subtree. Keys come out non-decreasing.
    #[default]
    InOrder,
    /// Left subtree, right subtree, node.
    PostOrder,
}

/// A record store backed by an unbalanced binary search tree.
pub struct OrderedTreeStore {
    root: Link,
    count: usize,
}

impl OrderedTreeStore {
    pub fn new() -> Self {
        Self {
            root: None,
            count: 0,
        }
    }

    /// Number of nodes, duplicates included.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Record held by the root node.
    pub fn root(&self) -> Option<&Record> {
        self.root.as_deref().map(|node| &node.record)
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    pub fn height(&self) -> usize {
        let mut stack: Vec<(&Node, usize)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 1));
        }

        let mut height = 0;
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            for child in [node.left.as_deref(), node.right.as_deref()]
                .into_iter()
                .flatten()
            {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    /// Insert a record.
    ///
    /// Duplicate keys are not rejected: an equal key is routed into the right
    /// subtree of the existing node, so both records stay reachable through
    /// traversal. [`search`](Self::search) and [`remove`](Self::remove) act on
    /// the first equal-keyed node met on the way down.
    pub fn insert(&mut self, record: Record) {
        trace!("tree insert key={}", record.key);

        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = if record.key < node.record.key {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *slot = Some(Node::new(record));
        self.count += 1;
    }

    pub fn search(&self, key: &str) -> Option<&Record> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.record.key.as_str()) {
                Ordering::Equal => return Some(&node.record),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.search(key).is_some()
    }

    /// Remove the first node whose key equals `key`.
    ///
    /// Returns `false` and leaves the tree untouched when the key is absent.
    pub fn remove(&mut self, key: &str) -> bool {
        let slot = find_slot(&mut self.root, key);
        let Some(mut node) = slot.take() else {
            trace!("tree remove key={key}: not found");
            return false;
        };

        *slot = match (node.left.take(), node.right.take()) {
            (None, right) => right,
            (left, None) => left,
            (Some(left), Some(right)) => {
                // Two children: pull the in-order successor out of the right
                // subtree and move its payload into this node.
                node.left = Some(left);
                node.right = Some(right);
                if let Some(successor) = take_min(&mut node.right) {
                    node.record = successor.record;
                }
                Some(node)
            }
        };

        self.count -= 1;
        trace!("tree remove key={key}: removed");
        true
    }

    /// Visit every record once in the given order.
    pub fn traverse(&self, order: TraversalOrder, mut visitor: impl FnMut(&Record)) {
        match order {
            TraversalOrder::InOrder => self.iter().for_each(visitor),
            TraversalOrder::PreOrder => {
                let mut stack: Vec<&Node> = self.root.as_deref().into_iter().collect();
                while let Some(node) = stack.pop() {
                    visitor(&node.record);
                    stack.extend(node.right.as_deref());
                    stack.extend(node.left.as_deref());
                }
            }
            TraversalOrder::PostOrder => {
                // The flag marks nodes whose children have already been pushed.
                let mut stack: Vec<(&Node, bool)> = Vec::new();
                if let Some(root) = self.root.as_deref() {
                    stack.push((root, false));
                }
                while let Some((node, expanded)) = stack.pop() {
                    if expanded {
                        visitor(&node.record);
                        continue;
                    }
                    stack.push((node, true));
                    if let Some(right) = node.right.as_deref() {
                        stack.push((right, false));
                    }
                    if let Some(left) = node.left.as_deref() {
                        stack.push((left, false));
                    }
                }
            }
        }
    }

    /// In-order iterator over the records.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    /// Free every node, children before parents.
    pub fn clear(&mut self) {
        let freed = free_subtree(self.root.take());
        debug_assert_eq!(freed, self.count, "freed node count must match len");
        debug!("tree teardown freed {freed} nodes");
        self.count = 0;
    }
}

/// Returns the slot holding the first node keyed `key`, or the empty slot
/// where the search ran out.
fn find_slot<'a>(mut slot: &'a mut Link, key: &str) -> &'a mut Link {
    while slot.as_ref().is_some_and(|node| node.record.key != key) {
        if let Some(node) = slot {
            slot = if key < node.record.key.as_str() {
                &mut node.left
            } else {
                &mut node.right
            };
        }
    }
    slot
}

/// Detach the leftmost node of the subtree in `slot`, splicing its right
/// child into its place.
fn take_min(mut slot: &mut Link) -> Link {
    while slot.as_ref().is_some_and(|node| node.left.is_some()) {
        if let Some(node) = slot {
            slot = &mut node.left;
        }
    }
    let mut min = slot.take()?;
    debug_assert!(min.left.is_none());
    *slot = min.right.take();
    Some(min)
}

/// Post-order teardown with an explicit stack. A node is dropped only after
/// both of its children have been detached and dropped.
fn free_subtree(root: Link) -> usize {
    let mut stack: Vec<Box<Node>> = Vec::new();
    stack.extend(root);

    let mut freed = 0;
    while let Some(mut node) = stack.pop() {
        if let Some(left) = node.left.take() {
            stack.push(node);
            stack.push(left);
        } else if let Some(right) = node.right.take() {
            stack.push(node);
            stack.push(right);
        } else {
            drop(node);
            freed += 1;
        }
    }
    freed
}

#[cfg(test)]
impl OrderedTreeStore {
    /// Panics unless every left subtree holds strictly smaller keys, every
    /// right subtree holds greater-or-equal keys, and `len` is accurate.
    pub(crate) fn assert_invariants(&self) {
        let mut stack: Vec<(&Node, Option<&str>, Option<&str>)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, None, None));
        }

        let mut nodes = 0;
        while let Some((node, low, high)) = stack.pop() {
            nodes += 1;
            let key = node.record.key.as_str();
            if let Some(low) = low {
                assert!(key >= low, "key {key:?} below right-subtree bound {low:?}");
            }
            if let Some(high) = high {
                assert!(key < high, "key {key:?} not below left-subtree bound {high:?}");
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, low, Some(key)));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, Some(key), high));
            }
        }
        assert_eq!(nodes, self.count, "reachable node count must match len");
    }
}

impl Default for OrderedTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OrderedTreeStore {
    fn drop(&mut self) {
        free_subtree(self.root.take());
    }
}

impl fmt::Debug for OrderedTreeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Extend<Record> for OrderedTreeStore {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<Record> for OrderedTreeStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl RecordStore for OrderedTreeStore {
    fn insert(&mut self, record: Record) {
        OrderedTreeStore::insert(self, record)
    }

    fn search(&self, key: &str) -> Option<&Record> {
        OrderedTreeStore::search(self, key)
    }

    fn remove(&mut self, key: &str) -> bool {
        OrderedTreeStore::remove(self, key)
    }

    fn for_each(&self, visitor: &mut dyn FnMut(&Record)) {
        self.traverse(TraversalOrder::InOrder, visitor)
    }

    fn len(&self) -> usize {
        self.count
    }

    fn clear(&mut self) {
        OrderedTreeStore::clear(self)
    }

    fn backend_name(&self) -> &'static str {
        "binary search tree"
    }
}

/// In-order iterator returned by [`OrderedTreeStore::iter`].
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn push_left_spine(&mut self, mut link: Option<&'a Node>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.record)
    }
}
