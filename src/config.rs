//! Store selection.

use crate::error::StoreError;
use crate::hash::{ChainedHashStore, DEFAULT_TABLE_SIZE};
use crate::tree::OrderedTreeStore;
use crate::RecordStore;

/// Which backend a [`StoreConfig`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Tree,
    Hash,
}

/// Configuration for building a record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: Backend,
    /// Bucket count for [`Backend::Hash`]; ignored by the tree.
    pub table_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            table_size: DEFAULT_TABLE_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn tree() -> Self {
        Self {
            backend: Backend::Tree,
            ..Self::default()
        }
    }

    pub fn hash(table_size: u32) -> Self {
        Self {
            backend: Backend::Hash,
            table_size,
        }
    }

    /// Build an empty store for this configuration.
    pub fn build(&self) -> Result<Box<dyn RecordStore + Send + Sync>, StoreError> {
        let store: Box<dyn RecordStore + Send + Sync> = match self.backend {
            Backend::Tree => Box::new(OrderedTreeStore::new()),
            Backend::Hash => Box::new(ChainedHashStore::with_table_size(self.table_size)?),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_tree() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, Backend::Tree);
        assert_eq!(config.table_size, DEFAULT_TABLE_SIZE);
        let store = config.build().unwrap();
        assert_eq!(store.backend_name(), "binary search tree");
    }

    #[test]
    fn test_build_hash() {
        let store = StoreConfig::hash(5).build().unwrap();
        assert_eq!(store.backend_name(), "chained hash table");
        assert!(store.is_empty());
    }

    #[test]
    fn test_build_hash_rejects_zero() {
        assert!(matches!(
            StoreConfig::hash(0).build(),
            Err(StoreError::InvalidTableSize(0))
        ));
        // The tree ignores the table size.
        let config = StoreConfig {
            backend: Backend::Tree,
            table_size: 0,
        };
        assert!(config.build().is_ok());
    }
}
