//! Table representation policy

use super::node::Node;
use super::table::{FixedTable, SparseTable, Table};
use crate::config::TableMode;
use crate::error::ConfigError;

/// Decides how new tables are built and when sparse tables are promoted.
/// Promotion is one-way; tables are never demoted on delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TablePolicy {
    mode: TableMode,
    capacity: usize,
    threshold: usize,
}

impl TablePolicy {
    pub(crate) fn new(
        mode: TableMode,
        capacity: usize,
        threshold: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let Some(threshold) = threshold else {
            return Ok(Self::with_default_threshold(mode, capacity));
        };
        if threshold == 0 || threshold > capacity {
            return Err(ConfigError::Threshold {
                threshold,
                capacity,
            });
        }
        Ok(TablePolicy {
            mode,
            capacity,
            threshold,
        })
    }

    /// Promote at three quarters of capacity
    pub(crate) const fn with_default_threshold(mode: TableMode, capacity: usize) -> Self {
        TablePolicy {
            mode,
            capacity,
            threshold: capacity - capacity / 4,
        }
    }

    #[cfg(test)]
    pub(crate) fn threshold(&self) -> usize {
        self.threshold
    }

    /// An empty table in the representation this policy starts with
    pub(crate) fn empty_table<K, V>(&self) -> Node<K, V> {
        match self.mode {
            TableMode::Fixed => Node::Fixed(FixedTable::new(self.capacity)),
            TableMode::Sparse | TableMode::Hybrid => Node::Sparse(SparseTable::default()),
        }
    }

    /// Promote `node` to a fixed table if it is a crowded sparse table
    /// under the hybrid policy. Call after an insertion into `node`.
    pub(crate) fn settle<K, V>(&self, node: &mut Node<K, V>) {
        if self.mode != TableMode::Hybrid {
            return;
        }
        if let Node::Sparse(table) = node {
            if table.len() >= self.threshold {
                let sparse = std::mem::take(table);
                tracing::trace!(
                    occupied = sparse.len(),
                    threshold = self.threshold,
                    "promoting sparse table"
                );
                *node = Node::Fixed(FixedTable::from_sparse(sparse, self.capacity));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::Leaf;
    use std::sync::Arc;

    fn fill(policy: &TablePolicy, node: &mut Node<usize, ()>, slots: std::ops::Range<usize>) {
        for slot in slots {
            node.insert_child(slot, Arc::new(Node::Leaf(Leaf::new(slot as u64, slot, ()))));
            policy.settle(node);
        }
    }

    #[test]
    fn test_default_threshold() {
        let policy = TablePolicy::new(TableMode::Hybrid, 32, None).unwrap();
        assert_eq!(policy.threshold(), 24);
        let policy = TablePolicy::new(TableMode::Hybrid, 64, None).unwrap();
        assert_eq!(policy.threshold(), 48);
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(TablePolicy::new(TableMode::Hybrid, 32, Some(0)).is_err());
        assert!(TablePolicy::new(TableMode::Hybrid, 32, Some(33)).is_err());
        assert!(TablePolicy::new(TableMode::Hybrid, 32, Some(1)).is_ok());
    }

    #[test]
    fn test_fixed_mode_builds_fixed_tables() {
        let policy = TablePolicy::new(TableMode::Fixed, 32, None).unwrap();
        assert!(matches!(policy.empty_table::<u8, u8>(), Node::Fixed(_)));
    }

    #[test]
    fn test_sparse_mode_never_promotes() {
        let policy = TablePolicy::new(TableMode::Sparse, 32, None).unwrap();
        let mut node = policy.empty_table();
        fill(&policy, &mut node, 0..32);
        assert!(matches!(node, Node::Sparse(_)));
        assert_eq!(node.occupied(), 32);
    }

    #[test]
    fn test_hybrid_promotes_at_threshold() {
        let policy = TablePolicy::new(TableMode::Hybrid, 32, Some(4)).unwrap();
        let mut node = policy.empty_table();

        fill(&policy, &mut node, 0..3);
        assert!(matches!(node, Node::Sparse(_)));

        fill(&policy, &mut node, 3..4);
        assert!(matches!(node, Node::Fixed(_)));
        assert_eq!(node.occupied(), 4);
        assert!(node.child(3).is_some());
    }
}
