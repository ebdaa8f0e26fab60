//! Trie shape diagnostics

use crate::trie::Node;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Write};

/// Shape of a trie, gathered in one read-only walk
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Entries reachable from the root
    pub total_entries: usize,
    pub leaves: usize,
    pub collision_leaves: usize,
    pub sparse_tables: usize,
    pub fixed_tables: usize,
    /// Deepest leaf or collision leaf; the root sits at depth 0
    pub max_depth: usize,
    /// Mean depth over leaves and collision leaves
    pub avg_depth: f64,
    /// `table_occupancy[n]` counts tables with exactly `n` occupied slots
    pub table_occupancy: Vec<usize>,
}

impl Stats {
    pub(crate) fn collect<K, V>(root: Option<&Node<K, V>>, capacity: usize) -> Self {
        let mut stats = Stats {
            table_occupancy: vec![0; capacity + 1],
            ..Stats::default()
        };
        let mut depth_sum = 0usize;
        if let Some(node) = root {
            stats.walk(node, 0, &mut depth_sum);
        }
        let terminals = stats.leaves + stats.collision_leaves;
        if terminals > 0 {
            stats.avg_depth = depth_sum as f64 / terminals as f64;
        }
        stats
    }

    fn walk<K, V>(&mut self, node: &Node<K, V>, depth: usize, depth_sum: &mut usize) {
        match node {
            Node::Leaf(_) => {
                self.leaves += 1;
                self.total_entries += 1;
            }
            Node::Collision(c) => {
                self.collision_leaves += 1;
                self.total_entries += c.entries.len();
            }
            Node::Sparse(_) | Node::Fixed(_) => {
                if matches!(node, Node::Sparse(_)) {
                    self.sparse_tables += 1;
                } else {
                    self.fixed_tables += 1;
                }
                self.table_occupancy[node.occupied()] += 1;
                for (_, child) in node.table_entries() {
                    self.walk(child, depth + 1, depth_sum);
                }
                return;
            }
        }
        *depth_sum += depth;
        self.max_depth = self.max_depth.max(depth);
    }

    pub fn tables(&self) -> usize {
        self.sparse_tables + self.fixed_tables
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries in {} leaves and {} collision leaves; {} sparse + {} fixed tables; depth max {} avg {:.2}",
            self.total_entries,
            self.leaves,
            self.collision_leaves,
            self.sparse_tables,
            self.fixed_tables,
            self.max_depth,
            self.avg_depth
        )
    }
}

/// Indented rendering of every node, one per line
pub(crate) fn dump<K: Debug, V: Debug>(root: Option<&Node<K, V>>) -> String {
    let mut out = String::new();
    match root {
        Some(node) => write_node(&mut out, node, 0, None),
        None => out.push_str("(empty)\n"),
    }
    out
}

fn write_node<K: Debug, V: Debug>(
    out: &mut String,
    node: &Node<K, V>,
    depth: usize,
    slot: Option<usize>,
) {
    let indent = "  ".repeat(depth);
    let slot = slot.map(|s| format!("[{s:>2}] ")).unwrap_or_default();
    // Writing to a String cannot fail
    let _ = match node {
        Node::Leaf(leaf) => writeln!(
            out,
            "{indent}{slot}Leaf {:016x} {:?} => {:?}",
            leaf.hash, leaf.key, leaf.value
        ),
        Node::Collision(c) => writeln!(
            out,
            "{indent}{slot}CollisionLeaf {:016x} {:?}",
            c.hash, c.entries
        ),
        Node::Sparse(_) => writeln!(
            out,
            "{indent}{slot}SparseTable ({} occupied)",
            node.occupied()
        ),
        Node::Fixed(t) => writeln!(
            out,
            "{indent}{slot}FixedTable ({}/{} occupied)",
            node.occupied(),
            t.capacity()
        ),
    };
    for (slot, child) in node.table_entries() {
        write_node(out, child, depth + 1, Some(slot));
    }
}
