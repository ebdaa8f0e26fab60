//! Trie node types

use super::table::{FixedTable, SparseTable, Table};
use crate::hash::HashValue;
use std::borrow::Borrow;
use std::sync::Arc;

/// A shared reference to a child node
pub(crate) type Child<K, V> = Arc<Node<K, V>>;

/// A node in the trie
///
/// Leaves are terminal. Tables hold children keyed by one hash segment.
#[derive(Clone, Debug)]
pub(crate) enum Node<K, V> {
    /// A single entry with its cached hash
    Leaf(Leaf<K, V>),
    /// Two or more entries whose full hashes are identical
    Collision(CollisionLeaf<K, V>),
    /// Bitmap-compressed table
    Sparse(SparseTable<K, V>),
    /// Fully allocated table
    Fixed(FixedTable<K, V>),
}

#[derive(Clone, Debug)]
pub(crate) struct Leaf<K, V> {
    pub(crate) hash: HashValue,
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Leaf<K, V> {
    pub(crate) fn new(hash: HashValue, key: K, value: V) -> Self {
        Leaf { hash, key, value }
    }

    pub(crate) fn matches<Q>(&self, hash: HashValue, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.hash == hash && self.key.borrow() == key
    }
}

/// Entries sharing one full hash value; order carries no meaning
#[derive(Clone, Debug)]
pub(crate) struct CollisionLeaf<K, V> {
    pub(crate) hash: HashValue,
    pub(crate) entries: Vec<(K, V)>,
}

impl<K, V> CollisionLeaf<K, V> {
    pub(crate) fn new(hash: HashValue, entries: Vec<(K, V)>) -> Self {
        debug_assert!(entries.len() >= 2, "collision leaf needs two entries");
        CollisionLeaf { hash, entries }
    }

    pub(crate) fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries.iter().position(|(k, _)| k.borrow() == key)
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Replace the value for `key` or append a new entry.
    /// Returns true when an entry was added.
    pub(crate) fn put(&mut self, key: K, value: V) -> bool
    where
        K: Eq,
    {
        match self.position(&key) {
            Some(i) => {
                self.entries[i].1 = value;
                false
            }
            None => {
                self.entries.push((key, value));
                true
            }
        }
    }

    /// Remove the entry at `index`. A lone survivor must then be turned
    /// back into a leaf with [`CollisionLeaf::take_last`].
    pub(crate) fn remove(&mut self, index: usize) -> (K, V) {
        self.entries.swap_remove(index)
    }

    /// Take the sole remaining entry as a plain leaf
    pub(crate) fn take_last(&mut self) -> Option<Leaf<K, V>> {
        if self.entries.len() != 1 {
            return None;
        }
        self.entries
            .pop()
            .map(|(key, value)| Leaf::new(self.hash, key, value))
    }
}

impl<K, V> Node<K, V> {
    #[cfg(test)]
    pub(crate) fn is_table(&self) -> bool {
        matches!(self, Node::Sparse(_) | Node::Fixed(_))
    }

    /// Child at `slot` when this node is a table
    pub(crate) fn child(&self, slot: usize) -> Option<&Child<K, V>> {
        match self {
            Node::Sparse(t) => t.get(slot),
            Node::Fixed(t) => t.get(slot),
            Node::Leaf(_) | Node::Collision(_) => None,
        }
    }

    /// First occupied `(slot, child)` at or after `from` when this node is a table
    pub(crate) fn next_entry(&self, from: usize) -> Option<(usize, &Child<K, V>)> {
        match self {
            Node::Sparse(t) => t.next_entry(from),
            Node::Fixed(t) => t.next_entry(from),
            Node::Leaf(_) | Node::Collision(_) => None,
        }
    }

    /// Occupied `(slot, child)` pairs in slot order
    pub(crate) fn table_entries(&self) -> impl Iterator<Item = (usize, &Child<K, V>)> + '_ {
        let mut from = 0;
        std::iter::from_fn(move || {
            let (slot, child) = self.next_entry(from)?;
            from = slot + 1;
            Some((slot, child))
        })
    }

    /// Number of occupied slots when this node is a table
    pub(crate) fn occupied(&self) -> usize {
        match self {
            Node::Sparse(t) => t.len(),
            Node::Fixed(t) => t.len(),
            Node::Leaf(_) | Node::Collision(_) => 0,
        }
    }

    /// Insert a child into an empty slot when this node is a table
    pub(crate) fn insert_child(&mut self, slot: usize, child: Child<K, V>) {
        match self {
            Node::Sparse(t) => t.insert(slot, child),
            Node::Fixed(t) => t.insert(slot, child),
            Node::Leaf(_) | Node::Collision(_) => {
                debug_assert!(false, "insert_child on a terminal node")
            }
        }
    }

    /// Snapshot of every entry beneath this node
    pub(crate) fn key_vals(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<(K, V)>)
    where
        K: Clone,
        V: Clone,
    {
        match self {
            Node::Leaf(leaf) => out.push((leaf.key.clone(), leaf.value.clone())),
            Node::Collision(c) => out.extend(c.entries.iter().cloned()),
            Node::Sparse(_) | Node::Fixed(_) => {
                for (_, child) in self.table_entries() {
                    child.collect_into(out);
                }
            }
        }
    }

    /// Visit entries depth-first until `visit` returns false.
    /// Returns false when the walk was stopped early.
    pub(crate) fn visit<F>(&self, visit: &mut F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        match self {
            Node::Leaf(leaf) => visit(&leaf.key, &leaf.value),
            Node::Collision(c) => c.entries.iter().all(|(k, v)| visit(k, v)),
            Node::Sparse(_) | Node::Fixed(_) => {
                self.table_entries().all(|(_, child)| child.visit(visit))
            }
        }
    }
}
