//! Get, put and delete over trie nodes
//!
//! The mutating routines are written once and parameterized by a
//! [`Discipline`], which decides what happens when a node on the path
//! must change: [`Functional`] always writes to a fresh copy, leaving the
//! published node untouched, while [`Transient`] writes in place whenever
//! the node is not shared with another handle.

use super::node::{Child, CollisionLeaf, Leaf, Node};
use super::table::Table;
use crate::config::Layout;
use crate::hash::{Geometry, HashValue};
use std::borrow::Borrow;
use std::sync::Arc;

/// How a node on the mutation path is made writable
pub(crate) trait Discipline {
    fn edit<K: Clone, V: Clone>(node: &mut Child<K, V>) -> &mut Node<K, V>;
}

/// Path copying: the previous version of every edited node survives
pub(crate) struct Functional;

/// In-place mutation of exclusively owned nodes; shared nodes are copied
/// on first write so no other handle can observe the change
pub(crate) struct Transient;

impl Discipline for Functional {
    fn edit<K: Clone, V: Clone>(node: &mut Child<K, V>) -> &mut Node<K, V> {
        *node = Arc::new((**node).clone());
        Arc::make_mut(node)
    }
}

impl Discipline for Transient {
    fn edit<K: Clone, V: Clone>(node: &mut Child<K, V>) -> &mut Node<K, V> {
        Arc::make_mut(node)
    }
}

/// Outcome of a successful delete
pub(crate) struct Removed<V> {
    pub(crate) value: V,
    /// The visited node holds nothing anymore and must be unlinked
    pub(crate) emptied: bool,
}

/// Look up `key` beneath `node`, which sits at depth 0
pub(crate) fn get<'a, K, V, Q>(
    mut node: &'a Node<K, V>,
    geometry: &Geometry,
    hash: HashValue,
    key: &Q,
) -> Option<&'a V>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let mut depth = 0;
    loop {
        match node {
            Node::Leaf(leaf) => return leaf.matches(hash, key).then_some(&leaf.value),
            Node::Collision(c) if c.hash == hash => return c.get(key),
            Node::Collision(_) => return None,
            Node::Sparse(_) | Node::Fixed(_) => {
                node = node.child(geometry.segment(hash, depth))?.as_ref();
                depth += 1;
            }
        }
    }
}

/// Insert or replace `key` in the subtree at `slot`.
/// Returns true when a new entry was added.
pub(crate) fn put<D, K, V>(
    slot: &mut Child<K, V>,
    layout: &Layout,
    hash: HashValue,
    key: K,
    value: V,
    depth: usize,
) -> bool
where
    D: Discipline,
    K: Eq + Clone,
    V: Clone,
{
    if let Node::Leaf(leaf) = &**slot {
        if leaf.hash != hash {
            let existing_hash = leaf.hash;
            let existing = Arc::clone(slot);
            let incoming = Leaf::new(hash, key, value);
            *slot = Arc::new(split(layout, existing, existing_hash, incoming, depth));
            return true;
        }
        if leaf.key != key {
            tracing::trace!(hash, depth, "full hash collision");
            let entries = vec![(leaf.key.clone(), leaf.value.clone()), (key, value)];
            let collision = Node::Collision(CollisionLeaf::new(hash, entries));
            *slot = Arc::new(chain(layout, collision, hash, depth));
            return true;
        }
    }

    let node = D::edit(slot);
    let inserted = match &mut *node {
        Node::Leaf(leaf) => {
            leaf.value = value;
            false
        }
        Node::Collision(c) => {
            debug_assert_eq!(c.hash, hash);
            c.put(key, value)
        }
        Node::Sparse(table) => put_in::<D, _, _, _>(table, layout, hash, key, value, depth),
        Node::Fixed(table) => put_in::<D, _, _, _>(table, layout, hash, key, value, depth),
    };
    if inserted {
        layout.policy.settle(node);
    }
    inserted
}

fn put_in<D, T, K, V>(
    table: &mut T,
    layout: &Layout,
    hash: HashValue,
    key: K,
    value: V,
    depth: usize,
) -> bool
where
    D: Discipline,
    T: Table<K, V>,
    K: Eq + Clone,
    V: Clone,
{
    let index = layout.geometry.segment(hash, depth);
    match table.get_mut(index) {
        Some(child) => put::<D, _, _>(child, layout, hash, key, value, depth + 1),
        None => {
            table.insert(index, Arc::new(Node::Leaf(Leaf::new(hash, key, value))));
            true
        }
    }
}

/// Build the table at `depth` that separates an existing leaf from an
/// incoming one whose full hashes differ. Where their segments agree a
/// single-child table is created and the split continues one level down.
fn split<K, V>(
    layout: &Layout,
    existing: Child<K, V>,
    existing_hash: HashValue,
    incoming: Leaf<K, V>,
    depth: usize,
) -> Node<K, V> {
    debug_assert_ne!(existing_hash, incoming.hash);
    let geometry = &layout.geometry;
    let old_index = geometry.segment(existing_hash, depth);
    let new_index = geometry.segment(incoming.hash, depth);

    let mut table = layout.policy.empty_table();
    if old_index == new_index {
        let below = split(layout, existing, existing_hash, incoming, depth + 1);
        table.insert_child(old_index, Arc::new(below));
    } else {
        table.insert_child(old_index, existing);
        table.insert_child(new_index, Arc::new(Node::Leaf(incoming)));
    }
    layout.policy.settle(&mut table);
    table
}

/// Wrap `terminal` in single-child tables from `depth` down to the depth
/// limit, so it lands where every hash bit has been consumed
fn chain<K, V>(layout: &Layout, terminal: Node<K, V>, hash: HashValue, depth: usize) -> Node<K, V> {
    let mut node = terminal;
    for level in (depth..layout.geometry.depth_limit()).rev() {
        let mut table = layout.policy.empty_table();
        table.insert_child(layout.geometry.segment(hash, level), Arc::new(node));
        layout.policy.settle(&mut table);
        node = table;
    }
    node
}

/// Remove `key` from the subtree at `slot`
pub(crate) fn delete<D, K, V, Q>(
    slot: &mut Child<K, V>,
    geometry: &Geometry,
    hash: HashValue,
    key: &Q,
    depth: usize,
) -> Option<Removed<V>>
where
    D: Discipline,
    K: Borrow<Q> + Clone,
    V: Clone,
    Q: Eq + ?Sized,
{
    match &**slot {
        Node::Leaf(leaf) => {
            return leaf.matches(hash, key).then(|| Removed {
                value: leaf.value.clone(),
                emptied: true,
            });
        }
        Node::Collision(c) if c.hash != hash => return None,
        Node::Collision(c) => {
            c.position(key)?;
        }
        node => {
            node.child(geometry.segment(hash, depth))?;
        }
    }

    let node = D::edit(slot);
    match &mut *node {
        Node::Leaf(_) => None,
        Node::Collision(c) => {
            let index = c.position(key)?;
            let (_, value) = c.remove(index);
            if let Some(leaf) = c.take_last() {
                tracing::trace!(hash, "collision leaf decayed to leaf");
                *node = Node::Leaf(leaf);
            }
            Some(Removed {
                value,
                emptied: false,
            })
        }
        Node::Sparse(table) => delete_in::<D, _, _, _, _>(table, geometry, hash, key, depth),
        Node::Fixed(table) => delete_in::<D, _, _, _, _>(table, geometry, hash, key, depth),
    }
}

fn delete_in<D, T, K, V, Q>(
    table: &mut T,
    geometry: &Geometry,
    hash: HashValue,
    key: &Q,
    depth: usize,
) -> Option<Removed<V>>
where
    D: Discipline,
    T: Table<K, V>,
    K: Borrow<Q> + Clone,
    V: Clone,
    Q: Eq + ?Sized,
{
    let index = geometry.segment(hash, depth);
    let child = table.get_mut(index)?;
    let removed = delete::<D, _, _, _>(child, geometry, hash, key, depth + 1)?;
    if removed.emptied {
        table.remove(index);
    }
    // A table left with one child is kept as is; it is never collapsed.
    Some(Removed {
        value: removed.value,
        emptied: table.is_empty(),
    })
}
