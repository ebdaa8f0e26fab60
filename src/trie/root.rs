//! Root of a trie: top node, entry count and layout

use super::engine::{self, Discipline};
use super::node::{Child, Leaf, Node};
use crate::config::Layout;
use crate::hash::HashValue;
use std::borrow::Borrow;
use std::sync::Arc;

/// Shared state behind both map handles.
///
/// Cloning a root is O(1): only the top `Arc` is cloned.
#[derive(Debug)]
pub(crate) struct Root<K, V> {
    node: Option<Child<K, V>>,
    len: usize,
    layout: Layout,
}

impl<K, V> Clone for Root<K, V> {
    fn clone(&self) -> Self {
        Root {
            node: self.node.clone(),
            len: self.len,
            layout: self.layout,
        }
    }
}

impl<K, V> Root<K, V> {
    pub(crate) fn new(layout: Layout) -> Self {
        Root {
            node: None,
            len: 0,
            layout,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn node(&self) -> Option<&Node<K, V>> {
        self.node.as_deref()
    }

    /// Share the current top node, e.g. for a detached traversal
    pub(crate) fn snapshot(&self) -> Option<Child<K, V>> {
        self.node.clone()
    }

    pub(crate) fn get<Q>(&self, hash: HashValue, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        engine::get(self.node()?, &self.layout.geometry, hash, key)
    }
}

impl<K: Eq + Clone, V: Clone> Root<K, V> {
    /// Insert or replace; returns true when the entry count grew
    pub(crate) fn put<D: Discipline>(&mut self, hash: HashValue, key: K, value: V) -> bool {
        let inserted = match &mut self.node {
            None => {
                self.node = Some(Arc::new(Node::Leaf(Leaf::new(hash, key, value))));
                true
            }
            Some(slot) => engine::put::<D, _, _>(slot, &self.layout, hash, key, value, 0),
        };
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Remove `key`, returning its value. An absent key leaves every
    /// node untouched, so no path is copied.
    pub(crate) fn delete<D: Discipline, Q>(&mut self, hash: HashValue, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        // The engine edits each table before it learns whether the key is
        // below it, so absent keys are rejected here to keep the path shared
        self.get(hash, key)?;
        let slot = self.node.as_mut()?;
        let removed = engine::delete::<D, _, _, _>(slot, &self.layout.geometry, hash, key, 0)?;
        if removed.emptied {
            self.node = None;
        }
        self.len -= 1;
        Some(removed.value)
    }
}
