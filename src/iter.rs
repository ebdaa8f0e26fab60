//! Depth-first iteration over trie entries
//!
//! Entries come out in slot order at every level, so two traversals of the
//! same version always agree. Each traversal keeps its own stack of
//! `(node, next slot)` frames and never touches the trie's state.

use crate::trie::{Child, Node};

/// Borrowing cursor over `(&K, &V)` pairs
pub struct Iter<'a, K, V> {
    stack: Vec<(&'a Node<K, V>, usize)>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: Option<&'a Node<K, V>>, len: usize) -> Self {
        Iter {
            stack: root.map(|node| (node, 0)).into_iter().collect(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, cursor) = self.stack.last_mut()?;
            let node: &'a Node<K, V> = *node;
            match node {
                Node::Leaf(leaf) => {
                    self.stack.pop();
                    self.remaining -= 1;
                    return Some((&leaf.key, &leaf.value));
                }
                Node::Collision(c) => match c.entries.get(*cursor) {
                    Some((k, v)) => {
                        *cursor += 1;
                        self.remaining -= 1;
                        return Some((k, v));
                    }
                    None => {
                        self.stack.pop();
                    }
                },
                Node::Sparse(_) | Node::Fixed(_) => match node.next_entry(*cursor) {
                    Some((slot, child)) => {
                        *cursor = slot + 1;
                        self.stack.push((child.as_ref(), 0));
                    }
                    None => {
                        self.stack.pop();
                    }
                },
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

/// Owning cursor over cloned `(K, V)` pairs.
///
/// Holds its own reference to the top node, so it stays valid after the
/// handle it came from is changed or dropped.
pub struct IntoIter<K, V> {
    stack: Vec<(Child<K, V>, usize)>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(root: Option<Child<K, V>>, len: usize) -> Self {
        IntoIter {
            stack: root.map(|node| (node, 0)).into_iter().collect(),
            remaining: len,
        }
    }
}

impl<K: Clone, V: Clone> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, cursor) = self.stack.last_mut()?;
            let step = match node.as_ref() {
                Node::Leaf(leaf) => Step::Yield((leaf.key.clone(), leaf.value.clone()), true),
                Node::Collision(c) => match c.entries.get(*cursor) {
                    Some(entry) => {
                        *cursor += 1;
                        Step::Yield(entry.clone(), false)
                    }
                    None => Step::Pop,
                },
                table => match table.next_entry(*cursor) {
                    Some((slot, child)) => {
                        *cursor = slot + 1;
                        Step::Descend(child.clone())
                    }
                    None => Step::Pop,
                },
            };
            match step {
                Step::Yield(entry, pop) => {
                    if pop {
                        self.stack.pop();
                    }
                    self.remaining -= 1;
                    return Some(entry);
                }
                Step::Descend(child) => self.stack.push((child, 0)),
                Step::Pop => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for IntoIter<K, V> {}

enum Step<K, V> {
    Yield((K, V), bool),
    Descend(Child<K, V>),
    Pop,
}
