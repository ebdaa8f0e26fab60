//! Hash-array-mapped trie engine
//!
//! This implements the trie that backs both map handles:
//! - Nodes are a closed set of kinds (leaf, collision leaf, two table kinds)
//! - Children are `Arc`s so untouched subtrees are shared between versions
//! - One set of get/put/delete routines serves both mutation disciplines

mod engine;
mod node;
mod policy;
mod root;
mod table;

pub(crate) use engine::{Functional, Transient};
pub(crate) use node::{Child, Node};
pub(crate) use policy::TablePolicy;
pub(crate) use root::Root;

#[cfg(test)]
pub(crate) use node::{CollisionLeaf, Leaf};
#[cfg(test)]
pub(crate) use table::SparseTable;
