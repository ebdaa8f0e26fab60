//! Persistent (functional) map handle
//!
//! Every `put` and `delete` returns a new [`Hamt`]; the receiver is left
//! untouched and keeps sharing every subtree the operation did not visit.

use crate::config::{Config, Layout};
use crate::error::Result;
use crate::hash::{DefaultBuildHasher, HashValue};
use crate::iter::{IntoIter, Iter};
use crate::stats::{self, Stats};
use crate::transient::TransientHamt;
use crate::trie::{Functional, Root};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};

#[cfg(feature = "stream")]
use crate::stream::{self, CancelToken, HamtStream};

/// Immutable hash-array-mapped trie
///
/// Cloning is O(1). Versions derived from one another share structure and
/// can be read concurrently from any number of threads.
pub struct Hamt<K, V, S = DefaultBuildHasher> {
    pub(crate) root: Root<K, V>,
    pub(crate) hasher: S,
}

impl<K, V> Hamt<K, V> {
    /// Empty trie with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty trie with `config`, failing if it is invalid
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_config_and_hasher(config, DefaultBuildHasher::default())
    }
}

impl<K, V, S> Hamt<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Hamt {
            root: Root::new(Layout::default()),
            hasher,
        }
    }

    pub fn with_config_and_hasher(config: Config, hasher: S) -> Result<Self> {
        let layout = Layout::new(config)?;
        Ok(Hamt {
            root: Root::new(layout),
            hasher,
        })
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.len() == 0
    }

    pub fn config(&self) -> Config {
        self.root.layout().config
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Pull cursor over every entry in depth-first slot order
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.node(), self.root.len())
    }

    /// Visit entries in iteration order until `visit` returns false
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        if let Some(node) = self.root.node() {
            node.visit(&mut visit);
        }
    }

    /// Owned copy of every entry
    pub fn key_vals(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.root.node().map(|n| n.key_vals()).unwrap_or_default()
    }

    pub fn stats(&self) -> Stats {
        Stats::collect(self.root.node(), self.root.layout().geometry.capacity())
    }

    /// Render the node tree, one node per line
    pub fn dump(&self) -> String
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        stats::dump(self.root.node())
    }

    /// Push every entry of this version into a bounded channel from a
    /// background task. Must be called within a tokio runtime.
    #[cfg(feature = "stream")]
    pub fn stream(&self, buffer: usize, cancel: CancelToken) -> Result<HamtStream<K, V>>
    where
        K: Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let entries = IntoIter::new(self.root.snapshot(), self.root.len());
        stream::spawn(entries, buffer, cancel)
    }
}

impl<K, V, S> Hamt<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn hash<Q: Hash + ?Sized>(&self, key: &Q) -> HashValue {
        self.root.layout().geometry.hash_key(&self.hasher, key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root.get(self.hash(key), key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K, V, S> Hamt<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// New version with `key` bound to `value`. The flag is true when the
    /// key was not present before; a replaced value still yields a new
    /// version.
    pub fn put(&self, key: K, value: V) -> (Self, bool) {
        let hash = self.hash(&key);
        let mut root = self.root.clone();
        let inserted = root.put::<Functional>(hash, key, value);
        (self.derive(root), inserted)
    }

    /// New version without `key`, plus the removed value. Deleting an
    /// absent key returns a version sharing this one's whole tree.
    pub fn delete<Q>(&self, key: &Q) -> (Self, Option<V>)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        let mut root = self.root.clone();
        let removed = root.delete::<Functional, Q>(hash, key);
        (self.derive(root), removed)
    }

    /// Thaw into a transient handle. O(1): nodes are shared until the
    /// transient first writes to them.
    pub fn to_transient(&self) -> TransientHamt<K, V, S> {
        tracing::debug!(entries = self.len(), "thawing into transient");
        TransientHamt::from_parts(self.root.clone(), self.hasher.clone())
    }

    fn derive(&self, root: Root<K, V>) -> Self {
        Hamt {
            root,
            hasher: self.hasher.clone(),
        }
    }
}

impl<K, V, S: Clone> Clone for Hamt<K, V, S> {
    fn clone(&self) -> Self {
        Hamt {
            root: self.root.clone(),
            hasher: self.hasher.clone(),
        }
    }
}

impl<K, V, S: Default> Default for Hamt<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for Hamt<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for Hamt<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> FromIterator<(K, V)> for Hamt<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientHamt::with_hasher(S::default());
        transient.extend(iter);
        transient.to_functional()
    }
}

impl<'a, K, V, S> IntoIterator for &'a Hamt<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone, V: Clone, S> IntoIterator for Hamt<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root.snapshot(), self.root.len())
    }
}
