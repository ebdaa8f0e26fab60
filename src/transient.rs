//! Transient (in-place) map handle
//!
//! A [`TransientHamt`] mutates its own tree. Nodes it owns exclusively are
//! edited in place; nodes still shared with a functional version or a live
//! stream are copied on first write, so no other handle ever observes the
//! change.

use crate::config::{Config, Layout};
use crate::error::Result;
use crate::hamt::Hamt;
use crate::hash::{DefaultBuildHasher, HashValue};
use crate::iter::Iter;
use crate::stats::{self, Stats};
use crate::trie::{Root, Transient};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};

#[cfg(feature = "stream")]
use crate::iter::IntoIter;
#[cfg(feature = "stream")]
use crate::stream::{self, CancelToken, HamtStream};

/// Mutable hash-array-mapped trie with a single owner
pub struct TransientHamt<K, V, S = DefaultBuildHasher> {
    root: Root<K, V>,
    hasher: S,
}

impl<K, V> TransientHamt<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_config_and_hasher(config, DefaultBuildHasher::default())
    }
}

impl<K, V, S> TransientHamt<K, V, S> {
    pub(crate) fn from_parts(root: Root<K, V>, hasher: S) -> Self {
        TransientHamt { root, hasher }
    }

    pub fn with_hasher(hasher: S) -> Self {
        Self::from_parts(Root::new(Layout::default()), hasher)
    }

    pub fn with_config_and_hasher(config: Config, hasher: S) -> Result<Self> {
        let layout = Layout::new(config)?;
        Ok(Self::from_parts(Root::new(layout), hasher))
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

    pub fn dump(&self) -> String
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        stats::dump(self.root.node())
    }

    /// Stream the entries present now. Later mutations of this handle are
    /// not seen by the stream.
    #[cfg(feature = "stream")]
    pub fn stream(&self, buffer: usize, cancel: CancelToken) -> Result<HamtStream<K, V>>
    where
        K: Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let entries = IntoIter::new(self.root.snapshot(), self.root.len());
        stream::spawn(entries, buffer, cancel)
    }

    /// Freeze into a functional handle. Consumes `self`, so no transient
    /// edit can reach the frozen nodes afterwards.
    pub fn to_functional(self) -> Hamt<K, V, S> {
        tracing::debug!(entries = self.len(), "freezing transient");
        Hamt {
            root: self.root,
            hasher: self.hasher,
        }
    }
}

impl<K, V, S> TransientHamt<K, V, S>
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

impl<K, V, S> TransientHamt<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Bind `key` to `value`; true when the key was not present before
    pub fn put(&mut self, key: K, value: V) -> bool {
        let hash = self.hash(&key);
        self.root.put::<Transient>(hash, key, value)
    }

    /// Remove `key`, returning its value if it was present
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        self.root.delete::<Transient, Q>(hash, key)
    }
}

impl<K, V, S: Default> Default for TransientHamt<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for TransientHamt<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for TransientHamt<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for TransientHamt<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = Self::default();
        transient.extend(iter);
        transient
    }
}

impl<'a, K, V, S> IntoIterator for &'a TransientHamt<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
