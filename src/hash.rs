//! Hash derivation and per-depth index arithmetic
//!
//! Segments are taken LSB-first: depth 0 reads the lowest `index_bits` of
//! the hash, depth 1 the next `index_bits`, and so on. When the hash width
//! is not a multiple of `index_bits` the final segment is narrower. The same
//! order drives table slot selection and therefore iteration order.

use crate::config::HashWidth;
use crate::error::ConfigError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

/// A key's hash, truncated to the configured width
pub type HashValue = u64;

/// Deterministic SipHash with fixed keys
pub type DefaultBuildHasher = BuildHasherDefault<DefaultHasher>;

/// Largest supported `index_bits`; a sparse table bitmap must fit a `u64`
pub const MAX_INDEX_BITS: u32 = 6;

/// Validated hash geometry shared by every node of one trie
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Geometry {
    width: u32,
    bits: u32,
    mask: u64,
    depth_limit: usize,
}

impl Geometry {
    /// Validate `index_bits` against the width and derive the geometry
    pub(crate) fn new(width: HashWidth, bits: u32) -> Result<Self, ConfigError> {
        if bits == 0 || bits > MAX_INDEX_BITS {
            return Err(ConfigError::IndexBits(bits));
        }
        Ok(Self::compute(width, bits))
    }

    pub(crate) const fn compute(width: HashWidth, bits: u32) -> Self {
        let width = width.bits();
        Geometry {
            width,
            bits,
            mask: (1u64 << bits) - 1,
            depth_limit: width.div_ceil(bits) as usize,
        }
    }

    /// Number of child slots per table (2^bits)
    pub(crate) fn capacity(&self) -> usize {
        1usize << self.bits
    }

    /// Depth at which every hash bit has been consumed
    pub(crate) fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// Slot index for `hash` at `depth`
    #[inline]
    pub(crate) fn segment(&self, hash: HashValue, depth: usize) -> usize {
        debug_assert!(depth < self.depth_limit, "depth {depth} past hash width");
        let shift = depth as u32 * self.bits;
        ((hash >> shift) & self.mask) as usize
    }

    /// Fold a raw 64-bit hasher output down to the configured width
    #[inline]
    pub(crate) fn fold(&self, raw: u64) -> HashValue {
        if self.width == 64 {
            raw
        } else {
            (raw ^ (raw >> 32)) & 0xFFFF_FFFF
        }
    }

    /// Hash a key with `build` and fold it to width
    #[inline]
    pub(crate) fn hash_key<Q, S>(&self, build: &S, key: &Q) -> HashValue
    where
        Q: Hash + ?Sized,
        S: BuildHasher,
    {
        self.fold(build.hash_one(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_limit_rounds_up() {
        assert_eq!(Geometry::compute(HashWidth::W32, 5).depth_limit(), 7);
        assert_eq!(Geometry::compute(HashWidth::W64, 6).depth_limit(), 11);
        assert_eq!(Geometry::compute(HashWidth::W64, 4).depth_limit(), 16);
    }

    #[test]
    fn test_segments_are_lsb_first() {
        let g = Geometry::compute(HashWidth::W32, 5);
        let hash: HashValue = 0b11_00010_00001;
        assert_eq!(g.segment(hash, 0), 1);
        assert_eq!(g.segment(hash, 1), 2);
        assert_eq!(g.segment(hash, 2), 3);
        assert_eq!(g.segment(hash, 3), 0);
    }

    #[test]
    fn test_last_segment_is_narrow() {
        // 32 bits at 5 per level leaves 2 bits for depth 6
        let g = Geometry::compute(HashWidth::W32, 5);
        assert_eq!(g.segment(0xFFFF_FFFF, 6), 0b11);
    }

    #[test]
    fn test_fold_to_32_bits() {
        let g = Geometry::compute(HashWidth::W32, 5);
        let folded = g.fold(0xDEAD_BEEF_0000_0001);
        assert!(folded <= u32::MAX as u64);
        assert_eq!(folded, 0xDEAD_BEEF ^ 1);

        let g64 = Geometry::compute(HashWidth::W64, 6);
        assert_eq!(g64.fold(0xDEAD_BEEF_0000_0001), 0xDEAD_BEEF_0000_0001);
    }

    #[test]
    fn test_invalid_bits_rejected() {
        assert_eq!(
            Geometry::new(HashWidth::W64, 0),
            Err(ConfigError::IndexBits(0))
        );
        assert_eq!(
            Geometry::new(HashWidth::W64, 7),
            Err(ConfigError::IndexBits(7))
        );
        assert!(Geometry::new(HashWidth::W32, 1).is_ok());
    }

    #[test]
    fn test_hash_key_is_deterministic() {
        let g = Geometry::compute(HashWidth::W64, 6);
        let build = DefaultBuildHasher::default();
        assert_eq!(g.hash_key(&build, "aaa"), g.hash_key(&build, "aaa"));
        assert_ne!(g.hash_key(&build, "aaa"), g.hash_key(&build, "aab"));
    }
}
