//! # hamt_trie
//!
//! An in-memory hash-array-mapped trie with two mutation disciplines.
//!
//! Keys are hashed once to a 32- or 64-bit value, which is consumed a few
//! bits per level to pick a slot in each internal table. Internal tables are
//! either sparse (bitmap plus dense children) or fixed (directly indexed),
//! or start sparse and are promoted once crowded.
//!
//! ## Core Concepts
//!
//! - **Hamt**: persistent map; every update returns a new version that
//!   shares untouched subtrees with the old one
//! - **TransientHamt**: single-owner map updated in place, for bulk loads
//! - **Thaw / freeze**: [`Hamt::to_transient`] and
//!   [`TransientHamt::to_functional`] convert between the two
//! - **Streams**: entries pushed from a background task with cancellation
//!   (`stream` feature)
//!
//! ## Example
//!
//! ```
//! use hamt_trie::{Config, Hamt, HashWidth, TableMode};
//!
//! let config = Config::new(HashWidth::W32).with_table_mode(TableMode::Hybrid);
//! let empty: Hamt<String, u32> = Hamt::with_config(config)?;
//!
//! let (v1, inserted) = empty.put("cat".to_string(), 1);
//! assert!(inserted);
//! let (v2, removed) = v1.delete("cat");
//! assert_eq!(removed, Some(1));
//!
//! // Older versions are unaffected
//! assert_eq!(v1.get("cat"), Some(&1));
//! assert!(v2.is_empty());
//!
//! let mut bulk = v1.to_transient();
//! bulk.extend((0..100).map(|i| (format!("k{i}"), i)));
//! let frozen = bulk.to_functional();
//! assert_eq!(frozen.len(), 101);
//! # Ok::<(), hamt_trie::Error>(())
//! ```

mod config;
mod error;
mod hamt;
mod hash;
mod iter;
#[cfg(test)]
mod proptests;
mod stats;
#[cfg(feature = "stream")]
mod stream;
mod transient;
mod trie;

pub use config::{Config, HashWidth, TableMode};
pub use error::{ConfigError, Error, Result};
pub use hamt::Hamt;
pub use hash::{DefaultBuildHasher, HashValue, MAX_INDEX_BITS};
pub use iter::{IntoIter, Iter};
pub use stats::Stats;
#[cfg(feature = "stream")]
pub use stream::{CancelToken, HamtStream};
pub use transient::TransientHamt;
