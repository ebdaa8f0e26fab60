//! Trie configuration
//!
//! A [`Config`] is fixed for the lifetime of a trie. It is validated once at
//! construction; an invalid configuration never reaches the engine.

use crate::error::ConfigError;
use crate::hash::Geometry;
use crate::trie::TablePolicy;
use serde::{Deserialize, Serialize};

/// Width of the hash value driving the trie
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum HashWidth {
    W32,
    W64,
}

impl HashWidth {
    /// Number of hash bits
    pub const fn bits(self) -> u32 {
        match self {
            HashWidth::W32 => 32,
            HashWidth::W64 => 64,
        }
    }

    /// Conventional index bits for this width (5 for 32, 6 for 64)
    pub const fn default_index_bits(self) -> u32 {
        match self {
            HashWidth::W32 => 5,
            HashWidth::W64 => 6,
        }
    }
}

impl TryFrom<u32> for HashWidth {
    type Error = ConfigError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            32 => Ok(HashWidth::W32),
            64 => Ok(HashWidth::W64),
            other => Err(ConfigError::HashWidth(other)),
        }
    }
}

impl From<HashWidth> for u32 {
    fn from(width: HashWidth) -> u32 {
        width.bits()
    }
}

/// How internal tables are represented
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableMode {
    /// Every table is a directly indexed array of `2^bits` slots
    Fixed,
    /// Every table is a bitmap plus a dense child array
    Sparse,
    /// Tables start sparse and are promoted to fixed once crowded
    #[default]
    Hybrid,
}

impl TableMode {
    pub fn name(self) -> &'static str {
        match self {
            TableMode::Fixed => "fixed",
            TableMode::Sparse => "sparse",
            TableMode::Hybrid => "hybrid",
        }
    }
}

/// Construction parameters for a trie
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hash width W
    pub hash_width: HashWidth,
    /// Hash bits consumed per level (B); branching factor is 2^B
    pub index_bits: u32,
    /// Table representation policy
    pub table_mode: TableMode,
    /// Occupancy at which a hybrid sparse table is promoted.
    /// `None` means three quarters of the table capacity.
    pub promotion_threshold: Option<usize>,
}

impl Config {
    /// Config for `width` with its conventional index bits and hybrid tables
    pub fn new(width: HashWidth) -> Self {
        Config {
            hash_width: width,
            index_bits: width.default_index_bits(),
            table_mode: TableMode::Hybrid,
            promotion_threshold: None,
        }
    }

    pub fn with_index_bits(mut self, bits: u32) -> Self {
        self.index_bits = bits;
        self
    }

    pub fn with_table_mode(mut self, mode: TableMode) -> Self {
        self.table_mode = mode;
        self
    }

    pub fn with_promotion_threshold(mut self, threshold: usize) -> Self {
        self.promotion_threshold = Some(threshold);
        self
    }

    /// Check the configuration without building a trie
    pub fn validate(&self) -> Result<(), ConfigError> {
        Layout::new(*self).map(|_| ())
    }

    /// Maximum trie depth, `ceil(W / B)`
    pub fn depth_limit(&self) -> usize {
        self.hash_width.bits().div_ceil(self.index_bits.max(1)) as usize
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(HashWidth::W64)
    }
}

/// A validated [`Config`] with the derived engine parameters
#[derive(Clone, Copy, Debug)]
pub(crate) struct Layout {
    pub(crate) config: Config,
    pub(crate) geometry: Geometry,
    pub(crate) policy: TablePolicy,
}

impl Layout {
    pub(crate) fn new(config: Config) -> Result<Self, ConfigError> {
        let geometry = Geometry::new(config.hash_width, config.index_bits)?;
        let policy = TablePolicy::new(
            config.table_mode,
            geometry.capacity(),
            config.promotion_threshold,
        )?;
        Ok(Layout {
            config,
            geometry,
            policy,
        })
    }
}

impl Default for Layout {
    fn default() -> Self {
        let config = Config::default();
        let geometry = Geometry::compute(config.hash_width, config.index_bits);
        Layout {
            config,
            geometry,
            policy: TablePolicy::with_default_threshold(config.table_mode, geometry.capacity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.hash_width, HashWidth::W64);
        assert_eq!(config.index_bits, 6);
        assert_eq!(config.table_mode, TableMode::Hybrid);
        assert!(config.validate().is_ok());
        assert_eq!(config.depth_limit(), 11);
    }

    #[test]
    fn test_invalid_index_bits() {
        let config = Config::new(HashWidth::W32).with_index_bits(0);
        assert_eq!(config.validate(), Err(ConfigError::IndexBits(0)));

        let config = Config::new(HashWidth::W32).with_index_bits(9);
        assert_eq!(config.validate(), Err(ConfigError::IndexBits(9)));
    }

    #[test]
    fn test_invalid_threshold() {
        let config = Config::new(HashWidth::W32).with_promotion_threshold(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::Threshold {
                threshold: 0,
                capacity: 32
            })
        );

        let config = Config::new(HashWidth::W32).with_promotion_threshold(33);
        assert!(config.validate().is_err());

        let config = Config::new(HashWidth::W32).with_promotion_threshold(32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::new(HashWidth::W32).with_table_mode(TableMode::Sparse);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"hash_width\":32"));
        assert!(json.contains("\"sparse\""));

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_bad_width_in_json() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"hash_width": 48}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"table_mode": "fixed"}"#).unwrap();
        assert_eq!(config.table_mode, TableMode::Fixed);
        assert_eq!(config.hash_width, HashWidth::W64);
        assert_eq!(config.index_bits, 6);
    }
}
