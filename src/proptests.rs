use crate::config::{Config, HashWidth, TableMode};
use crate::hash::Geometry;
use crate::trie::{Node, Root};
use crate::{Hamt, TransientHamt};

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasherDefault, Hash, Hasher};

/// Walk the whole trie and check every structural invariant
fn validate_trie<K: Eq + Hash, V>(root: &Root<K, V>) {
    let layout = root.layout();
    let geometry = &layout.geometry;
    let mut keys = HashSet::new();
    let mut path = Vec::new();
    if let Some(node) = root.node() {
        let threshold = layout.policy.threshold();
        validate_node(node, layout.config, geometry, threshold, &mut path, &mut keys);
    }
    assert_eq!(keys.len(), root.len(), "reachable entries must match len");
}

fn validate_node<'a, K: Eq + Hash, V>(
    node: &'a Node<K, V>,
    config: Config,
    geometry: &Geometry,
    threshold: usize,
    path: &mut Vec<usize>,
    keys: &mut HashSet<&'a K>,
) {
    match node {
        Node::Leaf(leaf) => {
            assert!(path.len() <= geometry.depth_limit());
            assert!(on_path(geometry, path, leaf.hash), "leaf stored off its hash path");
            assert!(keys.insert(&leaf.key), "duplicate key");
        }
        Node::Collision(c) => {
            assert_eq!(path.len(), geometry.depth_limit(), "collision leaf above limit");
            assert!(c.entries.len() >= 2, "collision leaf with a single entry");
            assert!(on_path(geometry, path, c.hash), "collision leaf stored off its hash path");
            for (k, _) in &c.entries {
                assert!(keys.insert(k), "duplicate key");
            }
        }
        Node::Sparse(_) | Node::Fixed(_) => {
            assert!(path.len() < geometry.depth_limit(), "table below depth limit");
            assert!(node.occupied() > 0, "empty table left linked");
            match (config.table_mode, node) {
                (TableMode::Fixed, Node::Sparse(_)) => panic!("sparse table in fixed mode"),
                (TableMode::Sparse, Node::Fixed(_)) => panic!("fixed table in sparse mode"),
                (TableMode::Hybrid, Node::Sparse(_)) => {
                    assert!(node.occupied() < threshold, "crowded sparse table not promoted")
                }
                _ => {}
            }
            let mut seen = 0;
            for (slot, child) in node.table_entries() {
                assert!(slot < geometry.capacity());
                seen += 1;
                path.push(slot);
                validate_node(child, config, geometry, threshold, path, keys);
                path.pop();
            }
            assert_eq!(seen, node.occupied());
        }
    }
}

fn on_path(geometry: &Geometry, path: &[usize], hash: u64) -> bool {
    path.iter()
        .enumerate()
        .all(|(depth, &slot)| geometry.segment(hash, depth) == slot)
}

/// Key with a deliberately tiny hash space, so collisions are common
#[derive(Clone, Debug, PartialEq, Eq)]
struct Crowded {
    bucket: u8,
    id: u16,
}

impl Hash for Crowded {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(u64::from(self.bucket));
    }
}

#[derive(Default)]
struct PassThrough(u64);

impl Hasher for PassThrough {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.rotate_left(8) ^ u64::from(b);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

#[derive(Clone, Debug)]
enum Op<K> {
    Put(K, u32),
    Delete(K),
    Get(K),
    /// Keep the current functional version for a later check
    Snapshot,
}

fn config_strategy() -> impl Strategy<Value = Config> {
    let width = prop_oneof![Just(HashWidth::W32), Just(HashWidth::W64)];
    let mode = prop_oneof![
        Just(TableMode::Fixed),
        Just(TableMode::Sparse),
        Just(TableMode::Hybrid)
    ];
    (width, 1u32..=6, mode, prop::option::of(1usize..=64)).prop_map(
        |(width, bits, mode, threshold)| {
            let mut config = Config::new(width)
                .with_index_bits(bits)
                .with_table_mode(mode);
            let capacity = 1usize << bits;
            if let Some(threshold) = threshold {
                config = config.with_promotion_threshold(threshold.min(capacity));
            }
            config
        },
    )
}

fn ops_strategy<K: Clone + std::fmt::Debug>(
    key: impl Strategy<Value = K> + Clone,
) -> impl Strategy<Value = Vec<Op<K>>> {
    let op = prop_oneof![
        50 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        25 => key.clone().prop_map(Op::Delete),
        20 => key.prop_map(Op::Get),
        5 => Just(Op::Snapshot),
    ];
    prop::collection::vec(op, 0..=600)
}

fn crowded_key() -> impl Strategy<Value = Crowded> + Clone {
    (0u8..4, 0u16..24).prop_map(|(bucket, id)| Crowded { bucket, id })
}

/// Run `ops` against both handles and a `HashMap`, checking each step
fn check_against_oracle<K, S>(config: Config, ops: Vec<Op<K>>) -> Result<(), TestCaseError>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
    S: std::hash::BuildHasher + Clone + Default,
{
    let mut functional: Hamt<K, u32, S> = Hamt::with_config_and_hasher(config, S::default())
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let mut transient: TransientHamt<K, u32, S> =
        TransientHamt::with_config_and_hasher(config, S::default())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let mut oracle: HashMap<K, u32> = HashMap::new();
    let mut snapshots: Vec<(Hamt<K, u32, S>, HashMap<K, u32>)> = Vec::new();

    for op in ops {
        match op {
            Op::Put(key, value) => {
                let expected = !oracle.contains_key(&key);
                oracle.insert(key.clone(), value);
                let (next, inserted) = functional.put(key.clone(), value);
                prop_assert_eq!(inserted, expected);
                prop_assert_eq!(transient.put(key, value), expected);
                functional = next;
            }
            Op::Delete(key) => {
                let expected = oracle.remove(&key);
                let (next, removed) = functional.delete(&key);
                prop_assert_eq!(removed, expected);
                prop_assert_eq!(transient.delete(&key), expected);
                functional = next;
            }
            Op::Get(key) => {
                let expected = oracle.get(&key);
                prop_assert_eq!(functional.get(&key), expected);
                prop_assert_eq!(transient.get(&key), expected);
            }
            Op::Snapshot => snapshots.push((functional.clone(), oracle.clone())),
        }
        prop_assert_eq!(functional.len(), oracle.len());
        prop_assert_eq!(transient.len(), oracle.len());
    }

    validate_trie(&functional.root);
    let iterated: HashMap<K, u32> = functional.iter().map(|(k, v)| (k.clone(), *v)).collect();
    prop_assert_eq!(&iterated, &oracle);
    prop_assert_eq!(functional.stats().total_entries, oracle.len());

    let frozen = transient.to_functional();
    validate_trie(&frozen.root);
    prop_assert!(frozen == functional);

    for (old, expected) in snapshots {
        validate_trie(&old.root);
        let entries: HashMap<K, u32> = old.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(&entries, &expected);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_u16(config in config_strategy(), ops in ops_strategy(0u16..512)) {
        check_against_oracle::<u16, crate::DefaultBuildHasher>(config, ops)?;
    }

    #[test]
    fn prop_equivalence_collisions(
        config in config_strategy(),
        ops in ops_strategy(crowded_key()),
    ) {
        check_against_oracle::<Crowded, BuildHasherDefault<PassThrough>>(config, ops)?;
    }

    #[test]
    fn prop_thaw_edits_stay_private(
        config in config_strategy(),
        base in prop::collection::vec((0u16..256, any::<u32>()), 0..200),
        edits in ops_strategy(0u16..256),
    ) {
        let mut transient = TransientHamt::with_config(config).unwrap();
        transient.extend(base);
        let frozen = transient.to_functional();
        let before: Vec<(u16, u32)> = frozen.iter().map(|(k, v)| (*k, *v)).collect();

        let mut thawed = frozen.to_transient();
        for op in edits {
            match op {
                Op::Put(k, v) => {
                    thawed.put(k, v);
                }
                Op::Delete(k) => {
                    thawed.delete(&k);
                }
                Op::Get(_) | Op::Snapshot => {}
            }
        }

        let after: Vec<(u16, u32)> = frozen.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(before, after);
        validate_trie(&frozen.root);
        validate_trie(&thawed.to_functional().root);
    }
}
