use super::*;

use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

fn validate_tree(t: &TourneyTree) {
    let mut stack: Vec<NodeId> = Vec::new();
    if !t.root.is_null() {
        stack.push(t.root);
    }

    let free: HashSet<u32> = t.arena.free.iter().map(|id| id.0).collect();
    assert_eq!(free.len(), t.arena.free.len(), "free list holds duplicates");

    let mut reachable = 0usize;
    while let Some(id) = stack.pop() {
        assert!(!id.is_null(), "NULL handle inside tree");
        assert!(!free.contains(&id.0), "reachable node is on the free list");
        reachable += 1;

        let node = &t.arena[id];
        assert!(node.count > 0, "live node with zero count");
        for child in [node.left, node.right] {
            if child.is_null() {
                continue;
            }
            assert!(
                t.arena[child].count <= node.count,
                "child count exceeds parent count"
            );
            stack.push(child);
        }
    }

    assert_eq!(reachable, t.len(), "reachable node count must match len");
    assert_eq!(
        t.arena.nodes.len(),
        t.len() + t.arena.free.len(),
        "every arena slot is either live or free"
    );

    let keys: Vec<&[u8]> = t.iter().map(|(k, _)| k).collect();
    assert!(
        keys.windows(2).all(|w| w[0] < w[1]),
        "in-order keys must be strictly increasing"
    );
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>),
    Remove(Vec<u8>),
    Extract,
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A small alphabet so keys repeat and counts climb.
    prop::collection::vec(b'a'..=b'd', 1..=3)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        70 => key.clone().prop_map(Op::Insert),
        20 => key.clone().prop_map(Op::Remove),
        10 => Just(Op::Extract),
    ];
    prop::collection::vec(op, 0..=1000)
}

fn max_tier(m: &mut BTreeMap<Vec<u8>, u64>) -> Vec<(Vec<u8>, u64)> {
    let Some(max) = m.values().copied().max() else {
        return Vec::new();
    };
    let tier: Vec<(Vec<u8>, u64)> = m
        .iter()
        .filter(|(_, c)| **c == max)
        .map(|(k, c)| (k.clone(), *c))
        .collect();
    m.retain(|_, c| *c != max);
    tier
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t = TourneyTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    let c = m.entry(key.clone()).or_insert(0);
                    *c += 1;
                    prop_assert_eq!(t.insert(&key).unwrap(), *c);
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                }
                Op::Extract => {
                    let got: Vec<(Vec<u8>, u64)> = t
                        .extract_max_tier()
                        .into_iter()
                        .map(|e| (e.key.into_vec(), e.count))
                        .collect();
                    prop_assert_eq!(got, max_tier(&mut m));
                }
            }

            validate_tree(&t);
            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(t.max_count(), m.values().copied().max());
        }

        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, c)| (k.to_vec(), c)).collect();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, c)| (k.clone(), *c)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_drain_is_exhaustive(keys in prop::collection::vec(key_strategy(), 1..=500)) {
        let mut t = TourneyTree::new();
        for key in &keys {
            t.insert(key).unwrap();
        }
        let total = t.total_occurrences();
        prop_assert_eq!(total, keys.len() as u64);

        let mut last = u64::MAX;
        let mut seen: Vec<Vec<u8>> = Vec::new();
        for tier in t.drain_tiers() {
            prop_assert!(!tier.is_empty());
            let count = tier[0].count;
            prop_assert!(count < last, "tier counts must strictly decrease");
            last = count;
            prop_assert!(tier.iter().all(|e| e.count == count));
            prop_assert!(tier.windows(2).all(|w| w[0].key < w[1].key));
            seen.extend(tier.into_iter().map(|e| e.key.into_vec()));
        }
        prop_assert!(t.is_empty());

        let mut distinct = keys.clone();
        distinct.sort();
        distinct.dedup();
        seen.sort();
        prop_assert_eq!(seen, distinct);
    }
}

/// Calls `f` with every ordering of `items`, stepping an index vector
/// through lexicographic order. Repeated items still yield distinct orderings.
fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    let mut order: Vec<usize> = (0..items.len()).collect();
    loop {
        f(order.iter().map(|&i| items[i].clone()).collect());

        let Some(pivot) = order.windows(2).rposition(|w| w[0] < w[1]) else {
            return;
        };
        let swap = order.iter().rposition(|&i| i > order[pivot]).unwrap();
        order.swap(pivot, swap);
        order[pivot + 1..].reverse();
    }
}

#[test]
fn exhaustive_insert_order_small_multiset() {
    // Every order of a multiset with ties at several counts.
    let tokens: [&[u8]; 6] = [b"a", b"b", b"b", b"c", b"c", b"d"];

    for_each_permutation(&tokens, |perm| {
        let mut t = TourneyTree::new();
        for k in &perm {
            t.insert(k).unwrap();
            validate_tree(&t);
        }

        let tiers: Vec<Vec<(Vec<u8>, u64)>> = t
            .drain_tiers()
            .map(|tier| tier.into_iter().map(|e| (e.key.into_vec(), e.count)).collect())
            .collect();
        assert_eq!(
            tiers,
            vec![
                vec![(b"b".to_vec(), 2), (b"c".to_vec(), 2)],
                vec![(b"a".to_vec(), 1), (b"d".to_vec(), 1)],
            ]
        );
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let tokens: [&[u8]; 8] = [b"m", b"e", b"t", b"m", b"c", b"t", b"x", b"m"];
    let keys: [&[u8]; 5] = [b"c", b"e", b"m", b"t", b"x"];

    let mut base = TourneyTree::new();
    for k in &tokens {
        base.insert(k).unwrap();
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        for k in perm {
            assert!(t.remove(k).is_some());
            validate_tree(&t);
        }
        assert!(t.is_empty());
        assert_eq!(t.arena.free.len(), t.arena.nodes.len());
    });
}
