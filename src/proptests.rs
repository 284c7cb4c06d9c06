use crate::{AvlTree, Error};

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0u32..500")] u32),
    #[proptest(weight = 3)]
    Delete(#[proptest(strategy = "0u32..500")] u32),
    #[proptest(weight = 2)]
    Search(#[proptest(strategy = "0u32..500")] u32),
}

fn assert_strictly_increasing(t: &AvlTree<u32, u32>) -> Vec<u32> {
    let keys = t.keys();
    assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys out of order");
    assert_eq!(keys.len(), t.len());
    keys
}

fn tree_from(keys: &[u32]) -> AvlTree<u32, u32> {
    let mut t = AvlTree::new();
    for &k in keys {
        t.insert(k, k).unwrap();
    }
    t
}

fn permutations_strategy(max: u32) -> impl Strategy<Value = (Vec<u32>, Vec<u32>)> {
    (0..=max).prop_flat_map(|n| {
        let keys: Vec<u32> = (1..=n).collect();
        (Just(keys.clone()).prop_shuffle(), Just(keys).prop_shuffle())
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=500)) {
        let mut t: AvlTree<u32, u32> = AvlTree::new();
        let mut m: BTreeMap<u32, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    let res = t.insert(key, key * 2);
                    if m.insert(key, key * 2).is_some() {
                        prop_assert_eq!(res, Err(Error::DuplicateKey));
                    } else {
                        prop_assert!(res.is_ok());
                    }
                }
                Op::Delete(key) => match t.search(&key) {
                    Some(node) => {
                        prop_assert!(t.delete(node).is_ok());
                        prop_assert!(m.remove(&key).is_some());
                    }
                    None => {
                        prop_assert!(!m.contains_key(&key));
                    }
                },
                Op::Search(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key).copied());
                }
            }

            t.assert_invariants();
            prop_assert_eq!(t.len(), m.len());
        }

        assert_strictly_increasing(&t);
        let expected: Vec<(u32, u32)> = m.into_iter().collect();
        prop_assert_eq!(t.to_vec(), expected);
    }

    #[test]
    fn prop_insert_delete_round_trip((insert_order, delete_order) in permutations_strategy(300)) {
        let mut t = tree_from(&insert_order);
        t.assert_invariants();
        prop_assert_eq!(t.len(), insert_order.len());

        for key in delete_order {
            let node = t.search(&key).expect("inserted key is present");
            t.delete(node).unwrap();
            t.assert_invariants();
        }
        prop_assert_eq!(t.len(), 0);
        prop_assert!(t.is_empty());
    }

    #[test]
    fn prop_split_partitions_keys(
        keys in prop::collection::btree_set(0u32..1000, 1..300),
        pick in any::<prop::sample::Index>(),
    ) {
        let keys: Vec<u32> = keys.into_iter().collect();
        let pivot = keys[pick.index(keys.len())];
        let t = tree_from(&keys);
        let node = t.search(&pivot).unwrap();

        let (left, right) = t.split(node).unwrap();
        left.assert_invariants();
        right.assert_invariants();

        let left_keys = assert_strictly_increasing(&left);
        let right_keys = assert_strictly_increasing(&right);
        prop_assert!(left_keys.iter().all(|&k| k < pivot));
        prop_assert!(right_keys.iter().all(|&k| k > pivot));

        let mut combined = left_keys;
        combined.push(pivot);
        combined.extend(right_keys);
        prop_assert_eq!(combined, keys);
    }

    #[test]
    fn prop_join_concatenates(
        keys in prop::collection::btree_set(0u32..10_000, 0..300),
        separator in 0u32..10_000,
        shared_storage in any::<bool>(),
    ) {
        let left_keys: Vec<u32> = keys.range(..separator).copied().collect();
        let right_keys: Vec<u32> = keys.range(separator + 1..).copied().collect();

        let left = tree_from(&left_keys);
        let right = if shared_storage {
            let mut right = left.new_sibling();
            for &k in &right_keys {
                right.insert(k, k).unwrap();
            }
            right
        } else {
            tree_from(&right_keys)
        };
        let expected_cost = left.height().abs_diff(right.height()) as usize + 1;

        let (joined, cost) = left.join(separator, separator, right).unwrap();
        joined.assert_invariants();
        prop_assert_eq!(cost, expected_cost);

        let mut expected = left_keys;
        expected.push(separator);
        expected.extend(right_keys);
        prop_assert_eq!(joined.keys(), expected);
    }

    #[test]
    fn prop_select_rank_inverse(keys in prop::collection::btree_set(0u32..5000, 0..200)) {
        let keys: Vec<u32> = keys.into_iter().collect();
        let mut shuffled = keys.clone();
        shuffled.reverse();
        let t = tree_from(&shuffled);
        for (i, &k) in keys.iter().enumerate() {
            let node = t.select(i).unwrap();
            prop_assert_eq!(t.key(node), Ok(k));
            prop_assert_eq!(t.rank(node), Ok(i));
        }
        prop_assert!(t.select(keys.len()).is_none());
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();

    for_each_permutation(&keys, |perm| {
        let t = tree_from(&perm);
        t.assert_invariants();
        assert_eq!(t.keys(), keys);
        // Seven keys fit in an AVL tree of height 2 or 3.
        assert!((2..=3).contains(&t.height()));
    });
}

#[test]
fn exhaustive_delete_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();
    let base = tree_from(&[4, 2, 6, 1, 3, 5, 7]);

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        let mut remaining: BTreeSet<u32> = keys.iter().copied().collect();

        for k in perm {
            let node = t.search(&k).unwrap();
            t.delete(node).unwrap();
            remaining.remove(&k);
            t.assert_invariants();
            assert_eq!(t.keys(), remaining.iter().copied().collect::<Vec<_>>());
        }
        assert!(t.is_empty());
    });
}

#[test]
fn exhaustive_split_every_node_every_shape() {
    let keys: Vec<u32> = (1..=6).collect();

    for_each_permutation(&keys, |perm| {
        for &pivot in &keys {
            let t = tree_from(&perm);
            let node = t.search(&pivot).unwrap();
            let (left, right) = t.split(node).unwrap();
            left.assert_invariants();
            right.assert_invariants();
            assert_eq!(left.keys(), (1..pivot).collect::<Vec<_>>());
            assert_eq!(right.keys(), (pivot + 1..=6).collect::<Vec<_>>());
        }
    });
}
