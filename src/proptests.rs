use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, VecDeque};

fn key_strategy() -> impl Strategy<Value = String> {
    // A small key space so that removes and searches hit often, plus some
    // non-numeric keys that all land in the fallback bucket.
    prop_oneof![
        4 => "[0-9]{1,3}",
        1 => "[a-c]{1,2}",
    ]
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "key_strategy()")] String),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "key_strategy()")] String),
    #[proptest(weight = 2)]
    Search(#[proptest(strategy = "key_strategy()")] String),
}

fn rec(key: &str, tag: u32) -> Record {
    Record::new(key, format!("t{tag}"), "fund", f64::from(tag))
}

fn distinct_keys() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[0-9a-z]{1,6}", 0..200)
        .prop_map(|keys| keys.into_iter().collect::<Vec<_>>())
}

/// Keys in a random insertion order, and the same keys in an independent
/// random removal order.
fn insert_and_remove_orders() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    distinct_keys()
        .prop_flat_map(|keys| (Just(keys.clone()).prop_shuffle(), Just(keys).prop_shuffle()))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_tree_matches_multiset(ops in prop::collection::vec(any::<Op>(), 0..=1000)) {
        let mut t = OrderedTreeStore::new();
        let mut m: BTreeMap<String, usize> = BTreeMap::new();

        for (tag, op) in ops.into_iter().enumerate() {
            match op {
                Op::Insert(key) => {
                    t.insert(rec(&key, tag as u32));
                    *m.entry(key).or_default() += 1;
                }
                Op::Remove(key) => {
                    let expected = match m.get_mut(&key) {
                        Some(n) => {
                            *n -= 1;
                            if *n == 0 {
                                m.remove(&key);
                            }
                            true
                        }
                        None => false,
                    };
                    prop_assert_eq!(t.remove(&key), expected);
                }
                Op::Search(key) => {
                    let found = t.search(&key);
                    prop_assert_eq!(found.is_some(), m.contains_key(&key));
                    if let Some(record) = found {
                        prop_assert_eq!(&record.key, &key);
                    }
                }
            }

            prop_assert_eq!(t.len(), m.values().sum::<usize>());
        }

        t.assert_invariants();
        let got: Vec<String> = t.iter().map(|r| r.key.clone()).collect();
        let expected: Vec<String> = m
            .iter()
            .flat_map(|(k, n)| std::iter::repeat(k.clone()).take(*n))
            .collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_hash_matches_fifo_model(
        table_size in 1u32..12,
        ops in prop::collection::vec(any::<Op>(), 0..=1000),
    ) {
        let mut h = ChainedHashStore::with_table_size(table_size).unwrap();
        let mut m: BTreeMap<String, VecDeque<u32>> = BTreeMap::new();

        for (tag, op) in ops.into_iter().enumerate() {
            let tag = tag as u32;
            match op {
                Op::Insert(key) => {
                    h.insert(rec(&key, tag));
                    m.entry(key).or_default().push_back(tag);
                }
                Op::Remove(key) => {
                    let expected = match m.get_mut(&key) {
                        Some(tags) => {
                            tags.pop_front();
                            if tags.is_empty() {
                                m.remove(&key);
                            }
                            true
                        }
                        None => false,
                    };
                    prop_assert_eq!(h.remove(&key), expected);
                }
                Op::Search(key) => {
                    let got = h.search(&key).map(|r| r.amount);
                    let expected = m.get(&key).and_then(|tags| tags.front()).map(|&t| f64::from(t));
                    prop_assert_eq!(got, expected);
                }
            }
        }

        h.assert_invariants();
        let mut got: Vec<(String, u32)> =
            h.iter().map(|(_, r)| (r.key.clone(), r.amount as u32)).collect();
        got.sort();
        let mut expected: Vec<(String, u32)> = m
            .iter()
            .flat_map(|(k, tags)| tags.iter().map(move |&t| (k.clone(), t)))
            .collect();
        expected.sort();
        prop_assert_eq!(got, expected);

        let buckets: Vec<u32> = h.iter().map(|(b, _)| b).collect();
        prop_assert!(buckets.windows(2).all(|w| w[0] <= w[1]), "buckets must enumerate ascending");
    }

    #[test]
    fn prop_insert_search_remove_all((inserts, removes) in insert_and_remove_orders()) {
        let mut stores: Vec<Box<dyn RecordStore>> = vec![
            Box::new(OrderedTreeStore::new()),
            Box::new(ChainedHashStore::with_table_size(7).unwrap()),
        ];

        for store in &mut stores {
            for (i, key) in inserts.iter().enumerate() {
                let r = rec(key, i as u32);
                store.insert(r.clone());
                prop_assert_eq!(store.search(key), Some(&r));
            }
            prop_assert_eq!(store.len(), inserts.len());

            for key in &removes {
                prop_assert!(store.remove(key), "{} lost {}", store.backend_name(), key);
                prop_assert!(store.search(key).is_none());
            }
            prop_assert!(store.is_empty());
            prop_assert!(store.records().is_empty());
        }
    }

    #[test]
    fn prop_tree_in_order_is_sorted(keys in prop::collection::vec("[0-9a-z]{0,4}", 0..300)) {
        let t: OrderedTreeStore = keys.iter().map(|k| rec(k, 0)).collect();
        t.assert_invariants();
        let got: Vec<&str> = t.iter().map(|r| r.key.as_str()).collect();
        prop_assert!(got.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(got.len(), keys.len());
    }

    #[test]
    fn prop_missing_remove_leaves_output_unchanged(
        keys in distinct_keys(),
        missing in "[A-Z]{1,4}",
    ) {
        let mut tree: OrderedTreeStore = keys.iter().map(|k| rec(k, 1)).collect();
        let mut hash = ChainedHashStore::with_table_size(5).unwrap();
        hash.extend(keys.iter().map(|k| rec(k, 1)));

        let tree_before = tree.records();
        let hash_before = hash.records();
        prop_assert!(!tree.remove(&missing));
        prop_assert!(!hash.remove(&missing));
        prop_assert_eq!(tree.records(), tree_before);
        prop_assert_eq!(hash.records(), hash_before);
    }

    #[test]
    fn prop_colliding_keys_survive_head_removal(
        table_size in 1u32..50,
        multiples in prop::collection::btree_set(0u32..1000, 2..20),
        bucket_seed in any::<u32>(),
    ) {
        // Keys `bucket + k * table_size` all share one bucket.
        let bucket = bucket_seed % table_size;
        let keys: Vec<String> = multiples
            .iter()
            .map(|k| (u64::from(bucket) + u64::from(*k) * u64::from(table_size)).to_string())
            .collect();

        let mut h = ChainedHashStore::with_table_size(table_size).unwrap();
        h.extend(keys.iter().map(|k| rec(k, 2)));
        prop_assert_eq!(h.bucket(bucket).len(), keys.len());

        prop_assert!(h.remove(&keys[0]));
        prop_assert!(h.search(&keys[0]).is_none());
        for key in &keys[1..] {
            prop_assert!(h.search(key).is_some());
        }
        let head = h.bucket(bucket).first().map(|r| r.key.clone());
        prop_assert_eq!(head.as_ref(), keys.get(1));
        h.assert_invariants();
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

const SMALL_SET: [&str; 6] = ["30", "15", "45", "10", "20", "3"];

#[test]
fn exhaustive_insert_order_small_set() {
    for_each_permutation(&SMALL_SET, |perm| {
        let t: OrderedTreeStore = perm.iter().map(|k| rec(k, 0)).collect();
        t.assert_invariants();

        let got: Vec<&str> = t.iter().map(|r| r.key.as_str()).collect();
        let mut expected = SMALL_SET.to_vec();
        expected.sort();
        assert_eq!(got, expected);
        assert_eq!(t.root().map(|r| r.key.as_str()), perm.first().copied());
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    // Insert in a fixed order, then remove in all permutations.
    for_each_permutation(&SMALL_SET, |perm| {
        let mut t: OrderedTreeStore = SMALL_SET.iter().map(|k| rec(k, 0)).collect();
        let mut h = ChainedHashStore::with_table_size(5).unwrap();
        h.extend(SMALL_SET.iter().map(|k| rec(k, 0)));

        let mut remaining: Vec<&str> = SMALL_SET.to_vec();
        for k in perm {
            assert!(t.remove(k));
            assert!(h.remove(k));
            remaining.retain(|r| *r != k);

            t.assert_invariants();
            h.assert_invariants();
            let mut got: Vec<String> = t.records().into_iter().map(|r| r.key).collect();
            got.sort();
            let mut expected: Vec<String> = remaining.iter().map(|s| s.to_string()).collect();
            expected.sort();
            assert_eq!(got, expected);
            for r in &remaining {
                assert!(t.contains_key(r));
                assert!(h.contains_key(r));
            }
        }
        assert!(t.is_empty());
        assert!(t.root().is_none());
        assert!(h.is_empty());
    });
}
