//! Property-based tests for the entry invariant.
//!
//! Random put/delete sequences are replayed against a collection and a
//! plain map; afterwards every index namespace must hold exactly the
//! entries derived from the map.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use indexkv::observability::NullSink;
use indexkv::{
    Collection, CollectionConfig, IndexDefinition, IndexKey, KeyEncoding, MemoryStore,
    SortableEncoding,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Doc {
    age: Option<i64>,
    tag: Option<String>,
}

#[derive(Debug, Clone)]
enum Op {
    Put(String, Doc),
    Delete(String),
}

type Docs = Collection<Doc, MemoryStore>;

/// Strategy for a small key space so that overwrites and deletes collide.
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![Just("k1"), Just("k2"), Just("k3"), Just("k10")].prop_map(String::from)
}

fn arb_doc() -> impl Strategy<Value = Doc> {
    (
        prop::option::of(-3i64..3),
        prop::option::of("[ab]{0,2}"),
    )
        .prop_map(|(age, tag)| Doc { age, tag })
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_key(), arb_doc()).prop_map(|(k, d)| Op::Put(k, d)),
        1 => arb_key().prop_map(Op::Delete),
    ]
}

fn open(minimize: bool) -> (Docs, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = CollectionConfig {
        minimize_index_writes: minimize,
        ..CollectionConfig::default()
    };
    let docs = Collection::open_with(
        Arc::clone(&store),
        "docs",
        vec![
            ("byAge", IndexDefinition::getter(|d: &Doc| d.age.map(IndexKey::from))),
            ("byTag", IndexDefinition::field("tag")),
        ],
        config,
        Arc::new(NullSink),
    )
    .unwrap();
    (docs, store)
}

/// Entries of `index` as stored, decoded back to `(value, key)`
fn stored_entries(docs: &Docs, store: &MemoryStore, index: &str) -> Vec<(IndexKey, IndexKey)> {
    let ns = docs.index_namespace(index).unwrap();
    store
        .entries(ns)
        .unwrap()
        .into_iter()
        .map(|(key, value)| {
            assert!(value.is_empty());
            let mut parts = ns.encoding().decode_composite(&key).unwrap();
            let pk = parts.pop().unwrap();
            (parts.pop().unwrap(), pk)
        })
        .collect()
}

/// Entries the model says `index` should hold, in order
fn expected_entries<F>(model: &BTreeMap<String, Doc>, getter: F) -> Vec<(IndexKey, IndexKey)>
where
    F: Fn(&Doc) -> Option<IndexKey>,
{
    model
        .iter()
        .filter_map(|(key, doc)| getter(doc).map(|value| (value, IndexKey::from(key))))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn entries_match_model(
        ops in prop::collection::vec(arb_op(), 1..40),
        minimize in any::<bool>(),
    ) {
        let (docs, store) = open(minimize);
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                Op::Put(key, doc) => {
                    docs.put(key.as_str(), &doc).unwrap();
                    model.insert(key, doc);
                }
                Op::Delete(key) => {
                    docs.delete(key.as_str()).unwrap();
                    model.remove(&key);
                }
            }
        }

        let by_age = expected_entries(&model, |d| d.age.map(IndexKey::from));
        let by_tag = expected_entries(&model, |d| d.tag.as_ref().map(IndexKey::from));
        prop_assert_eq!(stored_entries(&docs, &store, "byAge"), by_age);
        prop_assert_eq!(stored_entries(&docs, &store, "byTag"), by_tag);

        for (key, doc) in &model {
            let stored = docs.get(key.as_str()).unwrap();
            prop_assert_eq!(stored.as_ref(), Some(doc));
        }
        prop_assert_eq!(store.len(docs.primary_namespace()).unwrap(), model.len());
    }

    #[test]
    fn query_matches_model(ops in prop::collection::vec(arb_op(), 1..40), probe in "[ab]{0,2}") {
        let (docs, _store) = open(true);
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                Op::Put(key, doc) => {
                    docs.put(key.as_str(), &doc).unwrap();
                    model.insert(key, doc);
                }
                Op::Delete(key) => {
                    docs.delete(key.as_str()).unwrap();
                    model.remove(&key);
                }
            }
        }

        let expected: Vec<Doc> = model
            .values()
            .filter(|doc| doc.tag.as_deref() == Some(probe.as_str()))
            .cloned()
            .collect();
        prop_assert_eq!(docs.query("byTag", probe.as_str()).unwrap(), expected);
    }

    #[test]
    fn sortable_order_matches_int_order(a in any::<i64>(), b in any::<i64>()) {
        let enc = SortableEncoding;
        let ea = enc.encode(&IndexKey::Int(a)).unwrap();
        let eb = enc.encode(&IndexKey::Int(b)).unwrap();
        prop_assert_eq!(ea.cmp(&eb), a.cmp(&b));
    }

    #[test]
    fn sortable_order_matches_string_order(a in ".{0,8}", b in ".{0,8}") {
        let enc = SortableEncoding;
        let ea = enc.encode(&IndexKey::from(a.as_str())).unwrap();
        let eb = enc.encode(&IndexKey::from(b.as_str())).unwrap();
        prop_assert_eq!(ea.cmp(&eb), a.cmp(&b));
    }

    #[test]
    fn sortable_order_matches_float_order(
        a in any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
        b in any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
    ) {
        let enc = SortableEncoding;
        let ea = enc.encode(&IndexKey::from(a)).unwrap();
        let eb = enc.encode(&IndexKey::from(b)).unwrap();
        if a < b {
            prop_assert!(ea < eb);
        } else if a > b {
            prop_assert!(ea > eb);
        }
    }
}
