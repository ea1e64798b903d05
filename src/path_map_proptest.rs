#![cfg(test)]

// Property tests for PathMap kept inside the crate so they can reach the
// crate-private write path as well as the public surface.

use crate::level::BTreeLevel;
use crate::{Error, Key, Path, PathMap};
use proptest::prelude::*;
use std::collections::BTreeMap;

type Model = BTreeMap<Vec<Key>, i32>;

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, i32),
    Remove(Vec<u8>),
    Pop(Vec<u8>),
    Lookup(Vec<u8>),
    PopItem,
    SetDefault(Vec<u8>, i32),
}

fn keys_of(raw: &[u8]) -> Vec<Key> {
    raw.iter()
        .map(|b| Key::from(["a", "b", "c"][*b as usize % 3]))
        .collect()
}

fn arb_path() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..3, 1..=3)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_path(), any::<i32>()).prop_map(|(p, v)| Op::Insert(p, v)),
        2 => arb_path().prop_map(Op::Remove),
        1 => arb_path().prop_map(Op::Pop),
        2 => arb_path().prop_map(Op::Lookup),
        1 => Just(Op::PopItem),
        1 => (arb_path(), any::<i32>()).prop_map(|(p, v)| Op::SetDefault(p, v)),
    ]
}

fn is_proper_prefix(prefix: &[Key], of: &[Key]) -> bool {
    prefix.len() < of.len() && of.starts_with(prefix)
}

/// Model insert: leaves on the way become levels, a level at the target
/// becomes a leaf.
fn model_insert(model: &mut Model, path: Vec<Key>, v: i32) {
    model.retain(|k, _| !is_proper_prefix(k, &path) && !is_proper_prefix(&path, k));
    model.insert(path, v);
}

/// Model remove: a leaf, or the whole subtree under a level. Empty levels
/// never exist in the model, which mirrors pruning.
fn model_remove(model: &mut Model, path: &[Key]) -> bool {
    if model.remove(path).is_some() {
        return true;
    }
    let before = model.len();
    model.retain(|k, _| !is_proper_prefix(path, k));
    model.len() != before
}

fn model_contains(model: &Model, path: &[Key]) -> bool {
    model.contains_key(path) || model.keys().any(|k| is_proper_prefix(path, k))
}

// Property: state-machine equivalence against a flat BTreeMap of leaf paths.
// Invariants exercised across random operation sequences:
// - len() equals the number of leaf paths.
// - contains/lookup agree with the model for leaves and levels.
// - remove prunes emptied levels: no level is ever present but empty.
// - popitem removes the first path in enumeration order.
// - enumeration (sorted levels) equals the model's key order.
proptest! {
    #[test]
    fn prop_path_map_matches_flat_model(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let mut m: PathMap<i32, BTreeLevel<i32>> = PathMap::new();
        let mut model = Model::new();

        for op in ops {
            match op {
                Op::Insert(raw, v) => {
                    let path = keys_of(&raw);
                    m.insert(Path::from(path.clone()), v).unwrap();
                    model_insert(&mut model, path, v);
                }
                Op::Remove(raw) => {
                    let path = keys_of(&raw);
                    let removed = model_remove(&mut model, &path);
                    match m.remove(Path::from(path)) {
                        Ok(()) => prop_assert!(removed),
                        Err(Error::KeyNotFound { .. }) => prop_assert!(!removed),
                        Err(other) => prop_assert!(false, "unexpected error: {other}"),
                    }
                }
                Op::Pop(raw) => {
                    let path = keys_of(&raw);
                    let expected = model.get(&path).copied();
                    let res = m.pop(Path::from(path.clone()));
                    if let Some(v) = expected {
                        prop_assert_eq!(res.ok().and_then(|i| i.into_leaf()), Some(v));
                    } else {
                        prop_assert_eq!(res.is_ok(), model_contains(&model, &path));
                    }
                    model_remove(&mut model, &path);
                }
                Op::Lookup(raw) => {
                    let path = keys_of(&raw);
                    let got = m.lookup(Path::from(path.clone()));
                    match model.get(&path) {
                        Some(v) => prop_assert_eq!(got.ok().and_then(|i| i.into_leaf()), Some(*v)),
                        None => prop_assert_eq!(got.is_ok(), model_contains(&model, &path)),
                    }
                }
                Op::PopItem => {
                    let first = model.keys().next().cloned();
                    match (m.popitem(), first) {
                        (Ok((path, v)), Some(expected)) => {
                            prop_assert_eq!(path.keys(), expected.as_slice());
                            prop_assert_eq!(model.remove(&expected), Some(v));
                        }
                        (Err(Error::Empty), None) => {}
                        (got, want) => prop_assert!(false, "popitem mismatch: {:?} vs {:?}", got, want),
                    }
                }
                Op::SetDefault(raw, v) => {
                    let path = keys_of(&raw);
                    let existed = model_contains(&model, &path);
                    let got = m.setdefault(Path::from(path.clone()), v).unwrap();
                    if !existed {
                        prop_assert_eq!(got.into_leaf(), Some(v));
                        model_insert(&mut model, path, v);
                    } else if let Some(old) = model.get(&path) {
                        prop_assert_eq!(got.into_leaf(), Some(*old));
                    }
                }
            }

            prop_assert_eq!(m.len(), model.len());
        }

        let flat: Vec<(Vec<Key>, i32)> = m.iter().map(|(p, v)| (p.into_keys(), v)).collect();
        let expected: Vec<(Vec<Key>, i32)> = model.into_iter().collect();
        prop_assert_eq!(flat, expected);
    }
}

// Property: a soft merge equals inserting every source leaf in order, and a
// hard merge replaces exactly the named top-level keys.
proptest! {
    #[test]
    fn prop_soft_and_hard_merge(
        base in proptest::collection::vec((arb_path(), any::<i32>()), 0..20),
        src in proptest::collection::vec((arb_path(), any::<i32>()), 0..20),
    ) {
        let build = |pairs: &[(Vec<u8>, i32)]| -> PathMap<i32, BTreeLevel<i32>> {
            pairs.iter().map(|(p, v)| (Path::from(keys_of(p)), *v)).collect()
        };
        let source = build(&src);

        let mut soft = build(&base);
        let mut expected = build(&base);
        soft.update(&source);
        for (path, v) in source.iter() {
            expected.insert(path, v).unwrap();
        }
        prop_assert_eq!(&soft, &expected);

        let mut hard = build(&base);
        let tree = source.to_tree();
        hard.update(tree.clone());
        for (key, node) in &tree {
            let sub = hard.lookup(key.clone()).unwrap();
            match node {
                crate::Node::Leaf(v) => prop_assert_eq!(sub.into_leaf(), Some(*v)),
                crate::Node::Tree(t) => {
                    let view = sub.into_map().unwrap();
                    prop_assert!(view == *t);
                }
            }
        }
        for key in base.iter().map(|(p, _)| keys_of(p)[0].clone()) {
            prop_assert!(hard.contains(key));
        }
    }
}
