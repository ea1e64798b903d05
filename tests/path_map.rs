// PathMap integration suite.
//
// Each test documents the behavior it verifies. The core invariants:
// - Normalization: opaque tuples stay whole, every other nesting flattens.
// - Round-trip: insert(p, v) then lookup(p) yields v.
// - Pruning: no level is left present but empty after a removal.
// - Merges: PathMap sources merge softly, plain trees hard.
// - len() counts leaves, not top-level keys.
// - Equality is structural over the nested form.
use plane_map::{
    normalize, path, tree, Error, IntoPath, Item, Key, Level, Node, OrderedPathMap, PathMap,
    Segment, Slot, SortedPathMap,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn sample() -> OrderedPathMap<&'static str> {
    PathMap::from(tree! {
        "key1" => { "key2" => "val2", "key3" => "val3" },
        "key4" => { "key5" => { "key6" => "val6" } },
    })
}

// Test: path normalization.
// Verifies: lists and lazy iterators flatten in order; tuple keys do not.
#[test]
fn normalization_keeps_tuples_whole() {
    let p = normalize(path![1, path![2, path![3]], 4, (5, 6), Segment::lazy(vec![7, 8])]);
    assert_eq!(p.len(), 7);
    assert_eq!(p[3], Key::from(4));
    assert_eq!(p[4], Key::from((5, 6)));
    assert_eq!(p[6], Key::from(8));
}

// Test: tuple keys address a single entry at one level.
#[test]
fn tuple_key_is_one_level() {
    let mut m: PathMap<i32> = PathMap::new();
    m.insert(path![(1, 2), "x"], 10).unwrap();
    assert_eq!(m.lookup([Key::from((1, 2)), Key::from("x")]).unwrap().into_leaf(), Some(10));
    assert!(!m.contains(path![1, 2, "x"]));
}

// Test: construction from pairs equals construction from a tree.
#[test]
fn init_from_pairs() {
    let pairs: PathMap<i32> = vec![(1i64, 2), (3, 4)].into_iter().collect();
    let from_tree: PathMap<i32> = PathMap::from(tree! { 1 => 2, 3 => 4 });
    assert_eq!(pairs, from_tree);
}

#[test]
fn iter_order_and_len() {
    let m = sample();
    let keys: Vec<_> = m.keys().collect();
    assert_eq!(
        keys,
        vec![
            ["key1", "key2"].into_path(),
            ["key1", "key3"].into_path(),
            ["key4", "key5", "key6"].into_path(),
        ]
    );
    assert_eq!(m.values().collect::<Vec<_>>(), ["val2", "val3", "val6"]);
    assert_eq!(m.len(), 3);
}

// Test: Debug renders the nested form, not the flattened paths.
#[test]
fn debug_is_nested_form() {
    let m = sample();
    assert_eq!(
        format!("{:?}", m),
        r#"{"key1": {"key2": "val2", "key3": "val3"}, "key4": {"key5": {"key6": "val6"}}}"#
    );
}

#[test]
fn getitem_and_missing() {
    let m = sample();
    assert_eq!(m.lookup(["key4", "key5", "key6"]).unwrap().into_leaf(), Some("val6"));
    let err = m.lookup(path![path!["key4", "key5", "key6"], path![2]]).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn setitem_roundtrip() {
    init_tracing();
    let mut m = sample();
    let path = ["key1", "key2", "key10"];
    m.insert(path, "1").unwrap();
    assert_eq!(m.lookup(path).unwrap().into_leaf(), Some("1"));
}

// Test: removal with pruning, and failures on paths through leaves.
#[test]
fn delitem_prunes_and_rejects_bad_paths() {
    init_tracing();
    let mut m = sample();
    m.remove(["key4", "key5", "key6"]).unwrap();
    assert_eq!(m, tree! { "key1" => { "key3" => "val3", "key2" => "val2" } });

    let err = m.remove(path![path!["key1", "key2"], path![1]]).unwrap_err();
    assert!(matches!(err, Error::KeyNotFound { .. }));
    let err = m.remove(path![path!["key1", "key2"], path![1, 2]]).unwrap_err();
    assert!(matches!(err, Error::KeyNotFound { .. }));
}

// Test: the classic three-level chain empties completely.
#[test]
fn pruning_empties_chain() {
    let mut m: PathMap<i32> = PathMap::from(tree! { "a" => { "b" => { "c" => 1 } } });
    m.remove(["a", "b", "c"]).unwrap();
    assert_eq!(m.len(), 0);
    assert!(m.get_raw("a").is_none());
}

// Test: get returns a write-through view; get_raw the bare container.
#[test]
fn get_view_and_raw() {
    let m = sample();
    let view = m.get("key1").and_then(Item::into_map).expect("view");
    assert_eq!(view, tree! { "key2" => "val2", "key3" => "val3" });
    assert_eq!(view, PathMap::<&str>::from(tree! { "key2" => "val2", "key3" => "val3" }));

    match m.get_raw("key1") {
        Some(Slot::Nested(level)) => {
            let level = level.borrow();
            assert_eq!(level.len(), 2);
            assert!(level.contains_key(&Key::from("key3")));
        }
        _ => panic!("expected a nested container"),
    }
}

#[test]
fn clear_empties() {
    let mut m = sample();
    m.clear();
    assert!(m.is_empty());
    assert_eq!(format!("{:?}", m), "{}");
}

#[test]
fn pop_with_and_without_default() {
    let mut m: OrderedPathMap<Option<&str>> = PathMap::from(tree! {
        "key4" => { "key5" => { "key6" => (Some("val6")) } },
    });
    let mut path = vec!["key4", "key5", "key6"];
    assert_eq!(m.pop_or(path.clone(), None).unwrap().into_leaf(), Some(Some("val6")));
    path.pop();
    assert_eq!(m.pop_or(path.clone(), None).unwrap().into_leaf(), Some(None));
    path.pop();
    assert_eq!(m.pop_or(path.clone(), None).unwrap().into_leaf(), Some(None));
    assert!(matches!(m.pop(path), Err(Error::KeyNotFound { .. })));
}

#[test]
fn popitem_then_empty() {
    let mut m = sample();
    assert_eq!(m.popitem().unwrap(), (["key1", "key2"].into_path(), "val2"));
    assert_eq!(m.popitem().unwrap(), (["key1", "key3"].into_path(), "val3"));
    assert_eq!(m.popitem().unwrap(), (["key4", "key5", "key6"].into_path(), "val6"));
    let err = m.popitem().unwrap_err();
    assert_eq!(err, Error::Empty);
    assert!(err.is_not_found());
}

#[test]
fn setdefault_creates_levels() {
    let mut m: OrderedPathMap<Option<&str>> = PathMap::from(tree! {
        "key1" => { "key2" => (Some("val2")), "key3" => (Some("val3")) },
    });
    assert_eq!(m.setdefault(["key1", "key2"], None).unwrap().into_leaf(), Some(Some("val2")));
    assert_eq!(m.setdefault(["key1", "key7", "key8", "key9"], None).unwrap().into_leaf(), Some(None));
    let key1 = m.get("key1").and_then(Item::into_map).unwrap();
    assert_eq!(
        key1.to_tree(),
        tree! {
            "key2" => (Some("val2")),
            "key3" => (Some("val3")),
            "key7" => { "key8" => { "key9" => None } },
        }
    );
}

// Test: soft then hard update on the same map.
#[test]
fn update_soft_then_hard() {
    init_tracing();
    let mut m = sample();
    let update = tree! { "key1" => { "key10" => "val10" } };

    m.update(OrderedPathMap::from(update.clone()));
    assert_eq!(
        m.to_tree(),
        tree! {
            "key1" => { "key2" => "val2", "key3" => "val3", "key10" => "val10" },
            "key4" => { "key5" => { "key6" => "val6" } },
        }
    );

    m.update(update);
    assert_eq!(
        m.to_tree(),
        tree! {
            "key1" => { "key10" => "val10" },
            "key4" => { "key5" => { "key6" => "val6" } },
        }
    );
}

#[test]
fn items_pair_paths_with_values() {
    let m = sample();
    let items: Vec<_> = m.items().collect();
    assert_eq!(
        items,
        vec![
            (["key1", "key2"].into_path(), "val2"),
            (["key1", "key3"].into_path(), "val3"),
            (["key4", "key5", "key6"].into_path(), "val6"),
        ]
    );
}

#[test]
fn contains_paths() {
    let m = sample();
    assert!(m.contains(vec!["key1", "key2"]));
    assert!(!m.contains(vec!["key1", "missed_key"]));
}

// Test: equality with maps and plain trees, including across level types.
#[test]
fn eq_and_ne() {
    let m = sample();
    let eq = tree! {
        "key1" => { "key2" => "val2", "key3" => "val3" },
        "key4" => { "key5" => { "key6" => "val6" } },
    };
    assert_eq!(m, eq);
    assert_eq!(m, PathMap::<&str>::from(eq.clone()));
    assert_eq!(m, SortedPathMap::from(eq));

    let ne = tree! { "key1" => { "key2" => "val2", "key3" => "val3" } };
    assert_ne!(m, PathMap::<&str>::from(ne.clone()));
    assert_ne!(m, ne);

    let mut leaf_differs = m.clone();
    leaf_differs.insert(["key4", "key5", "key6"], "other").unwrap();
    assert_ne!(m, leaf_differs);
}

// Test: len counts leaves regardless of depth.
#[test]
fn len_counts_leaves_not_levels() {
    let mut m: PathMap<i32> = PathMap::new();
    m.insert(["a", "b", "c", "d", "e"], 1).unwrap();
    m.insert("f", 2).unwrap();
    m.insert_tree("g", tree! { "h" => {} }).unwrap();
    assert_eq!(m.len(), 2);
}

// Test: a hard merge accepts top-level pairs too.
#[test]
fn hard_merge_from_pairs() {
    let mut m = sample();
    m.update(vec![("key1", Node::Leaf("flat"))]);
    assert_eq!(m.lookup("key1").unwrap().into_leaf(), Some("flat"));
    assert_eq!(m.len(), 2);
}

// Test: deleting the last leaf through a view prunes the emptied level
// from the owning map.
#[test]
fn delete_through_view_prunes_parent() {
    init_tracing();
    let mut m = sample();
    let mut key5 = m.get(["key4", "key5"]).and_then(Item::into_map).unwrap();
    key5.remove("key6").unwrap();
    assert!(!m.contains("key4"));
    assert_eq!(m, tree! { "key1" => { "key2" => "val2", "key3" => "val3" } });
}

// Test: nested Vec input flattens into one path.
#[test]
fn nested_vec_paths() {
    let mut m: PathMap<i32> = PathMap::new();
    m.insert(vec![vec!["a", "b"], vec!["c"]], 1).unwrap();
    assert_eq!(m.lookup(path![vec!["a", "b"], "c"]).unwrap().into_leaf(), Some(1));
    assert!(m.contains(["a", "b"]));
}

// Test: a view survives its level being pruned, detached from the parent.
#[test]
fn view_detaches_after_prune() {
    let mut m = sample();
    let view = m.get(["key4", "key5"]).and_then(Item::into_map).unwrap();
    m.remove(["key4", "key5", "key6"]).unwrap();
    assert!(view.is_empty());
    assert!(!m.contains("key4"));

    let mut view = view;
    view.insert("again", "x").unwrap();
    assert!(!m.contains("key4"));
}
