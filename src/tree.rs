//! Plain nested mappings.
//!
//! [`Tree`] is a detached, insertion-ordered nested mapping. It seeds a
//! PathMap, drives hard merges, and is what [`PathMap::to_tree`] exports.
//! Converting a tree into a PathMap re-homes every level onto the map's
//! level factory.
//!
//! [`PathMap::to_tree`]: crate::PathMap::to_tree

use crate::key::Key;
use crate::level::{Level, Slot};
use core::cell::RefCell;
use indexmap::IndexMap;
use std::rc::Rc;

pub type Tree<V> = IndexMap<Key, Node<V>>;

#[derive(Clone, Debug, PartialEq)]
pub enum Node<V> {
    Leaf(V),
    Tree(Tree<V>),
}

impl<V> Node<V> {
    pub fn as_leaf(&self) -> Option<&V> {
        match self {
            Node::Leaf(v) => Some(v),
            Node::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree<V>> {
        match self {
            Node::Leaf(_) => None,
            Node::Tree(t) => Some(t),
        }
    }
}

impl<V> From<Tree<V>> for Node<V> {
    fn from(t: Tree<V>) -> Self {
        Node::Tree(t)
    }
}

impl<V> Node<V> {
    pub(crate) fn into_slot<M: Level<V>>(self) -> Slot<V, M> {
        match self {
            Node::Leaf(v) => Slot::Leaf(v),
            Node::Tree(t) => Slot::Nested(Rc::new(RefCell::new(tree_to_level(t)))),
        }
    }
}

pub(crate) fn tree_to_level<V, M: Level<V>>(tree: Tree<V>) -> M {
    let mut level = M::default();
    for (key, node) in tree {
        level.insert(key, node.into_slot());
    }
    level
}

pub(crate) fn level_to_tree<V: Clone, M: Level<V>>(level: &M) -> Tree<V> {
    level
        .iter()
        .map(|(key, slot)| {
            let node = match slot {
                Slot::Leaf(v) => Node::Leaf(v.clone()),
                Slot::Nested(inner) => Node::Tree(level_to_tree::<V, M>(&*inner.borrow())),
            };
            (key.clone(), node)
        })
        .collect()
}

pub(crate) fn level_eq_tree<V: PartialEq, M: Level<V>>(level: &M, tree: &Tree<V>) -> bool {
    level.len() == tree.len()
        && level.iter().all(|(key, slot)| match (slot, tree.get(key)) {
            (Slot::Leaf(a), Some(Node::Leaf(b))) => a == b,
            (Slot::Nested(inner), Some(Node::Tree(sub))) => {
                level_eq_tree::<V, M>(&*inner.borrow(), sub)
            }
            _ => false,
        })
}

/// Build a [`Tree`] literal. Braced values nest; anything else is a leaf.
///
/// ```
/// use plane_map::tree;
///
/// let t = tree! {
///     "key1" => { "key2" => "val2", "key3" => "val3" },
///     "key4" => { "key5" => { "key6" => "val6" } },
/// };
/// assert_eq!(t.len(), 2);
/// ```
#[macro_export]
macro_rules! tree {
    (@node { $($inner:tt)* }) => {
        $crate::Node::Tree($crate::tree!{ $($inner)* })
    };
    (@node $leaf:expr) => {
        $crate::Node::Leaf($leaf)
    };
    ($($key:expr => $value:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut tree = $crate::Tree::default();
        $( tree.insert($crate::Key::from($key), $crate::tree!(@node $value)); )*
        tree
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{count_leaves, BTreeLevel};

    #[test]
    fn macro_builds_nested_literals() {
        let t: Tree<i32> = tree! {
            "a" => { "b" => 1, "c" => { "d" => 2 } },
            "e" => 3,
        };
        assert_eq!(t.len(), 2);
        let a = t.get(&Key::from("a")).and_then(Node::as_tree).expect("a is a tree");
        assert_eq!(a.get(&Key::from("b")), Some(&Node::Leaf(1)));
        assert_eq!(t.get(&Key::from("e")).and_then(Node::as_leaf), Some(&3));

        let empty: Tree<i32> = tree! {};
        assert!(empty.is_empty());
    }

    /// Invariant: re-homing a tree onto a level type and exporting it again
    /// preserves the nested structure, including empty sub-trees.
    #[test]
    fn rehomes_onto_level_type() {
        let t: Tree<&str> = tree! {
            "x" => { "y" => "v", "z" => {} },
            "w" => "u",
        };
        let level: BTreeLevel<&str> = tree_to_level(t.clone());
        assert_eq!(count_leaves::<&str, _>(&level), 2);
        assert!(matches!(level.get(&Key::from("x")), Some(Slot::Nested(_))));

        // IndexMap equality ignores order
        let back = level_to_tree::<&str, _>(&level);
        assert_eq!(back, t);
    }
}
