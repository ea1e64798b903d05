//! Soft and hard merges.
//!
//! A PathMap source is merged softly: each of its leaf paths is inserted, so
//! siblings already present at every level survive. A plain [`Tree`] or a
//! list of top-level `(key, node)` pairs is merged hard: each top-level entry
//! replaces whatever the target held under that key.

use crate::key::Key;
use crate::level::{Level, Slot};
use crate::path_map::PathMap;
use crate::tree::{Node, Tree};
use tracing::{debug, warn};

/// A source that [`PathMap::update`] can merge from.
pub trait UpdateSource<V, M> {
    fn apply(self, target: &mut PathMap<V, M>);
}

impl<V, M, N> UpdateSource<V, M> for &PathMap<V, N>
where
    V: Clone,
    M: Level<V>,
    N: Level<V>,
{
    fn apply(self, target: &mut PathMap<V, M>) {
        // Collect first: the source may be a view into the target.
        let items: Vec<_> = self.iter().collect();
        debug!(leaves = items.len(), "soft merge");
        for (path, value) in items {
            match target.write(&path, Slot::Leaf(value)) {
                Ok(replaced) => drop(replaced),
                Err(err) => warn!(%err, "skipped leaf during soft merge"),
            }
        }
    }
}

impl<V, M, N> UpdateSource<V, M> for PathMap<V, N>
where
    V: Clone,
    M: Level<V>,
    N: Level<V>,
{
    fn apply(self, target: &mut PathMap<V, M>) {
        (&self).apply(target);
    }
}

impl<V, M> UpdateSource<V, M> for Tree<V>
where
    V: Clone,
    M: Level<V>,
{
    fn apply(self, target: &mut PathMap<V, M>) {
        debug!(entries = self.len(), "hard merge");
        for (key, node) in self {
            target.replace_top(key, node.into_slot());
        }
    }
}

impl<K, V, M> UpdateSource<V, M> for Vec<(K, Node<V>)>
where
    K: Into<Key>,
    V: Clone,
    M: Level<V>,
{
    fn apply(self, target: &mut PathMap<V, M>) {
        debug!(entries = self.len(), "hard merge");
        for (key, node) in self {
            target.replace_top(key.into(), node.into_slot());
        }
    }
}
