//! PathMap: a map over nested levels, addressed by flattened key paths.
//!
//! The root level sits behind `Rc<RefCell<_>>` and every nested level is a
//! `Slot::Nested` handle of the same shape. A `PathMap` returned from a lookup
//! is a view: it holds a handle to the nested level, so writes through it are
//! visible in the parent and vice versa.
//!
//! A view remembers the levels above its root (weakly, with the key each one
//! holds it under), so a removal through the view that empties its root keeps
//! pruning into the parent structure.
//!
//! Borrow discipline: no `RefCell` borrow is held across a call into another
//! public operation, and replaced or removed slots are dropped only after the
//! borrow that unlinked them is released.

use crate::error::{Error, Result};
use crate::iter::{Iter, Keys, Values};
use crate::key::Key;
use crate::level::{
    copy_level, count_leaves, debug_level, has_leaf, levels_eq, HashLevel, Level, Slot,
};
use crate::path::{IntoPath, Path};
use crate::tree::{level_eq_tree, level_to_tree, tree_to_level, Tree};
use crate::update::UpdateSource;
use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

pub struct PathMap<V, M = HashLevel<V>> {
    root: Rc<RefCell<M>>,
    // Levels above `root`, outermost first. Empty for a detached map.
    parents: Vec<(Weak<RefCell<M>>, Key)>,
    _values: PhantomData<V>,
}

/// Result of a lookup: a leaf value, or a write-through view of a nested level.
pub enum Item<V, M = HashLevel<V>> {
    Leaf(V),
    Map(PathMap<V, M>),
}

impl<V, M> Item<V, M> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Item::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&V> {
        match self {
            Item::Leaf(v) => Some(v),
            Item::Map(_) => None,
        }
    }

    pub fn into_leaf(self) -> Option<V> {
        match self {
            Item::Leaf(v) => Some(v),
            Item::Map(_) => None,
        }
    }

    pub fn into_map(self) -> Option<PathMap<V, M>> {
        match self {
            Item::Leaf(_) => None,
            Item::Map(m) => Some(m),
        }
    }
}

impl<V, M> From<Slot<V, M>> for Item<V, M> {
    fn from(slot: Slot<V, M>) -> Self {
        match slot {
            Slot::Leaf(v) => Item::Leaf(v),
            Slot::Nested(level) => Item::Map(PathMap::from_level(level)),
        }
    }
}

impl<V: PartialEq, M: Level<V>, N: Level<V>> PartialEq<Item<V, N>> for Item<V, M> {
    fn eq(&self, other: &Item<V, N>) -> bool {
        match (self, other) {
            (Item::Leaf(a), Item::Leaf(b)) => a == b,
            (Item::Map(a), Item::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<V: fmt::Debug, M: Level<V>> fmt::Debug for Item<V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Leaf(v) => f.debug_tuple("Leaf").field(v).finish(),
            Item::Map(m) => f.debug_tuple("Map").field(m).finish(),
        }
    }
}

impl<V, M> PathMap<V, M> {
    pub(crate) fn from_level(root: Rc<RefCell<M>>) -> Self {
        Self {
            root,
            parents: Vec::new(),
            _values: PhantomData,
        }
    }

    /// Another handle to the same root level. Writes through either are
    /// visible through both.
    pub fn view(&self) -> Self {
        Self {
            root: Rc::clone(&self.root),
            parents: self.parents.clone(),
            _values: PhantomData,
        }
    }

    /// Whether both handles share the same root level.
    pub fn same_root(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.root, &other.root)
    }
}

impl<V, M> PathMap<V, M>
where
    V: Clone,
    M: Level<V>,
{
    pub fn new() -> Self {
        Self::from_level(Rc::new(RefCell::new(M::default())))
    }

    /// Copy a plain nested mapping, re-homing every level onto `M`.
    pub fn from_tree(tree: Tree<V>) -> Self {
        Self::from_level(Rc::new(RefCell::new(tree_to_level(tree))))
    }

    /// Number of leaves, at any depth.
    pub fn len(&self) -> usize {
        count_leaves::<V, M>(&*self.root.borrow())
    }

    pub fn is_empty(&self) -> bool {
        !has_leaf::<V, M>(&*self.root.borrow())
    }

    /// Resolve `path`. The empty path resolves to a view of the root.
    pub fn lookup(&self, path: impl IntoPath) -> Result<Item<V, M>> {
        let path = path.into_path();
        let slot = self.resolve(&path)?;
        Ok(self.item_at(&path, slot))
    }

    pub fn get(&self, path: impl IntoPath) -> Option<Item<V, M>> {
        self.lookup(path).ok()
    }

    pub fn get_or(&self, path: impl IntoPath, default: V) -> Item<V, M> {
        self.get(path).unwrap_or(Item::Leaf(default))
    }

    /// Like [`get`](Self::get), but nested levels come back as the bare
    /// `Rc<RefCell<M>>` container rather than a `PathMap` view.
    pub fn get_raw(&self, path: impl IntoPath) -> Option<Slot<V, M>> {
        self.resolve(&path.into_path()).ok()
    }

    pub fn contains(&self, path: impl IntoPath) -> bool {
        self.resolve(&path.into_path()).is_ok()
    }

    /// Set the leaf at `path`, creating missing levels. A leaf found where a
    /// level is needed is replaced by a new level.
    pub fn insert(&mut self, path: impl IntoPath, value: V) -> Result<()> {
        self.write(&path.into_path(), Slot::Leaf(value)).map(drop)
    }

    /// Store a plain nested mapping at `path`, re-homed onto `M`.
    pub fn insert_tree(&mut self, path: impl IntoPath, tree: Tree<V>) -> Result<()> {
        let level: M = tree_to_level(tree);
        self.write(&path.into_path(), Slot::Nested(Rc::new(RefCell::new(level))))
            .map(drop)
    }

    /// Remove the entry at `path`, pruning ancestor levels left empty.
    pub fn remove(&mut self, path: impl IntoPath) -> Result<()> {
        self.take(&path.into_path()).map(drop)
    }

    pub fn pop(&mut self, path: impl IntoPath) -> Result<Item<V, M>> {
        self.take(&path.into_path()).map(Item::from)
    }

    /// Like [`pop`](Self::pop), but a missing path yields `default`.
    /// `InvalidPath` is still reported.
    pub fn pop_or(&mut self, path: impl IntoPath, default: V) -> Result<Item<V, M>> {
        match self.pop(path) {
            Err(err) if err.is_not_found() => Ok(Item::Leaf(default)),
            res => res,
        }
    }

    /// Remove and return the first leaf in enumeration order.
    pub fn popitem(&mut self) -> Result<(Path, V)> {
        let path = self.keys().next().ok_or(Error::Empty)?;
        match self.take(&path)? {
            Slot::Leaf(v) => Ok((path, v)),
            Slot::Nested(_) => Err(Error::not_found(&path)),
        }
    }

    /// Return the existing entry at `path`, or insert `default` there.
    pub fn setdefault(&mut self, path: impl IntoPath, default: V) -> Result<Item<V, M>> {
        let path = path.into_path();
        match self.resolve(&path) {
            Ok(slot) => Ok(self.item_at(&path, slot)),
            Err(_) => {
                self.write(&path, Slot::Leaf(default.clone()))?;
                Ok(Item::Leaf(default))
            }
        }
    }

    /// Merge `source` into this map; see [`UpdateSource`] for soft and hard
    /// merge semantics.
    pub fn update<S: UpdateSource<V, M>>(&mut self, source: S) {
        source.apply(self);
    }

    /// Empty the root level in place, so views of the root observe it too.
    /// A cleared view is unlinked from its parent like any emptied level.
    pub fn clear(&mut self) {
        let old = core::mem::take(&mut *self.root.borrow_mut());
        debug!(leaves = count_leaves::<V, M>(&old), "cleared path map");
        drop(old);
        self.prune_parents();
    }

    pub fn iter(&self) -> Iter<V, M> {
        Iter::new(&self.root)
    }

    pub fn items(&self) -> Iter<V, M> {
        self.iter()
    }

    pub fn keys(&self) -> Keys<V, M> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<V, M> {
        Values::new(self.iter())
    }

    /// Detached plain copy of the nested structure.
    pub fn to_tree(&self) -> Tree<V> {
        level_to_tree::<V, M>(&*self.root.borrow())
    }

    /// Walk `path` and clone the slot it ends at.
    fn resolve(&self, path: &Path) -> Result<Slot<V, M>> {
        let mut current = Rc::clone(&self.root);
        let Some((last, parents)) = path.split_last() else {
            return Ok(Slot::Nested(current));
        };
        for key in parents {
            let next = match current.borrow().get(key) {
                Some(Slot::Nested(level)) => Rc::clone(level),
                _ => return Err(Error::not_found(path)),
            };
            current = next;
        }
        let slot = current.borrow().get(last).cloned();
        slot.ok_or_else(|| Error::not_found(path))
    }

    /// Wrap a resolved slot. Nested levels become views that know the levels
    /// above them.
    fn item_at(&self, path: &Path, slot: Slot<V, M>) -> Item<V, M> {
        let level = match slot {
            Slot::Leaf(v) => return Item::Leaf(v),
            Slot::Nested(level) => level,
        };
        let mut parents = self.parents.clone();
        let mut current = Rc::clone(&self.root);
        for key in path.iter() {
            let next = match current.borrow().get(key) {
                Some(Slot::Nested(inner)) => Rc::clone(inner),
                _ => return Item::Map(PathMap::from_level(level)),
            };
            parents.push((Rc::downgrade(&current), key.clone()));
            current = next;
        }
        Item::Map(PathMap {
            root: level,
            parents,
            _values: PhantomData,
        })
    }

    /// Store `slot` at `path`, returning whatever it replaced.
    pub(crate) fn write(&self, path: &Path, slot: Slot<V, M>) -> Result<Option<Slot<V, M>>> {
        let (last, parents) = path.split_last().ok_or(Error::InvalidPath)?;
        let mut current = Rc::clone(&self.root);
        for key in parents {
            let next = {
                let mut level = current.borrow_mut();
                let existing = match level.get(key) {
                    Some(Slot::Nested(inner)) => Some(Rc::clone(inner)),
                    _ => None,
                };
                match existing {
                    Some(inner) => inner,
                    None => {
                        let inner = Rc::new(RefCell::new(M::default()));
                        let replaced = level.insert(key.clone(), Slot::Nested(Rc::clone(&inner)));
                        if replaced.is_some() {
                            trace!(key = ?key, "replaced leaf with a new level");
                        } else {
                            trace!(key = ?key, "created level");
                        }
                        inner
                    }
                }
            };
            current = next;
        }
        let replaced = current.borrow_mut().insert(last.clone(), slot);
        Ok(replaced)
    }

    /// Unlink the slot at `path` and prune every ancestor level that became
    /// empty, stopping below the root.
    fn take(&self, path: &Path) -> Result<Slot<V, M>> {
        let (last, parents) = path.split_last().ok_or(Error::InvalidPath)?;
        let mut ancestors = Vec::with_capacity(parents.len());
        let mut current = Rc::clone(&self.root);
        for key in parents {
            let next = match current.borrow().get(key) {
                Some(Slot::Nested(level)) => Rc::clone(level),
                _ => return Err(Error::not_found(path)),
            };
            ancestors.push(current);
            current = next;
        }

        let removed = current.borrow_mut().remove(last);
        let removed = removed.ok_or_else(|| Error::not_found(path))?;
        trace!(path = %path, "removed entry");

        let mut child = current;
        for (parent, key) in ancestors.iter().zip(parents).rev() {
            if !child.borrow().is_empty() {
                break;
            }
            let pruned = parent.borrow_mut().remove(key);
            trace!(key = ?key, "pruned empty level");
            drop(pruned);
            child = Rc::clone(parent);
        }
        if self.root.borrow().is_empty() {
            self.prune_parents();
        }
        Ok(removed)
    }

    /// Unlink an emptied root from the levels above it, walking upward while
    /// each level is left empty. Stops once the chain no longer holds this
    /// level, e.g. after the parent replaced or pruned it.
    fn prune_parents(&self) {
        let mut child = Rc::clone(&self.root);
        for (parent, key) in self.parents.iter().rev() {
            let Some(parent) = parent.upgrade() else {
                break;
            };
            if !child.borrow().is_empty() {
                break;
            }
            let linked = matches!(
                parent.borrow().get(key),
                Some(Slot::Nested(level)) if Rc::ptr_eq(level, &child)
            );
            if !linked {
                break;
            }
            let pruned = parent.borrow_mut().remove(key);
            trace!(key = ?key, "pruned empty level above view");
            drop(pruned);
            child = parent;
        }
    }

    pub(crate) fn replace_top(&self, key: Key, slot: Slot<V, M>) {
        let replaced = self.root.borrow_mut().insert(key, slot);
        drop(replaced);
    }
}

impl<V: Clone, M: Level<V>> Default for PathMap<V, M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy. Use [`PathMap::view`] for an aliasing handle.
impl<V: Clone, M: Level<V>> Clone for PathMap<V, M> {
    fn clone(&self) -> Self {
        Self::from_level(Rc::new(RefCell::new(copy_level::<V, M>(&*self.root.borrow()))))
    }
}

impl<V: Clone, M: Level<V>> From<Tree<V>> for PathMap<V, M> {
    fn from(tree: Tree<V>) -> Self {
        Self::from_tree(tree)
    }
}

impl<V: fmt::Debug, M: Level<V>> fmt::Debug for PathMap<V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_level::<V, M>(&*self.root.borrow(), f)
    }
}

impl<V: PartialEq, M: Level<V>, N: Level<V>> PartialEq<PathMap<V, N>> for PathMap<V, M> {
    fn eq(&self, other: &PathMap<V, N>) -> bool {
        levels_eq::<V, M, N>(&*self.root.borrow(), &*other.root.borrow())
    }
}

impl<V: PartialEq, M: Level<V>> PartialEq<Tree<V>> for PathMap<V, M> {
    fn eq(&self, other: &Tree<V>) -> bool {
        level_eq_tree::<V, M>(&*self.root.borrow(), other)
    }
}

impl<P: IntoPath, V: Clone, M: Level<V>> Extend<(P, V)> for PathMap<V, M> {
    fn extend<I: IntoIterator<Item = (P, V)>>(&mut self, iter: I) {
        for (path, value) in iter {
            if let Err(err) = self.insert(path, value) {
                warn!(%err, "skipped path-value pair");
            }
        }
    }
}

impl<P: IntoPath, V: Clone, M: Level<V>> FromIterator<(P, V)> for PathMap<V, M> {
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, V: Clone, M: Level<V>> IntoIterator for &'a PathMap<V, M> {
    type Item = (Path, V);
    type IntoIter = Iter<V, M>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
