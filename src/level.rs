//! Level: one nesting level of a PathMap, and the factory types that build it.
//!
//! A level maps [`Key`]s to [`Slot`]s. A slot is either a leaf value or a
//! shared handle to a nested level of the same type, so every level below the
//! root is produced by the same factory. The factory is the level type
//! itself: any `Default`-constructible type implementing [`Level`].
//!
//! Provided levels:
//! - [`HashLevel`]: unordered, backed by `hashbrown::HashMap`.
//! - [`BTreeLevel`]: sorted by key, backed by `BTreeMap`.
//! - [`IndexLevel`]: insertion-ordered, backed by `indexmap::IndexMap`.

use crate::key::Key;
use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A stored slot: a leaf value or a nested level.
pub enum Slot<V, M> {
    Leaf(V),
    Nested(Rc<RefCell<M>>),
}

impl<V, M> Slot<V, M> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Slot::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&V> {
        match self {
            Slot::Leaf(v) => Some(v),
            Slot::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Rc<RefCell<M>>> {
        match self {
            Slot::Leaf(_) => None,
            Slot::Nested(level) => Some(level),
        }
    }
}

/// Cloning a nested slot clones the handle, not the level.
impl<V: Clone, M> Clone for Slot<V, M> {
    fn clone(&self) -> Self {
        match self {
            Slot::Leaf(v) => Slot::Leaf(v.clone()),
            Slot::Nested(level) => Slot::Nested(Rc::clone(level)),
        }
    }
}

impl<V: fmt::Debug, M: Level<V>> fmt::Debug for Slot<V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Leaf(v) => fmt::Debug::fmt(v, f),
            Slot::Nested(level) => debug_level::<V, M>(&*level.borrow(), f),
        }
    }
}

/// Map-like nesting level.
///
/// Implementations only store and return slots; traversal, pruning and
/// level creation are handled by `PathMap`.
pub trait Level<V>: Default + Sized {
    type Iter<'a>: Iterator<Item = (&'a Key, &'a Slot<V, Self>)>
    where
        Self: 'a,
        V: 'a;

    fn get(&self, key: &Key) -> Option<&Slot<V, Self>>;
    fn get_mut(&mut self, key: &Key) -> Option<&mut Slot<V, Self>>;
    /// Insert or overwrite, returning the previous slot.
    fn insert(&mut self, key: Key, slot: Slot<V, Self>) -> Option<Slot<V, Self>>;
    fn remove(&mut self, key: &Key) -> Option<Slot<V, Self>>;
    fn len(&self) -> usize;
    fn iter(&self) -> Self::Iter<'_>;

    fn contains_key(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unordered level backed by `hashbrown`.
pub struct HashLevel<V>(hashbrown::HashMap<Key, Slot<V, HashLevel<V>>>);

impl<V> Default for HashLevel<V> {
    fn default() -> Self {
        HashLevel(hashbrown::HashMap::new())
    }
}

impl<V> Level<V> for HashLevel<V> {
    type Iter<'a> = hashbrown::hash_map::Iter<'a, Key, Slot<V, Self>>
    where
        Self: 'a,
        V: 'a;

    fn get(&self, key: &Key) -> Option<&Slot<V, Self>> {
        self.0.get(key)
    }
    fn get_mut(&mut self, key: &Key) -> Option<&mut Slot<V, Self>> {
        self.0.get_mut(key)
    }
    fn insert(&mut self, key: Key, slot: Slot<V, Self>) -> Option<Slot<V, Self>> {
        self.0.insert(key, slot)
    }
    fn remove(&mut self, key: &Key) -> Option<Slot<V, Self>> {
        self.0.remove(key)
    }
    fn len(&self) -> usize {
        self.0.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        self.0.iter()
    }
}

/// Level sorted by key.
pub struct BTreeLevel<V>(BTreeMap<Key, Slot<V, BTreeLevel<V>>>);

impl<V> Default for BTreeLevel<V> {
    fn default() -> Self {
        BTreeLevel(BTreeMap::new())
    }
}

impl<V> Level<V> for BTreeLevel<V> {
    type Iter<'a> = std::collections::btree_map::Iter<'a, Key, Slot<V, Self>>
    where
        Self: 'a,
        V: 'a;

    fn get(&self, key: &Key) -> Option<&Slot<V, Self>> {
        self.0.get(key)
    }
    fn get_mut(&mut self, key: &Key) -> Option<&mut Slot<V, Self>> {
        self.0.get_mut(key)
    }
    fn insert(&mut self, key: Key, slot: Slot<V, Self>) -> Option<Slot<V, Self>> {
        self.0.insert(key, slot)
    }
    fn remove(&mut self, key: &Key) -> Option<Slot<V, Self>> {
        self.0.remove(key)
    }
    fn len(&self) -> usize {
        self.0.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        self.0.iter()
    }
}

/// Insertion-ordered level. Removal keeps the order of the remaining keys.
pub struct IndexLevel<V>(indexmap::IndexMap<Key, Slot<V, IndexLevel<V>>>);

impl<V> Default for IndexLevel<V> {
    fn default() -> Self {
        IndexLevel(indexmap::IndexMap::new())
    }
}

impl<V> Level<V> for IndexLevel<V> {
    type Iter<'a> = indexmap::map::Iter<'a, Key, Slot<V, Self>>
    where
        Self: 'a,
        V: 'a;

    fn get(&self, key: &Key) -> Option<&Slot<V, Self>> {
        self.0.get(key)
    }
    fn get_mut(&mut self, key: &Key) -> Option<&mut Slot<V, Self>> {
        self.0.get_mut(key)
    }
    fn insert(&mut self, key: Key, slot: Slot<V, Self>) -> Option<Slot<V, Self>> {
        self.0.insert(key, slot)
    }
    fn remove(&mut self, key: &Key) -> Option<Slot<V, Self>> {
        self.0.shift_remove(key)
    }
    fn len(&self) -> usize {
        self.0.len()
    }
    fn iter(&self) -> Self::Iter<'_> {
        self.0.iter()
    }
}

/// Render a level as a nested map literal.
pub(crate) fn debug_level<V: fmt::Debug, M: Level<V>>(
    level: &M,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    struct Nested<'a, V, M>(&'a RefCell<M>, PhantomData<V>);
    impl<V: fmt::Debug, M: Level<V>> fmt::Debug for Nested<'_, V, M> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            debug_level::<V, M>(&*self.0.borrow(), f)
        }
    }

    let mut dm = f.debug_map();
    for (key, slot) in level.iter() {
        match slot {
            Slot::Leaf(v) => dm.entry(key, v),
            Slot::Nested(inner) => dm.entry(key, &Nested::<V, M>(inner, PhantomData)),
        };
    }
    dm.finish()
}

/// Structural equality of two levels, possibly of different level types.
pub(crate) fn levels_eq<V, M, N>(a: &M, b: &N) -> bool
where
    V: PartialEq,
    M: Level<V>,
    N: Level<V>,
{
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(key, slot)| match (slot, b.get(key)) {
        (Slot::Leaf(x), Some(Slot::Leaf(y))) => x == y,
        (Slot::Nested(x), Some(Slot::Nested(y))) => {
            // same handle
            if Rc::as_ptr(x) as *const () == Rc::as_ptr(y) as *const () {
                return true;
            }
            levels_eq::<V, M, N>(&*x.borrow(), &*y.borrow())
        }
        _ => false,
    })
}

/// Number of leaves reachable from a level.
pub(crate) fn count_leaves<V, M: Level<V>>(level: &M) -> usize {
    level
        .iter()
        .map(|(_, slot)| match slot {
            Slot::Leaf(_) => 1,
            Slot::Nested(inner) => count_leaves::<V, M>(&*inner.borrow()),
        })
        .sum()
}

pub(crate) fn has_leaf<V, M: Level<V>>(level: &M) -> bool {
    level.iter().any(|(_, slot)| match slot {
        Slot::Leaf(_) => true,
        Slot::Nested(inner) => has_leaf::<V, M>(&*inner.borrow()),
    })
}

/// Deep copy of a level into a fresh, unshared level of the same type.
pub(crate) fn copy_level<V: Clone, M: Level<V>>(level: &M) -> M {
    let mut out = M::default();
    for (key, slot) in level.iter() {
        let copied = match slot {
            Slot::Leaf(v) => Slot::Leaf(v.clone()),
            Slot::Nested(inner) => {
                Slot::Nested(Rc::new(RefCell::new(copy_level::<V, M>(&*inner.borrow()))))
            }
        };
        out.insert(key.clone(), copied);
    }
    out
}
