//! Depth-first enumeration of leaf paths.
//!
//! Each level is snapshotted (keys plus cloned slots) when the traversal
//! enters it, so no `RefCell` borrow outlives a single `next` call. Writes
//! made through a view while a traversal is in progress therefore never
//! panic, but whether the traversal observes them is unspecified.

use crate::key::Key;
use crate::level::{Level, Slot};
use crate::path::Path;
use core::cell::RefCell;
use std::rc::Rc;

type Frame<V, M> = std::vec::IntoIter<(Key, Slot<V, M>)>;

fn snapshot<V: Clone, M: Level<V>>(level: &RefCell<M>) -> Frame<V, M> {
    level
        .borrow()
        .iter()
        .map(|(k, s)| (k.clone(), s.clone()))
        .collect::<Vec<_>>()
        .into_iter()
}

/// Iterator over `(path, value)` for every leaf.
pub struct Iter<V, M> {
    prefix: Vec<Key>,
    stack: Vec<Frame<V, M>>,
}

impl<V: Clone, M: Level<V>> Iter<V, M> {
    pub(crate) fn new(root: &Rc<RefCell<M>>) -> Self {
        Self {
            prefix: Vec::new(),
            stack: vec![snapshot(root)],
        }
    }
}

impl<V: Clone, M: Level<V>> Iterator for Iter<V, M> {
    type Item = (Path, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            match frame.next() {
                Some((key, Slot::Leaf(v))) => {
                    let mut keys = Vec::with_capacity(self.prefix.len() + 1);
                    keys.extend_from_slice(&self.prefix);
                    keys.push(key);
                    return Some((Path::from(keys), v));
                }
                Some((key, Slot::Nested(level))) => {
                    let frame = snapshot(&level);
                    self.prefix.push(key);
                    self.stack.push(frame);
                }
                None => {
                    self.stack.pop();
                    // The root frame has no prefix key of its own.
                    if !self.stack.is_empty() {
                        self.prefix.pop();
                    }
                }
            }
        }
    }
}

/// Iterator over leaf paths.
pub struct Keys<V, M> {
    inner: Iter<V, M>,
}

impl<V, M> Keys<V, M> {
    pub(crate) fn new(inner: Iter<V, M>) -> Self {
        Self { inner }
    }
}

impl<V: Clone, M: Level<V>> Iterator for Keys<V, M> {
    type Item = Path;
    #[inline]
    fn next(&mut self) -> Option<Path> {
        self.inner.next().map(|(p, _)| p)
    }
}

/// Iterator over leaf values, in the same order as [`Keys`].
pub struct Values<V, M> {
    inner: Iter<V, M>,
}

impl<V, M> Values<V, M> {
    pub(crate) fn new(inner: Iter<V, M>) -> Self {
        Self { inner }
    }
}

impl<V: Clone, M: Level<V>> Iterator for Values<V, M> {
    type Item = V;
    #[inline]
    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, v)| v)
    }
}
