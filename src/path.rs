//! Path input and normalization.
//!
//! A [`Segment`] is unnormalized path input: a single key, an eager sequence
//! of further segments, or a lazy one-shot iterator of segments. [`normalize`]
//! flattens it depth-first into a [`Path`]. `Key::Tuple` is opaque and is
//! never expanded, so a tuple can address a single entry.

use crate::key::Key;
use core::fmt;
use core::ops::Deref;

/// Unnormalized path input.
pub enum Segment {
    Key(Key),
    Seq(Vec<Segment>),
    /// Consumed once, in order, when normalized.
    Lazy(Box<dyn Iterator<Item = Segment>>),
}

impl Segment {
    /// Wrap an iterator so that it is expanded in place during normalization.
    pub fn lazy<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
        T: Into<Segment> + 'static,
    {
        Segment::Lazy(Box::new(iter.into_iter().map(Into::into)))
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => fmt::Debug::fmt(k, f),
            Segment::Seq(items) => f.debug_list().entries(items).finish(),
            Segment::Lazy(_) => f.write_str("<lazy>"),
        }
    }
}

macro_rules! segment_from_key {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Segment {
                fn from(v: $t) -> Self {
                    Segment::Key(Key::from(v))
                }
            }
        )*
    };
}

segment_from_key!(i64, bool, &str, String, ());

impl From<Key> for Segment {
    fn from(k: Key) -> Self {
        Segment::Key(k)
    }
}

impl<A: Into<Key>, B: Into<Key>> From<(A, B)> for Segment {
    fn from(t: (A, B)) -> Self {
        Segment::Key(Key::from(t))
    }
}

impl<A: Into<Key>, B: Into<Key>, C: Into<Key>> From<(A, B, C)> for Segment {
    fn from(t: (A, B, C)) -> Self {
        Segment::Key(Key::from(t))
    }
}

impl<T: Into<Segment>> From<Vec<T>> for Segment {
    fn from(items: Vec<T>) -> Self {
        Segment::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Segment>, const N: usize> From<[T; N]> for Segment {
    fn from(items: [T; N]) -> Self {
        Segment::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl From<Path> for Segment {
    fn from(p: Path) -> Self {
        Segment::Seq(p.into_keys().into_iter().map(Segment::Key).collect())
    }
}

/// Normalized path: a flat, ordered sequence of keys.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<Key>);

impl Path {
    pub fn new() -> Self {
        Path(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<Key>) {
        self.0.push(key.into());
    }

    pub fn join(&self, key: Key) -> Path {
        let mut keys = Vec::with_capacity(self.0.len() + 1);
        keys.extend_from_slice(&self.0);
        keys.push(key);
        Path(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn into_keys(self) -> Vec<Key> {
        self.0
    }
}

impl Deref for Path {
    type Target = [Key];
    fn deref(&self) -> &[Key] {
        &self.0
    }
}

impl From<Vec<Key>> for Path {
    fn from(keys: Vec<Key>) -> Self {
        Path(keys)
    }
}

impl FromIterator<Key> for Path {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl IntoIterator for Path {
    type Item = Key;
    type IntoIter = std::vec::IntoIter<Key>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Key;
    type IntoIter = core::slice::Iter<'a, Key>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// Renders as a tuple of keys, e.g. ("key1", "key2").
impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = f.debug_tuple("");
        for key in &self.0 {
            t.field(key);
        }
        t.finish()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl<T: Into<Key> + Clone, const N: usize> PartialEq<[T; N]> for Path {
    fn eq(&self, other: &[T; N]) -> bool {
        self.0.len() == N
            && self
                .0
                .iter()
                .zip(other.iter())
                .all(|(a, b)| *a == b.clone().into())
    }
}

/// Flatten path input into a [`Path`].
pub fn normalize(input: Segment) -> Path {
    let mut out = Vec::new();
    match input {
        Segment::Key(k) => out.push(k),
        seq => flatten_into(seq, &mut out),
    }
    Path(out)
}

fn flatten_into(seg: Segment, out: &mut Vec<Key>) {
    match seg {
        Segment::Key(k) => out.push(k),
        Segment::Seq(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Segment::Lazy(iter) => {
            for item in iter {
                flatten_into(item, out);
            }
        }
    }
}

/// Anything usable as a path argument.
pub trait IntoPath {
    fn into_path(self) -> Path;
}

impl IntoPath for Path {
    fn into_path(self) -> Path {
        self
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> Path {
        self.clone()
    }
}

impl IntoPath for Segment {
    fn into_path(self) -> Path {
        normalize(self)
    }
}

impl IntoPath for Key {
    fn into_path(self) -> Path {
        Path(vec![self])
    }
}

impl IntoPath for &Key {
    fn into_path(self) -> Path {
        Path(vec![self.clone()])
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Path {
        Path(vec![Key::from(self)])
    }
}

impl IntoPath for String {
    fn into_path(self) -> Path {
        Path(vec![Key::from(self)])
    }
}

impl IntoPath for i64 {
    fn into_path(self) -> Path {
        Path(vec![Key::from(self)])
    }
}

impl IntoPath for bool {
    fn into_path(self) -> Path {
        Path(vec![Key::from(self)])
    }
}

impl<T: Into<Segment>> IntoPath for Vec<T> {
    fn into_path(self) -> Path {
        normalize(Segment::Seq(self.into_iter().map(Into::into).collect()))
    }
}

impl<T: Into<Segment>, const N: usize> IntoPath for [T; N] {
    fn into_path(self) -> Path {
        normalize(Segment::Seq(self.into_iter().map(Into::into).collect()))
    }
}

impl<T: Into<Segment> + Clone> IntoPath for &[T] {
    fn into_path(self) -> Path {
        normalize(Segment::Seq(self.iter().cloned().map(Into::into).collect()))
    }
}

/// Build a heterogeneous [`Segment::Seq`]. Nest `path!` to nest sequences.
///
/// ```
/// use plane_map::{normalize, path, Key, Segment};
///
/// let p = normalize(path![1, path![2, path![3]], 4, (5, 6), Segment::lazy(vec![7, 8])]);
/// assert_eq!(p.len(), 7);
/// assert_eq!(p[4], Key::from((5, 6)));
/// ```
#[macro_export]
macro_rules! path {
    ($($seg:expr),* $(,)?) => {
        $crate::Segment::Seq(vec![$($crate::Segment::from($seg)),*])
    };
}
