//! plane-map: a single-threaded map over nested maps whose keys are paths.
//!
//! A [`PathMap`] stores values in nested levels and addresses them by
//! sequences of keys. `m.insert(["a", "b", "c"], 1)` creates the levels `a`
//! and `a.b` on demand; `m.remove(["a", "b", "c"])` removes the leaf and then
//! prunes every ancestor level left empty, stopping below the root.
//!
//! Design
//!
//! Layers
//! - [`Key`] / [`Segment`] / [`Path`]: atomic keys, unnormalized path input,
//!   and the flat normalized path. `Key::Tuple` is the only sequence kind kept
//!   whole during normalization; every other sequence is flattened.
//! - [`Level`]: the map-like capability set of one nesting level. The level
//!   type doubles as the factory: every level below the root is created with
//!   `M::default()`. [`HashLevel`] (default), [`BTreeLevel`] and
//!   [`IndexLevel`] are provided.
//! - [`Slot`]: a stored slot is either `Leaf(V)` or `Nested(Rc<RefCell<M>>)`,
//!   decided when the slot is written. Nothing is inferred from the value.
//! - [`PathMap`]: the path-addressed surface built on the above.
//!
//! Views
//! - Lookups that land on a nested level return [`Item::Map`], a `PathMap`
//!   holding another handle to that level. Writes through a view are visible
//!   in the parent and the other way round. `Clone` is a deep copy; use
//!   [`PathMap::view`] for an aliasing handle.
//!
//! Merges
//! - `update(&other_path_map)` is a soft merge: every leaf path of the
//!   source is inserted.
//! - `update(tree)` with a plain [`Tree`] (or a `Vec` of top-level pairs) is a
//!   hard merge: top-level entries are replaced wholesale.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` through `Rc`.
//! - No `RefCell` borrow is held across a call into another public operation,
//!   so aliasing views never cause a borrow panic.
//! - Failures are detected before mutation: a failed `remove` or `lookup`
//!   leaves the structure untouched.
//! - Writing to the empty path is rejected with [`Error::InvalidPath`].
//!
//! ```
//! use plane_map::{tree, PathMap};
//!
//! let mut m: PathMap<&str> = PathMap::from(tree! {
//!     "key1" => { "key2" => "val2", "key3" => "val3" },
//!     "key4" => { "key5" => { "key6" => "val6" } },
//! });
//! assert_eq!(m.len(), 3);
//! assert_eq!(m.lookup(["key4", "key5", "key6"])?.into_leaf(), Some("val6"));
//!
//! m.remove(["key4", "key5", "key6"])?;
//! assert!(!m.contains("key4"));
//! # Ok::<(), plane_map::Error>(())
//! ```

mod error;
mod iter;
mod key;
mod level;
mod path;
mod path_map;
mod path_map_proptest;
mod tree;
mod update;

// Public surface
pub use error::{Error, Result};
pub use iter::{Iter, Keys, Values};
pub use key::Key;
pub use level::{BTreeLevel, HashLevel, IndexLevel, Level, Slot};
pub use path::{normalize, IntoPath, Path, Segment};
pub use path_map::{Item, PathMap};
pub use tree::{Node, Tree};
pub use update::UpdateSource;

/// PathMap whose levels iterate in key order.
pub type SortedPathMap<V> = PathMap<V, BTreeLevel<V>>;

/// PathMap whose levels iterate in insertion order.
pub type OrderedPathMap<V> = PathMap<V, IndexLevel<V>>;
