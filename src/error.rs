//! Error type for PathMap operations.

use crate::path::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A key along the path is absent, or a leaf was reached before the
    /// path was exhausted.
    #[error("key not found: {path}")]
    KeyNotFound { path: Path },

    /// The operation needs at least one key and the path was empty.
    #[error("invalid path: the empty path addresses the root")]
    InvalidPath,

    /// `popitem` on a map with no leaves.
    #[error("popitem(): map is empty")]
    Empty,
}

impl Error {
    pub(crate) fn not_found(path: &Path) -> Self {
        Error::KeyNotFound { path: path.clone() }
    }

    /// True for every "nothing there" failure, including `Empty`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound { .. } | Error::Empty)
    }

    /// The requested path, for `KeyNotFound`.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::KeyNotFound { path } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::IntoPath;

    #[test]
    fn messages_name_the_path() {
        let e = Error::not_found(&["a", "b"].into_path());
        assert_eq!(e.to_string(), "key not found: (\"a\", \"b\")");
        assert_eq!(e.path(), Some(&["a", "b"].into_path()));
    }

    /// Invariant: `Empty` is a not-found failure; `InvalidPath` is not.
    #[test]
    fn classification() {
        assert!(Error::Empty.is_not_found());
        assert!(Error::not_found(&"k".into_path()).is_not_found());
        assert!(!Error::InvalidPath.is_not_found());
        assert_eq!(Error::InvalidPath.path(), None);
    }
}
