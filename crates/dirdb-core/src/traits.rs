//! The [`StorageBackend`] trait defining the persistence seam.
//!
//! Any medium (in-memory graph, filesystem mirror, database) implements this
//! trait to realize the directory/leaf tree for a [`NodeStore`]. The store
//! calls the backend synchronously inside each mutation, before listeners
//! are notified, so a mutation is durably visible to subsequent reads
//! through the same store by the time any listener observes it.
//!
//! [`NodeStore`]: crate::store::NodeStore

use dirdb_types::Value;

use crate::error::BackendResult;

/// A child as reported by a backend read: an existing directory (its
/// contents are enumerated separately) or a leaf with its value.
#[derive(Clone, Debug, PartialEq)]
pub enum Child {
    /// The name resolves to a directory.
    Dir,
    /// The name resolves to a leaf holding this value.
    Leaf(Value),
}

impl Child {
    /// Returns `true` if this child is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Child::Dir)
    }
}

/// Storage medium for the directory/leaf tree.
///
/// All implementations must satisfy these invariants:
/// - The backend is authoritative: reads are read-through, writes are
///   write-through, and the store keeps no shadow copy of the tree.
/// - `path` is a sequence of already-validated node names from the root;
///   backends must still refuse segments they cannot represent.
/// - Enumeration order from `child_names` is the order `read_child` callers
///   will observe; in-memory backends report insertion order.
/// - Errors are reported, never swallowed; the store layer decides how to
///   degrade.
pub trait StorageBackend {
    /// Child names under the directory at `path`, in enumeration order.
    fn child_names(&self, path: &[String]) -> BackendResult<Vec<String>>;

    /// Read the child `name` under the directory at `path`.
    ///
    /// Returns `Ok(None)` if no such child exists.
    fn read_child(&self, path: &[String], name: &str) -> BackendResult<Option<Child>>;

    /// Create or overwrite the leaf `name` under `path` with `value`.
    fn write_leaf(&mut self, path: &[String], name: &str, value: &Value) -> BackendResult<()>;

    /// Create the directory `name` under `path`.
    ///
    /// Creating a directory that already exists is a no-op. A leaf occupying
    /// the name is displaced.
    fn create_dir(&mut self, path: &[String], name: &str) -> BackendResult<()>;

    /// Delete the child `name` under `path`, recursively destroying the
    /// whole subtree if it is a directory.
    ///
    /// Fails with [`BackendError::NotFound`] if no such child exists.
    ///
    /// [`BackendError::NotFound`]: crate::error::BackendError::NotFound
    fn delete_subtree(&mut self, path: &[String], name: &str) -> BackendResult<()>;
}
