//! In-memory storage backend.

use dirdb_types::{Directory, Node, Value};

use crate::error::{BackendError, BackendResult};
use crate::traits::{Child, StorageBackend};

/// In-memory backend: the tree literally is the nested [`Directory`] graph.
///
/// Intended for tests, embedding, and as the reference realization of the
/// [`StorageBackend`] contract.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryBackend {
    root: Directory,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend over an existing directory graph.
    pub fn with_root(root: Directory) -> Self {
        Self { root }
    }

    /// The root directory.
    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Resolve a path to the directory it denotes.
    fn dir(&self, path: &[String]) -> BackendResult<&Directory> {
        let mut dir = &self.root;
        for segment in path {
            dir = dir
                .get(segment)
                .and_then(Node::as_dir)
                .ok_or_else(|| BackendError::NoSuchDirectory {
                    path: path.join("/"),
                })?;
        }
        Ok(dir)
    }

    /// Resolve a path to the directory it denotes, mutably.
    fn dir_mut(&mut self, path: &[String]) -> BackendResult<&mut Directory> {
        let mut dir = &mut self.root;
        for segment in path {
            dir = dir
                .get_mut(segment)
                .and_then(Node::as_dir_mut)
                .ok_or_else(|| BackendError::NoSuchDirectory {
                    path: path.join("/"),
                })?;
        }
        Ok(dir)
    }
}

impl StorageBackend for MemoryBackend {
    fn child_names(&self, path: &[String]) -> BackendResult<Vec<String>> {
        Ok(self.dir(path)?.names())
    }

    fn read_child(&self, path: &[String], name: &str) -> BackendResult<Option<Child>> {
        Ok(self.dir(path)?.get(name).map(|node| match node {
            Node::Dir(_) => Child::Dir,
            Node::Leaf(value) => Child::Leaf(value.clone()),
        }))
    }

    fn write_leaf(&mut self, path: &[String], name: &str, value: &Value) -> BackendResult<()> {
        self.dir_mut(path)?
            .insert(name, Node::Leaf(value.clone()));
        Ok(())
    }

    fn create_dir(&mut self, path: &[String], name: &str) -> BackendResult<()> {
        let dir = self.dir_mut(path)?;
        // Already a directory: idempotent no-op. A leaf in the slot is
        // displaced by the new empty directory.
        if !dir.get(name).is_some_and(Node::is_dir) {
            dir.insert(name, Node::Dir(Directory::new()));
        }
        Ok(())
    }

    fn delete_subtree(&mut self, path: &[String], name: &str) -> BackendResult<()> {
        let dir = self.dir_mut(path)?;
        match dir.remove(name) {
            Some(_) => Ok(()),
            None => Err(BackendError::NotFound {
                path: path.join("/"),
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_backend_has_empty_root() {
        let backend = MemoryBackend::new();
        assert!(backend.child_names(&[]).unwrap().is_empty());
        assert_eq!(backend.read_child(&[], "missing").unwrap(), None);
    }

    #[test]
    fn write_and_read_leaf() {
        let mut backend = MemoryBackend::new();
        backend.write_leaf(&[], "age", &json!(39)).unwrap();
        assert_eq!(
            backend.read_child(&[], "age").unwrap(),
            Some(Child::Leaf(json!(39)))
        );
        assert_eq!(backend.child_names(&[]).unwrap(), vec!["age"]);
    }

    #[test]
    fn create_dir_and_descend() {
        let mut backend = MemoryBackend::new();
        backend.create_dir(&[], "users").unwrap();
        backend
            .write_leaf(&path(&["users"]), "name", &json!("Michael"))
            .unwrap();
        assert_eq!(backend.read_child(&[], "users").unwrap(), Some(Child::Dir));
        assert_eq!(
            backend.read_child(&path(&["users"]), "name").unwrap(),
            Some(Child::Leaf(json!("Michael")))
        );
    }

    #[test]
    fn create_dir_is_idempotent() {
        let mut backend = MemoryBackend::new();
        backend.create_dir(&[], "users").unwrap();
        backend
            .write_leaf(&path(&["users"]), "name", &json!("Michael"))
            .unwrap();
        backend.create_dir(&[], "users").unwrap();
        // Existing children survive the second create.
        assert_eq!(
            backend.child_names(&path(&["users"])).unwrap(),
            vec!["name"]
        );
    }

    #[test]
    fn create_dir_displaces_a_leaf() {
        let mut backend = MemoryBackend::new();
        backend.write_leaf(&[], "slot", &json!(1)).unwrap();
        backend.create_dir(&[], "slot").unwrap();
        assert_eq!(backend.read_child(&[], "slot").unwrap(), Some(Child::Dir));
    }

    #[test]
    fn delete_subtree_is_recursive() {
        let mut backend = MemoryBackend::new();
        backend.create_dir(&[], "a").unwrap();
        backend.create_dir(&path(&["a"]), "b").unwrap();
        backend
            .write_leaf(&path(&["a", "b"]), "x", &json!(1))
            .unwrap();
        backend.delete_subtree(&[], "a").unwrap();
        assert_eq!(backend.read_child(&[], "a").unwrap(), None);
        assert!(backend.child_names(&path(&["a"])).is_err());
    }

    #[test]
    fn delete_missing_child_fails() {
        let mut backend = MemoryBackend::new();
        assert!(matches!(
            backend.delete_subtree(&[], "ghost"),
            Err(BackendError::NotFound { .. })
        ));
    }

    #[test]
    fn unresolvable_path_is_an_error() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.child_names(&path(&["nope"])),
            Err(BackendError::NoSuchDirectory { .. })
        ));
    }

    #[test]
    fn enumeration_order_is_insertion_order() {
        let mut backend = MemoryBackend::new();
        backend.write_leaf(&[], "z", &json!(1)).unwrap();
        backend.create_dir(&[], "a").unwrap();
        backend.write_leaf(&[], "m", &json!(2)).unwrap();
        assert_eq!(backend.child_names(&[]).unwrap(), vec!["z", "a", "m"]);
    }
}
