//! The node tree: directories and leaves.
//!
//! A [`Node`] is either a [`Directory`] (an insertion-ordered listing of
//! named child nodes) or a leaf holding a [`Value`]. The distinction is a
//! compile-time tag; no runtime shape inspection happens inside the tree.
//! Raw JSON entering the store is classified exactly once, at the boundary:
//! a JSON object is directory-shaped, everything else (scalars, arrays,
//! null) is a leaf. Arrays are always leaves, even when callers interpret
//! them as path links.

use crate::error::TypeError;

/// Leaf payload: any JSON value. A JSON object is "directory-shaped" and is
/// never storable as a leaf; see [`value_is_dir_shaped`].
pub type Value = serde_json::Value;

/// Returns `true` if this value looks like a directory (a JSON object).
///
/// Directory-shaped values cannot be stored as leaves; directories are only
/// created via `mkdir` or recursive import.
pub fn value_is_dir_shaped(value: &Value) -> bool {
    value.is_object()
}

/// A tree node: directory or leaf.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A container of further named nodes.
    Dir(Directory),
    /// An opaque scalar/array value with no children.
    Leaf(Value),
}

impl Node {
    /// Returns `true` if this node is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Dir(_))
    }

    /// The directory listing, if this node is a directory.
    pub fn as_dir(&self) -> Option<&Directory> {
        match self {
            Node::Dir(dir) => Some(dir),
            Node::Leaf(_) => None,
        }
    }

    /// Mutable directory listing, if this node is a directory.
    pub fn as_dir_mut(&mut self) -> Option<&mut Directory> {
        match self {
            Node::Dir(dir) => Some(dir),
            Node::Leaf(_) => None,
        }
    }

    /// The leaf value, if this node is a leaf.
    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Dir(_) => None,
        }
    }

    /// Convert into the equivalent nested JSON value.
    ///
    /// Directories become objects (in enumeration order), leaves their
    /// natural JSON representation.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Dir(dir) => dir.to_value(),
            Node::Leaf(value) => value.clone(),
        }
    }

    /// Classify a JSON value into a node: objects become directories
    /// (recursively), everything else a leaf.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                let mut dir = Directory::new();
                for (name, child) in map {
                    dir.insert(name, Node::from_value(child));
                }
                Node::Dir(dir)
            }
            other => Node::Leaf(other),
        }
    }
}

/// A single entry in a directory listing.
#[derive(Clone, Debug, PartialEq)]
pub struct DirEntry {
    /// Child name, unique among siblings.
    pub name: String,
    /// The child node.
    pub node: Node,
}

/// An insertion-ordered listing of named child nodes.
///
/// Sibling names form a set: lookup ignores order, enumeration preserves it.
/// Replacing an existing child keeps its position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Directory {
    entries: Vec<DirEntry>,
}

impl Directory {
    /// Create a new empty directory.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the directory has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a child by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.node)
    }

    /// Look up a child by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .map(|entry| &mut entry.node)
    }

    /// Returns `true` if a child with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Insert or replace the child at `name`, returning the previous node.
    ///
    /// A replaced child keeps its position in enumeration order; a new child
    /// is appended.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) -> Option<Node> {
        let name = name.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => Some(std::mem::replace(&mut entry.node, node)),
            None => {
                self.entries.push(DirEntry { name, node });
                None
            }
        }
    }

    /// Remove the child at `name`, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        let index = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(index).node)
    }

    /// Remove all children.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Child names in enumeration (insertion) order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Iterate over entries in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter()
    }

    /// Convert into a JSON object in enumeration order.
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.entries.len());
        for entry in &self.entries {
            map.insert(entry.name.clone(), entry.node.to_value());
        }
        Value::Object(map)
    }

    /// Build a directory from a JSON object, classifying each value
    /// recursively.
    ///
    /// Fails if the value is not an object.
    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        match Node::from_value(value) {
            Node::Dir(dir) => Ok(dir),
            Node::Leaf(value) => Err(TypeError::NotAnObject {
                value: value.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_scalars_and_arrays_as_leaves() {
        assert!(!value_is_dir_shaped(&json!(42)));
        assert!(!value_is_dir_shaped(&json!("text")));
        assert!(!value_is_dir_shaped(&json!(true)));
        assert!(!value_is_dir_shaped(&json!(null)));
        assert!(!value_is_dir_shaped(&json!(["a", "b"])));
        assert!(value_is_dir_shaped(&json!({})));
        assert!(value_is_dir_shaped(&json!({"k": 1})));
    }

    #[test]
    fn insert_and_get() {
        let mut dir = Directory::new();
        assert!(dir.insert("a", Node::Leaf(json!(1))).is_none());
        assert_eq!(dir.get("a").and_then(Node::as_leaf), Some(&json!(1)));
        assert!(dir.get("b").is_none());
        assert!(dir.contains("a"));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn replace_keeps_position_and_returns_previous() {
        let mut dir = Directory::new();
        dir.insert("a", Node::Leaf(json!(1)));
        dir.insert("b", Node::Leaf(json!(2)));
        let prev = dir.insert("a", Node::Leaf(json!(10)));
        assert_eq!(prev, Some(Node::Leaf(json!(1))));
        assert_eq!(dir.names(), vec!["a", "b"]);
    }

    #[test]
    fn enumeration_preserves_insertion_order() {
        let mut dir = Directory::new();
        dir.insert("zebra", Node::Leaf(json!(1)));
        dir.insert("alpha", Node::Leaf(json!(2)));
        dir.insert("mango", Node::Dir(Directory::new()));
        assert_eq!(dir.names(), vec!["zebra", "alpha", "mango"]);
    }

    #[test]
    fn remove_present_and_missing() {
        let mut dir = Directory::new();
        dir.insert("a", Node::Leaf(json!(1)));
        assert_eq!(dir.remove("a"), Some(Node::Leaf(json!(1))));
        assert_eq!(dir.remove("a"), None);
        assert!(dir.is_empty());
    }

    #[test]
    fn node_from_value_builds_nested_dirs() {
        let node = Node::from_value(json!({
            "users": {
                "u1": { "name": "Michael", "age": 39 },
            },
            "link": ["users", "u1"],
        }));
        let dir = node.as_dir().expect("root should be a directory");
        let users = dir.get("users").and_then(Node::as_dir).unwrap();
        let u1 = users.get("u1").and_then(Node::as_dir).unwrap();
        assert_eq!(u1.get("age").and_then(Node::as_leaf), Some(&json!(39)));
        // Arrays stay leaves.
        assert!(!dir.get("link").unwrap().is_dir());
    }

    #[test]
    fn value_round_trip_preserves_order() {
        let original = json!({"b": 1, "a": {"z": 2, "y": 3}, "c": [1, 2]});
        let node = Node::from_value(original.clone());
        assert_eq!(node.to_value(), original);
        assert_eq!(
            serde_json::to_string(&node.to_value()).unwrap(),
            serde_json::to_string(&original).unwrap()
        );
    }

    #[test]
    fn directory_from_value_rejects_non_objects() {
        assert!(Directory::from_value(json!([1, 2])).is_err());
        assert!(Directory::from_value(json!("text")).is_err());
        assert!(Directory::from_value(json!({"k": 1})).is_ok());
    }
}
