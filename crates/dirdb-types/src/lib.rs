//! Foundation types for DirDB.
//!
//! DirDB models a filesystem-like hierarchical data store: a tree of named
//! nodes where each node is either a directory (a container of further named
//! nodes) or a leaf (an opaque JSON scalar or array). This crate provides the
//! node tree itself and the rules for valid node names. Every other DirDB
//! crate depends on `dirdb-types`.
//!
//! # Key Types
//!
//! - [`Node`] — tagged union: directory or leaf
//! - [`Directory`] — insertion-ordered listing of named child nodes
//! - [`Value`] — leaf payload (JSON scalar, array, or null)
//! - [`TypeError`] — validation and conversion failures

pub mod error;
pub mod names;
pub mod node;

pub use error::TypeError;
pub use names::validate_name;
pub use node::{value_is_dir_shaped, DirEntry, Directory, Node, Value};
