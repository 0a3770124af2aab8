//! Filesystem storage backend for DirDB.
//!
//! [`FsBackend`] mirrors the directory/leaf tree onto an OS directory tree
//! under a configured root: every tree directory is an OS directory, every
//! leaf is a `<name>.json` file holding the JSON-serialized value.
//! Directories need no marker file; their existence on disk is the marker.
//!
//! The same `NodeStore` operations that drive the in-memory backend drive
//! this one; reads go through to the disk on every call and writes are
//! applied before listeners observe the mutation.

pub mod backend;

pub use backend::FsBackend;
