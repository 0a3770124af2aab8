//! The [`NodeStore`]: cursor navigation, mutation verbs, and import/export.
//!
//! Error contract: public operations report failure through `false` / `None`
//! sentinel returns plus a logged diagnostic; nothing here panics or
//! propagates an error to the caller. `Result` lives at the backend seam,
//! where the store catches it, logs path and cause, and degrades the read to
//! "absent" or the write to a no-op.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use dirdb_types::{validate_name, value_is_dir_shaped, TypeError, Value};

use crate::error::BackendResult;
use crate::hooks::{ChangeBroadcast, Listener, Validator, ValidatorChain};
use crate::memory::MemoryBackend;
use crate::traits::{Child, StorageBackend};

/// A filesystem-like hierarchical data store over a pluggable backend.
///
/// The store owns the backend, a cursor (the current-working-directory
/// path), the validator chain, the listener broadcast, and the name
/// generator used by auto-named `mkdir`. All operations are relative to the
/// cursor. Single-threaded by design: callers sharing a store serialize
/// their own `cd`/mutation sequences.
pub struct NodeStore<B: StorageBackend> {
    backend: B,
    current_path: Vec<String>,
    validators: ValidatorChain,
    listeners: ChangeBroadcast,
    name_gen: Box<dyn FnMut() -> String>,
}

impl NodeStore<MemoryBackend> {
    /// Create a store over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: StorageBackend> NodeStore<B> {
    /// Create a store over the given backend, with the cursor at root and a
    /// random-UUID name generator.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current_path: Vec::new(),
            validators: ValidatorChain::new(),
            listeners: ChangeBroadcast::new(),
            name_gen: Box::new(|| Uuid::new_v4().to_string()),
        }
    }

    /// Replace the name generator used by auto-named `mkdir`.
    ///
    /// The generator must produce valid node names; an invalid generated
    /// name fails the `mkdir` call that requested it.
    pub fn set_name_generator(&mut self, gen: impl FnMut() -> String + 'static) {
        self.name_gen = Box::new(gen);
    }

    /// The backend realizing this store.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // -----------------------------------------------------------------------
    // Hook registration
    // -----------------------------------------------------------------------

    /// Register a validator; `false` (logged) if it is already registered or
    /// declares no hooks.
    pub fn add_validator(&mut self, validator: Rc<dyn Validator>) -> bool {
        match self.validators.register(validator) {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "validator rejected");
                false
            }
        }
    }

    /// Register a listener; `false` (logged) if it is already registered or
    /// declares no hooks.
    pub fn add_listener(&mut self, listener: Rc<dyn Listener>) -> bool {
        match self.listeners.register(listener) {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "listener rejected");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    /// The cursor path from root to the currently open directory.
    pub fn path(&self) -> &[String] {
        &self.current_path
    }

    /// Reset the cursor to the root directory.
    pub fn cd_root(&mut self) {
        self.current_path.clear();
        debug!("changed to top level path");
    }

    /// Descend through `names` one directory at a time; an empty slice
    /// resets the cursor to root.
    ///
    /// Partial-path semantics: on the first segment that is not an existing
    /// directory the call aborts with `false`, leaving the cursor at the
    /// last successfully entered point.
    pub fn cd<S: AsRef<str>>(&mut self, names: &[S]) -> bool {
        if names.is_empty() {
            self.cd_root();
            return true;
        }
        for name in names {
            let name = name.as_ref();
            if !self.is_dir(name) {
                error!(
                    path = %self.current_path.join("."),
                    name, "invalid path segment"
                );
                return false;
            }
            self.current_path.push(name.to_string());
            debug!(path = %self.current_path.join("."), "changed path");
        }
        true
    }

    /// Split `path` on `delimiter`, reset to root, and descend through all
    /// segments — except the last when `pop_last_name` is set, which
    /// supports "resolve the parent, tell me the leaf name" call sites.
    ///
    /// Returns the last segment, or `None` on an empty path/delimiter or any
    /// navigation failure.
    pub fn cd_by_path(&mut self, path: &str, pop_last_name: bool, delimiter: &str) -> Option<String> {
        if path.is_empty() {
            error!("invalid empty path");
            return None;
        }
        if delimiter.is_empty() {
            error!("invalid empty delimiter");
            return None;
        }
        let mut names: Vec<&str> = path.split(delimiter).collect();
        let last = names.last().copied().unwrap_or_default().to_string();
        if pop_last_name {
            names.pop();
        }
        self.cd_root();
        if self.cd(&names) {
            Some(last)
        } else {
            None
        }
    }

    /// Interpret the array leaf at `name` as an absolute path and follow it
    /// from root. The store never interprets arrays anywhere else.
    pub fn cd_link(&mut self, name: &str) -> bool {
        let value = match self.get(name) {
            Some(value) => value,
            None => return false,
        };
        let Value::Array(items) = value else {
            error!(name, "expected an array to be treated as a link");
            return false;
        };
        let mut segments = Vec::with_capacity(items.len());
        for item in &items {
            match item.as_str() {
                Some(segment) => segments.push(segment.to_string()),
                None => {
                    error!(name, "link segments must be strings, got {item}");
                    return false;
                }
            }
        }
        self.cd_root();
        self.cd(&segments)
    }

    /// Move the cursor to the parent directory; `false` at root.
    pub fn up(&mut self) -> bool {
        if self.current_path.is_empty() {
            return false;
        }
        self.current_path.pop();
        debug!(path = %self.current_path.join("."), "changed to parent");
        true
    }

    /// The cursor path joined with `delimiter`, with `extra` trailing
    /// segments appended without moving the cursor.
    pub fn str_path(&self, delimiter: &str, extra: &[&str]) -> String {
        let mut names: Vec<&str> = self.current_path.iter().map(String::as_str).collect();
        names.extend_from_slice(extra);
        names.join(delimiter)
    }

    /// Positional equality test against the cursor path. The wildcard `"*"`
    /// matches any segment; lengths must match exactly.
    pub fn path_matches(&self, names: &[&str]) -> bool {
        names.len() == self.current_path.len()
            && names
                .iter()
                .zip(&self.current_path)
                .all(|(pattern, segment)| *pattern == "*" || pattern == segment)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Returns `true` if a child `name` exists under the cursor. Never logs
    /// for a missing name.
    pub fn exists(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Returns `true` if the child `name` is a directory. Never logs for a
    /// missing name.
    pub fn is_dir(&self, name: &str) -> bool {
        self.child(name).is_some_and(|child| child.is_dir())
    }

    /// Child names under the cursor, in enumeration order.
    pub fn names(&self) -> Vec<String> {
        match self.backend.child_names(&self.current_path) {
            Ok(names) => names,
            Err(err) => {
                error!(path = %self.current_path.join("."), %err, "cannot enumerate children");
                Vec::new()
            }
        }
    }

    /// Read the leaf value at `name`. Reading a directory is a type
    /// conflict: logged, `None`.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.child(name) {
            Some(Child::Leaf(value)) => Some(value),
            Some(Child::Dir) => {
                error!(name, "is a directory and cannot be directly accessed");
                None
            }
            None => {
                error!(path = %self.current_path.join("."), name, "not found");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Mutation verbs
    // -----------------------------------------------------------------------

    /// Create the directory `name` under the cursor, or reuse it if it
    /// already exists (idempotent — existing children are untouched). With
    /// `name` absent, a name is drawn from the configured generator. A leaf
    /// occupying the name is displaced (its value becomes the listeners'
    /// previous value).
    ///
    /// With `enter`, the cursor descends into the directory. Returns the
    /// directory's name, or `None` on invalid name, validator veto, or
    /// backend failure.
    pub fn mkdir(&mut self, name: Option<&str>, enter: bool) -> Option<String> {
        let name = match name {
            Some(name) => {
                if let Err(err) = validate_name(name) {
                    error!(%err, "mkdir rejected");
                    return None;
                }
                name.to_string()
            }
            None => {
                let generated = (self.name_gen)();
                if let Err(err) = validate_name(&generated) {
                    error!(%err, "name generator produced an invalid name");
                    return None;
                }
                generated
            }
        };

        if !self.is_dir(&name) {
            if !self.validators.check_mkdir(&self.current_path, &name) {
                return None;
            }
            let prev = self.leaf_value(&name);
            if let Err(err) = self.backend.create_dir(&self.current_path, &name) {
                error!(path = %self.current_path.join("."), name, %err, "cannot create directory");
                return None;
            }
            debug!(path = %self.current_path.join("."), name, "directory created");
            self.listeners
                .dir_created(&self.current_path, &name, prev.as_ref());
        }

        if enter {
            self.current_path.push(name.clone());
        }
        Some(name)
    }

    /// For each name in sequence: enter it if it is already a directory,
    /// create-and-enter otherwise. Stops with `false` at the first name
    /// taken by a leaf value.
    pub fn mkdirs<S: AsRef<str>>(&mut self, names: &[S]) -> bool {
        for name in names {
            let name = name.as_ref();
            if self.is_dir(name) {
                if !self.cd(&[name]) {
                    return false;
                }
            } else if self.exists(name) {
                error!(
                    path = %self.current_path.join("."),
                    name, "taken by a leaf value"
                );
                return false;
            } else if self.mkdir(Some(name), true).is_none() {
                return false;
            }
        }
        true
    }

    /// [`Self::mkdirs`] over a delimited path string, relative to the
    /// cursor.
    pub fn mkdirs_by_path(&mut self, path: &str, delimiter: &str) -> bool {
        if path.is_empty() || delimiter.is_empty() {
            error!(path, delimiter, "invalid path or delimiter");
            return false;
        }
        let names: Vec<&str> = path.split(delimiter).collect();
        self.mkdirs(&names)
    }

    /// Assign the leaf `name` under the cursor.
    ///
    /// Directory-shaped values are rejected (directories are only created
    /// via `mkdir`). If `name` currently holds a directory it is removed
    /// first through [`Self::rm`], with its own validator gate — a vetoed
    /// removal aborts the set. Listeners observe the previous and new value
    /// after the assignment is visible to reads.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if let Err(err) = validate_name(name) {
            error!(%err, "set rejected");
            return false;
        }
        if value_is_dir_shaped(&value) {
            let err = TypeError::DirShapedValue {
                name: name.to_string(),
            };
            error!(%err, "set rejected");
            return false;
        }

        if self.is_dir(name) && !self.rm(name) {
            return false;
        }

        if !self.validators.check_value(&self.current_path, name, &value) {
            return false;
        }

        let prev = self.leaf_value(name);
        if let Err(err) = self.backend.write_leaf(&self.current_path, name, &value) {
            error!(path = %self.current_path.join("."), name, %err, "cannot write value");
            return false;
        }
        debug!(path = %self.current_path.join("."), name, %value, "value set");
        self.listeners
            .value_changed(&self.current_path, name, prev.as_ref(), &value);
        true
    }

    /// Remove the child `name` under the cursor, recursively destroying the
    /// whole subtree if it is a directory. Listeners observe the previous
    /// value (directory-shaped for a removed directory).
    pub fn rm(&mut self, name: &str) -> bool {
        let Some(child) = self.child(name) else {
            error!(path = %self.current_path.join("."), name, "not found");
            return false;
        };

        if !self.validators.check_rm(&self.current_path, name) {
            return false;
        }

        let prev = self.child_value(name, child);
        if let Err(err) = self.backend.delete_subtree(&self.current_path, name) {
            error!(path = %self.current_path.join("."), name, %err, "cannot remove");
            return false;
        }
        debug!(path = %self.current_path.join("."), name, "removed");
        self.listeners.removed(&self.current_path, name, &prev);
        true
    }

    /// Remove every child of the cursor directory via [`Self::rm`],
    /// short-circuiting to `false` on the first failure. Best-effort:
    /// already-removed children stay removed.
    pub fn clear(&mut self) -> bool {
        for name in self.names() {
            if !self.rm(&name) {
                return false;
            }
        }
        true
    }

    // -----------------------------------------------------------------------
    // Import / export
    // -----------------------------------------------------------------------

    /// Export the subtree at the cursor (not the whole tree) as a nested
    /// JSON value.
    pub fn to_object(&self) -> Option<Value> {
        let mut path = self.current_path.clone();
        match self.export_dir(&mut path) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(path = %self.current_path.join("."), %err, "export failed");
                None
            }
        }
    }

    /// Export the subtree at the cursor as a compact JSON string.
    pub fn to_json(&self) -> Option<String> {
        let value = self.to_object()?;
        match serde_json::to_string(&value) {
            Ok(json) => Some(json),
            Err(err) => {
                error!(%err, "serialization failed");
                None
            }
        }
    }

    /// Export the subtree at the cursor as JSON indented by `indent` spaces.
    pub fn to_json_pretty(&self, indent: usize) -> Option<String> {
        let value = self.to_object()?;
        let indent_bytes = vec![b' '; indent];
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        if let Err(err) = value.serialize(&mut ser) {
            error!(%err, "serialization failed");
            return None;
        }
        // serde_json emits valid UTF-8.
        String::from_utf8(out).ok()
    }

    /// Deep-merge a nested JSON object into the cursor directory:
    /// directory-shaped values are entered (created if needed) and recursed,
    /// everything else is `set`.
    ///
    /// Non-transactional: the first failure aborts the import, but mutations
    /// already applied are not rolled back. The cursor is restored on every
    /// exit path.
    pub fn from_object(&mut self, object: &Value) -> bool {
        let Value::Object(map) = object else {
            error!("import value must be directory-shaped, got {object}");
            return false;
        };
        let saved = self.current_path.clone();
        let ok = self.merge_object(map);
        self.current_path = saved;
        ok
    }

    /// Parse `json` and deep-merge it into the cursor directory.
    pub fn from_json(&mut self, json: &str) -> bool {
        match serde_json::from_str(json) {
            Ok(value) => self.from_object(&value),
            Err(err) => {
                error!(%err, "cannot parse import JSON");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Read a child, degrading backend failures to "absent" with a logged
    /// diagnostic. A genuinely missing name is not logged.
    fn child(&self, name: &str) -> Option<Child> {
        match self.backend.read_child(&self.current_path, name) {
            Ok(child) => child,
            Err(err) => {
                error!(path = %self.current_path.join("."), name, %err, "backend read failed");
                None
            }
        }
    }

    /// The leaf value at `name`, if the child exists and is a leaf.
    fn leaf_value(&self, name: &str) -> Option<Value> {
        match self.child(name) {
            Some(Child::Leaf(value)) => Some(value),
            _ => None,
        }
    }

    /// The JSON value of an already-read child: a leaf's value, or the
    /// exported subtree of a directory.
    fn child_value(&self, name: &str, child: Child) -> Value {
        match child {
            Child::Leaf(value) => value,
            Child::Dir => {
                let mut path = self.current_path.clone();
                path.push(name.to_string());
                self.export_dir(&mut path).unwrap_or_else(|err| {
                    error!(name, %err, "cannot export subtree, reporting it empty");
                    Value::Object(serde_json::Map::new())
                })
            }
        }
    }

    fn export_dir(&self, path: &mut Vec<String>) -> BackendResult<Value> {
        let names = self.backend.child_names(path)?;
        let mut map = serde_json::Map::with_capacity(names.len());
        for name in names {
            match self.backend.read_child(path, &name)? {
                Some(Child::Leaf(value)) => {
                    map.insert(name, value);
                }
                Some(Child::Dir) => {
                    path.push(name.clone());
                    let subtree = self.export_dir(path)?;
                    path.pop();
                    map.insert(name, subtree);
                }
                // Vanished between enumeration and read; skip.
                None => continue,
            }
        }
        Ok(Value::Object(map))
    }

    fn merge_object(&mut self, map: &serde_json::Map<String, Value>) -> bool {
        for (name, value) in map {
            match value {
                Value::Object(inner) => {
                    let entered = if self.is_dir(name) {
                        self.cd(&[name.as_str()])
                    } else {
                        self.mkdir(Some(name), true).is_some()
                    };
                    if !entered || !self.merge_object(inner) || !self.up() {
                        return false;
                    }
                }
                leaf => {
                    if !self.set(name, leaf.clone()) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl<B: StorageBackend> fmt::Debug for NodeStore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("current_path", &self.current_path)
            .field("validators", &self.validators.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
