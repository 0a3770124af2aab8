//! The DirDB node store.
//!
//! This crate is the heart of DirDB. It provides:
//! - [`NodeStore`] — cursor navigation and the four mutation verbs
//!   (`mkdir`, `set`, `rm`, `get`) plus recursive import/export
//! - The [`StorageBackend`] trait boundary and [`MemoryBackend`]
//! - The validator/listener hook protocol ([`ValidatorChain`],
//!   [`ChangeBroadcast`])
//! - A scripted [`selftest`] harness runnable against any backend
//!
//! # Design Rules
//!
//! 1. The cursor is only a path; the directory it denotes is re-resolved
//!    through the backend on every operation, so the two cannot diverge.
//! 2. The store consults every relevant validator before a mutation (any
//!    explicit veto blocks it), mutates the backend synchronously, then
//!    notifies listeners in registration order.
//! 3. A failing listener is logged and never blocks other listeners or the
//!    caller.
//! 4. Public operations report failure as `false` / `None` with a logged
//!    diagnostic; `Result` is used at the backend seam only.
//! 5. Backend I/O failures degrade to "absent value" on reads and "no-op"
//!    on writes, never to a panic or a hard abort.

pub mod error;
pub mod hooks;
pub mod memory;
pub mod selftest;
pub mod store;
pub mod traits;

pub use error::{BackendError, BackendResult, HookError, SelfTestError};
pub use hooks::{
    ChangeBroadcast, Listener, ListenerHooks, Validator, ValidatorChain, ValidatorHooks,
};
pub use memory::MemoryBackend;
pub use store::NodeStore;
pub use traits::{Child, StorageBackend};
