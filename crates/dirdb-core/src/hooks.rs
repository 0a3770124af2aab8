//! The validator/listener hook protocol.
//!
//! Validators are gatekeepers consulted *before* a mutation: the chain has
//! AND semantics and short-circuits on the first explicit veto. Listeners
//! are observers notified *after* a mutation has taken effect, in
//! registration order; a failing listener is logged and never blocks the
//! remaining listeners or the caller.
//!
//! Each registered object declares once, at registration time, which hooks
//! it implements. Dispatch skips undeclared hooks; an object declaring no
//! hooks is rejected.

use std::rc::Rc;

use tracing::{debug, warn};

use dirdb_types::Value;

use crate::error::HookError;

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// The set of validator hooks a registered object implements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidatorHooks {
    /// Consulted by `set`: is this leaf value acceptable at this name?
    pub value: bool,
    /// Consulted by `mkdir`: may a directory be created with this name?
    pub mkdir: bool,
    /// Consulted by `rm`: may this name be removed?
    pub rm: bool,
}

impl ValidatorHooks {
    /// All three hooks.
    pub const ALL: Self = Self {
        value: true,
        mkdir: true,
        rm: true,
    };

    /// Returns `true` if no hook is declared.
    pub fn is_empty(&self) -> bool {
        !(self.value || self.mkdir || self.rm)
    }
}

/// A gatekeeper consulted before mutations.
///
/// Hooks receive the cursor path and the affected name. `None` means "no
/// opinion"; only `Some(false)` vetoes. A validator vetoing a mutation is
/// responsible for its own diagnostic.
pub trait Validator {
    /// Which hooks this validator implements. Checked once at registration.
    fn hooks(&self) -> ValidatorHooks;

    /// Is `value` acceptable as the leaf `name` under the directory at
    /// `path`?
    fn is_valid_value(&self, path: &[String], name: &str, value: &Value) -> Option<bool> {
        let _ = (path, name, value);
        None
    }

    /// May a directory `name` be created under the directory at `path`?
    fn dir_can_be_created(&self, path: &[String], name: &str) -> Option<bool> {
        let _ = (path, name);
        None
    }

    /// May the child `name` be removed from the directory at `path`?
    fn can_be_removed(&self, path: &[String], name: &str) -> Option<bool> {
        let _ = (path, name);
        None
    }
}

/// Ordered collection of validators with AND semantics.
#[derive(Default)]
pub struct ValidatorChain {
    validators: Vec<(ValidatorHooks, Rc<dyn Validator>)>,
}

impl ValidatorChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns `true` if no validator is registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Register a validator at the end of the chain.
    ///
    /// Rejects objects already registered (by identity) and objects
    /// declaring no hooks.
    pub fn register(&mut self, validator: Rc<dyn Validator>) -> Result<(), HookError> {
        if self
            .validators
            .iter()
            .any(|(_, existing)| std::ptr::addr_eq(Rc::as_ptr(existing), Rc::as_ptr(&validator)))
        {
            return Err(HookError::new("already registered as validator"));
        }
        let hooks = validator.hooks();
        if hooks.is_empty() {
            return Err(HookError::new(
                "validator must declare at least one hook (value, mkdir, rm)",
            ));
        }
        debug!(?hooks, "registering validator");
        self.validators.push((hooks, validator));
        Ok(())
    }

    /// Returns `false` if any validator with the `value` hook vetoes.
    pub fn check_value(&self, path: &[String], name: &str, value: &Value) -> bool {
        self.validators
            .iter()
            .filter(|(hooks, _)| hooks.value)
            .all(|(_, v)| v.is_valid_value(path, name, value) != Some(false))
    }

    /// Returns `false` if any validator with the `mkdir` hook vetoes.
    pub fn check_mkdir(&self, path: &[String], name: &str) -> bool {
        self.validators
            .iter()
            .filter(|(hooks, _)| hooks.mkdir)
            .all(|(_, v)| v.dir_can_be_created(path, name) != Some(false))
    }

    /// Returns `false` if any validator with the `rm` hook vetoes.
    pub fn check_rm(&self, path: &[String], name: &str) -> bool {
        self.validators
            .iter()
            .filter(|(hooks, _)| hooks.rm)
            .all(|(_, v)| v.can_be_removed(path, name) != Some(false))
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// The set of listener hooks a registered object implements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerHooks {
    /// Notified after `set` assigned a leaf value.
    pub value_changed: bool,
    /// Notified after `mkdir` created a directory.
    pub dir_created: bool,
    /// Notified after `rm` deleted a child.
    pub removed: bool,
}

impl ListenerHooks {
    /// All three hooks.
    pub const ALL: Self = Self {
        value_changed: true,
        dir_created: true,
        removed: true,
    };

    /// Returns `true` if no hook is declared.
    pub fn is_empty(&self) -> bool {
        !(self.value_changed || self.dir_created || self.removed)
    }
}

/// An observer notified after mutations have taken effect.
///
/// Reactions receive the cursor path, the affected name, and the previous
/// value (`None` when the name was previously absent). By the time a
/// reaction runs, the mutation is already visible to reads through the same
/// store. A returned error is logged by the broadcast and swallowed.
pub trait Listener {
    /// Which hooks this listener implements. Checked once at registration.
    fn hooks(&self) -> ListenerHooks;

    /// The leaf `name` under `path` changed from `prev` to `value`.
    fn value_changed(
        &self,
        path: &[String],
        name: &str,
        prev: Option<&Value>,
        value: &Value,
    ) -> Result<(), HookError> {
        let _ = (path, name, prev, value);
        Ok(())
    }

    /// A directory `name` was created under `path`.
    fn dir_created(
        &self,
        path: &[String],
        name: &str,
        prev: Option<&Value>,
    ) -> Result<(), HookError> {
        let _ = (path, name, prev);
        Ok(())
    }

    /// The child `name` under `path` was removed; `prev` is the removed
    /// value (directory-shaped for a removed directory).
    fn removed(&self, path: &[String], name: &str, prev: &Value) -> Result<(), HookError> {
        let _ = (path, name, prev);
        Ok(())
    }
}

/// Ordered collection of listeners invoked after every mutation.
#[derive(Default)]
pub struct ChangeBroadcast {
    listeners: Vec<(ListenerHooks, Rc<dyn Listener>)>,
}

impl ChangeBroadcast {
    /// Create an empty broadcast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Register a listener at the end of the broadcast.
    ///
    /// Rejects objects already registered (by identity) and objects
    /// declaring no hooks.
    pub fn register(&mut self, listener: Rc<dyn Listener>) -> Result<(), HookError> {
        if self
            .listeners
            .iter()
            .any(|(_, existing)| std::ptr::addr_eq(Rc::as_ptr(existing), Rc::as_ptr(&listener)))
        {
            return Err(HookError::new("already registered as listener"));
        }
        let hooks = listener.hooks();
        if hooks.is_empty() {
            return Err(HookError::new(
                "listener must declare at least one hook (value_changed, dir_created, removed)",
            ));
        }
        debug!(?hooks, "registering listener");
        self.listeners.push((hooks, listener));
        Ok(())
    }

    /// Deliver a value-change notification to every listener declaring it.
    pub fn value_changed(&self, path: &[String], name: &str, prev: Option<&Value>, value: &Value) {
        for (hooks, listener) in &self.listeners {
            if !hooks.value_changed {
                continue;
            }
            if let Err(err) = listener.value_changed(path, name, prev, value) {
                warn!(name, %err, "listener failed on value_changed");
            }
        }
    }

    /// Deliver a directory-created notification to every listener declaring
    /// it.
    pub fn dir_created(&self, path: &[String], name: &str, prev: Option<&Value>) {
        for (hooks, listener) in &self.listeners {
            if !hooks.dir_created {
                continue;
            }
            if let Err(err) = listener.dir_created(path, name, prev) {
                warn!(name, %err, "listener failed on dir_created");
            }
        }
    }

    /// Deliver a removal notification to every listener declaring it.
    pub fn removed(&self, path: &[String], name: &str, prev: &Value) {
        for (hooks, listener) in &self.listeners {
            if !hooks.removed {
                continue;
            }
            if let Err(err) = listener.removed(path, name, prev) {
                warn!(name, %err, "listener failed on removed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use serde_json::json;

    /// Validator vetoing every value whose name appears in its deny list.
    struct DenyList {
        names: Vec<String>,
    }

    impl Validator for DenyList {
        fn hooks(&self) -> ValidatorHooks {
            ValidatorHooks {
                value: true,
                ..Default::default()
            }
        }

        fn is_valid_value(&self, _path: &[String], name: &str, _value: &Value) -> Option<bool> {
            Some(!self.names.iter().any(|n| n == name))
        }
    }

    /// Validator claiming no hooks at all.
    struct Hookless;

    impl Validator for Hookless {
        fn hooks(&self) -> ValidatorHooks {
            ValidatorHooks::default()
        }
    }

    /// Listener recording every notification it receives.
    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl Listener for Recorder {
        fn hooks(&self) -> ListenerHooks {
            ListenerHooks::ALL
        }

        fn value_changed(
            &self,
            _path: &[String],
            name: &str,
            _prev: Option<&Value>,
            value: &Value,
        ) -> Result<(), HookError> {
            self.events.borrow_mut().push(format!("set {name}={value}"));
            Ok(())
        }

        fn removed(&self, _path: &[String], name: &str, _prev: &Value) -> Result<(), HookError> {
            self.events.borrow_mut().push(format!("rm {name}"));
            Ok(())
        }
    }

    /// Listener that always fails.
    struct Faulty;

    impl Listener for Faulty {
        fn hooks(&self) -> ListenerHooks {
            ListenerHooks::ALL
        }

        fn value_changed(
            &self,
            _path: &[String],
            _name: &str,
            _prev: Option<&Value>,
            _value: &Value,
        ) -> Result<(), HookError> {
            Err(HookError::new("broken on purpose"))
        }
    }

    #[test]
    fn empty_chain_approves_everything() {
        let chain = ValidatorChain::new();
        assert!(chain.check_value(&[], "x", &json!(1)));
        assert!(chain.check_mkdir(&[], "x"));
        assert!(chain.check_rm(&[], "x"));
    }

    #[test]
    fn any_veto_blocks() {
        let mut chain = ValidatorChain::new();
        chain
            .register(Rc::new(DenyList {
                names: vec!["secret".into()],
            }))
            .unwrap();
        assert!(chain.check_value(&[], "public", &json!(1)));
        assert!(!chain.check_value(&[], "secret", &json!(1)));
        // Hooks the validator did not declare are not consulted.
        assert!(chain.check_rm(&[], "secret"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut chain = ValidatorChain::new();
        let validator: Rc<dyn Validator> = Rc::new(DenyList { names: vec![] });
        assert!(chain.register(Rc::clone(&validator)).is_ok());
        assert!(chain.register(validator).is_err());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn hookless_validator_is_rejected() {
        let mut chain = ValidatorChain::new();
        assert!(chain.register(Rc::new(Hookless)).is_err());
        assert!(chain.is_empty());
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let mut broadcast = ChangeBroadcast::new();
        let first = Rc::new(Recorder::default());
        let second = Rc::new(Recorder::default());
        broadcast.register(first.clone()).unwrap();
        broadcast.register(second.clone()).unwrap();

        broadcast.value_changed(&[], "age", None, &json!(39));
        broadcast.removed(&[], "age", &json!(39));

        let expected = vec!["set age=39".to_string(), "rm age".to_string()];
        assert_eq!(*first.events.borrow(), expected);
        assert_eq!(*second.events.borrow(), expected);
    }

    #[test]
    fn failing_listener_does_not_block_others() {
        let mut broadcast = ChangeBroadcast::new();
        let recorder = Rc::new(Recorder::default());
        broadcast.register(Rc::new(Faulty)).unwrap();
        broadcast.register(recorder.clone()).unwrap();

        broadcast.value_changed(&[], "x", None, &json!(true));
        assert_eq!(recorder.events.borrow().len(), 1);
    }
}
