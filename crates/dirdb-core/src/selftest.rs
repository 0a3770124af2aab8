//! Scripted self-test harness.
//!
//! A fixed assertion sequence exercising navigation, the mutation verbs,
//! auto-named directories, and export/import, runnable against any backend.
//! Unlike the store itself, the harness reports failure as an error value
//! carrying the failed assertion.
//!
//! The harness installs a deterministic counter name generator and leaves
//! its scratch data behind in the store; run it against a throwaway store.

use serde_json::json;
use tracing::info;

use crate::error::SelfTestError;
use crate::store::NodeStore;
use crate::traits::StorageBackend;

macro_rules! check {
    ($cond:expr, $what:expr) => {
        if $cond {
            info!("checking {}: passed", $what);
        } else {
            return Err(SelfTestError($what.to_string()));
        }
    };
}

/// Run the scripted assertions against `store`.
pub fn run<B: StorageBackend>(store: &mut NodeStore<B>) -> Result<(), SelfTestError> {
    let mut counter = 0u64;
    store.set_name_generator(move || {
        counter += 1;
        counter.to_string()
    });
    store.cd_root();

    check!(
        store.mkdir(Some("users"), true).as_deref() == Some("users"),
        r#"mkdir("users") enters users"#
    );

    let generated = store
        .mkdir(None, false)
        .ok_or_else(|| SelfTestError("auto-named mkdir generates a name".into()))?;

    check!(store.str_path(".", &[]) == "users", r#"path is "users""#);
    check!(
        !store.cd(&["not_existent"]),
        "cd into a missing name fails"
    );
    check!(
        store.cd(&[generated.as_str()]),
        "cd into the generated directory"
    );
    check!(
        store.path_matches(&["users", "*"]),
        r#"path matches ["users", "*"]"#
    );

    check!(
        !store.set("name", json!({})),
        "setting a directory-shaped value fails"
    );
    check!(store.set("name", json!("Michael")), r#"set "name""#);
    check!(store.set("age", json!(39)), r#"set "age""#);

    check!(store.up(), "up from the generated directory");
    check!(store.str_path(".", &[]) == "users", r#"path is back to "users""#);

    let second = store
        .mkdir(None, true)
        .ok_or_else(|| SelfTestError("second auto-named mkdir".into()))?;
    check!(second != generated, "generated names are distinct");
    check!(store.set("name", json!("Stefan")), r#"set second "name""#);
    check!(store.set("age", json!(29)), r#"set second "age""#);

    store.cd_root();
    let exported = store
        .to_json()
        .ok_or_else(|| SelfTestError("export the tree".into()))?;

    check!(store.str_path(".", &[]) == "", "root path is empty");
    check!(
        store.str_path("/", &["users", "test"]) == "users/test",
        "str_path appends extra segments"
    );
    check!(!store.up(), "up at root fails");
    check!(store.clear(), "clear the root directory");
    check!(store.names().is_empty(), "names are empty after clear");
    check!(store.from_json(&exported), "re-import the export");
    check!(
        store.to_json().as_deref() == Some(exported.as_str()),
        "round-trip export is identical"
    );

    let leaf_path = format!("users/{generated}/name");
    check!(
        store.cd_by_path(&leaf_path, false, "/").is_none(),
        "cd_by_path into a leaf fails"
    );
    check!(
        store.cd_by_path(&leaf_path, true, "/").as_deref() == Some("name"),
        "cd_by_path resolves the parent and returns the leaf name"
    );
    check!(
        store.get("name") == Some(json!("Michael")),
        r#"get "name" after cd_by_path"#
    );

    store.cd_root();
    check!(
        store.mkdirs(&["users", "sub_user", "michael", "rights"]),
        "mkdirs through existing and new directories"
    );
    check!(
        store.str_path(".", &[]) == "users.sub_user.michael.rights",
        "path reflects the mkdirs chain"
    );

    store.cd_root();
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::store::NodeStore;

    #[test]
    fn harness_passes_on_a_memory_store() {
        let mut store = NodeStore::in_memory();
        super::run(&mut store).unwrap();
    }

    #[test]
    fn harness_is_rerunnable_on_the_same_store() {
        let mut store = NodeStore::in_memory();
        super::run(&mut store).unwrap();
        super::run(&mut store).unwrap();
    }
}
