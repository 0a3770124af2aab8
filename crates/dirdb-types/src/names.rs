//! Node name validation.
//!
//! Valid node names:
//! - Must be non-empty
//! - Must not contain `/`, `\`, or NUL
//! - Must not be `.` or `..`
//!
//! The last two rules keep every valid name usable as a single filesystem
//! path component, so the in-memory and file-backed stores accept the same
//! names.

use crate::error::TypeError;

/// Characters that are forbidden anywhere in a node name.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

/// Validate a node name (one path segment), returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use dirdb_types::validate_name;
///
/// assert!(validate_name("users").is_ok());
/// assert!(validate_name("user-42.profile").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("a/b").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), TypeError> {
    if name.is_empty() {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty".into(),
        });
    }

    for ch in FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return Err(TypeError::InvalidName {
                name: name.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
    }

    // `.` and `..` are path traversal, not names.
    if name == "." || name == ".." {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: "must not be '.' or '..'".into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_simple_names() {
        assert!(validate_name("users").is_ok());
        assert!(validate_name("age").is_ok());
        assert!(validate_name("my-node_42").is_ok());
        assert!(validate_name("v1.0").is_ok());
        assert!(validate_name("*").is_ok());
    }

    #[test]
    fn reject_empty_name() {
        assert!(validate_name("").is_err());
    }

    #[test]
    fn reject_path_separators() {
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name("/leading").is_err());
    }

    #[test]
    fn reject_nul() {
        assert!(validate_name("a\0b").is_err());
    }

    #[test]
    fn reject_dot_traversal() {
        assert!(validate_name(".").is_err());
        assert!(validate_name("..").is_err());
        // A leading dot is an ordinary (hidden) name, not traversal.
        assert!(validate_name(".hidden").is_ok());
        assert!(validate_name("...").is_ok());
    }

    #[test]
    fn errors_carry_the_offending_name() {
        let err = validate_name("a/b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid name \"a/b\": contains forbidden character: '/'"
        );
    }
}
