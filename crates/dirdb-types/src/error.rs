use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A path segment is not usable as a node name.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A directory-shaped value arrived where a leaf was required.
    #[error("value for {name:?} is directory-shaped; directories are only created via mkdir")]
    DirShapedValue { name: String },

    /// A non-object value arrived where a directory listing was required.
    #[error("cannot build a directory from non-object value {value}")]
    NotAnObject { value: String },
}
