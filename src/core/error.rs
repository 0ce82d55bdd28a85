//! Construction-time error types.
//!
//! User-facing command failures are data (`CommandResult::Error`), never
//! `Err`; this module covers the one fallible boundary the crate has,
//! building a [`crate::core::Filesystem`] from a seed.

use thiserror::Error;

/// Failure while parsing a seed or assembling the tree from it.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Seed JSON did not deserialize.
    #[error("invalid filesystem seed: {0}")]
    Parse(#[from] serde_json::Error),

    /// A symlink node without a target path.
    #[error("symlink '{path}' has no target")]
    MissingTarget { path: String },

    /// A file or executable node declaring children.
    #[error("{kind} '{path}' cannot have children")]
    ChildrenOnLeaf { path: String, kind: String },

    /// A dynamic marker on anything but a directory.
    #[error("dynamic marker on non-directory '{path}'")]
    DynamicOnLeaf { path: String },

    /// A spliced record colliding with a declared child.
    #[error("dynamic entry '{name}' collides with a declared child of '{path}'")]
    DynamicCollision { path: String, name: String },
}
