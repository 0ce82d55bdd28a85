//! Plain data types shared across the crate.
//!
//! Contains domain types for:
//! - [`FsNode`] and the serde-facing filesystem seed description
//! - [`ProjectRecord`] dynamic records spliced into the tree at build time
//! - [`ShellState`] snapshots and the parsed command shape

mod filesystem;
mod project;
mod shell;

pub use filesystem::{DynamicKind, FilesystemSeed, FsNode, FsNodeKind, NodeSeed};
pub use project::ProjectRecord;
pub use shell::{EditorMode, ExecuteResult, FlagValue, ParsedCommand, ShellState};
