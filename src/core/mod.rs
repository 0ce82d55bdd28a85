//! Core logic for the virtual shell.
//!
//! This module provides:
//! - [`Filesystem`] immutable virtual filesystem with symlinks
//! - [`CommandRegistry`] builtin commands and dispatch
//! - [`Shell`] session state, chaining and subscriptions
//! - [`CompletionEngine`] / [`MenuComplete`] zsh-style tab completion
//! - [`VimViewer`] modal read-only file viewer

pub mod commands;
pub mod completions;
pub mod error;
pub mod filesystem;
pub mod shell;
pub mod vim;

pub use commands::{Command, CommandRegistry, CommandResult, Effects, ProjectEffect, ShellContext};
pub use completions::{CompletionEngine, CompletionResult, MenuComplete};
pub use error::SeedError;
pub use filesystem::{Filesystem, ResolvedPath};
pub use shell::{parse_command, Shell, SubscriptionId};
pub use vim::{VimFrame, VimSignal, VimViewer};
