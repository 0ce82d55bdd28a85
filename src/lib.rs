//! vsh: an embeddable virtual shell.
//!
//! A read-only virtual filesystem, a command interpreter with `&&`/`;`
//! chaining, zsh-style tab completion with menu cycling, and a modal
//! vim-like file viewer. Everything runs in-process; the host owns the
//! terminal and subscribes to state snapshots.
//!
//! ```
//! use vsh::core::Shell;
//!
//! let mut shell = Shell::bootstrap(Vec::new()).unwrap();
//! let result = shell.execute("cd projects && ls");
//! assert!(!result.error);
//! ```

pub mod config;
pub mod core;
pub mod models;

pub use core::{Shell, VimViewer};
pub use models::{ExecuteResult, ShellState};
