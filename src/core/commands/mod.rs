//! Command trait and registry.
//!
//! Each builtin is a zero-sized type implementing [`Command`]. The
//! [`CommandRegistry`] owns one instance of each, plus the alias table
//! that maps `vi` onto `vim` and the editor escape hatches onto `:q`.

pub mod builtins;
pub mod result;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::core::filesystem::Filesystem;
use crate::models::{ParsedCommand, ProjectRecord};

pub use result::{CommandResult, Effects, ProjectEffect};

// ===== Context =====

/// Everything a command may read while running.
///
/// Borrowed views of shell state; commands cannot mutate through it.
pub struct ShellContext<'a> {
    pub fs: &'a Arc<Filesystem>,
    pub cwd: &'a str,
    pub view_path: Option<&'a str>,
    pub current_project: Option<&'a str>,
    pub history: &'a [String],
    pub projects: &'a [ProjectRecord],
    /// Visible commands, for `help`.
    pub commands: &'a [CommandInfo],
}

/// Static description of one command, surfaced by `help`.
#[derive(Clone, Debug)]
pub struct CommandInfo {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

// ===== Trait =====

/// One shell builtin.
pub trait Command: Send + Sync {
    /// Canonical name the interpreter dispatches on.
    fn name(&self) -> &'static str;

    /// One-line summary for `help`.
    fn description(&self) -> &'static str;

    /// Invocation synopsis for `help`.
    fn usage(&self) -> &'static str {
        self.name()
    }

    /// Execute against a read-only view of shell state.
    fn run(&self, parsed: &ParsedCommand, ctx: &ShellContext<'_>) -> CommandResult;
}

// ===== Registry =====

/// Lookup table from command name (or alias) to implementation.
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Box<dyn Command>>,
    aliases: BTreeMap<&'static str, &'static str>,
    hidden: BTreeSet<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
            aliases: BTreeMap::new(),
            hidden: BTreeSet::new(),
        }
    }

    /// Registry populated with every builtin and the standard aliases.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(builtins::Cd));
        registry.register(Box::new(builtins::Ls));
        registry.register(Box::new(builtins::Cat));
        registry.register(Box::new(builtins::Vim));
        registry.register(Box::new(builtins::Open));
        registry.register(Box::new(builtins::Help));
        registry.register(Box::new(builtins::History));
        registry.register(Box::new(builtins::Clear));
        registry.register(Box::new(builtins::Whoami));
        registry.register_hidden(Box::new(builtins::QuitEditor));
        registry.alias("vi", "vim");
        registry.alias(":q!", ":q");
        registry.alias(":wq", ":q");
        registry
    }

    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.insert(command.name(), command);
    }

    /// Register a command that `help` and completion never list.
    pub fn register_hidden(&mut self, command: Box<dyn Command>) {
        self.hidden.insert(command.name());
        self.commands.insert(command.name(), command);
    }

    pub fn alias(&mut self, alias: &'static str, canonical: &'static str) {
        self.aliases.insert(alias, canonical);
    }

    fn lookup(&self, name: &str) -> Option<&dyn Command> {
        let canonical = self.aliases.get(name).copied().unwrap_or(name);
        self.commands.get(canonical).map(Box::as_ref)
    }

    /// Names offered by completion: visible canonical names plus `vi`.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .keys()
            .filter(|name| !self.hidden.contains(*name))
            .map(|name| name.to_string())
            .collect();
        names.extend(
            self.aliases
                .keys()
                .filter(|alias| !alias.starts_with(':'))
                .map(|alias| alias.to_string()),
        );
        names.sort();
        names
    }

    /// Info rows for the `help` table, in name order.
    pub fn visible_info(&self) -> Vec<CommandInfo> {
        self.commands
            .values()
            .filter(|command| !self.hidden.contains(command.name()))
            .map(|command| CommandInfo {
                name: command.name(),
                usage: command.usage(),
                description: command.description(),
            })
            .collect()
    }

    /// Dispatch one parsed command.
    pub fn run(&self, parsed: &ParsedCommand, ctx: &ShellContext<'_>) -> CommandResult {
        match self.lookup(&parsed.command) {
            Some(command) => {
                debug!(command = %parsed.command, args = ?parsed.args, "dispatch");
                command.run(parsed, ctx)
            }
            None => CommandResult::error(format!(
                "command not found: {}. Type 'help' for available commands.",
                parsed.command
            )),
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
