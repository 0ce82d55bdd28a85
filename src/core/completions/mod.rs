//! Zsh-style completion system.
//!
//! Two completer stages tried in order, first hit wins:
//! 1. command names (first word, unless it already looks like a path),
//! 2. argument completion through the compdef table.
//!
//! [`MenuComplete`] layers zsh's menu-complete widget on top for Tab
//! cycling; it lives with the input loop, not the shell.

pub mod compdef;
pub mod menu;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::filesystem::Filesystem;

pub use compdef::CompleterKind;
pub use menu::{MenuComplete, MenuOutcome, MenuView};

const PATH_PREFIXES: [&str; 4] = ["./", "../", "~/", "/"];

fn is_path_like(prefix: &str) -> bool {
    PATH_PREFIXES.iter().any(|p| prefix.starts_with(p))
}

// ===== Context =====

/// Parsed view of the input buffer at completion time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionContext {
    pub buffer: String,
    pub words: Vec<String>,
    /// Index of the word being completed. Equals `words.len()` when the
    /// buffer ends in a space (a fresh empty word).
    pub current: usize,
    /// The partial word under the cursor, empty after a trailing space.
    pub prefix: String,
}

impl CompletionContext {
    pub fn new(buffer: &str) -> Self {
        let trimmed = buffer.trim_start();
        let ends_with_space = !buffer.is_empty() && buffer.ends_with(' ');
        let words: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();
        let current = if ends_with_space {
            words.len()
        } else {
            words.len().saturating_sub(1)
        };
        let prefix = if ends_with_space {
            String::new()
        } else {
            words.get(current).cloned().unwrap_or_default()
        };
        Self {
            buffer: buffer.to_string(),
            words,
            current,
            prefix,
        }
    }
}

// ===== Results =====

/// Which stage produced the candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Command,
    Path,
    Argument,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionResult {
    pub completions: Vec<String>,
    pub kind: CompletionKind,
    pub common_prefix: String,
}

/// Longest prefix shared by all candidates. A single candidate is its
/// own common prefix.
pub fn common_prefix(candidates: &[String]) -> String {
    let Some(first) = candidates.first() else {
        return String::new();
    };
    let mut prefix = first.clone();
    for candidate in &candidates[1..] {
        while !candidate.starts_with(prefix.as_str()) {
            prefix.pop();
            if prefix.is_empty() {
                return prefix;
            }
        }
    }
    prefix
}

// ===== Engine =====

/// Stateless candidate generator over a filesystem snapshot.
pub struct CompletionEngine {
    fs: Arc<Filesystem>,
    command_names: Vec<String>,
    project_names: Vec<String>,
    compdefs: BTreeMap<&'static str, CompleterKind>,
}

impl CompletionEngine {
    pub fn new(
        fs: Arc<Filesystem>,
        command_names: Vec<String>,
        project_names: Vec<String>,
    ) -> Self {
        Self {
            fs,
            command_names,
            project_names,
            compdefs: compdef::default_compdefs(),
        }
    }

    /// Candidate list only.
    pub fn complete(&self, buffer: &str, cwd: &str) -> Vec<String> {
        self.completion_result(buffer, cwd)
            .map(|result| result.completions)
            .unwrap_or_default()
    }

    /// Full result with stage kind and common prefix.
    pub fn completion_result(&self, buffer: &str, cwd: &str) -> Option<CompletionResult> {
        let ctx = CompletionContext::new(buffer);
        self.complete_command(&ctx)
            .or_else(|| self.complete_argument(&ctx, cwd))
            .map(|(completions, kind)| {
                let common = common_prefix(&completions);
                CompletionResult {
                    completions,
                    kind,
                    common_prefix: common,
                }
            })
    }

    /// Stage 1: first-word command names. Cedes path-like prefixes to
    /// the argument stage and stays quiet on an empty buffer.
    fn complete_command(&self, ctx: &CompletionContext) -> Option<(Vec<String>, CompletionKind)> {
        if ctx.current != 0 || ctx.prefix.is_empty() || is_path_like(&ctx.prefix) {
            return None;
        }

        let matches: Vec<String> = self
            .command_names
            .iter()
            .filter(|name| name.starts_with(&ctx.prefix))
            .cloned()
            .collect();

        if matches.is_empty() {
            return None;
        }

        // An exact unique match completes to "name " so the next Tab
        // moves on to argument completion.
        if matches.len() == 1 && matches[0] == ctx.prefix {
            return Some((vec![format!("{} ", ctx.prefix)], CompletionKind::Command));
        }

        Some((matches, CompletionKind::Command))
    }

    /// Stage 2: compdef-mapped argument completion. Also catches a
    /// path-like first word (the AUTO_CD spelling of `cd`).
    fn complete_argument(
        &self,
        ctx: &CompletionContext,
        cwd: &str,
    ) -> Option<(Vec<String>, CompletionKind)> {
        let completer = if ctx.current == 0 && is_path_like(&ctx.prefix) {
            CompleterKind::Files
        } else if ctx.current >= 1 {
            let command = ctx.words.first()?;
            *self.compdefs.get(command.as_str())?
        } else {
            return None;
        };

        let completions = match completer {
            CompleterKind::Paths => compdef::complete_paths(&self.fs, &ctx.prefix, cwd),
            CompleterKind::Files => compdef::complete_files(&self.fs, &ctx.prefix, cwd),
            CompleterKind::Projects => compdef::complete_projects(&self.project_names, &ctx.prefix),
        };

        if completions.is_empty() {
            return None;
        }

        let kind = match completer {
            CompleterKind::Projects => CompletionKind::Argument,
            _ => CompletionKind::Path,
        };
        Some((completions, kind))
    }
}
