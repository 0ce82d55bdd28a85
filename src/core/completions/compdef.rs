//! Zsh-style compdef table: which completer serves which command.
//!
//! Mirrors `compdef _files vim vi cat` from zsh. The completers
//! themselves are plain functions over the filesystem snapshot.

use std::collections::BTreeMap;

use crate::core::filesystem::Filesystem;

/// Argument completer assigned to a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompleterKind {
    /// Directories and symlinks only (`cd`).
    Paths,
    /// Files plus directories, directories suffixed with `/` (`vim`, `cat`).
    Files,
    /// Project record names (`open`).
    Projects,
}

/// Default command-to-completer mapping.
pub fn default_compdefs() -> BTreeMap<&'static str, CompleterKind> {
    BTreeMap::from([
        ("cd", CompleterKind::Paths),
        ("vim", CompleterKind::Files),
        ("vi", CompleterKind::Files),
        ("cat", CompleterKind::Files),
        ("open", CompleterKind::Projects),
    ])
}

/// Split a prefix into the directory portion (slash included) and the
/// partial entry name being completed.
fn split_prefix(prefix: &str) -> (&str, &str) {
    match prefix.rfind('/') {
        Some(idx) => prefix.split_at(idx + 1),
        None => ("", prefix),
    }
}

/// Special tokens offered when the bare prefix starts like one of them.
fn special_paths(prefix: &str, base: &str) -> Vec<String> {
    let mut specials = Vec::new();
    if base.is_empty() {
        if prefix.starts_with('~') {
            specials.push("~/".to_string());
        }
        if prefix.starts_with('.') {
            specials.push("./".to_string());
            specials.push("../".to_string());
        }
        if prefix.starts_with('/') {
            specials.push("/".to_string());
        }
    }
    specials
}

fn retain_matches(mut options: Vec<String>, prefix: &str) -> Vec<String> {
    options.retain(|opt| opt.starts_with(prefix) && opt != prefix);
    options
}

/// Directory completion for `cd`: directories and symlinks, with nested
/// path support (`projects/ray<Tab>`).
pub fn complete_paths(fs: &Filesystem, prefix: &str, cwd: &str) -> Vec<String> {
    let (base, partial) = split_prefix(prefix);
    let search = if base.is_empty() {
        cwd.to_string()
    } else {
        fs.normalize(base.trim_end_matches('/'), cwd)
    };

    let mut options = Vec::new();
    if let Some(entries) = fs.list(&search) {
        for entry in entries {
            let include_hidden = partial.starts_with('.');
            if (entry.is_directory() || entry.is_symlink())
                && (!entry.is_hidden() || include_hidden)
            {
                options.push(format!("{}{}", base, entry.name));
            }
        }
    }
    options.extend(special_paths(prefix, base));
    retain_matches(options, prefix)
}

/// File completion for `vim`/`cat`: everything in the directory, with
/// `/` appended to directories so cycling can descend.
pub fn complete_files(fs: &Filesystem, prefix: &str, cwd: &str) -> Vec<String> {
    let (base, partial) = split_prefix(prefix);
    let search = if base.is_empty() {
        cwd.to_string()
    } else {
        fs.normalize(base.trim_end_matches('/'), cwd)
    };

    let mut options = Vec::new();
    if let Some(entries) = fs.list(&search) {
        for entry in entries {
            let include_hidden = partial.starts_with('.');
            if entry.is_hidden() && !include_hidden {
                continue;
            }
            if entry.is_directory() || entry.is_symlink() {
                options.push(format!("{}{}/", base, entry.name));
            } else {
                options.push(format!("{}{}", base, entry.name));
            }
        }
    }
    options.extend(special_paths(prefix, base));
    retain_matches(options, prefix)
}

/// Project-name completion for `open`.
pub fn complete_projects(project_names: &[String], prefix: &str) -> Vec<String> {
    project_names
        .iter()
        .filter(|name| name.starts_with(prefix) && name.as_str() != prefix)
        .cloned()
        .collect()
}
