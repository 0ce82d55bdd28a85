use std::collections::BTreeMap;

/// Snapshot of one shell session's state.
///
/// Mutated only by the shell's own fold of command results; subscribers
/// and callers receive clones.
#[derive(Clone, Debug, PartialEq)]
pub struct ShellState {
    /// Current working directory, absolute and normalized.
    pub cwd: String,
    /// Path driving the visual pane; may lag `cwd` while viewing a file.
    pub view_path: String,
    pub current_project: Option<String>,
    pub editor_mode: Option<EditorMode>,
    /// Append-only command lines, oldest first.
    pub history: Vec<String>,
}

impl ShellState {
    pub fn new(home: impl Into<String>) -> Self {
        let home = home.into();
        Self {
            cwd: home.clone(),
            view_path: home,
            current_project: None,
            editor_mode: None,
            history: Vec::new(),
        }
    }
}

/// Modal viewer payload while the vim viewer is open.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorMode {
    pub file_path: String,
    pub content: String,
}

/// Value of one parsed flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlagValue {
    /// `-x` in a cluster, or bare `--key`.
    Switch,
    /// `--key=value`.
    Value(String),
}

/// One whitespace-tokenized chain segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedCommand {
    pub command: String,
    pub args: Vec<String>,
    pub flags: BTreeMap<String, FlagValue>,
}

impl ParsedCommand {
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn flag_value(&self, name: &str) -> Option<&str> {
        match self.flags.get(name) {
            Some(FlagValue::Value(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// What `execute` hands back to the caller for one submitted line.
///
/// `url_path` is an opaque address-bar hint produced by navigation
/// commands; the core never reads the address bar itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecuteResult {
    pub output: Option<String>,
    pub url_path: Option<String>,
    pub error: bool,
}
