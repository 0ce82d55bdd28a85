//! Shell orchestrator.
//!
//! Owns the mutable session state and wires the filesystem, command
//! registry and completion engine together. Commands return
//! [`CommandResult`] values; only this module folds them into state.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::config;
use crate::core::commands::{
    CommandInfo, CommandRegistry, CommandResult, Effects, ProjectEffect, ShellContext,
};
use crate::core::completions::{CompletionEngine, CompletionResult};
use crate::core::error::SeedError;
use crate::core::filesystem::Filesystem;
use crate::models::{EditorMode, ExecuteResult, FlagValue, ParsedCommand, ProjectRecord, ShellState};

/// Chain separators, kept while splitting so each segment knows how it
/// was joined to the one before it.
static CHAIN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(&&|;)\s*").expect("chain separator pattern is valid"));

const PATH_PREFIXES: [&str; 4] = ["./", "../", "~/", "/"];

fn is_path_like(token: &str) -> bool {
    PATH_PREFIXES.iter().any(|p| token.starts_with(p))
        || matches!(token, "." | ".." | "~")
}

/// How a chain segment is joined to its predecessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChainOp {
    /// First segment, or after `;`.
    Always,
    /// After `&&`.
    And,
}

/// Handle returned by [`Shell::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ShellState)>;

/// One interactive session over a shared filesystem snapshot.
pub struct Shell {
    fs: Arc<Filesystem>,
    registry: CommandRegistry,
    completions: CompletionEngine,
    projects: Vec<ProjectRecord>,
    command_info: Vec<CommandInfo>,
    state: ShellState,
    listeners: BTreeMap<u64, Listener>,
    next_subscription: u64,
}

impl Shell {
    pub fn new(
        fs: Arc<Filesystem>,
        registry: CommandRegistry,
        completions: CompletionEngine,
        projects: Vec<ProjectRecord>,
    ) -> Self {
        let command_info = registry.visible_info();
        let state = ShellState::new(fs.home());
        Self {
            fs,
            registry,
            completions,
            projects,
            command_info,
            state,
            listeners: BTreeMap::new(),
            next_subscription: 0,
        }
    }

    /// Session starting somewhere other than home (deep links).
    pub fn with_cwd(
        fs: Arc<Filesystem>,
        registry: CommandRegistry,
        completions: CompletionEngine,
        projects: Vec<ProjectRecord>,
        cwd: impl Into<String>,
    ) -> Self {
        let mut shell = Self::new(fs, registry, completions, projects);
        let cwd = cwd.into();
        shell.state.view_path = cwd.clone();
        shell.state.cwd = cwd;
        shell
    }

    /// Build a complete session from the built-in seed.
    pub fn bootstrap(projects: Vec<ProjectRecord>) -> Result<Self, SeedError> {
        let seed = config::default_seed()?;
        let fs = Arc::new(Filesystem::build(&seed, &projects)?);
        let registry = CommandRegistry::with_builtins();
        let project_names = projects.iter().map(|p| p.name.clone()).collect();
        let completions = CompletionEngine::new(Arc::clone(&fs), registry.names(), project_names);
        Ok(Self::new(fs, registry, completions, projects))
    }

    // ===== Execution =====

    /// Run one input line, chains included. Notifies subscribers once.
    pub fn execute(&mut self, input: &str) -> ExecuteResult {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ExecuteResult::default();
        }

        self.state.history.push(trimmed.to_string());
        debug!(input = trimmed, "execute");

        let mut last = ExecuteResult::default();
        let mut failed = false;
        for (op, segment) in split_chain(trimmed) {
            if op == ChainOp::And && failed {
                continue;
            }
            let result = self.execute_single(&segment);
            failed = result.error;
            last = result;
        }

        self.notify();
        last
    }

    fn execute_single(&mut self, input: &str) -> ExecuteResult {
        let mut parsed = parse_command(input);
        if parsed.command.is_empty() {
            return ExecuteResult::default();
        }

        // Bare path tokens act as an implicit cd.
        if is_path_like(&parsed.command) {
            match self.auto_cd(&parsed.command) {
                Ok(rewritten) => parsed = rewritten,
                Err(message) => {
                    return ExecuteResult {
                        output: Some(message.clone()),
                        url_path: None,
                        error: true,
                    };
                }
            }
        }

        let ctx = ShellContext {
            fs: &self.fs,
            cwd: &self.state.cwd,
            view_path: Some(&self.state.view_path),
            current_project: self.state.current_project.as_deref(),
            history: &self.state.history,
            projects: &self.projects,
            commands: &self.command_info,
        };
        let result = self.registry.run(&parsed, &ctx);
        self.fold_result(result)
    }

    /// Rewrite a path-like token into `cd <token>`, or report why not.
    fn auto_cd(&self, token: &str) -> Result<ParsedCommand, String> {
        let target = self.fs.normalize(token, &self.state.cwd);
        match self.fs.resolve(&target) {
            Some(node) if node.is_directory() => Ok(ParsedCommand {
                command: "cd".to_string(),
                args: vec![token.to_string()],
                flags: BTreeMap::new(),
            }),
            Some(_) => Err(format!("vsh: not a directory: {}", token)),
            None => Err(format!("vsh: no such file or directory: {}", token)),
        }
    }

    fn fold_result(&mut self, result: CommandResult) -> ExecuteResult {
        match result {
            CommandResult::Success(effects) => {
                let url_path = effects.url_path.clone();
                let output = effects.output.clone();
                self.apply_effects(effects);
                ExecuteResult {
                    output,
                    url_path,
                    error: false,
                }
            }
            CommandResult::Silent(effects) => {
                let url_path = effects.url_path.clone();
                self.apply_effects(effects);
                ExecuteResult {
                    output: None,
                    url_path,
                    error: false,
                }
            }
            CommandResult::Error { message } => ExecuteResult {
                output: Some(message),
                url_path: None,
                error: true,
            },
            CommandResult::EnterEditor {
                file_path,
                content,
                view_path,
                url_path,
            } => {
                if let Some(view_path) = view_path {
                    self.state.view_path = view_path;
                }
                self.state.editor_mode = Some(EditorMode { file_path, content });
                ExecuteResult {
                    output: None,
                    url_path,
                    error: false,
                }
            }
        }
    }

    fn apply_effects(&mut self, effects: Effects) {
        if let Some(cwd) = effects.new_cwd {
            self.state.cwd = cwd;
        }
        if let Some(view_path) = effects.view_path {
            self.state.view_path = view_path;
        }
        match effects.project {
            ProjectEffect::Keep => {}
            ProjectEffect::Clear => self.state.current_project = None,
            ProjectEffect::Set(name) => self.state.current_project = Some(name),
        }
    }

    // ===== Editor =====

    pub fn is_editor_mode(&self) -> bool {
        self.state.editor_mode.is_some()
    }

    pub fn editor_mode(&self) -> Option<&EditorMode> {
        self.state.editor_mode.as_ref()
    }

    /// External close path for the viewer; notifies subscribers.
    pub fn exit_editor(&mut self) {
        if self.state.editor_mode.take().is_some() {
            self.notify();
        }
    }

    // ===== Completion =====

    pub fn complete(&self, buffer: &str) -> Vec<String> {
        self.completions.complete(buffer, &self.state.cwd)
    }

    pub fn completions(&self, buffer: &str) -> Option<CompletionResult> {
        self.completions.completion_result(buffer, &self.state.cwd)
    }

    pub fn completion_engine(&self) -> &CompletionEngine {
        &self.completions
    }

    // ===== Subscriptions =====

    /// Register a listener called with a state snapshot after every
    /// `execute` and `exit_editor`.
    pub fn subscribe(&mut self, listener: impl FnMut(&ShellState) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.insert(id, Box::new(listener));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id.0).is_some()
    }

    fn notify(&mut self) {
        let snapshot = self.state.clone();
        for listener in self.listeners.values_mut() {
            listener(&snapshot);
        }
    }

    // ===== State access =====

    pub fn cwd(&self) -> &str {
        &self.state.cwd
    }

    pub fn view_path(&self) -> &str {
        &self.state.view_path
    }

    pub fn current_project(&self) -> Option<&str> {
        self.state.current_project.as_deref()
    }

    pub fn history(&self) -> &[String] {
        &self.state.history
    }

    pub fn state(&self) -> ShellState {
        self.state.clone()
    }

    pub fn filesystem(&self) -> &Arc<Filesystem> {
        &self.fs
    }
}

/// Split a chain on `&&` / `;`, pairing every segment with the operator
/// that joins it to the previous one.
fn split_chain(input: &str) -> Vec<(ChainOp, String)> {
    let mut segments = Vec::new();
    let mut op = ChainOp::Always;
    let mut start = 0;
    for sep in CHAIN_SEPARATOR.captures_iter(input) {
        let Some(whole) = sep.get(0) else { continue };
        let segment = &input[start..whole.start()];
        if !segment.trim().is_empty() {
            segments.push((op, segment.trim().to_string()));
        }
        op = match sep.get(1).map(|m| m.as_str()) {
            Some("&&") => ChainOp::And,
            _ => ChainOp::Always,
        };
        start = whole.end();
    }
    let tail = &input[start..];
    if !tail.trim().is_empty() {
        segments.push((op, tail.trim().to_string()));
    }
    segments
}

/// Tokenize one segment: whitespace words, `--key[=value]` long flags,
/// `-abc` short-flag clusters, everything else positional.
pub fn parse_command(input: &str) -> ParsedCommand {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default().to_string();
    let mut args = Vec::new();
    let mut flags = BTreeMap::new();

    for part in parts {
        if let Some(long) = part.strip_prefix("--") {
            match long.split_once('=') {
                Some((key, value)) => {
                    flags.insert(key.to_string(), FlagValue::Value(value.to_string()));
                }
                None => {
                    flags.insert(long.to_string(), FlagValue::Switch);
                }
            }
        } else if let Some(cluster) = part.strip_prefix('-') {
            if cluster.is_empty() {
                args.push(part.to_string());
            } else {
                for ch in cluster.chars() {
                    flags.insert(ch.to_string(), FlagValue::Switch);
                }
            }
        } else {
            args.push(part.to_string());
        }
    }

    ParsedCommand {
        command,
        args,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn record(name: &str) -> ProjectRecord {
        ProjectRecord {
            name: name.to_string(),
            description: format!("{} description", name),
            url: format!("https://example.com/{}", name),
            language: Some("Rust".to_string()),
            stars: 1,
            updated_at: "2024-01-01".to_string(),
            readme: format!("# {}", name),
        }
    }

    fn create_test_shell() -> Shell {
        Shell::bootstrap(vec![record("raycaster"), record("weather-cli")])
            .expect("bootstrap succeeds")
    }

    #[test]
    fn test_parse_command_flags_and_args() {
        let parsed = parse_command("ls -la projects --sort=name --color");
        assert_eq!(parsed.command, "ls");
        assert_eq!(parsed.args, vec!["projects"]);
        assert!(parsed.has_flag("l"));
        assert!(parsed.has_flag("a"));
        assert!(parsed.has_flag("color"));
        assert_eq!(parsed.flag_value("sort"), Some("name"));
    }

    #[test]
    fn test_split_chain_operators() {
        let segments = split_chain("cd a && ls ; pwd");
        assert_eq!(
            segments,
            vec![
                (ChainOp::Always, "cd a".to_string()),
                (ChainOp::And, "ls".to_string()),
                (ChainOp::Always, "pwd".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_input_is_a_no_op() {
        let mut shell = create_test_shell();
        let result = shell.execute("   ");
        assert_eq!(result, ExecuteResult::default());
        assert!(shell.history().is_empty());
    }

    #[test]
    fn test_history_appends_in_order() {
        let mut shell = create_test_shell();
        shell.execute("ls");
        shell.execute("cd projects");
        shell.execute("ls -l");
        assert_eq!(shell.history(), ["ls", "cd projects", "ls -l"]);
    }

    #[test]
    fn test_and_chain_short_circuits() {
        let mut shell = create_test_shell();
        let result = shell.execute("cd nonexistent && ls");
        assert!(result.error);
        assert_eq!(
            result.output.as_deref(),
            Some("cd: nonexistent: No such file or directory")
        );
        assert_eq!(shell.cwd(), "/home/guest");
    }

    #[test]
    fn test_semicolon_chain_continues() {
        let mut shell = create_test_shell();
        let result = shell.execute("cd nonexistent ; ls");
        assert!(!result.error);
        assert!(result.output.is_some_and(|o| o.contains("projects/")));
    }

    #[test]
    fn test_cd_projects_then_ls() {
        let mut shell = create_test_shell();
        let result = shell.execute("cd projects && ls");
        assert!(!result.error);
        assert_eq!(shell.cwd(), "/home/guest/projects");
        let output = result.output.expect("ls output");
        assert!(output.contains("raycaster.md"));
        assert!(output.contains("weather-cli.md"));
    }

    #[test]
    fn test_cd_symlink_then_parent() {
        let mut shell = create_test_shell();
        shell.execute("cd staff");
        assert_eq!(shell.cwd(), "/home/staff");
        shell.execute("cd ..");
        assert_eq!(shell.cwd(), "/home");
    }

    #[test]
    fn test_command_not_found() {
        let mut shell = create_test_shell();
        let result = shell.execute("frobnicate");
        assert!(result.error);
        assert_eq!(
            result.output.as_deref(),
            Some("command not found: frobnicate. Type 'help' for available commands.")
        );
    }

    #[test]
    fn test_auto_cd_on_directory() {
        let mut shell = create_test_shell();
        let result = shell.execute("..");
        assert!(!result.error);
        assert_eq!(shell.cwd(), "/home");

        shell.execute("~/projects");
        assert_eq!(shell.cwd(), "/home/guest/projects");
    }

    #[test]
    fn test_auto_cd_errors() {
        let mut shell = create_test_shell();
        let result = shell.execute("./about.md");
        assert!(result.error);
        assert_eq!(
            result.output.as_deref(),
            Some("vsh: not a directory: ./about.md")
        );

        let result = shell.execute("/ghost");
        assert!(result.error);
        assert_eq!(
            result.output.as_deref(),
            Some("vsh: no such file or directory: /ghost")
        );
    }

    #[test]
    fn test_vim_enters_editor_mode() {
        let mut shell = create_test_shell();
        let result = shell.execute("vim about.md");
        assert!(!result.error);
        assert!(shell.is_editor_mode());
        let mode = shell.editor_mode().expect("editor mode set");
        assert_eq!(mode.file_path, "/home/guest/about.md");

        shell.exit_editor();
        assert!(!shell.is_editor_mode());
    }

    #[test]
    fn test_cat_project_updates_current_project() {
        let mut shell = create_test_shell();
        shell.execute("cat projects/raycaster.md");
        assert_eq!(shell.current_project(), Some("raycaster"));

        let result = shell.execute("open");
        assert_eq!(
            result.output.as_deref(),
            Some("Opening https://example.com/raycaster...")
        );

        shell.execute("cd");
        assert_eq!(shell.current_project(), None);
    }

    #[test]
    fn test_subscribers_notified_once_per_execute() {
        let mut shell = create_test_shell();
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = shell.subscribe(move |state| sink.borrow_mut().push(state.cwd.clone()));

        shell.execute("cd projects && cd ..");
        assert_eq!(seen.borrow().as_slice(), ["/home/guest"]);

        shell.execute("cd projects");
        assert_eq!(
            seen.borrow().as_slice(),
            ["/home/guest", "/home/guest/projects"]
        );

        assert!(shell.unsubscribe(id));
        assert!(!shell.unsubscribe(id));
        shell.execute("cd");
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_exit_editor_notifies() {
        let mut shell = create_test_shell();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        shell.subscribe(move |_| *sink.borrow_mut() += 1);

        shell.execute("vim about.md");
        shell.exit_editor();
        assert_eq!(*count.borrow(), 2);

        // Closing twice only notifies once.
        shell.exit_editor();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_complete_uses_session_cwd() {
        let mut shell = create_test_shell();
        assert_eq!(shell.complete("cd "), vec!["projects", "staff"]);
        shell.execute("cd /usr");
        assert_eq!(shell.complete("cd "), vec!["bin"]);
    }
}
