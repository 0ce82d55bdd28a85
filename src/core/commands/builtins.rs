//! Built-in shell commands.

use crate::config;
use crate::core::commands::{Command, CommandResult, Effects, ProjectEffect, ShellContext};
use crate::models::{FsNode, FsNodeKind, ParsedCommand};

/// Route hint for a canonical filesystem path.
///
/// The host application maps a handful of locations onto routes: home is
/// `/`, the projects directory is `/projects`, and anything nested under
/// it is `/projects/<name>`.
fn url_for_path(actual_path: &str) -> String {
    let projects_prefix = format!("{}/", config::PROJECTS_DIR);
    if let Some(rest) = actual_path.strip_prefix(projects_prefix.as_str()) {
        match rest.split('/').next() {
            Some(name) if !name.is_empty() => format!("/projects/{}", name),
            _ => "/projects".to_string(),
        }
    } else if actual_path == config::PROJECTS_DIR {
        "/projects".to_string()
    } else {
        "/".to_string()
    }
}

/// Route hint and project effect for viewing a file node.
fn view_hints(node: &FsNode, actual_path: &str) -> (Option<String>, ProjectEffect) {
    if let Some(project) = &node.project {
        (
            Some(format!("/projects/{}", project.name)),
            ProjectEffect::Set(project.name.clone()),
        )
    } else if actual_path == config::ABOUT_FILE {
        (Some("/about".to_string()), ProjectEffect::Keep)
    } else {
        (None, ProjectEffect::Keep)
    }
}

// ===== cd =====

pub struct Cd;

impl Command for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn description(&self) -> &'static str {
        "Change directory"
    }

    fn usage(&self) -> &'static str {
        "cd <path> | cd .. | cd ~"
    }

    fn run(&self, parsed: &ParsedCommand, ctx: &ShellContext<'_>) -> CommandResult {
        let Some(raw) = parsed.args.first() else {
            let home = ctx.fs.home().to_string();
            return CommandResult::Silent(
                Effects::default()
                    .with_cwd(home.clone())
                    .with_view_path(home)
                    .with_url_path("/")
                    .with_project(ProjectEffect::Clear),
            );
        };

        let target = ctx.fs.normalize(raw, ctx.cwd);
        let Some(resolved) = ctx.fs.resolve_with_symlinks(&target) else {
            return CommandResult::error(format!("cd: {}: No such file or directory", raw));
        };
        if !resolved.node.is_directory() {
            return CommandResult::error(format!("cd: {}: Not a directory", raw));
        }

        let actual = resolved.actual_path;
        let url = url_for_path(&actual);
        let project = match url.strip_prefix("/projects/") {
            Some(name) => ProjectEffect::Set(name.to_string()),
            None => ProjectEffect::Keep,
        };

        CommandResult::Silent(
            Effects::default()
                .with_cwd(actual.clone())
                .with_view_path(actual)
                .with_url_path(url)
                .with_project(project),
        )
    }
}

// ===== ls =====

pub struct Ls;

impl Command for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn description(&self) -> &'static str {
        "List directory contents"
    }

    fn usage(&self) -> &'static str {
        "ls [-l] [-a] [path]"
    }

    fn run(&self, parsed: &ParsedCommand, ctx: &ShellContext<'_>) -> CommandResult {
        let show_all = parsed.has_flag("a");
        let detailed = parsed.has_flag("l");

        let target = match parsed.args.first() {
            Some(raw) => ctx.fs.normalize(raw, ctx.cwd),
            None => ctx.cwd.to_string(),
        };

        let Some(node) = ctx.fs.resolve(&target) else {
            let shown = parsed.args.first().map(String::as_str).unwrap_or(&target);
            return CommandResult::error(format!("ls: {}: No such file or directory", shown));
        };

        if !node.is_directory() {
            return CommandResult::success(node.name.clone());
        }

        let entries: Vec<&FsNode> = node
            .children
            .values()
            .filter(|child| show_all || !child.is_hidden())
            .collect();

        let output = if detailed {
            entries
                .iter()
                .map(|child| {
                    let type_char = if child.is_directory() { 'd' } else { '-' };
                    let perms = match child.kind {
                        FsNodeKind::Executable => "rwxr-xr-x",
                        _ => "rw-r--r--",
                    };
                    format!(
                        "{}{}  guest  guest  {}{}",
                        type_char,
                        perms,
                        child.name,
                        kind_suffix(child)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            entries
                .iter()
                .map(|child| format!("{}{}", child.name, kind_suffix(child)))
                .collect::<Vec<_>>()
                .join("  ")
        };

        if output.is_empty() {
            CommandResult::success("(empty directory)")
        } else {
            CommandResult::success(output)
        }
    }
}

fn kind_suffix(node: &FsNode) -> &'static str {
    match node.kind {
        FsNodeKind::Directory => "/",
        FsNodeKind::Executable => "*",
        _ => "",
    }
}

// ===== cat =====

pub struct Cat;

impl Command for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn description(&self) -> &'static str {
        "Display file contents"
    }

    fn usage(&self) -> &'static str {
        "cat <file>"
    }

    fn run(&self, parsed: &ParsedCommand, ctx: &ShellContext<'_>) -> CommandResult {
        let Some(raw) = parsed.args.first() else {
            return CommandResult::error("cat: missing operand. Usage: cat <file>");
        };

        let target = ctx.fs.normalize(raw, ctx.cwd);
        let Some(resolved) = ctx.fs.resolve_with_symlinks(&target) else {
            return CommandResult::error(format!("cat: {}: No such file or directory", raw));
        };
        if resolved.node.is_directory() {
            return CommandResult::error(format!("cat: {}: Is a directory", raw));
        }

        let (url_path, project) = view_hints(resolved.node, &resolved.actual_path);
        let mut effects = Effects::output(resolved.node.content_text())
            .with_view_path(resolved.actual_path)
            .with_project(project);
        effects.url_path = url_path;
        CommandResult::Success(effects)
    }
}

// ===== vim =====

pub struct Vim;

impl Command for Vim {
    fn name(&self) -> &'static str {
        "vim"
    }

    fn description(&self) -> &'static str {
        "Open file in vim viewer"
    }

    fn usage(&self) -> &'static str {
        "vim <file>"
    }

    fn run(&self, parsed: &ParsedCommand, ctx: &ShellContext<'_>) -> CommandResult {
        let Some(raw) = parsed.args.first() else {
            return CommandResult::error("vim: missing file operand");
        };

        let target = ctx.fs.normalize(raw, ctx.cwd);
        let Some(resolved) = ctx.fs.resolve_with_symlinks(&target) else {
            return CommandResult::error(format!("vim: {}: No such file or directory", raw));
        };
        if resolved.node.is_directory() {
            return CommandResult::error(format!("vim: {}: Is a directory", raw));
        }

        let (url_path, _) = view_hints(resolved.node, &resolved.actual_path);
        CommandResult::EnterEditor {
            file_path: resolved.actual_path.clone(),
            content: resolved.node.content_text().to_string(),
            view_path: Some(resolved.actual_path),
            url_path,
        }
    }
}

// ===== :q =====

/// Editor escape hatch typed outside the editor. Inside the viewer the
/// key handler intercepts `:q` before it ever reaches the registry.
pub struct QuitEditor;

impl Command for QuitEditor {
    fn name(&self) -> &'static str {
        ":q"
    }

    fn description(&self) -> &'static str {
        "Close vim viewer"
    }

    fn run(&self, _parsed: &ParsedCommand, _ctx: &ShellContext<'_>) -> CommandResult {
        CommandResult::error("E492: Not an editor command: q")
    }
}

// ===== help =====

pub struct Help;

impl Command for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Show available commands"
    }

    fn run(&self, _parsed: &ParsedCommand, ctx: &ShellContext<'_>) -> CommandResult {
        let max_usage = ctx
            .commands
            .iter()
            .map(|info| info.usage.len())
            .max()
            .unwrap_or(0);

        let lines: Vec<String> = ctx
            .commands
            .iter()
            .map(|info| {
                format!(
                    "  {}{}{}",
                    info.usage,
                    " ".repeat(max_usage - info.usage.len() + 4),
                    info.description
                )
            })
            .collect();

        CommandResult::success(format!(
            "Available commands:\n\n{}\n\n{}",
            lines.join("\n"),
            config::HELP_TIPS
        ))
    }
}

// ===== history =====

pub struct History;

impl Command for History {
    fn name(&self) -> &'static str {
        "history"
    }

    fn description(&self) -> &'static str {
        "Show command history"
    }

    fn run(&self, _parsed: &ParsedCommand, ctx: &ShellContext<'_>) -> CommandResult {
        if ctx.history.is_empty() {
            return CommandResult::success("No commands in history.");
        }
        let output = ctx
            .history
            .iter()
            .enumerate()
            .map(|(index, entry)| format!("  {:>3}  {}", index + 1, entry))
            .collect::<Vec<_>>()
            .join("\n");
        CommandResult::success(output)
    }
}

// ===== clear =====

/// Clearing the screen is the presentation layer's job; the shell only
/// reports that nothing needs printing.
pub struct Clear;

impl Command for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn description(&self) -> &'static str {
        "Clear the terminal"
    }

    fn run(&self, _parsed: &ParsedCommand, _ctx: &ShellContext<'_>) -> CommandResult {
        CommandResult::silent()
    }
}

// ===== whoami =====

pub struct Whoami;

impl Command for Whoami {
    fn name(&self) -> &'static str {
        "whoami"
    }

    fn description(&self) -> &'static str {
        "Display the profile"
    }

    fn run(&self, _parsed: &ParsedCommand, _ctx: &ShellContext<'_>) -> CommandResult {
        CommandResult::Success(
            Effects::output(config::PROFILE_NAME)
                .with_view_path(config::ABOUT_FILE)
                .with_url_path("/about"),
        )
    }
}

// ===== open =====

pub struct Open;

impl Command for Open {
    fn name(&self) -> &'static str {
        "open"
    }

    fn description(&self) -> &'static str {
        "Open a project link"
    }

    fn usage(&self) -> &'static str {
        "open [project-name]"
    }

    fn run(&self, parsed: &ParsedCommand, ctx: &ShellContext<'_>) -> CommandResult {
        let name = parsed
            .args
            .first()
            .map(String::as_str)
            .or(ctx.current_project);

        let Some(name) = name else {
            return CommandResult::error("open: no project specified. Usage: open <project-name>");
        };

        let Some(project) = ctx.projects.iter().find(|p| p.name == name) else {
            return CommandResult::error(format!("open: {}: No such file or directory", name));
        };

        CommandResult::Success(
            Effects::output(format!("Opening {}...", project.url)).with_url_path(&project.url),
        )
    }
}
