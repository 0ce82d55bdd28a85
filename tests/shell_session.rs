//! End-to-end session tests driving the shell, completion widget and
//! viewer together the way a terminal frontend would.

use vsh::core::{MenuComplete, Shell, VimSignal, VimViewer};
use vsh::models::ProjectRecord;

fn record(name: &str) -> ProjectRecord {
    ProjectRecord {
        name: name.to_string(),
        description: format!("{} description", name),
        url: format!("https://example.com/{}", name),
        language: Some("Rust".to_string()),
        stars: 5,
        updated_at: "2024-06-01".to_string(),
        readme: format!("# {}\n\nReadme for {}.", name, name),
    }
}

fn session(names: &[&str]) -> Shell {
    let projects = names.iter().map(|n| record(n)).collect();
    Shell::bootstrap(projects).expect("bootstrap succeeds")
}

#[test]
fn normalize_is_idempotent() {
    let shell = session(&[]);
    let fs = shell.filesystem();
    for raw in ["~/projects/../.", "a/b/../c", "/x/./y/..", "..", "~", "projects"] {
        let once = fs.normalize(raw, "/home/guest");
        assert_eq!(fs.normalize(&once, "/home/guest"), once);
    }
}

#[test]
fn cd_through_symlink_then_up_lands_in_real_parent() {
    let mut shell = session(&[]);
    shell.execute("cd staff");
    assert_eq!(shell.cwd(), "/home/staff");
    shell.execute("cd ..");
    assert_eq!(shell.cwd(), "/home");
}

#[test]
fn and_chain_stops_on_error_semicolon_does_not() {
    let mut shell = session(&[]);

    let result = shell.execute("cd nonexistent && ls");
    assert!(result.error);
    assert_eq!(
        result.output.as_deref(),
        Some("cd: nonexistent: No such file or directory")
    );

    let result = shell.execute("cd nonexistent ; ls");
    assert!(!result.error);
    assert!(result.output.is_some());
}

#[test]
fn menu_complete_common_prefix_then_cycling_menu() {
    let shell = session(&["proj-api", "proj-web"]);
    let engine = shell.completion_engine();
    let mut menu = MenuComplete::new();

    // Candidates share "proj-"; first Tab inserts the gain, no menu.
    let outcome = menu.on_tab(engine, "open pro", shell.cwd()).unwrap();
    assert_eq!(outcome.new_buffer, "open proj-");
    assert!(outcome.menu.is_none());

    // Second Tab opens the menu at candidate 0.
    let outcome = menu.on_tab(engine, &outcome.new_buffer, shell.cwd()).unwrap();
    assert_eq!(outcome.new_buffer, "open proj-api");
    let view = outcome.menu.expect("menu visible");
    assert_eq!(view.selected, 0);
    assert_eq!(view.items, vec!["proj-api", "proj-web"]);
}

#[test]
fn exact_command_match_completes_with_trailing_space() {
    let shell = session(&[]);
    let mut menu = MenuComplete::new();
    let outcome = menu
        .on_tab(shell.completion_engine(), "cd", shell.cwd())
        .unwrap();
    assert_eq!(outcome.new_buffer, "cd ");
    assert!(outcome.menu.is_none());
    assert!(!menu.is_active());
}

#[test]
fn chain_splitting_handles_surrounding_whitespace() {
    let mut shell = session(&[]);
    for input in ["cd projects&&ls", "cd projects\t&& \tls", "cd projects ;ls"] {
        shell.execute("cd");
        let result = shell.execute(input);
        assert!(!result.error, "chain {input:?} should succeed");
        assert_eq!(shell.cwd(), "/home/guest/projects");
        assert!(result.output.is_some());
    }
}

#[test]
fn history_counts_non_blank_lines_only() {
    let mut shell = session(&[]);
    shell.execute("ls");
    assert_eq!(shell.execute("   "), Default::default());
    shell.execute("cd projects");
    shell.execute("history");
    assert_eq!(shell.history(), ["ls", "cd projects", "history"]);
}

#[test]
fn viewer_jump_motions_on_large_file() {
    let content: Vec<String> = (0..500).map(|i| format!("line {}", i)).collect();
    let mut viewer = VimViewer::new();
    viewer.enter("/home/guest/big.md", &content.join("\n"), 40);

    viewer.handle_key("G");
    let state = viewer.state().unwrap();
    assert_eq!(state.cursor_line, 499);
    assert_eq!(state.scroll_offset, 460);

    viewer.handle_key("g");
    let state = viewer.state().unwrap();
    assert_eq!(state.cursor_line, 0);
    assert_eq!(state.scroll_offset, 0);
}

#[test]
fn viewer_refuses_edits() {
    let mut viewer = VimViewer::new();
    viewer.enter("/home/guest/about.md", "alpha\nbeta", 10);
    let before = viewer.state().unwrap().lines.clone();

    assert_eq!(viewer.handle_key("x"), VimSignal::Consumed);
    let state = viewer.state().unwrap();
    assert!(state.message.starts_with('W'));
    assert_eq!(state.lines, before);
}

#[test]
fn cd_projects_then_ls_shows_spliced_records() {
    let mut shell = session(&["a", "b"]);
    let result = shell.execute("cd projects && ls");
    assert!(!result.error);
    assert_eq!(shell.cwd(), "/home/guest/projects");
    let output = result.output.expect("ls output");
    assert!(output.contains("a.md"));
    assert!(output.contains("b.md"));
}

#[test]
fn vim_session_roundtrip_with_external_close() {
    let mut shell = session(&["raycaster"]);
    let result = shell.execute("vim projects/raycaster.md");
    assert!(!result.error);
    assert_eq!(result.url_path.as_deref(), Some("/projects/raycaster"));

    let mode = shell.editor_mode().expect("editor open").clone();
    let mut viewer = VimViewer::new();
    viewer.enter(&mode.file_path, &mode.content, 24);
    assert!(viewer.frame().is_some());

    // Host closes the pane; both sides converge.
    shell.exit_editor();
    viewer.sync_closed();
    assert!(!shell.is_editor_mode());
    assert!(!viewer.is_active());
}
