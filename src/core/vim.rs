//! Modal read-only file viewer.
//!
//! A vim-flavored finite-state machine over discrete key strings. It
//! owns scrolling, the `:` command line, and the readonly guard; drawing
//! the frame is the presentation layer's job via [`VimViewer::frame`].

use tracing::debug;

use crate::core::filesystem;

/// Keys that would edit the buffer in real vim.
const MUTATING_KEYS: [&str; 18] = [
    "i", "I", "a", "A", "o", "O", "s", "S", "c", "C", "r", "R", "x", "X", "d", "D", "p", "P",
];

const READONLY_WARNING: &str = "W10: Warning: Changing a readonly file";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VimMode {
    Normal,
    CommandLine,
}

/// Viewer state while a file is open.
#[derive(Clone, Debug)]
pub struct VimState {
    pub file_path: String,
    pub filename: String,
    pub content: String,
    pub lines: Vec<String>,
    pub scroll_offset: usize,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub mode: VimMode,
    pub command_buffer: String,
    pub message: String,
    /// Content rows visible at once.
    pub viewport_rows: usize,
}

/// What the caller should do after a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VimSignal {
    /// Key handled, re-render from `frame()`.
    Consumed,
    /// Viewer closed; return to the prompt.
    Exit,
    /// No file open.
    Inactive,
}

// ===== Frame model =====

/// One visible row: a numbered content line or a `~` filler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameRow {
    Content { number: usize, text: String },
    Filler,
}

/// Where the viewport sits in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollPosition {
    Top,
    Bottom,
    All,
    Percent(u8),
}

impl std::fmt::Display for ScrollPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Top => write!(f, "Top"),
            Self::Bottom => write!(f, "Bot"),
            Self::All => write!(f, "All"),
            Self::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub filename: String,
    pub readonly: bool,
    pub line_count: usize,
    pub byte_count: usize,
    /// 1-based cursor position.
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub position: ScrollPosition,
}

/// Bottom line of the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandLineView {
    /// `:buffer` being typed.
    Command(String),
    /// Transient `E…`/`W…` message.
    Message(String),
    /// Idle hint (`Type :q to exit`).
    Hint,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VimFrame {
    pub rows: Vec<FrameRow>,
    pub status: StatusLine,
    pub command_line: CommandLineView,
}

// ===== Viewer =====

#[derive(Debug, Default)]
pub struct VimViewer {
    state: Option<VimState>,
}

impl VimViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&VimState> {
        self.state.as_ref()
    }

    /// Open a file with a given viewport height.
    pub fn enter(&mut self, file_path: &str, content: &str, viewport_rows: usize) {
        debug!(file_path, viewport_rows, "viewer opened");
        self.state = Some(VimState {
            file_path: file_path.to_string(),
            filename: filesystem::basename(file_path).to_string(),
            content: content.to_string(),
            lines: content.split('\n').map(str::to_string).collect(),
            scroll_offset: 0,
            cursor_line: 0,
            cursor_col: 0,
            mode: VimMode::Normal,
            command_buffer: String::new(),
            message: String::new(),
            viewport_rows: viewport_rows.max(1),
        });
    }

    /// Close from inside (`:q` family).
    pub fn exit(&mut self) {
        self.state = None;
    }

    /// The shell closed the editor externally; drop our state too.
    pub fn sync_closed(&mut self) {
        if self.state.take().is_some() {
            debug!("viewer closed externally");
        }
    }

    /// Viewport height changed; re-clamp the scroll window.
    pub fn resize(&mut self, viewport_rows: usize) {
        if let Some(state) = &mut self.state {
            state.viewport_rows = viewport_rows.max(1);
            state.scroll_offset = state
                .scroll_offset
                .min(state.lines.len().saturating_sub(state.viewport_rows));
        }
    }

    /// Feed one key (a character or an escape sequence).
    pub fn handle_key(&mut self, key: &str) -> VimSignal {
        let Some(state) = &mut self.state else {
            return VimSignal::Inactive;
        };
        match state.mode {
            VimMode::CommandLine => {
                if Self::handle_command_key(state, key).is_none() {
                    self.exit();
                    return VimSignal::Exit;
                }
                VimSignal::Consumed
            }
            VimMode::Normal => {
                Self::handle_normal_key(state, key);
                VimSignal::Consumed
            }
        }
    }

    /// Command-line mode. `None` means the viewer should close.
    fn handle_command_key(state: &mut VimState, key: &str) -> Option<()> {
        match key {
            "\r" | "\n" => {
                let cmd = state.command_buffer.to_lowercase();
                match cmd.as_str() {
                    "q" | "q!" | "wq" | "wq!" | "x" => return None,
                    _ if cmd == "w" || cmd.starts_with("w ") => {
                        state.message =
                            "E45: 'readonly' option is set (add ! to override)".to_string();
                    }
                    _ => {
                        state.message =
                            format!("E492: Not an editor command: {}", state.command_buffer);
                    }
                }
                state.mode = VimMode::Normal;
                state.command_buffer.clear();
            }
            "\x1b" => {
                state.mode = VimMode::Normal;
                state.command_buffer.clear();
                state.message.clear();
            }
            "\x7f" => {
                if state.command_buffer.pop().is_none() {
                    state.mode = VimMode::Normal;
                }
            }
            _ => {
                if let Some(ch) = single_printable(key) {
                    state.command_buffer.push(ch);
                }
            }
        }
        Some(())
    }

    fn handle_normal_key(state: &mut VimState, key: &str) {
        let vp = state.viewport_rows;
        let last = state.lines.len().saturating_sub(1);
        let max_scroll = state.lines.len().saturating_sub(vp);
        let half = vp / 2;

        match key {
            ":" => {
                state.mode = VimMode::CommandLine;
                state.command_buffer.clear();
                state.message.clear();
            }
            // Exactly Escape; longer sequences are arrow keys below.
            "\x1b" => state.message.clear(),
            "j" | "\x1b[B" => {
                if state.cursor_line < last {
                    state.cursor_line += 1;
                    if state.cursor_line >= state.scroll_offset + vp {
                        state.scroll_offset = state.cursor_line + 1 - vp;
                    }
                }
            }
            "k" | "\x1b[A" => {
                if state.cursor_line > 0 {
                    state.cursor_line -= 1;
                    if state.cursor_line < state.scroll_offset {
                        state.scroll_offset = state.cursor_line;
                    }
                }
            }
            "G" => {
                state.cursor_line = last;
                state.scroll_offset = max_scroll;
            }
            "g" => {
                state.cursor_line = 0;
                state.scroll_offset = 0;
            }
            " " | "\x1b[6~" => {
                state.scroll_offset = (state.scroll_offset + vp).min(max_scroll);
                state.cursor_line = (state.scroll_offset + vp - 1).min(last);
            }
            "\x1b[5~" => {
                state.scroll_offset = state.scroll_offset.saturating_sub(vp);
                state.cursor_line = state.scroll_offset;
            }
            // Ctrl-D / Ctrl-U, half a viewport.
            "\x04" => {
                state.scroll_offset = (state.scroll_offset + half).min(max_scroll);
                state.cursor_line = (state.cursor_line + half).min(last);
            }
            "\x15" => {
                state.scroll_offset = state.scroll_offset.saturating_sub(half);
                state.cursor_line = state.cursor_line.saturating_sub(half);
            }
            _ if MUTATING_KEYS.contains(&key) => {
                state.message = READONLY_WARNING.to_string();
            }
            _ => {}
        }
    }

    /// Presentation snapshot of the current viewport.
    pub fn frame(&self) -> Option<VimFrame> {
        let state = self.state.as_ref()?;
        let vp = state.viewport_rows;

        let rows = (0..vp)
            .map(|i| {
                let line_num = state.scroll_offset + i;
                match state.lines.get(line_num) {
                    Some(text) => FrameRow::Content {
                        number: line_num + 1,
                        text: text.clone(),
                    },
                    None => FrameRow::Filler,
                }
            })
            .collect();

        let position = if state.lines.len() <= vp {
            ScrollPosition::All
        } else if state.scroll_offset == 0 {
            ScrollPosition::Top
        } else if state.scroll_offset + vp >= state.lines.len() {
            ScrollPosition::Bottom
        } else {
            let pct = (state.scroll_offset as f64 / (state.lines.len() - vp) as f64) * 100.0;
            ScrollPosition::Percent(pct.round() as u8)
        };

        let status = StatusLine {
            filename: state.filename.clone(),
            readonly: true,
            line_count: state.lines.len(),
            byte_count: state.content.len(),
            cursor_line: state.cursor_line + 1,
            cursor_col: state.cursor_col + 1,
            position,
        };

        let command_line = if state.mode == VimMode::CommandLine {
            CommandLineView::Command(state.command_buffer.clone())
        } else if !state.message.is_empty() {
            CommandLineView::Message(state.message.clone())
        } else {
            CommandLineView::Hint
        };

        Some(VimFrame {
            rows,
            status,
            command_line,
        })
    }
}

fn single_printable(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let ch = chars.next()?;
    if chars.next().is_none() && (' '..='~').contains(&ch) {
        Some(ch)
    } else {
        None
    }
}
