//! Result type returned by command execution.
//!
//! Commands never touch shell state directly. They describe the state
//! transitions they want as [`Effects`], and the shell applies them after
//! dispatch. This keeps every command a pure function of its context.

/// What should happen to the shell's remembered project after a command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProjectEffect {
    /// Leave the current project untouched.
    #[default]
    Keep,
    /// Forget the current project.
    Clear,
    /// Remember this project name.
    Set(String),
}

/// State transitions requested by a command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    /// Text to print, if any.
    pub output: Option<String>,
    /// New working directory, if the command moved.
    pub new_cwd: Option<String>,
    /// File path the host should treat as "being viewed", if any.
    pub view_path: Option<String>,
    /// Route hint for the host application, if any.
    pub url_path: Option<String>,
    /// Current-project bookkeeping.
    pub project: ProjectEffect,
}

impl Effects {
    pub fn output(text: impl Into<String>) -> Self {
        Self {
            output: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.new_cwd = Some(cwd.into());
        self
    }

    pub fn with_view_path(mut self, path: impl Into<String>) -> Self {
        self.view_path = Some(path.into());
        self
    }

    pub fn with_url_path(mut self, path: impl Into<String>) -> Self {
        self.url_path = Some(path.into());
        self
    }

    pub fn with_project(mut self, project: ProjectEffect) -> Self {
        self.project = project;
        self
    }
}

/// Outcome of running one command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Command succeeded; effects carry any output.
    Success(Effects),
    /// Command succeeded without printing anything (`cd`, `clear`).
    Silent(Effects),
    /// Command failed with a message. Fails `&&` chains.
    Error { message: String },
    /// Command requests the modal viewer to open.
    EnterEditor {
        file_path: String,
        content: String,
        view_path: Option<String>,
        url_path: Option<String>,
    },
}

impl CommandResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success(Effects::output(text))
    }

    pub fn silent() -> Self {
        Self::Silent(Effects::default())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// True for outcomes that let a `&&` chain continue.
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }
}
