//! Menu-complete widget, after zsh's `menu-complete`.
//!
//! First Tab completes up to the common prefix without showing a menu
//! (the *primed* state). The next Tab replaces the partial word with
//! candidate 0 and shows the menu; further Tabs cycle. Any other key
//! must call [`MenuComplete::reset`].

use crate::core::completions::{CompletionContext, CompletionEngine};

/// Cycling state between Tab presses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuState {
    /// Selected candidate, `-1` while primed.
    pub index: isize,
    pub completions: Vec<String>,
    /// Buffer as it stood when the menu was armed.
    pub original_input: String,
    /// Word portion that cycling replaces.
    pub original_prefix: String,
}

/// Candidate list to render under the prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuView {
    pub items: Vec<String>,
    pub selected: usize,
}

/// What the input layer should do after one Tab.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuOutcome {
    pub new_buffer: String,
    /// Text appended for a single completion, for incremental redraw.
    pub suffix: Option<String>,
    /// Menu to render, absent while primed.
    pub menu: Option<MenuView>,
}

#[derive(Debug, Default)]
pub struct MenuComplete {
    state: Option<MenuState>,
}

impl MenuComplete {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one Tab press. `None` means nothing to complete.
    pub fn on_tab(
        &mut self,
        engine: &CompletionEngine,
        buffer: &str,
        cwd: &str,
    ) -> Option<MenuOutcome> {
        if self.state.is_some() {
            return self.cycle_next();
        }
        self.first_tab(engine, buffer, cwd)
    }

    fn first_tab(
        &mut self,
        engine: &CompletionEngine,
        buffer: &str,
        cwd: &str,
    ) -> Option<MenuOutcome> {
        let result = engine.completion_result(buffer, cwd)?;
        if result.completions.is_empty() {
            return None;
        }

        let ctx = CompletionContext::new(buffer);

        if result.completions.len() == 1 {
            let suffix = result.completions[0]
                .strip_prefix(ctx.prefix.as_str())
                .unwrap_or("")
                .to_string();
            if suffix.is_empty() {
                return None;
            }
            return Some(MenuOutcome {
                new_buffer: format!("{}{}", buffer, suffix),
                suffix: Some(suffix),
                menu: None,
            });
        }

        let common_suffix = result
            .common_prefix
            .strip_prefix(ctx.prefix.as_str())
            .unwrap_or("")
            .to_string();
        let new_buffer = format!("{}{}", buffer, common_suffix);

        let mut state = MenuState {
            index: -1,
            completions: result.completions,
            original_input: new_buffer.clone(),
            original_prefix: format!("{}{}", ctx.prefix, common_suffix),
        };

        // A common-prefix gain primes the menu without showing it.
        if !common_suffix.is_empty() {
            self.state = Some(state);
            return Some(MenuOutcome {
                new_buffer,
                suffix: None,
                menu: None,
            });
        }

        // No gain: jump straight to candidate 0 with the menu open.
        state.index = 0;
        let first = state.completions[0].clone();
        let base_len = new_buffer.len() - state.original_prefix.len();
        let outcome = MenuOutcome {
            new_buffer: format!("{}{}", &new_buffer[..base_len], first),
            suffix: None,
            menu: Some(MenuView {
                items: state.completions.clone(),
                selected: 0,
            }),
        };
        self.state = Some(state);
        Some(outcome)
    }

    fn cycle_next(&mut self) -> Option<MenuOutcome> {
        let state = self.state.as_mut()?;
        state.index = (state.index + 1).rem_euclid(state.completions.len() as isize);
        let selected = state.index as usize;
        let completion = &state.completions[selected];

        let base_len = state.original_input.len() - state.original_prefix.len();
        Some(MenuOutcome {
            new_buffer: format!("{}{}", &state.original_input[..base_len], completion),
            suffix: None,
            menu: Some(MenuView {
                items: state.completions.clone(),
                selected,
            }),
        })
    }

    /// Drop cycling state. Call on any non-Tab key.
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }
}
