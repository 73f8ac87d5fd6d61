//! Keyboard event handling.
//!
//! Browse mode:
//! - `j`/`k` or arrows: move in the sequence list
//! - `Home` / `End` (`G`): first / last sequence
//! - `Enter`: make the highlighted sequence active
//! - `Esc`: clear the active sequence
//! - `n`: new sequence, `e`: edit, `d`: delete, `r`: refresh
//! - `c`: compress, `x`: decompress, `g`: GC content, `f`: frequency, `m`: motif search
//! - `/`: edit motif pattern, `R`: toggle regex
//! - `?`: help
//! - `:`: command line
//!   - `:q` or `:quit`: quit the application
//!   - `:r` or `:refresh`: reload the list
//!   - `:new`: new sequence
//!   - `:motif <pattern>`: set pattern and search
//!   - `:regex`: toggle regex
//!
//! Create/Update mode: type the sequence, `Enter` submits, `Esc` cancels,
//! `Ctrl+U` clears the text.
//!
//! `Ctrl+C` quits from anywhere.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::mode::WorkspaceMode;
use crate::model::AnalysisKind;
use crate::workspace::{Request, Workspace};

/// Actions that can be triggered by keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (key not recognized)
    None,
    /// Quit the application
    Quit,
    /// Move list cursor up
    MoveUp,
    /// Move list cursor down
    MoveDown,
    /// Jump to first sequence
    GotoFirst,
    /// Jump to last sequence
    GotoLast,
    /// Make the highlighted sequence active
    Select,
    /// Clear the active sequence
    ClearSelection,
    /// Open the highlighted sequence for editing
    Edit,
    /// Delete the highlighted sequence
    Delete,
    /// Open the create form
    NewSequence,
    /// Reload the sequence list
    Refresh,
    /// Run an analysis on the active sequence
    Analyze(AnalysisKind),
    /// Open the motif pattern prompt
    EditMotifPattern,
    /// Toggle regex motif search
    ToggleRegex,
    /// Show the help overlay
    ShowHelp,
    /// Dismiss the help overlay
    DismissHelp,
    /// Enter command mode
    EnterCommandMode,
    /// Add character to the prompt
    PromptChar(char),
    /// Backspace in the prompt
    PromptBackspace,
    /// Execute the prompt
    PromptSubmit,
    /// Close the prompt
    PromptCancel,
    /// Add character to the draft
    DraftChar(char),
    /// Backspace in the draft
    DraftBackspace,
    /// Clear the draft text
    DraftClear,
    /// Submit the draft
    DraftSubmit,
    /// Cancel the draft
    DraftCancel,
    /// Resize event (terminal resized)
    Resize(u16, u16),
}

/// Polls for keyboard events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current workspace state.
pub fn handle_event(event: Event, mode: &WorkspaceMode, prompt_open: bool, show_help: bool) -> Action {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key_event(key_event, mode, prompt_open, show_help)
        }
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

/// Handles a key event based on the current mode.
fn handle_key_event(key: KeyEvent, mode: &WorkspaceMode, prompt_open: bool, show_help: bool) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    // If help is shown, any key dismisses it
    if show_help {
        return Action::DismissHelp;
    }

    match mode {
        WorkspaceMode::Create { .. } | WorkspaceMode::Update { .. } => handle_draft_mode(key),
        WorkspaceMode::Browse if prompt_open => handle_prompt(key),
        WorkspaceMode::Browse => handle_browse_mode(key),
    }
}

fn is_control(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Handles key events in browse mode.
fn handle_browse_mode(key: KeyEvent) -> Action {
    if is_control(&key) {
        return Action::None;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Home => Action::GotoFirst,
        KeyCode::End | KeyCode::Char('G') => Action::GotoLast,

        KeyCode::Enter => Action::Select,
        KeyCode::Esc => Action::ClearSelection,

        KeyCode::Char('n') => Action::NewSequence,
        KeyCode::Char('e') => Action::Edit,
        KeyCode::Char('d') => Action::Delete,
        KeyCode::Char('r') => Action::Refresh,

        KeyCode::Char('c') => Action::Analyze(AnalysisKind::Compress),
        KeyCode::Char('x') => Action::Analyze(AnalysisKind::Decompress),
        KeyCode::Char('g') => Action::Analyze(AnalysisKind::Gc),
        KeyCode::Char('f') => Action::Analyze(AnalysisKind::Freq),
        KeyCode::Char('m') => Action::Analyze(AnalysisKind::Motif),
        KeyCode::Char('/') => Action::EditMotifPattern,
        KeyCode::Char('R') => Action::ToggleRegex,

        KeyCode::Char('?') => Action::ShowHelp,
        KeyCode::Char(':') => Action::EnterCommandMode,

        _ => Action::None,
    }
}

/// Handles key events in the command line or motif prompt.
fn handle_prompt(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::PromptSubmit,
        KeyCode::Esc => Action::PromptCancel,
        KeyCode::Backspace => Action::PromptBackspace,
        KeyCode::Char(c) if !is_control(&key) => Action::PromptChar(c),
        _ => Action::None,
    }
}

/// Handles key events while a create or update draft is open.
fn handle_draft_mode(key: KeyEvent) -> Action {
    if is_control(&key) {
        return match key.code {
            KeyCode::Char('u') => Action::DraftClear,
            _ => Action::None,
        };
    }
    match key.code {
        KeyCode::Enter => Action::DraftSubmit,
        KeyCode::Esc => Action::DraftCancel,
        KeyCode::Backspace => Action::DraftBackspace,
        KeyCode::Char(c) => Action::DraftChar(c),
        _ => Action::None,
    }
}

/// Applies an action to the workspace.
///
/// Returns the requests the action produced, to be dispatched by the caller.
pub fn apply_action(state: &mut Workspace, action: Action) -> Vec<Request> {
    match action {
        Action::None => Vec::new(),
        Action::Quit => {
            state.should_quit = true;
            Vec::new()
        }
        Action::MoveUp => {
            state.move_up();
            Vec::new()
        }
        Action::MoveDown => {
            state.move_down();
            Vec::new()
        }
        Action::GotoFirst => {
            state.goto_first();
            Vec::new()
        }
        Action::GotoLast => {
            state.goto_last();
            Vec::new()
        }
        Action::Select => state.select_at_cursor(),
        Action::ClearSelection => {
            state.clear_selection();
            Vec::new()
        }
        Action::Edit => state.begin_edit_at_cursor(),
        Action::Delete => state.delete_at_cursor(),
        Action::NewSequence => {
            state.begin_create();
            Vec::new()
        }
        Action::Refresh => state.refresh(),
        Action::Analyze(kind) => state.trigger_analysis(kind),
        Action::EditMotifPattern => {
            state.open_motif_prompt();
            Vec::new()
        }
        Action::ToggleRegex => {
            state.toggle_regex();
            Vec::new()
        }
        Action::ShowHelp => {
            state.show_help = true;
            Vec::new()
        }
        Action::DismissHelp => {
            state.dismiss_help();
            Vec::new()
        }
        Action::EnterCommandMode => {
            state.open_command();
            Vec::new()
        }
        Action::PromptChar(c) => {
            state.prompt_input(c);
            Vec::new()
        }
        Action::PromptBackspace => {
            state.prompt_backspace();
            Vec::new()
        }
        Action::PromptSubmit => state.submit_prompt(),
        Action::PromptCancel => {
            state.cancel_prompt();
            Vec::new()
        }
        Action::DraftChar(c) => {
            state.draft_input(c);
            Vec::new()
        }
        Action::DraftBackspace => {
            state.draft_backspace();
            Vec::new()
        }
        Action::DraftClear => {
            state.draft_clear();
            Vec::new()
        }
        Action::DraftSubmit => state.submit_draft(),
        Action::DraftCancel => {
            state.cancel_draft();
            Vec::new()
        }
        Action::Resize(_, _) => {
            // Layout is recomputed on every draw
            Vec::new()
        }
    }
}
