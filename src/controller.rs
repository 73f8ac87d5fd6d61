//! Application controller.
//!
//! This module orchestrates the main application loop:
//! - Terminal initialization and cleanup
//! - Draining completed remote calls into the workspace
//! - Event polling and handling
//! - Rendering

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::dispatch::Dispatcher;
use crate::event::{apply_action, handle_event, poll_event};
use crate::ui::glyphs::Glyphs;
use crate::ui::render;
use crate::workspace::Workspace;

/// The main application controller.
pub struct App {
    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Workspace state
    state: Workspace,
    /// Runs remote calls off the UI thread
    dispatcher: Dispatcher,
    glyphs: Glyphs,
    /// Event poll timeout
    tick_rate: Duration,
}

impl App {
    /// Creates a new application around an empty workspace.
    pub fn new(dispatcher: Dispatcher, glyphs: Glyphs, tick_rate: Duration) -> Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state: Workspace::new(),
            dispatcher,
            glyphs,
            tick_rate,
        })
    }

    /// Runs the main application loop.
    pub fn run(&mut self) -> Result<()> {
        info!("Using sequence service at {}", self.dispatcher.gateway().base());
        let initial = self.state.refresh();
        self.dispatcher.dispatch_all(initial);

        loop {
            // Apply whatever came back since the last frame
            for settlement in self.dispatcher.drain() {
                let follow_up = self.state.settle(settlement);
                self.dispatcher.dispatch_all(follow_up);
            }

            let glyphs = self.glyphs;
            self.terminal.draw(|frame| {
                render(frame, &self.state, &glyphs);
            })?;

            // Handle events
            if let Some(event) = poll_event(self.tick_rate) {
                let action = handle_event(
                    event,
                    self.state.mode(),
                    self.state.prompt.is_some(),
                    self.state.show_help,
                );
                let requests = apply_action(&mut self.state, action);
                self.dispatcher.dispatch_all(requests);
            }

            if self.state.should_quit {
                break;
            }
        }

        if self.dispatcher.in_flight() > 0 {
            info!("Quitting with {} requests in flight", self.dispatcher.in_flight());
        }
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Convenience function to run the interactive workspace.
pub fn run_app(dispatcher: Dispatcher, glyphs: Glyphs, tick_rate: Duration) -> Result<()> {
    let mut app = App::new(dispatcher, glyphs, tick_rate)?;
    app.run()
}
