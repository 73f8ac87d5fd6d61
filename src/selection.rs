//! Active selection and lazy detail loading.
//!
//! Selecting a summary shows its preview at once and fetches the full
//! sequence in the background. A response is applied only when it still
//! belongs to the current selection; late responses for a superseded
//! selection are dropped. There is no request cancellation: superseding a
//! selection simply advances a monotonic token.

use log::{debug, warn};

use crate::gateway::GatewayError;
use crate::model::{SequenceDetail, SequenceSummary};

/// Identifies one issued selection-scoped fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Token(u64);

/// Monotonic generator of [`Token`]s; only the latest one is current.
#[derive(Debug, Clone, Default)]
pub struct Staleness {
    current: u64,
}

impl Staleness {
    /// Issues a new token, making every earlier one stale.
    pub fn advance(&mut self) -> Token {
        self.current += 1;
        Token(self.current)
    }

    /// Makes every issued token stale without issuing a new one.
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    /// The current token, shared by everything issued since the last change.
    pub fn current(&self) -> Token {
        Token(self.current)
    }

    pub fn is_current(&self, token: Token) -> bool {
        token.0 == self.current
    }
}

/// Whether a settled response was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Applied,
    Discarded,
}

/// A detail fetch issued by [`SelectionLoader::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    pub token: Token,
    pub id: String,
}

/// Tracks the single active record and its full sequence.
#[derive(Debug, Clone, Default)]
pub struct SelectionLoader {
    active_id: Option<String>,
    preview: String,
    full_sequence: Option<String>,
    full_loading: bool,
    tokens: Staleness,
}

impl SelectionLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `summary` the active record and returns the fetch to issue.
    pub fn select(&mut self, summary: &SequenceSummary) -> DetailTicket {
        self.active_id = Some(summary.id.clone());
        self.preview = summary.preview.clone();
        self.full_sequence = None;
        self.full_loading = true;
        DetailTicket {
            token: self.tokens.advance(),
            id: summary.id.clone(),
        }
    }

    /// Applies a settled detail fetch if it still matches the selection.
    pub fn settle(
        &mut self,
        ticket: &DetailTicket,
        result: Result<SequenceDetail, GatewayError>,
    ) -> SettleOutcome {
        let still_active = self.active_id.as_deref() == Some(ticket.id.as_str());
        if !self.tokens.is_current(ticket.token) || !still_active {
            debug!("Discarding stale detail for {}", ticket.id);
            return SettleOutcome::Discarded;
        }

        match result {
            Ok(detail) => self.full_sequence = Some(detail.sequence),
            Err(e) => warn!("Could not load sequence {}: {}", ticket.id, e),
        }
        self.full_loading = false;
        SettleOutcome::Applied
    }

    /// Drops the selection; any in-flight fetch becomes stale.
    pub fn clear(&mut self) {
        self.active_id = None;
        self.preview.clear();
        self.full_sequence = None;
        self.full_loading = false;
        self.tokens.invalidate();
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn full_sequence(&self) -> Option<&str> {
        self.full_sequence.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.full_loading
    }

    /// Best available text for the active record.
    ///
    /// The preview stands in when the full sequence is missing or failed.
    pub fn display_text(&self) -> &str {
        if self.full_loading {
            return "Loading…";
        }
        match self.full_sequence.as_deref() {
            Some(full) if !full.is_empty() => full,
            _ if !self.preview.is_empty() => &self.preview,
            _ => "(empty)",
        }
    }
}
