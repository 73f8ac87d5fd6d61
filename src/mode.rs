//! Workspace mode coordination.
//!
//! Exactly one mode is active at a time:
//! - `Browse`: navigate the list, select a record, run analyses
//! - `Create`: type a new sequence into a draft
//! - `Update`: edit the full sequence of an existing record
//!
//! Opening an edit draft needs the record's full sequence, so an edit intent
//! first issues a fetch; the draft opens when that fetch settles. Draft
//! submissions validate locally before any request is produced.

use log::{debug, info};
use thiserror::Error;

use crate::gateway::{Call, GatewayError};
use crate::selection::{SettleOutcome, Staleness, Token};
use crate::validate::{normalize_sequence, ValidationError};

/// Reasons a mode transition or draft submission is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("Finish or cancel the current draft first.")]
    DraftOpen,

    #[error("No draft is open.")]
    NoDraft,

    #[error("A submission is already in progress.")]
    Submitting,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Text being composed in a create or update form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDraft {
    pub text: String,
    pub submitting: bool,
    pub error: Option<String>,
}

impl EditDraft {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// The current workspace mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkspaceMode {
    #[default]
    Browse,
    Create { draft: EditDraft },
    Update { id: String, draft: EditDraft },
}

impl WorkspaceMode {
    pub fn label(&self) -> &'static str {
        match self {
            WorkspaceMode::Browse => "BROWSE",
            WorkspaceMode::Create { .. } => "CREATE",
            WorkspaceMode::Update { .. } => "UPDATE",
        }
    }
}

/// A fetch issued to open an edit draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTicket {
    pub token: Token,
    pub id: String,
}

/// A validated draft ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub token: Token,
    pub call: Call,
}

/// What a settled submission did to the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Updated { id: String },
    Failed(String),
    Discarded,
}

/// Owns the mode state machine and the fetch that opens edit drafts.
#[derive(Debug, Clone, Default)]
pub struct ModeCoordinator {
    mode: WorkspaceMode,
    edit_loads: Staleness,
    pending_edit: Option<EditTicket>,
    submissions: Staleness,
}

impl ModeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &WorkspaceMode {
        &self.mode
    }

    pub fn is_browse(&self) -> bool {
        matches!(self.mode, WorkspaceMode::Browse)
    }

    pub fn draft(&self) -> Option<&EditDraft> {
        match &self.mode {
            WorkspaceMode::Browse => None,
            WorkspaceMode::Create { draft } | WorkspaceMode::Update { draft, .. } => Some(draft),
        }
    }

    fn draft_mut(&mut self) -> Option<&mut EditDraft> {
        match &mut self.mode {
            WorkspaceMode::Browse => None,
            WorkspaceMode::Create { draft } | WorkspaceMode::Update { draft, .. } => Some(draft),
        }
    }

    fn ensure_browse(&self) -> Result<(), ModeError> {
        if self.is_browse() {
            Ok(())
        } else {
            Err(ModeError::DraftOpen)
        }
    }

    /// Opens an empty create draft.
    pub fn enter_create(&mut self) -> Result<(), ModeError> {
        self.ensure_browse()?;
        self.cancel_pending_edit();
        self.mode = WorkspaceMode::Create {
            draft: EditDraft::default(),
        };
        info!("Entered create mode");
        Ok(())
    }

    /// Starts opening an edit draft for `id`; the returned ticket names the fetch.
    pub fn request_edit(&mut self, id: &str) -> Result<EditTicket, ModeError> {
        self.ensure_browse()?;
        let ticket = EditTicket {
            token: self.edit_loads.advance(),
            id: id.to_string(),
        };
        self.pending_edit = Some(ticket.clone());
        Ok(ticket)
    }

    /// Target of the edit fetch still in flight, if any.
    pub fn pending_edit_target(&self) -> Option<&str> {
        self.pending_edit.as_ref().map(|ticket| ticket.id.as_str())
    }

    /// Forgets the in-flight edit fetch; its settlement will be discarded.
    pub fn cancel_pending_edit(&mut self) {
        if self.pending_edit.take().is_some() {
            self.edit_loads.invalidate();
        }
    }

    /// Opens the update draft once its fetch settles.
    ///
    /// A failed fetch still opens the draft, empty, with the error shown.
    pub fn settle_edit_load(
        &mut self,
        ticket: &EditTicket,
        result: Result<String, GatewayError>,
    ) -> SettleOutcome {
        let matches_pending = self.pending_edit.as_ref() == Some(ticket);
        if !matches_pending || !self.edit_loads.is_current(ticket.token) || !self.is_browse() {
            debug!("Discarding stale edit load for {}", ticket.id);
            return SettleOutcome::Discarded;
        }
        self.pending_edit = None;

        let draft = match result {
            Ok(sequence) => EditDraft::with_text(sequence),
            Err(e) => EditDraft {
                error: Some(e.to_string()),
                ..EditDraft::default()
            },
        };
        info!("Entered update mode for {}", ticket.id);
        self.mode = WorkspaceMode::Update {
            id: ticket.id.clone(),
            draft,
        };
        SettleOutcome::Applied
    }

    /// Leaves the draft without sending it.
    pub fn cancel(&mut self) -> Result<(), ModeError> {
        let submitting = match self.draft() {
            None => return Err(ModeError::NoDraft),
            Some(draft) => draft.submitting,
        };
        if submitting {
            return Err(ModeError::Submitting);
        }
        self.mode = WorkspaceMode::Browse;
        self.submissions.invalidate();
        info!("Draft cancelled");
        Ok(())
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(draft) = self.draft_mut().filter(|d| !d.submitting) {
            draft.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(draft) = self.draft_mut().filter(|d| !d.submitting) {
            draft.text.pop();
        }
    }

    pub fn clear_text(&mut self) {
        if let Some(draft) = self.draft_mut().filter(|d| !d.submitting) {
            draft.text.clear();
        }
    }

    /// Validates the draft and builds the request that submits it.
    ///
    /// Validation failures are recorded on the draft and produce no request.
    pub fn prepare_submit(&mut self) -> Result<Submission, ModeError> {
        let (update_id, draft) = match &mut self.mode {
            WorkspaceMode::Browse => return Err(ModeError::NoDraft),
            WorkspaceMode::Create { draft } => (None, draft),
            WorkspaceMode::Update { id, draft } => (Some(id.clone()), draft),
        };
        if draft.submitting {
            return Err(ModeError::Submitting);
        }
        draft.error = None;

        let sequence = match normalize_sequence(&draft.text) {
            Ok(sequence) => sequence,
            Err(e) => {
                draft.error = Some(e.to_string());
                return Err(e.into());
            }
        };
        draft.submitting = true;

        let call = match update_id {
            Some(id) => Call::Update { id, sequence },
            None => Call::Create { sequence },
        };
        Ok(Submission {
            token: self.submissions.advance(),
            call,
        })
    }

    /// Applies the outcome of a submission.
    ///
    /// Success returns to `Browse`; failure keeps the draft and shows the message.
    pub fn settle_submit(&mut self, token: Token, result: Result<(), GatewayError>) -> SubmitOutcome {
        if !self.submissions.is_current(token) {
            debug!("Discarding stale submission result");
            return SubmitOutcome::Discarded;
        }
        let Some(draft) = self.draft_mut() else {
            return SubmitOutcome::Discarded;
        };
        draft.submitting = false;

        if let Err(e) = result {
            draft.error = Some(e.to_string());
            return SubmitOutcome::Failed(e.to_string());
        }

        let outcome = match std::mem::take(&mut self.mode) {
            WorkspaceMode::Update { id, .. } => SubmitOutcome::Updated { id },
            _ => SubmitOutcome::Created,
        };
        info!("Draft submitted, back to browse mode");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_mode(coordinator: &mut ModeCoordinator, id: &str, text: &str) {
        let ticket = coordinator.request_edit(id).unwrap();
        coordinator.settle_edit_load(&ticket, Ok(text.to_string()));
    }

    #[test]
    fn test_default_is_browse() {
        let coordinator = ModeCoordinator::new();
        assert_eq!(coordinator.mode(), &WorkspaceMode::Browse);
        assert!(coordinator.draft().is_none());
    }

    #[test]
    fn test_create_submit_validates_locally() {
        let mut coordinator = ModeCoordinator::new();
        coordinator.enter_create().unwrap();
        for c in "ATXG".chars() {
            coordinator.input_char(c);
        }
        let err = coordinator.prepare_submit().unwrap_err();
        assert!(matches!(err, ModeError::Invalid(ValidationError::InvalidAlphabet { .. })));
        let draft = coordinator.draft().unwrap();
        assert_eq!(draft.error.as_deref(), Some("Only A, T, C, G are allowed."));
        assert!(!draft.submitting);
    }

    #[test]
    fn test_create_submit_normalizes() {
        let mut coordinator = ModeCoordinator::new();
        coordinator.enter_create().unwrap();
        for c in "at cg".chars() {
            coordinator.input_char(c);
        }
        let submission = coordinator.prepare_submit().unwrap();
        assert_eq!(
            submission.call,
            Call::Create {
                sequence: "ATCG".to_string()
            }
        );
        assert!(coordinator.draft().unwrap().submitting);
        assert_eq!(coordinator.prepare_submit(), Err(ModeError::Submitting));
    }

    #[test]
    fn test_create_success_returns_to_browse() {
        let mut coordinator = ModeCoordinator::new();
        coordinator.enter_create().unwrap();
        coordinator.input_char('A');
        let submission = coordinator.prepare_submit().unwrap();
        assert_eq!(coordinator.settle_submit(submission.token, Ok(())), SubmitOutcome::Created);
        assert!(coordinator.is_browse());
    }

    #[test]
    fn test_failed_submit_keeps_draft() {
        let mut coordinator = ModeCoordinator::new();
        update_mode(&mut coordinator, "s1", "ATCG");
        let submission = coordinator.prepare_submit().unwrap();
        let outcome = coordinator.settle_submit(
            submission.token,
            Err(GatewayError::Remote {
                status: 404,
                message: "Sequence ID not found.".to_string(),
            }),
        );
        assert_eq!(outcome, SubmitOutcome::Failed("Sequence ID not found.".to_string()));
        let draft = coordinator.draft().unwrap();
        assert_eq!(draft.text, "ATCG");
        assert!(!draft.submitting);
        assert!(matches!(coordinator.mode(), WorkspaceMode::Update { .. }));
    }

    #[test]
    fn test_update_success_names_record() {
        let mut coordinator = ModeCoordinator::new();
        update_mode(&mut coordinator, "s1", "ATCG");
        let submission = coordinator.prepare_submit().unwrap();
        assert_eq!(
            submission.call,
            Call::Update {
                id: "s1".to_string(),
                sequence: "ATCG".to_string()
            }
        );
        assert_eq!(
            coordinator.settle_submit(submission.token, Ok(())),
            SubmitOutcome::Updated { id: "s1".to_string() }
        );
        assert!(coordinator.is_browse());
    }

    #[test]
    fn test_edit_load_failure_opens_empty_draft() {
        let mut coordinator = ModeCoordinator::new();
        let ticket = coordinator.request_edit("s1").unwrap();
        let outcome =
            coordinator.settle_edit_load(&ticket, Err(GatewayError::Transport("offline".to_string())));
        assert_eq!(outcome, SettleOutcome::Applied);
        let draft = coordinator.draft().unwrap();
        assert_eq!(draft.text, "");
        assert_eq!(draft.error.as_deref(), Some("offline"));
    }

    #[test]
    fn test_newer_edit_supersedes_older() {
        let mut coordinator = ModeCoordinator::new();
        let first = coordinator.request_edit("a").unwrap();
        let second = coordinator.request_edit("b").unwrap();
        assert_eq!(
            coordinator.settle_edit_load(&first, Ok("AAAA".to_string())),
            SettleOutcome::Discarded
        );
        assert_eq!(
            coordinator.settle_edit_load(&second, Ok("CCCC".to_string())),
            SettleOutcome::Applied
        );
        match coordinator.mode() {
            WorkspaceMode::Update { id, draft } => {
                assert_eq!(id, "b");
                assert_eq!(draft.text, "CCCC");
            }
            other => panic!("unexpected mode {:?}", other),
        }
    }

    #[test]
    fn test_entering_create_drops_pending_edit() {
        let mut coordinator = ModeCoordinator::new();
        let ticket = coordinator.request_edit("a").unwrap();
        coordinator.enter_create().unwrap();
        assert_eq!(coordinator.pending_edit_target(), None);
        assert_eq!(
            coordinator.settle_edit_load(&ticket, Ok("AAAA".to_string())),
            SettleOutcome::Discarded
        );
        assert!(matches!(coordinator.mode(), WorkspaceMode::Create { .. }));
    }

    #[test]
    fn test_transitions_refused_outside_browse() {
        let mut coordinator = ModeCoordinator::new();
        coordinator.enter_create().unwrap();
        assert_eq!(coordinator.enter_create(), Err(ModeError::DraftOpen));
        assert_eq!(coordinator.request_edit("a"), Err(ModeError::DraftOpen));
    }

    #[test]
    fn test_cancel_refused_while_submitting() {
        let mut coordinator = ModeCoordinator::new();
        update_mode(&mut coordinator, "s1", "ATCG");
        coordinator.prepare_submit().unwrap();
        assert_eq!(coordinator.cancel(), Err(ModeError::Submitting));
    }

    #[test]
    fn test_cancel_returns_to_browse() {
        let mut coordinator = ModeCoordinator::new();
        update_mode(&mut coordinator, "s1", "ATCG");
        coordinator.cancel().unwrap();
        assert!(coordinator.is_browse());
        assert_eq!(coordinator.cancel(), Err(ModeError::NoDraft));
    }

    #[test]
    fn test_draft_editing() {
        let mut coordinator = ModeCoordinator::new();
        coordinator.enter_create().unwrap();
        coordinator.input_char('A');
        coordinator.input_char('T');
        coordinator.backspace();
        assert_eq!(coordinator.draft().unwrap().text, "A");
        coordinator.clear_text();
        assert_eq!(coordinator.draft().unwrap().text, "");
    }
}
