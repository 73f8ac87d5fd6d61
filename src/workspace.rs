//! The workspace state container.
//!
//! `Workspace` owns every state slice (cache, selection, mode, analyses,
//! list cursor, prompt, status line) and is the only place they change.
//! Intents return the [`Request`]s to send; completed requests come back as
//! [`Settlement`]s through [`Workspace::settle`], which may in turn produce
//! follow-up requests (a refresh after a delete, for instance).
//!
//! Nothing here performs I/O, so every transition can be exercised directly.

use log::{debug, info, warn};

use crate::analysis::{AnalysisBoard, AnalysisTicket};
use crate::cache::SequenceCache;
use crate::gateway::{Call, GatewayError, GatewayResult, Reply};
use crate::mode::{EditTicket, ModeCoordinator, ModeError, SubmitOutcome, WorkspaceMode};
use crate::model::{AnalysisKind, SequenceDetail, SequenceSummary};
use crate::selection::{DetailTicket, SelectionLoader, Token};

/// Why a request was issued; decides how its settlement is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Purpose {
    Refresh,
    Detail(DetailTicket),
    EditLoad(EditTicket),
    Submit(Token),
    Delete { id: String },
    Analysis(AnalysisTicket),
}

/// A remote call together with the reason it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub purpose: Purpose,
    pub call: Call,
}

/// A completed request.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub purpose: Purpose,
    pub outcome: GatewayResult<Reply>,
}

/// One-line feedback shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Single-line text input opened from browse mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// `:` command line
    Command(String),
    /// Motif pattern editor
    MotifPattern(String),
}

fn unexpected(reply: Reply) -> GatewayError {
    let name = match reply {
        Reply::Listed(_) => "listing",
        Reply::Created(_) => "create acknowledgement",
        Reply::Fetched(_) => "sequence",
        Reply::Updated => "update acknowledgement",
        Reply::Deleted => "delete acknowledgement",
        Reply::Analysis(_) => "analysis",
    };
    GatewayError::Decode(format!("unexpected {}", name))
}

fn into_detail(outcome: GatewayResult<Reply>) -> GatewayResult<SequenceDetail> {
    match outcome? {
        Reply::Fetched(detail) => Ok(detail),
        other => Err(unexpected(other)),
    }
}

/// The complete workspace state.
#[derive(Debug, Default)]
pub struct Workspace {
    pub cache: SequenceCache,
    pub selection: SelectionLoader,
    pub modes: ModeCoordinator,
    pub analyses: AnalysisBoard,
    /// Highlighted row in the sequence list
    pub cursor: usize,
    pub prompt: Option<Prompt>,
    pub status: Option<StatusMessage>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &WorkspaceMode {
        self.modes.mode()
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    /// Refuses browse intents while a draft is open.
    fn require_browse(&mut self) -> bool {
        if self.modes.is_browse() {
            true
        } else {
            self.error(ModeError::DraftOpen.to_string());
            false
        }
    }

    fn cursor_summary(&self) -> Option<SequenceSummary> {
        self.cache.get(self.cursor).cloned()
    }

    /// Drops the active record along with its detail and analysis results.
    fn drop_selection(&mut self) {
        self.selection.clear();
        self.analyses.reset();
    }

    /// Clears browse-only state once a draft opens.
    fn leave_browse(&mut self) {
        self.prompt = None;
        self.status = None;
    }

    // ---- list ----

    /// Re-reads the whole collection.
    pub fn refresh(&mut self) -> Vec<Request> {
        self.cache.begin_refresh();
        vec![Request {
            purpose: Purpose::Refresh,
            call: Call::List,
        }]
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.cache.len() {
            self.cursor += 1;
        }
    }

    pub fn goto_first(&mut self) {
        self.cursor = 0;
    }

    pub fn goto_last(&mut self) {
        self.cursor = self.cache.len().saturating_sub(1);
    }

    /// Re-checks every selection-scoped reference against the cache.
    fn revalidate(&mut self) {
        if let Some(id) = self.selection.active_id() {
            if !self.cache.contains(id) {
                info!("Active sequence {} disappeared from listing", id);
                self.drop_selection();
            }
        }
        if let Some(id) = self.modes.pending_edit_target() {
            if !self.cache.contains(id) {
                info!("Edit target {} disappeared from listing", id);
                self.modes.cancel_pending_edit();
            }
        }
        if let WorkspaceMode::Update { id, .. } = self.modes.mode() {
            if !self.cache.contains(id) {
                let message = format!("Sequence {} no longer exists on the server.", id);
                warn!("Open draft targets a missing sequence: {}", id);
                self.error(message);
            }
        }
        self.cursor = self.cursor.min(self.cache.len().saturating_sub(1));
    }

    // ---- selection ----

    /// Makes the record under the cursor active and fetches its full sequence.
    pub fn select_at_cursor(&mut self) -> Vec<Request> {
        if !self.require_browse() {
            return Vec::new();
        }
        let Some(summary) = self.cursor_summary() else {
            return Vec::new();
        };
        self.modes.cancel_pending_edit();
        self.analyses.reset();
        let ticket = self.selection.select(&summary);
        debug!("Selected {}", summary.id);
        vec![Request {
            call: Call::Read {
                id: ticket.id.clone(),
            },
            purpose: Purpose::Detail(ticket),
        }]
    }

    pub fn clear_selection(&mut self) {
        self.drop_selection();
    }

    // ---- modes ----

    /// Opens the create form.
    pub fn begin_create(&mut self) {
        match self.modes.enter_create() {
            Ok(()) => {
                self.drop_selection();
                self.leave_browse();
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    /// Starts editing the record under the cursor.
    pub fn begin_edit_at_cursor(&mut self) -> Vec<Request> {
        if !self.require_browse() {
            return Vec::new();
        }
        let Some(summary) = self.cursor_summary() else {
            return Vec::new();
        };
        match self.modes.request_edit(&summary.id) {
            Ok(ticket) => {
                self.drop_selection();
                self.info(format!("Loading {} for editing...", summary.id));
                vec![Request {
                    call: Call::Read {
                        id: ticket.id.clone(),
                    },
                    purpose: Purpose::EditLoad(ticket),
                }]
            }
            Err(e) => {
                self.error(e.to_string());
                Vec::new()
            }
        }
    }

    pub fn draft_input(&mut self, c: char) {
        self.modes.input_char(c);
    }

    pub fn draft_backspace(&mut self) {
        self.modes.backspace();
    }

    pub fn draft_clear(&mut self) {
        self.modes.clear_text();
    }

    /// Validates and sends the open draft.
    pub fn submit_draft(&mut self) -> Vec<Request> {
        match self.modes.prepare_submit() {
            Ok(submission) => {
                self.status = None;
                vec![Request {
                    purpose: Purpose::Submit(submission.token),
                    call: submission.call,
                }]
            }
            Err(e) => {
                self.error(e.to_string());
                Vec::new()
            }
        }
    }

    pub fn cancel_draft(&mut self) {
        match self.modes.cancel() {
            Ok(()) => self.status = None,
            Err(e) => self.error(e.to_string()),
        }
    }

    // ---- delete ----

    /// Deletes the record under the cursor; the list is re-read afterwards.
    pub fn delete_at_cursor(&mut self) -> Vec<Request> {
        if !self.require_browse() {
            return Vec::new();
        }
        let Some(summary) = self.cursor_summary() else {
            return Vec::new();
        };
        vec![Request {
            purpose: Purpose::Delete {
                id: summary.id.clone(),
            },
            call: Call::Delete { id: summary.id },
        }]
    }

    // ---- analyses ----

    pub fn trigger_analysis(&mut self, kind: AnalysisKind) -> Vec<Request> {
        if !self.require_browse() {
            return Vec::new();
        }
        match self.analyses.trigger(kind, self.selection.active_id()) {
            Ok((ticket, call)) => vec![Request {
                purpose: Purpose::Analysis(ticket),
                call,
            }],
            Err(e) => {
                self.error(e.to_string());
                Vec::new()
            }
        }
    }

    pub fn toggle_regex(&mut self) {
        let on = self.analyses.toggle_regex();
        self.info(if on { "Motif search: regex" } else { "Motif search: literal" });
    }

    // ---- prompt ----

    pub fn open_command(&mut self) {
        if self.require_browse() {
            self.prompt = Some(Prompt::Command(String::new()));
        }
    }

    pub fn open_motif_prompt(&mut self) {
        if self.require_browse() {
            let current = self.analyses.motif_query().pattern.clone();
            self.prompt = Some(Prompt::MotifPattern(current));
        }
    }

    pub fn prompt_input(&mut self, c: char) {
        match &mut self.prompt {
            Some(Prompt::Command(text)) | Some(Prompt::MotifPattern(text)) => text.push(c),
            None => {}
        }
    }

    pub fn prompt_backspace(&mut self) {
        let close = match &mut self.prompt {
            Some(Prompt::Command(text)) => {
                text.pop();
                text.is_empty()
            }
            Some(Prompt::MotifPattern(text)) => {
                text.pop();
                false
            }
            None => false,
        };
        if close {
            self.prompt = None;
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Executes the open prompt.
    pub fn submit_prompt(&mut self) -> Vec<Request> {
        match self.prompt.take() {
            Some(Prompt::Command(cmd)) => self.execute_command(cmd.trim()),
            Some(Prompt::MotifPattern(pattern)) => {
                self.info(format!("Motif pattern: {}", pattern));
                self.analyses.set_motif_pattern(pattern);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn execute_command(&mut self, cmd: &str) -> Vec<Request> {
        let (name, arg) = match cmd.split_once(' ') {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };
        match name {
            "q" | "quit" => {
                self.should_quit = true;
                Vec::new()
            }
            "r" | "refresh" => self.refresh(),
            "new" => {
                self.begin_create();
                Vec::new()
            }
            "h" | "help" => {
                self.show_help = true;
                Vec::new()
            }
            "regex" => {
                self.toggle_regex();
                Vec::new()
            }
            "motif" if !arg.is_empty() => {
                self.analyses.set_motif_pattern(arg);
                self.trigger_analysis(AnalysisKind::Motif)
            }
            _ => {
                self.error(format!("Unknown command: {}", cmd));
                Vec::new()
            }
        }
    }

    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }

    // ---- settlements ----

    /// Applies a completed request and returns any follow-up requests.
    pub fn settle(&mut self, settlement: Settlement) -> Vec<Request> {
        let Settlement { purpose, outcome } = settlement;
        match purpose {
            Purpose::Refresh => {
                self.settle_refresh(outcome);
                Vec::new()
            }
            Purpose::Detail(ticket) => {
                self.selection.settle(&ticket, into_detail(outcome));
                Vec::new()
            }
            Purpose::EditLoad(ticket) => {
                let result = into_detail(outcome).map(|detail| detail.sequence);
                self.modes.settle_edit_load(&ticket, result);
                if !self.modes.is_browse() {
                    self.leave_browse();
                }
                Vec::new()
            }
            Purpose::Submit(token) => self.settle_submit(token, outcome),
            Purpose::Delete { id } => self.settle_delete(&id, outcome),
            Purpose::Analysis(ticket) => {
                let result = outcome.and_then(|reply| match reply {
                    Reply::Analysis(payload) => Ok(payload),
                    other => Err(unexpected(other)),
                });
                self.analyses.settle(ticket, result);
                Vec::new()
            }
        }
    }

    fn settle_refresh(&mut self, outcome: GatewayResult<Reply>) {
        self.cache.end_refresh();
        match outcome {
            Ok(Reply::Listed(items)) => {
                debug!("Listing returned {} sequences", items.len());
                self.cache.replace(items);
                self.revalidate();
            }
            Ok(other) => self.error(unexpected(other).to_string()),
            Err(e) => {
                warn!("Refresh failed: {}", e);
                self.error(format!("Could not load sequences: {}", e));
            }
        }
    }

    fn settle_submit(&mut self, token: Token, outcome: GatewayResult<Reply>) -> Vec<Request> {
        let result = outcome.and_then(|reply| match reply {
            Reply::Created(_) | Reply::Updated => Ok(()),
            other => Err(unexpected(other)),
        });
        let succeeded = result.is_ok();
        match self.modes.settle_submit(token, result) {
            SubmitOutcome::Created => {
                self.drop_selection();
                self.info("Uploaded Successfully");
                self.refresh()
            }
            SubmitOutcome::Updated { id } => {
                info!("Updated {}", id);
                self.info("Updated Successfully");
                self.refresh()
            }
            SubmitOutcome::Failed(message) => {
                self.error(message);
                Vec::new()
            }
            // The service changed even if the draft is gone.
            SubmitOutcome::Discarded if succeeded => self.refresh(),
            SubmitOutcome::Discarded => Vec::new(),
        }
    }

    fn settle_delete(&mut self, id: &str, outcome: GatewayResult<Reply>) -> Vec<Request> {
        match outcome {
            Ok(Reply::Deleted) => {
                if self.selection.active_id() == Some(id) {
                    self.drop_selection();
                }
                self.info(format!("Deleted {}", id));
                self.refresh()
            }
            Ok(other) => {
                self.error(unexpected(other).to_string());
                Vec::new()
            }
            Err(e) => {
                self.error(format!("Delete failed: {}", e));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{AnalysisCall, CreatedRecord};
    use crate::model::{preview_of, AnalysisPayload, AnalysisState, GcReport, ELLIPSIS};

    /// In-memory stand-in for the sequence service.
    #[derive(Default)]
    struct FakeStore {
        records: Vec<(String, String)>,
        next_id: u32,
        calls: Vec<Call>,
    }

    impl FakeStore {
        fn with(records: &[(&str, &str)]) -> Self {
            Self {
                records: records
                    .iter()
                    .map(|(id, seq)| (id.to_string(), seq.to_string()))
                    .collect(),
                ..Self::default()
            }
        }

        fn not_found() -> GatewayError {
            GatewayError::Remote {
                status: 404,
                message: "Sequence ID not found.".to_string(),
            }
        }

        fn handle(&mut self, call: Call) -> GatewayResult<Reply> {
            self.calls.push(call.clone());
            match call {
                Call::List => Ok(Reply::Listed(
                    self.records
                        .iter()
                        .map(|(id, seq)| SequenceSummary::new(id.clone(), preview_of(seq), Some(seq.len() as u64)))
                        .collect(),
                )),
                Call::Create { sequence } => {
                    self.next_id += 1;
                    let id = format!("n{}", self.next_id);
                    self.records.push((id.clone(), sequence));
                    Ok(Reply::Created(CreatedRecord { id }))
                }
                Call::Read { id } => self
                    .records
                    .iter()
                    .find(|(rid, _)| *rid == id)
                    .map(|(_, seq)| {
                        Reply::Fetched(SequenceDetail {
                            id: id.clone(),
                            sequence: seq.clone(),
                        })
                    })
                    .ok_or_else(Self::not_found),
                Call::Update { id, sequence } => {
                    let record = self.records.iter_mut().find(|(rid, _)| *rid == id);
                    match record {
                        Some(record) => {
                            record.1 = sequence;
                            Ok(Reply::Updated)
                        }
                        None => Err(Self::not_found()),
                    }
                }
                Call::Delete { id } => {
                    self.records.retain(|(rid, _)| *rid != id);
                    Ok(Reply::Deleted)
                }
                Call::Analyze { analysis, .. } => match analysis {
                    AnalysisCall::Gc => Ok(Reply::Analysis(AnalysisPayload::Gc(GcReport {
                        gc_percent: 50.0,
                        g_count: 1,
                        c_count: 1,
                    }))),
                    _ => Err(GatewayError::Transport("not supported".to_string())),
                },
            }
        }

        /// Serves requests in order, including the follow-ups they trigger.
        fn run(&mut self, ws: &mut Workspace, requests: Vec<Request>) {
            let mut queue = requests;
            while !queue.is_empty() {
                let request = queue.remove(0);
                let outcome = self.handle(request.call);
                queue.extend(ws.settle(Settlement {
                    purpose: request.purpose,
                    outcome,
                }));
            }
        }
    }

    fn loaded(store: &mut FakeStore) -> Workspace {
        let mut ws = Workspace::new();
        let requests = ws.refresh();
        store.run(&mut ws, requests);
        ws
    }

    fn settle_with(store: &mut FakeStore, ws: &mut Workspace, request: Request) -> Vec<Request> {
        let outcome = store.handle(request.call);
        ws.settle(Settlement {
            purpose: request.purpose,
            outcome,
        })
    }

    fn type_text(ws: &mut Workspace, text: &str) {
        for c in text.chars() {
            ws.draft_input(c);
        }
    }

    #[test]
    fn test_initial_refresh_fills_cache() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let ws = loaded(&mut store);
        assert_eq!(ws.cache.len(), 2);
        assert!(!ws.cache.is_refreshing());
    }

    #[test]
    fn test_late_detail_for_superseded_selection_is_dropped() {
        let mut store = FakeStore::with(&[("a", "AAAAAAAA"), ("b", "CCCCCCCC")]);
        let mut ws = loaded(&mut store);

        let select_a = ws.select_at_cursor().remove(0);
        ws.move_down();
        let select_b = ws.select_at_cursor().remove(0);

        settle_with(&mut store, &mut ws, select_b);
        settle_with(&mut store, &mut ws, select_a);

        assert_eq!(ws.selection.active_id(), Some("b"));
        assert_eq!(ws.selection.display_text(), "CCCCCCCC");
        assert!(!ws.selection.is_loading());
    }

    #[test]
    fn test_in_order_settlement_also_shows_latest() {
        let mut store = FakeStore::with(&[("a", "AAAAAAAA"), ("b", "CCCCCCCC")]);
        let mut ws = loaded(&mut store);

        let select_a = ws.select_at_cursor().remove(0);
        ws.move_down();
        let select_b = ws.select_at_cursor().remove(0);

        settle_with(&mut store, &mut ws, select_a);
        assert!(ws.selection.is_loading());
        settle_with(&mut store, &mut ws, select_b);
        assert_eq!(ws.selection.display_text(), "CCCCCCCC");
    }

    #[test]
    fn test_deleting_active_record_clears_selection() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        let select = ws.select_at_cursor();
        store.run(&mut ws, select);
        assert_eq!(ws.selection.active_id(), Some("a"));

        let delete = ws.delete_at_cursor();
        store.run(&mut ws, delete);

        assert_eq!(ws.selection.active_id(), None);
        assert_eq!(ws.selection.full_sequence(), None);
        assert_eq!(ws.cache.len(), 1);
        assert!(!ws.cache.contains("a"));
        assert_eq!(store.calls.last(), Some(&Call::List));
    }

    #[test]
    fn test_delete_reconciles_with_server_not_local_splice() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        // Another client adds a record behind our back.
        store.records.push(("z".to_string(), "TTTT".to_string()));

        let delete = ws.delete_at_cursor();
        store.run(&mut ws, delete);
        let ids: Vec<&str> = ws.cache.items().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "z"]);
    }

    #[test]
    fn test_valid_input_is_normalized_and_sent() {
        let mut store = FakeStore::with(&[]);
        let mut ws = loaded(&mut store);
        ws.begin_create();
        type_text(&mut ws, "at cg");
        let requests = ws.submit_draft();
        assert_eq!(
            requests[0].call,
            Call::Create {
                sequence: "ATCG".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_input_never_reaches_store() {
        let mut store = FakeStore::with(&[]);
        let mut ws = loaded(&mut store);
        let calls_before = store.calls.len();

        ws.begin_create();
        type_text(&mut ws, "ATXG");
        let requests = ws.submit_draft();
        store.run(&mut ws, requests);

        assert_eq!(store.calls.len(), calls_before);
        assert!(ws.status.as_ref().unwrap().is_error);
        assert!(matches!(ws.mode(), WorkspaceMode::Create { .. }));
    }

    #[test]
    fn test_entering_update_clears_selection() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        let select = ws.select_at_cursor();
        store.run(&mut ws, select);
        let analysis = ws.trigger_analysis(AnalysisKind::Gc);
        store.run(&mut ws, analysis);

        ws.move_down();
        let edit = ws.begin_edit_at_cursor();
        assert_eq!(ws.selection.active_id(), None);
        assert_eq!(ws.analyses.gc, AnalysisState::Idle);

        store.run(&mut ws, edit);
        match ws.mode() {
            WorkspaceMode::Update { id, draft } => {
                assert_eq!(id, "b");
                assert_eq!(draft.text, "GGCC");
            }
            other => panic!("unexpected mode {:?}", other),
        }
    }

    #[test]
    fn test_analysis_without_selection_is_local() {
        let mut store = FakeStore::with(&[("a", "ATCG")]);
        let mut ws = loaded(&mut store);
        let calls_before = store.calls.len();

        let requests = ws.trigger_analysis(AnalysisKind::Gc);
        assert!(requests.is_empty());
        assert_eq!(store.calls.len(), calls_before);
        assert!(matches!(ws.analyses.gc, AnalysisState::Failed(_)));
    }

    #[test]
    fn test_create_then_refresh_shows_prefix_preview() {
        let long = "ATCGATCGATCGATCGATCGATCG";
        for seq in ["ATCG", long] {
            let mut store = FakeStore::with(&[]);
            let mut ws = loaded(&mut store);
            ws.begin_create();
            type_text(&mut ws, seq);
            let submit = ws.submit_draft();
            store.run(&mut ws, submit);

            assert!(ws.modes.is_browse());
            let summary = &ws.cache.items()[0];
            let head = summary.preview.trim_end_matches(ELLIPSIS);
            assert!(seq.starts_with(head));
            assert!(head.len() <= 20);
            assert_eq!(summary.preview.ends_with(ELLIPSIS), seq.len() > 20);
        }
    }

    #[test]
    fn test_refresh_twice_is_idempotent() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        let first = ws.cache.clone();
        let again = ws.refresh();
        store.run(&mut ws, again);
        assert_eq!(ws.cache, first);
    }

    #[test]
    fn test_refresh_dropping_active_clears_selection() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        let select = ws.select_at_cursor();
        store.run(&mut ws, select);

        store.records.remove(0);
        let refresh = ws.refresh();
        store.run(&mut ws, refresh);
        assert_eq!(ws.selection.active_id(), None);
        assert_eq!(ws.cursor, 0);
    }

    #[test]
    fn test_refresh_invalidates_in_flight_detail() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        let pending = ws.select_at_cursor().remove(0);

        store.records.remove(0);
        let refresh = ws.refresh();
        store.run(&mut ws, refresh);
        ws.settle(Settlement {
            purpose: pending.purpose,
            outcome: Ok(Reply::Fetched(SequenceDetail {
                id: "a".to_string(),
                sequence: "ATCG".to_string(),
            })),
        });
        assert_eq!(ws.selection.active_id(), None);
        assert_eq!(ws.selection.full_sequence(), None);
    }

    #[test]
    fn test_last_refresh_to_settle_wins() {
        let mut store = FakeStore::with(&[("a", "ATCG")]);
        let mut ws = Workspace::new();
        let first = ws.refresh().remove(0);
        let second = ws.refresh().remove(0);
        assert!(ws.cache.is_refreshing());

        let second_outcome = store.handle(second.call);
        store.records.push(("b".to_string(), "GG".to_string()));
        let first_outcome = store.handle(first.call);

        ws.settle(Settlement {
            purpose: second.purpose,
            outcome: second_outcome,
        });
        ws.settle(Settlement {
            purpose: first.purpose,
            outcome: first_outcome,
        });
        assert_eq!(ws.cache.len(), 2);
        assert!(!ws.cache.is_refreshing());
    }

    #[test]
    fn test_failed_update_leaves_cache_untouched() {
        let mut store = FakeStore::with(&[("a", "ATCG")]);
        let mut ws = loaded(&mut store);
        let edit = ws.begin_edit_at_cursor();
        store.run(&mut ws, edit);
        let before = ws.cache.clone();

        store.records.clear();
        ws.draft_clear();
        type_text(&mut ws, "GGGG");
        let submit = ws.submit_draft();
        store.run(&mut ws, submit);

        assert_eq!(ws.cache, before);
        let draft = ws.modes.draft().unwrap();
        assert_eq!(draft.error.as_deref(), Some("Sequence ID not found."));
        assert_eq!(draft.text, "GGGG");
    }

    #[test]
    fn test_update_then_cancel_does_not_refresh() {
        let mut store = FakeStore::with(&[("a", "ATCG")]);
        let mut ws = loaded(&mut store);
        let edit = ws.begin_edit_at_cursor();
        store.run(&mut ws, edit);
        let calls_before = store.calls.len();

        ws.cancel_draft();
        assert!(ws.modes.is_browse());
        assert_eq!(store.calls.len(), calls_before);
    }

    #[test]
    fn test_browse_intents_refused_in_draft() {
        let mut store = FakeStore::with(&[("a", "ATCG")]);
        let mut ws = loaded(&mut store);
        ws.begin_create();
        assert!(ws.select_at_cursor().is_empty());
        assert!(ws.delete_at_cursor().is_empty());
        assert!(ws.trigger_analysis(AnalysisKind::Gc).is_empty());
        assert_eq!(
            ws.status.as_ref().map(|s| s.text.as_str()),
            Some("Finish or cancel the current draft first.")
        );
    }

    #[test]
    fn test_selection_change_resets_analyses() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        let select = ws.select_at_cursor();
        store.run(&mut ws, select);
        let pending = ws.trigger_analysis(AnalysisKind::Gc).remove(0);

        ws.move_down();
        let select = ws.select_at_cursor();
        store.run(&mut ws, select);
        settle_with(&mut store, &mut ws, pending);
        assert_eq!(ws.analyses.gc, AnalysisState::Idle);
    }

    #[test]
    fn test_command_prompt() {
        let mut ws = Workspace::new();
        ws.open_command();
        for c in "motif TATA".chars() {
            ws.prompt_input(c);
        }
        let requests = ws.submit_prompt();
        assert!(requests.is_empty());
        assert_eq!(ws.analyses.motif_query().pattern, "TATA");
        assert!(matches!(ws.analyses.motif, AnalysisState::Failed(_)));

        ws.open_command();
        ws.prompt_input('q');
        ws.submit_prompt();
        assert!(ws.should_quit);
    }

    #[test]
    fn test_unknown_command_reports_error() {
        let mut ws = Workspace::new();
        ws.open_command();
        ws.prompt_input('z');
        ws.submit_prompt();
        assert_eq!(
            ws.status,
            Some(StatusMessage {
                text: "Unknown command: z".to_string(),
                is_error: true
            })
        );
    }

    #[test]
    fn test_motif_prompt_prefilled() {
        let mut ws = Workspace::new();
        ws.open_motif_prompt();
        assert_eq!(ws.prompt, Some(Prompt::MotifPattern("ATG".to_string())));
        ws.prompt_backspace();
        ws.prompt_input('C');
        ws.submit_prompt();
        assert_eq!(ws.analyses.motif_query().pattern, "ATC");
        assert!(ws.prompt.is_none());
    }

    #[test]
    fn test_entering_update_closes_prompt() {
        let mut store = FakeStore::with(&[("a", "ATCG")]);
        let mut ws = loaded(&mut store);
        let edit = ws.begin_edit_at_cursor();
        ws.open_motif_prompt();
        assert!(ws.prompt.is_some());

        store.run(&mut ws, edit);
        assert_eq!(ws.mode().label(), "UPDATE");
        assert!(ws.prompt.is_none());

        ws.cancel_draft();
        assert!(ws.modes.is_browse());
        assert!(ws.prompt.is_none());
    }

    #[test]
    fn test_create_from_command_line_leaves_no_prompt() {
        let mut ws = Workspace::new();
        ws.open_command();
        for c in "new".chars() {
            ws.prompt_input(c);
        }
        ws.submit_prompt();
        assert_eq!(ws.mode().label(), "CREATE");
        assert!(ws.prompt.is_none());
    }

    #[test]
    fn test_selecting_supersedes_pending_edit() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        let edit = ws.begin_edit_at_cursor().remove(0);
        assert_eq!(ws.modes.pending_edit_target(), Some("a"));

        ws.move_down();
        let select = ws.select_at_cursor();
        store.run(&mut ws, select);
        assert_eq!(ws.modes.pending_edit_target(), None);

        settle_with(&mut store, &mut ws, edit);
        assert!(ws.modes.is_browse());
        assert_eq!(ws.selection.active_id(), Some("b"));
    }

    #[test]
    fn test_refresh_dropping_edit_target_discards_edit_load() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        let edit = ws.begin_edit_at_cursor().remove(0);

        store.records.remove(0);
        let refresh = ws.refresh();
        store.run(&mut ws, refresh);
        assert_eq!(ws.modes.pending_edit_target(), None);

        ws.settle(Settlement {
            purpose: edit.purpose,
            outcome: Ok(Reply::Fetched(SequenceDetail {
                id: "a".to_string(),
                sequence: "ATCG".to_string(),
            })),
        });
        assert_eq!(ws.mode(), &WorkspaceMode::Browse);
    }

    #[test]
    fn test_refresh_reports_missing_update_target() {
        let mut store = FakeStore::with(&[("a", "ATCG"), ("b", "GGCC")]);
        let mut ws = loaded(&mut store);
        let edit = ws.begin_edit_at_cursor();
        store.run(&mut ws, edit);
        assert_eq!(ws.mode().label(), "UPDATE");

        // Removed by another client while the draft is open.
        store.records.remove(0);
        let refresh = ws.refresh();
        store.run(&mut ws, refresh);

        let status = ws.status.clone().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "Sequence a no longer exists on the server.");
        assert_eq!(ws.mode().label(), "UPDATE");
    }
}
