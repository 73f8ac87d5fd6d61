//! Analysis request orchestration.
//!
//! Each analysis kind owns an independent result slot. Triggering a kind
//! without an active record fails locally; otherwise the slot goes to
//! `Loading` and a request is produced. Slots never block one another, and
//! re-triggering a loading kind is allowed (the last response to settle wins).
//!
//! All slots are scoped to the active record: [`AnalysisBoard::reset`] clears
//! them and advances the board epoch, so responses still in flight for the
//! previous record are dropped when they settle.

use log::debug;
use thiserror::Error;

use crate::gateway::{AnalysisCall, Call, GatewayError};
use crate::model::{
    AnalysisKind, AnalysisPayload, AnalysisState, CompressReport, DecompressReport, FreqReport,
    GcReport, MotifQuery, MotifReport,
};
use crate::selection::{SettleOutcome, Staleness, Token};

/// Local failures of an analysis trigger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Upload or select a sequence first.")]
    NoTarget,
}

/// An analysis request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub kind: AnalysisKind,
    pub epoch: Token,
}

/// Per-kind analysis state for the active record.
#[derive(Debug, Clone, Default)]
pub struct AnalysisBoard {
    pub compress: AnalysisState<CompressReport>,
    pub decompress: AnalysisState<DecompressReport>,
    pub gc: AnalysisState<GcReport>,
    pub freq: AnalysisState<FreqReport>,
    pub motif: AnalysisState<MotifReport>,
    query: MotifQuery,
    epochs: Staleness,
}

impl AnalysisBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters used by the next motif search.
    pub fn motif_query(&self) -> &MotifQuery {
        &self.query
    }

    pub fn set_motif_pattern(&mut self, pattern: impl Into<String>) {
        self.query.pattern = pattern.into();
    }

    pub fn toggle_regex(&mut self) -> bool {
        self.query.use_regex = !self.query.use_regex;
        self.query.use_regex
    }

    pub fn is_loading(&self, kind: AnalysisKind) -> bool {
        match kind {
            AnalysisKind::Compress => self.compress.is_loading(),
            AnalysisKind::Decompress => self.decompress.is_loading(),
            AnalysisKind::Gc => self.gc.is_loading(),
            AnalysisKind::Freq => self.freq.is_loading(),
            AnalysisKind::Motif => self.motif.is_loading(),
        }
    }

    fn set_loading(&mut self, kind: AnalysisKind) {
        match kind {
            AnalysisKind::Compress => self.compress = AnalysisState::Loading,
            AnalysisKind::Decompress => self.decompress = AnalysisState::Loading,
            AnalysisKind::Gc => self.gc = AnalysisState::Loading,
            AnalysisKind::Freq => self.freq = AnalysisState::Loading,
            AnalysisKind::Motif => self.motif = AnalysisState::Loading,
        }
    }

    fn set_failed(&mut self, kind: AnalysisKind, message: String) {
        match kind {
            AnalysisKind::Compress => self.compress = AnalysisState::Failed(message),
            AnalysisKind::Decompress => self.decompress = AnalysisState::Failed(message),
            AnalysisKind::Gc => self.gc = AnalysisState::Failed(message),
            AnalysisKind::Freq => self.freq = AnalysisState::Failed(message),
            AnalysisKind::Motif => self.motif = AnalysisState::Failed(message),
        }
    }

    fn set_ready(&mut self, payload: AnalysisPayload) {
        match payload {
            AnalysisPayload::Compress(report) => self.compress = AnalysisState::Ready(report),
            AnalysisPayload::Decompress(report) => self.decompress = AnalysisState::Ready(report),
            AnalysisPayload::Gc(report) => self.gc = AnalysisState::Ready(report),
            AnalysisPayload::Freq(report) => self.freq = AnalysisState::Ready(report),
            AnalysisPayload::Motif(report) => self.motif = AnalysisState::Ready(report),
        }
    }

    /// Starts an analysis of `kind` against the active record.
    pub fn trigger(
        &mut self,
        kind: AnalysisKind,
        active_id: Option<&str>,
    ) -> Result<(AnalysisTicket, Call), AnalysisError> {
        let Some(id) = active_id else {
            self.set_failed(kind, AnalysisError::NoTarget.to_string());
            return Err(AnalysisError::NoTarget);
        };

        let analysis = match kind {
            AnalysisKind::Compress => AnalysisCall::Compress,
            AnalysisKind::Decompress => AnalysisCall::Decompress,
            AnalysisKind::Gc => AnalysisCall::Gc,
            AnalysisKind::Freq => AnalysisCall::Freq,
            AnalysisKind::Motif => AnalysisCall::Motif(self.query.clone()),
        };
        self.set_loading(kind);

        let ticket = AnalysisTicket {
            kind,
            epoch: self.epochs.current(),
        };
        let call = Call::Analyze {
            id: id.to_string(),
            analysis,
        };
        Ok((ticket, call))
    }

    /// Stores the outcome of an analysis if it belongs to the current record.
    pub fn settle(
        &mut self,
        ticket: AnalysisTicket,
        result: Result<AnalysisPayload, GatewayError>,
    ) -> SettleOutcome {
        if !self.epochs.is_current(ticket.epoch) {
            debug!("Discarding {} result for a previous selection", ticket.kind);
            return SettleOutcome::Discarded;
        }
        match result {
            Ok(payload) if payload.kind() == ticket.kind => self.set_ready(payload),
            Ok(payload) => self.set_failed(
                ticket.kind,
                format!("Unexpected {} payload", payload.kind()),
            ),
            Err(e) => self.set_failed(ticket.kind, e.to_string()),
        }
        SettleOutcome::Applied
    }

    /// Clears every slot; results still in flight become stale.
    ///
    /// The motif query is kept, like the search field of a form.
    pub fn reset(&mut self) {
        self.compress = AnalysisState::Idle;
        self.decompress = AnalysisState::Idle;
        self.gc = AnalysisState::Idle;
        self.freq = AnalysisState::Idle;
        self.motif = AnalysisState::Idle;
        self.epochs.invalidate();
    }
}
