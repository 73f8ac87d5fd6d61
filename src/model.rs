//! Data model for the sequence workspace.
//!
//! This module contains the records exchanged with the remote sequence
//! service:
//! - Sequence summaries (listing rows) and full sequence details
//! - Analysis kinds and the payload returned for each of them
//! - Per-kind analysis state as shown in the analysis panel
//!
//! Everything here is plain data; the synchronization rules live in
//! `cache`, `selection`, `mode`, and `analysis`.

use std::fmt;

use serde::Deserialize;

/// Maximum number of characters shown in a sequence preview.
pub const PREVIEW_LEN: usize = 20;
/// Marker appended to a truncated preview.
pub const ELLIPSIS: &str = "...";

/// Lightweight listing record for one stored sequence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SequenceSummary {
    /// Opaque identifier assigned by the service
    pub id: String,
    /// First characters of the sequence, `...`-suffixed when truncated
    #[serde(default)]
    pub preview: String,
    /// Sequence length in bases, if the service reported it
    #[serde(default)]
    pub length: Option<u64>,
    /// Whether a compressed copy exists on the service
    #[serde(default)]
    pub compressed: bool,
}

impl SequenceSummary {
    /// Creates a new summary.
    pub fn new(id: impl Into<String>, preview: impl Into<String>, length: Option<u64>) -> Self {
        Self {
            id: id.into(),
            preview: preview.into(),
            length,
            compressed: false,
        }
    }

    /// Length rendered for display, `?` when unknown.
    pub fn length_label(&self) -> String {
        match self.length {
            Some(len) => len.to_string(),
            None => "?".to_string(),
        }
    }
}

/// Full sequence payload for one record, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDetail {
    pub id: String,
    pub sequence: String,
}

/// Builds the listing preview for a sequence.
///
/// Keeps the first [`PREVIEW_LEN`] characters and appends [`ELLIPSIS`] only
/// when the sequence is longer than that.
pub fn preview_of(sequence: &str) -> String {
    let mut chars = sequence.chars();
    let head: String = chars.by_ref().take(PREVIEW_LEN).collect();
    if chars.next().is_some() {
        format!("{}{}", head, ELLIPSIS)
    } else {
        head
    }
}

/// The analyses the service can run on a stored sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Compress,
    Decompress,
    Gc,
    Freq,
    Motif,
}

impl AnalysisKind {
    /// Card title.
    pub fn title(self) -> &'static str {
        match self {
            AnalysisKind::Compress => "Compress",
            AnalysisKind::Decompress => "Decompress & Verify",
            AnalysisKind::Gc => "GC Content",
            AnalysisKind::Freq => "Nucleotide Frequency",
            AnalysisKind::Motif => "Motif Search",
        }
    }

    /// Text shown while a request of this kind is in flight.
    pub fn busy_label(self) -> &'static str {
        match self {
            AnalysisKind::Compress => "Compressing...",
            AnalysisKind::Decompress => "Decompressing...",
            AnalysisKind::Gc | AnalysisKind::Freq => "Calculating...",
            AnalysisKind::Motif => "Searching...",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisKind::Compress => "compress",
            AnalysisKind::Decompress => "decompress",
            AnalysisKind::Gc => "gc",
            AnalysisKind::Freq => "freq",
            AnalysisKind::Motif => "motif",
        };
        write!(f, "{}", name)
    }
}

/// Parameters of a motif search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotifQuery {
    pub pattern: String,
    pub use_regex: bool,
}

impl Default for MotifQuery {
    fn default() -> Self {
        Self {
            pattern: "ATG".to_string(),
            use_regex: false,
        }
    }
}

/// Result of `POST /sequences/{id}/compress`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompressReport {
    pub compression_ratio: f64,
    pub compressed_file: String,
    #[serde(default)]
    pub original_size_bytes: Option<u64>,
    #[serde(default)]
    pub compressed_size_bytes: Option<u64>,
}

/// Result of `GET /sequences/{id}/decompress`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecompressReport {
    pub length: u64,
    pub lossless_verification: bool,
    #[serde(default)]
    pub sequence_preview: String,
}

/// Result of `GET /sequences/{id}/gc`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GcReport {
    #[serde(rename = "GC_percent")]
    pub gc_percent: f64,
    #[serde(rename = "G_count")]
    pub g_count: u64,
    #[serde(rename = "C_count")]
    pub c_count: u64,
}

/// One value per nucleotide.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BaseTally<T> {
    #[serde(rename = "A")]
    pub a: T,
    #[serde(rename = "T")]
    pub t: T,
    #[serde(rename = "C")]
    pub c: T,
    #[serde(rename = "G")]
    pub g: T,
}

impl<T: Copy> BaseTally<T> {
    /// Pairs each base letter with its value, in A, T, C, G order.
    pub fn entries(&self) -> [(char, T); 4] {
        [('A', self.a), ('T', self.t), ('C', self.c), ('G', self.g)]
    }
}

/// Result of `GET /sequences/{id}/freq`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FreqReport {
    pub counts: BaseTally<u64>,
    pub percentages: BaseTally<f64>,
}

/// A single motif hit, 1-based inclusive coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MotifMatch {
    pub start: u64,
    pub end: u64,
    #[serde(rename = "match")]
    pub matched: String,
}

/// Result of `POST /sequences/{id}/motif`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MotifReport {
    pub total_matches: u64,
    #[serde(default)]
    pub matches: Vec<MotifMatch>,
}

/// Payload of any analysis, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPayload {
    Compress(CompressReport),
    Decompress(DecompressReport),
    Gc(GcReport),
    Freq(FreqReport),
    Motif(MotifReport),
}

impl AnalysisPayload {
    /// The kind of analysis that produced this payload.
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisPayload::Compress(_) => AnalysisKind::Compress,
            AnalysisPayload::Decompress(_) => AnalysisKind::Decompress,
            AnalysisPayload::Gc(_) => AnalysisKind::Gc,
            AnalysisPayload::Freq(_) => AnalysisKind::Freq,
            AnalysisPayload::Motif(_) => AnalysisKind::Motif,
        }
    }
}

/// Display state of one analysis card.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState<T> {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> AnalysisState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading)
    }
}
