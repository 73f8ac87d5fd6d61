//! TUI rendering module.
//!
//! This module handles all visual rendering using ratatui:
//! - Sequence list on the left, with cursor and active markers
//! - Active sequence with colored nucleotides and the five analysis cards
//! - Create/Update draft form in place of the detail view
//! - Status bar with mode, prompt and feedback
//! - Help overlay

pub mod glyphs;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::mode::{EditDraft, WorkspaceMode};
use crate::model::{
    AnalysisKind, AnalysisState, CompressReport, DecompressReport, FreqReport, GcReport,
    MotifReport,
};
use crate::workspace::{Prompt, Workspace};
use glyphs::Glyphs;

/// Width of the sequence list panel.
const LIST_PANEL_WIDTH: u16 = 34;
/// Minimum width for the detail panel.
const MIN_DETAIL_PANEL_WIDTH: u16 = 20;
/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;
/// Lines drawn per list entry: header, then preview.
const LIST_ENTRY_HEIGHT: usize = 2;
/// Height of the active sequence block (including borders).
const SEQUENCE_BLOCK_HEIGHT: u16 = 8;

/// Color scheme for nucleotides.
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// DNA nucleotide color scheme.
pub struct DnaColorScheme;

impl ColorScheme for DnaColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' => Color::Blue,
            _ => Color::DarkGray,
        }
    }
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &Workspace, glyphs: &Glyphs) {
    let area = frame.area();

    // Main layout: content area + status bar
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(STATUS_BAR_HEIGHT)])
        .split(area);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(LIST_PANEL_WIDTH),
            Constraint::Min(MIN_DETAIL_PANEL_WIDTH),
        ])
        .split(main_layout[0]);

    render_list_panel(frame, state, glyphs, content_layout[0]);
    match state.mode() {
        WorkspaceMode::Create { draft } => {
            render_draft_form(frame, "New Sequence", draft, glyphs, content_layout[1])
        }
        WorkspaceMode::Update { id, draft } => {
            let title = format!("Edit {}", id);
            render_draft_form(frame, &title, draft, glyphs, content_layout[1])
        }
        WorkspaceMode::Browse => render_detail_panel(frame, state, glyphs, content_layout[1]),
    }
    render_status_bar(frame, state, main_layout[1]);

    if state.show_help {
        render_help(frame, area);
    }
}

/// First list entry to draw so that the cursor stays visible.
fn list_offset(cursor: usize, visible_entries: usize) -> usize {
    if visible_entries == 0 {
        0
    } else {
        cursor.saturating_sub(visible_entries - 1)
    }
}

/// Shortens `text` to `max` characters, marking the cut with `…`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    } else {
        text.to_string()
    }
}

/// Renders the sequence list.
fn render_list_panel(frame: &mut Frame, state: &Workspace, glyphs: &Glyphs, area: Rect) {
    let visible_entries = area.height.saturating_sub(2) as usize / LIST_ENTRY_HEIGHT;
    let inner_width = area.width.saturating_sub(2) as usize;
    let max_id_len = (LIST_PANEL_WIDTH as usize).saturating_sub(16);
    let active_id = state.selection.active_id();
    let start = list_offset(state.cursor, visible_entries);

    let mut lines: Vec<Line> = Vec::new();
    for (row_idx, summary) in state
        .cache
        .items()
        .iter()
        .enumerate()
        .skip(start)
        .take(visible_entries)
    {
        let is_cursor = row_idx == state.cursor;
        let is_active = active_id == Some(summary.id.as_str());

        let id = truncate(&summary.id, max_id_len);

        let style = if is_cursor {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };

        let mut spans = vec![
            Span::styled(if is_cursor { glyphs.cursor } else { " " }, style),
            Span::styled(if is_active { glyphs.active } else { " " }, style),
            Span::styled(format!(" {} ", id), style),
            Span::styled(
                format!("{} bp", summary.length_label()),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if summary.compressed {
            spans.push(Span::styled(
                format!(" {}", glyphs.compressed),
                Style::default().fg(Color::Magenta),
            ));
        }
        lines.push(Line::from(spans));

        let preview = if summary.preview.is_empty() {
            "(empty)"
        } else {
            summary.preview.as_str()
        };
        lines.push(Line::from(Span::styled(
            format!("   {}", truncate(preview, inner_width.saturating_sub(3))),
            Style::default().fg(Color::Gray),
        )));
    }

    if lines.is_empty() {
        let placeholder = if state.cache.is_refreshing() {
            "Loading sequences..."
        } else {
            "No sequences. Press n to add one."
        };
        lines.push(Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        )));
    }

    let title = format!("Sequences ({})", state.cache.len());
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Splits `text` into colored rows of at most `width` nucleotides.
fn dna_lines(text: &str, width: usize, max_rows: usize) -> Vec<Line<'static>> {
    let color_scheme = DnaColorScheme;
    let width = width.max(1);
    let options = textwrap::Options::new(width).break_words(true);
    textwrap::wrap(text, options)
        .into_iter()
        .take(max_rows)
        .map(|row| {
            let spans: Vec<Span> = row
                .chars()
                .map(|c| {
                    Span::styled(
                        c.to_string(),
                        Style::default().fg(Color::Black).bg(color_scheme.get_color(c)),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Renders the active sequence and its analysis cards, or a placeholder.
fn render_detail_panel(frame: &mut Frame, state: &Workspace, glyphs: &Glyphs, area: Rect) {
    let Some(active_id) = state.selection.active_id() else {
        let mut lines = vec![Line::from("No sequence selected.")];
        if let Some(id) = state.modes.pending_edit_target() {
            lines.push(Line::from(Span::styled(
                format!("Loading {} for editing...", id),
                Style::default().fg(Color::Yellow),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Enter: select  n: new  ?: help",
            Style::default().fg(Color::DarkGray),
        )));
        let block = Block::default().borders(Borders::ALL).title("Detail");
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(SEQUENCE_BLOCK_HEIGHT), Constraint::Min(4)])
        .split(area);

    // Active sequence
    let seq_area = layout[0];
    let inner_width = seq_area.width.saturating_sub(2) as usize;
    let inner_rows = seq_area.height.saturating_sub(2) as usize;
    let lines = if state.selection.is_loading() {
        vec![Line::from(Span::styled(
            state.selection.display_text().to_string(),
            Style::default().fg(Color::Yellow),
        ))]
    } else {
        dna_lines(state.selection.display_text(), inner_width, inner_rows)
    };
    let length = state
        .cache
        .find(active_id)
        .map(|s| s.length_label())
        .unwrap_or_else(|| "?".to_string());
    let title = format!("Sequence {} [{} bp]", active_id, length);
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(lines).block(block), seq_area);

    render_analysis_cards(frame, state, glyphs, layout[1]);
}

/// Renders the five analysis cards in two rows.
fn render_analysis_cards(frame: &mut Frame, state: &Workspace, glyphs: &Glyphs, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    let board = &state.analyses;
    let cards = [
        (AnalysisKind::Compress, compress_lines(&board.compress), top[0]),
        (AnalysisKind::Decompress, decompress_lines(&board.decompress, glyphs), top[1]),
        (AnalysisKind::Gc, gc_lines(&board.gc), top[2]),
        (AnalysisKind::Freq, freq_lines(&board.freq), bottom[0]),
        (AnalysisKind::Motif, motif_lines(state), bottom[1]),
    ];
    for (kind, lines, rect) in cards {
        let title = format!("{} [{}]", kind.title(), key_hint(kind));
        let block = Block::default().borders(Borders::ALL).title(title);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, rect);
    }
}

fn key_hint(kind: AnalysisKind) -> char {
    match kind {
        AnalysisKind::Compress => 'c',
        AnalysisKind::Decompress => 'x',
        AnalysisKind::Gc => 'g',
        AnalysisKind::Freq => 'f',
        AnalysisKind::Motif => 'm',
    }
}

/// Common Idle/Loading/Failed rendering; `ready` formats a result.
fn card_lines<T>(
    kind: AnalysisKind,
    state: &AnalysisState<T>,
    ready: impl Fn(&T) -> Vec<Line<'static>>,
) -> Vec<Line<'static>> {
    match state {
        AnalysisState::Idle => vec![Line::from(Span::styled(
            format!("Press {} to run", key_hint(kind)),
            Style::default().fg(Color::DarkGray),
        ))],
        AnalysisState::Loading => vec![Line::from(Span::styled(
            kind.busy_label(),
            Style::default().fg(Color::Yellow),
        ))],
        AnalysisState::Failed(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))],
        AnalysisState::Ready(report) => ready(report),
    }
}

fn compress_lines(state: &AnalysisState<CompressReport>) -> Vec<Line<'static>> {
    card_lines(AnalysisKind::Compress, state, |r| {
        let mut lines = vec![
            Line::from(format!("Ratio: {:.2}", r.compression_ratio)),
            Line::from(format!("File: {}", r.compressed_file)),
        ];
        if let (Some(original), Some(compressed)) = (r.original_size_bytes, r.compressed_size_bytes) {
            lines.push(Line::from(format!("Size: {} -> {} bytes", original, compressed)));
        }
        lines
    })
}

fn decompress_lines(state: &AnalysisState<DecompressReport>, glyphs: &Glyphs) -> Vec<Line<'static>> {
    let (ok, fail) = (glyphs.ok, glyphs.fail);
    card_lines(AnalysisKind::Decompress, state, move |r| {
        let verdict = if r.lossless_verification {
            Span::styled(ok, Style::default().fg(Color::Green))
        } else {
            Span::styled(fail, Style::default().fg(Color::Red))
        };
        vec![
            Line::from(format!("Length: {}", r.length)),
            Line::from(vec![Span::raw("Lossless: "), verdict]),
            Line::from(format!("Preview: {}", r.sequence_preview)),
        ]
    })
}

fn gc_lines(state: &AnalysisState<GcReport>) -> Vec<Line<'static>> {
    card_lines(AnalysisKind::Gc, state, |r| {
        vec![
            Line::from(format!("GC: {:.2}%", r.gc_percent)),
            Line::from(format!("G: {}  C: {}", r.g_count, r.c_count)),
        ]
    })
}

fn freq_lines(state: &AnalysisState<FreqReport>) -> Vec<Line<'static>> {
    let color_scheme = DnaColorScheme;
    card_lines(AnalysisKind::Freq, state, |r| {
        r.counts
            .entries()
            .iter()
            .zip(r.percentages.entries().iter())
            .map(|((base, count), (_, pct))| {
                Line::from(vec![
                    Span::styled(
                        base.to_string(),
                        Style::default().fg(color_scheme.get_color(*base)),
                    ),
                    Span::raw(format!(": {} ({:.2}%)", count, pct)),
                ])
            })
            .collect()
    })
}

fn motif_lines(state: &Workspace) -> Vec<Line<'static>> {
    let query = state.analyses.motif_query();
    let header = Line::from(Span::styled(
        format!(
            "Pattern: {} ({})",
            query.pattern,
            if query.use_regex { "regex" } else { "literal" }
        ),
        Style::default().fg(Color::Cyan),
    ));
    let mut lines = vec![header];
    lines.extend(card_lines(AnalysisKind::Motif, &state.analyses.motif, |r: &MotifReport| {
        let mut lines = vec![Line::from(format!("Matches: {}", r.total_matches))];
        lines.extend(
            r.matches
                .iter()
                .map(|m| Line::from(format!("{}-{}  {}", m.start, m.end, m.matched))),
        );
        lines
    }));
    lines
}

/// Renders the create/update form.
fn render_draft_form(frame: &mut Frame, title: &str, draft: &EditDraft, glyphs: &Glyphs, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();

    let mut text_spans: Vec<Span> = draft
        .text
        .chars()
        .map(|c| Span::styled(c.to_string(), Style::default().fg(DnaColorScheme.get_color(c))))
        .collect();
    if !draft.submitting {
        text_spans.push(Span::styled(glyphs.caret, Style::default().fg(Color::White)));
    }
    lines.push(Line::from(text_spans));
    lines.push(Line::from(glyphs.h_separator.repeat(inner_width)));

    if let Some(error) = &draft.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    if draft.submitting {
        lines.push(Line::from(Span::styled(
            "Saving...",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter: save  Esc: cancel  Ctrl+U: clear",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &Workspace, area: Rect) {
    let mode_str = state.mode().label();

    let (left_content, is_error) = match &state.prompt {
        Some(Prompt::Command(cmd)) => (format!(" {} | :{} ", mode_str, cmd), false),
        Some(Prompt::MotifPattern(pattern)) => (format!(" {} | motif: {} ", mode_str, pattern), false),
        None => match &state.status {
            Some(status) => (format!(" {} | {} ", mode_str, status.text), status.is_error),
            None => (format!(" {} | ", mode_str), false),
        },
    };

    let mut right_content = String::new();
    if state.cache.is_refreshing() {
        right_content.push_str("Loading sequences... | ");
    }
    if state.cache.is_empty() {
        right_content.push_str("Seq 0/0 ");
    } else {
        right_content.push_str(&format!("Seq {}/{} ", state.cursor + 1, state.cache.len()));
    }

    let bar_bg = if is_error { Color::Red } else { Color::Cyan };
    let left_len = left_content.chars().count();
    let right_len = right_content.chars().count();
    let status_line = Line::from(vec![
        Span::styled(left_content, Style::default().fg(Color::Black).bg(bar_bg)),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + right_len)),
            Style::default().bg(bar_bg),
        ),
        Span::styled(
            right_content,
            Style::default()
                .fg(Color::Black)
                .bg(bar_bg)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

const HELP_LINES: &[&str] = &[
    "j/k, arrows   move in the list",
    "Home / End    first / last sequence",
    "Enter         select sequence",
    "Esc           clear selection",
    "n             new sequence",
    "e             edit sequence",
    "d             delete sequence",
    "r             refresh list",
    "c x g f m     compress, decompress, GC, frequency, motif",
    "/             edit motif pattern",
    "R             toggle regex motif search",
    ":q :r :new    quit, refresh, new",
    ":motif <p>    set motif pattern and search",
    "Ctrl+C        quit",
    "",
    "Press any key to close",
];

/// Area of `width` x `height` centered in `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Renders the help overlay.
fn render_help(frame: &mut Frame, area: Rect) {
    let rect = centered(area, 64, HELP_LINES.len() as u16 + 2);
    let lines: Vec<Line> = HELP_LINES.iter().map(|l| Line::from(*l)).collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
