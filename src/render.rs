//! Terminal rendering of highlight marks as styled ratatui spans.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::highlight::MarkSink;
use crate::source::{split_lines, SourceLine, TextRange};

/// Style for ranges that evaluate to static values.
pub const PERSISTENT_STYLE: Style = Style::new().add_modifier(Modifier::UNDERLINED);
/// Style for ranges sounding in the current frame.
pub const ACTIVE_STYLE: Style = Style::new().add_modifier(Modifier::REVERSED);

/// Decoration state for one document, replaced wholesale on every update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decorations {
    persistent: Vec<TextRange>,
    active: Vec<TextRange>,
    frame_time: Option<f64>,
}

impl Decorations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persistent(&self) -> &[TextRange] {
        &self.persistent
    }

    pub fn active(&self) -> &[TextRange] {
        &self.active
    }

    /// Playback instant of the last frame, if one has been drawn.
    pub fn frame_time(&self) -> Option<f64> {
        self.frame_time
    }

    /// True when no marks of either kind are shown.
    pub fn is_clear(&self) -> bool {
        self.persistent.is_empty() && self.active.is_empty()
    }

    /// Style the given document line, splitting at every mark edge.
    pub fn line_spans<'a>(&self, document: &'a str, line: &SourceLine) -> Vec<Span<'a>> {
        let text = line.text(document);
        if text.is_empty() {
            return vec![Span::raw("")];
        }

        let mut cuts = vec![line.start, line.end];
        for range in self.persistent.iter().chain(&self.active) {
            for edge in [range.from, range.to] {
                if edge > line.start && edge < line.end && document.is_char_boundary(edge) {
                    cuts.push(edge);
                }
            }
        }
        cuts.sort_unstable();
        cuts.dedup();

        let mut spans = Vec::with_capacity(cuts.len() - 1);
        for pair in cuts.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            spans.push(Span::styled(&document[from..to], self.style_at(from, to)));
        }
        spans
    }

    /// Render every line of `document`.
    pub fn render_lines<'a>(&self, document: &'a str) -> Vec<Line<'a>> {
        split_lines(document)
            .iter()
            .map(|line| Line::from(self.line_spans(document, line)))
            .collect()
    }

    fn style_at(&self, from: usize, to: usize) -> Style {
        let covers = |range: &TextRange| range.from <= from && to <= range.to;
        let mut style = Style::default();
        if self.persistent.iter().any(covers) {
            style = style.patch(PERSISTENT_STYLE);
        }
        if self.active.iter().any(covers) {
            style = style.patch(ACTIVE_STYLE);
        }
        style
    }
}

impl MarkSink for Decorations {
    fn apply_persistent_marks(&mut self, ranges: &[TextRange]) {
        self.persistent = ranges.to_vec();
    }

    fn apply_frame_marks(&mut self, time: f64, ranges: &[TextRange]) {
        self.active = ranges.to_vec();
        self.frame_time = Some(time);
    }
}
