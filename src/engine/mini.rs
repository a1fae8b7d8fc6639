//! Reference mini-notation engine.
//!
//! Every word inside a double-quoted or backtick string is one step, and a
//! string's steps share one cycle evenly. `~` and `-` are rests; numbers after `*`,
//! `/`, `@` or `!` are modifiers, not steps. This is enough to drive the
//! highlight loop from the binary and the tests; the real engine is external.

use super::{ActiveEvent, Evaluation, PatternEngine};
use crate::source::TextRange;

/// One string's steps; `None` is a rest.
type Sequence = Vec<Option<TextRange>>;

#[derive(Debug, Clone, Default)]
pub struct MiniEngine {
    sequences: Vec<Sequence>,
}

impl MiniEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of step sequences in the last successful evaluation.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }
}

impl PatternEngine for MiniEngine {
    fn evaluate(&mut self, assembled: &str) -> Evaluation {
        match parse_sequences(assembled) {
            Ok(sequences) => {
                let static_locations = sequences.iter().flatten().flatten().copied().collect();
                self.sequences = sequences;
                Evaluation::Ready { static_locations }
            }
            Err(reason) => Evaluation::Failed { reason },
        }
    }

    fn current_events(&self, time: f64) -> Vec<ActiveEvent> {
        if !time.is_finite() || time < 0.0 {
            return Vec::new();
        }
        let cycle = time.floor();
        let phase = time - cycle;

        self.sequences
            .iter()
            .filter_map(|steps| {
                let n = steps.len();
                if n == 0 {
                    return None;
                }
                let i = ((phase * n as f64) as usize).min(n - 1);
                let location = steps[i]?;
                let step = 1.0 / n as f64;
                Some(ActiveEvent {
                    active_window: (cycle + i as f64 * step, cycle + (i + 1) as f64 * step),
                    locations: vec![location],
                })
            })
            .collect()
    }
}

fn closer_of(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        _ => b'}',
    }
}

fn parse_sequences(text: &str) -> Result<Vec<Sequence>, String> {
    let bytes = text.as_bytes();
    let mut open: Vec<(u8, usize)> = Vec::new();
    let mut sequences = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'"' | b'`' => {
                let (steps, close) = string_steps(bytes, i + 1, b)
                    .ok_or_else(|| format!("unterminated string at byte {i}"))?;
                sequences.push(steps);
                i = close + 1;
                continue;
            }
            b'\'' => {
                let close = bytes[i + 1..]
                    .iter()
                    .position(|&c| c == b'\'')
                    .ok_or_else(|| format!("unterminated string at byte {i}"))?;
                i += close + 2;
                continue;
            }
            b'(' | b'[' | b'{' => open.push((b, i)),
            b')' | b']' | b'}' => match open.pop() {
                Some((o, _)) if closer_of(o) == b => {}
                _ => return Err(format!("unexpected '{}' at byte {i}", b as char)),
            },
            _ => {}
        }
        i += 1;
    }

    match open.pop() {
        Some((o, at)) => Err(format!("unclosed '{}' at byte {at}", o as char)),
        None => Ok(sequences),
    }
}

fn is_step_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'#' | b'.' | b'-' | b':' | b'~')
}

/// Collect the steps of a string body starting at `start`. Returns the steps
/// and the offset of the closing quote.
fn string_steps(bytes: &[u8], start: usize, quote: u8) -> Option<(Sequence, usize)> {
    let mut steps = Vec::new();
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];
        if b == quote {
            return Some((steps, i));
        }
        if b == b'\\' {
            i += 2;
            continue;
        }
        if !is_step_byte(b) {
            i += 1;
            continue;
        }

        let word_start = i;
        while i < bytes.len() && is_step_byte(bytes[i]) {
            i += 1;
        }
        let modifier =
            word_start > start && matches!(bytes[word_start - 1], b'*' | b'/' | b'@' | b'!');
        if modifier {
            continue;
        }
        let word = &bytes[word_start..i];
        if word == b"~" || word == b"-" {
            steps.push(None);
        } else {
            steps.push(Some(TextRange::new(word_start, i)));
        }
    }

    None
}
