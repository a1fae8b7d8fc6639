//! Instrument substitution: swaps instrument tokens that may be missing at
//! runtime for fallbacks that are always available, and remembers enough to
//! undo the swap position by position.

use serde::{Deserialize, Serialize};

use crate::source::TextRange;

/// Built-in `(token, fallback)` pairs.
const BUILTIN: &[(&str, &str)] = &[
    ("supersaw", "sawtooth"),
    ("gm_acoustic_grand_piano", "piano"),
    ("gm_electric_guitar_clean", "triangle"),
    ("gm_synth_bass_1", "sawtooth"),
    ("gm_pad_warm", "triangle"),
];

/// One substitution rule: whole-identifier `token` becomes `fallback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRule {
    pub token: String,
    pub fallback: String,
}

/// The built-in substitution table.
pub fn builtin_rules() -> Vec<SubstitutionRule> {
    BUILTIN
        .iter()
        .map(|&(token, fallback)| SubstitutionRule {
            token: token.to_string(),
            fallback: fallback.to_string(),
        })
        .collect()
}

/// A substitution found in the original play code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRecord {
    pub original_start: usize,
    pub original_end: usize,
    pub replacement: String,
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Find every identifier in `code` that a rule replaces, in position order.
pub fn scan(code: &str, rules: &[SubstitutionRule]) -> Vec<SubstitutionRecord> {
    let bytes = code.as_bytes();
    let mut records = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !is_ident(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_ident(bytes[i]) {
            i += 1;
        }
        let word = &code[start..i];
        if let Some(rule) = rules.iter().find(|r| r.token == word) {
            records.push(SubstitutionRecord {
                original_start: start,
                original_end: i,
                replacement: rule.fallback.clone(),
            });
        }
    }

    records
}

/// Apply position-ordered records to the code they were scanned from.
pub fn apply(code: &str, records: &[SubstitutionRecord]) -> String {
    let mut out = String::with_capacity(code.len());
    let mut cursor = 0;
    for record in records {
        out.push_str(&code[cursor..record.original_start]);
        out.push_str(&record.replacement);
        cursor = record.original_end;
    }
    out.push_str(&code[cursor..]);
    out
}

/// Reverse table from substituted offsets to original offsets.
///
/// Entry `i` is the original span behind substituted byte `i`: a single byte
/// for untouched text, the whole replaced token for replacement bytes. A
/// final sentinel covers the end position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRemap {
    spans: Vec<(usize, usize)>,
}

impl SubstitutionRemap {
    pub fn new(original_len: usize, records: &[SubstitutionRecord]) -> Self {
        let mut spans = Vec::with_capacity(original_len + 1);
        let mut orig = 0;
        for record in records {
            spans.extend((orig..record.original_start).map(|p| (p, p + 1)));
            spans.extend(
                std::iter::repeat((record.original_start, record.original_end))
                    .take(record.replacement.len()),
            );
            orig = record.original_end;
        }
        spans.extend((orig..original_len).map(|p| (p, p + 1)));
        spans.push((original_len, original_len));
        Self { spans }
    }

    /// Map a range in substituted coordinates back to original coordinates.
    pub fn to_original(&self, range: TextRange) -> TextRange {
        let last = self.spans.len() - 1;
        let from = range.from.min(last);
        let to = range.to.min(last);
        if from == to {
            let p = self.spans[from].0;
            return TextRange::new(p, p);
        }
        TextRange::new(self.spans[from].0, self.spans[to - 1].1)
    }
}

impl Default for SubstitutionRemap {
    /// The identity remap over empty code.
    fn default() -> Self {
        Self::new(0, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_matches_whole_identifiers_only() {
        let code = r#"note("c").s("supersaw supersaw2 xsupersaw")"#;
        let records = scan(code, &builtin_rules());
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(&code[r.original_start..r.original_end], "supersaw");
        assert_eq!(r.replacement, "sawtooth");
    }

    #[test]
    fn apply_splices_in_order() {
        let code = r#"s("gm_pad_warm supersaw")"#;
        let records = scan(code, &builtin_rules());
        assert_eq!(apply(code, &records), r#"s("triangle sawtooth")"#);
    }

    #[test]
    fn no_records_leaves_code_untouched() {
        let code = r#"s("bd sd")"#;
        let records = scan(code, &builtin_rules());
        assert!(records.is_empty());
        assert_eq!(apply(code, &records), code);
    }

    #[test]
    fn remap_sends_replacement_bytes_to_whole_original_token() {
        // "gm_acoustic_grand_piano" (23 bytes) -> "piano" (5 bytes)
        let code = r#"s("x gm_acoustic_grand_piano y")"#;
        let records = scan(code, &builtin_rules());
        let substituted = apply(code, &records);
        let remap = SubstitutionRemap::new(code.len(), &records);

        let at = substituted.find("piano").unwrap();
        let original = remap.to_original(TextRange::new(at + 1, at + 3));
        assert_eq!(original.slice(code), Some("gm_acoustic_grand_piano"));

        // Text after the replacement shifts back by the length difference.
        let y = substituted.find('y').unwrap();
        let original = remap.to_original(TextRange::new(y, y + 1));
        assert_eq!(original.slice(code), Some("y"));
    }

    #[test]
    fn remap_range_spanning_replacement_and_plain_text() {
        let code = "supersaw x";
        let records = scan(code, &builtin_rules());
        let substituted = apply(code, &records);
        let remap = SubstitutionRemap::new(code.len(), &records);
        let original = remap.to_original(TextRange::new(0, substituted.len()));
        assert_eq!(original, TextRange::new(0, code.len()));
    }

    #[test]
    fn remap_end_position() {
        let code = "ab";
        let remap = SubstitutionRemap::new(code.len(), &[]);
        assert_eq!(remap.to_original(TextRange::new(2, 2)), TextRange::new(2, 2));
        assert_eq!(remap.to_original(TextRange::new(1, 9)), TextRange::new(1, 2));
    }

    #[test]
    fn default_remap_maps_empty_code() {
        let remap = SubstitutionRemap::default();
        assert_eq!(remap, SubstitutionRemap::new(0, &[]));
        assert_eq!(remap.to_original(TextRange::new(0, 4)), TextRange::new(0, 0));
    }
}
