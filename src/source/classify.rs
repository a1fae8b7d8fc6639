//! Line classification: decides whether a line is setup-only or starts a pattern.
//!
//! Setup forms are an explicit table matched against the trimmed line, so
//! adding a directive is a one-line change here and nowhere else.

/// The kind of setup statement a line holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupForm {
    /// Sample/resource loading, e.g. `samples('github:tidalcycles/dirt-samples')`.
    ResourceLoad,
    /// Tempo directive, e.g. `setcps(0.5)`.
    Tempo,
    /// Variable declaration, e.g. `const lead = note("c e g")`.
    Declaration,
}

/// Classification of a single document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Setup(SetupForm),
    Pattern,
}

impl LineKind {
    /// Whether the line can close an open pattern block.
    pub fn is_setup_only(self) -> bool {
        !matches!(self, LineKind::Pattern)
    }
}

/// Leading forms that mark a line as setup-only.
pub const SETUP_FORMS: &[(&str, SetupForm)] = &[
    ("samples(", SetupForm::ResourceLoad),
    ("await samples(", SetupForm::ResourceLoad),
    ("setcps(", SetupForm::Tempo),
    ("setcpm(", SetupForm::Tempo),
    ("setCps(", SetupForm::Tempo),
    ("setCpm(", SetupForm::Tempo),
    ("const ", SetupForm::Declaration),
    ("let ", SetupForm::Declaration),
    ("var ", SetupForm::Declaration),
];

/// Characters that, ending a line, announce that the expression continues.
pub const TRAILING_SEPARATORS: &[char] = &[',', '+', '(', '[', '{', '.', '|', '&'];

/// Leading member-access marker of a chained continuation line.
pub const CONTINUATION_MARKER: char = '.';

/// Classify one line of the document.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if is_comment_only(trimmed) {
        return LineKind::Comment;
    }
    SETUP_FORMS
        .iter()
        .find(|(prefix, _)| trimmed.starts_with(prefix))
        .map(|&(_, form)| LineKind::Setup(form))
        .unwrap_or(LineKind::Pattern)
}

/// Whether a trimmed line holds nothing but comments. A `/*` that does not
/// close on the line counts: the comment continues on the following lines.
fn is_comment_only(trimmed: &str) -> bool {
    if trimmed.starts_with("//") {
        return true;
    }
    let Some(body) = trimmed.strip_prefix("/*") else {
        return false;
    };
    match body.find("*/") {
        Some(end) => {
            let rest = body[end + 2..].trim_start();
            rest.is_empty() || is_comment_only(rest)
        }
        None => true,
    }
}

/// Whether code (already stripped of any trailing comment) ends with a separator.
pub fn ends_with_separator(code: &str) -> bool {
    code.trim_end()
        .chars()
        .last()
        .is_some_and(|c| TRAILING_SEPARATORS.contains(&c))
}

/// Whether a line is a chained continuation such as `  .fast(2)`.
pub fn starts_with_continuation(line: &str) -> bool {
    line.trim_start().starts_with(CONTINUATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        let cases: &[(&str, LineKind)] = &[
            ("", LineKind::Blank),
            ("    \t", LineKind::Blank),
            ("// drums", LineKind::Comment),
            ("   // indented comment", LineKind::Comment),
            ("/* drums */", LineKind::Comment),
            ("  /* opens here", LineKind::Comment),
            ("/* a */ /* b */ // c", LineKind::Comment),
            ("/* muted */ s(\"bd\")", LineKind::Pattern),
            (
                "samples('github:tidalcycles/dirt-samples')",
                LineKind::Setup(SetupForm::ResourceLoad),
            ),
            (
                "await samples('shabda:bass:4')",
                LineKind::Setup(SetupForm::ResourceLoad),
            ),
            ("setcps(0.5)", LineKind::Setup(SetupForm::Tempo)),
            ("setcpm(120/4)", LineKind::Setup(SetupForm::Tempo)),
            ("setCps(1)", LineKind::Setup(SetupForm::Tempo)),
            ("setCpm(90)", LineKind::Setup(SetupForm::Tempo)),
            (
                "const chords = \"<Am C>\"",
                LineKind::Setup(SetupForm::Declaration),
            ),
            ("let x = 1", LineKind::Setup(SetupForm::Declaration)),
            ("  var y = 2", LineKind::Setup(SetupForm::Declaration)),
            ("s(\"bd sd\")", LineKind::Pattern),
            ("stack(", LineKind::Pattern),
            ("constant(1)", LineKind::Pattern),
            ("samplesOf(x)", LineKind::Pattern),
            ("  .fast(2)", LineKind::Pattern),
        ];
        for (line, expected) in cases {
            assert_eq!(classify(line), *expected, "line {line:?}");
        }
    }

    #[test]
    fn only_pattern_lines_are_not_setup_only() {
        assert!(LineKind::Blank.is_setup_only());
        assert!(LineKind::Comment.is_setup_only());
        assert!(LineKind::Setup(SetupForm::Tempo).is_setup_only());
        assert!(!LineKind::Pattern.is_setup_only());
    }

    #[test]
    fn separators() {
        assert!(ends_with_separator("s(\"bd\"),"));
        assert!(ends_with_separator("stack(  "));
        assert!(ends_with_separator("note(\"c\")."));
        assert!(!ends_with_separator("s(\"bd\")"));
        assert!(!ends_with_separator(""));
    }

    #[test]
    fn continuation_marker() {
        assert!(starts_with_continuation("  .slow(2)"));
        assert!(!starts_with_continuation("slow(2)"));
    }
}
