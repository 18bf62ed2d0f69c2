//! Link syntax shared by the definition block recognizer and the inline
//! link recognizer: labels, destinations, titles and the definition table.

use std::collections::HashMap;

use super::content::{NodePoint, Span, chars::is_space_or_tab};

/// Meta key under which the definition table is stored.
pub const DEFINITIONS: &str = "definition";

/// Longest link label, in code points between the brackets.
const MAX_LABEL: usize = 999;

/// Nesting limit of unescaped parentheses in a bare destination.
const MAX_PAREN_DEPTH: usize = 32;

/// Where a reference points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub url: String,
    pub title: Option<String>,
}

/// Link reference definitions of a document, keyed by normalized label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions(HashMap<String, LinkTarget>);

impl Definitions {
    /// Adds a definition unless the label is already defined.
    pub fn insert_first(&mut self, label: &str, target: LinkTarget) {
        self.0.entry(normalize_label(label)).or_insert(target);
    }

    pub fn get(&self, label: &str) -> Option<&LinkTarget> {
        self.0.get(&normalize_label(label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Case-folds a label and collapses inner whitespace.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .to_uppercase()
        .to_lowercase()
}

fn ch(points: &[NodePoint], i: usize, end: usize) -> Option<char> {
    (i < end).then(|| points[i].ch)
}

/// Skips spaces, tabs and line endings.
pub fn skip_whitespace(points: &[NodePoint], mut i: usize, end: usize) -> usize {
    while ch(points, i, end).is_some_and(char::is_whitespace) {
        i += 1;
    }
    i
}

/// Skips spaces and tabs plus at most one line ending.
pub fn skip_line_whitespace(points: &[NodePoint], i: usize, end: usize) -> usize {
    let mut i = skip_spaces(points, i, end);
    if let Some(after) = line_ending_at(points, i, end) {
        i = skip_spaces(points, after, end);
    }
    i
}

fn skip_spaces(points: &[NodePoint], mut i: usize, end: usize) -> usize {
    while ch(points, i, end).is_some_and(is_space_or_tab) {
        i += 1;
    }
    i
}

/// End of the line ending starting at `i`, if one does.
pub fn line_ending_at(points: &[NodePoint], i: usize, end: usize) -> Option<usize> {
    match ch(points, i, end)? {
        '\n' => Some(i + 1),
        '\r' if ch(points, i + 1, end) == Some('\n') => Some(i + 2),
        '\r' => Some(i + 1),
        _ => None,
    }
}

/// A link label starting with `[` at `i`.
///
/// Returns the span between the brackets and the index after `]`.
pub fn scan_label(points: &[NodePoint], i: usize, end: usize) -> Option<(Span, usize)> {
    if ch(points, i, end) != Some('[') {
        return None;
    }
    let start = i + 1;
    let mut j = start;
    let mut blank = true;
    loop {
        match ch(points, j, end)? {
            ']' => break,
            '[' => return None,
            '\\' if ch(points, j + 1, end).is_some_and(|c| c == '[' || c == ']' || c == '\\') => {
                blank = false;
                j += 2;
                continue;
            }
            c if !c.is_whitespace() => blank = false,
            _ => {}
        }
        j += 1;
        if j - start > MAX_LABEL {
            return None;
        }
    }
    (!blank).then_some((Span::new(start, j), j + 1))
}

/// True when `span` could serve as a link label: short enough, not blank,
/// and free of unescaped brackets.
pub fn is_label(points: &[NodePoint], span: Span) -> bool {
    if span.len() > MAX_LABEL {
        return false;
    }
    let mut blank = true;
    let mut j = span.start;
    while j < span.end {
        match points[j].ch {
            '[' | ']' => return false,
            '\\' if j + 1 < span.end => {
                blank = false;
                j += 2;
                continue;
            }
            c if !c.is_whitespace() => blank = false,
            _ => {}
        }
        j += 1;
    }
    !blank
}

/// A link destination starting at `i`.
///
/// Returns the span of the destination text (angle brackets excluded) and
/// the index after it. A bare destination is never empty.
pub fn scan_destination(points: &[NodePoint], i: usize, end: usize) -> Option<(Span, usize)> {
    if ch(points, i, end) == Some('<') {
        let mut j = i + 1;
        loop {
            match ch(points, j, end)? {
                '>' => return Some((Span::new(i + 1, j), j + 1)),
                '<' | '\n' | '\r' => return None,
                '\\' if ch(points, j + 1, end).is_some_and(|c| c.is_ascii_punctuation()) => j += 2,
                _ => j += 1,
            }
        }
    }

    let mut j = i;
    let mut depth = 0usize;
    while let Some(c) = ch(points, j, end) {
        match c {
            '\\' if ch(points, j + 1, end).is_some_and(|c| c.is_ascii_punctuation()) => {
                j += 2;
                continue;
            }
            '(' => {
                depth += 1;
                if depth > MAX_PAREN_DEPTH {
                    return None;
                }
            }
            ')' if depth == 0 => break,
            ')' => depth -= 1,
            c if c.is_ascii_control() || c == ' ' => break,
            _ => {}
        }
        j += 1;
    }
    (j > i && depth == 0).then_some((Span::new(i, j), j))
}

/// A link title starting at `i`, delimited by `"`, `'` or parentheses.
///
/// Returns the span between the delimiters and the index after the closing
/// one.
pub fn scan_title(points: &[NodePoint], i: usize, end: usize) -> Option<(Span, usize)> {
    let close = match ch(points, i, end)? {
        '"' => '"',
        '\'' => '\'',
        '(' => ')',
        _ => return None,
    };
    let mut j = i + 1;
    loop {
        match ch(points, j, end)? {
            c if c == close => return Some((Span::new(i + 1, j), j + 1)),
            '(' if close == ')' => return None,
            '\\' if ch(points, j + 1, end).is_some_and(|c| c.is_ascii_punctuation()) => j += 2,
            _ => j += 1,
        }
    }
}

/// The pieces of a link reference definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedDefinition {
    pub label: Span,
    pub destination: Span,
    pub title: Option<Span>,
    /// Index after the definition's final line ending.
    pub end: usize,
}

/// A link reference definition starting at `i` in a phrasing buffer.
///
/// The definition must end at a line boundary. When a title candidate is
/// followed by anything but whitespace, the definition ends after the
/// destination instead (if that line ends cleanly).
pub fn scan_definition(points: &[NodePoint], i: usize) -> Option<ScannedDefinition> {
    let end = points.len();
    let (label, after_label) = scan_label(points, i, end)?;
    if ch(points, after_label, end) != Some(':') {
        return None;
    }
    let dest_start = skip_line_whitespace(points, after_label + 1, end);
    let (destination, after_dest) = scan_destination(points, dest_start, end)?;
    let dest_line_end = line_end(points, skip_spaces(points, after_dest, end), end);

    let title_start = skip_line_whitespace(points, after_dest, end);
    if title_start > after_dest {
        if let Some((title, after_title)) = scan_title(points, title_start, end) {
            if let Some(line_end) = line_end(points, skip_spaces(points, after_title, end), end) {
                return Some(ScannedDefinition {
                    label,
                    destination,
                    title: Some(title),
                    end: line_end,
                });
            }
        }
    }

    dest_line_end.map(|end| ScannedDefinition {
        label,
        destination,
        title: None,
        end,
    })
}

fn line_end(points: &[NodePoint], i: usize, end: usize) -> Option<usize> {
    if i >= end {
        Some(end)
    } else {
        line_ending_at(points, i, end)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::parsing::content::{Content, slice_to_string};

    #[rstest]
    #[case("Foo  Bar", "foo bar")]
    #[case("\tẞ\n", "ss")]
    #[case("ΑΓΩ", "αγω")]
    fn labels_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_label(input), expected);
    }

    #[test]
    fn first_definition_wins() {
        let mut defs = Definitions::default();
        let target = |url: &str| LinkTarget {
            url: url.into(),
            title: None,
        };
        defs.insert_first("Foo", target("/first"));
        defs.insert_first("FOO", target("/second"));
        assert_eq!(defs.len(), 1);
        assert_eq!(defs.get("foo").map(|t| t.url.as_str()), Some("/first"));
    }

    #[rstest]
    #[case("<a b>rest", Some("a b"))]
    #[case("foo(bar)baz qux", Some("foo(bar)baz"))]
    #[case("foo(bar", None)]
    #[case("<a\nb>", None)]
    #[case(")", None)]
    fn destinations(#[case] input: &str, #[case] expected: Option<&str>) {
        let content = Content::new(input);
        let points = content.points();
        let got = scan_destination(points, 0, points.len()).map(|(s, _)| slice_to_string(points, s));
        assert_eq!(got.as_deref(), expected);
    }

    #[rstest]
    #[case(r#""a \" b""#, Some(r#"a \" b"#))]
    #[case("'single'", Some("single"))]
    #[case("(paren)", Some("paren"))]
    #[case("(no(nest)", None)]
    #[case("\"open", None)]
    fn titles(#[case] input: &str, #[case] expected: Option<&str>) {
        let content = Content::new(input);
        let points = content.points();
        let got = scan_title(points, 0, points.len()).map(|(s, _)| slice_to_string(points, s));
        assert_eq!(got.as_deref(), expected);
    }

    #[test]
    fn labels_reject_nested_brackets_and_blanks() {
        for input in ["[a[b]", "[  ]", "[unclosed"] {
            let content = Content::new(input);
            assert!(scan_label(content.points(), 0, content.len()).is_none(), "{input}");
        }
        let content = Content::new(r"[a\]b]");
        let (span, after) = scan_label(content.points(), 0, content.len()).unwrap();
        assert_eq!(slice_to_string(content.points(), span), r"a\]b");
        assert_eq!(after, 6);
    }

    #[test]
    fn definition_with_title_on_next_line() {
        let content = Content::new("[foo]: /url\n\"the title\"\nrest");
        let points = content.points();
        let def = scan_definition(points, 0).unwrap();
        assert_eq!(slice_to_string(points, def.destination), "/url");
        assert_eq!(def.title.map(|t| slice_to_string(points, t)).as_deref(), Some("the title"));
        assert_eq!(def.end, 24);
    }

    #[test]
    fn definition_falls_back_when_title_has_trailing_text() {
        let content = Content::new("[foo]: /url\n\"title\" ok");
        let points = content.points();
        let def = scan_definition(points, 0).unwrap();
        assert_eq!(def.title, None);
        assert_eq!(def.end, 12);
    }

    #[test]
    fn definition_needs_clean_line_end() {
        let content = Content::new("[foo]: /url \"title\" ok");
        assert!(scan_definition(content.points(), 0).is_none());
        let content = Content::new("[foo]:");
        assert!(scan_definition(content.points(), 0).is_none());
    }
}
