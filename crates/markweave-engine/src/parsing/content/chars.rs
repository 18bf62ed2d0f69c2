//! Character classes shared by block and inline recognizers.

use super::NodePoint;

/// Tab stop width used for indentation arithmetic.
pub const TAB_STOP: usize = 4;

pub fn is_space_or_tab(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

pub fn is_line_ending(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

/// Unicode whitespace as used by the flanking rules.
pub fn is_whitespace(ch: char) -> bool {
    ch.is_whitespace()
}

/// ASCII punctuation, plus any non-ASCII code point that is neither
/// alphanumeric, whitespace nor a control character.
pub fn is_punctuation(ch: char) -> bool {
    if ch.is_ascii() {
        ch.is_ascii_punctuation()
    } else {
        !ch.is_alphanumeric() && !ch.is_whitespace() && !ch.is_control()
    }
}

/// True when the character at `index` is preceded by an odd number of
/// backslashes, looking no further back than `floor`.
pub fn is_escaped(points: &[NodePoint], index: usize, floor: usize) -> bool {
    let mut count = 0;
    let mut i = index;
    while i > floor && points[i - 1].ch == '\\' {
        count += 1;
        i -= 1;
    }
    count % 2 == 1
}

/// Columns advanced by `ch` when it starts at virtual column `column`.
pub fn advance_column(ch: char, column: usize) -> usize {
    if ch == '\t' {
        column + TAB_STOP - column % TAB_STOP
    } else {
        column + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::content::Content;

    #[test]
    fn punctuation_covers_ascii_and_symbols() {
        assert!(is_punctuation('*'));
        assert!(is_punctuation('€'));
        assert!(is_punctuation('。'));
        assert!(!is_punctuation('a'));
        assert!(!is_punctuation('中'));
        assert!(!is_punctuation(' '));
    }

    #[test]
    fn escaped_needs_odd_backslashes() {
        let content = Content::new(r"\*\\*");
        let points = content.points();
        assert!(is_escaped(points, 1, 0));
        assert!(!is_escaped(points, 4, 0));
        assert!(!is_escaped(points, 1, 1));
    }

    #[test]
    fn tab_advances_to_next_stop() {
        assert_eq!(advance_column('\t', 0), 4);
        assert_eq!(advance_column('\t', 2), 4);
        assert_eq!(advance_column('\t', 4), 8);
        assert_eq!(advance_column(' ', 3), 4);
    }
}
