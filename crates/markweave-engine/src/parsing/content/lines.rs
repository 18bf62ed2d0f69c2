use xi_rope::Rope;

/// A single physical line of the rope.
#[derive(Debug, Clone)]
pub struct LineRef {
    /// 1-based line number.
    pub number: usize,
    /// The line text, line ending included when present.
    pub text: String,
}

impl LineRef {
    /// Splits the text into its body and line ending (`"\n"`, `"\r\n"` or `""`).
    pub fn split_ending(&self) -> (&str, &str) {
        let text = self.text.as_str();
        if let Some(body) = text.strip_suffix("\r\n") {
            (body, &text[body.len()..])
        } else if let Some(body) = text.strip_suffix('\n') {
            (body, &text[body.len()..])
        } else {
            (text, "")
        }
    }
}

/// Returns an iterator over the rope's lines, numbered from 1.
///
/// Uses `lines_raw` to preserve newline characters so that every code point
/// of the input ends up in exactly one line.
pub fn lines_with_numbers(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    rope.lines_raw(..).enumerate().map(|(i, line)| LineRef {
        number: i + 1,
        text: line.into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_line_endings() {
        let rope = Rope::from("a\r\nb\nc");
        let lines: Vec<_> = lines_with_numbers(&rope).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split_ending(), ("a", "\r\n"));
        assert_eq!(lines[1].split_ending(), ("b", "\n"));
        assert_eq!(lines[2].split_ending(), ("c", ""));
        assert_eq!(lines[2].number, 3);
    }
}
