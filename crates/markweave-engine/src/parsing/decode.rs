//! Backslash escapes and character references.
//!
//! Spans stay raw through both matching engines; these helpers only run
//! when a parse hook builds the final string value of a node.

use std::sync::OnceLock;

use regex::Regex;

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^&(?:#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z][A-Za-z0-9]{1,31});")
            .expect("entity pattern is valid")
    })
}

/// Decodes one complete character reference such as `&amp;`, `&#35;` or
/// `&#x22;`. Unknown names yield `None`; numeric references outside the
/// Unicode scalar range (or zero) decode to U+FFFD.
pub fn decode_entity(reference: &str) -> Option<String> {
    let body = reference.strip_prefix('&')?.strip_suffix(';')?;
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        let ch = match code {
            0 => '\u{FFFD}',
            _ => char::from_u32(code).unwrap_or('\u{FFFD}'),
        };
        return Some(ch.to_string());
    }
    let decoded = html_escape::decode_html_entities(reference);
    (decoded != reference).then(|| decoded.into_owned())
}

/// Replaces backslash escapes of ASCII punctuation and valid character
/// references in `text`.
pub fn decode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(i) = rest.find(['\\', '&']) {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];
        if let Some(after) = tail.strip_prefix('\\') {
            match after.chars().next() {
                Some(c) if c.is_ascii_punctuation() => {
                    out.push(c);
                    rest = &after[c.len_utf8()..];
                }
                _ => {
                    out.push('\\');
                    rest = after;
                }
            }
            continue;
        }
        match entity_re()
            .find(tail)
            .and_then(|m| decode_entity(m.as_str()).map(|d| (m.end(), d)))
        {
            Some((end, decoded)) => {
                out.push_str(&decoded);
                rest = &tail[end..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(r"\*not emphasis\*", "*not emphasis*")]
    #[case(r"\a stays", r"\a stays")]
    #[case(r"trailing \", r"trailing \")]
    #[case("&amp; &copy; &#35; &#X22;", "& © # \"")]
    #[case("&#0; &#1234567;", "\u{FFFD} \u{FFFD}")]
    #[case("&nosuchentity; & &;", "&nosuchentity; & &;")]
    #[case(r"\&amp;", "&amp;")]
    fn decodes_escapes_and_references(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(decode(input), expected);
    }

    #[test]
    fn single_reference() {
        assert_eq!(decode_entity("&ouml;").as_deref(), Some("ö"));
        assert_eq!(decode_entity("&ouml").as_deref(), None);
    }
}
