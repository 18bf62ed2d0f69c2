use crate::{
    ast::{Literal, Node, NodeType, node_type},
    parsing::{
        decode::decode,
        inline::{
            recognizer::{InlineContext, InlineHooks, InlineRecognizer},
            types::{Delimiter, InlineToken},
        },
    },
};

/// The inline fallback: every span no other recognizer claims.
pub struct Text;

impl InlineRecognizer for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    fn priority(&self) -> i32 {
        -1
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::TEXT]
    }

    fn hooks(&self) -> InlineHooks {
        InlineHooks::SINGLE | InlineHooks::PARSE
    }

    fn resolve_single(&self, delimiter: &Delimiter, _ctx: &InlineContext<'_>) -> Vec<InlineToken> {
        vec![InlineToken::new(node_type::TEXT, delimiter.span)]
    }

    fn parse(&self, token: &InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Vec<Node> {
        vec![Node::Text(Literal {
            value: decode(&soft_breaks(&ctx.text(token.span))),
            position: ctx.position(token.span),
        })]
    }
}

/// Drops spaces and tabs around line endings.
fn soft_breaks(raw: &str) -> String {
    if !raw.contains(['\n', '\r']) {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut lines = raw.split_inclusive('\n').peekable();
    let mut first = true;
    while let Some(line) = lines.next() {
        let line = if first { line } else { line.trim_start_matches([' ', '\t']) };
        first = false;
        let (body, ending) = match line.strip_suffix('\n') {
            Some(body) => match body.strip_suffix('\r') {
                Some(body) => (body, "\r\n"),
                None => (body, "\n"),
            },
            None => (line, ""),
        };
        if ending.is_empty() && lines.peek().is_none() {
            out.push_str(body);
        } else {
            out.push_str(body.trim_end_matches([' ', '\t']));
            out.push_str(ending);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("plain", "plain")]
    #[case("a \n  b", "a\nb")]
    #[case("a\t\r\n\tb ", "a\r\nb ")]
    #[case(" lead", " lead")]
    fn trims_around_line_endings(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(soft_breaks(raw), expected);
    }
}
