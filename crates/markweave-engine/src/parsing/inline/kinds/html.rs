use crate::{
    ast::{Literal, Node, NodeType, node_type},
    parsing::{
        html::inline_re,
        inline::{
            recognizer::{DelimiterScanner, InlineContext, InlineHooks, InlineRecognizer},
            types::{Delimiter, InlineToken},
        },
    },
};

use super::autolink::AngleScanner;

/// Raw inline HTML: open and closing tags, comments, processing
/// instructions, declarations and CDATA sections. Kept verbatim.
pub struct InlineHtml;

fn match_html(rest: &str) -> Option<usize> {
    inline_re().find(rest).map(|m| m.end())
}

impl InlineRecognizer for InlineHtml {
    fn name(&self) -> &'static str {
        "inlineHtml"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::HTML]
    }

    fn hooks(&self) -> InlineHooks {
        InlineHooks::SCAN | InlineHooks::SINGLE | InlineHooks::PARSE
    }

    fn scanner(&self) -> Box<dyn DelimiterScanner> {
        Box::new(AngleScanner::new(match_html))
    }

    fn resolve_single(&self, delimiter: &Delimiter, _ctx: &InlineContext<'_>) -> Vec<InlineToken> {
        vec![InlineToken::new(node_type::HTML, delimiter.span)]
    }

    fn parse(&self, token: &InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Vec<Node> {
        vec![Node::Html(Literal {
            value: ctx.text(token.span),
            position: ctx.position(token.span),
        })]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn matches_up_to_the_end_of_the_tag() {
        assert_eq!(match_html("<b class=\"x\">bold</b>"), Some(13));
        assert_eq!(match_html("<!-- a\nb --> c"), Some(12));
        assert_eq!(match_html("<b"), None);
    }
}
