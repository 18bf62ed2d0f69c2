use log::{debug, trace};

use crate::parsing::{
    content::{LineRange, NodePoint, preview},
    registry::Registry,
};

use super::{
    classify::LineView,
    open::{Continuation, Interrupted, Interruption, Opened},
    recognizer::BlockHooks,
    types::{BlockToken, BlockTree, TokenId},
};

/// Feeds physical lines through the registry's block recognizers and grows
/// the block token tree.
///
/// Every line goes through three steps:
///
/// 1. the chain of open tokens is walked from the root; each container's
///    continuation hook decides whether the line still belongs to it, and an
///    open leaf below fully matched containers is offered to interrupting
///    recognizers before its own continuation hook
/// 2. openers run from the deepest matched container, descending into every
///    container they open; a container may reject a would-be child, which
///    closes it and retries one level up
/// 3. what is left goes to a pending paragraph as a lazy continuation, or
///    opens a fallback leaf
pub struct BlockMatcher<'a> {
    registry: &'a Registry,
    points: &'a [NodePoint],
    tree: BlockTree,
}

impl<'a> BlockMatcher<'a> {
    pub fn new(registry: &'a Registry, points: &'a [NodePoint]) -> Self {
        Self {
            registry,
            points,
            tree: BlockTree::new(points.len()),
        }
    }

    pub fn push(&mut self, range: LineRange) {
        let mut chain = self.open_chain();
        let mut view = LineView::new(self.points, range);

        let mut matched = 0;
        for (k, &id) in chain.iter().enumerate().skip(1) {
            if !self.tree[id].containing {
                break;
            }
            match self.continuation(id, &view) {
                Continuation::Opening { rest } => {
                    view = LineView::with_line(self.points, rest);
                    matched = k;
                }
                Continuation::Closing { .. } => {
                    self.close(id);
                    return;
                }
                Continuation::NotMatched => break,
            }
        }

        let tip = chain[chain.len() - 1];
        let leaf_below_matched = matched + 2 == chain.len() && !self.tree[tip].containing;

        if leaf_below_matched {
            let parent = chain[matched];
            if let Some((index, interrupted)) = self.interrupt(tip, &view, Interruption::Sibling) {
                self.retire(parent, tip, interrupted.drop_previous);
                chain.truncate(matched + 1);
                self.descend(chain, index, interrupted.opened);
                return;
            }
            match self.continuation(tip, &view) {
                Continuation::Opening { .. } => return,
                Continuation::Closing { .. } => {
                    self.close(tip);
                    return;
                }
                Continuation::NotMatched => self.close(tip),
            }
        } else if matched + 1 < chain.len() && self.is_lazy_candidate(tip) && !view.is_blank() {
            if let Some((index, interrupted)) = self.interrupt(tip, &view, Interruption::Lazy) {
                let Interrupted {
                    opened,
                    drop_previous,
                } = interrupted;
                if drop_previous {
                    let owner = chain[chain.len() - 2];
                    self.retire(owner, tip, true);
                }
                chain.truncate(matched + 1);
                self.close_open_child(chain[matched]);
                self.descend(chain, index, opened);
                return;
            }
            if self.lazy_continuation(tip, &view) {
                trace!("lazy line {}..{} joins {}", view.start(), view.end(), self.tree[tip].node_type);
                return;
            }
        }

        chain.truncate(matched + 1);
        self.open_blocks(chain, view);
    }

    /// Closes every open token and hands over the tree.
    pub fn finish(mut self) -> BlockTree {
        let root = self.tree.root();
        self.close_open_child(root);
        self.tree[root].opening = false;
        debug!("block match finished: {} tokens", self.tree.len());
        self.tree
    }

    /// Root followed by every open descendant.
    fn open_chain(&self) -> Vec<TokenId> {
        let mut chain = vec![self.tree.root()];
        while let Some(next) = self.tree.open_child(chain[chain.len() - 1]) {
            chain.push(next);
        }
        chain
    }

    /// Step 2 and 3: openers from the end of `chain`, then the fallback.
    fn open_blocks(&mut self, mut chain: Vec<TokenId>, mut view: LineView<'a>) {
        let mut container_opened = false;
        loop {
            if container_opened && view.is_blank() {
                return;
            }
            let parent = chain[chain.len() - 1];
            let Some((index, opened)) = self.open(&view, parent) else {
                break;
            };
            if !self.accepts(parent, &opened.token) {
                trace!(
                    "{} rejects {} as child",
                    self.tree[parent].node_type,
                    opened.token.node_type
                );
                self.close(parent);
                chain.pop();
                if chain.is_empty() {
                    return;
                }
                continue;
            }
            self.close_open_child(parent);
            let Opened {
                token,
                rest,
                saturated,
            } = opened;
            let containing = token.containing;
            let id = self.attach(parent, index, token);
            if saturated {
                self.close(id);
                return;
            }
            if !containing {
                return;
            }
            chain.push(id);
            view = LineView::with_line(self.points, rest);
            container_opened = true;
        }

        let parent = chain[chain.len() - 1];
        self.close_open_child(parent);
        if view.is_blank() {
            return;
        }
        let fallback = self.registry.block_fallback();
        if let Some(opened) = self
            .registry
            .block(fallback)
            .eat_opener(&view, &self.tree[parent])
        {
            let id = self.attach(parent, fallback, opened.token);
            if opened.saturated {
                self.close(id);
            }
        }
    }

    /// Attaches a token produced by an interruption, then keeps opening
    /// blocks inside it when it is a container.
    fn descend(&mut self, mut chain: Vec<TokenId>, index: usize, opened: Opened) {
        let parent = chain[chain.len() - 1];
        let Opened {
            token,
            rest,
            saturated,
        } = opened;
        let containing = token.containing;
        let id = self.attach(parent, index, token);
        if saturated {
            self.close(id);
        } else if containing {
            chain.push(id);
            let view = LineView::with_line(self.points, rest);
            if !view.is_blank() {
                self.open_blocks(chain, view);
            }
        }
    }

    fn open(&self, view: &LineView<'_>, parent: TokenId) -> Option<(usize, Opened)> {
        self.registry
            .block_match()
            .iter()
            .filter(|&&i| self.registry.block_hooks(i).contains(BlockHooks::OPENER))
            .find_map(|&i| {
                self.registry
                    .block(i)
                    .eat_opener(view, &self.tree[parent])
                    .map(|opened| (i, opened))
            })
    }

    fn interrupt(
        &mut self,
        leaf: TokenId,
        view: &LineView<'_>,
        how: Interruption,
    ) -> Option<(usize, Interrupted)> {
        let leaf_priority = self.priority_of(leaf);
        let leaf_type = self.tree[leaf].node_type;
        for &i in self.registry.block_match() {
            if !self.registry.block_hooks(i).contains(BlockHooks::INTERRUPT) {
                continue;
            }
            let recognizer = self.registry.block(i);
            if recognizer.priority() < leaf_priority
                || !recognizer.interruptable().contains(&leaf_type)
            {
                continue;
            }
            if let Some(interrupted) =
                recognizer.eat_and_interrupt_previous_sibling(view, &mut self.tree[leaf], how)
            {
                trace!("{} interrupts {} ({how:?})", recognizer.name(), leaf_type);
                return Some((i, interrupted));
            }
        }
        None
    }

    /// Ends an interrupted leaf: closed normally, or removed from its parent
    /// when the interrupter absorbed it.
    fn retire(&mut self, parent: TokenId, leaf: TokenId, drop: bool) {
        if drop {
            self.tree[parent].children.retain(|&c| c != leaf);
            trace!("dropped {}", self.tree[leaf].node_type);
        } else {
            self.close(leaf);
        }
    }

    fn continuation(&mut self, id: TokenId, view: &LineView<'_>) -> Continuation {
        let Some(index) = self.tree[id].recognizer else {
            return Continuation::NotMatched;
        };
        if !self
            .registry
            .block_hooks(index)
            .contains(BlockHooks::CONTINUATION)
        {
            return Continuation::NotMatched;
        }
        self.registry
            .block(index)
            .eat_continuation_text(view, &mut self.tree[id])
    }

    fn is_lazy_candidate(&self, id: TokenId) -> bool {
        let token = &self.tree[id];
        !token.containing
            && token.recognizer.is_some_and(|i| {
                self.registry
                    .block_hooks(i)
                    .contains(BlockHooks::LAZY_CONTINUATION)
            })
    }

    fn lazy_continuation(&mut self, id: TokenId, view: &LineView<'_>) -> bool {
        match self.tree[id].recognizer {
            Some(index) => self
                .registry
                .block(index)
                .eat_lazy_continuation_text(view, &mut self.tree[id]),
            None => false,
        }
    }

    fn accepts(&self, parent: TokenId, child: &BlockToken) -> bool {
        let token = &self.tree[parent];
        match token.recognizer {
            Some(index)
                if self
                    .registry
                    .block_hooks(index)
                    .contains(BlockHooks::ACCEPTS_CHILD) =>
            {
                self.registry.block(index).accepts_child(token, child)
            }
            _ => true,
        }
    }

    fn priority_of(&self, id: TokenId) -> i32 {
        self.tree[id]
            .recognizer
            .map_or(i32::MIN, |i| self.registry.block(i).priority())
    }

    fn attach(&mut self, parent: TokenId, index: usize, mut token: BlockToken) -> TokenId {
        token.recognizer = Some(index);
        token.opening = true;
        trace!(
            "open {} at {} under {}",
            token.node_type,
            token.span.start,
            self.tree[parent].node_type
        );
        let id = self.tree.alloc(token);
        self.tree[parent].children.push(id);
        id
    }

    fn close_open_child(&mut self, id: TokenId) {
        if let Some(child) = self.tree.open_child(id) {
            self.close(child);
        }
    }

    /// Closes `id` after its open descendants, running its finalize hook.
    fn close(&mut self, id: TokenId) {
        self.close_open_child(id);

        let last_content_end = self.tree[id]
            .children
            .iter()
            .rev()
            .find(|&&c| !self.tree[c].is(crate::ast::node_type::BLANK_LINE))
            .map(|&c| self.tree[c].span.end);

        let token = &mut self.tree[id];
        token.opening = false;
        if token.containing {
            if let Some(end) = last_content_end {
                token.span.end = token.span.end.max(end);
            }
        }
        if let Some(index) = token.recognizer {
            if self.registry.block_hooks(index).contains(BlockHooks::FINALIZE) {
                self.registry.block(index).finalize(token);
            }
        }
        trace!(
            "close {} {}..{} {:?}",
            token.node_type,
            token.span.start,
            token.span.end,
            preview(self.points, token.span, 40)
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::{NodeType, node_type};
    use crate::parsing::{
        blocks::recognizer::BlockRecognizer,
        content::{Content, Span},
        gfm_registry, gfm_registry_builder,
    };

    fn outline(tree: &BlockTree, id: TokenId, depth: usize, out: &mut Vec<String>) {
        for &child in tree.children(id) {
            out.push(format!("{}{}", "  ".repeat(depth), tree[child].node_type));
            outline(tree, child, depth + 1, out);
        }
    }

    fn matched(text: &str) -> Vec<String> {
        matched_with(&gfm_registry().unwrap(), text)
    }

    fn matched_with(registry: &Registry, text: &str) -> Vec<String> {
        let content = Content::new(text);
        let mut matcher = BlockMatcher::new(registry, content.points());
        for &line in content.lines() {
            matcher.push(line);
        }
        let tree = matcher.finish();
        let mut out = Vec::new();
        outline(&tree, tree.root(), 0, &mut out);
        out
    }

    #[test]
    fn paragraph_lines_accumulate_until_blank() {
        assert_eq!(
            matched("a\nb\n\nc"),
            vec!["paragraph", "blankLine", "paragraph"]
        );
    }

    #[test]
    fn lazy_line_continues_quoted_paragraph() {
        assert_eq!(matched("> a\nb"), vec!["blockquote", "  paragraph"]);
    }

    #[test]
    fn thematic_break_interrupts_lazy_paragraph() {
        assert_eq!(
            matched("> a\n***"),
            vec!["blockquote", "  paragraph", "thematicBreak"]
        );
    }

    #[test]
    fn setext_underline_replaces_paragraph() {
        assert_eq!(matched("Title\n====="), vec![node_type::SETEXT_HEADING]);
    }

    #[test]
    fn empty_item_rejects_blank_first_child() {
        assert_eq!(
            matched("-\n\n  foo"),
            vec!["listItem", "blankLine", "paragraph"]
        );
    }

    #[test]
    fn nested_containers_open_on_one_line() {
        assert_eq!(
            matched("> - a\n>   b"),
            vec!["blockquote", "  listItem", "    paragraph"]
        );
    }

    #[test]
    fn indented_code_cannot_interrupt_paragraph() {
        assert_eq!(matched("a\n    b"), vec!["paragraph"]);
    }

    #[test]
    fn higher_priority_opener_wins() {
        assert_eq!(matched("- - -"), vec!["thematicBreak"]);
        assert_eq!(
            matched("* * *\n- a"),
            vec!["thematicBreak", "listItem", "  paragraph"]
        );
    }

    /// Ends an indented code block on a line starting with `!`.
    struct Bang {
        priority: i32,
    }

    impl BlockRecognizer for Bang {
        fn name(&self) -> &'static str {
            "bang"
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn node_types(&self) -> &'static [NodeType] {
            &["bang"]
        }

        fn hooks(&self) -> BlockHooks {
            BlockHooks::INTERRUPT
        }

        fn interruptable(&self) -> &[NodeType] {
            &[node_type::INDENTED_CODE]
        }

        fn eat_and_interrupt_previous_sibling(
            &self,
            line: &LineView<'_>,
            _prev: &mut BlockToken,
            _how: Interruption,
        ) -> Option<Interrupted> {
            (line.first_char() == Some('!')).then(|| {
                Interrupted::new(Opened::saturated(
                    BlockToken::leaf("bang", Span::new(line.first_non_ws(), line.end())),
                    line.exhausted(),
                ))
            })
        }
    }

    fn with_bang(priority: i32) -> Registry {
        gfm_registry_builder()
            .register_block(Bang { priority })
            .build()
            .unwrap()
    }

    #[test]
    fn lower_priority_cannot_interrupt() {
        assert_eq!(
            matched_with(&with_bang(10), "    a\n    !b"),
            vec![node_type::INDENTED_CODE]
        );
    }

    #[test]
    fn equal_priority_may_interrupt() {
        assert_eq!(
            matched_with(&with_bang(20), "    a\n    !b"),
            vec![node_type::INDENTED_CODE, "bang"]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        assert_eq!(matched("```\na\n\nb"), vec!["code"]);
    }

    #[test]
    fn container_span_ends_at_last_content() {
        let registry = gfm_registry().unwrap();
        let content = Content::new("> a\n>\n\nb");
        let mut matcher = BlockMatcher::new(&registry, content.points());
        for &line in content.lines() {
            matcher.push(line);
        }
        let tree = matcher.finish();
        let quote = tree.children(tree.root())[0];
        assert_eq!(tree[quote].span.start, 0);
        assert_eq!(tree[quote].span.end, 3);
        assert!(tree[quote].is_closed());
    }
}
