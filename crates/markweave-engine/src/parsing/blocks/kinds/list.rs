//! List items and lists.
//!
//! Only list items are matched line by line. Lists themselves are created in
//! the post-match pass, which groups runs of items with the same marker,
//! computes loose/tight from the blank lines the matcher recorded and
//! detects task items.

use log::trace;

use crate::{
    ast::{self, Node, NodeType, node_type},
    error::Result,
    parsing::{
        blocks::{
            classify::LineView,
            content::ContentLine,
            open::{Continuation, Interrupted, Interruption, Opened},
            parse::ParseContext,
            recognizer::{BlockHooks, BlockRecognizer},
            types::{BlockToken, BlockTree, TokenId},
        },
        content::{NodePoint, Span, chars::is_space_or_tab},
        payload::Payload,
    },
};

pub struct List {
    pub interruptable: Vec<NodeType>,
}

impl Default for List {
    fn default() -> Self {
        Self {
            interruptable: vec![node_type::PARAGRAPH],
        }
    }
}

/// Payload of a list item token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemData {
    /// Bullet character, or the delimiter (`.`/`)`) of an ordered marker.
    /// Items with the same marker belong to the same list.
    pub marker: char,
    pub ordered: bool,
    pub number: u32,
    /// Columns from the start of the item's line remainder to its content.
    pub content_offset: usize,
    pub spread: bool,
    pub checked: Option<bool>,
}

/// Payload of a list token built in post-match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListData {
    pub ordered: bool,
    pub start: u32,
    pub spread: bool,
}

/// A recognized list item marker and what follows it.
#[derive(Debug, Clone, Copy)]
pub struct ItemStart {
    pub data: ItemData,
    /// The line has nothing after the marker.
    pub empty: bool,
    /// What is left of the line for the item's first child.
    pub rest: ContentLine,
}

impl List {
    pub const BULLETS: [char; 3] = ['-', '+', '*'];
    pub const ORDERED_DELIMITERS: [char; 2] = ['.', ')'];
    pub const MAX_DIGITS: usize = 9;
    /// Spaces after the marker beyond which the content counts as indented
    /// code inside the item.
    pub const MAX_GAP: usize = 4;

    pub fn scan(line: &LineView<'_>) -> Option<ItemStart> {
        if line.indent() >= 4 {
            return None;
        }
        let start = line.first_non_ws();
        let first = line.first_char()?;
        let (marker, ordered, number, marker_end) = if Self::BULLETS.contains(&first) {
            (first, false, 0, start + 1)
        } else if first.is_ascii_digit() {
            let mut end = start;
            while line.ch(end).is_some_and(|c| c.is_ascii_digit()) {
                end += 1;
            }
            if end - start > Self::MAX_DIGITS {
                return None;
            }
            let delimiter = line
                .ch(end)
                .filter(|c| Self::ORDERED_DELIMITERS.contains(c))?;
            let number = (start..end)
                .filter_map(|i| line.ch(i).and_then(|c| c.to_digit(10)))
                .fold(0u32, |acc, d| acc * 10 + d);
            (delimiter, true, number, end + 1)
        } else {
            return None;
        };
        if line.ch(marker_end).is_some_and(|c| !is_space_or_tab(c)) {
            return None;
        }

        let base = line.line().column;
        let marker_col = line.column_at(marker_end);
        let content = line.skip_spaces(marker_end);
        let empty = content >= line.end();
        let (content_offset, rest) = if empty {
            (marker_col - base + 1, line.exhausted())
        } else if line.column_at(content) - marker_col > Self::MAX_GAP {
            let after = LineView::with_line(line.points(), line.advance_to(marker_end));
            (marker_col - base + 1, after.skip_columns(1))
        } else {
            (line.column_at(content) - base, line.advance_to(content))
        };
        Some(ItemStart {
            data: ItemData {
                marker,
                ordered,
                number,
                content_offset,
                spread: false,
                checked: None,
            },
            empty,
            rest,
        })
    }

    fn open(line: &LineView<'_>, item: ItemStart) -> Opened {
        let token = BlockToken::container(
            node_type::LIST_ITEM,
            Span::new(line.first_non_ws(), line.end()),
        )
        .with_payload(Payload::new(item.data));
        Opened::new(token, item.rest)
    }
}

fn item_data(tree: &BlockTree, id: TokenId) -> Option<ItemData> {
    tree[id].payload.get::<ItemData>().copied()
}

fn is_blank(tree: &BlockTree, id: TokenId) -> bool {
    tree[id].is(node_type::BLANK_LINE)
}

/// True when the token's last descendant along the last-child path of lists
/// and list items is a blank line.
fn ends_with_blank(tree: &BlockTree, id: TokenId) -> bool {
    let mut cur = id;
    loop {
        if is_blank(tree, cur) {
            return true;
        }
        if !(tree[cur].is(node_type::LIST) || tree[cur].is(node_type::LIST_ITEM)) {
            return false;
        }
        match tree[cur].children.last() {
            Some(&last) => cur = last,
            None => return false,
        }
    }
}

/// True when a blank line separates two of the item's direct children.
fn has_inner_gap(tree: &BlockTree, item: TokenId) -> bool {
    let children = &tree[item].children;
    let Some(last) = children.iter().rposition(|&c| !is_blank(tree, c)) else {
        return false;
    };
    children[..last].iter().any(|&c| ends_with_blank(tree, c))
}

/// Strips a `[ ]`/`[x]` checkbox from the start of the item's first
/// paragraph.
fn detect_task(tree: &mut BlockTree, item: TokenId, points: &[NodePoint]) -> Option<bool> {
    let &first = tree[item].children.first()?;
    if !tree[first].is(node_type::PARAGRAPH) {
        return None;
    }
    let view = LineView::with_line(points, *tree[first].lines.first()?);
    let i = view.first_non_ws();
    if view.ch(i) != Some('[') || view.ch(i + 2) != Some(']') {
        return None;
    }
    let checked = match view.ch(i + 1)? {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    if !view.ch(i + 3).is_some_and(is_space_or_tab) || view.rest_is_blank(i + 3) {
        return None;
    }
    let rest = view.advance_to(i + 3);
    let paragraph = &mut tree[first];
    paragraph.lines[0] = rest;
    paragraph.span.start = rest.first_non_ws;
    Some(checked)
}

/// Wraps `members` (items and the blank lines between them) in a list token.
fn build_list(tree: &mut BlockTree, members: Vec<TokenId>, points: &[NodePoint]) -> TokenId {
    let items: Vec<TokenId> = members
        .iter()
        .copied()
        .filter(|&id| tree[id].is(node_type::LIST_ITEM))
        .collect();

    let mut list_spread = false;
    for (n, &item) in items.iter().enumerate() {
        let is_last = n + 1 == items.len();
        let separated = !is_last && {
            let next = items[n + 1];
            ends_with_blank(tree, item)
                || members
                    .iter()
                    .skip_while(|&&id| id != item)
                    .take_while(|&&id| id != next)
                    .any(|&id| is_blank(tree, id))
        };
        let spread = separated || has_inner_gap(tree, item);
        let checked = detect_task(tree, item, points);
        if let Some(data) = tree[item].payload.get_mut::<ItemData>() {
            data.spread = spread;
            data.checked = checked;
        }
        list_spread |= spread;
    }

    let (first, last) = (items[0], items[items.len() - 1]);
    let head = item_data(tree, first);
    let data = ListData {
        ordered: head.is_some_and(|d| d.ordered),
        start: head.map_or(1, |d| d.number),
        spread: list_spread,
    };
    let mut list = BlockToken::container(
        node_type::LIST,
        Span::new(tree[first].span.start, tree[last].span.end),
    )
    .with_payload(Payload::new(data));
    list.opening = false;
    list.children = members;
    trace!(
        "list of {} items, {}",
        items.len(),
        if list_spread { "loose" } else { "tight" }
    );
    tree.alloc(list)
}

impl BlockRecognizer for List {
    fn name(&self) -> &'static str {
        "list"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::LIST, node_type::LIST_ITEM]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::OPENER
            | BlockHooks::INTERRUPT
            | BlockHooks::CONTINUATION
            | BlockHooks::ACCEPTS_CHILD
            | BlockHooks::TRANSFORM_SIBLINGS
            | BlockHooks::PARSE
    }

    fn is_containing(&self) -> bool {
        true
    }

    fn interruptable(&self) -> &[NodeType] {
        &self.interruptable
    }

    fn eat_opener(&self, line: &LineView<'_>, _parent: &BlockToken) -> Option<Opened> {
        Self::scan(line).map(|item| Self::open(line, item))
    }

    fn eat_and_interrupt_previous_sibling(
        &self,
        line: &LineView<'_>,
        _prev: &mut BlockToken,
        how: Interruption,
    ) -> Option<Interrupted> {
        let item = Self::scan(line)?;
        if how == Interruption::Sibling
            && (item.empty || (item.data.ordered && item.data.number != 1))
        {
            return None;
        }
        Some(Interrupted::new(Self::open(line, item)))
    }

    fn eat_continuation_text(&self, line: &LineView<'_>, token: &mut BlockToken) -> Continuation {
        let Some(data) = token.payload.get::<ItemData>() else {
            return Continuation::NotMatched;
        };
        if line.is_blank() || line.indent() >= data.content_offset {
            Continuation::Opening {
                rest: line.skip_columns(data.content_offset),
            }
        } else {
            Continuation::NotMatched
        }
    }

    /// An item may start with at most one blank line.
    fn accepts_child(&self, token: &BlockToken, child: &BlockToken) -> bool {
        !(token.children.is_empty() && child.is(node_type::BLANK_LINE))
    }

    fn transform_siblings(
        &self,
        siblings: Vec<TokenId>,
        tree: &mut BlockTree,
        points: &[NodePoint],
    ) -> Vec<TokenId> {
        let mut out = Vec::with_capacity(siblings.len());
        let mut i = 0;
        while i < siblings.len() {
            let id = siblings[i];
            let Some(key) = item_data(tree, id).map(|d| d.marker) else {
                out.push(id);
                i += 1;
                continue;
            };

            let mut end = i + 1;
            loop {
                let mut k = end;
                while k < siblings.len() && is_blank(tree, siblings[k]) {
                    k += 1;
                }
                let same_list = k < siblings.len()
                    && tree[siblings[k]].is(node_type::LIST_ITEM)
                    && item_data(tree, siblings[k]).is_some_and(|d| d.marker == key);
                if !same_list {
                    break;
                }
                end = k + 1;
            }

            out.push(build_list(tree, siblings[i..end].to_vec(), points));
            i = end;
        }
        out
    }

    fn parse(
        &self,
        token: &BlockToken,
        children: Vec<Node>,
        ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        let position = ctx.position(token.span);
        if token.is(node_type::LIST) {
            let data = token.payload.get::<ListData>().copied().unwrap_or(ListData {
                ordered: false,
                start: 1,
                spread: false,
            });
            return Ok(vec![Node::List(ast::List {
                ordered: data.ordered,
                start: data.ordered.then_some(data.start),
                spread: data.spread,
                children,
                position,
            })]);
        }
        let data = token.payload.get::<ItemData>();
        Ok(vec![Node::ListItem(ast::ListItem {
            spread: data.is_some_and(|d| d.spread),
            checked: data.and_then(|d| d.checked),
            children,
            position,
        })])
    }
}
