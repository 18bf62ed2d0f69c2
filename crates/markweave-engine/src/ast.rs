//! # AST
//!
//! The public, immutable tree produced by the parse phase. The vocabulary is
//! shared by block and inline nodes and follows mdast naming, so the JSON form
//! (`serde`, tagged by `type`) is what mdast consumers expect.

use serde::Serialize;

use crate::parsing::content::Position;

/// Node type names. Tokens produced during matching use the same names so the
/// registry can dispatch parse hooks by type.
pub mod node_type {
    pub const ROOT: &str = "root";
    pub const PARAGRAPH: &str = "paragraph";
    pub const HEADING: &str = "heading";
    pub const SETEXT_HEADING: &str = "setextHeading";
    pub const THEMATIC_BREAK: &str = "thematicBreak";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const LIST: &str = "list";
    pub const LIST_ITEM: &str = "listItem";
    pub const CODE: &str = "code";
    pub const INDENTED_CODE: &str = "indentedCode";
    pub const HTML: &str = "html";
    pub const DEFINITION: &str = "definition";
    pub const TABLE: &str = "table";
    pub const TABLE_ROW: &str = "tableRow";
    pub const TABLE_CELL: &str = "tableCell";
    pub const BLANK_LINE: &str = "blankLine";
    pub const TEXT: &str = "text";
    pub const EMPHASIS: &str = "emphasis";
    pub const STRONG: &str = "strong";
    pub const DELETE: &str = "delete";
    pub const INLINE_CODE: &str = "inlineCode";
    pub const BREAK: &str = "break";
    pub const LINK: &str = "link";
    pub const IMAGE: &str = "image";
    pub const LINK_REFERENCE: &str = "linkReference";
    pub const IMAGE_REFERENCE: &str = "imageReference";
    pub const AUTOLINK: &str = "autolink";
}

/// A token or node type name, e.g. `"paragraph"`.
pub type NodeType = &'static str;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceType {
    Full,
    Collapsed,
    Shortcut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    Left,
    Right,
    Center,
    None,
}

/// A node that only holds children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parent {
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// A node that holds a string value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// A node with neither children nor value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Void {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    pub depth: u8,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub ordered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    pub spread: bool,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub spread: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Code {
    pub lang: Option<String>,
    pub meta: Option<String>,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub identifier: String,
    pub label: String,
    pub url: String,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub align: Vec<Align>,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub url: String,
    pub title: Option<String>,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub url: String,
    pub title: Option<String>,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReference {
    pub identifier: String,
    pub label: String,
    pub reference_type: ReferenceType,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    pub identifier: String,
    pub label: String,
    pub reference_type: ReferenceType,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Nodes outside the built-in vocabulary, produced by extension recognizers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extension {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Root(Parent),
    Paragraph(Parent),
    Heading(Heading),
    ThematicBreak(Void),
    Blockquote(Parent),
    List(List),
    ListItem(ListItem),
    Code(Code),
    Html(Literal),
    Definition(Definition),
    Table(Table),
    TableRow(Parent),
    TableCell(Parent),
    Text(Literal),
    Emphasis(Parent),
    Strong(Parent),
    Delete(Parent),
    InlineCode(Literal),
    Break(Void),
    Link(Link),
    Image(Image),
    LinkReference(LinkReference),
    ImageReference(ImageReference),
    Extension(Extension),
}

impl Node {
    /// The mdast type name of this node.
    pub fn node_type(&self) -> &str {
        use node_type::*;
        match self {
            Node::Root(_) => ROOT,
            Node::Paragraph(_) => PARAGRAPH,
            Node::Heading(_) => HEADING,
            Node::ThematicBreak(_) => THEMATIC_BREAK,
            Node::Blockquote(_) => BLOCKQUOTE,
            Node::List(_) => LIST,
            Node::ListItem(_) => LIST_ITEM,
            Node::Code(_) => CODE,
            Node::Html(_) => HTML,
            Node::Definition(_) => DEFINITION,
            Node::Table(_) => TABLE,
            Node::TableRow(_) => TABLE_ROW,
            Node::TableCell(_) => TABLE_CELL,
            Node::Text(_) => TEXT,
            Node::Emphasis(_) => EMPHASIS,
            Node::Strong(_) => STRONG,
            Node::Delete(_) => DELETE,
            Node::InlineCode(_) => INLINE_CODE,
            Node::Break(_) => BREAK,
            Node::Link(_) => LINK,
            Node::Image(_) => IMAGE,
            Node::LinkReference(_) => LINK_REFERENCE,
            Node::ImageReference(_) => IMAGE_REFERENCE,
            Node::Extension(e) => &e.name,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root(p)
            | Node::Paragraph(p)
            | Node::Blockquote(p)
            | Node::TableRow(p)
            | Node::TableCell(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p) => &p.children,
            Node::Heading(h) => &h.children,
            Node::List(l) => &l.children,
            Node::ListItem(i) => &i.children,
            Node::Table(t) => &t.children,
            Node::Link(l) => &l.children,
            Node::LinkReference(l) => &l.children,
            Node::Extension(e) => &e.children,
            Node::ThematicBreak(_)
            | Node::Code(_)
            | Node::Html(_)
            | Node::Definition(_)
            | Node::Text(_)
            | Node::InlineCode(_)
            | Node::Break(_)
            | Node::Image(_)
            | Node::ImageReference(_) => &[],
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Node::Root(p)
            | Node::Paragraph(p)
            | Node::Blockquote(p)
            | Node::TableRow(p)
            | Node::TableCell(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p) => p.position,
            Node::Heading(h) => h.position,
            Node::ThematicBreak(v) | Node::Break(v) => v.position,
            Node::List(l) => l.position,
            Node::ListItem(i) => i.position,
            Node::Code(c) => c.position,
            Node::Html(l) | Node::Text(l) | Node::InlineCode(l) => l.position,
            Node::Definition(d) => d.position,
            Node::Table(t) => t.position,
            Node::Link(l) => l.position,
            Node::Image(i) => i.position,
            Node::LinkReference(l) => l.position,
            Node::ImageReference(i) => i.position,
            Node::Extension(e) => e.position,
        }
    }

    /// Literal value for text-like nodes.
    pub fn value(&self) -> Option<&str> {
        match self {
            Node::Text(l) | Node::InlineCode(l) | Node::Html(l) => Some(&l.value),
            Node::Code(c) => Some(&c.value),
            Node::Extension(e) => e.value.as_deref(),
            _ => None,
        }
    }

    /// Concatenated text content, as used for image `alt` attributes.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_plain_text(self, &mut out);
        out
    }
}

fn collect_plain_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(l) | Node::InlineCode(l) => out.push_str(&l.value),
        Node::Image(i) => out.push_str(&i.alt),
        Node::ImageReference(i) => out.push_str(&i.alt),
        Node::Break(_) => out.push('\n'),
        other => {
            for child in other.children() {
                collect_plain_text(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Node {
        Node::Text(Literal {
            value: value.into(),
            position: None,
        })
    }

    #[test]
    fn plain_text_flattens_inline_nodes() {
        let node = Node::Emphasis(Parent {
            children: vec![
                text("a "),
                Node::Strong(Parent {
                    children: vec![text("b")],
                    position: None,
                }),
                Node::InlineCode(Literal {
                    value: "c".into(),
                    position: None,
                }),
            ],
            position: None,
        });
        assert_eq!(node.plain_text(), "a bc");
        assert_eq!(node.node_type(), "emphasis");
        assert_eq!(node.children().len(), 3);
    }

    #[test]
    fn leaf_nodes_have_no_children() {
        assert!(text("x").children().is_empty());
        assert_eq!(text("x").value(), Some("x"));
    }
}
