use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::ast::{Align, Node, ReferenceType};

/// A node reduced to its type, its attributes rendered as strings, and its
/// offset range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snap {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<&'static str, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<(usize, usize)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Snap>,
}

pub fn normalize(node: &Node) -> Snap {
    Snap {
        node_type: node.node_type().to_string(),
        attrs: attrs(node),
        span: node
            .position()
            .map(|p| (p.start.offset, p.end.offset)),
        children: node.children().iter().map(normalize).collect(),
    }
}

/// One line per node, children indented by two spaces:
///
/// ```text
/// root
///   heading depth=1
///     text value="Title"
/// ```
pub fn outline(node: &Node) -> String {
    let mut out = String::new();
    write_outline(&normalize(node), 0, &mut out);
    out
}

fn write_outline(snap: &Snap, depth: usize, out: &mut String) {
    let _ = write!(out, "{:indent$}{}", "", snap.node_type, indent = depth * 2);
    for (key, value) in &snap.attrs {
        let _ = write!(out, " {key}={value}");
    }
    out.push('\n');
    for child in &snap.children {
        write_outline(child, depth + 1, out);
    }
}

fn attrs(node: &Node) -> BTreeMap<&'static str, String> {
    let mut map = BTreeMap::new();
    match node {
        Node::Heading(h) => {
            map.insert("depth", h.depth.to_string());
        }
        Node::List(l) => {
            map.insert("ordered", l.ordered.to_string());
            map.insert("spread", l.spread.to_string());
            if let Some(start) = l.start {
                map.insert("start", start.to_string());
            }
        }
        Node::ListItem(i) => {
            map.insert("spread", i.spread.to_string());
            if let Some(checked) = i.checked {
                map.insert("checked", checked.to_string());
            }
        }
        Node::Code(c) => {
            map.insert("value", quoted(&c.value));
            if let Some(lang) = &c.lang {
                map.insert("lang", quoted(lang));
            }
            if let Some(meta) = &c.meta {
                map.insert("meta", quoted(meta));
            }
        }
        Node::Html(l) | Node::Text(l) | Node::InlineCode(l) => {
            map.insert("value", quoted(&l.value));
        }
        Node::Definition(d) => {
            map.insert("identifier", quoted(&d.identifier));
            map.insert("label", quoted(&d.label));
            map.insert("url", quoted(&d.url));
            if let Some(title) = &d.title {
                map.insert("title", quoted(title));
            }
        }
        Node::Table(t) => {
            let align: Vec<&str> = t.align.iter().map(align_name).collect();
            map.insert("align", align.join(","));
        }
        Node::Link(l) => {
            map.insert("url", quoted(&l.url));
            if let Some(title) = &l.title {
                map.insert("title", quoted(title));
            }
        }
        Node::Image(i) => {
            map.insert("url", quoted(&i.url));
            map.insert("alt", quoted(&i.alt));
            if let Some(title) = &i.title {
                map.insert("title", quoted(title));
            }
        }
        Node::LinkReference(r) => {
            map.insert("identifier", quoted(&r.identifier));
            map.insert("label", quoted(&r.label));
            map.insert("referenceType", reference_name(r.reference_type).into());
        }
        Node::ImageReference(r) => {
            map.insert("identifier", quoted(&r.identifier));
            map.insert("label", quoted(&r.label));
            map.insert("alt", quoted(&r.alt));
            map.insert("referenceType", reference_name(r.reference_type).into());
        }
        Node::Extension(e) => {
            if let Some(value) = &e.value {
                map.insert("value", quoted(value));
            }
        }
        Node::Root(_)
        | Node::Paragraph(_)
        | Node::ThematicBreak(_)
        | Node::Blockquote(_)
        | Node::TableRow(_)
        | Node::TableCell(_)
        | Node::Emphasis(_)
        | Node::Strong(_)
        | Node::Delete(_)
        | Node::Break(_) => {}
    }
    map
}

fn quoted(value: &str) -> String {
    format!("{value:?}")
}

fn align_name(align: &Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Right => "right",
        Align::Center => "center",
        Align::None => "none",
    }
}

fn reference_name(kind: ReferenceType) -> &'static str {
    match kind {
        ReferenceType::Full => "full",
        ReferenceType::Collapsed => "collapsed",
        ReferenceType::Shortcut => "shortcut",
    }
}
