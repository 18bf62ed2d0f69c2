//! Pipeline tests for the parsing module.
//!
//! Every test runs the full block and inline pipeline through [`parse`],
//! checks the tree invariants, and pins the structure with an inline `insta`
//! outline snapshot.

use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use crate::{
    ast::Node,
    parsing::{
        ParseOptions, Parser, gfm_registry_builder, parse,
        snapshot::{invariants, outline},
    },
};

fn tree(md: &str) -> Node {
    let root = parse(md, &ParseOptions::default()).expect("gfm registry builds");
    invariants(&root, md.chars().count());
    root
}

fn snap(md: &str) -> String {
    outline(&tree(md))
}

#[test]
fn heading_and_paragraph() {
    assert_snapshot!(snap("# Title\n\nSome *emphasis* and `code`.\n"), @r#"
    root
      heading depth=1
        text value="Title"
      paragraph
        text value="Some "
        emphasis
          text value="emphasis"
        text value=" and "
        inlineCode value="code"
        text value="."
    "#);
}

#[test]
fn lazy_line_continues_quoted_paragraph() {
    assert_snapshot!(snap("> a\nb\n"), @r#"
    root
      blockquote
        paragraph
          text value="a\nb"
    "#);
}

#[test]
fn tight_list() {
    assert_snapshot!(snap("- a\n- b\n"), @r#"
    root
      list ordered=false spread=false
        listItem spread=false
          paragraph
            text value="a"
        listItem spread=false
          paragraph
            text value="b"
    "#);
}

#[test]
fn blank_line_between_items_makes_the_list_loose() {
    let root = tree("- a\n\n- b\n");
    let Node::List(list) = &root.children()[0] else {
        panic!("expected a list, got {}", root.children()[0].node_type());
    };
    assert!(list.spread);
    assert_eq!(list.children.len(), 2);
}

#[test]
fn ordered_list_keeps_its_start() {
    assert_snapshot!(snap("3. a\n4. b\n"), @r#"
    root
      list ordered=true spread=false start=3
        listItem spread=false
          paragraph
            text value="a"
        listItem spread=false
          paragraph
            text value="b"
    "#);
}

#[test]
fn task_items() {
    assert_snapshot!(snap("- [ ] todo\n- [x] done\n"), @r#"
    root
      list ordered=false spread=false
        listItem checked=false spread=false
          paragraph
            text value="todo"
        listItem checked=true spread=false
          paragraph
            text value="done"
    "#);
}

#[test]
fn fenced_code_is_a_raw_zone() {
    assert_snapshot!(snap("```rust\nlet *a* = 1;\n```\n"), @r#"
    root
      code lang="rust" value="let *a* = 1;"
    "#);
}

#[test]
fn definitions_resolve_references() {
    assert_snapshot!(snap("[Foo]: /url \"title\"\n\n[foo] and [bar]\n"), @r#"
    root
      definition identifier="foo" label="Foo" title="title" url="/url"
      paragraph
        linkReference identifier="foo" label="foo" referenceType=shortcut
          text value="foo"
        text value=" and [bar]"
    "#);
}

#[test]
fn inline_link_with_nested_phrasing() {
    assert_snapshot!(snap("[*a* `b`](/u \"t\")\n"), @r#"
    root
      paragraph
        link title="t" url="/u"
          emphasis
            text value="a"
          text value=" "
          inlineCode value="b"
    "#);
}

#[test]
fn table_with_alignment() {
    assert_snapshot!(snap("| a | b |\n| - | :-: |\n| c | d |\n"), @r#"
    root
      table align=none,center
        tableRow
          tableCell
            text value="a"
          tableCell
            text value="b"
        tableRow
          tableCell
            text value="c"
          tableCell
            text value="d"
    "#);
}

#[test]
fn code_span_suppresses_inner_syntax() {
    assert_snapshot!(snap("`[not a link](/x)`\n"), @r#"
    root
      paragraph
        inlineCode value="[not a link](/x)"
    "#);
}

#[test]
fn unclosed_constructs_become_text() {
    assert_snapshot!(snap("[unclosed and `also unclosed\n"), @r#"
    root
      paragraph
        text value="[unclosed and `also unclosed"
    "#);
}

#[test]
fn empty_document() {
    assert_snapshot!(snap(""), @"root");
}

#[test]
fn blank_lines_only() {
    assert_snapshot!(snap("\n\n\n"), @"root");
}

#[test]
fn disabled_recognizer_leaves_text() {
    let registry = gfm_registry_builder()
        .disable("strikethrough")
        .build()
        .expect("registry builds");
    let root = Parser::new(registry)
        .parse("~~a~~\n", &ParseOptions::default())
        .expect("parses");
    assert_snapshot!(outline(&root), @r#"
    root
      paragraph
        text value="~~a~~"
    "#);
}

#[test]
fn positions_can_be_omitted() {
    let root = parse(
        "# a\n\n> *b*\n",
        &ParseOptions {
            reserve_position: false,
        },
    )
    .expect("parses");
    fn walk(node: &Node) {
        assert_eq!(node.position(), None, "{} has a position", node.node_type());
        node.children().iter().for_each(walk);
    }
    walk(&root);
}

#[test]
fn positions_point_into_the_source() {
    let md = "para\n\n> *em*\n";
    let root = tree(md);
    let quote = &root.children()[1];
    let em = &quote.children()[0].children()[0];
    assert_eq!(em.node_type(), "emphasis");
    let position = em.position().expect("positions are on by default");
    assert_eq!((position.start.line, position.start.column), (3, 3));
    assert_eq!((position.start.offset, position.end.offset), (8, 12));
}
