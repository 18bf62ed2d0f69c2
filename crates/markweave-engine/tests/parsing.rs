use insta::assert_snapshot;
use markweave_engine::{
    Error, Node, ParseOptions, Parser, gfm_registry_builder, parse,
    parsing::snapshot::{invariants, outline},
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn parsed(md: &str) -> Node {
    let root = parse(md, &ParseOptions::default()).expect("gfm registry builds");
    invariants(&root, md.chars().count());
    root
}

fn snap(md: &str) -> String {
    outline(&parsed(md))
}

#[test]
fn strong_nested_in_emphasis() {
    assert_snapshot!(snap("*foo**bar**baz*"), @r#"
    root
      paragraph
        emphasis
          text value="foo"
          strong
            text value="bar"
          text value="baz"
    "#);
}

#[test]
fn mod_three_rule_blocks_mixed_run_pairs() {
    assert_snapshot!(snap("**foo*bar**baz*"), @r#"
    root
      paragraph
        strong
          text value="foo*bar"
        text value="baz*"
    "#);
}

#[test]
fn triple_run_splits_into_emphasis_and_strong() {
    assert_snapshot!(snap("***strong emph***"), @r#"
    root
      paragraph
        emphasis
          strong
            text value="strong emph"
    "#);
}

#[test]
fn inner_link_wins_over_outer_bracket() {
    assert_snapshot!(snap("[foo[bar](url)"), @r#"
    root
      paragraph
        text value="[foo"
        link url="url"
          text value="bar"
    "#);
}

#[test]
fn links_do_not_nest() {
    assert_snapshot!(snap("[a [b](/x) c](/y)"), @r#"
    root
      paragraph
        text value="[a "
        link url="/x"
          text value="b"
        text value=" c](/y)"
    "#);
}

#[test]
fn emphasis_around_link() {
    assert_snapshot!(snap("*[a](/u)*"), @r#"
    root
      paragraph
        emphasis
          link url="/u"
            text value="a"
    "#);
}

#[test]
fn image_alt_is_plain_text() {
    assert_snapshot!(snap("![*a* b](/i.png)"), @r#"
    root
      paragraph
        image alt="a b" url="/i.png"
    "#);
}

#[test]
fn autolinks() {
    assert_snapshot!(snap("<https://a.b> <me@a.b>"), @r#"
    root
      paragraph
        link url="https://a.b"
          text value="https://a.b"
        text value=" "
        link url="mailto:me@a.b"
          text value="me@a.b"
    "#);
}

#[test]
fn hard_breaks() {
    assert_snapshot!(snap("a  \nb\\\nc"), @r#"
    root
      paragraph
        text value="a"
        break
        text value="b"
        break
        text value="c"
    "#);
}

#[test]
fn strikethrough_needs_equal_runs() {
    assert_snapshot!(snap("~~del~~ ~~~no~~~"), @r#"
    root
      paragraph
        delete
          text value="del"
        text value=" ~~~no~~~"
    "#);
}

#[rstest]
#[case::escapes(r"\*not em\*", "*not em*")]
#[case::entities("&amp; &copy;", "& ©")]
#[case::unmatched_closer("a* b", "a* b")]
#[case::soft_break("a \n b", "a\nb")]
fn single_text_node(#[case] md: &str, #[case] expected: &str) {
    let root = parsed(md);
    let paragraph = &root.children()[0];
    assert_eq!(paragraph.children().len(), 1, "{}", outline(&root));
    assert_eq!(paragraph.children()[0].value(), Some(expected));
}

#[test]
fn setext_heading_and_thematic_break() {
    assert_snapshot!(snap("Title\n=====\n\n***\n"), @r#"
    root
      heading depth=1
        text value="Title"
      thematicBreak
    "#);
}

#[test]
fn indented_code_and_html_block() {
    assert_snapshot!(snap("    code *x*\n\n<div>\n*raw*\n</div>\n"), @r#"
    root
      code value="code *x*"
      html value="<div>\n*raw*\n</div>"
    "#);
}

#[test]
fn nested_containers() {
    assert_snapshot!(snap("> - a\n>   > b\n"), @r#"
    root
      blockquote
        list ordered=false spread=false
          listItem spread=false
            paragraph
              text value="a"
            blockquote
              paragraph
                text value="b"
    "#);
}

#[rstest]
#[case::tight("- a\n- b", false)]
#[case::loose("- a\n\n- b", true)]
#[case::loose_inside_item("- a\n\n  b\n- c", true)]
fn list_spread(#[case] md: &str, #[case] spread: bool) {
    let root = parsed(md);
    let Node::List(list) = &root.children()[0] else {
        panic!("expected a list:\n{}", outline(&root));
    };
    assert_eq!(list.spread, spread);
}

#[test]
fn serializes_as_mdast_json() {
    let root = parse("*a*", &ParseOptions { reserve_position: false }).expect("parses");
    let json = serde_json::to_value(&root).expect("serializes");
    assert_eq!(
        json,
        serde_json::json!({
            "type": "root",
            "children": [{
                "type": "paragraph",
                "children": [{
                    "type": "emphasis",
                    "children": [{ "type": "text", "value": "a" }]
                }]
            }]
        })
    );
}

#[test]
fn strict_registry_rejects_duplicates() {
    let err = gfm_registry_builder()
        .strict(true)
        .register_inline(markweave_engine::parsing::inline::kinds::Emphasis)
        .build()
        .expect_err("emphasis is registered twice");
    assert!(matches!(err, Error::DuplicateNodeType { .. }), "{err}");
}

#[test]
fn lenient_registry_keeps_the_last_duplicate() {
    let registry = gfm_registry_builder()
        .register_inline(markweave_engine::parsing::inline::kinds::Emphasis)
        .build()
        .expect("duplicates only warn");
    let root = Parser::new(registry)
        .parse("*a*", &ParseOptions::default())
        .expect("parses");
    assert_eq!(root.children()[0].children()[0].node_type(), "emphasis");
}

#[rstest]
#[case::open_brackets("[".repeat(5_000))]
#[case::open_images("![".repeat(3_000))]
#[case::alternating_emphasis("*a **a ".repeat(2_000))]
#[case::long_backtick_runs((1..200).map(|n| "`".repeat(n)).collect::<Vec<_>>().join(" x "))]
#[case::nested_quotes(">".repeat(500) + " a")]
#[case::bracket_soup("[a](<b>)[c]: ]]] [[ ![x".repeat(500))]
fn pathological_inputs_stay_total(#[case] md: String) {
    let root = parsed(&md);
    assert_eq!(root.node_type(), "root");
}
