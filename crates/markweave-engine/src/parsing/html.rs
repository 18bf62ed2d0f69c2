//! HTML syntax shared by the block and inline HTML recognizers.

use std::sync::OnceLock;

use regex::Regex;

pub const TAG_NAME: &str = r"[A-Za-z][A-Za-z0-9-]*";

pub const ATTRIBUTE: &str = concat!(
    r"(?:\s+[A-Za-z_:][A-Za-z0-9_.:-]*",
    r#"(?:\s*=\s*(?:[^\s"'=<>`]+|'[^']*'|"[^"]*"))?)"#
);

/// Tag names that open an HTML block of kind 6.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

/// Tag names whose content is raw text (HTML block kind 1).
pub const RAW_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

/// A complete open tag, capturing the tag name.
pub fn open_tag() -> String {
    format!(r"<({TAG_NAME}){ATTRIBUTE}*\s*/?>")
}

/// A complete closing tag, capturing the tag name.
pub fn closing_tag() -> String {
    format!(r"</({TAG_NAME})\s*>")
}

/// Inline raw HTML anchored at the start of the haystack.
pub fn inline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"^(?s:{open}|{close}|<!-->|<!--->|<!--.*?-->|<\?.*?\?>|<![A-Za-z][^>]*>|<!\[CDATA\[.*?\]\]>)",
            open = open_tag(),
            close = closing_tag(),
        );
        Regex::new(&pattern).expect("inline html pattern is valid")
    })
}
