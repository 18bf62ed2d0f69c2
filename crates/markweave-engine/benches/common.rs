// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* **content** and a [link](/url \"title\").\n\n- Bullet point\n  - Nested item with `code`\n- Another item\n\n> Quoted text\nwith a lazy line.\n\n| a | b |\n| - | - |\n| c | d |\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

/// Inputs that exercise the worst cases of the delimiter engine.
#[allow(dead_code)]
pub fn pathological_inputs(n: usize) -> Vec<(&'static str, String)> {
    vec![
        ("open_brackets", "[".repeat(n)),
        ("nested_links", "[a](".repeat(n)),
        ("alternating_emphasis", "*a **a ".repeat(n)),
        ("unclosed_images", "![a".repeat(n)),
        (
            "backtick_runs",
            (1..=n.min(500))
                .map(|k| "`".repeat(k))
                .collect::<Vec<_>>()
                .join(" x "),
        ),
        ("nested_quotes", ">".repeat(n.min(1_000)) + " a"),
    ]
}
