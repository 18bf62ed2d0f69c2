use crate::ast::Node;

/// Asserts the structural invariants of a parsed tree over a document of
/// `len` code points:
///
/// - every position lies within `0..=len` and starts before it ends
/// - a child's position is contained in its parent's
/// - siblings appear in document order and do not overlap
///
/// Nodes without a position are skipped.
pub fn check(root: &Node, len: usize) {
    visit(root, len);
}

fn visit(node: &Node, len: usize) {
    let range = node
        .position()
        .map(|p| (p.start.offset, p.end.offset));
    if let Some((start, end)) = range {
        assert!(
            start <= end && end <= len,
            "{} position out of bounds: {start}..{end} (document len: {len})",
            node.node_type()
        );
    }

    let mut previous: Option<(&Node, usize)> = None;
    for child in node.children() {
        let Some(position) = child.position() else {
            visit(child, len);
            continue;
        };
        let (start, end) = (position.start.offset, position.end.offset);
        if let Some((parent_start, parent_end)) = range {
            assert!(
                parent_start <= start && end <= parent_end,
                "{} {start}..{end} escapes parent {} {parent_start}..{parent_end}",
                child.node_type(),
                node.node_type()
            );
        }
        if let Some((prev, prev_end)) = previous {
            assert!(
                prev_end <= start,
                "{} at {start} overlaps preceding {} ending at {prev_end}",
                child.node_type(),
                prev.node_type()
            );
        }
        previous = Some((child, end));
        visit(child, len);
    }
}
