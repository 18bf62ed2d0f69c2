use super::{NodePoint, span::Span};

/// Collects the code points of a span into an owned String.
///
/// This allocates; prefer working with spans where possible.
pub fn slice_to_string(points: &[NodePoint], sp: Span) -> String {
    let end = sp.end.min(points.len());
    let start = sp.start.min(end);
    points[start..end].iter().map(|p| p.ch).collect()
}

/// Extracts text for a span, truncating to `max` code points with "..." suffix if needed.
///
/// Used for human-readable snapshot output.
pub fn preview(points: &[NodePoint], sp: Span, max: usize) -> String {
    let s = slice_to_string(points, sp);
    if s.chars().count() > max {
        let mut cut: String = s.chars().take(max).collect();
        cut.push_str("...");
        cut
    } else {
        s
    }
}
