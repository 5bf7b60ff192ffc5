//! Coverage repair for rule actions
//!
//! Group actions and callbacks describe a match as a list of sub-spans. Those
//! lists can overlap, leave holes, or (for callbacks) point at nonsense. The
//! stream must stay contiguous regardless, so every list is forced into an
//! ordered, gap-free partition of the match before anything is emitted.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<T> {
    /// A span claimed by an action part
    Claimed(T, Range<usize>),
    /// Bytes of the match no part claimed
    Unclaimed(Range<usize>),
}

/// Partition `span` of `text` using `pieces` in order
///
/// Each piece is clipped to start where the previous one ended and to end
/// within `span`. Pieces that end up empty, or whose edges fall inside a UTF-8
/// sequence, are dropped; what nobody claims is reported as `Unclaimed`.
pub(crate) fn normalize<T, I>(text: &str, span: Range<usize>, pieces: I) -> Vec<Segment<T>>
where
    I: IntoIterator<Item = (T, Range<usize>)>,
{
    let mut segments = Vec::new();
    let mut cursor = span.start;

    for (value, range) in pieces {
        let start = range.start.max(cursor);
        let end = range.end.min(span.end);
        if start >= end || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            continue;
        }
        if start > cursor {
            segments.push(Segment::Unclaimed(cursor..start));
        }
        segments.push(Segment::Claimed(value, start..end));
        cursor = end;
    }

    if cursor < span.end {
        segments.push(Segment::Unclaimed(cursor..span.end));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use Segment::{Claimed, Unclaimed};

    #[test]
    fn exact_partition_is_kept() {
        let segments = normalize("set foo", 0..7, [('k', 0..3), ('t', 3..4), ('n', 4..7)]);
        assert_eq!(
            segments,
            vec![Claimed('k', 0..3), Claimed('t', 3..4), Claimed('n', 4..7)]
        );
    }

    #[test]
    fn holes_are_reported() {
        let segments = normalize("a = b", 0..5, [('a', 0..1), ('b', 4..5)]);
        assert_eq!(
            segments,
            vec![Claimed('a', 0..1), Unclaimed(1..4), Claimed('b', 4..5)]
        );
    }

    #[test]
    fn overlaps_are_clipped_and_empties_dropped() {
        let segments = normalize("abcdef", 0..6, [('x', 0..4), ('y', 2..5), ('z', 5..5)]);
        assert_eq!(segments, vec![Claimed('x', 0..4), Claimed('y', 4..5), Unclaimed(5..6)]);
    }

    #[test]
    fn pieces_outside_the_span_are_clipped() {
        let segments = normalize("xxabyy", 2..4, [('a', 0..3), ('b', 3..9)]);
        assert_eq!(segments, vec![Claimed('a', 2..3), Claimed('b', 3..4)]);
    }

    #[test]
    fn pieces_splitting_a_character_are_dropped() {
        // 'é' is two bytes
        let segments = normalize("aéb", 0..4, [('a', 0..2), ('b', 3..4)]);
        assert_eq!(segments, vec![Unclaimed(0..3), Claimed('b', 3..4)]);
    }
}
