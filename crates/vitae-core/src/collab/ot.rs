//! Operational transformation for character-level edits
//!
//! An incoming edit is rebased over every concurrent edit that happened
//! before it:
//! - an insert at or before the edit's position shifts it right by the
//!   inserted length;
//! - a delete wholly before the position shifts it left by the deleted
//!   length, and a delete covering the position collapses it onto the
//!   deletion start;
//! - replaces keep document length and never move positions.
//!
//! Positions count characters. Callers must feed edits in non-decreasing
//! timestamp order; nothing here reorders or buffers.

use crate::models::{parse_delete_count, CollaborativeEdit, EditOperation};
use crate::util::char_len;

/// Rebase `edit` over the pending edits that precede it in time.
///
/// Returns a new record; `edit` and `pending` are left untouched.
pub fn transform(edit: &CollaborativeEdit, pending: &[CollaborativeEdit]) -> CollaborativeEdit {
    let mut earlier: Vec<&CollaborativeEdit> = pending
        .iter()
        .filter(|candidate| candidate.timestamp < edit.timestamp)
        .collect();
    earlier.sort_by_key(|candidate| (candidate.timestamp, candidate.version));
    rebase_over(edit, earlier)
}

/// Rebase `edit` over `applied` in the given order, without time filtering.
///
/// Used where a single authority already fixed the application order.
pub fn rebase_over<'a>(
    edit: &CollaborativeEdit,
    applied: impl IntoIterator<Item = &'a CollaborativeEdit>,
) -> CollaborativeEdit {
    let position = applied
        .into_iter()
        .fold(edit.position, |position, against| rebase(position, against));

    if position != edit.position {
        tracing::debug!(
            "Transformed edit {} from position {} to {position}",
            edit.id,
            edit.position
        );
    }
    edit.at_position(position)
}

fn rebase(position: usize, against: &CollaborativeEdit) -> usize {
    match against.operation {
        EditOperation::Insert => {
            if against.position <= position {
                position.saturating_add(char_len(&against.content))
            } else {
                position
            }
        }
        EditOperation::Delete => {
            let deleted = against.span_len();
            match against.position.checked_add(deleted) {
                Some(delete_end) if delete_end <= position => position - deleted,
                _ if against.position <= position => against.position,
                _ => position,
            }
        }
        EditOperation::Replace => position,
    }
}

/// Apply an edit to `text`, clamping out-of-range positions to the end.
pub fn apply_edit(text: &str, edit: &CollaborativeEdit) -> String {
    let start = byte_offset(text, edit.position);
    let (head, rest) = text.split_at(start);

    match edit.operation {
        EditOperation::Insert => {
            let mut result = String::with_capacity(text.len() + edit.content.len());
            result.push_str(head);
            result.push_str(&edit.content);
            result.push_str(rest);
            result
        }
        EditOperation::Delete => {
            let tail = &rest[byte_offset(rest, parse_delete_count(&edit.content))..];
            let mut result = String::with_capacity(head.len() + tail.len());
            result.push_str(head);
            result.push_str(tail);
            result
        }
        EditOperation::Replace => {
            let tail = &rest[byte_offset(rest, char_len(&edit.content))..];
            let mut result = String::with_capacity(text.len() + edit.content.len());
            result.push_str(head);
            result.push_str(&edit.content);
            result.push_str(tail);
            result
        }
    }
}

/// Transform `edit` against `pending`, then apply it.
pub fn transform_and_apply(
    text: &str,
    edit: &CollaborativeEdit,
    pending: &[CollaborativeEdit],
) -> (String, CollaborativeEdit) {
    let transformed = transform(edit, pending);
    (apply_edit(text, &transformed), transformed)
}

fn byte_offset(text: &str, char_position: usize) -> usize {
    text.char_indices()
        .nth(char_position)
        .map_or(text.len(), |(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn edit(
        id: &str,
        operation: EditOperation,
        position: usize,
        content: &str,
        timestamp: i64,
    ) -> CollaborativeEdit {
        CollaborativeEdit {
            id: id.to_string(),
            session_id: "s1".to_string(),
            user_id: format!("user-{id}"),
            operation,
            position,
            content: content.to_string(),
            timestamp,
            version: 0,
        }
    }

    #[test]
    fn non_overlapping_inserts_commute() {
        let text = "The quick brown fox";
        let e1 = edit("e1", EditOperation::Insert, 5, "X", 100);
        let e2 = edit("e2", EditOperation::Insert, 10, "Y", 200);

        let left = apply_edit(&apply_edit(text, &e1), &transform(&e2, &[e1.clone()]));
        let right = apply_edit(&apply_edit(text, &e2), &transform(&e1, &[e2.clone()]));

        assert_eq!(left, right);
        assert_eq!(left, "The qXuick Ybrown fox");
    }

    #[test]
    fn insert_and_delete_in_separate_ranges_commute() {
        let text = "abcdefghijklmnop";
        let del = edit("del", EditOperation::Delete, 2, "3", 100);
        let ins = edit("ins", EditOperation::Insert, 12, "__", 200);

        let left = apply_edit(&apply_edit(text, &ins), &transform(&del, &[ins.clone()]));
        let right = apply_edit(&apply_edit(text, &del), &transform(&ins, &[del.clone()]));

        assert_eq!(left, right);
        assert_eq!(left, "abfghijkl__mnop");
    }

    #[test]
    fn position_inside_deleted_range_clamps_to_start() {
        let target = edit("e", EditOperation::Insert, 7, "!", 200);
        let delete = edit("d", EditOperation::Delete, 3, "5", 100);
        assert_eq!(transform(&target, &[delete]).position, 3);
    }

    #[test]
    fn delete_entirely_before_shifts_left() {
        let target = edit("e", EditOperation::Insert, 10, "!", 200);
        let delete = edit("d", EditOperation::Delete, 3, "5", 100);
        assert_eq!(transform(&target, &[delete]).position, 5);
    }

    #[test]
    fn later_or_equal_timestamps_are_ignored() {
        let target = edit("e", EditOperation::Insert, 4, "!", 100);
        let same_time = edit("a", EditOperation::Insert, 0, "abc", 100);
        let later = edit("b", EditOperation::Insert, 0, "abc", 150);
        assert_eq!(transform(&target, &[same_time, later]).position, 4);
    }

    #[test]
    fn insert_after_position_does_not_shift() {
        let target = edit("e", EditOperation::Insert, 4, "!", 200);
        let insert = edit("i", EditOperation::Insert, 5, "abc", 100);
        assert_eq!(transform(&target, &[insert]).position, 4);
    }

    #[test]
    fn pending_edits_are_processed_in_timestamp_order() {
        let target = edit("e", EditOperation::Insert, 6, "!", 500);
        // Delete [2,6) first moves the target to 2, then the insert at 2 moves it to 5.
        let delete = edit("d", EditOperation::Delete, 2, "4", 100);
        let insert = edit("i", EditOperation::Insert, 2, "abc", 200);
        assert_eq!(transform(&target, &[insert, delete]).position, 5);
    }

    #[test]
    fn transform_leaves_original_unchanged() {
        let target = edit("e", EditOperation::Insert, 4, "!", 200);
        let insert = edit("i", EditOperation::Insert, 0, "ab", 100);
        let transformed = transform(&target, std::slice::from_ref(&insert));
        assert_eq!(target.position, 4);
        assert_eq!(transformed.position, 6);
    }

    #[test]
    fn rebase_over_ignores_timestamps() {
        let target = edit("e", EditOperation::Insert, 4, "!", 100);
        let applied = vec![edit("i", EditOperation::Insert, 0, "ab", 100)];
        assert_eq!(transform(&target, &applied).position, 4);
        assert_eq!(rebase_over(&target, &applied).position, 6);
    }

    #[test]
    fn huge_delete_count_collapses_instead_of_overflowing() {
        let target = edit("e", EditOperation::Insert, 10, "!", 200);
        let delete = edit("d", EditOperation::Delete, 5, "18446744073709551615", 100);
        assert_eq!(transform(&target, &[delete]).position, 5);
    }

    #[test]
    fn huge_position_saturates_past_an_insert() {
        let target = edit("e", EditOperation::Insert, usize::MAX, "!", 200);
        let insert = edit("i", EditOperation::Insert, 0, "ab", 100);
        assert_eq!(transform(&target, &[insert]).position, usize::MAX);
        assert_eq!(apply_edit("abc", &target), "abc!");
    }

    #[test]
    fn apply_handles_each_operation() {
        let text = "hello world";
        assert_eq!(
            apply_edit(text, &edit("i", EditOperation::Insert, 5, ",", 0)),
            "hello, world"
        );
        assert_eq!(
            apply_edit(text, &edit("d", EditOperation::Delete, 5, "6", 0)),
            "hello"
        );
        assert_eq!(
            apply_edit(text, &edit("r", EditOperation::Replace, 6, "there", 0)),
            "hello there"
        );
    }

    #[test]
    fn unparsable_delete_count_removes_one_char() {
        let text = "abc";
        assert_eq!(
            apply_edit(text, &edit("d", EditOperation::Delete, 1, "oops", 0)),
            "ac"
        );
    }

    #[test]
    fn positions_past_end_clamp() {
        let text = "abc";
        assert_eq!(
            apply_edit(text, &edit("i", EditOperation::Insert, 99, "!", 0)),
            "abc!"
        );
        assert_eq!(
            apply_edit(text, &edit("d", EditOperation::Delete, 2, "10", 0)),
            "ab"
        );
        assert_eq!(
            apply_edit(text, &edit("r", EditOperation::Replace, 2, "XYZ", 0)),
            "abXYZ"
        );
    }

    #[test]
    fn positions_count_characters_not_bytes() {
        let text = "héllo";
        assert_eq!(
            apply_edit(text, &edit("i", EditOperation::Insert, 2, "-", 0)),
            "hé-llo"
        );
    }

    #[test]
    fn transform_and_apply_returns_both() {
        let pending = vec![edit("i", EditOperation::Insert, 0, ">> ", 100)];
        let (result, transformed) = transform_and_apply(
            ">> hello",
            &edit("e", EditOperation::Insert, 5, "!", 200),
            &pending,
        );
        assert_eq!(transformed.position, 8);
        assert_eq!(result, ">> hello!");
    }
}
