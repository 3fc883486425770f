//! Grouping of edits that collide in time and space

use crate::models::CollaborativeEdit;

/// True when the character ranges touched by two edits intersect.
///
/// Deletes span their parsed count, other operations their content length.
/// Ranges are half-open, so edits that merely touch do not overlap.
pub fn edits_overlap(first: &CollaborativeEdit, second: &CollaborativeEdit) -> bool {
    let (first_start, first_len) = (first.position, first.span_len());
    let (second_start, second_len) = (second.position, second.span_len());
    (first_start <= second_start && first_start.saturating_add(first_len) > second_start)
        || (second_start <= first_start && second_start.saturating_add(second_len) > first_start)
}

/// Groups of edits that landed within `window_ms` of each other and overlap.
///
/// Edits are scanned in timestamp order. Each edit anchors a group of the
/// later edits inside its window that overlap it; groups with a single
/// member are dropped. An edit may show up in more than one group.
pub fn detect_conflicts(
    edits: &[CollaborativeEdit],
    window_ms: i64,
) -> Vec<Vec<CollaborativeEdit>> {
    let mut sorted: Vec<&CollaborativeEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| edit.timestamp);

    let mut groups = Vec::new();
    for (index, anchor) in sorted.iter().enumerate() {
        let mut group = vec![(*anchor).clone()];
        for candidate in &sorted[index + 1..] {
            if candidate.timestamp - anchor.timestamp > window_ms {
                break;
            }
            if edits_overlap(anchor, candidate) {
                group.push((*candidate).clone());
            }
        }
        if group.len() > 1 {
            groups.push(group);
        }
    }

    if !groups.is_empty() {
        tracing::debug!(
            "Found {} conflicting edit groups among {} edits",
            groups.len(),
            edits.len()
        );
    }
    groups
}
