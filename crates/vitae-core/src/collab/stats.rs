//! Activity summaries for collaboration dashboards

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{CollaborationSession, CollaborativeEdit, Comment};

const MS_PER_MINUTE: f64 = 60_000.0;

/// Aggregate activity across a set of sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaborationStats {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub total_participants: usize,
    pub total_edits: usize,
    pub total_comments: usize,
    pub resolved_comments: usize,
    /// Mean of `last_activity - created_at`, in minutes
    pub average_session_minutes: f64,
    pub most_active_user: Option<String>,
}

pub fn collaboration_stats(
    sessions: &[CollaborationSession],
    edits: &[CollaborativeEdit],
    comments: &[Comment],
) -> CollaborationStats {
    let participants: HashSet<&str> = sessions
        .iter()
        .flat_map(|session| session.participants.iter())
        .map(|participant| participant.id.as_str())
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let average_session_minutes = if sessions.is_empty() {
        0.0
    } else {
        let total_ms: i64 = sessions
            .iter()
            .map(|session| session.last_activity - session.created_at)
            .sum();
        total_ms as f64 / sessions.len() as f64 / MS_PER_MINUTE
    };

    CollaborationStats {
        total_sessions: sessions.len(),
        active_sessions: sessions.iter().filter(|session| session.is_active).count(),
        total_participants: participants.len(),
        total_edits: edits.len(),
        total_comments: comments.len(),
        resolved_comments: comments.iter().filter(|comment| comment.resolved).count(),
        average_session_minutes,
        most_active_user: most_active_user(edits),
    }
}

/// The user with the most edits.
///
/// Users are ranked in the order they first edited; on a tie the one who
/// started editing later wins.
fn most_active_user(edits: &[CollaborativeEdit]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for edit in edits {
        match counts.iter_mut().find(|(user_id, _)| *user_id == edit.user_id) {
            Some((_, count)) => *count += 1,
            None => counts.push((edit.user_id.as_str(), 1)),
        }
    }
    counts
        .into_iter()
        .reduce(|leader, next| if leader.1 > next.1 { leader } else { next })
        .map(|(user_id, _)| user_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EditOperation;
    use pretty_assertions::assert_eq;

    fn session(
        id: &str,
        created_at: i64,
        last_activity: i64,
        active: bool,
    ) -> CollaborationSession {
        CollaborationSession {
            id: id.to_string(),
            document_id: "doc".to_string(),
            participants: Vec::new(),
            created_at,
            last_activity,
            is_active: active,
        }
    }

    fn edit_by(user_id: &str) -> CollaborativeEdit {
        CollaborativeEdit {
            id: format!("e-{user_id}"),
            session_id: "s".to_string(),
            user_id: user_id.to_string(),
            operation: EditOperation::Insert,
            position: 0,
            content: "x".to_string(),
            timestamp: 0,
            version: 0,
        }
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = collaboration_stats(&[], &[], &[]);
        assert_eq!(stats.total_sessions, 0);
        assert!(stats.average_session_minutes.abs() < f64::EPSILON);
        assert_eq!(stats.most_active_user, None);
    }

    #[test]
    fn averages_session_duration_in_minutes() {
        let sessions = vec![
            session("a", 0, 60_000, true),
            session("b", 0, 180_000, false),
        ];
        let stats = collaboration_stats(&sessions, &[], &[]);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.active_sessions, 1);
        assert!((stats.average_session_minutes - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn most_active_user_tie_goes_to_later_editor() {
        let edits = vec![edit_by("ana"), edit_by("ana"), edit_by("bo"), edit_by("bo")];
        let stats = collaboration_stats(&[], &edits, &[]);
        assert_eq!(stats.most_active_user.as_deref(), Some("bo"));
        assert_eq!(stats.total_edits, 4);

        let edits = vec![edit_by("bo"), edit_by("ana"), edit_by("ana"), edit_by("bo")];
        let stats = collaboration_stats(&[], &edits, &[]);
        assert_eq!(stats.most_active_user.as_deref(), Some("ana"));
    }

    #[test]
    fn most_active_user_counts_every_edit() {
        let edits = vec![edit_by("ana"), edit_by("bo"), edit_by("ana"), edit_by("cy")];
        let stats = collaboration_stats(&[], &edits, &[]);
        assert_eq!(stats.most_active_user.as_deref(), Some("ana"));
    }
}
