//! Session membership and presence
//!
//! Every function takes the current session by reference and returns the
//! updated copy; callers swap it in under their per-session lock.

use crate::env::SyncEnv;
use crate::models::{
    ChangeAction, CollaborationSession, NewParticipant, Participant, SelectionRange, SessionChange,
};

/// Participant colors, assigned by join order.
pub const PARTICIPANT_PALETTE: [&str; 8] = [
    "#3B82F6", // blue
    "#10B981", // green
    "#F59E0B", // amber
    "#EF4444", // red
    "#8B5CF6", // purple
    "#EC4899", // pink
    "#14B8A6", // teal
    "#F97316", // orange
];

pub const fn participant_color(join_index: usize) -> &'static str {
    PARTICIPANT_PALETTE[join_index % PARTICIPANT_PALETTE.len()]
}

fn join(participant: NewParticipant, join_index: usize, now: i64) -> Participant {
    Participant {
        id: participant.id,
        name: participant.name,
        email: participant.email,
        avatar: participant.avatar,
        color: participant_color(join_index).to_string(),
        cursor_position: None,
        selection: None,
        role: participant.role,
        is_active: true,
        joined_at: now,
        last_seen: now,
    }
}

/// Open a session on `document_id` with `owner` as its first participant.
pub fn create(document_id: &str, owner: NewParticipant, env: &SyncEnv) -> CollaborationSession {
    let now = env.now_ms();
    CollaborationSession {
        id: env.next_id(),
        document_id: document_id.to_string(),
        participants: vec![join(owner, 0, now)],
        created_at: now,
        last_activity: now,
        is_active: true,
    }
}

/// Add a participant with the next palette color.
///
/// A participant id already present is reactivated in place instead of
/// being listed twice.
#[must_use]
pub fn add_participant(
    session: &CollaborationSession,
    participant: NewParticipant,
    env: &SyncEnv,
) -> CollaborationSession {
    let now = env.now_ms();
    let mut next = session.clone();
    if let Some(existing) = next
        .participants
        .iter_mut()
        .find(|existing| existing.id == participant.id)
    {
        existing.is_active = true;
        existing.last_seen = now;
    } else {
        let join_index = next.participants.len();
        next.participants.push(join(participant, join_index, now));
    }
    next.last_activity = now;
    next
}

#[must_use]
pub fn remove_participant(
    session: &CollaborationSession,
    participant_id: &str,
    env: &SyncEnv,
) -> CollaborationSession {
    let mut next = session.clone();
    next.participants
        .retain(|participant| participant.id != participant_id);
    next.last_activity = env.now_ms();
    next
}

/// Move a participant's cursor and selection, refreshing `last_seen`.
///
/// Unknown participant ids leave the participant list untouched.
#[must_use]
pub fn update_cursor(
    session: &CollaborationSession,
    participant_id: &str,
    position: usize,
    selection: Option<SelectionRange>,
    env: &SyncEnv,
) -> CollaborationSession {
    let now = env.now_ms();
    let mut next = session.clone();
    if let Some(participant) = next
        .participants
        .iter_mut()
        .find(|participant| participant.id == participant_id)
    {
        participant.cursor_position = Some(position);
        participant.selection = selection;
        participant.last_seen = now;
    }
    next.last_activity = now;
    next
}

/// Refresh a participant's `last_seen` without moving the cursor.
#[must_use]
pub fn touch(
    session: &CollaborationSession,
    participant_id: &str,
    env: &SyncEnv,
) -> CollaborationSession {
    let now = env.now_ms();
    let mut next = session.clone();
    if let Some(participant) = next
        .participants
        .iter_mut()
        .find(|participant| participant.id == participant_id)
    {
        participant.last_seen = now;
    }
    next.last_activity = now;
    next
}

fn is_present(participant: &Participant, threshold_ms: i64, now_ms: i64) -> bool {
    participant.is_active && now_ms.saturating_sub(participant.last_seen) < threshold_ms
}

/// Participants seen within `threshold_ms` and still flagged active.
pub fn active_participants(
    session: &CollaborationSession,
    threshold_ms: i64,
    now_ms: i64,
) -> Vec<&Participant> {
    session
        .participants
        .iter()
        .filter(|participant| is_present(participant, threshold_ms, now_ms))
        .collect()
}

/// Drop every participant that is no longer present.
#[must_use]
pub fn purge_inactive(
    session: &CollaborationSession,
    threshold_ms: i64,
    now_ms: i64,
) -> CollaborationSession {
    let mut next = session.clone();
    next.participants
        .retain(|participant| is_present(participant, threshold_ms, now_ms));
    next
}

#[must_use]
pub fn close(session: &CollaborationSession, env: &SyncEnv) -> CollaborationSession {
    CollaborationSession {
        is_active: false,
        last_activity: env.now_ms(),
        ..session.clone()
    }
}

/// Participants to draw as presence badges plus the overflow count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSummary<'a> {
    pub visible: Vec<&'a Participant>,
    pub overflow: usize,
}

pub fn presence_summary(participants: &[Participant], max_visible: usize) -> PresenceSummary<'_> {
    PresenceSummary {
        visible: participants.iter().take(max_visible).collect(),
        overflow: participants.len().saturating_sub(max_visible),
    }
}

/// Build an entry for a session's change log.
pub fn change_entry(
    session_id: &str,
    participant: &Participant,
    action: ChangeAction,
    details: impl Into<String>,
    env: &SyncEnv,
) -> SessionChange {
    SessionChange {
        id: env.next_id(),
        session_id: session_id.to_string(),
        user_id: participant.id.clone(),
        user_name: participant.name.clone(),
        action,
        details: details.into(),
        timestamp: env.now_ms(),
    }
}
