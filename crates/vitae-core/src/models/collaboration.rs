//! Collaboration session, participant and comment models

use serde::{Deserialize, Serialize};

/// What a participant may do in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Owner,
    #[default]
    Editor,
    Viewer,
}

impl ParticipantRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    #[must_use]
    pub const fn can_edit(self) -> bool {
        !matches!(self, Self::Viewer)
    }
}

/// Half-open character range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

/// A user taking part in a collaboration session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Palette color assigned from join order
    pub color: String,
    #[serde(default)]
    pub cursor_position: Option<usize>,
    #[serde(default)]
    pub selection: Option<SelectionRange>,
    pub role: ParticipantRole,
    pub is_active: bool,
    /// Unix ms
    pub joined_at: i64,
    /// Unix ms
    pub last_seen: i64,
}

/// Identity a caller supplies when someone joins; presence fields are
/// assigned by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: ParticipantRole,
}

impl NewParticipant {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: ParticipantRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            avatar: None,
            role,
        }
    }
}

/// Shared editing session over one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationSession {
    pub id: String,
    pub document_id: String,
    /// Join order is preserved
    pub participants: Vec<Participant>,
    /// Unix ms
    pub created_at: i64,
    /// Unix ms
    pub last_activity: i64,
    pub is_active: bool,
}

impl CollaborationSession {
    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| participant.id == participant_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentReply {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    /// Unix ms
    pub created_at: i64,
}

/// Anchored discussion thread on a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub document_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    /// Character offset the comment is attached to
    pub position: usize,
    pub resolved: bool,
    /// Unix ms
    pub created_at: i64,
    pub replies: Vec<CommentReply>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Edit,
    Comment,
    Resolve,
    Join,
    Leave,
}

/// Entry in a session's change log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionChange {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub user_name: String,
    pub action: ChangeAction,
    pub details: String,
    /// Unix ms
    pub timestamp: i64,
}
