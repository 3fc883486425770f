//! Error types for vitae-core

use thiserror::Error;

/// Result type alias using vitae-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vitae-core operations
///
/// Every variant is a synchronous validation or collaborator failure; nothing
/// is retried internally and no state is mutated on the failing path.
#[derive(Error, Debug)]
pub enum Error {
    /// No conflict with this id is registered
    #[error("Conflict not found: {0}")]
    ConflictNotFound(String),

    /// The conflict was already resolved once
    #[error("Conflict already resolved: {0}")]
    AlreadyResolved(String),

    /// Strategy needs a merged body but none was supplied
    #[error("Merged data required for {0} strategy")]
    MissingMergedData(String),

    /// No history entry with this id is retained
    #[error("History entry not found: {0}")]
    EntryNotFound(String),

    /// History entry carries no restorable snapshot
    #[error("History entry has no snapshot: {0}")]
    NoSnapshotAvailable(String),

    /// The stored profile moved past the versions the conflict was built from
    #[error(
        "Conflict {conflict_id} is stale: profile {profile_id} was updated at {current_updated_at} after the conflict was observed"
    )]
    StaleConflict {
        conflict_id: String,
        profile_id: String,
        current_updated_at: i64,
    },

    /// Edit is based on a document version older than one already accepted
    #[error(
        "Edit {edit_id} is stale: base version {version} is older than accepted version {latest}"
    )]
    StaleEdit {
        edit_id: String,
        version: u64,
        latest: u64,
    },

    /// Malformed backup payload
    #[error("Import parse error: {0}")]
    ImportParseError(String),

    /// No collaboration session with this id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Participant is not part of the session
    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    /// No comment with this id in the session
    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    /// Viewers cannot submit edits
    #[error("Participant {0} is a viewer and cannot edit")]
    ReadOnlyParticipant(String),

    /// Invite token could not be decoded
    #[error("Invalid invite: {0}")]
    InvalidInvite(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Version store failure
    #[error("Storage error: {0}")]
    Storage(String),
}
