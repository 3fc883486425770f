//! Data models for Vitae

mod collaboration;
mod conflict;
mod edit;
mod history;
mod profile;

pub use collaboration::{
    ChangeAction, CollaborationSession, Comment, CommentReply, NewParticipant, Participant,
    ParticipantRole, SelectionRange, SessionChange,
};
pub use conflict::{ResolutionStrategy, SyncConflict};
pub use edit::{parse_delete_count, CollaborativeEdit, EditOperation};
pub use history::{HistoryAction, HistoryEntry};
pub use profile::{
    Certification, CustomQuestion, DatedEntry, Education, Experience, PersonalInfo, ProfileBody,
    ProfileSnapshot, Project, QuestionAnswer,
};
