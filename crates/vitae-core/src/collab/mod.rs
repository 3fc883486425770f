//! Real-time collaborative editing
//!
//! Pure functions over sessions, edits and comments. Shared mutable state
//! lives in [`crate::services::CollaborationService`].

mod comments;
mod invite;
mod ot;
pub mod session;
mod stats;
mod window;

pub use comments::{add_reply, create_comment, resolve_comment};
pub use invite::InviteToken;
pub use ot::{apply_edit, rebase_over, transform, transform_and_apply};
pub use session::{participant_color, presence_summary, PresenceSummary, PARTICIPANT_PALETTE};
pub use stats::{collaboration_stats, CollaborationStats};
pub use window::{detect_conflicts, edits_overlap};
