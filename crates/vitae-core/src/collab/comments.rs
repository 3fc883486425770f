//! Anchored comment threads

use crate::env::SyncEnv;
use crate::models::{Comment, CommentReply, Participant};

pub fn create_comment(
    document_id: &str,
    author: &Participant,
    content: impl Into<String>,
    position: usize,
    env: &SyncEnv,
) -> Comment {
    Comment {
        id: env.next_id(),
        document_id: document_id.to_string(),
        user_id: author.id.clone(),
        user_name: author.name.clone(),
        content: content.into(),
        position,
        resolved: false,
        created_at: env.now_ms(),
        replies: Vec::new(),
    }
}

/// Copy of `comment` with a reply appended to the end of the thread.
#[must_use]
pub fn add_reply(
    comment: &Comment,
    author: &Participant,
    content: impl Into<String>,
    env: &SyncEnv,
) -> Comment {
    let mut next = comment.clone();
    next.replies.push(CommentReply {
        id: env.next_id(),
        user_id: author.id.clone(),
        user_name: author.name.clone(),
        content: content.into(),
        created_at: env.now_ms(),
    });
    next
}

#[must_use]
pub fn resolve_comment(comment: &Comment) -> Comment {
    Comment {
        resolved: true,
        ..comment.clone()
    }
}
