//! Collaborative edit model

use serde::{Deserialize, Serialize};

use crate::util::char_len;

/// Kind of text operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOperation {
    Insert,
    /// `content` carries the number of characters to remove
    Delete,
    /// Overwrites `len(content)` characters with `content`
    Replace,
}

impl EditOperation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Replace => "replace",
        }
    }
}

/// A single character-level edit to a shared document.
///
/// Records are immutable once created; transformation yields a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborativeEdit {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub operation: EditOperation,
    /// Character offset into the document
    pub position: usize,
    pub content: String,
    /// Unix ms
    pub timestamp: i64,
    /// Document version the edit was made against
    pub version: u64,
}

impl CollaborativeEdit {
    /// Number of characters the edit spans in the document it targets.
    ///
    /// Deletes span their parsed count, inserts and replaces span their
    /// content.
    pub fn span_len(&self) -> usize {
        match self.operation {
            EditOperation::Delete => parse_delete_count(&self.content),
            EditOperation::Insert | EditOperation::Replace => char_len(&self.content),
        }
    }

    /// Copy of this edit moved to `position`.
    #[must_use]
    pub fn at_position(&self, position: usize) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

/// Character count carried by a delete edit.
///
/// Reads the leading run of ASCII digits (after optional whitespace and a
/// `+` sign). Missing, zero, negative or unparsable counts delete one
/// character.
pub fn parse_delete_count(content: &str) -> usize {
    let trimmed = content.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = unsigned
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    match digits.parse::<usize>() {
        Ok(0) | Err(_) => 1,
        Ok(count) => count,
    }
}
