//! In-process host for live collaboration sessions.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::collab::{self, session, CollaborationStats, InviteToken};
use crate::config::SyncSettings;
use crate::env::SyncEnv;
use crate::error::{Error, Result};
use crate::models::{
    ChangeAction, CollaborationSession, CollaborativeEdit, Comment, EditOperation, NewParticipant,
    Participant, ParticipantRole, SelectionRange, SessionChange,
};
use crate::util::char_len;

/// An edit as submitted by a client, before the host stamps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub user_id: String,
    pub operation: EditOperation,
    pub position: usize,
    pub content: String,
    /// Document version the client last saw
    pub version: u64,
}

/// Shared text of a session at a given version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentState {
    pub text: String,
    pub version: u64,
}

/// Edits and changes retained per session for audits and stats.
const SESSION_LOG_CAPACITY: usize = 1_000;

#[derive(Debug)]
struct SessionState {
    session: CollaborationSession,
    text: String,
    /// Edits a future submission may still be rebased over; the first one
    /// moved the document past `compacted_version`
    applied: Vec<CollaborativeEdit>,
    compacted_version: u64,
    latest_base_version: u64,
    recent_edits: VecDeque<CollaborativeEdit>,
    comments: Vec<Comment>,
    changes: VecDeque<SessionChange>,
}

impl SessionState {
    fn new(session: CollaborationSession, text: String) -> Self {
        Self {
            session,
            text,
            applied: Vec::new(),
            compacted_version: 0,
            latest_base_version: 0,
            recent_edits: VecDeque::new(),
            comments: Vec::new(),
            changes: VecDeque::new(),
        }
    }

    fn version(&self) -> u64 {
        self.compacted_version + self.applied.len() as u64
    }

    /// Record an accepted edit and drop the ones no valid submission can
    /// be based before.
    fn accept(&mut self, edit: CollaborativeEdit, base_version: u64) {
        self.applied.push(edit.clone());
        self.latest_base_version = base_version;
        let settled = usize::try_from(base_version - self.compacted_version)
            .unwrap_or(usize::MAX)
            .min(self.applied.len());
        self.applied.drain(..settled);
        self.compacted_version += settled as u64;

        push_bounded(&mut self.recent_edits, edit);
    }

    fn participant(&self, participant_id: &str) -> Result<Participant> {
        self.session
            .participant(participant_id)
            .cloned()
            .ok_or_else(|| Error::ParticipantNotFound(participant_id.to_string()))
    }

    fn comment_index(&self, comment_id: &str) -> Result<usize> {
        self.comments
            .iter()
            .position(|comment| comment.id == comment_id)
            .ok_or_else(|| Error::CommentNotFound(comment_id.to_string()))
    }

    fn log(
        &mut self,
        participant: &Participant,
        action: ChangeAction,
        details: String,
        env: &SyncEnv,
    ) {
        let change = session::change_entry(&self.session.id, participant, action, details, env);
        push_bounded(&mut self.changes, change);
    }
}

fn push_bounded<T>(log: &mut VecDeque<T>, item: T) {
    if log.len() == SESSION_LOG_CAPACITY {
        log.pop_front();
    }
    log.push_back(item);
}

/// Thread-safe registry of live sessions.
///
/// Each session sits behind its own lock, so edits to one document never
/// wait on another.
#[derive(Clone)]
pub struct CollaborationService {
    sessions: Arc<Mutex<HashMap<String, Arc<Mutex<SessionState>>>>>,
    settings: SyncSettings,
    env: SyncEnv,
}

impl CollaborationService {
    pub fn new(settings: SyncSettings, env: SyncEnv) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            settings,
            env,
        }
    }

    async fn session(&self, session_id: &str) -> Result<Arc<Mutex<SessionState>>> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))
    }

    /// Open a session on a document, with `owner` as the first participant.
    pub async fn open_session(
        &self,
        document_id: &str,
        initial_text: impl Into<String> + Send,
        owner: NewParticipant,
    ) -> CollaborationSession {
        let opened = session::create(document_id, owner, &self.env);
        let mut state = SessionState::new(opened.clone(), initial_text.into());
        if let Some(owner) = opened.participants.first() {
            state.log(
                owner,
                ChangeAction::Join,
                format!("{} started the session", owner.name),
                &self.env,
            );
        }

        self.sessions
            .lock()
            .await
            .insert(opened.id.clone(), Arc::new(Mutex::new(state)));
        tracing::info!("Opened collaboration session {} on {document_id}", opened.id);
        opened
    }

    pub async fn join(
        &self,
        session_id: &str,
        participant: NewParticipant,
    ) -> Result<CollaborationSession> {
        let handle = self.session(session_id).await?;
        let mut state = handle.lock().await;
        let participant_id = participant.id.clone();
        state.session = session::add_participant(&state.session, participant, &self.env);
        let joined = state.participant(&participant_id)?;
        state.log(
            &joined,
            ChangeAction::Join,
            format!("{} joined the session", joined.name),
            &self.env,
        );
        Ok(state.session.clone())
    }

    /// Mint an invite for `session_id` carrying `role`.
    pub async fn invite(&self, session_id: &str, role: ParticipantRole) -> Result<InviteToken> {
        self.session(session_id).await?;
        Ok(InviteToken::new(session_id, role, &self.env))
    }

    /// Join through an invite; the invite's role overrides the requested one.
    pub async fn join_with_invite(
        &self,
        invite: &str,
        participant: NewParticipant,
    ) -> Result<CollaborationSession> {
        let token = InviteToken::parse(invite)?;
        self.join(
            &token.session_id,
            NewParticipant {
                role: token.role,
                ..participant
            },
        )
        .await
    }

    pub async fn leave(&self, session_id: &str, participant_id: &str) -> Result<()> {
        let handle = self.session(session_id).await?;
        let mut state = handle.lock().await;
        let leaving = state.participant(participant_id)?;
        state.session = session::remove_participant(&state.session, participant_id, &self.env);
        state.log(
            &leaving,
            ChangeAction::Leave,
            format!("{} left the session", leaving.name),
            &self.env,
        );
        Ok(())
    }

    pub async fn update_cursor(
        &self,
        session_id: &str,
        participant_id: &str,
        position: usize,
        selection: Option<SelectionRange>,
    ) -> Result<()> {
        let handle = self.session(session_id).await?;
        let mut state = handle.lock().await;
        state.participant(participant_id)?;
        state.session = session::update_cursor(
            &state.session,
            participant_id,
            position,
            selection,
            &self.env,
        );
        Ok(())
    }

    pub async fn active_participants(&self, session_id: &str) -> Result<Vec<Participant>> {
        let handle = self.session(session_id).await?;
        let state = handle.lock().await;
        Ok(session::active_participants(
            &state.session,
            self.settings.inactivity_threshold_ms,
            self.env.now_ms(),
        )
        .into_iter()
        .cloned()
        .collect())
    }

    /// Drop idle participants. A session left empty is destroyed.
    ///
    /// Returns how many participants were removed.
    pub async fn purge_inactive(&self, session_id: &str) -> Result<usize> {
        let handle = self.session(session_id).await?;
        let (removed, emptied) = {
            let mut state = handle.lock().await;
            let before = state.session.participants.len();
            state.session = session::purge_inactive(
                &state.session,
                self.settings.inactivity_threshold_ms,
                self.env.now_ms(),
            );
            let remaining = state.session.participants.len();
            (before - remaining, remaining == 0)
        };

        if emptied {
            self.sessions.lock().await.remove(session_id);
            tracing::info!("Session {session_id} closed after its last participant went idle");
        } else if removed > 0 {
            tracing::debug!("Purged {removed} idle participants from session {session_id}");
        }
        Ok(removed)
    }

    /// Close and destroy a session, returning its final state.
    pub async fn close_session(&self, session_id: &str) -> Result<CollaborationSession> {
        let handle = self
            .sessions
            .lock()
            .await
            .remove(session_id)
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;
        let state = handle.lock().await;
        tracing::info!(
            "Closed collaboration session {session_id} at version {}",
            state.version()
        );
        Ok(session::close(&state.session, &self.env))
    }

    pub async fn text(&self, session_id: &str) -> Result<DocumentState> {
        let handle = self.session(session_id).await?;
        let state = handle.lock().await;
        Ok(DocumentState {
            text: state.text.clone(),
            version: state.version(),
        })
    }

    /// Accept an edit made against `request.version` of the document.
    ///
    /// The edit is rebased over every edit applied since that version, then
    /// applied. The stored record carries the resulting document version.
    pub async fn submit_edit(
        &self,
        session_id: &str,
        request: EditRequest,
    ) -> Result<CollaborativeEdit> {
        let handle = self.session(session_id).await?;
        let mut state = handle.lock().await;

        let author = state.participant(&request.user_id)?;
        if !author.role.can_edit() {
            return Err(Error::ReadOnlyParticipant(author.id));
        }

        let edit = CollaborativeEdit {
            id: self.env.next_id(),
            session_id: session_id.to_string(),
            user_id: request.user_id,
            operation: request.operation,
            position: request.position,
            content: request.content,
            timestamp: self.env.now_ms(),
            version: request.version,
        };
        if request.version < state.latest_base_version {
            return Err(Error::StaleEdit {
                edit_id: edit.id,
                version: request.version,
                latest: state.latest_base_version,
            });
        }
        if request.version > state.version() {
            return Err(Error::InvalidInput(format!(
                "edit version {} is ahead of document version {}",
                request.version,
                state.version()
            )));
        }

        let unseen = usize::try_from(request.version - state.compacted_version)
            .unwrap_or(usize::MAX)
            .min(state.applied.len());
        let mut accepted = collab::rebase_over(&edit, &state.applied[unseen..]);
        accepted.position = accepted.position.min(char_len(&state.text));
        state.text = collab::apply_edit(&state.text, &accepted);
        accepted.version = state.version() + 1;
        state.accept(accepted.clone(), request.version);
        state.session = session::touch(&state.session, &author.id, &self.env);
        state.log(
            &author,
            ChangeAction::Edit,
            format!(
                "{} {} at position {}",
                author.name,
                edit_verb(accepted.operation),
                accepted.position
            ),
            &self.env,
        );

        tracing::debug!(
            "Applied edit {} to session {session_id}, now at version {}",
            accepted.id,
            accepted.version
        );
        Ok(accepted)
    }

    pub async fn add_comment(
        &self,
        session_id: &str,
        participant_id: &str,
        content: impl Into<String> + Send,
        position: usize,
    ) -> Result<Comment> {
        let handle = self.session(session_id).await?;
        let mut state = handle.lock().await;
        let author = state.participant(participant_id)?;
        let comment = collab::create_comment(
            &state.session.document_id,
            &author,
            content,
            position,
            &self.env,
        );
        state.comments.push(comment.clone());
        state.log(
            &author,
            ChangeAction::Comment,
            format!("{} commented at position {position}", author.name),
            &self.env,
        );
        Ok(comment)
    }

    pub async fn reply_to_comment(
        &self,
        session_id: &str,
        comment_id: &str,
        participant_id: &str,
        content: impl Into<String> + Send,
    ) -> Result<Comment> {
        let handle = self.session(session_id).await?;
        let mut state = handle.lock().await;
        let author = state.participant(participant_id)?;
        let index = state.comment_index(comment_id)?;
        let updated = collab::add_reply(&state.comments[index], &author, content, &self.env);
        state.comments[index] = updated.clone();
        state.log(
            &author,
            ChangeAction::Comment,
            format!("{} replied to comment {comment_id}", author.name),
            &self.env,
        );
        Ok(updated)
    }

    pub async fn resolve_comment(
        &self,
        session_id: &str,
        comment_id: &str,
        participant_id: &str,
    ) -> Result<Comment> {
        let handle = self.session(session_id).await?;
        let mut state = handle.lock().await;
        let author = state.participant(participant_id)?;
        let index = state.comment_index(comment_id)?;
        let resolved = collab::resolve_comment(&state.comments[index]);
        state.comments[index] = resolved.clone();
        state.log(
            &author,
            ChangeAction::Resolve,
            format!("{} resolved comment {comment_id}", author.name),
            &self.env,
        );
        Ok(resolved)
    }

    pub async fn comments(&self, session_id: &str) -> Result<Vec<Comment>> {
        let handle = self.session(session_id).await?;
        let state = handle.lock().await;
        Ok(state.comments.clone())
    }

    /// Change log of a session, oldest first.
    pub async fn changes(&self, session_id: &str) -> Result<Vec<SessionChange>> {
        let handle = self.session(session_id).await?;
        let state = handle.lock().await;
        Ok(state.changes.iter().cloned().collect())
    }

    /// Applied edits that overlapped within the configured window.
    pub async fn conflict_windows(&self, session_id: &str) -> Result<Vec<Vec<CollaborativeEdit>>> {
        let handle = self.session(session_id).await?;
        let state = handle.lock().await;
        let edits: Vec<CollaborativeEdit> = state.recent_edits.iter().cloned().collect();
        Ok(collab::detect_conflicts(
            &edits,
            self.settings.edit_conflict_window_ms,
        ))
    }

    /// Activity summary across every live session.
    pub async fn stats(&self) -> CollaborationStats {
        let handles: Vec<_> = self.sessions.lock().await.values().cloned().collect();
        let mut sessions = Vec::with_capacity(handles.len());
        let mut edits = Vec::new();
        let mut comments = Vec::new();
        for handle in handles {
            let state = handle.lock().await;
            sessions.push(state.session.clone());
            edits.extend(state.recent_edits.iter().cloned());
            comments.extend(state.comments.iter().cloned());
        }
        collab::collaboration_stats(&sessions, &edits, &comments)
    }
}

const fn edit_verb(operation: EditOperation) -> &'static str {
    match operation {
        EditOperation::Insert => "inserted",
        EditOperation::Delete => "deleted",
        EditOperation::Replace => "replaced",
    }
}
