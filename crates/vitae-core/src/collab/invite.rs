//! Shareable session invitations

use base64::engine::general_purpose::{STANDARD as BASE64_STANDARD, URL_SAFE_NO_PAD as BASE64_URL};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::env::SyncEnv;
use crate::error::{Error, Result};
use crate::models::ParticipantRole;

const INVITE_QUERY_KEY: &str = "invite=";

/// Payload carried inside an invite link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteToken {
    pub session_id: String,
    pub role: ParticipantRole,
    /// Unix ms
    pub invited_at: i64,
}

impl InviteToken {
    pub fn new(session_id: impl Into<String>, role: ParticipantRole, env: &SyncEnv) -> Self {
        Self {
            session_id: session_id.into(),
            role,
            invited_at: env.now_ms(),
        }
    }

    /// URL-safe base64 of the JSON payload.
    pub fn encode(&self) -> Result<String> {
        Ok(BASE64_URL.encode(serde_json::to_vec(self)?))
    }

    /// `<base_url>/collaborate?invite=<token>`
    pub fn link(&self, base_url: &str) -> Result<String> {
        Ok(format!(
            "{}/collaborate?{INVITE_QUERY_KEY}{}",
            base_url.trim_end_matches('/'),
            self.encode()?
        ))
    }

    /// Decode a bare token or a full invite link.
    ///
    /// Standard-alphabet tokens are accepted alongside URL-safe ones.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let encoded = trimmed
            .rsplit_once(INVITE_QUERY_KEY)
            .map_or(trimmed, |(_, token)| token)
            .split('&')
            .next()
            .unwrap_or_default();
        if encoded.is_empty() {
            return Err(Error::InvalidInvite("invite token is empty".to_string()));
        }

        let bytes = BASE64_URL
            .decode(encoded)
            .or_else(|_| BASE64_STANDARD.decode(encoded))
            .map_err(|error| Error::InvalidInvite(format!("not base64: {error}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|error| Error::InvalidInvite(format!("unreadable payload: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::{ManualClock, SequentialIds};
    use pretty_assertions::assert_eq;

    fn token() -> InviteToken {
        let env = SyncEnv::new(
            Arc::new(ManualClock::new(1_700_000_000_000)),
            Arc::new(SequentialIds::new("i")),
        );
        InviteToken::new("session-9", ParticipantRole::Viewer, &env)
    }

    #[test]
    fn link_embeds_token_under_collaborate_path() {
        let link = token().link("https://cv.example.com/").unwrap();
        assert!(link.starts_with("https://cv.example.com/collaborate?invite="));
        assert_eq!(InviteToken::parse(&link).unwrap(), token());
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let encoded = token().encode().unwrap();
        let json = String::from_utf8(BASE64_URL.decode(encoded).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"sessionId":"session-9","role":"viewer","invitedAt":1700000000000}"#
        );
    }

    #[test]
    fn parses_standard_alphabet_tokens() {
        let json = r#"{"sessionId":"s","role":"editor","invitedAt":1}"#;
        let encoded = BASE64_STANDARD.encode(json);
        let parsed = InviteToken::parse(&format!("https://x/collaborate?invite={encoded}")).unwrap();
        assert_eq!(parsed.role, ParticipantRole::Editor);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            InviteToken::parse("https://x/collaborate?invite=").unwrap_err(),
            Error::InvalidInvite(_)
        ));
        assert!(matches!(
            InviteToken::parse("!!!").unwrap_err(),
            Error::InvalidInvite(_)
        ));
        let not_json = BASE64_URL.encode("hello");
        assert!(matches!(
            InviteToken::parse(&not_json).unwrap_err(),
            Error::InvalidInvite(_)
        ));
    }
}
