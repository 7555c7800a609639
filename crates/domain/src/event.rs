//! Session events - immutable entries in the append-only narrative stream.
//!
//! Every chat line and dice roll in a session is one of these. Events are
//! created by any participant and never edited afterwards; the GM's
//! hidden toggle is the only permitted mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EventId, SessionId, UserId};
use crate::rules::SkillCheck;

/// What kind of entry an event is; also decides which channel it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// GM scene-setting prose
    Narration,
    /// In-character speech
    Speech,
    /// A resolved skill check
    DiceRoll,
    /// Out-of-character table talk
    SideChat,
}

impl EventKind {
    pub fn channel(&self) -> Channel {
        match self {
            EventKind::SideChat => Channel::Side,
            EventKind::Narration | EventKind::Speech | EventKind::DiceRoll => Channel::Main,
        }
    }
}

/// The two read channels the unread tracker watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    /// Narration, speech, and dice results
    Main,
    /// Out-of-character side chat
    Side,
}

/// A single entry in the session's narrative stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub id: EventId,
    pub session_id: SessionId,
    pub author_id: UserId,
    /// Display name resolved at send time; events keep the name they were
    /// spoken under even if the speaker later changes identity
    pub speaker_name: String,
    pub avatar_url: Option<String>,
    pub kind: EventKind,
    pub body: String,
    /// Present on DiceRoll events
    pub dice: Option<SkillCheck>,
    /// Authoritative once confirmed by the store; provisional before that
    pub created_at: DateTime<Utc>,
    /// GM moderation flag; hidden bodies render as a redaction to players
    pub hidden: bool,
}

impl SessionEvent {
    pub fn new(
        session_id: SessionId,
        author_id: UserId,
        speaker_name: impl Into<String>,
        kind: EventKind,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            session_id,
            author_id,
            speaker_name: speaker_name.into(),
            avatar_url: None,
            kind,
            body: body.into(),
            dice: None,
            created_at: now,
            hidden: false,
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn with_dice(mut self, check: SkillCheck) -> Self {
        self.dice = Some(check);
        self
    }

    pub fn channel(&self) -> Channel {
        self.kind.channel()
    }
}
