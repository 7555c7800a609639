//! Row records exchanged with a session store.
//!
//! Records carry raw `Uuid` foreign keys; the domain newtypes live on the
//! client side of the conversions. Vocabulary types that already serialize
//! cleanly (`EventKind`, `SkillCheck`, `SceneState`, `CharacterSummary`)
//! are reused as-is rather than duplicated.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use playroom_domain::{
    CharacterId, CharacterSummary, EventId, EventKind, SceneState, SessionEvent, SessionId,
    SkillCheck, UserId,
};

/// One stored session event row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    pub author_id: Uuid,
    pub speaker_name: String,
    pub avatar_url: Option<String>,
    pub kind: EventKind,
    pub body: String,
    pub dice: Option<SkillCheck>,
    /// Authoritative timestamp, stamped by the store on insert
    pub created_at: DateTime<Utc>,
    pub hidden: bool,
}

impl From<&SessionEvent> for EventRecord {
    fn from(event: &SessionEvent) -> Self {
        Self {
            id: event.id.to_uuid(),
            session_id: event.session_id.to_uuid(),
            author_id: event.author_id.to_uuid(),
            speaker_name: event.speaker_name.clone(),
            avatar_url: event.avatar_url.clone(),
            kind: event.kind,
            body: event.body.clone(),
            dice: event.dice.clone(),
            created_at: event.created_at,
            hidden: event.hidden,
        }
    }
}

impl From<EventRecord> for SessionEvent {
    fn from(record: EventRecord) -> Self {
        Self {
            id: EventId::from_uuid(record.id),
            session_id: SessionId::from_uuid(record.session_id),
            author_id: UserId::from_uuid(record.author_id),
            speaker_name: record.speaker_name,
            avatar_url: record.avatar_url,
            kind: record.kind,
            body: record.body,
            dice: record.dice,
            created_at: record.created_at,
            hidden: record.hidden,
        }
    }
}

/// One stored session row: metadata, the current scene, and the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub name: String,
    /// Opaque outbound relay endpoint, if the table has one configured
    pub webhook_url: Option<String>,
    /// Opaque background audio reference, if one is set
    pub background_audio_url: Option<String>,
    pub scene: SceneState,
    pub roster: Vec<CharacterSummary>,
}

impl SessionRecord {
    pub fn new(id: SessionId, name: impl Into<String>) -> Self {
        Self {
            id: id.to_uuid(),
            name: name.into(),
            webhook_url: None,
            background_audio_url: None,
            scene: SceneState::new(id),
            roster: Vec::new(),
        }
    }

    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn with_background_audio(mut self, url: impl Into<String>) -> Self {
        self.background_audio_url = Some(url.into());
        self
    }

    pub fn with_roster(mut self, roster: Vec<CharacterSummary>) -> Self {
        self.roster = roster;
        self
    }

    pub fn session_id(&self) -> SessionId {
        SessionId::from_uuid(self.id)
    }

    /// Roster keyed by character id, the shape speaker resolution wants.
    pub fn roster_index(&self) -> HashMap<CharacterId, CharacterSummary> {
        self.roster
            .iter()
            .map(|character| (character.id, character.clone()))
            .collect()
    }
}
