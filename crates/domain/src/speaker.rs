//! Speaker identity resolution.
//!
//! A participant can speak as their character, as the narrator (GM only),
//! under a one-off custom name, or as themselves out of character. All
//! four cases resolve through one exhaustive mapping into the display
//! name, avatar, and event kind the outgoing event will carry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::actor::{ActorContext, CharacterSummary};
use crate::error::DomainError;
use crate::event::EventKind;
use crate::ids::CharacterId;

/// Who a message is spoken as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpeakerIdentity {
    /// In character, as a roster member
    Character { id: CharacterId },
    /// The GM's narrator voice
    Narrator,
    /// A one-off name, e.g. an unnamed NPC
    Custom { name: String },
    /// The participant themselves, out of character
    SelfOoc,
}

/// The resolved identity an event is sent under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerProfile {
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub kind: EventKind,
    /// Decorated name for the outbound relay, e.g. "Edwin Marsh (hana)"
    pub relay_name: String,
}

/// Resolve a speaker identity against the actor and the session roster.
///
/// This is the only place the four speaker cases are told apart; call
/// sites get back a complete profile and never branch on the identity
/// themselves.
pub fn resolve_speaker(
    identity: &SpeakerIdentity,
    actor: &ActorContext,
    roster: &HashMap<CharacterId, CharacterSummary>,
) -> Result<SpeakerProfile, DomainError> {
    match identity {
        SpeakerIdentity::Character { id } => {
            let character = roster
                .get(id)
                .ok_or_else(|| DomainError::not_found("Character", id.to_string()))?;
            Ok(SpeakerProfile {
                display_name: character.name.clone(),
                avatar_url: character.avatar_url.clone(),
                kind: EventKind::Speech,
                relay_name: format!("{} ({})", character.name, actor.display_name),
            })
        }
        SpeakerIdentity::Narrator => {
            if !actor.role.is_gm() {
                return Err(DomainError::validation(
                    "only the GM may speak as the narrator",
                ));
            }
            Ok(SpeakerProfile {
                display_name: "Narrator".to_string(),
                avatar_url: None,
                kind: EventKind::Narration,
                relay_name: "Narrator (GM)".to_string(),
            })
        }
        SpeakerIdentity::Custom { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("custom speaker name cannot be empty"));
            }
            Ok(SpeakerProfile {
                display_name: name.to_string(),
                avatar_url: None,
                kind: EventKind::Speech,
                relay_name: format!("{} ({})", name, actor.display_name),
            })
        }
        SpeakerIdentity::SelfOoc => Ok(SpeakerProfile {
            display_name: actor.display_name.clone(),
            avatar_url: actor.avatar_url.clone(),
            kind: EventKind::SideChat,
            relay_name: format!("{} (OOC)", actor.display_name),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Role;
    use crate::ids::UserId;

    fn gm() -> ActorContext {
        ActorContext::new(UserId::new(), Role::Gm, "hana")
    }

    fn player() -> ActorContext {
        ActorContext::new(UserId::new(), Role::Player, "june").with_avatar("https://cdn/june.png")
    }

    fn roster_with(id: CharacterId) -> HashMap<CharacterId, CharacterSummary> {
        HashMap::from([(
            id,
            CharacterSummary::new(id, "Edwin Marsh").with_avatar("https://cdn/edwin.png"),
        )])
    }

    #[test]
    fn character_speaker_uses_roster_name_and_avatar() {
        let id = CharacterId::new();
        let profile =
            resolve_speaker(&SpeakerIdentity::Character { id }, &player(), &roster_with(id))
                .expect("character resolves");
        assert_eq!(profile.display_name, "Edwin Marsh");
        assert_eq!(profile.avatar_url.as_deref(), Some("https://cdn/edwin.png"));
        assert_eq!(profile.kind, EventKind::Speech);
        assert_eq!(profile.relay_name, "Edwin Marsh (june)");
    }

    #[test]
    fn unknown_character_is_not_found() {
        let err = resolve_speaker(
            &SpeakerIdentity::Character {
                id: CharacterId::new(),
            },
            &player(),
            &HashMap::new(),
        )
        .expect_err("missing roster entry");
        assert!(err.is_not_found());
    }

    #[test]
    fn narrator_is_gm_only() {
        let profile = resolve_speaker(&SpeakerIdentity::Narrator, &gm(), &HashMap::new())
            .expect("gm narrates");
        assert_eq!(profile.display_name, "Narrator");
        assert_eq!(profile.kind, EventKind::Narration);
        assert_eq!(profile.relay_name, "Narrator (GM)");

        let err = resolve_speaker(&SpeakerIdentity::Narrator, &player(), &HashMap::new())
            .expect_err("players cannot narrate");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn custom_speaker_requires_a_name() {
        let profile = resolve_speaker(
            &SpeakerIdentity::Custom {
                name: "Desk Clerk".to_string(),
            },
            &gm(),
            &HashMap::new(),
        )
        .expect("custom name resolves");
        assert_eq!(profile.display_name, "Desk Clerk");
        assert_eq!(profile.kind, EventKind::Speech);

        let err = resolve_speaker(
            &SpeakerIdentity::Custom {
                name: "   ".to_string(),
            },
            &gm(),
            &HashMap::new(),
        )
        .expect_err("blank custom name");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn self_ooc_lands_in_side_chat() {
        let profile = resolve_speaker(&SpeakerIdentity::SelfOoc, &player(), &HashMap::new())
            .expect("ooc resolves");
        assert_eq!(profile.display_name, "june");
        assert_eq!(profile.avatar_url.as_deref(), Some("https://cdn/june.png"));
        assert_eq!(profile.kind, EventKind::SideChat);
        assert_eq!(profile.relay_name, "june (OOC)");
    }
}
