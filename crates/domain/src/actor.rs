//! Actor identity and read-only character-sheet inputs.
//!
//! Authentication, profiles, and sheet editing live outside this crate;
//! what arrives here is the resolved identity of the connected user and
//! the numeric sheet values the rules engine rolls against.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, UserId};
use crate::rules::skill_base;

/// Role of a connected participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Gm,
    Player,
}

impl Role {
    pub fn is_gm(&self) -> bool {
        matches!(self, Role::Gm)
    }
}

/// Identity of the local participant, as provided by the auth/profile
/// subsystem on session entry. Read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContext {
    pub user_id: UserId,
    pub role: Role,
    /// Profile nickname, used for out-of-character chat
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// Character this participant is currently playing, if any
    pub active_character: Option<CharacterId>,
}

impl ActorContext {
    pub fn new(user_id: UserId, role: Role, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            display_name: display_name.into(),
            avatar_url: None,
            active_character: None,
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn with_character(mut self, id: CharacterId) -> Self {
        self.active_character = Some(id);
        self
    }
}

/// Roster entry: enough of a character to speak as them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub id: CharacterId,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl CharacterSummary {
    pub fn new(id: CharacterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// An ability score as the sheet subsystem hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScore {
    pub label: String,
    pub value: i32,
}

/// A spendable resource pool (HP, MP, SAN, Luck).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub current: i32,
    pub max: i32,
}

impl ResourcePool {
    pub fn new(current: i32, max: i32) -> Self {
        Self { current, max }
    }

    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }
}

/// Read-only numeric view of a character sheet.
///
/// Ordered ability scores plus a skill-rating map, used only as roll
/// targets and for stat-change summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSheet {
    pub stats: Vec<AbilityScore>,
    pub skills: HashMap<String, i32>,
    pub hp: ResourcePool,
    pub mp: ResourcePool,
    pub san: ResourcePool,
    pub luck: ResourcePool,
}

impl CharacterSheet {
    /// Look up an ability score by label.
    pub fn stat(&self, label: &str) -> Option<i32> {
        self.stats.iter().find(|s| s.label == label).map(|s| s.value)
    }

    /// The value a skill check rolls against: the trained rating when one
    /// exists, otherwise the skill's base value derived from the sheet.
    pub fn check_target(&self, skill: &str) -> i32 {
        if let Some(value) = self.skills.get(skill) {
            return *value;
        }
        let dex = self.stat("DEX").unwrap_or(50);
        let edu = self.stat("EDU").unwrap_or(50);
        skill_base(skill, dex, edu)
    }
}

/// One tracked resource moving between two sheet snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChange {
    pub label: String,
    pub from: i32,
    pub to: i32,
}

impl fmt::Display for StatChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.label, self.from, self.to)
    }
}

/// Diff the tracked resource pools of two sheet snapshots.
///
/// Only current values are compared; maxima changing without play is a
/// sheet-editing concern, not a table announcement.
pub fn diff_resources(old: &CharacterSheet, new: &CharacterSheet) -> Vec<StatChange> {
    let pairs = [
        ("HP", old.hp.current, new.hp.current),
        ("MP", old.mp.current, new.mp.current),
        ("SAN", old.san.current, new.san.current),
        ("Luck", old.luck.current, new.luck.current),
    ];
    pairs
        .into_iter()
        .filter(|(_, from, to)| from != to)
        .map(|(label, from, to)| StatChange {
            label: label.to_string(),
            from,
            to,
        })
        .collect()
}

/// Join changes into the chat-log summary line, e.g. "HP 10 -> 8, SAN 55 -> 50".
pub fn change_summary(changes: &[StatChange]) -> String {
    changes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
