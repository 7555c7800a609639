//! The GM-authored "current scene" fact sheet.
//!
//! One mutable record per session: chapter, location, in-fiction time, a
//! free-text description, and a visibility flag. Only the GM writes it;
//! replication is last-write-wins with no field-level merging.

use serde::{Deserialize, Serialize};

use crate::ids::SessionId;

/// Placeholder values for a freshly created session.
pub const DEFAULT_CHAPTER: &str = "Chapter 1";
pub const DEFAULT_LOCATION: &str = "Unknown";
pub const DEFAULT_TIME_LABEL: &str = "Unknown";
pub const DEFAULT_DESCRIPTION: &str = "No scene has been set yet.";

/// The editable text fields of the scene sheet.
///
/// The visibility flag is deliberately not in here: it toggles
/// immediately instead of going through the debounced field pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneField {
    Chapter,
    Location,
    TimeLabel,
    Description,
}

impl SceneField {
    pub fn label(&self) -> &'static str {
        match self {
            SceneField::Chapter => "chapter",
            SceneField::Location => "location",
            SceneField::TimeLabel => "time",
            SceneField::Description => "description",
        }
    }
}

/// Singleton per-session scene state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneState {
    pub session_id: SessionId,
    pub chapter: String,
    pub location: String,
    pub time_label: String,
    pub description: String,
    /// When false, non-GM viewers see a locked placeholder instead of the
    /// field values
    pub visible_to_players: bool,
}

impl SceneState {
    /// A fresh scene with the standard placeholders. Scenes start visible;
    /// hiding one is an explicit GM action.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            chapter: DEFAULT_CHAPTER.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            time_label: DEFAULT_TIME_LABEL.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            visible_to_players: true,
        }
    }

    pub fn field(&self, field: SceneField) -> &str {
        match field {
            SceneField::Chapter => &self.chapter,
            SceneField::Location => &self.location,
            SceneField::TimeLabel => &self.time_label,
            SceneField::Description => &self.description,
        }
    }

    pub fn set_field(&mut self, field: SceneField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SceneField::Chapter => self.chapter = value,
            SceneField::Location => self.location = value,
            SceneField::TimeLabel => self.time_label = value,
            SceneField::Description => self.description = value,
        }
    }
}
