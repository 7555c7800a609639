//! Push-feed notifications broadcast by a session store.
//!
//! Every subscriber of a session receives the same stream, the author of a
//! write included. Clients converge by folding these into local state; there
//! is no other channel between clients.

use serde::{Deserialize, Serialize};

use crate::records::{EventRecord, SessionRecord};

/// Messages from store to subscribed clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreNotification {
    /// A new event row was appended. For the author this is the echo of
    /// their own submission and carries the authoritative timestamp.
    EventInserted { event: EventRecord },
    /// An existing event row changed (currently only the hidden flag)
    EventModified { event: EventRecord },
    /// The session row changed: scene fields, visibility, audio, roster.
    /// Snapshots replace local scene state wholesale.
    SessionChanged { session: SessionRecord },
}

impl StoreNotification {
    /// Session the notification belongs to.
    pub fn session_id(&self) -> uuid::Uuid {
        match self {
            Self::EventInserted { event } | Self::EventModified { event } => event.session_id,
            Self::SessionChanged { session } => session.id,
        }
    }
}
