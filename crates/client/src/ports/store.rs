//! Session store port.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use playroom_domain::{EventId, SceneField, SessionId};
use playroom_shared::{EventRecord, SessionRecord, StoreNotification};

use super::error::StoreError;

/// The authoritative ordered store behind every session.
///
/// Writes are asynchronous round trips; the store stamps `created_at` on
/// insert and pushes a notification to every subscriber, the writer
/// included. Clients treat the feed as the only source of confirmed state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, session_id: SessionId) -> Result<SessionRecord, StoreError>;

    async fn load_events(&self, session_id: SessionId) -> Result<Vec<EventRecord>, StoreError>;

    async fn insert_event(&self, event: &EventRecord) -> Result<(), StoreError>;

    async fn set_event_hidden(
        &self,
        session_id: SessionId,
        event_id: EventId,
        hidden: bool,
    ) -> Result<(), StoreError>;

    async fn update_scene_field(
        &self,
        session_id: SessionId,
        field: SceneField,
        value: &str,
    ) -> Result<(), StoreError>;

    async fn set_scene_visibility(
        &self,
        session_id: SessionId,
        visible: bool,
    ) -> Result<(), StoreError>;

    async fn set_background_audio(
        &self,
        session_id: SessionId,
        url: Option<String>,
    ) -> Result<(), StoreError>;

    async fn subscribe(
        &self,
        session_id: SessionId,
    ) -> Result<UnboundedReceiver<StoreNotification>, StoreError>;
}
