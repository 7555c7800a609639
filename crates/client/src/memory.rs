//! In-memory session store.
//!
//! The reference store for the demo binary and the integration tests:
//! rows live in process memory, `created_at` is stamped from the injected
//! clock on insert, and every mutation is pushed to all subscribers of
//! the session, the writer included.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use uuid::Uuid;

use playroom_domain::{EventId, SceneField, SessionId};
use playroom_shared::{EventRecord, SessionRecord, StoreNotification};

use crate::ports::{ClockPort, SessionStore, StoreError};

#[derive(Default)]
struct Tables {
    sessions: HashMap<Uuid, SessionRecord>,
    /// Per-session rows in arrival order; arrival order is the
    /// authoritative tie-break
    events: HashMap<Uuid, Vec<EventRecord>>,
    subscribers: HashMap<Uuid, Vec<UnboundedSender<StoreNotification>>>,
}

impl Tables {
    fn session_mut(&mut self, session_id: SessionId) -> Result<&mut SessionRecord, StoreError> {
        self.sessions
            .get_mut(&session_id.to_uuid())
            .ok_or_else(|| StoreError::not_found("Session", session_id))
    }

    /// Push a notification to every live subscriber of the session,
    /// dropping hung-up ones.
    fn broadcast(&mut self, session_id: Uuid, notification: StoreNotification) {
        if let Some(senders) = self.subscribers.get_mut(&session_id) {
            senders.retain(|sender| sender.send(notification.clone()).is_ok());
        }
    }
}

/// An ordered store with push notifications, all in process memory.
pub struct InMemoryStore {
    clock: Arc<dyn ClockPort>,
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            clock,
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Create or replace a session row. Seeding for demos and tests.
    pub async fn put_session(&self, record: SessionRecord) {
        let mut tables = self.tables.write().await;
        tables.events.entry(record.id).or_default();
        tables.sessions.insert(record.id, record);
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn load_session(&self, session_id: SessionId) -> Result<SessionRecord, StoreError> {
        let tables = self.tables.read().await;
        tables
            .sessions
            .get(&session_id.to_uuid())
            .cloned()
            .ok_or_else(|| StoreError::not_found("Session", session_id))
    }

    async fn load_events(&self, session_id: SessionId) -> Result<Vec<EventRecord>, StoreError> {
        let tables = self.tables.read().await;
        if !tables.sessions.contains_key(&session_id.to_uuid()) {
            return Err(StoreError::not_found("Session", session_id));
        }
        Ok(tables
            .events
            .get(&session_id.to_uuid())
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_event(&self, event: &EventRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.sessions.contains_key(&event.session_id) {
            return Err(StoreError::not_found("Session", event.session_id));
        }

        let rows = tables.events.entry(event.session_id).or_default();
        if rows.iter().any(|row| row.id == event.id) {
            return Err(StoreError::backend("insert_event", "duplicate event id"));
        }

        let mut row = event.clone();
        row.created_at = self.clock.now();
        rows.push(row.clone());

        tables.broadcast(event.session_id, StoreNotification::EventInserted { event: row });
        Ok(())
    }

    async fn set_event_hidden(
        &self,
        session_id: SessionId,
        event_id: EventId,
        hidden: bool,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .events
            .get_mut(&session_id.to_uuid())
            .ok_or_else(|| StoreError::not_found("Session", session_id))?;
        let row = rows
            .iter_mut()
            .find(|row| row.id == event_id.to_uuid())
            .ok_or_else(|| StoreError::not_found("Event", event_id))?;

        row.hidden = hidden;
        let row = row.clone();
        tables.broadcast(session_id.to_uuid(), StoreNotification::EventModified { event: row });
        Ok(())
    }

    async fn update_scene_field(
        &self,
        session_id: SessionId,
        field: SceneField,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let session = tables.session_mut(session_id)?;
        session.scene.set_field(field, value);
        let session = session.clone();
        tables.broadcast(session_id.to_uuid(), StoreNotification::SessionChanged { session });
        Ok(())
    }

    async fn set_scene_visibility(
        &self,
        session_id: SessionId,
        visible: bool,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let session = tables.session_mut(session_id)?;
        session.scene.visible_to_players = visible;
        let session = session.clone();
        tables.broadcast(session_id.to_uuid(), StoreNotification::SessionChanged { session });
        Ok(())
    }

    async fn set_background_audio(
        &self,
        session_id: SessionId,
        url: Option<String>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let session = tables.session_mut(session_id)?;
        session.background_audio_url = url;
        let session = session.clone();
        tables.broadcast(session_id.to_uuid(), StoreNotification::SessionChanged { session });
        Ok(())
    }

    async fn subscribe(
        &self,
        session_id: SessionId,
    ) -> Result<UnboundedReceiver<StoreNotification>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.sessions.contains_key(&session_id.to_uuid()) {
            return Err(StoreError::not_found("Session", session_id));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        tables
            .subscribers
            .entry(session_id.to_uuid())
            .or_default()
            .push(tx);
        Ok(rx)
    }
}
