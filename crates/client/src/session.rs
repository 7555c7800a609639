//! The per-client sync coordinator.
//!
//! One `SessionClient` per connected participant. It owns the local event
//! log, the scene synchronizer, the unread tracker, and the ports, and it
//! is the only place store failures are translated into the client error
//! taxonomy. Everything the UI renders comes out of its read views;
//! everything the user does goes in through its operations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use playroom_domain::{
    change_summary, diff_resources, resolve_speaker, rules, ActorContext, Channel, CharacterId,
    CharacterSheet, CharacterSummary, EventId, EventKind, SceneField, SessionEvent, SessionId,
    SkillCheck, SpeakerIdentity, SpeakerProfile,
};
use playroom_shared::{EventRecord, SessionRecord, StoreNotification};

use crate::error::{ClientError, Notice};
use crate::log::{EventLog, TimelineEntry};
use crate::ports::{ChatRelay, ClockPort, RelayNote, SessionStore};
use crate::relay;
use crate::scene::{SceneSynchronizer, SceneView, SCENE_QUIET_PERIOD};
use crate::unread::{UnreadFlags, UnreadTracker};

/// Tunables a caller can override when connecting.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Quiet period before a scene field edit is written out
    pub scene_quiet_period: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scene_quiet_period: SCENE_QUIET_PERIOD,
        }
    }
}

/// A connected participant's view of one session.
pub struct SessionClient {
    session_id: SessionId,
    actor: ActorContext,
    store: Arc<dyn SessionStore>,
    relay: Option<Arc<dyn ChatRelay>>,
    clock: Arc<dyn ClockPort>,
    rng: StdRng,
    session: SessionRecord,
    roster: HashMap<CharacterId, CharacterSummary>,
    log: EventLog,
    scene: SceneSynchronizer,
    unread: UnreadTracker,
    feed: UnboundedReceiver<StoreNotification>,
    notices: UnboundedSender<Notice>,
}

impl SessionClient {
    /// Load the session, subscribe to its feed, and build the local state.
    ///
    /// Returns the client and the receiving end of its notice channel;
    /// transient toasts for this viewer come out of the receiver.
    pub async fn connect(
        store: Arc<dyn SessionStore>,
        relay: Option<Arc<dyn ChatRelay>>,
        clock: Arc<dyn ClockPort>,
        rng: StdRng,
        actor: ActorContext,
        session_id: SessionId,
        config: ClientConfig,
    ) -> Result<(Self, UnboundedReceiver<Notice>), ClientError> {
        let session = store.load_session(session_id).await?;
        let records = store.load_events(session_id).await?;
        let feed = store.subscribe(session_id).await?;

        let mut log = EventLog::new();
        for record in records {
            log.merge_confirmed(SessionEvent::from(record));
        }

        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let scene = SceneSynchronizer::new(
            session_id,
            Arc::clone(&store),
            notices_tx.clone(),
            config.scene_quiet_period,
            session.scene.clone(),
        );
        let unread = UnreadTracker::new(Channel::Main, clock.now());
        let roster = session.roster_index();

        tracing::info!(
            session = %session_id,
            name = %session.name,
            role = ?actor.role,
            backlog = log.len(),
            "joined session"
        );

        Ok((
            Self {
                session_id,
                actor,
                store,
                relay,
                clock,
                rng,
                session,
                roster,
                log,
                scene,
                unread,
                feed,
                notices: notices_tx,
            },
            notices_rx,
        ))
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Post a message under the given speaker identity.
    pub async fn send_message(
        &mut self,
        identity: &SpeakerIdentity,
        body: &str,
    ) -> Result<EventId, ClientError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ClientError::validation("message body cannot be empty"));
        }

        let profile = resolve_speaker(identity, &self.actor, &self.roster)?;
        let mut event = SessionEvent::new(
            self.session_id,
            self.actor.user_id,
            profile.display_name.clone(),
            profile.kind,
            body,
            self.clock.now(),
        );
        if let Some(url) = &profile.avatar_url {
            event = event.with_avatar(url.clone());
        }

        let note = self.note_for(&profile, body.to_string());
        self.submit(event, Some(note), "Could not send the message")
            .await
    }

    /// Roll a percentile check as the actor's active character and post
    /// the result.
    ///
    /// Out-of-range targets and modifiers are clamped here; the rules
    /// engine itself has no error path.
    pub async fn roll_check(
        &mut self,
        label: &str,
        target: i32,
        modifier: i8,
    ) -> Result<EventId, ClientError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ClientError::validation("check label cannot be empty"));
        }
        let profile = self.dice_speaker()?;

        let target = rules::clamp_target(target);
        let modifier = rules::clamp_modifier(modifier);
        let result = rules::roll(target, modifier, &mut self.rng);
        let check = SkillCheck::new(label, target, result);

        let mut event = SessionEvent::new(
            self.session_id,
            self.actor.user_id,
            profile.display_name.clone(),
            EventKind::DiceRoll,
            check.to_string(),
            self.clock.now(),
        )
        .with_dice(check.clone());
        if let Some(url) = &profile.avatar_url {
            event = event.with_avatar(url.clone());
        }

        let note = self.note_for(&profile, check.summary());
        self.submit(event, Some(note), "Could not post the check")
            .await
    }

    /// Roll against a sheet: the trained rating when the sheet has one,
    /// the skill's base value otherwise.
    pub async fn roll_sheet_check(
        &mut self,
        label: &str,
        sheet: &CharacterSheet,
        modifier: i8,
    ) -> Result<EventId, ClientError> {
        let target = sheet.check_target(label.trim());
        self.roll_check(label, target, modifier).await
    }

    /// GM moderation: hide or reveal an event. Optimistic, reverted if
    /// the store refuses.
    pub async fn set_event_hidden(
        &mut self,
        event_id: EventId,
        hidden: bool,
    ) -> Result<(), ClientError> {
        self.require_gm("hide or reveal events")?;

        let prior = self
            .log
            .set_hidden(event_id, hidden)
            .ok_or_else(|| ClientError::stale("Event", event_id))?;

        match self
            .store
            .set_event_hidden(self.session_id, event_id, hidden)
            .await
        {
            Ok(()) => {
                self.notify(Notice::success(if hidden {
                    "Event hidden"
                } else {
                    "Event revealed"
                }));
                Ok(())
            }
            Err(error) => {
                self.log.set_hidden(event_id, prior);
                self.notify(Notice::error("Could not change the event"));
                Err(error.into())
            }
        }
    }

    /// GM-only optimistic scene edit; the store write is debounced per
    /// field by the scene synchronizer.
    pub async fn edit_scene_field(
        &mut self,
        field: SceneField,
        value: &str,
    ) -> Result<(), ClientError> {
        self.require_gm("edit the scene")?;
        self.scene.edit_field(field, value).await;
        Ok(())
    }

    /// GM-only visibility toggle, optimistic with revert.
    pub async fn set_scene_visibility(&mut self, visible: bool) -> Result<(), ClientError> {
        self.require_gm("change scene visibility")?;

        match self.scene.set_visibility(visible).await {
            Ok(()) => {
                self.notify(Notice::success(if visible {
                    "Scene revealed to players"
                } else {
                    "Scene hidden from players"
                }));
                Ok(())
            }
            Err(error) => {
                self.notify(Notice::error("Could not change scene visibility"));
                Err(error.into())
            }
        }
    }

    /// GM-only background audio reference update. Optimistic and not
    /// reverted on failure; the next session snapshot settles it.
    pub async fn set_background_audio(&mut self, url: Option<String>) -> Result<(), ClientError> {
        self.require_gm("change the background audio")?;

        self.session.background_audio_url = url.clone();
        if let Err(error) = self.store.set_background_audio(self.session_id, url).await {
            self.notify(Notice::error("Could not change the background audio"));
            return Err(error.into());
        }
        Ok(())
    }

    /// Post the resource changes between two sheet snapshots as a Speech
    /// event by that character. No-op when nothing tracked moved.
    pub async fn announce_sheet_changes(
        &mut self,
        character_id: CharacterId,
        before: &CharacterSheet,
        after: &CharacterSheet,
    ) -> Result<Option<EventId>, ClientError> {
        let changes = diff_resources(before, after);
        if changes.is_empty() {
            return Ok(None);
        }
        let summary = change_summary(&changes);

        let profile = resolve_speaker(
            &SpeakerIdentity::Character { id: character_id },
            &self.actor,
            &self.roster,
        )?;

        let mut event = SessionEvent::new(
            self.session_id,
            self.actor.user_id,
            profile.display_name.clone(),
            EventKind::Speech,
            summary.clone(),
            self.clock.now(),
        );
        if let Some(url) = &profile.avatar_url {
            event = event.with_avatar(url.clone());
        }

        // Announcements go out under the character's "(System)" voice.
        let mut note = RelayNote::new(format!("{} (System)", profile.display_name), summary);
        if let Some(url) = &profile.avatar_url {
            note = note.with_avatar(url.clone());
        }

        self.submit(event, Some(note), "Could not post the stat change")
            .await
            .map(Some)
    }

    /// Switch the viewer's active tab, clearing its unread flag.
    pub fn set_active_channel(&mut self, channel: Channel) {
        self.unread.switch_to(channel, self.clock.now());
    }

    /// Drain and apply everything the feed has delivered. Returns how
    /// many notifications were applied.
    pub async fn pump_feed(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(notification) = self.feed.try_recv() {
            self.apply(notification).await;
            applied += 1;
        }
        applied
    }

    // =========================================================================
    // Read views
    // =========================================================================

    /// The ordered timeline as this viewer is allowed to see it.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        self.log.timeline(self.actor.role)
    }

    /// Confirmed, non-hidden events for export.
    pub fn transcript(&self, include_side_chat: bool) -> Vec<SessionEvent> {
        self.log.transcript(include_side_chat)
    }

    /// The scene as this viewer is allowed to see it.
    pub async fn scene_view(&self) -> SceneView {
        self.scene.view_for(self.actor.role).await
    }

    pub fn unread(&self) -> UnreadFlags {
        self.unread.flags()
    }

    pub fn active_channel(&self) -> Channel {
        self.unread.active()
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn session_name(&self) -> &str {
        &self.session.name
    }

    pub fn background_audio_url(&self) -> Option<&str> {
        self.session.background_audio_url.as_deref()
    }

    pub fn actor(&self) -> &ActorContext {
        &self.actor
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Append optimistically, submit, and either relay or roll back.
    async fn submit(
        &mut self,
        event: SessionEvent,
        note: Option<RelayNote>,
        failure_notice: &str,
    ) -> Result<EventId, ClientError> {
        let event_id = event.id;
        self.log.append_pending(event.clone());

        match self.store.insert_event(&EventRecord::from(&event)).await {
            Ok(()) => {
                if let Some(note) = note {
                    relay::dispatch(self.relay.as_ref(), note);
                }
                Ok(event_id)
            }
            Err(error) => {
                self.log.reject(event_id);
                tracing::warn!(%error, kind = ?event.kind, "event submission rejected");
                self.notify(Notice::error(failure_notice));
                Err(error.into())
            }
        }
    }

    async fn apply(&mut self, notification: StoreNotification) {
        match notification {
            StoreNotification::EventInserted { event } => {
                let event = SessionEvent::from(event);
                let channel = event.channel();
                let created_at = event.created_at;
                tracing::debug!(id = %event.id, kind = ?event.kind, "feed insert merged");
                self.log.merge_confirmed(event);
                self.unread.observe(channel, created_at, self.clock.now());
            }
            StoreNotification::EventModified { event } => {
                tracing::debug!(id = %event.id, "feed modification merged");
                self.log.merge_confirmed(SessionEvent::from(event));
            }
            StoreNotification::SessionChanged { session } => {
                self.scene.apply_snapshot(session.scene.clone()).await;
                self.roster = session.roster_index();
                self.session = session;
            }
        }
    }

    /// Dice events speak as the active character.
    fn dice_speaker(&self) -> Result<SpeakerProfile, ClientError> {
        let character_id = self
            .actor
            .active_character
            .ok_or_else(|| ClientError::validation("no active character to roll as"))?;
        resolve_speaker(
            &SpeakerIdentity::Character { id: character_id },
            &self.actor,
            &self.roster,
        )
        .map_err(Into::into)
    }

    fn note_for(&self, profile: &SpeakerProfile, body: String) -> RelayNote {
        let mut note = RelayNote::new(profile.relay_name.clone(), body);
        if let Some(url) = &profile.avatar_url {
            note = note.with_avatar(url.clone());
        }
        note
    }

    fn require_gm(&self, action: &str) -> Result<(), ClientError> {
        if self.actor.role.is_gm() {
            Ok(())
        } else {
            Err(ClientError::validation(format!("only the GM can {action}")))
        }
    }

    fn notify(&self, notice: Notice) {
        let _ = self.notices.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;

    use playroom_domain::{Role, UserId};

    use crate::error::NoticeLevel;
    use crate::log::DeliveryState;
    use crate::ports::{FixedClock, MockSessionStore, RelayError, StoreError};

    struct RecordingRelay(UnboundedSender<RelayNote>);

    #[async_trait]
    impl ChatRelay for RecordingRelay {
        async fn post(&self, note: &RelayNote) -> Result<(), RelayError> {
            self.0
                .send(note.clone())
                .map_err(|_| RelayError::request("closed"))
        }
    }

    struct Harness {
        client: SessionClient,
        notices: UnboundedReceiver<Notice>,
        feed: UnboundedSender<StoreNotification>,
        relayed: UnboundedReceiver<RelayNote>,
        character_id: CharacterId,
    }

    async fn harness(
        role: Role,
        with_character: bool,
        configure: impl FnOnce(&mut MockSessionStore),
    ) -> Harness {
        let session_id = SessionId::new();
        let character_id = CharacterId::new();

        let record = SessionRecord::new(session_id, "Thursday Table").with_roster(vec![
            CharacterSummary::new(character_id, "Edwin Marsh").with_avatar("https://cdn/edwin.png"),
        ]);

        let mut actor = ActorContext::new(UserId::new(), role, "june");
        if with_character {
            actor = actor.with_character(character_id);
        }

        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        let mut store = MockSessionStore::new();
        store
            .expect_load_session()
            .return_once(move |_| Ok(record));
        store.expect_load_events().return_once(|_| Ok(Vec::new()));
        store
            .expect_subscribe()
            .return_once(move |_| Ok(feed_rx));
        configure(&mut store);

        let (relay_tx, relay_rx) = mpsc::unbounded_channel();
        let clock = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).single().expect("valid");

        let (client, notices) = SessionClient::connect(
            Arc::new(store),
            Some(Arc::new(RecordingRelay(relay_tx))),
            Arc::new(FixedClock(clock)),
            StdRng::seed_from_u64(11),
            actor,
            session_id,
            ClientConfig::default(),
        )
        .await
        .expect("connected");

        Harness {
            client,
            notices,
            feed: feed_tx,
            relayed: relay_rx,
            character_id,
        }
    }

    fn confirmed_record(client: &SessionClient, kind: EventKind, body: &str) -> EventRecord {
        let event = SessionEvent::new(
            client.session_id(),
            UserId::new(),
            "someone",
            kind,
            body,
            Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 5).single().expect("valid"),
        );
        EventRecord::from(&event)
    }

    async fn recv_relayed(harness: &mut Harness) -> RelayNote {
        tokio::time::timeout(Duration::from_secs(1), harness.relayed.recv())
            .await
            .expect("relay fired")
            .expect("relay channel open")
    }

    #[tokio::test]
    async fn empty_message_never_reaches_the_store() {
        let mut h = harness(Role::Player, false, |_| {}).await;

        let result = h.client.send_message(&SpeakerIdentity::SelfOoc, "   ").await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert!(h.client.timeline().is_empty());
    }

    #[tokio::test]
    async fn message_is_pending_until_the_echo_confirms_it() {
        let mut h = harness(Role::Player, false, |store| {
            store.expect_insert_event().times(1).returning(|_| Ok(()));
        })
        .await;

        let event_id = h
            .client
            .send_message(&SpeakerIdentity::SelfOoc, "anyone seen my pencil?")
            .await
            .expect("sent");

        let timeline = h.client.timeline();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].delivery, DeliveryState::Pending);
        assert_eq!(timeline[0].event.kind, EventKind::SideChat);

        // The store's echo carries the authoritative stamp.
        let mut record = EventRecord::from(&timeline[0].event);
        record.created_at = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 1).single().expect("valid");
        h.feed
            .send(StoreNotification::EventInserted { event: record })
            .expect("feed open");
        assert_eq!(h.client.pump_feed().await, 1);

        let timeline = h.client.timeline();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].delivery, DeliveryState::Confirmed);
        assert_eq!(timeline[0].event.id, event_id);

        let note = recv_relayed(&mut h).await;
        assert_eq!(note.display_name, "june (OOC)");
        assert_eq!(note.body, "anyone seen my pencil?");
    }

    #[tokio::test]
    async fn failed_insert_rolls_the_entry_back() {
        let mut h = harness(Role::Player, false, |store| {
            store
                .expect_insert_event()
                .times(1)
                .returning(|_| Err(StoreError::backend("insert_event", "connection reset")));
        })
        .await;

        let result = h
            .client
            .send_message(&SpeakerIdentity::SelfOoc, "did that go through?")
            .await;
        assert!(matches!(result, Err(ClientError::Submission(_))));
        assert!(h.client.timeline().is_empty());

        let notice = h.notices.try_recv().expect("notice raised");
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn roll_check_posts_formula_dice_and_relay_summary() {
        let mut h = harness(Role::Player, true, |store| {
            store.expect_insert_event().times(1).returning(|_| Ok(()));
        })
        .await;

        h.client
            .roll_check("Spot Hidden", 45, 0)
            .await
            .expect("rolled");

        let timeline = h.client.timeline();
        assert_eq!(timeline.len(), 1);
        let event = &timeline[0].event;
        assert_eq!(event.kind, EventKind::DiceRoll);
        assert_eq!(event.speaker_name, "Edwin Marsh");
        assert_eq!(event.body, "Spot Hidden 1d100 <= 45");
        let check = event.dice.as_ref().expect("dice attached");
        assert_eq!(check.target, 45);
        assert!((1..=100).contains(&check.result.total));

        let note = recv_relayed(&mut h).await;
        assert_eq!(note.display_name, "Edwin Marsh (june)");
        assert!(note.body.starts_with("🎲 [Spot Hidden]"));
    }

    #[tokio::test]
    async fn rolling_without_a_character_is_a_validation_error() {
        let mut h = harness(Role::Player, false, |_| {}).await;

        let result = h.client.roll_check("Listen", 40, 0).await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn sheet_rolls_fall_back_to_base_values() {
        let mut h = harness(Role::Player, true, |store| {
            store.expect_insert_event().times(1).returning(|_| Ok(()));
        })
        .await;

        let sheet = CharacterSheet {
            stats: Vec::new(),
            skills: HashMap::new(),
            hp: playroom_domain::ResourcePool::full(10),
            mp: playroom_domain::ResourcePool::full(10),
            san: playroom_domain::ResourcePool::full(50),
            luck: playroom_domain::ResourcePool::full(50),
        };
        h.client
            .roll_sheet_check("Spot Hidden", &sheet, 0)
            .await
            .expect("rolled");

        // Untrained Spot Hidden rolls against its base of 25.
        let timeline = h.client.timeline();
        assert_eq!(timeline[0].event.body, "Spot Hidden 1d100 <= 25");
    }

    #[tokio::test]
    async fn players_cannot_moderate_or_edit_the_scene() {
        let mut h = harness(Role::Player, false, |_| {}).await;

        let result = h.client.set_event_hidden(EventId::new(), true).await;
        assert!(matches!(result, Err(ClientError::Validation(_))));

        let result = h.client.edit_scene_field(SceneField::Location, "Elsewhere").await;
        assert!(matches!(result, Err(ClientError::Validation(_))));

        let result = h.client.set_scene_visibility(true).await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn hide_toggle_reverts_when_the_store_refuses() {
        let mut h = harness(Role::Gm, false, |store| {
            store
                .expect_set_event_hidden()
                .times(1)
                .returning(|_, _, _| Err(StoreError::backend("set_event_hidden", "offline")));
        })
        .await;

        let record = confirmed_record(&h.client, EventKind::Speech, "a slip of the tongue");
        let event_id = EventId::from_uuid(record.id);
        h.feed
            .send(StoreNotification::EventInserted { event: record })
            .expect("feed open");
        h.client.pump_feed().await;

        let result = h.client.set_event_hidden(event_id, true).await;
        assert!(matches!(result, Err(ClientError::Submission(_))));
        let timeline = h.client.timeline();
        assert!(!timeline[0].event.hidden);

        let notice = h.notices.try_recv().expect("notice raised");
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn hiding_an_unknown_event_is_a_stale_reference() {
        let mut h = harness(Role::Gm, false, |_| {}).await;

        let result = h.client.set_event_hidden(EventId::new(), true).await;
        assert!(matches!(result, Err(ClientError::StaleReference { .. })));
    }

    #[tokio::test]
    async fn stat_changes_post_and_relay_under_the_system_voice() {
        let mut h = harness(Role::Player, true, |store| {
            store.expect_insert_event().times(1).returning(|_| Ok(()));
        })
        .await;

        let before = CharacterSheet {
            stats: Vec::new(),
            skills: HashMap::new(),
            hp: playroom_domain::ResourcePool::new(10, 12),
            mp: playroom_domain::ResourcePool::full(10),
            san: playroom_domain::ResourcePool::new(55, 99),
            luck: playroom_domain::ResourcePool::full(50),
        };
        let mut after = before.clone();
        after.hp.current = 8;
        after.san.current = 50;

        let character_id = h.character_id;
        let posted = h
            .client
            .announce_sheet_changes(character_id, &before, &after)
            .await
            .expect("announced");
        assert!(posted.is_some());

        let timeline = h.client.timeline();
        assert_eq!(timeline[0].event.kind, EventKind::Speech);
        assert_eq!(timeline[0].event.body, "HP 10 -> 8, SAN 55 -> 50");

        let note = recv_relayed(&mut h).await;
        assert_eq!(note.display_name, "Edwin Marsh (System)");

        // No diff, no event.
        let none = h
            .client
            .announce_sheet_changes(character_id, &after, &after)
            .await
            .expect("no-op");
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn side_chat_arrivals_flag_until_the_tab_is_opened() {
        let mut h = harness(Role::Player, false, |_| {}).await;

        let record = confirmed_record(&h.client, EventKind::SideChat, "psst");
        h.feed
            .send(StoreNotification::EventInserted { event: record })
            .expect("feed open");
        h.client.pump_feed().await;

        assert_eq!(
            h.client.unread(),
            UnreadFlags {
                main: false,
                side: true
            }
        );

        h.client.set_active_channel(Channel::Side);
        assert_eq!(h.client.unread(), UnreadFlags::default());
    }

    #[tokio::test]
    async fn session_snapshots_update_scene_roster_and_audio() {
        let mut h = harness(Role::Player, false, |_| {}).await;

        let mut session = SessionRecord::new(h.client.session_id(), "Thursday Table")
            .with_background_audio("https://cdn/rain.ogg");
        session.scene.location = "The Gilman House".to_string();
        h.feed
            .send(StoreNotification::SessionChanged { session })
            .expect("feed open");
        h.client.pump_feed().await;

        assert_eq!(h.client.background_audio_url(), Some("https://cdn/rain.ogg"));
        match h.client.scene_view().await {
            SceneView::Visible(scene) => assert_eq!(scene.location, "The Gilman House"),
            SceneView::Locked => panic!("scene should be visible after the snapshot"),
        }
    }

    #[tokio::test]
    async fn background_audio_failure_notifies_without_revert() {
        let mut h = harness(Role::Gm, false, |store| {
            store
                .expect_set_background_audio()
                .times(1)
                .returning(|_, _| Err(StoreError::backend("set_background_audio", "offline")));
        })
        .await;

        let result = h
            .client
            .set_background_audio(Some("https://cdn/storm.ogg".to_string()))
            .await;
        assert!(matches!(result, Err(ClientError::Submission(_))));
        // The optimistic value stays; the next snapshot settles it.
        assert_eq!(h.client.background_audio_url(), Some("https://cdn/storm.ogg"));

        let notice = h.notices.try_recv().expect("notice raised");
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn roll_modifiers_and_clamping_flow_into_the_dice_payload() {
        let mut h = harness(Role::Player, true, |store| {
            store.expect_insert_event().times(2).returning(|_| Ok(()));
        })
        .await;

        h.client.roll_check("Listen", 60, 1).await.expect("rolled");
        h.client.roll_check("Listen", 250, -7).await.expect("rolled");

        let timeline = h.client.timeline();
        let bonus = timeline[0].event.dice.as_ref().expect("dice");
        let clamped = timeline[1].event.dice.as_ref().expect("dice");
        assert_eq!(bonus.result.component_rolls.len(), 2);
        assert_eq!(bonus.result.modifier, 1);
        // Target capped at 100, penalty capped at two dice.
        assert_eq!(clamped.target, 100);
        assert_eq!(clamped.result.modifier, -2);
        assert_eq!(clamped.result.component_rolls.len(), 3);
    }
}
