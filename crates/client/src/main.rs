//! Playroom Client - scripted demo session.
//!
//! Runs a GM and a player against the in-memory store and walks through
//! the sync engine: optimistic sends, dice checks, debounced scene edits,
//! moderation, and unread tracking. Set `PLAYROOM_WEBHOOK_URL` to also
//! relay the script to a real Discord channel.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playroom_client::{
    ChatRelay, ClientConfig, DiscordWebhook, InMemoryStore, SceneView, SessionClient, SystemClock,
};
use playroom_domain::{
    ActorContext, CharacterId, CharacterSummary, Role, SceneField, SessionId, SpeakerIdentity,
    UserId,
};
use playroom_shared::SessionRecord;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playroom_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Playroom demo session");

    let clock = Arc::new(SystemClock);
    let store = Arc::new(InMemoryStore::new(clock.clone()));

    // Seed one session with a single rostered character.
    let session_id = SessionId::new();
    let edwin = CharacterId::new();
    store
        .put_session(
            SessionRecord::new(session_id, "The Haunting, night two").with_roster(vec![
                CharacterSummary::new(edwin, "Edwin Marsh")
                    .with_avatar("https://example.invalid/edwin.png"),
            ]),
        )
        .await;

    let relay: Option<Arc<dyn ChatRelay>> = match std::env::var("PLAYROOM_WEBHOOK_URL") {
        Ok(url) if !url.trim().is_empty() => {
            tracing::info!("relaying to Discord webhook");
            Some(Arc::new(DiscordWebhook::new(url.trim())))
        }
        _ => None,
    };

    // Short quiet period so the debounce is visible in a short script.
    let config = ClientConfig {
        scene_quiet_period: Duration::from_millis(300),
    };

    let gm_actor = ActorContext::new(UserId::new(), Role::Gm, "june");
    let (mut gm, mut gm_notices) = SessionClient::connect(
        store.clone(),
        relay.clone(),
        clock.clone(),
        StdRng::from_entropy(),
        gm_actor,
        session_id,
        config.clone(),
    )
    .await?;

    let player_actor = ActorContext::new(UserId::new(), Role::Player, "theo")
        .with_avatar("https://example.invalid/theo.png")
        .with_character(edwin);
    let (mut player, mut player_notices) = SessionClient::connect(
        store.clone(),
        relay,
        clock,
        StdRng::from_entropy(),
        player_actor,
        session_id,
        config,
    )
    .await?;

    // Opening narration and table chatter.
    gm.send_message(
        &SpeakerIdentity::Narrator,
        "Rain hammers the boarding house windows. Something shifts upstairs.",
    )
    .await?;
    player
        .send_message(
            &SpeakerIdentity::Character { id: edwin },
            "I take the stairs slowly, lamp raised.",
        )
        .await?;
    player
        .send_message(&SpeakerIdentity::SelfOoc, "if this goes wrong it was nice knowing you all")
        .await?;

    // A check under the player's active character.
    player.roll_check("Listen", 55, 0).await?;

    // The GM hides the scene sheet to prep the next location, typing in
    // bursts; only the final value is written.
    gm.set_scene_visibility(false).await?;
    gm.edit_scene_field(SceneField::Location, "Corbitt").await?;
    gm.edit_scene_field(SceneField::Location, "Corbitt Hou").await?;
    gm.edit_scene_field(SceneField::Location, "Corbitt House, upstairs landing")
        .await?;
    gm.edit_scene_field(SceneField::Description, "The lamp gutters. The door at the end is ajar.")
        .await?;
    tokio::time::sleep(Duration::from_millis(800)).await;
    gm.set_scene_visibility(true).await?;

    // Let the echoes land on both clients.
    tokio::time::sleep(Duration::from_millis(100)).await;
    gm.pump_feed().await;
    player.pump_feed().await;

    // The GM hides the out-of-character aside.
    if let Some(aside) = gm
        .timeline()
        .into_iter()
        .find(|entry| entry.event.body.contains("nice knowing you"))
    {
        gm.set_event_hidden(aside.event.id, true).await?;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    gm.pump_feed().await;
    player.pump_feed().await;

    print_view("gm", &gm).await;
    print_view("player", &player).await;

    while let Ok(notice) = gm_notices.try_recv() {
        tracing::info!(level = ?notice.level, "gm notice: {}", notice.message);
    }
    while let Ok(notice) = player_notices.try_recv() {
        tracing::info!(level = ?notice.level, "player notice: {}", notice.message);
    }

    tracing::info!("demo complete");
    Ok(())
}

async fn print_view(who: &str, client: &SessionClient) {
    tracing::info!("--- timeline as seen by {who} ---");
    for entry in client.timeline() {
        tracing::info!(
            "[{}] {:?} {}: {}",
            entry.event.created_at.format("%H:%M:%S"),
            entry.delivery,
            entry.event.speaker_name,
            entry.event.body
        );
    }
    match client.scene_view().await {
        SceneView::Visible(scene) => {
            tracing::info!("scene ({who}): {} - {}", scene.location, scene.description);
        }
        SceneView::Locked => tracing::info!("scene ({who}): not yet revealed"),
    }
    let unread = client.unread();
    tracing::info!("unread ({who}): main={} side={}", unread.main, unread.side);
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
