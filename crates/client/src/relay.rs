//! Discord-style webhook relay adapter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::ports::{ChatRelay, RelayError, RelayNote};

/// Posts notes to a Discord-compatible webhook endpoint.
#[derive(Clone)]
pub struct DiscordWebhook {
    client: Client,
    endpoint: String,
}

impl DiscordWebhook {
    pub fn new(endpoint: &str) -> Self {
        // Webhook calls should fail fast rather than hold up the task
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    username: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
}

#[async_trait]
impl ChatRelay for DiscordWebhook {
    async fn post(&self, note: &RelayNote) -> Result<(), RelayError> {
        let payload = WebhookPayload {
            username: &note.display_name,
            content: &note.body,
            avatar_url: note.avatar_url.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RelayError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Fire a note without awaiting it.
///
/// The push is best-effort by contract: failures are logged and dropped,
/// never retried, never surfaced to the user, and the operation that
/// produced the note has already completed.
pub fn dispatch(relay: Option<&Arc<dyn ChatRelay>>, note: RelayNote) {
    let Some(relay) = relay else {
        return;
    };
    let relay = Arc::clone(relay);
    tokio::spawn(async move {
        if let Err(error) = relay.post(&note).await {
            tracing::warn!(%error, "chat relay push failed");
        }
    });
}
