//! Outbound chat relay port.

use async_trait::async_trait;

use super::error::RelayError;

/// One push to the external chat relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayNote {
    pub display_name: String,
    pub body: String,
    pub avatar_url: Option<String>,
}

impl RelayNote {
    pub fn new(display_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            body: body.into(),
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// Best-effort outbound push. Callers fire it detached; a failure must
/// never block or roll back the operation that triggered it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRelay: Send + Sync {
    async fn post(&self, note: &RelayNote) -> Result<(), RelayError>;
}
