//! Scene state synchronization with debounced field writes.
//!
//! GM edits apply locally at once; the store write for a field is delayed
//! by a quiet period so per-keystroke edits coalesce into one write
//! carrying the latest value. Remote snapshots overwrite local state
//! wholesale: last write wins, no field-level merge.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use playroom_domain::{Role, SceneField, SceneState, SessionId};

use crate::error::Notice;
use crate::ports::{SessionStore, StoreError};

/// Default quiet period before an edited field is written out.
pub const SCENE_QUIET_PERIOD: Duration = Duration::from_secs(1);

/// What a viewer gets to see of the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneView {
    Visible(SceneState),
    /// Shown to players while the GM keeps the scene hidden
    Locked,
}

#[derive(Debug)]
struct SceneCell {
    /// What the viewer sees right now, optimistic edits included
    local: SceneState,
    /// Last state acknowledged by the store, the revert target
    confirmed: SceneState,
}

/// Owns the scene state of one session and the write scheduling for it.
pub struct SceneSynchronizer {
    session_id: SessionId,
    store: Arc<dyn SessionStore>,
    notices: UnboundedSender<Notice>,
    quiet_period: Duration,
    cell: Arc<Mutex<SceneCell>>,
    pending: HashMap<SceneField, JoinHandle<()>>,
}

impl SceneSynchronizer {
    pub fn new(
        session_id: SessionId,
        store: Arc<dyn SessionStore>,
        notices: UnboundedSender<Notice>,
        quiet_period: Duration,
        initial: SceneState,
    ) -> Self {
        Self {
            session_id,
            store,
            notices,
            quiet_period,
            cell: Arc::new(Mutex::new(SceneCell {
                local: initial.clone(),
                confirmed: initial,
            })),
            pending: HashMap::new(),
        }
    }

    /// Apply one field edit locally and (re)schedule its store write.
    ///
    /// An earlier pending write for the same field is cancelled, so only
    /// the latest value goes out once the field has been quiet long
    /// enough. A failed write reverts the field to the last confirmed
    /// value and raises an error notice.
    pub async fn edit_field(&mut self, field: SceneField, value: &str) {
        {
            let mut cell = self.cell.lock().await;
            cell.local.set_field(field, value);
        }

        if let Some(handle) = self.pending.remove(&field) {
            handle.abort();
        }

        let store = Arc::clone(&self.store);
        let cell = Arc::clone(&self.cell);
        let notices = self.notices.clone();
        let session_id = self.session_id;
        let quiet_period = self.quiet_period;
        let value = value.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            match store.update_scene_field(session_id, field, &value).await {
                Ok(()) => {
                    let mut cell = cell.lock().await;
                    cell.confirmed.set_field(field, &value);
                    tracing::debug!(field = field.label(), "scene field write landed");
                }
                Err(error) => {
                    let mut cell = cell.lock().await;
                    // Leave the field alone if a newer edit already replaced it.
                    if cell.local.field(field) == value {
                        let confirmed = cell.confirmed.field(field).to_string();
                        cell.local.set_field(field, &confirmed);
                    }
                    tracing::warn!(
                        field = field.label(),
                        %error,
                        "scene field write failed, reverted"
                    );
                    let _ = notices.send(Notice::error(format!(
                        "Could not save the scene {}",
                        field.label()
                    )));
                }
            }
        });
        self.pending.insert(field, handle);
    }

    /// Flip the player-visibility flag, optimistically, reverting on a
    /// failed store write.
    pub async fn set_visibility(&mut self, visible: bool) -> Result<(), StoreError> {
        let prior = {
            let mut cell = self.cell.lock().await;
            let prior = cell.local.visible_to_players;
            cell.local.visible_to_players = visible;
            prior
        };

        match self.store.set_scene_visibility(self.session_id, visible).await {
            Ok(()) => {
                let mut cell = self.cell.lock().await;
                cell.confirmed.visible_to_players = visible;
                Ok(())
            }
            Err(error) => {
                let mut cell = self.cell.lock().await;
                cell.local.visible_to_players = prior;
                Err(error)
            }
        }
    }

    /// Overwrite local state wholesale with a store snapshot.
    pub async fn apply_snapshot(&mut self, scene: SceneState) {
        let mut cell = self.cell.lock().await;
        cell.confirmed = scene.clone();
        cell.local = scene;
    }

    /// Current local state, optimistic edits included.
    pub async fn current(&self) -> SceneState {
        self.cell.lock().await.local.clone()
    }

    /// The scene as one viewer is allowed to see it.
    pub async fn view_for(&self, role: Role) -> SceneView {
        let scene = self.current().await;
        if scene.visible_to_players || role.is_gm() {
            SceneView::Visible(scene)
        } else {
            SceneView::Locked
        }
    }
}

impl Drop for SceneSynchronizer {
    fn drop(&mut self) {
        for handle in self.pending.values() {
            handle.abort();
        }
    }
}
