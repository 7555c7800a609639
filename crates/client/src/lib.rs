//! Playroom Client - live session sync engine.
//!
//! Everything a connected table client keeps between the store and the
//! screen: the optimistic event log, the debounced scene synchronizer,
//! unread tracking, and the ports the adapters plug into. The crate also
//! ships an in-memory store adapter and the Discord webhook relay.

pub mod error;
pub mod log;
pub mod memory;
pub mod ports;
pub mod relay;
pub mod scene;
pub mod session;
pub mod unread;


// Re-export the surface a UI layer works with.
pub use error::{ClientError, Notice, NoticeLevel};
pub use log::{DeliveryState, EventLog, TimelineEntry, HIDDEN_PLACEHOLDER};
pub use memory::InMemoryStore;
pub use ports::{
    ChatRelay, ClockPort, RelayError, RelayNote, SessionStore, StoreError, SystemClock,
};
pub use relay::DiscordWebhook;
pub use scene::{SceneSynchronizer, SceneView, SCENE_QUIET_PERIOD};
pub use session::{ClientConfig, SessionClient};
pub use unread::{UnreadFlags, UnreadTracker};
