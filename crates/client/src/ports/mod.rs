//! Port traits for the client's infrastructure boundaries.
//!
//! These are the ONLY abstractions in the client. Everything else is
//! concrete types. Ports exist for:
//! - The session store (in-memory today, any document store tomorrow)
//! - The outbound chat relay (Discord-style webhook)
//! - Clock (for testing)

mod clock;
mod error;
mod relay;
mod store;

pub use clock::{ClockPort, SystemClock};
pub use error::{RelayError, StoreError};
pub use relay::{ChatRelay, RelayNote};
pub use store::SessionStore;

#[cfg(test)]
pub use clock::FixedClock;
#[cfg(test)]
pub use relay::MockChatRelay;
#[cfg(test)]
pub use store::MockSessionStore;
