//! Playroom Shared - Store-facing contracts between clients and stores
//!
//! This crate contains the types that cross the store boundary:
//! - Row records (`EventRecord`, `SessionRecord`) and their conversions
//!   to and from the domain types
//! - The push-feed message enum (`StoreNotification`)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - serde, uuid, chrono, and the domain crate
//! 2. **No business logic** - pure data types and conversions
//! 3. **Raw ids on records** - domain id newtypes stay on the client side

pub mod feed;
pub mod records;

pub use feed::StoreNotification;
pub use records::{EventRecord, SessionRecord};
