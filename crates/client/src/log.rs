//! Ordered per-session event log with optimistic local entries.
//!
//! Local submissions land here immediately as `Pending`; the store's echo
//! later confirms them by id. Everything stays sorted by `created_at`
//! ascending, with arrival order breaking ties.

use playroom_domain::{Channel, EventId, Role, SessionEvent};

/// Body shown to players in place of a hidden event.
pub const HIDDEN_PLACEHOLDER: &str = "[Hidden by the GM]";

/// Delivery state of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// Applied locally, not yet confirmed by the store
    Pending,
    /// Arrived through the authoritative feed
    Confirmed,
}

/// One renderable row of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub event: SessionEvent,
    pub delivery: DeliveryState,
    /// True when the body was replaced by [`HIDDEN_PLACEHOLDER`]
    pub redacted: bool,
}

#[derive(Debug, Clone)]
struct Slot {
    event: SessionEvent,
    delivery: DeliveryState,
}

/// The ordered event collection for one session.
///
/// The vector itself is the display order; ties on `created_at` keep the
/// order the entries arrived in.
#[derive(Debug, Default)]
pub struct EventLog {
    slots: Vec<Slot>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: EventId) -> Option<&SessionEvent> {
        self.slots
            .iter()
            .find(|slot| slot.event.id == id)
            .map(|slot| &slot.event)
    }

    pub fn delivery(&self, id: EventId) -> Option<DeliveryState> {
        self.slots
            .iter()
            .find(|slot| slot.event.id == id)
            .map(|slot| slot.delivery)
    }

    /// Apply a local submission before the store has confirmed it.
    pub fn append_pending(&mut self, event: SessionEvent) {
        self.insert_ordered(Slot {
            event,
            delivery: DeliveryState::Pending,
        });
    }

    /// Fold one confirmed event from the feed into the log.
    ///
    /// A matching entry is replaced in place, which keeps the echo of our
    /// own submission from duplicating it. The entry only moves if the
    /// authoritative timestamp breaks the ordering invariant. Unknown ids
    /// are inserted at their ordered position.
    pub fn merge_confirmed(&mut self, event: SessionEvent) {
        if let Some(index) = self.position(event.id) {
            self.slots[index].event = event;
            self.slots[index].delivery = DeliveryState::Confirmed;
            if !self.ordered_at(index) {
                let slot = self.slots.remove(index);
                self.insert_ordered(slot);
            }
        } else {
            self.insert_ordered(Slot {
                event,
                delivery: DeliveryState::Confirmed,
            });
        }
    }

    /// Remove a pending entry whose submission failed. Confirmed entries
    /// are left alone.
    pub fn reject(&mut self, id: EventId) -> Option<SessionEvent> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.event.id == id && slot.delivery == DeliveryState::Pending)?;
        Some(self.slots.remove(index).event)
    }

    /// Flip the hidden flag locally. Returns the prior value so a failed
    /// store write can put it back.
    pub fn set_hidden(&mut self, id: EventId, hidden: bool) -> Option<bool> {
        let slot = self.slots.iter_mut().find(|slot| slot.event.id == id)?;
        let prior = slot.event.hidden;
        slot.event.hidden = hidden;
        Some(prior)
    }

    /// Ordered render view for one viewer.
    ///
    /// Hidden bodies are redacted for players but the entry keeps its slot,
    /// so ordering and unread logic are unaffected by moderation state.
    pub fn timeline(&self, viewer: Role) -> Vec<TimelineEntry> {
        self.slots
            .iter()
            .map(|slot| {
                let redacted = slot.event.hidden && !viewer.is_gm();
                let mut event = slot.event.clone();
                if redacted {
                    event.body = HIDDEN_PLACEHOLDER.to_string();
                    event.dice = None;
                }
                TimelineEntry {
                    event,
                    delivery: slot.delivery,
                    redacted,
                }
            })
            .collect()
    }

    /// Confirmed, non-hidden events in display order, for export.
    pub fn transcript(&self, include_side_chat: bool) -> Vec<SessionEvent> {
        self.slots
            .iter()
            .filter(|slot| slot.delivery == DeliveryState::Confirmed)
            .filter(|slot| !slot.event.hidden)
            .filter(|slot| include_side_chat || slot.event.channel() != Channel::Side)
            .map(|slot| slot.event.clone())
            .collect()
    }

    fn position(&self, id: EventId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.event.id == id)
    }

    fn insert_ordered(&mut self, slot: Slot) {
        let at = self
            .slots
            .partition_point(|existing| existing.event.created_at <= slot.event.created_at);
        self.slots.insert(at, slot);
    }

    fn ordered_at(&self, index: usize) -> bool {
        let created = self.slots[index].event.created_at;
        let before_ok = index == 0 || self.slots[index - 1].event.created_at <= created;
        let after_ok =
            index + 1 >= self.slots.len() || created <= self.slots[index + 1].event.created_at;
        before_ok && after_ok
    }
}
