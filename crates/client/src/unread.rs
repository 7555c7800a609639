//! Per-channel unread watermarks.
//!
//! Level-triggered: each channel carries a single "has unread" flag, never
//! a count. The watermark is the time up to which the viewer has seen the
//! channel; only confirmed feed arrivals move it.

use chrono::{DateTime, Utc};

use playroom_domain::Channel;

/// The two booleans the tab bar renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnreadFlags {
    pub main: bool,
    pub side: bool,
}

#[derive(Debug, Clone, Copy)]
struct ChannelMark {
    watermark: DateTime<Utc>,
    flagged: bool,
}

/// Tracks which channel the viewer is on and what they have not seen.
///
/// Watermarks start at construction time so the backlog loaded on entry
/// never counts as unread.
#[derive(Debug)]
pub struct UnreadTracker {
    active: Channel,
    main: ChannelMark,
    side: ChannelMark,
}

impl UnreadTracker {
    pub fn new(active: Channel, now: DateTime<Utc>) -> Self {
        let mark = ChannelMark {
            watermark: now,
            flagged: false,
        };
        Self {
            active,
            main: mark,
            side: mark,
        }
    }

    pub fn active(&self) -> Channel {
        self.active
    }

    /// Fold in one confirmed arrival.
    ///
    /// On the active channel the watermark just advances; elsewhere the
    /// flag is raised only for events strictly newer than the watermark,
    /// so out-of-order or duplicate arrivals never re-raise it.
    pub fn observe(&mut self, channel: Channel, created_at: DateTime<Utc>, now: DateTime<Utc>) {
        let active = self.active;
        let mark = self.mark_mut(channel);
        if channel == active {
            mark.watermark = now;
        } else if created_at > mark.watermark {
            mark.flagged = true;
        }
    }

    /// Switch the viewer to a channel. Always clears that channel's flag
    /// and advances its watermark, even when nothing new arrived.
    pub fn switch_to(&mut self, channel: Channel, now: DateTime<Utc>) {
        self.active = channel;
        let mark = self.mark_mut(channel);
        mark.flagged = false;
        mark.watermark = now;
    }

    pub fn is_flagged(&self, channel: Channel) -> bool {
        match channel {
            Channel::Main => self.main.flagged,
            Channel::Side => self.side.flagged,
        }
    }

    pub fn flags(&self) -> UnreadFlags {
        UnreadFlags {
            main: self.main.flagged,
            side: self.side.flagged,
        }
    }

    fn mark_mut(&mut self, channel: Channel) -> &mut ChannelMark {
        match channel {
            Channel::Main => &mut self.main,
            Channel::Side => &mut self.side,
        }
    }
}
