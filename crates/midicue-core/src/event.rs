//! Decoding of raw MIDI bytes into structured events.

use std::fmt;
use std::time::Duration;

/// First byte at which a message no longer carries a channel nibble.
pub const SYSTEM_STATUS_MIN: u8 = 0xF0;

/// One decoded MIDI message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    /// High nibble for channel messages, full first byte for system messages.
    pub status: u8,
    /// 1-16 for channel messages, `None` for system messages.
    pub channel: Option<u8>,
    pub data1: Option<u8>,
    pub data2: Option<u8>,
    /// Running sum of inter-event deltas. Never used for matching.
    pub timestamp: Duration,
}

impl Event {
    /// Decode `raw` received `delta` after the previous event stamped `prior`.
    ///
    /// Returns `None` only for an empty slice.
    pub fn decode(raw: &[u8], delta: Duration, prior: Duration) -> Option<Self> {
        let first = *raw.first()?;

        let (status, channel) = if first < SYSTEM_STATUS_MIN {
            (first & 0xF0, Some((first & 0x0F) + 1))
        } else {
            (first, None)
        };

        Some(Self {
            status,
            channel,
            data1: raw.get(1).copied(),
            data2: raw.get(2).copied(),
            timestamp: prior + delta,
        })
    }

    #[inline]
    pub fn key(&self) -> EventKey {
        EventKey {
            status: self.status,
            channel: self.channel,
            data1: self.data1,
            data2: self.data2,
        }
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.channel.is_none()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<u8>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        write!(
            f,
            "@{:.3}s CH:{:>2} {:02X} {} {}",
            self.timestamp.as_secs_f64(),
            opt(self.channel),
            self.status,
            opt(self.data1),
            opt(self.data2),
        )
    }
}

/// The tuple lookups are memoized by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub status: u8,
    pub channel: Option<u8>,
    pub data1: Option<u8>,
    pub data2: Option<u8>,
}

/// Owns the running timestamp for one stream of events.
#[derive(Debug, Default, Clone)]
pub struct EventClock {
    now: Duration,
}

impl EventClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and advance the clock. An empty slice leaves the clock untouched.
    pub fn decode(&mut self, raw: &[u8], delta: Duration) -> Option<Event> {
        let event = Event::decode(raw, delta, self.now)?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}
