//! Playback session tracker
//!
//! Keeps one session per in-flight sound and the deadline at which it
//! expires. Expiry is driven by the owner: it asks for [`SessionTracker::next_expiry`],
//! waits until then, and retires whatever [`SessionTracker::due`] reports.
//! Retiring a session is the event that frees its channel.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use super::sound::{ChannelIndex, SoundHandle};

/// Identifier of a registered playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Wrap a raw session number
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Bookkeeping record for one in-flight sound
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub id: SessionId,
    pub sound: SoundHandle,
    pub channel: ChannelIndex,
    pub started_at: Instant,
    pub expires_at: Instant,
}

/// Tracks in-flight sessions and their expiry deadlines
#[derive(Debug)]
pub struct SessionTracker {
    grace: Duration,
    next_id: u64,
    sessions: HashMap<SessionId, PlaybackSession>,
    deadlines: BTreeSet<(Instant, SessionId)>,
}

impl SessionTracker {
    /// Create a tracker that adds `grace` to every sound's duration
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            next_id: 0,
            sessions: HashMap::new(),
            deadlines: BTreeSet::new(),
        }
    }

    /// Grace margin added to each sound's duration
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Register a sound that started playing on `channel` at `started_at`.
    ///
    /// Its expiry is scheduled at `started_at + duration + grace`.
    pub fn register(
        &mut self,
        sound: SoundHandle,
        channel: ChannelIndex,
        started_at: Instant,
    ) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;

        let expires_at = started_at + sound.duration() + self.grace;
        self.deadlines.insert((expires_at, id));
        self.sessions.insert(
            id,
            PlaybackSession {
                id,
                sound,
                channel,
                started_at,
                expires_at,
            },
        );
        id
    }

    /// Retire a session, returning it so the caller can free its channel.
    ///
    /// Returns `None` if the session already expired or was cleared.
    pub fn expire(&mut self, id: SessionId) -> Option<PlaybackSession> {
        let session = self.sessions.remove(&id)?;
        self.deadlines.remove(&(session.expires_at, id));
        Some(session)
    }

    /// Sessions whose deadline is at or before `now`, earliest first
    pub fn due(&self, now: Instant) -> Vec<SessionId> {
        self.deadlines
            .iter()
            .take_while(|(deadline, _)| *deadline <= now)
            .map(|(_, id)| *id)
            .collect()
    }

    /// Earliest pending deadline, if any session is active
    pub fn next_expiry(&self) -> Option<Instant> {
        self.deadlines.first().map(|(deadline, _)| *deadline)
    }

    /// Number of sessions that have not expired yet
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Check whether any active session holds `channel`
    pub fn is_channel_active(&self, channel: ChannelIndex) -> bool {
        self.sessions.values().any(|s| s.channel == channel)
    }

    /// Look up an active session
    pub fn get(&self, id: SessionId) -> Option<&PlaybackSession> {
        self.sessions.get(&id)
    }

    /// Drop every session and pending deadline without reporting them.
    ///
    /// Returns how many sessions were cleared.
    pub fn reset(&mut self) -> usize {
        let cleared = self.sessions.len();
        self.sessions.clear();
        self.deadlines.clear();
        cleared
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(super::DEFAULT_GRACE_MS))
    }
}
