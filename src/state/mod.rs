// Playback state as the dashboard sees it
// Everything the loop knows between ticks lives in the StateCache

pub mod cache;  // last known track, art and play state + merge policy
pub mod status; // footer text and its decay rules

pub use cache::{MergeOutcome, StateCache};
pub use status::{StatusMessage, Tone};

use std::fmt;

/// Stable identifier for whatever is playing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSnapshot {
    pub id: TrackId,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub artwork_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub is_playing: bool,
}

impl PlaybackState {
    pub fn playing() -> Self {
        Self { is_playing: true }
    }

    pub fn paused() -> Self {
        Self { is_playing: false }
    }
}

/// One successful fetch: the track plus whether it's playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    pub track: TrackSnapshot,
    pub state: PlaybackState,
}
