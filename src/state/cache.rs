use super::{Playback, PlaybackState, StatusMessage, TrackSnapshot};
use crate::art::GlyphArt;
use std::sync::Arc;
use tracing::debug;

/// What a merge decided. The loop only has to act on `needs_art_refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    pub needs_art_refresh: bool,
    pub artwork_url: Option<String>,
}

/// Single owner of everything shown between ticks.
/// Mutated once per tick by `merge`, plus optimistic writes from commands.
#[derive(Debug, Default)]
pub struct StateCache {
    track: Option<TrackSnapshot>,
    art: Arc<GlyphArt>,
    playback: PlaybackState,
    status: StatusMessage,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the latest fetch into the cache.
    ///
    /// A missing fetch keeps the last known track on screen, a gap in
    /// reporting is not the same as nothing playing.
    pub fn merge(&mut self, latest: Option<Playback>) -> MergeOutcome {
        let Some(Playback { track, state }) = latest else {
            return MergeOutcome::default();
        };

        // Play/pause moves independently of the track
        self.playback = state;

        if let Some(cached) = self.track.as_mut().filter(|cached| cached.id == track.id) {
            cached.progress_ms = track.progress_ms;
            cached.duration_ms = track.duration_ms;
            return MergeOutcome::default();
        }

        debug!("Track changed to {} ({} - {})", track.id, track.artist, track.name);
        let artwork_url = track.artwork_url.clone();
        self.track = Some(track);
        MergeOutcome {
            needs_art_refresh: true,
            artwork_url,
        }
    }

    pub fn track(&self) -> Option<&TrackSnapshot> {
        self.track.as_ref()
    }

    pub fn art(&self) -> &Arc<GlyphArt> {
        &self.art
    }

    pub fn set_art(&mut self, art: GlyphArt) {
        self.art = Arc::new(art);
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    /// Optimistic write ahead of a command; the next fetch has the final say.
    pub fn set_playback(&mut self, playback: PlaybackState) {
        self.playback = playback;
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = status;
    }

    pub fn decay_status(&mut self) {
        self.status = std::mem::take(&mut self.status).decayed();
    }
}
