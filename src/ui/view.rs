// What goes on screen, decided without touching the terminal
// draw.rs turns a DashboardView into ratatui widgets

use crate::art::GlyphArt;
use crate::state::{PlaybackState, StatusMessage, TrackSnapshot};

pub const WAITING_TITLE: &str = "Status";
pub const NOW_PLAYING_TITLE: &str = "Now Playing";
pub const WAITING_TEXT: &str = "Waiting for Spotify...";

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView<'a> {
    Waiting(WaitingView<'a>),
    NowPlaying(NowPlayingView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitingView<'a> {
    pub title: &'static str,
    pub message: &'static str,
    pub status: &'a StatusMessage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingView<'a> {
    pub title: &'static str,
    pub art: &'a GlyphArt,
    pub track_name: &'a str,
    pub artist: &'a str,
    pub album: &'a str,
    pub progress: ProgressIndicator,
    pub play_state: PlayStateBadge,
    pub time: String,
    pub status: &'a StatusMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressIndicator {
    pub completed_ms: u64,
    pub total_ms: u64,
}

impl ProgressIndicator {
    pub fn new(progress_ms: u64, total_ms: u64) -> Self {
        Self {
            completed_ms: progress_ms.min(total_ms),
            total_ms,
        }
    }

    /// Filled fraction, 0.0..=1.0
    pub fn ratio(&self) -> f64 {
        if self.total_ms == 0 {
            0.0
        } else {
            self.completed_ms as f64 / self.total_ms as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStateBadge {
    Playing,
    Paused,
}

impl PlayStateBadge {
    pub fn label(&self) -> &'static str {
        match self {
            PlayStateBadge::Playing => "▶ PLAYING",
            PlayStateBadge::Paused => "❚❚ PAUSED",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlayStateBadge::Playing)
    }
}

impl From<PlaybackState> for PlayStateBadge {
    fn from(state: PlaybackState) -> Self {
        if state.is_playing {
            PlayStateBadge::Playing
        } else {
            PlayStateBadge::Paused
        }
    }
}

/// Lay out one frame. Pure - same inputs, same view.
pub fn render<'a>(
    track: Option<&'a TrackSnapshot>,
    art: &'a GlyphArt,
    status: &'a StatusMessage,
    playback: PlaybackState,
) -> DashboardView<'a> {
    let Some(track) = track else {
        return DashboardView::Waiting(WaitingView {
            title: WAITING_TITLE,
            message: WAITING_TEXT,
            status,
        });
    };

    DashboardView::NowPlaying(NowPlayingView {
        title: NOW_PLAYING_TITLE,
        art,
        track_name: &track.name,
        artist: &track.artist,
        album: &track.album,
        progress: ProgressIndicator::new(track.progress_ms, track.duration_ms),
        play_state: playback.into(),
        time: format!("{} / {}", format_time(track.progress_ms), format_time(track.duration_ms)),
        status,
    })
}

/// `MM:SS`, truncated to whole seconds; minutes wrap at an hour.
pub fn format_time(ms: u64) -> String {
    let seconds = (ms / 1000) % 60;
    let minutes = (ms / 60_000) % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
