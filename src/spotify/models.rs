// Just enough of the Web API payloads to fill a TrackSnapshot

use crate::state::{Playback, PlaybackState, TrackId, TrackSnapshot};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    pub item: Option<Item>,
}

#[derive(Debug, Deserialize)]
pub struct Item {
    pub id: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
}

#[derive(Debug, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
pub struct Image {
    pub url: String,
}

/// `GET /v1/me/player` - only the flag matters here
#[derive(Debug, Deserialize)]
pub struct PlayerState {
    #[serde(default)]
    pub is_playing: bool,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl CurrentlyPlaying {
    pub fn into_playback(self) -> Option<Playback> {
        let item = self.item?;

        let artist = item
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_default();
        let (album, artwork_url) = match item.album {
            // images come largest first
            Some(album) => (album.name, album.images.into_iter().next().map(|i| i.url)),
            None => (String::new(), None),
        };

        // Local files have no id, fall back to uri, then to the tags
        let id = item
            .id
            .or(item.uri)
            .unwrap_or_else(|| format!("{}|{}|{}", item.name, artist, album));

        Some(Playback {
            track: TrackSnapshot {
                id: TrackId::new(id),
                name: item.name,
                artist,
                album,
                progress_ms: self.progress_ms.unwrap_or(0),
                duration_ms: item.duration_ms,
                artwork_url,
            },
            state: PlaybackState { is_playing: self.is_playing },
        })
    }
}
