// Spotify integration - Web API playback calls plus the OAuth bootstrap
// The dashboard only talks to the PlaybackClient trait, so tests can script it

pub mod auth;   // authorize URL, code exchange, PKCE, token refresh
mod client;     // reqwest-backed PlaybackClient
mod models;     // Web API response shapes

pub use auth::{Authorizer, Token};
pub use client::SpotifyClient;

use crate::state::Playback;
use thiserror::Error;

pub const SCOPE: &str = "user-read-currently-playing user-modify-playback-state user-read-playback-state";

pub const API_BASE_URL: &str = "https://api.spotify.com";
pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("authorization failed: {0}")]
    Auth(String),
}

/// The playback operations the dashboard needs. Each call fails independently.
#[allow(async_fn_in_trait)]
pub trait PlaybackClient {
    /// Currently playing track, `None` when nothing is active.
    async fn query(&self) -> Result<Option<Playback>, SpotifyError>;

    async fn is_currently_playing(&self) -> Result<bool, SpotifyError>;

    async fn pause(&self) -> Result<(), SpotifyError>;

    async fn resume(&self) -> Result<(), SpotifyError>;

    async fn skip_next(&self) -> Result<(), SpotifyError>;

    async fn skip_previous(&self) -> Result<(), SpotifyError>;
}
