// nowplaying-ascii library - core modules for the terminal now-playing dashboard
// Everything the tick loop touches is behind a trait, so the loop runs fine without a terminal

pub mod art;     // album art -> colored glyph grid
pub mod config;  // env + .env secrets, optional TOML tuning
pub mod spotify; // Web API client + OAuth bootstrap
pub mod state;   // track snapshot, play state, cache + merge policy
pub mod ui;      // view, drawing, keys, main loop

// Export the stuff the binary actually uses
pub use art::{ArtworkConverter, GlyphArt};
pub use config::Config;
pub use spotify::{Authorizer, PlaybackClient, SpotifyClient};
pub use state::StateCache;
pub use ui::{App, TerminalKeys, TerminalManager};
