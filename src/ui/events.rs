use crate::spotify::PlaybackClient;
use crate::state::{PlaybackState, StateCache, StatusMessage};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlayPause,
    Next,
    Previous,
}

impl Command {
    /// Fixed bindings: 5 toggles, 6 skips forward, 4 goes back.
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        match key.code {
            KeyCode::Char('5') => Some(Command::TogglePlayPause),
            KeyCode::Char('6') => Some(Command::Next),
            KeyCode::Char('4') => Some(Command::Previous),
            _ => None,
        }
    }
}

/// What one poll produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Ctrl+C - raw mode swallows the signal, so it shows up as a key
    Interrupt,
    Ignored,
}

/// Somewhere keys come from. Must never block.
pub trait KeySource {
    fn poll_key(&mut self) -> Result<Option<KeyEvent>>;
}

/// Real keyboard via crossterm, zero-timeout poll.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn poll_key(&mut self) -> Result<Option<KeyEvent>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(key));
                }
            }
        }
        Ok(None)
    }
}

pub struct InputMultiplexer<K> {
    keys: K,
    settle: Duration,
}

impl<K: KeySource> InputMultiplexer<K> {
    pub fn new(keys: K, settle: Duration) -> Self {
        Self { keys, settle }
    }

    /// Take at most one pending key. Returns immediately when there is none.
    pub fn poll(&mut self) -> Result<Option<Input>> {
        let Some(key) = self.keys.poll_key()? else {
            return Ok(None);
        };

        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c' | 'C')) {
            return Ok(Some(Input::Interrupt));
        }

        Ok(Some(match Command::from_key(&key) {
            Some(command) => Input::Command(command),
            None => Input::Ignored,
        }))
    }

    /// Send a command to Spotify, showing intent on screen before the call lands.
    ///
    /// `show` draws the cache as it stands; it runs once before the network
    /// command so a slow request never hides the key press.
    pub async fn issue<C, F>(
        &self,
        command: Command,
        client: &C,
        cache: &mut StateCache,
        mut show: F,
    ) -> Result<()>
    where
        C: PlaybackClient,
        F: FnMut(&StateCache) -> Result<()>,
    {
        debug!("Issuing {:?}", command);

        let outcome = match command {
            Command::TogglePlayPause => {
                cache.set_status(StatusMessage::Sending);
                show(cache)?;
                match client.is_currently_playing().await {
                    Ok(true) => {
                        cache.set_playback(PlaybackState::paused());
                        cache.set_status(StatusMessage::Paused);
                        show(cache)?;
                        client.pause().await
                    }
                    Ok(false) => {
                        cache.set_playback(PlaybackState::playing());
                        cache.set_status(StatusMessage::Playing);
                        show(cache)?;
                        client.resume().await
                    }
                    Err(e) => Err(e),
                }
            }
            Command::Next => {
                cache.set_status(StatusMessage::Skipping);
                show(cache)?;
                client.skip_next().await
            }
            Command::Previous => {
                cache.set_status(StatusMessage::Previous);
                show(cache)?;
                client.skip_previous().await
            }
        };

        if let Err(e) = outcome {
            warn!("{:?} failed: {}", command, e);
            cache.set_status(StatusMessage::CommandError(e.to_string()));
        }

        // Let key repeat / bounce pass before the next poll
        sleep(self.settle).await;
        Ok(())
    }
}
