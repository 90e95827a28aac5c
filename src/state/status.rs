// Footer status line - command feedback that falls back to the key hints

use std::borrow::Cow;

pub const DEFAULT_HINT: &str = "[5] Pause/Play  |  [6] Next  |  [4] Prev";

/// How the footer should be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Muted,
    Pending,
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusMessage {
    /// Key bindings, shown whenever nothing else is going on
    #[default]
    Hint,
    /// Toggle is waiting on Spotify
    Sending,
    Paused,
    Playing,
    Skipping,
    Previous,
    /// A command failed; sticks until the next command
    CommandError(String),
}

impl StatusMessage {
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            StatusMessage::Hint => Cow::Borrowed(DEFAULT_HINT),
            StatusMessage::Sending => Cow::Borrowed("Sending Command..."),
            StatusMessage::Paused => Cow::Borrowed("PAUSED"),
            StatusMessage::Playing => Cow::Borrowed("PLAYING"),
            StatusMessage::Skipping => Cow::Borrowed("SKIPPING >>"),
            StatusMessage::Previous => Cow::Borrowed("<< PREV"),
            StatusMessage::CommandError(reason) => Cow::Owned(format!("CMD ERROR: {}", reason)),
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            StatusMessage::Hint => Tone::Muted,
            StatusMessage::Sending | StatusMessage::Skipping | StatusMessage::Previous => Tone::Pending,
            StatusMessage::Playing => Tone::Positive,
            StatusMessage::Paused | StatusMessage::CommandError(_) => Tone::Negative,
        }
    }

    /// Idle-tick decay: errors and in-flight messages stay, the rest revert to the hint.
    pub fn decayed(self) -> Self {
        match self {
            StatusMessage::Sending | StatusMessage::CommandError(_) => self,
            _ => StatusMessage::Hint,
        }
    }
}
