//! Error types surfaced by configuration loading and host collaborators
//!
//! Nothing in here ever escapes a frame tick. Playback failures are logged
//! and swallowed by the mixer; the rest only arise while loading.

use std::fmt;

use crate::host::SoundEffect;

#[derive(Debug)]
pub enum SimError {
    /// Level or settings JSON failed to parse
    Json(serde_json::Error),
    /// Reading a config file failed
    Io(std::io::Error),
    /// A level script broke one of its ordering/range rules
    InvalidLevel { reason: String },
    /// The host rejected a sound effect
    Playback { effect: SoundEffect, reason: String },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid json: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::InvalidLevel { reason } => write!(f, "invalid level script: {reason}"),
            Self::Playback { effect, reason } => {
                write!(f, "sound effect {effect:?} rejected: {reason}")
            }
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
