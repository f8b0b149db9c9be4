//! Natural-language sales pitch generated through an external completion API.

pub mod client;
pub mod prompt;

use serde::Serialize;

pub use client::{CompletionClient, PitchConfig, PitchError, PitchGenerator};
pub use prompt::PitchRequest;

/// Result of a pitch attempt; a failed call is never mistaken for an empty pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PitchOutcome {
    Generated(String),
    Unavailable(String),
    Disabled,
}

impl PitchOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            PitchOutcome::Generated(text) => Some(text),
            PitchOutcome::Unavailable(_) | PitchOutcome::Disabled => None,
        }
    }
}
