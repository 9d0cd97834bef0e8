//! Shared configuration and status types.
//!
//! Used across antrian-lib and antrian-cli. Keeping them here lets callers
//! depend on the types without pulling in tokio, rodio, or axum.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::numeral::MAX_SPOKEN_NUMBER;
use crate::sequence::{Pauses, SegmentId};

// ─── Announcement ──────────────────────────────────────────────────────────

/// How a queue string becomes a segment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnouncerConfig {
    /// Speak the letter of `A22`. When off, the letter is accepted but silent.
    pub letter_prefix: bool,
    /// Reject numbers above this bound. `None` decomposes anything.
    pub max_number: Option<u32>,
    pub pauses: Pauses,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            letter_prefix: true,
            max_number: Some(MAX_SPOKEN_NUMBER),
            pauses: Pauses::default(),
        }
    }
}

// ─── Assets ────────────────────────────────────────────────────────────────

/// Where recorded clips live and how they are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetConfig {
    pub audio_dir: PathBuf,
    /// File extension without the dot.
    pub extension: String,
    /// Language of the recorded phrases (BCP-47 tag).
    pub language: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("audio"),
            extension: "wav".into(),
            language: "id".into(),
        }
    }
}

impl AssetConfig {
    /// File name of a segment's clip, e.g. `letter_A.wav`.
    pub fn file_name(&self, id: &SegmentId) -> String {
        format!("{id}.{}", self.extension)
    }
}

/// Segment clip generation through an OpenAI-compatible speech endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub tts_url: String,
    pub voice: String,
    pub speed: f32,
    /// Silence appended to every generated clip so endings are not clipped.
    pub trailing_silence_ms: u32,
    /// Replace clips that already exist.
    pub overwrite: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tts_url: "http://localhost:8880".into(),
            voice: "if_sara".into(),
            speed: 1.0,
            trailing_silence_ms: 300,
            overwrite: false,
        }
    }
}

/// Progress of a generation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProgress {
    pub segment: String,
    pub done: usize,
    pub total: usize,
    pub status: String, // "created" | "exists" | "skipped" | "error"
}

// ─── Tickets ───────────────────────────────────────────────────────────────

/// Formatting and range of printed tickets (`A001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TicketConfig {
    /// `A`-`Z`; lower case is accepted and upper-cased.
    pub letter: Option<char>,
    /// Zero-pad the number to at least this many digits.
    pub width: usize,
    /// Highest ticket number that can be printed. `None` prints forever.
    pub max_number: Option<u32>,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            letter: Some('A'),
            width: 3,
            max_number: Some(MAX_SPOKEN_NUMBER),
        }
    }
}

// ─── Status ────────────────────────────────────────────────────────────────

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Idle,
    Playing,
}

/// Playback status snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatus {
    pub state: PlayerState,
    /// Announcements queued or playing.
    pub announcements: usize,
}

/// Ticket counter snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterStatus {
    /// `None` once the range is used up.
    pub next_ticket: Option<String>,
    pub current_ticket: Option<String>,
}
