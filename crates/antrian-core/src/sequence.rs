//! Segment sequencing — the ordered clip list for one announcement.
//!
//! ```text
//! chime (500) → prefix (300) → letter_A (200) → 20 (150) → 2 (300) → suffix (0)
//! ```
//!
//! Each step is conditional on its clip being available. A missing clip drops
//! out together with its pause; nothing is merged into its neighbours.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::numeral::NumeralDecomposition;
use crate::queue::QueueIdentifier;

/// Canonical name of one recorded clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentId {
    Chime,
    Prefix,
    Letter(char),
    Numeral(u32),
    Suffix,
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentId::Chime => f.write_str("chime"),
            SegmentId::Prefix => f.write_str("prefix"),
            SegmentId::Suffix => f.write_str("suffix"),
            SegmentId::Letter(l) => write!(f, "letter_{l}"),
            SegmentId::Numeral(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for SegmentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chime" => return Ok(SegmentId::Chime),
            "prefix" => return Ok(SegmentId::Prefix),
            "suffix" => return Ok(SegmentId::Suffix),
            _ => {}
        }
        if let Some(rest) = s.strip_prefix("letter_") {
            let mut chars = rest.chars();
            return match (chars.next(), chars.next()) {
                (Some(l), None) if l.is_ascii_uppercase() => Ok(SegmentId::Letter(l)),
                _ => Err(format!("invalid letter segment '{s}'")),
            };
        }
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse()
                .map(SegmentId::Numeral)
                .map_err(|e| format!("invalid numeral segment '{s}': {e}"));
        }
        Err(format!("unknown segment '{s}'"))
    }
}

impl Serialize for SegmentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One clip plus the silence to leave after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSegment {
    pub segment_id: SegmentId,
    pub pause_after_ms: u64,
}

impl PlaybackSegment {
    fn new(segment_id: SegmentId, pause_after_ms: u64) -> Self {
        Self {
            segment_id,
            pause_after_ms,
        }
    }
}

/// Silence after each kind of segment, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pauses {
    pub chime: u64,
    pub prefix: u64,
    pub letter: u64,
    /// After every numeral part except the last.
    pub part: u64,
    /// After the last numeral part, separating the number from the suffix.
    pub last_part: u64,
    pub suffix: u64,
}

impl Default for Pauses {
    fn default() -> Self {
        Self {
            chime: 500,
            prefix: 300,
            letter: 200,
            part: 150,
            last_part: 300,
            suffix: 0,
        }
    }
}

/// Yes/no existence check for a segment's clip, answered by whoever owns
/// the audio files.
pub trait SegmentAvailability {
    fn has_segment(&self, id: &SegmentId) -> bool;
}

impl<F> SegmentAvailability for F
where
    F: Fn(&SegmentId) -> bool,
{
    fn has_segment(&self, id: &SegmentId) -> bool {
        self(id)
    }
}

/// Availability that reports every clip as present. Used for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllSegments;

impl SegmentAvailability for AllSegments {
    fn has_segment(&self, _id: &SegmentId) -> bool {
        true
    }
}

/// Build the ordered clip list for `identifier`, whose number decomposed to
/// `parts`.
pub fn build_sequence(
    identifier: &QueueIdentifier,
    parts: &NumeralDecomposition,
    pauses: &Pauses,
    availability: &impl SegmentAvailability,
) -> Vec<PlaybackSegment> {
    let mut out = Vec::with_capacity(parts.len() + 4);
    let mut push = |id: SegmentId, pause: u64| {
        if availability.has_segment(&id) {
            out.push(PlaybackSegment::new(id, pause));
        }
    };

    push(SegmentId::Chime, pauses.chime);
    push(SegmentId::Prefix, pauses.prefix);
    if let Some(letter) = identifier.letter {
        push(SegmentId::Letter(letter), pauses.letter);
    }

    let last = parts.len().saturating_sub(1);
    for (i, &part) in parts.parts().iter().enumerate() {
        let pause = if i == last { pauses.last_part } else { pauses.part };
        push(SegmentId::Numeral(part), pause);
    }

    push(SegmentId::Suffix, pauses.suffix);
    out
}
