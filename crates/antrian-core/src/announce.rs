//! Announcement planning — queue string to segment list in one call.

use serde::Serialize;
use thiserror::Error;

use crate::numeral::{NumeralDecomposition, decompose};
use crate::queue::{ParseError, QueueIdentifier, parse_queue};
use crate::sequence::{
    AllSegments, PlaybackSegment, SegmentAvailability, SegmentId, build_sequence,
};
use crate::types::AnnouncerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnounceError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("queue number {number} exceeds the maximum of {max}")]
    OutOfRange { number: u32, max: u32 },
}

/// A planned announcement, ready for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    pub identifier: QueueIdentifier,
    pub parts: NumeralDecomposition,
    pub segments: Vec<PlaybackSegment>,
}

impl Announcement {
    /// Every segment this announcement references, available or not, in
    /// playback order.
    pub fn required_segments(&self, config: &AnnouncerConfig) -> Vec<SegmentId> {
        let id = speakable_identifier(&self.identifier, config);
        build_sequence(&id, &self.parts, &config.pauses, &AllSegments)
            .into_iter()
            .map(|s| s.segment_id)
            .collect()
    }

    /// Segments referenced but not backed by a clip.
    pub fn missing_segments(
        &self,
        config: &AnnouncerConfig,
        availability: &impl SegmentAvailability,
    ) -> Vec<SegmentId> {
        self.required_segments(config)
            .into_iter()
            .filter(|id| !availability.has_segment(id))
            .collect()
    }
}

/// Parse, bound-check, decompose and sequence `input`.
pub fn plan_announcement(
    input: &str,
    config: &AnnouncerConfig,
    availability: &impl SegmentAvailability,
) -> Result<Announcement, AnnounceError> {
    let identifier = parse_queue(input)?;
    plan_identifier(identifier, config, availability)
}

/// Like [`plan_announcement`] for an already-parsed identifier.
pub fn plan_identifier(
    identifier: QueueIdentifier,
    config: &AnnouncerConfig,
    availability: &impl SegmentAvailability,
) -> Result<Announcement, AnnounceError> {
    if let Some(max) = config.max_number {
        if identifier.number > max {
            return Err(AnnounceError::OutOfRange {
                number: identifier.number,
                max,
            });
        }
    }

    let parts = decompose(identifier.number);
    let spoken = speakable_identifier(&identifier, config);
    let segments = build_sequence(&spoken, &parts, &config.pauses, availability);

    Ok(Announcement {
        identifier,
        parts,
        segments,
    })
}

/// The identifier as the sequencer should see it — letter dropped when
/// letter prefixes are switched off.
fn speakable_identifier(identifier: &QueueIdentifier, config: &AnnouncerConfig) -> QueueIdentifier {
    QueueIdentifier {
        letter: identifier.letter.filter(|_| config.letter_prefix),
        number: identifier.number,
    }
}
