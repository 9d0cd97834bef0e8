//! antrian-core — Pure queue-number logic.
//!
//! Parsing, numeral decomposition, segment sequencing, and the small bits of
//! state and audio math around them. No async runtime, no I/O.

pub mod announce;
pub mod counter;
pub mod numeral;
pub mod phrases;
pub mod queue;
pub mod sequence;
pub mod types;
pub mod wav;

pub use announce::{AnnounceError, Announcement, plan_announcement, plan_identifier};
pub use numeral::{NumeralDecomposition, decompose};
pub use queue::{ParseError, QueueIdentifier, parse_queue};
pub use sequence::{PlaybackSegment, SegmentAvailability, SegmentId, build_sequence};
