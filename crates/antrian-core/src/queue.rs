//! Queue identifier parsing — `"a22"` → `{ letter: 'A', number: 22 }`.
//!
//! Pure functions, no I/O.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

// Optional single letter, then a digit run. Matched against upper-cased input.
static RE_QUEUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z])?([0-9]+)$").unwrap());

/// A parsed queue label, e.g. `A156` or `22`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QueueIdentifier {
    pub letter: Option<char>,
    pub number: u32,
}

impl fmt::Display for QueueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(letter) = self.letter {
            write!(f, "{letter}")?;
        }
        write!(f, "{}", self.number)
    }
}

/// Input that is neither `[letter]digits` nor a plain integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty queue number")]
    Empty,
    #[error("invalid queue number '{0}'")]
    Malformed(String),
}

/// Parse a raw queue string.
///
/// Surrounding whitespace is trimmed and the input upper-cased before
/// matching. Falls back to reading the trimmed input as a plain integer.
pub fn parse_queue(input: &str) -> Result<QueueIdentifier, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let upper = trimmed.to_ascii_uppercase();
    if let Some(caps) = RE_QUEUE.captures(&upper) {
        let letter = caps.get(1).and_then(|m| m.as_str().chars().next());
        // A digit run too long for u32 falls through to the integer fallback,
        // which fails the same way.
        if let Ok(number) = caps[2].parse::<u32>() {
            return Ok(QueueIdentifier { letter, number });
        }
    }

    trimmed
        .parse::<u32>()
        .map(|number| QueueIdentifier {
            letter: None,
            number,
        })
        .map_err(|_| ParseError::Malformed(trimmed.to_string()))
}

impl std::str::FromStr for QueueIdentifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_queue(s)
    }
}
