//! Numeral decomposition — split a number into the magnitudes that have a
//! recorded clip of their own.
//!
//! ```text
//! 7   → [7]
//! 22  → [20, 2]
//! 156 → [100, 50, 6]
//! 315 → [300, 15]
//! ```
//!
//! 0–20 are spoken as single words, so a remainder up to 20 is never split.

use serde::Serialize;

/// Largest number whose every part has a clip (`900` + `90` + `9`).
pub const MAX_SPOKEN_NUMBER: u32 = 999;

/// Ordered spoken magnitudes of one number, most significant first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NumeralDecomposition(Vec<u32>);

impl NumeralDecomposition {
    pub fn parts(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every part has a clip in a complete asset set.
    pub fn is_speakable(&self) -> bool {
        self.0.iter().all(|&p| is_spoken_magnitude(p))
    }

    pub fn into_inner(self) -> Vec<u32> {
        self.0
    }
}

impl AsRef<[u32]> for NumeralDecomposition {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a NumeralDecomposition {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Whether `value` is one of `0..=20`, `30, 40, …, 90` or `100, 200, …, 900`.
pub fn is_spoken_magnitude(value: u32) -> bool {
    match value {
        0..=20 => true,
        21..=99 => value % 10 == 0,
        100..=900 => value % 100 == 0,
        _ => false,
    }
}

/// Every value [`is_spoken_magnitude`] accepts, ascending.
pub fn spoken_magnitudes() -> impl Iterator<Item = u32> {
    (0..=20)
        .chain((30..=90).step_by(10))
        .chain((100..=900).step_by(100))
}

/// Decompose `number` into spoken magnitudes.
///
/// Numbers above [`MAX_SPOKEN_NUMBER`] are not rejected: the hundreds part
/// simply grows (`1200` → `[1200]`) and has no clip to back it.
pub fn decompose(number: u32) -> NumeralDecomposition {
    if number == 0 {
        return NumeralDecomposition(vec![0]);
    }

    let mut parts = Vec::with_capacity(3);

    let hundreds = (number / 100) * 100;
    if hundreds > 0 {
        parts.push(hundreds);
    }

    let remainder = number % 100;
    if remainder <= 20 {
        if remainder > 0 {
            parts.push(remainder);
        }
    } else {
        let tens = (remainder / 10) * 10;
        let ones = remainder % 10;
        if tens > 0 {
            parts.push(tens);
        }
        if ones > 0 {
            parts.push(ones);
        }
    }

    NumeralDecomposition(parts)
}
