//! Indonesian text for every clip that can be synthesized, and the full
//! catalog of clips a complete asset set holds.

use crate::numeral::spoken_magnitudes;
use crate::sequence::SegmentId;

const UNITS: [&str; 21] = [
    "nol",
    "satu",
    "dua",
    "tiga",
    "empat",
    "lima",
    "enam",
    "tujuh",
    "delapan",
    "sembilan",
    "sepuluh",
    "sebelas",
    "dua belas",
    "tiga belas",
    "empat belas",
    "lima belas",
    "enam belas",
    "tujuh belas",
    "delapan belas",
    "sembilan belas",
    "dua puluh",
];

const TENS: [&str; 7] = [
    "tiga puluh",
    "empat puluh",
    "lima puluh",
    "enam puluh",
    "tujuh puluh",
    "delapan puluh",
    "sembilan puluh",
];

const HUNDREDS: [&str; 9] = [
    "seratus",
    "dua ratus",
    "tiga ratus",
    "empat ratus",
    "lima ratus",
    "enam ratus",
    "tujuh ratus",
    "delapan ratus",
    "sembilan ratus",
];

pub const PREFIX_TEXT: &str = "Nomor antrian";
pub const SUFFIX_TEXT: &str = "silakan ke loket";

const LETTERS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
];

/// Spoken text of a segment. `None` for the chime (a recorded sound, not
/// speech) and for numerals without a clip of their own.
pub fn phrase(id: &SegmentId) -> Option<&'static str> {
    match *id {
        SegmentId::Chime => None,
        SegmentId::Prefix => Some(PREFIX_TEXT),
        SegmentId::Suffix => Some(SUFFIX_TEXT),
        SegmentId::Letter(l) if l.is_ascii_uppercase() => {
            Some(LETTERS[(l as u8 - b'A') as usize])
        }
        SegmentId::Letter(_) => None,
        SegmentId::Numeral(n) => match n {
            0..=20 => Some(UNITS[n as usize]),
            30..=90 if n % 10 == 0 => Some(TENS[(n / 10 - 3) as usize]),
            100..=900 if n % 100 == 0 => Some(HUNDREDS[(n / 100 - 1) as usize]),
            _ => None,
        },
    }
}

/// Every clip of a complete asset set, in generation order.
pub fn catalog(letter_prefix: bool) -> Vec<SegmentId> {
    let mut ids = vec![SegmentId::Chime, SegmentId::Prefix, SegmentId::Suffix];
    ids.extend(spoken_magnitudes().map(SegmentId::Numeral));
    if letter_prefix {
        ids.extend(('A'..='Z').map(SegmentId::Letter));
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeral::decompose;

    #[test]
    fn fixed_phrases() {
        assert_eq!(phrase(&SegmentId::Prefix), Some("Nomor antrian"));
        assert_eq!(phrase(&SegmentId::Suffix), Some("silakan ke loket"));
        assert_eq!(phrase(&SegmentId::Chime), None);
    }

    #[test]
    fn numeral_phrases() {
        assert_eq!(phrase(&SegmentId::Numeral(0)), Some("nol"));
        assert_eq!(phrase(&SegmentId::Numeral(11)), Some("sebelas"));
        assert_eq!(phrase(&SegmentId::Numeral(20)), Some("dua puluh"));
        assert_eq!(phrase(&SegmentId::Numeral(30)), Some("tiga puluh"));
        assert_eq!(phrase(&SegmentId::Numeral(90)), Some("sembilan puluh"));
        assert_eq!(phrase(&SegmentId::Numeral(100)), Some("seratus"));
        assert_eq!(phrase(&SegmentId::Numeral(900)), Some("sembilan ratus"));
        assert_eq!(phrase(&SegmentId::Numeral(21)), None);
        assert_eq!(phrase(&SegmentId::Numeral(1000)), None);
    }

    #[test]
    fn letter_phrases() {
        assert_eq!(phrase(&SegmentId::Letter('A')), Some("A"));
        assert_eq!(phrase(&SegmentId::Letter('Z')), Some("Z"));
        assert_eq!(phrase(&SegmentId::Letter('a')), None);
    }

    #[test]
    fn catalog_sizes() {
        assert_eq!(catalog(false).len(), 3 + 37);
        assert_eq!(catalog(true).len(), 3 + 37 + 26);
    }

    #[test]
    fn catalog_covers_every_decomposition() {
        let all = catalog(false);
        for n in 0..=999 {
            for &part in decompose(n).parts() {
                assert!(all.contains(&SegmentId::Numeral(part)), "{n}: {part}");
            }
        }
    }

    #[test]
    fn everything_but_chime_has_a_phrase() {
        for id in catalog(true) {
            assert_eq!(phrase(&id).is_some(), id != SegmentId::Chime, "{id}");
        }
    }
}
