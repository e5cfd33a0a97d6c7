//! Note name resolution
//!
//! Format: <letter><accidental><octave>
//!
//! - Letters: C, D, E, F, G, A, B (either case)
//! - Accidental: `#` (sharp) or `b` (flat), optional
//! - Octave: signed decimal integer, octave -1 starts at MIDI 0 (C4 = 60)

use crate::error::NoteParseError;

/// Semitone offset of a natural note letter (C=0, D=2, ...)
fn letter_semitone(letter: char) -> Option<i64> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Parse the octave suffix: optional '-' followed by at least one digit
fn parse_octave(s: &str) -> Result<i64, NoteParseError> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() {
        return Err(NoteParseError::MissingOctave);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NoteParseError::InvalidOctave(s.to_string()));
    }
    s.parse::<i64>()
        .map_err(|_| NoteParseError::InvalidOctave(s.to_string()))
}

/// Resolve a note token such as `C4`, `F#3` or `Bb-1` to a MIDI pitch
pub fn resolve(token: &str) -> Result<u8, NoteParseError> {
    let mut chars = token.chars();
    let letter = chars.next().ok_or(NoteParseError::MissingOctave)?;
    let mut semitone = letter_semitone(letter).ok_or(NoteParseError::UnknownLetter(letter))?;

    let mut rest = chars.as_str();
    if let Some(r) = rest.strip_prefix('#') {
        semitone += 1;
        rest = r;
    } else if let Some(r) = rest.strip_prefix('b') {
        semitone -= 1;
        rest = r;
    }

    let octave = parse_octave(rest)?;
    let pitch = octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|p| p.checked_add(semitone))
        .ok_or_else(|| NoteParseError::InvalidOctave(rest.to_string()))?;

    u8::try_from(pitch)
        .ok()
        .filter(|p| *p <= 127)
        .ok_or(NoteParseError::PitchOutOfRange(pitch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_pitches() {
        assert_eq!(resolve("C4").unwrap(), 60);
        assert_eq!(resolve("A4").unwrap(), 69);
        assert_eq!(resolve("C-1").unwrap(), 0);
        assert_eq!(resolve("G9").unwrap(), 127);
    }

    #[test]
    fn test_accidentals() {
        assert_eq!(resolve("F#3").unwrap(), 54);
        assert_eq!(resolve("Bb2").unwrap(), 46);
        assert_eq!(resolve("Cb4").unwrap(), 59);
        assert_eq!(resolve("B#3").unwrap(), 60);
        assert_eq!(resolve("C#-1").unwrap(), 1);
    }

    #[test]
    fn test_lowercase_letters() {
        assert_eq!(resolve("c4").unwrap(), 60);
        assert_eq!(resolve("bb2").unwrap(), 46);
        assert_eq!(resolve("e5").unwrap(), 76);
    }

    #[test]
    fn test_unknown_letter() {
        assert_eq!(resolve("H4"), Err(NoteParseError::UnknownLetter('H')));
        assert_eq!(resolve("Z4"), Err(NoteParseError::UnknownLetter('Z')));
        assert_eq!(resolve("tempo"), Err(NoteParseError::UnknownLetter('t')));
    }

    #[test]
    fn test_pitch_out_of_range() {
        assert_eq!(resolve("G#9"), Err(NoteParseError::PitchOutOfRange(128)));
        assert_eq!(resolve("Cb-1"), Err(NoteParseError::PitchOutOfRange(-1)));
        assert_eq!(resolve("C10"), Err(NoteParseError::PitchOutOfRange(132)));
        assert!(resolve("C-2").is_err());
    }

    #[test]
    fn test_missing_or_bad_octave() {
        assert_eq!(resolve("C"), Err(NoteParseError::MissingOctave));
        assert_eq!(resolve("C#"), Err(NoteParseError::MissingOctave));
        assert_eq!(resolve("C-"), Err(NoteParseError::MissingOctave));
        assert!(matches!(resolve("C#x"), Err(NoteParseError::InvalidOctave(_))));
        assert!(matches!(resolve("C4x"), Err(NoteParseError::InvalidOctave(_))));
        assert!(matches!(resolve("C+4"), Err(NoteParseError::InvalidOctave(_))));
        // uppercase B is not a flat sign
        assert!(matches!(resolve("CB4"), Err(NoteParseError::InvalidOctave(_))));
    }

    #[test]
    fn test_huge_octave_is_rejected() {
        assert!(resolve("C99999999999999999999").is_err());
    }
}
