//! Chord name parsing and transposition on the 12-tone chromatic scale.
use std::fmt;

use crate::error::Problem;

/// Chord that stands for "no chord"; never transposed nor registered.
pub const NO_CHORD: &str = "N.C.";

pub fn is_no_chord(name: &str) -> bool {
    name.eq_ignore_ascii_case(NO_CHORD)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

/// Spelling used when mapping a pitch class back to a note name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Spelling {
    Sharps,
    Flats,
}

const SHARP_NAMES: [(char, Accidental); 12] = [
    ('C', Accidental::Natural),
    ('C', Accidental::Sharp),
    ('D', Accidental::Natural),
    ('D', Accidental::Sharp),
    ('E', Accidental::Natural),
    ('F', Accidental::Natural),
    ('F', Accidental::Sharp),
    ('G', Accidental::Natural),
    ('G', Accidental::Sharp),
    ('A', Accidental::Natural),
    ('A', Accidental::Sharp),
    ('B', Accidental::Natural),
];

const FLAT_NAMES: [(char, Accidental); 12] = [
    ('C', Accidental::Natural),
    ('D', Accidental::Flat),
    ('D', Accidental::Natural),
    ('E', Accidental::Flat),
    ('E', Accidental::Natural),
    ('F', Accidental::Natural),
    ('G', Accidental::Flat),
    ('G', Accidental::Natural),
    ('A', Accidental::Flat),
    ('A', Accidental::Natural),
    ('B', Accidental::Flat),
    ('B', Accidental::Natural),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub letter: char,
    pub accidental: Accidental,
}

impl Note {
    /// Parse a note at the start of `s`, returning it and the remainder.
    pub fn parse_prefix(s: &str) -> Option<(Note, &str)> {
        let mut chars = s.chars();
        let letter = chars.next()?;
        if !matches!(letter, 'A'..='G') {
            return None;
        }
        let rest = chars.as_str();
        let (accidental, rest) = match rest.chars().next() {
            Some('#') => (Accidental::Sharp, &rest[1..]),
            Some('b') => (Accidental::Flat, &rest[1..]),
            _ => (Accidental::Natural, rest),
        };
        Some((Note { letter, accidental }, rest))
    }

    /// Pitch class, C = 0.
    pub fn semitone(self) -> i32 {
        let base: i32 = match self.letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            _ => 11,
        };
        let shift = match self.accidental {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        };
        (base + shift).rem_euclid(12)
    }

    pub fn from_semitone(semitone: i32, spelling: Spelling) -> Note {
        let table = match spelling {
            Spelling::Sharps => &SHARP_NAMES,
            Spelling::Flats => &FLAT_NAMES,
        };
        let (letter, accidental) = table[semitone.rem_euclid(12) as usize];
        Note { letter, accidental }
    }

    pub fn transpose(self, semitones: i32, spelling: Spelling) -> Note {
        Note::from_semitone(self.semitone() + semitones, spelling)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter)?;
        match self.accidental {
            Accidental::Natural => Ok(()),
            Accidental::Sharp => write!(f, "#"),
            Accidental::Flat => write!(f, "b"),
        }
    }
}

/// A chord name split into its musical parts.
///
/// `prefix` holds a leading parenthesis, `tail` anything after the bass note,
/// so names such as `(G/B)` survive unchanged apart from the notes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChordToken {
    pub prefix: String,
    pub root: Note,
    pub quality: String,
    pub bass: Option<Note>,
    pub tail: String,
}

impl ChordToken {
    pub fn parse(name: &str) -> Option<ChordToken> {
        let (prefix, body) = match name.strip_prefix('(') {
            Some(rest) => ("(", rest),
            None => ("", name),
        };
        let (root, rest) = Note::parse_prefix(body)?;

        // a slash only introduces a bass note when a note follows it
        if let Some(pos) = rest.rfind('/') {
            if let Some((bass, tail)) = Note::parse_prefix(&rest[pos + 1..]) {
                if tail.is_empty() || tail == ")" {
                    return Some(ChordToken {
                        prefix: prefix.to_string(),
                        root,
                        quality: rest[..pos].to_string(),
                        bass: Some(bass),
                        tail: tail.to_string(),
                    });
                }
            }
        }
        Some(ChordToken {
            prefix: prefix.to_string(),
            root,
            quality: rest.to_string(),
            bass: None,
            tail: String::new(),
        })
    }

    pub fn transpose(&self, semitones: i32) -> ChordToken {
        let spelling = spelling_for(semitones);
        ChordToken {
            prefix: self.prefix.clone(),
            root: self.root.transpose(semitones, spelling),
            quality: self.quality.clone(),
            bass: self.bass.map(|b| b.transpose(semitones, spelling)),
            tail: self.tail.clone(),
        }
    }
}

impl fmt::Display for ChordToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.root, self.quality)?;
        if let Some(bass) = self.bass {
            write!(f, "/{bass}")?;
        }
        write!(f, "{}", self.tail)
    }
}

/// Sharps when moving up, flats when moving down.
pub fn spelling_for(semitones: i32) -> Spelling {
    if semitones < 0 {
        Spelling::Flats
    } else {
        Spelling::Sharps
    }
}

/// Transpose a chord name by `semitones`.
///
/// A shift that is a multiple of an octave leaves the name untouched.
pub fn transpose_name(name: &str, semitones: i32) -> Result<String, Problem> {
    if is_no_chord(name) || semitones.rem_euclid(12) == 0 {
        return Ok(name.to_string());
    }
    let token = ChordToken::parse(name).ok_or_else(|| Problem::Transpose(name.to_string()))?;
    Ok(token.transpose(semitones).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_parts() {
        let token = ChordToken::parse("F#m7/C#").unwrap();
        assert_eq!(token.root.to_string(), "F#");
        assert_eq!(token.quality, "m7");
        assert_eq!(token.bass.unwrap().to_string(), "C#");

        let token = ChordToken::parse("C6/9").unwrap();
        assert_eq!(token.quality, "6/9");
        assert!(token.bass.is_none());

        assert!(ChordToken::parse("Z#").is_none());
        assert!(ChordToken::parse("").is_none());
    }

    #[test]
    fn semitones_wrap_around_the_octave() {
        let pitch = |s: &str| Note::parse_prefix(s).unwrap().0.semitone();
        assert_eq!(pitch("C"), 0);
        assert_eq!(pitch("Cb"), 11);
        assert_eq!(pitch("B#"), 0);
        assert_eq!(pitch("F#"), 6);
    }

    #[test]
    fn transpose_up_uses_sharps() {
        assert_eq!(transpose_name("C", 1).unwrap(), "C#");
        assert_eq!(transpose_name("Am7", 2).unwrap(), "Bm7");
        assert_eq!(transpose_name("Bb", 2).unwrap(), "C");
        assert_eq!(transpose_name("G/B", 2).unwrap(), "A/C#");
        assert_eq!(transpose_name("(Dsus4)", 5).unwrap(), "(Gsus4)");
    }

    #[test]
    fn transpose_down_uses_flats() {
        assert_eq!(transpose_name("C", -1).unwrap(), "B");
        assert_eq!(transpose_name("D", -1).unwrap(), "Db");
        assert_eq!(transpose_name("E7/G#", -3).unwrap(), "Db7/F");
    }

    #[test]
    fn octave_and_sentinel_untouched() {
        assert_eq!(transpose_name("Db", 12).unwrap(), "Db");
        assert_eq!(transpose_name("n.c.", 3).unwrap(), "n.c.");
    }

    #[test]
    fn unknown_root_fails() {
        assert_eq!(
            transpose_name("Z#", 2),
            Err(Problem::Transpose("Z#".to_string()))
        );
        assert!(transpose_name("h7", 2).is_err());
    }

    #[test]
    fn round_trip_restores_pitch_and_quality() {
        let names = [
            "C", "C#m", "Db7", "Ebmaj7", "F#sus4", "Gb", "Ab/C", "Bbm7b5", "B", "E9",
        ];
        for shift in 1..12 {
            for name in names {
                let up = transpose_name(name, shift).unwrap();
                let back = transpose_name(&up, (12 - shift) % 12).unwrap();
                let a = ChordToken::parse(name).unwrap();
                let b = ChordToken::parse(&back).unwrap();
                assert_eq!(a.root.semitone(), b.root.semitone(), "{name} +{shift}");
                assert_eq!(a.quality, b.quality);
                assert_eq!(a.bass.map(Note::semitone), b.bass.map(Note::semitone));
            }
        }
    }

    #[test]
    fn round_trip_keeps_natural_spelling() {
        for shift in 1..12 {
            for name in ["C", "D", "E", "F", "G", "A", "B"] {
                let up = transpose_name(name, shift).unwrap();
                let back = transpose_name(&up, 12 - shift).unwrap();
                assert_eq!(back, name);
            }
        }
    }
}
