//! Builtin fingerings for common guitar chords.
use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::chord::{ChordDefinition, Difficulty, Fingering, Origin, STRINGS};

use Difficulty::{Easy, Hard};

const X: i8 = -1;

// name, base fret, frets relative to the base fret (low E first), difficulty
#[rustfmt::skip]
const TABLE: &[(&str, u8, [i8; STRINGS], Difficulty)] = &[
    ("C",      1, [X, 3, 2, 0, 1, 0], Easy),
    ("C#",     4, [X, 1, 3, 3, 3, 1], Hard),
    ("Db",     4, [X, 1, 3, 3, 3, 1], Hard),
    ("D",      1, [X, X, 0, 2, 3, 2], Easy),
    ("D#",     6, [X, 1, 3, 3, 3, 1], Hard),
    ("Eb",     6, [X, 1, 3, 3, 3, 1], Hard),
    ("E",      1, [0, 2, 2, 1, 0, 0], Easy),
    ("F",      1, [1, 3, 3, 2, 1, 1], Hard),
    ("F#",     2, [1, 3, 3, 2, 1, 1], Hard),
    ("Gb",     2, [1, 3, 3, 2, 1, 1], Hard),
    ("G",      1, [3, 2, 0, 0, 0, 3], Easy),
    ("G#",     4, [1, 3, 3, 2, 1, 1], Hard),
    ("Ab",     4, [1, 3, 3, 2, 1, 1], Hard),
    ("A",      1, [X, 0, 2, 2, 2, 0], Easy),
    ("A#",     1, [X, 1, 3, 3, 3, 1], Hard),
    ("Bb",     1, [X, 1, 3, 3, 3, 1], Hard),
    ("B",      2, [X, 1, 3, 3, 3, 1], Hard),

    ("Cm",     3, [X, 1, 3, 3, 2, 1], Hard),
    ("C#m",    4, [X, 1, 3, 3, 2, 1], Hard),
    ("Dbm",    4, [X, 1, 3, 3, 2, 1], Hard),
    ("Dm",     1, [X, X, 0, 2, 3, 1], Easy),
    ("D#m",    6, [X, 1, 3, 3, 2, 1], Hard),
    ("Ebm",    6, [X, 1, 3, 3, 2, 1], Hard),
    ("Em",     1, [0, 2, 2, 0, 0, 0], Easy),
    ("Fm",     1, [1, 3, 3, 1, 1, 1], Hard),
    ("F#m",    2, [1, 3, 3, 1, 1, 1], Hard),
    ("Gbm",    2, [1, 3, 3, 1, 1, 1], Hard),
    ("Gm",     3, [1, 3, 3, 1, 1, 1], Hard),
    ("G#m",    4, [1, 3, 3, 1, 1, 1], Hard),
    ("Abm",    4, [1, 3, 3, 1, 1, 1], Hard),
    ("Am",     1, [X, 0, 2, 2, 1, 0], Easy),
    ("A#m",    1, [X, 1, 3, 3, 2, 1], Hard),
    ("Bbm",    1, [X, 1, 3, 3, 2, 1], Hard),
    ("Bm",     2, [X, 1, 3, 3, 2, 1], Hard),

    ("C7",     1, [X, 3, 2, 3, 1, 0], Easy),
    ("C#7",    4, [X, 1, 3, 1, 3, 1], Hard),
    ("D7",     1, [X, X, 0, 2, 1, 2], Easy),
    ("Eb7",    6, [X, 1, 3, 1, 3, 1], Hard),
    ("E7",     1, [0, 2, 0, 1, 0, 0], Easy),
    ("F7",     1, [1, 3, 1, 2, 1, 1], Hard),
    ("F#7",    2, [1, 3, 1, 2, 1, 1], Hard),
    ("G7",     1, [3, 2, 0, 0, 0, 1], Easy),
    ("Ab7",    4, [1, 3, 1, 2, 1, 1], Hard),
    ("A7",     1, [X, 0, 2, 0, 2, 0], Easy),
    ("Bb7",    1, [X, 1, 3, 1, 3, 1], Hard),
    ("B7",     1, [X, 2, 1, 2, 0, 2], Easy),

    ("Cm7",    3, [X, 1, 3, 1, 2, 1], Hard),
    ("C#m7",   4, [X, 1, 3, 1, 2, 1], Hard),
    ("Dm7",    1, [X, X, 0, 2, 1, 1], Easy),
    ("Em7",    1, [0, 2, 0, 0, 0, 0], Easy),
    ("F#m7",   2, [1, 3, 1, 1, 1, 1], Hard),
    ("Gm7",    3, [1, 3, 1, 1, 1, 1], Hard),
    ("Am7",    1, [X, 0, 2, 0, 1, 0], Easy),
    ("Bm7",    2, [X, 1, 3, 1, 2, 1], Hard),

    ("Cmaj7",  1, [X, 3, 2, 0, 0, 0], Easy),
    ("Dmaj7",  1, [X, X, 0, 2, 2, 2], Easy),
    ("Emaj7",  1, [0, 2, 1, 1, 0, 0], Easy),
    ("Fmaj7",  1, [X, X, 3, 2, 1, 0], Easy),
    ("Gmaj7",  1, [3, 2, 0, 0, 0, 2], Easy),
    ("Amaj7",  1, [X, 0, 2, 1, 2, 0], Easy),

    ("Csus4",  1, [X, 3, 3, 0, 1, 1], Easy),
    ("Dsus2",  1, [X, X, 0, 2, 3, 0], Easy),
    ("Dsus4",  1, [X, X, 0, 2, 3, 3], Easy),
    ("Esus4",  1, [0, 2, 2, 2, 0, 0], Easy),
    ("Gsus4",  1, [3, 3, 0, 0, 1, 3], Easy),
    ("Asus2",  1, [X, 0, 2, 2, 0, 0], Easy),
    ("Asus4",  1, [X, 0, 2, 2, 3, 0], Easy),

    ("Cadd9",  1, [X, 3, 2, 0, 3, 0], Easy),
    ("C/G",    1, [3, 3, 2, 0, 1, 0], Easy),
    ("D/F#",   1, [2, 0, 0, 2, 3, 2], Easy),
    ("G/B",    1, [X, 2, 0, 0, 0, 3], Easy),
    ("Bdim",   1, [X, 2, 3, 4, 3, X], Hard),
    ("E9",     1, [0, 2, 0, 1, 0, 2], Hard),
    ("A6",     1, [X, 0, 2, 2, 2, 2], Hard),
];

static BUILTIN: Lazy<Vec<ChordDefinition>> = Lazy::new(|| {
    TABLE
        .iter()
        .map(|&(name, base, frets, difficulty)| ChordDefinition {
            name: name.to_string(),
            origin: Origin::Builtin,
            difficulty,
            fingering: Some(Fingering::from_relative(base, frets)),
        })
        .collect()
});

static BY_NAME: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    TABLE
        .iter()
        .enumerate()
        .map(|(i, (name, ..))| (*name, i))
        .collect()
});

pub fn lookup(name: &str) -> Option<&'static ChordDefinition> {
    BY_NAME.get(name).map(|&i| &BUILTIN[i])
}

/// Every builtin chord in table order.
pub fn all() -> &'static [ChordDefinition] {
    &BUILTIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::GRID_ROWS;

    #[test]
    fn every_builtin_fits_the_grid() {
        for def in all() {
            let fingering = def.fingering.as_ref().unwrap();
            assert!(fingering.fits(GRID_ROWS), "{}", def.name);
        }
    }

    #[test]
    fn names_are_unique() {
        assert_eq!(BY_NAME.len(), TABLE.len());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(lookup("Am").is_some());
        assert!(lookup("am").is_none());
        assert_eq!(lookup("G").unwrap().difficulty, Difficulty::Easy);
    }
}
