//! Chord fingerings and the per-run chord database.
use std::collections::HashMap;
use std::fmt;

use crate::builtin;
use crate::error::Problem;

pub const STRINGS: usize = 6;
/// Fret rows drawn in one chord diagram.
pub const GRID_ROWS: u8 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Origin {
    Builtin,
    RcDefined,
    UserDefined,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    Easy,
    Hard,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fret {
    Open,
    Muted,
    /// Absolute fret number on the neck.
    At(u8),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fingering {
    pub base_fret: u8,
    pub frets: [Fret; STRINGS],
    /// Base fret as written, when auto-adjust moved it.
    pub adjusted_from: Option<u8>,
    /// Fretted positions span more rows than the diagram has.
    pub ungridable: bool,
}

impl Fingering {
    /// Build from frets written relative to `base_fret` (1 = first grid row).
    /// `-1` is a muted string, `0` an open one. Positions past the last
    /// representable fret are clamped.
    pub fn from_relative(base_fret: u8, relative: [i8; STRINGS]) -> Self {
        let base_fret = base_fret.max(1);
        let frets = relative.map(|r| match r {
            r if r < 0 => Fret::Muted,
            0 => Fret::Open,
            r => Fret::At(base_fret.saturating_add(r as u8 - 1)),
        });
        Fingering {
            base_fret,
            frets,
            adjusted_from: None,
            ungridable: false,
        }
    }

    /// Like [`from_relative`](Self::from_relative), but `None` when a fretted
    /// string lands past the last representable fret.
    pub fn try_from_relative(base_fret: u8, relative: [i8; STRINGS]) -> Option<Self> {
        let base = u16::from(base_fret.max(1));
        let fits = relative
            .iter()
            .filter(|r| **r > 0)
            .all(|r| base + *r as u16 - 1 <= u16::from(u8::MAX));
        fits.then(|| Self::from_relative(base_fret, relative))
    }

    /// Grid row of each fretted string.
    pub fn rows(&self) -> impl Iterator<Item = i32> + '_ {
        self.frets.iter().filter_map(move |f| match f {
            Fret::At(n) => Some(*n as i32 - self.base_fret as i32 + 1),
            _ => None,
        })
    }

    pub fn fits(&self, grid_rows: u8) -> bool {
        self.rows().all(|r| (1..=grid_rows as i32).contains(&r))
    }

    /// Number of frets between the lowest and highest fretted position.
    pub fn span(&self) -> Option<u8> {
        let fretted = self.frets.iter().filter_map(|f| match f {
            Fret::At(n) => Some(*n),
            _ => None,
        });
        let (min, max) = fretted.fold(None, |acc: Option<(u8, u8)>, n| match acc {
            None => Some((n, n)),
            Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
        })?;
        Some(max - min + 1)
    }

    /// Move the base fret so every fretted row lands inside the diagram.
    ///
    /// Returns `Ok(true)` when the base fret changed and `Err(span)` when the
    /// fingering cannot fit; in that case it is left as written and flagged.
    pub fn auto_adjust(&mut self, grid_rows: u8) -> Result<bool, u8> {
        if self.fits(grid_rows) {
            return Ok(false);
        }
        let span = self.span().unwrap_or(0);
        if span > grid_rows {
            self.ungridable = true;
            return Err(span);
        }
        let highest = self
            .frets
            .iter()
            .filter_map(|f| match f {
                Fret::At(n) => Some(*n),
                _ => None,
            })
            .max()
            .unwrap_or(1);
        let base = highest.saturating_sub(grid_rows).saturating_add(1).max(1);
        self.adjusted_from = Some(self.base_fret);
        self.base_fret = base;
        Ok(true)
    }

    fn relative_frets(&self) -> impl Iterator<Item = String> + '_ {
        self.frets.iter().map(move |f| match f {
            Fret::Muted => "x".to_string(),
            Fret::Open => "0".to_string(),
            Fret::At(n) => (*n as i32 - self.base_fret as i32 + 1).to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChordDefinition {
    pub name: String,
    pub origin: Origin,
    pub difficulty: Difficulty,
    /// `None` for chords that are only known by name.
    pub fingering: Option<Fingering>,
}

impl ChordDefinition {
    pub fn stub(name: &str) -> Self {
        ChordDefinition {
            name: name.to_string(),
            origin: Origin::UserDefined,
            difficulty: Difficulty::Hard,
            fingering: None,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.fingering.is_none()
    }

    /// Marker printed next to the diagram of chords defined in the song itself.
    pub fn origin_label(&self) -> Option<&'static str> {
        match (self.origin, &self.fingering) {
            (Origin::UserDefined, Some(_)) => Some("*"),
            _ => None,
        }
    }
}

impl fmt::Display for ChordDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fingering {
            Some(fingering) => {
                write!(f, "{} base-fret {} frets", self.name, fingering.base_fret)?;
                for fret in fingering.relative_frets() {
                    write!(f, " {fret}")?;
                }
                Ok(())
            }
            None => write!(f, "{}", self.name),
        }
    }
}

/// Positional argument order of `define` when no keywords are given.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DefineLayout {
    /// `name base f1 .. f6`
    #[default]
    Old,
    /// `name f1 .. f6 base`
    New,
}

fn invalid(name: &str, reason: impl Into<String>) -> Problem {
    Problem::InvalidChordDefinition {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn parse_fret(name: &str, token: &str) -> Result<i8, Problem> {
    match token {
        "x" | "X" | "-" => Ok(-1),
        _ => token
            .parse::<i8>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| invalid(name, format!("bad fret value {token:?}"))),
    }
}

fn parse_base(name: &str, token: &str) -> Result<u8, Problem> {
    token
        .parse::<u8>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| invalid(name, format!("bad base fret {token:?}")))
}

fn parse_frets(name: &str, tokens: &[&str]) -> Result<[i8; STRINGS], Problem> {
    if tokens.len() < STRINGS {
        return Err(invalid(
            name,
            format!("expected {STRINGS} frets, found {}", tokens.len()),
        ));
    }
    let mut frets = [0i8; STRINGS];
    for (slot, token) in frets.iter_mut().zip(tokens) {
        *slot = parse_fret(name, token)?;
    }
    Ok(frets)
}

fn split_args(args: &str) -> Vec<&str> {
    args.split(|c: char| c == ':' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parse the arguments of a `define` directive.
pub fn parse_define(
    args: &str,
    layout: DefineLayout,
    origin: Origin,
) -> Result<ChordDefinition, Problem> {
    let tokens = split_args(args);
    let (name, rest) = tokens
        .split_first()
        .ok_or(Problem::MissingArgument("define"))?;
    if rest.is_empty() {
        return Err(invalid(name, "no fingering given"));
    }

    let keyworded = rest
        .iter()
        .any(|t| t.eq_ignore_ascii_case("base-fret") || t.eq_ignore_ascii_case("frets"));
    let (base, frets) = if keyworded {
        let mut base = 1u8;
        let mut frets = None;
        let mut i = 0;
        while i < rest.len() {
            if rest[i].eq_ignore_ascii_case("base-fret") {
                let token = rest
                    .get(i + 1)
                    .ok_or_else(|| invalid(name, "base-fret without value"))?;
                base = parse_base(name, token)?;
                i += 2;
            } else if rest[i].eq_ignore_ascii_case("frets") {
                let end = (i + 1 + STRINGS).min(rest.len());
                frets = Some(parse_frets(name, &rest[i + 1..end])?);
                i = end;
            } else {
                return Err(invalid(name, format!("unexpected {:?}", rest[i])));
            }
        }
        (base, frets.ok_or_else(|| invalid(name, "no frets given"))?)
    } else {
        match layout {
            DefineLayout::Old => {
                let base = parse_base(name, rest[0])?;
                (base, parse_frets(name, &rest[1..])?)
            }
            DefineLayout::New => {
                let frets = parse_frets(name, rest)?;
                let base = match rest.get(STRINGS) {
                    Some(token) => parse_base(name, token)?,
                    None => 1,
                };
                (base, frets)
            }
        }
    };

    let fingering = Fingering::try_from_relative(base, frets)
        .ok_or_else(|| invalid(name, format!("fret out of range above base fret {base}")))?;
    Ok(ChordDefinition {
        name: name.to_string(),
        origin,
        difficulty: Difficulty::Hard,
        fingering: Some(fingering),
    })
}

/// Parse the arguments of a `chord: name f1 .. f6 [base]` directive.
pub fn parse_chord_directive(args: &str, origin: Origin) -> Result<ChordDefinition, Problem> {
    parse_define(args, DefineLayout::New, origin)
}

/// Known chord fingerings plus the chords used by the current song.
#[derive(Clone, Debug)]
pub struct ChordDatabase {
    definitions: HashMap<String, ChordDefinition>,
    used: Vec<String>,
    auto_adjust: bool,
}

impl ChordDatabase {
    pub fn new(auto_adjust: bool) -> Self {
        Self {
            definitions: HashMap::new(),
            used: Vec::new(),
            auto_adjust,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ChordDefinition> {
        self.definitions.get(name).or_else(|| builtin::lookup(name))
    }

    /// Record a chord use, creating a stub for unknown names.
    pub fn use_chord(&mut self, name: &str) -> &ChordDefinition {
        if !self.used.iter().any(|n| n == name) {
            self.used.push(name.to_string());
        }
        if !self.definitions.contains_key(name) {
            if let Some(def) = builtin::lookup(name) {
                return def;
            }
            log::debug!("no fingering known for {name}");
            self.definitions
                .insert(name.to_string(), ChordDefinition::stub(name));
        }
        &self.definitions[name]
    }

    /// Register a definition, auto-adjusting its base fret when enabled.
    ///
    /// The definition is stored even when it cannot be fitted in the grid;
    /// that case is reported as [`Problem::Ungridable`].
    pub fn define(&mut self, mut def: ChordDefinition) -> Result<(), Problem> {
        let mut outcome = Ok(());
        if self.auto_adjust {
            if let Some(fingering) = def.fingering.as_mut() {
                match fingering.auto_adjust(GRID_ROWS) {
                    Ok(true) => log::debug!(
                        "{}: base fret moved to {}",
                        def.name,
                        fingering.base_fret
                    ),
                    Ok(false) => {}
                    Err(span) => {
                        outcome = Err(Problem::Ungridable {
                            name: def.name.clone(),
                            span,
                        })
                    }
                }
            }
        }
        self.definitions.insert(def.name.clone(), def);
        outcome
    }

    /// Chords used by the current song, in order of first use.
    pub fn used(&self) -> impl Iterator<Item = &ChordDefinition> {
        self.used.iter().filter_map(|name| self.get(name))
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Forget the chords used so far; optionally drop song-level definitions.
    pub fn start_song(&mut self, drop_song_definitions: bool) {
        self.used.clear();
        if drop_song_definitions {
            self.definitions
                .retain(|_, def| def.origin != Origin::UserDefined);
        }
    }

    /// Every chord with a fingering that is known outside any song: builtins,
    /// then configuration-file definitions sorted by name.
    pub fn known(&self) -> Vec<&ChordDefinition> {
        let mut known: Vec<&ChordDefinition> = builtin::all()
            .iter()
            .filter(|def| match self.definitions.get(&def.name) {
                Some(over) => over.origin == Origin::Builtin,
                None => true,
            })
            .collect();
        let mut configured: Vec<&ChordDefinition> = self
            .definitions
            .values()
            .filter(|def| def.origin == Origin::RcDefined && !def.is_stub())
            .collect();
        configured.sort_by(|a, b| a.name.cmp(&b.name));
        known.extend(configured);
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn define_with_keywords() {
        let def = parse_define(
            "Am7 base-fret 5 frets x 1 3 1 2 1",
            DefineLayout::Old,
            Origin::UserDefined,
        )
        .unwrap();
        let fingering = def.fingering.unwrap();
        assert_eq!(fingering.base_fret, 5);
        assert_eq!(fingering.frets[0], Fret::Muted);
        assert_eq!(fingering.frets[1], Fret::At(5));
        assert_eq!(fingering.frets[2], Fret::At(7));
    }

    #[test]
    fn define_positional_layouts() {
        let old = parse_define("G 1 3 2 0 0 0 3", DefineLayout::Old, Origin::RcDefined).unwrap();
        let new = parse_define("G 3 2 0 0 0 3 1", DefineLayout::New, Origin::RcDefined).unwrap();
        assert_eq!(old.fingering, new.fingering);
        assert_eq!(old.origin, Origin::RcDefined);
    }

    #[test]
    fn define_errors() {
        assert_eq!(
            parse_define("", DefineLayout::Old, Origin::UserDefined),
            Err(Problem::MissingArgument("define"))
        );
        assert!(parse_define("Am", DefineLayout::Old, Origin::UserDefined).is_err());
        assert!(parse_define("Am 1 x 0 2 2", DefineLayout::Old, Origin::UserDefined).is_err());
        assert!(parse_define("Am 0 x 0 2 2 1 0", DefineLayout::Old, Origin::UserDefined).is_err());
        assert!(parse_define("Am 1 x 0 q 2 1 0", DefineLayout::Old, Origin::UserDefined).is_err());
    }

    #[test]
    fn define_rejects_frets_past_the_neck() {
        let err = parse_define(
            "X base-fret 200 frets 100 0 0 0 0 0",
            DefineLayout::Old,
            Origin::UserDefined,
        )
        .unwrap_err();
        assert!(matches!(err, Problem::InvalidChordDefinition { ref name, .. } if name == "X"));
        let def = parse_define(
            "Y base-fret 200 frets 56 0 0 0 0 x",
            DefineLayout::Old,
            Origin::UserDefined,
        )
        .unwrap();
        assert_eq!(def.fingering.unwrap().frets[0], Fret::At(255));
    }

    #[test]
    fn chord_directive_defaults_base() {
        let def = parse_chord_directive("D x x 0 2 3 2", Origin::UserDefined).unwrap();
        assert_eq!(def.fingering.unwrap().base_fret, 1);
    }

    #[test]
    fn auto_adjust_shifts_out_of_range_rows() {
        let mut fingering = Fingering::from_relative(1, [-1, 6, 8, 8, 7, 6]);
        assert!(!fingering.fits(GRID_ROWS));
        assert_eq!(fingering.auto_adjust(GRID_ROWS), Ok(true));
        assert_eq!(fingering.adjusted_from, Some(1));
        assert_eq!(fingering.base_fret, 4);
        assert!(fingering.fits(GRID_ROWS));
    }

    #[test]
    fn auto_adjust_flags_wide_spans() {
        let mut fingering = Fingering::from_relative(1, [1, 0, 0, 0, 0, 7]);
        assert_eq!(fingering.auto_adjust(GRID_ROWS), Err(7));
        assert!(fingering.ungridable);
        assert_eq!(fingering.base_fret, 1);
    }

    #[test]
    fn adjusted_rows_always_in_range_or_flagged() {
        for base in 1..=9u8 {
            for low in 1..=12i8 {
                for width in 0..=6i8 {
                    let mut fingering =
                        Fingering::from_relative(base, [-1, low, low + width, 0, low, -1]);
                    let _ = fingering.auto_adjust(GRID_ROWS);
                    assert!(fingering.fits(GRID_ROWS) || fingering.ungridable);
                }
            }
        }
    }

    #[test]
    fn database_lookup_or_stub() {
        let mut db = ChordDatabase::new(true);
        assert!(!db.use_chord("Am").is_stub());
        assert!(db.use_chord("Qwerty").is_stub());
        db.use_chord("Am");
        assert_eq!(db.used_count(), 2);

        db.define(parse_chord_directive("Qwerty 0 2 2 0 0 0", Origin::UserDefined).unwrap())
            .unwrap();
        let names: Vec<_> = db.used().map(|d| (d.name.as_str(), d.is_stub())).collect();
        assert_eq!(names, vec![("Am", false), ("Qwerty", false)]);
    }

    #[test]
    fn song_definitions_persist_unless_dropped() {
        let mut db = ChordDatabase::new(true);
        db.define(parse_chord_directive("X1 0 2 2 0 0 0", Origin::UserDefined).unwrap())
            .unwrap();
        db.define(parse_chord_directive("R1 0 2 2 0 0 0", Origin::RcDefined).unwrap())
            .unwrap();
        db.start_song(false);
        assert!(db.get("X1").is_some());
        db.start_song(true);
        assert!(db.get("X1").is_none());
        assert!(db.get("R1").is_some());
        assert_eq!(db.used_count(), 0);
    }

    #[test]
    fn display_uses_define_syntax() {
        let def = parse_define(
            "Bb base-fret 1 frets x 1 3 3 3 1",
            DefineLayout::Old,
            Origin::UserDefined,
        )
        .unwrap();
        assert_eq!(def.to_string(), "Bb base-fret 1 frets x 1 3 3 3 1");
        assert_eq!(def.origin_label(), Some("*"));
    }
}
