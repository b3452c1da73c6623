//! chordsheet: chord-over-lyrics markup interpreter and page layout engine.
//! Features: markup parsing, directive handling, column/page layout,
//! chord database with transposition and grid fitting.

mod buffer;
mod builtin;
pub mod chord;
mod diagnostics;
pub mod directive;
mod dispatch;
mod error;
mod grid;
mod layout;
pub mod page;
pub mod parser;
mod settings;
pub mod style;
mod toc;
pub mod transpose;
mod typesetter;

pub use buffer::{BufferKind, MAX_CHORD_NAME_LEN, MAX_DIRECTIVE_LEN, MAX_TEXT_LEN};
pub use chord::{ChordDatabase, ChordDefinition, Difficulty, Fingering, Fret, Origin, GRID_ROWS};
pub use diagnostics::Diagnostic;
pub use error::{Problem, Result, SheetError};
pub use layout::{Chorus, LayoutCursor};
pub use page::{PageGeometry, Pagination};
pub use settings::{Overrides, Settings};
pub use style::{FontSlot, FontSpec, StyleState};
pub use toc::TocEntry;
pub use typesetter::{DocumentState, Modes, Typesetter};

// Test utilities
pub mod test_support;

/// A point on the page, in points from the bottom-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub h: f64,
    pub v: f64,
}

impl Point {
    pub fn new(h: f64, v: f64) -> Self {
        Self { h, v }
    }
}

/// Coordinate change applied on top of the ones already in effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translate: (f64, f64),
    pub scale: f64,
    pub rotate: f64,
}

impl Transform {
    pub fn translate(h: f64, v: f64) -> Self {
        Self {
            translate: (h, v),
            scale: 1.0,
            rotate: 0.0,
        }
    }

    pub fn scale_rotate(scale: f64, rotate: f64) -> Self {
        Self {
            translate: (0.0, 0.0),
            scale,
            rotate,
        }
    }
}

/// Horizontal placement of text relative to the current point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    /// Text ends at the current point.
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Decoration {
    #[default]
    Plain,
    /// Grey band behind the text.
    Shaded,
    /// Frame around the text.
    Boxed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub align: Align,
    pub decoration: Decoration,
}

impl TextStyle {
    pub const PLAIN: TextStyle = TextStyle {
        align: Align::Left,
        decoration: Decoration::Plain,
    };

    pub fn aligned(align: Align) -> Self {
        Self {
            align,
            decoration: Decoration::Plain,
        }
    }

    pub fn decorated(decoration: Decoration) -> Self {
        Self {
            align: Align::Left,
            decoration,
        }
    }
}

/// A chord name placed above a lyrics line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayChord {
    /// Character offset into the lyrics text.
    pub offset: usize,
    pub name: String,
}

/// One physical input line: lyrics plus the chords placed over it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub text: String,
    pub chords: Vec<OverlayChord>,
}

impl Line {
    pub fn has_chords(&self) -> bool {
        !self.chords.is_empty()
    }

    /// True when the lyrics hold nothing but spaces.
    pub fn is_blank(&self) -> bool {
        self.text.trim_start_matches(' ').is_empty()
    }
}

/// Output device driven by the typesetter.
///
/// Text and chord widths are only known to the renderer, so placement along a
/// line (chord offsets, centering, decorations) is left to it. Vertical
/// placement and page structure are decided by the caller.
pub trait Renderer {
    type Error: std::fmt::Display;

    fn begin_document(&mut self, _geometry: &PageGeometry) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    fn end_document(&mut self, _sheets: u32) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    fn begin_physical_page(&mut self, index: u32) -> std::result::Result<(), Self::Error>;
    fn end_physical_page(&mut self, index: u32) -> std::result::Result<(), Self::Error>;

    /// Applied on top of the transforms already in effect on this sheet.
    fn apply_transform(&mut self, transform: &Transform) -> std::result::Result<(), Self::Error>;

    /// Drop every transform applied since the sheet began.
    fn reset_transform(&mut self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    fn move_to(&mut self, h: f64, v: f64) -> std::result::Result<(), Self::Error>;

    /// Show `text` at the current point.
    fn show_text(
        &mut self,
        text: &str,
        slot: FontSlot,
        font: &FontSpec,
        style: TextStyle,
    ) -> std::result::Result<(), Self::Error>;

    /// Show the chords of `line` on a row whose baseline is the current point.
    ///
    /// Each chord starts above its offset in the lyrics as set in `text_font`,
    /// pushed right when it would overlap the previous chord.
    fn show_chords(
        &mut self,
        line: &Line,
        text_font: &FontSpec,
        chord_font: &FontSpec,
    ) -> std::result::Result<(), Self::Error>;

    fn stroke_line(&mut self, points: &[Point], width: f64) -> std::result::Result<(), Self::Error>;

    /// Draw the fingering diagram of `chord` with its top-left corner at the
    /// current point. Chords without a fingering only get their name.
    fn draw_chord_grid(
        &mut self,
        chord: &ChordDefinition,
        origin_label: Option<&str>,
        font: &FontSpec,
        grid_size: f64,
    ) -> std::result::Result<(), Self::Error>;
}
