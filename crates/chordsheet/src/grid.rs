//! Chord grid appendix and chord dumps.
use std::fmt::Write as _;

use crate::chord::{ChordDatabase, ChordDefinition, Difficulty, Origin};
use crate::error::Result;
use crate::style::FontSlot;
use crate::typesetter::Typesetter;
use crate::Renderer;

/// Horizontal room taken by one diagram, as a multiple of the grid size.
const CELL_WIDTH_FACTOR: f64 = 1.7;
/// Vertical room taken by one diagram, as a multiple of the grid size.
const CELL_HEIGHT_FACTOR: f64 = 1.5;

impl<R: Renderer> Typesetter<R> {
    /// Draw the chords used by the song, in order of first use.
    pub(crate) fn draw_chord_grids(&mut self) -> Result<()> {
        let no_easy = self.settings.no_easy_grids;
        let chords: Vec<ChordDefinition> = self
            .state
            .chords
            .used()
            .filter(|def| {
                !(no_easy && def.origin == Origin::Builtin && def.difficulty == Difficulty::Easy)
            })
            .cloned()
            .collect();
        self.lay_out_grids(&chords)
    }

    /// Lay `chords` out left to right, wrapping rows and pages.
    pub(crate) fn lay_out_grids(&mut self, chords: &[ChordDefinition]) -> Result<()> {
        if chords.is_empty() {
            return Ok(());
        }
        let size = self.settings.grid_size;
        let font = self.state.styles.current(FontSlot::Chord).clone();
        let cell_width = size * CELL_WIDTH_FACTOR;
        let cell_height = size * CELL_HEIGHT_FACTOR + font.size as f64 + 4.0;

        self.pay_blank_space()?;
        let mut h = self.state.geometry.left_margin;
        self.ensure_grid_room(cell_height)?;
        for chord in chords {
            if h + cell_width > self.state.geometry.width {
                h = self.state.geometry.left_margin;
                self.state.cursor.vertical_pos -= cell_height;
                self.ensure_grid_room(cell_height)?;
            }
            let v = self.state.cursor.vertical_pos;
            let label = chord.origin_label();
            self.render(|r| r.move_to(h, v))?;
            self.render(|r| r.draw_chord_grid(chord, label, &font, size))?;
            h += cell_width;
        }
        self.state.cursor.vertical_pos -= cell_height;
        Ok(())
    }

    fn ensure_grid_room(&mut self, height: f64) -> Result<()> {
        if self.state.cursor.vertical_pos - height < self.state.geometry.bottom {
            self.end_logical_page(false)?;
            self.start_page()?;
        }
        Ok(())
    }
}

impl ChordDatabase {
    /// One line per known chord: name, origin and fingering.
    pub fn dump_text(&self) -> String {
        let mut out = String::new();
        for def in self.known() {
            let origin = match def.origin {
                Origin::Builtin => "builtin",
                Origin::RcDefined => "chordrc",
                Origin::UserDefined => "song",
            };
            let _ = writeln!(out, "{origin:<8} {def}");
        }
        out
    }
}
