//! Vertical cursor, columns, logical pages and physical sheets.
use crate::error::Result;
use crate::page::{PageGeometry, Pagination};
use crate::style::{FontSlot, FontSpec, DEFAULT_TEXT_SIZE};
use crate::typesetter::Typesetter;
use crate::{Align, Line, Point, Renderer, TextStyle, Transform};

/// Distance of the chorus bar left of the text, in points.
pub const CHORUS_BAR_OFFSET: f64 = 10.0;
/// Footer lines (running title, page numbers) use this size.
pub const FOOTER_TEXT_SIZE: i32 = DEFAULT_TEXT_SIZE - 2;
/// Inset of page numbers from the paper edges.
const PAGE_NUMBER_INSET: f64 = 72.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Chorus {
    Off,
    /// Started; the bar begins with the next printed line.
    Pending,
    Open { top: f64 },
}

#[derive(Clone, Debug)]
pub struct LayoutCursor {
    pub vertical_pos: f64,
    pub horizontal_pos: f64,
    pub column_index: u32,
    pub max_columns: u32,
    pub column_top: f64,
    pub column_width: f64,
    /// Lowest point reached by the columns left behind on this page.
    pub lowest_column_pos: f64,
    pub pagination: Pagination,
    /// Logical pages begun on the open sheet; zero when no sheet is open.
    pub sheet_slot: u32,
    pub physical_page_count: u32,
    pub logical_page_count: u32,
    pub song_unit_page_count: u32,
    /// Number of the open sheet as printed.
    pub page_label: i64,
    /// Number of the open logical page as printed.
    pub logical_label: i64,
    /// Vertical space owed by blank lines, paid before the next output.
    pub blank_space: f64,
    pub chorus: Chorus,
}

impl LayoutCursor {
    pub fn new(geometry: &PageGeometry, pagination: Pagination, first_page: i64) -> Self {
        Self {
            vertical_pos: geometry.top,
            horizontal_pos: geometry.left_margin,
            column_index: 0,
            max_columns: 1,
            column_top: geometry.top,
            column_width: geometry.text_width(),
            lowest_column_pos: geometry.top,
            pagination,
            sheet_slot: 0,
            physical_page_count: 0,
            logical_page_count: 0,
            song_unit_page_count: 0,
            page_label: first_page - 1,
            logical_label: 0,
            blank_space: 0.0,
            chorus: Chorus::Off,
        }
    }

    /// Split the remaining page into `columns` columns starting here.
    pub fn set_columns(&mut self, columns: u32, geometry: &PageGeometry) {
        self.max_columns = columns.max(1);
        self.column_index = 0;
        self.column_top = self.vertical_pos;
        self.column_width = geometry.text_width() / self.max_columns as f64;
        self.horizontal_pos = geometry.left_margin;
    }

    pub fn on_last_column(&self) -> bool {
        self.column_index + 1 >= self.max_columns
    }
}

impl<R: Renderer> Typesetter<R> {
    /// Move the cursor down, breaking the column below the bottom margin.
    pub fn advance(&mut self, amount: f64) -> Result<()> {
        self.state.cursor.vertical_pos -= amount;
        if self.state.cursor.vertical_pos < self.state.geometry.bottom {
            self.break_column()?;
        }
        Ok(())
    }

    pub fn break_column(&mut self) -> Result<()> {
        if self.state.cursor.on_last_column() {
            self.end_logical_page(false)?;
            return self.start_page();
        }
        let left = self.state.geometry.left_margin;
        let cursor = &mut self.state.cursor;
        cursor.column_index += 1;
        cursor.lowest_column_pos = cursor.lowest_column_pos.min(cursor.vertical_pos);
        cursor.vertical_pos = cursor.column_top;
        cursor.horizontal_pos = left + cursor.column_index as f64 * cursor.column_width;
        log::debug!("column {}", cursor.column_index);
        Ok(())
    }

    /// Begin a logical page, and a physical sheet when none is open.
    pub fn start_page(&mut self) -> Result<()> {
        let geometry = &self.state.geometry;
        let (top, bottom, left, width) = (
            geometry.top,
            geometry.bottom,
            geometry.left_margin,
            geometry.width,
        );
        let pagination = self.state.cursor.pagination;
        let (scale, rotation) = pagination.sheet_transform(geometry);

        let cursor = &mut self.state.cursor;
        cursor.sheet_slot += 1;
        cursor.logical_label += 1;
        cursor.logical_page_count += 1;
        let slot = cursor.sheet_slot;

        if slot == 1 {
            cursor.physical_page_count += 1;
            cursor.page_label += 1;
            let index = cursor.physical_page_count;
            log::debug!("sheet {index}");
            self.render(|r| r.begin_physical_page(index))?;
            if pagination != Pagination::One {
                self.render(|r| r.apply_transform(&Transform::scale_rotate(scale, rotation)))?;
            }
        }

        // each logical page moves the origin relative to the previous one
        let translation = match (pagination, slot) {
            (Pagination::Four, 1) => Some((left, (top + bottom) * 1.05)),
            (Pagination::Four, 2) | (Pagination::Four, 4) => Some((width - left, 0.0)),
            (Pagination::Four, 3) => Some((-(width - left), -top * 1.05)),
            (Pagination::Two, 1) => Some((0.0, -(top + bottom + left / scale))),
            (Pagination::Two, 2) => Some((width, 0.0)),
            _ => None,
        };
        if let Some((h, v)) = translation {
            self.render(|r| r.apply_transform(&Transform::translate(h, v)))?;
        }

        let cursor = &mut self.state.cursor;
        cursor.vertical_pos = top;
        cursor.lowest_column_pos = top;
        cursor.horizontal_pos = left;
        cursor.column_index = 0;
        cursor.song_unit_page_count += 1;
        if let Chorus::Open { .. } = cursor.chorus {
            cursor.chorus = Chorus::Open { top };
        }
        Ok(())
    }

    /// Close the logical page: footer, numbering, chorus bar, and the sheet
    /// when it is full or `force_physical` is set.
    pub fn end_logical_page(&mut self, force_physical: bool) -> Result<()> {
        if self.state.cursor.sheet_slot == 0 {
            return Ok(());
        }
        let song_pages = self.state.cursor.song_unit_page_count;

        if song_pages > 1 {
            if let Some(title) = self.state.modes.title.clone() {
                let font = self.footer_font();
                let h = self.state.geometry.width / 2.0;
                let v = self.state.geometry.bottom / 3.0;
                self.render(|r| r.move_to(h, v))?;
                self.render(|r| {
                    r.show_text(&title, FontSlot::Text, &font, TextStyle::aligned(Align::Center))
                })?;
            }
        }

        if self.settings.number_logical {
            if self.settings.number_all() {
                self.page_number(self.state.cursor.logical_label)?;
            } else if song_pages > 1 {
                self.page_number(song_pages as i64)?;
            }
        }

        if let Chorus::Open { top } = self.state.cursor.chorus {
            self.chorus_bar(top)?;
        }

        let cursor = &self.state.cursor;
        if cursor.sheet_slot >= cursor.pagination.pages_per_sheet() || force_physical {
            self.end_physical_page()?;
        }

        let top = self.state.geometry.top;
        let cursor = &mut self.state.cursor;
        cursor.column_index = 0;
        cursor.lowest_column_pos = top;
        cursor.column_top = top;
        Ok(())
    }

    pub fn end_physical_page(&mut self) -> Result<()> {
        if self.state.cursor.sheet_slot == 0 {
            return Ok(());
        }
        if self.state.cursor.pagination != Pagination::One {
            self.render(|r| r.reset_transform())?;
        }
        if !self.settings.number_logical {
            if self.settings.number_all() {
                self.page_number(self.state.cursor.page_label)?;
            } else if self.state.cursor.song_unit_page_count > 1 {
                self.page_number(self.state.cursor.song_unit_page_count as i64)?;
            }
        }
        let index = self.state.cursor.physical_page_count;
        self.render(|r| r.end_physical_page(index))?;

        let cursor = &mut self.state.cursor;
        cursor.logical_label += (cursor.pagination.pages_per_sheet() - cursor.sheet_slot) as i64;
        cursor.sheet_slot = 0;
        Ok(())
    }

    /// Finish the song unit, with its chord grid appendix when enabled.
    pub fn end_song(&mut self) -> Result<()> {
        if !self.settings.lyrics_only && self.state.modes.grids {
            let cursor = &mut self.state.cursor;
            cursor.vertical_pos = cursor.vertical_pos.min(cursor.lowest_column_pos);
            self.draw_chord_grids()?;
        }
        self.end_logical_page(false)
    }

    /// Print one lyrics line with the chords above it.
    pub(crate) fn flush_line(&mut self, line: &Line) -> Result<()> {
        let in_tab = self.state.modes.in_tab;
        let slot = if in_tab { FontSlot::Mono } else { FontSlot::Text };
        let text_font = self.state.styles.current(slot).clone();
        let chord_font = self.state.styles.current(FontSlot::Chord).clone();
        let text_size = text_font.size as f64;
        let chord_size = chord_font.size as f64;
        let auto_space = self.state.modes.auto_space;
        let blank = line.is_blank();

        if !((auto_space || in_tab) && !line.has_chords()) {
            self.pay_blank_space()?;
            self.advance(chord_size + 1.0)?;
            // keep the lyrics on the same page as their chords
            if !blank && self.state.cursor.vertical_pos - text_size <= self.state.geometry.bottom {
                self.advance(text_size)?;
            }
            self.open_pending_chorus(chord_size);
            if !self.settings.lyrics_only && line.has_chords() {
                let (h, v) = self.line_origin();
                self.render(|r| r.move_to(h, v))?;
                self.render(|r| r.show_chords(line, &text_font, &chord_font))?;
            }
        }

        if blank {
            self.state.cursor.blank_space += text_size - 2.0;
        } else {
            self.pay_blank_space()?;
            self.advance(text_size - 1.0)?;
            self.open_pending_chorus(text_size);
            let (h, v) = self.line_origin();
            self.render(|r| r.move_to(h, v))?;
            self.render(|r| r.show_text(&line.text, slot, &text_font, TextStyle::PLAIN))?;
        }
        Ok(())
    }

    pub(crate) fn pay_blank_space(&mut self) -> Result<()> {
        let owed = std::mem::take(&mut self.state.cursor.blank_space);
        if owed != 0.0 {
            self.advance(owed)?;
        }
        Ok(())
    }

    fn open_pending_chorus(&mut self, size: f64) {
        let cursor = &mut self.state.cursor;
        if cursor.chorus == Chorus::Pending {
            cursor.chorus = Chorus::Open {
                top: cursor.vertical_pos + size,
            };
        }
    }

    fn line_origin(&self) -> (f64, f64) {
        let indent = if self.state.modes.in_block {
            self.state.modes.indent as f64
        } else {
            0.0
        };
        (
            self.state.cursor.horizontal_pos + indent,
            self.state.cursor.vertical_pos,
        )
    }

    pub(crate) fn chorus_bar(&mut self, top: f64) -> Result<()> {
        let h = self.state.cursor.horizontal_pos - CHORUS_BAR_OFFSET;
        let bottom = self.state.cursor.vertical_pos;
        self.render(|r| r.stroke_line(&[Point::new(h, top), Point::new(h, bottom)], 1.0))
    }

    fn footer_font(&self) -> FontSpec {
        FontSpec::new(
            self.state.styles.current(FontSlot::Text).family.clone(),
            FOOTER_TEXT_SIZE,
        )
    }

    fn page_number(&mut self, number: i64) -> Result<()> {
        let geometry = &self.state.geometry;
        let rule_v = geometry.bottom - 10.0;
        let rule = [
            Point::new(geometry.left_margin, rule_v),
            Point::new(geometry.width - geometry.left_margin, rule_v),
        ];
        let v = geometry.bottom / 3.0;
        let (h, align) = if self.settings.even_pages_left && number % 2 == 0 {
            (PAGE_NUMBER_INSET, Align::Left)
        } else {
            (geometry.width - PAGE_NUMBER_INSET, Align::Right)
        };
        let font = self.footer_font();
        let label = format!("Page {number}");
        self.render(|r| r.stroke_line(&rule, 1.0))?;
        self.render(|r| r.move_to(h, v))?;
        self.render(|r| r.show_text(&label, FontSlot::Text, &font, TextStyle::aligned(align)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::test_support::{RecordingRenderer, RenderOp};

    fn typesetter() -> Typesetter<RecordingRenderer> {
        let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
        ts.begin().unwrap();
        ts
    }

    #[test]
    fn advance_is_monotonic_until_break() {
        let mut ts = typesetter();
        let mut last = ts.state().cursor.vertical_pos;
        for _ in 0..200 {
            ts.advance(7.0).unwrap();
            let now = ts.state().cursor.vertical_pos;
            if now > last {
                // only a break may move the cursor up
                assert_eq!(now, ts.state().geometry.top);
            }
            last = now;
        }
        assert!(ts.state().cursor.physical_page_count > 1);
    }

    #[test]
    fn column_breaks_wrap_to_next_page() {
        let mut ts = typesetter();
        let geometry = ts.state().geometry.clone();
        ts.state_mut().cursor.set_columns(3, &geometry);
        ts.break_column().unwrap();
        ts.break_column().unwrap();
        assert_eq!(ts.state().cursor.column_index, 2);
        let width = geometry.text_width() / 3.0;
        assert_eq!(
            ts.state().cursor.horizontal_pos,
            geometry.left_margin + 2.0 * width
        );
        ts.break_column().unwrap();
        assert_eq!(ts.state().cursor.column_index, 0);
        assert_eq!(ts.state().cursor.logical_page_count, 2);
    }

    #[test]
    fn four_up_closes_sheet_every_fourth_page() {
        let settings = Settings {
            pagination: Pagination::Four,
            ..Settings::default()
        };
        let mut ts = Typesetter::new(settings, RecordingRenderer::new());
        ts.begin().unwrap();
        for _ in 0..5 {
            ts.end_logical_page(false).unwrap();
            ts.start_page().unwrap();
        }
        let cursor = &ts.state().cursor;
        assert_eq!(cursor.logical_page_count, 6);
        assert_eq!(cursor.physical_page_count, 2);
        assert_eq!(cursor.sheet_slot, 2);
        let ends = ts
            .renderer()
            .ops
            .iter()
            .filter(|op| matches!(op, RenderOp::EndPhysicalPage(_)))
            .count();
        assert_eq!(ends, 1);
    }

    fn transforms(ts: &Typesetter<RecordingRenderer>) -> Vec<Transform> {
        ts.renderer()
            .ops
            .iter()
            .filter_map(|op| match op {
                RenderOp::Transform(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    fn fill_sheet(pagination: Pagination) -> Typesetter<RecordingRenderer> {
        let settings = Settings {
            pagination,
            ..Settings::default()
        };
        let mut ts = Typesetter::new(settings, RecordingRenderer::new());
        ts.begin().unwrap();
        for _ in 1..pagination.pages_per_sheet() {
            ts.end_logical_page(false).unwrap();
            ts.start_page().unwrap();
        }
        ts
    }

    #[test]
    fn four_up_places_pages_in_quadrants() {
        let ts = fill_sheet(Pagination::Four);
        let g = ts.state().geometry.clone();
        let across = g.width - g.left_margin;
        assert_eq!(
            transforms(&ts),
            vec![
                Transform::scale_rotate(1.0 / 2.1, 0.0),
                Transform::translate(g.left_margin, (g.top + g.bottom) * 1.05),
                Transform::translate(across, 0.0),
                Transform::translate(-across, -g.top * 1.05),
                Transform::translate(across, 0.0),
            ]
        );
    }

    #[test]
    fn two_up_rotates_and_places_side_by_side() {
        let ts = fill_sheet(Pagination::Two);
        let g = ts.state().geometry.clone();
        let scale = g.text_width() / (g.top + g.bottom);
        assert_eq!(
            transforms(&ts),
            vec![
                Transform::scale_rotate(scale, 90.0),
                Transform::translate(0.0, -(g.top + g.bottom + g.left_margin / scale)),
                Transform::translate(g.width, 0.0),
            ]
        );
    }

    #[test]
    fn one_up_applies_no_transform() {
        let ts = fill_sheet(Pagination::One);
        assert!(transforms(&ts).is_empty());
    }

    fn extended() -> Typesetter<RecordingRenderer> {
        let settings = Settings {
            extensions: true,
            ..Settings::default()
        };
        let mut ts = Typesetter::new(settings, RecordingRenderer::new());
        ts.begin().unwrap();
        let geometry = ts.state().geometry.clone();
        ts.state_mut().cursor.set_columns(2, &geometry);
        ts
    }

    #[test]
    fn conditional_break_moves_to_next_column_when_short() {
        let mut ts = extended();
        let bottom = ts.state().geometry.bottom;
        // two chorded lines of 12 + 9 + 1 points do not fit in 30
        ts.state_mut().cursor.vertical_pos = bottom + 30.0;
        ts.dispatch("conditional_break: 2").unwrap();
        assert!(ts.diagnostics().is_empty());
        let cursor = &ts.state().cursor;
        assert_eq!(cursor.column_index, 1);
        assert_eq!(cursor.vertical_pos, cursor.column_top);
    }

    #[test]
    fn conditional_break_stays_when_room_is_left() {
        let mut ts = extended();
        let bottom = ts.state().geometry.bottom;
        ts.state_mut().cursor.vertical_pos = bottom + 30.0;
        ts.dispatch("conditional_break: 1").unwrap();
        assert_eq!(ts.state().cursor.column_index, 0);
        assert_eq!(ts.state().cursor.vertical_pos, bottom + 30.0);

        let top = ts.state().geometry.top;
        ts.state_mut().cursor.vertical_pos = top;
        ts.dispatch("conditional_break: 10").unwrap();
        assert_eq!(ts.state().cursor.column_index, 0);
        assert_eq!(ts.state().cursor.logical_page_count, 1);
    }

    #[test]
    fn open_chorus_is_closed_at_song_end() {
        let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
        ts.process_song("a.cho", "{soc}
la la
").unwrap();
        ts.process_song("b.cho", "{eoc}
plain
").unwrap();
        let problems: Vec<_> = ts.diagnostics().iter().map(|d| d.problem.clone()).collect();
        let out = ts.finish().unwrap();
        assert_eq!(out.count(|op| matches!(op, RenderOp::Stroke(_))), 1);
        // the chorus does not leak into the next song
        assert_eq!(problems, vec![crate::error::Problem::NotInChorus]);
    }

    #[test]
    fn forced_sheet_end_skips_remaining_slots() {
        let settings = Settings {
            pagination: Pagination::Two,
            number_logical: true,
            ..Settings::default()
        };
        let mut ts = Typesetter::new(settings, RecordingRenderer::new());
        ts.begin().unwrap();
        ts.end_logical_page(true).unwrap();
        ts.start_page().unwrap();
        assert_eq!(ts.state().cursor.logical_label, 3);
        assert_eq!(ts.state().cursor.physical_page_count, 2);
    }
}
