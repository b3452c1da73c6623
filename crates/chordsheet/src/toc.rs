//! Table of contents collected while typesetting.
use crate::error::Result;
use crate::style::FontSlot;
use crate::typesetter::Typesetter;
use crate::{Align, Renderer, TextStyle};

pub const INDEX_TITLE: &str = "Index";
/// Subtitles are indented by this much under their title.
const SUBTITLE_INDENT: f64 = 20.0;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    pub title: String,
    pub subtitles: Vec<String>,
    pub page: i64,
}

impl<R: Renderer> Typesetter<R> {
    pub(crate) fn add_toc_title(&mut self, title: &str) {
        let cursor = &self.state.cursor;
        let page = if self.settings.number_logical {
            cursor.logical_label
        } else {
            cursor.page_label
        };
        self.state.toc.push(TocEntry {
            title: title.to_string(),
            subtitles: Vec::new(),
            page,
        });
    }

    pub(crate) fn add_toc_subtitle(&mut self, subtitle: &str) {
        if let Some(entry) = self.state.toc.last_mut() {
            entry.subtitles.push(subtitle.to_string());
        }
    }

    /// Print the index page: entries sorted by title with their page labels.
    pub(crate) fn print_index(&mut self) -> Result<()> {
        let mut entries = std::mem::take(&mut self.state.toc);
        if entries.is_empty() {
            return Ok(());
        }
        entries.sort_by(|a, b| a.title.cmp(&b.title));
        log::debug!("index with {} entries", entries.len());

        self.state.cursor.song_unit_page_count = 0;
        self.state.modes.title = None;
        self.start_page()?;
        self.show_title(INDEX_TITLE)?;

        let font = self.state.styles.current(FontSlot::Text).clone();
        let size = font.size as f64;
        let left = self.state.geometry.left_margin;
        let right = self.state.geometry.width - left;
        for entry in &entries {
            self.advance(size)?;
            let v = self.state.cursor.vertical_pos;
            let page = entry.page.to_string();
            self.render(|r| r.move_to(left, v))?;
            self.render(|r| r.show_text(&entry.title, FontSlot::Text, &font, TextStyle::PLAIN))?;
            self.render(|r| r.move_to(right, v))?;
            self.render(|r| {
                r.show_text(&page, FontSlot::Text, &font, TextStyle::aligned(Align::Right))
            })?;
            for subtitle in &entry.subtitles {
                self.advance(size)?;
                let v = self.state.cursor.vertical_pos;
                self.render(|r| r.move_to(left + SUBTITLE_INDENT, v))?;
                self.render(|r| r.show_text(subtitle, FontSlot::Text, &font, TextStyle::PLAIN))?;
            }
        }
        self.state.toc = entries;
        self.end_logical_page(false)
    }
}
