//! The typesetter: document state plus the renderer it drives.
use crate::chord::{ChordDatabase, ChordDefinition, DefineLayout};
use crate::diagnostics::Diagnostic;
use crate::error::{Problem, Result, SheetError};
use crate::layout::{Chorus, LayoutCursor};
use crate::page::PageGeometry;
use crate::parser::{MarkupParser, MarkupSink};
use crate::settings::{Overrides, Settings};
use crate::style::{FontSlot, Scope, StyleState};
use crate::toc::TocEntry;
use crate::transpose::{is_no_chord, ChordToken};
use crate::{Line, Renderer};

/// Default language version for `version`.
pub const DEFAULT_LANGUAGE_VERSION: i32 = 5;

/// Switches set by directives, with the values songs start from.
#[derive(Clone, Debug)]
pub struct Modes {
    pub extensions: bool,
    pub in_tab: bool,
    pub in_block: bool,
    pub grids: bool,
    pub grids_default: bool,
    pub auto_space: bool,
    pub auto_space_default: bool,
    pub indent: i32,
    pub indent_default: i32,
    pub version: i32,
    pub version_default: i32,
    pub define_layout: DefineLayout,
    /// Title of the current song, repeated in the footer of later pages.
    pub title: Option<String>,
}

impl Modes {
    fn new(settings: &Settings) -> Self {
        Self {
            extensions: settings.extensions,
            in_tab: false,
            in_block: false,
            grids: !settings.no_grids,
            grids_default: !settings.no_grids,
            auto_space: settings.auto_space,
            auto_space_default: settings.auto_space,
            indent: 0,
            indent_default: 0,
            version: DEFAULT_LANGUAGE_VERSION,
            version_default: DEFAULT_LANGUAGE_VERSION,
            define_layout: DefineLayout::Old,
            title: None,
        }
    }

    fn reset(&mut self) {
        self.grids = self.grids_default;
        self.auto_space = self.auto_space_default;
        self.indent = self.indent_default;
        self.version = self.version_default;
    }
}

/// Everything that changes while a document is processed.
#[derive(Clone, Debug)]
pub struct DocumentState {
    pub geometry: PageGeometry,
    pub styles: StyleState,
    pub cursor: LayoutCursor,
    pub chords: ChordDatabase,
    pub modes: Modes,
    pub toc: Vec<TocEntry>,
}

impl DocumentState {
    pub fn new(settings: &Settings) -> Self {
        let geometry = PageGeometry::default();
        let first_page = settings.first_page.unwrap_or(1) as i64;
        Self {
            cursor: LayoutCursor::new(&geometry, settings.pagination, first_page),
            geometry,
            styles: StyleState::new(),
            chords: ChordDatabase::new(settings.auto_adjust),
            modes: Modes::new(settings),
            toc: Vec::new(),
        }
    }
}

/// Turns configuration and song streams into calls on a [`Renderer`].
///
/// Call order: [`process_config`](Self::process_config) for each
/// configuration source, [`apply_overrides`](Self::apply_overrides),
/// [`process_song`](Self::process_song) for each song, then
/// [`finish`](Self::finish).
pub struct Typesetter<R: Renderer> {
    pub(crate) settings: Settings,
    pub(crate) state: DocumentState,
    pub(crate) renderer: R,
    pub(crate) startup: bool,
    file: String,
    line: usize,
    started: bool,
    songs: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<R: Renderer> Typesetter<R> {
    pub fn new(settings: Settings, renderer: R) -> Self {
        Self {
            state: DocumentState::new(&settings),
            settings,
            renderer,
            startup: false,
            file: String::new(),
            line: 0,
            started: false,
            songs: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut DocumentState {
        &mut self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Give up the renderer without closing the document.
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Recoverable problems reported so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn render<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut R) -> std::result::Result<(), R::Error>,
    {
        f(&mut self.renderer).map_err(|e| SheetError::Render(e.to_string()))
    }

    pub(crate) fn report(&mut self, problem: Problem) {
        let diagnostic = Diagnostic::new(self.file.clone(), self.line, problem);
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// Read a configuration stream: directives only, setting defaults.
    pub fn process_config(&mut self, name: &str, text: &str) -> Result<()> {
        log::info!("reading configuration {name}");
        self.file = name.to_string();
        self.startup = true;
        let outcome = MarkupParser::new().parse(text, self);
        self.startup = false;
        outcome
    }

    /// Apply command line values on top of the configuration files.
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(paper) = &overrides.paper {
            let geometry = PageGeometry::builtin(paper)
                .ok_or_else(|| SheetError::UnknownPaperType(paper.clone()))?;
            self.state.cursor = LayoutCursor::new(
                &geometry,
                self.state.cursor.pagination,
                self.state.cursor.page_label + 1,
            );
            self.state.geometry = geometry;
        }
        let extensions = self.state.modes.extensions;
        let styles = &mut self.state.styles;
        if let Some(family) = &overrides.text_font {
            styles.set_font(FontSlot::Text, family, Scope::Default, extensions);
        }
        if let Some(size) = overrides.text_size {
            styles.set_size(FontSlot::Text, size, Scope::Default, extensions);
        }
        if let Some(family) = &overrides.chord_font {
            styles.set_font(FontSlot::Chord, family, Scope::Default, extensions);
        }
        if let Some(size) = overrides.chord_size {
            styles.set_size(FontSlot::Chord, size, Scope::Default, extensions);
        }
        if let Some(on) = overrides.extensions {
            self.state.modes.extensions = on;
        }
        Ok(())
    }

    /// Open the document and its first page. Called implicitly by the first
    /// song when not called before.
    pub fn begin(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        let geometry = self.state.geometry.clone();
        self.render(|r| r.begin_document(&geometry))?;
        self.reset_to_defaults();
        self.start_page()
    }

    /// Typeset one song file. Every file after the first starts a new song.
    pub fn process_song(&mut self, name: &str, text: &str) -> Result<()> {
        self.begin()?;
        if self.songs > 0 {
            self.new_song()?;
        }
        self.songs += 1;
        log::info!("typesetting {name}");
        self.file = name.to_string();
        self.line = 0;
        MarkupParser::new().parse(text, self)
    }

    /// End the current song and start a fresh song unit.
    pub fn new_song(&mut self) -> Result<()> {
        self.end_song()?;
        self.state
            .chords
            .start_song(self.settings.drop_song_definitions);
        let modes = &mut self.state.modes;
        modes.in_tab = false;
        modes.in_block = false;
        modes.title = None;
        self.state.cursor.song_unit_page_count = 0;
        self.state.cursor.chorus = Chorus::Off;
        self.start_page()?;
        self.reset_to_defaults();
        Ok(())
    }

    fn reset_to_defaults(&mut self) {
        self.state.styles.reset();
        self.state.modes.reset();
        let geometry = &self.state.geometry;
        self.state.cursor.max_columns = 1;
        self.state.cursor.column_index = 0;
        self.state.cursor.column_width = geometry.text_width();
    }

    /// Close the last song, print the index when enabled and close the
    /// document. Returns the renderer.
    pub fn finish(mut self) -> Result<R> {
        self.begin()?;
        self.end_song()?;
        if self.settings.table_of_contents {
            self.print_index()?;
        }
        self.end_physical_page()?;
        let sheets = self.state.cursor.physical_page_count;
        self.render(|r| r.end_document(sheets))?;
        Ok(self.renderer)
    }

    /// Produce a document holding the grid of every known chord.
    pub fn dump_grids(mut self) -> Result<R> {
        self.begin()?;
        let chords: Vec<ChordDefinition> = self.state.chords.known().into_iter().cloned().collect();
        self.lay_out_grids(&chords)?;
        self.end_logical_page(false)?;
        self.end_physical_page()?;
        let sheets = self.state.cursor.physical_page_count;
        self.render(|r| r.end_document(sheets))?;
        Ok(self.renderer)
    }

    /// Name printed for a closed chord; registers it in the database.
    fn resolve_chord(&mut self, name: &str) -> String {
        if is_no_chord(name) {
            return name.to_string();
        }
        let transpose = self.settings.transpose;
        let shown = match ChordToken::parse(name) {
            Some(token) if transpose.rem_euclid(12) != 0 => token.transpose(transpose).to_string(),
            Some(_) => name.to_string(),
            None => {
                let problem = if transpose != 0 {
                    Problem::Transpose(name.to_string())
                } else {
                    Problem::UnknownChordRoot(name.to_string())
                };
                self.report(problem);
                name.to_string()
            }
        };
        self.state.chords.use_chord(&shown);
        shown
    }
}

impl<R: Renderer> MarkupSink for Typesetter<R> {
    type Error = SheetError;

    fn chord(&mut self, line: usize, name: &str) -> String {
        self.line = line;
        if self.startup {
            return name.to_string();
        }
        self.resolve_chord(name)
    }

    fn directive(&mut self, line: usize, text: &str) -> Result<()> {
        self.line = line;
        self.dispatch(text)
    }

    fn line(&mut self, line: usize, content: Line) -> Result<()> {
        self.line = line;
        if self.startup {
            if !content.text.is_empty() {
                self.report(Problem::NotADirective);
            }
            return Ok(());
        }
        if self.state.modes.in_tab && self.settings.lyrics_only {
            return Ok(());
        }
        self.flush_line(&content)
    }

    fn problem(&mut self, line: usize, problem: Problem) {
        self.line = line;
        self.report(problem);
    }

    fn in_tab(&self) -> bool {
        self.state.modes.in_tab
    }
}
