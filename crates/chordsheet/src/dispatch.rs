//! Applies directives to the document state.
use crate::chord::{parse_chord_directive, parse_define, ChordDefinition, DefineLayout, Origin};
use crate::directive::{split_keyword, CommentStyle, Directive, Keyword, SizeArg};
use crate::error::{Problem, Result};
use crate::layout::{Chorus, LayoutCursor};
use crate::page::PageGeometry;
use crate::style::{FontSlot, Scope};
use crate::typesetter::Typesetter;
use crate::{Align, Decoration, Renderer, TextStyle};

/// Title size above the text size.
pub const TITLE_SIZE_INCREMENT: i32 = 5;

impl<R: Renderer> Typesetter<R> {
    /// Interpret the text between `{` and `}`.
    pub(crate) fn dispatch(&mut self, text: &str) -> Result<()> {
        let (name, args) = split_keyword(text);
        let Some(keyword) = Keyword::lookup(name) else {
            self.report(Problem::UnknownDirective(name.to_string()));
            return Ok(());
        };

        if self.settings.warning_level > 4 {
            if let Some(notice) = keyword.compat_notice() {
                self.report(Problem::Notice(notice));
            }
        }

        let extensions = self.state.modes.extensions;
        if self.startup {
            if keyword.is_content() {
                self.report(Problem::NotInStartup(keyword.name()));
                return Ok(());
            }
        } else {
            if keyword.startup_only() {
                self.report(Problem::StartupOnly(keyword.name()));
                return Ok(());
            }
            if keyword.gated_in_document() && !extensions {
                self.report(Problem::ExtensionsDisabled(keyword.name()));
                return Ok(());
            }
        }
        if keyword.always_gated() && !extensions {
            self.report(Problem::ExtensionsDisabled(keyword.name()));
            return Ok(());
        }

        match Directive::parse(keyword, args) {
            Ok(directive) => self.apply(keyword, directive),
            Err(problem) => {
                self.report(problem);
                Ok(())
            }
        }
    }

    fn scope(&self) -> Scope {
        if self.startup {
            Scope::Default
        } else {
            Scope::Current
        }
    }

    fn apply(&mut self, keyword: Keyword, directive: Directive) -> Result<()> {
        let scope = self.scope();
        let extensions = self.state.modes.extensions;
        match directive {
            Directive::StartOfChorus => self.state.cursor.chorus = Chorus::Pending,
            Directive::EndOfChorus => match self.state.cursor.chorus {
                Chorus::Off => self.report(Problem::NotInChorus),
                Chorus::Pending => self.state.cursor.chorus = Chorus::Off,
                Chorus::Open { top } => {
                    self.chorus_bar(top)?;
                    self.state.cursor.chorus = Chorus::Off;
                }
            },
            Directive::Font(slot, family) => {
                self.state.styles.set_font(slot, &family, scope, extensions);
            }
            Directive::Size(slot, size) => self.apply_size(keyword, slot, size),
            Directive::Comment(style, text) => self.comment(style, &text)?,
            Directive::NewSong => self.new_song()?,
            Directive::Title(title) => {
                self.show_title(&title)?;
                if self.settings.table_of_contents && self.state.cursor.song_unit_page_count == 1 {
                    self.add_toc_title(&title);
                }
            }
            Directive::Subtitle(subtitle) => {
                self.show_subtitle(&subtitle)?;
                if self.settings.table_of_contents && self.state.cursor.song_unit_page_count == 1 {
                    self.add_toc_subtitle(&subtitle);
                }
            }
            Directive::Define(args) => {
                let layout = self.state.modes.define_layout;
                let parsed = parse_define(&args, layout, self.definition_origin());
                self.register_definition(parsed);
            }
            Directive::Chord(args) => {
                let parsed = parse_chord_directive(&args, self.definition_origin());
                self.register_definition(parsed);
            }
            Directive::Grid(on) => {
                self.state.modes.grids = on;
                if self.startup {
                    self.state.modes.grids_default = on;
                }
            }
            Directive::NewPage => {
                self.end_logical_page(false)?;
                self.start_page()?;
            }
            Directive::NewPhysicalPage => {
                self.end_logical_page(true)?;
                self.start_page()?;
            }
            Directive::StartOfTab => {
                if self.state.modes.in_tab {
                    self.report(Problem::AlreadyInTab);
                } else {
                    self.state.modes.in_tab = true;
                }
            }
            Directive::EndOfTab => {
                if self.state.modes.in_tab {
                    self.state.modes.in_tab = false;
                } else {
                    self.report(Problem::NotInTab);
                }
            }
            Directive::ColumnBreak => self.break_column()?,
            Directive::Columns(n) => self.state.cursor.set_columns(n, &self.state.geometry),
            Directive::TwoColumn(on) => {
                let multi = self.state.cursor.max_columns > 1;
                match (on, multi) {
                    (true, true) => self.report(Problem::AlreadyMultiColumn),
                    (false, false) => self.report(Problem::NotMultiColumn),
                    (true, false) => self.state.cursor.set_columns(2, &self.state.geometry),
                    (false, true) => self.state.cursor.set_columns(1, &self.state.geometry),
                }
            }
            Directive::OldDefine => self.state.modes.define_layout = DefineLayout::Old,
            Directive::NewDefine => self.state.modes.define_layout = DefineLayout::New,
            Directive::StartOfBlock(label) => {
                if self.state.modes.in_block {
                    self.report(Problem::AlreadyInBlock);
                } else {
                    self.comment(CommentStyle::Shaded, &label)?;
                    self.state.modes.in_block = true;
                }
            }
            Directive::EndOfBlock => {
                if self.state.modes.in_block {
                    self.state.modes.in_block = false;
                } else {
                    self.report(Problem::NotInBlock);
                }
            }
            Directive::Bridge(keyword) => self.report(Problem::Unimplemented(keyword.name())),
            Directive::Indent(keyword) => self.report(Problem::Unsupported(keyword.name())),
            Directive::AutoSpace(on) => {
                let modes = &mut self.state.modes;
                if self.startup {
                    modes.auto_space_default = on;
                }
                modes.auto_space = if on { true } else { modes.auto_space_default };
            }
            Directive::PaperType(name) => match PageGeometry::builtin(&name) {
                Some(geometry) => self.set_geometry(geometry),
                None => self.report(Problem::UnknownPaperType(name)),
            },
            Directive::FormSpec {
                name,
                top,
                width,
                left,
                bottom,
            } => match PageGeometry::custom(&name, top, width, left, bottom) {
                Ok(geometry) => {
                    log::info!(
                        "form {name} is {width} x {top} points, margins left {left} bottom {bottom}"
                    );
                    self.set_geometry(geometry);
                }
                Err(problem) => self.report(problem),
            },
            Directive::ConditionalBreak(lines) => self.conditional_break(lines)?,
            Directive::SetIndent(points) => {
                self.state.modes.indent = points;
                if self.startup {
                    self.state.modes.indent_default = points;
                }
            }
            Directive::Extensions(on) => {
                if self.settings.warning_level > 6 {
                    let state = if on { "enabled" } else { "disabled" };
                    self.report(Problem::Notice(format!("extensions {state}")));
                }
                self.state.modes.extensions = on;
            }
            Directive::Version(version) => {
                log::debug!("language version {version}");
                self.state.modes.version = version;
                if self.startup {
                    self.state.modes.version_default = version;
                }
            }
        }
        Ok(())
    }

    fn apply_size(&mut self, keyword: Keyword, slot: FontSlot, size: SizeArg) {
        let scope = self.scope();
        let extensions = self.state.modes.extensions;
        match size {
            SizeArg::Absolute(points) => self.state.styles.set_size(slot, points, scope, extensions),
            SizeArg::Relative(delta) => {
                if !extensions {
                    self.report(Problem::RelativeSizeNotEnabled(keyword.name()));
                    return;
                }
                if self
                    .state
                    .styles
                    .adjust_size(slot, delta, scope, extensions)
                    .is_none()
                {
                    self.report(Problem::InvalidValue {
                        directive: keyword.name(),
                        value: format!("{delta:+}"),
                    });
                }
            }
        }
    }

    fn definition_origin(&self) -> Origin {
        if self.startup {
            Origin::RcDefined
        } else {
            Origin::UserDefined
        }
    }

    fn register_definition(&mut self, parsed: std::result::Result<ChordDefinition, Problem>) {
        let outcome = parsed.and_then(|def| self.state.chords.define(def));
        if let Err(problem) = outcome {
            self.report(problem);
        }
    }

    fn set_geometry(&mut self, geometry: PageGeometry) {
        log::debug!("paper {}", geometry.name);
        self.state.cursor = LayoutCursor::new(
            &geometry,
            self.state.cursor.pagination,
            self.state.cursor.page_label + 1,
        );
        self.state.geometry = geometry;
    }

    /// Break the column unless `lines` more lines fit above the bottom margin.
    fn conditional_break(&mut self, lines: u32) -> Result<()> {
        let styles = &self.state.styles;
        let per_line = if self.state.modes.in_tab {
            styles.current(FontSlot::Mono).size
        } else if self.settings.lyrics_only {
            styles.current(FontSlot::Text).size
        } else {
            styles.current(FontSlot::Text).size + styles.current(FontSlot::Chord).size + 1
        };
        let needed = lines as f64 * per_line as f64;
        log::debug!("conditional break needs {needed} points");
        if self.state.cursor.vertical_pos - needed <= self.state.geometry.bottom {
            self.break_column()?;
        }
        Ok(())
    }

    pub(crate) fn comment(&mut self, style: CommentStyle, text: &str) -> Result<()> {
        if text.is_empty() {
            self.report(Problem::EmptyComment);
            return Ok(());
        }
        self.pay_blank_space()?;
        let (slot, decoration) = match style {
            CommentStyle::Shaded => (FontSlot::Comment, Decoration::Shaded),
            CommentStyle::Italic => (FontSlot::CommentItalic, Decoration::Plain),
            CommentStyle::Boxed => (FontSlot::Comment, Decoration::Boxed),
        };
        let font = self.state.styles.current(slot).clone();
        self.advance(font.size as f64)?;
        let h = self.state.cursor.horizontal_pos;
        let v = self.state.cursor.vertical_pos;
        self.render(|r| r.move_to(h, v))?;
        self.render(|r| r.show_text(text, slot, &font, TextStyle::decorated(decoration)))
    }

    /// Centered title at the current position; it becomes the running footer.
    pub(crate) fn show_title(&mut self, title: &str) -> Result<()> {
        let mut font = self.state.styles.current(FontSlot::Text).clone();
        font.size += TITLE_SIZE_INCREMENT;
        let h = self.state.geometry.width / 2.0;
        let v = self.state.cursor.vertical_pos;
        self.render(|r| r.move_to(h, v))?;
        self.render(|r| r.show_text(title, FontSlot::Text, &font, TextStyle::aligned(Align::Center)))?;
        self.state.cursor.vertical_pos -= font.size as f64;
        self.state.modes.title = Some(title.to_string());
        Ok(())
    }

    fn show_subtitle(&mut self, subtitle: &str) -> Result<()> {
        let font = self.state.styles.current(FontSlot::Text).clone();
        let h = self.state.geometry.width / 2.0;
        let v = self.state.cursor.vertical_pos;
        self.render(|r| r.move_to(h, v))?;
        self.render(|r| {
            r.show_text(subtitle, FontSlot::Text, &font, TextStyle::aligned(Align::Center))
        })?;
        self.state.cursor.vertical_pos -= font.size as f64;
        Ok(())
    }
}
