use std::io::{self, Write};

use chordsheet::{
    Align, ChordDefinition, Decoration, FontSlot, FontSpec, Fret, Line, PageGeometry, Point,
    Renderer, TextStyle, Transform, GRID_ROWS,
};

/// Strings on the diagram, low E first.
const STRINGS: usize = 6;

/// Quote `text` as the body of a PostScript string literal. Characters
/// outside Latin-1 become `?`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c if (c as u32) < 0x80 => out.push(c),
            c if (c as u32) <= 0xff => out.push_str(&format!("\\{:o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

/// Writes a PostScript document.
pub struct PostScriptRenderer<W: Write> {
    out: W,
    font: Option<FontSpec>,
    at: (f64, f64),
}

impl<W: Write> PostScriptRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            font: None,
            at: (0.0, 0.0),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn set_font(&mut self, font: &FontSpec) -> io::Result<()> {
        if self.font.as_ref() == Some(font) {
            return Ok(());
        }
        writeln!(
            self.out,
            "/{} findfont {} scalefont setfont",
            font.family, font.size
        )?;
        self.font = Some(font.clone());
        Ok(())
    }

    fn shade(&mut self, text: &str, size: i32) -> io::Result<()> {
        let (h, v) = self.at;
        writeln!(self.out, "gsave .9 setgray {size} setlinewidth newpath")?;
        writeln!(self.out, "{} {} moveto", h - 2.0, v + (size / 2 - 2) as f64)?;
        writeln!(self.out, "({} ) stringwidth rlineto stroke grestore", escape(text))
    }

    fn frame(&mut self, text: &str, size: i32) -> io::Result<()> {
        let (h, v) = self.at;
        writeln!(self.out, "gsave 1 setlinewidth newpath")?;
        writeln!(self.out, "{} {} moveto", h - 2.0, v - 2.0)?;
        writeln!(
            self.out,
            "({}) stringwidth pop 4 add /hdelta exch def",
            escape(text)
        )?;
        writeln!(
            self.out,
            "hdelta 0 rlineto 0 {size} rlineto hdelta neg 0 rlineto closepath stroke grestore"
        )
    }
}

impl<W: Write> Renderer for PostScriptRenderer<W> {
    type Error = io::Error;

    fn begin_document(&mut self, geometry: &PageGeometry) -> io::Result<()> {
        writeln!(self.out, "%!PS-Adobe-1.0")?;
        writeln!(self.out, "%%Title: A song")?;
        writeln!(self.out, "%%Creator: chordsheet {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.out, "%%Pages: (atend)")?;
        writeln!(
            self.out,
            "%%BoundingBox: 5 5 {} {}",
            geometry.width - 7.0,
            geometry.top + 31.0
        )?;
        writeln!(self.out, "%%EndComments")?;
        writeln!(self.out, "/inch {{72 mul}} def")?;
        writeln!(self.out, "/dot {{0 360 arc fill}} def")?;
        writeln!(self.out, "/ring {{0 360 arc stroke}} def")?;
        writeln!(self.out, "%%EndProlog")
    }

    fn end_document(&mut self, sheets: u32) -> io::Result<()> {
        writeln!(self.out, "%%Trailer")?;
        writeln!(self.out, "%%Pages: {sheets} 1")?;
        writeln!(self.out, "%%EOF")?;
        self.out.flush()
    }

    fn begin_physical_page(&mut self, index: u32) -> io::Result<()> {
        writeln!(self.out, "%%Page: \"{index}\" {index}")?;
        writeln!(self.out, "%%BeginPageSetup")?;
        writeln!(self.out, "gsave")?;
        writeln!(self.out, "%%EndPageSetup")?;
        // a new page starts with the default graphics state
        self.font = None;
        Ok(())
    }

    fn end_physical_page(&mut self, _index: u32) -> io::Result<()> {
        writeln!(self.out, "grestore")?;
        writeln!(self.out, "showpage")
    }

    fn apply_transform(&mut self, transform: &Transform) -> io::Result<()> {
        let (h, v) = transform.translate;
        if h != 0.0 || v != 0.0 {
            writeln!(self.out, "{h:.6} {v:.6} translate")?;
        }
        if transform.scale != 1.0 {
            writeln!(self.out, "{0:.6} {0:.6} scale", transform.scale)?;
        }
        if transform.rotate != 0.0 {
            writeln!(self.out, "{:.6} rotate", transform.rotate)?;
        }
        Ok(())
    }

    fn reset_transform(&mut self) -> io::Result<()> {
        writeln!(self.out, "grestore gsave")?;
        self.font = None;
        Ok(())
    }

    fn move_to(&mut self, h: f64, v: f64) -> io::Result<()> {
        self.at = (h, v);
        writeln!(self.out, "{h} {v} moveto")
    }

    fn show_text(
        &mut self,
        text: &str,
        _slot: FontSlot,
        font: &FontSpec,
        style: TextStyle,
    ) -> io::Result<()> {
        self.set_font(font)?;
        match style.decoration {
            Decoration::Plain => {}
            Decoration::Shaded => self.shade(text, font.size)?,
            Decoration::Boxed => self.frame(text, font.size)?,
        }
        let quoted = escape(text);
        match style.align {
            Align::Left => writeln!(self.out, "({quoted}) show"),
            Align::Center => writeln!(
                self.out,
                "({quoted}) dup stringwidth pop 2 div neg 0 rmoveto show"
            ),
            Align::Right => writeln!(self.out, "({quoted}) dup stringwidth pop neg 0 rmoveto show"),
        }
    }

    fn show_chords(
        &mut self,
        line: &Line,
        text_font: &FontSpec,
        chord_font: &FontSpec,
    ) -> io::Result<()> {
        let (h, v) = self.at;
        writeln!(self.out, "/minhpos {h} def")?;
        for chord in &line.chords {
            let prefix: String = line.text.chars().take(chord.offset).collect();
            self.set_font(text_font)?;
            writeln!(self.out, "({}) stringwidth pop {h} add", escape(&prefix))?;
            writeln!(self.out, "dup minhpos lt {{pop minhpos}} if")?;
            self.set_font(chord_font)?;
            let name = escape(&chord.name);
            writeln!(self.out, "dup ({name}) stringwidth pop add /minhpos exch def")?;
            writeln!(self.out, "{v} moveto ({name}) show")?;
        }
        Ok(())
    }

    fn stroke_line(&mut self, points: &[Point], width: f64) -> io::Result<()> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        writeln!(self.out, "{width} setlinewidth 0 setgray newpath")?;
        writeln!(self.out, "{} {} moveto", first.h, first.v)?;
        for p in rest {
            writeln!(self.out, "{} {} lineto", p.h, p.v)?;
        }
        writeln!(self.out, "stroke")
    }

    fn draw_chord_grid(
        &mut self,
        chord: &ChordDefinition,
        origin_label: Option<&str>,
        font: &FontSpec,
        grid_size: f64,
    ) -> io::Result<()> {
        let (h, v) = self.at;
        let name_v = v - font.size as f64;
        self.set_font(font)?;
        writeln!(self.out, "{} {name_v} moveto", h + grid_size / 2.0)?;
        let name = escape(&chord.name);
        writeln!(self.out, "({name}) dup stringwidth pop 2 div neg 0 rmoveto show")?;
        if let Some(label) = origin_label {
            writeln!(self.out, "({}) show", escape(label))?;
        }
        let Some(fingering) = &chord.fingering else {
            return Ok(());
        };

        let step = grid_size / (STRINGS - 1) as f64;
        let row = grid_size / GRID_ROWS as f64;
        let marker = step / 4.0;
        let top = name_v - 4.0 - 2.0 * marker - 2.0;
        let bottom = top - grid_size;

        writeln!(self.out, "gsave 0.5 setlinewidth newpath")?;
        for s in 0..STRINGS {
            let x = h + s as f64 * step;
            writeln!(self.out, "{x} {top} moveto {x} {bottom} lineto")?;
        }
        for r in 0..=GRID_ROWS {
            let y = top - r as f64 * row;
            writeln!(self.out, "{h} {y} moveto {} {y} lineto", h + grid_size)?;
        }
        writeln!(self.out, "stroke")?;
        if fingering.base_fret == 1 {
            writeln!(self.out, "2 setlinewidth newpath")?;
            writeln!(self.out, "{h} {top} moveto {} {top} lineto stroke", h + grid_size)?;
        } else {
            writeln!(self.out, "{} {} moveto", h - marker, top - row + 2.0)?;
            writeln!(
                self.out,
                "({}) dup stringwidth pop neg 0 rmoveto show",
                fingering.base_fret
            )?;
        }
        if let Some(written) = fingering.adjusted_from {
            // base fret as written, right of the first row
            writeln!(self.out, "{} {} moveto", h + grid_size + marker, top - row + 2.0)?;
            writeln!(self.out, "(was {written}) show")?;
        }

        writeln!(self.out, "0.5 setlinewidth")?;
        for (s, fret) in fingering.frets.iter().enumerate() {
            let x = h + s as f64 * step;
            match fret {
                Fret::Open => {
                    writeln!(self.out, "newpath {x} {} {marker} ring", top + marker + 1.0)?;
                }
                Fret::Muted => {
                    let y = top + 1.0;
                    writeln!(
                        self.out,
                        "newpath {} {y} moveto {} {} lineto {} {y} moveto {} {} lineto stroke",
                        x - marker,
                        x + marker,
                        y + 2.0 * marker,
                        x + marker,
                        x - marker,
                        y + 2.0 * marker
                    )?;
                }
                Fret::At(n) => {
                    let r = *n as i32 - fingering.base_fret as i32 + 1;
                    if !(1..=GRID_ROWS as i32).contains(&r) {
                        continue;
                    }
                    let y = top - (r as f64 - 0.5) * row;
                    writeln!(self.out, "newpath {x} {y} {} dot", marker * 1.5)?;
                }
            }
        }
        writeln!(self.out, "grestore")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(f: impl FnOnce(&mut PostScriptRenderer<Vec<u8>>) -> io::Result<()>) -> String {
        let mut ps = PostScriptRenderer::new(Vec::new());
        f(&mut ps).unwrap();
        String::from_utf8(ps.into_inner()).unwrap()
    }

    #[test]
    fn escapes_parentheses_and_latin1() {
        assert_eq!(escape("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape("é"), "\\351");
        assert_eq!(escape("€"), "?");
    }

    #[test]
    fn font_is_selected_once() {
        let font = FontSpec::new("Times-Roman", 12);
        let out = rendered(|ps| {
            ps.show_text("a", FontSlot::Text, &font, TextStyle::PLAIN)?;
            ps.show_text("b", FontSlot::Text, &font, TextStyle::PLAIN)
        });
        assert_eq!(out.matches("findfont").count(), 1);
        assert!(out.ends_with("(b) show\n"));
    }

    #[test]
    fn chords_use_running_minimum() {
        let line = Line {
            text: "Hello world".into(),
            chords: vec![chordsheet::OverlayChord {
                offset: 6,
                name: "G".into(),
            }],
        };
        let text = FontSpec::new("Times-Roman", 12);
        let chord = FontSpec::new("Helvetica-Oblique", 9);
        let out = rendered(|ps| {
            ps.move_to(72.0, 700.0)?;
            ps.show_chords(&line, &text, &chord)
        });
        assert!(out.contains("/minhpos 72 def"));
        assert!(out.contains("(Hello ) stringwidth pop 72 add"));
        assert!(out.contains("700 moveto (G) show"));
    }

    #[test]
    fn adjusted_grid_shows_written_base_fret() {
        let mut fingering = chordsheet::Fingering::from_relative(1, [-1, 6, 8, 8, 7, 6]);
        assert_eq!(fingering.auto_adjust(GRID_ROWS), Ok(true));
        let chord = ChordDefinition {
            name: "Bm7".into(),
            origin: chordsheet::Origin::RcDefined,
            difficulty: chordsheet::Difficulty::Hard,
            fingering: Some(fingering),
        };
        let font = FontSpec::new("Helvetica-Oblique", 9);
        let out = rendered(|ps| ps.draw_chord_grid(&chord, None, &font, 30.0));
        assert!(out.contains("(4) dup stringwidth pop neg 0 rmoveto show"));
        assert!(out.contains("(was 1) show"));
    }

    #[test]
    fn stub_grid_prints_only_the_name() {
        let font = FontSpec::new("Helvetica-Oblique", 9);
        let out = rendered(|ps| {
            ps.draw_chord_grid(&ChordDefinition::stub("Hx"), None, &font, 30.0)
        });
        assert!(out.contains("(Hx)"));
        assert!(!out.contains("dot"));
    }
}
