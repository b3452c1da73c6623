//! Character-level markup parser.
//!
//! The parser only tokenizes; everything it finds is handed to a
//! [`MarkupSink`]: closed chord names, directive text, finished lines and
//! recoverable problems, each with the physical line number it came from.
use crate::buffer::{BoundedBuffer, BufferKind, Overflow};
use crate::error::Problem;
use crate::{Line, OverlayChord};

/// Receiver of the parser's output.
pub trait MarkupSink {
    type Error;

    /// A chord was closed; returns the name to print above the lyrics.
    fn chord(&mut self, line: usize, name: &str) -> String;

    fn directive(&mut self, line: usize, text: &str) -> Result<(), Self::Error>;

    /// A line without directive ended.
    fn line(&mut self, line: usize, content: Line) -> Result<(), Self::Error>;

    fn problem(&mut self, line: usize, problem: Problem);

    /// Whether a tablature block is open; brackets are literal text there.
    fn in_tab(&self) -> bool;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    Text,
    Chord,
    Directive,
    /// Rest of a comment line, or of a line after a closed directive.
    Skip,
}

pub struct MarkupParser {
    mode: Mode,
    text: BoundedBuffer,
    chord: BoundedBuffer,
    directive: BoundedBuffer,
    chords: Vec<OverlayChord>,
    has_directive: bool,
    /// Characters seen on the current physical line.
    column: usize,
    line: usize,
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupParser {
    pub fn new() -> Self {
        Self {
            mode: Mode::Text,
            text: BoundedBuffer::new(BufferKind::Text),
            chord: BoundedBuffer::new(BufferKind::ChordName),
            directive: BoundedBuffer::new(BufferKind::Directive),
            chords: Vec::new(),
            has_directive: false,
            column: 0,
            line: 1,
        }
    }

    /// Current physical line, 1-based.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Parse a whole stream; a last line without newline is ended too.
    pub fn parse<S: MarkupSink>(&mut self, input: &str, sink: &mut S) -> Result<(), S::Error> {
        for ch in input.chars() {
            self.feed(ch, sink)?;
        }
        self.finish(sink)
    }

    pub fn finish<S: MarkupSink>(&mut self, sink: &mut S) -> Result<(), S::Error> {
        if self.column != 0 {
            self.end_of_line(sink)?;
        }
        Ok(())
    }

    pub fn feed<S: MarkupSink>(&mut self, ch: char, sink: &mut S) -> Result<(), S::Error> {
        if ch == '\r' {
            return Ok(());
        }
        self.column += 1;

        if self.mode == Mode::Skip {
            if ch == '\n' {
                self.next_line();
            }
            return Ok(());
        }

        match ch {
            '\n' => self.end_of_line(sink)?,
            '#' if self.column == 1 => self.mode = Mode::Skip,
            '[' => match self.mode {
                Mode::Directive => self.push_directive(ch, sink),
                Mode::Text if sink.in_tab() => self.push_text(ch, sink),
                Mode::Chord => {
                    sink.problem(self.line, Problem::NestedChord);
                    self.chord.clear();
                }
                _ => {
                    self.chord.clear();
                    self.mode = Mode::Chord;
                }
            },
            ']' => match self.mode {
                Mode::Directive => self.push_directive(ch, sink),
                Mode::Chord => {
                    let name = self.chord.take();
                    let shown = sink.chord(self.line, &name);
                    self.chords.push(OverlayChord {
                        offset: self.text.len(),
                        name: shown,
                    });
                    self.mode = Mode::Text;
                }
                _ if sink.in_tab() => self.push_text(ch, sink),
                _ => sink.problem(self.line, Problem::UnmatchedChordClose),
            },
            '{' => {
                if self.mode == Mode::Chord {
                    sink.problem(self.line, Problem::DirectiveInChord);
                    self.chord.clear();
                }
                self.directive.clear();
                self.has_directive = true;
                self.mode = Mode::Directive;
            }
            '}' => {
                if self.mode == Mode::Directive {
                    let text = self.directive.take();
                    sink.directive(self.line, &text)?;
                    self.reset_line();
                    self.mode = Mode::Skip;
                } else {
                    sink.problem(self.line, Problem::UnmatchedDirectiveClose);
                }
            }
            _ => match self.mode {
                Mode::Chord => {
                    if ch != ' ' {
                        if let Err(Overflow(kind)) = self.chord.push(ch) {
                            sink.problem(self.line, Problem::BufferOverflow(kind));
                        }
                    }
                }
                Mode::Directive => self.push_directive(ch, sink),
                _ => self.push_text(ch, sink),
            },
        }
        Ok(())
    }

    fn push_text<S: MarkupSink>(&mut self, ch: char, sink: &mut S) {
        if let Err(Overflow(kind)) = self.text.push(ch) {
            sink.problem(self.line, Problem::BufferOverflow(kind));
        }
    }

    fn push_directive<S: MarkupSink>(&mut self, ch: char, sink: &mut S) {
        if let Err(Overflow(kind)) = self.directive.push(ch) {
            sink.problem(self.line, Problem::BufferOverflow(kind));
        }
    }

    fn end_of_line<S: MarkupSink>(&mut self, sink: &mut S) -> Result<(), S::Error> {
        match self.mode {
            Mode::Directive => sink.problem(self.line, Problem::UnterminatedDirective),
            Mode::Chord => sink.problem(self.line, Problem::UnterminatedChord),
            _ => {}
        }
        if !self.has_directive {
            let content = Line {
                text: self.text.take(),
                chords: std::mem::take(&mut self.chords),
            };
            sink.line(self.line, content)?;
        }
        self.reset_line();
        self.next_line();
        Ok(())
    }

    fn reset_line(&mut self) {
        self.text.clear();
        self.chord.clear();
        self.directive.clear();
        self.chords.clear();
        self.has_directive = false;
    }

    fn next_line(&mut self) {
        self.line += 1;
        self.column = 0;
        self.mode = Mode::Text;
    }
}
