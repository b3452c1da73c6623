//! Directive keywords and their typed arguments.
//!
//! Parsing happens in two steps: [`Keyword::lookup`] resolves the keyword so
//! that gating rules can be checked first, then [`Directive::parse`] validates
//! the arguments into a [`Directive`].
use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::Problem;
use crate::style::FontSlot;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    StartOfChorus,
    EndOfChorus,
    TextFont,
    ChordFont,
    TextSize,
    ChordSize,
    Comment,
    CommentItalic,
    CommentBox,
    NewSong,
    Title,
    Subtitle,
    Define,
    Chord,
    NoGrid,
    Grid,
    NewPage,
    NewPhysicalPage,
    StartOfTab,
    EndOfTab,
    ColumnBreak,
    Columns,
    TwoColumnOn,
    TwoColumnOff,
    OldDefine,
    NewDefine,
    StartOfBlock,
    EndOfBlock,
    StartOfBridge,
    EndOfBridge,
    StartOfIndent,
    EndOfIndent,
    AutoSpaceOn,
    AutoSpaceOff,
    TabFont,
    TabSize,
    CommentFont,
    CommentSize,
    CommentItalicFont,
    CommentItalicSize,
    PaperType,
    FormSpec,
    ConditionalBreak,
    SetIndent,
    EnableExtensions,
    DisableExtensions,
    Version,
}

// keyword, aliases
const TABLE: &[(Keyword, &[&str])] = &[
    (Keyword::StartOfChorus, &["start_of_chorus", "soc"]),
    (Keyword::EndOfChorus, &["end_of_chorus", "eoc"]),
    (Keyword::TextFont, &["textfont", "tf"]),
    (Keyword::ChordFont, &["chordfont", "cf"]),
    (Keyword::TextSize, &["textsize", "ts"]),
    (Keyword::ChordSize, &["chordsize", "cs"]),
    (Keyword::Comment, &["comment", "c"]),
    (Keyword::CommentItalic, &["comment_italic", "ci"]),
    (Keyword::CommentBox, &["comment_box", "cb"]),
    (Keyword::NewSong, &["new_song", "ns"]),
    (Keyword::Title, &["title", "t"]),
    (Keyword::Subtitle, &["subtitle", "st"]),
    (Keyword::Define, &["define", "d"]),
    (Keyword::Chord, &["chord"]),
    (Keyword::NoGrid, &["no_grid", "ng"]),
    (Keyword::Grid, &["grid", "g"]),
    (Keyword::NewPage, &["new_page", "np"]),
    (Keyword::NewPhysicalPage, &["new_physical_page", "npp"]),
    (Keyword::StartOfTab, &["start_of_tab", "sot"]),
    (Keyword::EndOfTab, &["end_of_tab", "eot"]),
    (Keyword::ColumnBreak, &["column_break", "colb"]),
    (Keyword::Columns, &["columns", "col"]),
    (Keyword::TwoColumnOn, &["two_column_on", "tcon"]),
    (Keyword::TwoColumnOff, &["two_column_off", "tcoff"]),
    (Keyword::OldDefine, &["old_define"]),
    (Keyword::NewDefine, &["new_define"]),
    (Keyword::StartOfBlock, &["start_of_block", "soblk"]),
    (Keyword::EndOfBlock, &["end_of_block", "eoblk"]),
    (Keyword::StartOfBridge, &["start_of_bridge", "sob"]),
    (Keyword::EndOfBridge, &["end_of_bridge", "eob"]),
    (Keyword::StartOfIndent, &["start_of_indent", "soi"]),
    (Keyword::EndOfIndent, &["end_of_indent", "eoi"]),
    (Keyword::AutoSpaceOn, &["auto_space_on"]),
    (Keyword::AutoSpaceOff, &["auto_space_off"]),
    (Keyword::TabFont, &["tab_font"]),
    (Keyword::TabSize, &["tab_size"]),
    (Keyword::CommentFont, &["comment_font"]),
    (Keyword::CommentSize, &["comment_size"]),
    (Keyword::CommentItalicFont, &["comment_italic_font"]),
    (Keyword::CommentItalicSize, &["comment_italic_size"]),
    (Keyword::PaperType, &["paper_type"]),
    (Keyword::FormSpec, &["form_spec"]),
    (Keyword::ConditionalBreak, &["conditional_break"]),
    (Keyword::SetIndent, &["set_indent"]),
    (Keyword::EnableExtensions, &["enable_extensions"]),
    (Keyword::DisableExtensions, &["disable_extensions"]),
    (Keyword::Version, &["version"]),
];

static BY_NAME: Lazy<HashMap<&'static str, Keyword>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (keyword, names) in TABLE {
        for name in names.iter() {
            m.insert(*name, *keyword);
        }
    }
    m
});

impl Keyword {
    /// Case-insensitive lookup of a keyword or one of its aliases.
    pub fn lookup(name: &str) -> Option<Keyword> {
        BY_NAME.get(name.to_ascii_lowercase().as_str()).copied()
    }

    /// Canonical (long) name.
    pub fn name(self) -> &'static str {
        TABLE
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, names)| names[0])
            .unwrap_or("directive")
    }

    /// Extension directives that are never allowed without extensions.
    pub fn always_gated(self) -> bool {
        matches!(
            self,
            Keyword::AutoSpaceOn
                | Keyword::AutoSpaceOff
                | Keyword::ConditionalBreak
                | Keyword::SetIndent
                | Keyword::Version
        )
    }

    /// Extension directives that a configuration file may still use.
    pub fn gated_in_document(self) -> bool {
        matches!(
            self,
            Keyword::TabFont
                | Keyword::TabSize
                | Keyword::CommentFont
                | Keyword::CommentSize
                | Keyword::CommentItalicFont
                | Keyword::CommentItalicSize
        )
    }

    pub fn startup_only(self) -> bool {
        matches!(self, Keyword::PaperType | Keyword::FormSpec)
    }

    /// Directives that print something or move the layout cursor.
    pub fn is_content(self) -> bool {
        matches!(
            self,
            Keyword::StartOfChorus
                | Keyword::EndOfChorus
                | Keyword::Comment
                | Keyword::CommentItalic
                | Keyword::CommentBox
                | Keyword::NewSong
                | Keyword::Title
                | Keyword::Subtitle
                | Keyword::NewPage
                | Keyword::NewPhysicalPage
                | Keyword::StartOfTab
                | Keyword::EndOfTab
                | Keyword::ColumnBreak
                | Keyword::Columns
                | Keyword::TwoColumnOn
                | Keyword::TwoColumnOff
                | Keyword::StartOfBlock
                | Keyword::EndOfBlock
                | Keyword::StartOfBridge
                | Keyword::EndOfBridge
                | Keyword::StartOfIndent
                | Keyword::EndOfIndent
                | Keyword::ConditionalBreak
        )
    }

    /// Compatibility notice shown at warning levels above 4.
    pub fn compat_notice(self) -> Option<String> {
        let name = self.name();
        match self {
            Keyword::OldDefine
            | Keyword::NewDefine
            | Keyword::StartOfBlock
            | Keyword::EndOfBlock
            | Keyword::StartOfBridge
            | Keyword::EndOfBridge => Some(format!("{name} is a Chord Pro Manager feature")),
            Keyword::TabFont
            | Keyword::TabSize
            | Keyword::CommentFont
            | Keyword::CommentSize
            | Keyword::CommentItalicFont
            | Keyword::CommentItalicSize
            | Keyword::AutoSpaceOn
            | Keyword::AutoSpaceOff
            | Keyword::ConditionalBreak
            | Keyword::SetIndent
            | Keyword::Version => Some(format!("{name} is not supported by Chord Pro Manager")),
            _ => None,
        }
    }
}

/// A size argument; a leading sign makes it relative.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SizeArg {
    Absolute(i32),
    Relative(i32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommentStyle {
    Shaded,
    Italic,
    Boxed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    StartOfChorus,
    EndOfChorus,
    Font(FontSlot, String),
    Size(FontSlot, SizeArg),
    Comment(CommentStyle, String),
    NewSong,
    Title(String),
    Subtitle(String),
    Define(String),
    Chord(String),
    Grid(bool),
    NewPage,
    NewPhysicalPage,
    StartOfTab,
    EndOfTab,
    ColumnBreak,
    Columns(u32),
    TwoColumn(bool),
    OldDefine,
    NewDefine,
    StartOfBlock(String),
    EndOfBlock,
    Bridge(Keyword),
    Indent(Keyword),
    AutoSpace(bool),
    PaperType(String),
    FormSpec {
        name: String,
        top: f64,
        width: f64,
        left: f64,
        bottom: f64,
    },
    ConditionalBreak(u32),
    SetIndent(i32),
    Extensions(bool),
    Version(i32),
}

/// Split directive text into its keyword and the remaining argument text.
pub fn split_keyword(text: &str) -> (&str, &str) {
    let text = text.trim_start_matches(is_delimiter);
    match text.find(is_delimiter) {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    }
}

fn is_delimiter(c: char) -> bool {
    c == ':' || c.is_whitespace()
}

fn first_token(args: &str) -> Option<&str> {
    args.split(is_delimiter).find(|t| !t.is_empty())
}

/// Leading integer of `s` the way C's `atoi` reads it: optional sign, then
/// digits, anything after ignored. No digits reads as zero.
pub fn leading_int(s: &str) -> i32 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, d| acc.saturating_mul(10).saturating_add((d - b'0') as i32));
    if negative {
        -value
    } else {
        value
    }
}

fn size_arg(keyword: Keyword, args: &str) -> Result<SizeArg, Problem> {
    let token = first_token(args).ok_or(Problem::MissingArgument(keyword.name()))?;
    let value = leading_int(token);
    if value == 0 {
        return Err(Problem::InvalidValue {
            directive: keyword.name(),
            value: token.to_string(),
        });
    }
    Ok(if token.starts_with(|c| c == '+' || c == '-') {
        SizeArg::Relative(value)
    } else {
        SizeArg::Absolute(value)
    })
}

fn font_arg(keyword: Keyword, args: &str) -> Result<String, Problem> {
    first_token(args)
        .map(str::to_string)
        .ok_or(Problem::MissingArgument(keyword.name()))
}

fn positive_arg(keyword: Keyword, args: &str, min: i32) -> Result<u32, Problem> {
    let token = first_token(args).unwrap_or("");
    let value = leading_int(token);
    if value < min {
        return Err(Problem::InvalidValue {
            directive: keyword.name(),
            value: token.to_string(),
        });
    }
    Ok(value as u32)
}

fn form_spec(args: &str) -> Result<Directive, Problem> {
    let mut tokens = args.split(is_delimiter).filter(|t| !t.is_empty());
    let name = tokens
        .next()
        .ok_or(Problem::MissingArgument("form_spec"))?
        .to_ascii_lowercase();
    let mut extent = |what: &str| -> Result<f64, Problem> {
        let token = tokens
            .next()
            .ok_or_else(|| Problem::InvalidForm(format!("{name}: no {what}")))?;
        token
            .parse::<f64>()
            .map_err(|_| Problem::InvalidForm(format!("{name}: bad {what} {token:?}")))
    };
    let top = extent("top extent")?;
    let width = extent("width extent")?;
    let left = extent("left margin")?;
    let bottom = extent("bottom margin")?;
    Ok(Directive::FormSpec {
        name,
        top,
        width,
        left,
        bottom,
    })
}

impl Directive {
    /// Validate the arguments of `keyword`.
    pub fn parse(keyword: Keyword, args: &str) -> Result<Directive, Problem> {
        use Keyword as K;
        let text = args.trim();
        let directive = match keyword {
            K::StartOfChorus => Directive::StartOfChorus,
            K::EndOfChorus => Directive::EndOfChorus,
            K::TextFont => Directive::Font(FontSlot::Text, font_arg(keyword, args)?),
            K::ChordFont => Directive::Font(FontSlot::Chord, font_arg(keyword, args)?),
            K::TabFont => Directive::Font(FontSlot::Mono, font_arg(keyword, args)?),
            K::CommentFont => Directive::Font(FontSlot::Comment, font_arg(keyword, args)?),
            K::CommentItalicFont => {
                Directive::Font(FontSlot::CommentItalic, font_arg(keyword, args)?)
            }
            K::TextSize => Directive::Size(FontSlot::Text, size_arg(keyword, args)?),
            K::ChordSize => Directive::Size(FontSlot::Chord, size_arg(keyword, args)?),
            K::TabSize => Directive::Size(FontSlot::Mono, size_arg(keyword, args)?),
            K::CommentSize => Directive::Size(FontSlot::Comment, size_arg(keyword, args)?),
            K::CommentItalicSize => {
                Directive::Size(FontSlot::CommentItalic, size_arg(keyword, args)?)
            }
            K::Comment => Directive::Comment(CommentStyle::Shaded, text.to_string()),
            K::CommentItalic => Directive::Comment(CommentStyle::Italic, text.to_string()),
            K::CommentBox => Directive::Comment(CommentStyle::Boxed, text.to_string()),
            K::NewSong => Directive::NewSong,
            K::Title => Directive::Title(text.to_string()),
            K::Subtitle => Directive::Subtitle(text.to_string()),
            K::Define => Directive::Define(text.to_string()),
            K::Chord => Directive::Chord(text.to_string()),
            K::NoGrid => Directive::Grid(false),
            K::Grid => Directive::Grid(true),
            K::NewPage => Directive::NewPage,
            K::NewPhysicalPage => Directive::NewPhysicalPage,
            K::StartOfTab => Directive::StartOfTab,
            K::EndOfTab => Directive::EndOfTab,
            K::ColumnBreak => Directive::ColumnBreak,
            K::Columns => Directive::Columns(positive_arg(keyword, args, 2)?),
            K::TwoColumnOn => Directive::TwoColumn(true),
            K::TwoColumnOff => Directive::TwoColumn(false),
            K::OldDefine => Directive::OldDefine,
            K::NewDefine => Directive::NewDefine,
            K::StartOfBlock => Directive::StartOfBlock(text.to_string()),
            K::EndOfBlock => Directive::EndOfBlock,
            K::StartOfBridge | K::EndOfBridge => Directive::Bridge(keyword),
            K::StartOfIndent | K::EndOfIndent => Directive::Indent(keyword),
            K::AutoSpaceOn => Directive::AutoSpace(true),
            K::AutoSpaceOff => Directive::AutoSpace(false),
            K::PaperType => Directive::PaperType(font_arg(keyword, args)?),
            K::FormSpec => form_spec(args)?,
            K::ConditionalBreak => Directive::ConditionalBreak(positive_arg(keyword, args, 1)?),
            K::SetIndent => Directive::SetIndent(leading_int(first_token(args).unwrap_or(""))),
            K::EnableExtensions => Directive::Extensions(true),
            K::DisableExtensions => Directive::Extensions(false),
            K::Version => Directive::Version(leading_int(first_token(args).unwrap_or(""))),
        };
        Ok(directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!(Keyword::lookup("SOC"), Some(Keyword::StartOfChorus));
        assert_eq!(Keyword::lookup("colb"), Some(Keyword::ColumnBreak));
        assert_eq!(Keyword::lookup("c"), Some(Keyword::Comment));
        assert_eq!(Keyword::lookup("bogus"), None);
        assert_eq!(Keyword::ColumnBreak.name(), "column_break");
    }

    #[test]
    fn split_on_colon_or_space() {
        assert_eq!(split_keyword("title: Test"), ("title", " Test"));
        assert_eq!(split_keyword("t Hello world"), ("t", "Hello world"));
        assert_eq!(split_keyword("soc"), ("soc", ""));
    }

    #[test]
    fn size_arguments() {
        assert_eq!(
            Directive::parse(Keyword::TextSize, " 14"),
            Ok(Directive::Size(FontSlot::Text, SizeArg::Absolute(14)))
        );
        assert_eq!(
            Directive::parse(Keyword::TextSize, "+2"),
            Ok(Directive::Size(FontSlot::Text, SizeArg::Relative(2)))
        );
        assert_eq!(
            Directive::parse(Keyword::ChordSize, "-3"),
            Ok(Directive::Size(FontSlot::Chord, SizeArg::Relative(-3)))
        );
        assert!(matches!(
            Directive::parse(Keyword::TextSize, "0"),
            Err(Problem::InvalidValue { .. })
        ));
        assert!(matches!(
            Directive::parse(Keyword::TextSize, "big"),
            Err(Problem::InvalidValue { .. })
        ));
    }

    #[test]
    fn columns_need_more_than_one() {
        assert_eq!(
            Directive::parse(Keyword::Columns, "3"),
            Ok(Directive::Columns(3))
        );
        assert!(Directive::parse(Keyword::Columns, "1").is_err());
    }

    #[test]
    fn text_arguments_are_trimmed() {
        assert_eq!(
            Directive::parse(Keyword::Comment, "  Chorus twice "),
            Ok(Directive::Comment(CommentStyle::Shaded, "Chorus twice".into()))
        );
    }

    #[test]
    fn form_spec_fields() {
        assert_eq!(
            Directive::parse(Keyword::FormSpec, " Mine 700 500 50 30"),
            Ok(Directive::FormSpec {
                name: "mine".into(),
                top: 700.0,
                width: 500.0,
                left: 50.0,
                bottom: 30.0
            })
        );
        assert!(matches!(
            Directive::parse(Keyword::FormSpec, "mine 700 500"),
            Err(Problem::InvalidForm(_))
        ));
    }

    #[test]
    fn atoi_semantics() {
        assert_eq!(leading_int("12pt"), 12);
        assert_eq!(leading_int("-4"), -4);
        assert_eq!(leading_int("x"), 0);
        assert_eq!(leading_int(""), 0);
    }
}
