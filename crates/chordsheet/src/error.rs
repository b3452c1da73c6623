use thiserror::Error;

use crate::buffer::BufferKind;

/// Fatal errors. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("render error: {0}")]
    Render(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("page type {0} is not supported")]
    UnknownPaperType(String),
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Recoverable problems. They are reported with their location and the
/// offending construct is skipped or partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    #[error("opening a chord within a chord")]
    NestedChord,
    #[error("']' found with no matching '['")]
    UnmatchedChordClose,
    #[error("'}}' found with no matching '{{'")]
    UnmatchedDirectiveClose,
    #[error("directive opened inside a chord")]
    DirectiveInChord,
    #[error("line ends while in a directive")]
    UnterminatedDirective,
    #[error("line ends while in a chord")]
    UnterminatedChord,
    #[error("buffer overflow in {0}")]
    BufferOverflow(BufferKind),
    #[error("line is not a directive")]
    NotADirective,

    #[error("invalid directive: [{0}]")]
    UnknownDirective(String),
    #[error("missing argument for {0}")]
    MissingArgument(&'static str),
    #[error("invalid value for {directive}: {value:?}")]
    InvalidValue {
        directive: &'static str,
        value: String,
    },
    #[error("relative sizing is an extended feature: {0}")]
    RelativeSizeNotEnabled(&'static str),
    #[error("extended commands not enabled: {0}")]
    ExtensionsDisabled(&'static str),
    #[error("{0} directive can only be used in a configuration file")]
    StartupOnly(&'static str),
    #[error("{0} makes no sense in a configuration file")]
    NotInStartup(&'static str),
    #[error("unsupported directive: [{0}]")]
    Unsupported(&'static str),
    #[error("unimplemented directive: [{0}]")]
    Unimplemented(&'static str),
    #[error("null comment")]
    EmptyComment,
    #[error("not in a chorus")]
    NotInChorus,
    #[error("already in a tablature")]
    AlreadyInTab,
    #[error("not in a tablature")]
    NotInTab,
    #[error("already in a block")]
    AlreadyInBlock,
    #[error("not in a block")]
    NotInBlock,
    #[error("already in multiple column mode")]
    AlreadyMultiColumn,
    #[error("not in multiple column mode")]
    NotMultiColumn,
    #[error("page type {0} is not supported")]
    UnknownPaperType(String),
    #[error("invalid form specification: {0}")]
    InvalidForm(String),

    #[error("don't know how to transpose [{0}]")]
    Transpose(String),
    #[error("unrecognized chord name [{0}]")]
    UnknownChordRoot(String),
    #[error("invalid definition of chord {name}: {reason}")]
    InvalidChordDefinition { name: String, reason: String },
    #[error("chord {name} spans {span} frets and cannot be fitted in the grid")]
    Ungridable { name: String, span: u8 },

    /// Compatibility notices, only produced at raised warning levels.
    #[error("{0}")]
    Notice(String),
}
