use crate::value::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Every failure the engine reports, from lexing a document to mutating a tree.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Setting(#[from] SettingError),

    #[error("invalid option '{option}': {reason}")]
    #[diagnostic(code(options::invalid))]
    InvalidOption { option: String, reason: String },
}

impl ConfigError {
    /// The 1-based source line, for errors raised while reading a document.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            ConfigError::Lex(err) => Some(err.line()),
            ConfigError::Parse(err) => Some(err.line()),
            ConfigError::Setting(_) | ConfigError::InvalidOption { .. } => None,
        }
    }

    /// The 1-based source column, for errors raised while reading a document.
    #[must_use]
    pub fn column(&self) -> Option<usize> {
        match self {
            ConfigError::Lex(err) => Some(err.column()),
            ConfigError::Parse(err) => Some(err.column()),
            ConfigError::Setting(_) | ConfigError::InvalidOption { .. } => None,
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexError {
    #[error("unexpected character '{ch}' at line {line}, column {column}")]
    #[diagnostic(
        code(lexer::unexpected_char),
        help("Setting names start with a letter or '_'; values are numbers, strings, booleans or brackets.")
    )]
    UnexpectedChar {
        ch: char,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("not valid here")]
        span: SourceSpan,
    },

    #[error("unterminated string starting at line {line}, column {column}")]
    #[diagnostic(
        code(lexer::unterminated_string),
        help("Close the string with a double quote.")
    )]
    UnterminatedString {
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("invalid escape sequence '{sequence}' at line {line}, column {column}")]
    #[diagnostic(
        code(lexer::invalid_escape),
        help("Supported escapes are \\\\, \\\", \\n, \\r, \\t, \\f and \\xHH (00 to 7F).")
    )]
    InvalidEscape {
        sequence: String,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown escape")]
        span: SourceSpan,
    },

    #[error("unterminated block comment starting at line {line}, column {column}")]
    #[diagnostic(code(lexer::unterminated_comment), help("Close the comment with '*/'."))]
    UnterminatedComment {
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("comment starts here")]
        span: SourceSpan,
    },

    #[error("invalid number '{text}' at line {line}, column {column}: {reason}")]
    #[diagnostic(code(lexer::invalid_number))]
    InvalidNumber {
        text: String,
        reason: String,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("{reason}")]
        span: SourceSpan,
    },
}

impl LexError {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            LexError::UnexpectedChar { line, .. }
            | LexError::UnterminatedString { line, .. }
            | LexError::InvalidEscape { line, .. }
            | LexError::UnterminatedComment { line, .. }
            | LexError::InvalidNumber { line, .. } => *line,
        }
    }

    #[must_use]
    pub fn column(&self) -> usize {
        match self {
            LexError::UnexpectedChar { column, .. }
            | LexError::UnterminatedString { column, .. }
            | LexError::InvalidEscape { column, .. }
            | LexError::UnterminatedComment { column, .. }
            | LexError::InvalidNumber { column, .. } => *column,
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParseError {
    #[error("unexpected {found} at line {line}, column {column}: expected {expected}")]
    #[diagnostic(
        code(parser::unexpected_token),
        help("The parser found a token it did not expect in this position.")
    )]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected}, but found this")]
        span: SourceSpan,
    },

    #[error("unexpected end of input at line {line}, column {column}: expected {expected}")]
    #[diagnostic(
        code(parser::unexpected_eof),
        help("The document ended before the construct was closed.")
    )]
    UnexpectedEof {
        expected: String,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("Input ended here")]
        span: SourceSpan,
    },

    #[error("duplicate setting name '{name}' at line {line}, column {column}")]
    #[diagnostic(
        code(parser::duplicate_name),
        help("Names must be unique within a group.")
    )]
    DuplicateName {
        name: String,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("'{name}' is already defined in this group")]
        span: SourceSpan,
    },

    #[error("nesting deeper than {max} levels at line {line}, column {column}")]
    #[diagnostic(code(parser::depth_exceeded))]
    DepthExceeded {
        max: usize,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("this container exceeds the nesting limit")]
        span: SourceSpan,
    },

    #[error("array element of kind {found} at line {line}, column {column}; the array holds {expected} values")]
    #[diagnostic(
        code(parser::type_mismatch),
        help("Arrays hold scalars of one kind. Use a list '( ... )' to mix kinds.")
    )]
    TypeMismatch {
        expected: Kind,
        found: Kind,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("expected {expected}")]
        span: SourceSpan,
    },

    #[error("cannot include '{path}' at line {line}, column {column}: {reason}")]
    #[diagnostic(code(parser::include_not_found))]
    IncludeNotFound {
        path: String,
        reason: String,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("included here")]
        span: SourceSpan,
    },

    #[error("include of '{path}' nests deeper than {max} files at line {line}, column {column}")]
    #[diagnostic(code(parser::include_too_deep))]
    IncludeTooDeep {
        path: String,
        max: usize,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("included here")]
        span: SourceSpan,
    },

    #[error("'@include' is not enabled at line {line}, column {column}")]
    #[diagnostic(
        code(parser::include_disabled),
        help("Configure an include directory or resolver in ParseOptions.")
    )]
    IncludeDisabled {
        path: String,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("included here")]
        span: SourceSpan,
    },
}

impl ParseError {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { line, .. }
            | ParseError::UnexpectedEof { line, .. }
            | ParseError::DuplicateName { line, .. }
            | ParseError::DepthExceeded { line, .. }
            | ParseError::TypeMismatch { line, .. }
            | ParseError::IncludeNotFound { line, .. }
            | ParseError::IncludeTooDeep { line, .. }
            | ParseError::IncludeDisabled { line, .. } => *line,
        }
    }

    #[must_use]
    pub fn column(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { column, .. }
            | ParseError::UnexpectedEof { column, .. }
            | ParseError::DuplicateName { column, .. }
            | ParseError::DepthExceeded { column, .. }
            | ParseError::TypeMismatch { column, .. }
            | ParseError::IncludeNotFound { column, .. }
            | ParseError::IncludeTooDeep { column, .. }
            | ParseError::IncludeDisabled { column, .. } => *column,
        }
    }
}

/// Errors raised by path resolution, typed access and tree mutation.
/// A failed mutation leaves the tree untouched.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum SettingError {
    #[error("setting not found: '{path}'")]
    #[diagnostic(code(setting::not_found))]
    NotFound { path: String },

    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    #[diagnostic(code(setting::type_mismatch))]
    TypeMismatch {
        path: String,
        expected: String,
        found: Kind,
    },

    #[error("cannot insert into '{path}': {reason}")]
    #[diagnostic(code(setting::invalid_insert))]
    InvalidInsert { path: String, reason: String },

    #[error("invalid value for '{path}': {reason}")]
    #[diagnostic(code(setting::invalid_value))]
    InvalidValue { path: String, reason: String },

    #[error("invalid path '{path}': {reason}")]
    #[diagnostic(
        code(setting::invalid_path),
        help("Paths look like 'a.b.c', 'a.b[2]' or 'a.b.(3)'.")
    )]
    InvalidPath { path: String, reason: String },

    #[error("the root setting cannot be removed")]
    #[diagnostic(code(setting::root_removal))]
    RootRemoval,
}
