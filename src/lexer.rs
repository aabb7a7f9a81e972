use crate::error::LexError;
use crate::number::{parse_literal, Number};
use crate::utils::{get_line_and_column, named_source};
use crate::value::IntegerBase;

/// Represents the different kinds of tokens that the lexer can produce.
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    // == Special Tokens ==
    /// Represents the end of the input.
    Eof,
    /// A run of whitespace characters.
    Whitespace,
    /// A `#`, `//` or `/* */` comment. Holds the comment text without its delimiters.
    Comment(String),

    // == Literals ==
    /// A setting name.
    Name(String),
    /// A string literal with escapes decoded. Adjacent strings are joined by the parser.
    String(String),
    /// `true` or `false`, in any letter case.
    Boolean(bool),
    /// An integer that fits in 32 bits. `base` is `None` for decimal literals.
    Integer { value: i32, base: Option<IntegerBase> },
    /// A 64-bit integer, either suffixed with `L` or too large for 32 bits.
    Integer64 { value: i64, base: Option<IntegerBase> },
    Float(f64),

    // == Directives ==
    /// `@include`
    Include,

    // == Punctuation ==
    /// Left Brace: `{`
    LBrace,
    /// Right Brace: `}`
    RBrace,
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,
    /// Left Parenthesis: `(`
    LParen,
    /// Right Parenthesis: `)`
    RParen,
    /// Comma: `,`
    Comma,
    /// Semicolon: `;`
    Semicolon,
    /// Equals: `=`
    Equals,
    /// Colon: `:`
    Colon,
}

impl TokenType {
    /// A short human readable description, used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            TokenType::Eof => "end of input".to_string(),
            TokenType::Whitespace => "whitespace".to_string(),
            TokenType::Comment(_) => "comment".to_string(),
            TokenType::Name(name) => format!("name '{name}'"),
            TokenType::String(_) => "string".to_string(),
            TokenType::Boolean(b) => format!("boolean '{b}'"),
            TokenType::Integer { value, .. } => format!("integer '{value}'"),
            TokenType::Integer64 { value, .. } => format!("integer '{value}'"),
            TokenType::Float(f) => format!("float '{f}'"),
            TokenType::Include => "'@include'".to_string(),
            TokenType::LBrace => "'{'".to_string(),
            TokenType::RBrace => "'}'".to_string(),
            TokenType::LBracket => "'['".to_string(),
            TokenType::RBracket => "']'".to_string(),
            TokenType::LParen => "'('".to_string(),
            TokenType::RParen => "')'".to_string(),
            TokenType::Comma => "','".to_string(),
            TokenType::Semicolon => "';'".to_string(),
            TokenType::Equals => "'='".to_string(),
            TokenType::Colon => "':'".to_string(),
        }
    }
}

/// A token with its type, byte range and starting line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ttype: TokenType,
    pub pos_start: usize,
    pub pos_end: usize,
    pub line: usize,
}

impl Token {
    pub fn new(ttype: TokenType, pos_start: usize, pos_end: usize, line: usize) -> Token {
        Token {
            ttype,
            pos_start,
            pos_end,
            line,
        }
    }
}

/// The characters accepted as an extra name character. Everything else is
/// either already part of names or has a meaning in documents or paths.
pub const EXTRA_NAME_CHARS: &str = "!$%&*<>?^`|~";

#[must_use]
pub fn is_allowed_extra_name_char(c: char) -> bool {
    EXTRA_NAME_CHARS.contains(c)
}

/// Whether `name` is a legal setting name.
///
/// Names start with an ASCII letter, `_` or the extra character, and continue
/// with letters, digits, `_`, `-` or the extra character. `true` and `false`
/// (any case) are booleans, not names.
#[must_use]
pub fn is_valid_name(name: &str, extra: Option<char>) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_name_start(first, extra)
        && chars.all(|c| is_name_char(c, extra))
        && !name.eq_ignore_ascii_case("true")
        && !name.eq_ignore_ascii_case("false")
}

fn is_name_start(c: char, extra: Option<char>) -> bool {
    c.is_ascii_alphabetic() || c == '_' || Some(c) == extra
}

fn is_name_char(c: char, extra: Option<char>) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || Some(c) == extra
}

/// A lazy tokenizer. Iterating yields tokens up to and including `Eof`, or
/// stops after the first error. Cloning a lexer, or calling [`Lexer::reset`],
/// restarts the stream.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    source_name: String,
    position: usize,
    line: usize,
    extra_name_char: Option<char>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_name(input, "<input>")
    }

    pub fn with_name(input: &'a str, name: &str) -> Self {
        Self {
            input,
            source_name: name.to_string(),
            position: 0,
            line: 1,
            extra_name_char: None,
            finished: false,
        }
    }

    /// Allows `c` in setting names in addition to letters, digits, `_` and `-`.
    #[must_use]
    pub fn with_extra_name_char(mut self, c: Option<char>) -> Self {
        self.extra_name_char = c;
        self
    }

    /// Rewinds to the start of the input.
    pub fn reset(&mut self) {
        self.position = 0;
        self.line = 1;
        self.finished = false;
    }

    /// Tokenizes the whole input, including whitespace and comments.
    pub fn lex(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.ttype == TokenType::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let start_pos = self.position;
        let start_line = self.line;

        let ttype = if let Some(char) = self.advance() {
            match char {
                '{' => TokenType::LBrace,
                '}' => TokenType::RBrace,
                '[' => TokenType::LBracket,
                ']' => TokenType::RBracket,
                '(' => TokenType::LParen,
                ')' => TokenType::RParen,
                ',' => TokenType::Comma,
                ';' => TokenType::Semicolon,
                '=' => TokenType::Equals,
                ':' => TokenType::Colon,
                '#' => self.read_line_comment(),
                '/' => match self.peek() {
                    Some('/') => {
                        self.advance();
                        self.read_line_comment()
                    }
                    Some('*') => {
                        self.advance();
                        self.read_block_comment(start_pos, start_line)?
                    }
                    _ => return Err(self.unexpected_char('/', start_pos)),
                },
                '"' => self.read_string(start_pos)?,
                '@' => self.read_directive(start_pos)?,
                c if c.is_whitespace() => self.read_whitespace(),
                c if is_name_start(c, self.extra_name_char) => self.read_name(start_pos),
                c if c.is_ascii_digit() => self.read_number(start_pos)?,
                '-' | '+' | '.' if self.starts_number(char) => self.read_number(start_pos)?,
                c => return Err(self.unexpected_char(c, start_pos)),
            }
        } else {
            self.finished = true;
            TokenType::Eof
        };

        Ok(Token::new(ttype, start_pos, self.position, start_line))
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.input[self.position..].chars().next()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    /// After a sign or a dot: does a numeric literal follow?
    fn starts_number(&self, first: char) -> bool {
        match (first, self.peek()) {
            (_, Some(c)) if c.is_ascii_digit() => true,
            ('-' | '+', Some('.')) => self.peek_second().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn read_whitespace(&mut self) -> TokenType {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
        TokenType::Whitespace
    }

    fn read_line_comment(&mut self) -> TokenType {
        let start = self.position;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        TokenType::Comment(self.input[start..self.position].trim().to_string())
    }

    fn read_block_comment(&mut self, start_pos: usize, start_line: usize) -> Result<TokenType, LexError> {
        let body_start = self.position;
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    let body = self.input[body_start..self.position - 1].trim().to_string();
                    self.advance();
                    return Ok(TokenType::Comment(body));
                }
                Some(_) => {}
                None => {
                    let (_, column) = get_line_and_column(self.input, start_pos);
                    return Err(LexError::UnterminatedComment {
                        line: start_line,
                        column,
                        src: self.source(),
                        span: (start_pos, 2).into(),
                    });
                }
            }
        }
    }

    fn read_string(&mut self, start_pos: usize) -> Result<TokenType, LexError> {
        let mut value = String::new();
        loop {
            let escape_pos = self.position;
            match self.advance() {
                Some('"') => return Ok(TokenType::String(value)),
                Some('\\') => value.push(self.read_escape(escape_pos)?),
                Some(c) => value.push(c),
                None => {
                    let (line, column) = get_line_and_column(self.input, start_pos);
                    return Err(LexError::UnterminatedString {
                        line,
                        column,
                        src: self.source(),
                        span: (start_pos, 1).into(),
                    });
                }
            }
        }
    }

    /// Decodes the escape following a backslash at `escape_pos`.
    fn read_escape(&mut self, escape_pos: usize) -> Result<char, LexError> {
        match self.advance() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('f') => Ok('\x0C'),
            Some('x') => {
                let mut code = 0u32;
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(16)) {
                        Some(digit) => {
                            self.advance();
                            code = code * 16 + digit;
                        }
                        None => return Err(self.invalid_escape(escape_pos)),
                    }
                }
                match char::from_u32(code) {
                    Some(c) if c.is_ascii() => Ok(c),
                    _ => Err(self.invalid_escape(escape_pos)),
                }
            }
            _ => Err(self.invalid_escape(escape_pos)),
        }
    }

    fn read_directive(&mut self, start_pos: usize) -> Result<TokenType, LexError> {
        let word_start = self.position;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphabetic() {
                self.advance();
            } else {
                break;
            }
        }
        if &self.input[word_start..self.position] == "include" {
            Ok(TokenType::Include)
        } else {
            Err(self.unexpected_char('@', start_pos))
        }
    }

    fn read_name(&mut self, start_pos: usize) -> TokenType {
        while let Some(c) = self.peek() {
            if is_name_char(c, self.extra_name_char) {
                self.advance();
            } else {
                break;
            }
        }

        let name = &self.input[start_pos..self.position];
        if name.eq_ignore_ascii_case("true") {
            TokenType::Boolean(true)
        } else if name.eq_ignore_ascii_case("false") {
            TokenType::Boolean(false)
        } else {
            TokenType::Name(name.to_string())
        }
    }

    /// Scans the extent of a numeric literal, then classifies it.
    /// The first character has already been consumed.
    fn read_number(&mut self, start_pos: usize) -> Result<TokenType, LexError> {
        let is_hex = {
            let rest = &self.input[start_pos..];
            let unsigned = rest.strip_prefix(['-', '+']).unwrap_or(rest);
            unsigned.starts_with("0x") || unsigned.starts_with("0X")
        };

        let mut previous = self.input[start_pos..].chars().next();
        while let Some(c) = self.peek() {
            let exponent_sign = !is_hex
                && matches!(c, '+' | '-')
                && matches!(previous, Some('e' | 'E'));
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                self.advance();
                previous = Some(c);
            } else {
                break;
            }
        }

        let text = &self.input[start_pos..self.position];
        match parse_literal(text) {
            Ok(Number::Int { value, base }) => Ok(TokenType::Integer { value, base }),
            Ok(Number::Int64 { value, base }) => Ok(TokenType::Integer64 { value, base }),
            Ok(Number::Float(value)) => Ok(TokenType::Float(value)),
            Err(reason) => {
                let (line, column) = get_line_and_column(self.input, start_pos);
                Err(LexError::InvalidNumber {
                    text: text.to_string(),
                    reason,
                    line,
                    column,
                    src: self.source(),
                    span: (start_pos, text.len()).into(),
                })
            }
        }
    }

    // === Error Helpers ===

    fn source(&self) -> miette::NamedSource<String> {
        named_source(&self.source_name, self.input)
    }

    fn unexpected_char(&mut self, ch: char, pos: usize) -> LexError {
        self.finished = true;
        let (line, column) = get_line_and_column(self.input, pos);
        LexError::UnexpectedChar {
            ch,
            line,
            column,
            src: self.source(),
            span: (pos, ch.len_utf8()).into(),
        }
    }

    fn invalid_escape(&mut self, escape_pos: usize) -> LexError {
        self.finished = true;
        let (line, column) = get_line_and_column(self.input, escape_pos);
        LexError::InvalidEscape {
            sequence: self.input[escape_pos..self.position].to_string(),
            line,
            column,
            src: self.source(),
            span: (escape_pos, self.position - escape_pos).into(),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is_err() {
            self.finished = true;
        }
        Some(token)
    }
}
