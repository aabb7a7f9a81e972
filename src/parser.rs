use crate::error::{ConfigError, ParseError};
use crate::include::IncludedSource;
use crate::lexer::{Lexer, Token, TokenType};
use crate::options::{ParseOptions, MAX_INCLUDE_DEPTH};
use crate::tree::{Config, Payload, SettingId};
use crate::utils::get_line_and_column;
use crate::value::{IntegerBase, Kind};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use miette::{NamedSource, SourceSpan};
use std::sync::Arc;

/// A recursive descent parser for configuration documents.
///
/// The whole input is tokenized up front; whitespace and comments are dropped
/// before parsing starts. Any error rejects the document as a whole.
#[derive(Debug)]
pub struct Parser<'a> {
    name: String,
    source: Arc<NamedSource<String>>,
    tokens: Vec<Token>,
    position: usize,
    source_text: &'a str,
    options: ParseOptions,
    /// Recorded on every setting read from an included document.
    file: Option<Arc<str>>,
    include_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Result<Self, ConfigError> {
        Self::with_options(source_text, "<input>", ParseOptions::default())
    }

    pub fn with_options(
        source_text: &'a str,
        name: &str,
        options: ParseOptions,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        let mut lexer = Lexer::with_name(source_text, name).with_extra_name_char(options.extra_name_char);
        let tokens: Vec<Token> = lexer
            .lex()?
            .into_iter()
            .filter(|t| !matches!(t.ttype, TokenType::Whitespace | TokenType::Comment(_)))
            .collect();

        Ok(Self {
            name: name.to_string(),
            source: Arc::new(NamedSource::new(name, source_text.to_string())),
            tokens,
            position: 0,
            source_text,
            options,
            file: None,
            include_depth: 0,
        })
    }

    fn for_include(source: &'a IncludedSource, options: ParseOptions, include_depth: usize) -> Result<Self, ConfigError> {
        let mut parser = Self::with_options(&source.text, &source.name, options)?;
        parser.file = Some(Arc::from(source.name.as_str()));
        parser.include_depth = include_depth;
        Ok(parser)
    }

    // === Main Parsing Methods ===

    /// Document ::= { Setting | Include } EOF
    pub fn parse(&mut self) -> Result<Config, ConfigError> {
        debug!(
            "parsing {} ({} bytes, {} tokens)",
            self.name,
            self.source_text.len(),
            self.tokens.len()
        );
        let mut config = Config::new()
            .with_extra_name_char(self.options.extra_name_char)
            .with_max_depth(self.options.max_depth);
        let root = config.root();
        self.parse_settings(&mut config, root, 0, TokenType::Eof)?;
        self.expect(TokenType::Eof, "a setting name")?;
        debug!(
            "parsed {} into {} settings",
            self.name,
            config.setting_count()
        );
        Ok(config)
    }

    /// Settings ::= { Setting | Include }
    ///
    /// Stops in front of `terminator` without consuming it.
    fn parse_settings(
        &mut self,
        config: &mut Config,
        group: SettingId,
        depth: usize,
        terminator: TokenType,
    ) -> Result<(), ConfigError> {
        while !self.check(terminator.clone()) {
            if self.check(TokenType::Include) {
                self.parse_include(config, group, depth)?;
            } else {
                self.parse_setting(config, group, depth)?;
            }
        }
        Ok(())
    }

    /// Setting ::= Name ( "=" | ":" ) Value [ ";" | "," ]
    fn parse_setting(&mut self, config: &mut Config, group: SettingId, depth: usize) -> Result<(), ConfigError> {
        let name_token = self.current_token()?.clone();
        let TokenType::Name(name) = &name_token.ttype else {
            return self.err_unexpected("a setting name");
        };
        self.advance();

        if !self.match_token(TokenType::Equals) && !self.match_token(TokenType::Colon) {
            return self.err_unexpected("'=' or ':'");
        }

        let existing = config.setting(group)?.member(name).map(|s| s.id());
        let target = match existing {
            Some(existing) if self.options.allow_overrides => {
                warn!(
                    "setting '{}' at line {} overrides an earlier definition",
                    name, name_token.line
                );
                config.clear(existing);
                existing
            }
            Some(_) => {
                let (line, column) = self.line_and_column(name_token.pos_start);
                return Err(ParseError::DuplicateName {
                    name: name.clone(),
                    line,
                    column,
                    src: (*self.source).clone(),
                    span: self.span_of(&name_token),
                }
                .into());
            }
            None => config.attach(group, Some(name.clone()), Payload::Bool(false)),
        };
        config.set_source(target, name_token.line, self.file.clone());

        self.parse_value_into(config, target, depth)?;

        // A setting may end with ';', ',' or nothing at all.
        if !self.match_token(TokenType::Semicolon) {
            self.match_token(TokenType::Comma);
        }
        Ok(())
    }

    /// Include ::= "@include" String { String }
    ///
    /// The included settings land in the current group.
    fn parse_include(&mut self, config: &mut Config, group: SettingId, depth: usize) -> Result<(), ConfigError> {
        let include_token = self.current_token()?.clone();
        self.advance();
        let mut path_token = self.current_token()?.clone();
        let TokenType::String(mut path) = path_token.ttype.clone() else {
            return self.err_unexpected("a file name string");
        };
        self.advance();
        while self.check(TokenType::String(String::new())) {
            path_token = self.current_token()?.clone();
            if let TokenType::String(more) = &path_token.ttype {
                path.push_str(more);
            }
            self.advance();
        }
        let path = &path;

        let (line, column) = self.line_and_column(include_token.pos_start);
        let span: SourceSpan = (
            include_token.pos_start,
            path_token.pos_end - include_token.pos_start,
        )
            .into();

        let Some(resolver) = self.options.resolver() else {
            return Err(ParseError::IncludeDisabled {
                path: path.clone(),
                line,
                column,
                src: (*self.source).clone(),
                span,
            }
            .into());
        };
        if self.include_depth >= MAX_INCLUDE_DEPTH {
            return Err(ParseError::IncludeTooDeep {
                path: path.clone(),
                max: MAX_INCLUDE_DEPTH,
                line,
                column,
                src: (*self.source).clone(),
                span,
            }
            .into());
        }

        trace!("including '{}' from {}", path, self.name);
        let included = resolver.resolve(path).map_err(|err| ParseError::IncludeNotFound {
            path: path.clone(),
            reason: err.to_string(),
            line,
            column,
            src: (*self.source).clone(),
            span,
        })?;

        let mut nested = Parser::for_include(&included, self.options.clone(), self.include_depth + 1)?;
        nested.parse_settings(config, group, depth, TokenType::Eof)?;
        nested.expect(TokenType::Eof, "a setting name")?;
        trace!("finished include '{}'", path);
        Ok(())
    }

    /// Value ::= Scalar | Array | List | Group
    ///
    /// Stores the value in `target`. `depth` is the nesting level of the
    /// container that holds `target`.
    fn parse_value_into(&mut self, config: &mut Config, target: SettingId, depth: usize) -> Result<(), ConfigError> {
        let token = self.current_token()?.clone();
        match token.ttype {
            TokenType::LBrace | TokenType::LBracket | TokenType::LParen => {
                let depth = depth + 1;
                if depth > self.options.max_depth {
                    let (line, column) = self.line_and_column(token.pos_start);
                    return Err(ParseError::DepthExceeded {
                        max: self.options.max_depth,
                        line,
                        column,
                        src: (*self.source).clone(),
                        span: self.span_of(&token),
                    }
                    .into());
                }
                match token.ttype {
                    TokenType::LBrace => self.parse_group(config, target, depth),
                    TokenType::LBracket => self.parse_array(config, target),
                    _ => self.parse_list(config, target, depth),
                }
            }
            _ => {
                let (payload, format) = self.parse_scalar()?;
                config.set_payload(target, payload, format);
                Ok(())
            }
        }
    }

    /// Group ::= "{" Settings "}"
    fn parse_group(&mut self, config: &mut Config, target: SettingId, depth: usize) -> Result<(), ConfigError> {
        self.expect(TokenType::LBrace, "'{'")?;
        config.set_payload(target, Payload::Group(IndexMap::new()), None);
        self.parse_settings(config, target, depth, TokenType::RBrace)?;
        self.expect(TokenType::RBrace, "'}'")?;
        Ok(())
    }

    /// Array ::= "[" [ Scalar { "," Scalar } [ "," ] ] "]"
    ///
    /// All elements share the kind of the first.
    fn parse_array(&mut self, config: &mut Config, target: SettingId) -> Result<(), ConfigError> {
        self.expect(TokenType::LBracket, "'['")?;
        config.set_payload(target, Payload::Array(Vec::new()), None);
        let mut element_kind: Option<Kind> = None;

        if !self.check(TokenType::RBracket) {
            loop {
                let token = self.current_token()?.clone();
                if matches!(
                    token.ttype,
                    TokenType::LBrace | TokenType::LBracket | TokenType::LParen
                ) {
                    return self.err_unexpected("a scalar value (arrays cannot hold groups, arrays or lists)");
                }
                let (payload, format) = self.parse_scalar()?;
                let kind = payload.kind();
                match element_kind {
                    Some(expected) if expected != kind => {
                        let (line, column) = self.line_and_column(token.pos_start);
                        return Err(ParseError::TypeMismatch {
                            expected,
                            found: kind,
                            line,
                            column,
                            src: (*self.source).clone(),
                            span: self.span_of(&token),
                        }
                        .into());
                    }
                    Some(_) => {}
                    None => element_kind = Some(kind),
                }
                let element = config.attach(target, None, Payload::Bool(false));
                config.set_payload(element, payload, format);
                config.set_source(element, token.line, self.file.clone());

                if !self.match_token(TokenType::Comma) {
                    break;
                }
                if self.check(TokenType::RBracket) {
                    break; // Allow trailing comma
                }
            }
        }
        self.expect(TokenType::RBracket, "',' or ']'")?;
        Ok(())
    }

    /// List ::= "(" [ Value { "," Value } [ "," ] ] ")"
    fn parse_list(&mut self, config: &mut Config, target: SettingId, depth: usize) -> Result<(), ConfigError> {
        self.expect(TokenType::LParen, "'('")?;
        config.set_payload(target, Payload::List(Vec::new()), None);

        if !self.check(TokenType::RParen) {
            loop {
                let line = self.current_token()?.line;
                let element = config.attach(target, None, Payload::Bool(false));
                config.set_source(element, line, self.file.clone());
                self.parse_value_into(config, element, depth)?;

                if !self.match_token(TokenType::Comma) {
                    break;
                }
                if self.check(TokenType::RParen) {
                    break; // Allow trailing comma
                }
            }
        }
        self.expect(TokenType::RParen, "',' or ')'")?;
        Ok(())
    }

    /// Scalar ::= Boolean | Integer | Integer64 | Float | String { String }
    ///
    /// Adjacent string literals are joined into one value.
    fn parse_scalar(&mut self) -> Result<(Payload, Option<IntegerBase>), ConfigError> {
        let token = self.current_token()?.clone();
        let scalar = match token.ttype {
            TokenType::Boolean(b) => (Payload::Bool(b), None),
            TokenType::Integer { value, base } => (Payload::Int(value), base),
            TokenType::Integer64 { value, base } => (Payload::Int64(value), base),
            TokenType::Float(f) => (Payload::Float(f), None),
            TokenType::String(mut text) => {
                self.advance();
                while self.check(TokenType::String(String::new())) {
                    if let TokenType::String(more) = &self.current_token()?.ttype {
                        text.push_str(more);
                    }
                    self.advance();
                }
                return Ok((Payload::String(text), None));
            }
            _ => return self.err_unexpected("a value"),
        };
        self.advance();
        Ok(scalar)
    }

    // === Tokenizer Helper Methods ===

    fn current_token(&self) -> Result<&Token, ConfigError> {
        self.tokens.get(self.position).ok_or_else(|| {
            let pos = self.source_text.len();
            let (line, column) = self.line_and_column(pos);
            ParseError::UnexpectedEof {
                expected: "more input".to_string(),
                line,
                column,
                src: (*self.source).clone(),
                span: (pos, 0).into(),
            }
            .into()
        })
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: TokenType, description: &str) -> Result<(), ConfigError> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            self.err_unexpected(description)
        }
    }

    fn match_token(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, ttype: TokenType) -> bool {
        if let Ok(token) = self.current_token() {
            std::mem::discriminant(&token.ttype) == std::mem::discriminant(&ttype)
        } else {
            false
        }
    }

    fn err_unexpected<T>(&self, expected: &str) -> Result<T, ConfigError> {
        let token = self.current_token()?;
        let (line, column) = self.line_and_column(token.pos_start);
        let err = if token.ttype == TokenType::Eof {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                line,
                column,
                src: (*self.source).clone(),
                span: (token.pos_start, 0).into(),
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.ttype.describe(),
                line,
                column,
                src: (*self.source).clone(),
                span: self.span_of(token),
            }
        };
        Err(err.into())
    }

    fn line_and_column(&self, position: usize) -> (usize, usize) {
        get_line_and_column(self.source_text, position)
    }

    fn span_of(&self, token: &Token) -> SourceSpan {
        (token.pos_start, token.pos_end - token.pos_start).into()
    }
}
