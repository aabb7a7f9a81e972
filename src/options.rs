//! Options for reading and writing documents.
//!
//! - [`ParseOptions`]: nesting limit, name characters, duplicate policy and `@include` handling
//! - [`WriteOptions`]: indentation, number formatting and punctuation of the output
//!
//! ## Examples
//!
//! ```rust
//! use cfgtree::{parse_with, IntegerBase, ParseOptions, WriteOptions};
//!
//! let options = ParseOptions::new().with_max_depth(8).with_allow_overrides(true);
//! let config = parse_with("a = 1; a = 2;", &options).unwrap();
//!
//! let out = config.write_string(&WriteOptions::new().with_integer_base(IntegerBase::Hex));
//! assert_eq!(out, "a = 0x2;\n");
//! ```

use crate::error::ConfigError;
use crate::include::{FsIncludeResolver, IncludeResolver};
use crate::lexer::{is_allowed_extra_name_char, EXTRA_NAME_CHARS};
use crate::value::IntegerBase;
use std::path::PathBuf;
use std::sync::Arc;

/// The default nesting limit. The root group sits at depth 0.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How many `@include` files may nest inside each other.
pub const MAX_INCLUDE_DEPTH: usize = 10;

/// Options for the parser.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Containers nested deeper than this fail with `DepthExceeded`.
    pub max_depth: usize,
    /// One extra character allowed in setting names, such as `*`. Must be
    /// one of [`EXTRA_NAME_CHARS`].
    pub extra_name_char: Option<char>,
    /// When set, a repeated name in a group replaces the earlier setting
    /// instead of failing with `DuplicateName`.
    pub allow_overrides: bool,
    /// Directory that relative `@include` paths are resolved against.
    pub include_dir: Option<PathBuf>,
    /// Custom include lookup. Takes precedence over `include_dir`.
    pub include_resolver: Option<Arc<dyn IncludeResolver>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            extra_name_char: None,
            allow_overrides: false,
            include_dir: None,
            include_resolver: None,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects settings the parser cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.extra_name_char {
            Some(c) if !is_allowed_extra_name_char(c) => Err(ConfigError::InvalidOption {
                option: "extra_name_char".to_string(),
                reason: format!("'{c}' is not one of {EXTRA_NAME_CHARS}"),
            }),
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_extra_name_char(mut self, c: char) -> Self {
        self.extra_name_char = Some(c);
        self
    }

    #[must_use]
    pub fn with_allow_overrides(mut self, allow: bool) -> Self {
        self.allow_overrides = allow;
        self
    }

    /// Enables `@include`, reading files relative to `dir`.
    #[must_use]
    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_include_resolver(mut self, resolver: Arc<dyn IncludeResolver>) -> Self {
        self.include_resolver = Some(resolver);
        self
    }

    /// The resolver `@include` goes through, if includes are enabled at all.
    #[must_use]
    pub fn resolver(&self) -> Option<Arc<dyn IncludeResolver>> {
        if let Some(resolver) = &self.include_resolver {
            return Some(Arc::clone(resolver));
        }
        self.include_dir
            .as_ref()
            .map(|dir| Arc::new(FsIncludeResolver::new(dir.clone())) as Arc<dyn IncludeResolver>)
    }
}

/// Options for the writer.
///
/// # Examples
///
/// ```rust
/// use cfgtree::WriteOptions;
///
/// let options = WriteOptions::new()
///     .with_indent_width(4)
///     .with_float_precision(3)
///     .with_semicolons(false);
/// assert_eq!(options.indent_width, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level. Ignored when `use_tabs` is set.
    pub indent_width: usize,
    /// Indent with one tab per level.
    pub use_tabs: bool,
    /// Base for integers that carry no format of their own.
    pub integer_base: IntegerBase,
    /// Significant digits for floats. `None` writes the shortest text that
    /// reads back as the same value.
    pub float_precision: Option<usize>,
    /// Terminate settings with `;`.
    pub semicolon_separators: bool,
    /// Write `name: { ... }` instead of `name = { ... }`.
    pub colon_assignment_for_groups: bool,
    /// Write `name: value` instead of `name = value`.
    pub colon_assignment_for_non_groups: bool,
    /// Put the `{` of a group on its own line.
    pub open_brace_on_separate_line: bool,
    /// Arrays wider than this many characters are written one element per line.
    pub array_line_width: Option<usize>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            indent_width: 2,
            use_tabs: false,
            integer_base: IntegerBase::Decimal,
            float_precision: None,
            semicolon_separators: true,
            colon_assignment_for_groups: false,
            colon_assignment_for_non_groups: false,
            open_brace_on_separate_line: false,
            array_line_width: None,
        }
    }
}

impl WriteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    #[must_use]
    pub fn with_tabs(mut self, use_tabs: bool) -> Self {
        self.use_tabs = use_tabs;
        self
    }

    #[must_use]
    pub fn with_integer_base(mut self, base: IntegerBase) -> Self {
        self.integer_base = base;
        self
    }

    #[must_use]
    pub fn with_float_precision(mut self, digits: usize) -> Self {
        self.float_precision = Some(digits);
        self
    }

    #[must_use]
    pub fn with_semicolons(mut self, enabled: bool) -> Self {
        self.semicolon_separators = enabled;
        self
    }

    #[must_use]
    pub fn with_colon_assignment_for_groups(mut self, enabled: bool) -> Self {
        self.colon_assignment_for_groups = enabled;
        self
    }

    #[must_use]
    pub fn with_colon_assignment_for_non_groups(mut self, enabled: bool) -> Self {
        self.colon_assignment_for_non_groups = enabled;
        self
    }

    #[must_use]
    pub fn with_open_brace_on_separate_line(mut self, enabled: bool) -> Self {
        self.open_brace_on_separate_line = enabled;
        self
    }

    #[must_use]
    pub fn with_array_line_width(mut self, width: usize) -> Self {
        self.array_line_width = Some(width);
        self
    }
}
