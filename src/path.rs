//! Setting paths: `a.b[2].c`.
//!
//! A path is compiled once into segments and then walked from a starting
//! setting. Members are separated by `.`, `/` or `:`; elements are addressed
//! with `[N]` or `(N)`, either right after the container's name or after a
//! separator.

use crate::error::SettingError;
use crate::tree::{Config, SettingId};
use crate::value::Kind;
use std::fmt;
use std::str::FromStr;

const SEPARATORS: [char; 3] = ['.', '/', ':'];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Name(String),
    Index(usize),
}

/// A compiled path. The empty path addresses the starting setting itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn parse(text: &str) -> Result<Path, SettingError> {
        let invalid = |reason: String| SettingError::InvalidPath {
            path: text.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut chars = text.char_indices().peekable();
        // Whether the previous token was a separator (or we are at the start).
        let mut after_separator = true;

        while let Some(&(pos, c)) = chars.peek() {
            match c {
                '[' | '(' => {
                    chars.next();
                    let close = if c == '[' { ']' } else { ')' };
                    let mut digits = String::new();
                    let mut closed = false;
                    for (_, d) in chars.by_ref() {
                        if d == close {
                            closed = true;
                            break;
                        }
                        digits.push(d);
                    }
                    if !closed {
                        return Err(invalid(format!("missing '{close}' after index at {pos}")));
                    }
                    if digits.is_empty() || !digits.chars().all(|d| d.is_ascii_digit()) {
                        return Err(invalid(format!("'{digits}' is not an element index")));
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| invalid(format!("index {digits} is too large")))?;
                    segments.push(PathSegment::Index(index));
                    after_separator = false;
                }
                c if SEPARATORS.contains(&c) => {
                    if after_separator {
                        return Err(invalid(format!("empty segment at {pos}")));
                    }
                    chars.next();
                    after_separator = true;
                }
                ']' | ')' => return Err(invalid(format!("unmatched '{c}' at {pos}"))),
                _ => {
                    if !after_separator {
                        return Err(invalid(format!("missing separator before {pos}")));
                    }
                    let mut name = String::new();
                    while let Some(&(_, n)) = chars.peek() {
                        if SEPARATORS.contains(&n) || matches!(n, '[' | '(' | ']' | ')') {
                            break;
                        }
                        name.push(n);
                        chars.next();
                    }
                    segments.push(PathSegment::Name(name));
                    after_separator = false;
                }
            }
        }

        if after_separator && !text.is_empty() {
            return Err(invalid("path ends with a separator".to_string()));
        }
        Ok(Path { segments })
    }

    #[must_use]
    pub fn from_segments(segments: Vec<PathSegment>) -> Path {
        Path { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends a segment, builder style.
    #[must_use]
    pub fn child(mut self, segment: PathSegment) -> Path {
        self.segments.push(segment);
        self
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Name(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Name(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Walks `path` from `start`.
pub fn resolve(config: &Config, start: SettingId, path: &Path) -> Result<SettingId, SettingError> {
    let mut current = config.setting(start)?;
    let mut walked = current.path();

    for segment in &path.segments {
        current = match segment {
            PathSegment::Name(name) => {
                if current.kind() != Kind::Group {
                    return Err(SettingError::TypeMismatch {
                        path: walked,
                        expected: Kind::Group.to_string(),
                        found: current.kind(),
                    });
                }
                walked = join_name(&walked, name);
                current
                    .member(name)
                    .ok_or_else(|| SettingError::NotFound { path: walked.clone() })?
            }
            PathSegment::Index(index) => {
                if !matches!(current.kind(), Kind::Array | Kind::List) {
                    return Err(SettingError::TypeMismatch {
                        path: walked,
                        expected: "array or list".to_string(),
                        found: current.kind(),
                    });
                }
                walked = join_index(&walked, *index);
                current
                    .element(*index)
                    .ok_or_else(|| SettingError::NotFound { path: walked.clone() })?
            }
        };
    }
    Ok(current.id())
}

pub(crate) fn join_name(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

pub(crate) fn join_index(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}
