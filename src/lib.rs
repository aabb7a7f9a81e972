//! A reader and writer for libconfig-style configuration documents.
//!
//! ```text
//! # comments with '#', '//' or '/* */'
//! version = "1.0";
//! window = {
//!   title = "Main";
//!   size = { w = 640; h = 480; };
//!   ids = [ 1, 2, 3 ];              // arrays hold scalars of one kind
//!   extra = ( 1, "two", { x = 3; } ); // lists hold anything
//! };
//! ```
//!
//! Text is parsed into a [`Config`], a tree of typed settings that can be
//! queried by path, edited and written back out.
//!
//! ```rust
//! use cfgtree::{parse, Kind, WriteOptions};
//!
//! let mut config = parse("window = { size = [ 640, 480 ]; };").unwrap();
//! assert_eq!(config.lookup_value::<i32>("window.size[1]").unwrap(), 480);
//!
//! let window = config.lookup("window").unwrap();
//! let title = config.add_child(window, Some("title"), Kind::String).unwrap();
//! config.set(title, "Main").unwrap();
//!
//! assert_eq!(
//!     config.write_string(&WriteOptions::default()),
//!     "window = {\n  size = [ 640, 480 ];\n  title = \"Main\";\n};\n"
//! );
//! ```

pub mod api;
pub mod error;
pub mod include;
pub mod lexer;
pub mod number;
pub mod options;
pub mod parser;
pub mod path;
mod serialization;
pub mod tree;
pub mod utils;
pub mod value;
pub mod writer;

pub use api::{parse, parse_named, parse_with};
pub use error::{ConfigError, LexError, ParseError, SettingError};
pub use include::{FsIncludeResolver, IncludeResolver, IncludedSource, MemoryIncludeResolver};
pub use options::{ParseOptions, WriteOptions};
pub use path::{Path, PathSegment};
pub use tree::{Config, FromSetting, Setting, SettingId};
pub use value::{IntegerBase, Kind, Value};
pub use writer::serialize;
