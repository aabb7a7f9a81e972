use crate::error::ConfigError;
use crate::options::ParseOptions;
use crate::parser::Parser;
use crate::tree::Config;
use std::str::FromStr;

/// Parses a document with default options.
///
/// # Errors
///
/// Returns a `ConfigError` describing the first lexical or grammatical
/// problem, with its line and column. Nothing is returned for a partially
/// valid document.
pub fn parse(source: &str) -> Result<Config, ConfigError> {
    parse_with(source, &ParseOptions::default())
}

/// Parses a document with the given options.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Config, ConfigError> {
    parse_named(source, "<input>", options)
}

/// Parses a document, naming it `file_name` in error reports.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_named(source: &str, file_name: &str, options: &ParseOptions) -> Result<Config, ConfigError> {
    let mut parser = Parser::with_options(source, file_name, options.clone())?;
    parser.parse()
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl Config {
    /// The tree as pretty-printed JSON. Groups become objects, arrays and
    /// lists become arrays.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// The tree as YAML.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, Config};

    #[test]
    fn test_simple_parse_to_json() {
        let source = r#"
            name = "test";
            version = 1.0;
            is_active = true;
            items = [ 1, 2, 3 ];
            nested = { key = "value"; };
        "#;
        let config = parse(source).unwrap();
        let json = config.to_json().unwrap();
        let expected = r#"{
  "name": "test",
  "version": 1.0,
  "is_active": true,
  "items": [
    1,
    2,
    3
  ],
  "nested": {
    "key": "value"
  }
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_simple_parse_to_yaml() {
        let config = parse("name = \"test\";\nports = ( 80, 443 );").unwrap();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(yaml, "name: test\nports:\n- 80\n- 443\n");
    }

    #[test]
    fn test_from_str() {
        let config: Config = "a = 1;".parse().unwrap();
        assert_eq!(config.lookup_value::<i32>("a").unwrap(), 1);
        assert!("a = ;".parse::<Config>().is_err());
    }
}
