use cfgtree::{parse, serialize, IntegerBase, Value, WriteOptions};

const DOCUMENT: &str = r#"
// header comments are not kept
name = "demo"; version = 2;
limits = { max_conn = 0x100; umask = 0022; huge = 12345678901; };
ratios = [ 0.5, 1e-7, 1.5e20 ];
mixed = ( true, "tab\there", [ "a" ], { k = -1; } );
"#;

#[test]
fn test_canonical_output() {
    let config = parse(DOCUMENT).unwrap();
    let expected = r#"name = "demo";
version = 2;
limits = {
  max_conn = 0x100;
  umask = 022;
  huge = 12345678901L;
};
ratios = [ 0.5, 1e-7, 1.5e20 ];
mixed = (
  true,
  "tab\there",
  [ "a" ],
  {
    k = -1;
  }
);
"#;
    assert_eq!(serialize(&config, &WriteOptions::default()), expected);
}

#[test]
fn test_round_trip_of_parsed_document() {
    let config = parse(DOCUMENT).unwrap();
    let text = config.to_string();
    let reparsed = parse(&text).unwrap();
    assert_eq!(reparsed, config);
    assert_eq!(reparsed.to_string(), text);
}

#[test]
fn test_idempotent_serialization() {
    let config = parse(DOCUMENT).unwrap();
    let options = WriteOptions::new()
        .with_indent_width(4)
        .with_float_precision(4)
        .with_integer_base(IntegerBase::Hex);
    let first = serialize(&config, &options);
    let second = serialize(&config, &options);
    assert_eq!(first, second);
}

#[test]
fn test_every_option_combination_parses_back() {
    let config = parse(DOCUMENT).unwrap();
    for semicolons in [true, false] {
        for colons in [true, false] {
            for brace_line in [true, false] {
                for tabs in [true, false] {
                    let options = WriteOptions::new()
                        .with_semicolons(semicolons)
                        .with_colon_assignment_for_groups(colons)
                        .with_colon_assignment_for_non_groups(colons)
                        .with_open_brace_on_separate_line(brace_line)
                        .with_tabs(tabs)
                        .with_array_line_width(8);
                    let text = config.write_string(&options);
                    let reparsed = parse(&text)
                        .unwrap_or_else(|err| panic!("{err}\nwhile reading back:\n{text}"));
                    assert_eq!(reparsed, config, "{text}");
                }
            }
        }
    }
}

#[test]
fn test_octal_and_hex_output_read_back() {
    let config = cfgtree::Config::from_value(
        Value::group()
            .with("neg", -42)
            .with("min", i32::MIN)
            .with("neg64", -5_000_000_000i64)
            .with("max64", i64::MAX),
    )
    .unwrap();
    for base in [IntegerBase::Decimal, IntegerBase::Hex, IntegerBase::Octal] {
        let text = config.write_string(&WriteOptions::new().with_integer_base(base));
        assert_eq!(parse(&text).unwrap(), config, "{text}");
    }
}

#[test]
fn test_strings_read_back() {
    let tricky = "quote \" backslash \\ newline \n bell \u{07} unicode é";
    let config = cfgtree::Config::from_value(Value::group().with("s", tricky)).unwrap();
    let text = config.to_string();
    assert_eq!(text, "s = \"quote \\\" backslash \\\\ newline \\n bell \\x07 unicode é\";\n");
    assert_eq!(parse(&text).unwrap().lookup_value::<&str>("s").unwrap(), tricky);
}

#[test]
fn test_float_edge_cases_read_back() {
    let values = [0.0, -0.0, 1.0, 0.1, 1e-5, 123456.789, 1e16, 1e300, f64::MIN_POSITIVE, -2.5e-10];
    let config = cfgtree::Config::from_value(Value::group().with(
        "f",
        Value::Array(values.iter().copied().map(Value::Float).collect()),
    ))
    .unwrap();
    let text = config.to_string();
    let reparsed = parse(&text).unwrap();
    assert_eq!(reparsed, config, "{text}");
}
