use cfgtree::{parse, parse_with, Config, ParseOptions, Value};

#[test]
fn test_simple_parse_to_json() {
    let source = r#"
        name = "My App";
        version = 1.0;
        is_enabled = true;
        features = [ "a", "b", "c" ];
        config = {
            host = "localhost";
            port = 8080;
        };
    "#;

    let expected_json = serde_json::json!({
        "name": "My App",
        "version": 1.0,
        "is_enabled": true,
        "features": ["a", "b", "c"],
        "config": {
            "host": "localhost",
            "port": 8080,
        }
    });

    let config = parse(source).unwrap();
    let result = config.to_json().unwrap();
    let result_json: serde_json::Value = serde_json::from_str(&result).unwrap();

    assert_eq!(result_json, expected_json);
}

#[test]
fn test_yaml_export() {
    let config = parse("server = { ports = ( 80, 443 ); };").unwrap();
    let yaml: serde_yaml::Value = serde_yaml::from_str(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(yaml["server"]["ports"][1].as_i64(), Some(443));
}

#[test]
fn test_parse_edit_write() {
    let mut config = parse("app = { retries = 3; };").unwrap();
    let retries = config.lookup("app.retries").unwrap();
    config.set(retries, 5).unwrap();
    let app = config.lookup("app").unwrap();
    config
        .add_value(app, Some("hosts"), Value::Array(vec!["a".into(), "b".into()]))
        .unwrap();
    assert_eq!(
        config.to_string(),
        "app = {\n  retries = 5;\n  hosts = [ \"a\", \"b\" ];\n};\n"
    );
}

#[test]
fn test_value_round_trip_through_config() {
    let value = Value::group()
        .with("a", 1)
        .with("b", Value::List(vec![Value::Float(0.5), Value::group()]));
    let config = Config::from_value(value.clone()).unwrap();
    assert_eq!(config.to_value(), value);
    assert_eq!(parse(&config.to_string()).unwrap().to_value(), value);
}

#[test]
fn test_options_are_honoured() {
    let options = ParseOptions::new().with_allow_overrides(true).with_max_depth(1);
    let config = parse_with("a = { x = 1; }; a = 2;", &options).unwrap();
    assert_eq!(config.lookup_value::<i32>("a").unwrap(), 2);
    assert!(parse_with("a = { b = { }; };", &options).is_err());
}

#[test]
fn test_config_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Config>();
    assert_send_sync::<ParseOptions>();
}
