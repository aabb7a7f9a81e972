use cfgtree::{parse, parse_with, Config, Kind, ParseOptions, SettingError, Value};

const DOCUMENT: &str = r#"
# Example application configuration
version = "1.0";

application = {
  window = {
    title = "My Application";
    size = { w = 640; h = 480; };
  };
  list = ( ( "abc", 123, true ), 1.234, ( ) );
  books = (
    { title = "Treasure Island"; price = 29.95; qty = 5; },
    { title = "Snow Crash"; price = 9.99; qty = 8; }
  );
  misc = {
    bigint = 9223372036854775807L;
    columns = [ "Last Name", "First Name", "MI" ];
    bitmask = 0x1FC3;
  };
};
"#;

#[test]
fn test_read_nested_values() {
    let config = parse(DOCUMENT).unwrap();
    assert_eq!(config.lookup_value::<&str>("version").unwrap(), "1.0");
    assert_eq!(config.lookup_value::<i32>("application.window.size.w").unwrap(), 640);
    assert_eq!(config.lookup_value::<&str>("application.books[1].title").unwrap(), "Snow Crash");
    assert_eq!(config.lookup_value::<f64>("application.books.[0].price").unwrap(), 29.95);
    assert_eq!(config.lookup_value::<i64>("application.misc.bigint").unwrap(), i64::MAX);
    assert_eq!(config.lookup_value::<i32>("application.misc.bitmask").unwrap(), 0x1FC3);
    assert_eq!(config.lookup_value::<bool>("application.list[0][2]").unwrap(), true);
}

#[test]
fn test_walk_children() {
    let config = parse(DOCUMENT).unwrap();
    let books = config.setting(config.lookup("application.books").unwrap()).unwrap();
    assert!(books.is_list());
    let titles: Vec<&str> = books
        .children()
        .map(|book| book.member("title").unwrap().get::<&str>().unwrap())
        .collect();
    assert_eq!(titles, vec!["Treasure Island", "Snow Crash"]);

    let columns = config.setting(config.lookup("application.misc.columns").unwrap()).unwrap();
    assert_eq!(columns.element_kind(), Some(Kind::String));
    assert_eq!(columns.element(2).unwrap().get::<String>().unwrap(), "MI");
    assert!(columns.element(3).is_none());
}

#[test]
fn test_typed_read_mismatch() {
    let config = parse(DOCUMENT).unwrap();
    let err = config.lookup_value::<i32>("version").unwrap_err();
    assert_eq!(
        err,
        SettingError::TypeMismatch {
            path: "version".to_string(),
            expected: "int".to_string(),
            found: Kind::String,
        }
    );
}

#[test]
fn test_path_resolution_property() {
    let config = parse("a = { b = [1, 2, 3]; };").unwrap();
    let id = config.lookup("a.b[1]").unwrap();
    assert_eq!(config.get::<i32>(id).unwrap(), 2);
    assert_eq!(
        config.lookup("a.b[5]"),
        Err(SettingError::NotFound {
            path: "a.b[5]".to_string()
        })
    );
}

#[test]
fn test_lookup_type_mismatches() {
    let config = parse("a = { b = [1, 2, 3]; }; l = ( 1 );").unwrap();
    assert!(matches!(
        config.lookup("a[0]"),
        Err(SettingError::TypeMismatch { found: Kind::Group, .. })
    ));
    assert!(matches!(
        config.lookup("a.b.c"),
        Err(SettingError::TypeMismatch { found: Kind::Array, .. })
    ));
    assert!(matches!(
        config.lookup("l.x"),
        Err(SettingError::TypeMismatch { found: Kind::List, .. })
    ));
    assert!(matches!(
        config.lookup("a.b[0].x"),
        Err(SettingError::TypeMismatch { found: Kind::Int, .. })
    ));
    assert!(matches!(config.lookup("a.x"), Err(SettingError::NotFound { .. })));
    assert!(matches!(config.lookup("a..b"), Err(SettingError::InvalidPath { .. })));
}

#[test]
fn test_relative_lookup() {
    let config = parse(DOCUMENT).unwrap();
    let window = config.setting(config.lookup("application.window").unwrap()).unwrap();
    assert_eq!(window.lookup("size.h").unwrap().get::<i32>().unwrap(), 480);
    assert_eq!(window.lookup("").unwrap().id(), window.id());
}

#[test]
fn test_canonical_path_resolves_back() {
    let config = parse(DOCUMENT).unwrap();
    for path in [
        "application.books[1].qty",
        "application.list[0][1]",
        "application.misc.columns[2]",
    ] {
        let setting = config.setting(config.lookup(path).unwrap()).unwrap();
        assert_eq!(setting.path(), path);
        assert_eq!(config.lookup(&setting.path()).unwrap(), setting.id());
    }
}

#[test]
fn test_build_tree_programmatically() {
    let mut config = Config::new();
    let root = config.root();
    let server = config.add_child(root, Some("server"), Kind::Group).unwrap();
    let host = config.add_child(server, Some("host"), Kind::String).unwrap();
    config.set(host, "localhost").unwrap();
    let ports = config.add_child(server, Some("ports"), Kind::Array).unwrap();
    for port in [80, 443] {
        let p = config.add_child(ports, None, Kind::Int).unwrap();
        config.set(p, port).unwrap();
    }
    let extras = config.add_child(server, Some("extras"), Kind::List).unwrap();
    config.add_value(extras, None, Value::from("x")).unwrap();
    config.add_value(extras, None, Value::group().with("y", 2)).unwrap();

    assert_eq!(
        config.to_value(),
        Value::group().with(
            "server",
            Value::group()
                .with("host", "localhost")
                .with("ports", Value::Array(vec![Value::Int(80), Value::Int(443)]))
                .with(
                    "extras",
                    Value::List(vec![Value::from("x"), Value::group().with("y", 2)])
                )
        )
    );
}

#[test]
fn test_homogeneity_property() {
    let mut config = parse("ports = [ 80, 443 ];").unwrap();
    let ports = config.lookup("ports").unwrap();
    let before = config.to_value();

    let err = config.add_child(ports, None, Kind::String).unwrap_err();
    assert!(matches!(err, SettingError::TypeMismatch { .. }));
    let err = config.add_value(ports, None, Value::Int64(1)).unwrap_err();
    assert!(matches!(err, SettingError::TypeMismatch { .. }));
    assert_eq!(config.to_value(), before);
}

#[test]
fn test_uniqueness_property() {
    let mut config = parse("grp = { a = 1; };").unwrap();
    let grp = config.lookup("grp").unwrap();
    let before = config.to_value();
    let err = config.add_child(grp, Some("a"), Kind::Bool).unwrap_err();
    assert!(matches!(err, SettingError::InvalidInsert { .. }));
    assert_eq!(config.to_value(), before);
}

#[test]
fn test_overflow_promotion_property() {
    let config = parse("small = 2147483647; big = 2147483648; neg = -2147483649;").unwrap();
    let kind = |path: &str| config.setting(config.lookup(path).unwrap()).unwrap().kind();
    assert_eq!(kind("small"), Kind::Int);
    assert_eq!(kind("big"), Kind::Int64);
    assert_eq!(kind("neg"), Kind::Int64);
    assert_eq!(config.lookup_value::<i64>("big").unwrap(), 2_147_483_648);
}

#[test]
fn test_remove_settings() {
    let mut config = parse(DOCUMENT).unwrap();
    let books = config.lookup("application.books").unwrap();
    config.remove_index(books, 0).unwrap();
    assert_eq!(
        config.lookup_value::<&str>("application.books[0].title").unwrap(),
        "Snow Crash"
    );

    let application = config.lookup("application").unwrap();
    config.remove_member(application, "misc").unwrap();
    assert!(!config.exists("application.misc"));
    assert!(!config.exists("application.misc.bigint"));

    let window = config.lookup("application.window").unwrap();
    config.remove(window).unwrap();
    assert!(config.setting(window).is_err());
    assert_eq!(config.remove(config.root()), Err(SettingError::RootRemoval));
}

#[test]
fn test_retype_with_replace() {
    let mut config = parse("a = 1; b = \"x\";").unwrap();
    let a = config.lookup("a").unwrap();
    config
        .replace(a, Value::List(vec![Value::Int(1), Value::from("two")]))
        .unwrap();
    assert_eq!(config.setting(a).unwrap().kind(), Kind::List);
    assert_eq!(config.lookup_value::<&str>("a[1]").unwrap(), "two");
    assert_eq!(config.to_string(), "a = ( 1, \"two\" );\nb = \"x\";\n");
}

#[test]
fn test_auto_convert() {
    let mut config = parse("i = 3; f = 2.75; l = 10L;").unwrap();
    assert!(config.lookup_value::<f64>("i").is_err());
    config.set_auto_convert(true);
    assert_eq!(config.lookup_value::<f64>("i").unwrap(), 3.0);
    assert_eq!(config.lookup_value::<i32>("f").unwrap(), 2);
    assert_eq!(config.lookup_value::<i32>("l").unwrap(), 10);
    assert_eq!(config.lookup_value::<i64>("i").unwrap(), 3);

    let f = config.lookup("f").unwrap();
    config.set(f, 4).unwrap();
    assert_eq!(config.lookup_value::<f64>("f").unwrap(), 4.0);
    assert_eq!(config.setting(f).unwrap().kind(), Kind::Float);
}

#[test]
fn test_trees_compare_structurally() {
    let a = parse("x = 1; y = { z = [1, 2]; };").unwrap();
    let b = parse("x = 0x1;\n\n// same tree\ny : { z = [ 1, 2, ]; }").unwrap();
    assert_eq!(a, b);
    let c = parse("x = 1.0; y = { z = [1, 2]; };").unwrap();
    assert_ne!(a, c);
    let d = parse("y = { z = [1, 2]; }; x = 1;").unwrap();
    assert_ne!(a, d);
}

fn nested_groups(levels: usize) -> Value {
    (1..levels).fold(Value::group(), |inner, _| Value::group().with("g", inner))
}

#[test]
fn test_deepest_buildable_tree_reads_back() {
    let mut config = Config::new();
    let root = config.root();
    config
        .add_value(root, Some("g"), nested_groups(config.max_depth()))
        .unwrap();
    assert_eq!(parse(&config.to_string()).unwrap(), config);

    let innermost = config.lookup(&["g"; 64].join(".")).unwrap();
    let err = config.add_child(innermost, Some("h"), Kind::Group).unwrap_err();
    assert!(matches!(err, SettingError::InvalidInsert { .. }));
    assert!(config.add_child(innermost, Some("h"), Kind::Int).is_ok());
}

#[test]
fn test_parsed_tree_keeps_parser_depth_limit() {
    let options = ParseOptions::new().with_max_depth(3);
    let mut config = parse_with("a = { b = { }; };", &options).unwrap();
    assert_eq!(config.max_depth(), 3);
    let b = config.lookup("a.b").unwrap();
    config.add_child(b, Some("c"), Kind::List).unwrap();
    assert!(config.add_value(b, Some("d"), nested_groups(2)).is_err());
    assert!(!config.exists("a.b.d"));
}

#[test]
fn test_foreign_handle_leaves_tree_untouched() {
    let mut a = parse("x = 1; y = \"s\";").unwrap();
    let b = parse("p = true; q = 2;").unwrap();
    let q = b.lookup("q").unwrap();

    assert!(matches!(a.setting(q), Err(SettingError::NotFound { .. })));
    assert!(matches!(a.remove(q), Err(SettingError::NotFound { .. })));
    assert!(a.replace(q, Value::Int(3)).is_err());
    assert_eq!(a.to_string(), "x = 1;\ny = \"s\";\n");
}

#[test]
fn test_update_every_element_of_large_array() {
    let mut config = Config::new();
    let root = config.root();
    let values = Value::Array((0..20_000).map(Value::Int).collect());
    let array = config.add_value(root, Some("values"), values).unwrap();
    let ids: Vec<_> = config.setting(array).unwrap().children().map(|s| s.id()).collect();
    for (i, id) in ids.iter().enumerate() {
        config.set(*id, i as i32 * 2).unwrap();
    }
    assert_eq!(config.lookup_value::<i32>("values[19999]").unwrap(), 39_998);

    let err = config.set(ids[7], "x").unwrap_err();
    assert!(matches!(err, SettingError::TypeMismatch { ref path, .. } if path == "values[7]"));
}
