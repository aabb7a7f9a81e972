use cfgtree::{parse, Path, PathSegment, SettingError};

#[test]
fn test_compiled_path_segments() {
    let path: Path = "servers[1].ports.(0)".parse().unwrap();
    assert_eq!(
        path.segments(),
        &[
            PathSegment::Name("servers".to_string()),
            PathSegment::Index(1),
            PathSegment::Name("ports".to_string()),
            PathSegment::Index(0),
        ]
    );
    assert_eq!(path.to_string(), "servers[1].ports[0]");
}

#[test]
fn test_compiled_path_is_reusable() {
    let path = Path::parse("limits/max").unwrap();
    let first = parse("limits = { max = 10; };").unwrap();
    let second = parse("limits : { min = 1; max = 99; }").unwrap();
    assert_eq!(first.get::<i32>(first.lookup_path(&path).unwrap()).unwrap(), 10);
    assert_eq!(second.get::<i32>(second.lookup_path(&path).unwrap()).unwrap(), 99);
}

#[test]
fn test_all_separators_agree() {
    let config = parse("a = { b = { c = ( 1, 2 ); }; };").unwrap();
    let expected = config.lookup("a.b.c[1]").unwrap();
    for path in ["a/b/c[1]", "a:b:c(1)", "a.b.c.[1]", "a/b:c.(1)"] {
        assert_eq!(config.lookup(path).unwrap(), expected, "{path}");
    }
}

#[test]
fn test_names_with_dashes() {
    let config = parse("max-size = 3; group = { sub-key = true; };").unwrap();
    assert_eq!(config.lookup_value::<i32>("max-size").unwrap(), 3);
    assert!(config.lookup_value::<bool>("group.sub-key").unwrap());
}

#[test]
fn test_empty_path_is_the_start() {
    let config = parse("a = 1;").unwrap();
    assert_eq!(config.lookup("").unwrap(), config.root());
}

#[test]
fn test_invalid_paths() {
    let config = parse("a = 1;").unwrap();
    for bad in ["a.", ".a", "a[", "a[one]", "a]"] {
        assert!(
            matches!(config.lookup(bad), Err(SettingError::InvalidPath { .. })),
            "{bad} should be rejected"
        );
    }
    assert!(!config.exists("a["));
}
