//! Tests for the format parsers and auto-detection

use envdiff_content::{AutoParser, ConfigParser, Error, Format, flatten};

fn flat_view(parser: &dyn ConfigParser, source: &str) -> Vec<(String, String)> {
    let tree = parser.parse(source).unwrap();
    flatten(&tree)
        .unwrap()
        .into_iter()
        .map(|f| (f.path, f.value.to_string()))
        .collect()
}

#[test]
fn test_same_settings_in_every_format_flatten_identically() {
    let yaml = "api:\n  rate_limit: 1000\n  hosts:\n    - a\n    - b\n";
    let json = r#"{"api": {"rate_limit": 1000, "hosts": ["a", "b"]}}"#;
    let toml = "[api]\nrate_limit = 1000\nhosts = [\"a\", \"b\"]\n";

    let expected = flat_view(Format::Yaml.parser().as_ref(), yaml);
    assert_eq!(flat_view(Format::Json.parser().as_ref(), json), expected);
    assert_eq!(flat_view(Format::Toml.parser().as_ref(), toml), expected);
}

#[test]
fn test_auto_parser_detects_each_format() {
    let parser = AutoParser::new();
    let yaml = flat_view(&parser, "a:\n  b: 1\n");
    let json = flat_view(&parser, r#"{"a": {"b": 1}}"#);
    let toml = flat_view(&parser, "[a]\nb = 1\n");
    assert_eq!(yaml, json);
    assert_eq!(json, toml);
}

#[test]
fn test_parse_errors_name_the_format() {
    let err = Format::Toml.parser().parse("= broken").unwrap_err();
    assert!(matches!(err, Error::ParseError { ref format, .. } if format == "TOML"));
}

#[test]
fn test_parser_names() {
    assert_eq!(Format::Yaml.parser().name(), "YAML");
    assert_eq!(AutoParser::new().name(), "auto");
}
