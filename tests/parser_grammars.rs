//! Parsing with the sample grammars: tree shapes, output formats, files and positions.

use std::io::Write;

use railyard::railyard::config::{ParserConfig, TreeKind};
use railyard::railyard::error::ParseError;
use railyard::railyard::formats::{to_json, to_xml, FormatRegistry};
use railyard::railyard::parsing::Parser;
use railyard::railyard::testing;
use railyard::railyard::token::Position;

const LOOPS: &str = "forall xs { }\nforeach x in ys { }";

#[test]
fn test_for_loops_are_transformed() {
    let grammar = testing::for_loops().unwrap();
    let tree = Parser::new(&grammar).parse_string(LOOPS).unwrap();

    assert_eq!(tree.name(), "loops");
    assert_eq!(tree.children().len(), 2);

    let first = &tree.children()[0];
    assert_eq!(first.name(), "for");
    assert_eq!(first.child("list-var").map(|n| n.text()), Some("xs"));
    assert!(first.child("element-var").is_none());

    let second = &tree.children()[1];
    assert_eq!(second.child("list-var").map(|n| n.text()), Some("ys"));
    assert_eq!(second.child("element-var").map(|n| n.text()), Some("x"));
}

#[test]
fn test_empty_input_is_an_empty_tree() {
    let grammar = testing::for_loops().unwrap();
    let tree = Parser::new(&grammar).parse_string("").unwrap();
    assert_eq!(tree.name(), "loops");
    assert!(!tree.has_children());
}

#[test]
fn test_json_output() {
    let grammar = testing::for_loops().unwrap();
    let tree = Parser::new(&grammar)
        .parse_string("foreach x in ys { }")
        .unwrap();
    insta::assert_snapshot!(
        to_json(&tree).unwrap(),
        @r#"{"name":"loops","text":"","id":"","children":[{"name":"for","text":"","id":"","children":[{"name":"list-var","text":"ys","id":"","children":[]},{"name":"element-var","text":"x","id":"","children":[]}]}]}"#
    );
}

#[test]
fn test_xml_output() {
    let grammar = testing::for_loops().unwrap();
    let tree = Parser::new(&grammar).parse_string("forall xs { }").unwrap();
    assert_eq!(
        to_xml(&tree),
        "<loops>\n\t<for>\n\t\t<list-var>xs</list-var>\n\t</for>\n</loops>\n"
    );
}

#[test]
fn test_registry_formats_agree() {
    let grammar = testing::for_loops().unwrap();
    let tree = Parser::new(&grammar).parse_string("forall xs { }").unwrap();
    let registry = FormatRegistry::default();
    assert_eq!(registry.serialize(&tree, "json").unwrap(), to_json(&tree).unwrap());
    assert_eq!(registry.serialize(&tree, "xml").unwrap(), to_xml(&tree));
    let pretty = registry.serialize(&tree, "json-pretty").unwrap();
    let reparsed: serde_json::Value = serde_json::from_str(&pretty).unwrap();
    assert_eq!(reparsed["children"][0]["name"], "for");
}

#[test]
fn test_parse_tree_keeps_rule_nodes() {
    let grammar = testing::for_loops().unwrap();
    let config = ParserConfig {
        tree: TreeKind::ParseTree,
        ..ParserConfig::default()
    };
    let tree = Parser::with_config(&grammar, &config)
        .parse_string("forall xs { }")
        .unwrap();

    let rule = &tree.children()[0];
    assert_eq!(rule.name(), "For");
    let texts: Vec<_> = rule.children().iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["forall", "xs", "{", "}"]);
    assert_eq!(rule.child_by_id("list").map(|c| c.text()), Some("xs"));
    assert!(rule.children().iter().all(|c| c.name() == "token"));
}

#[test]
fn test_leaves_carry_positions() {
    let grammar = testing::for_loops().unwrap();
    let mut parser = Parser::new(&grammar);
    parser.set_tree_kind(TreeKind::ParseTree);
    let tree = parser.parse_string("forall xs {\n}").unwrap();

    let leaves = tree.children()[0].children();
    let list = leaves[1].token().unwrap();
    assert_eq!(list.start(), Position::new(1, 8));
    assert_eq!(list.end(), Position::new(1, 9));
    assert_eq!(leaves[3].token().unwrap().start(), Position::new(2, 1));
}

#[test]
fn test_comments_from_config() {
    let grammar = testing::for_loops().unwrap();
    let config = ParserConfig::from_yaml_str("line_comment: \"//\"\nblock_comment: { start: \"/*\", end: \"*/\" }").unwrap();
    let parser = Parser::with_config(&grammar, &config);
    let tree = parser
        .parse_string("// loops\nforall /* the list */ xs { }")
        .unwrap();
    assert_eq!(tree.children().len(), 1);
}

#[test]
fn test_parse_file() {
    let grammar = testing::for_loops().unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{LOOPS}").unwrap();

    let tree = Parser::new(&grammar).parse_file(file.path()).unwrap();
    assert_eq!(tree.children().len(), 2);
}

#[test]
fn test_parse_file_error_names_file() {
    let grammar = testing::for_loops().unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "forall {{ }}").unwrap();

    let err = Parser::new(&grammar).parse_file(file.path()).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    assert_eq!(err.text(), "{");
    let location = err.location().unwrap();
    assert_eq!(location.file.as_deref(), Some(file.path()));
    assert_eq!(location.position, Position::new(1, 8));
}

#[test]
fn test_missing_file() {
    let grammar = testing::for_loops().unwrap();
    let err = Parser::new(&grammar)
        .parse_file("/nonexistent/input.loops")
        .unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
    assert!(err.location().is_none());
}

#[test]
fn test_unknown_token() {
    let grammar = testing::for_loops().unwrap();
    let err = Parser::new(&grammar)
        .parse_string("forall 42 { }")
        .unwrap_err();
    assert!(matches!(err, ParseError::UnknownToken { .. }));
    assert_eq!(err.text(), "42");
}

#[test]
fn test_truncated_input() {
    let grammar = testing::for_loops().unwrap();
    let err = Parser::new(&grammar)
        .parse_string("foreach x in ys {")
        .unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedToken { .. } | ParseError::UnexpectedEndOfInput { .. }
    ));
}
