//! Grammars loaded from definition text.

use std::io::Write;

use rstest::rstest;

use railyard::railyard::error::{DefinitionError, ParseError};
use railyard::railyard::grammar::Definition;
use railyard::railyard::lexing::StringInput;
use railyard::railyard::parsing::Parser;

const LOOPS: &str = r#"
# for loops over named lists
word ID "[_a-zA-Z][_a-zA-Z0-9]*";
separator LBRACE "{";
separator RBRACE "}";

@grammar loops = loop*;
loop = "forall" list=ID LBRACE RBRACE
     | "foreach" element=ID "in" list=ID LBRACE RBRACE;
"#;

const LIST: &str = r#"
word ITEM "[a-z]+";
separator COMMA ",";
@grammar list = ITEM (COMMA ITEM)* ;
"#;

#[test]
fn test_loops_definition() {
    let grammar = Definition::parse(LOOPS).unwrap().grammar().unwrap();
    let tree = Parser::new(&grammar)
        .parse_string("forall xs { } foreach x in ys { }")
        .unwrap();

    assert_eq!(tree.name(), "loops");
    let loops: Vec<_> = tree.children_by_name("loop").collect();
    assert_eq!(loops.len(), 2);
    assert_eq!(loops[0].child_by_id("list").unwrap().text(), "xs");
    assert!(loops[0].child_by_id("element").is_none());
    assert_eq!(loops[1].child_by_id("element").unwrap().text(), "x");
    assert_eq!(loops[1].child_by_id("list").unwrap().text(), "ys");
}

#[test]
fn test_loops_definition_rejects_missing_brace() {
    let grammar = Definition::parse(LOOPS).unwrap().grammar().unwrap();
    let err = Parser::new(&grammar).parse_string("forall xs {").unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedEndOfInput { .. } | ParseError::UnexpectedToken { .. }
    ));
}

#[rstest]
#[case("a", 1)]
#[case("a, b,c", 5)]
#[case("a ,b", 3)]
fn test_group_with_multiplicity(#[case] input: &str, #[case] tokens: usize) {
    let grammar = Definition::parse(LIST).unwrap().grammar().unwrap();
    let parser = Parser::new(&grammar);

    let tree = parser.parse_string(input).unwrap();
    assert_eq!(tree.name(), "list");
    assert_eq!(tree.children().len(), tokens);
    assert_eq!(parser.derivation(StringInput::new(input)).unwrap().len(), tokens);
}

#[test]
fn test_group_requires_separator() {
    let grammar = Definition::parse(LIST).unwrap().grammar().unwrap();
    assert!(Parser::new(&grammar).parse_string("a b").is_err());
}

#[rstest]
#[case("select x")]
#[case("SELECT x")]
#[case("Select x")]
fn test_case_insensitive_keyword(#[case] input: &str) {
    let definition = Definition::parse(
        r#"
keyword SELECT "select" { case-sensitive: FALSE };
word ID "[a-z]+";
@grammar query = SELECT target=ID;
"#,
    )
    .unwrap();
    let grammar = definition.grammar().unwrap();
    let tree = Parser::new(&grammar).parse_string(input).unwrap();
    assert_eq!(tree.child_by_id("target").unwrap().text(), "x");
}

#[test]
fn test_definition_settings_drive_the_parser() {
    let definition = Definition::parse(
        r#"
line-comment-style "//";
block-comment-style "/*" "*/";
word ITEM "[a-z]+";
separator COMMA ",";
@grammar list = ITEM (COMMA ITEM)*;
"#,
    )
    .unwrap();
    let grammar = definition.grammar().unwrap();
    let parser = Parser::with_config(&grammar, &definition.config());

    let tree = parser
        .parse_string("a // first\n, /* second */ b")
        .unwrap();
    assert_eq!(tree.children().len(), 3);
}

#[test]
fn test_definition_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LIST.as_bytes()).unwrap();

    let definition = Definition::from_path(file.path()).unwrap();
    assert_eq!(definition.tokens.len(), 2);
    assert_eq!(definition.rules.len(), 1);
    assert!(definition.rules[0].root);
}

#[test]
fn test_malformed_definition_reports_location() {
    let err = Definition::parse("word ID \"[a-z]+\"\n@grammar top = ID;").unwrap_err();
    let DefinitionError::Parse(parse) = err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(parse.text(), "@grammar");
    assert_eq!(parse.location().unwrap().position.line, 2);
}
