//! Backtracking across completed rule instances.

use rstest::rstest;

use railyard::railyard::error::ParseError;
use railyard::railyard::grammar::{Grammar, GrammarBuilder, Rule};
use railyard::railyard::lexing::StringInput;
use railyard::railyard::parsing::Parser;
use railyard::railyard::testing;
use railyard::railyard::token::TokenTypes;

/// `Maybe Maybe x` with `Maybe = y?`
fn repeated_optional_rule() -> Grammar {
    let mut types = TokenTypes::new();
    let y = types.keyword("y");
    let x = types.keyword("x");
    let mut builder = GrammarBuilder::new(types);
    let maybe = builder.add_rule(Rule::new("Maybe").expand(move |b, start, end, _| {
        let y = b.token(&y);
        let optional = b.zero_to_one(y);
        b.chain([start.into(), optional, end.into()]);
    }));
    let root = builder.add_rule(Rule::new("pair").expand(move |b, start, end, _| {
        let first = b.rule(maybe);
        let second = b.rule(maybe);
        let last = b.token(&x);
        b.chain([start.into(), first, second, last, end.into()]);
    }));
    builder.build(root).unwrap()
}

#[rstest]
#[case(false)]
#[case(true)]
fn test_first_alternative_parses_in_both_modes(#[case] full: bool) {
    let grammar = testing::backtracking_boundary().unwrap();
    let mut parser = Parser::new(&grammar);
    parser.enable_full_backtracking(full);

    let tree = parser.parse_string("a b d").unwrap();
    let names: Vec<_> = tree.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Inner", "token", "token"]);
}

#[test]
fn test_completed_rule_is_a_barrier() {
    let grammar = testing::backtracking_boundary().unwrap();
    let parser = Parser::new(&grammar);

    let err = parser.parse_string("a b e").unwrap_err();
    match err {
        ParseError::UnexpectedToken { text, location } => {
            assert_eq!(text, "e");
            assert_eq!(location.position.column, 5);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_full_backtracking_reaches_second_alternative() {
    let grammar = testing::backtracking_boundary().unwrap();
    let mut parser = Parser::new(&grammar);
    parser.enable_full_backtracking(true);

    let tree = parser.parse_string("a b e").unwrap();
    let texts: Vec<_> = tree.children().iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["", "b", "e"]);
    assert_eq!(tree.children()[0].children()[0].text(), "a");
}

#[test]
fn test_input_ending_inside_alternative() {
    let grammar = testing::backtracking_boundary().unwrap();
    let err = Parser::new(&grammar).parse_string("a b").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEndOfInput { .. }));
}

#[rstest]
#[case("y y x", 3)]
#[case("y x", 2)]
#[case("x", 1)]
fn test_empty_rule_instance_followed_by_same_rule(#[case] input: &str, #[case] tokens: usize) {
    let grammar = repeated_optional_rule();
    let parser = Parser::new(&grammar);
    let tree = parser.parse_string(input).unwrap();
    let names: Vec<_> = tree.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Maybe", "Maybe", "token"]);

    let consumed = parser.derivation(StringInput::new(input)).unwrap();
    assert_eq!(consumed.len(), tokens);
}
