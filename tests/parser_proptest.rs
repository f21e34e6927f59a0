//! Property-based tests for the lexer and the parser.

use proptest::prelude::*;

use railyard::railyard::error::ParseError;
use railyard::railyard::lexing::StringInput;
use railyard::railyard::parsing::Parser;
use railyard::railyard::testing;
use railyard::railyard::token::Token;

/// Source text of one loop: `forall <list> { }` or `foreach <element> in <list> { }`
fn loop_strategy() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        "[a-z][a-z0-9_]{0,6}",
        "[a-z][a-z0-9_]{0,6}",
        prop::sample::select(vec![" ", "\n", "\t", "  "]),
    )
        .prop_map(|(each, element, list, blank)| {
            if each {
                format!("foreach{blank}{element} in {list}{blank}{{ }}")
            } else {
                format!("forall {list}{blank}{{{blank}}}")
            }
        })
}

fn program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(loop_strategy(), 0..6).prop_map(|loops| loops.join("\n"))
}

fn texts(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.text().to_string()).collect()
}

proptest! {
    #[test]
    fn test_parsing_is_idempotent(input in program_strategy()) {
        let grammar = testing::for_loops().unwrap();
        let first = Parser::new(&grammar).parse_string(&input).unwrap();
        let second = Parser::new(&grammar).parse_string(&input).unwrap();
        prop_assert!(first.same_shape(&second));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_derivation_reproduces_tokens(input in program_strategy()) {
        let grammar = testing::for_loops().unwrap();
        let parser = Parser::new(&grammar);
        let consumed = parser.derivation(StringInput::new(&input)).unwrap();
        let lexed = parser.lexer().tokenize(&input).unwrap();
        prop_assert_eq!(texts(&consumed).join("."), texts(&lexed).join("."));
    }

    #[test]
    fn test_one_node_per_loop(loops in prop::collection::vec(loop_strategy(), 0..6)) {
        let grammar = testing::for_loops().unwrap();
        let tree = Parser::new(&grammar).parse_string(&loops.join(" ")).unwrap();
        prop_assert_eq!(tree.children().len(), loops.len());
        prop_assert!(tree.children().iter().all(|c| c.child("list-var").is_some()));
    }

    #[test]
    fn test_lexer_never_panics(input in "[a-z0-9 {};'\"\\\\.\n-]{0,40}") {
        let grammar = testing::commands().unwrap();
        match grammar.lexer().tokenize(&input) {
            Ok(tokens) => {
                for token in tokens {
                    prop_assert!(!token.text().is_empty());
                    prop_assert!(!token.types().is_empty());
                }
            }
            Err(err) => {
                let is_unknown_token = matches!(err, ParseError::UnknownToken { .. });
                prop_assert!(is_unknown_token);
            }
        }
    }

    #[test]
    fn test_parser_never_panics(input in "(let|print|unsafe|strict|[a-z]{1,3}|;| ){0,12}") {
        let grammar = testing::commands().unwrap();
        let _ = Parser::new(&grammar).parse_string(&input);
    }
}
