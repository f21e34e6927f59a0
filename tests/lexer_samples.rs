//! Lexing of mixed inputs: words, keywords, separators and literals.

use rstest::rstest;

use railyard::railyard::config::Lexicon;
use railyard::railyard::lexing::{Lexer, StringInput};
use railyard::railyard::token::{Position, Token, TokenTypes};

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(Token::text).collect()
}

#[test]
fn test_mixed_keywords_words_and_separators() {
    let mut types = TokenTypes::new();
    let dash = types.separator("-");
    types.separator(";");
    types.word("[a-zA-Z_][a-zA-Z_0-9]*").unwrap();
    types.keyword("data");
    let lexer = Lexer::for_types(&types);

    let tokens = lexer.tokenize("data mydata-address1-country").unwrap();
    assert_eq!(tokens.len(), 6);
    assert_eq!(
        texts(&tokens),
        vec!["data", "mydata", "-", "address1", "-", "country"]
    );
    assert_eq!(tokens[2].types().len(), 1);
    assert_eq!(tokens[2].types()[0].id(), dash.id());
    assert!(tokens[0].keyword_type().is_some());
}

#[rstest]
#[case::short_first(vec![":", "::"])]
#[case::long_first(vec!["::", ":"])]
fn test_longer_marker_wins_in_lexer(#[case] markers: Vec<&str>) {
    let mut types = TokenTypes::new();
    let mut double = None;
    for marker in markers {
        let separator = types.separator(marker);
        if marker == "::" {
            double = Some(separator);
        }
    }
    types.word("[a-z]+").unwrap();
    let double = double.unwrap();
    let lexer = Lexer::for_types(&types);

    let tokens = lexer.tokenize("::split::correctly").unwrap();
    assert_eq!(texts(&tokens), vec!["::", "split", "::", "correctly"]);
    assert!(tokens[0].has_type(double.id()));
    assert!(tokens[2].has_type(double.id()));
}

fn script_lexer() -> Lexer {
    let mut types = TokenTypes::new();
    types.literal();
    types.word("[a-zA-Z_][a-zA-Z_0-9]*").unwrap();
    types.separator_tight(".");
    types.separator("(");
    types.separator(")");
    types.separator(";");
    types.separator("+");
    let mut lexer = Lexer::for_types(&types);
    lexer.enable_line_comments("#");
    lexer
}

#[test]
fn test_separator_inside_literal() {
    let tokens = script_lexer().tokenize("'1.23 '.toNumber();").unwrap();
    assert_eq!(
        texts(&tokens),
        vec!["'1.23 '", ".", "toNumber", "(", ")", ";"]
    );
    assert!(tokens[0].types()[0].is_literal());
}

#[test]
fn test_separator_between_literals() {
    let tokens = script_lexer().tokenize("'1.23'+'4.56';").unwrap();
    assert_eq!(texts(&tokens), vec!["'1.23'", "+", "'4.56'", ";"]);
}

#[test]
fn test_comment_after_code() {
    let tokens = script_lexer()
        .tokenize("x.y(); # call y\nz;")
        .unwrap();
    assert_eq!(texts(&tokens), vec!["x", ".", "y", "(", ")", ";", "z", ";"]);
    assert_eq!(tokens[6].start(), Position::new(2, 1));
}

#[test]
fn test_stream_push_back() {
    let lexer = script_lexer();
    let mut stream = lexer.stream(StringInput::new("a b"));
    let first = stream.next_token().unwrap().unwrap();
    stream.push_back(first.clone());
    assert_eq!(stream.next_token().unwrap(), Some(first));
    assert_eq!(stream.next_token().unwrap().map(|t| t.text().to_string()), Some("b".to_string()));
    assert_eq!(stream.next_token().unwrap(), None);
}

#[test]
fn test_lexicon_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexicon.yaml");
    std::fs::write(
        &path,
        "literal: true\nwords: [\"[a-z]+\"]\nseparators: [\"=\", { marker: \".\", tight: true }]\n",
    )
    .unwrap();

    let (types, lexer) = Lexicon::from_path(&path).unwrap().lexer().unwrap();
    assert_eq!(types.len(), 4);
    let tokens = lexer.tokenize("a.b = 'c d'").unwrap();
    assert_eq!(texts(&tokens), vec!["a", ".", "b", "=", "'c d'"]);
}
