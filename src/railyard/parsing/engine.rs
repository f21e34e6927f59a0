//! Backtracking parse engine.

use std::path::{Path as FsPath, PathBuf};

use tracing::{debug, trace};

use super::context::Context;
use super::path::{Path, PathElement};
use super::reduce::reduce;
use crate::railyard::ast::AstNode;
use crate::railyard::config::{ParserConfig, TreeKind};
use crate::railyard::error::{Location, ParseError};
use crate::railyard::grammar::{Grammar, Graph, NodeId, NodeKind};
use crate::railyard::lexing::{FileInput, InStream, Lexer, StringInput};
use crate::railyard::token::Token;

/// Parses input against a [Grammar].
///
/// The parser owns its lexer configuration; every call to [Parser::parse] runs with its own
/// path, arena and token buffer, so a parser can be reused.
#[derive(Debug, Clone)]
pub struct Parser<'g> {
    grammar: &'g Grammar,
    lexer: Lexer,
    full_backtracking: bool,
    tree: TreeKind,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Parser {
            grammar,
            lexer: grammar.lexer(),
            full_backtracking: false,
            tree: TreeKind::Ast,
        }
    }

    pub fn with_config(grammar: &'g Grammar, config: &ParserConfig) -> Self {
        let mut parser = Self::new(grammar);
        if let Some(marker) = &config.line_comment {
            parser.enable_line_comments(marker);
        }
        if let Some(block) = &config.block_comment {
            parser.enable_block_comments(&block.start, &block.end);
        }
        parser.enable_full_backtracking(config.full_backtracking);
        parser.lexer.set_tab_size(config.tab_size);
        parser.tree = config.tree;
        parser
    }

    /// Skip line comments starting with `marker` (`//` in C-like languages).
    pub fn enable_line_comments(&mut self, marker: &str) {
        self.lexer.enable_line_comments(marker);
    }

    /// Skip block comments between `start` and `end` (`/*` and `*/` in C-like languages).
    pub fn enable_block_comments(&mut self, start: &str, end: &str) {
        self.lexer.enable_block_comments(start, end);
    }

    /// Allow backtracking out of rule instances that were already completed.
    pub fn enable_full_backtracking(&mut self, enabled: bool) {
        self.full_backtracking = enabled;
    }

    /// Choose between the transformed tree and the raw parse tree.
    pub fn set_tree_kind(&mut self, tree: TreeKind) {
        self.tree = tree;
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn lexer_mut(&mut self) -> &mut Lexer {
        &mut self.lexer
    }

    pub fn parse<S: InStream>(&self, input: S) -> Result<AstNode, ParseError> {
        let search = self.run(input)?;
        Ok(reduce(self.grammar, &search.graph, &search.path, self.tree))
    }

    pub fn parse_string(&self, text: &str) -> Result<AstNode, ParseError> {
        self.parse(StringInput::new(text))
    }

    /// Parse a file. Errors carry the file path.
    pub fn parse_file(&self, path: impl AsRef<FsPath>) -> Result<AstNode, ParseError> {
        let path = path.as_ref();
        let input = FileInput::open(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(input)
    }

    /// Tokens consumed along the winning path, in input order.
    pub fn derivation<S: InStream>(&self, input: S) -> Result<Vec<Token>, ParseError> {
        let search = self.run(input)?;
        Ok(search.path.tokens().cloned().collect())
    }

    fn run<S: InStream>(&self, input: S) -> Result<Search<'g>, ParseError> {
        let mut stream = self.lexer.stream(input);
        let file = stream.source().map(FsPath::to_path_buf);
        let mut search = Search::new(self.grammar, self.full_backtracking);
        // token buffer, next token on top
        let mut pending: Vec<Token> = Vec::new();

        debug!(full_backtracking = self.full_backtracking, "parse started");
        loop {
            if pending.is_empty() {
                if let Some(token) = stream.next_token()? {
                    pending.push(token);
                }
            }
            match pending.last().cloned() {
                None => {
                    if search.find_path_to_end() {
                        break;
                    }
                    if !search.find_next_sibling(&mut pending) {
                        return Err(ParseError::UnexpectedEndOfInput {
                            location: Location::new(file, stream.position()),
                        });
                    }
                }
                Some(token) => {
                    if search.find_next_matching_node(&token) {
                        pending.pop();
                    } else if !search.find_next_sibling(&mut pending) {
                        let offending = pending.first().unwrap_or(&token);
                        return Err(unexpected(offending, file));
                    }
                }
            }
        }
        debug!(
            path = search.path.len(),
            nodes = search.graph.len(),
            "parse finished"
        );
        Ok(search)
    }
}

fn unexpected(token: &Token, file: Option<PathBuf>) -> ParseError {
    ParseError::UnexpectedToken {
        text: token.text().to_string(),
        location: Location::new(file, token.start()),
    }
}

/// State of one parse run.
struct Search<'g> {
    grammar: &'g Grammar,
    graph: Graph,
    path: Path,
    full_backtracking: bool,
}

impl<'g> Search<'g> {
    fn new(grammar: &'g Grammar, full_backtracking: bool) -> Self {
        let graph = Graph::for_grammar(grammar);
        let mut path = Path::new();
        path.push(&graph, grammar, graph.root(), None);
        Search {
            grammar,
            graph,
            path,
            full_backtracking,
        }
    }

    fn tip(&self) -> Option<PathElement> {
        self.path.last().cloned()
    }

    fn push(&mut self, node: NodeId, token: Option<Token>) {
        self.path.push(&self.graph, self.grammar, node, token);
    }

    fn pop(&mut self) -> Option<PathElement> {
        self.path.pop(&self.graph)
    }

    /// Descend from the tip until a token slot takes `token`.
    fn find_next_matching_node(&mut self, token: &Token) -> bool {
        let Some(tip) = self.tip() else {
            return false;
        };
        let expected = match &self.graph.node(tip.node).kind {
            NodeKind::TokenSlot { token_type, .. } if tip.token.is_none() => Some(token_type.id()),
            _ => None,
        };
        if let Some(expected) = expected {
            if !token.has_type(expected) {
                return false;
            }
            self.pop();
            self.push(tip.node, Some(token.clone()));
            trace!(token = token.text(), node = %tip.node, "matched");
            return true;
        }

        let mark = self.graph.mark();
        let context = Context::new(&self.path, Some(token));
        let Ok(successors) = self.graph.successors(self.grammar, tip.node, &context) else {
            self.graph.truncate(mark);
            return false;
        };
        for next in successors {
            if self.path.revisits(&self.graph, next) {
                continue;
            }
            self.push(next, None);
            if self.find_next_matching_node(token) {
                return true;
            }
            self.pop();
        }
        self.graph.truncate(mark);
        false
    }

    /// Find a way from the tip to the end of the root rule without consuming tokens.
    fn find_path_to_end(&mut self) -> bool {
        let Some(tip) = self.tip() else {
            return false;
        };
        let node = self.graph.node(tip.node);
        if node.is_token_slot() && tip.token.is_none() {
            return false;
        }
        let at_rule_end = node.is_rule_end();

        let mark = self.graph.mark();
        let context = Context::new(&self.path, None);
        let Ok(successors) = self.graph.successors(self.grammar, tip.node, &context) else {
            self.graph.truncate(mark);
            return false;
        };
        if successors.is_empty() {
            return at_rule_end;
        }
        for next in successors {
            if self.graph.node(next).is_token_slot() || self.path.revisits(&self.graph, next) {
                continue;
            }
            self.push(next, None);
            if self.find_path_to_end() {
                return true;
            }
            self.pop();
        }
        self.graph.truncate(mark);
        false
    }

    /// Backtrack to the next untried alternative. Popped tokens go back to `pending`; when no
    /// alternative is left the path and `pending` are restored.
    fn find_next_sibling(&mut self, pending: &mut Vec<Token>) -> bool {
        let mut removed: Vec<PathElement> = Vec::new();
        while self.path.len() > 1 {
            if self.goto_next_sibling(pending) {
                return true;
            }
            let at_rule_end = self
                .path
                .last()
                .is_some_and(|tip| self.graph.node(tip.node).is_rule_end());
            if at_rule_end && !self.full_backtracking {
                trace!("backtracking stopped at a completed rule");
                break;
            }
            let Some(element) = self.pop() else { break };
            if let Some(token) = &element.token {
                pending.push(token.clone());
            }
            removed.push(element);
        }
        while let Some(element) = removed.pop() {
            if element.token.is_some() {
                pending.pop();
            }
            self.push(element.node, element.token);
        }
        false
    }

    /// Replace the tip by the successor following it in its parent's list.
    fn goto_next_sibling(&mut self, pending: &mut Vec<Token>) -> bool {
        let Some(element) = self.pop() else {
            return false;
        };
        let Some(parent) = self.path.last().map(|tip| tip.node) else {
            self.push(element.node, element.token);
            return false;
        };
        let mark = self.graph.mark();
        let context = Context::new(&self.path, element.token.as_ref());
        let successors = self
            .graph
            .successors(self.grammar, parent, &context)
            .unwrap_or_default();
        let sibling = successors
            .iter()
            .position(|&id| id == element.node)
            .and_then(|index| {
                successors[index + 1..]
                    .iter()
                    .copied()
                    .find(|&id| !self.path.revisits(&self.graph, id))
            });

        match sibling {
            Some(next) => {
                if next.index() < mark {
                    self.graph.truncate(mark);
                }
                trace!(from = %element.node, to = %next, "switched to sibling");
                if let Some(token) = element.token {
                    pending.push(token);
                }
                self.push(next, None);
                true
            }
            None => {
                self.graph.truncate(mark);
                self.push(element.node, element.token);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::railyard::grammar::{GrammarBuilder, Rule};
    use crate::railyard::token::TokenTypes;

    /// `a (b | c)+`
    fn small_grammar() -> Grammar {
        let mut types = TokenTypes::new();
        let a = types.keyword("a");
        let b = types.keyword("b");
        let c = types.keyword("c");
        let mut builder = GrammarBuilder::new(types);
        let root = builder.add_rule(Rule::new("small").expand(move |g, start, end, _| {
            let first = g.token(&a);
            let left = g.token(&b);
            let right = g.token(&c);
            let choice = g.fork([left, right]);
            let tail = g.one_to_many(choice);
            g.chain([start.into(), first, tail, end.into()]);
        }));
        builder.build(root).unwrap()
    }

    #[test]
    fn test_parse_simple_input() {
        let grammar = small_grammar();
        let parser = Parser::new(&grammar);
        let tree = parser.parse_string("a b c b").unwrap();
        assert_eq!(tree.name(), "small");
        let texts: Vec<_> = tree.children().iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "b"]);
    }

    #[test]
    fn test_unexpected_token() {
        let grammar = small_grammar();
        let parser = Parser::new(&grammar);
        let err = parser.parse_string("a b a").unwrap_err();
        match err {
            ParseError::UnexpectedToken { text, location } => {
                assert_eq!(text, "a");
                assert_eq!(location.position.column, 5);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let grammar = small_grammar();
        let parser = Parser::new(&grammar);
        assert!(matches!(
            parser.parse_string("a"),
            Err(ParseError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn test_derivation_lists_consumed_tokens() {
        let grammar = small_grammar();
        let parser = Parser::new(&grammar);
        let tokens = parser.derivation(StringInput::new("a c")).unwrap();
        let texts: Vec<_> = tokens.iter().map(Token::text).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[test]
    fn test_parser_is_reusable() {
        let grammar = small_grammar();
        let parser = Parser::new(&grammar);
        assert!(parser.parse_string("a").is_err());
        assert!(parser.parse_string("a b").is_ok());
    }
}
