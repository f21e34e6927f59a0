//! Lexer state machine
//!
//!     The lexer runs in one of four modes:
//!
//!         Normal        characters are collected into the current chunk
//!         Whitespace    blanks are skipped
//!         LineComment   everything up to the next linefeed is skipped
//!         BlockComment  everything up to the end marker is skipped
//!
//!     Leaving Normal flushes the collected chunk, which is then split and classified into
//!     tokens. While a literal is open (a quote was seen and not closed yet) blanks and comment
//!     markers are ordinary characters, and an escape character directly followed by a quote is
//!     kept together with it so the quote does not close the literal.
//!
//!     The [Lexer] holds the configuration and can be shared; every input gets its own
//!     [TokenStream] with the per-pass state.

use std::path::Path;

use tracing::debug;

use super::input_buffer::InputBuffer;
use super::instream::{InStream, StringInput};
use super::tokenizer::Tokenizer;
use crate::railyard::error::{Location, ParseError};
use crate::railyard::token::types::{is_literal_delimiter, is_literal_text, LITERAL_ESCAPE};
use crate::railyard::token::{Position, Token, TokenKind, TokenTypeRef, TokenTypes};

const WHITESPACE: [char; 5] = ['\t', '\n', '\u{0B}', '\u{0C}', ' '];

fn is_whitespace(ch: char) -> bool {
    WHITESPACE.contains(&ch)
}

fn starts_with(window: &[char], marker: &[char]) -> bool {
    !marker.is_empty() && window.len() >= marker.len() && window[..marker.len()] == *marker
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Whitespace,
    LineComment,
    BlockComment,
}

/// A span no token type recognizes.
struct UnknownSpan {
    text: String,
    position: Position,
}

/// Lexer configuration: the token types to recognize and the comment syntax to skip.
#[derive(Debug, Clone)]
pub struct Lexer {
    tokenizer: Tokenizer,
    literal: Option<TokenTypeRef>,
    prefixes: Vec<TokenTypeRef>,
    postfixes: Vec<TokenTypeRef>,
    keywords: Vec<TokenTypeRef>,
    words: Vec<TokenTypeRef>,
    line_comment: Option<Vec<char>>,
    block_comment: Option<(Vec<char>, Vec<char>)>,
    tab_size: usize,
}

impl Lexer {
    pub fn new() -> Self {
        Lexer {
            tokenizer: Tokenizer::new(),
            literal: None,
            prefixes: Vec::new(),
            postfixes: Vec::new(),
            keywords: Vec::new(),
            words: Vec::new(),
            line_comment: None,
            block_comment: None,
            tab_size: 1,
        }
    }

    /// A lexer recognizing every type of the registry.
    pub fn for_types(types: &TokenTypes) -> Self {
        let mut lexer = Self::new();
        for token_type in types.all() {
            lexer.add_token_type(token_type.clone());
        }
        lexer
    }

    /// Register a token type. Prefixes, postfixes and separators are kept longest marker first.
    pub fn add_token_type(&mut self, token_type: TokenTypeRef) {
        match token_type.kind() {
            TokenKind::Word { .. } => self.words.push(token_type),
            TokenKind::Keyword { .. } => self.keywords.push(token_type),
            TokenKind::Literal => {
                self.literal = Some(token_type);
                self.tokenizer.set_literal_aware(true);
            }
            TokenKind::Prefix { .. } => {
                self.prefixes.push(token_type);
                sort_longest_first(&mut self.prefixes);
            }
            TokenKind::Postfix { .. } => {
                self.postfixes.push(token_type);
                sort_longest_first(&mut self.postfixes);
            }
            TokenKind::Separator { .. } => {
                self.tokenizer.add_separator(token_type);
                self.tokenizer.sort_longest_first();
            }
        }
    }

    /// Skip everything from `marker` to the end of the line.
    pub fn enable_line_comments(&mut self, marker: &str) {
        self.line_comment = Some(marker.chars().collect());
    }

    /// Skip everything between `start` and `end`.
    pub fn enable_block_comments(&mut self, start: &str, end: &str) {
        self.block_comment = Some((start.chars().collect(), end.chars().collect()));
    }

    pub fn set_tab_size(&mut self, tab_size: usize) {
        self.tab_size = tab_size.max(1);
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Lookahead needed to recognize comment markers and escaped quotes.
    pub fn fill_size(&self) -> usize {
        let line = self.line_comment.as_ref().map_or(0, Vec::len);
        let (start, end) = self
            .block_comment
            .as_ref()
            .map_or((0, 0), |(s, e)| (s.len(), e.len()));
        2.max(line).max(start).max(end)
    }

    /// Start a pass over `input`.
    pub fn stream<S: InStream>(&self, input: S) -> TokenStream<'_, S> {
        TokenStream {
            lexer: self,
            buffer: InputBuffer::new(input, self.fill_size(), self.tab_size),
            mode: Mode::Normal,
            consumed: String::new(),
            chunk_before: Position::default(),
            open_delimiter: None,
            pending: Vec::new(),
        }
    }

    /// Lex a whole string.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, ParseError> {
        self.stream(StringInput::new(text)).collect()
    }

    /// Tokens of a chunk, in input order. `before` is the position of the character read just
    /// before the chunk.
    fn classify_chunk(&self, chunk: &str, before: Position) -> Result<Vec<Token>, UnknownSpan> {
        let mut tokens = Vec::new();
        self.classify_text(chunk, before, &mut tokens)?;
        Ok(tokens)
    }

    fn start_of(&self, before: Position, text: &str) -> Position {
        text.chars()
            .next()
            .map_or(before, |ch| before.advance(ch, self.tab_size))
    }

    fn token(&self, text: &str, types: Vec<TokenTypeRef>, before: Position) -> Token {
        Token::new(
            text,
            types,
            self.start_of(before, text),
            before.advance_over(text, self.tab_size),
        )
    }

    fn classify_text(
        &self,
        text: &str,
        before: Position,
        out: &mut Vec<Token>,
    ) -> Result<(), UnknownSpan> {
        let mut at = before;
        for span in self.tokenizer.split(text) {
            match span.separator {
                Some(separator) => out.push(self.token(&span.text, vec![separator], at)),
                None => self.classify_span(&span.text, at, out)?,
            }
            at = at.advance_over(&span.text, self.tab_size);
        }
        Ok(())
    }

    fn classify_span(
        &self,
        text: &str,
        before: Position,
        out: &mut Vec<Token>,
    ) -> Result<(), UnknownSpan> {
        if let Some(literal) = &self.literal {
            if is_literal_text(text) {
                out.push(self.token(text, vec![literal.clone()], before));
                return Ok(());
            }
        }

        for prefix in &self.prefixes {
            if let Some(rest) = prefix.remaining_right(text) {
                let marker = &text[..text.len() - rest.len()];
                out.push(self.token(marker, vec![prefix.clone()], before));
                let after_marker = before.advance_over(marker, self.tab_size);
                return self.classify_text(rest, after_marker, out);
            }
        }

        for postfix in &self.postfixes {
            if let Some(rest) = postfix.remaining_left(text) {
                self.classify_text(rest, before, out)?;
                let after_rest = before.advance_over(rest, self.tab_size);
                out.push(self.token(&text[rest.len()..], vec![postfix.clone()], after_rest));
                return Ok(());
            }
        }

        let mut types: Vec<TokenTypeRef> = Vec::new();
        let exact = self.keywords.iter().find(|k| k.keyword() == Some(text));
        let keyword = exact.or_else(|| {
            let upper = text.to_uppercase();
            self.keywords
                .iter()
                .find(|k| k.keyword() == Some(upper.as_str()) && k.matches(text))
        });
        if let Some(keyword) = keyword {
            types.push(keyword.clone());
        }
        types.extend(self.words.iter().filter(|w| w.matches(text)).cloned());

        if types.is_empty() {
            return Err(UnknownSpan {
                text: text.to_string(),
                position: self.start_of(before, text),
            });
        }
        out.push(self.token(text, types, before));
        Ok(())
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_longest_first(types: &mut [TokenTypeRef]) {
    types.sort_by(|a, b| b.precedence_len().cmp(&a.precedence_len()));
}

/// One pass of a [Lexer] over one input.
///
/// Tokens are produced one at a time; [TokenStream::push_back] returns a token so that the
/// next call hands it out again.
pub struct TokenStream<'l, S> {
    lexer: &'l Lexer,
    buffer: InputBuffer<S>,
    mode: Mode,
    consumed: String,
    /// Position read just before the first character of `consumed`
    chunk_before: Position,
    open_delimiter: Option<char>,
    pending: Vec<Token>,
}

impl<'l, S: InStream> TokenStream<'l, S> {
    /// The next token, `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        loop {
            if let Some(token) = self.pending.pop() {
                return Ok(Some(token));
            }
            let Some((chunk, before)) = self.next_chunk() else {
                return Ok(None);
            };
            debug!(chunk = %chunk, line = before.line, column = before.column, "lexed chunk");
            let tokens = self.lexer.classify_chunk(&chunk, before).map_err(|span| {
                ParseError::UnknownToken {
                    text: span.text,
                    location: Location::new(
                        self.buffer.source().map(Path::to_path_buf),
                        span.position,
                    ),
                }
            })?;
            self.pending.extend(tokens.into_iter().rev());
        }
    }

    /// Hand `token` out again on the next call.
    pub fn push_back(&mut self, token: Token) {
        self.pending.push(token);
    }

    /// Position of the last character read from the input.
    pub fn position(&self) -> Position {
        self.buffer.position()
    }

    pub fn source(&self) -> Option<&Path> {
        self.buffer.source()
    }

    fn next_chunk(&mut self) -> Option<(String, Position)> {
        loop {
            let window = self.buffer.lookahead();
            if window.is_empty() {
                return self.flush();
            }
            match self.next_mode(&window) {
                Some(mode) => {
                    if let Some(chunk) = self.enter(mode) {
                        return Some(chunk);
                    }
                }
                None => self.consume(&window),
            }
        }
    }

    fn in_literal(&self) -> bool {
        self.open_delimiter.is_some()
    }

    fn starts_line_comment(&self, window: &[char]) -> bool {
        !self.in_literal()
            && self
                .lexer
                .line_comment
                .as_ref()
                .is_some_and(|marker| starts_with(window, marker))
    }

    fn starts_block_comment(&self, window: &[char]) -> bool {
        !self.in_literal()
            && self
                .lexer
                .block_comment
                .as_ref()
                .is_some_and(|(start, _)| starts_with(window, start))
    }

    fn ends_block_comment(&self, window: &[char]) -> bool {
        self.lexer
            .block_comment
            .as_ref()
            .is_some_and(|(_, end)| starts_with(window, end))
    }

    /// Whitespace check while skipping blanks. A quote met here opens (or closes) a literal.
    fn continues_whitespace(&mut self, ch: char) -> bool {
        if self.lexer.literal.is_some() && is_literal_delimiter(ch) {
            self.open_delimiter = match self.open_delimiter {
                None => Some(ch),
                Some(open) if open == ch => None,
                other => other,
            };
            return false;
        }
        is_whitespace(ch) && !self.in_literal()
    }

    fn next_mode(&mut self, window: &[char]) -> Option<Mode> {
        match self.mode {
            Mode::Normal => {
                if !self.in_literal() && is_whitespace(window[0]) {
                    Some(Mode::Whitespace)
                } else if self.starts_line_comment(window) {
                    Some(Mode::LineComment)
                } else if self.starts_block_comment(window) {
                    Some(Mode::BlockComment)
                } else {
                    None
                }
            }
            Mode::Whitespace => {
                if self.continues_whitespace(window[0]) {
                    None
                } else if self.starts_line_comment(window) {
                    Some(Mode::LineComment)
                } else if self.starts_block_comment(window) {
                    Some(Mode::BlockComment)
                } else {
                    Some(Mode::Normal)
                }
            }
            Mode::LineComment => (window[0] == '\n').then_some(Mode::Normal),
            Mode::BlockComment => self.ends_block_comment(window).then_some(Mode::Normal),
        }
    }

    fn marker_len(&self, mode: Mode) -> usize {
        match mode {
            Mode::Normal | Mode::Whitespace => 1,
            Mode::LineComment => self.lexer.line_comment.as_ref().map_or(0, Vec::len),
            Mode::BlockComment => self.lexer.block_comment.as_ref().map_or(0, |(s, _)| s.len()),
        }
    }

    /// Switch to `mode`, consuming what triggered the switch. Leaving Normal flushes the chunk.
    fn enter(&mut self, mode: Mode) -> Option<(String, Position)> {
        let previous = self.mode;
        self.mode = mode;
        match previous {
            Mode::Normal => {
                self.buffer.consume_n(self.marker_len(mode));
                self.flush()
            }
            Mode::Whitespace => {
                if mode == Mode::Normal {
                    self.take_char();
                } else {
                    self.buffer.consume_n(self.marker_len(mode));
                }
                None
            }
            Mode::LineComment => {
                self.buffer.consume();
                None
            }
            Mode::BlockComment => {
                let end_len = self.lexer.block_comment.as_ref().map_or(0, |(_, e)| e.len());
                self.buffer.consume_n(end_len);
                None
            }
        }
    }

    fn consume(&mut self, window: &[char]) {
        if self.mode != Mode::Normal {
            self.buffer.consume();
            return;
        }
        if self.lexer.literal.is_some() {
            let first = window[0];
            match self.open_delimiter {
                None if is_literal_delimiter(first) => self.open_delimiter = Some(first),
                None => {}
                Some(open) => {
                    let escaped = window.len() >= 2
                        && first == LITERAL_ESCAPE
                        && is_literal_delimiter(window[1]);
                    if escaped {
                        self.take_char();
                    } else if first == open {
                        self.open_delimiter = None;
                    }
                }
            }
        }
        self.take_char();
    }

    /// Move the next character into the current chunk.
    fn take_char(&mut self) {
        let before = self.buffer.position();
        if let Some(ch) = self.buffer.consume() {
            if self.consumed.is_empty() {
                self.chunk_before = before;
            }
            self.consumed.push(ch);
        }
    }

    fn flush(&mut self) -> Option<(String, Position)> {
        if self.consumed.is_empty() {
            None
        } else {
            Some((std::mem::take(&mut self.consumed), self.chunk_before))
        }
    }
}

impl<'l, S: InStream> Iterator for TokenStream<'l, S> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
