//! Lookahead window over an input stream.

use std::collections::VecDeque;

use super::instream::InStream;
use crate::railyard::token::Position;

/// Buffers up to `fill_size` characters ahead of the read position.
///
/// The position points at the last consumed character: it starts at line 1, column 0, a
/// linefeed moves to the next line and resets the column, and a tab advances the column by
/// the configured tab size.
#[derive(Debug)]
pub struct InputBuffer<S> {
    stream: S,
    window: VecDeque<char>,
    fill_size: usize,
    tab_size: usize,
    position: Position,
}

impl<S: InStream> InputBuffer<S> {
    pub fn new(stream: S, fill_size: usize, tab_size: usize) -> Self {
        InputBuffer {
            stream,
            window: VecDeque::with_capacity(fill_size),
            fill_size: fill_size.max(1),
            tab_size: tab_size.max(1),
            position: Position::new(1, 0),
        }
    }

    fn fill(&mut self) {
        while self.window.len() < self.fill_size {
            match self.stream.next_char() {
                Some(ch) => self.window.push_back(ch),
                None => break,
            }
        }
    }

    /// Characters ahead of the read position, at most `fill_size` of them. Empty once the
    /// input is exhausted.
    pub fn lookahead(&mut self) -> Vec<char> {
        self.fill();
        self.window.iter().copied().collect()
    }

    /// Consume the next character and advance the position.
    pub fn consume(&mut self) -> Option<char> {
        self.fill();
        let ch = self.window.pop_front()?;
        self.position = self.position.advance(ch, self.tab_size);
        Some(ch)
    }

    /// Consume up to `count` characters, returning them.
    pub fn consume_n(&mut self, count: usize) -> String {
        (0..count).filter_map(|_| self.consume()).collect()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn source(&self) -> Option<&std::path::Path> {
        self.stream.source()
    }
}
