//! Character sources for the lexer.

use std::fs;
use std::path::{Path, PathBuf};

/// A pull-based character source.
pub trait InStream {
    /// Next character, or `None` once the input is exhausted.
    fn next_char(&mut self) -> Option<char>;

    fn end_of_input(&self) -> bool;

    /// File the characters come from, if any.
    fn source(&self) -> Option<&Path> {
        None
    }
}

/// Characters of an in-memory string.
#[derive(Debug, Clone)]
pub struct StringInput {
    chars: Vec<char>,
    index: usize,
}

impl StringInput {
    pub fn new(text: &str) -> Self {
        StringInput {
            chars: text.chars().collect(),
            index: 0,
        }
    }
}

impl InStream for StringInput {
    fn next_char(&mut self) -> Option<char> {
        let ch = self.chars.get(self.index).copied();
        if ch.is_some() {
            self.index += 1;
        }
        ch
    }

    fn end_of_input(&self) -> bool {
        self.index >= self.chars.len()
    }
}

/// Characters of a file, read up front.
#[derive(Debug, Clone)]
pub struct FileInput {
    path: PathBuf,
    inner: StringInput,
}

impl FileInput {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path)?;
        Ok(FileInput {
            inner: StringInput::new(&content),
            path,
        })
    }
}

impl InStream for FileInput {
    fn next_char(&mut self) -> Option<char> {
        self.inner.next_char()
    }

    fn end_of_input(&self) -> bool {
        self.inner.end_of_input()
    }

    fn source(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

impl<S: InStream + ?Sized> InStream for Box<S> {
    fn next_char(&mut self) -> Option<char> {
        (**self).next_char()
    }

    fn end_of_input(&self) -> bool {
        (**self).end_of_input()
    }

    fn source(&self) -> Option<&Path> {
        (**self).source()
    }
}
