//! What a successor query can see.

use super::path::Path;
use crate::railyard::grammar::EnvValue;
use crate::railyard::token::{Token, TokenTypeRef};

/// The current path and the token being matched, if any.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    path: &'a Path,
    token: Option<&'a Token>,
}

impl<'a> Context<'a> {
    pub fn new(path: &'a Path, token: Option<&'a Token>) -> Self {
        Context { path, token }
    }

    pub fn path(&self) -> &'a Path {
        self.path
    }

    pub fn token(&self) -> Option<&'a Token> {
        self.token
    }

    /// Nearest active definition of an environment variable.
    pub fn env_var(&self, name: &str) -> Option<&'a EnvValue> {
        self.path.env_var(name)
    }

    /// First keyword type of the pending token.
    pub fn current_keyword(&self) -> Option<&'a TokenTypeRef> {
        self.token.and_then(Token::keyword_type)
    }
}
