//! Rule-scoped environment variables.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::railyard::token::Token;

/// Value of an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl EnvValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EnvValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            EnvValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            EnvValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for EnvValue {
    fn from(value: bool) -> Self {
        EnvValue::Bool(value)
    }
}

impl From<i64> for EnvValue {
    fn from(value: i64) -> Self {
        EnvValue::Int(value)
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        EnvValue::Text(value.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        EnvValue::Text(value)
    }
}

/// One scope of named variables, owned by a rule instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: HashMap<String, EnvValue>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&EnvValue> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<EnvValue>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<EnvValue> {
        self.vars.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Change applied to the innermost active scope when a token slot matches.
pub type EnvChange = Arc<dyn Fn(&mut Env, &Token) + Send + Sync>;

/// Paired environment change for a token slot: `apply` runs when the slot takes a token,
/// `undo` when the search backs out of it again.
#[derive(Clone)]
pub struct EnvHook {
    apply: EnvChange,
    undo: EnvChange,
}

impl EnvHook {
    pub fn new<A, U>(apply: A, undo: U) -> Self
    where
        A: Fn(&mut Env, &Token) + Send + Sync + 'static,
        U: Fn(&mut Env, &Token) + Send + Sync + 'static,
    {
        EnvHook {
            apply: Arc::new(apply),
            undo: Arc::new(undo),
        }
    }

    pub fn apply(&self, env: &mut Env, token: &Token) {
        (self.apply)(env, token)
    }

    pub fn undo(&self, env: &mut Env, token: &Token) {
        (self.undo)(env, token)
    }
}

impl fmt::Debug for EnvHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnvHook")
    }
}
