//! Rules and grammars.

use std::fmt;
use std::sync::Arc;

use super::builder::Builder;
use super::env::{Env, EnvValue};
use super::node::NodeId;
use crate::railyard::ast::AstNode;
use crate::railyard::error::GrammarError;
use crate::railyard::lexing::Lexer;
use crate::railyard::parsing::Context;
use crate::railyard::token::TokenTypes;

/// Handle of a rule within its [Grammar].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Wires a rule body between the given entry and exit junctions.
pub type ExpandFn = Arc<dyn Fn(&mut Builder<'_>, NodeId, NodeId, &Context<'_>) + Send + Sync>;

/// Rewrites the subtree reduced for a rule.
pub type TransformFn = Arc<dyn Fn(AstNode) -> AstNode + Send + Sync>;

/// A named rule: environment defaults, a body and an optional tree rewrite.
#[derive(Clone)]
pub struct Rule {
    name: String,
    vars: Env,
    expand: Option<ExpandFn>,
    transform: Option<TransformFn>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Rule {
            name: name.into(),
            vars: Env::new(),
            expand: None,
            transform: None,
        }
    }

    /// Declare an environment variable with its default value.
    pub fn var(mut self, name: &str, value: impl Into<EnvValue>) -> Self {
        self.vars.set(name, value);
        self
    }

    /// Initialize the environment defaults in one go.
    pub fn init(mut self, init: impl FnOnce(&mut Env)) -> Self {
        init(&mut self.vars);
        self
    }

    pub fn expand<F>(mut self, expand: F) -> Self
    where
        F: Fn(&mut Builder<'_>, NodeId, NodeId, &Context<'_>) + Send + Sync + 'static,
    {
        self.expand = Some(Arc::new(expand));
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(AstNode) -> AstNode + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vars(&self) -> &Env {
        &self.vars
    }

    pub fn has_body(&self) -> bool {
        self.expand.is_some()
    }

    pub(crate) fn expander(&self) -> Option<&ExpandFn> {
        self.expand.as_ref()
    }

    pub(crate) fn transformer(&self) -> Option<&TransformFn> {
        self.transform.as_ref()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("vars", &self.vars)
            .field("expand", &self.expand.is_some())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Collects token types and rules, then freezes them into a [Grammar].
///
/// Rules that refer to themselves or to rules defined later are first declared, which hands
/// out their id, and defined afterwards:
///
///     let list = builder.declare("List");
///     builder.define(list, Rule::new("List").expand(move |b, start, end, _| {
///         let inner = b.rule(list);
///         ...
///     }));
#[derive(Debug)]
pub struct GrammarBuilder {
    types: TokenTypes,
    rules: Vec<(String, Option<Rule>)>,
}

impl GrammarBuilder {
    pub fn new(types: TokenTypes) -> Self {
        GrammarBuilder {
            types,
            rules: Vec::new(),
        }
    }

    pub fn types(&self) -> &TokenTypes {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TokenTypes {
        &mut self.types
    }

    /// Reserve an id for a rule defined later.
    pub fn declare(&mut self, name: &str) -> RuleId {
        self.rules.push((name.to_string(), None));
        RuleId(self.rules.len() - 1)
    }

    /// Provide the rule for a declared id.
    pub fn define(&mut self, id: RuleId, rule: Rule) -> Result<(), GrammarError> {
        let slot = self
            .rules
            .get_mut(id.0)
            .ok_or(GrammarError::UndefinedRule(id.0))?;
        *slot = (rule.name().to_string(), Some(rule));
        Ok(())
    }

    /// Declare and define in one step.
    pub fn add_rule(&mut self, rule: Rule) -> RuleId {
        self.rules.push((rule.name().to_string(), Some(rule)));
        RuleId(self.rules.len() - 1)
    }

    /// Freeze the grammar with `root` as its top rule. Every declared rule must be defined and
    /// have a body.
    pub fn build(self, root: RuleId) -> Result<Grammar, GrammarError> {
        self.build_with(root, None)
    }

    /// Like [GrammarBuilder::build], giving the root tree node `ident` as id.
    pub fn build_as(self, root: RuleId, ident: &str) -> Result<Grammar, GrammarError> {
        self.build_with(root, Some(ident.to_string()))
    }

    fn build_with(self, root: RuleId, ident: Option<String>) -> Result<Grammar, GrammarError> {
        if root.0 >= self.rules.len() {
            return Err(GrammarError::UndefinedRule(root.0));
        }
        let rules = self
            .rules
            .into_iter()
            .map(|(name, rule)| match rule {
                Some(rule) if rule.has_body() => Ok(rule),
                _ => Err(GrammarError::AbstractInstantiation(name)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Grammar {
            types: self.types,
            rules,
            root,
            ident,
        })
    }
}

/// A frozen grammar: its token types and rules. Read-only while parsing, so one grammar can
/// serve any number of parsers.
#[derive(Debug, Clone)]
pub struct Grammar {
    types: TokenTypes,
    rules: Vec<Rule>,
    root: RuleId,
    ident: Option<String>,
}

impl Grammar {
    pub fn types(&self) -> &TokenTypes {
        &self.types
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn root(&self) -> RuleId {
        self.root
    }

    pub fn ident(&self) -> Option<&str> {
        self.ident.as_deref()
    }

    /// A lexer recognizing the grammar's token types.
    pub fn lexer(&self) -> Lexer {
        Lexer::for_types(&self.types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_but_undefined_rule_fails() {
        let mut builder = GrammarBuilder::new(TokenTypes::new());
        let root = builder.add_rule(Rule::new("root").expand(|b, start, end, _| {
            b.connect(start, end);
        }));
        builder.declare("Missing");
        let err = builder.build(root).unwrap_err();
        assert!(matches!(err, GrammarError::AbstractInstantiation(name) if name == "Missing"));
    }

    #[test]
    fn test_rule_without_body_fails() {
        let mut builder = GrammarBuilder::new(TokenTypes::new());
        let root = builder.add_rule(Rule::new("root"));
        assert!(matches!(
            builder.build(root),
            Err(GrammarError::AbstractInstantiation(_))
        ));
    }

    #[test]
    fn test_define_unknown_id() {
        let mut builder = GrammarBuilder::new(TokenTypes::new());
        let result = builder.define(RuleId(3), Rule::new("x"));
        assert!(matches!(result, Err(GrammarError::UndefinedRule(3))));
    }

    #[test]
    fn test_unknown_root() {
        let builder = GrammarBuilder::new(TokenTypes::new());
        assert!(matches!(
            builder.build(RuleId(0)),
            Err(GrammarError::UndefinedRule(0))
        ));
    }

    #[test]
    fn test_rule_vars_and_init() {
        let rule = Rule::new("r")
            .var("depth", 0i64)
            .init(|env| env.set("mode", "strict"));
        assert_eq!(rule.vars().get("depth"), Some(&EnvValue::Int(0)));
        assert_eq!(rule.vars().get("mode"), Some(&EnvValue::from("strict")));
        assert!(!rule.has_body());
    }

    #[test]
    fn test_declare_then_define() {
        let mut types = TokenTypes::new();
        let word = types.word("[a-z]+").unwrap();
        let mut builder = GrammarBuilder::new(types);
        let item = builder.declare("Item");
        builder
            .define(
                item,
                Rule::new("Item").expand(move |b, start, end, _| {
                    let w = b.token(&word);
                    b.chain([start.into(), w, end.into()]);
                }),
            )
            .unwrap();
        let grammar = builder.build_as(item, "top").unwrap();
        assert_eq!(grammar.rule(item).map(Rule::name), Some("Item"));
        assert_eq!(grammar.ident(), Some("top"));
        assert_eq!(grammar.types().len(), 1);
    }
}
