//! Grammars from text
//!
//!     A grammar definition declares token types and rules in a small language of its own. The
//!     definition is read by the crate's own [Parser] running the [meta_grammar], then turned
//!     into a [Definition] and from there into a [Grammar]:
//!
//!         # comments run to the end of the line, <!-- or sit between these markers -->
//!         line-comment-style "//";
//!         block-comment-style "/*" "*/";
//!         enable full-backtracking;
//!
//!         keyword FORALL "forall";
//!         keyword SELECT "select" { case-sensitive: FALSE };
//!         word ID "[_a-zA-Z][_a-zA-Z0-9]*";
//!         prefix DOLLAR "$";
//!         postfix INCR "++";
//!         separator LBRACE "{";
//!         separator DOT "." { whitespace-allowed: FALSE };
//!         separator BLANKS "[ ]+" { is-pattern: TRUE };
//!         literal STRING;
//!
//!         @grammar loops = loop*;
//!         loop = "forall" list=ID LBRACE RBRACE
//!              | "foreach" element=ID "in" list=ID LBRACE RBRACE;
//!
//! Rules
//!
//!     A rule is a list of branches separated by `|`. A branch is a sequence of elements: token
//!     names (upper case), rule names (lower case), quoted keywords or parenthesized groups of
//!     branches. Each element may carry an identifier (`list=ID`), which becomes the id of its
//!     tree node, and a multiplicity `?`, `*` or `+`. Quoted keywords need no declaration; a
//!     case-sensitive keyword declared with the same text is reused.
//!
//!     Exactly one rule is marked `@grammar`; it becomes the root of the grammar.

use std::collections::HashMap;
use std::path::Path as FsPath;

use tracing::debug;

use super::builder::{Builder, Element, Multiplicity};
use super::rule::{Grammar, GrammarBuilder, Rule, RuleId};
use crate::railyard::ast::AstNode;
use crate::railyard::config::{BlockComment, ParserConfig};
use crate::railyard::error::{DefinitionError, GrammarError};
use crate::railyard::parsing::Parser;
use crate::railyard::token::{TokenTypeRef, TokenTypes};

/// Line comment marker of definition files.
pub const LINE_COMMENT: &str = "#";
/// Block comment markers of definition files.
pub const BLOCK_COMMENT: (&str, &str) = ("<!--", "-->");

const TOKEN_KINDS: [&str; 6] = ["keyword", "word", "prefix", "postfix", "separator", "literal"];

/// Properties a token definition of `kind` may set.
fn property_names(kind: &str) -> &'static [&'static str] {
    match kind {
        "keyword" => &["case-sensitive"],
        "separator" => &["is-pattern", "whitespace-allowed"],
        _ => &[],
    }
}

fn unquote(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(_), Some(_)) => chars.as_str(),
        _ => text,
    }
}

#[derive(Clone)]
struct MetaTokens {
    token_id: TokenTypeRef,
    rule_id: TokenTypeRef,
    id: TokenTypeRef,
    value: TokenTypeRef,
    brace_open: TokenTypeRef,
    brace_close: TokenTypeRef,
    par_open: TokenTypeRef,
    par_close: TokenTypeRef,
    colon: TokenTypeRef,
    comma: TokenTypeRef,
    assign: TokenTypeRef,
    or: TokenTypeRef,
    semicolon: TokenTypeRef,
    multiplicities: [TokenTypeRef; 3],
    yes: TokenTypeRef,
    no: TokenTypeRef,
    line_comment_style: TokenTypeRef,
    block_comment_style: TokenTypeRef,
    enable: TokenTypeRef,
    full_backtracking: TokenTypeRef,
    annotation: TokenTypeRef,
    kinds: Vec<(&'static str, TokenTypeRef)>,
    properties: Vec<(&'static str, TokenTypeRef)>,
}

impl MetaTokens {
    fn register(types: &mut TokenTypes) -> Result<Self, GrammarError> {
        let token_id = types.word("[A-Z_][A-Z0-9_]*")?;
        let value = types.literal();
        let brace_open = types.separator("{");
        let brace_close = types.separator("}");
        let par_open = types.separator("(");
        let par_close = types.separator(")");
        let colon = types.separator(":");
        let comma = types.separator(",");
        let assign = types.separator("=");
        let or = types.separator("|");
        let semicolon = types.separator(";");
        let yes = types.keyword("TRUE");
        let no = types.keyword("FALSE");
        let kinds = TOKEN_KINDS
            .iter()
            .map(|&kind| (kind, types.keyword(kind)))
            .collect();
        let line_comment_style = types.keyword("line-comment-style");
        let block_comment_style = types.keyword("block-comment-style");
        let enable = types.keyword("enable");
        let full_backtracking = types.keyword("full-backtracking");
        let properties = ["is-pattern", "case-sensitive", "whitespace-allowed"]
            .iter()
            .map(|&name| (name, types.keyword(name)))
            .collect();
        let rule_id = types.word("[a-z_][a-zA-Z0-9_]*")?;
        let annotation = types.keyword("@grammar");
        let id = types.word("[a-zA-Z_][a-zA-Z0-9_]*")?;
        let multiplicities = [types.separator("?"), types.separator("*"), types.separator("+")];
        Ok(MetaTokens {
            token_id,
            rule_id,
            id,
            value,
            brace_open,
            brace_close,
            par_open,
            par_close,
            colon,
            comma,
            assign,
            or,
            semicolon,
            multiplicities,
            yes,
            no,
            line_comment_style,
            block_comment_style,
            enable,
            full_backtracking,
            annotation,
            kinds,
            properties,
        })
    }

    fn property(&self, name: &str) -> Option<&TokenTypeRef> {
        self.properties
            .iter()
            .find(|(property, _)| *property == name)
            .map(|(_, token_type)| token_type)
    }
}

/// The grammar of grammar definitions.
pub fn meta_grammar() -> Result<Grammar, GrammarError> {
    let mut types = TokenTypes::new();
    let t = MetaTokens::register(&mut types)?;
    let mut builder = GrammarBuilder::new(types);

    let tk = t.clone();
    let comment = builder.add_rule(
        Rule::new("comment-style")
            .expand(move |b, start, end, _| {
                let style = b.token_as(&tk.line_comment_style, "line");
                let begin = b.token_as(&tk.value, "begin");
                let close = b.token(&tk.semicolon);
                b.chain([start.into(), style, begin, close, end.into()]);

                let style = b.token_as(&tk.block_comment_style, "block");
                let begin = b.token_as(&tk.value, "begin");
                let finish = b.token_as(&tk.value, "end");
                let close = b.token(&tk.semicolon);
                b.chain([start.into(), style, begin, finish, close, end.into()]);
            })
            .transform(|node| {
                let begin = node.child_by_id("begin").map_or("", |n| unquote(n.text()));
                match node.child_by_id("end") {
                    None => AstNode::new("line-comment", begin, ""),
                    Some(finish) => AstNode::new("block-comment", "", "")
                        .with_child(AstNode::new("begin", begin, ""))
                        .with_child(AstNode::new("end", unquote(finish.text()), "")),
                }
            }),
    );

    let tk = t.clone();
    let enable = builder.add_rule(
        Rule::new("enable")
            .expand(move |b, start, end, _| {
                let keyword = b.token(&tk.enable);
                let feature = b.token(&tk.full_backtracking);
                let close = b.token(&tk.semicolon);
                b.chain([start.into(), keyword, feature, close, end.into()]);
            })
            .transform(|_| AstNode::new("full-backtracking", "", "")),
    );

    // the allowed property names come from the `kind` of the enclosing token rule
    let tk = t.clone();
    let properties = builder.add_rule(
        Rule::new("properties")
            .expand(move |b, start, end, ctx| {
                let kind = ctx.env_var("kind").and_then(|v| v.as_text()).unwrap_or("");
                let first = b.connector();
                let done = b.connector();
                for name in property_names(kind) {
                    let Some(keyword) = tk.property(name) else {
                        continue;
                    };
                    let key = b.token_as(keyword, "property");
                    let colon = b.token(&tk.colon);
                    let yes = b.token_as(&tk.yes, "value");
                    let no = b.token_as(&tk.no, "value");
                    let value = b.fork([yes, no]);
                    b.chain([first, key, colon, value, done]);
                }
                let comma = b.token(&tk.comma);
                b.chain([done, comma, first]);

                let open = b.token(&tk.brace_open);
                let close = b.token(&tk.brace_close);
                b.chain([start.into(), open, first]);
                b.chain([done, close, end.into()]);
            })
            .transform(|node| {
                let mut result = AstNode::new("properties", "", "");
                let values = node.children_by_id("value");
                for (key, value) in node.children_by_id("property").zip(values) {
                    let flag = if value.text() == "TRUE" { "true" } else { "false" };
                    result.add_child(AstNode::new(key.text(), flag, ""));
                }
                result
            }),
    );

    let mut token_rules = Vec::new();
    for (kind, keyword) in t.kinds.clone() {
        let tk = t.clone();
        let has_properties = !property_names(kind).is_empty();
        let rule = builder.add_rule(
            Rule::new(kind)
                .var("kind", kind)
                .expand(move |b, start, end, _| {
                    let keyword = b.token(&keyword);
                    let name = b.token_as(&tk.token_id, "id");
                    let close = b.token(&tk.semicolon);
                    if kind == "literal" {
                        b.chain([start.into(), keyword, name, close, end.into()]);
                        return;
                    }
                    let value = b.token_as(&tk.value, "value");
                    b.chain([start.into(), keyword, name, value]);
                    if has_properties {
                        let props = b.rule_as(properties, "properties");
                        let props = b.zero_to_one(props);
                        b.chain([value, props, close, end.into()]);
                    } else {
                        b.chain([value, close, end.into()]);
                    }
                })
                .transform(move |mut node| {
                    let mut result = AstNode::new(kind, "", "");
                    for mut child in node.remove_children() {
                        let id = child.id().to_string();
                        match id.as_str() {
                            "id" => result.add_child(AstNode::new("id", child.text(), "")),
                            "value" => {
                                result.add_child(AstNode::new("value", unquote(child.text()), ""))
                            }
                            "properties" => {
                                child.clear_id();
                                result.add_child(child);
                            }
                            _ => {}
                        }
                    }
                    result
                }),
        );
        token_rules.push(rule);
    }

    let element = builder.declare("element");
    let branch = builder.declare("branch");
    let group = builder.declare("group");

    let tk = t.clone();
    builder.define(
        element,
        Rule::new("element")
            .expand(move |b, start, end, _| {
                let name = b.token_as(&tk.id, "id");
                let assign = b.token(&tk.assign);
                let named = b.sequence([name, assign]);
                let named = b.zero_to_one(named);

                let token = b.token_as(&tk.token_id, "token");
                let keyword = b.token_as(&tk.value, "keyword");
                let rule = b.token_as(&tk.rule_id, "rule");
                let nested = b.rule_as(group, "group");
                let target = b.fork([token, keyword, rule, nested]);

                let [optional, many, at_least_once] = &tk.multiplicities;
                let optional = b.token_as(optional, "mult");
                let many = b.token_as(many, "mult");
                let at_least_once = b.token_as(at_least_once, "mult");
                let mult = b.fork([optional, many, at_least_once]);
                let mult = b.zero_to_one(mult);

                b.chain([start.into(), named, target, mult, end.into()]);
            })
            .transform(|mut node| {
                let mut result = AstNode::new("element", "", "");
                for mut child in node.remove_children() {
                    let id = child.id().to_string();
                    let converted = match id.as_str() {
                        "id" => AstNode::new("id", child.text(), ""),
                        "token" => AstNode::new("token-id", child.text(), ""),
                        "rule" => AstNode::new("rule-id", child.text(), ""),
                        "keyword" => AstNode::new("keyword-text", unquote(child.text()), ""),
                        "mult" => AstNode::new("multiplicity", child.text(), ""),
                        "group" => {
                            child.clear_id();
                            child
                        }
                        _ => continue,
                    };
                    result.add_child(converted);
                }
                result
            }),
    )?;

    builder.define(
        branch,
        Rule::new("branch").expand(move |b, start, end, _| {
            let element = b.rule(element);
            let elements = b.one_to_many(element);
            b.chain([start.into(), elements, end.into()]);
        }),
    )?;

    let tk = t.clone();
    builder.define(
        group,
        Rule::new("group")
            .expand(move |b, start, end, _| {
                let open = b.token(&tk.par_open);
                let first = b.rule_as(branch, "branch");
                let or = b.token(&tk.or);
                let other = b.rule_as(branch, "branch");
                let others = b.sequence([or, other]);
                let others = b.zero_to_many(others);
                let close = b.token(&tk.par_close);
                b.chain([start.into(), open, first, others, close, end.into()]);
            })
            .transform(|mut node| {
                let mut result = AstNode::new("group", "", "");
                for mut child in node.remove_children() {
                    if child.id() == "branch" {
                        child.clear_id();
                        result.add_child(child);
                    }
                }
                result
            }),
    )?;

    let tk = t.clone();
    let rule = builder.add_rule(
        Rule::new("rule")
            .expand(move |b, start, end, _| {
                let annotation = b.token_as(&tk.annotation, "root");
                let annotation = b.zero_to_one(annotation);
                let name = b.token_as(&tk.rule_id, "name");
                let assign = b.token(&tk.assign);
                let first = b.rule_as(branch, "branch");
                let or = b.token(&tk.or);
                let other = b.rule_as(branch, "branch");
                let others = b.sequence([or, other]);
                let others = b.zero_to_many(others);
                let close = b.token(&tk.semicolon);
                b.chain([
                    start.into(),
                    annotation,
                    name,
                    assign,
                    first,
                    others,
                    close,
                    end.into(),
                ]);
            })
            .transform(|mut node| {
                let name = node.child_by_id("name").map_or("", AstNode::text).to_string();
                let mut result = AstNode::new("rule", name, "");
                if node.child_by_id("root").is_some() {
                    result.add_child(AstNode::new("root", "", ""));
                }
                for mut child in node.remove_children() {
                    if child.id() == "branch" {
                        child.clear_id();
                        result.add_child(child);
                    }
                }
                result
            }),
    );

    let root = builder.add_rule(Rule::new("definition").expand(move |b, start, end, _| {
        let mut statements = vec![b.rule(comment), b.rule(enable)];
        for &token_rule in &token_rules {
            statements.push(b.rule(token_rule));
        }
        statements.push(b.rule(rule));
        let statement = b.fork(statements);
        let statements = b.zero_to_many(statement);
        b.chain([start.into(), statements, end.into()]);
    }));
    builder.build(root)
}

/// A token type declared in a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDef {
    pub name: String,
    pub kind: TokenDefKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDefKind {
    Keyword { text: String, case_sensitive: bool },
    Word { pattern: String },
    Prefix { marker: String },
    Postfix { marker: String },
    Separator {
        marker: String,
        is_pattern: bool,
        whitespace_allowed: bool,
    },
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Token(String),
    Keyword(String),
    Rule(String),
    Group(Vec<BranchDef>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDef {
    pub ident: Option<String>,
    pub target: Target,
    pub multiplicity: Option<Multiplicity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchDef {
    pub elements: Vec<ElementDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDef {
    pub name: String,
    pub root: bool,
    pub branches: Vec<BranchDef>,
}

/// A parsed grammar definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definition {
    pub line_comment: Option<String>,
    pub block_comment: Option<BlockComment>,
    pub full_backtracking: bool,
    pub tokens: Vec<TokenDef>,
    pub rules: Vec<RuleDef>,
}

fn definition_parser(meta: &Grammar) -> Parser<'_> {
    let mut parser = Parser::new(meta);
    parser.enable_line_comments(LINE_COMMENT);
    parser.enable_block_comments(BLOCK_COMMENT.0, BLOCK_COMMENT.1);
    parser
}

fn malformed(what: &str) -> DefinitionError {
    DefinitionError::Malformed(what.to_string())
}

impl Definition {
    pub fn parse(text: &str) -> Result<Self, DefinitionError> {
        let meta = meta_grammar()?;
        let tree = definition_parser(&meta).parse_string(text)?;
        Self::from_tree(&tree)
    }

    pub fn from_path(path: impl AsRef<FsPath>) -> Result<Self, DefinitionError> {
        let meta = meta_grammar()?;
        let tree = definition_parser(&meta).parse_file(path)?;
        Self::from_tree(&tree)
    }

    /// Read the tree produced by the [meta_grammar].
    pub fn from_tree(tree: &AstNode) -> Result<Self, DefinitionError> {
        let mut definition = Definition::default();
        for node in tree.children() {
            match node.name() {
                "line-comment" => {
                    if definition.line_comment.is_none() {
                        definition.line_comment = Some(node.text().to_string());
                    }
                }
                "block-comment" => {
                    if definition.block_comment.is_none() {
                        let start = node.child("begin").ok_or_else(|| malformed("block comment"))?;
                        let end = node.child("end").ok_or_else(|| malformed("block comment"))?;
                        definition.block_comment = Some(BlockComment {
                            start: start.text().to_string(),
                            end: end.text().to_string(),
                        });
                    }
                }
                "full-backtracking" => definition.full_backtracking = true,
                "rule" => definition.rules.push(read_rule(node)?),
                kind if TOKEN_KINDS.contains(&kind) => definition.tokens.push(read_token(node)?),
                other => return Err(malformed(other)),
            }
        }
        debug!(
            tokens = definition.tokens.len(),
            rules = definition.rules.len(),
            "grammar definition read"
        );
        Ok(definition)
    }

    /// Parser settings declared by the definition.
    pub fn config(&self) -> ParserConfig {
        ParserConfig {
            line_comment: self.line_comment.clone(),
            block_comment: self.block_comment.clone(),
            full_backtracking: self.full_backtracking,
            ..ParserConfig::default()
        }
    }

    /// Build the grammar: declared token types first, then one keyword per quoted keyword text
    /// not declared yet, then the rules.
    pub fn grammar(&self) -> Result<Grammar, DefinitionError> {
        let mut types = TokenTypes::new();
        let mut tokens: HashMap<&str, TokenTypeRef> = HashMap::new();
        let mut keywords: HashMap<String, TokenTypeRef> = HashMap::new();
        for token in &self.tokens {
            let token_type = match &token.kind {
                TokenDefKind::Keyword {
                    text,
                    case_sensitive: true,
                } => {
                    let keyword = types.keyword(text);
                    keywords
                        .entry(text.clone())
                        .or_insert_with(|| keyword.clone());
                    keyword
                }
                TokenDefKind::Keyword { text, .. } => types.keyword_insensitive(text),
                TokenDefKind::Word { pattern } => types.word(pattern)?,
                TokenDefKind::Prefix { marker } => types.prefix(marker),
                TokenDefKind::Postfix { marker } => types.postfix(marker),
                TokenDefKind::Separator {
                    marker,
                    is_pattern: true,
                    ..
                } => types.separator_pattern(marker)?,
                TokenDefKind::Separator {
                    marker,
                    whitespace_allowed: true,
                    ..
                } => types.separator(marker),
                TokenDefKind::Separator { marker, .. } => types.separator_tight(marker),
                TokenDefKind::Literal => types.literal(),
            };
            if tokens.insert(token.name.as_str(), token_type).is_some() {
                return Err(DefinitionError::Duplicate(token.name.clone()));
            }
        }
        let mut texts = Vec::new();
        for rule in &self.rules {
            collect_keywords(&rule.branches, &mut texts);
        }
        for text in texts {
            if !keywords.contains_key(text) {
                let keyword = types.keyword(text);
                keywords.insert(text.to_string(), keyword);
            }
        }

        let mut roots = self.rules.iter().filter(|rule| rule.root);
        let root_name = match (roots.next(), roots.next()) {
            (Some(root), None) => root.name.as_str(),
            (Some(first), Some(second)) => {
                return Err(DefinitionError::MultipleRoots(
                    first.name.clone(),
                    second.name.clone(),
                ))
            }
            (None, _) => return Err(DefinitionError::MissingRoot),
        };

        let mut builder = GrammarBuilder::new(types);
        let mut rules: HashMap<&str, RuleId> = HashMap::new();
        for rule in &self.rules {
            if tokens.contains_key(rule.name.as_str())
                || rules.insert(rule.name.as_str(), builder.declare(&rule.name)).is_some()
            {
                return Err(DefinitionError::Duplicate(rule.name.clone()));
            }
        }
        let symbols = Symbols {
            tokens: &tokens,
            keywords: &keywords,
            rules: &rules,
        };
        let mut root = None;
        for rule in &self.rules {
            let id = symbols.rule(&rule.name)?;
            if rule.name == root_name {
                root = Some(id);
            }
            let branches = symbols.resolve(&rule.branches)?;
            builder.define(
                id,
                Rule::new(&rule.name).expand(move |b, start, end, _| {
                    let body = alternatives(b, &branches);
                    b.chain([start.into(), body, end.into()]);
                }),
            )?;
        }
        let root = root.ok_or(DefinitionError::MissingRoot)?;
        Ok(builder.build(root)?)
    }
}

fn read_token(node: &AstNode) -> Result<TokenDef, DefinitionError> {
    let name = node
        .child("id")
        .ok_or_else(|| malformed("token definition without name"))?
        .text()
        .to_string();
    let value = node.child("value").map_or("", AstNode::text).to_string();
    let flag = |property: &str, default: bool| {
        node.child("properties")
            .and_then(|properties| properties.child(property))
            .map_or(default, |p| p.text() == "true")
    };
    let kind = match node.name() {
        "keyword" => TokenDefKind::Keyword {
            text: value,
            case_sensitive: flag("case-sensitive", true),
        },
        "word" => TokenDefKind::Word { pattern: value },
        "prefix" => TokenDefKind::Prefix { marker: value },
        "postfix" => TokenDefKind::Postfix { marker: value },
        "separator" => TokenDefKind::Separator {
            marker: value,
            is_pattern: flag("is-pattern", false),
            whitespace_allowed: flag("whitespace-allowed", true),
        },
        "literal" => TokenDefKind::Literal,
        other => return Err(malformed(other)),
    };
    Ok(TokenDef { name, kind })
}

fn read_rule(node: &AstNode) -> Result<RuleDef, DefinitionError> {
    Ok(RuleDef {
        name: node.text().to_string(),
        root: node.child("root").is_some(),
        branches: read_branches(node)?,
    })
}

fn read_branches(node: &AstNode) -> Result<Vec<BranchDef>, DefinitionError> {
    node.children_by_name("branch")
        .map(|branch| {
            let elements = branch
                .children_by_name("element")
                .map(read_element)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BranchDef { elements })
        })
        .collect()
}

fn read_element(node: &AstNode) -> Result<ElementDef, DefinitionError> {
    let mut ident = None;
    let mut target = None;
    let mut multiplicity = None;
    for child in node.children() {
        match child.name() {
            "id" => ident = Some(child.text().to_string()),
            "token-id" => target = Some(Target::Token(child.text().to_string())),
            "rule-id" => target = Some(Target::Rule(child.text().to_string())),
            "keyword-text" => target = Some(Target::Keyword(child.text().to_string())),
            "group" => target = Some(Target::Group(read_branches(child)?)),
            "multiplicity" => {
                multiplicity = match child.text() {
                    "?" => Some(Multiplicity::ZeroToOne),
                    "*" => Some(Multiplicity::ZeroToMany),
                    "+" => Some(Multiplicity::OneToMany),
                    other => return Err(malformed(other)),
                }
            }
            other => return Err(malformed(other)),
        }
    }
    Ok(ElementDef {
        ident,
        target: target.ok_or_else(|| malformed("element without target"))?,
        multiplicity,
    })
}

fn collect_keywords<'a>(branches: &'a [BranchDef], out: &mut Vec<&'a str>) {
    for element in branches.iter().flat_map(|branch| &branch.elements) {
        match &element.target {
            Target::Keyword(text) => {
                if !out.contains(&text.as_str()) {
                    out.push(text);
                }
            }
            Target::Group(branches) => collect_keywords(branches, out),
            Target::Token(_) | Target::Rule(_) => {}
        }
    }
}

/// An element with its references resolved.
struct Slot {
    ident: Option<String>,
    piece: Piece,
    multiplicity: Option<Multiplicity>,
}

enum Piece {
    Token(TokenTypeRef),
    Rule(RuleId),
    Group(Vec<Vec<Slot>>),
}

struct Symbols<'a> {
    tokens: &'a HashMap<&'a str, TokenTypeRef>,
    keywords: &'a HashMap<String, TokenTypeRef>,
    rules: &'a HashMap<&'a str, RuleId>,
}

impl Symbols<'_> {
    fn rule(&self, name: &str) -> Result<RuleId, DefinitionError> {
        self.rules
            .get(name)
            .copied()
            .ok_or_else(|| DefinitionError::UnknownRule(name.to_string()))
    }

    fn resolve(&self, branches: &[BranchDef]) -> Result<Vec<Vec<Slot>>, DefinitionError> {
        branches
            .iter()
            .map(|branch| {
                branch
                    .elements
                    .iter()
                    .map(|element| self.resolve_element(element))
                    .collect()
            })
            .collect()
    }

    fn resolve_element(&self, element: &ElementDef) -> Result<Slot, DefinitionError> {
        let piece = match &element.target {
            Target::Token(name) => Piece::Token(
                self.tokens
                    .get(name.as_str())
                    .cloned()
                    .ok_or_else(|| DefinitionError::UnknownToken(name.clone()))?,
            ),
            Target::Keyword(text) => Piece::Token(
                self.keywords
                    .get(text)
                    .cloned()
                    .ok_or_else(|| DefinitionError::UnknownToken(text.clone()))?,
            ),
            Target::Rule(name) => Piece::Rule(self.rule(name)?),
            Target::Group(branches) => Piece::Group(self.resolve(branches)?),
        };
        Ok(Slot {
            ident: element.ident.clone(),
            piece,
            multiplicity: element.multiplicity,
        })
    }
}

fn alternatives(b: &mut Builder<'_>, branches: &[Vec<Slot>]) -> Element {
    match branches {
        [single] => sequence(b, single),
        _ => {
            let branches: Vec<Element> = branches.iter().map(|slots| sequence(b, slots)).collect();
            b.fork(branches)
        }
    }
}

fn sequence(b: &mut Builder<'_>, slots: &[Slot]) -> Element {
    let elements: Vec<Element> = slots.iter().map(|slot| element(b, slot)).collect();
    b.sequence(elements)
}

fn element(b: &mut Builder<'_>, slot: &Slot) -> Element {
    let ident = slot.ident.as_deref();
    let base = match (&slot.piece, ident) {
        (Piece::Token(token_type), Some(ident)) => b.token_as(token_type, ident),
        (Piece::Token(token_type), None) => b.token(token_type),
        (Piece::Rule(rule), Some(ident)) => b.rule_as(*rule, ident),
        (Piece::Rule(rule), None) => b.rule(*rule),
        (Piece::Group(branches), _) => alternatives(b, branches),
    };
    match slot.multiplicity {
        Some(multiplicity) => b.repeat(base, multiplicity),
        None => base,
    }
}
