//! Sample grammars
//!
//!     Small grammars shared by unit tests, integration tests and the documentation. Each
//!     one exercises a different part of the engine:
//!
//!         for_loops             rule references, repetition, tree transforms
//!         backtracking_boundary  alternatives that differ only after a completed sub-rule
//!         commands              keyed switches, guards and environment hooks

use crate::railyard::ast::AstNode;
use crate::railyard::error::GrammarError;
use crate::railyard::grammar::{Element, EnvHook, Grammar, GrammarBuilder, Rule};
use crate::railyard::token::TokenTypes;

/// Identifier pattern used by the samples.
pub const IDENTIFIER: &str = "[_a-zA-Z][_a-zA-Z0-9]*";

/// Any number of loops of the forms
///
///     forall <list> { }
///     foreach <element> in <list> { }
///
/// The `For` transform turns each loop into a `for` node with a `list-var` child and, for
/// `foreach`, an `element-var` child.
pub fn for_loops() -> Result<Grammar, GrammarError> {
    let mut types = TokenTypes::new();
    let id = types.word(IDENTIFIER)?;
    let foreach = types.keyword("foreach");
    let forall = types.keyword("forall");
    let in_kw = types.keyword("in");
    let open = types.separator("{");
    let close = types.separator("}");

    let mut builder = GrammarBuilder::new(types);
    let for_rule = builder.add_rule(
        Rule::new("For")
            .expand(move |b, start, end, _| {
                let body = b.connector();

                let all = b.token(&forall);
                let list = b.token_as(&id, "list");
                b.chain([start.into(), all, list, body]);

                let each = b.token(&foreach);
                let element = b.token_as(&id, "element");
                let within = b.token(&in_kw);
                let list = b.token_as(&id, "list");
                b.chain([start.into(), each, element, within, list, body]);

                let open = b.token(&open);
                let close = b.token(&close);
                b.chain([body, open, close, end.into()]);
            })
            .transform(|node| {
                let mut result = AstNode::new("for", "", "");
                let list = node.child_by_id("list").map_or("", AstNode::text);
                result.add_child(AstNode::new("list-var", list, ""));
                if let Some(element) = node.child_by_id("element") {
                    result.add_child(AstNode::new("element-var", element.text(), ""));
                }
                result
            }),
    );
    let root = builder.add_rule(Rule::new("loops").expand(move |b, start, end, _| {
        let nested = b.rule(for_rule);
        b.connect(start, nested);
        b.connect(nested, start);
        b.connect(start, end);
    }));
    builder.build(root)
}

/// `Inner b d | Inner b e` with `Inner = a`.
///
/// Both alternatives start with a complete `Inner`, so `a b e` only parses when the parser
/// may backtrack out of the finished `Inner` of the first alternative.
pub fn backtracking_boundary() -> Result<Grammar, GrammarError> {
    let mut types = TokenTypes::new();
    let a = types.keyword("a");
    let b_kw = types.keyword("b");
    let d = types.keyword("d");
    let e = types.keyword("e");

    let mut builder = GrammarBuilder::new(types);
    let inner = builder.add_rule(Rule::new("Inner").expand(move |b, start, end, _| {
        let a = b.token(&a);
        b.chain([start.into(), a, end.into()]);
    }));
    let root = builder.add_rule(Rule::new("boundary").expand(move |b, start, end, _| {
        let first = b.rule(inner);
        let middle = b.token(&b_kw);
        let last = b.token(&d);
        let left = b.sequence([first, middle, last]);

        let first = b.rule(inner);
        let middle = b.token(&b_kw);
        let last = b.token(&e);
        let right = b.sequence([first, middle, last]);

        let choice = b.fork([left, right]);
        b.chain([start.into(), choice, end.into()]);
    }));
    builder.build(root)
}

/// Statements terminated by `;`:
///
///     [strict] ( let <name> ; | print <name> ; | unsafe ; )*
///
/// Statements are picked by their leading keyword. A leading `strict` sets the `strict`
/// variable of the script rule, which closes the guard in front of `unsafe`.
pub fn commands() -> Result<Grammar, GrammarError> {
    let mut types = TokenTypes::new();
    let id = types.word(IDENTIFIER)?;
    let strict = types.keyword("strict");
    let let_kw = types.keyword("let");
    let print = types.keyword("print");
    let unsafe_kw = types.keyword("unsafe");
    let semicolon = types.separator(";");

    let mut builder = GrammarBuilder::new(types);
    let command = builder.add_rule(Rule::new("Command").expand(move |b, start, end, _| {
        let keyword = b.token(&let_kw);
        let name = b.token_as(&id, "name");
        let binding = b.sequence([keyword, name]);

        let keyword = b.token(&print);
        let name = b.token_as(&id, "name");
        let output = b.sequence([keyword, name]);

        let gate = b.guard(|ctx| {
            !ctx.env_var("strict")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        });
        let keyword = b.token(&unsafe_kw);
        b.connect(gate, keyword);
        let escape = Element {
            socket: gate.socket,
            plug: keyword.plug,
        };

        let statement = b.switch([("let", binding), ("print", output), ("unsafe", escape)]);
        let terminator = b.token(&semicolon);
        b.chain([start.into(), statement, terminator, end.into()]);
    }));
    let root = builder.add_rule(
        Rule::new("script")
            .var("strict", false)
            .expand(move |b, start, end, _| {
                let hook = EnvHook::new(
                    |env, _| env.set("strict", true),
                    |env, _| env.set("strict", false),
                );
                let mode = b.token_with_env(&strict, None, hook);
                let mode = b.zero_to_one(mode);
                let statement = b.rule(command);
                let statements = b.zero_to_many(statement);
                b.chain([start.into(), mode, statements, end.into()]);
            }),
    );
    builder.build(root)
}
