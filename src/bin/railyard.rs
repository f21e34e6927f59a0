//! Command-line interface for railyard
//!
//! Usage:
//!   railyard tokens `<path>` --lexicon `<yaml>` [--format text|json]   - Lex a file with a YAML lexicon
//!   railyard parse `<path>` --grammar `<sample>` [--format `<format>`]  - Parse a file with a sample grammar
//!   railyard parse `<path>` --definition `<file>`                     - Parse a file with a grammar definition
//!   railyard formats                                               - List output formats

use std::error::Error;
use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use railyard::railyard::config::{Lexicon, ParserConfig, TreeKind};
use railyard::railyard::formats::FormatRegistry;
use railyard::railyard::grammar::{Definition, Grammar};
use railyard::railyard::lexing::FileInput;
use railyard::railyard::parsing::Parser;
use railyard::railyard::testing;
use railyard::railyard::token::{Position, Token};

const SAMPLES: [&str; 3] = ["for-loops", "commands", "boundary"];

fn main() {
    let matches = Command::new("railyard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lex and parse text with railyard grammars")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter written to stderr (e.g. 'debug', 'railyard=trace')")
                .default_value("warn"),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the tokens of a file")
                .arg(
                    Arg::new("path")
                        .help("File to lex")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("lexicon")
                        .long("lexicon")
                        .short('l')
                        .help("YAML file describing the token types")
                        .required(true),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a file with a sample grammar or a grammar definition")
                .arg(
                    Arg::new("path")
                        .help("File to parse")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("grammar")
                        .long("grammar")
                        .short('g')
                        .help("Sample grammar")
                        .value_parser(SAMPLES)
                        .required_unless_present("definition")
                        .conflicts_with("definition"),
                )
                .arg(
                    Arg::new("definition")
                        .long("definition")
                        .short('d')
                        .help("Grammar definition file"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (see 'railyard formats')")
                        .default_value("json-pretty"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("YAML parser configuration"),
                )
                .arg(
                    Arg::new("full-backtracking")
                        .long("full-backtracking")
                        .help("Allow backtracking out of completed rules")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("parse-tree")
                        .long("parse-tree")
                        .help("Skip rule transforms")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("formats").about("List available output formats"))
        .get_matches();

    init_logging(matches.get_one::<String>("log-level").map_or("warn", String::as_str));

    let result = match matches.subcommand() {
        Some(("tokens", sub)) => handle_tokens_command(sub),
        Some(("parse", sub)) => handle_parse_command(sub),
        Some(("formats", _)) => {
            handle_formats_command();
            Ok(())
        }
        _ => Err("unknown command".into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Box<dyn Error>> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument '{name}'").into())
}

#[derive(Serialize)]
struct TokenRecord<'a> {
    text: &'a str,
    types: Vec<String>,
    start: Position,
    end: Position,
}

impl<'a> From<&'a Token> for TokenRecord<'a> {
    fn from(token: &'a Token) -> Self {
        TokenRecord {
            text: token.text(),
            types: token.types().iter().map(|t| format!("{t:?}")).collect(),
            start: token.start(),
            end: token.end(),
        }
    }
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let path = required(matches, "path")?;
    let lexicon = Lexicon::from_path(required(matches, "lexicon")?)?;
    let (types, lexer) = lexicon.lexer()?;
    debug!(types = types.len(), "lexicon loaded");

    let input = FileInput::open(path)?;
    let tokens = lexer.stream(input).collect::<Result<Vec<_>, _>>()?;
    info!(count = tokens.len(), "lexed {path}");

    match required(matches, "format")? {
        "json" => {
            let records: Vec<TokenRecord<'_>> = tokens.iter().map(TokenRecord::from).collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        _ => {
            for token in &tokens {
                let types: Vec<String> = token.types().iter().map(|t| format!("{t:?}")).collect();
                println!("{}\t{}\t{}", token.start(), token.text(), types.join(" "));
            }
        }
    }
    Ok(())
}

fn sample_grammar(name: &str) -> Result<Grammar, Box<dyn Error>> {
    let grammar = match name {
        "for-loops" => testing::for_loops()?,
        "commands" => testing::commands()?,
        "boundary" => testing::backtracking_boundary()?,
        other => return Err(format!("unknown grammar '{other}'").into()),
    };
    Ok(grammar)
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let path = required(matches, "path")?;
    let (grammar, defaults) = match matches.get_one::<String>("definition") {
        Some(file) => {
            let definition = Definition::from_path(file)?;
            info!(rules = definition.rules.len(), "loaded grammar definition {file}");
            (definition.grammar()?, definition.config())
        }
        None => (
            sample_grammar(required(matches, "grammar")?)?,
            ParserConfig::default(),
        ),
    };

    let mut config = match matches.get_one::<String>("config") {
        Some(config) => ParserConfig::from_yaml_str(&std::fs::read_to_string(config)?)?,
        None => defaults,
    };
    if matches.get_flag("full-backtracking") {
        config.full_backtracking = true;
    }
    if matches.get_flag("parse-tree") {
        config.tree = TreeKind::ParseTree;
    }

    let registry = FormatRegistry::default();
    let format = required(matches, "format")?;
    if !registry.has(format) {
        return Err(format!(
            "unknown format '{format}', expected one of: {}",
            registry.list_formats().join(", ")
        )
        .into());
    }

    let parser = Parser::with_config(&grammar, &config);
    let tree = parser.parse_file(path)?;
    print!("{}", registry.serialize(&tree, format)?);
    if format.starts_with("json") {
        println!();
    }
    Ok(())
}

/// Handle the formats command
fn handle_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available output formats:\n");
    for name in registry.list_formats() {
        let description = registry.get(&name).map_or("", |f| f.description());
        println!("  {name}");
        println!("    {description}");
    }
}
